//! DAO configuration with TOML file support.
//!
//! Shares are 18-decimal fixed point and routinely exceed TOML's 64-bit
//! integers, so amounts may be written as decimal strings. Extension setup
//! data is `0x`-hex.

use crate::error::DaoError;
use guild_governance::GovernanceSettings;
use guild_types::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoConfig {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub docs: String,
    /// Start with share transfers paused.
    #[serde(default)]
    pub paused: bool,
    /// Chain id bound into every signed message.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default)]
    pub extensions: Vec<ExtensionSetup>,
    #[serde(default)]
    pub members: Vec<MemberAllocation>,
    pub settings: GovernanceSettings,
}

/// An extension whitelisted at init, with the data passed to its setup hook.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionSetup {
    pub address: Address,
    #[serde(default, with = "hex_data")]
    pub data: Vec<u8>,
}

/// Shares minted to a founding member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAllocation {
    pub address: Address,
    #[serde(with = "share_amount")]
    pub shares: u128,
}

fn default_chain_id() -> u64 {
    1
}

impl DaoConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, DaoError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| DaoError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, DaoError> {
        let config: Self = toml::from_str(s).map_err(|e| DaoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, DaoError> {
        toml::to_string_pretty(self).map_err(|e| DaoError::Config(e.to_string()))
    }

    /// Build a config from the flat init arguments: parallel
    /// extension/data and member/share arrays plus the 16-slot settings
    /// block.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        name: &str,
        symbol: &str,
        docs: &str,
        paused: bool,
        extensions: &[Address],
        extensions_data: &[Vec<u8>],
        members: &[Address],
        shares: &[u128],
        settings: &[u64],
    ) -> Result<Self, DaoError> {
        if extensions.len() != extensions_data.len() {
            return Err(DaoError::LengthMismatch {
                left_name: "extensions",
                left: extensions.len(),
                right_name: "extensions data",
                right: extensions_data.len(),
            });
        }
        if members.len() != shares.len() {
            return Err(DaoError::LengthMismatch {
                left_name: "members",
                left: members.len(),
                right_name: "shares",
                right: shares.len(),
            });
        }
        let settings = GovernanceSettings::from_slots(settings)?;

        Ok(Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            docs: docs.to_string(),
            paused,
            chain_id: default_chain_id(),
            extensions: extensions
                .iter()
                .zip(extensions_data)
                .map(|(address, data)| ExtensionSetup {
                    address: *address,
                    data: data.clone(),
                })
                .collect(),
            members: members
                .iter()
                .zip(shares)
                .map(|(address, shares)| MemberAllocation {
                    address: *address,
                    shares: *shares,
                })
                .collect(),
            settings,
        })
    }

    pub fn validate(&self) -> Result<(), DaoError> {
        self.settings.validate()?;
        Ok(())
    }
}

/// Share amounts as a decimal string, or as a plain integer when they fit.
pub mod share_amount {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Str(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Ok(u128::from(n)),
            Raw::Str(s) => s
                .replace('_', "")
                .parse()
                .map_err(|e| serde::de::Error::custom(format!("invalid share amount {s:?}: {e}"))),
        }
    }
}

/// Byte strings as `0x`-prefixed hex.
pub mod hex_data {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("0x{}", hex::encode(data)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        hex::decode(raw.strip_prefix("0x").unwrap_or(&raw)).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guild_governance::{ProposalCategory, VoteType};
    use guild_types::whole_shares;

    const SAMPLE: &str = r#"
        name = "Guild"
        symbol = "GLD"
        docs = "https://guild.example/charter"

        [settings]
        voting_period = 30
        grace_period = 0
        quorum = 0
        supermajority = 60
        vote_types = [0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0]

        [[members]]
        address = "0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1"
        shares = "10_000000000000000000"

        [[members]]
        address = "0xb0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0"
        shares = 5

        [[extensions]]
        address = "0xe1e1e1e1e1e1e1e1e1e1e1e1e1e1e1e1e1e1e1e1"
        data = "0x01ff"
    "#;

    #[test]
    fn parses_sample() {
        let config = DaoConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.chain_id, 1);
        assert!(!config.paused);
        assert_eq!(config.members[0].shares, whole_shares(10));
        assert_eq!(config.members[1].shares, 5);
        assert_eq!(config.extensions[0].data, vec![0x01, 0xff]);
        assert_eq!(
            config.settings.vote_types.get(ProposalCategory::Call),
            VoteType::SupermajorityQuorum
        );
    }

    #[test]
    fn round_trips_through_toml() {
        let config = DaoConfig::from_toml_str(SAMPLE).unwrap();
        let text = config.to_toml_string().unwrap();
        assert_eq!(DaoConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn rejects_out_of_bounds_settings() {
        let bad = SAMPLE.replace("supermajority = 60", "supermajority = 40");
        assert!(DaoConfig::from_toml_str(&bad).is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dao.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = DaoConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.symbol, "GLD");
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = DaoConfig::from_toml_file("/nonexistent/dao.toml").unwrap_err();
        assert!(matches!(err, DaoError::Config(_)));
    }

    #[test]
    fn from_parts_checks_lengths() {
        let mut slots = vec![30, 0, 0, 60];
        slots.extend([0u64; 12]);
        let a = Address::repeat_byte(1);

        let err = DaoConfig::from_parts("G", "G", "", false, &[], &[], &[a], &[], &slots)
            .unwrap_err();
        assert!(matches!(err, DaoError::LengthMismatch { .. }));

        let err = DaoConfig::from_parts("G", "G", "", false, &[a], &[], &[], &[], &slots)
            .unwrap_err();
        assert!(matches!(err, DaoError::LengthMismatch { .. }));

        let err = DaoConfig::from_parts("G", "G", "", false, &[], &[], &[], &[], &slots[..15])
            .unwrap_err();
        assert!(matches!(err, DaoError::Governance(_)));

        let config =
            DaoConfig::from_parts("G", "G", "", true, &[], &[], &[a], &[7], &slots).unwrap();
        assert!(config.paused);
        assert_eq!(config.members[0].shares, 7);
    }
}
