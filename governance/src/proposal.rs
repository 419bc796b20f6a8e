//! Proposals: categories, typed actions, and the lifecycle record.

use crate::error::GovernanceError;
use crate::settings::{check_grace_period, check_quorum, check_supermajority, check_voting_period};
use crate::tally::VoteType;
use guild_types::{Address, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Number of proposal categories.
pub const CATEGORY_COUNT: usize = 12;

/// The closed set of things a proposal can do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalCategory {
    Mint = 0,
    Burn = 1,
    Call = 2,
    VotingPeriod = 3,
    GracePeriod = 4,
    Quorum = 5,
    Supermajority = 6,
    Type = 7,
    Pause = 8,
    Extension = 9,
    Escape = 10,
    Docs = 11,
}

impl ProposalCategory {
    pub const ALL: [ProposalCategory; CATEGORY_COUNT] = [
        Self::Mint,
        Self::Burn,
        Self::Call,
        Self::VotingPeriod,
        Self::GracePeriod,
        Self::Quorum,
        Self::Supermajority,
        Self::Type,
        Self::Pause,
        Self::Extension,
        Self::Escape,
        Self::Docs,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Mint => "mint",
            Self::Burn => "burn",
            Self::Call => "call",
            Self::VotingPeriod => "voting_period",
            Self::GracePeriod => "grace_period",
            Self::Quorum => "quorum",
            Self::Supermajority => "supermajority",
            Self::Type => "type",
            Self::Pause => "pause",
            Self::Extension => "extension",
            Self::Escape => "escape",
            Self::Docs => "docs",
        }
    }
}

impl TryFrom<u128> for ProposalCategory {
    type Error = GovernanceError;

    fn try_from(raw: u128) -> Result<Self, Self::Error> {
        usize::try_from(raw)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(GovernanceError::UnknownCategory(raw))
    }
}

impl TryFrom<u8> for ProposalCategory {
    type Error = GovernanceError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::try_from(u128::from(raw))
    }
}

impl fmt::Display for ProposalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// One external call of a `Call` proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEntry {
    pub target: Address,
    pub value: u128,
    pub payload: Vec<u8>,
}

/// One whitelist entry of an `Extension` proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionEntry {
    pub target: Address,
    /// Flip the whitelist bit for `target`.
    pub toggle: bool,
    /// Setup data handed to the extension; empty means no hook call.
    pub payload: Vec<u8>,
}

/// A validated proposal effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalAction {
    Mint(Vec<(Address, u128)>),
    Burn(Vec<(Address, u128)>),
    Call(Vec<CallEntry>),
    VotingPeriod(u64),
    GracePeriod(u64),
    Quorum(u8),
    Supermajority(u8),
    VoteType {
        category: ProposalCategory,
        vote_type: VoteType,
    },
    Pause,
    Extension(Vec<ExtensionEntry>),
    Escape(u64),
    Docs,
}

/// The raw arguments of `propose`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub description: String,
    pub targets: Vec<Address>,
    pub values: Vec<u128>,
    pub payloads: Vec<Vec<u8>>,
}

impl ProposalDraft {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Append one `(target, value, payload)` entry.
    pub fn entry(mut self, target: Address, value: u128, payload: Vec<u8>) -> Self {
        self.targets.push(target);
        self.values.push(value);
        self.payloads.push(payload);
        self
    }
}

impl ProposalAction {
    /// Build the typed action for `category` from the parallel arrays,
    /// enforcing array parity and the category's parameter bounds.
    pub fn from_draft(
        category: ProposalCategory,
        draft: &ProposalDraft,
    ) -> Result<Self, GovernanceError> {
        let (targets, values, payloads) = (&draft.targets, &draft.values, &draft.payloads);
        if category == ProposalCategory::Docs {
            if !(targets.is_empty() && values.is_empty() && payloads.is_empty()) {
                return Err(malformed(category, "docs proposals take no entries"));
            }
            return Ok(Self::Docs);
        }
        if targets.len() != values.len() || values.len() != payloads.len() {
            return Err(GovernanceError::ArrayLengthMismatch {
                targets: targets.len(),
                values: values.len(),
                payloads: payloads.len(),
            });
        }

        let first = || {
            values
                .first()
                .copied()
                .ok_or_else(|| malformed(category, "expected a value"))
        };

        let action = match category {
            ProposalCategory::Mint => Self::Mint(pairs(targets, values)),
            ProposalCategory::Burn => Self::Burn(pairs(targets, values)),
            ProposalCategory::Call => Self::Call(
                targets
                    .iter()
                    .zip(values)
                    .zip(payloads)
                    .map(|((target, value), payload)| CallEntry {
                        target: *target,
                        value: *value,
                        payload: payload.clone(),
                    })
                    .collect(),
            ),
            ProposalCategory::VotingPeriod => Self::VotingPeriod(check_voting_period(first()?)?),
            ProposalCategory::GracePeriod => Self::GracePeriod(check_grace_period(first()?)?),
            ProposalCategory::Quorum => Self::Quorum(check_quorum(first()?)?),
            ProposalCategory::Supermajority => {
                Self::Supermajority(check_supermajority(first()?)?)
            }
            ProposalCategory::Type => {
                if values.len() != 2 {
                    return Err(malformed(
                        category,
                        "expected exactly [category, vote type]",
                    ));
                }
                Self::VoteType {
                    category: ProposalCategory::try_from(values[0])?,
                    vote_type: VoteType::try_from(values[1])?,
                }
            }
            ProposalCategory::Pause => Self::Pause,
            ProposalCategory::Extension => Self::Extension(
                targets
                    .iter()
                    .zip(values)
                    .zip(payloads)
                    .map(|((target, value), payload)| ExtensionEntry {
                        target: *target,
                        toggle: *value != 0,
                        payload: payload.clone(),
                    })
                    .collect(),
            ),
            ProposalCategory::Escape => {
                let target = u64::try_from(first()?)
                    .map_err(|_| malformed(category, "target id out of range"))?;
                Self::Escape(target)
            }
            ProposalCategory::Docs => Self::Docs,
        };
        Ok(action)
    }

    pub fn category(&self) -> ProposalCategory {
        match self {
            Self::Mint(_) => ProposalCategory::Mint,
            Self::Burn(_) => ProposalCategory::Burn,
            Self::Call(_) => ProposalCategory::Call,
            Self::VotingPeriod(_) => ProposalCategory::VotingPeriod,
            Self::GracePeriod(_) => ProposalCategory::GracePeriod,
            Self::Quorum(_) => ProposalCategory::Quorum,
            Self::Supermajority(_) => ProposalCategory::Supermajority,
            Self::VoteType { .. } => ProposalCategory::Type,
            Self::Pause => ProposalCategory::Pause,
            Self::Extension(_) => ProposalCategory::Extension,
            Self::Escape(_) => ProposalCategory::Escape,
            Self::Docs => ProposalCategory::Docs,
        }
    }
}

fn pairs(targets: &[Address], values: &[u128]) -> Vec<(Address, u128)> {
    targets.iter().copied().zip(values.iter().copied()).collect()
}

fn malformed(category: ProposalCategory, reason: &str) -> GovernanceError {
    GovernanceError::MalformedAction {
        category: category.name(),
        reason: reason.to_string(),
    }
}

/// Where a proposal is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Created, awaiting a sponsor.
    Draft,
    /// Sponsored; the voting clock is running.
    VotingOpen,
    /// Terminal: outcome recorded.
    Processed { passed: bool },
    /// Terminal: withdrawn by its proposer before sponsorship.
    Cancelled,
}

impl ProposalStatus {
    /// Still waiting to be processed.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Draft | Self::VotingOpen)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub id: u64,
    pub action: ProposalAction,
    pub description: String,
    pub proposer: Address,
    pub sponsor: Option<Address>,
    pub creation_time: Timestamp,
    /// Snapshot instant for voting power; set when sponsored.
    pub voting_starts: Option<Timestamp>,
    pub voting_ends: Option<Timestamp>,
    pub yes_votes: u128,
    pub no_votes: u128,
    pub voters: BTreeSet<Address>,
    pub status: ProposalStatus,
}

impl Proposal {
    pub fn category(&self) -> ProposalCategory {
        self.action.category()
    }

    pub fn has_voted(&self, account: &Address) -> bool {
        self.voters.contains(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::repeat_byte(b)
    }

    #[test]
    fn category_tags_are_closed() {
        for (i, c) in ProposalCategory::ALL.iter().enumerate() {
            assert_eq!(ProposalCategory::try_from(i as u8).unwrap(), *c);
            assert_eq!(c.index(), i);
        }
        assert_eq!(
            ProposalCategory::try_from(12u8),
            Err(GovernanceError::UnknownCategory(12))
        );
    }

    #[test]
    fn mismatched_arrays_are_rejected() {
        let mut draft = ProposalDraft::new("mint").entry(addr(1), 5, vec![]);
        draft.values.push(6);
        assert!(matches!(
            ProposalAction::from_draft(ProposalCategory::Mint, &draft),
            Err(GovernanceError::ArrayLengthMismatch {
                targets: 1,
                values: 2,
                payloads: 1
            })
        ));
    }

    #[test]
    fn docs_requires_empty_arrays() {
        let empty = ProposalDraft::new("new docs");
        assert_eq!(
            ProposalAction::from_draft(ProposalCategory::Docs, &empty).unwrap(),
            ProposalAction::Docs
        );
        let with_entry = empty.entry(addr(1), 0, vec![]);
        assert!(ProposalAction::from_draft(ProposalCategory::Docs, &with_entry).is_err());
    }

    #[test]
    fn parameter_bounds() {
        let quorum = |v| {
            ProposalAction::from_draft(
                ProposalCategory::Quorum,
                &ProposalDraft::new("q").entry(addr(0), v, vec![]),
            )
        };
        assert_eq!(quorum(100).unwrap(), ProposalAction::Quorum(100));
        assert_eq!(quorum(101), Err(GovernanceError::InvalidQuorum(101)));

        let period = |v| {
            ProposalAction::from_draft(
                ProposalCategory::VotingPeriod,
                &ProposalDraft::new("vp").entry(addr(0), v, vec![]),
            )
        };
        assert!(period(0).is_err());
        assert!(period(31_536_000).is_ok());
        assert!(period(31_536_001).is_err());

        let sm = |v| {
            ProposalAction::from_draft(
                ProposalCategory::Supermajority,
                &ProposalDraft::new("sm").entry(addr(0), v, vec![]),
            )
        };
        assert!(sm(51).is_err());
        assert!(sm(52).is_ok());
        assert!(sm(101).is_err());
    }

    #[test]
    fn setting_proposals_need_a_value() {
        let err = ProposalAction::from_draft(ProposalCategory::GracePeriod, &ProposalDraft::new(""))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::MalformedAction { .. }));
    }

    #[test]
    fn vote_type_proposal_shape() {
        let draft = ProposalDraft::new("t")
            .entry(addr(0), 2, vec![])
            .entry(addr(0), 3, vec![]);
        assert_eq!(
            ProposalAction::from_draft(ProposalCategory::Type, &draft).unwrap(),
            ProposalAction::VoteType {
                category: ProposalCategory::Call,
                vote_type: VoteType::SupermajorityQuorum,
            }
        );

        let bad_category = ProposalDraft::new("t")
            .entry(addr(0), 12, vec![])
            .entry(addr(0), 0, vec![]);
        assert_eq!(
            ProposalAction::from_draft(ProposalCategory::Type, &bad_category),
            Err(GovernanceError::UnknownCategory(12))
        );

        let bad_type = ProposalDraft::new("t")
            .entry(addr(0), 0, vec![])
            .entry(addr(0), 4, vec![]);
        assert_eq!(
            ProposalAction::from_draft(ProposalCategory::Type, &bad_type),
            Err(GovernanceError::UnknownVoteType(4))
        );

        let too_short = ProposalDraft::new("t").entry(addr(0), 0, vec![]);
        assert!(ProposalAction::from_draft(ProposalCategory::Type, &too_short).is_err());
    }

    #[test]
    fn extension_entries_toggle_on_nonzero_value() {
        let draft = ProposalDraft::new("ext")
            .entry(addr(1), 1, vec![0xaa])
            .entry(addr(2), 0, vec![]);
        let ProposalAction::Extension(entries) =
            ProposalAction::from_draft(ProposalCategory::Extension, &draft).unwrap()
        else {
            panic!("expected extension action");
        };
        assert!(entries[0].toggle);
        assert_eq!(entries[0].payload, vec![0xaa]);
        assert!(!entries[1].toggle);
    }
}
