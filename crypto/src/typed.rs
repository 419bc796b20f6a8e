//! Domain-separated structured-data digests.
//!
//! A signed message is bound to one DAO instance by hashing it together with
//! a domain separator built from `(name, version, chain_id, verifying_contract)`:
//!
//! ```text
//! digest = H(0x19 0x01 ‖ domain_separator ‖ H(type_hash ‖ encoded_fields))
//! ```
//!
//! where `H` is Blake2b-256 and `type_hash = H(type_signature)`. Every field is
//! encoded into a fixed 32-byte word so two different messages can never
//! share an encoding.

use crate::hash::{blake2b_256, blake2b_256_multi};
use guild_types::{Address, Hash256};

const DOMAIN_TYPE: &str =
    "GuildDomain(string name,string version,uint256 chainId,address verifyingContract)";

/// The signing domain of one DAO instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl TypedDomain {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract,
        }
    }

    /// The domain separator mixed into every digest.
    pub fn separator(&self) -> Hash256 {
        let mut fields = FieldEncoder::new();
        fields
            .string(&self.name)
            .string(&self.version)
            .u64(self.chain_id)
            .address(&self.verifying_contract);
        Hash256::new(blake2b_256_multi(&[
            &blake2b_256(DOMAIN_TYPE.as_bytes()),
            fields.as_bytes(),
        ]))
    }
}

/// A message kind that can be signed under a [`TypedDomain`].
pub trait TypedMessage {
    /// Canonical type signature, e.g. `"Delegation(address delegatee,uint256 nonce,uint256 expiry)"`.
    const TYPE_SIGNATURE: &'static str;

    /// Append this message's fields in declaration order.
    fn encode_fields(&self, encoder: &mut FieldEncoder);

    fn struct_hash(&self) -> Hash256 {
        let mut encoder = FieldEncoder::new();
        self.encode_fields(&mut encoder);
        Hash256::new(blake2b_256_multi(&[
            &blake2b_256(Self::TYPE_SIGNATURE.as_bytes()),
            encoder.as_bytes(),
        ]))
    }
}

/// The digest a signer signs for `message` under `domain`.
pub fn typed_digest<M: TypedMessage>(domain: &TypedDomain, message: &M) -> Hash256 {
    Hash256::new(blake2b_256_multi(&[
        b"\x19\x01",
        domain.separator().as_bytes(),
        message.struct_hash().as_bytes(),
    ]))
}

/// Fixed-width (32-byte word) field encoder.
#[derive(Default)]
pub struct FieldEncoder {
    buf: Vec<u8>,
}

impl FieldEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(&mut self, address: &Address) -> &mut Self {
        self.buf.extend_from_slice(&[0u8; 12]);
        self.buf.extend_from_slice(address.as_bytes());
        self
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.u128(value as u128)
    }

    pub fn u128(&mut self, value: u128) -> &mut Self {
        self.buf.extend_from_slice(&[0u8; 16]);
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.u128(value as u128)
    }

    /// Strings are encoded by their hash.
    pub fn string(&mut self, value: &str) -> &mut Self {
        self.buf.extend_from_slice(&blake2b_256(value.as_bytes()));
        self
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping {
        to: Address,
        nonce: u128,
    }

    impl TypedMessage for Ping {
        const TYPE_SIGNATURE: &'static str = "Ping(address to,uint256 nonce)";

        fn encode_fields(&self, encoder: &mut FieldEncoder) {
            encoder.address(&self.to).u128(self.nonce);
        }
    }

    fn domain() -> TypedDomain {
        TypedDomain::new("GUILD", "1", 31337, Address::repeat_byte(0xda))
    }

    #[test]
    fn fields_are_word_aligned() {
        let mut enc = FieldEncoder::new();
        enc.address(&Address::repeat_byte(1)).u64(7).bool(true).string("x");
        assert_eq!(enc.as_bytes().len(), 4 * 32);
    }

    #[test]
    fn digest_changes_with_chain_id() {
        let msg = Ping { to: Address::repeat_byte(1), nonce: 0 };
        let mut other = domain();
        other.chain_id = 1;
        assert_ne!(typed_digest(&domain(), &msg), typed_digest(&other, &msg));
    }

    #[test]
    fn digest_changes_with_verifying_contract() {
        let msg = Ping { to: Address::repeat_byte(1), nonce: 0 };
        let mut other = domain();
        other.verifying_contract = Address::repeat_byte(0xdb);
        assert_ne!(typed_digest(&domain(), &msg), typed_digest(&other, &msg));
    }

    #[test]
    fn digest_changes_with_fields() {
        let a = Ping { to: Address::repeat_byte(1), nonce: 0 };
        let b = Ping { to: Address::repeat_byte(1), nonce: 1 };
        assert_ne!(typed_digest(&domain(), &a), typed_digest(&domain(), &b));
    }

    #[test]
    fn digest_is_deterministic() {
        let msg = Ping { to: Address::repeat_byte(2), nonce: 9 };
        assert_eq!(typed_digest(&domain(), &msg), typed_digest(&domain(), &msg));
    }
}
