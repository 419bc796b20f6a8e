//! Off-chain signed messages: votes, delegations and permits.
//!
//! Each message is hashed under the DAO's [`TypedDomain`] and signed with
//! Ed25519. The signer's address is derived from the public key shipped with
//! the signature. Every signer has one nonce sequence shared by all three
//! message kinds; a valid signature consumes exactly one nonce.

use crate::error::DaoError;
use guild_crypto::{derive_address, sign_message, typed_digest, verify_signature};
use guild_crypto::{FieldEncoder, TypedDomain, TypedMessage};
use guild_types::{Address, KeyPair, PublicKey, Signature, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Signature version mixed into every domain.
pub const DOMAIN_VERSION: &str = "1";

/// A signature plus the public key it verifies under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    pub public_key: PublicKey,
    pub signature: Signature,
}

impl SignedMessage {
    /// Sign `message` under `domain`.
    pub fn sign<M: TypedMessage>(domain: &TypedDomain, message: &M, keys: &KeyPair) -> Self {
        let digest = typed_digest(domain, message);
        Self {
            public_key: keys.public.clone(),
            signature: sign_message(digest.as_bytes(), &keys.private),
        }
    }

    pub fn signer(&self) -> Address {
        derive_address(&self.public_key)
    }
}

/// A typed message that carries its own replay protection.
pub trait SignedPayload: TypedMessage {
    /// The signer the message claims, if it names one.
    fn claimed_signer(&self) -> Option<Address>;
    fn nonce(&self) -> u64;
    fn expiry(&self) -> Timestamp;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteMessage {
    pub signer: Address,
    pub proposal: u64,
    pub approve: bool,
    pub nonce: u64,
    pub expiry: Timestamp,
}

impl TypedMessage for VoteMessage {
    const TYPE_SIGNATURE: &'static str =
        "SignVote(address signer,uint256 proposal,bool approve,uint256 nonce,uint256 expiry)";

    fn encode_fields(&self, encoder: &mut FieldEncoder) {
        encoder
            .address(&self.signer)
            .u64(self.proposal)
            .bool(self.approve)
            .u64(self.nonce)
            .u64(self.expiry.as_secs());
    }
}

impl SignedPayload for VoteMessage {
    fn claimed_signer(&self) -> Option<Address> {
        Some(self.signer)
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn expiry(&self) -> Timestamp {
        self.expiry
    }
}

/// Delegation by signature; the delegator is whoever signed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationMessage {
    pub delegatee: Address,
    pub nonce: u64,
    pub expiry: Timestamp,
}

impl TypedMessage for DelegationMessage {
    const TYPE_SIGNATURE: &'static str =
        "Delegation(address delegatee,uint256 nonce,uint256 expiry)";

    fn encode_fields(&self, encoder: &mut FieldEncoder) {
        encoder
            .address(&self.delegatee)
            .u64(self.nonce)
            .u64(self.expiry.as_secs());
    }
}

impl SignedPayload for DelegationMessage {
    fn claimed_signer(&self) -> Option<Address> {
        None
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn expiry(&self) -> Timestamp {
        self.expiry
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitMessage {
    pub owner: Address,
    pub spender: Address,
    pub value: u128,
    pub nonce: u64,
    pub deadline: Timestamp,
}

impl TypedMessage for PermitMessage {
    const TYPE_SIGNATURE: &'static str =
        "Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)";

    fn encode_fields(&self, encoder: &mut FieldEncoder) {
        encoder
            .address(&self.owner)
            .address(&self.spender)
            .u128(self.value)
            .u64(self.nonce)
            .u64(self.deadline.as_secs());
    }
}

impl SignedPayload for PermitMessage {
    fn claimed_signer(&self) -> Option<Address> {
        Some(self.owner)
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn expiry(&self) -> Timestamp {
        self.deadline
    }
}

#[derive(Clone, Debug)]
pub struct SignatureVerifier {
    domain: TypedDomain,
    nonces: HashMap<Address, u64>,
}

impl Default for SignatureVerifier {
    fn default() -> Self {
        Self::new(TypedDomain::new("", DOMAIN_VERSION, 0, Address::ZERO))
    }
}

impl SignatureVerifier {
    pub fn new(domain: TypedDomain) -> Self {
        Self {
            domain,
            nonces: HashMap::new(),
        }
    }

    pub fn domain(&self) -> &TypedDomain {
        &self.domain
    }

    /// Next nonce `signer` must use.
    pub fn nonce(&self, signer: &Address) -> u64 {
        self.nonces.get(signer).copied().unwrap_or(0)
    }

    /// Check `message` and its signature without touching any state.
    /// Returns the signer.
    pub fn verify<M: SignedPayload>(
        &self,
        message: &M,
        signed: &SignedMessage,
        now: Timestamp,
    ) -> Result<Address, DaoError> {
        let expiry = message.expiry();
        if now > expiry {
            return Err(DaoError::SignatureExpired { expiry, now });
        }
        let signer = signed.signer();
        if let Some(claimed) = message.claimed_signer() {
            if claimed != signer {
                return Err(DaoError::SignerMismatch {
                    claimed,
                    actual: signer,
                });
            }
        }
        let expected = self.nonce(&signer);
        if message.nonce() != expected {
            return Err(DaoError::InvalidNonce {
                expected,
                got: message.nonce(),
            });
        }
        let digest = typed_digest(&self.domain, message);
        if !verify_signature(digest.as_bytes(), &signed.signature, &signed.public_key) {
            return Err(DaoError::InvalidSignature);
        }
        Ok(signer)
    }

    /// Burn `signer`'s current nonce.
    pub fn consume(&mut self, signer: &Address) {
        *self.nonces.entry(*signer).or_default() += 1;
    }
}
