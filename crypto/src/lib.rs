//! Cryptographic primitives for the guild DAO.
//!
//! - **Ed25519** for signing and verifying off-chain messages
//! - **Blake2b-256** for hashing
//! - Address derivation from public keys
//! - Domain-separated structured-data digests (name, version, chain id,
//!   verifying contract) so a signature is valid for exactly one DAO

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;
pub mod typed;

pub use address::derive_address;
pub use hash::{blake2b_256, blake2b_256_multi};
pub use keys::keypair_from_seed;
pub use sign::{sign_message, verify_signature};
pub use typed::{typed_digest, FieldEncoder, TypedDomain, TypedMessage};
