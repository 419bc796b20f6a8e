//! Fundamental types for the guild DAO.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account addresses, share-amount constants, timestamps and the ledger clock,
//! 32-byte digests, and Ed25519 key material.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod keys;
pub mod time;

pub use address::Address;
pub use amount::{whole_shares, MAX_SUPPLY, SHARE_UNIT};
pub use error::{ErrorKind, TypesError};
pub use hash::Hash256;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use time::{Clock, Timestamp};
