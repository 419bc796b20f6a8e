//! Address derivation from public keys.
//!
//! Address = the last 20 bytes of Blake2b-256(public_key). Signed-message
//! entry points recompute this from the public key carried with the
//! signature and compare it with the claimed signer.

use guild_types::{Address, PublicKey};

/// Derive the account address controlled by a public key.
pub fn derive_address(public_key: &PublicKey) -> Address {
    let hash = crate::blake2b_256(public_key.as_bytes());
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address::new(bytes)
}
