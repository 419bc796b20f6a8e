//! Deterministic Ed25519 key derivation.

use ed25519_dalek::SigningKey;
use guild_types::{KeyPair, PrivateKey, PublicKey};

/// Derive a key pair from a 32-byte seed.
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let signing_key = SigningKey::from_bytes(seed);
    KeyPair {
        public: PublicKey(signing_key.verifying_key().to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}
