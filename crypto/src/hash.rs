//! Blake2b-256, the one hash used for addresses and typed-data digests.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    blake2b_256_multi(&[data])
}

/// Hash the concatenation of `parts` without building it.
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    parts
        .iter()
        .fold(Blake2b256::new(), |hasher, part| hasher.chain_update(part))
        .finalize()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_point_does_not_matter() {
        let whole = blake2b_256(b"GuildVote");
        assert_eq!(blake2b_256_multi(&[b"Guild", b"Vote"]), whole);
        assert_eq!(blake2b_256_multi(&[b"", b"GuildVote", b""]), whole);
    }

    #[test]
    fn empty_input_has_a_digest() {
        assert_eq!(blake2b_256(b""), blake2b_256_multi(&[]));
        assert_ne!(blake2b_256(b""), [0u8; 32]);
    }
}
