//! Hash functions for placing keys and virtual nodes on the ring.
//!
//! Placement must agree across processes, so the default hasher is XXH3-64,
//! which is fully specified and independent of platform, process and run.
//! Any other stable function can be plugged in through [`RingHasher`].

use crate::types::Position;
use xxhash_rust::xxh3::xxh3_64;

/// A deterministic 64-bit string hash used for ring placement.
///
/// Implementations must return the same value for the same input for as
/// long as the ring is in use. The ring reduces the result modulo its
/// configured hash-space size.
pub trait RingHasher {
    /// Hash `key` to a 64-bit value.
    fn hash64(&self, key: &str) -> u64;
}

/// XXH3-64 with the default seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Xxh3Hasher;

impl RingHasher for Xxh3Hasher {
    fn hash64(&self, key: &str) -> u64 {
        xxh3_64(key.as_bytes())
    }
}

impl<F> RingHasher for F
where
    F: Fn(&str) -> u64,
{
    fn hash64(&self, key: &str) -> u64 {
        self(key)
    }
}

/// Map `key` to a position in `[0, modulus)`.
///
/// `modulus` must be non-zero; ring configs are validated before use.
pub fn position_of<H: RingHasher + ?Sized>(hasher: &H, key: &str, modulus: u64) -> Position {
    hasher.hash64(key) % modulus
}

/// The string hashed to place replica `replica` of `node`.
pub fn vnode_key(node: &str, replica: u32) -> String {
    format!("{}:{}", node, replica)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xxh3_is_stable() {
        // Reference value of XXH3-64 for the empty input.
        assert_eq!(Xxh3Hasher.hash64(""), 0x2D06_8005_38D3_94C2);
        assert_eq!(Xxh3Hasher.hash64("node1:0"), Xxh3Hasher.hash64("node1:0"));
    }

    #[test]
    fn test_position_in_range() {
        for i in 0..500 {
            let key = format!("key{}", i);
            assert!(position_of(&Xxh3Hasher, &key, 1000) < 1000);
            assert!(position_of(&Xxh3Hasher, &key, 7) < 7);
        }
    }

    #[test]
    fn test_closure_hasher() {
        let hasher = |key: &str| key.len() as u64;
        assert_eq!(position_of(&hasher, "abcd", 1000), 4);
        assert_eq!(position_of(&hasher, "abcd", 3), 1);
    }

    #[test]
    fn test_vnode_key_format() {
        assert_eq!(vnode_key("node1", 0), "node1:0");
        assert_eq!(vnode_key("cache-a.local", 2), "cache-a.local:2");
    }
}
