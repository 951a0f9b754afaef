//! DJB2 fingerprint hash, used by `irc-session`'s hash indexes. Grounded in
//! `libs/src/hash_table.c`'s `djb2_hash`: seed 5381, `hash = hash * 33 + byte`.

use std::hash::Hasher;

pub type Djb2Hash = std::hash::BuildHasherDefault<Djb2Hasher>;

/// A `std::hash::Hasher` implementation of the DJB2 string hash. Only `write`/`write_u8` are
/// meaningful here; the rest of the `Hasher` default methods delegate to `write`.
pub struct Djb2Hasher(u64);

impl Default for Djb2Hasher {
    fn default() -> Self {
        Djb2Hasher(5381)
    }
}

impl Hasher for Djb2Hasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 = self.0.wrapping_mul(33).wrapping_add(u64::from(byte));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_djb2() {
        fn djb2(s: &str) -> u64 {
            let mut hash: u64 = 5381;
            for byte in s.bytes() {
                hash = hash.wrapping_mul(33).wrapping_add(u64::from(byte));
            }
            hash
        }

        let mut h = Djb2Hasher::default();
        h.write(b"john");
        assert_eq!(h.finish(), djb2("john"));
    }

    #[test]
    fn empty_input_is_seed() {
        let h = Djb2Hasher::default();
        assert_eq!(h.finish(), 5381);
    }
}
