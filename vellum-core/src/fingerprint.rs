//! Content fingerprinting for redundant-write detection.
//!
//! The fingerprint is a cheap 64-bit FNV-1a digest over the document fields.
//! It exists solely so the autosave path can skip a commit when nothing
//! changed; it is not an integrity or security mechanism, and collisions are
//! tolerable (a collision only costs one skipped write).

use std::fmt;

use serde::{Deserialize, Serialize};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// A deterministic digest of `text + title + author`.
///
/// Equal documents always produce equal fingerprints. Field boundaries are
/// mixed in, so `("ab", "c")` and `("a", "bc")` digest differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Digest the three document fields.
    pub fn of(text: &str, title: &str, author: &str) -> Self {
        let mut hash = FNV_OFFSET;
        for field in [text, title, author] {
            for byte in field.as_bytes() {
                hash ^= u64::from(*byte);
                hash = hash.wrapping_mul(FNV_PRIME);
            }
            // Separate fields by their length so boundaries matter.
            hash ^= field.len() as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        Self(hash)
    }

    /// Parse the fixed-width hex form produced by `Display`.
    pub fn parse(s: &str) -> Option<Self> {
        u64::from_str_radix(s, 16).ok().map(Self)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = Fingerprint::of("body", "title", "author");
        let b = Fingerprint::of("body", "title", "author");
        assert_eq!(a, b);
    }

    #[test]
    fn sensitive_to_each_field() {
        let base = Fingerprint::of("body", "title", "author");
        assert_ne!(base, Fingerprint::of("body!", "title", "author"));
        assert_ne!(base, Fingerprint::of("body", "title!", "author"));
        assert_ne!(base, Fingerprint::of("body", "title", "author!"));
    }

    #[test]
    fn field_boundaries_matter() {
        assert_ne!(
            Fingerprint::of("ab", "c", ""),
            Fingerprint::of("a", "bc", "")
        );
    }

    #[test]
    fn hex_roundtrip() {
        let fp = Fingerprint::of("some text", "t", "a");
        let hex = fp.to_string();
        assert_eq!(hex.len(), 16);
        assert_eq!(Fingerprint::parse(&hex), Some(fp));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Fingerprint::parse("not hex"), None);
    }
}
