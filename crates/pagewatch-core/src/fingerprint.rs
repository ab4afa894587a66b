//! Content fingerprints
//!
//! A [`Fingerprint`] is the lowercase hex SHA-256 digest of an extracted
//! region. Fingerprints are compared by equality only.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Opaque fixed-length digest of a piece of content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a piece of text
    pub fn of(content: &str) -> Self {
        Self(hex::encode(Sha256::digest(content.as_bytes())))
    }

    /// The hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint a piece of text
///
/// Pure: the same input always produces the same fingerprint.
pub fn fingerprint(content: &str) -> Fingerprint {
    Fingerprint::of(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let content = "<!-- Header / End -->A<!-- Footer -->";
        assert_eq!(fingerprint(content), fingerprint(content));
    }

    #[test]
    fn test_sensitive_to_single_byte() {
        assert_ne!(fingerprint("price: 10"), fingerprint("price: 11"));
        assert_ne!(fingerprint("A"), fingerprint("A "));
    }

    #[test]
    fn test_fixed_length_hex() {
        let long = "x".repeat(10_000);
        for input in ["", "a", long.as_str()] {
            let fp = fingerprint(input);
            assert_eq!(fp.as_str().len(), 64);
            assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_empty_region_known_digest() {
        assert_eq!(
            fingerprint("").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_display_matches_digest() {
        let fp = Fingerprint::of("hello");
        assert_eq!(fp.to_string(), fp.as_str());
    }
}
