//! Content-addressed hashing for index artifacts.
//!
//! Cache keys, archive checksums, and provider file names are all SHA-256
//! hex digests of the exact bytes involved.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// A SHA-256 content digest in lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Compute the digest of raw bytes.
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentDigest(hex_encode(&hasher.finalize()))
    }

    /// Compute the digest of a value's canonical JSON serialization.
    ///
    /// Callers pass plain-data configuration or metadata structs; these
    /// serialize infallibly.
    pub fn of_value<T: Serialize>(value: &T) -> Self {
        let json = serde_json::to_vec(value).expect("serialization should not fail");
        Self::of_bytes(&json)
    }

    /// Get the hex string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that the given data matches this digest.
    pub fn verify(&self, data: &[u8]) -> bool {
        ContentDigest::of_bytes(data) == *self
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encode bytes as lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_deterministic() {
        let d1 = ContentDigest::of_bytes(b"hello world");
        let d2 = ContentDigest::of_bytes(b"hello world");
        assert_eq!(d1, d2);
    }

    #[test]
    fn digest_differs_for_different_data() {
        assert_ne!(
            ContentDigest::of_bytes(b"hello"),
            ContentDigest::of_bytes(b"world")
        );
    }

    #[test]
    fn digest_verify() {
        let digest = ContentDigest::of_bytes(b"test data");
        assert!(digest.verify(b"test data"));
        assert!(!digest.verify(b"tampered data"));
    }

    #[test]
    fn empty_input_digest() {
        // SHA-256 of empty input is well-known
        assert_eq!(
            ContentDigest::of_bytes(b"").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn value_digest_matches_json_bytes() {
        let value = vec!["a", "b"];
        let json = serde_json::to_vec(&value).unwrap();
        assert_eq!(ContentDigest::of_value(&value), ContentDigest::of_bytes(&json));
    }

    #[test]
    fn display_is_hex() {
        let s = format!("{}", ContentDigest::of_bytes(b"x"));
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
