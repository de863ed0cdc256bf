//! Hashing System - SHA-256 for Token Digests
//!
//! The digest binds a token's serial to its mint time and seeds the
//! decorative layout, so it must be reproducible byte for byte.

use std::fmt;

use async_trait::async_trait;
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::capabilities::{CapabilityError, Digester};

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Digester backed by the `sha2` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digester;

#[async_trait]
impl Digester for Sha256Digester {
    async fn digest(&self, data: &[u8]) -> Result<[u8; 32], CapabilityError> {
        Ok(sha256(data))
    }
}

/// 256-bit token digest. Displays and serializes as 64 lowercase hex chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenDigest([u8; 32]);

impl TokenDigest {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 hex characters, as printed on the token image.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// The first 8 hex characters read as a base-16 integer.
    pub fn prefix_value(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl fmt::Display for TokenDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for TokenDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let data = b"test data";
        let h1 = sha256_hex(data);
        let h2 = sha256_hex(data);
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_prefix_matches_hex_parse() {
        let digest = TokenDigest::from_bytes(sha256(b"abc"));
        assert_eq!(digest.short_hex(), "ba7816bf");
        assert_eq!(digest.prefix_value(), u32::from_str_radix("ba7816bf", 16).unwrap());
        assert_eq!(digest.to_hex().len(), 64);
    }

    #[test]
    fn test_digest_serializes_as_hex() {
        let digest = TokenDigest::from_bytes(sha256(b"abc"));
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", digest.to_hex()));
    }

    #[tokio::test]
    async fn test_sha256_digester_matches_sync_hash() {
        let bytes = Sha256Digester.digest(b"abc").await.unwrap();
        assert_eq!(hex::encode(bytes), sha256_hex(b"abc"));
    }
}
