//! Secure Random Strings
//!
//! Every byte maps to `alphabet[byte % alphabet.len()]`. The slight bias for
//! alphabets that do not divide 256 is accepted; fixtures depend on the exact
//! mapping.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::capabilities::{CapabilityError, SecureRandom};

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl SecureRandom for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<(), CapabilityError> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| CapabilityError::new("secure random", e.to_string()))
    }
}

/// Map raw bytes onto an alphabet.
pub fn map_to_alphabet(bytes: &[u8], alphabet: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| alphabet[*b as usize % alphabet.len()] as char)
        .collect()
}

/// Draw `len` secure bytes and map them onto an ASCII alphabet.
pub fn random_string(
    source: &dyn SecureRandom,
    len: usize,
    alphabet: &[u8],
) -> Result<String, CapabilityError> {
    if alphabet.is_empty() {
        return Err(CapabilityError::new("secure random", "empty alphabet"));
    }
    let mut bytes = vec![0u8; len];
    source.fill(&mut bytes)?;
    Ok(map_to_alphabet(&bytes, alphabet))
}

/// Uniform in [0, 1) from 8 secure bytes (top 53 bits of a big-endian u64).
pub fn unit_interval(source: &dyn SecureRandom) -> Result<f64, CapabilityError> {
    let mut bytes = [0u8; 8];
    source.fill(&mut bytes)?;
    let bits = u64::from_be_bytes(bytes) >> 11;
    Ok(bits as f64 / (1u64 << 53) as f64)
}
