//! Host Capabilities - Secure Randomness, Digests, Time
//!
//! The generator never reaches for these directly. Each one is injected so a
//! mint can be replayed against fixed bytes and a fixed clock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{capability} unavailable: {reason}")]
pub struct CapabilityError {
    pub capability: &'static str,
    pub reason: String,
}

impl CapabilityError {
    pub fn new(capability: &'static str, reason: impl Into<String>) -> Self {
        Self {
            capability,
            reason: reason.into(),
        }
    }
}

/// Cryptographically secure byte source.
///
/// Implementations must fail rather than fall back to a weaker generator.
pub trait SecureRandom: Send + Sync {
    fn fill(&self, buf: &mut [u8]) -> Result<(), CapabilityError>;
}

/// 256-bit digest over a byte string. Asynchronous, like the browser's
/// `SubtleCrypto.digest`.
#[async_trait]
pub trait Digester: Send + Sync {
    async fn digest(&self, data: &[u8]) -> Result<[u8; 32], CapabilityError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_is_stable() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock(at);
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now(), at);
    }

    #[test]
    fn test_capability_error_message() {
        let err = CapabilityError::new("secure random", "no entropy");
        assert_eq!(err.to_string(), "secure random unavailable: no entropy");
    }
}
