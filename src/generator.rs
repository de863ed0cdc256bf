//! Token Generator
//!
//! Produces the fields that make each mint unique. Secure bytes are drawn in
//! a fixed order (token, serial, value, gate code) so a stubbed source yields
//! a fully predictable record.

use serde::Serialize;
use tracing::debug;

use crate::capabilities::{CapabilityError, Clock, Digester, SecureRandom, SystemClock};
use crate::config::TimeZonePolicy;
use crate::hashing::{Sha256Digester, TokenDigest};
use crate::random::{random_string, unit_interval, OsRandom};

pub const TOKEN_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789@#&$";
pub const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const TOKEN_LEN: usize = 20;
pub const SERIAL_LEN: usize = 18;
pub const GATE_CODE_LEN: usize = 4;

pub const MIN_VALUE: f64 = 10.0;
pub const VALUE_SPAN: f64 = 290.0;

/// One mint. Replaced wholesale by the next one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MintRecord {
    pub user_id: String,
    pub user_name: String,
    pub token: String,
    pub serial: String,
    pub value: String,
    pub timestamp: String,
    pub digest: TokenDigest,
    /// Only revealed through the rendered image.
    #[serde(skip)]
    pub gate_code: String,
}

impl MintRecord {
    /// `NFT_<serial>_<timestamp>` with colons made filesystem safe.
    pub fn file_stem(&self) -> String {
        format!("NFT_{}_{}", self.serial, self.timestamp.replace(':', "-"))
    }
}

/// Digest input: `serial || timestamp`, no separator.
pub async fn compute_digest(
    digester: &dyn Digester,
    serial: &str,
    timestamp: &str,
) -> Result<TokenDigest, CapabilityError> {
    let input = format!("{serial}{timestamp}");
    Ok(TokenDigest::from_bytes(digester.digest(input.as_bytes()).await?))
}

pub struct TokenGenerator {
    random: Box<dyn SecureRandom>,
    digester: Box<dyn Digester>,
    clock: Box<dyn Clock>,
    timezone: TimeZonePolicy,
}

impl TokenGenerator {
    pub fn new(
        random: Box<dyn SecureRandom>,
        digester: Box<dyn Digester>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            random,
            digester,
            clock,
            timezone: TimeZonePolicy::Utc,
        }
    }

    /// OS randomness, SHA-256 and the system clock.
    pub fn system() -> Self {
        Self::new(
            Box::new(OsRandom),
            Box::new(Sha256Digester),
            Box::new(SystemClock),
        )
    }

    pub fn with_timezone(mut self, timezone: TimeZonePolicy) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn timezone(&self) -> TimeZonePolicy {
        self.timezone
    }

    pub async fn generate(
        &self,
        user_id: &str,
        user_name: &str,
    ) -> Result<MintRecord, CapabilityError> {
        let random = self.random.as_ref();

        let token = random_string(random, TOKEN_LEN, TOKEN_ALPHABET)?;
        let serial = random_string(random, SERIAL_LEN, ALPHANUMERIC)?;
        let value = format!("{:.2}", MIN_VALUE + unit_interval(random)? * VALUE_SPAN);
        let timestamp = self.timezone.format(self.clock.now());
        let digest = compute_digest(self.digester.as_ref(), &serial, &timestamp).await?;
        // Independent draw: nothing here may depend on the digest.
        let gate_code = random_string(random, GATE_CODE_LEN, ALPHANUMERIC)?;

        debug!(serial = %serial, timestamp = %timestamp, digest = %digest.short_hex(), "token generated");

        Ok(MintRecord {
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            token,
            serial,
            value,
            timestamp,
            digest,
            gate_code,
        })
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::system()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::FixedClock;
    use crate::hashing::sha256_hex;
    use chrono::{TimeZone, Utc};

    struct Zeros;

    impl SecureRandom for Zeros {
        fn fill(&self, buf: &mut [u8]) -> Result<(), CapabilityError> {
            buf.fill(0);
            Ok(())
        }
    }

    fn generator() -> TokenGenerator {
        TokenGenerator::new(
            Box::new(Zeros),
            Box::new(Sha256Digester),
            Box::new(FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())),
        )
    }

    #[test]
    fn test_alphabet_sizes() {
        assert_eq!(TOKEN_ALPHABET.len(), 66);
        assert_eq!(ALPHANUMERIC.len(), 36);
    }

    #[tokio::test]
    async fn test_zero_bytes_record() {
        let record = generator().generate("0xABC", "Alice").await.unwrap();
        assert_eq!(record.token, "A".repeat(20));
        assert_eq!(record.serial, "A".repeat(18));
        assert_eq!(record.value, "10.00");
        assert_eq!(record.gate_code, "AAAA");
        assert_eq!(record.timestamp, "2024-01-01 00:00:00");
        let expected = sha256_hex(format!("{}2024-01-01 00:00:00", "A".repeat(18)).as_bytes());
        assert_eq!(record.digest.to_hex(), expected);
    }

    #[tokio::test]
    async fn test_system_generator_shapes() {
        let record = TokenGenerator::system().generate("w", "n").await.unwrap();
        assert_eq!(record.token.len(), TOKEN_LEN);
        assert_eq!(record.serial.len(), SERIAL_LEN);
        assert_eq!(record.gate_code.len(), GATE_CODE_LEN);
        assert_eq!(record.timestamp.len(), 19);
        assert!(record.serial.bytes().all(|b| ALPHANUMERIC.contains(&b)));
        assert!(record.token.bytes().all(|b| TOKEN_ALPHABET.contains(&b)));
        let value: f64 = record.value.parse().unwrap();
        assert!((10.0..=300.0).contains(&value));
        assert_eq!(record.value.split('.').nth(1).map(str::len), Some(2));
    }

    #[test]
    fn test_file_stem_replaces_colons() {
        let record = MintRecord {
            user_id: "w".into(),
            user_name: "n".into(),
            token: "t".into(),
            serial: "SERIAL".into(),
            value: "10.00".into(),
            timestamp: "2024-01-01 12:34:56".into(),
            digest: TokenDigest::from_bytes([0; 32]),
            gate_code: "ABCD".into(),
        };
        assert_eq!(record.file_stem(), "NFT_SERIAL_2024-01-01 12-34-56");
    }

    #[test]
    fn test_gate_code_not_serialized() {
        let record = MintRecord {
            user_id: "w".into(),
            user_name: "n".into(),
            token: "t".into(),
            serial: "S".into(),
            value: "10.00".into(),
            timestamp: "2024-01-01 00:00:00".into(),
            digest: TokenDigest::from_bytes([0; 32]),
            gate_code: "SECR".into(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("SECR"));
        assert!(json.contains(&"0".repeat(64)));
    }
}
