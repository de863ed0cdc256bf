//! Widget Options - Documented Defaults
//!
//! Caller options are all optional and merge over the defaults below.

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_WIDTH: &str = "400px";
pub const DEFAULT_PRIMARY_COLOR: &str = "#00ffcc";
pub const DEFAULT_MINT_DELAY_MS: u64 = 2000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read options: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid options: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Zone used for the mint timestamp. It feeds the digest, so it changes the
/// rendered glyphs as well as the printed time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeZonePolicy {
    #[default]
    Utc,
    Local,
}

impl TimeZonePolicy {
    /// `YYYY-MM-DD HH:MM:SS`, truncated to the second.
    pub fn format(&self, at: DateTime<Utc>) -> String {
        const LAYOUT: &str = "%Y-%m-%d %H:%M:%S";
        match self {
            TimeZonePolicy::Utc => at.format(LAYOUT).to_string(),
            TimeZonePolicy::Local => at.with_timezone(&Local).format(LAYOUT).to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_wallet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_name: Option<String>,
    /// CSS length for the widget's max width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    /// CSS colour for controls and the gradient start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mint_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<TimeZonePolicy>,
}

impl Options {
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Options set here win over `self`.
    pub fn merged_with(self, other: Options) -> Options {
        Options {
            default_wallet: other.default_wallet.or(self.default_wallet),
            default_name: other.default_name.or(self.default_name),
            width: other.width.or(self.width),
            primary_color: other.primary_color.or(self.primary_color),
            mint_delay_ms: other.mint_delay_ms.or(self.mint_delay_ms),
            timezone: other.timezone.or(self.timezone),
        }
    }

    pub fn resolve(self) -> Settings {
        Settings {
            default_wallet: self.default_wallet.unwrap_or_default(),
            default_name: self.default_name.unwrap_or_default(),
            width: self.width.unwrap_or_else(|| DEFAULT_WIDTH.to_string()),
            primary_color: self
                .primary_color
                .unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.to_string()),
            mint_delay: Duration::from_millis(self.mint_delay_ms.unwrap_or(DEFAULT_MINT_DELAY_MS)),
            timezone: self.timezone.unwrap_or_default(),
        }
    }
}

/// Options with every default applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub default_wallet: String,
    pub default_name: String,
    pub width: String,
    pub primary_color: String,
    pub mint_delay: Duration,
    pub timezone: TimeZonePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Options::default().resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.default_wallet, "");
        assert_eq!(settings.default_name, "");
        assert_eq!(settings.width, "400px");
        assert_eq!(settings.primary_color, "#00ffcc");
        assert_eq!(settings.mint_delay, Duration::from_millis(2000));
        assert_eq!(settings.timezone, TimeZonePolicy::Utc);
    }

    #[test]
    fn test_partial_options_merge_over_defaults() {
        let options: Options =
            serde_json::from_str(r##"{"primaryColor": "#123456", "mintDelayMs": 0}"##).unwrap();
        let settings = options.resolve();
        assert_eq!(settings.primary_color, "#123456");
        assert_eq!(settings.mint_delay, Duration::ZERO);
        assert_eq!(settings.width, "400px");
    }

    #[test]
    fn test_merged_with_prefers_override() {
        let base = Options {
            default_name: Some("Alice".into()),
            width: Some("300px".into()),
            ..Default::default()
        };
        let merged = base.merged_with(Options {
            width: Some("500px".into()),
            ..Default::default()
        });
        assert_eq!(merged.default_name.as_deref(), Some("Alice"));
        assert_eq!(merged.width.as_deref(), Some("500px"));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"defaultWallet": "0xABC", "timezone": "utc"}}"#).unwrap();
        let options = Options::load_from_path(file.path()).unwrap();
        assert_eq!(options.default_wallet.as_deref(), Some("0xABC"));
        assert_eq!(options.timezone, Some(TimeZonePolicy::Utc));
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            Options::load_from_path(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_utc_timestamp_layout() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::milliseconds(987);
        assert_eq!(TimeZonePolicy::Utc.format(at), "2024-01-01 00:00:00");
    }
}
