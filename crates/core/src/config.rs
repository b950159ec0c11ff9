//! The remote configuration document and its startup validation.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default Telegram Bot API base URL.
pub const DEFAULT_TG_API_URL_BASE: &str = "https://api.telegram.org";

/// chrono format of the `MoonPhaseLast` marker, e.g. `2025/Jun/25`.
pub const MARKER_FORMAT: &str = "%Y/%b/%-d";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn default_tg_api_url_base() -> String {
    DEFAULT_TG_API_URL_BASE.to_string()
}

fn scalar_string<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s,
        Scalar::Int(n) => n.to_string(),
    })
}

/// The remote configuration document.
///
/// Keys keep the spelling of the deployed YAML document. Keys this struct
/// does not know about are carried in `extra` so a fetch/replace round trip
/// never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoonConfig {
    #[serde(rename = "DEBUG", default)]
    pub debug: bool,

    /// Loop cadence.
    #[serde(rename = "Interval", with = "crate::duration::serde_go")]
    pub interval: Duration,

    #[serde(rename = "TgApiUrlBase", default = "default_tg_api_url_base")]
    pub tg_api_url_base: String,

    #[serde(rename = "TgToken", default)]
    pub tg_token: String,

    /// Chat id; numeric ids may be written unquoted.
    #[serde(rename = "TgChatId", default, deserialize_with = "scalar_string")]
    pub tg_chat_id: String,

    /// No posting before this UTC hour (0-23).
    #[serde(rename = "PostingStartHour")]
    pub posting_start_hour: i64,

    /// UTC day of the last notification decision, formatted with [`MARKER_FORMAT`].
    /// The key is required; an empty value means nothing was decided yet.
    #[serde(rename = "MoonPhaseLast")]
    pub moon_phase_last: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl MoonConfig {
    /// Decode a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Encode as a YAML document.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Check every field the daemon needs before it starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "Interval",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.tg_token.is_empty() {
            return Err(ConfigError::InvalidField {
                field: "TgToken",
                reason: "must not be empty".to_string(),
            });
        }
        if self.tg_chat_id.is_empty() {
            return Err(ConfigError::InvalidField {
                field: "TgChatId",
                reason: "must not be empty".to_string(),
            });
        }
        if !(0..=23).contains(&self.posting_start_hour) {
            return Err(ConfigError::InvalidField {
                field: "PostingStartHour",
                reason: format!("{} must be between 0 and 23", self.posting_start_hour),
            });
        }
        url::Url::parse(&self.tg_api_url_base).map_err(|e| ConfigError::InvalidField {
            field: "TgApiUrlBase",
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!(
            interval = %crate::duration::format_go_duration(self.interval),
            posting_start_hour = self.posting_start_hour,
            moon_phase_last = %self.moon_phase_last,
            tg_chat_id = %self.tg_chat_id,
            tg_api_url_base = %self.tg_api_url_base,
            debug = self.debug,
            "config loaded"
        );
    }
}
