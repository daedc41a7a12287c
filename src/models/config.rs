use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application configuration from `settings-core.yaml`.
///
/// Every field has a default, so a partial file (or no file at all) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the persisted settings and credentials
    pub data_dir: Utf8PathBuf,

    pub logging: LoggingConfig,

    pub session: SessionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: Utf8PathBuf::from("data"),
            logging: LoggingConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: Utf8PathBuf,
    pub log_prefix: String,
    pub debug_mode: bool,
    pub console_output: bool,

    /// Write the main log file as JSON lines instead of plain text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: Utf8PathBuf::from("logs"),
            log_prefix: "idler-settings".to_string(),
            debug_mode: false,
            console_output: false,
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Upper bound on a single validator call
    pub validation_timeout_secs: u64,

    /// How long a failed submission keeps the error message visible
    pub error_display_ms: u64,
}

impl SessionConfig {
    pub fn validation_timeout(&self) -> Duration {
        Duration::from_secs(self.validation_timeout_secs)
    }

    pub fn error_display(&self) -> Duration {
        Duration::from_millis(self.error_display_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            validation_timeout_secs: 30,
            error_display_ms: 4000,
        }
    }
}
