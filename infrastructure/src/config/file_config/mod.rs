//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly; conversion into application types happens
//! through [`FileConfig::delivery_params`].

mod delivery;
mod history;
mod logging;
mod output;
mod repl;
mod server;

pub use delivery::FileDeliveryConfig;
pub use history::FileHistoryConfig;
pub use logging::FileLoggingConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use repl::FileReplConfig;
pub use server::{DEFAULT_BASE_URL, FileServerConfig};

use relay_application::DeliveryParams;
use relay_domain::PacingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("server.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("server.base_url must start with http:// or https:// (got {0})")]
    InvalidBaseUrl(String),

    #[error("{0} cannot be 0")]
    Zero(&'static str),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: FileServerConfig,
    pub delivery: FileDeliveryConfig,
    pub history: FileHistoryConfig,
    pub output: FileOutputConfig,
    pub repl: FileReplConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let base_url = self.server.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigValidationError::InvalidBaseUrl(base_url.to_string()));
        }

        let zero_checks = [
            ("server.request_timeout_secs", self.server.request_timeout_secs == 0),
            (
                "server.stream_idle_timeout_secs",
                self.server.stream_idle_timeout_secs == 0,
            ),
            ("delivery.chars_per_second", self.delivery.chars_per_second == 0),
            ("delivery.tick_interval_ms", self.delivery.tick_interval_ms == 0),
            ("delivery.max_render_bytes", self.delivery.max_render_bytes == 0),
            ("history.limit", self.history.limit == 0),
        ];
        if let Some((field, _)) = zero_checks.iter().find(|(_, is_zero)| *is_zero) {
            return Err(ConfigValidationError::Zero(field));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    pub fn stream_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.server.stream_idle_timeout_secs)
    }

    /// Application-level delivery parameters.
    pub fn delivery_params(&self) -> Result<DeliveryParams, ConfigValidationError> {
        let pacing = PacingConfig::new(
            self.delivery.chars_per_second,
            Duration::from_millis(self.delivery.tick_interval_ms),
        )
        .map_err(|_| ConfigValidationError::Zero("delivery pacing"))?;

        Ok(DeliveryParams::default()
            .with_streaming(self.delivery.streaming)
            .with_pacing(pacing)
            .with_history_limit(self.history.limit)
            .with_clear_history_on_reset(self.history.clear_on_reset))
    }
}
