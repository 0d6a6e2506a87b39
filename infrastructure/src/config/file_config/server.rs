//! Server configuration from TOML (`[server]` section)

use serde::{Deserialize, Serialize};

/// Default relay address: the server's own default host and port.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Raw server configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Base URL of the relay server
    pub base_url: String,
    /// Timeout for single-shot and history requests
    pub request_timeout_secs: u64,
    /// Maximum silence between stream events before the stream is abandoned
    pub stream_idle_timeout_secs: u64,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 120,
            stream_idle_timeout_secs: 60,
        }
    }
}
