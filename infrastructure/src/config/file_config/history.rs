//! History configuration from TOML (`[history]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHistoryConfig {
    /// Messages listed by `/history` without an explicit count
    pub limit: usize,
    /// Delete server-side history when starting a new session
    pub clear_on_reset: bool,
}

impl Default for FileHistoryConfig {
    fn default() -> Self {
        Self {
            limit: 50,
            clear_on_reset: true,
        }
    }
}
