//! Delivery configuration from TOML (`[delivery]` section)

use serde::{Deserialize, Serialize};

/// Raw delivery configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDeliveryConfig {
    /// Use the fragment stream (falls back to single-shot on failure)
    pub streaming: bool,
    /// Reveal rate
    pub chars_per_second: u32,
    /// Pacing tick period in milliseconds
    pub tick_interval_ms: u64,
    /// Inputs larger than this are shown as plain text
    pub max_render_bytes: usize,
}

impl Default for FileDeliveryConfig {
    fn default() -> Self {
        Self {
            streaming: true,
            chars_per_second: 200,
            tick_interval_ms: 20,
            max_render_bytes: 256 * 1024,
        }
    }
}
