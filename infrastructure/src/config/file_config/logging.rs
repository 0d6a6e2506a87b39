//! Transcript configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Write a JSONL transcript of the conversation
    pub transcript: bool,
    /// Directory for transcripts (defaults to the platform data dir)
    pub transcript_dir: Option<String>,
}
