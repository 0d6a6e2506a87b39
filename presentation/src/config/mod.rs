//! Presentation-level configuration
//!
//! Configuration for answer rendering and REPL behavior.

use crate::cli::commands::OutputFormat;
use std::path::PathBuf;

/// Output configuration for the presentation layer
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Larger answers are shown as plain text instead of markdown
    pub max_render_bytes: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Terminal,
            color: true,
            max_render_bytes: 256 * 1024,
        }
    }
}

/// REPL configuration for the presentation layer
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Show the working indicator while waiting for the first fragment
    pub show_progress: bool,
    /// Path to line-editor history file; `None` keeps history in memory
    pub history_file: Option<PathBuf>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: dirs::data_dir().map(|p| p.join("chat-relay").join("history.txt")),
        }
    }
}
