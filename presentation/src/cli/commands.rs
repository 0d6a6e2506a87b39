//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// How answers are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Styled markdown for an ANSI terminal
    Terminal,
    /// HTML fragment
    Html,
    /// Sanitized text without formatting
    Plain,
}

/// CLI arguments for chat-relay
#[derive(Parser, Debug)]
#[command(name = "chat-relay")]
#[command(author, version, about = "Terminal client for a streaming chat relay")]
#[command(long_about = r#"
chat-relay sends questions to a chat relay server and shows the answer as it
arrives, revealed at a steady pace and re-rendered as markdown on every step.
When the server cannot stream, the client falls back to a single request.

Configuration files are loaded from (in priority order):
1. --config <path>                        Explicit config file
2. ./chat-relay.toml or ./.chat-relay.toml Project-level config
3. ~/.config/chat-relay/config.toml       Global config
Environment variables prefixed with CHAT_RELAY_ override all files
(e.g. CHAT_RELAY_SERVER__BASE_URL).

Example:
  chat-relay "What's the best way to handle errors in Rust?"
  chat-relay --format html "Summarize the release notes" > answer.html
  chat-relay --chat --server http://relay.internal:8000
"#)]
pub struct Cli {
    /// The question to ask (not required in chat mode)
    pub question: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Relay server base URL (overrides server.base_url)
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// Output format (overrides output.format)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Always use a single request instead of streaming
    #[arg(long)]
    pub no_stream: bool,

    /// Reveal rate in characters per second
    #[arg(long, value_name = "N")]
    pub cps: Option<u32>,

    /// Reveal tick interval in milliseconds
    #[arg(long, value_name = "MS")]
    pub tick_ms: Option<u64>,

    /// Use a throwaway session that is not persisted
    #[arg(long)]
    pub ephemeral: bool,

    /// Record a JSONL transcript of the conversation
    #[arg(long)]
    pub transcript: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Write diagnostics to a daily log file in this directory instead of stderr
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_question() {
        let cli = Cli::try_parse_from(["chat-relay", "hello"]).unwrap();
        assert_eq!(cli.question.as_deref(), Some("hello"));
        assert!(!cli.chat);
        assert_eq!(cli.format, None);
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::try_parse_from([
            "chat-relay",
            "--chat",
            "--format",
            "html",
            "--no-stream",
            "--cps",
            "50",
            "--tick-ms",
            "10",
            "-vv",
        ])
        .unwrap();
        assert!(cli.chat);
        assert_eq!(cli.format, Some(OutputFormat::Html));
        assert!(cli.no_stream);
        assert_eq!(cli.cps, Some(50));
        assert_eq!(cli.tick_ms, Some(10));
        assert_eq!(cli.verbose, 2);
    }
}
