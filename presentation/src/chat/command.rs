//! Slash commands understood by the chat REPL.

/// A parsed REPL command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a new conversation
    New,
    /// Show stored messages, optionally limited
    History(Option<usize>),
    /// Show the current session id
    Session,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse a line starting with `/`. Other lines are not commands.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let rest = line.strip_prefix('/')?;
        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();

        let command = match name {
            "new" | "reset" => Command::New,
            "history" | "hist" => match parts.next() {
                None => Command::History(None),
                Some(n) => match n.parse::<usize>() {
                    Ok(n) if n > 0 => Command::History(Some(n)),
                    _ => Command::Unknown(line.to_string()),
                },
            },
            "session" => Command::Session,
            "help" | "h" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        };
        Some(command)
    }
}
