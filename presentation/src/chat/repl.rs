//! REPL (Read-Eval-Print Loop) for interactive chat

use super::command::Command;
use crate::config::ReplConfig;
use crate::output::sanitize::plain_text;
use colored::Colorize;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use relay_application::{ChatError, ChatSessionUseCase, ResponseOutcome};
use relay_domain::{Message, Role};
use std::io;
use tracing::{debug, warn};

const HISTORY_CAPACITY: usize = 1000;

/// Interactive chat REPL
pub struct ChatRepl {
    session: ChatSessionUseCase,
    config: ReplConfig,
}

impl ChatRepl {
    pub fn new(session: ChatSessionUseCase, config: ReplConfig) -> Self {
        Self { session, config }
    }

    /// Run the interactive REPL until `/quit` or end of input.
    pub async fn run(&mut self) -> io::Result<()> {
        let mut editor = self.editor();
        self.print_welcome();

        loop {
            let label = format!("chat-relay [{}]", self.session.session().short());
            let prompt =
                DefaultPrompt::new(DefaultPromptSegment::Basic(label), DefaultPromptSegment::Empty);
            let signal = tokio::task::block_in_place(|| editor.read_line(&prompt))?;

            match signal {
                Signal::Success(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if let Some(command) = Command::parse(line) {
                        if self.handle_command(command).await {
                            break;
                        }
                        continue;
                    }
                    self.process_question(line).await;
                }
                Signal::CtrlC => continue,
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        self.session.cancel().await;
        Ok(())
    }

    fn editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.config.history_file else {
            return editor;
        };
        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            debug!("Could not create history directory: {}", e);
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("Line history disabled: {}", e);
                editor
            }
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│            chat-relay - Chat Mode           │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Session: {}", self.session.session().short().cyan());
        println!();
        Self::print_commands();
        println!("Press Ctrl-C while an answer is arriving to stop it.");
        println!();
    }

    fn print_commands() {
        println!("Commands:");
        println!("  {}            - Start a new conversation", "/new".cyan());
        println!("  {}  - Show stored messages", "/history [n]".cyan());
        println!("  {}        - Show the session id", "/session".cyan());
        println!("  {}           - Show this help", "/help".cyan());
        println!("  {}           - Exit chat", "/quit".cyan());
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => {
                println!("Bye!");
                return true;
            }
            Command::Help => {
                println!();
                Self::print_commands();
                println!();
            }
            Command::Session => {
                println!("{}", self.session.session());
            }
            Command::New => match self.session.reset().await {
                Ok(outcome) => {
                    println!(
                        "{} {}",
                        "Started a new conversation:".green(),
                        outcome.current.short().cyan()
                    );
                }
                Err(e) => Self::print_error(&e),
            },
            Command::History(limit) => match self.session.history(limit).await {
                Ok(messages) if messages.is_empty() => {
                    println!("{}", "No messages stored for this session.".dimmed());
                }
                Ok(messages) => {
                    println!();
                    for message in &messages {
                        Self::print_message(message);
                    }
                }
                Err(e) => Self::print_error(&e),
            },
            Command::Unknown(line) => {
                println!("Unknown command: {}", line);
                println!("Type /help for available commands");
            }
        }
        false
    }

    async fn process_question(&mut self, question: &str) {
        if let Err(e) = self.session.submit(question).await {
            Self::print_error(&e);
            return;
        }

        let token = self.session.active_token();
        let outcome = tokio::select! {
            outcome = self.session.wait() => outcome,
            _ = tokio::signal::ctrl_c() => {
                if let Some(token) = token {
                    token.cancel();
                }
                let outcome = self.session.wait().await;
                println!("{}", "Stopped.".dimmed());
                outcome
            }
        };

        match outcome {
            Ok(Some(ResponseOutcome::Completed(response))) => {
                debug!(
                    chars = response.text.chars().count(),
                    fallback = response.fallback_used,
                    "Answer shown"
                );
            }
            Ok(_) => {}
            Err(e) => Self::print_error(&e),
        }
    }

    fn print_message(message: &Message) {
        let label = match message.role {
            Role::User => "you".green().bold(),
            Role::Assistant => "assistant".cyan().bold(),
            Role::System => "system".dimmed().bold(),
            Role::Other => "other".dimmed().bold(),
        };
        println!("{}", label);
        println!("{}", plain_text(&message.content));
        println!();
    }

    fn print_error(error: &ChatError) {
        eprintln!("{} {}", "Error:".red().bold(), error);
    }
}
