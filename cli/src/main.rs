//! CLI entrypoint for chat-relay
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use relay_application::{
    ChatSessionUseCase, ChunkSource, ConversationLogger, HistoryPort, InMemorySessionStore,
    Renderer, ResponseController, ResponseOutcome, ResponseSurface, SessionStore,
};
use relay_domain::ResponseError;
use relay_infrastructure::{
    ConfigLoader, FileConfig, FileOutputFormat, FileSessionStore, HttpChunkSource,
    HttpHistoryClient, JsonlConversationLogger,
};
use relay_presentation::{
    ChatRepl, Cli, HtmlRenderer, LineSurface, OutputConfig, OutputFormat, PlainRenderer,
    ReplConfig, TerminalRenderer, TerminalSurface,
};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(ExitCode::SUCCESS);
    }

    let _log_guard = init_logging(&cli)?;
    info!("Starting chat-relay");

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };
    apply_overrides(&mut config, &cli);
    config.validate()?;

    let interactive = std::io::stdout().is_terminal();
    let output = output_config(&config, &cli, interactive);
    if !output.color {
        colored::control::set_override(false);
    }
    let repl_config = ReplConfig {
        show_progress: config.repl.show_progress && !cli.quiet,
        history_file: config
            .repl
            .history_file
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| ReplConfig::default().history_file),
    };

    // === Dependency Injection ===
    let source: Arc<dyn ChunkSource> = Arc::new(HttpChunkSource::new(
        &config.server.base_url,
        config.request_timeout(),
        config.stream_idle_timeout(),
    )?);
    let history: Arc<dyn HistoryPort> = Arc::new(HttpHistoryClient::new(
        &config.server.base_url,
        config.request_timeout(),
    )?);
    let store: Arc<dyn SessionStore> = match FileSessionStore::default_location() {
        Some(store) if !cli.ephemeral => Arc::new(store),
        _ => Arc::new(InMemorySessionStore::default()),
    };
    let renderer: Arc<dyn Renderer> = match output.format {
        OutputFormat::Terminal => Arc::new(TerminalRenderer::new(
            output.color,
            output.max_render_bytes,
        )),
        OutputFormat::Html => Arc::new(HtmlRenderer::new(output.max_render_bytes)),
        OutputFormat::Plain => Arc::new(PlainRenderer),
    };
    let surface: Arc<dyn ResponseSurface> = if interactive {
        Arc::new(TerminalSurface::new(repl_config.show_progress))
    } else {
        Arc::new(LineSurface::stdout())
    };

    let mut controller =
        ResponseController::new(source, renderer, surface, config.delivery_params()?);
    let transcript = transcript_logger(&config, &cli);
    if let Some(logger) = &transcript {
        controller = controller.with_conversation_logger(Arc::clone(logger));
    }
    let mut session = ChatSessionUseCase::open(Arc::new(controller), history, store);
    if let Some(logger) = transcript {
        session = session.with_conversation_logger(logger);
    }

    // Chat mode
    if cli.chat {
        if !interactive {
            bail!("Chat mode needs an interactive terminal.");
        }
        ChatRepl::new(session, repl_config).run().await?;
        return Ok(ExitCode::SUCCESS);
    }

    // Single question mode - question is required
    let Some(question) = cli.question.as_deref() else {
        bail!("Question is required. Use --chat for interactive mode.");
    };

    match session.ask(question).await? {
        ResponseOutcome::Completed(response) => {
            let failed = matches!(
                response.error,
                Some(ResponseError::ServerStatus { .. } | ResponseError::Network(_))
            );
            Ok(if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        ResponseOutcome::Superseded => Ok(ExitCode::FAILURE),
    }
}

/// Install the tracing subscriber. The returned guard flushes the log file
/// on drop and must live until exit.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    if let Some(dir) = &cli.log_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create log directory {}", dir.display()))?;
        let appender = tracing_appender::rolling::daily(dir, "chat-relay.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        return Ok(Some(guard));
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(None)
}

/// CLI flags win over every configuration source.
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(server) = &cli.server {
        config.server.base_url = server.clone();
    }
    if cli.no_stream {
        config.delivery.streaming = false;
    }
    if let Some(cps) = cli.cps {
        config.delivery.chars_per_second = cps;
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.delivery.tick_interval_ms = tick_ms;
    }
    if let Some(format) = cli.format {
        config.output.format = match format {
            OutputFormat::Terminal => FileOutputFormat::Terminal,
            OutputFormat::Html => FileOutputFormat::Html,
            OutputFormat::Plain => FileOutputFormat::Plain,
        };
    }
    if cli.no_color {
        config.output.color = false;
    }
    if cli.transcript {
        config.logging.transcript = true;
    }
}

fn output_config(config: &FileConfig, cli: &Cli, interactive: bool) -> OutputConfig {
    let format = match config.output.format {
        FileOutputFormat::Terminal => OutputFormat::Terminal,
        FileOutputFormat::Html => OutputFormat::Html,
        FileOutputFormat::Plain => OutputFormat::Plain,
    };
    // Escape sequences only go to terminals unless the format was asked for.
    let color = config.output.color && (interactive || cli.format.is_some());
    OutputConfig {
        format,
        color,
        max_render_bytes: config.delivery.max_render_bytes,
    }
}

fn transcript_logger(config: &FileConfig, cli: &Cli) -> Option<Arc<dyn ConversationLogger>> {
    if !config.logging.transcript {
        return None;
    }
    let dir = config
        .logging
        .transcript_dir
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| FileSessionStore::default_dir().map(|d| d.join("transcripts")))
        .or_else(|| cli.log_dir.clone())?;

    let logger = JsonlConversationLogger::in_dir(&dir)?;
    info!("Transcript: {}", logger.path().display());
    Some(Arc::new(logger))
}
