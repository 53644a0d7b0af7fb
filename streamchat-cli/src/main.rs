//! Streamchat CLI - terminal client for chat endpoints
//!
//! Sends questions to a `/chat` endpoint and prints the reply as it streams.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

mod config;
mod error;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use streamchat::{
    ChatClient, ChatError, ChatMessage, ChatService, ChatSession, HttpTransport, Role, StreamItem,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::{FileConfig, config_path, load_config_from};
use crate::error::Result;

/// Streamchat - ask a chat endpoint and watch the answer arrive
#[derive(Parser)]
#[command(name = "streamchat")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "STREAMCHAT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Base URL of the chat endpoint (empty for root-relative requests)
    #[arg(long, env = "STREAMCHAT_API_URL", global = true)]
    base_url: Option<String>,

    /// Origin used to resolve root-relative requests
    #[arg(long, global = true)]
    origin: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "STREAMCHAT_TIMEOUT_SECS", global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question and print the settled answer
    Ask(AskArgs),

    /// Ask one question and print the answer as it streams
    Stream(StreamArgs),

    /// Start an interactive chat session
    Chat(ChatArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the ask command
#[derive(Args)]
struct AskArgs {
    /// Question to send
    text: String,
}

/// Arguments for the stream command
#[derive(Args)]
struct StreamArgs {
    /// Question to send
    text: String,

    /// Print the settled message as JSON after the stream ends
    #[arg(long)]
    show_final: bool,
}

/// Arguments for the chat command
#[derive(Args)]
struct ChatArgs {
    /// Prompt shown before each input line
    #[arg(short, long, default_value = "You: ")]
    prompt: String,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Show configuration file path
    Path,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "streamchat_cli={level},streamchat={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    // stdout carries the answers
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let settings = settings(&cli).await?;
    match cli.command {
        Commands::Ask(args) => cmd_ask(args, &settings).await,
        Commands::Stream(args) => cmd_stream(args, &settings).await,
        Commands::Chat(args) => cmd_chat(args, &settings).await,
        Commands::Config(args) => cmd_config(args, cli.config, &settings),
    }
}

/// Config file with environment and flag overrides applied.
async fn settings(cli: &Cli) -> Result<FileConfig> {
    let path = cli.config.clone().unwrap_or_else(config_path);
    let file = load_config_from(&path).await?;
    Ok(file.merge(FileConfig {
        base_url: cli.base_url.clone(),
        origin: cli.origin.clone(),
        timeout_secs: cli.timeout,
    }))
}

fn build_client(settings: &FileConfig) -> Result<ChatClient> {
    let config = settings.chat_config();
    let mut transport = HttpTransport::new(&config)?;
    if let Some(origin) = &settings.origin {
        transport = transport.with_origin(origin)?;
    }
    tracing::debug!(base_url = %config.base_url, origin = ?settings.origin, "client ready");
    Ok(ChatClient::new(config, transport))
}

/// One-shot question.
async fn cmd_ask(args: AskArgs, settings: &FileConfig) -> Result<()> {
    let client = build_client(settings)?;
    let message = client.send(&args.text).await?;
    println!("{}", message.content);
    Ok(())
}

/// Streamed question.
async fn cmd_stream(args: StreamArgs, settings: &FileConfig) -> Result<()> {
    let client = build_client(settings)?;
    let mut stream = client.send_stream(&args.text).await?;
    let mut stdout = std::io::stdout();

    while let Some(item) = stream.next().await {
        match item? {
            StreamItem::Chunk(chunk) => {
                write!(stdout, "{chunk}")?;
                stdout.flush()?;
            }
            StreamItem::Done(message) => {
                println!();
                if args.show_final {
                    println!("{}", serde_json::to_string_pretty(&message)?);
                }
                return Ok(());
            }
        }
    }
    Err(ChatError::stream("stream ended without a final message").into())
}

/// Interactive session. Ctrl+C cancels the outstanding reply.
async fn cmd_chat(args: ChatArgs, settings: &FileConfig) -> Result<()> {
    let mut session = ChatSession::new(build_client(settings)?);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("streamchat | type 'exit' to quit\n");

    loop {
        print!("{}", args.prompt);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if matches!(line, "exit" | "quit") {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let mut view = ReplyView::default();
        tokio::select! {
            result = session.send_message(line, |message| view.update(message)) => match result {
                Ok(_) => println!(),
                Err(e) => println!("\nerror: {e}"),
            },
            _ = tokio::signal::ctrl_c() => {
                println!("\n[cancelled]");
            }
        }
    }

    Ok(())
}

/// Prints an assistant reply incrementally.
#[derive(Debug, Default)]
struct ReplyView {
    shown: String,
}

impl ReplyView {
    fn update(&mut self, message: &ChatMessage) {
        if message.role != Role::Assistant {
            return;
        }
        let text = match message.content.strip_prefix(self.shown.as_str()) {
            Some(delta) => delta.to_owned(),
            // settled content differs from what was streamed
            None => format!("\n{}", message.content),
        };
        print!("{text}");
        let _ = std::io::stdout().flush();
        self.shown.clone_from(&message.content);
    }
}

/// Configuration management.
fn cmd_config(args: ConfigArgs, path: Option<PathBuf>, settings: &FileConfig) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            println!("{}", path.unwrap_or_else(config_path).display());
        }
        ConfigCommands::Show => {
            print!("{}", settings.to_toml()?);
        }
    }
    Ok(())
}
