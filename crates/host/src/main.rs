//! PaneStack Host
//!
//! Headless host process for a PaneStack container.
//!
//! Responsibilities:
//! - Load configuration and seed the container with the configured panes
//! - Read protocol commands line by line from stdin
//! - Answer every command with one JSON line on stdout
//! - Log to stderr so stdout stays a clean protocol stream

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use panestack_host::config::Config;
use panestack_host::session::Session;
use panestack_ipc::{decode_line, encode_line, IpcCommand, IpcResponse};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "panestack")]
#[command(author, version, about = "Drive a PaneStack container over stdin/stdout")]
struct Args {
    /// Config file to load instead of searching the standard locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

/// Events that the host event loop processes.
enum HostEvent {
    /// A decoded command from stdin.
    Command(IpcCommand),
    /// A line that could not be decoded.
    Invalid(String),
    /// Input closed or a signal arrived.
    Shutdown,
}

/// Map a configured level name to a tracing level.
fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO, // default fallback for invalid values
    }
}

/// Read stdin line by line and forward decoded commands.
async fn read_commands(event_tx: mpsc::Sender<HostEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("stdin closed");
                break;
            }
            Err(e) => {
                warn!("Failed to read stdin: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }
        debug!("Received command: {}", line.trim());

        let event = match decode_line::<IpcCommand>(&line) {
            Ok(cmd) => HostEvent::Command(cmd),
            Err(e) => HostEvent::Invalid(format!("Invalid command: {}", e)),
        };
        if event_tx.send(event).await.is_err() {
            return; // Event loop gone
        }
    }

    let _ = event_tx.send(HostEvent::Shutdown).await;
}

/// Write one response line to stdout.
async fn write_response(stdout: &mut tokio::io::Stdout, response: &IpcResponse) -> Result<()> {
    let line = match encode_line(response) {
        Ok(line) => line,
        Err(e) => {
            warn!("Failed to serialize response: {}", e);
            encode_line(&IpcResponse::error(format!("Failed to serialize response: {}", e)))
                .context("Failed to serialize error response")?
        }
    };
    stdout
        .write_all(line.as_bytes())
        .await
        .context("Failed to write response")?;
    stdout.flush().await.context("Failed to flush stdout")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first (needed for log level)
    let mut config = Config::load_with(args.config.as_deref()).unwrap_or_else(|e| {
        // Can't use tracing yet, fall back to eprintln
        eprintln!("Failed to load configuration: {:#}. Using defaults.", e);
        Config::default()
    });

    let level_name = args
        .log_level
        .as_deref()
        .unwrap_or(&config.behavior.log_level);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_log_level(level_name))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Validate and clamp config values
    for w in config.validate() {
        warn!("Config: {} - {}", w.field, w.message);
    }

    info!("PaneStack host starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded: pane_width={}, tab_width={}, viewport={}x{}, panes={}, log_level={}",
        config.layout.pane_width,
        config.layout.tab_width,
        config.viewport.width,
        config.viewport.height,
        config.panes.len(),
        config.behavior.log_level
    );

    let mut session = Session::new(config, args.config);

    let (event_tx, mut event_rx) = mpsc::channel::<HostEvent>(100);

    tokio::spawn(read_commands(event_tx.clone()));

    {
        let shutdown_tx = event_tx.clone();
        tokio::spawn(async move {
            if let Ok(()) = tokio::signal::ctrl_c().await {
                info!("Ctrl+C received, initiating shutdown...");
                let _ = shutdown_tx.send(HostEvent::Shutdown).await;
            }
        });
    }
    drop(event_tx);

    info!("Ready. Pipe panestack-cli output into stdin to send commands.");

    let mut stdout = tokio::io::stdout();

    // Main event loop
    while let Some(event) = event_rx.recv().await {
        match event {
            HostEvent::Command(cmd) => {
                let is_stop = matches!(cmd, IpcCommand::Stop);
                let response = session.handle_command(cmd);
                write_response(&mut stdout, &response).await?;
                if is_stop {
                    info!("Stop command received");
                    break;
                }
            }
            HostEvent::Invalid(message) => {
                warn!("{}", message);
                write_response(&mut stdout, &IpcResponse::error(message)).await?;
            }
            HostEvent::Shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("PaneStack host shutting down.");
    Ok(())
}
