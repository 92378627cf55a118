//! shopwatch-replay - Feed a saved game log through the classification engine.
//!
//! The trailing window of the log file is processed as startup catch-up,
//! exactly as a live overlay would on launch. With `--follow-stdin`, lines
//! piped on stdin are then processed as live lines until stdin closes.
//!
//! Output: one JSON snapshot per line on stdout.

mod error;
mod settings;

use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use encoding_rs::{Encoding, UTF_8};
use memmap2::Mmap;
use shopwatch_core::log::trailing_window;
use shopwatch_core::{ChannelLineSource, DiagnosticRecorder, MatchSnapshot, ParsingSession};
use shopwatch_types::EngineSettings;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::filter::EnvFilter;

use crate::error::ReplayError;
use crate::settings::load_settings;

const LIVE_CHANNEL_CAPACITY: usize = 1024;
const DIAGNOSTIC_CAPACITY: usize = 64;

#[derive(Parser, Debug)]
#[command(version, about = "Replay a game log through the shop/combat classifier")]
struct Args {
    /// Game log to take the startup backlog from
    log_file: PathBuf,

    /// Settings file (defaults to <config_dir>/shopwatch/settings.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep reading live lines from stdin after the backlog
    #[arg(long)]
    follow_stdin: bool,
}

/// Initialize logging, writing to SHOPWATCH_LOG_PATH if set, otherwise stderr.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("SHOPWATCH_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }

    // Fallback to stderr; stdout carries the snapshots
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "Replay failed");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ReplayError> {
    let settings = load_settings(args.config.as_deref())?;
    let backlog = read_backlog(&args.log_file, &settings)?;
    tracing::info!(
        "[SESSION] {} backlog lines from {}",
        backlog.len(),
        args.log_file.display()
    );

    let recorder = DiagnosticRecorder::new(DIAGNOSTIC_CAPACITY);
    let mut session = ParsingSession::new(settings);
    session.add_signal_handler(Box::new(recorder.clone()));

    let (tx, source) = ChannelLineSource::channel(backlog, LIVE_CHANNEL_CAPACITY);

    if args.follow_stdin {
        tokio::spawn(forward_stdin(tx));

        let mut snapshots = session.subscribe();
        let printer = tokio::spawn(async move {
            while snapshots.changed().await.is_ok() {
                let snapshot = snapshots.borrow_and_update().clone();
                if let Err(e) = print_snapshot(&snapshot) {
                    tracing::warn!(error = %e, "Failed to print snapshot");
                }
            }
        });

        session.run(source).await;
        // Closing the watch channel ends the printer once it has caught up
        drop(session);
        if let Err(e) = printer.await {
            tracing::warn!(error = %e, "Snapshot printer stopped");
        }
    } else {
        drop(tx);
        session.run(source).await;
        print_snapshot(&session.engine().snapshot())?;
    }

    for diagnostic in recorder.recent() {
        tracing::info!("[SESSION] Diagnostic: {:?}", diagnostic);
    }
    Ok(())
}

fn print_snapshot(snapshot: &MatchSnapshot) -> Result<(), ReplayError> {
    println!("{}", serde_json::to_string(snapshot)?);
    Ok(())
}

/// Trailing window of the log file, read through a memory map.
fn read_backlog(path: &Path, settings: &EngineSettings) -> Result<Vec<String>, ReplayError> {
    let io_err = |source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    if file.metadata().map_err(io_err)?.len() == 0 {
        return Ok(Vec::new());
    }

    // SAFETY: the map is read-only and dropped before this function returns.
    let mmap = unsafe { Mmap::map(&file).map_err(io_err)? };
    let bytes = mmap.as_ref();
    let bom_len = Encoding::for_bom(bytes).map_or(0, |(_, len)| len);

    Ok(trailing_window(
        &bytes[bom_len..],
        settings.backlog_max_bytes,
        settings.backlog_max_lines,
    ))
}

/// Forward stdin lines into the live channel until either side closes.
async fn forward_stdin(tx: mpsc::Sender<String>) {
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let (line, _) = UTF_8.decode_with_bom_removal(&buf);
                let line = line.trim_end_matches(['\r', '\n']).to_string();
                if tx.send(line).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "[SESSION] stdin read failed");
                break;
            }
        }
    }
}
