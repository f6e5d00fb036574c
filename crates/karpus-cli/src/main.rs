//! Karpus Kids CLI - a terminal view over the school's local data.
//!
//! This binary opens the local store and the attendance cache from the
//! configured data directory and prints director-facing summaries.

mod commands;

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use karpus_core::{Config, FileStorage, KarpusStore, SharedClock, SystemClock, TtlCache};

use commands::Cli;

// ============================================================================
// Constants
// ============================================================================

/// Log file name inside the data directory
const LOG_FILE: &str = "karpus.log";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr, and also to a file in the data directory when
/// `log_to_file` is set. The returned guard must live until exit.
fn init_tracing(config: &Config, data_dir: &Path) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = if config.log_to_file {
        let appender = tracing_appender::rolling::never(data_dir, LOG_FILE);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
            Some(guard),
        )
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let (config, rejected) = Config::load()?;
    let data_dir = config.data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    let _guard = init_tracing(&config, &data_dir);
    for r in &rejected {
        warn!(name = r.name, value = %r.value, "Ignoring invalid config override");
    }

    let storage = Arc::new(
        FileStorage::open(&data_dir)
            .with_context(|| format!("Failed to open storage in {}", data_dir.display()))?,
    );
    info!(storage = %storage.path().display(), "Karpus CLI starting");
    let clock: SharedClock = Arc::new(SystemClock);

    let mut store = KarpusStore::init(storage.clone(), clock.clone())
        .with_typing_window(config.typing_window_ms);
    let cache = TtlCache::attendance(storage, clock, config.cache_ttl_ms);

    let mut out = io::stdout().lock();
    commands::run(cli.command, &mut store, &cache, &config, &mut out)
}
