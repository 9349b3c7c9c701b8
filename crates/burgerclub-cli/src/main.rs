//! burgerclub - command-line front end for the burger club site.
//!
//! Public commands read the rankings, gallery, rosters and map, and submit
//! ratings and suggestions. `burgerclub admin ...` drives the admin panel
//! once unlocked with `burgerclub admin login`.

mod cli;
mod commands;

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use burgerclub_core::Config;
use cli::Cli;

const LOG_FILE_PREFIX: &str = "burgerclub.log";

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` controls the level (default `warn`). Logs go to stderr and,
/// when a log directory is configured, to a daily rolling file as well.
/// The returned guard must live until exit so buffered lines are flushed.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match config.log_dir.as_ref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();
    guard
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let _guard = init_tracing(&config);
    info!(version = env!("CARGO_PKG_VERSION"), "burgerclub starting");

    commands::dispatch(cli.command, config).await
}
