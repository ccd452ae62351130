//! Command-line entry point for the Killboard guild tracker.
//!
//! Each invocation runs one command against the configured store and the
//! remote game API, then exits.
//!
//! # Architecture
//!
//! ```text
//! args + killboard.yaml --> Tracker --> Reconciler / Aggregator
//!                                         |-- RetryingSource<AlbionClient>
//!                                         +-- PgStore
//! ```
//!
//! The command runs under `sync.command_timeout_secs`. On failure the
//! detailed error is logged and a short message is printed to stderr.

mod commands;
mod config;
mod error;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use killboard_db::PgStore;
use killboard_remote::{AlbionClient, RetryingSource};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::commands::{Tracker, TrackerCommand};
use crate::config::{KillboardConfig, LoggingConfig};
use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "killboard")]
#[command(about = "Track guild kills from the game API and rank killers", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "killboard.yaml")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending database migrations.
    Migrate,

    #[command(flatten)]
    Tracker(TrackerCommand),
}

/// Application entry point.
///
/// Loads configuration, initializes logging, runs one command, and maps
/// the outcome to an exit code.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match KillboardConfig::load(&cli.config, |k| std::env::var(k).ok()) {
        Ok(config) => config,
        Err(err) => {
            init_logging(&LoggingConfig::default(), cli.json);
            tracing::error!(path = %cli.config.display(), error = %err, "failed to load configuration");
            eprintln!("{}", CliError::from(err).user_message());
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.logging, cli.json || config.logging.json);
    info!(
        config = %cli.config.display(),
        base_url = %config.remote.base_url,
        event_window = config.sync.event_window,
        known_window = config.sync.known_window,
        "killboard starting"
    );

    match run(cli.command, &config).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("{}", err.user_message());
            ExitCode::FAILURE
        }
    }
}

/// Connect, run `command` under the configured deadline, and close the pool.
async fn run(command: Command, config: &KillboardConfig) -> Result<String, CliError> {
    let store = PgStore::connect(&config.database.postgres_config()).await?;

    let result = match command {
        Command::Migrate => store
            .run_migrations()
            .await
            .map(|()| "Migrations applied.".to_owned())
            .map_err(CliError::from),
        Command::Tracker(command) => {
            let client = AlbionClient::new(&config.remote.client_config())?;
            let remote = RetryingSource::new(client, config.remote.retry_policy());
            let tracker = Tracker::new(remote, store.clone(), &config.sync);
            tokio::time::timeout(config.sync.command_timeout(), tracker.execute(&command))
                .await
                .map_err(CliError::from)
                .and_then(|result| result)
        }
    };

    store.close().await;
    result
}

/// Initialize structured logging to stderr.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_logging(logging: &LoggingConfig, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
