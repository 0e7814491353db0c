//! viewstats - command line viewer for user view statistics.
//!
//! Loads users and their statistics through the core services, serving
//! from the local cache unless `--refresh` is given, and prints lists,
//! per-user aggregates, or a dashboard report.

mod output;
mod utils;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use viewstats_core::{Config, DashboardReport, PersistentStore, StatsCore};

use output::Format;

// ============================================================================
// Constants
// ============================================================================

/// Visitors listed in the report when `--top` is not given
const DEFAULT_TOP_VISITORS: usize = 3;

#[derive(Parser, Debug)]
#[command(name = "viewstats", version, about = "User and view statistics, served from a local cache")]
struct Cli {
    /// Remote API base URL (overrides config and environment)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Directory for the local cache
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List users
    Users {
        /// Fetch from the server even if cached
        #[arg(long)]
        refresh: bool,
    },
    /// Show one user
    User { id: i64 },
    /// List raw statistics items
    Stats {
        #[arg(long)]
        refresh: bool,
    },
    /// Per-user view, subscription and unsubscription counts, most viewed first
    Aggregate {
        #[arg(long)]
        refresh: bool,
        /// Only print the first N users
        #[arg(long)]
        top: Option<usize>,
    },
    /// Dashboard summary
    Report {
        #[arg(long)]
        refresh: bool,
        #[arg(long, default_value_t = DEFAULT_TOP_VISITORS)]
        top: usize,
    },
    /// Cache location, sizes and ages
    Status,
    /// Remove all cached data
    Clear,
}

/// Initialize the tracing subscriber for logging
///
/// `RUST_LOG` controls the level (default `warn`). Logs go to stderr, and
/// to `log_file` as well when given. The returned guard flushes the file
/// writer on drop.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let name = path
                .file_name()
                .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load()?;
    apply_cli_overrides(cli, &mut config);
    Ok(config)
}

/// Command line flags take precedence over the config file and environment
fn apply_cli_overrides(cli: &Cli, config: &mut Config) {
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = Some(dir.clone());
    }
}

/// Wipe the local store, returning the message to show
fn clear_cache(store: &PersistentStore) -> Result<&'static str> {
    if !store.is_available() {
        return Ok("No local cache to clear");
    }
    store.delete_all_data()?;
    info!("Local cache cleared");
    Ok("Local cache cleared")
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let core = StatsCore::new(&config)?;
    let format = if cli.json { Format::Json } else { Format::Text };

    match cli.command {
        Command::Users { refresh } => {
            let users = core.users().load_users(refresh).await?;
            output::users(&users, format)
        }
        Command::User { id } => {
            let user = core
                .users()
                .get_user(id)
                .await?
                .with_context(|| format!("No user with id {}", id))?;
            output::user(&user, format)
        }
        Command::Stats { refresh } => {
            let items = core.statistics().load_statistics(refresh).await?;
            output::statistics(&items, format)
        }
        Command::Aggregate { refresh, top } => {
            let mut summaries = core.statistics().load_aggregated_statistics(refresh).await?;
            if let Some(n) = top {
                summaries.truncate(n);
            }
            output::aggregates(&summaries, format)
        }
        Command::Report { refresh, top } => {
            let summaries = core.statistics().load_aggregated_statistics(refresh).await?;
            output::report(&DashboardReport::build(&summaries, top), format)
        }
        Command::Status => output::status(core.store(), format),
        Command::Clear => {
            println!("{}", clear_cache(core.store())?);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref())?;

    run(cli).await
}
