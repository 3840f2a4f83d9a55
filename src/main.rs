//! task-tracker command line entry point.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::fs::OpenOptions;
use std::process::ExitCode;
use task_tracker::cli::{self, Cli, Context};
use task_tracker::config::Config;
use task_tracker::db::Database;
use task_tracker::error::TrackerError;
use task_tracker::format::OutputFormat;
use task_tracker::service::Services;
use tracing::{Level, debug, error};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install the global subscriber selected by `--log`.
///
/// `RUST_LOG`, when set, takes precedence over the level implied by
/// `--verbose`.
fn init_logging(log: &str, verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));

    match log {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new().create(true).append(true).open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    init_logging(&cli.log, cli.verbose)?;

    let mut config = Config::discover(cli.config.as_deref())?;
    if let Some(db_path) = &cli.database {
        config.database.path = db_path.clone();
    }
    if cli.no_color || !config.display.color {
        colored::control::set_override(false);
    }
    debug!(db = %config.database.path.display(), "Resolved configuration");

    let db = Database::open(&config.database.path)?;
    let ctx = Context::new(Services::new(db), OutputFormat::from_json_flag(cli.json));

    cli::run(cli.command, &ctx)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(err) = e.downcast_ref::<TrackerError>()
                && !err.is_domain()
            {
                error!(code = ?err.code, "Storage failure: {}", err.message);
            }
            eprintln!("{}", format!("Error: {:#}", e).red());
            ExitCode::FAILURE
        }
    }
}
