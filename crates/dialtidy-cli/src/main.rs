mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{backup, completions, numbers, reconcile, run, seed, Context};
use crate::error::{exit_code_for, report_error};
use dialtidy_config as config;
use dialtidy_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(name = "dialtidy", version, about = "dialtidy CLI")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reset, seed, and reconcile in one invocation
    Run(run::RunArgs),
    /// Normalize and deduplicate all stored numbers
    Reconcile(reconcile::ReconcileArgs),
    /// Insert the configured sample numbers
    Seed(seed::SeedArgs),
    /// Delete all stored numbers
    Reset(seed::ResetArgs),
    Add(numbers::AddArgs),
    List(numbers::ListArgs),
    Delete(numbers::DeleteArgs),
    /// Print the normalized form of a value without touching the database
    Normalize(numbers::NormalizeArgs),
    Backup(backup::BackupArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    match command {
        Command::Completions(args) => completions::emit(args),
        Command::Normalize(args) => numbers::normalize_value(args, json),
        command => {
            let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
            if verbose {
                match config::resolve_config_path(config_path) {
                    Ok(path) => {
                        if path.exists() {
                            debug!(path = %path.display(), "config resolved");
                        } else {
                            debug!(path = %path.display(), "config missing, using defaults");
                        }
                    }
                    Err(err) => {
                        debug!(error = %err, "config unavailable");
                    }
                }
            }

            let db_path = db_path.or_else(|| app_config.db_path.clone());
            let db_path =
                paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
            if verbose {
                debug!(path = %db_path.display(), "database path resolved");
            }

            let store = Store::open(&db_path)
                .with_context(|| format!("open database {}", db_path.display()))?;
            store.migrate().with_context(|| "run migrations")?;

            let ctx = Context {
                store: &store,
                json,
                config: &app_config,
            };

            match command {
                Command::Run(args) => run::run_all(&ctx, args),
                Command::Reconcile(args) => reconcile::reconcile_numbers(&ctx, args),
                Command::Seed(args) => seed::seed_numbers(&ctx, args),
                Command::Reset(args) => seed::reset_numbers(&ctx, args),
                Command::Add(args) => numbers::add_number(&ctx, args),
                Command::List(args) => numbers::list_numbers(&ctx, args),
                Command::Delete(args) => numbers::delete_number(&ctx, args),
                Command::Backup(args) => backup::backup(&ctx, args),
                Command::Normalize(_) => unreachable!("normalize handled before store setup"),
                Command::Completions(_) => {
                    unreachable!("completions handled before store setup")
                }
            }
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}
