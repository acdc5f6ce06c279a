//! # bean CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bean_cli::config::{run_config, ConfigArgs};
use bean_cli::disclose::{run_disclose, DiscloseArgs};
use bean_cli::ledger::{run_ledger, LedgerArgs};
use bean_cli::status::{run_status, StatusArgs};
use bean_cli::sweep::{run_sweep, SweepArgs};

/// Coffee batch lifecycle engine.
///
/// Derives batch status and alerts, projects batches per caller role,
/// plans audit cycles, and runs a file-backed redemption ledger.
#[derive(Parser, Debug)]
#[command(name = "bean", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Verification thresholds (YAML or JSON). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Derive the status and alerts of a batch.
    Status(StatusArgs),

    /// Show a batch as a given caller role would see it.
    Disclose(DiscloseArgs),

    /// Plan an audit cycle over a set of batches.
    Sweep(SweepArgs),

    /// Show, validate, or patch verification thresholds.
    Config(ConfigArgs),

    /// Mint, redeem, and track requests in a local ledger file.
    Ledger(LedgerArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("bean CLI starting");

    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Status(args) => run_status(args, config),
        Commands::Disclose(args) => run_disclose(args),
        Commands::Sweep(args) => run_sweep(args, config),
        Commands::Config(args) => run_config(args, config),
        Commands::Ledger(args) => run_ledger(args, config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
