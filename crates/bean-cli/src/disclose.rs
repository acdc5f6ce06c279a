//! # Disclose Subcommand
//!
//! Projects a batch the way a caller holding `--role` would see it.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use bean_disclosure::{resolve_disclosure, CallerRole, ProjectedBatch};

use crate::{load_batch, print_json};

/// Arguments for the `bean disclose` subcommand.
#[derive(Args, Debug)]
pub struct DiscloseArgs {
    /// Path to a batch JSON document.
    #[arg(long)]
    pub batch: PathBuf,

    /// Caller role claim: admin, processor, distributor or public.
    /// Unrecognized claims are treated as public.
    #[arg(long, default_value = "public")]
    pub role: String,
}

/// Execute the disclose subcommand.
pub fn run_disclose(args: &DiscloseArgs) -> Result<u8> {
    print_json(&project(args)?)?;
    Ok(0)
}

fn project(args: &DiscloseArgs) -> Result<ProjectedBatch> {
    let batch = load_batch(&args.batch)?;
    let role = CallerRole::from_claim(&args.role);
    if role.as_str() != args.role.trim().to_ascii_lowercase() {
        tracing::warn!(claim = %args.role, "unrecognized role claim; projecting as public");
    }
    Ok(resolve_disclosure(&batch, role))
}
