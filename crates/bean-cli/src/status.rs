//! # Status Subcommand
//!
//! Derives the current status and alerts of one batch.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use bean_core::{BatchId, Timestamp};
use bean_status::{derive_status, StatusReport};

use crate::{load_batch, load_config, parse_now, print_json};

/// Arguments for the `bean status` subcommand.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Path to a batch JSON document.
    #[arg(long)]
    pub batch: PathBuf,

    /// Evaluation instant (RFC 3339, UTC). Defaults to the current time.
    #[arg(long)]
    pub now: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub batch_id: BatchId,
    pub evaluated_at: Timestamp,
    #[serde(flatten)]
    pub report: StatusReport,
}

/// Execute the status subcommand.
pub fn run_status(args: &StatusArgs, config: Option<&Path>) -> Result<u8> {
    let output = evaluate(args, config)?;
    print_json(&output)?;
    Ok(0)
}

fn evaluate(args: &StatusArgs, config: Option<&Path>) -> Result<StatusOutput> {
    let batch = load_batch(&args.batch)?;
    let cfg = load_config(config)?;
    let now = parse_now(args.now.as_deref())?;
    let report = derive_status(&batch, &cfg, now);
    tracing::info!(batch_id = %batch.batch_id(), status = %report.status, "derived status");
    Ok(StatusOutput {
        batch_id: batch.batch_id(),
        evaluated_at: now,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bean_status::{Alert, BatchStatus};

    use crate::fixtures;

    fn args(batch: PathBuf, now: &str) -> StatusArgs {
        StatusArgs {
            batch,
            now: Some(now.to_string()),
        }
    }

    #[test]
    fn verified_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write(dir.path(), "batch.json", fixtures::BATCH_JSON);
        let out = evaluate(&args(path, "2026-06-01T00:00:00Z"), None).unwrap();
        assert_eq!(out.report.status, BatchStatus::Verified);
        assert!(out.report.alerts.is_empty());
    }

    #[test]
    fn config_file_changes_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write(dir.path(), "batch.json", fixtures::BATCH_JSON);
        let cfg = fixtures::write(dir.path(), "cfg.yaml", "low_inventory_threshold: 400\n");
        let out = evaluate(&args(path, "2026-06-01T00:00:00Z"), Some(&cfg)).unwrap();
        assert_eq!(out.report.status, BatchStatus::LowInventory);
        assert!(out.report.has_alert(Alert::LowInventory));
    }

    #[test]
    fn overdue_after_audit_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write(dir.path(), "batch.json", fixtures::BATCH_JSON);
        let out = evaluate(&args(path, "2026-07-01T00:00:00Z"), None).unwrap();
        assert_eq!(out.report.status, BatchStatus::Pending);
    }

    #[test]
    fn run_returns_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write(dir.path(), "batch.json", fixtures::BATCH_JSON);
        assert_eq!(run_status(&args(path, "2026-06-01T00:00:00Z"), None).unwrap(), 0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_status(&args(dir.path().join("nope.json"), "2026-06-01T00:00:00Z"), None);
        assert!(result.is_err());
    }
}
