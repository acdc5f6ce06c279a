//! # Sweep Subcommand
//!
//! One scheduler tick: decide whether an audit cycle is due and, if so,
//! which batches to audit. The report lists every batch that carries an
//! alert so an operator feed can pick it up.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use bean_core::Timestamp;
use bean_status::{is_cycle_due, plan_audit_cycle, AuditCycle, BatchStatusEntry};

use crate::{load_batches, load_config, parse_now, print_json};

/// Arguments for the `bean sweep` subcommand.
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Path to a JSON array of batch documents.
    #[arg(long)]
    pub batches: PathBuf,

    /// Evaluation instant (RFC 3339, UTC). Defaults to the current time.
    #[arg(long)]
    pub now: Option<String>,

    /// When the previous cycle ran (RFC 3339, UTC).
    #[arg(long)]
    pub last_cycle: Option<String>,

    /// Plan a cycle even if the cycle interval has not elapsed.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub struct SweepOutput {
    pub cycle_due: bool,
    /// Absent when the cycle is not due and `--force` was not given.
    pub cycle: Option<AuditCycle>,
    pub alerting: Vec<BatchStatusEntry>,
}

/// Execute the sweep subcommand.
pub fn run_sweep(args: &SweepArgs, config: Option<&Path>) -> Result<u8> {
    print_json(&sweep(args, config)?)?;
    Ok(0)
}

fn sweep(args: &SweepArgs, config: Option<&Path>) -> Result<SweepOutput> {
    let batches = load_batches(&args.batches)?;
    let cfg = load_config(config)?;
    let now = parse_now(args.now.as_deref())?;
    let last_cycle = args
        .last_cycle
        .as_deref()
        .map(Timestamp::parse)
        .transpose()
        .context("invalid --last-cycle")?;

    let cycle_due = is_cycle_due(last_cycle, now, &cfg);
    if !cycle_due && !args.force {
        tracing::info!(planned_at = %now, "audit cycle not due");
        return Ok(SweepOutput {
            cycle_due,
            cycle: None,
            alerting: Vec::new(),
        });
    }

    let cycle = plan_audit_cycle(&batches, &cfg, now);
    let alerting: Vec<BatchStatusEntry> = cycle.alerting().cloned().collect();
    for entry in &alerting {
        tracing::warn!(
            batch_id = %entry.batch_id,
            status = %entry.report.status,
            alerts = entry.report.alerts.len(),
            "batch alert"
        );
    }
    tracing::info!(
        selected = cycle.selected.len(),
        deferred = cycle.deferred,
        "audit cycle planned"
    );
    Ok(SweepOutput {
        cycle_due,
        cycle: Some(cycle),
        alerting,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::fixtures;

    const BATCHES: &str = r#"[
        {"batch_id": 1, "quantity": 100,
         "production_date": "2026-01-01T00:00:00Z",
         "expiry_date": "2027-01-01T00:00:00Z",
         "last_verified": "2026-05-25T00:00:00Z"},
        {"batch_id": 2, "quantity": 100,
         "production_date": "2026-01-01T00:00:00Z",
         "expiry_date": "2027-01-01T00:00:00Z"},
        {"batch_id": 3, "quantity": 100,
         "production_date": "2025-01-01T00:00:00Z",
         "expiry_date": "2026-03-01T00:00:00Z"}
    ]"#;

    fn args(dir: &tempfile::TempDir, last_cycle: Option<&str>, force: bool) -> SweepArgs {
        SweepArgs {
            batches: fixtures::write(dir.path(), "batches.json", BATCHES),
            now: Some("2026-06-01T00:00:00Z".to_string()),
            last_cycle: last_cycle.map(str::to_string),
            force,
        }
    }

    #[test]
    fn first_sweep_plans_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let out = sweep(&args(&dir, None, false), None).unwrap();
        assert!(out.cycle_due);
        let cycle = out.cycle.unwrap();
        let selected: Vec<u64> = cycle.selected.iter().map(|id| id.get()).collect();
        // Batch 3 is expired and never selected.
        assert_eq!(selected, vec![2]);
        assert_eq!(cycle.statuses.len(), 3);
        let alerting: Vec<u64> = out.alerting.iter().map(|e| e.batch_id.get()).collect();
        assert_eq!(alerting, vec![2, 3]);
    }

    #[test]
    fn recent_cycle_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let out = sweep(&args(&dir, Some("2026-05-31T12:00:00Z"), false), None).unwrap();
        assert!(!out.cycle_due);
        assert!(out.cycle.is_none());
    }

    #[test]
    fn force_overrides_interval() {
        let dir = tempfile::tempdir().unwrap();
        let out = sweep(&args(&dir, Some("2026-05-31T12:00:00Z"), true), None).unwrap();
        assert!(!out.cycle_due);
        assert!(out.cycle.is_some());
    }

    #[test]
    fn batch_limit_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = fixtures::write(dir.path(), "cfg.json", r#"{"audit_interval": 86400, "max_batches_per_cycle": 1}"#);
        let out = sweep(&args(&dir, None, false), Some(&cfg)).unwrap();
        let cycle = out.cycle.unwrap();
        assert_eq!(cycle.selected.len(), 1);
        assert_eq!(cycle.selected[0].get(), 2);
        assert_eq!(cycle.deferred, 1);
    }
}
