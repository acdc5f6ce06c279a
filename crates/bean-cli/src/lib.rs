//! # bean-cli — Batch Engine Command Line
//!
//! Provides the `bean` command-line interface over the batch lifecycle
//! engine. Batches are read from JSON documents; verification thresholds
//! from YAML or JSON (defaults apply when no file is given).
//!
//! ## Subcommands
//!
//! - `bean status` — Derive the status and alerts of one batch.
//! - `bean disclose` — Project a batch for a caller role.
//! - `bean sweep` — Plan an audit cycle over a set of batches.
//! - `bean config` — Show or validate verification thresholds.
//! - `bean ledger` — File-backed minting and redemption.
//!
//! ```bash
//! bean status --batch lot-12.json --now 2026-06-01T00:00:00Z
//! bean disclose --batch lot-12.json --role distributor
//! bean --config thresholds.yaml sweep --batches lots.json
//! bean ledger --ledger ledger.json redeem --batch-id 12 --holder 0xabc --quantity 3 --delivery "Dock 4"
//! ```
//!
//! All results are printed as pretty JSON on stdout.

pub mod config;
pub mod disclose;
pub mod ledger;
pub mod status;
pub mod sweep;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use bean_core::{Batch, Timestamp, VerificationConfig};

/// Read a single batch from a JSON document.
pub fn load_batch(path: &Path) -> Result<Batch> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read batch file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid batch document {}", path.display()))
}

/// Read a JSON array of batches.
pub fn load_batches(path: &Path) -> Result<Vec<Batch>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read batches file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid batch array {}", path.display()))
}

/// Load thresholds from `path`, or fall back to the defaults.
pub fn load_config(path: Option<&Path>) -> Result<VerificationConfig> {
    match path {
        Some(p) => VerificationConfig::load(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => {
            tracing::debug!("no config file given; using default thresholds");
            Ok(VerificationConfig::default())
        }
    }
}

/// Parse `--now`, defaulting to the current time.
pub fn parse_now(now: Option<&str>) -> Result<Timestamp> {
    match now {
        Some(s) => Timestamp::parse(s).context("invalid --now"),
        None => Ok(Timestamp::now()),
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_batch_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write(dir.path(), "batch.json", fixtures::BATCH_JSON);
        let batch = load_batch(&path).unwrap();
        assert_eq!(batch.batch_id().get(), 12);
        assert_eq!(batch.available_quantity(), 400);
    }

    #[test]
    fn invalid_batch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write(
            dir.path(),
            "batch.json",
            r#"{"batch_id": 1, "quantity": 5, "minted_quantity": 9,
                "production_date": "2026-01-01T00:00:00Z",
                "expiry_date": "2027-01-01T00:00:00Z"}"#,
        );
        assert!(load_batch(&path).is_err());
    }

    #[test]
    fn missing_config_path_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), VerificationConfig::default());
    }

    #[test]
    fn yaml_config_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write(dir.path(), "cfg.yaml", "low_inventory_threshold: 25\n");
        assert_eq!(load_config(Some(&path)).unwrap().low_inventory_threshold, 25);
    }

    #[test]
    fn now_must_be_utc() {
        assert!(parse_now(Some("2026-06-01T00:00:00Z")).is_ok());
        assert!(parse_now(Some("2026-06-01T00:00:00+02:00")).is_err());
    }
}
