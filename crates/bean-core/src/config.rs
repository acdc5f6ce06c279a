//! # Verification Configuration
//!
//! Operator-tunable thresholds read by the status engine and the audit-cycle
//! planner. The engine only ever reads a [`VerificationConfig`]; changes go
//! through [`VerificationConfig::apply`] with a [`VerificationConfigPatch`],
//! which validates the merged result before it replaces the old record.
//!
//! Durations are whole seconds. `low_inventory_threshold` is in units.
//!
//! ## Loading
//!
//! Configuration files are YAML or JSON (chosen by extension). Missing keys
//! fall back to the defaults below:
//!
//! | Field                      | Default          |
//! |----------------------------|------------------|
//! | `audit_interval`           | 30 days          |
//! | `expiry_warning_threshold` | 30 days          |
//! | `low_inventory_threshold`  | 10 units         |
//! | `long_storage_threshold`   | 180 days         |
//! | `max_batches_per_cycle`    | 50               |
//! | `cycle_interval`           | 24 hours         |

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BeanError;

const DAY_SECS: u64 = 86_400;

/// Thresholds driving status derivation and audit scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Seconds between required audits.
    pub audit_interval: u64,
    /// Seconds before expiry at which the "expiring soon" alert starts.
    /// Zero disables the alert.
    pub expiry_warning_threshold: u64,
    /// Available units at or below which a batch is low on inventory.
    /// Zero disables the rule.
    pub low_inventory_threshold: u64,
    /// Seconds since production after which a batch is in long storage.
    pub long_storage_threshold: u64,
    /// Maximum number of batches audited per scheduler cycle.
    pub max_batches_per_cycle: u32,
    /// Seconds between scheduler cycles.
    pub cycle_interval: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            audit_interval: 30 * DAY_SECS,
            expiry_warning_threshold: 30 * DAY_SECS,
            low_inventory_threshold: 10,
            long_storage_threshold: 180 * DAY_SECS,
            max_batches_per_cycle: 50,
            cycle_interval: DAY_SECS,
        }
    }
}

impl VerificationConfig {
    /// Check that every interval is usable.
    pub fn validate(&self) -> Result<(), BeanError> {
        let nonzero = [
            ("audit_interval", self.audit_interval),
            ("long_storage_threshold", self.long_storage_threshold),
            ("cycle_interval", self.cycle_interval),
            ("max_batches_per_cycle", u64::from(self.max_batches_per_cycle)),
        ];
        for (name, value) in nonzero {
            if value == 0 {
                return Err(BeanError::InvalidInput(format!(
                    "{name} must be greater than zero"
                )));
            }
        }
        if i64::try_from(self.audit_interval).is_err()
            || i64::try_from(self.long_storage_threshold).is_err()
            || i64::try_from(self.expiry_warning_threshold).is_err()
            || i64::try_from(self.cycle_interval).is_err()
        {
            return Err(BeanError::InvalidInput(
                "durations must fit in a signed 64-bit second count".to_string(),
            ));
        }
        Ok(())
    }

    /// Merge `patch` over this config and validate the result.
    ///
    /// `self` is never modified; on error the caller keeps the old config.
    pub fn apply(&self, patch: &VerificationConfigPatch) -> Result<Self, BeanError> {
        let merged = Self {
            audit_interval: patch.audit_interval.unwrap_or(self.audit_interval),
            expiry_warning_threshold: patch
                .expiry_warning_threshold
                .unwrap_or(self.expiry_warning_threshold),
            low_inventory_threshold: patch
                .low_inventory_threshold
                .unwrap_or(self.low_inventory_threshold),
            long_storage_threshold: patch
                .long_storage_threshold
                .unwrap_or(self.long_storage_threshold),
            max_batches_per_cycle: patch
                .max_batches_per_cycle
                .unwrap_or(self.max_batches_per_cycle),
            cycle_interval: patch.cycle_interval.unwrap_or(self.cycle_interval),
        };
        merged.validate()?;
        Ok(merged)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(s: &str) -> Result<Self, BeanError> {
        let cfg: Self = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, BeanError> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a `.json`, `.yaml`, or `.yml` file.
    pub fn load(path: &Path) -> Result<Self, BeanError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            other => Err(BeanError::InvalidInput(format!(
                "unsupported config extension {other:?} for {}",
                path.display()
            ))),
        }
    }
}

/// Partial update for [`VerificationConfig`]. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfigPatch {
    pub audit_interval: Option<u64>,
    pub expiry_warning_threshold: Option<u64>,
    pub low_inventory_threshold: Option<u64>,
    pub long_storage_threshold: Option<u64>,
    pub max_batches_per_cycle: Option<u32>,
    pub cycle_interval: Option<u64>,
}

impl VerificationConfigPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
