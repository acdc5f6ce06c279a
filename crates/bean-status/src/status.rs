//! # Status Derivation Engine
//!
//! ## Rules
//!
//! | Condition                                       | Status         | Alert                     |
//! |-------------------------------------------------|----------------|---------------------------|
//! | `expiry_date < now`                             | `Expired`      | `"batch expired"`         |
//! | never verified, or `now > last + audit_interval`| `Pending`      | `"verification overdue"`  |
//! | `0 < available ≤ low_inventory_threshold`       | `LowInventory` | `"low inventory warning"` |
//! | `now - production_date ≥ long_storage_threshold`| `LongStorage`  | `"long storage warning"`  |
//! | not expired, `expiry - now ≤ warning window`    | (none)         | `"expiring soon"`         |
//! | none of the above                               | `Verified`     |                           |
//!
//! Negative elapsed time (the record was stamped by a clock ahead of the
//! caller's) never makes anything due.

use serde::{Deserialize, Serialize};

use bean_core::{Batch, Timestamp, VerificationConfig};

/// The primary status label of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    /// No threshold condition holds.
    Verified,
    /// The periodic audit is overdue (or never happened).
    Pending,
    /// Past its expiry date.
    Expired,
    /// Available units at or below the low-inventory floor.
    LowInventory,
    /// Held longer than the long-storage window.
    LongStorage,
}

impl BatchStatus {
    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "VERIFIED",
            Self::Pending => "PENDING",
            Self::Expired => "EXPIRED",
            Self::LowInventory => "LOW_INVENTORY",
            Self::LongStorage => "LONG_STORAGE",
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operator-facing alert. Serializes as its message string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alert {
    #[serde(rename = "verification overdue")]
    VerificationOverdue,
    #[serde(rename = "batch expired")]
    BatchExpired,
    #[serde(rename = "expiring soon")]
    ExpiringSoon,
    #[serde(rename = "low inventory warning")]
    LowInventory,
    #[serde(rename = "long storage warning")]
    LongStorage,
}

impl Alert {
    /// The alert message.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VerificationOverdue => "verification overdue",
            Self::BatchExpired => "batch expired",
            Self::ExpiringSoon => "expiring soon",
            Self::LowInventory => "low inventory warning",
            Self::LongStorage => "long storage warning",
        }
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`derive_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Highest-priority matching status.
    pub status: BatchStatus,
    /// Every alert whose condition holds, in rule order.
    pub alerts: Vec<Alert>,
    /// When the next audit is due. `None` if the batch was never verified
    /// (it is due immediately).
    pub next_verification_due: Option<Timestamp>,
}

impl StatusReport {
    /// Whether `alert` is active.
    pub fn has_alert(&self, alert: Alert) -> bool {
        self.alerts.contains(&alert)
    }

    /// Whether the periodic audit is due.
    pub fn verification_due(&self) -> bool {
        self.has_alert(Alert::VerificationOverdue)
    }
}

/// Derive the status and alert set of `batch` at `now`.
pub fn derive_status(batch: &Batch, config: &VerificationConfig, now: Timestamp) -> StatusReport {
    let next_verification_due = batch
        .last_verified()
        .map(|at| at.saturating_add_secs(config.audit_interval));

    let overdue = match next_verification_due {
        None => true,
        Some(due) => now > due,
    };
    let expired = batch.expiry_date() < now;
    let expiring_soon = !expired
        && config.expiry_warning_threshold > 0
        && batch.expiry_date().seconds_since(&now) <= secs_i64(config.expiry_warning_threshold);
    let available = batch.available_quantity();
    let low_inventory = available > 0 && available <= config.low_inventory_threshold;
    let long_storage =
        now.seconds_since(&batch.production_date()) >= secs_i64(config.long_storage_threshold);

    let mut alerts = Vec::new();
    if overdue {
        alerts.push(Alert::VerificationOverdue);
    }
    if expired {
        alerts.push(Alert::BatchExpired);
    }
    if expiring_soon {
        alerts.push(Alert::ExpiringSoon);
    }
    if low_inventory {
        alerts.push(Alert::LowInventory);
    }
    if long_storage {
        alerts.push(Alert::LongStorage);
    }

    let status = if expired {
        BatchStatus::Expired
    } else if overdue {
        BatchStatus::Pending
    } else if low_inventory {
        BatchStatus::LowInventory
    } else if long_storage {
        BatchStatus::LongStorage
    } else {
        BatchStatus::Verified
    };

    tracing::trace!(
        batch_id = %batch.batch_id(),
        status = %status,
        alerts = alerts.len(),
        "derived batch status"
    );

    StatusReport {
        status,
        alerts,
        next_verification_due,
    }
}

/// Thresholds are validated to fit in `i64`; clamp anything that slipped
/// past validation so comparisons stay monotone.
fn secs_i64(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX)
}
