//! # Redemption Policy
//!
//! Which derived batch statuses accept new redemption requests, and whether
//! open requests reserve part of the holder's balance.

use serde::{Deserialize, Serialize};

use bean_status::BatchStatus;

/// Operator-tunable redemption rules.
///
/// `Expired` and `Pending` batches are never redeemable. `Verified` always is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedemptionPolicy {
    /// Accept requests against batches that are running low.
    pub allow_low_inventory: bool,
    /// Accept requests against batches in long storage.
    pub allow_long_storage: bool,
    /// Count open requests against the balance when creating a new one.
    pub soft_reserve: bool,
}

impl Default for RedemptionPolicy {
    fn default() -> Self {
        Self {
            allow_low_inventory: true,
            allow_long_storage: true,
            soft_reserve: true,
        }
    }
}

impl RedemptionPolicy {
    /// Only `Verified` batches accept redemptions.
    pub fn strict() -> Self {
        Self {
            allow_low_inventory: false,
            allow_long_storage: false,
            soft_reserve: true,
        }
    }

    pub fn permits(&self, status: BatchStatus) -> bool {
        match status {
            BatchStatus::Verified => true,
            BatchStatus::LowInventory => self.allow_low_inventory,
            BatchStatus::LongStorage => self.allow_long_storage,
            BatchStatus::Pending | BatchStatus::Expired => false,
        }
    }
}
