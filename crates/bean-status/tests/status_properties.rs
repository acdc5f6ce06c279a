//! Property tests for status derivation over arbitrary batches, thresholds,
//! and evaluation instants.

use bean_core::{Batch, BatchDraft, BatchId, Timestamp, VerificationConfig};
use bean_status::{derive_status, Alert, BatchStatus};
use proptest::prelude::*;

const BASE: i64 = 1_767_225_600; // 2026-01-01T00:00:00Z
const YEAR: i64 = 365 * 86_400;

fn arb_batch() -> impl Strategy<Value = Batch> {
    (
        1u64..10_000,
        0u64..500,
        0u64..=100,
        0i64..YEAR,
        1i64..2 * YEAR,
        prop::option::of(0i64..YEAR),
    )
        .prop_map(|(id, quantity, minted_pct, produced, shelf, verified)| {
            let production = Timestamp::from_epoch_secs(BASE + produced).unwrap();
            let expiry = Timestamp::from_epoch_secs(BASE + produced + shelf).unwrap();
            let mut draft = BatchDraft::new(BatchId::new(id).unwrap(), quantity, production, expiry);
            draft.minted_quantity = quantity * minted_pct / 100;
            draft.last_verified =
                verified.map(|v| Timestamp::from_epoch_secs(BASE + produced + v).unwrap());
            draft.validate().unwrap()
        })
}

fn arb_config() -> impl Strategy<Value = VerificationConfig> {
    (1u64..200, 0u64..90, 0u64..50, 1u64..400).prop_map(|(audit, warn, low, long)| {
        VerificationConfig {
            audit_interval: audit * 86_400,
            expiry_warning_threshold: warn * 86_400,
            low_inventory_threshold: low,
            long_storage_threshold: long * 86_400,
            ..VerificationConfig::default()
        }
    })
}

fn arb_now() -> impl Strategy<Value = Timestamp> {
    (-YEAR..4 * YEAR).prop_map(|offset| Timestamp::from_epoch_secs(BASE + offset).unwrap())
}

proptest! {
    /// Same inputs, same output.
    #[test]
    fn derivation_is_idempotent(batch in arb_batch(), cfg in arb_config(), now in arb_now()) {
        prop_assert_eq!(derive_status(&batch, &cfg, now), derive_status(&batch, &cfg, now));
    }

    /// Derivation never touches the quantity invariant.
    #[test]
    fn derivation_is_read_only(batch in arb_batch(), cfg in arb_config(), now in arb_now()) {
        let before = (batch.quantity(), batch.minted_quantity(), batch.available_quantity());
        let _ = derive_status(&batch, &cfg, now);
        prop_assert_eq!(before.2, before.0 - before.1);
        prop_assert_eq!(batch.available_quantity(), batch.quantity() - batch.minted_quantity());
        prop_assert_eq!((batch.quantity(), batch.minted_quantity(), batch.available_quantity()), before);
    }

    /// A past expiry date always wins.
    #[test]
    fn past_expiry_is_always_expired(batch in arb_batch(), cfg in arb_config(), extra in 1i64..YEAR) {
        let now = Timestamp::from_epoch_secs(batch.expiry_date().epoch_secs() + extra).unwrap();
        let report = derive_status(&batch, &cfg, now);
        prop_assert_eq!(report.status, BatchStatus::Expired);
        prop_assert!(report.has_alert(Alert::BatchExpired));
    }

    /// Sold-out batches never raise the low-inventory alert.
    #[test]
    fn sold_out_never_low_inventory(batch in arb_batch(), cfg in arb_config(), now in arb_now()) {
        let mut draft = BatchDraft::from(batch);
        draft.minted_quantity = draft.quantity;
        let sold_out = draft.validate().unwrap();
        let report = derive_status(&sold_out, &cfg, now);
        prop_assert!(!report.has_alert(Alert::LowInventory));
        prop_assert_ne!(report.status, BatchStatus::LowInventory);
    }

    /// The reported status is consistent with the alert set.
    #[test]
    fn status_matches_highest_priority_alert(batch in arb_batch(), cfg in arb_config(), now in arb_now()) {
        let report = derive_status(&batch, &cfg, now);
        let expected = if report.has_alert(Alert::BatchExpired) {
            BatchStatus::Expired
        } else if report.has_alert(Alert::VerificationOverdue) {
            BatchStatus::Pending
        } else if report.has_alert(Alert::LowInventory) {
            BatchStatus::LowInventory
        } else if report.has_alert(Alert::LongStorage) {
            BatchStatus::LongStorage
        } else {
            BatchStatus::Verified
        };
        prop_assert_eq!(report.status, expected);
    }
}
