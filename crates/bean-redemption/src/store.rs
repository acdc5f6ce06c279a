//! # Store Contracts
//!
//! The engine reads and writes batches, balances and configuration through
//! three narrow traits. Hosts plug in their own persistence; the in-memory
//! implementations here back the tests and the CLI.
//!
//! ## Atomicity
//!
//! [`BalanceStore::decrement_balance`] must check and decrement in one step.
//! The in-memory store does both under a single write lock, so a balance can
//! never go negative no matter how many callers race.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use bean_core::{Batch, BatchId, HolderId, Timestamp, VerificationConfig, VerificationConfigPatch};

use crate::error::RedemptionError;

/// Source of batch records.
pub trait BatchStore: Send + Sync {
    fn get_batch(&self, id: BatchId) -> Result<Batch, RedemptionError>;

    fn list_batches(&self) -> Vec<Batch>;

    /// Apply a signed delta to the batch's minted counter, returning the
    /// updated record.
    fn adjust_minted(&self, id: BatchId, delta: i64) -> Result<Batch, RedemptionError>;
}

/// Per-(batch, holder) token balances.
pub trait BalanceStore: Send + Sync {
    /// Current balance, zero when the holder has never been credited.
    fn get_balance(&self, batch_id: BatchId, holder: &HolderId) -> u64;

    /// Atomically subtract `amount`, returning the new balance, or fail with
    /// [`RedemptionError::InsufficientBalance`] leaving the balance unchanged.
    fn decrement_balance(
        &self,
        batch_id: BatchId,
        holder: &HolderId,
        amount: u64,
    ) -> Result<u64, RedemptionError>;

    /// Add `amount`, returning the new balance.
    fn credit_balance(
        &self,
        batch_id: BatchId,
        holder: &HolderId,
        amount: u64,
    ) -> Result<u64, RedemptionError>;
}

/// Holder of the active [`VerificationConfig`].
pub trait ConfigStore: Send + Sync {
    fn verification_config(&self) -> Result<VerificationConfig, RedemptionError>;

    /// Merge `patch` into the active config. The old config stays in place
    /// if the merged one fails validation.
    fn update_verification_config(
        &self,
        patch: &VerificationConfigPatch,
    ) -> Result<VerificationConfig, RedemptionError>;
}

// ─── In-Memory Batch Store ───────────────────────────────────────────

/// Thread-safe, cloneable in-memory batch store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBatchStore {
    batches: Arc<RwLock<HashMap<BatchId, Batch>>>,
}

impl InMemoryBatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a batch, returning the previous record with the same id.
    pub fn insert(&self, batch: Batch) -> Option<Batch> {
        self.batches.write().insert(batch.batch_id(), batch)
    }

    /// Record a successful audit on a stored batch.
    pub fn record_verification(
        &self,
        id: BatchId,
        at: Timestamp,
    ) -> Result<Batch, RedemptionError> {
        let mut guard = self.batches.write();
        let batch = guard.get_mut(&id).ok_or(RedemptionError::BatchNotFound(id))?;
        batch.record_verification(at)?;
        Ok(batch.clone())
    }

    pub fn len(&self) -> usize {
        self.batches.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BatchStore for InMemoryBatchStore {
    fn get_batch(&self, id: BatchId) -> Result<Batch, RedemptionError> {
        self.batches
            .read()
            .get(&id)
            .cloned()
            .ok_or(RedemptionError::BatchNotFound(id))
    }

    fn list_batches(&self) -> Vec<Batch> {
        let mut all: Vec<Batch> = self.batches.read().values().cloned().collect();
        all.sort_by_key(|b| b.batch_id());
        all
    }

    fn adjust_minted(&self, id: BatchId, delta: i64) -> Result<Batch, RedemptionError> {
        let mut guard = self.batches.write();
        let batch = guard.get_mut(&id).ok_or(RedemptionError::BatchNotFound(id))?;
        batch.adjust_minted(delta)?;
        Ok(batch.clone())
    }
}

// ─── In-Memory Balance Store ─────────────────────────────────────────

/// Thread-safe, cloneable in-memory balance ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBalanceStore {
    balances: Arc<RwLock<HashMap<(BatchId, HolderId), u64>>>,
}

impl InMemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a balance. Intended for seeding.
    pub fn set_balance(&self, batch_id: BatchId, holder: HolderId, amount: u64) {
        self.balances.write().insert((batch_id, holder), amount);
    }

    /// Snapshot of every balance, ordered by batch then holder.
    pub fn entries(&self) -> Vec<(BatchId, HolderId, u64)> {
        let mut all: Vec<(BatchId, HolderId, u64)> = self
            .balances
            .read()
            .iter()
            .map(|((batch_id, holder), amount)| (*batch_id, holder.clone(), *amount))
            .collect();
        all.sort();
        all
    }
}

impl BalanceStore for InMemoryBalanceStore {
    fn get_balance(&self, batch_id: BatchId, holder: &HolderId) -> u64 {
        self.balances
            .read()
            .get(&(batch_id, holder.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn decrement_balance(
        &self,
        batch_id: BatchId,
        holder: &HolderId,
        amount: u64,
    ) -> Result<u64, RedemptionError> {
        let mut guard = self.balances.write();
        let current = guard.get(&(batch_id, holder.clone())).copied().unwrap_or(0);
        let Some(next) = current.checked_sub(amount) else {
            return Err(RedemptionError::InsufficientBalance {
                batch_id,
                holder: holder.clone(),
                requested: amount,
                available: current,
            });
        };
        guard.insert((batch_id, holder.clone()), next);
        Ok(next)
    }

    fn credit_balance(
        &self,
        batch_id: BatchId,
        holder: &HolderId,
        amount: u64,
    ) -> Result<u64, RedemptionError> {
        let mut guard = self.balances.write();
        let entry = guard.entry((batch_id, holder.clone())).or_insert(0);
        let next = entry.checked_add(amount).ok_or_else(|| {
            RedemptionError::InvalidInput(format!(
                "crediting {amount} to {holder} on {batch_id} overflows the balance"
            ))
        })?;
        *entry = next;
        Ok(next)
    }
}

// ─── In-Memory Config Store ──────────────────────────────────────────

/// Thread-safe holder of the active configuration.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConfigStore {
    config: Arc<RwLock<Option<VerificationConfig>>>,
}

impl InMemoryConfigStore {
    pub fn new(config: VerificationConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(Some(config))),
        }
    }

    /// A store with no configuration; reads fail with `ConfigMissing`.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn verification_config(&self) -> Result<VerificationConfig, RedemptionError> {
        self.config
            .read()
            .clone()
            .ok_or_else(|| RedemptionError::ConfigMissing("verification config".to_string()))
    }

    fn update_verification_config(
        &self,
        patch: &VerificationConfigPatch,
    ) -> Result<VerificationConfig, RedemptionError> {
        let mut guard = self.config.write();
        let current = guard
            .as_ref()
            .ok_or_else(|| RedemptionError::ConfigMissing("verification config".to_string()))?;
        let updated = current.apply(patch)?;
        *guard = Some(updated.clone());
        tracing::info!(?patch, "verification config updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bean_core::BatchDraft;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn batch(id: u64) -> Batch {
        BatchDraft::new(
            BatchId::new(id).unwrap(),
            100,
            ts("2026-01-01T00:00:00Z"),
            ts("2027-01-01T00:00:00Z"),
        )
        .validate()
        .unwrap()
    }

    fn holder() -> HolderId {
        HolderId::new("0xabc").unwrap()
    }

    #[test]
    fn batch_store_round_trip() {
        let store = InMemoryBatchStore::new();
        store.insert(batch(2));
        store.insert(batch(1));
        assert_eq!(store.len(), 2);
        let ids: Vec<u64> = store.list_batches().iter().map(|b| b.batch_id().get()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(matches!(
            store.get_batch(BatchId::new(9).unwrap()),
            Err(RedemptionError::BatchNotFound(_))
        ));
    }

    #[test]
    fn adjust_minted_respects_bounds() {
        let store = InMemoryBatchStore::new();
        store.insert(batch(1));
        let id = BatchId::new(1).unwrap();
        assert_eq!(store.adjust_minted(id, 60).unwrap().minted_quantity(), 60);
        assert!(matches!(
            store.adjust_minted(id, 41),
            Err(RedemptionError::InvalidInput(_))
        ));
        assert_eq!(store.get_batch(id).unwrap().minted_quantity(), 60);
        assert_eq!(store.adjust_minted(id, -60).unwrap().minted_quantity(), 0);
    }

    #[test]
    fn decrement_never_goes_negative() {
        let store = InMemoryBalanceStore::new();
        let id = BatchId::new(1).unwrap();
        store.set_balance(id, holder(), 5);
        assert_eq!(store.decrement_balance(id, &holder(), 3).unwrap(), 2);
        let err = store.decrement_balance(id, &holder(), 3).unwrap_err();
        assert!(matches!(
            err,
            RedemptionError::InsufficientBalance { requested: 3, available: 2, .. }
        ));
        assert_eq!(store.get_balance(id, &holder()), 2);
    }

    #[test]
    fn unknown_holder_has_zero_balance() {
        let store = InMemoryBalanceStore::new();
        let id = BatchId::new(1).unwrap();
        assert_eq!(store.get_balance(id, &holder()), 0);
        assert_eq!(store.credit_balance(id, &holder(), 7).unwrap(), 7);
        assert_eq!(store.get_balance(id, &holder()), 7);
        assert_eq!(store.entries(), vec![(id, holder(), 7)]);
    }

    #[test]
    fn credit_overflow_rejected() {
        let store = InMemoryBalanceStore::new();
        let id = BatchId::new(1).unwrap();
        store.set_balance(id, holder(), u64::MAX);
        assert!(store.credit_balance(id, &holder(), 1).is_err());
        assert_eq!(store.get_balance(id, &holder()), u64::MAX);
    }

    #[test]
    fn config_missing_fails_closed() {
        let store = InMemoryConfigStore::empty();
        assert!(matches!(
            store.verification_config(),
            Err(RedemptionError::ConfigMissing(_))
        ));
        assert!(matches!(
            store.update_verification_config(&VerificationConfigPatch::default()),
            Err(RedemptionError::ConfigMissing(_))
        ));
    }

    #[test]
    fn invalid_patch_keeps_old_config() {
        let store = InMemoryConfigStore::new(VerificationConfig::default());
        let bad = VerificationConfigPatch {
            audit_interval: Some(0),
            ..Default::default()
        };
        assert!(store.update_verification_config(&bad).is_err());
        assert_eq!(store.verification_config().unwrap(), VerificationConfig::default());

        let good = VerificationConfigPatch {
            low_inventory_threshold: Some(25),
            ..Default::default()
        };
        let updated = store.update_verification_config(&good).unwrap();
        assert_eq!(updated.low_inventory_threshold, 25);
        assert_eq!(store.verification_config().unwrap().low_inventory_threshold, 25);
    }

    #[test]
    fn record_verification_on_stored_batch() {
        let store = InMemoryBatchStore::new();
        store.insert(batch(1));
        let id = BatchId::new(1).unwrap();
        let b = store.record_verification(id, ts("2026-03-01T00:00:00Z")).unwrap();
        assert_eq!(b.last_verified(), Some(ts("2026-03-01T00:00:00Z")));
        assert!(store.record_verification(id, ts("2025-01-01T00:00:00Z")).is_err());
    }
}
