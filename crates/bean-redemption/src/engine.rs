//! # Redemption Engine
//!
//! Owns the redemption request records and enforces the balance rules
//! around them.
//!
//! ## Critical Sections
//!
//! Every balance-sensitive step runs while holding a mutex keyed by
//! `(batch_id, holder)`:
//!
//! - **create**: read balance, subtract open reservations, compare, insert.
//! - **advance to Fulfilled**: decrement balance, then record the transition.
//!
//! Two requests from the same holder on the same batch therefore never both
//! pass the balance check when their combined quantity exceeds it. Requests
//! for different holdings proceed in parallel.
//!
//! A holding's mutex lives only while some caller holds or waits on it. The
//! last caller out removes it from the lock table, so the table stays sized
//! to the holdings in flight rather than every holding ever touched.
//!
//! Status derivation runs before the lock is taken; it is pure and only
//! gates whether the batch accepts redemptions at all.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};

use bean_core::{BatchId, HolderId, RedemptionId, Timestamp};
use bean_status::derive_status;

use crate::error::RedemptionError;
use crate::policy::RedemptionPolicy;
use crate::request::{DeliveryInfo, RedemptionRequest, RedemptionStatus};
use crate::store::{BalanceStore, BatchStore, ConfigStore};

type HoldingKey = (BatchId, HolderId);

/// Balance-gated redemption over pluggable stores.
pub struct RedemptionEngine {
    batches: Arc<dyn BatchStore>,
    balances: Arc<dyn BalanceStore>,
    config: Arc<dyn ConfigStore>,
    policy: RedemptionPolicy,
    requests: RwLock<HashMap<RedemptionId, RedemptionRequest>>,
    holdings: DashMap<HoldingKey, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for RedemptionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedemptionEngine")
            .field("policy", &self.policy)
            .field("requests", &self.requests.read().len())
            .field("holdings", &self.holdings.len())
            .finish_non_exhaustive()
    }
}

impl RedemptionEngine {
    pub fn new(
        batches: Arc<dyn BatchStore>,
        balances: Arc<dyn BalanceStore>,
        config: Arc<dyn ConfigStore>,
    ) -> Self {
        Self::with_policy(batches, balances, config, RedemptionPolicy::default())
    }

    pub fn with_policy(
        batches: Arc<dyn BatchStore>,
        balances: Arc<dyn BalanceStore>,
        config: Arc<dyn ConfigStore>,
        policy: RedemptionPolicy,
    ) -> Self {
        Self {
            batches,
            balances,
            config,
            policy,
            requests: RwLock::new(HashMap::new()),
            holdings: DashMap::new(),
        }
    }

    pub fn policy(&self) -> &RedemptionPolicy {
        &self.policy
    }

    /// Create a redemption request evaluated at the current wall-clock time.
    pub fn create_redemption(
        &self,
        batch_id: BatchId,
        consumer: HolderId,
        quantity: u64,
        delivery_info: &str,
    ) -> Result<RedemptionRequest, RedemptionError> {
        self.create_redemption_at(batch_id, consumer, quantity, delivery_info, Timestamp::now())
    }

    /// Create a redemption request, deriving the batch status at `now`.
    ///
    /// On any error no request is recorded.
    pub fn create_redemption_at(
        &self,
        batch_id: BatchId,
        consumer: HolderId,
        quantity: u64,
        delivery_info: &str,
        now: Timestamp,
    ) -> Result<RedemptionRequest, RedemptionError> {
        if quantity == 0 {
            return Err(RedemptionError::InvalidInput(
                "redemption quantity must be greater than zero".to_string(),
            ));
        }
        let delivery_info = DeliveryInfo::new(delivery_info)?;

        let batch = self.batches.get_batch(batch_id)?;
        let config = self.config.verification_config()?;
        let report = derive_status(&batch, &config, now);
        if !self.policy.permits(report.status) {
            tracing::warn!(
                batch_id = %batch_id,
                holder = %consumer,
                status = %report.status,
                "redemption rejected: batch not redeemable"
            );
            return Err(RedemptionError::BatchNotRedeemable {
                batch_id,
                status: report.status,
            });
        }

        self.with_holding((batch_id, consumer.clone()), || {
            self.reserve(batch_id, consumer, quantity, delivery_info, now)
        })
    }

    /// Balance check and insert. Caller holds the holding lock.
    fn reserve(
        &self,
        batch_id: BatchId,
        consumer: HolderId,
        quantity: u64,
        delivery_info: DeliveryInfo,
        now: Timestamp,
    ) -> Result<RedemptionRequest, RedemptionError> {
        let balance = self.balances.get_balance(batch_id, &consumer);
        let reserved = if self.policy.soft_reserve {
            self.open_quantity(batch_id, &consumer)
        } else {
            0
        };
        let available = balance.saturating_sub(reserved);
        if quantity > available {
            tracing::warn!(
                batch_id = %batch_id,
                holder = %consumer,
                requested = quantity,
                balance,
                reserved,
                "redemption rejected: insufficient balance"
            );
            return Err(RedemptionError::InsufficientBalance {
                batch_id,
                holder: consumer,
                requested: quantity,
                available,
            });
        }

        let request = RedemptionRequest::new(batch_id, consumer, quantity, delivery_info, now)?;
        self.requests.write().insert(request.id, request.clone());

        tracing::info!(
            redemption_id = %request.id,
            batch_id = %batch_id,
            holder = %request.consumer,
            quantity,
            "redemption requested"
        );
        Ok(request)
    }

    /// Move a request to `target` at the current wall-clock time.
    pub fn advance_redemption(
        &self,
        id: RedemptionId,
        target: RedemptionStatus,
    ) -> Result<RedemptionRequest, RedemptionError> {
        self.advance_redemption_at(id, target, Timestamp::now())
    }

    /// Move a request to `target`.
    ///
    /// Advancing to `Fulfilled` decrements the holder's balance by the
    /// request quantity in the same critical section. If the decrement fails
    /// the request keeps its current status.
    pub fn advance_redemption_at(
        &self,
        id: RedemptionId,
        target: RedemptionStatus,
        now: Timestamp,
    ) -> Result<RedemptionRequest, RedemptionError> {
        let snapshot = self.get_request(id)?;
        self.with_holding((snapshot.batch_id, snapshot.consumer), || {
            self.apply_transition(id, target, now)
        })
    }

    /// Transition and, for `Fulfilled`, the balance decrement. Caller holds
    /// the holding lock.
    fn apply_transition(
        &self,
        id: RedemptionId,
        target: RedemptionStatus,
        now: Timestamp,
    ) -> Result<RedemptionRequest, RedemptionError> {
        // Re-read under the holding lock; another caller may have advanced it.
        let current = self.get_request(id)?;
        if let Err(e) = current.check_transition(target) {
            tracing::warn!(
                redemption_id = %id,
                from = %current.status,
                to = %target,
                "redemption transition rejected"
            );
            return Err(e);
        }

        if target == RedemptionStatus::Fulfilled {
            let remaining = self
                .balances
                .decrement_balance(current.batch_id, &current.consumer, current.quantity)
                .map_err(|e| {
                    tracing::warn!(redemption_id = %id, error = %e, "fulfillment rejected");
                    e
                })?;
            tracing::debug!(redemption_id = %id, remaining, "balance decremented");
        }

        let mut requests = self.requests.write();
        let request = requests
            .get_mut(&id)
            .ok_or(RedemptionError::RequestNotFound(id))?;
        request.transition(target, now)?;

        tracing::info!(
            redemption_id = %id,
            batch_id = %request.batch_id,
            holder = %request.consumer,
            from = %current.status,
            to = %target,
            "redemption advanced"
        );
        Ok(request.clone())
    }

    pub fn get_request(&self, id: RedemptionId) -> Result<RedemptionRequest, RedemptionError> {
        self.requests
            .read()
            .get(&id)
            .cloned()
            .ok_or(RedemptionError::RequestNotFound(id))
    }

    /// All requests by `holder` against `batch_id`, oldest first.
    pub fn requests_for_holder(&self, batch_id: BatchId, holder: &HolderId) -> Vec<RedemptionRequest> {
        let mut found: Vec<RedemptionRequest> = self
            .requests
            .read()
            .values()
            .filter(|r| r.batch_id == batch_id && &r.consumer == holder)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.created_at);
        found
    }

    /// Every request, oldest first.
    pub fn all_requests(&self) -> Vec<RedemptionRequest> {
        let mut all: Vec<RedemptionRequest> = self.requests.read().values().cloned().collect();
        all.sort_by_key(|r| r.created_at);
        all
    }

    /// Load previously persisted requests, replacing any with the same id.
    ///
    /// Each record is inserted under its holding lock, so a restore racing a
    /// create or advance on the same holding lands before or after it, never
    /// between the balance step and the status change. A replacement is
    /// expected to keep the batch and holder of the record it replaces.
    pub fn restore(&self, requests: impl IntoIterator<Item = RedemptionRequest>) {
        for request in requests {
            self.with_holding((request.batch_id, request.consumer.clone()), || {
                self.requests.write().insert(request.id, request);
            });
        }
    }

    /// Quantity held by `holder`'s open requests on `batch_id`.
    pub fn open_quantity(&self, batch_id: BatchId, holder: &HolderId) -> u64 {
        self.requests
            .read()
            .values()
            .filter(|r| r.batch_id == batch_id && &r.consumer == holder && r.is_open())
            .fold(0u64, |acc, r| acc.saturating_add(r.quantity))
    }

    /// Run `f` under the mutex for `key`, then drop the mutex from the table
    /// if no other caller holds a handle to it.
    fn with_holding<T>(&self, key: HoldingKey, f: impl FnOnce() -> T) -> T {
        let lock = self.holdings.entry(key.clone()).or_default().clone();
        let out = {
            let _guard = lock.lock();
            f()
        };
        drop(lock);
        // Clones are only taken under the shard lock, so a count of one here
        // means nobody holds or waits on this mutex.
        self.holdings.remove_if(&key, |_, l| Arc::strong_count(l) == 1);
        out
    }
}
