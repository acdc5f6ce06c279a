//! # Audit Cycle Planning
//!
//! The periodic audit is driven by an external scheduler. These helpers let
//! that scheduler decide whether a cycle is due and which batches to audit in
//! it, without the engine holding any timers or state of its own.
//!
//! Selection order is most-overdue first: never-verified batches lead, then
//! ascending `last_verified`, ties broken by ascending batch id. Expired
//! batches are reported but never selected; an audit cannot bring them back.

use serde::{Deserialize, Serialize};

use bean_core::{Batch, BatchId, Timestamp, VerificationConfig};

use crate::status::{derive_status, BatchStatus, StatusReport};

/// Whether the scheduler should run a cycle at `now`.
///
/// True when no cycle has ever run or at least `cycle_interval` seconds have
/// elapsed. A `last_cycle_at` in the future (clock skew) is never due.
pub fn is_cycle_due(
    last_cycle_at: Option<Timestamp>,
    now: Timestamp,
    config: &VerificationConfig,
) -> bool {
    match last_cycle_at {
        None => true,
        Some(last) => {
            let elapsed = now.seconds_since(&last);
            elapsed >= 0 && elapsed.unsigned_abs() >= config.cycle_interval
        }
    }
}

/// Derived status of one batch within a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStatusEntry {
    pub batch_id: BatchId,
    pub report: StatusReport,
}

/// Output of [`plan_audit_cycle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditCycle {
    /// The instant the plan was computed for.
    pub planned_at: Timestamp,
    /// Batches to audit this cycle, in priority order.
    pub selected: Vec<BatchId>,
    /// Batches whose audit is due but did not fit in this cycle.
    pub deferred: usize,
    /// Status of every input batch, ordered by batch id.
    pub statuses: Vec<BatchStatusEntry>,
}

impl AuditCycle {
    /// Entries that carry at least one alert, for the operator-facing feed.
    pub fn alerting(&self) -> impl Iterator<Item = &BatchStatusEntry> {
        self.statuses.iter().filter(|e| !e.report.alerts.is_empty())
    }
}

/// Derive every batch's status and select up to `max_batches_per_cycle`
/// due batches for audit.
pub fn plan_audit_cycle(
    batches: &[Batch],
    config: &VerificationConfig,
    now: Timestamp,
) -> AuditCycle {
    let derived: Vec<(&Batch, StatusReport)> = batches
        .iter()
        .map(|b| (b, derive_status(b, config, now)))
        .collect();

    let mut due: Vec<&Batch> = derived
        .iter()
        .filter(|(_, r)| r.verification_due() && r.status != BatchStatus::Expired)
        .map(|(b, _)| *b)
        .collect();
    // `None < Some(_)`, so never-verified batches sort first.
    due.sort_by_key(|b| (b.last_verified(), b.batch_id()));

    let mut statuses: Vec<BatchStatusEntry> = derived
        .into_iter()
        .map(|(b, report)| BatchStatusEntry {
            batch_id: b.batch_id(),
            report,
        })
        .collect();
    statuses.sort_by_key(|e| e.batch_id);

    let limit = usize::try_from(config.max_batches_per_cycle).unwrap_or(usize::MAX);
    let deferred = due.len().saturating_sub(limit);
    let selected: Vec<BatchId> = due.into_iter().take(limit).map(|b| b.batch_id()).collect();

    tracing::debug!(
        batches = batches.len(),
        selected = selected.len(),
        deferred,
        planned_at = %now,
        "planned audit cycle"
    );

    AuditCycle {
        planned_at: now,
        selected,
        deferred,
        statuses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bean_core::BatchDraft;

    const DAY: u64 = 86_400;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn config(max: u32) -> VerificationConfig {
        VerificationConfig {
            max_batches_per_cycle: max,
            ..VerificationConfig::default()
        }
    }

    fn batch(id: u64, verified: Option<&str>, expiry: &str) -> Batch {
        let mut d = BatchDraft::new(
            BatchId::new(id).unwrap(),
            100,
            ts("2026-01-01T00:00:00Z"),
            ts(expiry),
        );
        d.last_verified = verified.map(ts);
        d.validate().unwrap()
    }

    #[test]
    fn first_cycle_is_due() {
        assert!(is_cycle_due(None, ts("2026-01-01T00:00:00Z"), &config(5)));
    }

    #[test]
    fn cycle_due_after_interval() {
        let last = ts("2026-01-01T00:00:00Z");
        let cfg = config(5);
        assert!(!is_cycle_due(Some(last), last.saturating_add_secs(DAY - 1), &cfg));
        assert!(is_cycle_due(Some(last), last.saturating_add_secs(DAY), &cfg));
    }

    #[test]
    fn future_last_cycle_is_not_due() {
        let cfg = config(5);
        assert!(!is_cycle_due(
            Some(ts("2026-02-01T00:00:00Z")),
            ts("2026-01-01T00:00:00Z"),
            &cfg
        ));
    }

    #[test]
    fn selects_most_overdue_first_and_defers_rest() {
        let now = ts("2026-06-01T00:00:00Z");
        let batches = vec![
            batch(4, Some("2026-03-01T00:00:00Z"), "2027-01-01T00:00:00Z"),
            batch(2, None, "2027-01-01T00:00:00Z"),
            batch(3, Some("2026-02-01T00:00:00Z"), "2027-01-01T00:00:00Z"),
            batch(1, Some("2026-05-25T00:00:00Z"), "2027-01-01T00:00:00Z"),
        ];
        let plan = plan_audit_cycle(&batches, &config(2), now);

        let ids: Vec<u64> = plan.selected.iter().map(|b| b.get()).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(plan.deferred, 1);
        assert_eq!(plan.statuses.len(), 4);
        assert_eq!(plan.statuses[0].batch_id.get(), 1);
    }

    #[test]
    fn expired_batches_are_not_selected() {
        let now = ts("2026-06-01T00:00:00Z");
        let batches = vec![batch(9, None, "2026-05-01T00:00:00Z")];
        let plan = plan_audit_cycle(&batches, &config(5), now);
        assert!(plan.selected.is_empty());
        assert_eq!(plan.deferred, 0);
        assert_eq!(plan.alerting().count(), 1);
    }
}
