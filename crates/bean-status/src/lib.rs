//! # bean-status — Batch Status Derivation
//!
//! Derives a batch's operational status and active alerts from its raw
//! attributes, the [`VerificationConfig`](bean_core::VerificationConfig)
//! thresholds, and the caller's notion of "now".
//!
//! ## Derivation, Not Storage
//!
//! Status is never persisted. [`derive_status`] is pure and stateless: the
//! same inputs always produce the same [`StatusReport`], so any number of
//! concurrent callers may recompute it without coordination. Staleness is
//! bounded only by how fresh the input batch record is.
//!
//! ## Priority
//!
//! ```text
//! Expired > Pending > LowInventory > LongStorage > Verified
//! ```
//!
//! The first matching condition names the status. Every condition that holds
//! contributes its alert regardless of which status won.
//!
//! ## Scheduling
//!
//! The engine owns no timers. [`cycle`] provides pure planning helpers for
//! the external scheduler that drives periodic audits.

pub mod cycle;
pub mod status;

pub use cycle::{is_cycle_due, plan_audit_cycle, AuditCycle, BatchStatusEntry};
pub use status::{derive_status, Alert, BatchStatus, StatusReport};
