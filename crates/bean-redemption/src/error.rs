//! # Redemption Error Types
//!
//! Every variant carries enough context to render a user-visible message
//! ("insufficient balance: requested 5, available 2") without consulting
//! logs. None of them is retryable.

use thiserror::Error;

use bean_core::{BatchId, BeanError, HolderId, RedemptionId};
use bean_status::BatchStatus;

use crate::request::RedemptionStatus;

/// Errors arising from redemption and issuance operations.
#[derive(Error, Debug)]
pub enum RedemptionError {
    /// Caller input failed validation (zero quantity, empty delivery info).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The holder's balance cannot cover the request.
    #[error(
        "insufficient balance for {holder} on {batch_id}: requested {requested}, available {available}"
    )]
    InsufficientBalance {
        batch_id: BatchId,
        holder: HolderId,
        requested: u64,
        /// Balance left after open reservations.
        available: u64,
    },

    /// The request cannot move from its current status to the target.
    #[error("invalid redemption transition: {from} -> {to}")]
    InvalidTransition {
        from: RedemptionStatus,
        to: RedemptionStatus,
    },

    /// The referenced batch does not exist.
    #[error("batch {0} not found")]
    BatchNotFound(BatchId),

    /// The referenced redemption request does not exist.
    #[error("redemption request {0} not found")]
    RequestNotFound(RedemptionId),

    /// The batch's derived status does not permit redemption.
    #[error("{batch_id} is not redeemable in status {status}")]
    BatchNotRedeemable {
        batch_id: BatchId,
        status: BatchStatus,
    },

    /// The verification configuration is unavailable.
    #[error("configuration missing: {0}")]
    ConfigMissing(String),

    /// Any other core failure.
    #[error(transparent)]
    Core(BeanError),
}

impl From<BeanError> for RedemptionError {
    fn from(e: BeanError) -> Self {
        match e {
            BeanError::InvalidInput(msg) => Self::InvalidInput(msg),
            BeanError::BatchNotFound(id) => Self::BatchNotFound(id),
            BeanError::ConfigMissing(what) => Self::ConfigMissing(what),
            other => Self::Core(other),
        }
    }
}
