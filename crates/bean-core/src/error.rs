//! # Error Types
//!
//! Errors shared by every crate in the workspace. Crate-specific errors
//! (e.g. redemption failures) convert from [`BeanError`] with a `From` impl.
//!
//! None of these errors is transient: each one describes caller input or a
//! state conflict, so retrying without new information cannot succeed.

use thiserror::Error;

use crate::identity::BatchId;

/// Top-level error type for the batch lifecycle engine.
#[derive(Error, Debug)]
pub enum BeanError {
    /// Caller-supplied data failed validation (non-positive quantity,
    /// malformed dates, out-of-range thresholds).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The referenced batch does not exist in the batch store.
    #[error("batch {0} not found")]
    BatchNotFound(BatchId),

    /// A required configuration record is absent.
    #[error("configuration missing: {0}")]
    ConfigMissing(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for BeanError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for BeanError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
