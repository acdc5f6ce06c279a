//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers the engine passes around. Type-level
//! distinction prevents a holder identity from being used as a batch id or a
//! redemption id, which matters because the redemption critical section is
//! keyed by `(BatchId, HolderId)`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BeanError;

/// Unique, immutable, strictly positive identifier of a coffee batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct BatchId(u64);

impl BatchId {
    /// Create a batch id, rejecting zero.
    pub fn new(id: u64) -> Result<Self, BeanError> {
        if id == 0 {
            return Err(BeanError::InvalidInput(
                "batch id must be a positive integer".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// The raw integer value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for BatchId {
    type Error = BeanError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<BatchId> for u64 {
    fn from(id: BatchId) -> Self {
        id.0
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "batch:{}", self.0)
    }
}

/// Identity of a token holder (wallet address or account handle).
///
/// Opaque to the engine; only non-emptiness is enforced. Surrounding
/// whitespace is trimmed so `" 0xabc"` and `"0xabc"` address the same
/// balance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HolderId(String);

impl HolderId {
    /// Create a holder id, rejecting empty or whitespace-only strings.
    pub fn new(s: impl Into<String>) -> Result<Self, BeanError> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(BeanError::InvalidInput(
                "holder id must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Return the holder id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for HolderId {
    type Error = BeanError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<HolderId> for String {
    fn from(id: HolderId) -> Self {
        id.0
    }
}

impl std::fmt::Display for HolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a redemption request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RedemptionId(Uuid);

impl RedemptionId {
    /// Generate a new random redemption identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RedemptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RedemptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "redemption:{}", self.0)
    }
}
