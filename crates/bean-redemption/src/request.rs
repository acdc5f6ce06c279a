//! # Redemption Request Lifecycle
//!
//! ## States
//!
//! ```text
//! Requested ──▶ Processing ──▶ Fulfilled (terminal)
//!     │             │
//!     └─────────────┴──▶ Cancelled (terminal)
//! ```
//!
//! Transitions move forward one step at a time; `Cancelled` is reachable
//! from either open state. Anything else is rejected with
//! [`RedemptionError::InvalidTransition`] and leaves the request untouched.
//!
//! The request itself never touches balances. Pairing `Fulfilled` with the
//! balance decrement is the engine's job.

use serde::{Deserialize, Serialize};

use bean_core::{BatchId, HolderId, RedemptionId, Timestamp};

use crate::error::RedemptionError;

// ─── Status ──────────────────────────────────────────────────────────

/// The lifecycle state of a redemption request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedemptionStatus {
    /// Created after the balance check passed.
    Requested,
    /// Being prepared for delivery.
    Processing,
    /// Delivered; tokens burned (terminal).
    Fulfilled,
    /// Withdrawn before fulfillment (terminal).
    Cancelled,
}

impl RedemptionStatus {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Fulfilled | Self::Cancelled)
    }

    /// Whether the request still holds a claim on the holder's balance.
    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }

    /// Whether `self → to` is a permitted transition.
    pub fn can_transition_to(&self, to: RedemptionStatus) -> bool {
        matches!(
            (self, to),
            (Self::Requested, Self::Processing)
                | (Self::Processing, Self::Fulfilled)
                | (Self::Requested, Self::Cancelled)
                | (Self::Processing, Self::Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "REQUESTED",
            Self::Processing => "PROCESSING",
            Self::Fulfilled => "FULFILLED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Delivery Info ───────────────────────────────────────────────────

/// Where the physical product goes. Must be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeliveryInfo(String);

impl DeliveryInfo {
    pub fn new(s: impl Into<String>) -> Result<Self, RedemptionError> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(RedemptionError::InvalidInput(
                "delivery information must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DeliveryInfo {
    type Error = RedemptionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DeliveryInfo> for String {
    fn from(d: DeliveryInfo) -> Self {
        d.0
    }
}

// ─── Request ─────────────────────────────────────────────────────────

/// Record of a redemption state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionTransitionRecord {
    pub from_state: RedemptionStatus,
    pub to_state: RedemptionStatus,
    pub timestamp: Timestamp,
}

/// A single redemption attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRequest {
    pub id: RedemptionId,
    pub batch_id: BatchId,
    pub consumer: HolderId,
    pub quantity: u64,
    pub status: RedemptionStatus,
    pub delivery_info: DeliveryInfo,
    pub created_at: Timestamp,
    pub fulfilled_at: Option<Timestamp>,
    /// Ordered log of all state transitions.
    pub transitions: Vec<RedemptionTransitionRecord>,
}

impl RedemptionRequest {
    /// Create a request in `Requested`. Balance checks are the caller's
    /// responsibility.
    pub(crate) fn new(
        batch_id: BatchId,
        consumer: HolderId,
        quantity: u64,
        delivery_info: DeliveryInfo,
        created_at: Timestamp,
    ) -> Result<Self, RedemptionError> {
        if quantity == 0 {
            return Err(RedemptionError::InvalidInput(
                "redemption quantity must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            id: RedemptionId::new(),
            batch_id,
            consumer,
            quantity,
            status: RedemptionStatus::Requested,
            delivery_info,
            created_at,
            fulfilled_at: None,
            transitions: Vec::new(),
        })
    }

    /// Reject `to` unless it is a permitted transition from the current state.
    pub fn check_transition(&self, to: RedemptionStatus) -> Result<(), RedemptionError> {
        if self.status.can_transition_to(to) {
            Ok(())
        } else {
            Err(RedemptionError::InvalidTransition {
                from: self.status,
                to,
            })
        }
    }

    /// Validate and record a transition.
    pub(crate) fn transition(
        &mut self,
        to: RedemptionStatus,
        at: Timestamp,
    ) -> Result<(), RedemptionError> {
        self.check_transition(to)?;
        self.transitions.push(RedemptionTransitionRecord {
            from_state: self.status,
            to_state: to,
            timestamp: at,
        });
        if to == RedemptionStatus::Fulfilled {
            self.fulfilled_at = Some(at);
        }
        self.status = to;
        Ok(())
    }

    /// Whether the request still reserves part of the holder's balance.
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }
}
