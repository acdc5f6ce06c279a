//! # bean-redemption — Balance-Gated Redemption
//!
//! Token holders exchange batch tokens for physical product through a
//! request lifecycle:
//!
//! ```text
//! Requested → Processing → Fulfilled
//!     └───────────┴──────→ Cancelled
//! ```
//!
//! - [`RedemptionEngine`] creates and advances requests, serializing balance
//!   checks per `(batch, holder)`.
//! - [`TokenIssuer`] mints tokens against available batch inventory.
//! - [`BatchStore`], [`BalanceStore`] and [`ConfigStore`] are the contracts
//!   hosts implement; in-memory implementations are provided.
//!
//! Whether a batch accepts redemptions is decided from its derived status
//! (see `bean-status`) under the active [`RedemptionPolicy`].

pub mod engine;
pub mod error;
pub mod issuance;
pub mod policy;
pub mod request;
pub mod store;

pub use engine::RedemptionEngine;
pub use error::RedemptionError;
pub use issuance::{MintReceipt, TokenIssuer};
pub use policy::RedemptionPolicy;
pub use request::{DeliveryInfo, RedemptionRequest, RedemptionStatus, RedemptionTransitionRecord};
pub use store::{
    BalanceStore, BatchStore, ConfigStore, InMemoryBalanceStore, InMemoryBatchStore,
    InMemoryConfigStore,
};
