//! # bean-core — Foundational Types for the Batch Lifecycle Engine
//!
//! This crate is the leaf of the workspace. It defines the data model that
//! every other crate reads: the coffee [`Batch`], its per-axis
//! [`PrivacyConfig`], the opaque [`ProofReferences`] attached to it, and the
//! operator-tunable [`VerificationConfig`]. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `BatchId`, `HolderId`,
//!    `RedemptionId` are distinct types with validated constructors. A holder
//!    identity can never be passed where a batch id is expected.
//!
//! 2. **Derived quantities are not stored.** `Batch` stores `quantity` and
//!    `minted_quantity`; `available_quantity()` is computed, so the invariant
//!    `available = quantity - minted` cannot drift.
//!
//! 3. **UTC-only timestamps.** [`Timestamp`] is UTC with seconds precision.
//!    All threshold arithmetic is done in whole seconds.
//!
//! 4. **Fail-closed privacy.** An absent disclosure axis reads as
//!    [`DisclosureLevel::Private`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `bean-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod batch;
pub mod config;
pub mod error;
pub mod identity;
pub mod privacy;
pub mod temporal;

pub use batch::{Batch, BatchDraft, Price, QualityReport, SupplyChainRecord};
pub use config::{VerificationConfig, VerificationConfigPatch};
pub use error::BeanError;
pub use identity::{BatchId, HolderId, RedemptionId};
pub use privacy::{
    AxisPrivacy, DisclosureAxis, DisclosureLevel, PrivacyConfig, ProofHash, ProofReferences,
};
pub use temporal::Timestamp;
