//! # bean-disclosure — Tiered Disclosure Resolver
//!
//! Decides what subset of a batch's data a caller may see. Callers arrive
//! already authenticated with a [`CallerRole`]; each of the three disclosure
//! axes (pricing, quality, supply chain) is resolved independently against
//! the batch's [`PrivacyConfig`](bean_core::PrivacyConfig).
//!
//! ## Resolution Matrix
//!
//! | Role          | `Public` | `Selective`                        | `Private` / absent |
//! |---------------|----------|------------------------------------|--------------------|
//! | `Admin`       | raw      | raw                                | raw                |
//! | `Processor`   | raw      | raw                                | raw                |
//! | `Distributor` | raw      | range (raw pricing if `!private`)  | hidden             |
//! | `Public`      | raw      | range                              | hidden             |
//!
//! `level` is authoritative. The legacy `private` flag only unlocks raw
//! pricing for distributors on a `Selective` axis; it never overrides a
//! `Private` level.
//!
//! ## Proofs
//!
//! A proof reference on an axis is surfaced as `proof_available` next to the
//! resolved value. It never feeds into the range.
//!
//! ## Purity
//!
//! Resolution is a pure function of the batch and the role. It never fails:
//! missing configuration resolves fail-closed.

pub mod projection;
pub mod resolve;
pub mod role;

pub use projection::{resolve_disclosure, ProjectedBatch};
pub use resolve::{
    decide, indicative_range, resolve, AxisValue, Decision, Disclosed, IndicativeRange,
    RangeLabel, ResolvedAxis,
};
pub use role::CallerRole;
