//! # Batch Records
//!
//! A [`Batch`] is one traceable coffee lot represented as tokens. Core fields
//! are fixed at creation by the external batch-creation collaborator; only
//! the minted counter and the last audit instant change afterwards. Status is
//! never stored on the record. It is derived on every read by `bean-status`.
//!
//! ## Invariants
//!
//! - `minted_quantity ≤ quantity`, so `available_quantity()` is never negative.
//! - `expiry_date > production_date`.
//!
//! Both construction paths ([`BatchDraft::validate`] and deserialization)
//! enforce these.
//!
//! ## Never-Verified Records
//!
//! External stores write the Unix epoch for "never verified". Validation
//! folds that sentinel into `last_verified: None`. Any other audit instant is
//! kept as given, including one that precedes production because of clock
//! skew between the store and the auditor.

use serde::{Deserialize, Serialize};

use crate::error::BeanError;
use crate::identity::BatchId;
use crate::privacy::{DisclosureAxis, PrivacyConfig, ProofReferences};
use crate::temporal::Timestamp;

/// Non-negative price per unit, in minor currency units (cents).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Price from minor units (e.g. `1250` = 12.50).
    pub fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// The price in minor units.
    pub fn minor_units(&self) -> u64 {
        self.0
    }

    /// Whole major units, rounded down.
    pub fn major_units(&self) -> u64 {
        self.0 / 100
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Quality claims for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    /// SCA cupping score (0–100), if cupped.
    #[serde(default)]
    pub cupping_score: Option<u8>,
    /// Free-form grade label, e.g. "Specialty" or "Grade 1".
    #[serde(default)]
    pub grade: Option<String>,
    /// Tasting notes recorded by the processor.
    #[serde(default)]
    pub notes: Vec<String>,
}

/// Provenance claims for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyChainRecord {
    #[serde(default)]
    pub farm: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// Washed, natural, honey, ...
    #[serde(default)]
    pub processing_method: Option<String>,
    /// Custody handoffs in chronological order.
    #[serde(default)]
    pub custody_chain: Vec<String>,
}

/// Unvalidated batch fields, as received from the batch store or the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDraft {
    pub batch_id: BatchId,
    pub quantity: u64,
    #[serde(default)]
    pub minted_quantity: u64,
    pub production_date: Timestamp,
    pub expiry_date: Timestamp,
    #[serde(default)]
    pub last_verified: Option<Timestamp>,
    #[serde(default)]
    pub price_per_unit: Price,
    #[serde(default)]
    pub quality: QualityReport,
    #[serde(default)]
    pub supply_chain: SupplyChainRecord,
    #[serde(default)]
    pub privacy: PrivacyConfig,
    #[serde(default)]
    pub proofs: ProofReferences,
    /// References to encrypted payloads stored off-record.
    #[serde(default)]
    pub encrypted_refs: Vec<String>,
}

impl BatchDraft {
    /// Minimal draft with public privacy settings and no proofs.
    pub fn new(
        batch_id: BatchId,
        quantity: u64,
        production_date: Timestamp,
        expiry_date: Timestamp,
    ) -> Self {
        Self {
            batch_id,
            quantity,
            minted_quantity: 0,
            production_date,
            expiry_date,
            last_verified: None,
            price_per_unit: Price::default(),
            quality: QualityReport::default(),
            supply_chain: SupplyChainRecord::default(),
            privacy: PrivacyConfig::all_public(),
            proofs: ProofReferences::default(),
            encrypted_refs: Vec::new(),
        }
    }

    /// Check the record invariants and produce a [`Batch`].
    pub fn validate(mut self) -> Result<Batch, BeanError> {
        if self.minted_quantity > self.quantity {
            return Err(BeanError::InvalidInput(format!(
                "{}: minted quantity {} exceeds total quantity {}",
                self.batch_id, self.minted_quantity, self.quantity
            )));
        }
        if self.expiry_date <= self.production_date {
            return Err(BeanError::InvalidInput(format!(
                "{}: expiry date {} must be after production date {}",
                self.batch_id, self.expiry_date, self.production_date
            )));
        }
        if self.last_verified.is_some_and(|t| t.epoch_secs() == 0) {
            self.last_verified = None;
        }
        Ok(Batch { inner: self })
    }
}

/// A validated coffee batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "BatchDraft", into = "BatchDraft")]
pub struct Batch {
    inner: BatchDraft,
}

impl TryFrom<BatchDraft> for Batch {
    type Error = BeanError;

    fn try_from(draft: BatchDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl From<Batch> for BatchDraft {
    fn from(batch: Batch) -> Self {
        batch.inner
    }
}

impl Batch {
    pub fn batch_id(&self) -> BatchId {
        self.inner.batch_id
    }

    /// Total units ever produced.
    pub fn quantity(&self) -> u64 {
        self.inner.quantity
    }

    /// Units already issued as tokens.
    pub fn minted_quantity(&self) -> u64 {
        self.inner.minted_quantity
    }

    /// Units still issuable: `quantity - minted_quantity`.
    pub fn available_quantity(&self) -> u64 {
        self.inner.quantity - self.inner.minted_quantity
    }

    pub fn production_date(&self) -> Timestamp {
        self.inner.production_date
    }

    pub fn expiry_date(&self) -> Timestamp {
        self.inner.expiry_date
    }

    /// Instant of the last successful audit, `None` if never verified.
    pub fn last_verified(&self) -> Option<Timestamp> {
        self.inner.last_verified
    }

    /// Whether the batch has passed at least one audit.
    pub fn is_verified(&self) -> bool {
        self.inner.last_verified.is_some()
    }

    pub fn price_per_unit(&self) -> Price {
        self.inner.price_per_unit
    }

    pub fn quality(&self) -> &QualityReport {
        &self.inner.quality
    }

    pub fn supply_chain(&self) -> &SupplyChainRecord {
        &self.inner.supply_chain
    }

    pub fn privacy(&self) -> &PrivacyConfig {
        &self.inner.privacy
    }

    pub fn proofs(&self) -> &ProofReferences {
        &self.inner.proofs
    }

    pub fn encrypted_refs(&self) -> &[String] {
        &self.inner.encrypted_refs
    }

    /// Whether a proof backs `axis`, either on the proof references or on
    /// the axis privacy settings.
    pub fn has_proof_for(&self, axis: DisclosureAxis) -> bool {
        self.inner.proofs.for_axis(axis).is_some()
            || self
                .inner
                .privacy
                .axis(axis)
                .is_some_and(|a| a.proof_hash.is_some())
    }

    /// Whether any proof reference is attached to the batch.
    pub fn has_proofs(&self) -> bool {
        DisclosureAxis::ALL.iter().any(|a| self.has_proof_for(*a))
    }

    /// Whether any encrypted payload reference is attached to the batch.
    pub fn has_encrypted_data(&self) -> bool {
        !self.inner.encrypted_refs.is_empty()
    }

    /// Apply a signed change to the minted counter.
    ///
    /// Positive deltas record issuance, negative deltas roll issuance back.
    /// The record is left untouched if the result would fall outside
    /// `0 ≤ minted ≤ quantity`.
    pub fn adjust_minted(&mut self, delta: i64) -> Result<(), BeanError> {
        let next = i128::from(self.inner.minted_quantity) + i128::from(delta);
        if next < 0 || next > i128::from(self.inner.quantity) {
            return Err(BeanError::InvalidInput(format!(
                "{}: minted adjustment {delta} would leave minted quantity at {next} (total {})",
                self.inner.batch_id, self.inner.quantity
            )));
        }
        self.inner.minted_quantity = next as u64;
        Ok(())
    }

    /// Record a successful audit at `at`.
    pub fn record_verification(&mut self, at: Timestamp) -> Result<(), BeanError> {
        if at < self.inner.production_date {
            return Err(BeanError::InvalidInput(format!(
                "{}: verification at {at} precedes production date {}",
                self.inner.batch_id, self.inner.production_date
            )));
        }
        self.inner.last_verified = Some(at);
        Ok(())
    }
}
