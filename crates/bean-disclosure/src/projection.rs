//! # Caller-Facing Projection
//!
//! Assembles the view of a batch returned to a caller. Role-independent
//! fields (identifiers, dates, verification flags, quantities) are copied
//! unfiltered; the three disclosure axes go through [`crate::resolve`].

use serde::{Deserialize, Serialize};

use bean_core::{Batch, BatchId, DisclosureAxis, Price, QualityReport, SupplyChainRecord, Timestamp};

use crate::resolve::{resolve_with, ResolvedAxis};
use crate::role::CallerRole;

/// The caller-visible projection of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedBatch {
    pub batch_id: BatchId,
    pub viewer_role: CallerRole,
    pub quantity: u64,
    pub minted_quantity: u64,
    pub available_quantity: u64,
    pub production_date: Timestamp,
    pub expiry_date: Timestamp,
    pub last_verified: Option<Timestamp>,
    pub is_verified: bool,
    pub pricing: ResolvedAxis<Price>,
    pub quality: ResolvedAxis<QualityReport>,
    pub supply_chain: ResolvedAxis<SupplyChainRecord>,
    /// Any proof reference is attached to the batch.
    pub has_zk_proofs: bool,
    /// Any encrypted payload reference is attached to the batch.
    pub has_encrypted_data: bool,
}

/// Project `batch` for a caller holding `role`.
pub fn resolve_disclosure(batch: &Batch, role: CallerRole) -> ProjectedBatch {
    ProjectedBatch {
        batch_id: batch.batch_id(),
        viewer_role: role,
        quantity: batch.quantity(),
        minted_quantity: batch.minted_quantity(),
        available_quantity: batch.available_quantity(),
        production_date: batch.production_date(),
        expiry_date: batch.expiry_date(),
        last_verified: batch.last_verified(),
        is_verified: batch.is_verified(),
        pricing: resolve_with(batch, role, DisclosureAxis::Pricing, || batch.price_per_unit()),
        quality: resolve_with(batch, role, DisclosureAxis::Quality, || batch.quality().clone()),
        supply_chain: resolve_with(batch, role, DisclosureAxis::SupplyChain, || {
            batch.supply_chain().clone()
        }),
        has_zk_proofs: batch.has_proofs(),
        has_encrypted_data: batch.has_encrypted_data(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bean_core::{AxisPrivacy, BatchDraft, PrivacyConfig, ProofHash};

    use crate::resolve::{Disclosed, RangeLabel};

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn batch(privacy: PrivacyConfig) -> Batch {
        let mut d = BatchDraft::new(
            BatchId::new(12).unwrap(),
            100,
            ts("2026-01-01T00:00:00Z"),
            ts("2027-01-01T00:00:00Z"),
        );
        d.minted_quantity = 40;
        d.price_per_unit = Price::from_minor(2_250);
        d.quality.cupping_score = Some(87);
        d.supply_chain.region = Some("Huila".to_string());
        d.privacy = privacy;
        d.validate().unwrap()
    }

    #[test]
    fn role_independent_fields_are_unfiltered() {
        let b = batch(PrivacyConfig::default());
        let p = resolve_disclosure(&b, CallerRole::Public);
        assert_eq!(p.quantity, 100);
        assert_eq!(p.minted_quantity, 40);
        assert_eq!(p.available_quantity, 60);
        assert_eq!(p.production_date, ts("2026-01-01T00:00:00Z"));
        assert!(!p.is_verified);
    }

    #[test]
    fn empty_privacy_config_hides_everything_from_public() {
        let p = resolve_disclosure(&batch(PrivacyConfig::default()), CallerRole::Public);
        assert!(p.pricing.value.is_hidden());
        assert!(p.quality.value.is_hidden());
        assert!(p.supply_chain.value.is_hidden());
    }

    #[test]
    fn mixed_axes_for_public() {
        let privacy = PrivacyConfig {
            pricing: Some(AxisPrivacy::selective(1)),
            quality: Some(AxisPrivacy::public()),
            supply_chain: Some(AxisPrivacy::private()),
        };
        let p = resolve_disclosure(&batch(privacy), CallerRole::Public);
        match p.pricing.value {
            Disclosed::Indicative(r) => {
                assert_eq!((r.min, r.max), (15, 50));
                assert_eq!(r.label, RangeLabel::Premium);
            }
            other => panic!("expected range, got {other:?}"),
        }
        assert_eq!(p.quality.value.raw().and_then(|q| q.cupping_score), Some(87));
        assert!(p.supply_chain.value.is_hidden());
    }

    #[test]
    fn proof_flags() {
        let privacy = PrivacyConfig {
            quality: Some(AxisPrivacy::private().with_proof(ProofHash::new("0xq").unwrap())),
            ..PrivacyConfig::default()
        };
        let mut d = BatchDraft::from(batch(privacy));
        d.encrypted_refs.push("enc://lot-12".to_string());
        let b = d.validate().unwrap();

        let p = resolve_disclosure(&b, CallerRole::Public);
        assert!(p.quality.proof_available);
        assert!(!p.pricing.proof_available);
        assert!(p.quality.value.is_hidden());
        assert!(p.has_zk_proofs);
        assert!(p.has_encrypted_data);
    }

    #[test]
    fn projection_serializes_snake_case() {
        let p = resolve_disclosure(&batch(PrivacyConfig::all_public()), CallerRole::Admin);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["viewer_role"], "admin");
        assert_eq!(json["pricing"]["value"]["kind"], "raw");
        assert_eq!(json["pricing"]["value"]["value"], 2_250);
        assert_eq!(json["has_zk_proofs"], false);
    }
}
