//! # Per-Axis Resolution
//!
//! [`decide`] computes what kind of disclosure a role gets on one axis.
//! [`resolve`] applies that decision to the batch's raw value for the axis.

use serde::{Deserialize, Serialize};

use bean_core::{
    AxisPrivacy, Batch, DisclosureAxis, DisclosureLevel, Price, QualityReport, SupplyChainRecord,
};

use crate::role::CallerRole;

/// Market segment label of an indicative range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeLabel {
    #[serde(rename = "premium")]
    Premium,
    #[serde(rename = "mid-market")]
    MidMarket,
    #[serde(rename = "value")]
    Value,
}

impl std::fmt::Display for RangeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Premium => "premium",
            Self::MidMarket => "mid-market",
            Self::Value => "value",
        };
        f.write_str(s)
    }
}

/// A non-exact numeric band shown in place of a withheld value.
///
/// Bounds are whole major currency units on the pricing axis, so the tier 1
/// band `15..=50` covers a raw [`Price`] of `1500` to `5000` minor units.
/// Other axes show the same band as a bare tier indicator.
///
/// [`Price`]: bean_core::Price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndicativeRange {
    pub min: u32,
    pub max: u32,
    pub label: RangeLabel,
}

impl IndicativeRange {
    /// Whether `price` falls inside the band, comparing in major units.
    pub fn contains_price(&self, price: Price) -> bool {
        let lo = u64::from(self.min) * 100;
        let hi = u64::from(self.max) * 100;
        (lo..=hi).contains(&price.minor_units())
    }
}

/// The indicative range for a `Selective` tier, or `None` for unknown tiers.
pub fn indicative_range(tier: Option<u8>) -> Option<IndicativeRange> {
    let (min, max, label) = match tier? {
        1 => (15, 50, RangeLabel::Premium),
        2 => (8, 25, RangeLabel::MidMarket),
        3 => (3, 15, RangeLabel::Value),
        _ => return None,
    };
    Some(IndicativeRange { min, max, label })
}

/// What a role gets to see on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Raw,
    Range(IndicativeRange),
    Hidden,
}

/// Decide the disclosure for `role` on `axis`, given the axis settings.
///
/// `settings == None` means the axis is unconfigured and resolves as
/// `Private`.
pub fn decide(role: CallerRole, axis: DisclosureAxis, settings: Option<&AxisPrivacy>) -> Decision {
    if role.is_privileged() {
        return Decision::Raw;
    }
    let Some(settings) = settings else {
        return Decision::Hidden;
    };
    match settings.level {
        DisclosureLevel::Public => Decision::Raw,
        DisclosureLevel::Private => Decision::Hidden,
        DisclosureLevel::Selective => {
            let distributor_pricing = role == CallerRole::Distributor
                && axis == DisclosureAxis::Pricing
                && !settings.private;
            if distributor_pricing {
                return Decision::Raw;
            }
            indicative_range(settings.tier).map_or(Decision::Hidden, Decision::Range)
        }
    }
}

/// A resolved value: the raw value, an indicative range, or hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Disclosed<T> {
    Raw(T),
    Indicative(IndicativeRange),
    Hidden,
}

impl<T> Disclosed<T> {
    /// The raw value, if disclosed.
    pub fn raw(&self) -> Option<&T> {
        match self {
            Self::Raw(v) => Some(v),
            Self::Indicative(_) | Self::Hidden => None,
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }

    fn from_decision(decision: Decision, raw: impl FnOnce() -> T) -> Self {
        match decision {
            Decision::Raw => Self::Raw(raw()),
            Decision::Range(r) => Self::Indicative(r),
            Decision::Hidden => Self::Hidden,
        }
    }
}

/// A resolved axis plus whether a proof backs the underlying claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAxis<T> {
    pub value: Disclosed<T>,
    pub proof_available: bool,
}

/// Raw value of any axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "axis", rename_all = "snake_case")]
pub enum AxisValue {
    Pricing { price_per_unit: Price },
    Quality(QualityReport),
    SupplyChain(SupplyChainRecord),
}

/// Resolve one axis of `batch` for `role`.
pub fn resolve(batch: &Batch, role: CallerRole, axis: DisclosureAxis) -> ResolvedAxis<AxisValue> {
    resolve_with(batch, role, axis, || match axis {
        DisclosureAxis::Pricing => AxisValue::Pricing {
            price_per_unit: batch.price_per_unit(),
        },
        DisclosureAxis::Quality => AxisValue::Quality(batch.quality().clone()),
        DisclosureAxis::SupplyChain => AxisValue::SupplyChain(batch.supply_chain().clone()),
    })
}

/// Resolve one axis, producing the raw value lazily only when disclosed.
pub(crate) fn resolve_with<T>(
    batch: &Batch,
    role: CallerRole,
    axis: DisclosureAxis,
    raw: impl FnOnce() -> T,
) -> ResolvedAxis<T> {
    let decision = decide(role, axis, batch.privacy().axis(axis));
    tracing::trace!(
        batch_id = %batch.batch_id(),
        role = %role,
        axis = %axis,
        ?decision,
        "resolved disclosure axis"
    );
    ResolvedAxis {
        value: Disclosed::from_decision(decision, raw),
        proof_available: batch.has_proof_for(axis),
    }
}
