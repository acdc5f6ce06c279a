//! # Privacy Configuration
//!
//! Per-batch disclosure settings for the three independent axes: pricing,
//! quality, and supply chain. Each axis carries an authoritative
//! [`DisclosureLevel`], a legacy `private` flag kept for records written by
//! older tooling, an optional proof reference, and (for `Selective`) the tier
//! that selects an indicative range.
//!
//! ## Fail-Closed Default
//!
//! An axis with no configuration is treated as `Private`. See
//! [`PrivacyConfig::effective`].

use serde::{Deserialize, Serialize};

use crate::error::BeanError;

/// One of the three independently configurable disclosure axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisclosureAxis {
    /// Price per unit.
    Pricing,
    /// Cupping score and grade.
    Quality,
    /// Farm, region, and processing provenance.
    SupplyChain,
}

impl DisclosureAxis {
    /// All axes, in projection order.
    pub const ALL: [DisclosureAxis; 3] = [Self::Pricing, Self::Quality, Self::SupplyChain];

    /// Return the string representation of this axis.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pricing => "pricing",
            Self::Quality => "quality",
            Self::SupplyChain => "supply_chain",
        }
    }
}

impl std::fmt::Display for DisclosureAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility level of a disclosure axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisclosureLevel {
    /// Raw value visible to every caller.
    Public,
    /// Raw value withheld; an indicative range is shown instead.
    Selective,
    /// Raw value withheld from everyone except privileged roles.
    Private,
}

impl std::fmt::Display for DisclosureLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Public => "public",
            Self::Selective => "selective",
            Self::Private => "private",
        };
        f.write_str(s)
    }
}

/// Opaque reference to an externally verifiable claim.
///
/// The content is never interpreted here; presence alone means a proof
/// exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProofHash(String);

impl ProofHash {
    /// Wrap a proof reference, rejecting empty strings.
    pub fn new(s: impl Into<String>) -> Result<Self, BeanError> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(BeanError::InvalidInput(
                "proof reference must not be empty".to_string(),
            ));
        }
        Ok(Self(s))
    }

    /// Return the reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProofHash {
    type Error = BeanError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ProofHash> for String {
    fn from(p: ProofHash) -> Self {
        p.0
    }
}

/// Disclosure settings for a single axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AxisPrivacyRecord")]
pub struct AxisPrivacy {
    /// Authoritative visibility level.
    pub level: DisclosureLevel,
    /// Legacy indicator written alongside `level`. Only consulted for the
    /// distributor pricing override. When a record omits it, it follows
    /// `level`: set for anything other than `Public`.
    pub private: bool,
    /// Proof backing the withheld value, if any.
    pub proof_hash: Option<ProofHash>,
    /// Indicative range tier for `Selective` axes (1 = premium, 2 =
    /// mid-market, 3 = value).
    pub tier: Option<u8>,
}

/// Wire form of [`AxisPrivacy`], where the legacy flag may be absent.
#[derive(Deserialize)]
struct AxisPrivacyRecord {
    level: DisclosureLevel,
    #[serde(default)]
    private: Option<bool>,
    #[serde(default)]
    proof_hash: Option<ProofHash>,
    #[serde(default)]
    tier: Option<u8>,
}

impl From<AxisPrivacyRecord> for AxisPrivacy {
    fn from(r: AxisPrivacyRecord) -> Self {
        Self {
            private: r.private.unwrap_or(r.level != DisclosureLevel::Public),
            level: r.level,
            proof_hash: r.proof_hash,
            tier: r.tier,
        }
    }
}

impl AxisPrivacy {
    /// Publicly visible axis.
    pub fn public() -> Self {
        Self {
            level: DisclosureLevel::Public,
            private: false,
            proof_hash: None,
            tier: None,
        }
    }

    /// Selective axis disclosing the range for `tier`.
    pub fn selective(tier: u8) -> Self {
        Self {
            level: DisclosureLevel::Selective,
            private: true,
            proof_hash: None,
            tier: Some(tier),
        }
    }

    /// Fully private axis.
    pub fn private() -> Self {
        Self {
            level: DisclosureLevel::Private,
            private: true,
            proof_hash: None,
            tier: None,
        }
    }

    /// Attach a proof reference.
    pub fn with_proof(mut self, proof: ProofHash) -> Self {
        self.proof_hash = Some(proof);
        self
    }

    /// Override the legacy `private` flag.
    pub fn with_private_flag(mut self, private: bool) -> Self {
        self.private = private;
        self
    }
}

/// Per-batch disclosure configuration.
///
/// Every axis is optional on the wire; absent axes resolve as `Private`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacyConfig {
    #[serde(default)]
    pub pricing: Option<AxisPrivacy>,
    #[serde(default)]
    pub quality: Option<AxisPrivacy>,
    #[serde(default)]
    pub supply_chain: Option<AxisPrivacy>,
}

impl PrivacyConfig {
    /// Configuration with every axis public.
    pub fn all_public() -> Self {
        Self {
            pricing: Some(AxisPrivacy::public()),
            quality: Some(AxisPrivacy::public()),
            supply_chain: Some(AxisPrivacy::public()),
        }
    }

    /// The configured settings for `axis`, if any.
    pub fn axis(&self, axis: DisclosureAxis) -> Option<&AxisPrivacy> {
        match axis {
            DisclosureAxis::Pricing => self.pricing.as_ref(),
            DisclosureAxis::Quality => self.quality.as_ref(),
            DisclosureAxis::SupplyChain => self.supply_chain.as_ref(),
        }
    }

    /// The settings that apply to `axis`, with an absent axis read as
    /// `Private`.
    pub fn effective(&self, axis: DisclosureAxis) -> AxisPrivacy {
        self.axis(axis).cloned().unwrap_or_else(AxisPrivacy::private)
    }
}

/// Optional proof references for the batch's disclosed claims.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofReferences {
    #[serde(default)]
    pub price: Option<ProofHash>,
    #[serde(default)]
    pub quality: Option<ProofHash>,
    #[serde(default)]
    pub supply_chain: Option<ProofHash>,
}

impl ProofReferences {
    /// The proof reference backing `axis`, if any.
    pub fn for_axis(&self, axis: DisclosureAxis) -> Option<&ProofHash> {
        match axis {
            DisclosureAxis::Pricing => self.price.as_ref(),
            DisclosureAxis::Quality => self.quality.as_ref(),
            DisclosureAxis::SupplyChain => self.supply_chain.as_ref(),
        }
    }

    /// Whether any reference is present.
    pub fn any(&self) -> bool {
        DisclosureAxis::ALL.iter().any(|a| self.for_axis(*a).is_some())
    }
}
