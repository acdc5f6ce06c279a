//! # Caller Roles
//!
//! Closed set of roles the disclosure matrix is defined over. Every consumer
//! matches on it exhaustively, so adding a role forces every disclosure rule
//! to be revisited.

use serde::{Deserialize, Serialize};

/// The role of an already-authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerRole {
    /// Platform operator. Full visibility.
    Admin,
    /// Batch owner / processor. Full visibility.
    Processor,
    /// Commercial counterparty.
    Distributor,
    /// Anyone else, including unauthenticated callers.
    Public,
}

impl CallerRole {
    /// Map a role claim to a role. Unrecognized claims become `Public`.
    pub fn from_claim(claim: &str) -> Self {
        match claim.trim().to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            "processor" => Self::Processor,
            "distributor" => Self::Distributor,
            _ => Self::Public,
        }
    }

    /// Whether this role bypasses privacy settings on every axis.
    pub fn is_privileged(&self) -> bool {
        match self {
            Self::Admin | Self::Processor => true,
            Self::Distributor | Self::Public => false,
        }
    }

    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Processor => "processor",
            Self::Distributor => "distributor",
            Self::Public => "public",
        }
    }
}

impl std::fmt::Display for CallerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_are_case_insensitive() {
        assert_eq!(CallerRole::from_claim("ADMIN"), CallerRole::Admin);
        assert_eq!(CallerRole::from_claim(" Processor "), CallerRole::Processor);
        assert_eq!(CallerRole::from_claim("distributor"), CallerRole::Distributor);
    }

    #[test]
    fn unknown_claims_are_public() {
        assert_eq!(CallerRole::from_claim(""), CallerRole::Public);
        assert_eq!(CallerRole::from_claim("roaster"), CallerRole::Public);
    }

    #[test]
    fn privileged_roles() {
        assert!(CallerRole::Admin.is_privileged());
        assert!(CallerRole::Processor.is_privileged());
        assert!(!CallerRole::Distributor.is_privileged());
        assert!(!CallerRole::Public.is_privileged());
    }
}
