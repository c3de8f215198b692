//! Error taxonomy shared across the system

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a failed operation
///
/// Each domain error maps onto one of these, which lets outer layers (HTTP
/// status codes, logs) treat failures uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller lacks the required role or ownership
    Unauthorized,
    /// Malformed input
    InvalidArgument,
    /// Operation attempted from the wrong lifecycle state
    InvalidState,
    /// Referenced policy or claim does not exist
    NotFound,
    /// Policy is not in the Active state
    PolicyNotActive,
    /// Policy coverage window has closed
    PolicyExpired,
    /// Premium payment differs from the premium due
    AmountMismatch,
    /// Claim amount is above the policy coverage at submission
    ClaimExceedsCoverage,
    /// Claim amount is above the policy coverage at approval
    InsufficientCoverage,
    /// The fund transfer collaborator failed
    TransferFailed,
    /// The backing store failed
    Storage,
}

impl ErrorKind {
    /// Stable snake_case name
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::NotFound => "not_found",
            ErrorKind::PolicyNotActive => "policy_not_active",
            ErrorKind::PolicyExpired => "policy_expired",
            ErrorKind::AmountMismatch => "amount_mismatch",
            ErrorKind::ClaimExceedsCoverage => "claim_exceeds_coverage",
            ErrorKind::InsufficientCoverage => "insufficient_coverage",
            ErrorKind::TransferFailed => "transfer_failed",
            ErrorKind::Storage => "storage",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
