//! Claims domain errors

use thiserror::Error;

use core_kernel::{ClaimId, ErrorKind, Money, PortError};
use domain_access::AccessError;
use domain_policy::PolicyError;

use crate::claim::ClaimStatus;
use crate::ports::TransferError;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    /// Malformed claim input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No claim with this id
    #[error("Claim not found: {0}")]
    ClaimNotFound(ClaimId),

    /// Operation attempted from the wrong status
    #[error("Cannot {action} claim {claim_id} in status {status}")]
    InvalidState {
        claim_id: ClaimId,
        status: ClaimStatus,
        action: &'static str,
    },

    /// Claim amount is above the policy coverage at submission
    #[error("Claim amount {claim_amount} exceeds coverage {coverage}")]
    ClaimExceedsCoverage {
        claim_amount: Money,
        coverage: Money,
    },

    /// Claim amount is above the policy coverage at approval
    #[error("Insufficient coverage for claim {claim_id}: claimed {claim_amount}, coverage {coverage}")]
    InsufficientCoverage {
        claim_id: ClaimId,
        claim_amount: Money,
        coverage: Money,
    },

    /// The fund transfer collaborator failed
    #[error("Fund transfer for claim {claim_id} failed: {source}")]
    TransferFailed {
        claim_id: ClaimId,
        #[source]
        source: TransferError,
    },

    /// Failure raised by the referenced policy
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Caller lacks the required role or ownership
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Backing store failure
    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

impl ClaimError {
    /// Returns the error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClaimError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ClaimError::ClaimNotFound(_) => ErrorKind::NotFound,
            ClaimError::InvalidState { .. } => ErrorKind::InvalidState,
            ClaimError::ClaimExceedsCoverage { .. } => ErrorKind::ClaimExceedsCoverage,
            ClaimError::InsufficientCoverage { .. } => ErrorKind::InsufficientCoverage,
            ClaimError::TransferFailed { .. } => ErrorKind::TransferFailed,
            ClaimError::Policy(e) => e.kind(),
            ClaimError::Access(e) => e.kind(),
            ClaimError::Store(_) => ErrorKind::Storage,
        }
    }
}
