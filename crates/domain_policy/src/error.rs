//! Policy domain errors

use chrono::{DateTime, Utc};
use thiserror::Error;

use core_kernel::{ErrorKind, Money, PolicyId, PortError};
use domain_access::AccessError;

use crate::policy::PolicyStatus;

/// Errors that can occur in the policy domain
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Malformed request terms
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No policy with this id
    #[error("Policy not found: {0}")]
    PolicyNotFound(PolicyId),

    /// Policy is not Active, or its window has not started yet
    #[error("Policy {policy_id} is not active (status {status})")]
    PolicyNotActive {
        policy_id: PolicyId,
        status: PolicyStatus,
    },

    /// Coverage window has closed
    #[error("Policy {policy_id} expired at {expired_at}")]
    PolicyExpired {
        policy_id: PolicyId,
        expired_at: DateTime<Utc>,
    },

    /// Premium payment differs from the premium due
    #[error("Premium amount mismatch: expected {expected}, got {actual}")]
    AmountMismatch {
        expected: Money,
        actual: Money,
    },

    /// Caller lacks the required role
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Backing store failure
    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

impl PolicyError {
    /// Returns the error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            PolicyError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            PolicyError::PolicyNotFound(_) => ErrorKind::NotFound,
            PolicyError::PolicyNotActive { .. } => ErrorKind::PolicyNotActive,
            PolicyError::PolicyExpired { .. } => ErrorKind::PolicyExpired,
            PolicyError::AmountMismatch { .. } => ErrorKind::AmountMismatch,
            PolicyError::Access(e) => e.kind(),
            PolicyError::Store(_) => ErrorKind::Storage,
        }
    }
}
