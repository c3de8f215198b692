//! Access domain errors

use thiserror::Error;

use core_kernel::{ErrorKind, PortError, Principal};

/// Errors that can occur in the access domain
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Principal {principal} is not authorized to {action}")]
    Unauthorized {
        principal: Principal,
        action: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

impl AccessError {
    /// Creates an Unauthorized error for the given action
    pub fn unauthorized(principal: Principal, action: impl Into<String>) -> Self {
        AccessError::Unauthorized {
            principal,
            action: action.into(),
        }
    }

    /// Returns the error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccessError::Unauthorized { .. } => ErrorKind::Unauthorized,
            AccessError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            AccessError::Store(_) => ErrorKind::Storage,
        }
    }
}
