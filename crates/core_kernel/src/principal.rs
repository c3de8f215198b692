//! Caller principals
//!
//! A [`Principal`] identifies whoever is invoking an operation: the system
//! owner, an insurer, or a policyholder. The domain trusts the principal it is
//! handed; establishing it (for example from a verified token) is the job of
//! the outer layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque, globally unique caller identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(Uuid);

impl Principal {
    /// The null identity. Never a valid holder, insurer, or owner.
    pub const NULL: Principal = Principal(Uuid::nil());

    /// Creates a new random principal
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns true for the null identity
    pub fn is_null(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for Principal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Principal {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl From<Uuid> for Principal {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<Principal> for Uuid {
    fn from(principal: Principal) -> Uuid {
        principal.0
    }
}
