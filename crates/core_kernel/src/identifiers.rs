//! Strongly-typed sequential identifiers for domain entities
//!
//! Policies and claims are numbered by their owning registry. Numbers are
//! assigned in strictly increasing order starting at 1 and are never reused.
//! Newtype wrappers keep a claim number from being passed where a policy
//! number is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when an identifier string cannot be parsed
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid {kind} identifier: {value}")]
pub struct IdParseError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// The first identifier handed out by a fresh store
            pub const FIRST: Self = Self(1);

            /// Wraps a raw sequence number
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw sequence number
            pub const fn value(&self) -> u64 {
                self.0
            }

            /// Returns the identifier that follows this one
            pub fn next(&self) -> Self {
                Self(self.0 + 1)
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let digits = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                digits.parse::<u64>().map(Self).map_err(|_| IdParseError {
                    kind: $prefix,
                    value: s.to_string(),
                })
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

define_id!(PolicyId, "POL");
define_id!(ClaimId, "CLM");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_id_display() {
        assert_eq!(PolicyId::new(42).to_string(), "POL-42");
        assert_eq!(ClaimId::new(7).to_string(), "CLM-7");
    }

    #[test]
    fn test_id_parsing_accepts_prefixed_and_bare() {
        assert_eq!("POL-12".parse::<PolicyId>().unwrap(), PolicyId::new(12));
        assert_eq!("12".parse::<PolicyId>().unwrap(), PolicyId::new(12));
        assert!("CLM-12".parse::<PolicyId>().is_err());
        assert!("POL-abc".parse::<PolicyId>().is_err());
    }

    #[test]
    fn test_next_is_strictly_greater() {
        let id = ClaimId::FIRST;
        assert!(id.next() > id);
        assert_eq!(id.next().value(), 2);
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&PolicyId::new(3)).unwrap();
        assert_eq!(json, "3");
        let back: PolicyId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PolicyId::new(3));
    }
}
