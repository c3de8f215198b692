//! Custom Test Assertions
//!
//! Assertion helpers for registry results and money values that give
//! more meaningful failure messages than a bare `assert!`.

use std::fmt::Debug;

use core_kernel::{ErrorKind, Money};
use domain_access::AccessError;
use domain_claims::{Claim, ClaimError, ClaimStatus};
use domain_policy::PolicyError;

/// Errors that report an [`ErrorKind`]
pub trait HasErrorKind {
    /// Category of the failure
    fn error_kind(&self) -> ErrorKind;
}

impl HasErrorKind for AccessError {
    fn error_kind(&self) -> ErrorKind {
        self.kind()
    }
}

impl HasErrorKind for PolicyError {
    fn error_kind(&self) -> ErrorKind {
        self.kind()
    }
}

impl HasErrorKind for ClaimError {
    fn error_kind(&self) -> ErrorKind {
        self.kind()
    }
}

/// Asserts that a registry call failed with the expected kind
///
/// # Panics
///
/// Panics if the result is `Ok` or carries a different kind
pub fn assert_error_kind<T: Debug, E: HasErrorKind + Debug>(
    result: &Result<T, E>,
    expected: ErrorKind,
) {
    match result {
        Ok(value) => panic!("Expected {} error, got Ok({:?})", expected, value),
        Err(error) => assert_eq!(
            error.error_kind(),
            expected,
            "Expected {} error, got {:?}",
            expected,
            error
        ),
    }
}

/// Asserts two Money values are identical in amount and currency
pub fn assert_money_eq(actual: &Money, expected: &Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual,
        expected
    );
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "Amount mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(money.is_positive(), "Expected positive money, got {}", money);
}

/// Asserts a claim's status and that its decision fields agree with it
pub fn assert_claim_status(claim: &Claim, expected: ClaimStatus) {
    assert_eq!(
        claim.status, expected,
        "Claim {} has status {}, expected {}",
        claim.id, claim.status, expected
    );
    match expected {
        ClaimStatus::Submitted => {
            assert!(claim.decided_at.is_none(), "Submitted claim {} has a decision", claim.id);
        }
        ClaimStatus::Approved | ClaimStatus::Rejected => {
            assert!(claim.decided_at.is_some(), "Decided claim {} lacks decided_at", claim.id);
            assert!(claim.paid_at.is_none(), "Unpaid claim {} has paid_at", claim.id);
        }
        ClaimStatus::Paid => {
            assert!(claim.paid_at.is_some(), "Paid claim {} lacks paid_at", claim.id);
        }
    }
}
