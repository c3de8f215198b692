//! Claim aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ClaimId, Money, PolicyId, Principal};

use crate::error::ClaimError;

/// Claim status
///
/// ```text
/// Submitted ──> Approved ──> Paid
///     │
///     └──────> Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    /// Filed by the policyholder, awaiting a decision
    Submitted,
    /// Accepted by an insurer, awaiting payout
    Approved,
    /// Declined by an insurer
    Rejected,
    /// Paid out
    Paid,
}

impl ClaimStatus {
    /// Stable name used for storage and display
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Submitted => "Submitted",
            ClaimStatus::Approved => "Approved",
            ClaimStatus::Rejected => "Rejected",
            ClaimStatus::Paid => "Paid",
        }
    }

    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Rejected | ClaimStatus::Paid)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Submitted" => Ok(ClaimStatus::Submitted),
            "Approved" => Ok(ClaimStatus::Approved),
            "Rejected" => Ok(ClaimStatus::Rejected),
            "Paid" => Ok(ClaimStatus::Paid),
            other => Err(ClaimError::InvalidArgument(format!(
                "Unknown claim status '{}'",
                other
            ))),
        }
    }
}

/// A claim against a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Sequential identifier
    pub id: ClaimId,
    /// Policy the claim is filed against
    pub policy_id: PolicyId,
    /// Holder of the policy at submission time
    pub policyholder: Principal,
    /// Requested amount
    pub claim_amount: Money,
    /// Free-text justification
    pub reason: String,
    /// Status
    pub status: ClaimStatus,
    /// Capture time
    pub submission_time: DateTime<Utc>,
    /// Insurer that approved or rejected the claim
    pub decided_by: Option<Principal>,
    /// Time of the approval or rejection
    pub decided_at: Option<DateTime<Utc>>,
    /// Time the claim was marked paid
    pub paid_at: Option<DateTime<Utc>>,
}

impl Claim {
    /// Creates a new submitted claim
    pub fn submit(
        id: ClaimId,
        policy_id: PolicyId,
        policyholder: Principal,
        claim_amount: Money,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            policy_id,
            policyholder,
            claim_amount,
            reason: reason.into(),
            status: ClaimStatus::Submitted,
            submission_time: now,
            decided_by: None,
            decided_at: None,
            paid_at: None,
        }
    }

    /// Fails with `InvalidState` unless the claim is in `expected`
    pub fn ensure_status(&self, expected: ClaimStatus, action: &'static str) -> Result<(), ClaimError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(ClaimError::InvalidState {
                claim_id: self.id,
                status: self.status,
                action,
            })
        }
    }

    /// Submitted -> Approved
    pub fn approve(&mut self, insurer: Principal, now: DateTime<Utc>) -> Result<(), ClaimError> {
        self.transition(ClaimStatus::Approved, "approve")?;
        self.decided_by = Some(insurer);
        self.decided_at = Some(now);
        Ok(())
    }

    /// Submitted -> Rejected
    pub fn reject(&mut self, insurer: Principal, now: DateTime<Utc>) -> Result<(), ClaimError> {
        self.transition(ClaimStatus::Rejected, "reject")?;
        self.decided_by = Some(insurer);
        self.decided_at = Some(now);
        Ok(())
    }

    /// Approved -> Paid
    pub fn mark_paid(&mut self, now: DateTime<Utc>) -> Result<(), ClaimError> {
        self.transition(ClaimStatus::Paid, "pay")?;
        self.paid_at = Some(now);
        Ok(())
    }

    /// Undoes [`Claim::mark_paid`] after a failed transfer
    ///
    /// The only way out of Paid, and only used while the payout is still in
    /// progress.
    pub(crate) fn revert_payment(&mut self) {
        if self.status == ClaimStatus::Paid {
            self.status = ClaimStatus::Approved;
            self.paid_at = None;
        }
    }

    fn transition(&mut self, target: ClaimStatus, action: &'static str) -> Result<(), ClaimError> {
        if !self.can_transition_to(target) {
            return Err(ClaimError::InvalidState {
                claim_id: self.id,
                status: self.status,
                action,
            });
        }
        self.status = target;
        Ok(())
    }

    /// Checks if transition is valid
    fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self.status, target),
            (Submitted, Approved) |
            (Submitted, Rejected) |
            (Approved, Paid)
        )
    }
}
