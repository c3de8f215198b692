//! Policy Aggregate
//!
//! # Invariants
//!
//! - Premium and coverage are strictly positive and share a currency
//! - The coverage window has a strictly positive duration
//! - `total_premiums_paid` and `last_premium_paid_at` never decrease
//! - Premiums are only accepted while the stored status is Active and the
//!   clock is inside the coverage window

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{CoverageWindow, Money, PolicyId, Principal};

use crate::error::PolicyError;

/// Stored lifecycle status of a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyStatus {
    /// Accepting premiums and claims while inside the coverage window
    Active,
    /// Coverage window has closed
    Expired,
    /// Terminated before the end of the window
    Cancelled,
}

impl PolicyStatus {
    /// Stable name used for storage and display
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyStatus::Active => "Active",
            PolicyStatus::Expired => "Expired",
            PolicyStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyStatus {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(PolicyStatus::Active),
            "Expired" => Ok(PolicyStatus::Expired),
            "Cancelled" => Ok(PolicyStatus::Cancelled),
            other => Err(PolicyError::InvalidArgument(format!(
                "Unknown policy status '{}'",
                other
            ))),
        }
    }
}

/// Terms requested by an insurer when issuing a policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuePolicyRequest {
    /// Owner of the new policy
    pub policyholder: Principal,
    /// Amount due per payment cycle
    pub premium_amount: Money,
    /// Upper bound on any single claim
    pub coverage_amount: Money,
    /// Length of the coverage window
    pub duration: Duration,
}

impl IssuePolicyRequest {
    /// Checks the request terms without touching any state
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.policyholder.is_null() {
            return Err(PolicyError::InvalidArgument(
                "Policyholder cannot be the null principal".to_string(),
            ));
        }
        if !self.premium_amount.is_positive() {
            return Err(PolicyError::InvalidArgument(format!(
                "Premium must be positive, got {}",
                self.premium_amount
            )));
        }
        if !self.coverage_amount.is_positive() {
            return Err(PolicyError::InvalidArgument(format!(
                "Coverage must be positive, got {}",
                self.coverage_amount
            )));
        }
        if !self.premium_amount.same_currency(&self.coverage_amount) {
            return Err(PolicyError::InvalidArgument(format!(
                "Premium currency {} differs from coverage currency {}",
                self.premium_amount.currency(),
                self.coverage_amount.currency()
            )));
        }
        if self.duration <= Duration::zero() {
            return Err(PolicyError::InvalidArgument(format!(
                "Duration must be positive, got {} seconds",
                self.duration.num_seconds()
            )));
        }
        Ok(())
    }
}

/// An insurance policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Sequential identifier
    pub id: PolicyId,
    /// Owner of the policy; may pay premiums and file claims
    pub policyholder: Principal,
    /// Insurer that issued the policy
    pub insurer: Principal,
    /// Amount due per payment cycle
    pub premium_amount: Money,
    /// Upper bound on any single claim
    pub coverage_amount: Money,
    /// Period in which the policy is usable
    pub window: CoverageWindow,
    /// Stored status; see [`Policy::derived_status`]
    pub status: PolicyStatus,
    /// Time of the last premium payment (issue time until the first payment)
    pub last_premium_paid_at: DateTime<Utc>,
    /// Sum of all premiums received
    pub total_premiums_paid: Money,
}

impl Policy {
    /// Issues a new Active policy starting at `now`
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the request terms are invalid
    pub fn issue(
        id: PolicyId,
        insurer: Principal,
        request: IssuePolicyRequest,
        now: DateTime<Utc>,
    ) -> Result<Self, PolicyError> {
        request.validate()?;
        let window = CoverageWindow::new(now, request.duration)
            .map_err(|e| PolicyError::InvalidArgument(e.to_string()))?;

        Ok(Self {
            id,
            policyholder: request.policyholder,
            insurer,
            premium_amount: request.premium_amount,
            coverage_amount: request.coverage_amount,
            window,
            status: PolicyStatus::Active,
            last_premium_paid_at: now,
            total_premiums_paid: Money::zero(request.premium_amount.currency()),
        })
    }

    /// Start of the coverage window
    pub fn start_time(&self) -> DateTime<Utc> {
        self.window.start()
    }

    /// Length of the coverage window
    pub fn duration(&self) -> Duration {
        self.window.duration()
    }

    /// Last instant at which the policy is usable
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.window.end()
    }

    /// Status as seen at `now`
    ///
    /// Reports `Expired` once the window has closed, whatever the stored
    /// status says. Pure: the stored status is left untouched.
    pub fn derived_status(&self, now: DateTime<Utc>) -> PolicyStatus {
        if self.window.has_elapsed(now) {
            PolicyStatus::Expired
        } else {
            self.status
        }
    }

    /// Fails unless the policy is Active and `now` is inside the window
    pub fn ensure_usable(&self, now: DateTime<Utc>) -> Result<(), PolicyError> {
        self.ensure_active()?;
        self.ensure_in_window(now)
    }

    /// Records a premium payment
    ///
    /// The paid amount must equal the premium exactly, currency included.
    /// Nothing is changed when any check fails.
    ///
    /// # Errors
    ///
    /// - `PolicyNotActive` if the stored status is not Active
    /// - `AmountMismatch` if the amount differs from the premium
    /// - `PolicyExpired` if the coverage window has closed
    pub fn record_premium(&mut self, amount: Money, now: DateTime<Utc>) -> Result<(), PolicyError> {
        self.ensure_active()?;
        if amount != self.premium_amount {
            return Err(PolicyError::AmountMismatch {
                expected: self.premium_amount,
                actual: amount,
            });
        }
        self.ensure_in_window(now)?;

        let total = self
            .total_premiums_paid
            .checked_add(&amount)
            .map_err(|e| PolicyError::InvalidArgument(e.to_string()))?;

        self.total_premiums_paid = total;
        self.last_premium_paid_at = self.last_premium_paid_at.max(now);
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), PolicyError> {
        if self.status != PolicyStatus::Active {
            return Err(PolicyError::PolicyNotActive {
                policy_id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    fn ensure_in_window(&self, now: DateTime<Utc>) -> Result<(), PolicyError> {
        if self.window.has_elapsed(now) {
            return Err(PolicyError::PolicyExpired {
                policy_id: self.id,
                expired_at: self.window.end(),
            });
        }
        if now < self.window.start() {
            // Not yet in force
            return Err(PolicyError::PolicyNotActive {
                policy_id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }
}
