//! Policy DTOs

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Money, PolicyId, Principal};
use domain_policy::{Policy, PolicyStatus};

use super::MoneyDto;
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct IssuePolicyRequest {
    pub policyholder: Uuid,
    #[validate(nested)]
    pub premium_amount: MoneyDto,
    #[validate(nested)]
    pub coverage_amount: MoneyDto,
    #[validate(range(min = 1))]
    pub duration_secs: i64,
}

impl IssuePolicyRequest {
    /// Converts to the registry's issuance terms
    pub fn into_terms(self) -> Result<domain_policy::IssuePolicyRequest, ApiError> {
        let duration = Duration::try_seconds(self.duration_secs).ok_or_else(|| {
            ApiError::Validation(format!("duration_secs {} is out of range", self.duration_secs))
        })?;
        Ok(domain_policy::IssuePolicyRequest {
            policyholder: Principal::from_uuid(self.policyholder),
            premium_amount: self.premium_amount.to_money()?,
            coverage_amount: self.coverage_amount.to_money()?,
            duration,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PayPremiumRequest {
    #[validate(nested)]
    pub amount: MoneyDto,
}

#[derive(Debug, Serialize)]
pub struct PolicyResponse {
    pub policy_id: PolicyId,
    pub reference: String,
    pub policyholder: Principal,
    pub insurer: Principal,
    pub premium_amount: Money,
    pub coverage_amount: Money,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_secs: i64,
    /// Status as of the request
    pub status: PolicyStatus,
    /// Status as persisted; stays Active after the window closes
    pub stored_status: PolicyStatus,
    pub last_premium_paid_at: DateTime<Utc>,
    pub total_premiums_paid: Money,
    pub grace_period_secs: i64,
}

impl PolicyResponse {
    pub fn from_policy(policy: &Policy, now: DateTime<Utc>, grace_period: Duration) -> Self {
        Self {
            policy_id: policy.id,
            reference: policy.id.to_string(),
            policyholder: policy.policyholder,
            insurer: policy.insurer,
            premium_amount: policy.premium_amount,
            coverage_amount: policy.coverage_amount,
            start_time: policy.start_time(),
            end_time: policy.expires_at(),
            duration_secs: policy.duration().num_seconds(),
            status: policy.derived_status(now),
            stored_status: policy.status,
            last_premium_paid_at: policy.last_premium_paid_at,
            total_premiums_paid: policy.total_premiums_paid,
            grace_period_secs: grace_period.num_seconds(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PolicyStatusResponse {
    pub policy_id: PolicyId,
    pub status: PolicyStatus,
}
