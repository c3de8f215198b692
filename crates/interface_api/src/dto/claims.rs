//! Claims DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{ClaimId, Money, PolicyId, Principal};
use domain_claims::{Claim, ClaimStatus, TransferReceipt};

use super::MoneyDto;

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitClaimRequest {
    pub policy_id: PolicyId,
    #[validate(nested)]
    pub amount: MoneyDto,
    #[validate(length(max = 2000))]
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub claim_id: ClaimId,
    pub reference: String,
    pub policy_id: PolicyId,
    pub policyholder: Principal,
    pub claim_amount: Money,
    pub reason: String,
    pub status: ClaimStatus,
    pub submission_time: DateTime<Utc>,
    pub decided_by: Option<Principal>,
    pub decided_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<Claim> for ClaimResponse {
    fn from(claim: Claim) -> Self {
        Self {
            claim_id: claim.id,
            reference: claim.id.to_string(),
            policy_id: claim.policy_id,
            policyholder: claim.policyholder,
            claim_amount: claim.claim_amount,
            reason: claim.reason,
            status: claim.status,
            submission_time: claim.submission_time,
            decided_by: claim.decided_by,
            decided_at: claim.decided_at,
            paid_at: claim.paid_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub claim: ClaimResponse,
    pub transfer_reference: Uuid,
    pub paid_to: Principal,
    pub amount: Money,
    pub completed_at: DateTime<Utc>,
}

impl PaymentResponse {
    pub fn new(claim: Claim, receipt: TransferReceipt) -> Self {
        Self {
            claim: claim.into(),
            transfer_reference: receipt.reference,
            paid_to: receipt.to,
            amount: receipt.amount,
            completed_at: receipt.completed_at,
        }
    }
}
