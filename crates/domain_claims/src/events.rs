//! Domain events for the claim registry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, DomainEvent, Money, PolicyId, Principal};

/// Domain events emitted by the claim registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimEvent {
    /// Claim filed by the policyholder
    ClaimSubmitted {
        claim_id: ClaimId,
        policy_id: PolicyId,
        claim_amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// Claim approved by an insurer
    ClaimApproved {
        claim_id: ClaimId,
        policy_id: PolicyId,
        approved_amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// Claim rejected by an insurer
    ClaimRejected {
        claim_id: ClaimId,
        policy_id: PolicyId,
        timestamp: DateTime<Utc>,
    },

    /// Funds released to the policyholder
    ClaimPaid {
        claim_id: ClaimId,
        policyholder: Principal,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
}

impl ClaimEvent {
    /// Returns the claim ID associated with this event
    pub fn claim_id(&self) -> ClaimId {
        match self {
            ClaimEvent::ClaimSubmitted { claim_id, .. } => *claim_id,
            ClaimEvent::ClaimApproved { claim_id, .. } => *claim_id,
            ClaimEvent::ClaimRejected { claim_id, .. } => *claim_id,
            ClaimEvent::ClaimPaid { claim_id, .. } => *claim_id,
        }
    }
}

impl DomainEvent for ClaimEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ClaimEvent::ClaimSubmitted { .. } => "ClaimSubmitted",
            ClaimEvent::ClaimApproved { .. } => "ClaimApproved",
            ClaimEvent::ClaimRejected { .. } => "ClaimRejected",
            ClaimEvent::ClaimPaid { .. } => "ClaimPaid",
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ClaimEvent::ClaimSubmitted { timestamp, .. }
            | ClaimEvent::ClaimApproved { timestamp, .. }
            | ClaimEvent::ClaimRejected { timestamp, .. }
            | ClaimEvent::ClaimPaid { timestamp, .. } => *timestamp,
        }
    }
}
