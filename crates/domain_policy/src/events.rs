//! Domain events for the policy registry
//!
//! One event is published for every successful mutation. Failed operations
//! publish nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DomainEvent, Money, PolicyId, Principal};

/// Domain events emitted by the policy registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyEvent {
    /// Policy has been issued
    PolicyIssued {
        policy_id: PolicyId,
        policyholder: Principal,
        premium_amount: Money,
        coverage_amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// Premium payment received
    PremiumPaid {
        policy_id: PolicyId,
        payer: Principal,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
}

impl PolicyEvent {
    /// Returns the policy ID associated with this event
    pub fn policy_id(&self) -> PolicyId {
        match self {
            PolicyEvent::PolicyIssued { policy_id, .. } => *policy_id,
            PolicyEvent::PremiumPaid { policy_id, .. } => *policy_id,
        }
    }
}

impl DomainEvent for PolicyEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PolicyEvent::PolicyIssued { .. } => "PolicyIssued",
            PolicyEvent::PremiumPaid { .. } => "PremiumPaid",
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            PolicyEvent::PolicyIssued { timestamp, .. } => *timestamp,
            PolicyEvent::PremiumPaid { timestamp, .. } => *timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;

    #[test]
    fn test_event_accessors() {
        let now = Utc::now();
        let event = PolicyEvent::PremiumPaid {
            policy_id: PolicyId::new(7),
            payer: Principal::new(),
            amount: Money::from_minor(10_000, Currency::USD),
            timestamp: now,
        };

        assert_eq!(event.policy_id(), PolicyId::new(7));
        assert_eq!(event.event_type(), "PremiumPaid");
        assert_eq!(event.timestamp(), now);
    }

    #[test]
    fn test_event_serializes_with_variant_tag() {
        let event = PolicyEvent::PolicyIssued {
            policy_id: PolicyId::FIRST,
            policyholder: Principal::new(),
            premium_amount: Money::from_minor(10_000, Currency::USD),
            coverage_amount: Money::from_minor(500_000, Currency::USD),
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("PolicyIssued").is_some());
    }
}
