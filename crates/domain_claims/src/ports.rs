//! Claims Domain Ports
//!
//! - [`ClaimStore`]: repository behind the claim registry
//! - [`FundTransferPort`]: the settlement layer that moves value to the
//!   policyholder on payout
//!
//! In-memory adapters for both live in [`memory`]; the PostgreSQL claim store
//! is provided by `infra_db`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use core_kernel::{ClaimId, DomainPort, HealthCheckable, Money, PolicyId, PortError, Principal};

use crate::claim::Claim;

/// Storage for claim records
#[async_trait]
pub trait ClaimStore: DomainPort + HealthCheckable {
    /// Allocates the next claim id
    async fn next_id(&self) -> Result<ClaimId, PortError>;

    /// Loads a claim by id
    async fn get(&self, id: ClaimId) -> Result<Option<Claim>, PortError>;

    /// Stores a new claim
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if a claim with the same id already exists
    async fn insert(&self, claim: &Claim) -> Result<(), PortError>;

    /// Replaces an existing claim
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the claim does not exist
    async fn update(&self, claim: &Claim) -> Result<(), PortError>;

    /// Lists the claims filed against a policy, ordered by id
    async fn find_by_policy(&self, policy_id: PolicyId) -> Result<Vec<Claim>, PortError>;
}

/// Failure reported by the settlement layer
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    /// The transfer was refused
    #[error("Transfer rejected: {reason}")]
    Rejected { reason: String },

    /// The settlement layer could not be reached
    #[error("Settlement layer unavailable: {message}")]
    Unavailable { message: String },
}

/// Proof of a completed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Reference assigned by the settlement layer
    pub reference: Uuid,
    /// Recipient
    pub to: Principal,
    /// Amount moved
    pub amount: Money,
    /// Completion time
    pub completed_at: DateTime<Utc>,
}

/// Moves value to a principal
#[async_trait]
pub trait FundTransferPort: DomainPort + HealthCheckable {
    /// Transfers `amount` to `to`
    async fn transfer(&self, to: Principal, amount: Money) -> Result<TransferReceipt, TransferError>;
}

/// In-memory implementations of the claims ports
pub mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    #[derive(Debug)]
    struct ClaimState {
        next: ClaimId,
        claims: BTreeMap<ClaimId, Claim>,
    }

    /// Claim records kept in process memory
    #[derive(Debug)]
    pub struct InMemoryClaimStore {
        state: RwLock<ClaimState>,
    }

    impl InMemoryClaimStore {
        /// Creates an empty store whose first id is `CLM-1`
        pub fn new() -> Self {
            Self {
                state: RwLock::new(ClaimState {
                    next: ClaimId::FIRST,
                    claims: BTreeMap::new(),
                }),
            }
        }
    }

    impl Default for InMemoryClaimStore {
        fn default() -> Self {
            Self::new()
        }
    }

    impl DomainPort for InMemoryClaimStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryClaimStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("memory-claim-store")
        }
    }

    #[async_trait]
    impl ClaimStore for InMemoryClaimStore {
        async fn next_id(&self) -> Result<ClaimId, PortError> {
            let mut state = self.state.write().await;
            let id = state.next;
            state.next = id.next();
            Ok(id)
        }

        async fn get(&self, id: ClaimId) -> Result<Option<Claim>, PortError> {
            Ok(self.state.read().await.claims.get(&id).cloned())
        }

        async fn insert(&self, claim: &Claim) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if state.claims.contains_key(&claim.id) {
                return Err(PortError::conflict(format!("Claim {} already exists", claim.id)));
            }
            state.claims.insert(claim.id, claim.clone());
            Ok(())
        }

        async fn update(&self, claim: &Claim) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            match state.claims.get_mut(&claim.id) {
                Some(slot) => {
                    *slot = claim.clone();
                    Ok(())
                }
                None => Err(PortError::not_found("Claim", claim.id)),
            }
        }

        async fn find_by_policy(&self, policy_id: PolicyId) -> Result<Vec<Claim>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .claims
                .values()
                .filter(|c| c.policy_id == policy_id)
                .cloned()
                .collect())
        }
    }

    /// Settlement layer stand-in that records every transfer
    ///
    /// Can be switched into a failing mode to exercise payout failures.
    #[derive(Debug, Default)]
    pub struct InMemoryFundLedger {
        transfers: RwLock<Vec<TransferReceipt>>,
        failing: AtomicBool,
    }

    impl InMemoryFundLedger {
        /// Creates a ledger that accepts every transfer
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every subsequent transfer fail (or succeed again)
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// All completed transfers, oldest first
        pub async fn transfers(&self) -> Vec<TransferReceipt> {
            self.transfers.read().await.clone()
        }

        /// Total number of completed transfers
        pub async fn transfer_count(&self) -> usize {
            self.transfers.read().await.len()
        }
    }

    impl DomainPort for InMemoryFundLedger {}

    #[async_trait]
    impl HealthCheckable for InMemoryFundLedger {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("memory-fund-ledger")
        }
    }

    #[async_trait]
    impl FundTransferPort for InMemoryFundLedger {
        async fn transfer(&self, to: Principal, amount: Money) -> Result<TransferReceipt, TransferError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(TransferError::Unavailable {
                    message: "ledger is configured to fail".to_string(),
                });
            }
            if !amount.is_positive() {
                return Err(TransferError::Rejected {
                    reason: format!("non-positive amount {}", amount),
                });
            }

            let receipt = TransferReceipt {
                reference: Uuid::new_v4(),
                to,
                amount,
                completed_at: Utc::now(),
            };
            self.transfers.write().await.push(receipt.clone());
            Ok(receipt)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use core_kernel::Currency;

        #[tokio::test]
        async fn test_ledger_records_transfers() {
            let ledger = InMemoryFundLedger::new();
            let to = Principal::new();

            let receipt = ledger
                .transfer(to, Money::from_minor(300_000, Currency::USD))
                .await
                .unwrap();

            assert_eq!(receipt.to, to);
            assert_eq!(ledger.transfers().await, vec![receipt]);
        }

        #[tokio::test]
        async fn test_failing_ledger_records_nothing() {
            let ledger = InMemoryFundLedger::new();
            ledger.set_failing(true);

            let result = ledger
                .transfer(Principal::new(), Money::from_minor(1, Currency::USD))
                .await;

            assert!(matches!(result, Err(TransferError::Unavailable { .. })));
            assert_eq!(ledger.transfer_count().await, 0);

            ledger.set_failing(false);
            assert!(ledger
                .transfer(Principal::new(), Money::from_minor(1, Currency::USD))
                .await
                .is_ok());
        }

        #[tokio::test]
        async fn test_claim_store_ids_and_lookup() {
            let store = InMemoryClaimStore::new();
            let first = store.next_id().await.unwrap();
            let second = store.next_id().await.unwrap();
            assert!(second > first);

            let claim = Claim::submit(
                first,
                PolicyId::new(2),
                Principal::new(),
                Money::from_minor(100, Currency::USD),
                "Broken window",
                Utc::now(),
            );
            store.insert(&claim).await.unwrap();

            assert_eq!(store.get(first).await.unwrap(), Some(claim.clone()));
            assert!(store.get(second).await.unwrap().is_none());
            assert_eq!(store.find_by_policy(PolicyId::new(2)).await.unwrap(), vec![claim]);
            assert!(store.find_by_policy(PolicyId::new(1)).await.unwrap().is_empty());
        }
    }
}
