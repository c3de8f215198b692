//! Claim Registry service
//!
//! Reads policies through the [`PolicyRegistry`] and never mutates them.
//! Each mutation holds the registry's critical section for its whole
//! read-validate-write sequence, including the fund transfer on payout, so
//! two concurrent payouts of one claim cannot both observe `Approved`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use core_kernel::{ClaimId, Clock, EventPublisher, HealthCheckResult, Money, PolicyId, Principal};
use domain_access::AuthorizationGuard;
use domain_policy::PolicyRegistry;

use crate::claim::{Claim, ClaimStatus};
use crate::error::ClaimError;
use crate::events::ClaimEvent;
use crate::ports::{ClaimStore, FundTransferPort, TransferReceipt};

/// Order of the status flip and the fund transfer in `pay_claim`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutOrdering {
    /// Persist Paid, then transfer. A failed transfer leaves the claim Paid.
    #[default]
    MarkPaidFirst,
    /// Persist Paid, then transfer. A failed transfer restores Approved.
    RollbackOnFailure,
}

impl PayoutOrdering {
    /// Configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutOrdering::MarkPaidFirst => "mark_paid_first",
            PayoutOrdering::RollbackOnFailure => "rollback_on_failure",
        }
    }
}

impl fmt::Display for PayoutOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayoutOrdering {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mark_paid_first" => Ok(PayoutOrdering::MarkPaidFirst),
            "rollback_on_failure" => Ok(PayoutOrdering::RollbackOnFailure),
            other => Err(ClaimError::InvalidArgument(format!(
                "Unknown payout ordering '{}'",
                other
            ))),
        }
    }
}

/// Tunables for the claim registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimRegistryConfig {
    pub payout_ordering: PayoutOrdering,
}

/// Owns the canonical state of every claim
pub struct ClaimRegistry {
    store: Arc<dyn ClaimStore>,
    policies: Arc<PolicyRegistry>,
    guard: Arc<AuthorizationGuard>,
    funds: Arc<dyn FundTransferPort>,
    clock: Arc<dyn Clock>,
    publisher: Arc<dyn EventPublisher<ClaimEvent>>,
    config: ClaimRegistryConfig,
    write_lock: Mutex<()>,
}

impl ClaimRegistry {
    /// Creates a registry with the default configuration
    pub fn new(
        store: Arc<dyn ClaimStore>,
        policies: Arc<PolicyRegistry>,
        guard: Arc<AuthorizationGuard>,
        funds: Arc<dyn FundTransferPort>,
        clock: Arc<dyn Clock>,
        publisher: Arc<dyn EventPublisher<ClaimEvent>>,
    ) -> Self {
        Self {
            store,
            policies,
            guard,
            funds,
            clock,
            publisher,
            config: ClaimRegistryConfig::default(),
            write_lock: Mutex::new(()),
        }
    }

    /// Replaces the configuration
    pub fn with_config(mut self, config: ClaimRegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Configured payout ordering
    pub fn payout_ordering(&self) -> PayoutOrdering {
        self.config.payout_ordering
    }

    /// Files a claim against a policy
    ///
    /// # Errors
    ///
    /// - `PolicyNotFound` if the policy does not exist
    /// - `Unauthorized` if `claimant` is not the policyholder
    /// - `PolicyNotActive` / `PolicyExpired` if the policy is not usable now
    /// - `InvalidArgument` if the amount is not positive or is in another
    ///   currency than the coverage
    /// - `ClaimExceedsCoverage` if the amount is above the coverage
    #[instrument(skip_all, fields(%policy_id, %claimant, %claim_amount))]
    pub async fn submit_claim(
        &self,
        policy_id: PolicyId,
        claimant: Principal,
        claim_amount: Money,
        reason: impl Into<String>,
    ) -> Result<ClaimId, ClaimError> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let policy = self.policies.get_policy_details(policy_id).await?;
        self.guard
            .ensure_policyholder(claimant, policy.policyholder, "submit_claim")?;
        policy.ensure_usable(now)?;

        if !claim_amount.is_positive() {
            return Err(ClaimError::InvalidArgument(format!(
                "Claim amount must be positive, got {}",
                claim_amount
            )));
        }
        if exceeds(&claim_amount, &policy.coverage_amount)? {
            return Err(ClaimError::ClaimExceedsCoverage {
                claim_amount,
                coverage: policy.coverage_amount,
            });
        }

        let id = self.store.next_id().await?;
        let claim = Claim::submit(id, policy_id, policy.policyholder, claim_amount, reason, now);
        self.store.insert(&claim).await?;

        info!(claim_id = %id, "Claim submitted");
        self.publisher.publish(ClaimEvent::ClaimSubmitted {
            claim_id: id,
            policy_id,
            claim_amount,
            timestamp: now,
        });

        Ok(id)
    }

    /// Approves a submitted claim
    ///
    /// The amount is checked against the policy coverage again.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if `insurer` is not an authorized insurer
    /// - `ClaimNotFound` if the claim does not exist
    /// - `InvalidState` unless the claim is Submitted
    /// - `InsufficientCoverage` if the amount is now above the coverage
    #[instrument(skip_all, fields(%claim_id, %insurer))]
    pub async fn approve_claim(&self, claim_id: ClaimId, insurer: Principal) -> Result<(), ClaimError> {
        self.guard.ensure_insurer(insurer, "approve_claim").await?;

        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let mut claim = self.load(claim_id).await?;
        claim.ensure_status(ClaimStatus::Submitted, "approve")?;

        let policy = self.policies.get_policy_details(claim.policy_id).await?;
        if exceeds(&claim.claim_amount, &policy.coverage_amount)? {
            return Err(ClaimError::InsufficientCoverage {
                claim_id,
                claim_amount: claim.claim_amount,
                coverage: policy.coverage_amount,
            });
        }

        claim.approve(insurer, now)?;
        self.store.update(&claim).await?;

        info!(policy_id = %claim.policy_id, amount = %claim.claim_amount, "Claim approved");
        self.publisher.publish(ClaimEvent::ClaimApproved {
            claim_id,
            policy_id: claim.policy_id,
            approved_amount: claim.claim_amount,
            timestamp: now,
        });

        Ok(())
    }

    /// Rejects a submitted claim
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if `insurer` is not an authorized insurer
    /// - `ClaimNotFound` if the claim does not exist
    /// - `InvalidState` unless the claim is Submitted
    #[instrument(skip_all, fields(%claim_id, %insurer))]
    pub async fn reject_claim(&self, claim_id: ClaimId, insurer: Principal) -> Result<(), ClaimError> {
        self.guard.ensure_insurer(insurer, "reject_claim").await?;

        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let mut claim = self.load(claim_id).await?;
        claim.reject(insurer, now)?;
        self.store.update(&claim).await?;

        info!(policy_id = %claim.policy_id, "Claim rejected");
        self.publisher.publish(ClaimEvent::ClaimRejected {
            claim_id,
            policy_id: claim.policy_id,
            timestamp: now,
        });

        Ok(())
    }

    /// Pays out an approved claim to its policyholder
    ///
    /// The claim is stored as Paid before the transfer is attempted. What
    /// happens on a failed transfer depends on [`PayoutOrdering`].
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if `insurer` is not an authorized insurer
    /// - `ClaimNotFound` if the claim does not exist
    /// - `InvalidState` unless the claim is Approved
    /// - `TransferFailed` if the settlement layer failed
    #[instrument(skip_all, fields(%claim_id, %insurer, ordering = %self.config.payout_ordering))]
    pub async fn pay_claim(
        &self,
        claim_id: ClaimId,
        insurer: Principal,
    ) -> Result<TransferReceipt, ClaimError> {
        self.guard.ensure_insurer(insurer, "pay_claim").await?;

        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let mut claim = self.load(claim_id).await?;
        claim.mark_paid(now)?;
        self.store.update(&claim).await?;

        let receipt = match self.funds.transfer(claim.policyholder, claim.claim_amount).await {
            Ok(receipt) => receipt,
            Err(source) => {
                match self.config.payout_ordering {
                    PayoutOrdering::MarkPaidFirst => {
                        error!(
                            policyholder = %claim.policyholder,
                            amount = %claim.claim_amount,
                            error = %source,
                            "Fund transfer failed; claim remains Paid without payout"
                        );
                    }
                    PayoutOrdering::RollbackOnFailure => {
                        claim.revert_payment();
                        if let Err(store_error) = self.store.update(&claim).await {
                            error!(
                                policyholder = %claim.policyholder,
                                amount = %claim.claim_amount,
                                transfer_error = %source,
                                error = %store_error,
                                "Rollback not persisted; claim remains Paid without payout"
                            );
                            return Err(store_error.into());
                        }
                        warn!(error = %source, "Fund transfer failed; claim restored to Approved");
                    }
                }
                return Err(ClaimError::TransferFailed { claim_id, source });
            }
        };

        info!(
            policyholder = %claim.policyholder,
            amount = %claim.claim_amount,
            reference = %receipt.reference,
            "Claim paid"
        );
        self.publisher.publish(ClaimEvent::ClaimPaid {
            claim_id,
            policyholder: claim.policyholder,
            amount: claim.claim_amount,
            timestamp: now,
        });

        Ok(receipt)
    }

    /// Returns the stored claim record
    pub async fn get_claim_details(&self, claim_id: ClaimId) -> Result<Claim, ClaimError> {
        self.load(claim_id).await
    }

    /// Lists the claims filed against a policy, ordered by id
    ///
    /// # Errors
    ///
    /// Returns `PolicyNotFound` if the policy does not exist
    pub async fn claims_for_policy(&self, policy_id: PolicyId) -> Result<Vec<Claim>, ClaimError> {
        self.policies.get_policy_details(policy_id).await?;
        Ok(self.store.find_by_policy(policy_id).await?)
    }

    /// Health of the claim store and the settlement layer
    pub async fn health(&self) -> Vec<HealthCheckResult> {
        vec![
            self.store.health_check().await,
            self.funds.health_check().await,
        ]
    }

    async fn load(&self, claim_id: ClaimId) -> Result<Claim, ClaimError> {
        self.store
            .get(claim_id)
            .await?
            .ok_or(ClaimError::ClaimNotFound(claim_id))
    }
}

impl fmt::Debug for ClaimRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimRegistry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// True if `amount` is above `coverage`
///
/// A claim in another currency than the coverage is an invalid argument.
fn exceeds(amount: &Money, coverage: &Money) -> Result<bool, ClaimError> {
    amount
        .checked_cmp(coverage)
        .map(|ord| ord == Ordering::Greater)
        .map_err(|e| ClaimError::InvalidArgument(e.to_string()))
}
