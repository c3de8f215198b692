//! Policy Registry service
//!
//! Every mutation runs inside one critical section spanning
//! read-validate-write, so two payments on the same policy can never both
//! observe the same ledger. Reads go straight to the store.

use std::sync::Arc;

use chrono::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use core_kernel::{
    Clock, EventPublisher, HealthCheckResult, Money, PolicyId, Principal,
    DEFAULT_GRACE_PERIOD_SECS,
};
use domain_access::AuthorizationGuard;

use crate::error::PolicyError;
use crate::events::PolicyEvent;
use crate::policy::{IssuePolicyRequest, Policy, PolicyStatus};
use crate::ports::PolicyStore;

/// Tunables for the policy registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRegistryConfig {
    /// Grace period after a missed premium
    ///
    /// Reported alongside policy details; no operation enforces it.
    pub grace_period: Duration,
}

impl Default for PolicyRegistryConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::seconds(DEFAULT_GRACE_PERIOD_SECS),
        }
    }
}

/// Owns the canonical state of every policy
pub struct PolicyRegistry {
    store: Arc<dyn PolicyStore>,
    guard: Arc<AuthorizationGuard>,
    clock: Arc<dyn Clock>,
    publisher: Arc<dyn EventPublisher<PolicyEvent>>,
    config: PolicyRegistryConfig,
    write_lock: Mutex<()>,
}

impl PolicyRegistry {
    /// Creates a registry with the default configuration
    pub fn new(
        store: Arc<dyn PolicyStore>,
        guard: Arc<AuthorizationGuard>,
        clock: Arc<dyn Clock>,
        publisher: Arc<dyn EventPublisher<PolicyEvent>>,
    ) -> Self {
        Self {
            store,
            guard,
            clock,
            publisher,
            config: PolicyRegistryConfig::default(),
            write_lock: Mutex::new(()),
        }
    }

    /// Replaces the configuration
    pub fn with_config(mut self, config: PolicyRegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Configured grace period
    pub fn grace_period(&self) -> Duration {
        self.config.grace_period
    }

    /// Clock used for every time check
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Issues a new policy
    ///
    /// The policy starts now, is Active and has an empty premium ledger.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if `insurer` is not an authorized insurer
    /// - `InvalidArgument` if any request term is invalid
    #[instrument(skip_all, fields(%insurer, policyholder = %request.policyholder))]
    pub async fn issue_policy(
        &self,
        insurer: Principal,
        request: IssuePolicyRequest,
    ) -> Result<PolicyId, PolicyError> {
        self.guard.ensure_insurer(insurer, "issue_policy").await?;
        request.validate()?;

        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();
        let id = self.store.next_id().await?;
        let policy = Policy::issue(id, insurer, request, now)?;
        self.store.insert(&policy).await?;

        info!(
            policy_id = %id,
            premium = %policy.premium_amount,
            coverage = %policy.coverage_amount,
            expires_at = %policy.expires_at(),
            "Policy issued"
        );
        self.publisher.publish(PolicyEvent::PolicyIssued {
            policy_id: id,
            policyholder: policy.policyholder,
            premium_amount: policy.premium_amount,
            coverage_amount: policy.coverage_amount,
            timestamp: now,
        });

        Ok(id)
    }

    /// Records a premium payment
    ///
    /// Anyone may pay on behalf of the holder. The amount must equal the
    /// premium exactly.
    ///
    /// # Errors
    ///
    /// - `PolicyNotFound` if no policy has this id
    /// - `PolicyNotActive` if the stored status is not Active
    /// - `AmountMismatch` if the amount differs from the premium
    /// - `PolicyExpired` if the coverage window has closed
    #[instrument(skip_all, fields(%policy_id, %payer, %amount))]
    pub async fn pay_premium(
        &self,
        policy_id: PolicyId,
        payer: Principal,
        amount: Money,
    ) -> Result<(), PolicyError> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let mut policy = self.load(policy_id).await?;
        policy.record_premium(amount, now)?;
        self.store.update(&policy).await?;

        info!(
            total_premiums_paid = %policy.total_premiums_paid,
            "Premium paid"
        );
        self.publisher.publish(PolicyEvent::PremiumPaid {
            policy_id,
            payer,
            amount,
            timestamp: now,
        });

        Ok(())
    }

    /// Returns the status as of now
    ///
    /// `Expired` once the coverage window has closed, otherwise the stored
    /// status. Never writes.
    pub async fn check_policy_status(&self, policy_id: PolicyId) -> Result<PolicyStatus, PolicyError> {
        let policy = self.load(policy_id).await?;
        let status = policy.derived_status(self.clock.now());
        debug!(%policy_id, stored = %policy.status, derived = %status, "Policy status checked");
        Ok(status)
    }

    /// Returns the stored policy record
    pub async fn get_policy_details(&self, policy_id: PolicyId) -> Result<Policy, PolicyError> {
        self.load(policy_id).await
    }

    /// Lists the policies owned by a holder, ordered by id
    pub async fn policies_held_by(&self, holder: Principal) -> Result<Vec<Policy>, PolicyError> {
        Ok(self.store.find_by_policyholder(holder).await?)
    }

    /// Health of the backing store
    pub async fn store_health(&self) -> HealthCheckResult {
        self.store.health_check().await
    }

    async fn load(&self, policy_id: PolicyId) -> Result<Policy, PolicyError> {
        self.store
            .get(policy_id)
            .await?
            .ok_or(PolicyError::PolicyNotFound(policy_id))
    }
}

impl std::fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyRegistry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
