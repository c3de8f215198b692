//! Test Data Builders
//!
//! Builders for request data with sensible defaults, plus an in-memory
//! [`RegistryHarness`] that wires the guard, both registries, a fund ledger,
//! a manual clock, and recording publishers together.

use std::sync::Arc;

use chrono::Duration;
use core_kernel::{ClaimId, ManualClock, Money, PolicyId, Principal, RecordingPublisher};
use domain_access::{AuthorizationGuard, InMemoryInsurerStore};
use domain_claims::{
    ClaimEvent, ClaimRegistry, ClaimRegistryConfig, InMemoryClaimStore, InMemoryFundLedger,
    PayoutOrdering,
};
use domain_policy::{
    InMemoryPolicyStore, IssuePolicyRequest, PolicyEvent, PolicyRegistry, PolicyRegistryConfig,
};

use crate::fixtures::{MoneyFixtures, StringFixtures, TemporalFixtures};

/// Builder for [`IssuePolicyRequest`]
#[derive(Debug, Clone)]
pub struct IssuePolicyRequestBuilder {
    policyholder: Principal,
    premium_amount: Money,
    coverage_amount: Money,
    duration: Duration,
}

impl Default for IssuePolicyRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IssuePolicyRequestBuilder {
    /// Creates a new builder with a fresh holder and the standard terms
    pub fn new() -> Self {
        Self {
            policyholder: Principal::new(),
            premium_amount: MoneyFixtures::usd_premium(),
            coverage_amount: MoneyFixtures::usd_coverage(),
            duration: TemporalFixtures::standard_duration(),
        }
    }

    /// Sets the policyholder
    pub fn with_policyholder(mut self, holder: Principal) -> Self {
        self.policyholder = holder;
        self
    }

    /// Sets the premium due per payment
    pub fn with_premium(mut self, premium: Money) -> Self {
        self.premium_amount = premium;
        self
    }

    /// Sets the coverage limit
    pub fn with_coverage(mut self, coverage: Money) -> Self {
        self.coverage_amount = coverage;
        self
    }

    /// Sets the coverage duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Builds the request
    pub fn build(self) -> IssuePolicyRequest {
        IssuePolicyRequest {
            policyholder: self.policyholder,
            premium_amount: self.premium_amount,
            coverage_amount: self.coverage_amount,
            duration: self.duration,
        }
    }
}

/// Fully wired in-memory registry stack
///
/// The clock starts at [`TemporalFixtures::epoch`]. `insurer` is authorized
/// by `owner` during construction; `holder` has no role.
pub struct RegistryHarness {
    pub guard: Arc<AuthorizationGuard>,
    pub policies: Arc<PolicyRegistry>,
    pub policy_store: Arc<InMemoryPolicyStore>,
    pub claims: Arc<ClaimRegistry>,
    pub claim_store: Arc<InMemoryClaimStore>,
    pub ledger: Arc<InMemoryFundLedger>,
    pub clock: Arc<ManualClock>,
    pub policy_events: RecordingPublisher<PolicyEvent>,
    pub claim_events: RecordingPublisher<ClaimEvent>,
    pub owner: Principal,
    pub insurer: Principal,
    pub holder: Principal,
}

/// Builder for [`RegistryHarness`]
#[derive(Debug, Clone, Default)]
pub struct RegistryHarnessBuilder {
    payout_ordering: PayoutOrdering,
    grace_period: Option<Duration>,
}

impl RegistryHarnessBuilder {
    /// Creates a builder with the default payout ordering and grace period
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how the claim registry orders payout and status change
    pub fn with_payout_ordering(mut self, ordering: PayoutOrdering) -> Self {
        self.payout_ordering = ordering;
        self
    }

    /// Overrides the reported premium grace period
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = Some(grace_period);
        self
    }

    /// Wires the stack
    ///
    /// # Panics
    ///
    /// Panics if the in-memory guard cannot be initialized
    pub async fn build(self) -> RegistryHarness {
        let owner = Principal::new();
        let insurer = Principal::new();
        let holder = Principal::new();

        let guard = Arc::new(
            AuthorizationGuard::initialize(Arc::new(InMemoryInsurerStore::new()), owner)
                .await
                .expect("in-memory guard initializes"),
        );
        guard
            .add_insurer(owner, insurer)
            .await
            .expect("owner can authorize an insurer");

        let clock = Arc::new(ManualClock::new(TemporalFixtures::epoch()));

        let policy_store = Arc::new(InMemoryPolicyStore::new());
        let policy_events = RecordingPublisher::new();
        let mut policy_config = PolicyRegistryConfig::default();
        if let Some(grace_period) = self.grace_period {
            policy_config.grace_period = grace_period;
        }
        let policies = Arc::new(
            PolicyRegistry::new(
                policy_store.clone(),
                guard.clone(),
                clock.clone(),
                Arc::new(policy_events.clone()),
            )
            .with_config(policy_config),
        );

        let claim_store = Arc::new(InMemoryClaimStore::new());
        let ledger = Arc::new(InMemoryFundLedger::new());
        let claim_events = RecordingPublisher::new();
        let claims = Arc::new(
            ClaimRegistry::new(
                claim_store.clone(),
                policies.clone(),
                guard.clone(),
                ledger.clone(),
                clock.clone(),
                Arc::new(claim_events.clone()),
            )
            .with_config(ClaimRegistryConfig {
                payout_ordering: self.payout_ordering,
            }),
        );

        RegistryHarness {
            guard,
            policies,
            policy_store,
            claims,
            claim_store,
            ledger,
            clock,
            policy_events,
            claim_events,
            owner,
            insurer,
            holder,
        }
    }
}

impl RegistryHarness {
    /// Builds a harness with default settings
    pub async fn new() -> Self {
        RegistryHarnessBuilder::new().build().await
    }

    /// Standard-terms request for the harness holder
    pub fn standard_request(&self) -> IssuePolicyRequest {
        IssuePolicyRequestBuilder::new()
            .with_policyholder(self.holder)
            .build()
    }

    /// Issues the standard policy to the harness holder
    ///
    /// # Panics
    ///
    /// Panics if issuance fails
    pub async fn issue_standard_policy(&self) -> PolicyId {
        self.policies
            .issue_policy(self.insurer, self.standard_request())
            .await
            .expect("standard policy issues")
    }

    /// Issues the standard policy and submits the standard claim against it
    ///
    /// # Panics
    ///
    /// Panics if issuance or submission fails
    pub async fn submitted_claim(&self) -> (PolicyId, ClaimId) {
        let policy_id = self.issue_standard_policy().await;
        let claim_id = self
            .claims
            .submit_claim(
                policy_id,
                self.holder,
                MoneyFixtures::usd_claim(),
                StringFixtures::claim_reason(),
            )
            .await
            .expect("standard claim submits");
        (policy_id, claim_id)
    }

    /// Same as [`submitted_claim`](Self::submitted_claim), then approved by the insurer
    ///
    /// # Panics
    ///
    /// Panics if any step fails
    pub async fn approved_claim(&self) -> (PolicyId, ClaimId) {
        let (policy_id, claim_id) = self.submitted_claim().await;
        self.claims
            .approve_claim(claim_id, self.insurer)
            .await
            .expect("standard claim approves");
        (policy_id, claim_id)
    }
}
