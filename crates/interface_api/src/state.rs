//! Application state
//!
//! Wires the guard and both registries over either the in-memory stores or
//! the PostgreSQL repositories. Notifications go to the tracing log and
//! payouts to the in-process fund ledger.

use std::sync::Arc;

use core_kernel::{Clock, Principal, SystemClock, TracingPublisher};
use domain_access::{AccessError, AuthorizationGuard, InMemoryInsurerStore, InsurerStore};
use domain_claims::{
    ClaimRegistry, ClaimRegistryConfig, ClaimStore, FundTransferPort, InMemoryClaimStore,
    InMemoryFundLedger,
};
use domain_policy::{InMemoryPolicyStore, PolicyRegistry, PolicyRegistryConfig, PolicyStore};
use infra_db::{ClaimRepository, DatabasePool, InsurerRepository, PolicyRepository};

use crate::config::ApiConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub guard: Arc<AuthorizationGuard>,
    pub policies: Arc<PolicyRegistry>,
    pub claims: Arc<ClaimRegistry>,
    pub config: ApiConfig,
}

impl AppState {
    /// Assembles state from already wired components
    pub fn new(
        guard: Arc<AuthorizationGuard>,
        policies: Arc<PolicyRegistry>,
        claims: Arc<ClaimRegistry>,
        config: ApiConfig,
    ) -> Self {
        Self {
            guard,
            policies,
            claims,
            config,
        }
    }

    /// State backed by in-memory stores
    pub async fn in_memory(config: ApiConfig, owner: Principal) -> Result<Self, AccessError> {
        Self::assemble(
            Arc::new(InMemoryInsurerStore::new()),
            Arc::new(InMemoryPolicyStore::new()),
            Arc::new(InMemoryClaimStore::new()),
            config,
            owner,
        )
        .await
    }

    /// State backed by the PostgreSQL repositories
    ///
    /// The schema must already be migrated.
    pub async fn postgres(
        pool: DatabasePool,
        config: ApiConfig,
        owner: Principal,
    ) -> Result<Self, AccessError> {
        Self::assemble(
            Arc::new(InsurerRepository::new(pool.clone())),
            Arc::new(PolicyRepository::new(pool.clone())),
            Arc::new(ClaimRepository::new(pool)),
            config,
            owner,
        )
        .await
    }

    async fn assemble(
        insurers: Arc<dyn InsurerStore>,
        policy_store: Arc<dyn PolicyStore>,
        claim_store: Arc<dyn ClaimStore>,
        config: ApiConfig,
        owner: Principal,
    ) -> Result<Self, AccessError> {
        let guard = Arc::new(AuthorizationGuard::initialize(insurers, owner).await?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let funds: Arc<dyn FundTransferPort> = Arc::new(InMemoryFundLedger::new());

        let policies = Arc::new(
            PolicyRegistry::new(
                policy_store,
                guard.clone(),
                clock.clone(),
                Arc::new(TracingPublisher),
            )
            .with_config(PolicyRegistryConfig {
                grace_period: config.grace_period(),
            }),
        );

        let claims = Arc::new(
            ClaimRegistry::new(
                claim_store,
                policies.clone(),
                guard.clone(),
                funds,
                clock,
                Arc::new(TracingPublisher),
            )
            .with_config(ClaimRegistryConfig {
                payout_ordering: config.payout_ordering,
            }),
        );

        Ok(Self::new(guard, policies, claims, config))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("owner", &self.guard.owner())
            .field("payout_ordering", &self.claims.payout_ordering())
            .finish_non_exhaustive()
    }
}
