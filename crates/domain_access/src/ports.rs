//! Access Domain Ports
//!
//! The [`InsurerStore`] holds the system owner and the append-only set of
//! authorized insurers. Adapters:
//!
//! - **In-memory** ([`memory::InMemoryInsurerStore`]): for tests and
//!   single-process deployments
//! - **PostgreSQL**: provided by `infra_db`

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PortError, Principal};

/// Storage for the owner and the authorized insurer set
#[async_trait]
pub trait InsurerStore: DomainPort + HealthCheckable {
    /// Returns the recorded system owner, if any
    async fn owner(&self) -> Result<Option<Principal>, PortError>;

    /// Records `owner` as system owner unless one is already recorded, and
    /// makes sure the owner is in the insurer set
    ///
    /// # Returns
    ///
    /// The owner that is in effect after the call
    async fn initialize_owner(&self, owner: Principal) -> Result<Principal, PortError>;

    /// Returns true if the principal is an authorized insurer
    async fn contains(&self, principal: Principal) -> Result<bool, PortError>;

    /// Adds the principal to the insurer set
    ///
    /// # Returns
    ///
    /// `true` if the principal was not already present
    async fn insert(&self, principal: Principal) -> Result<bool, PortError>;

    /// Lists all authorized insurers
    async fn list(&self) -> Result<Vec<Principal>, PortError>;
}

/// In-memory implementation of [`InsurerStore`]
pub mod memory {
    use super::*;
    use std::collections::BTreeSet;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    #[derive(Debug, Default)]
    struct InsurerState {
        owner: Option<Principal>,
        insurers: BTreeSet<Principal>,
    }

    /// Insurer set kept in process memory
    #[derive(Debug, Default)]
    pub struct InMemoryInsurerStore {
        state: RwLock<InsurerState>,
    }

    impl InMemoryInsurerStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DomainPort for InMemoryInsurerStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryInsurerStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("memory-insurer-store")
        }
    }

    #[async_trait]
    impl InsurerStore for InMemoryInsurerStore {
        async fn owner(&self) -> Result<Option<Principal>, PortError> {
            Ok(self.state.read().await.owner)
        }

        async fn initialize_owner(&self, owner: Principal) -> Result<Principal, PortError> {
            let mut state = self.state.write().await;
            let effective = *state.owner.get_or_insert(owner);
            state.insurers.insert(effective);
            Ok(effective)
        }

        async fn contains(&self, principal: Principal) -> Result<bool, PortError> {
            Ok(self.state.read().await.insurers.contains(&principal))
        }

        async fn insert(&self, principal: Principal) -> Result<bool, PortError> {
            Ok(self.state.write().await.insurers.insert(principal))
        }

        async fn list(&self) -> Result<Vec<Principal>, PortError> {
            Ok(self.state.read().await.insurers.iter().copied().collect())
        }
    }

}
