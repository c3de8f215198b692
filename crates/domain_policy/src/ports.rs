//! Policy Domain Ports
//!
//! [`PolicyStore`] is the repository behind the policy registry. Adapters:
//!
//! - **In-memory** ([`memory::InMemoryPolicyStore`]): for tests and
//!   single-process deployments
//! - **PostgreSQL**: provided by `infra_db`

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PolicyId, PortError, Principal};

use crate::policy::Policy;

/// Storage for policy records
///
/// The store does not enforce business rules; the registry calls it from
/// inside its critical section.
#[async_trait]
pub trait PolicyStore: DomainPort + HealthCheckable {
    /// Allocates the next policy id
    ///
    /// Ids are strictly increasing and never handed out twice.
    async fn next_id(&self) -> Result<PolicyId, PortError>;

    /// Loads a policy by id
    async fn get(&self, id: PolicyId) -> Result<Option<Policy>, PortError>;

    /// Stores a new policy
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if a policy with the same id already exists
    async fn insert(&self, policy: &Policy) -> Result<(), PortError>;

    /// Replaces an existing policy
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the policy does not exist
    async fn update(&self, policy: &Policy) -> Result<(), PortError>;

    /// Lists policies owned by a holder, ordered by id
    async fn find_by_policyholder(&self, holder: Principal) -> Result<Vec<Policy>, PortError>;
}

/// In-memory implementation of [`PolicyStore`]
pub mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    #[derive(Debug)]
    struct PolicyState {
        next: PolicyId,
        policies: BTreeMap<PolicyId, Policy>,
    }

    /// Policy records kept in process memory
    #[derive(Debug)]
    pub struct InMemoryPolicyStore {
        state: RwLock<PolicyState>,
    }

    impl InMemoryPolicyStore {
        /// Creates an empty store whose first id is `POL-1`
        pub fn new() -> Self {
            Self {
                state: RwLock::new(PolicyState {
                    next: PolicyId::FIRST,
                    policies: BTreeMap::new(),
                }),
            }
        }

        /// Number of stored policies
        pub async fn len(&self) -> usize {
            self.state.read().await.policies.len()
        }

        /// Returns true if no policy is stored
        pub async fn is_empty(&self) -> bool {
            self.len().await == 0
        }
    }

    impl Default for InMemoryPolicyStore {
        fn default() -> Self {
            Self::new()
        }
    }

    impl DomainPort for InMemoryPolicyStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryPolicyStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("memory-policy-store")
        }
    }

    #[async_trait]
    impl PolicyStore for InMemoryPolicyStore {
        async fn next_id(&self) -> Result<PolicyId, PortError> {
            let mut state = self.state.write().await;
            let id = state.next;
            state.next = id.next();
            Ok(id)
        }

        async fn get(&self, id: PolicyId) -> Result<Option<Policy>, PortError> {
            Ok(self.state.read().await.policies.get(&id).cloned())
        }

        async fn insert(&self, policy: &Policy) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if state.policies.contains_key(&policy.id) {
                return Err(PortError::conflict(format!(
                    "Policy {} already exists",
                    policy.id
                )));
            }
            state.policies.insert(policy.id, policy.clone());
            Ok(())
        }

        async fn update(&self, policy: &Policy) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            match state.policies.get_mut(&policy.id) {
                Some(slot) => {
                    *slot = policy.clone();
                    Ok(())
                }
                None => Err(PortError::not_found("Policy", policy.id)),
            }
        }

        async fn find_by_policyholder(&self, holder: Principal) -> Result<Vec<Policy>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .policies
                .values()
                .filter(|p| p.policyholder == holder)
                .cloned()
                .collect())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::policy::IssuePolicyRequest;
        use chrono::{Duration, Utc};
        use core_kernel::{Currency, Money};

        fn policy(id: PolicyId, holder: Principal) -> Policy {
            let request = IssuePolicyRequest {
                policyholder: holder,
                premium_amount: Money::from_minor(10_000, Currency::USD),
                coverage_amount: Money::from_minor(500_000, Currency::USD),
                duration: Duration::days(30),
            };
            Policy::issue(id, Principal::new(), request, Utc::now()).unwrap()
        }

        #[tokio::test]
        async fn test_next_id_is_sequential() {
            let store = InMemoryPolicyStore::new();
            assert_eq!(store.next_id().await.unwrap(), PolicyId::new(1));
            assert_eq!(store.next_id().await.unwrap(), PolicyId::new(2));
            assert_eq!(store.next_id().await.unwrap(), PolicyId::new(3));
        }

        #[tokio::test]
        async fn test_insert_conflict() {
            let store = InMemoryPolicyStore::new();
            let p = policy(PolicyId::FIRST, Principal::new());

            store.insert(&p).await.unwrap();
            let err = store.insert(&p).await.unwrap_err();

            assert!(matches!(err, PortError::Conflict { .. }));
            assert_eq!(store.len().await, 1);
        }

        #[tokio::test]
        async fn test_update_missing_policy() {
            let store = InMemoryPolicyStore::new();
            let err = store
                .update(&policy(PolicyId::new(9), Principal::new()))
                .await
                .unwrap_err();
            assert!(err.is_not_found());
            assert!(store.is_empty().await);
        }

        #[tokio::test]
        async fn test_find_by_policyholder() {
            let store = InMemoryPolicyStore::new();
            let holder = Principal::new();
            store.insert(&policy(PolicyId::new(1), holder)).await.unwrap();
            store.insert(&policy(PolicyId::new(2), Principal::new())).await.unwrap();
            store.insert(&policy(PolicyId::new(3), holder)).await.unwrap();

            let ids: Vec<_> = store
                .find_by_policyholder(holder)
                .await
                .unwrap()
                .into_iter()
                .map(|p| p.id)
                .collect();

            assert_eq!(ids, vec![PolicyId::new(1), PolicyId::new(3)]);
        }
    }
}
