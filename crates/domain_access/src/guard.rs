//! Authorization Guard
//!
//! Consulted by both registries before any mutation. The guard never
//! forgets an insurer: the set only grows.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use core_kernel::Principal;

use crate::error::AccessError;
use crate::ports::InsurerStore;

/// Gatekeeper for insurer-only and holder-only operations
pub struct AuthorizationGuard {
    store: Arc<dyn InsurerStore>,
    owner: Principal,
    /// Serializes writes to the insurer set
    write_lock: Mutex<()>,
}

impl AuthorizationGuard {
    /// Initializes the guard with `owner` as system owner
    ///
    /// If the store already records an owner (for example a persistent store
    /// reopened after restart) that owner stays in effect.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `owner` is the null principal
    pub async fn initialize(
        store: Arc<dyn InsurerStore>,
        owner: Principal,
    ) -> Result<Self, AccessError> {
        if owner.is_null() {
            return Err(AccessError::InvalidArgument(
                "System owner cannot be the null principal".to_string(),
            ));
        }

        let effective = store.initialize_owner(owner).await?;
        if effective != owner {
            warn!(
                requested = %owner,
                recorded = %effective,
                "Store already has an owner; keeping the recorded one"
            );
        }
        info!(owner = %effective, "Authorization guard initialized");

        Ok(Self {
            store,
            owner: effective,
            write_lock: Mutex::new(()),
        })
    }

    /// Returns the system owner
    pub fn owner(&self) -> Principal {
        self.owner
    }

    /// Returns true if the principal may act as an insurer
    pub async fn is_insurer(&self, principal: Principal) -> Result<bool, AccessError> {
        if principal.is_null() {
            return Ok(false);
        }
        Ok(self.store.contains(principal).await?)
    }

    /// Fails with `Unauthorized` unless the principal is an authorized insurer
    ///
    /// # Arguments
    ///
    /// * `principal` - The caller
    /// * `action` - Name of the attempted operation, used in the error
    pub async fn ensure_insurer(
        &self,
        principal: Principal,
        action: &str,
    ) -> Result<(), AccessError> {
        if self.is_insurer(principal).await? {
            Ok(())
        } else {
            debug!(%principal, action, "Rejected non-insurer caller");
            Err(AccessError::unauthorized(principal, action))
        }
    }

    /// Fails with `Unauthorized` unless `caller` is the recorded holder
    pub fn ensure_policyholder(
        &self,
        caller: Principal,
        holder: Principal,
        action: &str,
    ) -> Result<(), AccessError> {
        if !caller.is_null() && caller == holder {
            Ok(())
        } else {
            debug!(%caller, action, "Rejected caller who is not the policyholder");
            Err(AccessError::unauthorized(caller, action))
        }
    }

    /// Authorizes a new insurer
    ///
    /// Only the system owner may call this. Adding an already authorized
    /// principal succeeds without change.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if `caller` is not the owner
    /// - `InvalidArgument` if `new_insurer` is the null principal
    pub async fn add_insurer(
        &self,
        caller: Principal,
        new_insurer: Principal,
    ) -> Result<(), AccessError> {
        if caller != self.owner {
            return Err(AccessError::unauthorized(caller, "add_insurer"));
        }
        if new_insurer.is_null() {
            return Err(AccessError::InvalidArgument(
                "Insurer cannot be the null principal".to_string(),
            ));
        }

        let _guard = self.write_lock.lock().await;
        let added = self.store.insert(new_insurer).await?;
        if added {
            info!(insurer = %new_insurer, "Insurer authorized");
        } else {
            debug!(insurer = %new_insurer, "Insurer was already authorized");
        }
        Ok(())
    }

    /// Lists all authorized insurers, owner included
    pub async fn insurers(&self) -> Result<Vec<Principal>, AccessError> {
        Ok(self.store.list().await?)
    }
}

impl std::fmt::Debug for AuthorizationGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGuard")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}
