//! Insurer repository
//!
//! PostgreSQL implementation of [`InsurerStore`]. The owner lives in the
//! single-row `system_owner` table; `insurers` is append-only.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError, Principal};
use domain_access::InsurerStore;

use super::ping;
use crate::error::DatabaseError;

/// PostgreSQL-backed insurer store
#[derive(Debug, Clone)]
pub struct InsurerRepository {
    pool: PgPool,
}

impl InsurerRepository {
    /// Creates a new InsurerRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for InsurerRepository {}

#[async_trait]
impl HealthCheckable for InsurerRepository {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "postgres-insurer-store").await
    }
}

#[async_trait]
impl InsurerStore for InsurerRepository {
    async fn owner(&self) -> Result<Option<Principal>, PortError> {
        let owner: Option<Uuid> = sqlx::query_scalar("SELECT principal FROM system_owner")
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(owner.map(Principal::from_uuid))
    }

    #[instrument(skip(self), fields(%owner))]
    async fn initialize_owner(&self, owner: Principal) -> Result<Principal, PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        sqlx::query(
            "INSERT INTO system_owner (singleton, principal) VALUES (TRUE, $1) \
             ON CONFLICT (singleton) DO NOTHING",
        )
        .bind(*owner.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        let effective: Uuid = sqlx::query_scalar("SELECT principal FROM system_owner")
            .fetch_one(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;

        sqlx::query("INSERT INTO insurers (principal) VALUES ($1) ON CONFLICT (principal) DO NOTHING")
            .bind(effective)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;

        tx.commit().await.map_err(DatabaseError::from)?;

        info!(owner = %effective, "System owner recorded");
        Ok(Principal::from_uuid(effective))
    }

    async fn contains(&self, principal: Principal) -> Result<bool, PortError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM insurers WHERE principal = $1)")
                .bind(*principal.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(DatabaseError::from)?;
        Ok(exists)
    }

    async fn insert(&self, principal: Principal) -> Result<bool, PortError> {
        let result =
            sqlx::query("INSERT INTO insurers (principal) VALUES ($1) ON CONFLICT (principal) DO NOTHING")
                .bind(*principal.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(DatabaseError::from)?;
        Ok(result.rows_affected() == 1)
    }

    async fn list(&self) -> Result<Vec<Principal>, PortError> {
        let rows: Vec<Uuid> = sqlx::query_scalar("SELECT principal FROM insurers ORDER BY principal")
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(rows.into_iter().map(Principal::from_uuid).collect())
    }
}
