//! Claims repository
//!
//! PostgreSQL implementation of [`ClaimStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{
    ClaimId, Currency, DomainPort, HealthCheckResult, HealthCheckable, Money, PolicyId, PortError,
    Principal,
};
use domain_claims::{Claim, ClaimStatus, ClaimStore};

use super::{id_from_db, id_to_db, ping};
use crate::error::DatabaseError;

const SELECT_CLAIM: &str = r#"
    SELECT
        claim_id,
        policy_id,
        policyholder,
        currency,
        claim_amount,
        reason,
        status,
        submission_time,
        decided_by,
        decided_at,
        paid_at
    FROM claims
"#;

/// Database row for a claim
#[derive(Debug, Clone, FromRow)]
pub struct ClaimRow {
    pub claim_id: i64,
    pub policy_id: i64,
    pub policyholder: Uuid,
    pub currency: String,
    pub claim_amount: Decimal,
    pub reason: String,
    pub status: String,
    pub submission_time: DateTime<Utc>,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl ClaimRow {
    /// Flattens a domain claim into a row
    pub fn from_claim(claim: &Claim) -> Result<Self, PortError> {
        Ok(Self {
            claim_id: id_to_db(claim.id.value(), "claim")?,
            policy_id: id_to_db(claim.policy_id.value(), "policy")?,
            policyholder: *claim.policyholder.as_uuid(),
            currency: claim.claim_amount.currency().code().to_string(),
            claim_amount: claim.claim_amount.amount(),
            reason: claim.reason.clone(),
            status: claim.status.as_str().to_string(),
            submission_time: claim.submission_time,
            decided_by: claim.decided_by.map(|p| *p.as_uuid()),
            decided_at: claim.decided_at,
            paid_at: claim.paid_at,
        })
    }

    /// Rebuilds the domain claim
    pub fn into_claim(self) -> Result<Claim, PortError> {
        let currency: Currency = self
            .currency
            .parse()
            .map_err(|e: core_kernel::MoneyError| PortError::transformation(e.to_string()))?;
        let status: ClaimStatus = self
            .status
            .parse()
            .map_err(|e: domain_claims::ClaimError| PortError::transformation(e.to_string()))?;

        Ok(Claim {
            id: ClaimId::new(id_from_db(self.claim_id, "claim")?),
            policy_id: PolicyId::new(id_from_db(self.policy_id, "policy")?),
            policyholder: Principal::from_uuid(self.policyholder),
            claim_amount: Money::new(self.claim_amount, currency),
            reason: self.reason,
            status,
            submission_time: self.submission_time,
            decided_by: self.decided_by.map(Principal::from_uuid),
            decided_at: self.decided_at,
            paid_at: self.paid_at,
        })
    }
}

/// PostgreSQL-backed claim store
#[derive(Debug, Clone)]
pub struct ClaimRepository {
    pool: PgPool,
}

impl ClaimRepository {
    /// Creates a new ClaimRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for ClaimRepository {}

#[async_trait]
impl HealthCheckable for ClaimRepository {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "postgres-claim-store").await
    }
}

#[async_trait]
impl ClaimStore for ClaimRepository {
    async fn next_id(&self) -> Result<ClaimId, PortError> {
        let value: i64 = sqlx::query_scalar("SELECT nextval('claim_id_seq')")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(ClaimId::new(id_from_db(value, "claim")?))
    }

    #[instrument(skip(self), fields(claim_id = %id))]
    async fn get(&self, id: ClaimId) -> Result<Option<Claim>, PortError> {
        let row = sqlx::query_as::<_, ClaimRow>(&format!("{} WHERE claim_id = $1", SELECT_CLAIM))
            .bind(id_to_db(id.value(), "claim")?)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        row.map(ClaimRow::into_claim).transpose()
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.id))]
    async fn insert(&self, claim: &Claim) -> Result<(), PortError> {
        let row = ClaimRow::from_claim(claim)?;

        sqlx::query(
            r#"
            INSERT INTO claims (
                claim_id, policy_id, policyholder, currency, claim_amount, reason,
                status, submission_time, decided_by, decided_at, paid_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(row.claim_id)
        .bind(row.policy_id)
        .bind(row.policyholder)
        .bind(&row.currency)
        .bind(row.claim_amount)
        .bind(&row.reason)
        .bind(&row.status)
        .bind(row.submission_time)
        .bind(row.decided_by)
        .bind(row.decided_at)
        .bind(row.paid_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.id, status = %claim.status))]
    async fn update(&self, claim: &Claim) -> Result<(), PortError> {
        let row = ClaimRow::from_claim(claim)?;

        // submission data is immutable; only the decision columns move
        let result = sqlx::query(
            r#"
            UPDATE claims SET
                status = $2,
                decided_by = $3,
                decided_at = $4,
                paid_at = $5
            WHERE claim_id = $1
            "#,
        )
        .bind(row.claim_id)
        .bind(&row.status)
        .bind(row.decided_by)
        .bind(row.decided_at)
        .bind(row.paid_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Claim", claim.id));
        }
        Ok(())
    }

    async fn find_by_policy(&self, policy_id: PolicyId) -> Result<Vec<Claim>, PortError> {
        let rows = sqlx::query_as::<_, ClaimRow>(&format!(
            "{} WHERE policy_id = $1 ORDER BY claim_id",
            SELECT_CLAIM
        ))
        .bind(id_to_db(policy_id.value(), "policy")?)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter().map(ClaimRow::into_claim).collect()
    }
}
