//! Policy repository
//!
//! PostgreSQL implementation of [`PolicyStore`]. The coverage window is
//! stored as `start_time` / `end_time`; money columns share the policy's
//! single `currency`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    CoverageWindow, Currency, DomainPort, HealthCheckResult, HealthCheckable, Money, PolicyId,
    PortError, Principal,
};
use domain_policy::{Policy, PolicyStatus, PolicyStore};

use super::{id_from_db, id_to_db, ping};
use crate::error::DatabaseError;

const SELECT_POLICY: &str = r#"
    SELECT
        policy_id,
        policyholder,
        insurer,
        currency,
        premium_amount,
        coverage_amount,
        start_time,
        end_time,
        status,
        last_premium_paid_at,
        total_premiums_paid
    FROM policies
"#;

/// Database row for a policy
#[derive(Debug, Clone, FromRow)]
pub struct PolicyRow {
    pub policy_id: i64,
    pub policyholder: Uuid,
    pub insurer: Uuid,
    pub currency: String,
    pub premium_amount: Decimal,
    pub coverage_amount: Decimal,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub last_premium_paid_at: DateTime<Utc>,
    pub total_premiums_paid: Decimal,
}

impl PolicyRow {
    /// Flattens a domain policy into a row
    pub fn from_policy(policy: &Policy) -> Result<Self, PortError> {
        Ok(Self {
            policy_id: id_to_db(policy.id.value(), "policy")?,
            policyholder: *policy.policyholder.as_uuid(),
            insurer: *policy.insurer.as_uuid(),
            currency: policy.premium_amount.currency().code().to_string(),
            premium_amount: policy.premium_amount.amount(),
            coverage_amount: policy.coverage_amount.amount(),
            start_time: policy.window.start(),
            end_time: policy.window.end(),
            status: policy.status.as_str().to_string(),
            last_premium_paid_at: policy.last_premium_paid_at,
            total_premiums_paid: policy.total_premiums_paid.amount(),
        })
    }

    /// Rebuilds the domain policy
    pub fn into_policy(self) -> Result<Policy, PortError> {
        let currency: Currency = self
            .currency
            .parse()
            .map_err(|e: core_kernel::MoneyError| PortError::transformation(e.to_string()))?;
        let status: PolicyStatus = self
            .status
            .parse()
            .map_err(|e: domain_policy::PolicyError| PortError::transformation(e.to_string()))?;
        let window = CoverageWindow::new(self.start_time, self.end_time - self.start_time)
            .map_err(|e| PortError::transformation(e.to_string()))?;

        Ok(Policy {
            id: PolicyId::new(id_from_db(self.policy_id, "policy")?),
            policyholder: Principal::from_uuid(self.policyholder),
            insurer: Principal::from_uuid(self.insurer),
            premium_amount: Money::new(self.premium_amount, currency),
            coverage_amount: Money::new(self.coverage_amount, currency),
            window,
            status,
            last_premium_paid_at: self.last_premium_paid_at,
            total_premiums_paid: Money::new(self.total_premiums_paid, currency),
        })
    }
}

/// PostgreSQL-backed policy store
#[derive(Debug, Clone)]
pub struct PolicyRepository {
    pool: PgPool,
}

impl PolicyRepository {
    /// Creates a new PolicyRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PolicyRepository {}

#[async_trait]
impl HealthCheckable for PolicyRepository {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "postgres-policy-store").await
    }
}

#[async_trait]
impl PolicyStore for PolicyRepository {
    async fn next_id(&self) -> Result<PolicyId, PortError> {
        let value: i64 = sqlx::query_scalar("SELECT nextval('policy_id_seq')")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(PolicyId::new(id_from_db(value, "policy")?))
    }

    #[instrument(skip(self), fields(policy_id = %id))]
    async fn get(&self, id: PolicyId) -> Result<Option<Policy>, PortError> {
        let row = sqlx::query_as::<_, PolicyRow>(&format!("{} WHERE policy_id = $1", SELECT_POLICY))
            .bind(id_to_db(id.value(), "policy")?)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        row.map(PolicyRow::into_policy).transpose()
    }

    #[instrument(skip(self, policy), fields(policy_id = %policy.id))]
    async fn insert(&self, policy: &Policy) -> Result<(), PortError> {
        let row = PolicyRow::from_policy(policy)?;

        sqlx::query(
            r#"
            INSERT INTO policies (
                policy_id, policyholder, insurer, currency,
                premium_amount, coverage_amount, start_time, end_time,
                status, last_premium_paid_at, total_premiums_paid
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(row.policy_id)
        .bind(row.policyholder)
        .bind(row.insurer)
        .bind(&row.currency)
        .bind(row.premium_amount)
        .bind(row.coverage_amount)
        .bind(row.start_time)
        .bind(row.end_time)
        .bind(&row.status)
        .bind(row.last_premium_paid_at)
        .bind(row.total_premiums_paid)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        debug!("Policy row inserted");
        Ok(())
    }

    #[instrument(skip(self, policy), fields(policy_id = %policy.id))]
    async fn update(&self, policy: &Policy) -> Result<(), PortError> {
        let row = PolicyRow::from_policy(policy)?;

        let result = sqlx::query(
            r#"
            UPDATE policies SET
                policyholder = $2,
                insurer = $3,
                currency = $4,
                premium_amount = $5,
                coverage_amount = $6,
                start_time = $7,
                end_time = $8,
                status = $9,
                last_premium_paid_at = $10,
                total_premiums_paid = $11
            WHERE policy_id = $1
            "#,
        )
        .bind(row.policy_id)
        .bind(row.policyholder)
        .bind(row.insurer)
        .bind(&row.currency)
        .bind(row.premium_amount)
        .bind(row.coverage_amount)
        .bind(row.start_time)
        .bind(row.end_time)
        .bind(&row.status)
        .bind(row.last_premium_paid_at)
        .bind(row.total_premiums_paid)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Policy", policy.id));
        }
        Ok(())
    }

    async fn find_by_policyholder(&self, holder: Principal) -> Result<Vec<Policy>, PortError> {
        let rows = sqlx::query_as::<_, PolicyRow>(&format!(
            "{} WHERE policyholder = $1 ORDER BY policy_id",
            SELECT_POLICY
        ))
        .bind(*holder.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter().map(PolicyRow::into_policy).collect()
    }
}
