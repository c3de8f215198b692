//! PostgreSQL implementations of the domain store ports
//!
//! Each repository maps between a flat row type (`sqlx::FromRow`) and the
//! domain aggregate, and reports failures as [`PortError`] so the registries
//! treat database and in-memory backends alike.
//!
//! [`PortError`]: core_kernel::PortError

pub mod policy;
pub mod claims;
pub mod insurers;

pub use policy::PolicyRepository;
pub use claims::ClaimRepository;
pub use insurers::InsurerRepository;

use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, HealthCheckResult, PortError};

/// Converts a stored BIGINT id back to the unsigned domain id
pub(crate) fn id_from_db(value: i64, entity: &str) -> Result<u64, PortError> {
    u64::try_from(value)
        .map_err(|_| PortError::transformation(format!("negative {} id {}", entity, value)))
}

/// Converts an unsigned domain id to a BIGINT
pub(crate) fn id_to_db(value: u64, entity: &str) -> Result<i64, PortError> {
    i64::try_from(value)
        .map_err(|_| PortError::transformation(format!("{} id {} out of range", entity, value)))
}

/// Runs `SELECT 1` and reports the outcome for `adapter_id`
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: Utc::now(),
        },
        Err(e) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Unhealthy,
            latency_ms,
            message: Some(format!("Database error: {}", e)),
            checked_at: Utc::now(),
        },
    }
}
