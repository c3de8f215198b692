//! API configuration

use chrono::Duration;
use serde::Deserialize;
use std::time::Duration as StdDuration;
use uuid::Uuid;

use core_kernel::{Principal, DEFAULT_GRACE_PERIOD_SECS};
use domain_claims::PayoutOrdering;
use infra_db::DatabaseConfig;

/// API configuration
///
/// Every field can be set through an `API_`-prefixed environment variable,
/// e.g. `API_PORT=9000` or `API_PAYOUT_ORDERING=rollback_on_failure`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// PostgreSQL URL; in-memory stores are used when absent
    pub database_url: Option<String>,
    /// Pool size ceiling
    pub db_max_connections: u32,
    /// Connections kept open while idle
    pub db_min_connections: u32,
    /// Seconds a request waits for a pooled connection
    pub db_acquire_timeout_secs: u64,
    /// Log level
    pub log_level: String,
    /// Emit logs as JSON lines instead of text
    pub log_json: bool,
    /// System owner principal; a fresh one is generated when absent
    pub owner_principal: Option<Uuid>,
    /// Premium grace period reported with policy details
    pub grace_period_secs: i64,
    /// How `pay_claim` orders the status change and the transfer
    pub payout_ordering: PayoutOrdering,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: None,
            db_max_connections: 10,
            db_min_connections: 2,
            db_acquire_timeout_secs: 30,
            log_level: "info".to_string(),
            log_json: false,
            owner_principal: None,
            grace_period_secs: DEFAULT_GRACE_PERIOD_SECS,
            payout_ordering: PayoutOrdering::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Pool settings, or `None` when running on in-memory stores
    pub fn database(&self) -> Option<DatabaseConfig> {
        self.database_url.as_ref().map(|url| {
            DatabaseConfig::new(url.clone())
                .max_connections(self.db_max_connections)
                .min_connections(self.db_min_connections)
                .acquire_timeout(StdDuration::from_secs(self.db_acquire_timeout_secs))
        })
    }

    /// Grace period as a duration
    pub fn grace_period(&self) -> Duration {
        Duration::seconds(self.grace_period_secs)
    }

    /// Configured owner, if any
    pub fn owner(&self) -> Option<Principal> {
        self.owner_principal.map(Principal::from_uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();

        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert!(config.database().is_none());
        assert_eq!(config.grace_period(), Duration::days(7));
        assert_eq!(config.payout_ordering, PayoutOrdering::MarkPaidFirst);
        assert!(config.owner().is_none());
    }

    #[test]
    fn test_partial_source_keeps_defaults() {
        let config: ApiConfig = config::Config::builder()
            .set_override("port", 9000)
            .unwrap()
            .set_override("payout_ordering", "rollback_on_failure")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.payout_ordering, PayoutOrdering::RollbackOnFailure);
        assert_eq!(config.jwt_expiration_secs, 3600);
    }

    #[test]
    fn test_database_settings_follow_config() {
        let config = ApiConfig {
            database_url: Some("postgres://registry@db/registry".to_string()),
            db_max_connections: 32,
            db_acquire_timeout_secs: 5,
            ..ApiConfig::default()
        };

        let db = config.database().unwrap();
        assert_eq!(db.url, "postgres://registry@db/registry");
        assert_eq!(db.max_connections, 32);
        assert_eq!(db.min_connections, 2);
        assert_eq!(db.acquire_timeout, StdDuration::from_secs(5));
    }
}
