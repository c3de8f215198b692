//! PostgreSQL testcontainer
//!
//! Each [`TestDatabase`] owns its own container with the registry schema
//! applied, so id sequences start at 1 and no rows leak between tests. The
//! container is removed when the value is dropped.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

const IMAGE: (&str, &str) = ("postgres", "16-alpine");
const PORT: u16 = 5432;
const READY_LINE: &str = "database system is ready to accept connections";
const CREDENTIALS: (&str, &str) = ("registry", "registry");
const DATABASE: &str = "insurance_registry_test";

const SCHEMA: &str = include_str!("../../../migrations/20240101_000001_initial_schema.sql");

/// Boxed error returned by container setup
pub type SetupError = Box<dyn std::error::Error + Send + Sync>;

/// A running PostgreSQL container with the registry schema applied
pub struct TestDatabase {
    _container: ContainerAsync<GenericImage>,
    url: String,
    pool: PgPool,
}

impl TestDatabase {
    /// Starts a container, connects, and applies the schema
    ///
    /// # Errors
    ///
    /// Fails when no Docker daemon is reachable or the schema does not apply
    pub async fn start() -> Result<Self, SetupError> {
        let (user, password) = CREDENTIALS;

        // port and wait strategy belong to the image; env vars turn it into a request
        let container = GenericImage::new(IMAGE.0, IMAGE.1)
            .with_exposed_port(PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr(READY_LINE))
            .with_env_var("POSTGRES_USER", user)
            .with_env_var("POSTGRES_PASSWORD", password)
            .with_env_var("POSTGRES_DB", DATABASE)
            .start()
            .await?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(PORT).await?;
        let url = format!("postgres://{user}:{password}@{host}:{port}/{DATABASE}");

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&url)
            .await?;
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;

        Ok(Self {
            _container: container,
            url,
            pool,
        })
    }

    /// Connection pool bound to this container
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Connection string for tests that build their own pool
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Starts a fresh database for a single test
pub async fn create_isolated_test_database() -> Result<TestDatabase, SetupError> {
    TestDatabase::start().await
}
