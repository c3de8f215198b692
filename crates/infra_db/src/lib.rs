//! Infrastructure Database Layer
//!
//! PostgreSQL adapters for the store ports declared by the domain crates,
//! built on SQLx with runtime-checked queries.
//!
//! | Port | Adapter |
//! |---|---|
//! | `domain_access::InsurerStore` | [`InsurerRepository`] |
//! | `domain_policy::PolicyStore` | [`PolicyRepository`] |
//! | `domain_claims::ClaimStore` | [`ClaimRepository`] |
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PolicyRepository};
//!
//! let pool = create_pool(DatabaseConfig::new(url)).await?;
//! run_migrations(&pool).await?;
//! let policies: Arc<dyn PolicyStore> = Arc::new(PolicyRepository::new(pool.clone()));
//! ```

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{DatabasePool, DatabaseConfig, create_pool, run_migrations};
pub use error::DatabaseError;
pub use repositories::{ClaimRepository, InsurerRepository, PolicyRepository};
