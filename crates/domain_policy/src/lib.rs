//! Policy Registry Domain
//!
//! Owns the canonical state of every policy and its premium ledger.
//!
//! # Architecture
//!
//! - **Aggregate**: [`Policy`] validates issuance and premium payments
//! - **Port**: [`PolicyStore`] hides the storage backend
//! - **Service**: [`PolicyRegistry`] checks authorization and time, then
//!   mutates the store inside a single critical section
//! - **Events**: [`PolicyEvent`] notifications for every successful mutation
//!
//! # Policy Status
//!
//! ```text
//! Active ──(clock passes start + duration)──> reported as Expired
//! ```
//!
//! The stored status is never flipped by the clock. Expiry is derived when
//! reading and re-checked by every mutating operation.
//!
//! # Example
//!
//! ```rust,ignore
//! let policy_id = registry
//!     .issue_policy(insurer, IssuePolicyRequest {
//!         policyholder,
//!         premium_amount: Money::new(dec!(100), Currency::USD),
//!         coverage_amount: Money::new(dec!(5000), Currency::USD),
//!         duration: Duration::days(30),
//!     })
//!     .await?;
//! registry.pay_premium(policy_id, policyholder, premium).await?;
//! ```

pub mod policy;
pub mod events;
pub mod error;
pub mod ports;
pub mod registry;

pub use policy::{Policy, PolicyStatus, IssuePolicyRequest};
pub use events::PolicyEvent;
pub use error::PolicyError;
pub use ports::{PolicyStore, memory::InMemoryPolicyStore};
pub use registry::{PolicyRegistry, PolicyRegistryConfig};
