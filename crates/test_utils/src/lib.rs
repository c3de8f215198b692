//! Test Utilities Crate
//!
//! Shared test infrastructure for the insurance registry test suites.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built money, time, and text values
//! - `builders`: Request builders and the wired in-memory registry harness
//! - `database`: PostgreSQL testcontainer management
//! - `assertions`: Assertion helpers for error kinds, money, and claims
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
