//! Core Kernel - Foundational types shared by the policy and claims domains
//!
//! This crate provides the building blocks used across all domain crates:
//! - Money types with precise decimal arithmetic
//! - Sequential identifiers and caller principals
//! - Clocks and coverage windows for time-based rules
//! - Port traits for stores, health checks, and notifications

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod principal;
pub mod ports;
pub mod events;
pub mod error;

pub use money::{Money, Currency, MoneyError, MONEY_SCALE};
pub use temporal::{
    Clock, SystemClock, ManualClock, CoverageWindow, TemporalError, DEFAULT_GRACE_PERIOD_SECS,
};
pub use identifiers::{PolicyId, ClaimId, IdParseError};
pub use principal::Principal;
pub use ports::{
    PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable,
};
pub use events::{DomainEvent, EventPublisher, TracingPublisher, RecordingPublisher};
pub use error::ErrorKind;
