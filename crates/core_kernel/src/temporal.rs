//! Time handling for coverage rules
//!
//! - [`Clock`]: injectable source of the current time
//! - [`CoverageWindow`]: the inclusive `[start, start + duration]` window in
//!   which a policy accepts premiums and claims

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use thiserror::Error;

/// Grace period carried in configuration, in seconds (7 days). No operation
/// enforces it.
pub const DEFAULT_GRACE_PERIOD_SECS: i64 = 7 * 24 * 60 * 60;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid duration: {0} seconds (must be positive)")]
    NonPositiveDuration(i64),

    #[error("Window end overflows the supported time range")]
    Overflow,
}

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Returns the current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    current: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at the given instant
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: RwLock::new(start),
        }
    }

    /// Moves the clock to the given instant
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = instant;
    }

    /// Moves the clock forward by the given duration
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }
}

/// The period during which a policy is usable
///
/// Both ends are inclusive: a policy is still usable at exactly
/// `start + duration` and expired one instant later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl CoverageWindow {
    /// Creates a window starting at `start` and lasting `duration`
    pub fn new(start: DateTime<Utc>, duration: Duration) -> Result<Self, TemporalError> {
        if duration <= Duration::zero() {
            return Err(TemporalError::NonPositiveDuration(duration.num_seconds()));
        }
        let end = start
            .checked_add_signed(duration)
            .ok_or(TemporalError::Overflow)?;
        Ok(Self { start, end })
    }

    /// Start of the window
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Last instant of the window
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Length of the window
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns true once the window has closed
    pub fn has_elapsed(&self, instant: DateTime<Utc>) -> bool {
        instant > self.end
    }
}
