//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the policy and claims registries.
//! These fixtures are consistent and predictable for unit and HTTP tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{Currency, Money};
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Standard premium due per payment
    pub fn usd_premium() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }

    /// Standard coverage limit
    pub fn usd_coverage() -> Money {
        Money::new(dec!(5000.00), Currency::USD)
    }

    /// A claim comfortably inside the standard coverage
    pub fn usd_claim() -> Money {
        Money::new(dec!(3000.00), Currency::USD)
    }

    /// A claim one cent above the standard coverage
    pub fn usd_claim_over_coverage() -> Money {
        Money::new(dec!(5000.01), Currency::USD)
    }

    /// Creates a zero amount
    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// Creates a EUR amount for currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Instant the manual clock starts at
    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Standard coverage duration
    pub fn standard_duration() -> Duration {
        Duration::days(30)
    }

    /// A short window for expiry tests
    pub fn short_duration() -> Duration {
        Duration::hours(1)
    }
}

/// Fixture for free-text test data
pub struct StringFixtures;

impl StringFixtures {
    /// Reason attached to the standard claim
    pub fn claim_reason() -> &'static str {
        "Water damage after storm"
    }
}
