//! Property-Based Test Generators
//!
//! Proptest strategies that produce data satisfying the registries'
//! input rules, plus a few deliberately invalid shapes.

use chrono::Duration;
use core_kernel::{Currency, Money, Principal};
use domain_policy::IssuePolicyRequest;
use proptest::prelude::*;

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::JPY),
        Just(Currency::CHF),
        Just(Currency::INR),
        Just(Currency::AUD),
        Just(Currency::CAD),
        Just(Currency::SGD),
        Just(Currency::HKD),
    ]
}

/// Strategy for generating valid positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating positive Money in any currency
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for generating positive USD Money
pub fn usd_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|amount| Money::from_minor(amount, Currency::USD))
}

/// Strategy for zero or negative amounts that every operation rejects
pub fn non_positive_money_strategy() -> impl Strategy<Value = Money> {
    (-1_000_000_000i64..=0i64, currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for coverage durations between one minute and five years
pub fn coverage_duration_strategy() -> impl Strategy<Value = Duration> {
    (60i64..5 * 365 * 24 * 3600).prop_map(Duration::seconds)
}

/// Strategy for valid issuance requests with a fresh holder
pub fn issue_request_strategy() -> impl Strategy<Value = IssuePolicyRequest> {
    (
        currency_strategy(),
        positive_amount_minor_strategy(),
        positive_amount_minor_strategy(),
        coverage_duration_strategy(),
    )
        .prop_map(|(currency, premium, coverage, duration)| IssuePolicyRequest {
            policyholder: Principal::new(),
            premium_amount: Money::from_minor(premium, currency),
            coverage_amount: Money::from_minor(coverage, currency),
            duration,
        })
}

/// Strategy for a coverage amount and a claim amount within it
pub fn claim_within_coverage_strategy() -> impl Strategy<Value = (Money, Money)> {
    (positive_amount_minor_strategy(), currency_strategy()).prop_flat_map(|(coverage, currency)| {
        (1i64..=coverage).prop_map(move |claim| {
            (
                Money::from_minor(coverage, currency),
                Money::from_minor(claim, currency),
            )
        })
    })
}
