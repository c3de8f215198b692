//! Request and response bodies
//!
//! Amounts travel as decimal strings next to an ISO 4217 currency code.

pub mod claims;
pub mod insurers;
pub mod policy;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{ClaimId, Currency, Money, MoneyError, PolicyId};

use crate::error::ApiError;

/// Amount plus currency
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MoneyDto {
    pub amount: Decimal,
    #[validate(length(equal = 3))]
    pub currency: String,
}

impl MoneyDto {
    /// Parses the currency and builds a [`Money`], refusing amounts finer
    /// than the money type holds
    pub fn to_money(&self) -> Result<Money, ApiError> {
        let currency: Currency = self
            .currency
            .parse()
            .map_err(|e: MoneyError| ApiError::Validation(e.to_string()))?;
        Money::try_new(self.amount, currency).map_err(|e| ApiError::Validation(e.to_string()))
    }
}

/// Parses a `POL-n` or bare numeric path segment
pub fn parse_policy_id(raw: &str) -> Result<PolicyId, ApiError> {
    raw.parse().map_err(|e: core_kernel::IdParseError| ApiError::BadRequest(e.to_string()))
}

/// Parses a `CLM-n` or bare numeric path segment
pub fn parse_claim_id(raw: &str) -> Result<ClaimId, ApiError> {
    raw.parse().map_err(|e: core_kernel::IdParseError| ApiError::BadRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_dto_parses_currency() {
        let dto = MoneyDto {
            amount: dec!(12.50),
            currency: "GBP".to_string(),
        };
        assert_eq!(dto.to_money().unwrap(), Money::new(dec!(12.50), Currency::GBP));

        let unknown = MoneyDto {
            amount: dec!(1),
            currency: "ZZZ".to_string(),
        };
        assert!(matches!(unknown.to_money(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_money_dto_refuses_sub_scale_amounts() {
        let dto = MoneyDto {
            amount: dec!(100.00004),
            currency: "USD".to_string(),
        };
        assert!(matches!(dto.to_money(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_ids_accept_prefixed_and_bare_forms() {
        assert_eq!(parse_policy_id("POL-4").unwrap(), PolicyId::new(4));
        assert_eq!(parse_claim_id("9").unwrap(), ClaimId::new(9));
        assert!(matches!(parse_claim_id("POL-1"), Err(ApiError::BadRequest(_))));
    }
}
