//! Money value object: an ISO 4217 currency code plus an amount in minor units.
//!
//! No arithmetic is offered. Amounts are carried from the caller to the
//! payment processor unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Three-letter ISO 4217 currency code, normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses a currency code, accepting any letter case.
    pub fn new(code: impl AsRef<str>) -> Result<Self, ValidationError> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(ValidationError::empty_field("currency"));
        }
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                format!("expected a three-letter ISO 4217 code, got '{}'", code),
            ));
        }
        Ok(Self(code.to_ascii_lowercase()))
    }

    /// Returns the lowercase code (e.g. `usd`).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_ascii_uppercase())
    }
}

/// An amount of money in the currency's smallest unit (cents for USD).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    currency: CurrencyCode,
    amount_minor: i64,
}

impl Money {
    /// Creates money from an already validated currency.
    pub fn new(currency: CurrencyCode, amount_minor: i64) -> Self {
        Self {
            currency,
            amount_minor,
        }
    }

    /// Creates money from a raw currency code.
    pub fn from_minor(currency: &str, amount_minor: i64) -> Result<Self, ValidationError> {
        Ok(Self::new(CurrencyCode::new(currency)?, amount_minor))
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn amount_minor(&self) -> i64 {
        self.amount_minor
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount_minor, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_code_normalizes_to_lowercase() {
        let code = CurrencyCode::new("USD").unwrap();
        assert_eq!(code.as_str(), "usd");
        assert_eq!(code.to_string(), "USD");
    }

    #[test]
    fn currency_code_trims_whitespace() {
        assert_eq!(CurrencyCode::new(" cad ").unwrap().as_str(), "cad");
    }

    #[test]
    fn currency_code_rejects_empty() {
        assert!(matches!(
            CurrencyCode::new(""),
            Err(ValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn currency_code_rejects_wrong_length() {
        assert!(matches!(
            CurrencyCode::new("US"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            CurrencyCode::new("USDT"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn currency_code_rejects_non_letters() {
        assert!(CurrencyCode::new("U5D").is_err());
    }

    #[test]
    fn currency_code_deserializes_with_validation() {
        let code: CurrencyCode = serde_json::from_str(r#""EUR""#).unwrap();
        assert_eq!(code.as_str(), "eur");

        let result: Result<CurrencyCode, _> = serde_json::from_str(r#""euro""#);
        assert!(result.is_err());
    }

    #[test]
    fn money_from_minor_keeps_amount() {
        let price = Money::from_minor("usd", 1999).unwrap();
        assert_eq!(price.amount_minor(), 1999);
        assert_eq!(price.currency().as_str(), "usd");
        assert_eq!(price.to_string(), "1999 USD");
    }

    #[test]
    fn money_from_minor_rejects_bad_currency() {
        assert!(Money::from_minor("dollars", 100).is_err());
    }
}
