//! Currencies and amount checks
//!
//! Amounts travel through the system as `rust_decimal::Decimal` so pricing
//! stays exact. This module holds the ISO 4217 codes payments may be made in
//! and the checks shared by every place an amount enters the system.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    CHF,
    INR,
    AUD,
    CAD,
    SGD,
    HKD,
}

impl Currency {
    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
            Currency::INR => "INR",
            Currency::AUD => "AUD",
            Currency::CAD => "CAD",
            Currency::SGD => "SGD",
            Currency::HKD => "HKD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            "CHF" => Ok(Currency::CHF),
            "INR" => Ok(Currency::INR),
            "AUD" => Ok(Currency::AUD),
            "CAD" => Ok(Currency::CAD),
            "SGD" => Ok(Currency::SGD),
            "HKD" => Ok(Currency::HKD),
            _ => Err(MoneyError::UnsupportedCurrency(s.to_string())),
        }
    }
}

/// Errors that can occur when accepting an amount or currency
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// Rejects negative amounts, returning the amount unchanged otherwise
pub fn ensure_non_negative(field: &str, amount: Decimal) -> Result<Decimal, MoneyError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::InvalidAmount(format!(
            "{} must not be negative, got {}",
            field, amount
        )));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_parse_is_case_insensitive() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!(" Eur ".parse::<Currency>().unwrap(), Currency::EUR);
    }

    #[test]
    fn test_unknown_currency_rejected() {
        let err = "XYZ".parse::<Currency>().unwrap_err();
        assert_eq!(err, MoneyError::UnsupportedCurrency("XYZ".to_string()));
    }

    #[test]
    fn test_ensure_non_negative() {
        assert_eq!(ensure_non_negative("amount", dec!(0)), Ok(dec!(0)));
        assert_eq!(ensure_non_negative("amount", dec!(12.5)), Ok(dec!(12.5)));
        assert!(ensure_non_negative("amount", dec!(-0.01)).is_err());
    }
}
