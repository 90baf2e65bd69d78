//! Decimal amounts used by exchange transactions.
//!
//! Fiat amounts, crypto amounts, rates and commissions are all
//! [`Decimal`] values. They are stored as canonical decimal text so the
//! database never rounds them through a float.
//!
//! Parsing from user input accepts `.` or `,` as decimal separator:
//!
//! ```rust
//! use engine::amount;
//!
//! assert_eq!(amount::parse("10,50").unwrap().to_string(), "10.50");
//! assert!(amount::parse("ten").is_err());
//! ```

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::{EngineError, ResultEngine};

/// Parses a user-provided amount.
pub fn parse(input: &str) -> ResultEngine<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidAmount("amount is empty".to_string()));
    }
    let normalized = trimmed.replace(',', ".");
    Decimal::from_str(&normalized)
        .map_err(|_| EngineError::InvalidAmount(format!("invalid amount: {trimmed}")))
}

/// Ensures `value > 0`.
pub fn require_positive(value: Decimal, label: &str) -> ResultEngine<Decimal> {
    if value <= Decimal::ZERO {
        return Err(EngineError::InvalidAmount(format!("{label} must be > 0")));
    }
    Ok(value)
}

/// Ensures `value >= 0`.
pub fn require_non_negative(value: Decimal, label: &str) -> ResultEngine<Decimal> {
    if value < Decimal::ZERO {
        return Err(EngineError::InvalidAmount(format!("{label} must be >= 0")));
    }
    Ok(value)
}

pub(crate) fn to_storage(value: Decimal) -> String {
    value.normalize().to_string()
}

pub(crate) fn from_storage(value: &str, label: &str) -> ResultEngine<Decimal> {
    Decimal::from_str(value)
        .map_err(|_| EngineError::InvalidAmount(format!("invalid stored {label}: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!(parse("10").unwrap(), Decimal::new(10, 0));
        assert_eq!(parse("10.5").unwrap(), Decimal::new(105, 1));
        assert_eq!(parse(" 10,50 ").unwrap(), Decimal::new(1050, 2));
        assert_eq!(parse("0.00012345").unwrap(), Decimal::new(12345, 8));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse("").is_err());
        assert!(parse("abc").is_err());
        assert!(parse("1.2.3").is_err());
    }

    #[test]
    fn positive_and_non_negative_checks() {
        assert!(require_positive(Decimal::ZERO, "fiat_amount").is_err());
        assert!(require_positive(Decimal::new(-1, 0), "fiat_amount").is_err());
        assert!(require_positive(Decimal::new(1, 2), "fiat_amount").is_ok());

        assert!(require_non_negative(Decimal::ZERO, "commission").is_ok());
        assert!(require_non_negative(Decimal::new(-1, 2), "commission").is_err());
    }

    #[test]
    fn storage_is_canonical() {
        assert_eq!(to_storage(Decimal::new(1050, 2)), "10.5");
        assert_eq!(
            from_storage("10.5", "fiat_amount").unwrap(),
            Decimal::new(105, 1)
        );
        assert!(from_storage("x", "fiat_amount").is_err());
    }
}
