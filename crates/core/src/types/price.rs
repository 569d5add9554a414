//! Monetary amounts.
//!
//! Prices, order totals and promotion values are all stored as
//! `NUMERIC(10, 2)`. [`Price`] enforces the same bounds in Rust so a value
//! that would be rejected (or silently rounded) by the database never gets
//! that far.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price must be a decimal number")]
    Invalid,
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// More than two fractional digits.
    #[error("price can have at most {max} decimal places")]
    TooPrecise {
        /// Maximum allowed scale.
        max: u32,
    },
    /// The amount does not fit in `NUMERIC(10, 2)`.
    #[error("price must be less than 100000000")]
    TooLarge,
}

/// A non-negative amount with at most two decimal places.
///
/// Serializes as a decimal string (`"12.50"`) to avoid float rounding in
/// clients; accepts either a string or a number when deserializing.
///
/// ```
/// use food_app_core::Price;
///
/// assert!(Price::parse("12.50").is_ok());
/// assert!(Price::parse("-1").is_err());
/// assert!(Price::parse("1.005").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Maximum number of fractional digits.
    pub const MAX_SCALE: u32 = 2;

    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Parse a price from user input.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the input is not a number, is negative,
    /// has more than two decimal places or exceeds `NUMERIC(10, 2)`.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid)?;
        Self::try_from(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        // Trailing zeros ("1.500") are fine, real precision is not.
        let normalized = amount.normalize();
        if normalized.scale() > Self::MAX_SCALE {
            return Err(PriceError::TooPrecise {
                max: Self::MAX_SCALE,
            });
        }
        if normalized >= Decimal::from(100_000_000) {
            return Err(PriceError::TooLarge);
        }
        let mut amount = normalized;
        amount.rescale(Self::MAX_SCALE);
        Ok(Self(amount))
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        // The column type already enforces the bounds
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Price::parse("0").unwrap(), Price::ZERO);
        assert_eq!(Price::parse("12.5").unwrap().to_string(), "12.50");
        assert_eq!(Price::parse(" 3.99 ").unwrap().to_string(), "3.99");
    }

    #[test]
    fn test_parse_trailing_zeros_allowed() {
        assert_eq!(Price::parse("1.500").unwrap().to_string(), "1.50");
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Price::parse("twelve"), Err(PriceError::Invalid));
        assert_eq!(Price::parse(""), Err(PriceError::Invalid));
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(Price::parse("-0.01"), Err(PriceError::Negative));
    }

    #[test]
    fn test_parse_too_precise() {
        assert_eq!(
            Price::parse("1.005"),
            Err(PriceError::TooPrecise { max: 2 })
        );
    }

    #[test]
    fn test_parse_too_large() {
        assert_eq!(Price::parse("100000000"), Err(PriceError::TooLarge));
        assert!(Price::parse("99999999.99").is_ok());
    }

    #[test]
    fn test_deserialize_from_string_and_number() {
        let from_str: Price = serde_json::from_str("\"4.20\"").unwrap();
        let from_num: Price = serde_json::from_str("4.2").unwrap();
        assert_eq!(from_str, from_num);
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Price>("\"-3\"").is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Price::parse("7").unwrap()).unwrap();
        assert_eq!(json, "\"7.00\"");
    }
}
