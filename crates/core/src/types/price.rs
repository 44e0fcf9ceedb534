//! Type-safe price representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product price in the shop's base currency.
///
/// Wraps [`Decimal`] so prices never round-trip through floating point.
/// Serializes as a JSON string (e.g., `"19.99"`), matching the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the price is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let price = Price::from_cents(1999);
        assert_eq!(price.to_string(), "19.99");
        assert!(price.is_positive());
    }

    #[test]
    fn test_zero_not_positive() {
        assert!(!Price::from_cents(0).is_positive());
    }

    #[test]
    fn test_serializes_as_string() {
        let price = Price::from_cents(500);
        let json = serde_json::to_string(&price).expect("serialize");
        assert_eq!(json, "\"5.00\"");
        let back: Price = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, price);
    }
}
