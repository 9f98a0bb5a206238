//! Type-safe price representation using decimal arithmetic.
//!
//! All amounts are Naira values stored as `rust_decimal::Decimal`, which
//! keeps fee arithmetic exact. Serialization is transparent (the decimal
//! string), so prices round-trip through JSON documents without float drift.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A Naira amount.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero Naira.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole-Naira amount.
    #[must_use]
    pub fn from_naira(naira: i64) -> Self {
        Self(Decimal::from(naira))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\u{20a6}{:.2}", self.0.round_dp(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_arithmetic() {
        let unit = Price::from_naira(1_000);
        assert_eq!(unit * 3, Price::from_naira(3_000));
        assert_eq!(unit + Price::from_naira(500), Price::from_naira(1_500));
        assert_eq!(unit - Price::from_naira(400), Price::from_naira(600));
    }

    #[test]
    fn test_price_sum() {
        let total: Price = [Price::from_naira(100), Price::from_naira(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_naira(350));
    }

    #[test]
    fn test_price_display_naira() {
        assert_eq!(Price::from_naira(6_000).to_string(), "\u{20a6}6000.00");
    }

    #[test]
    fn test_price_serde_string() {
        // serde-with-str keeps decimals as JSON strings
        let json = serde_json::to_string(&Price::from_naira(5_000)).expect("serialize");
        assert_eq!(json, "\"5000\"");
        let back: Price = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, Price::from_naira(5_000));
    }
}
