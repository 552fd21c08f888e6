//! Decimal price and quantity types
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point errors).
//! Reservation, fill refund, and release math must agree bit-for-bit across
//! services, so every cash or quantity figure written to the store goes
//! through [`round_cash`] / [`round_qty`]: one scale, half-even rounding.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Decimal places carried for cash amounts at every store write.
pub const CASH_SCALE: u32 = 8;

/// Decimal places carried for asset quantities at every store write.
pub const QTY_SCALE: u32 = 8;

/// Round a cash amount to the platform scale, half-even.
pub fn round_cash(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CASH_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Round a quantity to the platform scale, half-even.
pub fn round_qty(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QTY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Limit or fill price.
///
/// Non-negative; zero means "absent" (cancel commands carry no price).
/// Serialized as a string to prevent JSON number precision loss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// Create a new Price from a Decimal
    ///
    /// # Panics
    /// Panics if the price is negative
    pub fn new(value: Decimal) -> Self {
        assert!(value >= Decimal::ZERO, "Price must be non-negative");
        Self(value)
    }

    /// Try to create a Price, returning None if negative
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value >= Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Zero price (absent limit)
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Create from integer (for testing/convenience)
    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    /// Create from string
    pub fn from_str(s: &str) -> Result<Self, rust_decimal::Error> {
        let decimal = Decimal::from_str(s)?;
        Ok(Self::new(decimal))
    }

    /// Get the inner decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Check if the price is absent
    pub fn is_zero(&self) -> bool {
        self.0 == Decimal::ZERO
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        assert!(self.0 >= rhs.0, "Price subtraction would result in negative");
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Self::Output {
        self.0 * rhs
    }
}

// Custom serialization to preserve precision
impl Serialize for Price {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let decimal = Decimal::from_str(&s).map_err(serde::de::Error::custom)?;
        Self::try_new(decimal).ok_or_else(|| serde::de::Error::custom("Price must be non-negative"))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order or fill quantity.
///
/// Non-negative; zero means "absent" (cancel commands carry no quantity, and
/// `leaves_qty` reaches zero on a full fill). Serialized as a string to
/// prevent JSON number precision loss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Create a new Quantity from a Decimal
    ///
    /// # Panics
    /// Panics if the quantity is negative
    pub fn new(value: Decimal) -> Self {
        assert!(value >= Decimal::ZERO, "Quantity must be non-negative");
        Self(value)
    }

    /// Try to create a Quantity, returning None if negative
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value >= Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Zero quantity
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Create from integer (for testing/convenience)
    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    /// Create from string
    pub fn from_str(s: &str) -> Result<Self, rust_decimal::Error> {
        let decimal = Decimal::from_str(s)?;
        Ok(Self::new(decimal))
    }

    /// Get the inner decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Check if quantity is zero
    pub fn is_zero(&self) -> bool {
        self.0 == Decimal::ZERO
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        assert!(self.0 >= rhs.0, "Quantity subtraction would result in negative");
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Quantity {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Self::Output {
        self.0 * rhs
    }
}

impl Mul<Price> for Quantity {
    type Output = Decimal;

    fn mul(self, rhs: Price) -> Self::Output {
        self.0 * rhs.as_decimal()
    }
}

// Custom serialization to preserve precision
impl Serialize for Quantity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let decimal = Decimal::from_str(&s).map_err(serde::de::Error::custom)?;
        Self::try_new(decimal)
            .ok_or_else(|| serde::de::Error::custom("Quantity must be non-negative"))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_creation() {
        let price = Price::from_u64(50000);
        assert_eq!(price.as_decimal(), Decimal::from(50000));
    }

    #[test]
    #[should_panic(expected = "Price must be non-negative")]
    fn test_price_negative_panics() {
        Price::new(Decimal::from(-100));
    }

    #[test]
    fn test_zero_price_is_absent() {
        assert!(Price::zero().is_zero());
        assert!(Price::try_new(dec!(-1)).is_none());
    }

    #[test]
    fn test_price_arithmetic() {
        let p1 = Price::from_u64(100);
        let p2 = Price::from_u64(50);

        assert_eq!(p1 + p2, Price::from_u64(150));
        assert_eq!(p1 - p2, Price::from_u64(50));
    }

    #[test]
    fn test_price_serialization() {
        let price = Price::from_str("50000.25").unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"50000.25\"");

        let deserialized: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(price, deserialized);
    }

    #[test]
    fn test_quantity_zero() {
        let qty = Quantity::zero();
        assert!(qty.is_zero());
    }

    #[test]
    fn test_quantity_arithmetic() {
        let q1 = Quantity::from_str("2.5").unwrap();
        let q2 = Quantity::from_str("1.5").unwrap();

        assert_eq!((q1 + q2).as_decimal(), dec!(4.0));
        assert_eq!((q1 - q2).as_decimal(), dec!(1.0));
    }

    #[test]
    fn test_quantity_price_multiplication() {
        let qty = Quantity::from_str("1.5").unwrap();
        let price = Price::from_u64(100);

        assert_eq!(qty * price, Decimal::from(150));
    }

    #[test]
    fn test_round_cash_half_even() {
        // Midpoint at the 8th decimal place rounds to the even neighbour.
        assert_eq!(round_cash(dec!(0.000000125)), dec!(0.00000012));
        assert_eq!(round_cash(dec!(0.000000135)), dec!(0.00000014));
        assert_eq!(round_cash(dec!(1.5)), dec!(1.5));
    }

    #[test]
    fn test_round_qty_half_even() {
        assert_eq!(round_qty(dec!(0.000000015)), dec!(0.00000002));
        assert_eq!(round_qty(dec!(0.000000025)), dec!(0.00000002));
    }

    #[test]
    fn test_deterministic_calculation() {
        // Same inputs always produce the same output.
        let qty = Quantity::from_str("0.123456789").unwrap();
        let price = Price::from_str("50000.987654321").unwrap();

        assert_eq!(round_cash(qty * price), round_cash(qty * price));
    }
}
