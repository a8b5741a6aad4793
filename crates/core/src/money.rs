//! Fixed-point money.
//!
//! Amounts are stored as a signed count of minor units (cents). All
//! conversions from decimal input round half-up to two places, so every
//! stored amount already satisfies the two-decimal rounding rule.
//!
//! The arithmetic operators saturate at the representable bounds instead of
//! panicking or wrapping. Use the `checked_*` methods where overflow has to be
//! reported.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Number of decimal places carried by [`Money`].
pub const MINOR_UNIT_SCALE: u32 = 2;

/// A currency-less monetary amount in minor units.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(0);

    /// The smallest representable positive amount (0.01).
    pub const MINOR_UNIT: Money = Money(1);

    /// The largest representable amount.
    pub const MAX: Money = Money(i64::MAX);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Convert an exact decimal into money, rounding half-up to two places.
    pub fn from_decimal(value: Decimal) -> DomainResult<Self> {
        let scaled = value
            .checked_mul(Decimal::from(10_i64.pow(MINOR_UNIT_SCALE)))
            .ok_or_else(|| DomainError::validation(format!("amount {value} is out of range")))?;
        let units = scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        units
            .to_i64()
            .map(Self)
            .ok_or_else(|| DomainError::validation(format!("amount {value} is out of range")))
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    pub fn checked_abs(self) -> Option<Self> {
        self.0.checked_abs().map(Self)
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_decimal(), f)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| DomainError::validation(format!("invalid amount {s:?}: {e}")))?;
        Self::from_decimal(value)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_decimal(value)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_up_to_cents() {
        assert_eq!(Money::from_decimal(dec!(33.335)).unwrap(), Money::from_minor(3334));
        assert_eq!(Money::from_decimal(dec!(33.334)).unwrap(), Money::from_minor(3333));
        assert_eq!(Money::from_decimal(dec!(-0.005)).unwrap(), Money::from_minor(-1));
    }

    #[test]
    fn displays_with_two_places() {
        assert_eq!(Money::from_minor(25000).to_string(), "250.00");
        assert_eq!(Money::from_minor(-5).to_string(), "-0.05");
    }

    #[test]
    fn parses_decimal_strings() {
        assert_eq!("1250".parse::<Money>().unwrap(), Money::from_minor(125_000));
        assert_eq!(" 0.1 ".parse::<Money>().unwrap(), Money::from_minor(10));
        assert!("ten".parse::<Money>().unwrap_err().is_validation());
    }

    #[test]
    fn out_of_range_amount_is_rejected() {
        let err = Money::from_decimal(Decimal::MAX).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn operators_saturate_instead_of_overflowing() {
        assert_eq!(Money::MAX + Money::MINOR_UNIT, Money::MAX);
        assert_eq!(-Money::MAX - Money::MAX, Money::from_minor(i64::MIN));
        assert_eq!([Money::MAX, Money::MAX].iter().sum::<Money>(), Money::MAX);
        assert_eq!(Money::from_minor(i64::MIN).abs(), Money::MAX);
        assert_eq!(Money::MAX.checked_add(Money::MINOR_UNIT), None);
        assert_eq!(Money::from_minor(i64::MIN).checked_abs(), None);
    }

    proptest! {
        #[test]
        fn decimal_conversion_is_exact_for_cent_values(minor in -1_000_000_000i64..1_000_000_000i64) {
            let money = Money::from_minor(minor);
            prop_assert_eq!(Money::from_decimal(money.to_decimal()).unwrap(), money);
        }
    }
}
