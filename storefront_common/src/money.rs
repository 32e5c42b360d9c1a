use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const ETB_CURRENCY_CODE: &str = "ETB";
pub const ETB_CURRENCY_CODE_LOWER: &str = "etb";

//--------------------------------------       Birr          ---------------------------------------------------------
/// A monetary amount in Ethiopian Birr, stored as a whole number of cents.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Birr(i64);

op!(binary Birr, Add, add);
op!(binary Birr, Sub, sub);
op!(inplace Birr, SubAssign, sub_assign);
op!(unary Birr, Neg, neg);

impl Mul<i64> for Birr {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Birr {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in Birr cents: {0}")]
pub struct BirrConversionError(String);

impl From<i64> for Birr {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Birr {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Birr {}

impl TryFrom<u64> for Birr {
    type Error = BirrConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(BirrConversionError(format!("Value {} is too large to convert to Birr", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Birr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();
        write!(f, "{sign}{}.{:02} {ETB_CURRENCY_CODE}", cents / 100, cents % 100)
    }
}

impl Birr {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn from_birr(birr: i64) -> Self {
        Self(birr * 100)
    }

    /// Renders the amount the way the payment gateway expects it: a plain decimal string without a currency suffix.
    pub fn to_gateway_amount(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();
        format!("{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_includes_currency_code() {
        assert_eq!(Birr::from_cents(2500).to_string(), "25.00 ETB");
        assert_eq!(Birr::from_cents(1005).to_string(), "10.05 ETB");
        assert_eq!(Birr::from_cents(-50).to_string(), "-0.50 ETB");
    }

    #[test]
    fn arithmetic_on_line_items() {
        let total: Birr = [Birr::from_birr(10) * 2, Birr::from_birr(5) * 1].into_iter().sum();
        assert_eq!(total, Birr::from_cents(2500));
        assert_eq!(total.to_gateway_amount(), "25.00");
    }
}
