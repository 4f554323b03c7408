//! Integer-cent money, exact fractions and amount comparison.
//!
//! All amounts are stored in the smallest currency unit (cents) as `i64`.
//! Nothing in here goes through floating point.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Monetary amount in the smallest currency unit (e.g. cents).
///
/// The operators saturate at the `i64` bounds; use the `checked_*` methods
/// where an out-of-range result must be reported instead.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Whole currency units (dollars, euros, ...) converted to cents,
    /// saturating at the representable range.
    pub const fn from_units(units: i64) -> Self {
        Self(units.saturating_mul(100))
    }

    /// Whole currency units converted to cents, or `None` if the amount does
    /// not fit.
    pub const fn checked_from_units(units: i64) -> Option<Self> {
        match units.checked_mul(100) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Sum of `amounts`, or `None` on overflow.
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |total, amount| total.checked_add(amount))
    }

    /// Multiply by an exact fraction, rounding half away from zero to the
    /// cent. `None` when the result does not fit in `i64`.
    pub fn checked_mul_fraction(self, fraction: Fraction) -> Option<Money> {
        let product = i128::from(self.0) * i128::from(fraction.numer);
        let denom = i128::from(fraction.denom);
        let mut quotient = product / denom;
        let remainder = product % denom;
        if remainder.abs() * 2 >= denom {
            quotient += product.signum();
        }
        i64::try_from(quotient).ok().map(Money)
    }

    /// Saturating form of [`Money::checked_mul_fraction`].
    pub fn mul_fraction(self, fraction: Fraction) -> Money {
        self.checked_mul_fraction(fraction).unwrap_or_else(|| {
            if (self.0 < 0) == (fraction.numer < 0) {
                Money(i64::MAX)
            } else {
                Money(i64::MIN)
            }
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

/// Exact rational number `numer / denom` with a positive denominator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fraction {
    numer: i64,
    denom: i64,
}

impl Fraction {
    pub fn new(numer: i64, denom: i64) -> Result<Self, ConfigError> {
        if denom <= 0 {
            return Err(ConfigError::InvalidDenominator(denom));
        }
        Ok(Self { numer, denom })
    }

    /// `percent / 100`, restricted to 0..=100.
    pub fn from_percent(percent: i64) -> Result<Self, ConfigError> {
        if !(0..=100).contains(&percent) {
            return Err(ConfigError::InvalidPercentage(percent));
        }
        Ok(Self {
            numer: percent,
            denom: 100,
        })
    }

    pub const fn numer(self) -> i64 {
        self.numer
    }

    pub const fn denom(self) -> i64 {
        self.denom
    }
}

/// Comparison applied between two amounts: `lhs <op> rhs`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    #[serde(rename = "gt", alias = "greater_than")]
    GreaterThan,
    #[serde(rename = "gte", alias = "greater_than_or_equal")]
    GreaterThanOrEqual,
    #[serde(rename = "lt", alias = "less_than")]
    LessThan,
    #[serde(rename = "lte", alias = "less_than_or_equal")]
    LessThanOrEqual,
    #[serde(rename = "eq", alias = "equal_to")]
    EqualTo,
}

impl Comparator {
    pub fn compare(self, lhs: Money, rhs: Money) -> bool {
        match self {
            Comparator::GreaterThan => lhs > rhs,
            Comparator::GreaterThanOrEqual => lhs >= rhs,
            Comparator::LessThan => lhs < rhs,
            Comparator::LessThanOrEqual => lhs <= rhs,
            Comparator::EqualTo => lhs == rhs,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::GreaterThan => "gt",
            Comparator::GreaterThanOrEqual => "gte",
            Comparator::LessThan => "lt",
            Comparator::LessThanOrEqual => "lte",
            Comparator::EqualTo => "eq",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comparator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gt" | "greater_than" => Ok(Comparator::GreaterThan),
            "gte" | "greater_than_or_equal" => Ok(Comparator::GreaterThanOrEqual),
            "lt" | "less_than" => Ok(Comparator::LessThan),
            "lte" | "less_than_or_equal" => Ok(Comparator::LessThanOrEqual),
            "eq" | "equal_to" => Ok(Comparator::EqualTo),
            other => Err(ConfigError::InvalidComparison(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn display_formats_cents() {
        assert_eq!(Money::from_cents(15000).to_string(), "$150.00");
        assert_eq!(Money::from_cents(9999).to_string(), "$99.99");
        assert_eq!(Money::from_cents(-5).to_string(), "-$0.05");
        assert_eq!(Money::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn from_units_scales_to_cents() {
        assert_eq!(Money::from_units(100), Money::from_cents(10_000));
    }

    #[test]
    fn sum_over_iterator() {
        let total: Money = [Money::from_cents(150), Money::from_cents(250)].iter().sum();
        assert_eq!(total, Money::from_cents(400));
    }

    #[test]
    fn mul_fraction_rounds_half_away_from_zero() {
        let third = Fraction::new(1, 3).unwrap();
        assert_eq!(Money::from_cents(100).mul_fraction(third), Money::from_cents(33));
        assert_eq!(Money::from_cents(200).mul_fraction(third), Money::from_cents(67));

        let half = Fraction::new(1, 2).unwrap();
        assert_eq!(Money::from_cents(5).mul_fraction(half), Money::from_cents(3));
        assert_eq!(Money::from_cents(-5).mul_fraction(half), Money::from_cents(-3));
    }

    #[test]
    fn operators_saturate_at_i64_bounds() {
        let max = Money::from_cents(i64::MAX);
        let min = Money::from_cents(i64::MIN);

        assert_eq!(max + Money::from_cents(1), max);
        assert_eq!(min - Money::from_cents(1), min);
        assert_eq!(-min, max);

        let mut total = max;
        total += max;
        assert_eq!(total, max);
        total -= max;
        assert_eq!(total, Money::ZERO);

        let huge = Money::from_cents(5_000_000_000_000_000_000);
        assert_eq!([huge, huge].into_iter().sum::<Money>(), max);
    }

    #[test]
    fn checked_operations_report_overflow() {
        let max = Money::from_cents(i64::MAX);
        let huge = Money::from_cents(5_000_000_000_000_000_000);

        assert_eq!(max.checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)), None);
        assert_eq!(Money::checked_sum([huge, huge]), None);
        assert_eq!(
            Money::checked_sum([Money::from_cents(150), Money::from_cents(250)]),
            Some(Money::from_cents(400))
        );
    }

    #[test]
    fn from_units_is_range_checked() {
        assert_eq!(Money::checked_from_units(150), Some(Money::from_cents(15_000)));
        assert_eq!(Money::checked_from_units(i64::MAX / 10), None);
        assert_eq!(Money::from_units(i64::MAX / 10), Money::from_cents(i64::MAX));
        assert_eq!(Money::from_units(i64::MIN / 10), Money::from_cents(i64::MIN));
    }

    #[test]
    fn mul_fraction_above_one_does_not_truncate() {
        let triple = Fraction::new(3, 1).unwrap();
        let large = Money::from_cents(i64::MAX / 2);

        assert_eq!(large.checked_mul_fraction(triple), None);
        assert_eq!(large.mul_fraction(triple), Money::from_cents(i64::MAX));
        assert_eq!((-large).mul_fraction(triple), Money::from_cents(i64::MIN));
        assert_eq!(
            Money::from_cents(200).checked_mul_fraction(triple),
            Some(Money::from_cents(600))
        );
    }

    #[test]
    fn percent_outside_range_is_rejected() {
        assert_eq!(
            Fraction::from_percent(101).unwrap_err(),
            ConfigError::InvalidPercentage(101)
        );
        assert_eq!(
            Fraction::from_percent(-1).unwrap_err(),
            ConfigError::InvalidPercentage(-1)
        );
        assert_eq!(
            Fraction::new(1, 0).unwrap_err(),
            ConfigError::InvalidDenominator(0)
        );
    }

    #[test]
    fn comparator_parses_short_and_long_names() {
        assert_eq!("gte".parse::<Comparator>().unwrap(), Comparator::GreaterThanOrEqual);
        assert_eq!(
            "greater_than_or_equal".parse::<Comparator>().unwrap(),
            Comparator::GreaterThanOrEqual
        );
        assert_eq!("equal_to".parse::<Comparator>().unwrap(), Comparator::EqualTo);
        assert_eq!(
            "about".parse::<Comparator>().unwrap_err(),
            ConfigError::InvalidComparison("about".to_string())
        );
    }

    #[test]
    fn comparator_deserializes_from_either_name() {
        let short: Comparator = serde_json::from_str("\"lt\"").unwrap();
        let long: Comparator = serde_json::from_str("\"less_than\"").unwrap();
        assert_eq!(short, Comparator::LessThan);
        assert_eq!(long, Comparator::LessThan);
        assert_eq!(serde_json::to_string(&Comparator::LessThan).unwrap(), "\"lt\"");
    }

    #[test]
    fn comparator_boundaries_are_exact() {
        let hundred = Money::from_units(100);
        assert!(Comparator::GreaterThanOrEqual.compare(Money::from_cents(10_000), hundred));
        assert!(!Comparator::GreaterThanOrEqual.compare(Money::from_cents(9_999), hundred));
        assert!(!Comparator::GreaterThan.compare(hundred, hundred));
        assert!(Comparator::LessThanOrEqual.compare(hundred, hundred));
        assert!(!Comparator::LessThan.compare(hundred, hundred));
        assert!(Comparator::EqualTo.compare(hundred, hundred));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the five comparators agree with integer ordering on cents.
        #[test]
        fn comparators_match_integer_ordering(
            a in -1_000_000i64..1_000_000i64,
            b in -1_000_000i64..1_000_000i64
        ) {
            let (lhs, rhs) = (Money::from_cents(a), Money::from_cents(b));
            prop_assert_eq!(Comparator::GreaterThan.compare(lhs, rhs), a > b);
            prop_assert_eq!(Comparator::GreaterThanOrEqual.compare(lhs, rhs), a >= b);
            prop_assert_eq!(Comparator::LessThan.compare(lhs, rhs), a < b);
            prop_assert_eq!(Comparator::LessThanOrEqual.compare(lhs, rhs), a <= b);
            prop_assert_eq!(Comparator::EqualTo.compare(lhs, rhs), a == b);
        }

        /// Property: taking 100% of an amount yields the amount, 0% yields zero.
        #[test]
        fn full_and_empty_percentages_are_exact(cents in 0i64..100_000_000i64) {
            let amount = Money::from_cents(cents);
            prop_assert_eq!(amount.mul_fraction(Fraction::from_percent(100).unwrap()), amount);
            prop_assert_eq!(amount.mul_fraction(Fraction::from_percent(0).unwrap()), Money::ZERO);
        }
    }
}
