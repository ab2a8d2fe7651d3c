//! Money arithmetic shared by every calculation.
//!
//! All externally visible amounts pass through [`money`] exactly once, at the
//! point they are stored in a breakdown or compared against a statutory cap.
//! Intermediate values stay at full `Decimal` precision.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero, so for the
/// non-negative amounts that make up a return this is round-half-up.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::money;
///
/// assert_eq!(money(dec!(123.454)), dec!(123.45));
/// assert_eq!(money(dec!(123.455)), dec!(123.46));
/// assert_eq!(money(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Floors a value at zero.
pub fn non_negative(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}

/// Fraction of a linear phaseout that has been consumed at `value`.
///
/// Returns `(value - start) / (end - start)` clamped to `[0, 1]`. A range
/// whose end is not above its start behaves as a cliff at `start`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::phaseout_fraction;
///
/// assert_eq!(phaseout_fraction(dec!(85000), dec!(80000), dec!(90000)), dec!(0.5));
/// assert_eq!(phaseout_fraction(dec!(95000), dec!(80000), dec!(90000)), dec!(1));
/// ```
pub fn phaseout_fraction(
    value: Decimal,
    start: Decimal,
    end: Decimal,
) -> Decimal {
    if value <= start {
        return Decimal::ZERO;
    }
    if end <= start || value >= end {
        return Decimal::ONE;
    }
    (value - start) / (end - start)
}

/// Applies a linear phaseout to `base` and rounds the result.
pub fn apply_phaseout(
    base: Decimal,
    value: Decimal,
    start: Decimal,
    end: Decimal,
) -> Decimal {
    money(base * (Decimal::ONE - phaseout_fraction(value, start, end)))
}

/// Reduction for statutes phrased "by `per_step` for each `step` (or
/// fraction thereof) by which `excess` exceeds zero".
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::stepped_reduction;
///
/// // $50 for each $1,000 or fraction thereof
/// assert_eq!(stepped_reduction(dec!(1), dec!(1000), dec!(50)), dec!(50));
/// assert_eq!(stepped_reduction(dec!(2000), dec!(1000), dec!(50)), dec!(100));
/// ```
pub fn stepped_reduction(
    excess: Decimal,
    step: Decimal,
    per_step: Decimal,
) -> Decimal {
    if excess <= Decimal::ZERO || step <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (excess / step).ceil() * per_step
}

/// Rounds `value` up to the next multiple of `multiple`.
pub fn round_up_to_multiple(
    value: Decimal,
    multiple: Decimal,
) -> Decimal {
    if multiple <= Decimal::ZERO {
        return value;
    }
    (value / multiple).ceil() * multiple
}

/// Sums an iterator of amounts.
pub fn sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().fold(Decimal::ZERO, |acc, v| acc + v)
}
