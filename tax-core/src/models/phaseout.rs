use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{money, phaseout_fraction};
use crate::error::ConfigError;

/// Income range over which a benefit shrinks linearly to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseoutRange {
    pub start: Decimal,
    pub end: Decimal,
}

impl PhaseoutRange {
    pub fn new(
        start: Decimal,
        end: Decimal,
    ) -> Self {
        Self { start, end }
    }

    /// Share of the benefit lost at `income`, in `[0, 1]`.
    pub fn fraction(
        &self,
        income: Decimal,
    ) -> Decimal {
        phaseout_fraction(income, self.start, self.end)
    }

    /// `base` reduced for `income`, rounded to the cent.
    pub fn apply(
        &self,
        base: Decimal,
        income: Decimal,
    ) -> Decimal {
        money(base * (Decimal::ONE - self.fraction(income)))
    }

    pub fn validate(
        &self,
        context: &str,
    ) -> Result<(), ConfigError> {
        if self.end < self.start {
            return Err(ConfigError::InvertedPhaseout(context.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn apply_halves_benefit_at_midpoint() {
        let range = PhaseoutRange::new(dec!(80000), dec!(90000));

        assert_eq!(range.apply(dec!(2500), dec!(85000)), dec!(1250.00));
    }

    #[test]
    fn apply_is_full_below_start_and_zero_above_end() {
        let range = PhaseoutRange::new(dec!(80000), dec!(90000));

        assert_eq!(range.apply(dec!(2500), dec!(80000)), dec!(2500.00));
        assert_eq!(range.apply(dec!(2500), dec!(90000)), dec!(0.00));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let range = PhaseoutRange::new(dec!(90000), dec!(80000));

        assert_eq!(
            range.validate("student loan interest"),
            Err(ConfigError::InvertedPhaseout(
                "student loan interest".to_string()
            ))
        );
    }
}
