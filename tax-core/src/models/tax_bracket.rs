use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A `(threshold, marginal rate)` pair. Income above `min_income` and below
/// the next bracket's `min_income` is taxed at `tax_rate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    pub tax_rate: Decimal,
}

/// An ascending list of brackets anchored at zero.
///
/// The last bracket is open-ended. A flat tax is a single bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BracketSchedule {
    brackets: Vec<TaxBracket>,
}

impl BracketSchedule {
    pub fn new(brackets: Vec<TaxBracket>) -> Self {
        Self { brackets }
    }

    /// Builds a schedule from `(min_income, rate)` pairs.
    pub fn from_pairs(pairs: &[(Decimal, Decimal)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|&(min_income, tax_rate)| TaxBracket {
                    min_income,
                    tax_rate,
                })
                .collect(),
        )
    }

    /// Single-rate schedule.
    pub fn flat(rate: Decimal) -> Self {
        Self::from_pairs(&[(Decimal::ZERO, rate)])
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    /// Upper bound of the bracket at `index`, `None` for the top bracket.
    pub fn upper_bound(
        &self,
        index: usize,
    ) -> Option<Decimal> {
        self.brackets.get(index + 1).map(|b| b.min_income)
    }

    /// Marginal rate that applies to the next dollar above `income`.
    pub fn marginal_rate(
        &self,
        income: Decimal,
    ) -> Decimal {
        self.brackets
            .iter()
            .take_while(|b| b.min_income <= income)
            .last()
            .map(|b| b.tax_rate)
            .unwrap_or(Decimal::ZERO)
    }

    /// Checks the schedule is non-empty, starts at zero, ascends strictly
    /// and carries rates in `[0, 1]`.
    pub fn validate(
        &self,
        context: &str,
    ) -> Result<(), ConfigError> {
        let first = self
            .brackets
            .first()
            .ok_or_else(|| ConfigError::EmptySchedule(context.to_string()))?;
        if first.min_income != Decimal::ZERO {
            return Err(ConfigError::ScheduleNotAnchored(context.to_string()));
        }
        if self
            .brackets
            .windows(2)
            .any(|pair| pair[1].min_income <= pair[0].min_income)
        {
            return Err(ConfigError::ScheduleNotAscending(context.to_string()));
        }
        if let Some(bad) = self
            .brackets
            .iter()
            .find(|b| b.tax_rate < Decimal::ZERO || b.tax_rate > Decimal::ONE)
        {
            return Err(ConfigError::RateOutOfRange {
                context: context.to_string(),
                rate: bad.tax_rate,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn schedule() -> BracketSchedule {
        BracketSchedule::from_pairs(&[
            (dec!(0), dec!(0.10)),
            (dec!(11925), dec!(0.12)),
            (dec!(48475), dec!(0.22)),
        ])
    }

    #[test]
    fn marginal_rate_uses_bracket_containing_income() {
        let s = schedule();

        assert_eq!(s.marginal_rate(dec!(0)), dec!(0.10));
        assert_eq!(s.marginal_rate(dec!(11924.99)), dec!(0.10));
        assert_eq!(s.marginal_rate(dec!(11925)), dec!(0.12));
        assert_eq!(s.marginal_rate(dec!(1000000)), dec!(0.22));
    }

    #[test]
    fn upper_bound_is_next_threshold() {
        let s = schedule();

        assert_eq!(s.upper_bound(0), Some(dec!(11925)));
        assert_eq!(s.upper_bound(2), None);
    }

    #[test]
    fn validate_accepts_anchored_ascending_schedule() {
        assert_eq!(schedule().validate("single"), Ok(()));
    }

    #[test]
    fn validate_rejects_empty_schedule() {
        let result = BracketSchedule::new(vec![]).validate("single");

        assert_eq!(result, Err(ConfigError::EmptySchedule("single".to_string())));
    }

    #[test]
    fn validate_rejects_unanchored_schedule() {
        let result = BracketSchedule::from_pairs(&[(dec!(100), dec!(0.1))]).validate("hoh");

        assert_eq!(result, Err(ConfigError::ScheduleNotAnchored("hoh".to_string())));
    }

    #[test]
    fn validate_rejects_descending_thresholds() {
        let result = BracketSchedule::from_pairs(&[
            (dec!(0), dec!(0.1)),
            (dec!(500), dec!(0.2)),
            (dec!(500), dec!(0.3)),
        ])
        .validate("mfj");

        assert_eq!(result, Err(ConfigError::ScheduleNotAscending("mfj".to_string())));
    }

    #[test]
    fn validate_rejects_rate_above_one() {
        let result = BracketSchedule::flat(dec!(1.5)).validate("flat");

        assert_eq!(
            result,
            Err(ConfigError::RateOutOfRange {
                context: "flat".to_string(),
                rate: dec!(1.5),
            })
        );
    }
}
