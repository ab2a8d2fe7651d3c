//! Progressive bracket summation.
//!
//! One routine serves the federal ordinary schedule, the preferential
//! capital-gains schedule, the AMT rates and every state schedule. For each
//! bracket `(threshold, rate)` the tax on the span it covers is
//! `rate × (min(income, next_threshold) − threshold)`; the spans are summed.
//!
//! Totals are returned at full precision. Callers round with
//! [`money`](super::common::money) at the point the amount is stored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::BracketSchedule;

use super::common::{money, non_negative};

/// Tax attributable to one bracket span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSpan {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
    pub taxable_amount: Decimal,
    pub tax: Decimal,
}

/// Result of running income through a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketTax {
    /// Unrounded total across all spans.
    pub tax: Decimal,
    /// Spans with a positive taxable amount, amounts rounded for display.
    pub spans: Vec<BracketSpan>,
    pub marginal_rate: Decimal,
}

/// Total tax on `income` under `schedule`, unrounded.
pub fn tax_on(
    schedule: &BracketSchedule,
    income: Decimal,
) -> Decimal {
    bracket_tax(schedule, income).tax
}

/// Runs `income` through `schedule` and reports each span.
pub fn bracket_tax(
    schedule: &BracketSchedule,
    income: Decimal,
) -> BracketTax {
    let income = non_negative(income);
    let mut tax = Decimal::ZERO;
    let mut spans = Vec::new();

    for (index, bracket) in schedule.brackets().iter().enumerate() {
        if income <= bracket.min_income {
            break;
        }
        let upper = schedule.upper_bound(index);
        let top = match upper {
            Some(next) => income.min(next),
            None => income,
        };
        let taxable = top - bracket.min_income;
        let span_tax = taxable * bracket.tax_rate;
        tax += span_tax;
        spans.push(BracketSpan {
            min_income: bracket.min_income,
            max_income: upper,
            rate: bracket.tax_rate,
            taxable_amount: money(taxable),
            tax: money(span_tax),
        });
    }

    BracketTax {
        tax,
        spans,
        marginal_rate: schedule.marginal_rate(income),
    }
}

/// Tax on `stacked` income placed on top of `base` income.
///
/// Used for preferential-rate income: ordinary income fills the schedule
/// first and the preferential amount takes whatever tiers remain above it.
pub fn stacked_tax(
    schedule: &BracketSchedule,
    base: Decimal,
    stacked: Decimal,
) -> Decimal {
    let base = non_negative(base);
    let stacked = non_negative(stacked);
    tax_on(schedule, base + stacked) - tax_on(schedule, base)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn single_2025() -> BracketSchedule {
        BracketSchedule::from_pairs(&[
            (dec!(0), dec!(0.10)),
            (dec!(11925), dec!(0.12)),
            (dec!(48475), dec!(0.22)),
            (dec!(103350), dec!(0.24)),
            (dec!(197300), dec!(0.32)),
            (dec!(250525), dec!(0.35)),
            (dec!(626350), dec!(0.37)),
        ])
    }

    // =========================================================================
    // bracket_tax tests
    // =========================================================================

    #[test]
    fn bracket_tax_is_zero_for_zero_income() {
        let result = bracket_tax(&single_2025(), dec!(0));

        assert_eq!(result.tax, dec!(0));
        assert!(result.spans.is_empty());
    }

    #[test]
    fn bracket_tax_treats_negative_income_as_zero() {
        let result = bracket_tax(&single_2025(), dec!(-5000));

        assert_eq!(result.tax, dec!(0));
    }

    #[test]
    fn bracket_tax_within_first_bracket() {
        let result = bracket_tax(&single_2025(), dec!(10000));

        assert_eq!(result.tax, dec!(1000.00));
        assert_eq!(result.spans.len(), 1);
    }

    #[test]
    fn bracket_tax_sums_spans_for_60000() {
        let result = bracket_tax(&single_2025(), dec!(60000));

        // 1192.50 + 4386.00 + 2535.50
        assert_eq!(money(result.tax), dec!(8114.00));
        assert_eq!(result.spans.len(), 3);
        assert_eq!(result.spans[1].tax, dec!(4386.00));
        assert_eq!(result.marginal_rate, dec!(0.22));
    }

    #[test]
    fn bracket_tax_matches_published_base_tax_at_thresholds() {
        let schedule = single_2025();

        assert_eq!(tax_on(&schedule, dec!(48475)), dec!(5578.50));
        assert_eq!(tax_on(&schedule, dec!(103350)), dec!(17651.00));
        assert_eq!(tax_on(&schedule, dec!(197300)), dec!(40199.00));
        assert_eq!(tax_on(&schedule, dec!(250525)), dec!(57231.00));
        assert_eq!(tax_on(&schedule, dec!(626350)), dec!(188769.75));
    }

    #[test]
    fn bracket_tax_top_span_is_open_ended() {
        let result = bracket_tax(&single_2025(), dec!(1000000));

        let top = result.spans.last().map(|s| s.max_income);
        assert_eq!(top, Some(None));
        assert_eq!(result.tax, dec!(188769.75) + dec!(373650) * dec!(0.37));
    }

    #[test]
    fn bracket_tax_flat_schedule() {
        let result = bracket_tax(&BracketSchedule::flat(dec!(0.0495)), dec!(97375));

        assert_eq!(money(result.tax), dec!(4820.06));
    }

    #[test]
    fn bracket_tax_is_monotonic_and_marginal_rate_matches_slope() {
        let schedule = single_2025();
        let mut previous = Decimal::ZERO;
        let mut income = Decimal::ZERO;
        while income <= dec!(800000) {
            let current = tax_on(&schedule, income);
            assert!(current >= previous, "tax decreased at {income}");

            let slope = tax_on(&schedule, income + dec!(1)) - current;
            assert_eq!(slope, schedule.marginal_rate(income), "slope at {income}");

            previous = current;
            income += dec!(2500);
        }
    }

    // =========================================================================
    // stacked_tax tests
    // =========================================================================

    #[test]
    fn stacked_tax_uses_tiers_above_base() {
        let preferential = BracketSchedule::from_pairs(&[
            (dec!(0), dec!(0)),
            (dec!(48350), dec!(0.15)),
            (dec!(533400), dec!(0.20)),
        ]);

        // 40,000 ordinary + 20,000 gains: 8,350 at 0%, 11,650 at 15%
        let result = stacked_tax(&preferential, dec!(40000), dec!(20000));

        assert_eq!(result, dec!(1747.50));
    }

    #[test]
    fn stacked_tax_of_nothing_is_zero() {
        let result = stacked_tax(&single_2025(), dec!(50000), dec!(0));

        assert_eq!(result, dec!(0));
    }
}
