//! Alternative minimum tax (Form 6251).
//!
//! | Line | Computation |
//! |------|-------------|
//! | 1 | Taxable income |
//! | 2 | + standard deduction, or taxes deducted on Schedule A |
//! | 3 | + preference items and adjustments |
//! | 4 | AMTI |
//! | 5 | Exemption, reduced by 25% of AMTI over the phaseout threshold |
//! | 6 | AMTI − exemption |
//! | 7 | Tentative minimum tax: 26%/28% on the ordinary part, capital-gains rates on the preferential part |
//! | 8 | AMT: line 7 − regular tax, not below zero |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::brackets::{stacked_tax, tax_on};
use crate::calculations::common::{money, non_negative};
use crate::error::ConfigError;
use crate::models::{BracketSchedule, ByFilingStatus, FilingStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtConfig {
    pub exemption: ByFilingStatus<Decimal>,
    pub phaseout_start: ByFilingStatus<Decimal>,
    pub phaseout_rate: Decimal,
    /// AMTI above which the upper rate applies.
    pub rate_breakpoint: ByFilingStatus<Decimal>,
    pub lower_rate: Decimal,
    pub upper_rate: Decimal,
}

impl AmtConfig {
    /// The two-rate AMT schedule for `status`.
    pub fn schedule(
        &self,
        status: FilingStatus,
    ) -> BracketSchedule {
        BracketSchedule::from_pairs(&[
            (Decimal::ZERO, self.lower_rate),
            (*self.rate_breakpoint.get(status), self.upper_rate),
        ])
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (status, _) in self.rate_breakpoint.iter() {
            self.schedule(status)
                .validate(&format!("AMT {status}"))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtInput {
    pub taxable_income: Decimal,
    /// Standard deduction, or state and local taxes deducted when itemizing.
    pub deduction_addback: Decimal,
    pub preferences: Decimal,
    /// Net capital gain plus qualified dividends.
    pub preferential_income: Decimal,
    pub regular_tax: Decimal,
    pub filing_status: FilingStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtResult {
    pub amti: Decimal,
    pub exemption: Decimal,
    pub taxable_excess: Decimal,
    pub tentative_minimum_tax: Decimal,
    pub amt: Decimal,
}

#[derive(Debug, Clone)]
pub struct AmtWorksheet<'a> {
    config: &'a AmtConfig,
    capital_gains: &'a BracketSchedule,
}

impl<'a> AmtWorksheet<'a> {
    /// `capital_gains` is the filer's 0/15/20% schedule.
    pub fn new(
        config: &'a AmtConfig,
        capital_gains: &'a BracketSchedule,
    ) -> Self {
        Self {
            config,
            capital_gains,
        }
    }

    pub fn calculate(
        &self,
        input: &AmtInput,
    ) -> AmtResult {
        let status = input.filing_status;
        let amti = input.taxable_income + input.deduction_addback + input.preferences;

        let reduction =
            non_negative(amti - *self.config.phaseout_start.get(status)) * self.config.phaseout_rate;
        let exemption = non_negative(*self.config.exemption.get(status) - reduction);
        let taxable_excess = non_negative(amti - exemption);

        let schedule = self.config.schedule(status);
        let all_ordinary = tax_on(&schedule, taxable_excess);

        let preferential = non_negative(input.preferential_income).min(taxable_excess);
        let tentative_minimum_tax = if preferential > Decimal::ZERO {
            let ordinary = taxable_excess - preferential;
            let split =
                tax_on(&schedule, ordinary) + stacked_tax(self.capital_gains, ordinary, preferential);
            split.min(all_ordinary)
        } else {
            all_ordinary
        };

        let tentative_minimum_tax = money(tentative_minimum_tax);
        let amt = non_negative(tentative_minimum_tax - input.regular_tax);

        debug!(
            amti = %money(amti),
            tmt = %tentative_minimum_tax,
            amt = %amt,
            "alternative minimum tax"
        );

        AmtResult {
            amti: money(amti),
            exemption: money(exemption),
            taxable_excess: money(taxable_excess),
            tentative_minimum_tax,
            amt,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn config() -> AmtConfig {
        AmtConfig {
            exemption: ByFilingStatus::new(
                dec!(88100),
                dec!(137000),
                dec!(68500),
                dec!(88100),
                dec!(137000),
            ),
            phaseout_start: ByFilingStatus::joint_and_other(dec!(1252700), dec!(626350)),
            phaseout_rate: dec!(0.25),
            rate_breakpoint: ByFilingStatus::new(
                dec!(239100),
                dec!(239100),
                dec!(119550),
                dec!(239100),
                dec!(239100),
            ),
            lower_rate: dec!(0.26),
            upper_rate: dec!(0.28),
        }
    }

    fn capital_gains() -> BracketSchedule {
        BracketSchedule::from_pairs(&[
            (dec!(0), dec!(0)),
            (dec!(48350), dec!(0.15)),
            (dec!(533400), dec!(0.20)),
        ])
    }

    fn input(
        taxable_income: Decimal,
        preferences: Decimal,
        regular_tax: Decimal,
    ) -> AmtInput {
        AmtInput {
            taxable_income,
            deduction_addback: dec!(15000),
            preferences,
            preferential_income: dec!(0),
            regular_tax,
            filing_status: FilingStatus::Single,
        }
    }

    #[test]
    fn typical_wage_earner_owes_no_amt() {
        let (config, gains) = (config(), capital_gains());
        let result = AmtWorksheet::new(&config, &gains).calculate(&input(
            dec!(60000),
            dec!(0),
            dec!(8114),
        ));

        // (75,000 − 88,100) is below zero
        assert_eq!(result.taxable_excess, dec!(0.00));
        assert_eq!(result.amt, dec!(0));
    }

    #[test]
    fn large_iso_exercise_triggers_amt() {
        let (config, gains) = (config(), capital_gains());
        let result = AmtWorksheet::new(&config, &gains).calculate(&input(
            dec!(100000),
            dec!(200000),
            dec!(17250),
        ));

        // AMTI 315,000; excess 226,900 × 26% = 58,994
        assert_eq!(result.amti, dec!(315000.00));
        assert_eq!(result.tentative_minimum_tax, dec!(58994.00));
        assert_eq!(result.amt, dec!(41744.00));
    }

    #[test]
    fn upper_rate_applies_above_breakpoint() {
        let (config, gains) = (config(), capital_gains());
        let result = AmtWorksheet::new(&config, &gains).calculate(&input(
            dec!(300000),
            dec!(100000),
            dec!(0),
        ));

        // excess 326,900: 239,100 × 26% + 87,800 × 28%
        assert_eq!(result.tentative_minimum_tax, dec!(86750.00));
    }

    #[test]
    fn exemption_phases_out_at_25_percent() {
        let (config, gains) = (config(), capital_gains());
        let result = AmtWorksheet::new(&config, &gains).calculate(&input(
            dec!(661350),
            dec!(0),
            dec!(0),
        ));

        // AMTI 676,350 is 50,000 over the threshold
        assert_eq!(result.exemption, dec!(75600.00));
    }

    #[test]
    fn preferential_income_keeps_capital_gains_rates() {
        let (config, gains) = (config(), capital_gains());
        let result = AmtWorksheet::new(&config, &gains).calculate(&AmtInput {
            preferential_income: dec!(100000),
            ..input(dec!(185000), dec!(0), dec!(0))
        });

        // 11,900 × 26%, then gains stacked: 36,450 at 0% and 63,550 at 15%
        assert_eq!(result.tentative_minimum_tax, dec!(12626.50));
    }
}
