use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BracketSchedule, ByFilingStatus, DependentConfig};
use crate::calculations::adjustments::AdjustmentsConfig;
use crate::calculations::deductions::{ItemizedConfig, StandardDeductionConfig};
use crate::calculations::worksheets::{
    AmtConfig, OtherTaxesConfig, PassiveLossConfig, QbiConfig, SeWorksheetConfig,
    SocialSecurityConfig, UnderpaymentConfig,
};
use crate::credits::CreditsConfig;
use crate::error::ConfigError;

/// Preferential rates on net capital gain and qualified dividends, and the
/// net capital loss limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainsConfig {
    /// 0/15/20% schedules. Thresholds are measured on total taxable income
    /// with the preferential income stacked on top of ordinary income.
    pub schedule: ByFilingStatus<BracketSchedule>,
    pub loss_limit: ByFilingStatus<Decimal>,
}

/// Every year-scoped constant the federal engine and credit calculators
/// read. Adding a tax year means building one of these; no calculation code
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearConfig {
    pub tax_year: i32,
    pub ordinary_brackets: ByFilingStatus<BracketSchedule>,
    pub capital_gains: CapitalGainsConfig,
    pub standard_deduction: StandardDeductionConfig,
    pub itemized: ItemizedConfig,
    pub self_employment: SeWorksheetConfig,
    pub social_security: SocialSecurityConfig,
    pub passive: PassiveLossConfig,
    pub qbi: QbiConfig,
    pub amt: AmtConfig,
    pub other_taxes: OtherTaxesConfig,
    pub adjustments: AdjustmentsConfig,
    pub dependents: DependentConfig,
    pub credits: CreditsConfig,
    pub penalty: UnderpaymentConfig,
}

impl TaxYearConfig {
    /// Checks the structural invariants: every bracket table anchored at
    /// zero and ascending, rates within `[0, 1]`, phaseout ranges not
    /// inverted, and sane self-employment constants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (status, schedule) in self.ordinary_brackets.iter() {
            schedule.validate(&format!("{} ordinary {status}", self.tax_year))?;
        }
        for (status, schedule) in self.capital_gains.schedule.iter() {
            schedule.validate(&format!("{} capital gains {status}", self.tax_year))?;
        }
        self.amt.validate()?;
        self.adjustments.validate()?;
        self.self_employment.validate()?;

        for (status, range) in self.credits.education.phaseout.iter() {
            range.validate(&format!("education credits {status}"))?;
        }
        self.credits.adoption.phaseout.validate("adoption credit")?;

        for (context, rate) in [
            ("medical floor", self.itemized.medical_floor_rate),
            ("QBI deduction", self.qbi.deduction_rate),
            ("AMT exemption phaseout", self.amt.phaseout_rate),
            ("additional Medicare tax", self.other_taxes.additional_medicare_rate),
            ("net investment income tax", self.other_taxes.niit_rate),
            ("passive allowance phaseout", self.passive.phaseout_rate),
            ("underpayment", self.penalty.underpayment_rate),
            ("child tax credit refundable", self.credits.child_tax.refundable_rate),
            ("saver's credit high", self.credits.savers.high_rate),
        ] {
            ensure_rate(context, rate)?;
        }
        for tier in &self.credits.earned_income.tiers {
            ensure_rate("EITC phase-in", tier.phase_in_rate)?;
            ensure_rate("EITC phaseout", tier.phaseout_rate)?;
        }
        Ok(())
    }
}

fn ensure_rate(
    context: &str,
    rate: Decimal,
) -> Result<(), ConfigError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(ConfigError::RateOutOfRange {
            context: context.to_string(),
            rate,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::FilingStatus;
    use crate::tax_years;

    #[test]
    fn builtin_years_validate() {
        for year in tax_years::SUPPORTED_YEARS {
            let config = tax_years::builtin(year).unwrap();
            assert_eq!(config.validate(), Ok(()));
        }
    }

    #[test]
    fn unanchored_schedule_is_rejected() {
        let mut config = tax_years::builtin(2025).unwrap();
        *config
            .ordinary_brackets
            .get_mut(FilingStatus::Single) = BracketSchedule::from_pairs(&[(dec!(100), dec!(0.10))]);

        assert_eq!(
            config.validate(),
            Err(ConfigError::ScheduleNotAnchored("2025 ordinary S".to_string()))
        );
    }

    #[test]
    fn rate_above_one_is_rejected() {
        let mut config = tax_years::builtin(2025).unwrap();
        config.other_taxes.niit_rate = dec!(3.8);

        assert_eq!(
            config.validate(),
            Err(ConfigError::RateOutOfRange {
                context: "net investment income tax".to_string(),
                rate: dec!(3.8),
            })
        );
    }
}
