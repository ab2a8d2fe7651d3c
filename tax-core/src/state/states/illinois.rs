//! Illinois: 4.95% flat tax on federal AGI after exemptions.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::calculations::common::money;
use crate::models::{ByFilingStatus, FilingStatus};
use crate::state::calculator::{StateCalculator, StateContext, eitc_credit};
use crate::state::config::{RetirementTreatment, StateCredit, StateTaxConfig};

const RATE: Decimal = dec!(0.0495);
const PROPERTY_TAX_CREDIT_RATE: Decimal = dec!(0.05);

/// Above this federal AGI neither exemptions nor the property tax credit
/// are allowed.
fn high_income_cutoff(status: FilingStatus) -> Decimal {
    *ByFilingStatus::joint_and_other(dec!(500000), dec!(250000)).get(status)
}

fn config(
    tax_year: i32,
    exemption: Decimal,
) -> StateTaxConfig {
    StateTaxConfig {
        personal_exemption: ByFilingStatus::joint_and_other(exemption * Decimal::TWO, exemption),
        dependent_exemption: exemption,
        retirement: RetirementTreatment::Exempt,
        eitc_rate: dec!(0.20),
        ..StateTaxConfig::flat("IL", tax_year, RATE)
    }
}

pub fn config_2024() -> StateTaxConfig {
    config(2024, dec!(2775))
}

pub fn config_2025() -> StateTaxConfig {
    config(2025, dec!(2850))
}

#[derive(Debug, Clone)]
pub struct IllinoisCalculator {
    config: StateTaxConfig,
}

impl IllinoisCalculator {
    pub fn new(config: StateTaxConfig) -> Self {
        Self { config }
    }
}

impl StateCalculator for IllinoisCalculator {
    fn config(&self) -> &StateTaxConfig {
        &self.config
    }

    fn exemptions(
        &self,
        ctx: &StateContext<'_>,
        _state_agi: Decimal,
    ) -> Decimal {
        if ctx.federal_agi() > high_income_cutoff(ctx.filing_status) {
            return Decimal::ZERO;
        }
        *self.config.personal_exemption.get(ctx.filing_status)
            + self.config.dependent_exemption * Decimal::from(ctx.dependent_count())
    }

    fn credits(
        &self,
        ctx: &StateContext<'_>,
        _state_agi: Decimal,
    ) -> Vec<StateCredit> {
        let mut credits = Vec::new();
        let property_tax = ctx.tax_return.state_inputs.property_tax_paid;
        if property_tax > Decimal::ZERO && ctx.federal_agi() <= high_income_cutoff(ctx.filing_status)
        {
            credits.push(StateCredit::nonrefundable(
                "property tax credit",
                money(property_tax * PROPERTY_TAX_CREDIT_RATE),
            ));
        }
        credits.extend(eitc_credit(&self.config, ctx));
        credits
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{Dependent, Form1099R, IncomeSource};
    use crate::state::states::test_support::{federal, single_wages, tax_return, wages};

    fn calculate(
        calculator: &IllinoisCalculator,
        tax_return: &crate::models::TaxReturn,
    ) -> crate::state::StateCalculationBreakdown {
        let federal = federal(tax_return);
        calculator.calculate(&StateContext::new(tax_return, &federal)).unwrap()
    }

    // =========================================================================
    // tax tests
    // =========================================================================

    #[test]
    fn single_filer_with_one_exemption() {
        let calculator = IllinoisCalculator::new(config_2025());

        let result = calculate(&calculator, &single_wages(dec!(100000)));

        assert_eq!(result.exemptions, dec!(2850.00));
        assert_eq!(result.taxable_income, dec!(97150.00));
        assert_eq!(result.tax, dec!(4808.93));
    }

    #[test]
    fn custom_exemption_amount_flows_through() {
        let calculator = IllinoisCalculator::new(config(2025, dec!(2625)));

        let result = calculate(&calculator, &single_wages(dec!(100000)));

        assert_eq!(result.taxable_income, dec!(97375.00));
        assert_eq!(result.tax, dec!(4820.06));
    }

    #[test]
    fn exemption_lost_above_cutoff() {
        let calculator = IllinoisCalculator::new(config_2025());

        let result = calculate(&calculator, &single_wages(dec!(300000)));

        assert_eq!(result.exemptions, dec!(0));
        assert_eq!(result.tax, dec!(14850.00));
    }

    #[test]
    fn dependents_add_exemptions() {
        let calculator = IllinoisCalculator::new(config_2025());
        let mut tax_return = tax_return(FilingStatus::MarriedFilingJointly, vec![wages(dec!(90000))]);
        tax_return.taxpayer.dependents = vec![Dependent {
            name: "Ana".to_string(),
            age: 9,
            ..Dependent::default()
        }];

        let result = calculate(&calculator, &tax_return);

        assert_eq!(result.exemptions, dec!(8550.00));
    }

    #[test]
    fn retirement_income_is_subtracted() {
        let calculator = IllinoisCalculator::new(config_2025());
        let tax_return = tax_return(
            FilingStatus::Single,
            vec![
                wages(dec!(40000)),
                IncomeSource::RetirementDistribution(Form1099R {
                    payer: "Pension".to_string(),
                    gross_distribution: dec!(20000),
                    ..Form1099R::default()
                }),
            ],
        );

        let result = calculate(&calculator, &tax_return);

        assert_eq!(result.starting_income, dec!(60000.00));
        assert_eq!(result.state_agi, dec!(40000.00));
    }

    // =========================================================================
    // credit tests
    // =========================================================================

    #[test]
    fn property_tax_credit_is_five_percent() {
        let calculator = IllinoisCalculator::new(config_2025());
        let mut tax_return = single_wages(dec!(100000));
        tax_return.state_inputs.property_tax_paid = dec!(6000);

        let result = calculate(&calculator, &tax_return);

        assert_eq!(result.nonrefundable_credits, dec!(300.00));
        assert_eq!(result.tax_after_credits, dec!(4508.93));
    }

    #[test]
    fn property_tax_credit_lost_above_cutoff() {
        let calculator = IllinoisCalculator::new(config_2025());
        let mut tax_return = single_wages(dec!(300000));
        tax_return.state_inputs.property_tax_paid = dec!(6000);

        let result = calculate(&calculator, &tax_return);

        assert!(result.credits.is_empty());
    }

    #[test]
    fn earned_income_credit_is_share_of_federal() {
        let calculator = IllinoisCalculator::new(config_2025());
        let mut tax_return = single_wages(dec!(20000));
        tax_return.taxpayer.dependents = vec![Dependent {
            name: "Ana".to_string(),
            age: 4,
            ..Dependent::default()
        }];
        let federal = federal(&tax_return);
        let federal_eitc = federal.credit_allowed(crate::models::CreditKind::EarnedIncome);

        let result = calculator
            .calculate(&StateContext::new(&tax_return, &federal))
            .unwrap();

        assert!(federal_eitc > Decimal::ZERO);
        assert_eq!(result.refundable_credits, money(federal_eitc * dec!(0.20)));
    }
}
