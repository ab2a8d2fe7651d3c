//! Colorado: flat tax on federal taxable income.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::state::calculator::{StateCalculator, StateContext, default_subtractions};
use crate::state::config::{
    AgeExclusion, RetirementTreatment, StartingIncome, StateAdjustment, StateTaxConfig,
};

/// Age from which taxable social security is fully subtracted.
const FULL_SOCIAL_SECURITY_AGE: u32 = 65;

pub fn config_2025() -> StateTaxConfig {
    StateTaxConfig {
        starting_income: StartingIncome::FederalTaxableIncome,
        // Social security is handled with the age test below.
        social_security_taxable: true,
        retirement: RetirementTreatment::AgeExclusion(vec![
            AgeExclusion {
                min_age: 55,
                amount: dec!(20000),
            },
            AgeExclusion {
                min_age: 65,
                amount: dec!(24000),
            },
        ]),
        eitc_rate: dec!(0.25),
        ..StateTaxConfig::flat("CO", 2025, dec!(0.044))
    }
}

#[derive(Debug, Clone)]
pub struct ColoradoCalculator {
    config: StateTaxConfig,
}

impl ColoradoCalculator {
    pub fn new(config: StateTaxConfig) -> Self {
        Self { config }
    }
}

impl StateCalculator for ColoradoCalculator {
    fn config(&self) -> &StateTaxConfig {
        &self.config
    }

    fn subtractions(
        &self,
        ctx: &StateContext<'_>,
    ) -> Vec<StateAdjustment> {
        let mut subtractions = default_subtractions(&self.config, ctx);
        let taxable_benefits = ctx.federal.income.social_security.taxable_benefits;
        if taxable_benefits > Decimal::ZERO
            && ctx.tax_return.taxpayer.primary.age >= FULL_SOCIAL_SECURITY_AGE
        {
            subtractions.push(StateAdjustment::new(
                "social security benefits",
                taxable_benefits,
            ));
        }
        subtractions
    }

    /// The federal deduction is already out of federal taxable income.
    fn deduction(
        &self,
        _ctx: &StateContext<'_>,
        _state_agi: Decimal,
    ) -> Decimal {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{FilingStatus, Form1099R, IncomeSource, SocialSecurityBenefits};
    use crate::state::states::test_support::{federal, senior, single_wages, tax_return, wages};

    #[test]
    fn starts_from_federal_taxable_income() {
        let tax_return = single_wages(dec!(75000));
        let federal = federal(&tax_return);
        let calculator = ColoradoCalculator::new(config_2025());

        let result = calculator
            .calculate(&StateContext::new(&tax_return, &federal))
            .unwrap();

        assert_eq!(result.starting_income, dec!(60000.00));
        assert_eq!(result.taxable_income, dec!(60000.00));
        assert_eq!(result.tax, dec!(2640.00));
    }

    #[test]
    fn retiree_subtracts_pension_and_social_security() {
        let mut tax_return = tax_return(
            FilingStatus::Single,
            vec![
                wages(dec!(30000)),
                IncomeSource::RetirementDistribution(Form1099R {
                    payer: "Pension".to_string(),
                    gross_distribution: dec!(40000),
                    ..Form1099R::default()
                }),
                IncomeSource::SocialSecurity(SocialSecurityBenefits {
                    net_benefits: dec!(24000),
                    ..SocialSecurityBenefits::default()
                }),
            ],
        );
        tax_return.taxpayer.primary = senior();
        let federal = federal(&tax_return);
        let calculator = ColoradoCalculator::new(config_2025());

        let result = calculator
            .calculate(&StateContext::new(&tax_return, &federal))
            .unwrap();

        let labels: Vec<_> = result.subtractions.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["retirement income", "social security benefits"]);
        assert_eq!(result.subtractions[0].amount, dec!(24000.00));
        assert_eq!(
            result.subtractions[1].amount,
            federal.income.social_security.taxable_benefits
        );
    }
}
