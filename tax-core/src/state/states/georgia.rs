//! Georgia: flat tax on federal AGI with a retirement exclusion by age.

use rust_decimal_macros::dec;

use crate::models::ByFilingStatus;
use crate::state::config::{AgeExclusion, RetirementTreatment, StateTaxConfig};

pub fn config_2025() -> StateTaxConfig {
    StateTaxConfig {
        standard_deduction: ByFilingStatus::joint_and_other(dec!(24000), dec!(12000)),
        dependent_exemption: dec!(4000),
        retirement: RetirementTreatment::AgeExclusion(vec![
            AgeExclusion {
                min_age: 62,
                amount: dec!(35000),
            },
            AgeExclusion {
                min_age: 65,
                amount: dec!(65000),
            },
        ]),
        ..StateTaxConfig::flat("GA", 2025, dec!(0.0519))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{Dependent, FilingStatus, Form1099R, IncomeSource};
    use crate::state::calculator::{StateCalculator, StateContext};
    use crate::state::states::StandardCalculator;
    use crate::state::states::test_support::{federal, senior, tax_return, wages};

    #[test]
    fn deduction_and_dependent_exemption() {
        let mut tax_return = tax_return(FilingStatus::MarriedFilingJointly, vec![wages(dec!(80000))]);
        tax_return.taxpayer.dependents = vec![Dependent {
            name: "Ana".to_string(),
            age: 6,
            ..Dependent::default()
        }];
        let federal = federal(&tax_return);

        let result = StandardCalculator::new(config_2025())
            .calculate(&StateContext::new(&tax_return, &federal))
            .unwrap();

        // 80,000 - 24,000 - 4,000
        assert_eq!(result.taxable_income, dec!(52000.00));
        assert_eq!(result.tax, dec!(2698.80));
    }

    #[test]
    fn retirement_exclusion_capped_by_age() {
        let mut tax_return = tax_return(
            FilingStatus::Single,
            vec![IncomeSource::RetirementDistribution(Form1099R {
                payer: "IRA".to_string(),
                gross_distribution: dec!(90000),
                ..Form1099R::default()
            })],
        );
        tax_return.taxpayer.primary = senior();
        let federal = federal(&tax_return);

        let result = StandardCalculator::new(config_2025())
            .calculate(&StateContext::new(&tax_return, &federal))
            .unwrap();

        assert_eq!(result.subtractions[0].amount, dec!(65000.00));
        assert_eq!(result.state_agi, dec!(25000.00));
    }
}
