//! Michigan: flat tax on federal AGI less personal and dependent
//! exemptions of the same amount.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::ByFilingStatus;
use crate::state::config::StateTaxConfig;

const EXEMPTION_2025: Decimal = dec!(5800);

pub fn config_2025() -> StateTaxConfig {
    StateTaxConfig {
        personal_exemption: ByFilingStatus::joint_and_other(EXEMPTION_2025 * Decimal::TWO, EXEMPTION_2025),
        dependent_exemption: EXEMPTION_2025,
        eitc_rate: dec!(0.30),
        ..StateTaxConfig::flat("MI", 2025, dec!(0.0425))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{FilingStatus, IncomeSource, SocialSecurityBenefits};
    use crate::state::calculator::{StateCalculator, StateContext};
    use crate::state::states::StandardCalculator;
    use crate::state::states::test_support::{federal, tax_return, wages};

    #[test]
    fn joint_exemptions_and_exempt_social_security() {
        let tax_return = tax_return(
            FilingStatus::MarriedFilingJointly,
            vec![
                wages(dec!(70000)),
                IncomeSource::SocialSecurity(SocialSecurityBenefits {
                    net_benefits: dec!(30000),
                    ..SocialSecurityBenefits::default()
                }),
            ],
        );
        let federal = federal(&tax_return);
        let taxable_benefits = federal.income.social_security.taxable_benefits;

        let result = StandardCalculator::new(config_2025())
            .calculate(&StateContext::new(&tax_return, &federal))
            .unwrap();

        assert!(taxable_benefits > Decimal::ZERO);
        assert_eq!(result.state_agi, dec!(70000.00));
        assert_eq!(result.exemptions, dec!(11600.00));
        // 58,400 x 4.25%
        assert_eq!(result.tax, dec!(2482.00));
    }
}
