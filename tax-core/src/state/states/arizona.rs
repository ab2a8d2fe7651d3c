//! Arizona: 2.5% flat tax with the federal standard deduction amounts, an
//! exemption for filers 65 and older, and the dependent tax credit.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::calculations::common::{money, non_negative, stepped_reduction};
use crate::models::{ByFilingStatus, FilingStatus};
use crate::state::calculator::{StateCalculator, StateContext};
use crate::state::config::{StateCredit, StateTaxConfig};

const AGE_EXEMPTION: Decimal = dec!(2100);
const YOUNG_DEPENDENT_CREDIT: Decimal = dec!(100);
const OTHER_DEPENDENT_CREDIT: Decimal = dec!(25);
const YOUNG_DEPENDENT_AGE: u32 = 17;
/// The dependent credit drops 5% for each $1,000 of AGI over the
/// threshold.
const CREDIT_REDUCTION_STEP: Decimal = dec!(1000);
const CREDIT_REDUCTION_PER_STEP: Decimal = dec!(0.05);

pub fn config_2025() -> StateTaxConfig {
    StateTaxConfig {
        standard_deduction: ByFilingStatus::new(
            dec!(15000),
            dec!(30000),
            dec!(15000),
            dec!(22500),
            dec!(30000),
        ),
        ..StateTaxConfig::flat("AZ", 2025, dec!(0.025))
    }
}

fn credit_reduction_start(status: FilingStatus) -> Decimal {
    *ByFilingStatus::joint_and_other(dec!(400000), dec!(200000)).get(status)
}

#[derive(Debug, Clone)]
pub struct ArizonaCalculator {
    config: StateTaxConfig,
}

impl ArizonaCalculator {
    pub fn new(config: StateTaxConfig) -> Self {
        Self { config }
    }
}

impl StateCalculator for ArizonaCalculator {
    fn config(&self) -> &StateTaxConfig {
        &self.config
    }

    fn exemptions(
        &self,
        ctx: &StateContext<'_>,
        _state_agi: Decimal,
    ) -> Decimal {
        let seniors = ctx.filers().iter().filter(|(_, p)| p.age >= 65).count();
        AGE_EXEMPTION * Decimal::from(seniors)
    }

    fn credits(
        &self,
        ctx: &StateContext<'_>,
        _state_agi: Decimal,
    ) -> Vec<StateCredit> {
        let dependents = &ctx.tax_return.taxpayer.dependents;
        if dependents.is_empty() {
            return Vec::new();
        }
        let base = dependents
            .iter()
            .map(|d| {
                if d.age < YOUNG_DEPENDENT_AGE {
                    YOUNG_DEPENDENT_CREDIT
                } else {
                    OTHER_DEPENDENT_CREDIT
                }
            })
            .sum::<Decimal>();
        let reduction = stepped_reduction(
            ctx.federal_agi() - credit_reduction_start(ctx.filing_status),
            CREDIT_REDUCTION_STEP,
            CREDIT_REDUCTION_PER_STEP,
        )
        .min(Decimal::ONE);
        vec![StateCredit::nonrefundable(
            "dependent tax credit",
            money(non_negative(base * (Decimal::ONE - reduction))),
        )]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::Dependent;
    use crate::state::states::test_support::{federal, senior, single_wages, tax_return, wages};

    fn kids() -> Vec<Dependent> {
        vec![
            Dependent {
                name: "Ana".to_string(),
                age: 10,
                ..Dependent::default()
            },
            Dependent {
                name: "Ben".to_string(),
                age: 18,
                full_time_student: true,
                ..Dependent::default()
            },
        ]
    }

    #[test]
    fn flat_rate_after_standard_deduction() {
        let tax_return = single_wages(dec!(65000));
        let federal = federal(&tax_return);

        let result = ArizonaCalculator::new(config_2025())
            .calculate(&StateContext::new(&tax_return, &federal))
            .unwrap();

        assert_eq!(result.taxable_income, dec!(50000.00));
        assert_eq!(result.tax, dec!(1250.00));
    }

    #[test]
    fn senior_exemption() {
        let mut tax_return = single_wages(dec!(65000));
        tax_return.taxpayer.primary = senior();
        let federal = federal(&tax_return);

        let result = ArizonaCalculator::new(config_2025())
            .calculate(&StateContext::new(&tax_return, &federal))
            .unwrap();

        assert_eq!(result.exemptions, dec!(2100.00));
    }

    #[test]
    fn dependent_credit_by_age() {
        let mut tax_return = tax_return(FilingStatus::MarriedFilingJointly, vec![wages(dec!(90000))]);
        tax_return.taxpayer.dependents = kids();
        let federal = federal(&tax_return);

        let result = ArizonaCalculator::new(config_2025())
            .calculate(&StateContext::new(&tax_return, &federal))
            .unwrap();

        assert_eq!(result.credits[0].amount, dec!(125.00));
        assert_eq!(result.nonrefundable_credits, dec!(125.00));
    }

    #[test]
    fn dependent_credit_reduced_for_high_income() {
        let mut tax_return = tax_return(FilingStatus::Single, vec![wages(dec!(202500))]);
        tax_return.taxpayer.dependents = kids();
        let federal = federal(&tax_return);

        let result = ArizonaCalculator::new(config_2025())
            .calculate(&StateContext::new(&tax_return, &federal))
            .unwrap();

        // Three steps: 15% off 125.
        assert_eq!(result.credits[0].amount, dec!(106.25));
    }
}
