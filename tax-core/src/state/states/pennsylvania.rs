//! Pennsylvania: 3.07% on the sum of the taxable income classes, each
//! floored at zero. Retirement income and social security are not a class
//! and so never taxed. Low-income filers get tax forgiveness.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::calculations::common::{money, non_negative, stepped_reduction, sum};
use crate::models::{ByFilingStatus, FilingStatus};
use crate::state::calculator::{StateCalculator, StateContext};
use crate::state::config::{
    RetirementTreatment, StartingIncome, StateAdjustment, StateCredit, StateTaxConfig,
};

const RATE: Decimal = dec!(0.0307);
const FORGIVENESS_PER_DEPENDENT: Decimal = dec!(9500);
/// Forgiveness drops ten points for each $250 of eligibility income over
/// the threshold.
const FORGIVENESS_STEP: Decimal = dec!(250);
const FORGIVENESS_POINTS_PER_STEP: Decimal = dec!(10);
const MIN_FORGIVENESS_PERCENT: Decimal = dec!(10);

fn forgiveness_threshold(status: FilingStatus) -> Decimal {
    *ByFilingStatus::joint_and_other(dec!(13000), dec!(6500)).get(status)
}

pub fn config(tax_year: i32) -> StateTaxConfig {
    StateTaxConfig {
        starting_income: StartingIncome::IncomeClasses,
        retirement: RetirementTreatment::Exempt,
        ..StateTaxConfig::flat("PA", tax_year, RATE)
    }
}

#[derive(Debug, Clone)]
pub struct PennsylvaniaCalculator {
    config: StateTaxConfig,
}

impl PennsylvaniaCalculator {
    pub fn new(config: StateTaxConfig) -> Self {
        Self { config }
    }

    /// Percentage of tax forgiven for `eligibility_income`.
    pub fn forgiveness_percent(
        status: FilingStatus,
        dependents: usize,
        eligibility_income: Decimal,
    ) -> Decimal {
        let threshold =
            forgiveness_threshold(status) + FORGIVENESS_PER_DEPENDENT * Decimal::from(dependents);
        let percent = Decimal::ONE_HUNDRED
            - stepped_reduction(
                eligibility_income - threshold,
                FORGIVENESS_STEP,
                FORGIVENESS_POINTS_PER_STEP,
            );
        if percent < MIN_FORGIVENESS_PERCENT {
            Decimal::ZERO
        } else {
            percent
        }
    }
}

impl StateCalculator for PennsylvaniaCalculator {
    fn config(&self) -> &StateTaxConfig {
        &self.config
    }

    fn starting_income(
        &self,
        ctx: &StateContext<'_>,
    ) -> Decimal {
        let income = &ctx.tax_return.income;
        let classes = [
            income.wages(),
            income.taxable_interest() - income.us_obligation_interest(),
            income.ordinary_dividends(),
            income.business_income() + income.farm_income(),
            income.short_term_gain() + income.long_term_gain(),
            sum(income.rentals().map(|r| r.net())),
            sum(income.k1s().map(|k| k.business_income() + k.net_rental_income)),
            income.alimony(),
            income.other(),
        ];
        sum(classes.into_iter().map(non_negative))
    }

    fn subtractions(
        &self,
        _ctx: &StateContext<'_>,
    ) -> Vec<StateAdjustment> {
        Vec::new()
    }

    fn credits(
        &self,
        ctx: &StateContext<'_>,
        state_agi: Decimal,
    ) -> Vec<StateCredit> {
        let income = &ctx.tax_return.income;
        let eligibility_income = state_agi + income.tax_exempt_interest() + income.unemployment();
        let percent =
            Self::forgiveness_percent(ctx.filing_status, ctx.dependent_count(), eligibility_income);
        if percent <= Decimal::ZERO {
            return Vec::new();
        }
        let tax = money(state_agi * RATE);
        vec![StateCredit::nonrefundable(
            "tax forgiveness",
            money(tax * percent / Decimal::ONE_HUNDRED),
        )]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{
        CapitalTransaction, Dependent, Form1099R, HoldingPeriod, IncomeSource, SocialSecurityBenefits,
    };
    use crate::state::StateCalculationBreakdown;
    use crate::state::states::test_support::{federal, single_wages, tax_return, wages};

    fn calculate(tax_return: &crate::models::TaxReturn) -> StateCalculationBreakdown {
        let federal = federal(tax_return);
        PennsylvaniaCalculator::new(config(2025))
            .calculate(&StateContext::new(tax_return, &federal))
            .unwrap()
    }

    fn dependent(name: &str) -> Dependent {
        Dependent {
            name: name.to_string(),
            age: 8,
            ..Dependent::default()
        }
    }

    // =========================================================================
    // income class tests
    // =========================================================================

    #[test]
    fn retirement_and_social_security_are_not_taxed() {
        let tax_return = tax_return(
            FilingStatus::Single,
            vec![
                wages(dec!(50000)),
                IncomeSource::RetirementDistribution(Form1099R {
                    payer: "Pension".to_string(),
                    gross_distribution: dec!(30000),
                    ..Form1099R::default()
                }),
                IncomeSource::SocialSecurity(SocialSecurityBenefits {
                    net_benefits: dec!(20000),
                    ..SocialSecurityBenefits::default()
                }),
            ],
        );

        let result = calculate(&tax_return);

        assert_eq!(result.taxable_income, dec!(50000.00));
        assert_eq!(result.tax, dec!(1535.00));
    }

    #[test]
    fn loss_in_one_class_does_not_offset_another() {
        let tax_return = tax_return(
            FilingStatus::Single,
            vec![
                wages(dec!(50000)),
                IncomeSource::CapitalTransaction(CapitalTransaction {
                    description: "Stock".to_string(),
                    proceeds: dec!(5000),
                    cost_basis: dec!(15000),
                    holding_period: HoldingPeriod::LongTerm,
                    wash_sale_loss_disallowed: dec!(0),
                }),
            ],
        );

        let result = calculate(&tax_return);

        assert_eq!(result.state_agi, dec!(50000.00));
    }

    // =========================================================================
    // tax forgiveness tests
    // =========================================================================

    #[test]
    fn forgiveness_percent_steps_down() {
        let percent = |income| {
            PennsylvaniaCalculator::forgiveness_percent(FilingStatus::Single, 1, income)
        };

        assert_eq!(percent(dec!(16000)), dec!(100));
        assert_eq!(percent(dec!(16001)), dec!(90));
        assert_eq!(percent(dec!(16500)), dec!(80));
        assert_eq!(percent(dec!(18250)), dec!(10));
        assert_eq!(percent(dec!(18251)), dec!(0));
    }

    #[test]
    fn full_forgiveness_eliminates_tax() {
        let mut tax_return = single_wages(dec!(16000));
        tax_return.taxpayer.dependents = vec![dependent("Ana")];

        let result = calculate(&tax_return);

        assert_eq!(result.tax, dec!(491.20));
        assert_eq!(result.tax_after_credits, dec!(0.00));
    }

    #[test]
    fn partial_forgiveness() {
        let mut tax_return = single_wages(dec!(16500));
        tax_return.taxpayer.dependents = vec![dependent("Ana")];

        let result = calculate(&tax_return);

        // 506.55 x 80% forgiven
        assert_eq!(result.nonrefundable_credits, dec!(405.24));
        assert_eq!(result.tax_after_credits, dec!(101.31));
    }

    #[test]
    fn no_forgiveness_above_range() {
        let result = calculate(&single_wages(dec!(40000)));

        assert!(result.credits.is_empty());
        assert_eq!(result.tax_after_credits, dec!(1228.00));
    }
}
