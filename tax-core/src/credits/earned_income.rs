//! Earned income credit (Schedule EIC).
//!
//! The credit phases in as a percentage of earned income up to the maximum,
//! then phases out as a percentage of the greater of AGI or earned income
//! above the threshold. Amounts are computed by formula rather than from the
//! $50-wide EIC table, so results can differ from the table by a few dollars.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CreditContext;
use crate::calculations::common::{money, non_negative};
use crate::models::{CreditBreakdown, CreditKind, UnitBreakdown};

/// Parameters for one qualifying-child count (0, 1, 2, 3+).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EitcTier {
    pub max_credit: Decimal,
    /// Earned income at which the maximum is reached.
    pub earned_income_amount: Decimal,
    pub phase_in_rate: Decimal,
    pub phaseout_rate: Decimal,
    pub phaseout_start: Decimal,
    pub phaseout_start_joint: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EitcConfig {
    /// Indexed by number of qualifying children, the last tier covering
    /// three or more.
    pub tiers: Vec<EitcTier>,
    pub investment_income_limit: Decimal,
    /// Filers without a qualifying child must be at least this age...
    pub min_age_without_child: u32,
    /// ...and younger than this one.
    pub max_age_without_child: u32,
}

pub fn calculate(
    ctx: &CreditContext,
    config: &EitcConfig,
) -> CreditBreakdown {
    const KIND: CreditKind = CreditKind::EarnedIncome;

    let mut units = Vec::new();
    let mut children = 0usize;
    for d in ctx.dependents.iter().filter(|d| d.is_qualifying_child()) {
        if d.dependent.has_valid_ssn {
            children += 1;
            units.push(UnitBreakdown::eligible(d.name(), Decimal::ZERO));
        } else {
            units.push(UnitBreakdown::ineligible(
                d.name(),
                "no SSN valid for employment",
            ));
        }
    }

    // Separated spouses with a qualifying child may claim the credit on a
    // separate return.
    if ctx.filing_status.is_married_separate() && (ctx.lived_with_spouse || children == 0) {
        return CreditBreakdown::ineligible(KIND, "married filing separately");
    }
    if ctx.investment_income > config.investment_income_limit {
        return CreditBreakdown::ineligible(
            KIND,
            format!(
                "investment income {} exceeds {}",
                ctx.investment_income, config.investment_income_limit
            ),
        );
    }
    if ctx.earned_income <= Decimal::ZERO {
        return CreditBreakdown::ineligible(KIND, "no earned income");
    }
    if children == 0 {
        if let Some(reason) = childless_failure(ctx, config) {
            return CreditBreakdown::ineligible(KIND, reason);
        }
    }

    let Some(tier) = config
        .tiers
        .get(children.min(config.tiers.len().saturating_sub(1)))
    else {
        return CreditBreakdown::ineligible(KIND, "no credit table configured");
    };

    let tentative = (ctx.earned_income.min(tier.earned_income_amount) * tier.phase_in_rate)
        .min(tier.max_credit);

    let start = if ctx.filing_status.is_joint() {
        tier.phaseout_start_joint
    } else {
        tier.phaseout_start
    };
    let phaseout_income = ctx.agi.max(ctx.earned_income);
    let reduction = non_negative(phaseout_income - start) * tier.phaseout_rate;
    let amount = money(non_negative(tentative - reduction));

    debug!(children, earned = %ctx.earned_income, amount = %amount, "earned income credit");

    CreditBreakdown {
        tentative_amount: money(tentative),
        phaseout_reduction: money(tentative) - amount,
        amount,
        refundable_amount: amount,
        units,
        ..CreditBreakdown::new(KIND)
    }
    .phased_out(format!("income {phaseout_income} above phaseout range"))
}

fn childless_failure(
    ctx: &CreditContext,
    config: &EitcConfig,
) -> Option<String> {
    let in_age_range = |age: u32| {
        age >= config.min_age_without_child && age < config.max_age_without_child
    };
    let age_ok = ctx.filers().iter().any(|(_, p)| in_age_range(p.age));
    if !age_ok {
        return Some(format!(
            "no qualifying child and no filer aged {} to {}",
            config.min_age_without_child,
            config.max_age_without_child - 1
        ));
    }
    if ctx.primary.can_be_claimed_as_dependent {
        return Some("filer can be claimed as a dependent".to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::credits::test_support::{child, context};
    use crate::models::FilingStatus;

    fn config() -> EitcConfig {
        let tier = |max, earned, phase_in, phaseout, start, joint| EitcTier {
            max_credit: max,
            earned_income_amount: earned,
            phase_in_rate: phase_in,
            phaseout_rate: phaseout,
            phaseout_start: start,
            phaseout_start_joint: joint,
        };
        EitcConfig {
            tiers: vec![
                tier(dec!(649), dec!(8490), dec!(0.0765), dec!(0.0765), dec!(10620), dec!(17730)),
                tier(dec!(4328), dec!(12730), dec!(0.34), dec!(0.1598), dec!(23350), dec!(30470)),
                tier(dec!(7152), dec!(17880), dec!(0.40), dec!(0.2106), dec!(23350), dec!(30470)),
                tier(dec!(8046), dec!(17880), dec!(0.45), dec!(0.2106), dec!(23350), dec!(30470)),
            ],
            investment_income_limit: dec!(11950),
            min_age_without_child: 25,
            max_age_without_child: 65,
        }
    }

    #[test]
    fn phase_in_with_one_child() {
        let mut ctx = context(FilingStatus::HeadOfHousehold, dec!(10000));
        ctx.dependents.push(child("Ada", 4));

        let result = calculate(&ctx, &config());

        assert_eq!(result.amount, dec!(3400.00));
        assert_eq!(result.refundable_amount, dec!(3400.00));
    }

    #[test]
    fn plateau_pays_maximum() {
        let mut ctx = context(FilingStatus::HeadOfHousehold, dec!(20000));
        ctx.dependents.push(child("Ada", 4));
        ctx.dependents.push(child("Ben", 6));

        let result = calculate(&ctx, &config());

        assert_eq!(result.amount, dec!(7152.00));
    }

    #[test]
    fn phaseout_uses_greater_of_agi_or_earned_income() {
        let mut ctx = context(FilingStatus::HeadOfHousehold, dec!(33350));
        ctx.dependents.push(child("Ada", 4));

        let result = calculate(&ctx, &config());

        // 4,328 − 10,000 × 15.98%
        assert_eq!(result.amount, dec!(2730.00));
        assert_eq!(result.phaseout_reduction, dec!(1598.00));
    }

    #[test]
    fn fully_phased_out_credit_gives_a_reason() {
        let mut ctx = context(FilingStatus::HeadOfHousehold, dec!(51000));
        ctx.dependents.push(child("Ada", 4));

        let result = calculate(&ctx, &config());

        assert_eq!(result.amount, dec!(0.00));
        assert_eq!(result.phaseout_reduction, dec!(4328.00));
        assert!(!result.eligible);
        assert_eq!(
            result.disqualification_reason.as_deref(),
            Some("income 51000 above phaseout range")
        );
    }

    #[test]
    fn joint_filers_get_higher_phaseout_start() {
        let mut ctx = context(FilingStatus::MarriedFilingJointly, dec!(30470));
        ctx.dependents.push(child("Ada", 4));

        let result = calculate(&ctx, &config());

        assert_eq!(result.amount, dec!(4328.00));
    }

    #[test]
    fn three_or_more_children_use_top_tier() {
        let mut ctx = context(FilingStatus::HeadOfHousehold, dec!(18000));
        for (name, age) in [("A", 1), ("B", 3), ("C", 5), ("D", 7)] {
            ctx.dependents.push(child(name, age));
        }

        let result = calculate(&ctx, &config());

        assert_eq!(result.amount, dec!(8046.00));
    }

    #[test]
    fn childless_filer_under_25_is_ineligible() {
        let mut ctx = context(FilingStatus::Single, dec!(9000));
        ctx.primary.age = 22;

        let result = calculate(&ctx, &config());

        assert!(!result.eligible);
        assert!(result.disqualification_reason.is_some());
        assert_eq!(result.amount, dec!(0));
    }

    #[test]
    fn childless_filer_in_age_range_gets_small_credit() {
        let ctx = context(FilingStatus::Single, dec!(9000));

        let result = calculate(&ctx, &config());

        assert_eq!(result.amount, dec!(649.00));
    }

    #[test]
    fn excess_investment_income_disqualifies() {
        let mut ctx = context(FilingStatus::Single, dec!(9000));
        ctx.investment_income = dec!(12000);

        let result = calculate(&ctx, &config());

        assert!(!result.eligible);
    }

    #[test]
    fn child_without_ssn_does_not_count() {
        let mut ctx = context(FilingStatus::HeadOfHousehold, dec!(10000));
        let mut no_ssn = child("Ada", 4);
        no_ssn.dependent.has_valid_ssn = false;
        ctx.dependents.push(no_ssn);

        let result = calculate(&ctx, &config());

        // Falls back to the no-child tier: 10,000 income is still below its phaseout.
        assert_eq!(result.amount, dec!(649.00));
        assert!(!result.units[0].eligible);
    }

    #[test]
    fn separate_filer_living_with_spouse_is_ineligible() {
        let mut ctx = context(FilingStatus::MarriedFilingSeparately, dec!(10000));
        ctx.dependents.push(child("Ada", 4));

        let result = calculate(&ctx, &config());

        assert_eq!(
            result.disqualification_reason.as_deref(),
            Some("married filing separately")
        );
    }
}
