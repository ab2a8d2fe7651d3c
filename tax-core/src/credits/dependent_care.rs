//! Child and dependent care credit (Form 2441).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CreditContext;
use crate::calculations::common::{money, non_negative, stepped_reduction};
use crate::models::{CreditBreakdown, CreditKind, DependentCare, Owner, UnitBreakdown};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentCareConfig {
    pub expense_limit_one: Decimal,
    pub expense_limit_two_or_more: Decimal,
    pub max_rate: Decimal,
    pub min_rate: Decimal,
    /// AGI above which the rate starts dropping.
    pub rate_reduction_start: Decimal,
    /// One step of rate reduction per this much AGI (or fraction).
    pub rate_reduction_step: Decimal,
    pub rate_reduction_per_step: Decimal,
    /// Qualifying persons must be under this age unless disabled.
    pub age_limit: u32,
    /// Monthly income deemed for a spouse who is a student or disabled,
    /// with one qualifying person and with two or more.
    pub deemed_monthly_income_one: Decimal,
    pub deemed_monthly_income_two_or_more: Decimal,
}

pub fn calculate(
    ctx: &CreditContext,
    care: &DependentCare,
    config: &DependentCareConfig,
) -> CreditBreakdown {
    const KIND: CreditKind = CreditKind::DependentCare;

    if care.expenses.is_empty() {
        return CreditBreakdown::ineligible(KIND, "no care expenses");
    }
    if ctx.separate_and_living_together() {
        return CreditBreakdown::ineligible(KIND, "married filing separately");
    }

    let mut units: Vec<UnitBreakdown> = Vec::new();
    let mut qualifying_expenses = Decimal::ZERO;
    let mut qualifying_people: Vec<&str> = Vec::new();

    for expense in &care.expenses {
        let name = expense.qualifying_person.as_str();
        let reason = match ctx.find_dependent(name) {
            None => Some("not a dependent on this return"),
            Some(d) if d.dependent.age >= config.age_limit && !d.dependent.permanently_disabled => {
                Some("over the age limit and not disabled")
            }
            Some(_) => None,
        };
        match reason {
            None => {
                qualifying_expenses += expense.amount;
                if !qualifying_people.contains(&name) {
                    qualifying_people.push(name);
                }
                match units.iter_mut().find(|u| u.label == name) {
                    Some(unit) => unit.amount += expense.amount,
                    None => units.push(UnitBreakdown::eligible(name, expense.amount)),
                }
            }
            Some(reason) => {
                if !units.iter().any(|u| u.label == name) {
                    units.push(UnitBreakdown::ineligible(name, reason));
                }
            }
        }
    }

    if qualifying_people.is_empty() {
        return CreditBreakdown {
            units,
            ..CreditBreakdown::ineligible(KIND, "no qualifying persons")
        };
    }

    let two_or_more = qualifying_people.len() >= 2;
    let limit = if two_or_more {
        config.expense_limit_two_or_more
    } else {
        config.expense_limit_one
    };
    let earned_limit = lower_earned_income(ctx, config, two_or_more);
    let allowed_expenses = qualifying_expenses
        .min(non_negative(limit - care.employer_benefits))
        .min(earned_limit);

    let rate = credit_rate(ctx.agi, config);
    let amount = money(allowed_expenses * rate);

    debug!(expenses = %allowed_expenses, rate = %rate, amount = %amount, "dependent care credit");

    let mut breakdown = CreditBreakdown {
        tentative_amount: money(qualifying_expenses.min(limit) * config.max_rate),
        amount,
        units,
        ..CreditBreakdown::new(KIND)
    };
    breakdown.phaseout_reduction = non_negative(breakdown.tentative_amount - amount);
    breakdown.note(format!("credit rate {rate}"))
}

/// Expenses cannot exceed the earned income of either spouse.
fn lower_earned_income(
    ctx: &CreditContext,
    config: &DependentCareConfig,
    two_or_more: bool,
) -> Decimal {
    let deemed = if two_or_more {
        config.deemed_monthly_income_two_or_more
    } else {
        config.deemed_monthly_income_one
    } * Decimal::from(12);

    ctx.filers()
        .into_iter()
        .map(|(owner, person)| {
            let earned = ctx.earned_income_of(owner);
            if owner == Owner::Spouse && (person.full_time_student || person.disabled) {
                earned.max(deemed)
            } else {
                earned
            }
        })
        .fold(Decimal::MAX, Decimal::min)
}

fn credit_rate(
    agi: Decimal,
    config: &DependentCareConfig,
) -> Decimal {
    let reduction = stepped_reduction(
        agi - config.rate_reduction_start,
        config.rate_reduction_step,
        config.rate_reduction_per_step,
    );
    (config.max_rate - reduction).max(config.min_rate)
}
