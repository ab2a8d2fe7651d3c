//! Credit for the elderly or the disabled (Schedule R).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CreditContext;
use crate::calculations::common::{money, non_negative};
use crate::models::{
    ByFilingStatus, CreditBreakdown, CreditKind, ElderlyDisabledInfo, FilingStatus, Owner,
    UnitBreakdown,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElderlyDisabledConfig {
    pub qualifying_age: u32,
    /// Initial amount with one qualifying filer.
    pub initial_amount: Decimal,
    /// Initial amount on a joint return where both spouses qualify.
    pub initial_amount_both: Decimal,
    pub initial_amount_separate: Decimal,
    pub agi_threshold: ByFilingStatus<Decimal>,
    pub agi_reduction_rate: Decimal,
    pub credit_rate: Decimal,
}

pub fn calculate(
    ctx: &CreditContext,
    info: &ElderlyDisabledInfo,
    config: &ElderlyDisabledConfig,
) -> CreditBreakdown {
    const KIND: CreditKind = CreditKind::ElderlyDisabled;

    if ctx.separate_and_living_together() {
        return CreditBreakdown::ineligible(KIND, "married filing separately and lived with spouse");
    }

    let mut units = Vec::new();
    // (owner, under the qualifying age)
    let mut qualifying = Vec::new();
    for (owner, person) in ctx.filers() {
        let label = format!("{owner:?}").to_lowercase();
        if person.age >= config.qualifying_age {
            qualifying.push((owner, false));
        } else if person.disabled {
            qualifying.push((owner, true));
        } else {
            units.push(UnitBreakdown::ineligible(label, "under the age limit and not disabled"));
        }
    }
    if qualifying.is_empty() {
        return CreditBreakdown {
            units,
            ..CreditBreakdown::ineligible(KIND, "no qualifying filer")
        };
    }

    let initial = match ctx.filing_status {
        FilingStatus::MarriedFilingSeparately => config.initial_amount_separate,
        FilingStatus::MarriedFilingJointly if qualifying.len() == 2 => config.initial_amount_both,
        _ => config.initial_amount,
    };

    // Each qualifying filer's share; a disabled filer under the age limit
    // is held to their taxable disability income.
    let share = initial / Decimal::from(qualifying.len());
    let mut base = Decimal::ZERO;
    for (owner, under_age) in qualifying {
        let label = format!("{owner:?}").to_lowercase();
        let amount = if under_age {
            let disability_income = match owner {
                Owner::Primary => info.primary_disability_income,
                Owner::Spouse => info.spouse_disability_income,
            };
            share.min(disability_income)
        } else {
            share
        };
        base += amount;
        units.push(UnitBreakdown::eligible(label, money(amount)));
    }

    let threshold = *config.agi_threshold.get(ctx.filing_status);
    let agi_reduction = non_negative(ctx.agi - threshold) * config.agi_reduction_rate;
    let reduced = non_negative(base - info.nontaxable_pensions - agi_reduction);
    let amount = money(reduced * config.credit_rate);

    debug!(base = %base, reduced = %reduced, amount = %amount, "elderly or disabled credit");

    CreditBreakdown {
        tentative_amount: money(base * config.credit_rate),
        phaseout_reduction: money(base * config.credit_rate) - amount,
        amount,
        units,
        ..CreditBreakdown::new(KIND)
    }
    .phased_out("base amount reduced to zero")
}
