//! Adoption credit (Form 8839).
//!
//! Qualified expenses per child are capped at the year's dollar limit, less
//! anything already claimed for that child in earlier years. A finalized
//! special-needs adoption gets the full limit regardless of expenses. The
//! current-year credit phases out by MAGI; unused credit from earlier years
//! is added back after the phaseout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CreditContext;
use crate::calculations::common::{money, non_negative};
use crate::models::{AdoptionInfo, CreditBreakdown, CreditKind, PhaseoutRange, UnitBreakdown};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdoptionConfig {
    pub max_credit: Decimal,
    pub phaseout: PhaseoutRange,
}

pub fn calculate(
    ctx: &CreditContext,
    adoptions: &[AdoptionInfo],
    carryforward: Decimal,
    config: &AdoptionConfig,
) -> CreditBreakdown {
    const KIND: CreditKind = CreditKind::Adoption;

    if adoptions.is_empty() && carryforward <= Decimal::ZERO {
        return CreditBreakdown::ineligible(KIND, "no adoptions");
    }
    if ctx.separate_and_living_together() {
        return CreditBreakdown::ineligible(KIND, "married filing separately");
    }

    let mut units = Vec::new();
    let mut current = Decimal::ZERO;
    for adoption in adoptions {
        let label = adoption.child_name.as_str();
        if adoption.foreign_adoption && !adoption.adoption_final {
            units.push(UnitBreakdown::ineligible(label, "foreign adoption not yet final"));
            continue;
        }
        let remaining_limit = non_negative(config.max_credit - adoption.prior_year_expenses_claimed);
        let expenses = if adoption.special_needs && adoption.adoption_final {
            config.max_credit
        } else {
            non_negative(adoption.qualified_expenses - adoption.employer_benefits)
        };
        let credit = expenses.min(remaining_limit);
        if credit <= Decimal::ZERO {
            units.push(UnitBreakdown::ineligible(label, "no expenses remaining under the limit"));
            continue;
        }
        current += credit;
        units.push(UnitBreakdown::eligible(label, money(credit)));
    }

    let after_phaseout = config.phaseout.apply(current, ctx.magi);
    let amount = money(after_phaseout + carryforward);

    debug!(current = %current, carryforward = %carryforward, amount = %amount, "adoption credit");

    let mut breakdown = CreditBreakdown {
        tentative_amount: money(current + carryforward),
        phaseout_reduction: money(current) - after_phaseout,
        amount,
        units,
        ..CreditBreakdown::new(KIND)
    };
    if carryforward > Decimal::ZERO {
        breakdown
            .notes
            .push(format!("includes {carryforward} carried forward"));
    }
    let reason = if current > Decimal::ZERO {
        "income above phaseout range"
    } else {
        "no qualified expenses remaining"
    };
    breakdown.phased_out(reason)
}
