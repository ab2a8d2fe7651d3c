//! Child tax credit, credit for other dependents and the additional child
//! tax credit (Schedule 8812).
//!
//! The child and other-dependent amounts share a single phaseout: the
//! combined credit drops by $50 for each $1,000 (or fraction) of modified
//! AGI over the threshold. The reduction is taken from the child tax credit
//! first.
//!
//! The refundable additional credit depends on how much of the combined
//! nonrefundable credit fit within the liability, so the engine calls
//! [`additional_child_tax_credit`] after the ordering pass.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CreditContext;
use crate::calculations::common::{money, non_negative, stepped_reduction};
use crate::models::{ByFilingStatus, CreditBreakdown, CreditKind, UnitBreakdown};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildTaxCreditConfig {
    pub credit_per_child: Decimal,
    pub other_dependent_credit: Decimal,
    /// Refundable ceiling per qualifying child.
    pub refundable_per_child: Decimal,
    /// Qualifying children must be under this age at year end.
    pub child_age_limit: u32,
    pub phaseout_threshold: ByFilingStatus<Decimal>,
    pub phaseout_step: Decimal,
    pub phaseout_per_step: Decimal,
    /// Earned income above this floor drives the refundable amount.
    pub earned_income_threshold: Decimal,
    pub refundable_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildTaxCredits {
    pub child_tax: CreditBreakdown,
    pub other_dependents: CreditBreakdown,
    pub qualifying_children: usize,
}

pub fn calculate(
    ctx: &CreditContext,
    config: &ChildTaxCreditConfig,
) -> ChildTaxCredits {
    let mut child_units = Vec::new();
    let mut other_units = Vec::new();

    for d in ctx.dependents.iter().filter(|d| d.is_dependent()) {
        let child_reason = if !d.is_qualifying_child() {
            Some("not a qualifying child")
        } else if d.dependent.age >= config.child_age_limit {
            Some("age limit reached")
        } else if !d.dependent.has_valid_ssn {
            Some("no SSN valid for employment")
        } else {
            None
        };
        match child_reason {
            None => child_units.push(UnitBreakdown::eligible(d.name(), config.credit_per_child)),
            Some(reason) => {
                child_units.push(UnitBreakdown::ineligible(d.name(), reason));
                other_units.push(UnitBreakdown::eligible(
                    d.name(),
                    config.other_dependent_credit,
                ));
            }
        }
    }

    let qualifying_children = child_units.iter().filter(|u| u.eligible).count();
    let other_count = other_units.len();
    let child_tentative = config.credit_per_child * Decimal::from(qualifying_children);
    let other_tentative = config.other_dependent_credit * Decimal::from(other_count);

    let threshold = *config.phaseout_threshold.get(ctx.filing_status);
    let reduction = stepped_reduction(
        ctx.magi - threshold,
        config.phaseout_step,
        config.phaseout_per_step,
    );
    let child_reduction = reduction.min(child_tentative);
    let other_reduction = (reduction - child_reduction).min(other_tentative);

    debug!(
        children = qualifying_children,
        others = other_count,
        reduction = %reduction,
        "child tax credit"
    );

    let child_tax = breakdown(
        CreditKind::ChildTax,
        child_tentative,
        child_reduction,
        child_units,
        "no qualifying children under the age limit",
    );
    let other_dependents = breakdown(
        CreditKind::OtherDependents,
        other_tentative,
        other_reduction,
        other_units,
        "no other dependents",
    );

    ChildTaxCredits {
        child_tax,
        other_dependents,
        qualifying_children,
    }
}

fn breakdown(
    kind: CreditKind,
    tentative: Decimal,
    reduction: Decimal,
    units: Vec<UnitBreakdown>,
    empty_reason: &str,
) -> CreditBreakdown {
    if units.iter().all(|u| !u.eligible) {
        return CreditBreakdown {
            units,
            ..CreditBreakdown::ineligible(kind, empty_reason)
        };
    }
    CreditBreakdown {
        tentative_amount: money(tentative),
        phaseout_reduction: money(reduction),
        amount: money(tentative - reduction),
        units,
        ..CreditBreakdown::new(kind)
    }
    .phased_out("income above phaseout range")
}

/// Refundable portion of the child tax credit.
///
/// `unused` is the combined child and other-dependent credit that did not
/// fit within the liability.
pub fn additional_child_tax_credit(
    credits: &ChildTaxCredits,
    unused: Decimal,
    earned_income: Decimal,
    config: &ChildTaxCreditConfig,
) -> CreditBreakdown {
    const KIND: CreditKind = CreditKind::AdditionalChildTax;

    if credits.qualifying_children == 0 {
        return CreditBreakdown::ineligible(KIND, "no qualifying children");
    }

    let per_child_cap = config.refundable_per_child * Decimal::from(credits.qualifying_children);
    let earned_income_limit =
        non_negative(earned_income - config.earned_income_threshold) * config.refundable_rate;
    let amount = money(
        non_negative(unused)
            .min(per_child_cap)
            .min(earned_income_limit)
            .min(credits.child_tax.amount),
    );

    CreditBreakdown {
        tentative_amount: money(non_negative(unused)),
        amount,
        refundable_amount: amount,
        ..CreditBreakdown::new(KIND)
    }
}
