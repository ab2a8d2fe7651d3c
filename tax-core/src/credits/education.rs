//! American opportunity and lifetime learning credits (Form 8863).
//!
//! Each student goes to the American opportunity credit when they pass its
//! tests and the filer has not elected otherwise; everyone else with net
//! expenses falls to the lifetime learning credit. Both credits share the
//! same MAGI phaseout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CreditContext;
use crate::calculations::common::{money, non_negative};
use crate::models::{ByFilingStatus, CreditBreakdown, CreditKind, PhaseoutRange, Student, UnitBreakdown};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationConfig {
    /// Expenses credited at 100%.
    pub aotc_first_tier: Decimal,
    /// Further expenses credited at `aotc_second_tier_rate`.
    pub aotc_second_tier: Decimal,
    pub aotc_second_tier_rate: Decimal,
    pub aotc_refundable_rate: Decimal,
    pub aotc_max_years: u8,
    pub llc_rate: Decimal,
    pub llc_expense_limit: Decimal,
    pub phaseout: ByFilingStatus<PhaseoutRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationCredits {
    pub american_opportunity: CreditBreakdown,
    pub lifetime_learning: CreditBreakdown,
}

pub fn calculate(
    ctx: &CreditContext,
    students: &[Student],
    config: &EducationConfig,
) -> EducationCredits {
    let barred = if students.is_empty() {
        Some("no eligible students")
    } else if ctx.filing_status.is_married_separate() {
        Some("married filing separately")
    } else if ctx.primary.can_be_claimed_as_dependent {
        Some("filer can be claimed as a dependent")
    } else {
        None
    };
    if let Some(reason) = barred {
        return EducationCredits {
            american_opportunity: CreditBreakdown::ineligible(CreditKind::AmericanOpportunity, reason),
            lifetime_learning: CreditBreakdown::ineligible(CreditKind::LifetimeLearning, reason),
        };
    }

    let mut aotc_units = Vec::new();
    let mut llc_units = Vec::new();
    let mut aotc_total = Decimal::ZERO;
    let mut llc_expenses = Decimal::ZERO;

    for student in students {
        let net = student.net_expenses();
        if net <= Decimal::ZERO {
            aotc_units.push(UnitBreakdown::ineligible(&student.name, "no net qualified expenses"));
            continue;
        }
        match aotc_failure(student, config) {
            None => {
                let credit = aotc_for(net, config);
                aotc_total += credit;
                aotc_units.push(UnitBreakdown::eligible(&student.name, money(credit)));
            }
            Some(reason) => {
                aotc_units.push(UnitBreakdown::ineligible(&student.name, reason));
                llc_expenses += net;
                llc_units.push(UnitBreakdown::eligible(&student.name, money(net)));
            }
        }
    }

    let phaseout = config.phaseout.get(ctx.filing_status);
    let llc_tentative = llc_expenses.min(config.llc_expense_limit) * config.llc_rate;

    let american_opportunity = {
        let amount = phaseout.apply(aotc_total, ctx.magi);
        let refundable = money(amount * config.aotc_refundable_rate);
        finish(
            CreditKind::AmericanOpportunity,
            aotc_total,
            amount,
            refundable,
            aotc_units,
        )
    };
    let lifetime_learning = {
        let amount = phaseout.apply(llc_tentative, ctx.magi);
        finish(
            CreditKind::LifetimeLearning,
            llc_tentative,
            amount,
            Decimal::ZERO,
            llc_units,
        )
    };

    debug!(
        aotc = %american_opportunity.amount,
        llc = %lifetime_learning.amount,
        "education credits"
    );

    EducationCredits {
        american_opportunity,
        lifetime_learning,
    }
}

fn aotc_failure(
    student: &Student,
    config: &EducationConfig,
) -> Option<&'static str> {
    if student.elect_lifetime_learning {
        Some("lifetime learning credit elected")
    } else if !student.half_time_student {
        Some("not enrolled at least half time")
    } else if student.completed_first_four_years {
        Some("completed first four years of postsecondary education")
    } else if student.prior_aotc_years >= config.aotc_max_years {
        Some("credit already claimed for the maximum number of years")
    } else if student.felony_drug_conviction {
        Some("felony drug conviction")
    } else {
        None
    }
}

fn aotc_for(
    net_expenses: Decimal,
    config: &EducationConfig,
) -> Decimal {
    let first = net_expenses.min(config.aotc_first_tier);
    let second = non_negative(net_expenses - config.aotc_first_tier).min(config.aotc_second_tier);
    first + second * config.aotc_second_tier_rate
}

fn finish(
    kind: CreditKind,
    tentative: Decimal,
    amount: Decimal,
    refundable: Decimal,
    units: Vec<UnitBreakdown>,
) -> CreditBreakdown {
    if !units.iter().any(|u| u.eligible) {
        return CreditBreakdown {
            units,
            ..CreditBreakdown::ineligible(kind, "no eligible students")
        };
    }
    CreditBreakdown {
        tentative_amount: money(tentative),
        phaseout_reduction: money(tentative) - amount,
        amount,
        refundable_amount: refundable,
        units,
        ..CreditBreakdown::new(kind)
    }
    .phased_out("income above phaseout range")
}
