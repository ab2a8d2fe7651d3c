//! Standard and itemized deductions.
//!
//! The larger of the two is used unless the filer elects to itemize. A
//! separate filer whose spouse itemizes gets a zero standard deduction and
//! so always itemizes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{money, non_negative};
use crate::models::{
    ByFilingStatus, DeductionBreakdown, FilingStatus, ItemizedBreakdown, ItemizedDeductions,
    Person,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardDeductionConfig {
    pub base: ByFilingStatus<Decimal>,
    /// Per condition (65 or older, blind) for married filers and surviving
    /// spouses.
    pub additional_married: Decimal,
    /// Per condition for single and head of household filers.
    pub additional_unmarried: Decimal,
    /// Floor for someone who can be claimed as a dependent.
    pub dependent_minimum: Decimal,
    /// Added to a dependent's earned income before comparing to the floor.
    pub dependent_earned_addition: Decimal,
    pub additional_age: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedConfig {
    /// Medical expenses deductible above this share of AGI.
    pub medical_floor_rate: Decimal,
    pub salt_cap: ByFilingStatus<Decimal>,
    /// Acquisition debt on which interest is fully deductible.
    pub mortgage_debt_limit: ByFilingStatus<Decimal>,
    pub charitable_cash_limit_rate: Decimal,
    pub charitable_noncash_limit_rate: Decimal,
}

/// Facts the standard deduction depends on.
#[derive(Debug, Clone)]
pub struct StandardDeductionInput<'a> {
    pub filing_status: FilingStatus,
    pub primary: &'a Person,
    pub spouse: Option<&'a Person>,
    /// The primary filer's earned income, for the dependent limit.
    pub earned_income: Decimal,
    pub spouse_itemizes: bool,
}

pub fn standard_deduction(
    input: &StandardDeductionInput<'_>,
    config: &StandardDeductionConfig,
) -> Decimal {
    let status = input.filing_status;
    if status.is_married_separate() && input.spouse_itemizes {
        debug!("spouse itemizes; standard deduction is zero");
        return Decimal::ZERO;
    }

    let mut base = *config.base.get(status);
    if input.primary.can_be_claimed_as_dependent {
        let dependent_limit = config
            .dependent_minimum
            .max(input.earned_income + config.dependent_earned_addition);
        base = base.min(dependent_limit);
    }

    let per_condition = if status.uses_married_additional_amount() {
        config.additional_married
    } else {
        config.additional_unmarried
    };
    let conditions = |p: &Person| {
        u32::from(p.age >= config.additional_age) + u32::from(p.blind)
    };
    let mut count = conditions(input.primary);
    if status.is_joint()
        && let Some(spouse) = input.spouse
    {
        count += conditions(spouse);
    }

    money(base + per_condition * Decimal::from(count))
}

/// Schedule A after the AGI floors and caps.
pub fn itemized_deductions(
    items: &ItemizedDeductions,
    agi: Decimal,
    filing_status: FilingStatus,
    net_investment_income: Decimal,
    config: &ItemizedConfig,
) -> ItemizedBreakdown {
    let agi = non_negative(agi);

    let medical = non_negative(items.medical_expenses - agi * config.medical_floor_rate);
    let taxes = items
        .taxes_before_cap()
        .min(*config.salt_cap.get(filing_status));

    let debt_limit = *config.mortgage_debt_limit.get(filing_status);
    let mortgage_interest = if items.mortgage_principal > debt_limit {
        items.mortgage_interest * debt_limit / items.mortgage_principal
    } else {
        items.mortgage_interest
    };
    let investment_interest = items
        .investment_interest
        .min(non_negative(net_investment_income));
    let interest = mortgage_interest + investment_interest;

    let (charitable, charitable_carryforward) = charitable(items, agi, config);

    let total = medical + taxes + interest + charitable + items.casualty_losses + items.other;

    ItemizedBreakdown {
        medical: money(medical),
        taxes: money(taxes),
        interest: money(interest),
        charitable: money(charitable),
        casualty: money(items.casualty_losses),
        other: money(items.other),
        total: money(total),
        charitable_carryforward: money(charitable_carryforward),
    }
}

/// Cash gifts are limited to 60% of AGI and noncash gifts to 30%, within
/// the same overall 60%. Carryovers are used after current-year gifts.
fn charitable(
    items: &ItemizedDeductions,
    agi: Decimal,
    config: &ItemizedConfig,
) -> (Decimal, Decimal) {
    let overall_limit = agi * config.charitable_cash_limit_rate;
    let noncash = items
        .charitable_noncash
        .min(agi * config.charitable_noncash_limit_rate);
    let cash = items
        .charitable_cash
        .min(non_negative(overall_limit - noncash));
    let carryover = items
        .charitable_carryover
        .min(non_negative(overall_limit - noncash - cash));

    let claimed = items.charitable_cash + items.charitable_noncash + items.charitable_carryover;
    let allowed = cash + noncash + carryover;
    (allowed, non_negative(claimed - allowed))
}

/// Picks the larger deduction, or itemized when forced.
pub fn choose_deduction(
    standard: Decimal,
    itemized: ItemizedBreakdown,
    force_itemize: bool,
) -> DeductionBreakdown {
    let used_itemized = force_itemize || itemized.total > standard;
    let amount = if used_itemized {
        itemized.total
    } else {
        standard
    };
    debug!(
        standard = %standard,
        itemized = %itemized.total,
        used_itemized,
        "deduction chosen"
    );
    DeductionBreakdown {
        standard,
        itemized,
        used_itemized,
        amount,
    }
}
