//! Foreign tax credit (Form 1116).
//!
//! A filer whose foreign taxes are all passive-category and under the small
//! amount may skip Form 1116 and take them in full. Otherwise the credit is
//! limited to the share of regular tax attributable to foreign-source
//! income; the excess carries forward.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CreditContext;
use crate::calculations::common::{money, non_negative, sum};
use crate::models::{ByFilingStatus, CreditBreakdown, CreditKind, ForeignTaxInfo, UnitBreakdown};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignTaxConfig {
    /// Passive foreign taxes up to this amount are allowed without the
    /// limitation.
    pub simplified_limit: ByFilingStatus<Decimal>,
}

pub fn calculate(
    ctx: &CreditContext,
    taxes: &[ForeignTaxInfo],
    regular_tax: Decimal,
    taxable_income: Decimal,
    config: &ForeignTaxConfig,
) -> CreditBreakdown {
    const KIND: CreditKind = CreditKind::ForeignTax;

    let paid = sum(taxes.iter().map(|t| t.foreign_tax_paid));
    if paid <= Decimal::ZERO {
        return CreditBreakdown::ineligible(KIND, "no foreign taxes paid");
    }

    let units = taxes
        .iter()
        .map(|t| UnitBreakdown::eligible(&t.country, money(t.foreign_tax_paid)))
        .collect();

    let all_passive = taxes.iter().all(|t| t.passive_category);
    let simplified = all_passive && paid <= *config.simplified_limit.get(ctx.filing_status);

    let limit = if simplified {
        paid
    } else if taxable_income <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        let foreign_income = non_negative(sum(taxes.iter().map(|t| t.foreign_source_income)));
        regular_tax * (foreign_income / taxable_income).min(Decimal::ONE)
    };
    let amount = money(paid.min(limit));
    let carryforward = money(paid) - amount;

    debug!(paid = %paid, limit = %limit, amount = %amount, simplified, "foreign tax credit");

    let breakdown = CreditBreakdown {
        tentative_amount: money(paid),
        phaseout_reduction: carryforward,
        amount,
        carryforward,
        units,
        ..CreditBreakdown::new(KIND)
    };
    if simplified {
        breakdown.note("limitation waived for small passive foreign taxes")
    } else {
        breakdown
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::credits::test_support::context;
    use crate::models::FilingStatus;

    fn config() -> ForeignTaxConfig {
        ForeignTaxConfig {
            simplified_limit: ByFilingStatus::joint_and_other(dec!(600), dec!(300)),
        }
    }

    fn tax(
        paid: Decimal,
        income: Decimal,
        passive: bool,
    ) -> ForeignTaxInfo {
        ForeignTaxInfo {
            country: "CA".to_string(),
            foreign_source_income: income,
            foreign_tax_paid: paid,
            passive_category: passive,
        }
    }

    #[test]
    fn small_passive_taxes_are_allowed_in_full() {
        let ctx = context(FilingStatus::Single, dec!(80000));

        let result = calculate(&ctx, &[tax(dec!(250), dec!(1000), true)], dec!(9000), dec!(65000), &config());

        assert_eq!(result.amount, dec!(250.00));
        assert_eq!(result.carryforward, dec!(0.00));
    }

    #[test]
    fn limitation_applies_above_simplified_amount() {
        let ctx = context(FilingStatus::Single, dec!(80000));

        let result = calculate(&ctx, &[tax(dec!(3000), dec!(10000), false)], dec!(10000), dec!(50000), &config());

        // 10,000 × 10,000 / 50,000
        assert_eq!(result.amount, dec!(2000.00));
        assert_eq!(result.carryforward, dec!(1000.00));
    }

    #[test]
    fn no_taxable_income_means_no_credit() {
        let ctx = context(FilingStatus::Single, dec!(10000));

        let result = calculate(&ctx, &[tax(dec!(1000), dec!(5000), false)], dec!(0), dec!(0), &config());

        assert_eq!(result.amount, dec!(0.00));
        assert_eq!(result.carryforward, dec!(1000.00));
    }
}
