//! Premium tax credit (Form 8962).
//!
//! Household income as a percentage of the federal poverty line selects an
//! applicable figure; the filer is expected to contribute that share of
//! income toward the benchmark plan and the credit covers the rest. The
//! result is reconciled against advance payments: a shortfall becomes a
//! refundable net credit, an excess is repaid as additional tax up to a cap.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CreditContext;
use crate::calculations::common::{money, non_negative};
use crate::models::{CreditBreakdown, CreditKind, MarketplaceCoverage};

/// Applicable percentage over one span of poverty-line percentages,
/// interpolated linearly from `initial` to `final_percentage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicablePercentageBand {
    pub lower_fpl_percent: Decimal,
    /// `None` for the open top band.
    pub upper_fpl_percent: Option<Decimal>,
    pub initial_percentage: Decimal,
    pub final_percentage: Decimal,
}

/// Repayment cap for household income below `below_fpl_percent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentCap {
    pub below_fpl_percent: Decimal,
    pub single: Decimal,
    pub other: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumTaxConfig {
    /// Poverty line for a household of one.
    pub poverty_line_base: Decimal,
    pub poverty_line_per_additional_person: Decimal,
    /// Household income below this share of the poverty line gets no credit.
    pub min_fpl_percent: Decimal,
    pub bands: Vec<ApplicablePercentageBand>,
    /// Ascending by `below_fpl_percent`; above the last, repayment is
    /// uncapped.
    pub repayment_caps: Vec<RepaymentCap>,
}

impl PremiumTaxConfig {
    pub fn poverty_line(
        &self,
        household_size: u32,
    ) -> Decimal {
        self.poverty_line_base
            + self.poverty_line_per_additional_person * Decimal::from(household_size.max(1) - 1)
    }

    /// Applicable figure at a poverty-line percentage, four decimal places.
    pub fn applicable_figure(
        &self,
        fpl_percent: Decimal,
    ) -> Decimal {
        let band = self
            .bands
            .iter()
            .find(|b| {
                fpl_percent >= b.lower_fpl_percent
                    && b.upper_fpl_percent.is_none_or(|upper| fpl_percent < upper)
            })
            .or_else(|| self.bands.last());
        let Some(band) = band else {
            return Decimal::ZERO;
        };
        let percentage = match band.upper_fpl_percent {
            Some(upper) if upper > band.lower_fpl_percent => {
                let progress = (fpl_percent - band.lower_fpl_percent) / (upper - band.lower_fpl_percent);
                band.initial_percentage
                    + (band.final_percentage - band.initial_percentage) * progress
            }
            _ => band.final_percentage,
        };
        (percentage / Decimal::ONE_HUNDRED).round_dp(4)
    }

    fn repayment_cap(
        &self,
        fpl_percent: Decimal,
        single: bool,
    ) -> Option<Decimal> {
        self.repayment_caps
            .iter()
            .find(|c| fpl_percent < c.below_fpl_percent)
            .map(|c| if single { c.single } else { c.other })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumTaxResult {
    /// Net credit due beyond the advance payments.
    pub credit: CreditBreakdown,
    pub household_income: Decimal,
    pub fpl_percent: Decimal,
    pub applicable_figure: Decimal,
    pub expected_contribution: Decimal,
    /// Credit the filer was entitled to for the year.
    pub allowed_credit: Decimal,
    pub advance_payments: Decimal,
    /// Advance payments over the allowed credit, after the cap, owed back.
    pub excess_advance_repayment: Decimal,
}

pub fn calculate(
    ctx: &CreditContext,
    coverage: &MarketplaceCoverage,
    config: &PremiumTaxConfig,
) -> PremiumTaxResult {
    const KIND: CreditKind = CreditKind::PremiumTax;

    let household_income = non_negative(ctx.magi);
    let poverty_line = config.poverty_line(coverage.household_size);
    let fpl_percent = if poverty_line > Decimal::ZERO {
        (household_income / poverty_line * Decimal::ONE_HUNDRED).floor()
    } else {
        Decimal::ZERO
    };
    let applicable_figure = config.applicable_figure(fpl_percent);
    let months = Decimal::from(coverage.months_covered.min(12)) / Decimal::from(12);
    let expected_contribution = money(household_income * applicable_figure * months);

    let reason = if ctx.filing_status.is_married_separate() {
        Some("married filing separately")
    } else if fpl_percent < config.min_fpl_percent {
        Some("household income below the poverty line")
    } else if coverage.months_covered == 0 {
        Some("no months of marketplace coverage")
    } else {
        None
    };

    let allowed_credit = match reason {
        Some(_) => Decimal::ZERO,
        None => money(
            coverage
                .annual_premium
                .min(non_negative(coverage.annual_slcsp - expected_contribution)),
        ),
    };

    let advance = coverage.advance_payments;
    let net = money(non_negative(allowed_credit - advance));
    let excess = non_negative(advance - allowed_credit);
    let single = !ctx.filing_status.is_joint();
    let excess_advance_repayment = money(match config.repayment_cap(fpl_percent, single) {
        Some(cap) => excess.min(cap),
        None => excess,
    });

    debug!(
        fpl_percent = %fpl_percent,
        allowed = %allowed_credit,
        advance = %advance,
        repayment = %excess_advance_repayment,
        "premium tax credit"
    );

    let credit = match reason {
        Some(reason) => CreditBreakdown::ineligible(KIND, reason),
        None => CreditBreakdown {
            tentative_amount: allowed_credit,
            amount: net,
            refundable_amount: net,
            ..CreditBreakdown::new(KIND)
        },
    };

    PremiumTaxResult {
        credit,
        household_income,
        fpl_percent,
        applicable_figure,
        expected_contribution,
        allowed_credit,
        advance_payments: advance,
        excess_advance_repayment,
    }
}
