//! Qualified business income deduction (Forms 8995 and 8995-A).
//!
//! Below the threshold each business contributes 20% of its QBI. Across the
//! phase-in range the W-2 wage/UBIA limit phases in and specified service
//! businesses phase out; above the range the wage limit applies in full and
//! specified service income is excluded. The total is capped at 20% of
//! taxable income before the deduction, less net capital gain.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{money, non_negative, sum};
use crate::models::{ByFilingStatus, FilingStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QbiConfig {
    pub deduction_rate: Decimal,
    pub threshold: ByFilingStatus<Decimal>,
    /// $50,000 ($100,000 joint).
    pub phase_in_range: ByFilingStatus<Decimal>,
    /// 50% of W-2 wages.
    pub wage_rate: Decimal,
    /// 25% of W-2 wages plus 2.5% of UBIA.
    pub wage_with_ubia_rate: Decimal,
    pub ubia_rate: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QbiBusiness {
    pub name: String,
    pub qualified_business_income: Decimal,
    pub w2_wages: Decimal,
    pub ubia: Decimal,
    pub specified_service: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QbiInput {
    pub businesses: Vec<QbiBusiness>,
    /// Qualified REIT dividends and PTP income.
    pub reit_ptp_income: Decimal,
    pub taxable_income_before_qbi: Decimal,
    /// Net capital gain plus qualified dividends.
    pub net_capital_gain: Decimal,
    pub filing_status: FilingStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QbiBusinessResult {
    pub name: String,
    pub qualified_business_income: Decimal,
    pub wage_limitation: Decimal,
    pub component: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QbiResult {
    pub businesses: Vec<QbiBusinessResult>,
    pub qbi_component: Decimal,
    pub reit_ptp_component: Decimal,
    pub income_limitation: Decimal,
    pub deduction: Decimal,
}

#[derive(Debug, Clone)]
pub struct QbiWorksheet<'a> {
    config: &'a QbiConfig,
}

impl<'a> QbiWorksheet<'a> {
    pub fn new(config: &'a QbiConfig) -> Self {
        Self { config }
    }

    pub fn calculate(
        &self,
        input: &QbiInput,
    ) -> QbiResult {
        if input.businesses.is_empty() && input.reit_ptp_income <= Decimal::ZERO {
            return QbiResult::default();
        }

        let threshold = *self.config.threshold.get(input.filing_status);
        let range = *self.config.phase_in_range.get(input.filing_status);
        let excess = non_negative(input.taxable_income_before_qbi - threshold);
        let phase = if range > Decimal::ZERO {
            (excess / range).min(Decimal::ONE)
        } else if excess > Decimal::ZERO {
            Decimal::ONE
        } else {
            Decimal::ZERO
        };

        let businesses: Vec<QbiBusinessResult> = input
            .businesses
            .iter()
            .map(|b| self.business_component(b, excess, phase))
            .collect();

        let qbi_component = non_negative(sum(businesses.iter().map(|b| b.component)));
        let reit_ptp_component = non_negative(input.reit_ptp_income) * self.config.deduction_rate;
        let income_limitation = non_negative(input.taxable_income_before_qbi - input.net_capital_gain)
            * self.config.deduction_rate;
        let deduction = (qbi_component + reit_ptp_component).min(income_limitation);

        let result = QbiResult {
            businesses,
            qbi_component: money(qbi_component),
            reit_ptp_component: money(reit_ptp_component),
            income_limitation: money(income_limitation),
            deduction: money(deduction),
        };
        debug!(deduction = %result.deduction, phase = %phase, "qualified business income deduction");
        result
    }

    fn business_component(
        &self,
        business: &QbiBusiness,
        excess: Decimal,
        phase: Decimal,
    ) -> QbiBusinessResult {
        // Specified service businesses keep only the applicable percentage.
        let applicable = if business.specified_service {
            Decimal::ONE - phase
        } else {
            Decimal::ONE
        };
        let qbi = business.qualified_business_income * applicable;
        let wages = business.w2_wages * applicable;
        let ubia = business.ubia * applicable;

        let tentative = qbi * self.config.deduction_rate;
        let wage_limitation = (wages * self.config.wage_rate)
            .max(wages * self.config.wage_with_ubia_rate + ubia * self.config.ubia_rate);

        let component = if excess == Decimal::ZERO || tentative <= wage_limitation {
            tentative
        } else if phase >= Decimal::ONE {
            wage_limitation
        } else {
            tentative - (tentative - wage_limitation) * phase
        };

        QbiBusinessResult {
            name: business.name.clone(),
            qualified_business_income: money(qbi),
            wage_limitation: money(wage_limitation),
            component: money(component),
        }
    }
}
