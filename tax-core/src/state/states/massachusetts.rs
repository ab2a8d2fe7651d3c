//! Massachusetts: 5% on income after exemptions plus the 4% surtax on
//! taxable income over the indexed threshold.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::calculations::common::{money, non_negative};
use crate::models::ByFilingStatus;
use crate::state::calculator::{StateCalculator, StateContext};
use crate::state::config::StateTaxConfig;

pub const SURTAX_THRESHOLD_2025: Decimal = dec!(1083150);
const SURTAX_RATE: Decimal = dec!(0.04);

pub fn config_2025() -> StateTaxConfig {
    StateTaxConfig {
        personal_exemption: ByFilingStatus::joint_hoh_other(dec!(8800), dec!(6800), dec!(4400)),
        dependent_exemption: dec!(1000),
        eitc_rate: dec!(0.40),
        ..StateTaxConfig::flat("MA", 2025, dec!(0.05))
    }
}

#[derive(Debug, Clone)]
pub struct MassachusettsCalculator {
    config: StateTaxConfig,
    surtax_threshold: Decimal,
}

impl MassachusettsCalculator {
    pub fn new(
        config: StateTaxConfig,
        surtax_threshold: Decimal,
    ) -> Self {
        Self {
            config,
            surtax_threshold,
        }
    }
}

impl StateCalculator for MassachusettsCalculator {
    fn config(&self) -> &StateTaxConfig {
        &self.config
    }

    fn surtax(
        &self,
        _ctx: &StateContext<'_>,
        taxable_income: Decimal,
    ) -> Decimal {
        money(non_negative(taxable_income - self.surtax_threshold) * SURTAX_RATE)
    }
}
