//! North Carolina: flat tax on federal AGI after the state standard
//! deduction.

use rust_decimal_macros::dec;

use crate::models::ByFilingStatus;
use crate::state::config::StateTaxConfig;

pub fn config_2025() -> StateTaxConfig {
    StateTaxConfig {
        standard_deduction: ByFilingStatus::joint_hoh_other(dec!(25500), dec!(19125), dec!(12750)),
        ..StateTaxConfig::flat("NC", 2025, dec!(0.0425))
    }
}
