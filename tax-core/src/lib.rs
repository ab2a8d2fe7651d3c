//! Federal and state individual income tax computation.
//!
//! A [`TaxReturn`] goes into [`FederalTaxEngine::calculate`] and comes back
//! as a [`CalculationBreakdown`] holding every intermediate figure. States
//! are layered on top through [`StateTaxEngine`].

pub mod calculations;
pub mod credits;
pub mod error;
pub mod models;
pub mod state;
pub mod tax_years;

pub use calculations::FederalTaxEngine;
pub use error::{ConfigError, TaxError, ValidationError};
pub use models::*;
pub use state::{
    StateCalculationBreakdown, StateCalculator, StateCalculatorRegistry, StateTaxConfig,
    StateTaxEngine,
};
