//! State income tax.
//!
//! Each state builds on the federal result. A [`StateCalculator`] supplies
//! one state's rules for one year, the [`StateCalculatorRegistry`] maps
//! `(state, year)` to a calculator, and the [`StateTaxEngine`] ties the two
//! together with the federal engine.

pub mod calculator;
pub mod config;
pub mod engine;
pub mod registry;
pub mod states;

pub use calculator::{StateCalculator, StateContext};
pub use config::{
    AgeExclusion, RetirementTreatment, StartingIncome, StateAdjustment, StateCalculationBreakdown,
    StateCredit, StateTaxConfig,
};
pub use engine::{NO_INCOME_TAX_STATES, StateTaxEngine, has_income_tax};
pub use registry::StateCalculatorRegistry;
