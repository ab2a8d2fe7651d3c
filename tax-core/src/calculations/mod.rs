//! Federal tax calculations.
//!
//! [`federal::FederalTaxEngine`] drives the return through each stage;
//! the remaining modules are the pure building blocks it composes.

pub mod adjustments;
pub mod brackets;
pub mod common;
pub mod deductions;
pub mod federal;
pub mod worksheets;

pub use federal::FederalTaxEngine;
