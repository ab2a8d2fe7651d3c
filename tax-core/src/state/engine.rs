use std::sync::Arc;

use tracing::{debug, info};

use super::calculator::StateContext;
use super::config::StateCalculationBreakdown;
use super::registry::StateCalculatorRegistry;
use crate::calculations::federal::FederalTaxEngine;
use crate::error::{TaxError, ValidationError};
use crate::models::{CalculationBreakdown, TaxReturn};

/// States that levy no tax on wage income. Checked before the registry, so
/// these never need a calculator.
pub const NO_INCOME_TAX_STATES: [&str; 9] = ["AK", "FL", "NV", "NH", "SD", "TN", "TX", "WA", "WY"];

pub fn has_income_tax(state_code: &str) -> bool {
    !NO_INCOME_TAX_STATES.contains(&state_code)
}

/// Dispatches a return to its state calculator.
///
/// Cloning is cheap; clones share the federal engine and the registry.
#[derive(Debug, Clone)]
pub struct StateTaxEngine {
    federal: Arc<FederalTaxEngine>,
    registry: Arc<StateCalculatorRegistry>,
}

impl StateTaxEngine {
    pub fn new(
        federal: Arc<FederalTaxEngine>,
        registry: Arc<StateCalculatorRegistry>,
    ) -> Self {
        Self { federal, registry }
    }

    pub fn registry(&self) -> &StateCalculatorRegistry {
        &self.registry
    }

    /// Computes the federal return and then the state return for
    /// `state_code`.
    ///
    /// Returns `Ok(None)` for a state without an income tax.
    ///
    /// # Errors
    ///
    /// * [`ValidationError::InvalidStateCode`] for a code that is not two
    ///   letters.
    /// * [`TaxError::UnsupportedJurisdiction`] when the state taxes income
    ///   but has no calculator for the return's year.
    /// * Any error from the federal or state calculation.
    pub fn calculate(
        &self,
        tax_return: &TaxReturn,
        state_code: &str,
    ) -> Result<Option<StateCalculationBreakdown>, TaxError> {
        let code = normalize(state_code)?;
        if !has_income_tax(&code) {
            debug!(state = %code, "no state income tax");
            return Ok(None);
        }
        self.ensure_supported(&code, tax_return.tax_year)?;

        let federal = self.federal.calculate(tax_return)?;
        self.calculate_with_federal(tax_return, &federal, &code)
    }

    /// Like [`calculate`](Self::calculate), reusing a federal breakdown the
    /// caller already has for the same return.
    pub fn calculate_with_federal(
        &self,
        tax_return: &TaxReturn,
        federal: &CalculationBreakdown,
        state_code: &str,
    ) -> Result<Option<StateCalculationBreakdown>, TaxError> {
        let code = normalize(state_code)?;
        if !has_income_tax(&code) {
            debug!(state = %code, "no state income tax");
            return Ok(None);
        }
        if federal.tax_year != tax_return.tax_year {
            return Err(ValidationError::TaxYearMismatch {
                return_year: tax_return.tax_year,
                config_year: federal.tax_year,
            }
            .into());
        }
        let calculator = self.ensure_supported(&code, tax_return.tax_year)?;

        let breakdown = calculator.calculate(&StateContext::new(tax_return, federal))?;
        info!(
            state = %code,
            tax_year = tax_return.tax_year,
            taxable_income = %breakdown.taxable_income,
            tax = %breakdown.tax_after_credits,
            "state return calculated"
        );
        Ok(Some(breakdown))
    }

    fn ensure_supported(
        &self,
        code: &str,
        tax_year: i32,
    ) -> Result<&dyn super::StateCalculator, TaxError> {
        self.registry
            .get(code, tax_year)
            .ok_or_else(|| TaxError::UnsupportedJurisdiction {
                state_code: code.to_string(),
                tax_year,
            })
    }
}

/// Upper-cased two-letter code.
fn normalize(state_code: &str) -> Result<String, ValidationError> {
    let code = state_code.trim();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidStateCode(code.to_string()));
    }
    Ok(code.to_ascii_uppercase())
}
