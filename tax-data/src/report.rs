//! Federal and state results for one return, rendered as TOML.

use std::sync::Arc;

use serde::Serialize;
use tax_core::state::StateCalculationBreakdown;
use tax_core::{
    CalculationBreakdown, FederalTaxEngine, StateCalculatorRegistry, StateTaxEngine, TaxError,
    TaxReturn, tax_years,
};
use thiserror::Error;
use tracing::info;

use crate::loader::{TaxBracketLoader, TaxBracketLoaderError, TaxBracketRecord};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Brackets(#[from] TaxBracketLoaderError),

    #[error(transparent)]
    Tax(#[from] TaxError),

    #[error("cannot render report: {0}")]
    Render(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub federal: CalculationBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<StateCalculationBreakdown>,
}

impl Report {
    pub fn to_toml(&self) -> Result<String, ReportError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Computes the federal return and, when `state_code` is given or the
/// return names a state of residence, the state return.
///
/// `brackets` replaces the built-in ordinary bracket tables for the
/// return's year.
pub fn calculate_report(
    tax_return: &TaxReturn,
    state_code: Option<&str>,
    brackets: Option<&[TaxBracketRecord]>,
) -> Result<Report, ReportError> {
    let mut config = tax_years::builtin(tax_return.tax_year).map_err(TaxError::from)?;
    if let Some(records) = brackets {
        TaxBracketLoader::apply(&mut config, records)?;
    }
    let federal_engine = Arc::new(FederalTaxEngine::new([config])?);
    let federal = federal_engine.calculate(tax_return)?;

    let state = match state_code.or(tax_return.state_of_residence.as_deref()) {
        Some(code) => {
            let engine = StateTaxEngine::new(
                federal_engine,
                Arc::new(StateCalculatorRegistry::with_builtin_states()),
            );
            engine.calculate_with_federal(tax_return, &federal, code)?
        }
        None => None,
    };

    info!(
        tax_year = federal.tax_year,
        total_tax = %federal.total_tax,
        state = state.as_ref().map_or("none", |s| s.state_code.as_str()),
        "report ready"
    );
    Ok(Report { federal, state })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tax_core::{FilingStatus, Income, IncomeSource, Person, Taxpayer, ValidationError, W2};

    use super::*;

    fn wage_return(state: Option<&str>) -> TaxReturn {
        TaxReturn {
            tax_year: 2025,
            taxpayer: Taxpayer {
                filing_status: Some(FilingStatus::Single),
                primary: Person {
                    age: 40,
                    ..Person::default()
                },
                ..Taxpayer::default()
            },
            income: Income {
                sources: vec![IncomeSource::Wages(W2 {
                    employer: "Acme".to_string(),
                    wages: dec!(100000),
                    social_security_wages: dec!(100000),
                    medicare_wages: dec!(100000),
                    state_wages: dec!(100000),
                    ..W2::default()
                })],
                ..Income::default()
            },
            state_of_residence: state.map(str::to_string),
            ..TaxReturn::default()
        }
    }

    #[test]
    fn state_of_residence_is_used_by_default() {
        let report = calculate_report(&wage_return(Some("IL")), None, None).unwrap();

        assert_eq!(report.state.map(|s| s.tax), Some(dec!(4808.93)));
    }

    #[test]
    fn explicit_state_overrides_residence() {
        let report = calculate_report(&wage_return(Some("IL")), Some("TX"), None).unwrap();

        assert_eq!(report.state, None);
    }

    #[test]
    fn federal_only_without_a_state() {
        let report = calculate_report(&wage_return(None), None, None).unwrap();

        assert_eq!(report.state, None);
        assert_eq!(report.federal.taxable_income, dec!(85000.00));
    }

    #[test]
    fn unsupported_year_is_a_tax_error() {
        let mut tax_return = wage_return(None);
        tax_return.tax_year = 2030;

        let result = calculate_report(&tax_return, None, None);

        assert!(matches!(
            result,
            Err(ReportError::Tax(TaxError::Validation(ValidationError::UnsupportedTaxYear(2030))))
        ));
    }

    #[test]
    fn report_renders_as_toml() {
        let report = calculate_report(&wage_return(Some("IL")), None, None).unwrap();

        let text = report.to_toml().unwrap();

        assert!(text.contains("[federal]"), "got:\n{text}");
        assert!(text.contains("state_code = \"IL\""), "got:\n{text}");
    }
}
