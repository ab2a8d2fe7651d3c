//! Error taxonomy for the tax engine.
//!
//! Three kinds of failure leave the engine:
//!
//! | Kind | Meaning | Caller action |
//! |------|---------|---------------|
//! | [`TaxError::Validation`] | Malformed or missing input | Fix the input; never retried |
//! | [`TaxError::UnsupportedJurisdiction`] | State taxes income but has no calculator for the year | Caller picks a fallback |
//! | [`TaxError::ArithmeticInvariant`] | Internal defect | Report loudly |
//!
//! Statutory zero-paths (no dependents, income under a threshold, missing
//! prior-year data) are not errors; they resolve to numbers.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculations::worksheets::SeWorksheetError;

/// Input faults detected before any calculation runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required field '{0}' is missing")]
    MissingField(&'static str),

    #[error("unknown filing status code '{0}'")]
    UnknownFilingStatus(String),

    #[error("no tax year configuration registered for {0}")]
    UnsupportedTaxYear(i32),

    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: String, value: Decimal },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        value: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("spouse information is required for filing status {0}")]
    MissingSpouse(&'static str),

    #[error("invalid state code '{0}'")]
    InvalidStateCode(String),

    #[error("tax year mismatch: return is for {return_year}, configuration is for {config_year}")]
    TaxYearMismatch { return_year: i32, config_year: i32 },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Structural faults in a [`TaxYearConfig`](crate::TaxYearConfig) or
/// [`StateTaxConfig`](crate::state::StateTaxConfig).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("bracket schedule for {0} is empty")]
    EmptySchedule(String),

    #[error("bracket schedule for {0} must start at zero")]
    ScheduleNotAnchored(String),

    #[error("bracket thresholds for {0} are not strictly ascending")]
    ScheduleNotAscending(String),

    #[error("rate {rate} for {context} is outside [0, 1]")]
    RateOutOfRange { context: String, rate: Decimal },

    #[error("phaseout range for {0} ends before it starts")]
    InvertedPhaseout(String),

    #[error("self-employment settings: {0}")]
    SelfEmployment(#[from] SeWorksheetError),
}

/// Every failure the engine can surface.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("no state calculator registered for {state_code} in tax year {tax_year}")]
    UnsupportedJurisdiction { state_code: String, tax_year: i32 },

    #[error("arithmetic invariant violated: {0}")]
    ArithmeticInvariant(String),
}

impl From<ConfigError> for TaxError {
    fn from(err: ConfigError) -> Self {
        TaxError::Validation(ValidationError::Config(err))
    }
}

/// Fails with [`ValidationError::NegativeAmount`] when `value` is below zero.
pub(crate) fn ensure_non_negative(
    field: &str,
    value: Decimal,
) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Fails with [`TaxError::ArithmeticInvariant`] when `condition` is false.
pub(crate) fn ensure_invariant(
    condition: bool,
    message: impl FnOnce() -> String,
) -> Result<(), TaxError> {
    if condition {
        Ok(())
    } else {
        Err(TaxError::ArithmeticInvariant(message()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn ensure_non_negative_accepts_zero() {
        assert_eq!(ensure_non_negative("wages", dec!(0)), Ok(()));
    }

    #[test]
    fn ensure_non_negative_names_the_field() {
        let result = ensure_non_negative("wages", dec!(-1.00));

        assert_eq!(
            result,
            Err(ValidationError::NegativeAmount {
                field: "wages".to_string(),
                value: dec!(-1.00),
            })
        );
    }

    #[test]
    fn config_error_converts_to_validation_error() {
        let err: TaxError = ConfigError::EmptySchedule("single".to_string()).into();

        assert_eq!(
            err,
            TaxError::Validation(ValidationError::Config(ConfigError::EmptySchedule(
                "single".to_string()
            )))
        );
    }

    #[test]
    fn ensure_invariant_reports_message() {
        let result = ensure_invariant(false, || "taxable income negative".to_string());

        assert_eq!(
            result,
            Err(TaxError::ArithmeticInvariant(
                "taxable income negative".to_string()
            ))
        );
    }

    #[test]
    fn unsupported_jurisdiction_message_names_state_and_year() {
        let err = TaxError::UnsupportedJurisdiction {
            state_code: "OR".to_string(),
            tax_year: 2025,
        };

        assert_eq!(
            err.to_string(),
            "no state calculator registered for OR in tax year 2025"
        );
    }
}
