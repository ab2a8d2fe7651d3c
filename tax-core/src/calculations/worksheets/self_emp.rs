//! Self-employment tax (Schedule SE, short form).
//!
//! SE tax is figured per person from net earnings, independently of AGI, so
//! the deductible half can feed the adjustments stage without a loop.
//!
//! | Step | Computation |
//! |------|-------------|
//! | 1 | Net profit from all businesses + CRP payments |
//! | 2 | Step 1 × 92.35% (net earnings) |
//! | 3 | Medicare: step 2 × 2.9%, uncapped |
//! | 4 | Remaining SS base: wage base − SS wages already taxed |
//! | 5 | Social security: min(step 2, step 4) × 12.4% |
//! | 6 | SE tax: step 3 + step 5 |
//! | 7 | Deduction: step 6 × 50% |
//!
//! If step 1 is $400 or less no SE tax is due.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::worksheets::{SeWorksheet, SeWorksheetConfig, SeWorksheetInput};
//!
//! let worksheet = SeWorksheet::new(SeWorksheetConfig {
//!     ss_wage_max: dec!(176100.00),
//!     ss_tax_rate: dec!(0.124),
//!     medicare_tax_rate: dec!(0.029),
//!     net_earnings_factor: dec!(0.9235),
//!     deduction_factor: dec!(0.50),
//!     min_se_threshold: dec!(400.00),
//! });
//!
//! let result = worksheet
//!     .calculate(&SeWorksheetInput {
//!         net_profit: dec!(100000.00),
//!         crp_payments: dec!(0.00),
//!         social_security_wages: dec!(50000.00),
//!     })
//!     .unwrap();
//!
//! assert_eq!(result.self_employment_tax, dec!(14129.55));
//! assert_eq!(result.se_tax_deduction, dec!(7064.78));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::{money, non_negative};

/// Invalid SE configuration values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SeWorksheetError {
    #[error("net earnings factor must be between 0 and 1, got {0}")]
    InvalidNetEarningsFactor(Decimal),

    #[error("social security tax rate must be between 0 and 1, got {0}")]
    InvalidSocialSecurityRate(Decimal),

    #[error("medicare tax rate must be between 0 and 1, got {0}")]
    InvalidMedicareRate(Decimal),

    #[error("deduction factor must be between 0 and 1, got {0}")]
    InvalidDeductionFactor(Decimal),

    #[error("social security wage maximum must be positive, got {0}")]
    InvalidSsWageMax(Decimal),

    #[error("minimum SE threshold must be non-negative, got {0}")]
    InvalidMinSeThreshold(Decimal),
}

/// Year-scoped SE constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeWorksheetConfig {
    /// Social security wage base ($176,100 for 2025).
    pub ss_wage_max: Decimal,
    /// Employer + employee social security rate (12.4%).
    pub ss_tax_rate: Decimal,
    /// Employer + employee Medicare rate (2.9%).
    pub medicare_tax_rate: Decimal,
    /// Share of profit treated as net earnings (92.35%).
    pub net_earnings_factor: Decimal,
    /// Deductible share of SE tax (50%).
    pub deduction_factor: Decimal,
    /// Combined earnings at or below this owe no SE tax ($400).
    pub min_se_threshold: Decimal,
}

impl SeWorksheetConfig {
    /// Checks every rate sits in range and the wage base is positive.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::calculations::worksheets::{SeWorksheetConfig, SeWorksheetError};
    ///
    /// let config = SeWorksheetConfig {
    ///     ss_wage_max: dec!(-1000.00),
    ///     ss_tax_rate: dec!(0.124),
    ///     medicare_tax_rate: dec!(0.029),
    ///     net_earnings_factor: dec!(0.9235),
    ///     deduction_factor: dec!(0.50),
    ///     min_se_threshold: dec!(400.00),
    /// };
    ///
    /// assert_eq!(config.validate(), Err(SeWorksheetError::InvalidSsWageMax(dec!(-1000.00))));
    /// ```
    pub fn validate(&self) -> Result<(), SeWorksheetError> {
        if self.net_earnings_factor <= Decimal::ZERO || self.net_earnings_factor > Decimal::ONE {
            return Err(SeWorksheetError::InvalidNetEarningsFactor(
                self.net_earnings_factor,
            ));
        }
        if !is_rate(self.ss_tax_rate) {
            return Err(SeWorksheetError::InvalidSocialSecurityRate(self.ss_tax_rate));
        }
        if !is_rate(self.medicare_tax_rate) {
            return Err(SeWorksheetError::InvalidMedicareRate(self.medicare_tax_rate));
        }
        if !is_rate(self.deduction_factor) {
            return Err(SeWorksheetError::InvalidDeductionFactor(self.deduction_factor));
        }
        if self.ss_wage_max <= Decimal::ZERO {
            return Err(SeWorksheetError::InvalidSsWageMax(self.ss_wage_max));
        }
        if self.min_se_threshold < Decimal::ZERO {
            return Err(SeWorksheetError::InvalidMinSeThreshold(self.min_se_threshold));
        }
        Ok(())
    }
}

fn is_rate(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}

/// Earnings for one person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeWorksheetInput {
    /// Net profit from Schedule C, Schedule F and SE earnings from K-1s.
    pub net_profit: Decimal,
    /// Conservation Reserve Program payments.
    pub crp_payments: Decimal,
    /// Wages already subject to social security tax (W-2 box 3).
    pub social_security_wages: Decimal,
}

/// SE tax for one person, with intermediate values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeWorksheetResult {
    pub combined_se_income: Decimal,
    pub net_earnings: Decimal,
    pub medicare_tax: Decimal,
    pub ss_taxable_earnings: Decimal,
    pub social_security_tax: Decimal,
    pub self_employment_tax: Decimal,
    pub se_tax_deduction: Decimal,
    /// Combined income was at or below the filing threshold.
    pub below_threshold: bool,
}

impl SeWorksheetResult {
    fn below_threshold(combined_se_income: Decimal) -> Self {
        Self {
            combined_se_income,
            below_threshold: true,
            ..Self::default()
        }
    }

    /// Adds two people's results for a joint return.
    pub fn combine(
        &self,
        other: &SeWorksheetResult,
    ) -> SeWorksheetResult {
        SeWorksheetResult {
            combined_se_income: self.combined_se_income + other.combined_se_income,
            net_earnings: self.net_earnings + other.net_earnings,
            medicare_tax: self.medicare_tax + other.medicare_tax,
            ss_taxable_earnings: self.ss_taxable_earnings + other.ss_taxable_earnings,
            social_security_tax: self.social_security_tax + other.social_security_tax,
            self_employment_tax: self.self_employment_tax + other.self_employment_tax,
            se_tax_deduction: self.se_tax_deduction + other.se_tax_deduction,
            below_threshold: self.below_threshold && other.below_threshold,
        }
    }
}

/// Calculator for the SE worksheet.
#[derive(Debug, Clone)]
pub struct SeWorksheet {
    config: SeWorksheetConfig,
}

impl SeWorksheet {
    pub fn new(config: SeWorksheetConfig) -> Self {
        Self { config }
    }

    /// Computes SE tax and its deductible half.
    ///
    /// Social security and Medicare portions are rounded independently and
    /// then added.
    ///
    /// # Errors
    ///
    /// Returns [`SeWorksheetError`] if the configuration is invalid.
    pub fn calculate(
        &self,
        input: &SeWorksheetInput,
    ) -> Result<SeWorksheetResult, SeWorksheetError> {
        self.config.validate()?;

        let combined = money(input.net_profit + input.crp_payments);
        if combined <= self.config.min_se_threshold {
            if combined > Decimal::ZERO {
                warn!(
                    combined_income = %combined,
                    threshold = %self.config.min_se_threshold,
                    "SE income at or below minimum threshold; no SE tax due"
                );
            }
            return Ok(SeWorksheetResult::below_threshold(combined));
        }

        let net_earnings = money(combined * self.config.net_earnings_factor);
        let medicare_tax = money(net_earnings * self.config.medicare_tax_rate);

        let remaining_base = non_negative(self.config.ss_wage_max - input.social_security_wages);
        if remaining_base == Decimal::ZERO {
            debug!(
                ss_wages = %input.social_security_wages,
                "wages reach the social security wage base; no SS tax on SE income"
            );
        }
        let ss_taxable_earnings = net_earnings.min(remaining_base);
        let social_security_tax = money(ss_taxable_earnings * self.config.ss_tax_rate);

        let self_employment_tax = medicare_tax + social_security_tax;
        let se_tax_deduction = money(self_employment_tax * self.config.deduction_factor);

        Ok(SeWorksheetResult {
            combined_se_income: combined,
            net_earnings,
            medicare_tax,
            ss_taxable_earnings,
            social_security_tax,
            self_employment_tax,
            se_tax_deduction,
            below_threshold: false,
        })
    }
}
