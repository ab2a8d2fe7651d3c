//! Underpayment of estimated tax (Form 2210, short method).
//!
//! | Line | Description |
//! |------|-------------|
//! | 1 | Current year tax after credits, less refundable credits |
//! | 2 | Line 1 × 90% (66⅔% for farmers and fishers) |
//! | 3 | Withholding |
//! | 4 | Line 1 − line 3 (if under $1,000, no penalty) |
//! | 5 | Prior year tax × 100% (110% if prior AGI over $150,000) |
//! | 6 | Required annual payment: smaller of line 2 or line 5 |
//! | 7 | Withholding plus timely estimated payments |
//! | 8 | Underpayment: line 6 − line 7, not below zero |
//! | 9 | Penalty: line 8 × underpayment rate (none if line 8 is under $1,000) |
//!
//! Missing or zero prior-year tax is treated as unavailable: the required
//! payment falls back to the current-year figure, which is the larger
//! requirement.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::FilingStatus;
//! use tax_core::calculations::worksheets::{
//!     UnderpaymentConfig, UnderpaymentInput, UnderpaymentWorksheet,
//! };
//! use tax_core::models::ByFilingStatus;
//!
//! let config = UnderpaymentConfig {
//!     underpayment_rate: dec!(0.07),
//!     current_year_factor: dec!(0.90),
//!     farmer_current_year_factor: dec!(2) / dec!(3),
//!     prior_year_factor: dec!(1.00),
//!     high_income_prior_year_factor: dec!(1.10),
//!     high_income_agi: ByFilingStatus::new(
//!         dec!(150000), dec!(150000), dec!(75000), dec!(150000), dec!(150000),
//!     ),
//!     de_minimis: dec!(1000),
//! };
//!
//! let result = UnderpaymentWorksheet::new(&config).calculate(&UnderpaymentInput {
//!     current_year_tax: dec!(50000),
//!     withholding: dec!(0),
//!     timely_estimated_payments: dec!(0),
//!     prior_year: None,
//!     filing_status: FilingStatus::Single,
//!     farmer_or_fisher: false,
//! });
//!
//! assert_eq!(result.required_annual_payment, dec!(45000.00));
//! assert_eq!(result.penalty, dec!(3150.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{money, non_negative};
use crate::models::{ByFilingStatus, FilingStatus, PriorYearInfo};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderpaymentConfig {
    /// Annual underpayment interest rate.
    pub underpayment_rate: Decimal,
    pub current_year_factor: Decimal,
    pub farmer_current_year_factor: Decimal,
    pub prior_year_factor: Decimal,
    pub high_income_prior_year_factor: Decimal,
    /// Prior-year AGI above which the higher prior-year factor applies.
    pub high_income_agi: ByFilingStatus<Decimal>,
    /// No penalty when tax less withholding, or the underpayment itself, is
    /// under this amount.
    pub de_minimis: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderpaymentInput {
    pub current_year_tax: Decimal,
    pub withholding: Decimal,
    /// Estimated payments made by January 15 of the following year.
    pub timely_estimated_payments: Decimal,
    pub prior_year: Option<PriorYearInfo>,
    pub filing_status: FilingStatus,
    pub farmer_or_fisher: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderpaymentResult {
    pub current_year_tax: Decimal,
    pub current_year_requirement: Decimal,
    /// `None` when prior-year tax was unavailable.
    pub prior_year_requirement: Option<Decimal>,
    pub required_annual_payment: Decimal,
    pub total_payments: Decimal,
    pub underpayment: Decimal,
    pub penalty: Decimal,
    /// Tax less withholding or the underpayment was under the de minimis
    /// amount, so no penalty is due.
    pub below_de_minimis: bool,
}

#[derive(Debug, Clone)]
pub struct UnderpaymentWorksheet<'a> {
    config: &'a UnderpaymentConfig,
}

impl<'a> UnderpaymentWorksheet<'a> {
    pub fn new(config: &'a UnderpaymentConfig) -> Self {
        Self { config }
    }

    pub fn calculate(
        &self,
        input: &UnderpaymentInput,
    ) -> UnderpaymentResult {
        let current_year_tax = money(non_negative(input.current_year_tax));
        let current_year_requirement =
            self.current_year_requirement(current_year_tax, input.farmer_or_fisher);
        let prior_year_requirement = self.prior_year_requirement(input);
        let required_annual_payment =
            self.required_annual_payment(current_year_requirement, prior_year_requirement);
        let total_payments = money(input.withholding + input.timely_estimated_payments);
        let underpayment = self.underpayment(required_annual_payment, total_payments);

        let below_de_minimis =
            self.below_de_minimis(current_year_tax, input.withholding, underpayment);
        let penalty = if below_de_minimis {
            debug!(tax = %current_year_tax, underpayment = %underpayment, "underpayment below de minimis");
            Decimal::ZERO
        } else {
            self.penalty(underpayment)
        };

        debug!(
            required = %required_annual_payment,
            paid = %total_payments,
            penalty = %penalty,
            "underpayment penalty"
        );

        UnderpaymentResult {
            current_year_tax,
            current_year_requirement,
            prior_year_requirement,
            required_annual_payment,
            total_payments,
            underpayment,
            penalty,
            below_de_minimis,
        }
    }

    /// Line 2.
    fn current_year_requirement(
        &self,
        current_year_tax: Decimal,
        farmer_or_fisher: bool,
    ) -> Decimal {
        let factor = if farmer_or_fisher {
            self.config.farmer_current_year_factor
        } else {
            self.config.current_year_factor
        };
        money(current_year_tax * factor)
    }

    /// Line 5.
    fn prior_year_requirement(
        &self,
        input: &UnderpaymentInput,
    ) -> Option<Decimal> {
        let prior = match &input.prior_year {
            Some(prior) if prior.tax > Decimal::ZERO && prior.full_year => prior,
            _ => {
                warn!("prior-year tax unavailable; using current-year safe harbor only");
                return None;
            }
        };
        let high_income = prior.agi > *self.config.high_income_agi.get(input.filing_status);
        let factor = if high_income && !input.farmer_or_fisher {
            self.config.high_income_prior_year_factor
        } else {
            self.config.prior_year_factor
        };
        Some(money(prior.tax * factor))
    }

    /// Line 6.
    fn required_annual_payment(
        &self,
        current_year_requirement: Decimal,
        prior_year_requirement: Option<Decimal>,
    ) -> Decimal {
        match prior_year_requirement {
            Some(prior) => current_year_requirement.min(prior),
            None => current_year_requirement,
        }
    }

    /// Line 4 test, and the same threshold applied to line 8.
    fn below_de_minimis(
        &self,
        current_year_tax: Decimal,
        withholding: Decimal,
        underpayment: Decimal,
    ) -> bool {
        current_year_tax - withholding < self.config.de_minimis
            || underpayment < self.config.de_minimis
    }

    /// Line 8.
    fn underpayment(
        &self,
        required_annual_payment: Decimal,
        total_payments: Decimal,
    ) -> Decimal {
        money(non_negative(required_annual_payment - total_payments))
    }

    /// Line 9.
    fn penalty(
        &self,
        underpayment: Decimal,
    ) -> Decimal {
        money(underpayment * self.config.underpayment_rate)
    }
}
