use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Deductions, FilingStatus, Income, IncomeSource, Payments, TaxCredits, Taxpayer};
use crate::error::{ValidationError, ensure_non_negative};

/// Facts only state calculators read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateInputs {
    pub property_tax_paid: Decimal,
    pub rent_paid: Decimal,
    /// State income tax withheld outside W-2s.
    pub additional_withholding: Decimal,
    pub estimated_payments: Decimal,
    /// Months the filer was a resident; part-year rules are not applied.
    pub months_resident: Option<u8>,
}

/// The root aggregate the engines consume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxReturn {
    pub tax_year: i32,
    pub taxpayer: Taxpayer,
    pub income: Income,
    pub deductions: Deductions,
    pub credits: TaxCredits,
    pub payments: Payments,
    pub state_of_residence: Option<String>,
    pub state_inputs: StateInputs,
}

impl TaxReturn {
    /// Filing status, or [`ValidationError::MissingField`].
    pub fn filing_status(&self) -> Result<FilingStatus, ValidationError> {
        self.taxpayer
            .filing_status
            .ok_or(ValidationError::MissingField("filing_status"))
    }

    /// Rejects returns the engine cannot compute: missing filing status,
    /// joint returns without spouse data, and negative amounts in fields that
    /// are never negative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let status = self.filing_status()?;
        if status.is_joint() && self.taxpayer.spouse.is_none() {
            return Err(ValidationError::MissingSpouse(status.as_str()));
        }
        if let Some(code) = &self.state_of_residence {
            let code = code.trim();
            if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ValidationError::InvalidStateCode(code.to_string()));
            }
        }
        for dependent in &self.taxpayer.dependents {
            if dependent.months_lived_with_taxpayer > 12 {
                return Err(ValidationError::OutOfRange {
                    field: format!("dependents[{}].months_lived_with_taxpayer", dependent.name),
                    value: Decimal::from(dependent.months_lived_with_taxpayer),
                    min: Decimal::ZERO,
                    max: Decimal::from(12),
                });
            }
            if dependent.taxpayer_support_percentage < Decimal::ZERO
                || dependent.taxpayer_support_percentage > Decimal::ONE_HUNDRED
            {
                return Err(ValidationError::OutOfRange {
                    field: format!("dependents[{}].taxpayer_support_percentage", dependent.name),
                    value: dependent.taxpayer_support_percentage,
                    min: Decimal::ZERO,
                    max: Decimal::ONE_HUNDRED,
                });
            }
            ensure_non_negative("dependents.gross_income", dependent.gross_income)?;
        }

        for source in &self.income.sources {
            validate_source(source)?;
        }

        let itemized = &self.deductions.itemized;
        for (field, value) in [
            ("itemized.medical_expenses", itemized.medical_expenses),
            ("itemized.state_local_income_tax", itemized.state_local_income_tax),
            ("itemized.real_estate_tax", itemized.real_estate_tax),
            ("itemized.personal_property_tax", itemized.personal_property_tax),
            ("itemized.mortgage_interest", itemized.mortgage_interest),
            ("itemized.charitable_cash", itemized.charitable_cash),
            ("itemized.charitable_noncash", itemized.charitable_noncash),
        ] {
            ensure_non_negative(field, value)?;
        }

        let adjustments = &self.deductions.adjustments;
        for ira in &adjustments.traditional_ira {
            ensure_non_negative("adjustments.traditional_ira", ira.amount)?;
        }
        for hsa in &adjustments.hsa {
            ensure_non_negative("adjustments.hsa", hsa.personal_contributions)?;
        }
        ensure_non_negative(
            "adjustments.student_loan_interest",
            adjustments.student_loan_interest,
        )?;

        ensure_non_negative("payments.federal_withholding", self.payments.federal_withholding)?;
        for payment in &self.payments.estimated_payments {
            ensure_non_negative("payments.estimated_payments", payment.amount)?;
        }
        Ok(())
    }
}

fn validate_source(source: &IncomeSource) -> Result<(), ValidationError> {
    match source {
        IncomeSource::Wages(w2) => {
            ensure_non_negative("w2.wages", w2.wages)?;
            ensure_non_negative("w2.federal_withholding", w2.federal_withholding)?;
            ensure_non_negative("w2.social_security_wages", w2.social_security_wages)
        }
        IncomeSource::Interest(i) => {
            ensure_non_negative("interest.taxable_interest", i.taxable_interest)?;
            ensure_non_negative("interest.tax_exempt_interest", i.tax_exempt_interest)
        }
        IncomeSource::Dividends(d) => {
            ensure_non_negative("dividends.ordinary_dividends", d.ordinary_dividends)?;
            ensure_non_negative("dividends.qualified_dividends", d.qualified_dividends)
        }
        IncomeSource::CapitalTransaction(t) => {
            ensure_non_negative("capital_transaction.proceeds", t.proceeds)?;
            ensure_non_negative("capital_transaction.cost_basis", t.cost_basis)
        }
        IncomeSource::RetirementDistribution(r) => {
            ensure_non_negative("1099r.gross_distribution", r.gross_distribution)
        }
        IncomeSource::SocialSecurity(s) => {
            ensure_non_negative("ssa1099.net_benefits", s.net_benefits)
        }
        IncomeSource::Unemployment(u) => ensure_non_negative("unemployment.amount", u.amount),
        IncomeSource::SelfEmployment(b) | IncomeSource::Farm(b) => {
            ensure_non_negative("business.gross_receipts", b.gross_receipts)
        }
        IncomeSource::Rental(r) => ensure_non_negative("rental.rents_received", r.rents_received),
        _ => Ok(()),
    }
}
