use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::brackets::BracketSpan;
use crate::error::ConfigError;
use crate::models::{BracketSchedule, ByFilingStatus, FilingStatus};

/// Federal figure a state return starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartingIncome {
    #[default]
    FederalAgi,
    FederalTaxableIncome,
    /// The calculator builds its own base from the income records.
    IncomeClasses,
}

/// Exclusion for a filer at or above `min_age`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeExclusion {
    pub min_age: u32,
    pub amount: Decimal,
}

/// How taxable pension, annuity and IRA distributions are treated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetirementTreatment {
    #[default]
    Taxable,
    Exempt,
    /// Per-filer exclusion by age. Tiers are checked from the highest
    /// `min_age` down; the first one the filer meets applies.
    AgeExclusion(Vec<AgeExclusion>),
}

impl RetirementTreatment {
    /// Exclusion available to a filer of `age`.
    pub fn exclusion_for(
        &self,
        age: u32,
    ) -> Option<Decimal> {
        match self {
            Self::Taxable => Some(Decimal::ZERO),
            Self::Exempt => None,
            Self::AgeExclusion(tiers) => Some(
                tiers
                    .iter()
                    .filter(|tier| age >= tier.min_age)
                    .max_by_key(|tier| tier.min_age)
                    .map_or(Decimal::ZERO, |tier| tier.amount),
            ),
        }
    }
}

/// Constants for one state and tax year.
///
/// Flat-rate states carry a single-bracket schedule; exemptions are
/// deductions from income here. States that grant exemption credits instead
/// leave these at zero and supply the credit themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTaxConfig {
    pub state_code: String,
    pub tax_year: i32,
    pub starting_income: StartingIncome,
    pub brackets: ByFilingStatus<BracketSchedule>,
    pub standard_deduction: ByFilingStatus<Decimal>,
    /// Total personal exemption for the return.
    pub personal_exemption: ByFilingStatus<Decimal>,
    pub dependent_exemption: Decimal,
    pub social_security_taxable: bool,
    pub retirement: RetirementTreatment,
    /// State earned income credit as a share of the federal credit.
    /// Refundable.
    pub eitc_rate: Decimal,
}

impl StateTaxConfig {
    /// A flat-rate state starting from federal AGI with no deductions,
    /// exemptions or credits; callers fill in the rest with struct update
    /// syntax.
    pub fn flat(
        state_code: &str,
        tax_year: i32,
        rate: Decimal,
    ) -> Self {
        Self {
            state_code: state_code.to_string(),
            tax_year,
            starting_income: StartingIncome::FederalAgi,
            brackets: ByFilingStatus::uniform(BracketSchedule::flat(rate)),
            standard_deduction: ByFilingStatus::uniform(Decimal::ZERO),
            personal_exemption: ByFilingStatus::uniform(Decimal::ZERO),
            dependent_exemption: Decimal::ZERO,
            social_security_taxable: false,
            retirement: RetirementTreatment::Taxable,
            eitc_rate: Decimal::ZERO,
        }
    }

    /// Checks bracket tables and rates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (status, schedule) in self.brackets.iter() {
            schedule.validate(&format!("{} {} {status}", self.state_code, self.tax_year))?;
        }
        if self.eitc_rate < Decimal::ZERO || self.eitc_rate > Decimal::ONE {
            return Err(ConfigError::RateOutOfRange {
                context: format!("{} earned income credit", self.state_code),
                rate: self.eitc_rate,
            });
        }
        Ok(())
    }
}

/// One addition to or subtraction from the starting income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAdjustment {
    pub label: String,
    pub amount: Decimal,
}

impl StateAdjustment {
    pub fn new(
        label: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCredit {
    pub label: String,
    pub amount: Decimal,
    pub refundable: bool,
    /// Amount applied after the liability limit.
    pub allowed_amount: Decimal,
}

impl StateCredit {
    pub fn nonrefundable(
        label: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            label: label.into(),
            amount,
            refundable: false,
            allowed_amount: Decimal::ZERO,
        }
    }

    pub fn refundable(
        label: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            refundable: true,
            ..Self::nonrefundable(label, amount)
        }
    }
}

/// State result for one return, shaped like the federal breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCalculationBreakdown {
    pub state_code: String,
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    pub starting_income: Decimal,
    pub additions: Vec<StateAdjustment>,
    pub subtractions: Vec<StateAdjustment>,
    pub state_agi: Decimal,
    pub deduction: Decimal,
    pub exemptions: Decimal,
    pub taxable_income: Decimal,
    pub tax: Decimal,
    pub spans: Vec<BracketSpan>,
    pub surtax: Decimal,
    pub tax_before_credits: Decimal,
    pub credits: Vec<StateCredit>,
    pub nonrefundable_credits: Decimal,
    pub refundable_credits: Decimal,
    pub tax_after_credits: Decimal,
    /// Tax after credits less refundable credits; negative when refundable
    /// credits exceed the tax.
    pub net_liability: Decimal,
    pub withholding: Decimal,
    pub estimated_payments: Decimal,
    pub balance_due: Decimal,
    pub refund: Decimal,
    pub effective_rate: Decimal,
    pub marginal_rate: Decimal,
}
