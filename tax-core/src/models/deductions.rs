use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Owner;

/// Schedule A inputs. Limits (SALT cap, AGI floors) are applied by the
/// engine, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemizedDeductions {
    pub medical_expenses: Decimal,
    pub state_local_income_tax: Decimal,
    pub real_estate_tax: Decimal,
    pub personal_property_tax: Decimal,
    pub mortgage_interest: Decimal,
    /// Average acquisition-debt principal, for the $750,000 limit.
    pub mortgage_principal: Decimal,
    pub investment_interest: Decimal,
    pub charitable_cash: Decimal,
    pub charitable_noncash: Decimal,
    /// Charitable contributions carried over from prior years.
    pub charitable_carryover: Decimal,
    /// Federally declared disaster losses, after the $100 floor.
    pub casualty_losses: Decimal,
    pub other: Decimal,
}

impl ItemizedDeductions {
    pub fn taxes_before_cap(&self) -> Decimal {
        self.state_local_income_tax + self.real_estate_tax + self.personal_property_tax
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HsaCoverage {
    #[default]
    SelfOnly,
    Family,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IraContribution {
    pub owner: Owner,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HsaContribution {
    pub owner: Owner,
    pub coverage: HsaCoverage,
    /// Contributions made by the taxpayer, not through payroll.
    pub personal_contributions: Decimal,
    /// Employer and cafeteria-plan contributions (W-2 box 12 code W).
    pub employer_contributions: Decimal,
    /// Months of HDHP coverage; the limit is prorated under 12.
    pub months_covered: u8,
}

/// Above-the-line adjustments (Schedule 1, Part II).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adjustments {
    pub traditional_ira: Vec<IraContribution>,
    pub hsa: Vec<HsaContribution>,
    pub student_loan_interest: Decimal,
    pub educator_expenses: Decimal,
    pub self_employed_health_insurance: Decimal,
    /// SEP, SIMPLE and qualified plan contributions.
    pub self_employed_retirement: Decimal,
    pub early_withdrawal_penalty: Decimal,
    /// Paid under a divorce instrument executed before 2019.
    pub alimony_paid: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deductions {
    /// Itemize even when the standard deduction is larger.
    pub force_itemize: bool,
    pub itemized: ItemizedDeductions,
    pub adjustments: Adjustments,
}
