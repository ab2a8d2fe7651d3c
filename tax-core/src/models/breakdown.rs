//! Calculation output.
//!
//! Plain records meant to be serialized as-is. Every amount is already
//! rounded to the cent.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FilingStatus;
use crate::calculations::brackets::BracketSpan;
use crate::calculations::worksheets::{
    AmtResult, CapitalGainsResult, OtherTaxesResult, PassiveActivityResult, QbiResult,
    SeWorksheetResult, SocialSecurityResult, UnderpaymentResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditKind {
    ForeignTax,
    WorkOpportunity,
    DisabledAccess,
    SmallEmployerHealthInsurance,
    PensionStartup,
    DependentCare,
    ElderlyDisabled,
    AmericanOpportunity,
    LifetimeLearning,
    SaversCredit,
    ChildTax,
    OtherDependents,
    Adoption,
    EnergyEfficientHomeImprovement,
    ResidentialCleanEnergy,
    NewCleanVehicle,
    PreviouslyOwnedCleanVehicle,
    EarnedIncome,
    AdditionalChildTax,
    PremiumTax,
}

impl CreditKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ForeignTax => "foreign tax credit",
            Self::WorkOpportunity => "work opportunity credit",
            Self::DisabledAccess => "disabled access credit",
            Self::SmallEmployerHealthInsurance => "small employer health insurance credit",
            Self::PensionStartup => "small employer pension plan startup credit",
            Self::DependentCare => "child and dependent care credit",
            Self::ElderlyDisabled => "credit for the elderly or disabled",
            Self::AmericanOpportunity => "American opportunity credit",
            Self::LifetimeLearning => "lifetime learning credit",
            Self::SaversCredit => "retirement savings contributions credit",
            Self::ChildTax => "child tax credit",
            Self::OtherDependents => "credit for other dependents",
            Self::Adoption => "adoption credit",
            Self::EnergyEfficientHomeImprovement => "energy efficient home improvement credit",
            Self::ResidentialCleanEnergy => "residential clean energy credit",
            Self::NewCleanVehicle => "new clean vehicle credit",
            Self::PreviouslyOwnedCleanVehicle => "previously owned clean vehicle credit",
            Self::EarnedIncome => "earned income credit",
            Self::AdditionalChildTax => "additional child tax credit",
            Self::PremiumTax => "net premium tax credit",
        }
    }

    /// Components of the general business credit.
    pub fn is_business_credit(&self) -> bool {
        matches!(
            self,
            Self::WorkOpportunity
                | Self::DisabledAccess
                | Self::SmallEmployerHealthInsurance
                | Self::PensionStartup
        )
    }
}

impl fmt::Display for CreditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One child, student, employee or vehicle evaluated for a credit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitBreakdown {
    pub label: String,
    pub eligible: bool,
    pub disqualification_reason: Option<String>,
    pub amount: Decimal,
}

impl UnitBreakdown {
    pub fn eligible(
        label: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            label: label.into(),
            eligible: true,
            disqualification_reason: None,
            amount,
        }
    }

    pub fn ineligible(
        label: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            eligible: false,
            disqualification_reason: Some(reason.into()),
            amount: Decimal::ZERO,
        }
    }
}

/// How one credit was computed and how much of it was used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditBreakdown {
    pub credit: CreditKind,
    pub eligible: bool,
    /// Set whenever `eligible` is false, even when the amount is zero for
    /// other reasons too.
    pub disqualification_reason: Option<String>,
    /// Before phaseout and caps.
    pub tentative_amount: Decimal,
    pub phaseout_reduction: Decimal,
    /// Computed credit, before the tax-liability limit.
    pub amount: Decimal,
    /// Portion of `amount` paid regardless of liability.
    pub refundable_amount: Decimal,
    /// Amount actually applied: the refundable part plus the nonrefundable
    /// part that fit within the remaining liability.
    pub allowed_amount: Decimal,
    /// Unused amount carried to the next year.
    pub carryforward: Decimal,
    pub units: Vec<UnitBreakdown>,
    pub notes: Vec<String>,
}

impl CreditBreakdown {
    pub fn new(credit: CreditKind) -> Self {
        Self {
            credit,
            eligible: true,
            disqualification_reason: None,
            tentative_amount: Decimal::ZERO,
            phaseout_reduction: Decimal::ZERO,
            amount: Decimal::ZERO,
            refundable_amount: Decimal::ZERO,
            allowed_amount: Decimal::ZERO,
            carryforward: Decimal::ZERO,
            units: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn ineligible(
        credit: CreditKind,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            eligible: false,
            disqualification_reason: Some(reason.into()),
            ..Self::new(credit)
        }
    }

    /// Marks a credit that passed its eligibility tests but came to nothing,
    /// so a zero result always carries a reason.
    pub fn phased_out(
        mut self,
        reason: impl Into<String>,
    ) -> Self {
        if self.eligible && self.amount == Decimal::ZERO {
            self.eligible = false;
            self.disqualification_reason = Some(reason.into());
        }
        self
    }

    pub fn nonrefundable_amount(&self) -> Decimal {
        self.amount - self.refundable_amount
    }

    pub fn note(
        mut self,
        note: impl Into<String>,
    ) -> Self {
        self.notes.push(note.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeBreakdown {
    pub wages: Decimal,
    pub taxable_interest: Decimal,
    pub tax_exempt_interest: Decimal,
    pub ordinary_dividends: Decimal,
    pub qualified_dividends: Decimal,
    pub capital_gains: CapitalGainsResult,
    pub business_income: Decimal,
    pub farm_income: Decimal,
    pub rental: PassiveActivityResult,
    pub retirement_distributions: Decimal,
    pub social_security: SocialSecurityResult,
    pub unemployment: Decimal,
    pub k1_income: Decimal,
    pub virtual_currency: Decimal,
    pub alimony: Decimal,
    pub other: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentsBreakdown {
    pub self_employment_tax: Decimal,
    pub hsa: Decimal,
    pub educator_expenses: Decimal,
    pub self_employed_health_insurance: Decimal,
    pub self_employed_retirement: Decimal,
    pub early_withdrawal_penalty: Decimal,
    pub alimony_paid: Decimal,
    pub ira: Decimal,
    pub student_loan_interest: Decimal,
    pub total: Decimal,
    /// AGI before the IRA and student loan deductions; the MAGI those two
    /// phase out against.
    pub preliminary_agi: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedBreakdown {
    pub medical: Decimal,
    pub taxes: Decimal,
    pub interest: Decimal,
    pub charitable: Decimal,
    pub casualty: Decimal,
    pub other: Decimal,
    pub total: Decimal,
    /// Contributions over the AGI limits, carried forward.
    pub charitable_carryforward: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionBreakdown {
    pub standard: Decimal,
    pub itemized: ItemizedBreakdown,
    pub used_itemized: bool,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegularTaxBreakdown {
    /// Ordinary income taxed through the brackets.
    pub ordinary_income: Decimal,
    /// Net capital gain and qualified dividends taxed at preferential rates.
    pub preferential_income: Decimal,
    pub ordinary_tax: Decimal,
    pub preferential_tax: Decimal,
    pub tax: Decimal,
    pub spans: Vec<BracketSpan>,
    pub marginal_rate: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherTaxesBreakdown {
    #[serde(flatten)]
    pub schedule_2: OtherTaxesResult,
    pub clean_vehicle_recapture: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentsBreakdown {
    pub withholding: Decimal,
    pub estimated_payments: Decimal,
    pub extension_payment: Decimal,
    pub excess_social_security: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carryforwards {
    pub capital_loss_short_term: Decimal,
    pub capital_loss_long_term: Decimal,
    pub passive_losses: Decimal,
    pub charitable: Decimal,
    pub general_business_credit: Decimal,
    pub foreign_tax_credit: Decimal,
    pub adoption_credit: Decimal,
    pub residential_clean_energy_credit: Decimal,
}

/// Federal result for one return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationBreakdown {
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    pub income: IncomeBreakdown,
    pub gross_income: Decimal,
    pub adjustments: AdjustmentsBreakdown,
    pub agi: Decimal,
    pub deductions: DeductionBreakdown,
    pub qbi: QbiResult,
    pub taxable_income: Decimal,
    pub regular_tax: RegularTaxBreakdown,
    pub amt: AmtResult,
    /// Regular tax, AMT and excess advance premium tax credit repayment.
    pub tax_before_credits: Decimal,
    /// Every credit evaluated, in application order.
    pub credits: Vec<CreditBreakdown>,
    pub nonrefundable_credits: Decimal,
    pub tax_after_credits: Decimal,
    pub self_employment: SeWorksheetResult,
    pub other_taxes: OtherTaxesBreakdown,
    pub total_tax: Decimal,
    pub refundable_credits: Decimal,
    /// Total tax less refundable credits; negative when refundable credits
    /// exceed the tax.
    pub net_liability: Decimal,
    pub payments: PaymentsBreakdown,
    pub balance_due: Decimal,
    pub refund: Decimal,
    pub underpayment: UnderpaymentResult,
    pub carryforwards: Carryforwards,
    /// Total tax over AGI, four decimal places.
    pub effective_rate: Decimal,
    pub marginal_rate: Decimal,
}

impl CalculationBreakdown {
    pub fn credit(
        &self,
        kind: CreditKind,
    ) -> Option<&CreditBreakdown> {
        self.credits.iter().find(|c| c.credit == kind)
    }

    /// Allowed amount of `kind`, zero when it was not evaluated.
    pub fn credit_allowed(
        &self,
        kind: CreditKind,
    ) -> Decimal {
        self.credit(kind).map_or(Decimal::ZERO, |c| c.allowed_amount)
    }
}
