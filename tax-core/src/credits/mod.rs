//! Credit calculators.
//!
//! Each calculator is a pure function of the credit's own facts, a
//! [`CreditContext`] carrying the AGI-level figures the engine has already
//! computed, and the year's config. Disqualification is a normal result with
//! a reason on the breakdown, never an error. Limiting nonrefundable credits
//! to the remaining liability is the engine's job; calculators report the
//! full computed amount.

pub mod adoption;
pub mod business;
pub mod child_tax;
pub mod clean_vehicle;
pub mod dependent_care;
pub mod earned_income;
pub mod education;
pub mod elderly_disabled;
pub mod energy;
pub mod foreign_tax;
pub mod premium_tax;
pub mod savers;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Dependent, DependentStatus, FilingStatus, Owner, Person};

pub use adoption::AdoptionConfig;
pub use business::{
    BusinessCreditConfig, DisabledAccessConfig, GeneralBusinessConfig, PensionStartupConfig,
    SmallEmployerHealthConfig, WotcConfig,
};
pub use child_tax::{ChildTaxCreditConfig, ChildTaxCredits};
pub use clean_vehicle::{CleanVehicleConfig, CleanVehicleCredits};
pub use dependent_care::DependentCareConfig;
pub use earned_income::{EitcConfig, EitcTier};
pub use education::{EducationConfig, EducationCredits};
pub use elderly_disabled::ElderlyDisabledConfig;
pub use energy::EnergyCreditConfig;
pub use foreign_tax::ForeignTaxConfig;
pub use premium_tax::{ApplicablePercentageBand, PremiumTaxConfig, PremiumTaxResult, RepaymentCap};
pub use savers::{SaversCreditConfig, SaversTiers};

/// Every credit's year-scoped constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsConfig {
    pub earned_income: EitcConfig,
    pub child_tax: ChildTaxCreditConfig,
    pub dependent_care: DependentCareConfig,
    pub education: EducationConfig,
    pub savers: SaversCreditConfig,
    pub energy: EnergyCreditConfig,
    pub clean_vehicle: CleanVehicleConfig,
    pub adoption: AdoptionConfig,
    pub elderly_disabled: ElderlyDisabledConfig,
    pub foreign_tax: ForeignTaxConfig,
    pub premium_tax: PremiumTaxConfig,
    pub business: BusinessCreditConfig,
}

/// A dependent after the qualifying child/relative tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedDependent {
    pub dependent: Dependent,
    pub status: DependentStatus,
}

impl ClassifiedDependent {
    pub fn name(&self) -> &str {
        &self.dependent.name
    }

    pub fn is_qualifying_child(&self) -> bool {
        self.status == DependentStatus::QualifyingChild
    }

    pub fn is_dependent(&self) -> bool {
        self.status.is_dependent()
    }
}

/// AGI-level figures shared by the calculators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditContext {
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    pub agi: Decimal,
    /// AGI plus excluded foreign income; equal to AGI for most returns.
    pub magi: Decimal,
    /// Wages plus net self-employment earnings.
    pub earned_income: Decimal,
    pub primary_earned_income: Decimal,
    pub spouse_earned_income: Decimal,
    pub investment_income: Decimal,
    pub primary: Person,
    /// Present on joint returns only.
    pub spouse: Option<Person>,
    pub lived_with_spouse: bool,
    pub dependents: Vec<ClassifiedDependent>,
}

impl CreditContext {
    pub fn filers(&self) -> Vec<(Owner, &Person)> {
        let mut filers = vec![(Owner::Primary, &self.primary)];
        if let Some(spouse) = &self.spouse {
            filers.push((Owner::Spouse, spouse));
        }
        filers
    }

    pub fn earned_income_of(
        &self,
        owner: Owner,
    ) -> Decimal {
        match owner {
            Owner::Primary => self.primary_earned_income,
            Owner::Spouse => self.spouse_earned_income,
        }
    }

    /// Married filing separately while living with the spouse; bars most
    /// personal credits.
    pub fn separate_and_living_together(&self) -> bool {
        self.filing_status.is_married_separate() && self.lived_with_spouse
    }

    pub fn find_dependent(
        &self,
        name: &str,
    ) -> Option<&ClassifiedDependent> {
        self.dependents.iter().find(|d| d.name() == name)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rust_decimal::Decimal;

    use super::*;

    pub fn context(
        filing_status: FilingStatus,
        agi: Decimal,
    ) -> CreditContext {
        CreditContext {
            tax_year: 2025,
            filing_status,
            agi,
            magi: agi,
            earned_income: agi,
            primary_earned_income: agi,
            spouse_earned_income: Decimal::ZERO,
            investment_income: Decimal::ZERO,
            primary: Person {
                age: 35,
                ..Person::default()
            },
            spouse: filing_status.is_joint().then(|| Person {
                age: 35,
                ..Person::default()
            }),
            lived_with_spouse: true,
            dependents: Vec::new(),
        }
    }

    pub fn child(
        name: &str,
        age: u32,
    ) -> ClassifiedDependent {
        ClassifiedDependent {
            dependent: Dependent {
                name: name.to_string(),
                age,
                ..Dependent::default()
            },
            status: DependentStatus::QualifyingChild,
        }
    }

    pub fn relative(name: &str) -> ClassifiedDependent {
        ClassifiedDependent {
            dependent: Dependent {
                name: name.to_string(),
                age: 70,
                taxpayer_is_parent: false,
                ..Dependent::default()
            },
            status: DependentStatus::QualifyingRelative,
        }
    }
}
