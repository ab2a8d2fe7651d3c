//! Facts each credit needs for its eligibility test.
//!
//! None of these carry AGI or filing status; the engine passes those in at
//! calculation time so the same inputs survive what-if recomputation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Owner;

/// Care expenses paid for one qualifying person (Form 2441).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildCareExpense {
    /// Name of the child under 13 or disabled dependent or spouse.
    pub qualifying_person: String,
    pub provider: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependentCare {
    pub expenses: Vec<ChildCareExpense>,
    /// Dependent care benefits excluded from wages (W-2 box 10).
    pub employer_benefits: Decimal,
}

impl DependentCare {
    pub fn qualifying_person_count(&self) -> usize {
        let mut names: Vec<&str> = self
            .expenses
            .iter()
            .filter(|e| e.amount > Decimal::ZERO)
            .map(|e| e.qualifying_person.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }
}

/// One student's education expenses (Form 8863).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Student {
    pub name: String,
    pub qualified_expenses: Decimal,
    /// Tax-free scholarships and grants that reduce qualified expenses.
    pub tax_free_assistance: Decimal,
    /// Enrolled at least half time in a degree program.
    pub half_time_student: bool,
    pub completed_first_four_years: bool,
    /// Tax years the American opportunity credit was already claimed.
    pub prior_aotc_years: u8,
    pub felony_drug_conviction: bool,
    /// Claim the lifetime learning credit instead of the AOTC.
    pub elect_lifetime_learning: bool,
}

impl Student {
    pub fn net_expenses(&self) -> Decimal {
        (self.qualified_expenses - self.tax_free_assistance).max(Decimal::ZERO)
    }
}

/// Elective deferrals and IRA contributions for the saver's credit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetirementContribution {
    pub owner: Owner,
    pub amount: Decimal,
    /// Distributions received during the testing period, which reduce
    /// eligible contributions.
    pub distributions_received: Decimal,
}

/// Energy efficient home improvement items (Form 5695, Part II).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyImprovements {
    /// Insulation and air sealing materials.
    pub insulation: Decimal,
    pub windows_and_skylights: Decimal,
    /// Cost of each exterior door.
    pub exterior_doors: Vec<Decimal>,
    /// Central air, gas water heaters, furnaces, boilers, panel upgrades;
    /// each item separately capped.
    pub energy_property: Vec<Decimal>,
    /// Heat pumps, heat pump water heaters and biomass stoves.
    pub heat_pumps: Decimal,
    pub home_energy_audit: Decimal,
}

/// Residential clean energy property (Form 5695, Part I).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanEnergyProperty {
    pub solar_electric: Decimal,
    pub solar_water_heating: Decimal,
    pub small_wind: Decimal,
    pub geothermal_heat_pump: Decimal,
    pub battery_storage: Decimal,
    pub battery_capacity_kwh: Decimal,
    pub fuel_cell: Decimal,
    pub fuel_cell_kilowatts: Decimal,
    /// Unused credit carried forward from the prior year.
    pub prior_year_carryforward: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCondition {
    #[default]
    New,
    PreviouslyOwned,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    #[default]
    Car,
    Van,
    SportUtility,
    Pickup,
}

impl VehicleClass {
    /// Vans, SUVs and pickups use the higher MSRP limit.
    pub fn uses_higher_msrp_limit(&self) -> bool {
        !matches!(self, Self::Car)
    }
}

/// Form 8936 vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanVehiclePurchase {
    pub vin: String,
    pub condition: VehicleCondition,
    pub class: VehicleClass,
    pub model_year: i32,
    pub purchase_price: Decimal,
    pub msrp: Decimal,
    pub acquired_on: NaiveDate,
    pub meets_critical_mineral_requirement: bool,
    pub meets_battery_component_requirement: bool,
    /// Credit transferred to the dealer at the time of sale.
    pub transferred_to_dealer: bool,
    /// Bought for resale or business use; not eligible for the personal credit.
    pub for_resale: bool,
    /// Used vehicle: first qualified resale and bought from a dealer.
    pub qualified_used_sale: bool,
    /// Modified AGI for the preceding year, when known.
    pub prior_year_magi: Option<Decimal>,
}

impl Default for CleanVehiclePurchase {
    fn default() -> Self {
        Self {
            vin: String::new(),
            condition: VehicleCondition::New,
            class: VehicleClass::Car,
            model_year: 0,
            purchase_price: Decimal::ZERO,
            msrp: Decimal::ZERO,
            acquired_on: NaiveDate::MIN,
            meets_critical_mineral_requirement: false,
            meets_battery_component_requirement: false,
            transferred_to_dealer: false,
            for_resale: false,
            qualified_used_sale: true,
            prior_year_magi: None,
        }
    }
}

/// One adoption (Form 8839).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdoptionInfo {
    pub child_name: String,
    pub qualified_expenses: Decimal,
    /// Expenses for this child claimed in earlier years.
    pub prior_year_expenses_claimed: Decimal,
    /// Employer adoption benefits excluded from income.
    pub employer_benefits: Decimal,
    pub special_needs: bool,
    pub adoption_final: bool,
    pub foreign_adoption: bool,
}

/// Schedule R facts not held on [`Person`](super::Person).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElderlyDisabledInfo {
    /// Taxable disability income of a filer under 65.
    pub primary_disability_income: Decimal,
    pub spouse_disability_income: Decimal,
    /// Nontaxable social security, pensions and annuities.
    pub nontaxable_pensions: Decimal,
}

/// Foreign taxes paid on one category of income (Form 1116).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForeignTaxInfo {
    pub country: String,
    pub foreign_source_income: Decimal,
    pub foreign_tax_paid: Decimal,
    /// Passive category income reported on a payee statement.
    pub passive_category: bool,
}

/// Form 1095-A totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceCoverage {
    pub annual_premium: Decimal,
    /// Second lowest cost silver plan premium.
    pub annual_slcsp: Decimal,
    pub advance_payments: Decimal,
    pub household_size: u32,
    pub months_covered: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetGroup {
    #[default]
    General,
    /// Veteran entitled to compensation for a service-connected disability.
    DisabledVeteran,
    /// Disabled veteran unemployed six months or more.
    DisabledVeteranLongUnemployed,
    /// Veteran unemployed six months or more.
    VeteranLongUnemployed,
    SummerYouth,
    /// Long-term family assistance recipient.
    LongTermFamilyAssistance,
}

/// A new hire in a WOTC target group (Form 5884).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WotcEmployee {
    pub name: String,
    pub target_group: TargetGroup,
    pub first_year_wages: Decimal,
    /// Long-term family assistance recipients only.
    pub second_year_wages: Decimal,
    pub hours_worked: u32,
    /// Form 8850 certified by the state workforce agency.
    pub certified: bool,
}

/// One accessibility expenditure (Form 8826).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisabledAccessExpenditure {
    pub description: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisabledAccessInfo {
    pub expenditures: Vec<DisabledAccessExpenditure>,
    pub prior_year_gross_receipts: Decimal,
    pub prior_year_full_time_employees: u32,
}

/// Form 8941.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmallEmployerHealthInfo {
    pub premiums_paid: Decimal,
    pub full_time_equivalents: Decimal,
    pub average_annual_wages: Decimal,
    pub tax_exempt_employer: bool,
    /// Coverage purchased through a SHOP marketplace.
    pub shop_coverage: bool,
    /// Employer pays at least 50% of each employee's premium.
    pub uniform_contribution: bool,
    /// Taxable years the credit was already claimed (limit two).
    pub prior_years_claimed: u8,
}

/// Form 8881.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PensionStartupInfo {
    pub startup_costs: Decimal,
    pub employees: u32,
    /// Non-highly compensated employees eligible to participate.
    pub eligible_nhce: u32,
    pub auto_enrollment: bool,
    /// First, second or third year of the plan.
    pub plan_year: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxCredits {
    pub dependent_care: DependentCare,
    pub students: Vec<Student>,
    pub retirement_contributions: Vec<RetirementContribution>,
    pub energy_improvements: EnergyImprovements,
    pub clean_energy: CleanEnergyProperty,
    pub clean_vehicles: Vec<CleanVehiclePurchase>,
    pub adoptions: Vec<AdoptionInfo>,
    /// Unused adoption credit from the prior five years.
    pub adoption_carryforward: Decimal,
    pub elderly_disabled: ElderlyDisabledInfo,
    pub foreign_taxes: Vec<ForeignTaxInfo>,
    pub marketplace_coverage: Option<MarketplaceCoverage>,
    pub wotc_employees: Vec<WotcEmployee>,
    pub disabled_access: Option<DisabledAccessInfo>,
    pub small_employer_health: Option<SmallEmployerHealthInfo>,
    pub pension_startup: Option<PensionStartupInfo>,
    /// Unused general business credit from prior years.
    pub business_credit_carryforward: Decimal,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn qualifying_person_count_deduplicates_names() {
        let care = DependentCare {
            expenses: vec![
                ChildCareExpense {
                    qualifying_person: "Ada".to_string(),
                    amount: dec!(1500),
                    ..ChildCareExpense::default()
                },
                ChildCareExpense {
                    qualifying_person: "Ada".to_string(),
                    amount: dec!(800),
                    ..ChildCareExpense::default()
                },
                ChildCareExpense {
                    qualifying_person: "Ben".to_string(),
                    amount: dec!(0),
                    ..ChildCareExpense::default()
                },
            ],
            ..DependentCare::default()
        };

        assert_eq!(care.qualifying_person_count(), 1);
    }

    #[test]
    fn student_net_expenses_floor_at_zero() {
        let student = Student {
            qualified_expenses: dec!(3000),
            tax_free_assistance: dec!(5000),
            ..Student::default()
        };

        assert_eq!(student.net_expenses(), dec!(0));
    }
}
