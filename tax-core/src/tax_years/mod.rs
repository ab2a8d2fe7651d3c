//! Built-in year configurations.
//!
//! Figures are the inflation-adjusted amounts published for each year.
//! Amounts that have not changed since enactment are shared here; each year
//! module supplies what the annual revenue procedure adjusts.

mod y2024;
mod y2025;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::calculations::deductions::ItemizedConfig;
use crate::calculations::worksheets::{
    OtherTaxesConfig, PassiveLossConfig, SocialSecurityConfig, UnderpaymentConfig,
};
use crate::credits::{
    ApplicablePercentageBand, BusinessCreditConfig, ChildTaxCreditConfig, CleanVehicleConfig,
    DependentCareConfig, DisabledAccessConfig, EitcTier, ElderlyDisabledConfig,
    EnergyCreditConfig, ForeignTaxConfig, GeneralBusinessConfig, PensionStartupConfig,
    RepaymentCap, SmallEmployerHealthConfig, WotcConfig,
};
use crate::error::ValidationError;
use crate::models::{BracketSchedule, ByFilingStatus, PhaseoutRange, TaxYearConfig};

pub const SUPPORTED_YEARS: [i32; 2] = [2024, 2025];

/// Configuration for a supported year.
pub fn builtin(tax_year: i32) -> Result<TaxYearConfig, ValidationError> {
    match tax_year {
        2024 => Ok(y2024::config()),
        2025 => Ok(y2025::config()),
        _ => Err(ValidationError::UnsupportedTaxYear(tax_year)),
    }
}

const ORDINARY_RATES: [Decimal; 7] = [
    dec!(0.10),
    dec!(0.12),
    dec!(0.22),
    dec!(0.24),
    dec!(0.32),
    dec!(0.35),
    dec!(0.37),
];

/// Seven-bracket ordinary schedule from the lower bounds of brackets two
/// through seven.
fn ordinary(thresholds: [Decimal; 6]) -> BracketSchedule {
    let mut pairs = vec![(Decimal::ZERO, ORDINARY_RATES[0])];
    pairs.extend(thresholds.into_iter().zip(ORDINARY_RATES[1..].iter().copied()));
    BracketSchedule::from_pairs(&pairs)
}

/// 0/15/20% schedule from the tops of the 0% and 15% bands.
fn capital_gains(
    zero_rate_top: Decimal,
    fifteen_rate_top: Decimal,
) -> BracketSchedule {
    BracketSchedule::from_pairs(&[
        (Decimal::ZERO, Decimal::ZERO),
        (zero_rate_top, dec!(0.15)),
        (fifteen_rate_top, dec!(0.20)),
    ])
}

fn eitc_tier(
    max_credit: Decimal,
    earned_income_amount: Decimal,
    phase_in_rate: Decimal,
    phaseout_rate: Decimal,
    phaseout_start: Decimal,
    phaseout_start_joint: Decimal,
) -> EitcTier {
    EitcTier {
        max_credit,
        earned_income_amount,
        phase_in_rate,
        phaseout_rate,
        phaseout_start,
        phaseout_start_joint,
    }
}

fn itemized() -> ItemizedConfig {
    ItemizedConfig {
        medical_floor_rate: dec!(0.075),
        salt_cap: ByFilingStatus::new(
            dec!(10000),
            dec!(10000),
            dec!(5000),
            dec!(10000),
            dec!(10000),
        ),
        mortgage_debt_limit: ByFilingStatus::new(
            dec!(750000),
            dec!(750000),
            dec!(375000),
            dec!(750000),
            dec!(750000),
        ),
        charitable_cash_limit_rate: dec!(0.60),
        charitable_noncash_limit_rate: dec!(0.30),
    }
}

fn capital_loss_limit() -> ByFilingStatus<Decimal> {
    ByFilingStatus::new(dec!(3000), dec!(3000), dec!(1500), dec!(3000), dec!(3000))
}

fn social_security() -> SocialSecurityConfig {
    // MFS filers who lived apart use the single amounts; those living
    // together are handled by the worksheet directly.
    SocialSecurityConfig {
        base_amount: ByFilingStatus::joint_and_other(dec!(32000), dec!(25000)),
        adjusted_base_amount: ByFilingStatus::joint_and_other(dec!(44000), dec!(34000)),
        lower_rate: dec!(0.50),
        upper_rate: dec!(0.85),
    }
}

fn passive() -> PassiveLossConfig {
    PassiveLossConfig {
        special_allowance: dec!(25000),
        phaseout_start: dec!(100000),
        phaseout_rate: dec!(0.50),
    }
}

fn other_taxes() -> OtherTaxesConfig {
    // Neither threshold is indexed for inflation.
    let threshold = ByFilingStatus::new(
        dec!(200000),
        dec!(250000),
        dec!(125000),
        dec!(200000),
        dec!(250000),
    );
    OtherTaxesConfig {
        additional_medicare_rate: dec!(0.009),
        additional_medicare_threshold: threshold.clone(),
        niit_rate: dec!(0.038),
        niit_threshold: threshold,
        early_distribution_rate: dec!(0.10),
    }
}

fn penalty(underpayment_rate: Decimal) -> UnderpaymentConfig {
    UnderpaymentConfig {
        underpayment_rate,
        current_year_factor: dec!(0.90),
        farmer_current_year_factor: dec!(2) / dec!(3),
        prior_year_factor: dec!(1.00),
        high_income_prior_year_factor: dec!(1.10),
        high_income_agi: ByFilingStatus::new(
            dec!(150000),
            dec!(150000),
            dec!(75000),
            dec!(150000),
            dec!(150000),
        ),
        de_minimis: dec!(1000),
    }
}

fn child_tax() -> ChildTaxCreditConfig {
    ChildTaxCreditConfig {
        credit_per_child: dec!(2000),
        other_dependent_credit: dec!(500),
        refundable_per_child: dec!(1700),
        child_age_limit: 17,
        phaseout_threshold: ByFilingStatus::joint_and_other(dec!(400000), dec!(200000)),
        phaseout_step: dec!(1000),
        phaseout_per_step: dec!(50),
        earned_income_threshold: dec!(2500),
        refundable_rate: dec!(0.15),
    }
}

fn dependent_care() -> DependentCareConfig {
    DependentCareConfig {
        expense_limit_one: dec!(3000),
        expense_limit_two_or_more: dec!(6000),
        max_rate: dec!(0.35),
        min_rate: dec!(0.20),
        rate_reduction_start: dec!(15000),
        rate_reduction_step: dec!(2000),
        rate_reduction_per_step: dec!(0.01),
        age_limit: 13,
        deemed_monthly_income_one: dec!(250),
        deemed_monthly_income_two_or_more: dec!(500),
    }
}

fn education_phaseout() -> ByFilingStatus<PhaseoutRange> {
    ByFilingStatus::joint_and_other(
        PhaseoutRange::new(dec!(160000), dec!(180000)),
        PhaseoutRange::new(dec!(80000), dec!(90000)),
    )
}

fn energy() -> EnergyCreditConfig {
    EnergyCreditConfig {
        improvement_rate: dec!(0.30),
        aggregate_limit: dec!(1200),
        heat_pump_limit: dec!(2000),
        windows_limit: dec!(600),
        door_limit: dec!(250),
        doors_total_limit: dec!(500),
        energy_property_limit: dec!(600),
        audit_limit: dec!(150),
        clean_energy_rate: dec!(0.30),
        battery_min_kwh: dec!(3),
        fuel_cell_limit_per_half_kw: dec!(500),
    }
}

fn clean_vehicle() -> CleanVehicleConfig {
    CleanVehicleConfig {
        critical_mineral_credit: dec!(3750),
        battery_component_credit: dec!(3750),
        msrp_limit_large: dec!(80000),
        msrp_limit_other: dec!(55000),
        new_magi_limit: ByFilingStatus::joint_hoh_other(dec!(300000), dec!(225000), dec!(150000)),
        used_credit_cap: dec!(4000),
        used_credit_rate: dec!(0.30),
        used_price_limit: dec!(25000),
        used_magi_limit: ByFilingStatus::joint_hoh_other(dec!(150000), dec!(112500), dec!(75000)),
        used_min_age_years: 2,
        effective_after: NaiveDate::from_ymd_opt(2022, 8, 16).unwrap_or(NaiveDate::MIN),
    }
}

fn elderly_disabled() -> ElderlyDisabledConfig {
    ElderlyDisabledConfig {
        qualifying_age: 65,
        initial_amount: dec!(5000),
        initial_amount_both: dec!(7500),
        initial_amount_separate: dec!(3750),
        agi_threshold: ByFilingStatus::new(
            dec!(7500),
            dec!(10000),
            dec!(5000),
            dec!(7500),
            dec!(7500),
        ),
        agi_reduction_rate: dec!(0.50),
        credit_rate: dec!(0.15),
    }
}

fn foreign_tax() -> ForeignTaxConfig {
    ForeignTaxConfig {
        simplified_limit: ByFilingStatus::joint_and_other(dec!(600), dec!(300)),
    }
}

/// Applicable percentage table in effect through 2025.
fn applicable_percentages() -> Vec<ApplicablePercentageBand> {
    let band = |lower, upper, initial, final_percentage| ApplicablePercentageBand {
        lower_fpl_percent: lower,
        upper_fpl_percent: upper,
        initial_percentage: initial,
        final_percentage,
    };
    vec![
        band(dec!(0), Some(dec!(150)), dec!(0), dec!(0)),
        band(dec!(150), Some(dec!(200)), dec!(0), dec!(2)),
        band(dec!(200), Some(dec!(250)), dec!(2), dec!(4)),
        band(dec!(250), Some(dec!(300)), dec!(4), dec!(6)),
        band(dec!(300), Some(dec!(400)), dec!(6), dec!(8.5)),
        band(dec!(400), None, dec!(8.5), dec!(8.5)),
    ]
}

/// Repayment caps as (single, other) for under 200%, 300% and 400% of the
/// poverty line.
fn repayment_caps(caps: [(Decimal, Decimal); 3]) -> Vec<RepaymentCap> {
    [dec!(200), dec!(300), dec!(400)]
        .into_iter()
        .zip(caps)
        .map(|(below_fpl_percent, (single, other))| RepaymentCap {
            below_fpl_percent,
            single,
            other,
        })
        .collect()
}

fn business(small_employer_wage_limit: Decimal) -> BusinessCreditConfig {
    BusinessCreditConfig {
        work_opportunity: WotcConfig {
            full_rate: dec!(0.40),
            partial_rate: dec!(0.25),
            full_rate_hours: 400,
            min_hours: 120,
            general_wage_cap: dec!(6000),
            disabled_veteran_wage_cap: dec!(12000),
            disabled_veteran_long_unemployed_wage_cap: dec!(24000),
            veteran_long_unemployed_wage_cap: dec!(14000),
            summer_youth_wage_cap: dec!(3000),
            long_term_family_assistance_wage_cap: dec!(10000),
            second_year_rate: dec!(0.50),
        },
        disabled_access: DisabledAccessConfig {
            rate: dec!(0.50),
            expenditure_floor: dec!(250),
            expenditure_ceiling: dec!(10250),
            max_gross_receipts: dec!(1000000),
            max_full_time_employees: 30,
        },
        small_employer_health: SmallEmployerHealthConfig {
            rate: dec!(0.50),
            tax_exempt_rate: dec!(0.35),
            max_fte: dec!(25),
            fte_phaseout_start: dec!(10),
            fte_phaseout_range: dec!(15),
            wage_limit: small_employer_wage_limit,
            wage_phaseout_start: small_employer_wage_limit / dec!(2),
            max_years: 2,
        },
        pension_startup: PensionStartupConfig {
            full_rate_max_employees: 50,
            full_rate: dec!(1.00),
            reduced_rate: dec!(0.50),
            min_credit: dec!(500),
            per_eligible_employee: dec!(250),
            max_credit: dec!(5000),
            auto_enrollment_credit: dec!(500),
            max_plan_year: 3,
            max_employees: 100,
        },
        general: GeneralBusinessConfig {
            regular_tax_floor: dec!(25000),
            floor_rate: dec!(0.25),
        },
    }
}
