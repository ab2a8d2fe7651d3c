//! Tax year 2025 (Rev. Proc. 2024-40).

use rust_decimal_macros::dec;

use super::*;
use crate::calculations::adjustments::{
    AdjustmentsConfig, HsaConfig, IraConfig, StudentLoanConfig,
};
use crate::calculations::deductions::StandardDeductionConfig;
use crate::calculations::worksheets::{AmtConfig, QbiConfig, SeWorksheetConfig};
use crate::credits::{
    AdoptionConfig, CreditsConfig, EducationConfig, EitcConfig, PremiumTaxConfig,
    SaversCreditConfig, SaversTiers,
};
use crate::models::{CapitalGainsConfig, DependentConfig};

pub(super) fn config() -> TaxYearConfig {
    TaxYearConfig {
        tax_year: 2025,
        ordinary_brackets: ByFilingStatus::new(
            ordinary([
                dec!(11925),
                dec!(48475),
                dec!(103350),
                dec!(197300),
                dec!(250525),
                dec!(626350),
            ]),
            ordinary([
                dec!(23850),
                dec!(96950),
                dec!(206700),
                dec!(394600),
                dec!(501050),
                dec!(751600),
            ]),
            ordinary([
                dec!(11925),
                dec!(48475),
                dec!(103350),
                dec!(197300),
                dec!(250525),
                dec!(375800),
            ]),
            ordinary([
                dec!(17000),
                dec!(64850),
                dec!(103350),
                dec!(197300),
                dec!(250500),
                dec!(626350),
            ]),
            ordinary([
                dec!(23850),
                dec!(96950),
                dec!(206700),
                dec!(394600),
                dec!(501050),
                dec!(751600),
            ]),
        ),
        capital_gains: CapitalGainsConfig {
            schedule: ByFilingStatus::new(
                capital_gains(dec!(48350), dec!(533400)),
                capital_gains(dec!(96700), dec!(600050)),
                capital_gains(dec!(48350), dec!(300000)),
                capital_gains(dec!(64750), dec!(566700)),
                capital_gains(dec!(96700), dec!(600050)),
            ),
            loss_limit: capital_loss_limit(),
        },
        standard_deduction: StandardDeductionConfig {
            base: ByFilingStatus::new(
                dec!(15000),
                dec!(30000),
                dec!(15000),
                dec!(22500),
                dec!(30000),
            ),
            additional_married: dec!(1600),
            additional_unmarried: dec!(2000),
            dependent_minimum: dec!(1350),
            dependent_earned_addition: dec!(450),
            additional_age: 65,
        },
        itemized: itemized(),
        self_employment: SeWorksheetConfig {
            ss_wage_max: dec!(176100),
            ss_tax_rate: dec!(0.124),
            medicare_tax_rate: dec!(0.029),
            net_earnings_factor: dec!(0.9235),
            deduction_factor: dec!(0.50),
            min_se_threshold: dec!(400),
        },
        social_security: social_security(),
        passive: passive(),
        qbi: QbiConfig {
            deduction_rate: dec!(0.20),
            threshold: ByFilingStatus::joint_and_other(dec!(394600), dec!(197300)),
            phase_in_range: ByFilingStatus::joint_and_other(dec!(100000), dec!(50000)),
            wage_rate: dec!(0.50),
            wage_with_ubia_rate: dec!(0.25),
            ubia_rate: dec!(0.025),
        },
        amt: AmtConfig {
            exemption: ByFilingStatus::new(
                dec!(88100),
                dec!(137000),
                dec!(68500),
                dec!(88100),
                dec!(137000),
            ),
            phaseout_start: ByFilingStatus::joint_and_other(dec!(1252700), dec!(626350)),
            phaseout_rate: dec!(0.25),
            rate_breakpoint: ByFilingStatus::new(
                dec!(239100),
                dec!(239100),
                dec!(119550),
                dec!(239100),
                dec!(239100),
            ),
            lower_rate: dec!(0.26),
            upper_rate: dec!(0.28),
        },
        other_taxes: other_taxes(),
        adjustments: AdjustmentsConfig {
            ira: IraConfig {
                contribution_limit: dec!(7000),
                catch_up: dec!(1000),
                catch_up_age: 50,
                covered_phaseout: ByFilingStatus::new(
                    PhaseoutRange::new(dec!(79000), dec!(89000)),
                    PhaseoutRange::new(dec!(126000), dec!(146000)),
                    PhaseoutRange::new(dec!(0), dec!(10000)),
                    PhaseoutRange::new(dec!(79000), dec!(89000)),
                    PhaseoutRange::new(dec!(126000), dec!(146000)),
                ),
                spouse_covered_phaseout: PhaseoutRange::new(dec!(236000), dec!(246000)),
                rounding_multiple: dec!(10),
                minimum_limit: dec!(200),
            },
            hsa: HsaConfig {
                self_only_limit: dec!(4300),
                family_limit: dec!(8550),
                catch_up: dec!(1000),
                catch_up_age: 55,
            },
            student_loan: StudentLoanConfig {
                max_deduction: dec!(2500),
                phaseout: ByFilingStatus::joint_and_other(
                    PhaseoutRange::new(dec!(170000), dec!(200000)),
                    PhaseoutRange::new(dec!(85000), dec!(100000)),
                ),
            },
            educator_expense_limit: dec!(300),
        },
        dependents: DependentConfig {
            child_age_limit: 19,
            student_age_limit: 24,
            relative_gross_income_limit: dec!(5200),
        },
        credits: CreditsConfig {
            earned_income: EitcConfig {
                tiers: vec![
                    eitc_tier(dec!(649), dec!(8490), dec!(0.0765), dec!(0.0765), dec!(10620), dec!(17730)),
                    eitc_tier(dec!(4328), dec!(12730), dec!(0.34), dec!(0.1598), dec!(23350), dec!(30470)),
                    eitc_tier(dec!(7152), dec!(17880), dec!(0.40), dec!(0.2106), dec!(23350), dec!(30470)),
                    eitc_tier(dec!(8046), dec!(17880), dec!(0.45), dec!(0.2106), dec!(23350), dec!(30470)),
                ],
                investment_income_limit: dec!(11950),
                min_age_without_child: 25,
                max_age_without_child: 65,
            },
            child_tax: child_tax(),
            dependent_care: dependent_care(),
            education: EducationConfig {
                aotc_first_tier: dec!(2000),
                aotc_second_tier: dec!(2000),
                aotc_second_tier_rate: dec!(0.25),
                aotc_refundable_rate: dec!(0.40),
                aotc_max_years: 4,
                llc_rate: dec!(0.20),
                llc_expense_limit: dec!(10000),
                phaseout: education_phaseout(),
            },
            savers: SaversCreditConfig {
                contribution_limit: dec!(2000),
                high_rate: dec!(0.50),
                middle_rate: dec!(0.20),
                low_rate: dec!(0.10),
                tiers: ByFilingStatus::joint_hoh_other(
                    SaversTiers {
                        high_rate_limit: dec!(47500),
                        middle_rate_limit: dec!(51000),
                        low_rate_limit: dec!(79000),
                    },
                    SaversTiers {
                        high_rate_limit: dec!(35625),
                        middle_rate_limit: dec!(38250),
                        low_rate_limit: dec!(59250),
                    },
                    SaversTiers {
                        high_rate_limit: dec!(23750),
                        middle_rate_limit: dec!(25500),
                        low_rate_limit: dec!(39500),
                    },
                ),
                min_age: 18,
            },
            energy: energy(),
            clean_vehicle: clean_vehicle(),
            adoption: AdoptionConfig {
                max_credit: dec!(17280),
                phaseout: PhaseoutRange::new(dec!(259190), dec!(299190)),
            },
            elderly_disabled: elderly_disabled(),
            foreign_tax: foreign_tax(),
            premium_tax: PremiumTaxConfig {
                // 2024 guidelines apply to 2025 coverage.
                poverty_line_base: dec!(15060),
                poverty_line_per_additional_person: dec!(5380),
                min_fpl_percent: dec!(100),
                bands: applicable_percentages(),
                repayment_caps: repayment_caps([
                    (dec!(375), dec!(750)),
                    (dec!(975), dec!(1950)),
                    (dec!(1625), dec!(3250)),
                ]),
            },
            business: business(dec!(66600)),
        },
        penalty: penalty(dec!(0.07)),
    }
}
