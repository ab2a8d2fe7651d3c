//! Tax year 2024 (Rev. Proc. 2023-34).

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
        tax_year: 2024,
        ordinary_brackets: ByFilingStatus::new(
            ordinary([
                dec!(11600),
                dec!(47150),
                dec!(100525),
                dec!(191950),
                dec!(243725),
                dec!(609350),
            ]),
            ordinary([
                dec!(23200),
                dec!(94300),
                dec!(201050),
                dec!(383900),
                dec!(487450),
                dec!(731200),
            ]),
            ordinary([
                dec!(11600),
                dec!(47150),
                dec!(100525),
                dec!(191950),
                dec!(243725),
                dec!(365600),
            ]),
            ordinary([
                dec!(16550),
                dec!(63100),
                dec!(100500),
                dec!(191950),
                dec!(243700),
                dec!(609350),
            ]),
            ordinary([
                dec!(23200),
                dec!(94300),
                dec!(201050),
                dec!(383900),
                dec!(487450),
                dec!(731200),
            ]),
        ),
        capital_gains: CapitalGainsConfig {
            schedule: ByFilingStatus::new(
                capital_gains(dec!(47025), dec!(518900)),
                capital_gains(dec!(94050), dec!(583750)),
                capital_gains(dec!(47025), dec!(291850)),
                capital_gains(dec!(63000), dec!(551350)),
                capital_gains(dec!(94050), dec!(583750)),
            ),
            loss_limit: capital_loss_limit(),
        },
        standard_deduction: StandardDeductionConfig {
            base: ByFilingStatus::new(
                dec!(14600),
                dec!(29200),
                dec!(14600),
                dec!(21900),
                dec!(29200),
            ),
            additional_married: dec!(1550),
            additional_unmarried: dec!(1950),
            dependent_minimum: dec!(1300),
            dependent_earned_addition: dec!(450),
            additional_age: 65,
        },
        itemized: itemized(),
        self_employment: SeWorksheetConfig {
            ss_wage_max: dec!(168600),
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
            threshold: ByFilingStatus::joint_and_other(dec!(383900), dec!(191950)),
            phase_in_range: ByFilingStatus::joint_and_other(dec!(100000), dec!(50000)),
            wage_rate: dec!(0.50),
            wage_with_ubia_rate: dec!(0.25),
            ubia_rate: dec!(0.025),
        },
        amt: AmtConfig {
            exemption: ByFilingStatus::new(
                dec!(85700),
                dec!(133300),
                dec!(66650),
                dec!(85700),
                dec!(133300),
            ),
            phaseout_start: ByFilingStatus::joint_and_other(dec!(1218700), dec!(609350)),
            phaseout_rate: dec!(0.25),
            rate_breakpoint: ByFilingStatus::new(
                dec!(232600),
                dec!(232600),
                dec!(116300),
                dec!(232600),
                dec!(232600),
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
                    PhaseoutRange::new(dec!(77000), dec!(87000)),
                    PhaseoutRange::new(dec!(123000), dec!(143000)),
                    PhaseoutRange::new(dec!(0), dec!(10000)),
                    PhaseoutRange::new(dec!(77000), dec!(87000)),
                    PhaseoutRange::new(dec!(123000), dec!(143000)),
                ),
                spouse_covered_phaseout: PhaseoutRange::new(dec!(230000), dec!(240000)),
                rounding_multiple: dec!(10),
                minimum_limit: dec!(200),
            },
            hsa: HsaConfig {
                self_only_limit: dec!(4150),
                family_limit: dec!(8300),
                catch_up: dec!(1000),
                catch_up_age: 55,
            },
            student_loan: StudentLoanConfig {
                max_deduction: dec!(2500),
                phaseout: ByFilingStatus::joint_and_other(
                    PhaseoutRange::new(dec!(165000), dec!(195000)),
                    PhaseoutRange::new(dec!(80000), dec!(95000)),
                ),
            },
            educator_expense_limit: dec!(300),
        },
        dependents: DependentConfig {
            child_age_limit: 19,
            student_age_limit: 24,
            relative_gross_income_limit: dec!(5050),
        },
        credits: CreditsConfig {
            earned_income: EitcConfig {
                tiers: vec![
                    eitc_tier(dec!(632), dec!(8260), dec!(0.0765), dec!(0.0765), dec!(10330), dec!(17250)),
                    eitc_tier(dec!(4213), dec!(12390), dec!(0.34), dec!(0.1598), dec!(22720), dec!(29640)),
                    eitc_tier(dec!(6960), dec!(17400), dec!(0.40), dec!(0.2106), dec!(22720), dec!(29640)),
                    eitc_tier(dec!(7830), dec!(17400), dec!(0.45), dec!(0.2106), dec!(22720), dec!(29640)),
                ],
                investment_income_limit: dec!(11600),
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
                        high_rate_limit: dec!(46000),
                        middle_rate_limit: dec!(50000),
                        low_rate_limit: dec!(76500),
                    },
                    SaversTiers {
                        high_rate_limit: dec!(34500),
                        middle_rate_limit: dec!(37500),
                        low_rate_limit: dec!(57375),
                    },
                    SaversTiers {
                        high_rate_limit: dec!(23000),
                        middle_rate_limit: dec!(25000),
                        low_rate_limit: dec!(38250),
                    },
                ),
                min_age: 18,
            },
            energy: energy(),
            clean_vehicle: clean_vehicle(),
            adoption: AdoptionConfig {
                max_credit: dec!(16810),
                phaseout: PhaseoutRange::new(dec!(252150), dec!(292150)),
            },
            elderly_disabled: elderly_disabled(),
            foreign_tax: foreign_tax(),
            premium_tax: PremiumTaxConfig {
                // 2023 guidelines apply to 2024 coverage.
                poverty_line_base: dec!(14580),
                poverty_line_per_additional_person: dec!(5140),
                min_fpl_percent: dec!(100),
                bands: applicable_percentages(),
                repayment_caps: repayment_caps([
                    (dec!(350), dec!(700)),
                    (dec!(900), dec!(1800)),
                    (dec!(1500), dec!(3000)),
                ]),
            },
            business: business(dec!(64800)),
        },
        penalty: penalty(dec!(0.08)),
    }
}
