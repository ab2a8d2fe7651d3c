//! Components of the general business credit (Form 3800) and the limit on
//! their combined use.
//!
//! | Credit | Form |
//! |--------|------|
//! | Work opportunity | 5884 |
//! | Disabled access | 8826 |
//! | Small employer health insurance | 8941 |
//! | Small employer pension plan startup | 8881 |
//!
//! Each calculator reports its full current-year amount. The engine pools
//! them with the prior-year carryforward, allows the pool up to
//! [`GeneralBusinessConfig::limit`] and the remaining liability, and
//! carries the rest forward.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{money, non_negative, sum};
use crate::models::{
    CreditBreakdown, CreditKind, DisabledAccessInfo, PensionStartupInfo, SmallEmployerHealthInfo,
    TargetGroup, TaxCredits, UnitBreakdown, WotcEmployee,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WotcConfig {
    pub full_rate: Decimal,
    pub partial_rate: Decimal,
    pub full_rate_hours: u32,
    pub min_hours: u32,
    pub general_wage_cap: Decimal,
    pub disabled_veteran_wage_cap: Decimal,
    pub disabled_veteran_long_unemployed_wage_cap: Decimal,
    pub veteran_long_unemployed_wage_cap: Decimal,
    pub summer_youth_wage_cap: Decimal,
    pub long_term_family_assistance_wage_cap: Decimal,
    /// Rate on second-year wages for long-term family assistance recipients.
    pub second_year_rate: Decimal,
}

impl WotcConfig {
    pub fn wage_cap(
        &self,
        group: TargetGroup,
    ) -> Decimal {
        match group {
            TargetGroup::General => self.general_wage_cap,
            TargetGroup::DisabledVeteran => self.disabled_veteran_wage_cap,
            TargetGroup::DisabledVeteranLongUnemployed => {
                self.disabled_veteran_long_unemployed_wage_cap
            }
            TargetGroup::VeteranLongUnemployed => self.veteran_long_unemployed_wage_cap,
            TargetGroup::SummerYouth => self.summer_youth_wage_cap,
            TargetGroup::LongTermFamilyAssistance => self.long_term_family_assistance_wage_cap,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisabledAccessConfig {
    pub rate: Decimal,
    pub expenditure_floor: Decimal,
    pub expenditure_ceiling: Decimal,
    pub max_gross_receipts: Decimal,
    pub max_full_time_employees: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmallEmployerHealthConfig {
    pub rate: Decimal,
    pub tax_exempt_rate: Decimal,
    /// Employers must have fewer full-time equivalents than this.
    pub max_fte: Decimal,
    pub fte_phaseout_start: Decimal,
    pub fte_phaseout_range: Decimal,
    /// Average annual wages must be under this amount.
    pub wage_limit: Decimal,
    pub wage_phaseout_start: Decimal,
    /// Consecutive years the credit may be claimed.
    pub max_years: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionStartupConfig {
    pub full_rate_max_employees: u32,
    pub full_rate: Decimal,
    pub reduced_rate: Decimal,
    pub min_credit: Decimal,
    pub per_eligible_employee: Decimal,
    pub max_credit: Decimal,
    pub auto_enrollment_credit: Decimal,
    pub max_plan_year: u8,
    pub max_employees: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralBusinessConfig {
    pub regular_tax_floor: Decimal,
    pub floor_rate: Decimal,
}

impl GeneralBusinessConfig {
    /// Most the pooled business credits may offset.
    ///
    /// Net income tax less the greater of the tentative minimum tax or 25%
    /// of net regular tax over $25,000. The credits computed here are all
    /// specified credits, so the tentative minimum tax is treated as zero.
    pub fn limit(
        &self,
        net_income_tax: Decimal,
        net_regular_tax: Decimal,
    ) -> Decimal {
        let floor = non_negative(net_regular_tax - self.regular_tax_floor) * self.floor_rate;
        money(non_negative(net_income_tax - floor))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessCreditConfig {
    pub work_opportunity: WotcConfig,
    pub disabled_access: DisabledAccessConfig,
    pub small_employer_health: SmallEmployerHealthConfig,
    pub pension_startup: PensionStartupConfig,
    pub general: GeneralBusinessConfig,
}

/// Every business credit present on the return, in Form 3800 order.
pub fn calculate(
    credits: &TaxCredits,
    config: &BusinessCreditConfig,
) -> Vec<CreditBreakdown> {
    let mut results = Vec::new();
    if !credits.wotc_employees.is_empty() {
        results.push(work_opportunity(&credits.wotc_employees, &config.work_opportunity));
    }
    if let Some(info) = &credits.disabled_access {
        results.push(disabled_access(info, &config.disabled_access));
    }
    if let Some(info) = &credits.small_employer_health {
        results.push(small_employer_health(info, &config.small_employer_health));
    }
    if let Some(info) = &credits.pension_startup {
        results.push(pension_startup(info, &config.pension_startup));
    }
    results
}

pub fn work_opportunity(
    employees: &[WotcEmployee],
    config: &WotcConfig,
) -> CreditBreakdown {
    const KIND: CreditKind = CreditKind::WorkOpportunity;

    let units: Vec<UnitBreakdown> = employees
        .iter()
        .map(|e| {
            if !e.certified {
                return UnitBreakdown::ineligible(&e.name, "not certified by the state agency");
            }
            if e.hours_worked < config.min_hours {
                return UnitBreakdown::ineligible(
                    &e.name,
                    format!("worked fewer than {} hours", config.min_hours),
                );
            }
            let rate = if e.hours_worked >= config.full_rate_hours {
                config.full_rate
            } else {
                config.partial_rate
            };
            let cap = config.wage_cap(e.target_group);
            let mut credit = e.first_year_wages.min(cap) * rate;
            if e.target_group == TargetGroup::LongTermFamilyAssistance {
                credit += e.second_year_wages.min(cap) * config.second_year_rate;
            }
            UnitBreakdown::eligible(&e.name, money(credit))
        })
        .collect();

    finish(KIND, units, "no certified employees")
}

pub fn disabled_access(
    info: &DisabledAccessInfo,
    config: &DisabledAccessConfig,
) -> CreditBreakdown {
    const KIND: CreditKind = CreditKind::DisabledAccess;

    if info.prior_year_gross_receipts > config.max_gross_receipts
        && info.prior_year_full_time_employees > config.max_full_time_employees
    {
        return CreditBreakdown::ineligible(KIND, "not an eligible small business");
    }

    let spent = sum(info.expenditures.iter().map(|e| e.amount));
    let eligible = non_negative(spent.min(config.expenditure_ceiling) - config.expenditure_floor);
    let amount = money(eligible * config.rate);

    CreditBreakdown {
        tentative_amount: amount,
        amount,
        units: info
            .expenditures
            .iter()
            .map(|e| UnitBreakdown::eligible(&e.description, money(e.amount)))
            .collect(),
        ..CreditBreakdown::new(KIND)
    }
}

pub fn small_employer_health(
    info: &SmallEmployerHealthInfo,
    config: &SmallEmployerHealthConfig,
) -> CreditBreakdown {
    const KIND: CreditKind = CreditKind::SmallEmployerHealthInsurance;

    let reason = if !info.shop_coverage {
        Some("coverage not purchased through SHOP".to_string())
    } else if !info.uniform_contribution {
        Some("employer pays less than half of premiums uniformly".to_string())
    } else if info.prior_years_claimed >= config.max_years {
        Some(format!("already claimed for {} years", config.max_years))
    } else if info.full_time_equivalents >= config.max_fte {
        Some(format!("{} or more full-time equivalents", config.max_fte))
    } else if info.average_annual_wages >= config.wage_limit {
        Some(format!("average wages of {} or more", config.wage_limit))
    } else {
        None
    };
    if let Some(reason) = reason {
        return CreditBreakdown::ineligible(KIND, reason);
    }

    let rate = if info.tax_exempt_employer {
        config.tax_exempt_rate
    } else {
        config.rate
    };
    let tentative = info.premiums_paid * rate;

    let fte_reduction = if config.fte_phaseout_range > Decimal::ZERO {
        non_negative(info.full_time_equivalents - config.fte_phaseout_start)
            / config.fte_phaseout_range
    } else {
        Decimal::ZERO
    };
    let wage_reduction = if config.wage_phaseout_start > Decimal::ZERO {
        non_negative(info.average_annual_wages - config.wage_phaseout_start)
            / config.wage_phaseout_start
    } else {
        Decimal::ZERO
    };
    let reduction = (fte_reduction + wage_reduction).min(Decimal::ONE);
    let amount = money(tentative * (Decimal::ONE - reduction));

    debug!(tentative = %tentative, reduction = %reduction, amount = %amount, "small employer health credit");

    CreditBreakdown {
        tentative_amount: money(tentative),
        phaseout_reduction: money(tentative) - amount,
        amount,
        ..CreditBreakdown::new(KIND)
    }
}

pub fn pension_startup(
    info: &PensionStartupInfo,
    config: &PensionStartupConfig,
) -> CreditBreakdown {
    const KIND: CreditKind = CreditKind::PensionStartup;

    if info.employees > config.max_employees {
        return CreditBreakdown::ineligible(
            KIND,
            format!("more than {} employees", config.max_employees),
        );
    }
    if info.plan_year == 0 || info.plan_year > config.max_plan_year {
        return CreditBreakdown::ineligible(
            KIND,
            format!("only the first {} plan years qualify", config.max_plan_year),
        );
    }

    let rate = if info.employees <= config.full_rate_max_employees {
        config.full_rate
    } else {
        config.reduced_rate
    };
    let cap = (config.per_eligible_employee * Decimal::from(info.eligible_nhce))
        .min(config.max_credit)
        .max(config.min_credit);
    let startup = (info.startup_costs * rate).min(cap);
    let auto_enrollment = if info.auto_enrollment {
        config.auto_enrollment_credit
    } else {
        Decimal::ZERO
    };
    let amount = money(startup + auto_enrollment);

    let mut units = vec![UnitBreakdown::eligible("startup costs", money(startup))];
    if info.auto_enrollment {
        units.push(UnitBreakdown::eligible("auto-enrollment", money(auto_enrollment)));
    }

    CreditBreakdown {
        tentative_amount: amount,
        amount,
        units,
        ..CreditBreakdown::new(KIND)
    }
}

fn finish(
    kind: CreditKind,
    units: Vec<UnitBreakdown>,
    empty_reason: &str,
) -> CreditBreakdown {
    if !units.iter().any(|u| u.eligible) {
        return CreditBreakdown {
            units,
            ..CreditBreakdown::ineligible(kind, empty_reason)
        };
    }
    let amount = money(sum(units.iter().map(|u| u.amount)));
    CreditBreakdown {
        tentative_amount: amount,
        amount,
        units,
        ..CreditBreakdown::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::DisabledAccessExpenditure;

    fn wotc_config() -> WotcConfig {
        WotcConfig {
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
        }
    }

    fn employee(
        group: TargetGroup,
        wages: Decimal,
        hours: u32,
    ) -> WotcEmployee {
        WotcEmployee {
            name: "Sam".to_string(),
            target_group: group,
            first_year_wages: wages,
            hours_worked: hours,
            certified: true,
            ..WotcEmployee::default()
        }
    }

    // =========================================================================
    // work opportunity tests
    // =========================================================================

    #[test]
    fn full_rate_employee_capped_at_wage_limit() {
        let result = work_opportunity(
            &[employee(TargetGroup::General, dec!(20000), 500)],
            &wotc_config(),
        );

        assert_eq!(result.amount, dec!(2400.00));
    }

    #[test]
    fn partial_hours_use_reduced_rate() {
        let result = work_opportunity(
            &[employee(TargetGroup::General, dec!(5000), 200)],
            &wotc_config(),
        );

        assert_eq!(result.amount, dec!(1250.00));
    }

    #[test]
    fn too_few_hours_earn_nothing() {
        let result = work_opportunity(
            &[employee(TargetGroup::General, dec!(5000), 100)],
            &wotc_config(),
        );

        assert!(!result.eligible);
    }

    #[test]
    fn long_term_family_assistance_adds_second_year() {
        let worker = WotcEmployee {
            second_year_wages: dec!(12000),
            ..employee(TargetGroup::LongTermFamilyAssistance, dec!(12000), 800)
        };

        let result = work_opportunity(&[worker], &wotc_config());

        // 40% × 10,000 + 50% × 10,000
        assert_eq!(result.amount, dec!(9000.00));
    }

    // =========================================================================
    // disabled access tests
    // =========================================================================

    #[test]
    fn disabled_access_credits_half_above_floor() {
        let config = DisabledAccessConfig {
            rate: dec!(0.50),
            expenditure_floor: dec!(250),
            expenditure_ceiling: dec!(10250),
            max_gross_receipts: dec!(1000000),
            max_full_time_employees: 30,
        };
        let info = DisabledAccessInfo {
            expenditures: vec![DisabledAccessExpenditure {
                description: "ramp".to_string(),
                amount: dec!(15000),
            }],
            prior_year_gross_receipts: dec!(400000),
            prior_year_full_time_employees: 8,
        };

        let result = disabled_access(&info, &config);

        assert_eq!(result.amount, dec!(5000.00));
    }

    // =========================================================================
    // small employer health tests
    // =========================================================================

    fn health_config() -> SmallEmployerHealthConfig {
        SmallEmployerHealthConfig {
            rate: dec!(0.50),
            tax_exempt_rate: dec!(0.35),
            max_fte: dec!(25),
            fte_phaseout_start: dec!(10),
            fte_phaseout_range: dec!(15),
            wage_limit: dec!(66600),
            wage_phaseout_start: dec!(33300),
            max_years: 2,
        }
    }

    #[test]
    fn small_employer_gets_half_of_premiums() {
        let info = SmallEmployerHealthInfo {
            premiums_paid: dec!(40000),
            full_time_equivalents: dec!(8),
            average_annual_wages: dec!(30000),
            shop_coverage: true,
            uniform_contribution: true,
            ..SmallEmployerHealthInfo::default()
        };

        let result = small_employer_health(&info, &health_config());

        assert_eq!(result.amount, dec!(20000.00));
    }

    #[test]
    fn fte_and_wage_phaseouts_combine() {
        let info = SmallEmployerHealthInfo {
            premiums_paid: dec!(40000),
            full_time_equivalents: dec!(13),
            average_annual_wages: dec!(39960),
            shop_coverage: true,
            uniform_contribution: true,
            ..SmallEmployerHealthInfo::default()
        };

        let result = small_employer_health(&info, &health_config());

        // 3/15 + 6,660/33,300 = 0.4 reduction
        assert_eq!(result.amount, dec!(12000.00));
    }

    #[test]
    fn third_year_is_ineligible() {
        let info = SmallEmployerHealthInfo {
            premiums_paid: dec!(40000),
            full_time_equivalents: dec!(5),
            average_annual_wages: dec!(30000),
            shop_coverage: true,
            uniform_contribution: true,
            prior_years_claimed: 2,
            ..SmallEmployerHealthInfo::default()
        };

        let result = small_employer_health(&info, &health_config());

        assert!(!result.eligible);
    }

    // =========================================================================
    // pension startup tests
    // =========================================================================

    fn pension_config() -> PensionStartupConfig {
        PensionStartupConfig {
            full_rate_max_employees: 50,
            full_rate: dec!(1.00),
            reduced_rate: dec!(0.50),
            min_credit: dec!(500),
            per_eligible_employee: dec!(250),
            max_credit: dec!(5000),
            auto_enrollment_credit: dec!(500),
            max_plan_year: 3,
            max_employees: 100,
        }
    }

    #[test]
    fn pension_startup_cap_scales_with_employees() {
        let info = PensionStartupInfo {
            startup_costs: dec!(8000),
            employees: 12,
            eligible_nhce: 10,
            auto_enrollment: true,
            plan_year: 1,
        };

        let result = pension_startup(&info, &pension_config());

        // min(8,000, 2,500) + 500
        assert_eq!(result.amount, dec!(3000.00));
    }

    #[test]
    fn pension_startup_minimum_credit() {
        let info = PensionStartupInfo {
            startup_costs: dec!(1000),
            employees: 3,
            eligible_nhce: 1,
            plan_year: 2,
            ..PensionStartupInfo::default()
        };

        let result = pension_startup(&info, &pension_config());

        assert_eq!(result.amount, dec!(500.00));
    }

    #[test]
    fn fourth_plan_year_is_ineligible() {
        let info = PensionStartupInfo {
            startup_costs: dec!(1000),
            employees: 3,
            eligible_nhce: 1,
            plan_year: 4,
            ..PensionStartupInfo::default()
        };

        let result = pension_startup(&info, &pension_config());

        assert!(!result.eligible);
    }

    // =========================================================================
    // general business limit tests
    // =========================================================================

    #[test]
    fn limit_subtracts_quarter_of_regular_tax_over_floor() {
        let config = GeneralBusinessConfig {
            regular_tax_floor: dec!(25000),
            floor_rate: dec!(0.25),
        };

        assert_eq!(config.limit(dec!(20000), dec!(20000)), dec!(20000.00));
        assert_eq!(config.limit(dec!(45000), dec!(45000)), dec!(40000.00));
    }
}
