//! Above-the-line adjustments with statutory limits (Schedule 1, Part II).
//!
//! The IRA and student loan deductions phase out against a MAGI that
//! excludes themselves, so the engine computes every other adjustment first
//! and passes that preliminary AGI here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{money, non_negative, round_up_to_multiple, sum};
use crate::error::ConfigError;
use crate::models::{
    ByFilingStatus, FilingStatus, HsaContribution, HsaCoverage, IraContribution, Owner, Person,
    PhaseoutRange,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IraConfig {
    pub contribution_limit: Decimal,
    pub catch_up: Decimal,
    pub catch_up_age: u32,
    /// Phaseout when the contributor is covered by a workplace plan.
    pub covered_phaseout: ByFilingStatus<PhaseoutRange>,
    /// Phaseout for a joint filer who is not covered but whose spouse is.
    pub spouse_covered_phaseout: PhaseoutRange,
    pub rounding_multiple: Decimal,
    /// A partially phased-out limit is never below this.
    pub minimum_limit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsaConfig {
    pub self_only_limit: Decimal,
    pub family_limit: Decimal,
    pub catch_up: Decimal,
    pub catch_up_age: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentLoanConfig {
    pub max_deduction: Decimal,
    pub phaseout: ByFilingStatus<PhaseoutRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentsConfig {
    pub ira: IraConfig,
    pub hsa: HsaConfig,
    pub student_loan: StudentLoanConfig,
    /// Per educator.
    pub educator_expense_limit: Decimal,
}

impl AdjustmentsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (status, range) in self.ira.covered_phaseout.iter() {
            range.validate(&format!("IRA deduction {status}"))?;
        }
        self.ira
            .spouse_covered_phaseout
            .validate("IRA deduction, spouse covered")?;
        for (status, range) in self.student_loan.phaseout.iter() {
            range.validate(&format!("student loan interest {status}"))?;
        }
        Ok(())
    }
}

/// Who is contributing and what the phaseouts measure against.
#[derive(Debug, Clone)]
pub struct IraFilers<'a> {
    pub filing_status: FilingStatus,
    pub lived_with_spouse: bool,
    /// AGI before the IRA and student loan deductions.
    pub magi: Decimal,
    pub primary: &'a Person,
    pub spouse: Option<&'a Person>,
    pub primary_compensation: Decimal,
    pub spouse_compensation: Decimal,
}

impl IraFilers<'_> {
    fn person(
        &self,
        owner: Owner,
    ) -> Option<&Person> {
        match owner {
            Owner::Primary => Some(self.primary),
            Owner::Spouse => self.spouse,
        }
    }

    fn other(
        &self,
        owner: Owner,
    ) -> Option<&Person> {
        match owner {
            Owner::Primary => self.spouse,
            Owner::Spouse => Some(self.primary),
        }
    }
}

/// Deductible traditional IRA contributions for everyone on the return.
pub fn ira_deduction(
    contributions: &[IraContribution],
    filers: &IraFilers<'_>,
    config: &IraConfig,
) -> Decimal {
    let mut total = Decimal::ZERO;
    let mut compensation_left = if filers.filing_status.is_joint() {
        filers.primary_compensation + filers.spouse_compensation
    } else {
        filers.primary_compensation
    };

    for owner in [Owner::Primary, Owner::Spouse] {
        let Some(person) = filers.person(owner) else {
            continue;
        };
        let contributed = sum(contributions
            .iter()
            .filter(|c| c.owner == owner)
            .map(|c| c.amount));
        if contributed <= Decimal::ZERO {
            continue;
        }

        let mut limit = config.contribution_limit;
        if person.age >= config.catch_up_age {
            limit += config.catch_up;
        }
        limit = limit.min(compensation_left);

        let range = phaseout_for(owner, person, filers, config);
        let deductible_limit = match range {
            Some(range) => reduced_limit(limit, range.fraction(filers.magi), config),
            None => limit,
        };

        let deduction = contributed.min(deductible_limit);
        compensation_left = non_negative(compensation_left - deduction);
        total += deduction;
        debug!(?owner, contributed = %contributed, limit = %deductible_limit, "IRA deduction");
    }
    money(total)
}

fn phaseout_for(
    owner: Owner,
    person: &Person,
    filers: &IraFilers<'_>,
    config: &IraConfig,
) -> Option<PhaseoutRange> {
    // Separate filers who lived apart all year are treated as single.
    let status = match filers.filing_status {
        FilingStatus::MarriedFilingSeparately if !filers.lived_with_spouse => FilingStatus::Single,
        status => status,
    };
    if person.covered_by_workplace_plan {
        return Some(*config.covered_phaseout.get(status));
    }
    let spouse_covered = filers
        .other(owner)
        .is_some_and(|spouse| spouse.covered_by_workplace_plan);
    match status {
        FilingStatus::MarriedFilingJointly if spouse_covered => Some(config.spouse_covered_phaseout),
        FilingStatus::MarriedFilingSeparately if filers.lived_with_spouse => {
            Some(*config.covered_phaseout.get(status))
        }
        _ => None,
    }
}

/// Phased-out IRA limit: rounded up to the next $10 and not below $200
/// unless fully phased out.
fn reduced_limit(
    limit: Decimal,
    fraction: Decimal,
    config: &IraConfig,
) -> Decimal {
    if fraction <= Decimal::ZERO {
        return limit;
    }
    if fraction >= Decimal::ONE {
        return Decimal::ZERO;
    }
    let reduced = round_up_to_multiple(limit * (Decimal::ONE - fraction), config.rounding_multiple);
    reduced.max(config.minimum_limit).min(limit)
}

/// HSA deduction for contributions made outside payroll.
pub fn hsa_deduction(
    contributions: &[HsaContribution],
    age_of: impl Fn(Owner) -> Option<u32>,
    config: &HsaConfig,
) -> Decimal {
    let total = sum(contributions.iter().map(|c| {
        let mut limit = match c.coverage {
            HsaCoverage::SelfOnly => config.self_only_limit,
            HsaCoverage::Family => config.family_limit,
        };
        if age_of(c.owner).is_some_and(|age| age >= config.catch_up_age) {
            limit += config.catch_up;
        }
        let months = Decimal::from(c.months_covered.min(12));
        let prorated = limit * months / Decimal::from(12);
        non_negative(c.personal_contributions).min(non_negative(prorated - c.employer_contributions))
    }));
    money(total)
}

pub fn student_loan_deduction(
    interest_paid: Decimal,
    filing_status: FilingStatus,
    magi: Decimal,
    claimed_as_dependent: bool,
    config: &StudentLoanConfig,
) -> Decimal {
    if filing_status.is_married_separate() || claimed_as_dependent {
        return Decimal::ZERO;
    }
    let base = non_negative(interest_paid).min(config.max_deduction);
    config.phaseout.get(filing_status).apply(base, magi)
}

pub fn educator_expenses(
    expenses: Decimal,
    educators: usize,
    limit: Decimal,
) -> Decimal {
    money(non_negative(expenses).min(limit * Decimal::from(educators)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn ira_config() -> IraConfig {
        IraConfig {
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
        }
    }

    fn contribution(
        owner: Owner,
        amount: Decimal,
    ) -> IraContribution {
        IraContribution { owner, amount }
    }

    fn single_filer<'a>(
        person: &'a Person,
        magi: Decimal,
    ) -> IraFilers<'a> {
        IraFilers {
            filing_status: FilingStatus::Single,
            lived_with_spouse: false,
            magi,
            primary: person,
            spouse: None,
            primary_compensation: dec!(100000),
            spouse_compensation: dec!(0),
        }
    }

    // =========================================================================
    // IRA tests
    // =========================================================================

    #[test]
    fn uncovered_filer_deducts_full_contribution() {
        let person = Person {
            age: 40,
            ..Person::default()
        };

        let result = ira_deduction(
            &[contribution(Owner::Primary, dec!(7000))],
            &single_filer(&person, dec!(150000)),
            &ira_config(),
        );

        assert_eq!(result, dec!(7000.00));
    }

    #[test]
    fn covered_filer_phases_out_with_rounding_up() {
        let person = Person {
            age: 40,
            covered_by_workplace_plan: true,
            ..Person::default()
        };

        let result = ira_deduction(
            &[contribution(Owner::Primary, dec!(7000))],
            &single_filer(&person, dec!(84333)),
            &ira_config(),
        );

        // 7,000 × (1 − 5,333/10,000) = 3,266.90 → 3,270
        assert_eq!(result, dec!(3270.00));
    }

    #[test]
    fn partially_phased_out_limit_has_floor() {
        let person = Person {
            age: 40,
            covered_by_workplace_plan: true,
            ..Person::default()
        };

        let result = ira_deduction(
            &[contribution(Owner::Primary, dec!(7000))],
            &single_filer(&person, dec!(88900)),
            &ira_config(),
        );

        assert_eq!(result, dec!(200.00));
    }

    #[test]
    fn catch_up_raises_limit_at_fifty() {
        let person = Person {
            age: 52,
            ..Person::default()
        };

        let result = ira_deduction(
            &[contribution(Owner::Primary, dec!(9000))],
            &single_filer(&person, dec!(60000)),
            &ira_config(),
        );

        assert_eq!(result, dec!(8000.00));
    }

    #[test]
    fn spouse_coverage_uses_higher_joint_range() {
        let primary = Person {
            age: 40,
            ..Person::default()
        };
        let spouse = Person {
            age: 40,
            covered_by_workplace_plan: true,
            ..Person::default()
        };
        let filers = IraFilers {
            filing_status: FilingStatus::MarriedFilingJointly,
            lived_with_spouse: true,
            magi: dec!(200000),
            primary: &primary,
            spouse: Some(&spouse),
            primary_compensation: dec!(0),
            spouse_compensation: dec!(200000),
        };

        let result = ira_deduction(&[contribution(Owner::Primary, dec!(7000))], &filers, &ira_config());

        assert_eq!(result, dec!(7000.00));
    }

    #[test]
    fn limit_capped_by_compensation() {
        let person = Person {
            age: 30,
            ..Person::default()
        };
        let filers = IraFilers {
            primary_compensation: dec!(2500),
            ..single_filer(&person, dec!(2500))
        };

        let result = ira_deduction(&[contribution(Owner::Primary, dec!(7000))], &filers, &ira_config());

        assert_eq!(result, dec!(2500.00));
    }

    // =========================================================================
    // HSA tests
    // =========================================================================

    #[test]
    fn hsa_limit_reduced_by_employer_contributions() {
        let config = HsaConfig {
            self_only_limit: dec!(4300),
            family_limit: dec!(8550),
            catch_up: dec!(1000),
            catch_up_age: 55,
        };
        let contribution = HsaContribution {
            owner: Owner::Primary,
            coverage: HsaCoverage::SelfOnly,
            personal_contributions: dec!(4000),
            employer_contributions: dec!(1000),
            months_covered: 12,
        };

        let result = hsa_deduction(&[contribution], |_| Some(40), &config);

        assert_eq!(result, dec!(3300.00));
    }

    #[test]
    fn hsa_limit_prorated_by_months() {
        let config = HsaConfig {
            self_only_limit: dec!(4300),
            family_limit: dec!(8550),
            catch_up: dec!(1000),
            catch_up_age: 55,
        };
        let contribution = HsaContribution {
            owner: Owner::Primary,
            coverage: HsaCoverage::Family,
            personal_contributions: dec!(9000),
            months_covered: 6,
            ..HsaContribution::default()
        };

        let result = hsa_deduction(&[contribution], |_| Some(56), &config);

        // (8,550 + 1,000) × 6/12
        assert_eq!(result, dec!(4775.00));
    }

    // =========================================================================
    // student loan tests
    // =========================================================================

    fn student_loan_config() -> StudentLoanConfig {
        StudentLoanConfig {
            max_deduction: dec!(2500),
            phaseout: ByFilingStatus::joint_and_other(
                PhaseoutRange::new(dec!(170000), dec!(200000)),
                PhaseoutRange::new(dec!(85000), dec!(100000)),
            ),
        }
    }

    #[test]
    fn student_loan_interest_capped_and_phased_out() {
        let config = student_loan_config();

        assert_eq!(
            student_loan_deduction(dec!(3000), FilingStatus::Single, dec!(60000), false, &config),
            dec!(2500.00)
        );
        assert_eq!(
            student_loan_deduction(dec!(3000), FilingStatus::Single, dec!(92500), false, &config),
            dec!(1250.00)
        );
    }

    #[test]
    fn separate_filers_and_dependents_get_no_student_loan_deduction() {
        let config = student_loan_config();

        assert_eq!(
            student_loan_deduction(dec!(1000), FilingStatus::MarriedFilingSeparately, dec!(40000), false, &config),
            dec!(0)
        );
        assert_eq!(
            student_loan_deduction(dec!(1000), FilingStatus::Single, dec!(40000), true, &config),
            dec!(0)
        );
    }

    #[test]
    fn educator_expenses_limited_per_educator() {
        assert_eq!(educator_expenses(dec!(800), 2, dec!(300)), dec!(600.00));
        assert_eq!(educator_expenses(dec!(250), 1, dec!(300)), dec!(250.00));
    }
}
