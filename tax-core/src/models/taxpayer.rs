use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::FilingStatus;

/// Which filer an item belongs to on a joint return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Owner {
    #[default]
    Primary,
    Spouse,
}

/// Facts about the primary filer or the spouse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    pub age: u32,
    pub blind: bool,
    /// Retired on permanent and total disability.
    pub disabled: bool,
    pub full_time_student: bool,
    /// Someone else can claim this person as a dependent.
    pub can_be_claimed_as_dependent: bool,
    /// Active participant in an employer retirement plan (W-2 box 13).
    pub covered_by_workplace_plan: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Child,
    Stepchild,
    FosterChild,
    Sibling,
    HalfSibling,
    StepSibling,
    Grandchild,
    NieceOrNephew,
    Parent,
    Grandparent,
    AuntOrUncle,
    InLaw,
    /// Unrelated person who lived with the taxpayer all year.
    OtherHouseholdMember,
}

impl Relationship {
    /// Relationships that can satisfy the qualifying-child relationship test.
    pub fn is_child_relationship(&self) -> bool {
        matches!(
            self,
            Self::Child
                | Self::Stepchild
                | Self::FosterChild
                | Self::Sibling
                | Self::HalfSibling
                | Self::StepSibling
                | Self::Grandchild
                | Self::NieceOrNephew
        )
    }

    /// Relatives who need not live with the taxpayer to be a qualifying
    /// relative.
    pub fn is_relative(&self) -> bool {
        !matches!(self, Self::OtherHouseholdMember)
    }
}

/// Another person who could claim the same qualifying child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherClaimant {
    pub is_parent: bool,
    pub months_lived_with_child: u8,
    pub agi: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependent {
    pub name: String,
    pub relationship: Relationship,
    pub age: u32,
    pub months_lived_with_taxpayer: u8,
    pub full_time_student: bool,
    pub permanently_disabled: bool,
    /// The dependent paid for more than half of their own support.
    pub provided_over_half_own_support: bool,
    /// Share of total support the taxpayer provided, 0–100.
    pub taxpayer_support_percentage: Decimal,
    pub gross_income: Decimal,
    /// Holds an SSN valid for employment (required for the child tax credit
    /// and the EITC).
    pub has_valid_ssn: bool,
    /// The taxpayer is the dependent's parent.
    pub taxpayer_is_parent: bool,
    pub other_claimant: Option<OtherClaimant>,
}

impl Default for Dependent {
    fn default() -> Self {
        Self {
            name: String::new(),
            relationship: Relationship::Child,
            age: 0,
            months_lived_with_taxpayer: 12,
            full_time_student: false,
            permanently_disabled: false,
            provided_over_half_own_support: false,
            taxpayer_support_percentage: dec!(100),
            gross_income: Decimal::ZERO,
            has_valid_ssn: true,
            taxpayer_is_parent: true,
            other_claimant: None,
        }
    }
}

/// Age and income limits for the dependency tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentConfig {
    /// Qualifying child must be under this age (19)...
    pub child_age_limit: u32,
    /// ...or under this age if a full-time student (24).
    pub student_age_limit: u32,
    /// Qualifying relative's gross income must be below this amount.
    pub relative_gross_income_limit: Decimal,
}

/// Outcome of the dependency tests for one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DependentStatus {
    QualifyingChild,
    QualifyingRelative,
    NotADependent(String),
}

impl DependentStatus {
    pub fn is_dependent(&self) -> bool {
        !matches!(self, Self::NotADependent(_))
    }
}

impl Dependent {
    /// Applies the qualifying-child tests first and the qualifying-relative
    /// tests only when those fail, so a person lands in exactly one bucket.
    pub fn classify(
        &self,
        config: &DependentConfig,
        taxpayer_agi: Decimal,
    ) -> DependentStatus {
        match self.qualifying_child_failure(config, taxpayer_agi) {
            None => DependentStatus::QualifyingChild,
            Some(child_reason) => match self.qualifying_relative_failure(config, taxpayer_agi) {
                None => DependentStatus::QualifyingRelative,
                Some(relative_reason) => DependentStatus::NotADependent(format!(
                    "not a qualifying child ({child_reason}); not a qualifying relative ({relative_reason})"
                )),
            },
        }
    }

    /// Meets the qualifying-child age test.
    pub fn meets_child_age_test(
        &self,
        config: &DependentConfig,
    ) -> bool {
        self.permanently_disabled
            || self.age < config.child_age_limit
            || (self.full_time_student && self.age < config.student_age_limit)
    }

    fn qualifying_child_failure(
        &self,
        config: &DependentConfig,
        taxpayer_agi: Decimal,
    ) -> Option<String> {
        if !self.relationship.is_child_relationship() {
            return Some("relationship".to_string());
        }
        if !self.meets_child_age_test(config) {
            return Some("age".to_string());
        }
        if self.months_lived_with_taxpayer <= 6 {
            return Some("residency".to_string());
        }
        if self.provided_over_half_own_support {
            return Some("support".to_string());
        }
        if !self.wins_tiebreaker(taxpayer_agi) {
            return Some("tiebreaker".to_string());
        }
        None
    }

    fn qualifying_relative_failure(
        &self,
        config: &DependentConfig,
        taxpayer_agi: Decimal,
    ) -> Option<String> {
        // A child someone else claims as a qualifying child cannot be anyone's
        // qualifying relative.
        if self.relationship.is_child_relationship()
            && self.meets_child_age_test(config)
            && self.months_lived_with_taxpayer > 6
            && !self.wins_tiebreaker(taxpayer_agi)
        {
            return Some("qualifying child of another taxpayer".to_string());
        }
        if !self.relationship.is_relative() && self.months_lived_with_taxpayer < 12 {
            return Some("member of household".to_string());
        }
        if self.gross_income >= config.relative_gross_income_limit {
            return Some("gross income".to_string());
        }
        if self.taxpayer_support_percentage <= dec!(50) {
            return Some("support".to_string());
        }
        None
    }

    /// Resolves competing claims: a parent beats a non-parent; between two
    /// parents the longer residence wins, then the higher AGI; between two
    /// non-parents the higher AGI wins. Exact ties go to the other claimant.
    pub fn wins_tiebreaker(
        &self,
        taxpayer_agi: Decimal,
    ) -> bool {
        let Some(other) = &self.other_claimant else {
            return true;
        };
        match (self.taxpayer_is_parent, other.is_parent) {
            (true, false) => true,
            (false, true) => false,
            (true, true) => {
                if self.months_lived_with_taxpayer != other.months_lived_with_child {
                    self.months_lived_with_taxpayer > other.months_lived_with_child
                } else {
                    taxpayer_agi > other.agi
                }
            }
            (false, false) => taxpayer_agi > other.agi,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Taxpayer {
    pub filing_status: Option<FilingStatus>,
    pub primary: Person,
    pub spouse: Option<Person>,
    pub dependents: Vec<Dependent>,
    /// MFS only: the spouse itemizes, which zeroes this filer's standard
    /// deduction.
    pub spouse_itemizes: bool,
    /// Married filers who lived together at any time during the year.
    pub lived_with_spouse: bool,
}

impl Taxpayer {
    /// People on the return: the primary filer plus the spouse on a joint
    /// return.
    pub fn filers(&self) -> Vec<(Owner, &Person)> {
        let mut filers = vec![(Owner::Primary, &self.primary)];
        if let (Some(spouse), Some(status)) = (&self.spouse, self.filing_status) {
            if status.is_joint() {
                filers.push((Owner::Spouse, spouse));
            }
        }
        filers
    }

    pub fn person(
        &self,
        owner: Owner,
    ) -> Option<&Person> {
        match owner {
            Owner::Primary => Some(&self.primary),
            Owner::Spouse => self.spouse.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn config() -> DependentConfig {
        DependentConfig {
            child_age_limit: 19,
            student_age_limit: 24,
            relative_gross_income_limit: dec!(5200),
        }
    }

    #[test]
    fn young_child_living_at_home_is_qualifying_child() {
        let child = Dependent {
            age: 8,
            ..Dependent::default()
        };

        assert_eq!(child.classify(&config(), dec!(60000)), DependentStatus::QualifyingChild);
    }

    #[test]
    fn college_student_under_24_is_qualifying_child() {
        let student = Dependent {
            age: 21,
            full_time_student: true,
            months_lived_with_taxpayer: 8,
            ..Dependent::default()
        };

        assert_eq!(student.classify(&config(), dec!(60000)), DependentStatus::QualifyingChild);
    }

    #[test]
    fn adult_child_with_low_income_is_qualifying_relative() {
        let adult = Dependent {
            age: 26,
            gross_income: dec!(3000),
            ..Dependent::default()
        };

        assert_eq!(
            adult.classify(&config(), dec!(60000)),
            DependentStatus::QualifyingRelative
        );
    }

    #[test]
    fn parent_living_elsewhere_is_qualifying_relative() {
        let parent = Dependent {
            relationship: Relationship::Parent,
            age: 78,
            months_lived_with_taxpayer: 0,
            gross_income: dec!(1200),
            taxpayer_support_percentage: dec!(75),
            taxpayer_is_parent: false,
            ..Dependent::default()
        };

        assert_eq!(
            parent.classify(&config(), dec!(60000)),
            DependentStatus::QualifyingRelative
        );
    }

    #[test]
    fn relative_over_income_limit_is_not_a_dependent() {
        let parent = Dependent {
            relationship: Relationship::Parent,
            age: 70,
            gross_income: dec!(5200),
            taxpayer_is_parent: false,
            ..Dependent::default()
        };

        let status = parent.classify(&config(), dec!(60000));

        assert!(!status.is_dependent());
    }

    #[test]
    fn unrelated_part_year_household_member_is_not_a_dependent() {
        let friend = Dependent {
            relationship: Relationship::OtherHouseholdMember,
            age: 40,
            months_lived_with_taxpayer: 11,
            taxpayer_is_parent: false,
            ..Dependent::default()
        };

        assert!(!friend.classify(&config(), dec!(60000)).is_dependent());
    }

    #[test]
    fn parent_beats_grandparent_in_tiebreaker() {
        let child = Dependent {
            age: 5,
            other_claimant: Some(OtherClaimant {
                is_parent: false,
                months_lived_with_child: 12,
                agi: dec!(200000),
            }),
            ..Dependent::default()
        };

        assert!(child.wins_tiebreaker(dec!(20000)));
    }

    #[test]
    fn grandparent_loses_child_to_parent_and_cannot_claim_as_relative() {
        let child = Dependent {
            relationship: Relationship::Grandchild,
            age: 5,
            taxpayer_is_parent: false,
            other_claimant: Some(OtherClaimant {
                is_parent: true,
                months_lived_with_child: 12,
                agi: dec!(20000),
            }),
            ..Dependent::default()
        };

        assert!(!child.classify(&config(), dec!(90000)).is_dependent());
    }

    #[test]
    fn between_parents_longer_residence_wins() {
        let child = Dependent {
            age: 10,
            months_lived_with_taxpayer: 7,
            other_claimant: Some(OtherClaimant {
                is_parent: true,
                months_lived_with_child: 5,
                agi: dec!(150000),
            }),
            ..Dependent::default()
        };

        assert!(child.wins_tiebreaker(dec!(40000)));
    }

    #[test]
    fn between_parents_equal_residence_higher_agi_wins() {
        let child = Dependent {
            age: 10,
            months_lived_with_taxpayer: 6,
            other_claimant: Some(OtherClaimant {
                is_parent: true,
                months_lived_with_child: 6,
                agi: dec!(150000),
            }),
            ..Dependent::default()
        };

        assert!(!child.wins_tiebreaker(dec!(40000)));
    }

    #[test]
    fn filers_include_spouse_only_on_joint_return() {
        let mut taxpayer = Taxpayer {
            filing_status: Some(FilingStatus::MarriedFilingSeparately),
            spouse: Some(Person::default()),
            ..Taxpayer::default()
        };
        assert_eq!(taxpayer.filers().len(), 1);

        taxpayer.filing_status = Some(FilingStatus::MarriedFilingJointly);
        assert_eq!(taxpayer.filers().len(), 2);
    }
}
