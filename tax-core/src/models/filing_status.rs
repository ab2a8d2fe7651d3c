use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FilingStatus {
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
    QualifyingSurvivingSpouse,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 5] = [
        Self::Single,
        Self::MarriedFilingJointly,
        Self::MarriedFilingSeparately,
        Self::HeadOfHousehold,
        Self::QualifyingSurvivingSpouse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::MarriedFilingJointly => "MFJ",
            Self::MarriedFilingSeparately => "MFS",
            Self::HeadOfHousehold => "HOH",
            Self::QualifyingSurvivingSpouse => "QSS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "S" => Some(Self::Single),
            "MFJ" => Some(Self::MarriedFilingJointly),
            "MFS" => Some(Self::MarriedFilingSeparately),
            "HOH" => Some(Self::HeadOfHousehold),
            "QSS" => Some(Self::QualifyingSurvivingSpouse),
            _ => None,
        }
    }

    /// Joint return: both spouses' income, deductions and credits combine.
    pub fn is_joint(&self) -> bool {
        matches!(self, Self::MarriedFilingJointly)
    }

    pub fn is_married_separate(&self) -> bool {
        matches!(self, Self::MarriedFilingSeparately)
    }

    /// Statuses that use the married (rather than unmarried) additional
    /// standard deduction for age and blindness.
    pub fn uses_married_additional_amount(&self) -> bool {
        matches!(
            self,
            Self::MarriedFilingJointly
                | Self::MarriedFilingSeparately
                | Self::QualifyingSurvivingSpouse
        )
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.trim()).ok_or_else(|| ValidationError::UnknownFilingStatus(s.to_string()))
    }
}

impl TryFrom<String> for FilingStatus {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FilingStatus> for String {
    fn from(status: FilingStatus) -> Self {
        status.as_str().to_string()
    }
}

/// One value per filing status.
///
/// Most statutory thresholds come in this shape; QSS almost always shares
/// the joint figure and MFS usually shares the single figure or half the
/// joint one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByFilingStatus<T> {
    pub single: T,
    pub married_filing_jointly: T,
    pub married_filing_separately: T,
    pub head_of_household: T,
    pub qualifying_surviving_spouse: T,
}

impl<T> ByFilingStatus<T> {
    pub fn new(
        single: T,
        married_filing_jointly: T,
        married_filing_separately: T,
        head_of_household: T,
        qualifying_surviving_spouse: T,
    ) -> Self {
        Self {
            single,
            married_filing_jointly,
            married_filing_separately,
            head_of_household,
            qualifying_surviving_spouse,
        }
    }

    pub fn get(
        &self,
        status: FilingStatus,
    ) -> &T {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::MarriedFilingJointly => &self.married_filing_jointly,
            FilingStatus::MarriedFilingSeparately => &self.married_filing_separately,
            FilingStatus::HeadOfHousehold => &self.head_of_household,
            FilingStatus::QualifyingSurvivingSpouse => &self.qualifying_surviving_spouse,
        }
    }

    pub fn get_mut(
        &mut self,
        status: FilingStatus,
    ) -> &mut T {
        match status {
            FilingStatus::Single => &mut self.single,
            FilingStatus::MarriedFilingJointly => &mut self.married_filing_jointly,
            FilingStatus::MarriedFilingSeparately => &mut self.married_filing_separately,
            FilingStatus::HeadOfHousehold => &mut self.head_of_household,
            FilingStatus::QualifyingSurvivingSpouse => &mut self.qualifying_surviving_spouse,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilingStatus, &T)> {
        FilingStatus::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

impl<T: Clone> ByFilingStatus<T> {
    /// Same value for every status.
    pub fn uniform(value: T) -> Self {
        Self::new(value.clone(), value.clone(), value.clone(), value.clone(), value)
    }

    /// `joint` for MFJ and QSS, `other` for everyone else.
    pub fn joint_and_other(
        joint: T,
        other: T,
    ) -> Self {
        Self::new(other.clone(), joint.clone(), other.clone(), other, joint)
    }

    /// `joint` for MFJ and QSS, `hoh` for head of household, `other` for
    /// single and MFS.
    pub fn joint_hoh_other(
        joint: T,
        hoh: T,
        other: T,
    ) -> Self {
        Self::new(other.clone(), joint.clone(), other, hoh, joint)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_round_trips_every_code() {
        for status in FilingStatus::ALL {
            assert_eq!(FilingStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn from_str_rejects_unknown_code() {
        let result = "XYZ".parse::<FilingStatus>();

        assert_eq!(
            result,
            Err(ValidationError::UnknownFilingStatus("XYZ".to_string()))
        );
    }

    #[test]
    fn only_mfj_is_joint() {
        let joint: Vec<_> = FilingStatus::ALL.into_iter().filter(|s| s.is_joint()).collect();

        assert_eq!(joint, vec![FilingStatus::MarriedFilingJointly]);
    }

    #[test]
    fn joint_and_other_assigns_qss_joint_value() {
        let table = ByFilingStatus::joint_and_other(2, 1);

        assert_eq!(*table.get(FilingStatus::QualifyingSurvivingSpouse), 2);
        assert_eq!(*table.get(FilingStatus::MarriedFilingSeparately), 1);
        assert_eq!(*table.get(FilingStatus::HeadOfHousehold), 1);
    }

    #[test]
    fn joint_hoh_other_assigns_hoh_its_own_value() {
        let table = ByFilingStatus::joint_hoh_other(3, 2, 1);

        assert_eq!(*table.get(FilingStatus::HeadOfHousehold), 2);
        assert_eq!(*table.get(FilingStatus::Single), 1);
        assert_eq!(*table.get(FilingStatus::MarriedFilingJointly), 3);
    }
}
