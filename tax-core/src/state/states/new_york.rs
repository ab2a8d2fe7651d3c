//! New York: graduated brackets on federal AGI with New York
//! modifications, a $1,000 dependent exemption, the pension exclusion and
//! the state earned income credit.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{BracketSchedule, ByFilingStatus};
use crate::state::calculator::StateCalculator;
use crate::state::config::{AgeExclusion, RetirementTreatment, StartingIncome, StateTaxConfig};

fn brackets(thresholds: [Decimal; 8]) -> BracketSchedule {
    let rates = [
        dec!(0.045),
        dec!(0.0525),
        dec!(0.055),
        dec!(0.06),
        dec!(0.0685),
        dec!(0.0965),
        dec!(0.103),
        dec!(0.109),
    ];
    let mut pairs = vec![(Decimal::ZERO, dec!(0.04))];
    pairs.extend(thresholds.into_iter().zip(rates));
    BracketSchedule::from_pairs(&pairs)
}

pub fn config_2025() -> StateTaxConfig {
    let single = brackets([
        dec!(8500),
        dec!(11700),
        dec!(13900),
        dec!(80650),
        dec!(215400),
        dec!(1077550),
        dec!(5000000),
        dec!(25000000),
    ]);
    let joint = brackets([
        dec!(17150),
        dec!(23600),
        dec!(27900),
        dec!(161550),
        dec!(323200),
        dec!(2155350),
        dec!(5000000),
        dec!(25000000),
    ]);
    let head_of_household = brackets([
        dec!(12800),
        dec!(17650),
        dec!(20900),
        dec!(107650),
        dec!(269300),
        dec!(1616450),
        dec!(5000000),
        dec!(25000000),
    ]);
    StateTaxConfig {
        state_code: "NY".to_string(),
        tax_year: 2025,
        starting_income: StartingIncome::FederalAgi,
        brackets: ByFilingStatus::joint_hoh_other(joint, head_of_household, single),
        standard_deduction: ByFilingStatus::joint_hoh_other(dec!(16050), dec!(11200), dec!(8000)),
        personal_exemption: ByFilingStatus::uniform(Decimal::ZERO),
        dependent_exemption: dec!(1000),
        social_security_taxable: false,
        retirement: RetirementTreatment::AgeExclusion(vec![AgeExclusion {
            min_age: 60,
            amount: dec!(20000),
        }]),
        eitc_rate: dec!(0.30),
    }
}

/// New York needs nothing beyond its config; the brackets, exclusions and
/// credit all follow the default hooks.
#[derive(Debug, Clone)]
pub struct NewYorkCalculator {
    config: StateTaxConfig,
}

impl NewYorkCalculator {
    pub fn new(config: StateTaxConfig) -> Self {
        Self { config }
    }
}

impl StateCalculator for NewYorkCalculator {
    fn config(&self) -> &StateTaxConfig {
        &self.config
    }
}
