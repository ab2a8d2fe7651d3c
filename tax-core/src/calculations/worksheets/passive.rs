//! Passive activity loss limitation for rental real estate (Form 8582).
//!
//! Rental activities are passive unless the taxpayer is a real estate
//! professional. Net passive losses are allowed only up to the special
//! allowance for actively managed rentals; the rest is suspended until the
//! activity produces income or is disposed of.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{money, non_negative, sum};
use crate::models::{FilingStatus, RentalProperty};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassiveLossConfig {
    /// $25,000; halved for separate filers who lived apart all year.
    pub special_allowance: Decimal,
    /// MAGI at which the allowance starts to phase out ($100,000).
    pub phaseout_start: Decimal,
    /// Allowance lost per dollar of MAGI over the start (50%).
    pub phaseout_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassiveActivityInput<'a> {
    pub rentals: Vec<&'a RentalProperty>,
    /// Net passive income or loss from K-1s.
    pub k1_passive_income: Decimal,
    /// MAGI without passive losses, taxable benefits, IRA or student loan
    /// deductions.
    pub modified_agi: Decimal,
    pub filing_status: FilingStatus,
    pub lived_with_spouse: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassiveActivityResult {
    /// Rental income from real estate professionals, outside the limits.
    pub nonpassive_income: Decimal,
    /// Income or loss of activities disposed of this year, fully allowed.
    pub disposed_income: Decimal,
    /// Net of the remaining passive activities before the limitation.
    pub net_passive: Decimal,
    pub special_allowance: Decimal,
    pub allowed_loss: Decimal,
    pub suspended_loss: Decimal,
    /// Amount entering gross income.
    pub included_in_income: Decimal,
}

pub fn limit_passive_losses(
    input: &PassiveActivityInput<'_>,
    config: &PassiveLossConfig,
) -> PassiveActivityResult {
    let nonpassive_income = sum(input
        .rentals
        .iter()
        .filter(|r| r.real_estate_professional)
        .map(|r| r.net()));

    let passive: Vec<&RentalProperty> = input
        .rentals
        .iter()
        .copied()
        .filter(|r| !r.real_estate_professional)
        .collect();

    let disposed_income = sum(passive
        .iter()
        .filter(|r| r.disposed)
        .map(|r| r.net() - r.prior_suspended_loss));

    let continuing: Vec<&RentalProperty> = passive.iter().copied().filter(|r| !r.disposed).collect();
    let net_passive =
        sum(continuing.iter().map(|r| r.net() - r.prior_suspended_loss)) + input.k1_passive_income;

    let (special_allowance, allowed_loss, suspended_loss) = if net_passive >= Decimal::ZERO {
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
    } else {
        let loss = -net_passive;
        let active_loss = non_negative(-sum(continuing
            .iter()
            .filter(|r| r.active_participation)
            .map(|r| r.net() - r.prior_suspended_loss)));
        let allowance = allowance_for(input, config);
        let allowed = loss.min(active_loss).min(allowance);
        (allowance, allowed, loss - allowed)
    };

    let passive_included = if net_passive >= Decimal::ZERO {
        net_passive
    } else {
        -allowed_loss
    };

    let result = PassiveActivityResult {
        nonpassive_income: money(nonpassive_income),
        disposed_income: money(disposed_income),
        net_passive: money(net_passive),
        special_allowance: money(special_allowance),
        allowed_loss: money(allowed_loss),
        suspended_loss: money(suspended_loss),
        included_in_income: money(nonpassive_income + disposed_income + passive_included),
    };
    debug!(
        net_passive = %result.net_passive,
        allowed = %result.allowed_loss,
        suspended = %result.suspended_loss,
        "passive activity limitation"
    );
    result
}

fn allowance_for(
    input: &PassiveActivityInput<'_>,
    config: &PassiveLossConfig,
) -> Decimal {
    let (maximum, start) = match input.filing_status {
        FilingStatus::MarriedFilingSeparately if input.lived_with_spouse => {
            return Decimal::ZERO;
        }
        FilingStatus::MarriedFilingSeparately => {
            (config.special_allowance * dec!(0.5), config.phaseout_start * dec!(0.5))
        }
        _ => (config.special_allowance, config.phaseout_start),
    };
    non_negative(maximum - non_negative(input.modified_agi - start) * config.phaseout_rate)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn config() -> PassiveLossConfig {
        PassiveLossConfig {
            special_allowance: dec!(25000),
            phaseout_start: dec!(100000),
            phaseout_rate: dec!(0.50),
        }
    }

    fn rental(net: Decimal) -> RentalProperty {
        RentalProperty {
            rents_received: dec!(20000),
            expenses: dec!(20000) - net,
            active_participation: true,
            ..RentalProperty::default()
        }
    }

    fn input<'a>(
        rentals: Vec<&'a RentalProperty>,
        modified_agi: Decimal,
    ) -> PassiveActivityInput<'a> {
        PassiveActivityInput {
            rentals,
            k1_passive_income: dec!(0),
            modified_agi,
            filing_status: FilingStatus::Single,
            lived_with_spouse: false,
        }
    }

    #[test]
    fn rental_income_passes_through() {
        let property = rental(dec!(6000));
        let result = limit_passive_losses(&input(vec![&property], dec!(80000)), &config());

        assert_eq!(result.included_in_income, dec!(6000.00));
        assert_eq!(result.suspended_loss, dec!(0.00));
    }

    #[test]
    fn loss_within_allowance_is_fully_allowed() {
        let property = rental(dec!(-10000));
        let result = limit_passive_losses(&input(vec![&property], dec!(80000)), &config());

        assert_eq!(result.included_in_income, dec!(-10000.00));
        assert_eq!(result.special_allowance, dec!(25000.00));
    }

    #[test]
    fn allowance_phases_out_at_half_the_excess() {
        let property = rental(dec!(-30000));
        let result = limit_passive_losses(&input(vec![&property], dec!(120000)), &config());

        // 25,000 − 50% × 20,000
        assert_eq!(result.allowed_loss, dec!(15000.00));
        assert_eq!(result.suspended_loss, dec!(15000.00));
        assert_eq!(result.included_in_income, dec!(-15000.00));
    }

    #[test]
    fn allowance_gone_at_150000() {
        let property = rental(dec!(-5000));
        let result = limit_passive_losses(&input(vec![&property], dec!(150000)), &config());

        assert_eq!(result.allowed_loss, dec!(0.00));
        assert_eq!(result.suspended_loss, dec!(5000.00));
    }

    #[test]
    fn disposition_releases_suspended_losses() {
        let property = RentalProperty {
            prior_suspended_loss: dec!(8000),
            disposed: true,
            ..rental(dec!(2000))
        };
        let result = limit_passive_losses(&input(vec![&property], dec!(200000)), &config());

        assert_eq!(result.included_in_income, dec!(-6000.00));
        assert_eq!(result.suspended_loss, dec!(0.00));
    }

    #[test]
    fn real_estate_professional_is_not_limited() {
        let property = RentalProperty {
            real_estate_professional: true,
            ..rental(dec!(-40000))
        };
        let result = limit_passive_losses(&input(vec![&property], dec!(300000)), &config());

        assert_eq!(result.included_in_income, dec!(-40000.00));
    }

    #[test]
    fn separate_filer_living_together_gets_no_allowance() {
        let property = rental(dec!(-5000));
        let result = limit_passive_losses(
            &PassiveActivityInput {
                filing_status: FilingStatus::MarriedFilingSeparately,
                lived_with_spouse: true,
                ..input(vec![&property], dec!(40000))
            },
            &config(),
        );

        assert_eq!(result.allowed_loss, dec!(0.00));
        assert_eq!(result.suspended_loss, dec!(5000.00));
    }

    #[test]
    fn passive_k1_income_absorbs_rental_loss() {
        let property = rental(dec!(-5000));
        let result = limit_passive_losses(
            &PassiveActivityInput {
                k1_passive_income: dec!(7000),
                ..input(vec![&property], dec!(200000))
            },
            &config(),
        );

        assert_eq!(result.included_in_income, dec!(2000.00));
    }
}
