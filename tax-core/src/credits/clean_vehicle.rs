//! Clean vehicle credits (Form 8936): new vehicles under §30D and previously
//! owned vehicles under §25E.
//!
//! A credit transferred to the dealer at the point of sale was already
//! received as a price reduction; it shows here as zero with a note. If the
//! buyer's MAGI then turns out to exceed the limit, the transferred amount is
//! recaptured as additional tax.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::CreditContext;
use crate::calculations::common::money;
use crate::models::{
    ByFilingStatus, CleanVehiclePurchase, CreditBreakdown, CreditKind, UnitBreakdown,
    VehicleCondition,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanVehicleConfig {
    pub critical_mineral_credit: Decimal,
    pub battery_component_credit: Decimal,
    /// MSRP ceiling for vans, SUVs and pickups.
    pub msrp_limit_large: Decimal,
    pub msrp_limit_other: Decimal,
    pub new_magi_limit: ByFilingStatus<Decimal>,
    pub used_credit_cap: Decimal,
    pub used_credit_rate: Decimal,
    pub used_price_limit: Decimal,
    pub used_magi_limit: ByFilingStatus<Decimal>,
    /// A used vehicle's model year must be at least this many years before
    /// the year of purchase.
    pub used_min_age_years: i32,
    /// Vehicles acquired on or before this date fall under the old rules.
    pub effective_after: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanVehicleCredits {
    pub new: CreditBreakdown,
    pub used: CreditBreakdown,
    /// Transferred credits the buyer was not entitled to.
    pub recapture: Decimal,
}

enum Outcome {
    Claimed(Decimal),
    Transferred(Decimal),
    Recaptured(Decimal),
    Ineligible(String),
}

pub fn calculate(
    ctx: &CreditContext,
    purchases: &[CleanVehiclePurchase],
    config: &CleanVehicleConfig,
) -> CleanVehicleCredits {
    let mut new_units = Vec::new();
    let mut used_units = Vec::new();
    let mut new_total = Decimal::ZERO;
    let mut used_total = Decimal::ZERO;
    let mut recapture = Decimal::ZERO;
    let mut new_notes = Vec::new();
    let mut used_notes = Vec::new();
    let mut used_claimed = false;

    for purchase in purchases {
        let (units, total, notes) = match purchase.condition {
            VehicleCondition::New => (&mut new_units, &mut new_total, &mut new_notes),
            VehicleCondition::PreviouslyOwned => (&mut used_units, &mut used_total, &mut used_notes),
        };
        let outcome = match purchase.condition {
            VehicleCondition::New => new_vehicle(ctx, purchase, config),
            // One used-vehicle credit per year.
            VehicleCondition::PreviouslyOwned if used_claimed => {
                Outcome::Ineligible("one previously owned vehicle credit per year".to_string())
            }
            VehicleCondition::PreviouslyOwned => used_vehicle(ctx, purchase, config),
        };
        let label = purchase.vin.as_str();
        match outcome {
            Outcome::Claimed(amount) => {
                *total += amount;
                used_claimed |= purchase.condition == VehicleCondition::PreviouslyOwned;
                units.push(UnitBreakdown::eligible(label, amount));
            }
            Outcome::Transferred(amount) => {
                used_claimed |= purchase.condition == VehicleCondition::PreviouslyOwned;
                units.push(UnitBreakdown::eligible(label, Decimal::ZERO));
                notes.push(format!("{label}: {amount} transferred to dealer at sale"));
            }
            Outcome::Recaptured(amount) => {
                recapture += amount;
                units.push(UnitBreakdown::ineligible(label, "MAGI above the limit"));
                notes.push(format!("{label}: {amount} transferred credit recaptured"));
            }
            Outcome::Ineligible(reason) => units.push(UnitBreakdown::ineligible(label, reason)),
        }
    }

    if recapture > Decimal::ZERO {
        warn!(recapture = %recapture, "transferred clean vehicle credit recaptured");
    }
    debug!(new = %new_total, used = %used_total, "clean vehicle credits");

    CleanVehicleCredits {
        new: finish(CreditKind::NewCleanVehicle, new_total, new_units, new_notes),
        used: finish(CreditKind::PreviouslyOwnedCleanVehicle, used_total, used_units, used_notes),
        recapture: money(recapture),
    }
}

/// Lesser of current and prior-year MAGI.
fn magi_for(
    ctx: &CreditContext,
    purchase: &CleanVehiclePurchase,
) -> Decimal {
    purchase
        .prior_year_magi
        .map_or(ctx.magi, |prior| prior.min(ctx.magi))
}

fn common_failure(
    ctx: &CreditContext,
    purchase: &CleanVehiclePurchase,
    config: &CleanVehicleConfig,
) -> Option<String> {
    if purchase.acquired_on <= config.effective_after {
        return Some(format!("acquired on or before {}", config.effective_after));
    }
    if purchase.acquired_on.year() != ctx.tax_year {
        return Some(format!("not acquired in {}", ctx.tax_year));
    }
    if purchase.for_resale {
        return Some("acquired for resale".to_string());
    }
    None
}

fn new_vehicle(
    ctx: &CreditContext,
    purchase: &CleanVehiclePurchase,
    config: &CleanVehicleConfig,
) -> Outcome {
    if let Some(reason) = common_failure(ctx, purchase, config) {
        return Outcome::Ineligible(reason);
    }
    let msrp_limit = if purchase.class.uses_higher_msrp_limit() {
        config.msrp_limit_large
    } else {
        config.msrp_limit_other
    };
    if purchase.msrp > msrp_limit {
        return Outcome::Ineligible(format!("MSRP above {msrp_limit}"));
    }

    let mut amount = Decimal::ZERO;
    if purchase.meets_critical_mineral_requirement {
        amount += config.critical_mineral_credit;
    }
    if purchase.meets_battery_component_requirement {
        amount += config.battery_component_credit;
    }
    if amount == Decimal::ZERO {
        return Outcome::Ineligible("meets neither sourcing requirement".to_string());
    }

    settle(ctx, purchase, *config.new_magi_limit.get(ctx.filing_status), amount)
}

fn used_vehicle(
    ctx: &CreditContext,
    purchase: &CleanVehiclePurchase,
    config: &CleanVehicleConfig,
) -> Outcome {
    if let Some(reason) = common_failure(ctx, purchase, config) {
        return Outcome::Ineligible(reason);
    }
    if !purchase.qualified_used_sale {
        return Outcome::Ineligible("not a qualified sale by a dealer".to_string());
    }
    if purchase.purchase_price > config.used_price_limit {
        return Outcome::Ineligible(format!("price above {}", config.used_price_limit));
    }
    if purchase.model_year > ctx.tax_year - config.used_min_age_years {
        return Outcome::Ineligible("model year too recent".to_string());
    }

    let amount = money((purchase.purchase_price * config.used_credit_rate).min(config.used_credit_cap));
    settle(ctx, purchase, *config.used_magi_limit.get(ctx.filing_status), amount)
}

fn settle(
    ctx: &CreditContext,
    purchase: &CleanVehiclePurchase,
    magi_limit: Decimal,
    amount: Decimal,
) -> Outcome {
    let over_limit = magi_for(ctx, purchase) > magi_limit;
    match (purchase.transferred_to_dealer, over_limit) {
        (true, true) => Outcome::Recaptured(amount),
        (true, false) => Outcome::Transferred(amount),
        (false, true) => Outcome::Ineligible(format!("MAGI above {magi_limit}")),
        (false, false) => Outcome::Claimed(amount),
    }
}

fn finish(
    kind: CreditKind,
    total: Decimal,
    units: Vec<UnitBreakdown>,
    notes: Vec<String>,
) -> CreditBreakdown {
    if units.is_empty() {
        return CreditBreakdown::ineligible(kind, "no qualifying vehicles");
    }
    if !units.iter().any(|u| u.eligible) {
        return CreditBreakdown {
            units,
            notes,
            ..CreditBreakdown::ineligible(kind, "no qualifying vehicles")
        };
    }
    CreditBreakdown {
        tentative_amount: money(total),
        amount: money(total),
        units,
        notes,
        ..CreditBreakdown::new(kind)
    }
}
