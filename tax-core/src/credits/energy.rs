//! Residential energy credits (Form 5695).
//!
//! Part II, the energy efficient home improvement credit, has per-item caps
//! under an annual aggregate, with heat pumps capped separately. Part I, the
//! residential clean energy credit, has no annual cap; whatever the
//! liability cannot absorb carries forward, which the engine records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{money, sum};
use crate::models::{CleanEnergyProperty, CreditBreakdown, CreditKind, EnergyImprovements, UnitBreakdown};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyCreditConfig {
    pub improvement_rate: Decimal,
    /// Annual cap on everything except heat pumps.
    pub aggregate_limit: Decimal,
    pub heat_pump_limit: Decimal,
    pub windows_limit: Decimal,
    pub door_limit: Decimal,
    pub doors_total_limit: Decimal,
    pub energy_property_limit: Decimal,
    pub audit_limit: Decimal,
    pub clean_energy_rate: Decimal,
    /// Battery storage must be at least this capacity.
    pub battery_min_kwh: Decimal,
    /// Fuel cell credit cap per half kilowatt of capacity.
    pub fuel_cell_limit_per_half_kw: Decimal,
}

pub fn home_improvement(
    improvements: &EnergyImprovements,
    config: &EnergyCreditConfig,
) -> CreditBreakdown {
    const KIND: CreditKind = CreditKind::EnergyEfficientHomeImprovement;
    let rate = config.improvement_rate;

    let mut units = Vec::new();
    let mut push = |label: &str, cost: Decimal, limit: Option<Decimal>| -> Decimal {
        if cost <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let credit = limit.map_or(cost * rate, |cap| (cost * rate).min(cap));
        units.push(UnitBreakdown::eligible(label, money(credit)));
        credit
    };

    let insulation = push("insulation", improvements.insulation, None);
    let windows = push(
        "windows and skylights",
        improvements.windows_and_skylights,
        Some(config.windows_limit),
    );
    let doors_each: Decimal = sum(improvements
        .exterior_doors
        .iter()
        .map(|cost| (*cost * rate).min(config.door_limit)));
    let doors = push(
        "exterior doors",
        sum(improvements.exterior_doors.iter().copied()),
        Some(doors_each.min(config.doors_total_limit)),
    );
    let property = sum(improvements
        .energy_property
        .iter()
        .map(|cost| (*cost * rate).min(config.energy_property_limit)));
    let property = push(
        "energy property",
        sum(improvements.energy_property.iter().copied()),
        Some(property),
    );
    let audit = push(
        "home energy audit",
        improvements.home_energy_audit,
        Some(config.audit_limit),
    );
    let heat_pumps = push(
        "heat pumps and biomass stoves",
        improvements.heat_pumps,
        Some(config.heat_pump_limit),
    );

    if units.is_empty() {
        return CreditBreakdown::ineligible(KIND, "no qualifying improvements");
    }

    let aggregate = insulation + windows + doors + property + audit;
    let tentative = aggregate + heat_pumps;
    let amount = money(aggregate.min(config.aggregate_limit) + heat_pumps);

    debug!(amount = %amount, "energy efficient home improvement credit");

    CreditBreakdown {
        tentative_amount: money(tentative),
        phaseout_reduction: money(tentative) - amount,
        amount,
        units,
        ..CreditBreakdown::new(KIND)
    }
}

pub fn clean_energy(
    property: &CleanEnergyProperty,
    config: &EnergyCreditConfig,
) -> CreditBreakdown {
    const KIND: CreditKind = CreditKind::ResidentialCleanEnergy;
    let rate = config.clean_energy_rate;

    let mut units = Vec::new();
    let mut current = Decimal::ZERO;
    for (label, cost) in [
        ("solar electric", property.solar_electric),
        ("solar water heating", property.solar_water_heating),
        ("small wind", property.small_wind),
        ("geothermal heat pump", property.geothermal_heat_pump),
    ] {
        if cost > Decimal::ZERO {
            let credit = cost * rate;
            current += credit;
            units.push(UnitBreakdown::eligible(label, money(credit)));
        }
    }

    if property.battery_storage > Decimal::ZERO {
        if property.battery_capacity_kwh >= config.battery_min_kwh {
            let credit = property.battery_storage * rate;
            current += credit;
            units.push(UnitBreakdown::eligible("battery storage", money(credit)));
        } else {
            units.push(UnitBreakdown::ineligible(
                "battery storage",
                format!("capacity below {} kWh", config.battery_min_kwh),
            ));
        }
    }

    if property.fuel_cell > Decimal::ZERO {
        let half_kw = (property.fuel_cell_kilowatts * Decimal::TWO).floor();
        let cap = half_kw * config.fuel_cell_limit_per_half_kw;
        let credit = (property.fuel_cell * rate).min(cap);
        current += credit;
        units.push(UnitBreakdown::eligible("fuel cell", money(credit)));
    }

    if units.is_empty() && property.prior_year_carryforward <= Decimal::ZERO {
        return CreditBreakdown::ineligible(KIND, "no qualifying property");
    }

    let amount = money(current + property.prior_year_carryforward);
    let mut breakdown = CreditBreakdown {
        tentative_amount: amount,
        amount,
        units,
        ..CreditBreakdown::new(KIND)
    };
    if property.prior_year_carryforward > Decimal::ZERO {
        breakdown
            .notes
            .push(format!("includes {} carried forward", property.prior_year_carryforward));
    }
    breakdown
}
