//! California: nine brackets on federal AGI with California adjustments,
//! exemption credits instead of exemptions, a renter's credit, and the 1%
//! behavioral health services surtax on taxable income over $1,000,000.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{money, non_negative, stepped_reduction};
use crate::models::{BracketSchedule, ByFilingStatus};
use crate::state::calculator::{StateCalculator, StateContext};
use crate::state::config::{StartingIncome, StateAdjustment, StateCredit, StateTaxConfig};

/// Credits and surtax specific to California.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaliforniaRules {
    /// Personal exemption credits per return before the senior and blind
    /// credits.
    pub personal_credits: ByFilingStatus<u32>,
    pub personal_credit: Decimal,
    pub dependent_credit: Decimal,
    /// Federal AGI above which every exemption credit is reduced.
    pub credit_phaseout_start: ByFilingStatus<Decimal>,
    pub credit_phaseout_step: ByFilingStatus<Decimal>,
    pub credit_phaseout_per_step: Decimal,
    pub surtax_threshold: Decimal,
    pub surtax_rate: Decimal,
    pub renters_credit: ByFilingStatus<Decimal>,
    pub renters_agi_limit: ByFilingStatus<Decimal>,
}

fn brackets(thresholds: [Decimal; 8]) -> BracketSchedule {
    let rates = [
        dec!(0.02),
        dec!(0.04),
        dec!(0.06),
        dec!(0.08),
        dec!(0.093),
        dec!(0.103),
        dec!(0.113),
        dec!(0.123),
    ];
    let mut pairs = vec![(Decimal::ZERO, dec!(0.01))];
    pairs.extend(thresholds.into_iter().zip(rates));
    BracketSchedule::from_pairs(&pairs)
}

pub fn config_2025() -> StateTaxConfig {
    let single = brackets([
        dec!(11079),
        dec!(26264),
        dec!(41452),
        dec!(57542),
        dec!(72724),
        dec!(371479),
        dec!(445771),
        dec!(742953),
    ]);
    let joint = brackets([
        dec!(22158),
        dec!(52528),
        dec!(82904),
        dec!(115084),
        dec!(145448),
        dec!(742958),
        dec!(891542),
        dec!(1485906),
    ]);
    let head_of_household = brackets([
        dec!(22173),
        dec!(52530),
        dec!(67716),
        dec!(83805),
        dec!(98990),
        dec!(505208),
        dec!(606251),
        dec!(1010417),
    ]);
    StateTaxConfig {
        state_code: "CA".to_string(),
        tax_year: 2025,
        starting_income: StartingIncome::FederalAgi,
        brackets: ByFilingStatus::joint_hoh_other(joint, head_of_household, single),
        standard_deduction: ByFilingStatus::joint_hoh_other(dec!(11412), dec!(11412), dec!(5706)),
        personal_exemption: ByFilingStatus::uniform(Decimal::ZERO),
        dependent_exemption: Decimal::ZERO,
        social_security_taxable: false,
        retirement: Default::default(),
        eitc_rate: Decimal::ZERO,
    }
}

pub fn rules_2025() -> CaliforniaRules {
    CaliforniaRules {
        personal_credits: ByFilingStatus::joint_and_other(2, 1),
        personal_credit: dec!(153),
        dependent_credit: dec!(475),
        credit_phaseout_start: ByFilingStatus::joint_hoh_other(
            dec!(504411),
            dec!(378310),
            dec!(252203),
        ),
        credit_phaseout_step: ByFilingStatus::new(
            dec!(2500),
            dec!(2500),
            dec!(1250),
            dec!(2500),
            dec!(2500),
        ),
        credit_phaseout_per_step: dec!(6),
        surtax_threshold: dec!(1000000),
        surtax_rate: dec!(0.01),
        renters_credit: ByFilingStatus::joint_hoh_other(dec!(120), dec!(120), dec!(60)),
        renters_agi_limit: ByFilingStatus::joint_hoh_other(
            dec!(107987),
            dec!(107987),
            dec!(53994),
        ),
    }
}

#[derive(Debug, Clone)]
pub struct CaliforniaCalculator {
    config: StateTaxConfig,
    rules: CaliforniaRules,
}

impl CaliforniaCalculator {
    pub fn new(
        config: StateTaxConfig,
        rules: CaliforniaRules,
    ) -> Self {
        Self { config, rules }
    }

    /// Personal, senior and blind credits, then dependent credits, each
    /// reduced for high income.
    fn exemption_credits(
        &self,
        ctx: &StateContext<'_>,
    ) -> Decimal {
        let rules = &self.rules;
        let status = ctx.filing_status;
        let filers = ctx.filers();
        let personal = *rules.personal_credits.get(status)
            + filers.iter().filter(|(_, p)| p.age >= 65).count() as u32
            + filers.iter().filter(|(_, p)| p.blind).count() as u32;
        let dependents = ctx.dependent_count() as u32;

        let reduction = stepped_reduction(
            ctx.federal_agi() - *rules.credit_phaseout_start.get(status),
            *rules.credit_phaseout_step.get(status),
            rules.credit_phaseout_per_step,
        );
        money(
            non_negative(rules.personal_credit - reduction) * Decimal::from(personal)
                + non_negative(rules.dependent_credit - reduction) * Decimal::from(dependents),
        )
    }
}

impl StateCalculator for CaliforniaCalculator {
    fn config(&self) -> &StateTaxConfig {
        &self.config
    }

    /// California does not recognize health savings accounts.
    fn additions(
        &self,
        ctx: &StateContext<'_>,
    ) -> Vec<StateAdjustment> {
        let hsa = ctx.federal.adjustments.hsa;
        if hsa > Decimal::ZERO {
            vec![StateAdjustment::new("health savings account deduction", hsa)]
        } else {
            Vec::new()
        }
    }

    fn exemptions(
        &self,
        _ctx: &StateContext<'_>,
        _state_agi: Decimal,
    ) -> Decimal {
        Decimal::ZERO
    }

    fn surtax(
        &self,
        _ctx: &StateContext<'_>,
        taxable_income: Decimal,
    ) -> Decimal {
        money(non_negative(taxable_income - self.rules.surtax_threshold) * self.rules.surtax_rate)
    }

    fn credits(
        &self,
        ctx: &StateContext<'_>,
        state_agi: Decimal,
    ) -> Vec<StateCredit> {
        let mut credits = vec![StateCredit::nonrefundable(
            "exemption credits",
            self.exemption_credits(ctx),
        )];

        let status = ctx.filing_status;
        if ctx.tax_return.state_inputs.rent_paid > Decimal::ZERO
            && state_agi <= *self.rules.renters_agi_limit.get(status)
        {
            credits.push(StateCredit::nonrefundable(
                "renter's credit",
                *self.rules.renters_credit.get(status),
            ));
        }
        credits
    }
}
