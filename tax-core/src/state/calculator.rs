//! The state calculator contract.
//!
//! [`StateCalculator::calculate`] fixes the order every state follows:
//! starting income, additions and subtractions, deduction and exemptions,
//! bracket tax plus surtaxes, nonrefundable credits against the tax, then
//! refundable credits and payments. A state overrides only the hooks whose
//! rules differ from the defaults, which read [`StateTaxConfig`].

use rust_decimal::Decimal;
use tracing::debug;

use super::config::{
    RetirementTreatment, StartingIncome, StateAdjustment, StateCalculationBreakdown, StateCredit,
    StateTaxConfig,
};
use crate::calculations::brackets::{BracketTax, bracket_tax};
use crate::calculations::common::{money, non_negative, sum};
use crate::error::{TaxError, ensure_invariant};
use crate::models::{CalculationBreakdown, CreditKind, FilingStatus, Owner, Person, TaxReturn};

/// Inputs a state calculator reads: the return and the federal result it
/// builds on.
#[derive(Debug, Clone, Copy)]
pub struct StateContext<'a> {
    pub tax_return: &'a TaxReturn,
    pub federal: &'a CalculationBreakdown,
    pub filing_status: FilingStatus,
}

impl<'a> StateContext<'a> {
    pub fn new(
        tax_return: &'a TaxReturn,
        federal: &'a CalculationBreakdown,
    ) -> Self {
        Self {
            tax_return,
            federal,
            filing_status: federal.filing_status,
        }
    }

    pub fn filers(&self) -> Vec<(Owner, &'a Person)> {
        self.tax_return.taxpayer.filers()
    }

    pub fn dependent_count(&self) -> usize {
        self.tax_return.taxpayer.dependents.len()
    }

    pub fn federal_agi(&self) -> Decimal {
        self.federal.agi
    }

    pub fn federal_eitc(&self) -> Decimal {
        self.federal.credit_allowed(CreditKind::EarnedIncome)
    }

    /// Taxable pension, annuity and IRA distributions owned by `owner`.
    pub fn retirement_income_of(
        &self,
        owner: Owner,
    ) -> Decimal {
        sum(self
            .tax_return
            .income
            .distributions()
            .filter(|d| d.owner == owner)
            .map(|d| d.taxable()))
    }

    /// State tax withheld on W-2s plus any reported separately.
    pub fn withholding(&self) -> Decimal {
        money(
            sum(self.tax_return.income.w2s().map(|w| w.state_withholding))
                + self.tax_return.state_inputs.additional_withholding,
        )
    }
}

/// One state's rules for one tax year.
///
/// Implementations hold their [`StateTaxConfig`] plus any state-specific
/// constants and are shared read-only between threads once registered.
pub trait StateCalculator: Send + Sync {
    fn config(&self) -> &StateTaxConfig;

    fn state_code(&self) -> &str {
        &self.config().state_code
    }

    fn tax_year(&self) -> i32 {
        self.config().tax_year
    }

    fn starting_income(
        &self,
        ctx: &StateContext<'_>,
    ) -> Decimal {
        match self.config().starting_income {
            StartingIncome::FederalAgi | StartingIncome::IncomeClasses => ctx.federal.agi,
            StartingIncome::FederalTaxableIncome => ctx.federal.taxable_income,
        }
    }

    fn additions(
        &self,
        _ctx: &StateContext<'_>,
    ) -> Vec<StateAdjustment> {
        Vec::new()
    }

    /// U.S. obligation interest, which states may not tax, untaxed social
    /// security, and the retirement exclusion.
    fn subtractions(
        &self,
        ctx: &StateContext<'_>,
    ) -> Vec<StateAdjustment> {
        default_subtractions(self.config(), ctx)
    }

    fn deduction(
        &self,
        ctx: &StateContext<'_>,
        _state_agi: Decimal,
    ) -> Decimal {
        *self.config().standard_deduction.get(ctx.filing_status)
    }

    fn exemptions(
        &self,
        ctx: &StateContext<'_>,
        _state_agi: Decimal,
    ) -> Decimal {
        let config = self.config();
        *config.personal_exemption.get(ctx.filing_status)
            + config.dependent_exemption * Decimal::from(ctx.dependent_count())
    }

    fn tax(
        &self,
        ctx: &StateContext<'_>,
        taxable_income: Decimal,
    ) -> BracketTax {
        bracket_tax(self.config().brackets.get(ctx.filing_status), taxable_income)
    }

    fn surtax(
        &self,
        _ctx: &StateContext<'_>,
        _taxable_income: Decimal,
    ) -> Decimal {
        Decimal::ZERO
    }

    /// Credits in the order they are applied. The default is the state
    /// earned income credit.
    fn credits(
        &self,
        ctx: &StateContext<'_>,
        _state_agi: Decimal,
    ) -> Vec<StateCredit> {
        eitc_credit(self.config(), ctx).into_iter().collect()
    }

    fn calculate(
        &self,
        ctx: &StateContext<'_>,
    ) -> Result<StateCalculationBreakdown, TaxError> {
        let starting_income = money(self.starting_income(ctx));
        let additions = self.additions(ctx);
        let subtractions = self.subtractions(ctx);
        let state_agi = money(
            starting_income + sum(additions.iter().map(|a| a.amount))
                - sum(subtractions.iter().map(|s| s.amount)),
        );

        let deduction = money(non_negative(self.deduction(ctx, state_agi)));
        let exemptions = money(non_negative(self.exemptions(ctx, state_agi)));
        let taxable_income = money(non_negative(state_agi - deduction - exemptions));

        let bracket = self.tax(ctx, taxable_income);
        let tax = money(bracket.tax);
        let surtax = money(non_negative(self.surtax(ctx, taxable_income)));
        let tax_before_credits = tax + surtax;
        debug!(
            state = self.state_code(),
            state_agi = %state_agi,
            taxable_income = %taxable_income,
            tax = %tax_before_credits,
            "state tax before credits"
        );

        let mut remaining = tax_before_credits;
        let mut nonrefundable_credits = Decimal::ZERO;
        let mut refundable_credits = Decimal::ZERO;
        let mut credits = self.credits(ctx, state_agi);
        for credit in &mut credits {
            let amount = money(non_negative(credit.amount));
            if credit.refundable {
                credit.allowed_amount = amount;
                refundable_credits += amount;
            } else {
                let allowed = amount.min(remaining);
                remaining -= allowed;
                credit.allowed_amount = allowed;
                nonrefundable_credits += allowed;
            }
        }
        ensure_invariant(nonrefundable_credits <= tax_before_credits, || {
            format!(
                "{} nonrefundable credits {nonrefundable_credits} exceed tax {tax_before_credits}",
                self.state_code()
            )
        })?;

        let tax_after_credits = tax_before_credits - nonrefundable_credits;
        let net_liability = tax_after_credits - refundable_credits;
        let withholding = ctx.withholding();
        let estimated_payments = money(non_negative(ctx.tax_return.state_inputs.estimated_payments));
        let settlement = net_liability - withholding - estimated_payments;
        let (balance_due, refund) = if settlement >= Decimal::ZERO {
            (settlement, Decimal::ZERO)
        } else {
            (Decimal::ZERO, -settlement)
        };

        let effective_rate = if state_agi > Decimal::ZERO {
            (tax_after_credits / state_agi).round_dp(4)
        } else {
            Decimal::ZERO
        };

        Ok(StateCalculationBreakdown {
            state_code: self.state_code().to_string(),
            tax_year: self.tax_year(),
            filing_status: ctx.filing_status,
            starting_income,
            additions,
            subtractions,
            state_agi,
            deduction,
            exemptions,
            taxable_income,
            tax,
            spans: bracket.spans,
            surtax,
            tax_before_credits,
            credits,
            nonrefundable_credits,
            refundable_credits,
            tax_after_credits,
            net_liability,
            withholding,
            estimated_payments,
            balance_due,
            refund,
            effective_rate,
            marginal_rate: bracket.marginal_rate,
        })
    }
}

/// The subtractions most states share. Zero amounts are left out.
pub fn default_subtractions(
    config: &StateTaxConfig,
    ctx: &StateContext<'_>,
) -> Vec<StateAdjustment> {
    let mut subtractions = Vec::new();

    let us_interest = money(ctx.tax_return.income.us_obligation_interest());
    if us_interest > Decimal::ZERO {
        subtractions.push(StateAdjustment::new("U.S. obligation interest", us_interest));
    }

    let taxable_benefits = ctx.federal.income.social_security.taxable_benefits;
    if !config.social_security_taxable && taxable_benefits > Decimal::ZERO {
        subtractions.push(StateAdjustment::new("social security benefits", taxable_benefits));
    }

    let retirement = retirement_exclusion(&config.retirement, ctx);
    if retirement > Decimal::ZERO {
        subtractions.push(StateAdjustment::new("retirement income", retirement));
    }
    subtractions
}

/// Retirement income excluded across the filers on the return.
pub fn retirement_exclusion(
    treatment: &RetirementTreatment,
    ctx: &StateContext<'_>,
) -> Decimal {
    money(sum(ctx.filers().into_iter().map(|(owner, person)| {
        let income = non_negative(ctx.retirement_income_of(owner));
        match treatment.exclusion_for(person.age) {
            Some(limit) => income.min(limit),
            None => income,
        }
    })))
}

/// The state earned income credit, when the state has one and the filer
/// received the federal credit.
pub fn eitc_credit(
    config: &StateTaxConfig,
    ctx: &StateContext<'_>,
) -> Option<StateCredit> {
    let federal = ctx.federal_eitc();
    if config.eitc_rate <= Decimal::ZERO || federal <= Decimal::ZERO {
        return None;
    }
    Some(StateCredit::refundable(
        "earned income credit",
        money(federal * config.eitc_rate),
    ))
}
