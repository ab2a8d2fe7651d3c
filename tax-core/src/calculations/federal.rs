//! Federal tax engine.
//!
//! Runs a return through the Form 1040 pipeline in a fixed order: income,
//! adjustments, AGI, deductions, taxable income, regular tax, AMT and
//! self-employment tax, nonrefundable credits in statutory order, other
//! taxes, refundable credits, payments and the underpayment penalty. Each
//! stage reads only the stages before it.
//!
//! AGI-dependent adjustments are resolved in a single pass. Self-employment
//! tax does not depend on AGI and is computed first. Every other adjustment
//! that does not depend on AGI is subtracted to get a preliminary AGI.
//! The IRA deduction is phased out against that preliminary figure, and
//! the student loan deduction against preliminary AGI less the IRA
//! deduction. Nothing is iterated.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::calculations::adjustments::{self, IraFilers};
use crate::calculations::brackets::{bracket_tax, stacked_tax, tax_on};
use crate::calculations::common::{money, non_negative, sum};
use crate::calculations::deductions::{self, StandardDeductionInput};
use crate::calculations::worksheets::{
    AmtInput, AmtResult, AmtWorksheet, CapitalGainsInput, CapitalGainsResult, OtherTaxesInput,
    PassiveActivityInput, PassiveActivityResult, QbiBusiness, QbiInput, QbiResult, QbiWorksheet,
    SeWorksheet, SeWorksheetInput, SeWorksheetResult, SocialSecurityInput,
    SocialSecurityWorksheet, UnderpaymentInput, UnderpaymentWorksheet,
    calculate_other_taxes, limit_passive_losses, net_capital_gains,
};
use crate::credits::{
    ChildTaxCredits, ClassifiedDependent, CreditContext, adoption, business, child_tax,
    clean_vehicle, dependent_care, earned_income, education, elderly_disabled, energy,
    foreign_tax, premium_tax, savers,
};
use crate::error::{ConfigError, TaxError, ValidationError, ensure_invariant};
use crate::models::{
    AdjustmentsBreakdown, CalculationBreakdown, Carryforwards, CreditBreakdown, DeductionBreakdown,
    FilingStatus, ForeignTaxInfo, Income, IncomeBreakdown, IncomeSource, OtherTaxesBreakdown,
    Owner, PaymentsBreakdown, RegularTaxBreakdown, TaxReturn, TaxYearConfig,
};
use crate::tax_years;

/// Computes federal returns for every tax year it holds a configuration
/// for.
///
/// Configurations are validated once at construction and read-only
/// afterwards, so an engine can be shared between threads.
#[derive(Debug, Clone)]
pub struct FederalTaxEngine {
    configs: BTreeMap<i32, TaxYearConfig>,
}

impl FederalTaxEngine {
    /// Builds an engine from explicit year configurations. A later config
    /// for the same year replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Validation`] if any configuration fails
    /// [`TaxYearConfig::validate`].
    pub fn new(configs: impl IntoIterator<Item = TaxYearConfig>) -> Result<Self, TaxError> {
        let mut by_year = BTreeMap::new();
        for config in configs {
            config.validate()?;
            by_year.insert(config.tax_year, config);
        }
        Ok(Self { configs: by_year })
    }

    /// Engine loaded with every built-in tax year.
    pub fn with_builtin_years() -> Result<Self, TaxError> {
        let configs = tax_years::SUPPORTED_YEARS
            .iter()
            .map(|&year| tax_years::builtin(year))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(configs)
    }

    pub fn config(
        &self,
        tax_year: i32,
    ) -> Result<&TaxYearConfig, ValidationError> {
        self.configs
            .get(&tax_year)
            .ok_or(ValidationError::UnsupportedTaxYear(tax_year))
    }

    pub fn tax_years(&self) -> impl Iterator<Item = i32> + '_ {
        self.configs.keys().copied()
    }

    /// Computes the full federal breakdown for `tax_return`.
    ///
    /// The return is not modified, and calling this twice on the same
    /// return gives identical breakdowns.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Validation`] for malformed input or an unknown
    /// tax year, and [`TaxError::ArithmeticInvariant`] if an internal
    /// consistency check fails.
    pub fn calculate(
        &self,
        tax_return: &TaxReturn,
    ) -> Result<CalculationBreakdown, TaxError> {
        tax_return.validate()?;
        let config = self.config(tax_return.tax_year)?;
        let filing_status = tax_return.filing_status()?;

        info!(
            tax_year = tax_return.tax_year,
            filing_status = %filing_status,
            "calculating federal return"
        );
        Calculation {
            tax_return,
            config,
            filing_status,
        }
        .run()
    }
}

/// One pass of the pipeline over one return.
struct Calculation<'a> {
    tax_return: &'a TaxReturn,
    config: &'a TaxYearConfig,
    filing_status: FilingStatus,
}

/// Self-employment results per person, and their sum.
struct SelfEmployment {
    by_owner: Vec<(Owner, SeWorksheetResult)>,
    combined: SeWorksheetResult,
}

impl SelfEmployment {
    fn deduction_of(
        &self,
        owner: Owner,
    ) -> Decimal {
        self.by_owner
            .iter()
            .find(|(o, _)| *o == owner)
            .map_or(Decimal::ZERO, |(_, r)| r.se_tax_deduction)
    }
}

/// Income and adjustments through AGI.
struct AgiStage {
    income: IncomeBreakdown,
    adjustments: AdjustmentsBreakdown,
    agi: Decimal,
}

/// Credits applied so far and the liability they may still offset.
struct CreditLedger {
    credits: Vec<CreditBreakdown>,
    remaining: Decimal,
    nonrefundable: Decimal,
}

impl CreditLedger {
    fn new(liability: Decimal) -> Self {
        Self {
            credits: Vec::new(),
            remaining: non_negative(liability),
            nonrefundable: Decimal::ZERO,
        }
    }

    /// Applies the nonrefundable part of `credit` against the remaining
    /// liability and returns the part that did not fit.
    fn apply(
        &mut self,
        mut credit: CreditBreakdown,
    ) -> Decimal {
        let claimed = non_negative(credit.nonrefundable_amount());
        let allowed = claimed.min(self.remaining);
        self.remaining -= allowed;
        self.nonrefundable += allowed;
        credit.allowed_amount = allowed;
        self.credits.push(credit);
        claimed - allowed
    }

    /// Like [`apply`](Self::apply), recording the unused part as a
    /// carryforward on the credit itself.
    fn apply_with_carryforward(
        &mut self,
        credit: CreditBreakdown,
    ) -> Decimal {
        let unused = self.apply(credit);
        if let Some(last) = self.credits.last_mut() {
            last.carryforward += unused;
            return last.carryforward;
        }
        unused
    }

    /// Adds every refundable portion to the allowed amounts and returns
    /// their total.
    fn settle_refundable(&mut self) -> Decimal {
        let mut total = Decimal::ZERO;
        for credit in &mut self.credits {
            let refundable = non_negative(credit.refundable_amount);
            credit.allowed_amount += refundable;
            total += refundable;
        }
        money(total)
    }
}

impl Calculation<'_> {
    fn run(self) -> Result<CalculationBreakdown, TaxError> {
        let status = self.filing_status;
        let config = self.config;
        let tax_return = self.tax_return;
        let income = &tax_return.income;

        // Self-employment tax and capital gains do not depend on AGI.
        let self_employment = self.self_employment()?;
        let capital_gains = net_capital_gains(&CapitalGainsInput {
            short_term_gain: income.short_term_gain(),
            long_term_gain: income.long_term_gain(),
            carryforward: income.loss_carryforward(),
            loss_limit: *config.capital_gains.loss_limit.get(status),
        });

        let AgiStage {
            income: income_breakdown,
            adjustments,
            agi,
        } = self.agi(&self_employment, capital_gains);
        debug!(gross = %income_breakdown.total, agi = %agi, "adjusted gross income");

        let dependents = self.classify_dependents(agi);
        let earned = |owner| self.earned_income_of(owner, &self_employment);

        // Deductions and taxable income.
        let standard = deductions::standard_deduction(
            &StandardDeductionInput {
                filing_status: status,
                primary: &tax_return.taxpayer.primary,
                spouse: tax_return.taxpayer.spouse.as_ref(),
                earned_income: earned(Owner::Primary),
                spouse_itemizes: tax_return.taxpayer.spouse_itemizes,
            },
            &config.standard_deduction,
        );
        let itemized = deductions::itemized_deductions(
            &tax_return.deductions.itemized,
            agi,
            status,
            investment_interest_income(income),
            &config.itemized,
        );
        let deduction =
            deductions::choose_deduction(standard, itemized, tax_return.deductions.force_itemize);

        let preferential_base =
            non_negative(income_breakdown.capital_gains.net_capital_gain + income.qualified_dividends());
        let qbi = self.qbi(non_negative(agi - deduction.amount), preferential_base);
        let taxable_income = money(non_negative(agi - deduction.amount - qbi.deduction));
        ensure_invariant(taxable_income >= Decimal::ZERO, || {
            format!("taxable income {taxable_income} is negative")
        })?;
        debug!(deduction = %deduction.amount, qbi = %qbi.deduction, taxable_income = %taxable_income, "taxable income");

        // Regular tax and AMT.
        let regular_tax = self.regular_tax(taxable_income, preferential_base);
        let amt = self.amt(&deduction, taxable_income, &regular_tax);

        // Credits share one context; the premium tax credit measures
        // household income with tax-exempt interest and untaxed benefits
        // added back.
        let ctx = CreditContext {
            tax_year: tax_return.tax_year,
            filing_status: status,
            agi,
            magi: agi,
            earned_income: earned(Owner::Primary) + earned(Owner::Spouse),
            primary_earned_income: earned(Owner::Primary),
            spouse_earned_income: earned(Owner::Spouse),
            investment_income: self.eitc_investment_income(&income_breakdown),
            primary: tax_return.taxpayer.primary.clone(),
            spouse: tax_return.taxpayer.spouse.clone(),
            lived_with_spouse: tax_return.taxpayer.lived_with_spouse,
            dependents,
        };
        let premium = tax_return.credits.marketplace_coverage.as_ref().map(|coverage| {
            let household = CreditContext {
                magi: agi
                    + income_breakdown.tax_exempt_interest
                    + non_negative(
                        income_breakdown.social_security.benefits
                            - income_breakdown.social_security.taxable_benefits,
                    ),
                ..ctx.clone()
            };
            premium_tax::calculate(&household, coverage, &config.credits.premium_tax)
        });
        let excess_advance_repayment = premium
            .as_ref()
            .map_or(Decimal::ZERO, |p| p.excess_advance_repayment);

        let tax_before_credits = money(
            regular_tax.tax
                + amt.amt
                + self_employment.combined.self_employment_tax
                + excess_advance_repayment,
        );
        let (mut ledger, credit_carryforwards, clean_vehicle_recapture) =
            self.nonrefundable_credits(&ctx, &regular_tax, &amt, taxable_income, tax_before_credits);

        // Refundable credits.
        let earned_income_total = ctx.earned_income;
        ledger
            .credits
            .push(earned_income::calculate(&ctx, &config.credits.earned_income));
        if let Some(premium) = premium {
            ledger.credits.push(premium.credit);
        }
        let refundable_credits = ledger.settle_refundable();

        let nonrefundable_credits = money(ledger.nonrefundable);
        ensure_invariant(nonrefundable_credits <= tax_before_credits, || {
            format!("nonrefundable credits {nonrefundable_credits} exceed tax {tax_before_credits}")
        })?;
        let tax_after_credits = money(tax_before_credits - nonrefundable_credits);
        debug!(
            earned_income = %earned_income_total,
            nonrefundable = %nonrefundable_credits,
            refundable = %refundable_credits,
            "credits applied"
        );

        // Other taxes.
        let schedule_2 = calculate_other_taxes(
            &OtherTaxesInput {
                medicare_wages: income.medicare_wages(),
                se_net_earnings: self_employment.combined.net_earnings,
                net_investment_income: net_investment_income(&income_breakdown),
                modified_agi: agi,
                early_distributions: income.early_distributions(),
                filing_status: status,
            },
            &config.other_taxes,
        );
        let other_total = money(schedule_2.total() + clean_vehicle_recapture);
        let other_taxes = OtherTaxesBreakdown {
            schedule_2,
            clean_vehicle_recapture,
            total: other_total,
        };

        let total_tax = money(tax_after_credits + other_taxes.total);
        let net_liability = money(total_tax - refundable_credits);

        // Payments and penalty.
        let payments = self.payments();
        let underpayment = UnderpaymentWorksheet::new(&config.penalty).calculate(&UnderpaymentInput {
            current_year_tax: non_negative(net_liability),
            withholding: payments.withholding,
            timely_estimated_payments: tax_return.payments.timely_estimated(tax_return.tax_year),
            prior_year: tax_return.payments.prior_year.clone(),
            filing_status: status,
            farmer_or_fisher: tax_return.payments.farmer_or_fisher,
        });

        let settlement = money(net_liability - payments.total + underpayment.penalty);
        let (balance_due, refund) = if settlement >= Decimal::ZERO {
            (settlement, Decimal::ZERO)
        } else {
            (Decimal::ZERO, -settlement)
        };

        let carryforwards = Carryforwards {
            capital_loss_short_term: income_breakdown.capital_gains.short_term_carryforward,
            capital_loss_long_term: income_breakdown.capital_gains.long_term_carryforward,
            passive_losses: income_breakdown.rental.suspended_loss,
            charitable: deduction.itemized.charitable_carryforward,
            ..credit_carryforwards
        };

        let effective_rate = if agi > Decimal::ZERO {
            (total_tax / agi).round_dp(4)
        } else {
            Decimal::ZERO
        };
        let marginal_rate = regular_tax.marginal_rate;

        info!(
            agi = %agi,
            taxable_income = %taxable_income,
            total_tax = %total_tax,
            balance_due = %balance_due,
            refund = %refund,
            "federal return calculated"
        );

        Ok(CalculationBreakdown {
            tax_year: tax_return.tax_year,
            filing_status: status,
            gross_income: income_breakdown.total,
            income: income_breakdown,
            adjustments,
            agi,
            deductions: deduction,
            qbi,
            taxable_income,
            regular_tax,
            amt,
            tax_before_credits,
            credits: ledger.credits,
            nonrefundable_credits,
            tax_after_credits,
            self_employment: self_employment.combined,
            other_taxes,
            total_tax,
            refundable_credits,
            net_liability,
            payments,
            balance_due,
            refund,
            underpayment,
            carryforwards,
            effective_rate,
            marginal_rate,
        })
    }

    /// The spouse, when the spouse's income and credits are on this return.
    fn spouse_on_return(&self) -> Option<&crate::models::Person> {
        if self.filing_status.is_joint() {
            self.tax_return.taxpayer.spouse.as_ref()
        } else {
            None
        }
    }

    fn owners(&self) -> Vec<Owner> {
        let mut owners = vec![Owner::Primary];
        if self.spouse_on_return().is_some() {
            owners.push(Owner::Spouse);
        }
        owners
    }

    fn self_employment(&self) -> Result<SelfEmployment, TaxError> {
        let income = &self.tax_return.income;
        let worksheet = SeWorksheet::new(self.config.self_employment.clone());

        let mut by_owner = Vec::new();
        for owner in self.owners() {
            let result = worksheet
                .calculate(&SeWorksheetInput {
                    net_profit: income.self_employment_profit(owner),
                    crp_payments: income.crp_payments(owner),
                    social_security_wages: income.social_security_wages(owner),
                })
                .map_err(ConfigError::from)?;
            by_owner.push((owner, result));
        }

        let combined = by_owner
            .iter()
            .map(|(_, result)| result.clone())
            .reduce(|a, b| a.combine(&b))
            .unwrap_or_default();
        Ok(SelfEmployment { by_owner, combined })
    }

    fn wages_of(
        &self,
        owner: Owner,
    ) -> Decimal {
        sum(self
            .tax_return
            .income
            .w2s()
            .filter(|w| w.owner == owner)
            .map(|w| w.wages))
    }

    /// Wages plus net self-employment earnings after the deductible half
    /// of SE tax.
    fn earned_income_of(
        &self,
        owner: Owner,
        self_employment: &SelfEmployment,
    ) -> Decimal {
        if owner == Owner::Spouse && self.spouse_on_return().is_none() {
            return Decimal::ZERO;
        }
        money(
            self.wages_of(owner) + self.tax_return.income.self_employment_profit(owner)
                - self_employment.deduction_of(owner),
        )
    }

    fn agi(
        &self,
        self_employment: &SelfEmployment,
        capital_gains: CapitalGainsResult,
    ) -> AgiStage {
        let status = self.filing_status;
        let config = self.config;
        let taxpayer = &self.tax_return.taxpayer;
        let income = &self.tax_return.income;
        let adjusted = &self.tax_return.deductions.adjustments;

        let wages = money(income.wages());
        let taxable_interest = money(income.taxable_interest());
        let ordinary_dividends = money(income.ordinary_dividends());
        let business_income = money(income.business_income());
        let farm_income = money(income.farm_income());
        let retirement_distributions = money(income.retirement_distributions());
        let unemployment = money(income.unemployment());
        let k1_income = money(income.k1_nonpassive_income());
        let virtual_currency = money(income.virtual_currency_ordinary());
        let alimony = money(income.alimony());
        let other = money(income.other());

        let base_income = wages
            + taxable_interest
            + ordinary_dividends
            + capital_gains.included_in_income
            + business_income
            + farm_income
            + retirement_distributions
            + unemployment
            + k1_income
            + virtual_currency
            + alimony
            + other;

        // Adjustments that do not depend on AGI.
        let se_profit = sum(self.owners().into_iter().map(|o| income.self_employment_profit(o)));
        let self_employment_tax = self_employment.combined.se_tax_deduction;
        let self_employed_retirement = money(non_negative(adjusted.self_employed_retirement));
        let self_employed_health_insurance = money(
            non_negative(adjusted.self_employed_health_insurance)
                .min(non_negative(se_profit - self_employment_tax - self_employed_retirement)),
        );
        let hsa = adjustments::hsa_deduction(
            &adjusted.hsa,
            |owner| taxpayer.person(owner).map(|p| p.age),
            &config.adjustments.hsa,
        );
        let educator_expenses = adjustments::educator_expenses(
            adjusted.educator_expenses,
            self.owners().len(),
            config.adjustments.educator_expense_limit,
        );
        let early_withdrawal_penalty = money(non_negative(adjusted.early_withdrawal_penalty));
        let alimony_paid = money(non_negative(adjusted.alimony_paid));
        let fixed_adjustments = self_employment_tax
            + hsa
            + educator_expenses
            + self_employed_health_insurance
            + self_employed_retirement
            + early_withdrawal_penalty
            + alimony_paid;

        let rental = self.passive(base_income - fixed_adjustments);
        let social_security = SocialSecurityWorksheet::new(&config.social_security).calculate(
            &SocialSecurityInput {
                benefits: income.social_security_benefits(),
                other_income: base_income + rental.included_in_income - fixed_adjustments,
                tax_exempt_interest: income.tax_exempt_interest(),
                filing_status: status,
                lived_with_spouse: taxpayer.lived_with_spouse,
            },
        );

        let total = money(base_income + rental.included_in_income + social_security.taxable_benefits);
        let preliminary_agi = money(total - fixed_adjustments);

        // AGI-dependent adjustments, each against AGI without itself.
        let ira = adjustments::ira_deduction(
            &adjusted.traditional_ira,
            &IraFilers {
                filing_status: status,
                lived_with_spouse: taxpayer.lived_with_spouse,
                magi: preliminary_agi,
                primary: &taxpayer.primary,
                spouse: self.spouse_on_return(),
                primary_compensation: self.compensation_of(Owner::Primary, self_employment),
                spouse_compensation: self.compensation_of(Owner::Spouse, self_employment),
            },
            &config.adjustments.ira,
        );
        let student_loan_interest = adjustments::student_loan_deduction(
            adjusted.student_loan_interest,
            status,
            preliminary_agi - ira,
            taxpayer.primary.can_be_claimed_as_dependent,
            &config.adjustments.student_loan,
        );

        let adjustments_total =
            money(fixed_adjustments + ira + student_loan_interest);
        let agi = money(total - adjustments_total);

        AgiStage {
            income: IncomeBreakdown {
                wages,
                taxable_interest,
                tax_exempt_interest: money(income.tax_exempt_interest()),
                ordinary_dividends,
                qualified_dividends: money(income.qualified_dividends()),
                capital_gains,
                business_income,
                farm_income,
                rental,
                retirement_distributions,
                social_security,
                unemployment,
                k1_income,
                virtual_currency,
                alimony,
                other,
                total,
            },
            adjustments: AdjustmentsBreakdown {
                self_employment_tax,
                hsa,
                educator_expenses,
                self_employed_health_insurance,
                self_employed_retirement,
                early_withdrawal_penalty,
                alimony_paid,
                ira,
                student_loan_interest,
                total: adjustments_total,
                preliminary_agi,
            },
            agi,
        }
    }

    /// Taxable compensation for the IRA limit.
    fn compensation_of(
        &self,
        owner: Owner,
        self_employment: &SelfEmployment,
    ) -> Decimal {
        let earned = non_negative(self.earned_income_of(owner, self_employment));
        match owner {
            Owner::Primary => earned + non_negative(self.tax_return.income.alimony()),
            Owner::Spouse => earned,
        }
    }

    fn passive(
        &self,
        modified_agi: Decimal,
    ) -> PassiveActivityResult {
        let income = &self.tax_return.income;
        limit_passive_losses(
            &PassiveActivityInput {
                rentals: income.rentals().collect(),
                k1_passive_income: income.k1_passive_income(),
                modified_agi: non_negative(modified_agi),
                filing_status: self.filing_status,
                lived_with_spouse: self.tax_return.taxpayer.lived_with_spouse,
            },
            &self.config.passive,
        )
    }

    fn classify_dependents(
        &self,
        agi: Decimal,
    ) -> Vec<ClassifiedDependent> {
        self.tax_return
            .taxpayer
            .dependents
            .iter()
            .map(|dependent| {
                let status = dependent.classify(&self.config.dependents, agi);
                debug!(name = %dependent.name, ?status, "dependent classified");
                ClassifiedDependent {
                    dependent: dependent.clone(),
                    status,
                }
            })
            .collect()
    }

    fn qbi(
        &self,
        taxable_income_before_qbi: Decimal,
        net_capital_gain: Decimal,
    ) -> QbiResult {
        let income = &self.tax_return.income;
        let businesses = income
            .sources
            .iter()
            .filter_map(|source| match source {
                IncomeSource::SelfEmployment(b) | IncomeSource::Farm(b) if b.qbi_eligible => {
                    Some(QbiBusiness {
                        name: b.name.clone(),
                        qualified_business_income: b.net_profit(),
                        w2_wages: b.w2_wages_paid,
                        ubia: b.ubia,
                        specified_service: b.specified_service,
                    })
                }
                IncomeSource::ScheduleK1(k) if k.qbi_eligible => Some(QbiBusiness {
                    name: k.entity.clone(),
                    qualified_business_income: k.qualified_business_income(),
                    w2_wages: k.w2_wages,
                    ubia: k.ubia,
                    specified_service: k.specified_service,
                }),
                _ => None,
            })
            .collect();

        QbiWorksheet::new(&self.config.qbi).calculate(&QbiInput {
            businesses,
            reit_ptp_income: income.section_199a_dividends(),
            taxable_income_before_qbi,
            net_capital_gain,
            filing_status: self.filing_status,
        })
    }

    /// Ordinary brackets on ordinary income, with qualified dividends and
    /// net capital gain stacked on top at preferential rates. Never more
    /// than taxing everything as ordinary income.
    fn regular_tax(
        &self,
        taxable_income: Decimal,
        preferential_base: Decimal,
    ) -> RegularTaxBreakdown {
        let ordinary_schedule = self.config.ordinary_brackets.get(self.filing_status);
        let preferential_schedule = self.config.capital_gains.schedule.get(self.filing_status);

        let preferential_income = preferential_base.min(taxable_income);
        let ordinary_income = taxable_income - preferential_income;

        let ordinary = bracket_tax(ordinary_schedule, ordinary_income);
        let preferential_tax = stacked_tax(preferential_schedule, ordinary_income, preferential_income);
        let all_ordinary = tax_on(ordinary_schedule, taxable_income);
        let tax = money((ordinary.tax + preferential_tax).min(all_ordinary));

        let marginal_rate = if preferential_income > Decimal::ZERO {
            preferential_schedule.marginal_rate(taxable_income)
        } else {
            ordinary.marginal_rate
        };

        RegularTaxBreakdown {
            ordinary_income,
            preferential_income,
            ordinary_tax: money(ordinary.tax),
            preferential_tax: money(preferential_tax),
            tax,
            spans: ordinary.spans,
            marginal_rate,
        }
    }

    fn amt(
        &self,
        deduction: &DeductionBreakdown,
        taxable_income: Decimal,
        regular_tax: &RegularTaxBreakdown,
    ) -> AmtResult {
        // Itemizers add back state and local taxes; everyone else adds
        // back the standard deduction.
        let deduction_addback = if deduction.used_itemized {
            deduction.itemized.taxes
        } else {
            deduction.amount
        };
        let capital_gains = self.config.capital_gains.schedule.get(self.filing_status);
        AmtWorksheet::new(&self.config.amt, capital_gains).calculate(&AmtInput {
            taxable_income,
            deduction_addback,
            preferences: self.tax_return.income.amt_preferences.total(),
            preferential_income: regular_tax.preferential_income,
            regular_tax: regular_tax.tax,
            filing_status: self.filing_status,
        })
    }

    /// Applies every nonrefundable credit in order and computes the
    /// additional child tax credit from what the child credits left unused.
    fn nonrefundable_credits(
        &self,
        ctx: &CreditContext,
        regular_tax: &RegularTaxBreakdown,
        amt: &AmtResult,
        taxable_income: Decimal,
        tax_before_credits: Decimal,
    ) -> (CreditLedger, Carryforwards, Decimal) {
        let config = &self.config.credits;
        let facts = &self.tax_return.credits;
        let mut ledger = CreditLedger::new(tax_before_credits);
        let mut carryforwards = Carryforwards::default();

        // Foreign tax credit.
        let foreign_taxes = self.foreign_taxes();
        let ftc = foreign_tax::calculate(
            ctx,
            &foreign_taxes,
            regular_tax.tax,
            taxable_income,
            &config.foreign_tax,
        );
        let ftc_allowed_before = ledger.nonrefundable;
        carryforwards.foreign_tax_credit = ledger.apply_with_carryforward(ftc);
        let ftc_allowed = ledger.nonrefundable - ftc_allowed_before;

        // General business credit, carryforwards used before current-year
        // credits.
        let business_credits = business::calculate(facts, &config.business);
        let carried_in = non_negative(facts.business_credit_carryforward);
        let current = sum(business_credits.iter().map(|c| c.amount));
        if current + carried_in > Decimal::ZERO {
            let net_income_tax = non_negative(regular_tax.tax + amt.amt - ftc_allowed);
            let net_regular_tax = non_negative(regular_tax.tax - ftc_allowed);
            let limit = config
                .business
                .general
                .limit(net_income_tax, net_regular_tax)
                .min(ledger.remaining);

            let mut available = (current + carried_in).min(limit);
            let from_carryforward = carried_in.min(available);
            available -= from_carryforward;
            let mut used = from_carryforward;
            for mut credit in business_credits {
                let allowed = credit.amount.min(available);
                available -= allowed;
                used += allowed;
                credit.allowed_amount = allowed;
                credit.carryforward = credit.amount - allowed;
                ledger.credits.push(credit);
            }
            ledger.remaining -= used;
            ledger.nonrefundable += used;
            carryforwards.general_business_credit = money(current + carried_in - used);
            debug!(limit = %limit, used = %used, "general business credit");
        }

        // Personal credits.
        ledger.apply(dependent_care::calculate(
            ctx,
            &facts.dependent_care,
            &config.dependent_care,
        ));
        ledger.apply(elderly_disabled::calculate(
            ctx,
            &facts.elderly_disabled,
            &config.elderly_disabled,
        ));

        let education_credits = education::calculate(ctx, &facts.students, &config.education);
        ledger.apply(education_credits.american_opportunity);
        ledger.apply(education_credits.lifetime_learning);

        ledger.apply(savers::calculate(
            ctx,
            &facts.retirement_contributions,
            &config.savers,
        ));

        let child_credits: ChildTaxCredits = child_tax::calculate(ctx, &config.child_tax);
        let unused_child = ledger.apply(child_credits.child_tax.clone())
            + ledger.apply(child_credits.other_dependents.clone());

        carryforwards.adoption_credit = ledger.apply_with_carryforward(adoption::calculate(
            ctx,
            &facts.adoptions,
            facts.adoption_carryforward,
            &config.adoption,
        ));
        ledger.apply(energy::home_improvement(
            &facts.energy_improvements,
            &config.energy,
        ));
        carryforwards.residential_clean_energy_credit =
            ledger.apply_with_carryforward(energy::clean_energy(&facts.clean_energy, &config.energy));

        let vehicles = clean_vehicle::calculate(ctx, &facts.clean_vehicles, &config.clean_vehicle);
        ledger.apply(vehicles.new);
        ledger.apply(vehicles.used);

        // The refundable remainder of the child tax credit.
        ledger.credits.push(child_tax::additional_child_tax_credit(
            &child_credits,
            unused_child,
            ctx.earned_income,
            &config.child_tax,
        ));

        (ledger, carryforwards, vehicles.recapture)
    }

    /// Form 1116 entries plus foreign tax reported on 1099-INT and 1099-DIV,
    /// which is passive category.
    fn foreign_taxes(&self) -> Vec<ForeignTaxInfo> {
        let income = &self.tax_return.income;
        let mut taxes = self.tax_return.credits.foreign_taxes.clone();
        let reported = income.foreign_tax_paid();
        if reported > Decimal::ZERO {
            let foreign_source_income = sum(income.sources.iter().map(|source| match source {
                IncomeSource::Interest(i) if i.foreign_tax_paid > Decimal::ZERO => i.taxable_interest,
                IncomeSource::Dividends(d) if d.foreign_tax_paid > Decimal::ZERO => {
                    d.ordinary_dividends
                }
                _ => Decimal::ZERO,
            }));
            taxes.push(ForeignTaxInfo {
                country: "reported on 1099".to_string(),
                foreign_source_income,
                foreign_tax_paid: reported,
                passive_category: true,
            });
        }
        taxes
    }

    /// Investment income for the earned income credit test.
    fn eitc_investment_income(
        &self,
        income: &IncomeBreakdown,
    ) -> Decimal {
        money(
            income.taxable_interest
                + income.tax_exempt_interest
                + income.ordinary_dividends
                + non_negative(income.capital_gains.net_gain_or_loss)
                + non_negative(income.rental.net_passive),
        )
    }

    fn payments(&self) -> PaymentsBreakdown {
        let income = &self.tax_return.income;
        let payments = &self.tax_return.payments;
        let withholding = money(income.federal_withholding() + payments.federal_withholding);
        let estimated_payments = money(payments.total_estimated());
        let extension_payment = money(non_negative(payments.extension_payment));

        // Social security tax over the wage base withheld by more than one
        // employer.
        let se = &self.config.self_employment;
        let employee_cap = money(se.ss_wage_max * se.ss_tax_rate / Decimal::TWO);
        let excess_social_security = money(sum(self.owners().into_iter().map(|owner| {
            let w2s: Vec<_> = income.w2s().filter(|w| w.owner == owner).collect();
            if w2s.len() < 2 {
                return Decimal::ZERO;
            }
            non_negative(sum(w2s.iter().map(|w| w.social_security_tax_withheld)) - employee_cap)
        })));

        PaymentsBreakdown {
            withholding,
            estimated_payments,
            extension_payment,
            excess_social_security,
            total: withholding + estimated_payments + extension_payment + excess_social_security,
        }
    }
}

/// Investment income that investment interest may offset: interest and
/// nonqualified dividends.
fn investment_interest_income(income: &Income) -> Decimal {
    non_negative(
        income.taxable_interest() + income.ordinary_dividends() - income.qualified_dividends(),
    )
}

/// Net investment income for the 3.8% tax.
fn net_investment_income(income: &IncomeBreakdown) -> Decimal {
    money(
        income.taxable_interest
            + income.ordinary_dividends
            + non_negative(income.capital_gains.included_in_income)
            + non_negative(income.rental.net_passive),
    )
}
