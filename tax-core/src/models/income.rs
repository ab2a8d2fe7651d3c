//! Income sources as a tagged union.
//!
//! Every taxable-amount getter on a variant is a pure function of that
//! variant's own boxes. [`Income`] adds a small set of aggregate functions
//! over the list; nothing here mutates.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::Owner;
use crate::calculations::common::{non_negative, sum};

/// Form W-2.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct W2 {
    pub employer: String,
    pub owner: Owner,
    /// Box 1.
    pub wages: Decimal,
    /// Box 2.
    pub federal_withholding: Decimal,
    /// Box 3.
    pub social_security_wages: Decimal,
    /// Box 4.
    pub social_security_tax_withheld: Decimal,
    /// Box 5.
    pub medicare_wages: Decimal,
    pub state_wages: Decimal,
    pub state_withholding: Decimal,
}

/// Form 1099-INT.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterestIncome {
    pub payer: String,
    pub taxable_interest: Decimal,
    /// Interest on U.S. savings bonds and Treasury obligations, included in
    /// `taxable_interest`; exempt from state tax.
    pub us_obligation_interest: Decimal,
    pub tax_exempt_interest: Decimal,
    pub foreign_tax_paid: Decimal,
    pub federal_withholding: Decimal,
}

/// Form 1099-DIV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DividendIncome {
    pub payer: String,
    pub ordinary_dividends: Decimal,
    /// Portion of `ordinary_dividends` taxed at capital-gains rates.
    pub qualified_dividends: Decimal,
    pub capital_gain_distributions: Decimal,
    /// Section 199A (REIT) dividends, included in `ordinary_dividends`.
    pub section_199a_dividends: Decimal,
    pub exempt_interest_dividends: Decimal,
    pub foreign_tax_paid: Decimal,
    pub federal_withholding: Decimal,
}

impl DividendIncome {
    /// Qualified dividends can never exceed ordinary dividends.
    pub fn qualified(&self) -> Decimal {
        self.qualified_dividends.min(self.ordinary_dividends)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingPeriod {
    #[default]
    ShortTerm,
    LongTerm,
}

/// One sale reported on Form 8949.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapitalTransaction {
    pub description: String,
    pub proceeds: Decimal,
    pub cost_basis: Decimal,
    pub holding_period: HoldingPeriod,
    /// Wash-sale loss disallowed (box 1g), added back to the gain.
    pub wash_sale_loss_disallowed: Decimal,
}

impl CapitalTransaction {
    pub fn gain(&self) -> Decimal {
        self.proceeds - self.cost_basis + self.wash_sale_loss_disallowed
    }
}

/// Unused capital losses from prior years, entered as positive amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapitalLossCarryforward {
    pub short_term: Decimal,
    pub long_term: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Advertising,
    CarAndTruck,
    ContractLabor,
    Depreciation,
    Insurance,
    Interest,
    LegalAndProfessional,
    Office,
    Rent,
    Repairs,
    Supplies,
    Taxes,
    Travel,
    /// Business meals, 50% deductible.
    Meals,
    Utilities,
    Wages,
    #[default]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessExpense {
    pub category: ExpenseCategory,
    pub amount: Decimal,
}

impl BusinessExpense {
    pub fn deductible_amount(&self) -> Decimal {
        match self.category {
            ExpenseCategory::Meals => self.amount * dec!(0.5),
            _ => self.amount,
        }
    }
}

/// Schedule C or Schedule F business.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Business {
    pub name: String,
    pub owner: Owner,
    pub gross_receipts: Decimal,
    pub returns_and_allowances: Decimal,
    pub cost_of_goods_sold: Decimal,
    pub expenses: Vec<BusinessExpense>,
    pub home_office_deduction: Decimal,
    /// Conservation Reserve Program payments (farms).
    pub crp_payments: Decimal,
    /// Trade or business eligible for the QBI deduction.
    pub qbi_eligible: bool,
    /// Specified service trade or business.
    pub specified_service: bool,
    pub w2_wages_paid: Decimal,
    /// Unadjusted basis of qualified property.
    pub ubia: Decimal,
}

impl Business {
    pub fn gross_profit(&self) -> Decimal {
        self.gross_receipts - self.returns_and_allowances - self.cost_of_goods_sold
    }

    pub fn total_expenses(&self) -> Decimal {
        sum(self.expenses.iter().map(BusinessExpense::deductible_amount))
    }

    pub fn net_profit(&self) -> Decimal {
        self.gross_profit() - self.total_expenses() - self.home_office_deduction
    }
}

/// Schedule E rental property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RentalProperty {
    pub address: String,
    pub rents_received: Decimal,
    pub expenses: Decimal,
    pub depreciation: Decimal,
    /// Taxpayer actively participates (required for the special allowance).
    pub active_participation: bool,
    pub real_estate_professional: bool,
    /// Passive losses suspended in prior years.
    pub prior_suspended_loss: Decimal,
    /// Entire interest disposed of in a taxable transaction this year.
    pub disposed: bool,
}

impl RentalProperty {
    pub fn net(&self) -> Decimal {
        self.rents_received - self.expenses - self.depreciation
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionCode {
    /// Code 1: early distribution, no known exception.
    EarlyNoException,
    /// Code 2: early distribution, exception applies.
    EarlyException,
    /// Code 3: disability.
    Disability,
    /// Code 4: death.
    Death,
    /// Code 7: normal distribution.
    #[default]
    Normal,
    /// Code G: direct rollover to a qualified plan or IRA.
    DirectRollover,
    /// Code H: direct rollover of a designated Roth account to a Roth IRA.
    RothDirectRollover,
    /// Code Q: qualified Roth IRA distribution.
    QualifiedRoth,
}

impl DistributionCode {
    pub fn is_rollover(&self) -> bool {
        matches!(self, Self::DirectRollover | Self::RothDirectRollover)
    }
}

/// Form 1099-R.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Form1099R {
    pub payer: String,
    pub owner: Owner,
    /// Box 1.
    pub gross_distribution: Decimal,
    /// Box 2a; `None` when "taxable amount not determined".
    pub taxable_amount: Option<Decimal>,
    /// Box 7.
    pub distribution_code: DistributionCode,
    pub federal_withholding: Decimal,
}

impl Form1099R {
    /// Rollovers and qualified Roth distributions are not taxable.
    pub fn taxable(&self) -> Decimal {
        if self.distribution_code.is_rollover()
            || self.distribution_code == DistributionCode::QualifiedRoth
        {
            return Decimal::ZERO;
        }
        self.taxable_amount
            .unwrap_or(self.gross_distribution)
            .min(self.gross_distribution)
    }

    /// Amount subject to the 10% additional tax on early distributions.
    pub fn early_distribution_amount(&self) -> Decimal {
        match self.distribution_code {
            DistributionCode::EarlyNoException => self.taxable(),
            _ => Decimal::ZERO,
        }
    }
}

/// Form SSA-1099.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialSecurityBenefits {
    pub owner: Owner,
    /// Box 5 net benefits.
    pub net_benefits: Decimal,
    pub federal_withholding: Decimal,
}

/// Form 1099-G unemployment compensation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnemploymentCompensation {
    pub amount: Decimal,
    pub federal_withholding: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    #[default]
    Partnership,
    SCorporation,
    EstateOrTrust,
}

/// Schedule K-1 pass-through items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleK1 {
    pub entity: String,
    pub kind: EntityKind,
    pub owner: Owner,
    pub ordinary_business_income: Decimal,
    pub guaranteed_payments: Decimal,
    pub net_rental_income: Decimal,
    pub interest_income: Decimal,
    pub ordinary_dividends: Decimal,
    pub qualified_dividends: Decimal,
    pub short_term_capital_gain: Decimal,
    pub long_term_capital_gain: Decimal,
    pub section_179_deduction: Decimal,
    /// Box 14 net earnings from self-employment (partnerships only).
    pub self_employment_earnings: Decimal,
    /// The taxpayer does not materially participate.
    pub passive: bool,
    pub qbi_eligible: bool,
    pub specified_service: bool,
    pub w2_wages: Decimal,
    pub ubia: Decimal,
}

impl ScheduleK1 {
    /// Ordinary income from the entity's trade or business.
    pub fn business_income(&self) -> Decimal {
        self.ordinary_business_income + self.guaranteed_payments - self.section_179_deduction
    }

    /// Business income eligible for the QBI deduction. Guaranteed payments
    /// are compensation, not QBI.
    pub fn qualified_business_income(&self) -> Decimal {
        if self.qbi_eligible {
            self.ordinary_business_income - self.section_179_deduction
        } else {
            Decimal::ZERO
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "character", content = "holding_period")]
pub enum CurrencyCharacter {
    /// Mining, staking and payment-for-services receipts.
    #[default]
    Ordinary,
    /// Sale or exchange of a capital asset.
    Capital(HoldingPeriod),
}

/// Digital-asset receipt or disposition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualCurrencyTransaction {
    pub description: String,
    pub character: CurrencyCharacter,
    /// Fair market value received (ordinary) or sale proceeds (capital).
    pub proceeds: Decimal,
    /// Zero for ordinary receipts.
    pub cost_basis: Decimal,
}

impl VirtualCurrencyTransaction {
    pub fn ordinary_income(&self) -> Decimal {
        match self.character {
            CurrencyCharacter::Ordinary => self.proceeds,
            CurrencyCharacter::Capital(_) => Decimal::ZERO,
        }
    }

    pub fn capital_gain(
        &self,
        period: HoldingPeriod,
    ) -> Decimal {
        match self.character {
            CurrencyCharacter::Capital(p) if p == period => self.proceeds - self.cost_basis,
            _ => Decimal::ZERO,
        }
    }
}

/// Alimony received. Taxable only under divorce instruments executed
/// before 2019.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlimonyReceived {
    pub amount: Decimal,
    pub divorce_year: i32,
}

impl AlimonyReceived {
    pub fn taxable(&self) -> Decimal {
        if self.divorce_year < 2019 {
            self.amount
        } else {
            Decimal::ZERO
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherIncome {
    pub description: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncomeSource {
    Wages(W2),
    Interest(InterestIncome),
    Dividends(DividendIncome),
    CapitalTransaction(CapitalTransaction),
    CapitalLossCarryforward(CapitalLossCarryforward),
    SelfEmployment(Business),
    Farm(Business),
    Rental(RentalProperty),
    RetirementDistribution(Form1099R),
    SocialSecurity(SocialSecurityBenefits),
    Unemployment(UnemploymentCompensation),
    ScheduleK1(ScheduleK1),
    VirtualCurrency(VirtualCurrencyTransaction),
    Alimony(AlimonyReceived),
    Other(OtherIncome),
}

impl IncomeSource {
    /// Federal income tax withheld at source.
    pub fn federal_withholding(&self) -> Decimal {
        match self {
            Self::Wages(w2) => w2.federal_withholding,
            Self::Interest(i) => i.federal_withholding,
            Self::Dividends(d) => d.federal_withholding,
            Self::RetirementDistribution(r) => r.federal_withholding,
            Self::SocialSecurity(s) => s.federal_withholding,
            Self::Unemployment(u) => u.federal_withholding,
            _ => Decimal::ZERO,
        }
    }
}

/// Alternative minimum tax adjustments and preferences (Form 6251).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmtPreferences {
    /// Bargain element of incentive stock options exercised and held.
    pub incentive_stock_options: Decimal,
    pub private_activity_bond_interest: Decimal,
    pub depreciation_adjustment: Decimal,
    pub depletion: Decimal,
    pub other: Decimal,
}

impl AmtPreferences {
    pub fn total(&self) -> Decimal {
        self.incentive_stock_options
            + self.private_activity_bond_interest
            + self.depreciation_adjustment
            + self.depletion
            + self.other
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Income {
    pub sources: Vec<IncomeSource>,
    pub amt_preferences: AmtPreferences,
}

macro_rules! sum_variant {
    ($self:ident, $variant:ident, $binding:ident => $expr:expr) => {
        sum($self.sources.iter().filter_map(|source| match source {
            IncomeSource::$variant($binding) => Some($expr),
            _ => None,
        }))
    };
}

impl Income {
    pub fn w2s(&self) -> impl Iterator<Item = &W2> {
        self.sources.iter().filter_map(|s| match s {
            IncomeSource::Wages(w2) => Some(w2),
            _ => None,
        })
    }

    pub fn businesses(&self) -> impl Iterator<Item = &Business> {
        self.sources.iter().filter_map(|s| match s {
            IncomeSource::SelfEmployment(b) | IncomeSource::Farm(b) => Some(b),
            _ => None,
        })
    }

    pub fn rentals(&self) -> impl Iterator<Item = &RentalProperty> {
        self.sources.iter().filter_map(|s| match s {
            IncomeSource::Rental(r) => Some(r),
            _ => None,
        })
    }

    pub fn k1s(&self) -> impl Iterator<Item = &ScheduleK1> {
        self.sources.iter().filter_map(|s| match s {
            IncomeSource::ScheduleK1(k) => Some(k),
            _ => None,
        })
    }

    pub fn distributions(&self) -> impl Iterator<Item = &Form1099R> {
        self.sources.iter().filter_map(|s| match s {
            IncomeSource::RetirementDistribution(r) => Some(r),
            _ => None,
        })
    }

    pub fn wages(&self) -> Decimal {
        sum(self.w2s().map(|w| w.wages))
    }

    pub fn medicare_wages(&self) -> Decimal {
        sum(self.w2s().map(|w| w.medicare_wages))
    }

    pub fn social_security_wages(
        &self,
        owner: Owner,
    ) -> Decimal {
        sum(self
            .w2s()
            .filter(|w| w.owner == owner)
            .map(|w| w.social_security_wages))
    }

    pub fn federal_withholding(&self) -> Decimal {
        sum(self.sources.iter().map(IncomeSource::federal_withholding))
    }

    pub fn taxable_interest(&self) -> Decimal {
        sum_variant!(self, Interest, i => i.taxable_interest)
            + sum(self.k1s().map(|k| k.interest_income))
    }

    pub fn us_obligation_interest(&self) -> Decimal {
        sum_variant!(self, Interest, i => i.us_obligation_interest)
    }

    pub fn tax_exempt_interest(&self) -> Decimal {
        sum_variant!(self, Interest, i => i.tax_exempt_interest)
            + sum_variant!(self, Dividends, d => d.exempt_interest_dividends)
    }

    pub fn ordinary_dividends(&self) -> Decimal {
        sum_variant!(self, Dividends, d => d.ordinary_dividends)
            + sum(self.k1s().map(|k| k.ordinary_dividends))
    }

    pub fn qualified_dividends(&self) -> Decimal {
        sum_variant!(self, Dividends, d => d.qualified())
            + sum(self.k1s().map(|k| k.qualified_dividends.min(k.ordinary_dividends)))
    }

    pub fn section_199a_dividends(&self) -> Decimal {
        sum_variant!(self, Dividends, d => d.section_199a_dividends)
    }

    pub fn foreign_tax_paid(&self) -> Decimal {
        sum_variant!(self, Interest, i => i.foreign_tax_paid)
            + sum_variant!(self, Dividends, d => d.foreign_tax_paid)
    }

    /// Short-term gains and losses before carryforwards.
    pub fn short_term_gain(&self) -> Decimal {
        self.period_gain(HoldingPeriod::ShortTerm)
            + sum(self.k1s().map(|k| k.short_term_capital_gain))
    }

    /// Long-term gains and losses, including capital gain distributions,
    /// before carryforwards.
    pub fn long_term_gain(&self) -> Decimal {
        self.period_gain(HoldingPeriod::LongTerm)
            + sum_variant!(self, Dividends, d => d.capital_gain_distributions)
            + sum(self.k1s().map(|k| k.long_term_capital_gain))
    }

    fn period_gain(
        &self,
        period: HoldingPeriod,
    ) -> Decimal {
        sum(self.sources.iter().map(|s| match s {
            IncomeSource::CapitalTransaction(t) if t.holding_period == period => t.gain(),
            IncomeSource::VirtualCurrency(v) => v.capital_gain(period),
            _ => Decimal::ZERO,
        }))
    }

    pub fn loss_carryforward(&self) -> CapitalLossCarryforward {
        self.sources
            .iter()
            .fold(CapitalLossCarryforward::default(), |acc, s| match s {
                IncomeSource::CapitalLossCarryforward(c) => CapitalLossCarryforward {
                    short_term: acc.short_term + non_negative(c.short_term),
                    long_term: acc.long_term + non_negative(c.long_term),
                },
                _ => acc,
            })
    }

    /// Schedule C net profit or loss.
    pub fn business_income(&self) -> Decimal {
        sum_variant!(self, SelfEmployment, b => b.net_profit())
    }

    /// Schedule F net profit or loss.
    pub fn farm_income(&self) -> Decimal {
        sum_variant!(self, Farm, b => b.net_profit())
    }

    /// Net earnings subject to SE tax for one person: Schedule C and F
    /// profit plus partnership SE earnings.
    pub fn self_employment_profit(
        &self,
        owner: Owner,
    ) -> Decimal {
        sum(self
            .businesses()
            .filter(|b| b.owner == owner)
            .map(Business::net_profit))
            + sum(self
                .k1s()
                .filter(|k| k.owner == owner && k.kind == EntityKind::Partnership)
                .map(|k| k.self_employment_earnings))
    }

    pub fn crp_payments(
        &self,
        owner: Owner,
    ) -> Decimal {
        sum(self
            .sources
            .iter()
            .filter_map(|s| match s {
                IncomeSource::Farm(b) if b.owner == owner => Some(b.crp_payments),
                _ => None,
            }))
    }

    pub fn retirement_distributions(&self) -> Decimal {
        sum(self.distributions().map(Form1099R::taxable))
    }

    pub fn early_distributions(&self) -> Decimal {
        sum(self.distributions().map(Form1099R::early_distribution_amount))
    }

    pub fn social_security_benefits(&self) -> Decimal {
        sum_variant!(self, SocialSecurity, s => s.net_benefits)
    }

    pub fn unemployment(&self) -> Decimal {
        sum_variant!(self, Unemployment, u => u.amount)
    }

    /// Non-passive K-1 business income.
    pub fn k1_nonpassive_income(&self) -> Decimal {
        sum(self
            .k1s()
            .filter(|k| !k.passive)
            .map(|k| k.business_income() + k.net_rental_income))
    }

    /// Passive K-1 income and losses, subject to the passive-loss rules.
    pub fn k1_passive_income(&self) -> Decimal {
        sum(self
            .k1s()
            .filter(|k| k.passive)
            .map(|k| k.business_income() + k.net_rental_income))
    }

    pub fn virtual_currency_ordinary(&self) -> Decimal {
        sum_variant!(self, VirtualCurrency, v => v.ordinary_income())
    }

    pub fn alimony(&self) -> Decimal {
        sum_variant!(self, Alimony, a => a.taxable())
    }

    pub fn other(&self) -> Decimal {
        sum_variant!(self, Other, o => o.amount)
    }
}
