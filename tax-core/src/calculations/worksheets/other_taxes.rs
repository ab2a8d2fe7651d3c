//! Schedule 2 taxes other than SE tax and AMT: additional Medicare tax
//! (Form 8959), net investment income tax (Form 8960) and the additional tax
//! on early retirement distributions (Form 5329).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{money, non_negative};
use crate::models::{ByFilingStatus, FilingStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherTaxesConfig {
    pub additional_medicare_rate: Decimal,
    /// $200,000; $250,000 joint; $125,000 separate.
    pub additional_medicare_threshold: ByFilingStatus<Decimal>,
    pub niit_rate: Decimal,
    pub niit_threshold: ByFilingStatus<Decimal>,
    pub early_distribution_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherTaxesInput {
    pub medicare_wages: Decimal,
    /// Net earnings from self-employment (after the 92.35% factor).
    pub se_net_earnings: Decimal,
    pub net_investment_income: Decimal,
    pub modified_agi: Decimal,
    pub early_distributions: Decimal,
    pub filing_status: FilingStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherTaxesResult {
    pub additional_medicare_tax: Decimal,
    pub net_investment_income_tax: Decimal,
    pub early_distribution_tax: Decimal,
}

impl OtherTaxesResult {
    pub fn total(&self) -> Decimal {
        self.additional_medicare_tax + self.net_investment_income_tax + self.early_distribution_tax
    }
}

pub fn calculate_other_taxes(
    input: &OtherTaxesInput,
    config: &OtherTaxesConfig,
) -> OtherTaxesResult {
    let status = input.filing_status;

    // Wages use up the threshold before self-employment income does.
    let medicare_threshold = *config.additional_medicare_threshold.get(status);
    let wage_excess = non_negative(input.medicare_wages - medicare_threshold);
    let se_threshold = non_negative(medicare_threshold - input.medicare_wages);
    let se_excess = non_negative(input.se_net_earnings - se_threshold);
    let additional_medicare_tax = money((wage_excess + se_excess) * config.additional_medicare_rate);

    let magi_excess = non_negative(input.modified_agi - *config.niit_threshold.get(status));
    let net_investment_income_tax =
        money(non_negative(input.net_investment_income).min(magi_excess) * config.niit_rate);

    let early_distribution_tax =
        money(non_negative(input.early_distributions) * config.early_distribution_rate);

    debug!(
        additional_medicare = %additional_medicare_tax,
        niit = %net_investment_income_tax,
        early_distribution = %early_distribution_tax,
        "other taxes"
    );

    OtherTaxesResult {
        additional_medicare_tax,
        net_investment_income_tax,
        early_distribution_tax,
    }
}
