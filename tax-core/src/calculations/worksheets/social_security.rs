//! Taxable social security benefits (Pub. 915, Worksheet 1).
//!
//! | Line | Computation |
//! |------|-------------|
//! | 1 | Net benefits |
//! | 2 | Line 1 × 50% |
//! | 3 | Other income + tax-exempt interest − adjustments |
//! | 4 | Provisional income: line 2 + line 3 |
//! | 5 | Line 4 − base amount (stop if zero) |
//! | 6 | Adjusted base − base amount |
//! | 7 | Line 4 − adjusted base, not below zero |
//! | 8 | Smaller of line 5 or line 6, × 50%, limited to line 2 |
//! | 9 | Line 7 × 85% |
//! | 10 | Taxable: smaller of line 8 + line 9 or line 1 × 85% |
//!
//! Married filing separately while living with the spouse has a zero base
//! amount: up to 85% of the benefits are taxable from the first dollar.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{money, non_negative};
use crate::models::{ByFilingStatus, FilingStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityConfig {
    /// $25,000 ($32,000 joint).
    pub base_amount: ByFilingStatus<Decimal>,
    /// $34,000 ($44,000 joint).
    pub adjusted_base_amount: ByFilingStatus<Decimal>,
    pub lower_rate: Decimal,
    pub upper_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityInput {
    pub benefits: Decimal,
    /// Income other than benefits, net of the adjustments that are already
    /// known.
    pub other_income: Decimal,
    pub tax_exempt_interest: Decimal,
    pub filing_status: FilingStatus,
    pub lived_with_spouse: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityResult {
    pub benefits: Decimal,
    pub provisional_income: Decimal,
    pub taxable_benefits: Decimal,
}

#[derive(Debug, Clone)]
pub struct SocialSecurityWorksheet<'a> {
    config: &'a SocialSecurityConfig,
}

impl<'a> SocialSecurityWorksheet<'a> {
    pub fn new(config: &'a SocialSecurityConfig) -> Self {
        Self { config }
    }

    pub fn calculate(
        &self,
        input: &SocialSecurityInput,
    ) -> SocialSecurityResult {
        let benefits = non_negative(input.benefits);
        if benefits == Decimal::ZERO {
            return SocialSecurityResult::default();
        }

        let half_benefits = benefits * self.config.lower_rate;
        let provisional = half_benefits + input.other_income + input.tax_exempt_interest;
        let max_taxable = benefits * self.config.upper_rate;

        let taxable = if input.filing_status.is_married_separate() && input.lived_with_spouse {
            max_taxable.min(non_negative(provisional) * self.config.upper_rate)
        } else {
            self.two_tier(input.filing_status, provisional, half_benefits, max_taxable)
        };

        let result = SocialSecurityResult {
            benefits,
            provisional_income: money(provisional),
            taxable_benefits: money(taxable),
        };
        debug!(
            provisional = %result.provisional_income,
            taxable = %result.taxable_benefits,
            "social security benefits"
        );
        result
    }

    fn two_tier(
        &self,
        status: FilingStatus,
        provisional: Decimal,
        half_benefits: Decimal,
        max_taxable: Decimal,
    ) -> Decimal {
        let base = *self.config.base_amount.get(status);
        let adjusted = *self.config.adjusted_base_amount.get(status);

        let over_base = provisional - base;
        if over_base <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let first_tier_width = adjusted - base;
        let over_adjusted = non_negative(provisional - adjusted);

        let first_tier = (over_base.min(first_tier_width) * self.config.lower_rate).min(half_benefits);
        let second_tier = over_adjusted * self.config.upper_rate;

        (first_tier + second_tier).min(max_taxable)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn config() -> SocialSecurityConfig {
        SocialSecurityConfig {
            base_amount: ByFilingStatus::joint_and_other(dec!(32000), dec!(25000)),
            adjusted_base_amount: ByFilingStatus::joint_and_other(dec!(44000), dec!(34000)),
            lower_rate: dec!(0.50),
            upper_rate: dec!(0.85),
        }
    }

    fn input(
        benefits: Decimal,
        other_income: Decimal,
    ) -> SocialSecurityInput {
        SocialSecurityInput {
            benefits,
            other_income,
            tax_exempt_interest: dec!(0),
            filing_status: FilingStatus::Single,
            lived_with_spouse: false,
        }
    }

    #[test]
    fn below_base_amount_nothing_is_taxable() {
        let config = config();
        let result = SocialSecurityWorksheet::new(&config).calculate(&input(dec!(20000), dec!(10000)));

        assert_eq!(result.provisional_income, dec!(20000.00));
        assert_eq!(result.taxable_benefits, dec!(0.00));
    }

    #[test]
    fn first_tier_only() {
        let config = config();
        // provisional 30,000: (30,000 − 25,000) × 50%
        let result = SocialSecurityWorksheet::new(&config).calculate(&input(dec!(20000), dec!(20000)));

        assert_eq!(result.taxable_benefits, dec!(2500.00));
    }

    #[test]
    fn second_tier_adds_85_percent_of_excess() {
        let config = config();
        // provisional 50,000: min(4,500, 10,000) + 16,000 × 85%
        let result = SocialSecurityWorksheet::new(&config).calculate(&input(dec!(20000), dec!(40000)));

        assert_eq!(result.taxable_benefits, dec!(17000.00));
    }

    #[test]
    fn taxable_never_exceeds_85_percent_of_benefits() {
        let config = config();
        let result = SocialSecurityWorksheet::new(&config).calculate(&input(dec!(30000), dec!(200000)));

        assert_eq!(result.taxable_benefits, dec!(25500.00));
    }

    #[test]
    fn separate_filer_living_with_spouse_has_no_base_amount() {
        let config = config();
        let result = SocialSecurityWorksheet::new(&config).calculate(&SocialSecurityInput {
            filing_status: FilingStatus::MarriedFilingSeparately,
            lived_with_spouse: true,
            ..input(dec!(10000), dec!(4000))
        });

        // provisional 9,000 × 85%
        assert_eq!(result.taxable_benefits, dec!(7650.00));
    }
}
