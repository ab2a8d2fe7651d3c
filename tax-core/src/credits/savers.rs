//! Retirement savings contributions credit (Form 8880).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CreditContext;
use crate::calculations::common::{money, non_negative, sum};
use crate::models::{ByFilingStatus, CreditBreakdown, CreditKind, RetirementContribution, UnitBreakdown};

/// AGI ceilings for each credit rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaversTiers {
    pub high_rate_limit: Decimal,
    pub middle_rate_limit: Decimal,
    pub low_rate_limit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaversCreditConfig {
    /// Per-person contribution ceiling.
    pub contribution_limit: Decimal,
    pub high_rate: Decimal,
    pub middle_rate: Decimal,
    pub low_rate: Decimal,
    pub tiers: ByFilingStatus<SaversTiers>,
    pub min_age: u32,
}

impl SaversCreditConfig {
    pub fn rate_for(
        &self,
        ctx: &CreditContext,
    ) -> Decimal {
        let tiers = self.tiers.get(ctx.filing_status);
        if ctx.agi <= tiers.high_rate_limit {
            self.high_rate
        } else if ctx.agi <= tiers.middle_rate_limit {
            self.middle_rate
        } else if ctx.agi <= tiers.low_rate_limit {
            self.low_rate
        } else {
            Decimal::ZERO
        }
    }
}

pub fn calculate(
    ctx: &CreditContext,
    contributions: &[RetirementContribution],
    config: &SaversCreditConfig,
) -> CreditBreakdown {
    const KIND: CreditKind = CreditKind::SaversCredit;

    if contributions.is_empty() {
        return CreditBreakdown::ineligible(KIND, "no retirement contributions");
    }
    let rate = config.rate_for(ctx);
    if rate == Decimal::ZERO {
        return CreditBreakdown::ineligible(
            KIND,
            format!("AGI {} above the income limit", ctx.agi),
        );
    }

    let mut units = Vec::new();
    let mut eligible_contributions = Decimal::ZERO;
    for (owner, person) in ctx.filers() {
        let label = format!("{owner:?}").to_lowercase();
        let mine: Vec<_> = contributions.iter().filter(|c| c.owner == owner).collect();
        if mine.is_empty() {
            continue;
        }
        let reason = if person.age < config.min_age {
            Some("under the minimum age")
        } else if person.full_time_student {
            Some("full-time student")
        } else if person.can_be_claimed_as_dependent {
            Some("claimed as a dependent")
        } else {
            None
        };
        if let Some(reason) = reason {
            units.push(UnitBreakdown::ineligible(label, reason));
            continue;
        }
        let net = non_negative(
            sum(mine.iter().map(|c| c.amount)) - sum(mine.iter().map(|c| c.distributions_received)),
        )
        .min(config.contribution_limit);
        eligible_contributions += net;
        units.push(UnitBreakdown::eligible(label, money(net)));
    }

    if eligible_contributions == Decimal::ZERO {
        return CreditBreakdown {
            units,
            ..CreditBreakdown::ineligible(KIND, "no eligible contributions")
        };
    }

    let amount = money(eligible_contributions * rate);
    debug!(contributions = %eligible_contributions, rate = %rate, amount = %amount, "saver's credit");

    CreditBreakdown {
        tentative_amount: amount,
        amount,
        units,
        ..CreditBreakdown::new(KIND)
    }
    .note(format!("credit rate {rate}"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::credits::test_support::context;
    use crate::models::{FilingStatus, Owner};

    fn config() -> SaversCreditConfig {
        SaversCreditConfig {
            contribution_limit: dec!(2000),
            high_rate: dec!(0.50),
            middle_rate: dec!(0.20),
            low_rate: dec!(0.10),
            tiers: ByFilingStatus::joint_hoh_other(
                SaversTiers {
                    high_rate_limit: dec!(47500),
                    middle_rate_limit: dec!(51000),
                    low_rate_limit: dec!(79000),
                },
                SaversTiers {
                    high_rate_limit: dec!(35625),
                    middle_rate_limit: dec!(38250),
                    low_rate_limit: dec!(59250),
                },
                SaversTiers {
                    high_rate_limit: dec!(23750),
                    middle_rate_limit: dec!(25500),
                    low_rate_limit: dec!(39500),
                },
            ),
            min_age: 18,
        }
    }

    fn contribution(
        owner: Owner,
        amount: Decimal,
    ) -> RetirementContribution {
        RetirementContribution {
            owner,
            amount,
            distributions_received: dec!(0),
        }
    }

    #[test]
    fn low_income_single_gets_half() {
        let ctx = context(FilingStatus::Single, dec!(20000));

        let result = calculate(&ctx, &[contribution(Owner::Primary, dec!(3000))], &config());

        assert_eq!(result.amount, dec!(1000.00));
    }

    #[test]
    fn rate_drops_by_tier() {
        let ctx = context(FilingStatus::Single, dec!(30000));

        let result = calculate(&ctx, &[contribution(Owner::Primary, dec!(1000))], &config());

        assert_eq!(result.amount, dec!(100.00));
    }

    #[test]
    fn above_limit_is_ineligible() {
        let ctx = context(FilingStatus::Single, dec!(40000));

        let result = calculate(&ctx, &[contribution(Owner::Primary, dec!(1000))], &config());

        assert!(!result.eligible);
    }

    #[test]
    fn joint_filers_each_get_their_own_limit() {
        let ctx = context(FilingStatus::MarriedFilingJointly, dec!(45000));

        let result = calculate(
            &ctx,
            &[
                contribution(Owner::Primary, dec!(2500)),
                contribution(Owner::Spouse, dec!(1000)),
            ],
            &config(),
        );

        assert_eq!(result.amount, dec!(1500.00));
        assert_eq!(result.units.len(), 2);
    }

    #[test]
    fn distributions_offset_contributions() {
        let ctx = context(FilingStatus::Single, dec!(20000));
        let with_distribution = RetirementContribution {
            distributions_received: dec!(600),
            ..contribution(Owner::Primary, dec!(1000))
        };

        let result = calculate(&ctx, &[with_distribution], &config());

        assert_eq!(result.amount, dec!(200.00));
    }

    #[test]
    fn full_time_student_is_ineligible() {
        let mut ctx = context(FilingStatus::Single, dec!(20000));
        ctx.primary.full_time_student = true;

        let result = calculate(&ctx, &[contribution(Owner::Primary, dec!(1000))], &config());

        assert!(!result.eligible);
        assert_eq!(
            result.units[0].disqualification_reason.as_deref(),
            Some("full-time student")
        );
    }
}
