//! Capital gain and loss netting (Schedule D) and the capital loss
//! carryover worksheet.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{money, non_negative};
use crate::models::CapitalLossCarryforward;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainsInput {
    pub short_term_gain: Decimal,
    pub long_term_gain: Decimal,
    pub carryforward: CapitalLossCarryforward,
    /// $3,000 ($1,500 married filing separately).
    pub loss_limit: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainsResult {
    pub short_term_net: Decimal,
    pub long_term_net: Decimal,
    /// Combined gain or loss before the loss limit.
    pub net_gain_or_loss: Decimal,
    /// Amount entering gross income; a loss is limited to the loss limit.
    pub included_in_income: Decimal,
    /// Long-term gain eligible for preferential rates.
    pub net_capital_gain: Decimal,
    pub short_term_carryforward: Decimal,
    pub long_term_carryforward: Decimal,
}

pub fn net_capital_gains(input: &CapitalGainsInput) -> CapitalGainsResult {
    let short_term_net = input.short_term_gain - non_negative(input.carryforward.short_term);
    let long_term_net = input.long_term_gain - non_negative(input.carryforward.long_term);
    let net = short_term_net + long_term_net;

    let result = if net >= Decimal::ZERO {
        CapitalGainsResult {
            short_term_net: money(short_term_net),
            long_term_net: money(long_term_net),
            net_gain_or_loss: money(net),
            included_in_income: money(net),
            net_capital_gain: money(non_negative(long_term_net.min(net))),
            short_term_carryforward: Decimal::ZERO,
            long_term_carryforward: Decimal::ZERO,
        }
    } else {
        let allowed_loss = (-net).min(input.loss_limit);

        // Short-term losses absorb the allowance first.
        let short_term_carryforward =
            non_negative(-short_term_net - (allowed_loss + non_negative(long_term_net)));
        let allowance_left = non_negative(allowed_loss - non_negative(-short_term_net));
        let long_term_carryforward =
            non_negative(-long_term_net - non_negative(short_term_net) - allowance_left);

        CapitalGainsResult {
            short_term_net: money(short_term_net),
            long_term_net: money(long_term_net),
            net_gain_or_loss: money(net),
            included_in_income: money(-allowed_loss),
            net_capital_gain: Decimal::ZERO,
            short_term_carryforward: money(short_term_carryforward),
            long_term_carryforward: money(long_term_carryforward),
        }
    };

    debug!(
        net = %result.net_gain_or_loss,
        included = %result.included_in_income,
        "capital gains netted"
    );
    result
}
