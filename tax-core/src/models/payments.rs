use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::sum;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatedPayment {
    pub date: NaiveDate,
    pub amount: Decimal,
}

impl EstimatedPayment {
    /// Payments for `tax_year` count toward the required annual payment only
    /// if made by January 15 of the following year.
    pub fn is_timely(
        &self,
        tax_year: i32,
    ) -> bool {
        NaiveDate::from_ymd_opt(tax_year + 1, 1, 15).is_some_and(|due| self.date <= due)
            && self.date.year() >= tax_year
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorYearInfo {
    /// Total tax shown on the prior-year return.
    pub tax: Decimal,
    pub agi: Decimal,
    /// The prior year covered a full twelve months.
    pub full_year: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payments {
    /// Withholding not reported on an income record (backup withholding,
    /// 1099-NEC and similar).
    pub federal_withholding: Decimal,
    pub estimated_payments: Vec<EstimatedPayment>,
    /// Prior-year overpayment applied to this year's estimated tax.
    pub prior_year_overpayment_applied: Decimal,
    pub extension_payment: Decimal,
    pub prior_year: Option<PriorYearInfo>,
    /// Two-thirds of gross income is from farming or fishing.
    pub farmer_or_fisher: bool,
}

impl Payments {
    pub fn total_estimated(&self) -> Decimal {
        sum(self.estimated_payments.iter().map(|p| p.amount)) + self.prior_year_overpayment_applied
    }

    /// Estimated payments made on time for `tax_year`.
    pub fn timely_estimated(
        &self,
        tax_year: i32,
    ) -> Decimal {
        sum(self
            .estimated_payments
            .iter()
            .filter(|p| p.is_timely(tax_year))
            .map(|p| p.amount))
            + self.prior_year_overpayment_applied
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn payment(
        y: i32,
        m: u32,
        d: u32,
        amount: Decimal,
    ) -> EstimatedPayment {
        EstimatedPayment {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            amount,
        }
    }

    #[test]
    fn january_15_payment_is_timely() {
        assert!(payment(2026, 1, 15, dec!(1000)).is_timely(2025));
        assert!(!payment(2026, 1, 16, dec!(1000)).is_timely(2025));
    }

    #[test]
    fn late_payments_excluded_from_timely_total() {
        let payments = Payments {
            estimated_payments: vec![
                payment(2025, 4, 15, dec!(2000)),
                payment(2025, 9, 15, dec!(2000)),
                payment(2026, 4, 15, dec!(2000)),
            ],
            ..Payments::default()
        };

        assert_eq!(payments.total_estimated(), dec!(6000));
        assert_eq!(payments.timely_estimated(2025), dec!(4000));
    }
}
