mod breakdown;
mod credits;
mod deductions;
mod filing_status;
mod income;
mod payments;
mod phaseout;
mod tax_bracket;
mod tax_return;
mod tax_year_config;
mod taxpayer;

pub use breakdown::*;
pub use credits::*;
pub use deductions::*;
pub use filing_status::{ByFilingStatus, FilingStatus};
pub use income::*;
pub use payments::{EstimatedPayment, Payments, PriorYearInfo};
pub use phaseout::PhaseoutRange;
pub use tax_bracket::{BracketSchedule, TaxBracket};
pub use tax_return::{StateInputs, TaxReturn};
pub use tax_year_config::{CapitalGainsConfig, TaxYearConfig};
pub use taxpayer::*;
