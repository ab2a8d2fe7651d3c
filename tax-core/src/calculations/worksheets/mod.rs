//! Form-level worksheets.
//!
//! Each worksheet takes its year-scoped config plus a plain input struct and
//! returns a result struct with the intermediate lines, so the engine can
//! store it in the breakdown as-is.

pub mod amt;
pub mod capital_gains;
pub mod other_taxes;
pub mod passive;
pub mod qbi;
pub mod self_emp;
pub mod social_security;
pub mod underpayment;

pub use amt::{AmtConfig, AmtInput, AmtResult, AmtWorksheet};
pub use capital_gains::{CapitalGainsInput, CapitalGainsResult, net_capital_gains};
pub use other_taxes::{OtherTaxesConfig, OtherTaxesInput, OtherTaxesResult, calculate_other_taxes};
pub use passive::{
    PassiveActivityInput, PassiveActivityResult, PassiveLossConfig, limit_passive_losses,
};
pub use qbi::{QbiBusiness, QbiBusinessResult, QbiConfig, QbiInput, QbiResult, QbiWorksheet};
pub use self_emp::{
    SeWorksheet, SeWorksheetConfig, SeWorksheetError, SeWorksheetInput, SeWorksheetResult,
};
pub use social_security::{
    SocialSecurityConfig, SocialSecurityInput, SocialSecurityResult, SocialSecurityWorksheet,
};
pub use underpayment::{
    UnderpaymentConfig, UnderpaymentInput, UnderpaymentResult, UnderpaymentWorksheet,
};
