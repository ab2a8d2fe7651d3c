//! Input and output around `tax-core`: ordinary bracket tables from IRS
//! schedule CSV files, returns from TOML, and TOML reports of the computed
//! federal and state results.

pub mod loader;
pub mod logging;
pub mod report;
pub mod returns;

pub use loader::{TaxBracketLoader, TaxBracketLoaderError, TaxBracketRecord};
pub use report::{Report, ReportError, calculate_report};
pub use returns::{ReturnFileError, load_return, parse_return};
