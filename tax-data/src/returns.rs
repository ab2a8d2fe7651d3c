//! Returns stored as TOML.
//!
//! Amounts may be written as strings (`wages = "75000.10"`) to keep exact
//! cents, or as plain integers.

use std::fs;
use std::path::{Path, PathBuf};

use tax_core::TaxReturn;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ReturnFileError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed return: {0}")]
    Toml(#[from] toml::de::Error),
}

pub fn parse_return(text: &str) -> Result<TaxReturn, ReturnFileError> {
    Ok(toml::from_str(text)?)
}

pub fn load_return(path: &Path) -> Result<TaxReturn, ReturnFileError> {
    let text = fs::read_to_string(path).map_err(|source| ReturnFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tax_return = parse_return(&text)?;
    debug!(
        path = %path.display(),
        tax_year = tax_return.tax_year,
        sources = tax_return.income.sources.len(),
        "return loaded"
    );
    Ok(tax_return)
}
