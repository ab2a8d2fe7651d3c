use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tax_data::{TaxBracketLoader, calculate_report, load_return, logging};

/// Compute the federal and state tax for a return.
///
/// The return is a TOML file holding the `TaxReturn` fields. The report is
/// printed to stdout as TOML; logs go to stderr.
///
/// The optional brackets CSV has the following columns:
/// - tax_year: The tax year (e.g., 2025)
/// - schedule: The IRS schedule code (X, Y-1, Y-2, Z)
/// - min_income: The minimum income for this bracket
/// - max_income: The maximum income (empty for unlimited)
/// - base_tax: The tax owed on min_income
/// - rate: The marginal tax rate as a decimal (e.g., 0.10)
#[derive(Parser, Debug)]
#[command(name = "tax-calc")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the TOML file containing the return
    #[arg(short, long = "return", value_name = "FILE")]
    return_file: PathBuf,

    /// Two-letter state code; defaults to the return's state of residence
    #[arg(short, long)]
    state: Option<String>,

    /// CSV file of ordinary brackets to use instead of the built-in tables
    #[arg(short, long, value_name = "FILE")]
    brackets: Option<PathBuf>,

    /// Log calculation stages at debug level
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    let tax_return = load_return(&args.return_file)
        .with_context(|| format!("Failed to load return: {}", args.return_file.display()))?;

    let brackets = match &args.brackets {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open: {}", path.display()))?;
            let records = TaxBracketLoader::parse(file)
                .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
            Some(records)
        }
        None => None,
    };

    let report = calculate_report(&tax_return, args.state.as_deref(), brackets.as_deref())
        .with_context(|| {
            format!(
                "Failed to calculate {} return from {}",
                tax_return.tax_year,
                args.return_file.display()
            )
        })?;

    print!("{}", report.to_toml().context("Failed to render report")?);
    Ok(())
}
