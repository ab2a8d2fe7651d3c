use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::calculations::common::money;
use tax_core::{BracketSchedule, ConfigError, FilingStatus, TaxYearConfig};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading tax bracket data.
#[derive(Debug, Error)]
pub enum TaxBracketLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("No brackets for tax year {0} in the file")]
    NoBracketsForYear(i32),

    #[error(
        "Schedule {schedule}: bracket ending at {max_income} is followed by one starting at {next_min_income}"
    )]
    NotContiguous {
        schedule: String,
        max_income: Decimal,
        next_min_income: Decimal,
    },

    #[error("Schedule {schedule}: only the last bracket may have an empty max_income")]
    OpenEndedBracket { schedule: String },

    #[error(
        "Schedule {schedule}: base_tax {found} at {min_income} does not match the {expected} owed on the brackets below it"
    )]
    BaseTaxMismatch {
        schedule: String,
        min_income: Decimal,
        expected: Decimal,
        found: Decimal,
    },

    #[error("Invalid bracket table: {0}")]
    Config(#[from] ConfigError),
}

impl From<csv::Error> for TaxBracketLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxBracketLoaderError::CsvParse(err.to_string())
    }
}

/// Maps IRS schedule codes to filing statuses.
///
/// - Schedule X → Single
/// - Schedule Y-1 → Married Filing Jointly and Qualifying Surviving Spouse
/// - Schedule Y-2 → Married Filing Separately
/// - Schedule Z → Head of Household
fn schedule_to_filing_statuses(
    schedule: &str
) -> Result<Vec<FilingStatus>, TaxBracketLoaderError> {
    match schedule {
        "X" => Ok(vec![FilingStatus::Single]),
        "Y-1" => Ok(vec![
            FilingStatus::MarriedFilingJointly,
            FilingStatus::QualifyingSurvivingSpouse,
        ]),
        "Y-2" => Ok(vec![FilingStatus::MarriedFilingSeparately]),
        "Z" => Ok(vec![FilingStatus::HeadOfHousehold]),
        _ => Err(TaxBracketLoaderError::InvalidSchedule(schedule.to_string())),
    }
}

/// A single record from the tax brackets CSV file.
///
/// The CSV format uses IRS schedule designations:
/// - `tax_year`: The tax year (e.g., 2025)
/// - `schedule`: The IRS schedule code (X, Y-1, Y-2, Z)
/// - `min_income`: The minimum income for this bracket
/// - `max_income`: The maximum income for this bracket (empty for unlimited)
/// - `base_tax`: Tax owed on `min_income`
/// - `rate`: The marginal tax rate as a decimal (e.g., 0.10 for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub tax_year: i32,
    pub schedule: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub base_tax: Decimal,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for ordinary-income bracket tables from CSV files.
///
/// The CSV uses IRS schedule codes (X, Y-1, Y-2, Z) which are mapped to
/// the filing statuses of a [`TaxYearConfig`].
pub struct TaxBracketLoader;

impl TaxBracketLoader {
    /// Parse tax bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxBracketRecord>, TaxBracketLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxBracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Builds one checked [`BracketSchedule`] per schedule code present for
    /// `tax_year`.
    ///
    /// Each schedule's rows must be contiguous, open-ended only at the top,
    /// and carry a `base_tax` equal to the tax on every bracket below.
    pub fn schedules(
        records: &[TaxBracketRecord],
        tax_year: i32,
    ) -> Result<BTreeMap<String, BracketSchedule>, TaxBracketLoaderError> {
        let mut groups: BTreeMap<String, Vec<&TaxBracketRecord>> = BTreeMap::new();
        for record in records.iter().filter(|r| r.tax_year == tax_year) {
            groups
                .entry(record.schedule.clone())
                .or_default()
                .push(record);
        }
        if groups.is_empty() {
            return Err(TaxBracketLoaderError::NoBracketsForYear(tax_year));
        }

        let mut schedules = BTreeMap::new();
        for (schedule, mut rows) in groups {
            schedule_to_filing_statuses(&schedule)?;
            rows.sort_by_key(|r| r.min_income);
            check_rows(&schedule, &rows)?;

            let pairs: Vec<_> = rows.iter().map(|r| (r.min_income, r.rate)).collect();
            let table = BracketSchedule::from_pairs(&pairs);
            table.validate(&format!("{tax_year} schedule {schedule}"))?;
            debug!(tax_year, schedule = %schedule, brackets = pairs.len(), "parsed schedule");
            schedules.insert(schedule, table);
        }
        Ok(schedules)
    }

    /// Replaces the ordinary bracket tables in `config` with the schedules
    /// found in `records` for the config's year.
    ///
    /// Returns the number of brackets installed. Schedule Y-1 feeds both
    /// MFJ and QSS, so its brackets count twice. Statuses whose schedule is
    /// absent from the file keep their existing table.
    pub fn apply(
        config: &mut TaxYearConfig,
        records: &[TaxBracketRecord],
    ) -> Result<usize, TaxBracketLoaderError> {
        let schedules = Self::schedules(records, config.tax_year)?;
        let mut installed = 0;

        for (schedule, table) in schedules {
            for status in schedule_to_filing_statuses(&schedule)? {
                installed += table.brackets().len();
                *config.ordinary_brackets.get_mut(status) = table.clone();
            }
        }

        info!(
            tax_year = config.tax_year,
            brackets = installed,
            "ordinary brackets loaded from CSV"
        );
        Ok(installed)
    }
}

fn check_rows(
    schedule: &str,
    rows: &[&TaxBracketRecord],
) -> Result<(), TaxBracketLoaderError> {
    let mut owed = Decimal::ZERO;
    for (index, row) in rows.iter().enumerate() {
        if money(row.base_tax) != money(owed) {
            return Err(TaxBracketLoaderError::BaseTaxMismatch {
                schedule: schedule.to_string(),
                min_income: row.min_income,
                expected: money(owed),
                found: row.base_tax,
            });
        }

        let next = rows.get(index + 1);
        match (row.max_income, next) {
            (Some(max_income), Some(next)) if max_income != next.min_income => {
                return Err(TaxBracketLoaderError::NotContiguous {
                    schedule: schedule.to_string(),
                    max_income,
                    next_min_income: next.min_income,
                });
            }
            (Some(max_income), Some(_)) => owed += (max_income - row.min_income) * row.rate,
            (None, Some(_)) => {
                return Err(TaxBracketLoaderError::OpenEndedBracket {
                    schedule: schedule.to_string(),
                });
            }
            (_, None) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const TEST_CSV: &str = r#"tax_year,schedule,min_income,max_income,base_tax,rate
2025,X,0,11925,0,0.10
2025,X,11925,48475,1192.50,0.12
2025,X,48475,103350,5578.50,0.22
2025,X,103350,197300,17651.00,0.24
2025,X,197300,250525,40199.00,0.32
2025,X,250525,626350,57231.00,0.35
2025,X,626350,,188769.75,0.37
2025,Y-1,0,23850,0,0.10
2025,Y-1,23850,96950,2385.00,0.12
2025,Y-1,96950,206700,11157.00,0.22
2025,Y-1,206700,394600,35302.00,0.24
2025,Y-1,394600,501050,80398.00,0.32
2025,Y-1,501050,751600,114462.00,0.35
2025,Y-1,751600,,202154.50,0.37
"#;

    const HEADER: &str = "tax_year,schedule,min_income,max_income,base_tax,rate\n";

    // =========================================================================
    // parse tests
    // =========================================================================

    #[test]
    fn test_parse_csv_single_bracket() {
        let csv = "tax_year,schedule,min_income,max_income,base_tax,rate\n2025,X,0,11925,0,0.10";

        let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            TaxBracketRecord {
                tax_year: 2025,
                schedule: "X".to_string(),
                min_income: dec!(0),
                max_income: Some(dec!(11925)),
                base_tax: dec!(0),
                rate: dec!(0.10),
            }
        );
    }

    #[test]
    fn test_parse_csv_unlimited_max_income() {
        let csv =
            "tax_year,schedule,min_income,max_income,base_tax,rate\n2025,X,626350,,188769.75,0.37";

        let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].max_income, None);
        assert_eq!(records[0].base_tax, dec!(188769.75));
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "tax_year,schedule,min_income\n2025,X,0";

        let err = TaxBracketLoader::parse(csv.as_bytes()).expect_err("Should fail for missing column");

        let TaxBracketLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(msg.contains("missing field"), "got: {msg}");
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let csv = format!("{HEADER}2025,X,abc,11925,0,0.10");

        let err = TaxBracketLoader::parse(csv.as_bytes()).expect_err("Should fail for bad decimal");

        assert!(matches!(err, TaxBracketLoaderError::CsvParse(_)));
    }

    // =========================================================================
    // schedule tests
    // =========================================================================

    #[test]
    fn test_schedule_to_filing_statuses_y1() {
        let statuses = schedule_to_filing_statuses("Y-1").expect("Should map Y-1");

        assert_eq!(
            statuses,
            vec![
                FilingStatus::MarriedFilingJointly,
                FilingStatus::QualifyingSurvivingSpouse
            ]
        );
    }

    #[test]
    fn test_schedule_to_filing_statuses_invalid() {
        let result = schedule_to_filing_statuses("INVALID");

        match result {
            Err(TaxBracketLoaderError::InvalidSchedule(ref schedule)) => {
                assert_eq!(schedule, "INVALID");
            }
            other => panic!("expected InvalidSchedule, got {other:?}"),
        }
    }

    #[test]
    fn test_schedules_builds_tables() {
        let records = TaxBracketLoader::parse(TEST_CSV.as_bytes()).unwrap();

        let schedules = TaxBracketLoader::schedules(&records, 2025).unwrap();

        assert_eq!(schedules.keys().collect::<Vec<_>>(), vec!["X", "Y-1"]);
        let single = &schedules["X"];
        assert_eq!(single.brackets().len(), 7);
        assert_eq!(single.brackets()[6].min_income, dec!(626350));
        assert_eq!(single.marginal_rate(dec!(60000)), dec!(0.22));
    }

    #[test]
    fn test_schedules_rows_may_arrive_out_of_order() {
        let csv = format!("{HEADER}2025,X,11925,,1192.50,0.12\n2025,X,0,11925,0,0.10\n");
        let records = TaxBracketLoader::parse(csv.as_bytes()).unwrap();

        let schedules = TaxBracketLoader::schedules(&records, 2025).unwrap();

        assert_eq!(schedules["X"].brackets()[0].min_income, dec!(0));
    }

    #[test]
    fn test_schedules_wrong_year() {
        let records = TaxBracketLoader::parse(TEST_CSV.as_bytes()).unwrap();

        let result = TaxBracketLoader::schedules(&records, 2024);

        assert!(matches!(result, Err(TaxBracketLoaderError::NoBracketsForYear(2024))));
    }

    #[test]
    fn test_schedules_base_tax_mismatch() {
        let csv = format!("{HEADER}2025,X,0,11925,0,0.10\n2025,X,11925,,1200.00,0.12\n");
        let records = TaxBracketLoader::parse(csv.as_bytes()).unwrap();

        let result = TaxBracketLoader::schedules(&records, 2025);

        match result {
            Err(TaxBracketLoaderError::BaseTaxMismatch {
                expected, found, ..
            }) => {
                assert_eq!(expected, dec!(1192.50));
                assert_eq!(found, dec!(1200.00));
            }
            other => panic!("expected BaseTaxMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_schedules_gap_between_brackets() {
        let csv = format!("{HEADER}2025,X,0,11925,0,0.10\n2025,X,12000,,1192.50,0.12\n");
        let records = TaxBracketLoader::parse(csv.as_bytes()).unwrap();

        let result = TaxBracketLoader::schedules(&records, 2025);

        assert!(matches!(result, Err(TaxBracketLoaderError::NotContiguous { .. })));
    }

    #[test]
    fn test_schedules_open_bracket_in_the_middle() {
        let csv = format!("{HEADER}2025,X,0,,0,0.10\n2025,X,11925,,1192.50,0.12\n");
        let records = TaxBracketLoader::parse(csv.as_bytes()).unwrap();

        let result = TaxBracketLoader::schedules(&records, 2025);

        assert!(matches!(result, Err(TaxBracketLoaderError::OpenEndedBracket { .. })));
    }

    #[test]
    fn test_schedules_rate_out_of_range() {
        let csv = format!("{HEADER}2025,X,0,,0,1.10\n");
        let records = TaxBracketLoader::parse(csv.as_bytes()).unwrap();

        let result = TaxBracketLoader::schedules(&records, 2025);

        assert!(matches!(
            result,
            Err(TaxBracketLoaderError::Config(ConfigError::RateOutOfRange { .. }))
        ));
    }

    // =========================================================================
    // apply tests
    // =========================================================================

    #[test]
    fn test_apply_replaces_only_listed_schedules() {
        let mut config = tax_core::tax_years::builtin(2025).unwrap();
        let original_hoh = config.ordinary_brackets.head_of_household.clone();
        let csv = format!("{HEADER}2025,X,0,,0,0.20\n2025,Y-1,0,,0,0.15\n");
        let records = TaxBracketLoader::parse(csv.as_bytes()).unwrap();

        let installed = TaxBracketLoader::apply(&mut config, &records).unwrap();

        assert_eq!(installed, 3);
        assert_eq!(config.ordinary_brackets.single, BracketSchedule::flat(dec!(0.20)));
        assert_eq!(
            config.ordinary_brackets.qualifying_surviving_spouse,
            BracketSchedule::flat(dec!(0.15))
        );
        assert_eq!(config.ordinary_brackets.head_of_household, original_hoh);
    }
}
