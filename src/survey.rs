//! Survey days and the CSV files that hold them.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Utc};
use csv::WriterBuilder;
use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::schema::FieldMapping;

/// Earliest year a survey can be recorded for.
pub const MIN_SURVEY_YEAR: i32 = 2000;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurveyDateError {
    #[error("'{0}' is not a valid date, expected YYYY-MM-DD or DD/MM/YYYY")]
    Unrecognized(String),
    #[error("{year}-{month:02}-{day:02} is not a calendar day")]
    NotACalendarDay { year: i32, month: u32, day: u32 },
    #[error("year {year} is out of range, must be between {min} and {max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },
}

/// A validated survey day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurveyDate(NaiveDate);

impl SurveyDate {
    /// Parses `YYYY-MM-DD` or `DD/MM/YYYY`, accepting years from
    /// [`MIN_SURVEY_YEAR`] up to the current year.
    pub fn parse(input: &str) -> Result<Self, SurveyDateError> {
        Self::parse_until(input, Utc::now().year())
    }

    fn parse_until(input: &str, max_year: i32) -> Result<Self, SurveyDateError> {
        let input = input.trim();
        let date = DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
            .ok_or_else(|| match calendar_parts(input) {
                Some((year, month, day)) => SurveyDateError::NotACalendarDay { year, month, day },
                None => SurveyDateError::Unrecognized(input.to_string()),
            })?;
        Self::checked(date, max_year)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, SurveyDateError> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(SurveyDateError::NotACalendarDay { year, month, day })?;
        Self::checked(date, Utc::now().year())
    }

    fn checked(date: NaiveDate, max_year: i32) -> Result<Self, SurveyDateError> {
        let year = date.year();
        if !(MIN_SURVEY_YEAR..=max_year).contains(&year) {
            return Err(SurveyDateError::YearOutOfRange {
                year,
                min: MIN_SURVEY_YEAR,
                max: max_year,
            });
        }
        Ok(SurveyDate(date))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for SurveyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%d-%m-%Y"))
    }
}

/// Splits a numeric `YYYY-MM-DD` or `DD/MM/YYYY` string that failed calendar
/// validation, so the error can name the impossible day.
fn calendar_parts(input: &str) -> Option<(i32, u32, u32)> {
    let parts: Vec<&str> = input.split(['-', '/']).collect();
    let [a, b, c] = parts.as_slice() else {
        return None;
    };
    let (year, month, day) = if input.contains('-') { (a, b, c) } else { (c, b, a) };
    if year.len() != 4 {
        return None;
    }
    Some((year.parse().ok()?, month.parse().ok()?, day.parse().ok()?))
}

/// File name conventions for survey CSVs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileNaming {
    /// `2024-06-15.csv`
    Iso,
    /// `traffic_data15062024.csv`
    Compact,
}

impl FileNaming {
    pub fn file_name(&self, date: SurveyDate) -> String {
        match self {
            FileNaming::Iso => format!("{}.csv", date.0.format("%Y-%m-%d")),
            FileNaming::Compact => format!("traffic_data{}.csv", date.0.format("%d%m%Y")),
        }
    }
}

/// Path of the survey file for `date` inside `data_dir`.
pub fn survey_path(data_dir: &Path, date: SurveyDate, naming: FileNaming) -> PathBuf {
    data_dir.join(naming.file_name(date))
}

/// Creates an empty survey file holding only the header row of `mapping`.
///
/// Refuses to overwrite an existing file.
#[tracing::instrument(skip(mapping), fields(path = %path.display()))]
pub fn create_survey_file(path: &Path, mapping: &FieldMapping) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("cannot create survey file {}", path.display()))?;

    let mut writer = WriterBuilder::new().from_writer(file);
    writer.write_record(mapping.header())?;
    writer.flush()?;

    info!("Survey file created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Dialect;
    use std::env;
    use std::fs;

    #[test]
    fn test_parse_iso_and_uk_formats() {
        let iso = SurveyDate::parse_until("2024-06-15", 2024).unwrap();
        let uk = SurveyDate::parse_until("15/06/2024", 2024).unwrap();

        assert_eq!(iso, uk);
        assert_eq!(iso.to_string(), "15-06-2024");
    }

    #[test]
    fn test_leap_days() {
        assert!(SurveyDate::parse_until("2024-02-29", 2024).is_ok());
        assert_eq!(
            SurveyDate::parse_until("2023-02-29", 2024),
            Err(SurveyDateError::NotACalendarDay {
                year: 2023,
                month: 2,
                day: 29
            })
        );
        assert_eq!(
            SurveyDate::parse_until("31/04/2020", 2024),
            Err(SurveyDateError::NotACalendarDay {
                year: 2020,
                month: 4,
                day: 31
            })
        );
    }

    #[test]
    fn test_year_range() {
        assert_eq!(
            SurveyDate::parse_until("1999-12-31", 2024),
            Err(SurveyDateError::YearOutOfRange {
                year: 1999,
                min: 2000,
                max: 2024
            })
        );
        assert!(SurveyDate::parse_until("2025-01-01", 2024).is_err());
        assert!(SurveyDate::parse_until("2000-01-01", 2024).is_ok());
    }

    #[test]
    fn test_unrecognized_input() {
        assert!(matches!(
            SurveyDate::parse_until("June 15th", 2024),
            Err(SurveyDateError::Unrecognized(_))
        ));
        assert!(SurveyDate::parse_until("15-06-24", 2024).is_err());
    }

    #[test]
    fn test_file_names() {
        let date = SurveyDate::from_ymd(2024, 6, 5).unwrap();

        assert_eq!(FileNaming::Iso.file_name(date), "2024-06-05.csv");
        assert_eq!(FileNaming::Compact.file_name(date), "traffic_data05062024.csv");
        assert_eq!(
            survey_path(Path::new("surveys"), date, FileNaming::Iso),
            Path::new("surveys").join("2024-06-05.csv")
        );
    }

    #[test]
    fn test_create_survey_file_writes_header_once() {
        let path = env::temp_dir().join("traffic_survey_test_create.csv");
        let _ = fs::remove_file(&path);

        let mapping = FieldMapping::for_dialect(Dialect::Simple);
        create_survey_file(&path, &mapping).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.trim_end(),
            "VehicleType,Junction,Direction,Speed,SpeedLimit,Time,Rain"
        );

        // never overwrites
        assert!(create_survey_file(&path, &mapping).is_err());

        fs::remove_file(&path).unwrap();
    }
}
