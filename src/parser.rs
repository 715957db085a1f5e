//! CSV parser for traffic survey files.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::record::{Junction, TrafficRecord, VehicleKind};
use crate::schema::{ElectricSource, FieldMapping, ResolvedColumns};

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%H.%M"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
];

/// Records read from one survey file plus counts of the cells that did not parse.
#[derive(Debug, Default)]
pub struct ParsedSurvey {
    pub records: Vec<TrafficRecord>,
    /// Rows the CSV reader could not decode at all.
    pub rejected_rows: usize,
    pub unparsed_times: usize,
    pub unparsed_speeds: usize,
}

/// Reads a survey file from disk.
///
/// A missing file is not an error: it is logged and `Ok(None)` is returned so
/// the caller can report it and carry on.
#[tracing::instrument(skip(mapping), fields(path = %path.display()))]
pub fn read_survey_file(path: &Path, mapping: &FieldMapping) -> Result<Option<ParsedSurvey>> {
    if !path.exists() {
        warn!("Survey file not found");
        return Ok(None);
    }

    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let survey = parse_records(file, mapping)?;

    info!(
        records = survey.records.len(),
        rejected_rows = survey.rejected_rows,
        "Survey file loaded"
    );
    Ok(Some(survey))
}

/// Parses CSV survey data into [`TrafficRecord`]s.
///
/// # Errors
///
/// Fails only when the header cannot be read or does not contain the mapped
/// columns. Individual bad rows and cells are counted and skipped.
pub fn parse_records<R: Read>(reader: R, mapping: &FieldMapping) -> Result<ParsedSurvey> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("failed to read CSV header")?.clone();
    let columns = mapping.resolve(&headers)?;
    debug!(?columns, "Resolved field mapping");

    let mut survey = ParsedSurvey::default();

    for (row, result) in rdr.records().enumerate() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!(row = row + 1, error = %e, "Skipping unreadable row");
                survey.rejected_rows += 1;
                continue;
            }
        };

        let record = to_record(&raw, &columns, &mapping.electric);

        if columns.time.is_some() && record.hour.is_none() {
            debug!(row = row + 1, "Unparseable time, row excluded from hourly counts");
            survey.unparsed_times += 1;
        }
        if (columns.speed.is_some() && record.speed.is_none())
            || (columns.speed_limit.is_some() && record.speed_limit.is_none())
        {
            debug!(row = row + 1, "Non-numeric speed, row excluded from speeding count");
            survey.unparsed_speeds += 1;
        }

        survey.records.push(record);
    }

    if survey.unparsed_times > 0 || survey.unparsed_speeds > 0 {
        warn!(
            unparsed_times = survey.unparsed_times,
            unparsed_speeds = survey.unparsed_speeds,
            "Some cells could not be parsed"
        );
    }

    Ok(survey)
}

fn to_record(
    raw: &StringRecord,
    columns: &ResolvedColumns,
    electric: &ElectricSource,
) -> TrafficRecord {
    let cell = |index: Option<usize>| index.and_then(|i| raw.get(i));

    let vehicle_type = VehicleKind::from_label(cell(Some(columns.vehicle_type)).unwrap_or(""));
    let junction = Junction::from_label(cell(Some(columns.junction)).unwrap_or(""));

    let is_electric = match electric {
        ElectricSource::VehicleType => vehicle_type == VehicleKind::Electric,
        ElectricSource::Flag { .. } => cell(columns.electric_flag).is_some_and(is_truthy),
    };

    TrafficRecord {
        vehicle_type,
        junction,
        direction_in: cell(columns.direction_in).and_then(normalize_text),
        direction_out: cell(columns.direction_out).and_then(normalize_text),
        speed: cell(columns.speed).and_then(parse_number),
        speed_limit: cell(columns.speed_limit).and_then(parse_number),
        hour: cell(columns.time).and_then(parse_hour),
        is_rain: cell(columns.rain).is_some_and(is_rainy),
        is_electric,
    }
}

fn normalize_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_lowercase())
}

/// Parses an integer cell. Blank cells read as 0; anything else non-numeric is `None`.
pub fn parse_number(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return Some(0);
    }
    value.parse().ok()
}

/// Extracts the hour of day from a time or timestamp cell.
///
/// Accepts clock times (`08:15`, `08:15:00`), full timestamps and bare hour
/// numbers. The result is always within `0..=23`.
pub fn parse_hour(value: &str) -> Option<u8> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(hour) = value.parse::<u8>() {
        return (hour < 24).then_some(hour);
    }

    let hour = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
        .map(|t| t.hour())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.hour())
        })
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.hour()))?;

    u8::try_from(hour).ok()
}

/// "yes", "y", "true" and "1" in any case.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "yes" | "y" | "true" | "1"
    )
}

/// A rain flag, or a weather description such as "Light Rain".
pub fn is_rainy(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    is_truthy(&value) || (value.contains("rain") && !value.starts_with("no"))
}
