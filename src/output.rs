//! Report formatting and persistence.
//!
//! A report is an ordered list of `label: value` lines. It can be printed,
//! serialized as JSON, saved to a results file and read back later.

use anyhow::{Context, Result};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::types::AggregateReport;

/// Separator written before each block appended to a results file.
pub const BLOCK_SEPARATOR: &str = "*******************";

/// One labeled statistic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub label: &'static str,
    pub value: String,
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

/// How [`save_report`] treats an existing results file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Overwrite,
    Append,
}

/// Builds the report lines in their fixed order.
pub fn report_lines(report: &AggregateReport, source: &str) -> Vec<ReportLine> {
    let c = &report.counts;
    let line = |label, value: String| ReportLine { label, value };

    vec![
        line("Selected CSV file", source.to_string()),
        line("Total number of vehicles", c.total_vehicles.to_string()),
        line("Total number of trucks", c.total_trucks.to_string()),
        line("Total number of electric vehicles", c.total_electric.to_string()),
        line("Total number of two-wheeled vehicles", c.total_two_wheeled.to_string()),
        line(
            "Total number of buses heading north at Elm Avenue/Rabbit Road",
            c.buses_north_at_elm.to_string(),
        ),
        line(
            "Total number of vehicles passing without turning",
            c.vehicles_not_turning.to_string(),
        ),
        line("Percentage of trucks", format!("{}%", report.truck_percentage)),
        line(
            "Average number of bicycles per hour",
            report.average_bicycles_per_hour.to_string(),
        ),
        line("Total number of vehicles over speed limit", c.over_speed_limit.to_string()),
        line(
            "Total vehicles through Elm Avenue/Rabbit Road",
            c.elm_junction_total.to_string(),
        ),
        line(
            "Total vehicles through Hanley Highway/Westway",
            c.hanley_junction_total.to_string(),
        ),
        line(
            "Percentage of scooters through Elm Avenue/Rabbit Road",
            format!("{}%", report.scooter_percentage_at_elm),
        ),
        line(
            "Number of vehicles in peak hour on Hanley Highway/Westway",
            report.peak_hanley.count.to_string(),
        ),
        line(
            "Peak hour(s) on Hanley Highway/Westway",
            report.peak_hanley.describe(),
        ),
        line("Total hours of rain", c.hours_of_rain.to_string()),
    ]
}

/// Writes report lines, one per line.
pub fn write_report<W: Write>(out: &mut W, lines: &[ReportLine]) -> Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &AggregateReport) {
    debug!("{:#?}", report);
}

/// Writes the report as pretty-printed JSON.
pub fn print_json<W: Write>(out: &mut W, report: &AggregateReport) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
    Ok(())
}

/// Saves report lines to a plain-text results file.
///
/// In [`SaveMode::Append`] each report is preceded by [`BLOCK_SEPARATOR`] so
/// several days can share one file.
pub fn save_report(path: &Path, lines: &[ReportLine], mode: SaveMode) -> Result<()> {
    debug!(path = %path.display(), ?mode, "Saving report");

    let mut file = match mode {
        SaveMode::Overwrite => OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path),
        SaveMode::Append => OpenOptions::new().append(true).create(true).open(path),
    }
    .with_context(|| format!("failed to open results file {}", path.display()))?;

    if mode == SaveMode::Append {
        writeln!(file, "\n{BLOCK_SEPARATOR}")?;
    }
    write_report(&mut file, lines)?;
    file.flush()?;

    info!(path = %path.display(), "Report saved");
    Ok(())
}

/// Reads a previously saved results file back as ordered `(key, value)` pairs.
///
/// Best-effort: a missing file yields no entries, and lines without a
/// `key: value` shape are skipped.
pub fn load_previous(path: &Path) -> Result<Vec<(String, String)>> {
    if !path.exists() {
        info!(path = %path.display(), "No previous results, starting empty");
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read results file {}", path.display()))?;

    let entries: Vec<(String, String)> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != BLOCK_SEPARATOR)
        .filter_map(|line| {
            let parsed = line.split_once(':');
            if parsed.is_none() {
                debug!(line, "Skipping malformed results line");
            }
            parsed
        })
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    info!(path = %path.display(), entries = entries.len(), "Previous results loaded");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::aggregate::aggregate;
    use crate::record::{Junction, TrafficRecord, VehicleKind};
    use std::env;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(name)
    }

    fn sample_report() -> AggregateReport {
        let mut car = TrafficRecord::new(VehicleKind::Car, Junction::HanleyHighwayWestway);
        car.hour = Some(8);
        let truck = TrafficRecord::new(VehicleKind::Truck, Junction::ElmAvenueRabbitRoad);
        aggregate(&[car, truck])
    }

    #[test]
    fn test_report_lines_order() {
        let lines = report_lines(&sample_report(), "2024-06-15.csv");

        assert_eq!(lines.len(), 16);
        assert_eq!(lines[0].to_string(), "Selected CSV file: 2024-06-15.csv");
        assert_eq!(lines[1].to_string(), "Total number of vehicles: 2");
        assert_eq!(lines[7].to_string(), "Percentage of trucks: 50%");
        assert_eq!(
            lines[14].to_string(),
            "Peak hour(s) on Hanley Highway/Westway: Between 8:00 and 9:00"
        );
        assert_eq!(lines[15].label, "Total hours of rain");
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&AggregateReport::default());
    }

    #[test]
    fn test_print_json_contains_flattened_counts() {
        let mut out = Vec::new();
        print_json(&mut out, &sample_report()).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["total_vehicles"], 2);
        assert_eq!(json["truck_percentage"], 50);
        assert_eq!(json["peak_hanley"]["hours"][0], 8);
    }

    #[test]
    fn test_save_overwrite_then_load() {
        let path = temp_path("traffic_survey_test_overwrite.txt");
        let _ = fs::remove_file(&path);

        let lines = report_lines(&sample_report(), "first.csv");
        save_report(&path, &lines, SaveMode::Overwrite).unwrap();
        save_report(&path, &lines, SaveMode::Overwrite).unwrap();

        let entries = load_previous(&path).unwrap();
        assert_eq!(entries.len(), 16);
        assert_eq!(
            entries[0],
            ("Selected CSV file".to_string(), "first.csv".to_string())
        );
        assert_eq!(
            entries[14].1,
            "Between 8:00 and 9:00",
            "value keeps its own colons"
        );

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_save_append_writes_separated_blocks() {
        let path = temp_path("traffic_survey_test_append.txt");
        let _ = fs::remove_file(&path);

        let lines = report_lines(&sample_report(), "day.csv");
        save_report(&path, &lines, SaveMode::Append).unwrap();
        save_report(&path, &lines, SaveMode::Append).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let separators = content.lines().filter(|l| *l == BLOCK_SEPARATOR).count();
        assert_eq!(separators, 2);
        assert_eq!(load_previous(&path).unwrap().len(), 32);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_previous_missing_file_is_empty() {
        let path = temp_path("traffic_survey_test_missing_results.txt");
        let _ = fs::remove_file(&path);

        assert!(load_previous(&path).unwrap().is_empty());
    }

    #[test]
    fn test_load_previous_skips_malformed_lines() {
        let path = temp_path("traffic_survey_test_malformed.txt");
        fs::write(&path, "total_vehicles: 12\nnot a pair\n\ntotal_trucks:3\n").unwrap();

        let entries = load_previous(&path).unwrap();
        assert_eq!(
            entries,
            vec![
                ("total_vehicles".to_string(), "12".to_string()),
                ("total_trucks".to_string(), "3".to_string()),
            ]
        );

        fs::remove_file(&path).unwrap();
    }
}
