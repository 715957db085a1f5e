use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::analyzers::aggregate::aggregate;
use crate::analyzers::types::AggregateReport;
use crate::parser::read_survey_file;
use crate::schema::FieldMapping;

/// Result of analyzing one survey file.
#[derive(Debug)]
pub struct Analysis {
    pub report: AggregateReport,
    /// Rows the CSV reader could not decode; not part of any count.
    pub rejected_rows: usize,
}

/// Loads a survey file and aggregates its records.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn analyze_file(path: &Path, mapping: &FieldMapping) -> Result<Option<Analysis>> {
    let Some(survey) = read_survey_file(path, mapping)? else {
        return Ok(None);
    };

    let report = aggregate(&survey.records);
    info!(
        path = %path.display(),
        total_vehicles = report.counts.total_vehicles,
        peak_hanley = report.peak_hanley.count,
        "Survey aggregated"
    );

    Ok(Some(Analysis {
        report,
        rejected_rows: survey.rejected_rows,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Dialect;
    use std::env;
    use std::fs;

    #[test]
    fn test_analyze_file() {
        let path = env::temp_dir().join("traffic_survey_test_analyze.csv");
        fs::write(
            &path,
            "VehicleType,Junction,Direction,Speed,SpeedLimit,Time,Rain\n\
             Truck,Elm Avenue/Rabbit Road,north,40,30,08:00,no\n\
             Car,Hanley Highway/Westway,straight,20,30,09:10,yes\n",
        )
        .unwrap();

        let analysis = analyze_file(&path, &FieldMapping::for_dialect(Dialect::Simple))
            .unwrap()
            .unwrap();

        assert_eq!(analysis.rejected_rows, 0);
        assert_eq!(analysis.report.counts.total_vehicles, 2);
        assert_eq!(analysis.report.truck_percentage, 50);
        assert_eq!(analysis.report.counts.vehicles_not_turning, 1);
        assert_eq!(analysis.report.counts.hours_of_rain, 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_analyze_missing_file() {
        let path = env::temp_dir().join("traffic_survey_test_analyze_missing.csv");
        let _ = fs::remove_file(&path);

        let analysis = analyze_file(&path, &FieldMapping::for_dialect(Dialect::Simple)).unwrap();
        assert!(analysis.is_none());
    }
}
