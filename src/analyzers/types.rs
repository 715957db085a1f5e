//! Data types produced by the aggregation pipeline.

use serde::Serialize;
use std::fmt;

use crate::stats::SurveyStats;

/// An hour-of-day bucket, displayed as the window it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct HourWindow(pub u8);

impl fmt::Display for HourWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Between {}:00 and {}:00", self.0, u16::from(self.0) + 1)
    }
}

/// Busiest hour(s) of a junction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeakHours {
    pub count: usize,
    /// Ascending. Empty when no traffic was recorded.
    pub hours: Vec<HourWindow>,
}

impl PeakHours {
    pub fn describe(&self) -> String {
        self.hours
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Complete statistics for one survey day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    #[serde(flatten)]
    pub counts: SurveyStats,
    pub truck_percentage: usize,
    pub scooter_percentage_at_elm: usize,
    pub average_bicycles_per_hour: usize,
    pub peak_hanley: PeakHours,
}
