use crate::analyzers::types::{AggregateReport, HourWindow, PeakHours};
use crate::analyzers::utility::{peak_indices, rounded_div, rounded_pct};
use crate::record::TrafficRecord;
use crate::stats::{HOURS, SurveyStats};

/// Aggregates a day of [`TrafficRecord`]s into an [`AggregateReport`].
///
/// Pure and order-independent. Every derived ratio is 0 when its denominator
/// is 0, and the bicycle average always spreads over the full 24-hour day.
pub fn aggregate(records: &[TrafficRecord]) -> AggregateReport {
    let counts = SurveyStats::from_records(records);

    let truck_percentage = rounded_pct(counts.total_trucks, counts.total_vehicles);
    let scooter_percentage_at_elm = rounded_pct(counts.scooters_at_elm, counts.elm_junction_total);
    let average_bicycles_per_hour = rounded_div(counts.bicycles_counted_hourly(), HOURS);

    let (peak_count, peak_hours) = peak_indices(&counts.hourly_hanley_counts);
    let peak_hanley = PeakHours {
        count: peak_count,
        hours: peak_hours
            .into_iter()
            .filter_map(|h| u8::try_from(h).ok())
            .map(HourWindow)
            .collect(),
    };

    AggregateReport {
        counts,
        truck_percentage,
        scooter_percentage_at_elm,
        average_bicycles_per_hour,
        peak_hanley,
    }
}
