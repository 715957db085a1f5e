use serde::Serialize;

use crate::record::{Junction, TrafficRecord, VehicleKind};

/// Number of hourly buckets in a survey day.
pub const HOURS: usize = 24;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SurveyStats {
    pub total_vehicles: usize,

    // vehicle types
    pub total_trucks: usize,
    pub total_electric: usize,
    pub total_two_wheeled: usize,
    pub total_bicycles: usize,

    // movements
    pub buses_north_at_elm: usize,
    pub vehicles_not_turning: usize,
    pub over_speed_limit: usize,

    // junctions
    pub elm_junction_total: usize,
    pub scooters_at_elm: usize,
    pub hanley_junction_total: usize,

    // hourly buckets, index = hour of day
    pub hourly_bicycle_counts: [usize; HOURS],
    pub hourly_hanley_counts: [usize; HOURS],
    pub hourly_elm_counts: [usize; HOURS],

    // weather; counts rainy records, not distinct hours
    pub hours_of_rain: usize,
}

impl SurveyStats {
    pub fn from_records(records: &[TrafficRecord]) -> Self {
        let mut s = SurveyStats::default();

        for r in records {
            s.total_vehicles += 1;

            match &r.vehicle_type {
                VehicleKind::Truck => s.total_trucks += 1,
                VehicleKind::Bicycle => {
                    s.total_bicycles += 1;
                    bump(&mut s.hourly_bicycle_counts, r.hour);
                }
                _ => {}
            }

            if r.is_electric {
                s.total_electric += 1;
            }

            if r.vehicle_type.is_two_wheeled() {
                s.total_two_wheeled += 1;
            }

            if r.is_not_turning() {
                s.vehicles_not_turning += 1;
            }

            if r.is_over_speed_limit() {
                s.over_speed_limit += 1;
            }

            match &r.junction {
                Junction::ElmAvenueRabbitRoad => {
                    s.elm_junction_total += 1;

                    if r.vehicle_type == VehicleKind::Scooter {
                        s.scooters_at_elm += 1;
                    }

                    if r.vehicle_type == VehicleKind::Bus && r.is_heading_north() {
                        s.buses_north_at_elm += 1;
                    }

                    bump(&mut s.hourly_elm_counts, r.hour);
                }
                Junction::HanleyHighwayWestway => {
                    s.hanley_junction_total += 1;

                    bump(&mut s.hourly_hanley_counts, r.hour);
                }
                Junction::Other(_) => {}
            }

            if r.is_rain {
                s.hours_of_rain += 1;
            }
        }

        s
    }

    pub fn bicycles_counted_hourly(&self) -> usize {
        self.hourly_bicycle_counts.iter().sum()
    }
}

/// Adds one to the bucket for `hour`. Hours outside the day are ignored.
fn bump(buckets: &mut [usize; HOURS], hour: Option<u8>) {
    if let Some(count) = hour.and_then(|h| buckets.get_mut(usize::from(h))) {
        *count += 1;
    }
}
