//! Traffic records as they come out of the survey CSV.
//!
//! All text fields are normalized to trimmed lower case by the parser, so the
//! classification helpers here compare against lower-case literals only.

/// Label of the junction whose buses and scooters get their own counts.
pub const ELM_AVENUE_RABBIT_ROAD: &str = "Elm Avenue/Rabbit Road";
/// Label of the junction whose hourly traffic drives the peak-hour figures.
pub const HANLEY_HIGHWAY_WESTWAY: &str = "Hanley Highway/Westway";

/// Vehicle class recorded by the survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleKind {
    Truck,
    Bus,
    Car,
    Bicycle,
    Motorcycle,
    Scooter,
    Electric,
    Other(String),
}

impl VehicleKind {
    /// Classifies a raw vehicle label, case-insensitively.
    ///
    /// Survey files in the wild spell some classes differently ("Buss",
    /// "bike", "motorbike"); those are folded into the canonical variant.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "truck" => VehicleKind::Truck,
            "bus" | "buss" => VehicleKind::Bus,
            "car" => VehicleKind::Car,
            "bicycle" | "bike" => VehicleKind::Bicycle,
            "motorcycle" | "motorbike" => VehicleKind::Motorcycle,
            "scooter" => VehicleKind::Scooter,
            "electric" => VehicleKind::Electric,
            _ => VehicleKind::Other(label),
        }
    }

    pub fn is_two_wheeled(&self) -> bool {
        matches!(
            self,
            VehicleKind::Bicycle | VehicleKind::Motorcycle | VehicleKind::Scooter
        )
    }
}

/// Survey junction. Only two junctions carry junction-scoped counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Junction {
    ElmAvenueRabbitRoad,
    HanleyHighwayWestway,
    Other(String),
}

impl Junction {
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label == ELM_AVENUE_RABBIT_ROAD.to_lowercase() {
            Junction::ElmAvenueRabbitRoad
        } else if label == HANLEY_HIGHWAY_WESTWAY.to_lowercase() {
            Junction::HanleyHighwayWestway
        } else {
            Junction::Other(label)
        }
    }
}

/// One observed vehicle.
///
/// Optional fields are `None` when the column is not mapped or the cell could
/// not be parsed; counting rules that need them simply do not fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficRecord {
    pub vehicle_type: VehicleKind,
    pub junction: Junction,
    pub direction_in: Option<String>,
    pub direction_out: Option<String>,
    pub speed: Option<i64>,
    pub speed_limit: Option<i64>,
    /// Hour of day in `0..=23`.
    pub hour: Option<u8>,
    pub is_rain: bool,
    pub is_electric: bool,
}

impl TrafficRecord {
    /// A record with only the vehicle and junction set.
    pub fn new(vehicle_type: VehicleKind, junction: Junction) -> Self {
        TrafficRecord {
            vehicle_type,
            junction,
            direction_in: None,
            direction_out: None,
            speed: None,
            speed_limit: None,
            hour: None,
            is_rain: false,
            is_electric: false,
        }
    }

    /// True when the vehicle left the junction the way it came in.
    ///
    /// Single-direction dialects carry no entry direction; there a record
    /// counts when its direction is "straight".
    pub fn is_not_turning(&self) -> bool {
        match (&self.direction_in, &self.direction_out) {
            (Some(d_in), Some(d_out)) => d_in == d_out,
            (None, Some(d_out)) => d_out == "straight",
            _ => false,
        }
    }

    pub fn is_heading_north(&self) -> bool {
        matches!(self.direction_out.as_deref(), Some("north" | "n"))
    }

    /// Speed strictly above the posted limit. Both values must have parsed.
    pub fn is_over_speed_limit(&self) -> bool {
        match (self.speed, self.speed_limit) {
            (Some(speed), Some(limit)) => speed > limit,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_kind_aliases() {
        assert_eq!(VehicleKind::from_label("Buss"), VehicleKind::Bus);
        assert_eq!(VehicleKind::from_label(" BIKE "), VehicleKind::Bicycle);
        assert_eq!(VehicleKind::from_label("Motorbike"), VehicleKind::Motorcycle);
        assert_eq!(VehicleKind::from_label("motorcycle"), VehicleKind::Motorcycle);
        assert_eq!(
            VehicleKind::from_label("Taxi"),
            VehicleKind::Other("taxi".to_string())
        );
    }

    #[test]
    fn test_two_wheeled() {
        assert!(VehicleKind::Bicycle.is_two_wheeled());
        assert!(VehicleKind::Scooter.is_two_wheeled());
        assert!(VehicleKind::Motorcycle.is_two_wheeled());
        assert!(!VehicleKind::Car.is_two_wheeled());
        assert!(!VehicleKind::Other("tricycle".into()).is_two_wheeled());
    }

    #[test]
    fn test_junction_case_insensitive() {
        assert_eq!(
            Junction::from_label("elm avenue/rabbit road"),
            Junction::ElmAvenueRabbitRoad
        );
        assert_eq!(
            Junction::from_label("HANLEY HIGHWAY/WESTWAY"),
            Junction::HanleyHighwayWestway
        );
        assert_eq!(
            Junction::from_label("Market Street"),
            Junction::Other("market street".to_string())
        );
    }

    #[test]
    fn test_not_turning() {
        let mut record = TrafficRecord::new(VehicleKind::Car, Junction::ElmAvenueRabbitRoad);
        assert!(!record.is_not_turning());

        record.direction_in = Some("n".into());
        record.direction_out = Some("n".into());
        assert!(record.is_not_turning());

        record.direction_out = Some("e".into());
        assert!(!record.is_not_turning());

        record.direction_in = None;
        record.direction_out = Some("straight".into());
        assert!(record.is_not_turning());
    }

    #[test]
    fn test_over_speed_limit_requires_both_values() {
        let mut record = TrafficRecord::new(VehicleKind::Car, Junction::ElmAvenueRabbitRoad);
        record.speed = Some(40);
        assert!(!record.is_over_speed_limit());

        record.speed_limit = Some(30);
        assert!(record.is_over_speed_limit());

        record.speed = Some(30);
        assert!(!record.is_over_speed_limit());
    }

    #[test]
    fn test_heading_north() {
        let mut record = TrafficRecord::new(VehicleKind::Bus, Junction::ElmAvenueRabbitRoad);
        record.direction_out = Some("n".into());
        assert!(record.is_heading_north());
        record.direction_out = Some("north".into());
        assert!(record.is_heading_north());
        record.direction_out = Some("s".into());
        assert!(!record.is_heading_north());
    }
}
