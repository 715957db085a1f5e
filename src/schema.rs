//! CSV field mapping.
//!
//! Survey files come in more than one header dialect. A [`FieldMapping`] names
//! the column that feeds each record field; it is resolved once against the
//! file header into [`ResolvedColumns`], so a misconfigured mapping fails
//! before any row is read.

use anyhow::{Context, Result};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("CSV header is missing mapped column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("mapping for field '{0}' has an empty column name")]
    EmptyColumnName(&'static str),
}

/// Known header conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `VehicleType, Junction, Direction, Speed, SpeedLimit, Time, Rain`
    Simple,
    /// `JunctionName, travel_Direction_in/out, VehicleSpeed, JunctionSpeedLimit,
    /// timeOfDay, elctricHybrid, ...`
    Extended,
}

/// Which input decides whether a vehicle is electric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ElectricSource {
    /// The vehicle type label is "electric".
    #[default]
    VehicleType,
    /// A separate boolean column (e.g. `elctricHybrid`).
    Flag { column: String },
}

/// Column names feeding each [`TrafficRecord`](crate::record::TrafficRecord) field.
///
/// Optional fields left unmapped are `None` on every record. Loaded from JSON:
/// ```json
/// {
///   "vehicle_type": "VehicleType",
///   "junction": "JunctionName",
///   "direction_in": "travel_Direction_in",
///   "direction_out": "travel_Direction_out",
///   "speed": "VehicleSpeed",
///   "speed_limit": "JunctionSpeedLimit",
///   "time": "timeOfDay",
///   "rain": "Weather_Conditions",
///   "electric": { "source": "flag", "column": "elctricHybrid" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub vehicle_type: String,
    pub junction: String,
    #[serde(default)]
    pub direction_in: Option<String>,
    #[serde(default)]
    pub direction_out: Option<String>,
    #[serde(default)]
    pub speed: Option<String>,
    #[serde(default)]
    pub speed_limit: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub rain: Option<String>,
    #[serde(default)]
    pub electric: ElectricSource,
}

/// Column indices of a [`FieldMapping`] within one CSV header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub vehicle_type: usize,
    pub junction: usize,
    pub direction_in: Option<usize>,
    pub direction_out: Option<usize>,
    pub speed: Option<usize>,
    pub speed_limit: Option<usize>,
    pub time: Option<usize>,
    pub rain: Option<usize>,
    pub electric_flag: Option<usize>,
}

impl FieldMapping {
    pub fn for_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Simple => FieldMapping {
                vehicle_type: "VehicleType".into(),
                junction: "Junction".into(),
                direction_in: None,
                direction_out: Some("Direction".into()),
                speed: Some("Speed".into()),
                speed_limit: Some("SpeedLimit".into()),
                time: Some("Time".into()),
                rain: Some("Rain".into()),
                electric: ElectricSource::VehicleType,
            },
            Dialect::Extended => FieldMapping {
                vehicle_type: "VehicleType".into(),
                junction: "JunctionName".into(),
                direction_in: Some("travel_Direction_in".into()),
                direction_out: Some("travel_Direction_out".into()),
                speed: Some("VehicleSpeed".into()),
                speed_limit: Some("JunctionSpeedLimit".into()),
                time: Some("timeOfDay".into()),
                rain: Some("Rain".into()),
                electric: ElectricSource::Flag {
                    column: "elctricHybrid".into(),
                },
            },
        }
    }

    /// Loads a mapping from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read field mapping '{path}'"))?;
        let mapping: FieldMapping = serde_json::from_str(&content)
            .with_context(|| format!("invalid field mapping '{path}'"))?;
        mapping.validate()?;
        Ok(mapping)
    }

    /// Rejects mappings with blank column names.
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.columns()
            .into_iter()
            .find(|(_, column)| column.trim().is_empty())
            .map_or(Ok(()), |(field, _)| Err(SchemaError::EmptyColumnName(field)))
    }

    /// Every mapped `(field, column)` pair, in header order.
    pub fn columns(&self) -> Vec<(&'static str, &str)> {
        let mut columns = vec![
            ("vehicle_type", self.vehicle_type.as_str()),
            ("junction", self.junction.as_str()),
        ];
        let optional = [
            ("direction_in", &self.direction_in),
            ("direction_out", &self.direction_out),
            ("speed", &self.speed),
            ("speed_limit", &self.speed_limit),
            ("time", &self.time),
            ("rain", &self.rain),
        ];
        columns.extend(
            optional
                .into_iter()
                .filter_map(|(field, column)| column.as_deref().map(|c| (field, c))),
        );
        if let ElectricSource::Flag { column } = &self.electric {
            columns.push(("electric", column.as_str()));
        }
        columns
    }

    /// Header row for an empty survey file using this mapping.
    pub fn header(&self) -> Vec<&str> {
        self.columns().into_iter().map(|(_, column)| column).collect()
    }

    /// Locates every mapped column in `headers`.
    ///
    /// Names are compared case-insensitively after trimming. All missing
    /// columns are reported together.
    pub fn resolve(&self, headers: &StringRecord) -> Result<ResolvedColumns, SchemaError> {
        self.validate()?;

        let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let mut missing = Vec::new();
        let mut find = |column: &str| {
            let wanted = column.trim().to_lowercase();
            let index = normalized.iter().position(|h| *h == wanted);
            if index.is_none() {
                missing.push(column.to_string());
            }
            index
        };

        let vehicle_type = find(self.vehicle_type.as_str());
        let junction = find(self.junction.as_str());
        let direction_in = self.direction_in.as_deref().and_then(&mut find);
        let direction_out = self.direction_out.as_deref().and_then(&mut find);
        let speed = self.speed.as_deref().and_then(&mut find);
        let speed_limit = self.speed_limit.as_deref().and_then(&mut find);
        let time = self.time.as_deref().and_then(&mut find);
        let rain = self.rain.as_deref().and_then(&mut find);
        let electric_flag = match &self.electric {
            ElectricSource::VehicleType => None,
            ElectricSource::Flag { column } => find(column.as_str()),
        };

        match (vehicle_type, junction) {
            (Some(vehicle_type), Some(junction)) if missing.is_empty() => Ok(ResolvedColumns {
                vehicle_type,
                junction,
                direction_in,
                direction_out,
                speed,
                speed_limit,
                time,
                rain,
                electric_flag,
            }),
            _ => Err(SchemaError::MissingColumns(missing)),
        }
    }
}
