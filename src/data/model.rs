use std::collections::BTreeSet;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::DataLoadError;

/// Columns every input table must provide.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "order_id",
    "distance_km",
    "delivery_time_min",
    "traffic_level",
    "delivery_mode",
    "weather",
    "restaurant_zone",
    "customer_zone",
];

// ---------------------------------------------------------------------------
// TrafficLevel – the traffic column
// ---------------------------------------------------------------------------

/// Traffic level of a delivery.
///
/// Labels outside the known three are kept verbatim in `Other` so the full
/// view still carries them; the per-traffic partition drops them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TrafficLevel {
    Low,
    Medium,
    High,
    Other(String),
}

impl TrafficLevel {
    /// The three levels the scatter partition knows about, in legend order.
    pub const KNOWN: [TrafficLevel; 3] = [TrafficLevel::Low, TrafficLevel::Medium, TrafficLevel::High];

    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "Low" => TrafficLevel::Low,
            "Medium" => TrafficLevel::Medium,
            "High" => TrafficLevel::High,
            other => TrafficLevel::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TrafficLevel::Low => "Low",
            TrafficLevel::Medium => "Medium",
            TrafficLevel::High => "High",
            TrafficLevel::Other(s) => s,
        }
    }
}

impl From<String> for TrafficLevel {
    fn from(label: String) -> Self {
        TrafficLevel::parse(&label)
    }
}

impl From<TrafficLevel> for String {
    fn from(level: TrafficLevel) -> Self {
        level.as_str().to_string()
    }
}

impl fmt::Display for TrafficLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the delivery table
// ---------------------------------------------------------------------------

/// One delivery event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub order_id: String,
    pub distance_km: f64,
    pub delivery_time_min: f64,
    pub traffic_level: TrafficLevel,
    pub delivery_mode: String,
    pub weather: String,
    pub restaurant_zone: String,
    pub customer_zone: String,
}

impl Record {
    /// Reject values outside the numeric contract (finite, non-negative).
    pub fn validate(&self, row: usize) -> Result<(), DataLoadError> {
        for (column, value) in [
            ("distance_km", self.distance_km),
            ("delivery_time_min", self.delivery_time_min),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DataLoadError::malformed(
                    row,
                    format!("'{column}' must be a non-negative number, got {value}"),
                ));
            }
        }
        Ok(())
    }

    /// One-line route description shown by the random-order action.
    pub fn route_summary(&self) -> String {
        format!(
            "Order #{}: from {} to {} by {}.",
            self.order_id, self.restaurant_zone, self.customer_zone, self.delivery_mode
        )
    }
}

// ---------------------------------------------------------------------------
// RecordStore – the immutable loaded table
// ---------------------------------------------------------------------------

/// The full loaded table plus the vocabularies derived from it at load time.
///
/// Built once and shared read-only (behind an `Arc`) by every operation.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Vec<Record>,
    delivery_modes: Vec<String>,
    weather_conditions: Vec<String>,
    distance_bounds: (i64, i64),
}

impl RecordStore {
    /// Build the store and its derived vocabularies.  An empty table has no
    /// distance bounds and is rejected, as is one whose truncated bounds
    /// coincide (no valid distance interval can be picked).
    pub fn from_records(records: Vec<Record>) -> Result<Self, DataLoadError> {
        if records.is_empty() {
            return Err(DataLoadError::Empty);
        }

        let delivery_modes = first_seen(records.iter().map(|r| r.delivery_mode.as_str()));
        let weather_conditions = first_seen(records.iter().map(|r| r.weather.as_str()));

        let (min, max) = records.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), r| (lo.min(r.distance_km), hi.max(r.distance_km)),
        );
        // Slider bounds are truncated, not rounded.
        let distance_bounds = (min.trunc() as i64, max.trunc() as i64);
        if distance_bounds.0 == distance_bounds.1 {
            return Err(DataLoadError::NarrowDistanceSpan {
                bound: distance_bounds.0,
            });
        }

        Ok(RecordStore {
            records,
            delivery_modes,
            weather_conditions,
            distance_bounds,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.  Never zero for a store built by
    /// [`RecordStore::from_records`].
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Observed delivery modes in first-seen order.
    pub fn delivery_modes(&self) -> &[String] {
        &self.delivery_modes
    }

    /// Observed weather labels in first-seen order.
    pub fn weather_conditions(&self) -> &[String] {
        &self.weather_conditions
    }

    /// Integer-truncated `(min, max)` of `distance_km` over the whole table.
    pub fn distance_bounds(&self) -> (i64, i64) {
        self.distance_bounds
    }

    /// Draw one record uniformly at random from the unfiltered table.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Record> {
        self.records.choose(rng)
    }
}

fn first_seen<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) fn record(id: u32, distance_km: f64, time: f64, traffic: &str, mode: &str, weather: &str) -> Record {
    Record {
        order_id: id.to_string(),
        distance_km,
        delivery_time_min: time,
        traffic_level: TrafficLevel::parse(traffic),
        delivery_mode: mode.to_string(),
        weather: weather.to_string(),
        restaurant_zone: format!("Zone {}", id % 5),
        customer_zone: format!("Zone {}", (id + 2) % 7),
    }
}
