use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::filter::FilteredView;
use super::model::{Record, TrafficLevel};

// ---------------------------------------------------------------------------
// Numeric field selector
// ---------------------------------------------------------------------------

/// Which numeric column the fleet comparison averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    #[default]
    DeliveryTimeMin,
    DistanceKm,
}

impl NumericField {
    pub const ALL: [NumericField; 2] = [NumericField::DeliveryTimeMin, NumericField::DistanceKm];

    pub fn column_name(self) -> &'static str {
        match self {
            NumericField::DeliveryTimeMin => "delivery_time_min",
            NumericField::DistanceKm => "distance_km",
        }
    }

    /// Human label used by the selector and chart titles.
    pub fn label(self) -> &'static str {
        match self {
            NumericField::DeliveryTimeMin => "Delivery time (min)",
            NumericField::DistanceKm => "Distance travelled (km)",
        }
    }

    pub fn value(self, record: &Record) -> f64 {
        match self {
            NumericField::DeliveryTimeMin => record.delivery_time_min,
            NumericField::DistanceKm => record.distance_km,
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for NumericField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "delivery_time_min" | "time" => Ok(NumericField::DeliveryTimeMin),
            "distance_km" | "distance" => Ok(NumericField::DistanceKm),
            other => Err(format!(
                "unknown field '{other}' (expected delivery_time_min or distance_km)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

/// Headline metrics of a view.  Means are NaN when `count == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean_time: f64,
    pub mean_distance: f64,
}

impl Summary {
    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}

/// Arithmetic mean; NaN for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

pub fn summarize(view: &FilteredView<'_>) -> Summary {
    Summary {
        count: view.len(),
        mean_time: mean(view.iter().map(|r| r.delivery_time_min)),
        mean_distance: mean(view.iter().map(|r| r.distance_km)),
    }
}

// ---------------------------------------------------------------------------
// Grouped aggregate
// ---------------------------------------------------------------------------

/// Mean of the compared field for one delivery mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeMean {
    pub mode: String,
    pub mean: f64,
}

/// Per-mode mean of `field`, ascending by mean.
///
/// Only modes present in the view appear.  Groups are keyed by mode name
/// (as a pandas `groupby` would), not by first appearance in the view, and
/// the sort is stable, so equal means come out in name order.
pub fn group_by_mode(view: &FilteredView<'_>, field: NumericField) -> Vec<ModeMean> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for r in view.iter() {
        let entry = groups.entry(r.delivery_mode.as_str()).or_insert((0.0, 0));
        entry.0 += field.value(r);
        entry.1 += 1;
    }

    let mut means: Vec<ModeMean> = groups
        .into_iter()
        .map(|(mode, (sum, n))| ModeMean {
            mode: mode.to_string(),
            mean: sum / n as f64,
        })
        .collect();
    means.sort_by(|a, b| a.mean.total_cmp(&b.mean));
    means
}

// ---------------------------------------------------------------------------
// Weather distribution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherCount {
    pub weather: String,
    pub count: usize,
}

/// Count of records per observed weather label, most frequent first
/// (ties by label).
pub fn weather_distribution(view: &FilteredView<'_>) -> Vec<WeatherCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in view.iter() {
        *counts.entry(r.weather.as_str()).or_default() += 1;
    }

    let mut out: Vec<WeatherCount> = counts
        .into_iter()
        .map(|(weather, count)| WeatherCount {
            weather: weather.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

// ---------------------------------------------------------------------------
// Traffic partitions
// ---------------------------------------------------------------------------

/// Disjoint Low / Medium / High sub-views of a view.
///
/// Records with any other traffic label belong to none of the three, even
/// though the parent view contains them.
#[derive(Debug, Clone)]
pub struct TrafficPartitions<'a> {
    pub low: FilteredView<'a>,
    pub medium: FilteredView<'a>,
    pub high: FilteredView<'a>,
}

impl<'a> TrafficPartitions<'a> {
    /// Partitions in legend order, paired with their level.
    pub fn iter(&self) -> impl Iterator<Item = (TrafficLevel, &FilteredView<'a>)> {
        TrafficLevel::KNOWN
            .into_iter()
            .zip([&self.low, &self.medium, &self.high])
    }

    /// Records covered by the three partitions together.
    pub fn covered(&self) -> usize {
        self.low.len() + self.medium.len() + self.high.len()
    }
}

pub fn by_traffic_partition<'a>(view: &FilteredView<'a>) -> TrafficPartitions<'a> {
    let part = |level: TrafficLevel| view.retain(|r| r.traffic_level == level);
    TrafficPartitions {
        low: part(TrafficLevel::Low),
        medium: part(TrafficLevel::Medium),
        high: part(TrafficLevel::High),
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram over `[min, max]` of `values`.  Every bin is
/// half-open except the last, which also takes `max`.  Constant input is
/// spread over `[v - 0.5, v + 0.5]`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: lo + width * i as f64,
            end: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterCriteria};
    use crate::data::model::{record, RecordStore};

    fn store() -> RecordStore {
        RecordStore::from_records(vec![
            record(1, 2.0, 20.0, "Low", "Bike", "Sunny"),
            record(2, 6.0, 40.0, "High", "Car", "Rainy"),
            record(3, 4.0, 30.0, "Medium", "Bike", "Sunny"),
            record(4, 8.0, 10.0, "High", "Scooter", "Foggy"),
            record(5, 5.0, 50.0, "Gridlock", "Car", "Sunny"),
        ])
        .unwrap()
    }

    #[test]
    fn summary_of_full_view() {
        let store = store();
        let view = FilteredView::all(&store);
        let s = summarize(&view);
        assert_eq!(s.count, 5);
        assert!((s.mean_time - 30.0).abs() < 1e-9);
        assert!((s.mean_distance - 5.0).abs() < 1e-9);
    }

    #[test]
    fn summary_of_empty_view_is_nan_not_panic() {
        let store = store();
        let view = FilteredView::all(&store).retain(|_| false);
        let s = summarize(&view);
        assert_eq!(s.count, 0);
        assert!(!s.has_data());
        assert!(s.mean_time.is_nan());
        assert!(s.mean_distance.is_nan());
        assert!(group_by_mode(&view, NumericField::DistanceKm).is_empty());
        assert!(weather_distribution(&view).is_empty());
    }

    #[test]
    fn group_by_mode_sorts_ascending() {
        let store = store();
        let view = FilteredView::all(&store);
        let grouped = group_by_mode(&view, NumericField::DeliveryTimeMin);

        let modes: Vec<&str> = grouped.iter().map(|g| g.mode.as_str()).collect();
        assert_eq!(modes, ["Scooter", "Bike", "Car"]);
        assert!((grouped[1].mean - 25.0).abs() < 1e-9);
        assert!(grouped.windows(2).all(|w| w[0].mean <= w[1].mean));
    }

    #[test]
    fn group_by_mode_omits_absent_modes_and_keeps_tie_order() {
        let store = RecordStore::from_records(vec![
            record(1, 3.0, 20.0, "Low", "Van", "Sunny"),
            record(2, 3.0, 20.0, "Low", "Bike", "Sunny"),
            record(3, 9.0, 20.0, "Low", "Car", "Sunny"),
        ])
        .unwrap();
        let view = FilteredView::all(&store).retain(|r| r.delivery_mode != "Car");
        let grouped = group_by_mode(&view, NumericField::DistanceKm);
        let modes: Vec<&str> = grouped.iter().map(|g| g.mode.as_str()).collect();
        assert_eq!(modes, ["Bike", "Van"]);
    }

    #[test]
    fn weather_counts_sum_to_view_size() {
        let store = store();
        let criteria = FilterCriteria::for_store(&store);
        let view = apply(&store, &criteria).unwrap();
        let dist = weather_distribution(&view);

        assert_eq!(dist.iter().map(|w| w.count).sum::<usize>(), view.len());
        assert_eq!(dist[0], WeatherCount { weather: "Sunny".into(), count: 3 });
        assert_eq!(dist[1].weather, "Foggy");
        assert_eq!(dist[2].weather, "Rainy");
    }

    #[test]
    fn partitions_drop_unknown_traffic_labels() {
        let store = store();
        let view = FilteredView::all(&store);
        let parts = by_traffic_partition(&view);

        assert_eq!(parts.low.len(), 1);
        assert_eq!(parts.medium.len(), 1);
        assert_eq!(parts.high.len(), 2);
        assert_eq!(parts.covered(), view.len() - 1);

        let levels: Vec<TrafficLevel> = parts.iter().map(|(level, _)| level).collect();
        assert_eq!(levels, TrafficLevel::KNOWN);
    }

    #[test]
    fn histogram_counts_every_value() {
        let values = [10.0, 12.0, 15.0, 20.0, 25.0, 40.0];
        let bins = histogram(&values, 3);
        assert_eq!(bins.len(), 3);
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), [3, 2, 1]);
        assert_eq!(bins[0].start, 10.0);
        assert_eq!(bins[2].end, 40.0);
    }

    #[test]
    fn histogram_of_constant_values_is_widened() {
        let bins = histogram(&[7.0, 7.0], 2);
        assert_eq!(bins[0].start, 6.5);
        assert_eq!(bins[1].end, 7.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert!(histogram(&[], 15).is_empty());
    }

    #[test]
    fn numeric_field_parses_column_names() {
        assert_eq!("distance_km".parse::<NumericField>(), Ok(NumericField::DistanceKm));
        assert_eq!("time".parse::<NumericField>(), Ok(NumericField::DeliveryTimeMin));
        assert!("speed".parse::<NumericField>().is_err());
    }
}
