use serde::Serialize;

use super::aggregate::{
    by_traffic_partition, group_by_mode, histogram, summarize, weather_distribution, HistogramBin,
    ModeMean, NumericField, Summary, WeatherCount,
};
use super::error::InvalidFilterRange;
use super::filter::{apply, FilterCriteria};
use super::model::{RecordStore, TrafficLevel};

/// Histogram resolution used when no configuration overrides it.
pub const DEFAULT_HISTOGRAM_BINS: usize = 15;

// ---------------------------------------------------------------------------
// Dashboard – everything the three tabs render for one interaction
// ---------------------------------------------------------------------------

/// Scatter series for one known traffic level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficSeries {
    pub level: TrafficLevel,
    pub count: usize,
    /// `[distance_km, delivery_time_min]` pairs.
    #[serde(skip)]
    pub points: Vec<[f64; 2]>,
}

/// Owned output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub criteria: FilterCriteria,
    pub compare_field: NumericField,
    pub summary: Summary,
    pub grouped: Vec<ModeMean>,
    pub weather: Vec<WeatherCount>,
    pub histogram: Vec<HistogramBin>,
    pub traffic: Vec<TrafficSeries>,
    /// Records in the view whose traffic level is none of Low/Medium/High.
    /// They count towards `summary` but appear in no traffic series.
    pub untracked_traffic: usize,
}

impl Dashboard {
    pub fn is_empty(&self) -> bool {
        !self.summary.has_data()
    }
}

/// Filter the store and compute every view model.
///
/// A degenerate distance range stops here with no aggregation done.
pub fn run_pipeline(
    store: &RecordStore,
    criteria: &FilterCriteria,
    compare_field: NumericField,
    bins: usize,
) -> Result<Dashboard, InvalidFilterRange> {
    let view = apply(store, criteria)?;
    if view.is_empty() {
        log::debug!("pipeline: no records match, rendering empty dashboard");
    }

    let times: Vec<f64> = view.iter().map(|r| r.delivery_time_min).collect();
    let partitions = by_traffic_partition(&view);
    let traffic = partitions
        .iter()
        .map(|(level, part)| TrafficSeries {
            level,
            count: part.len(),
            points: part
                .iter()
                .map(|r| [r.distance_km, r.delivery_time_min])
                .collect(),
        })
        .collect();

    let dashboard = Dashboard {
        criteria: criteria.clone(),
        compare_field,
        summary: summarize(&view),
        grouped: group_by_mode(&view, compare_field),
        weather: weather_distribution(&view),
        histogram: histogram(&times, bins),
        traffic,
        untracked_traffic: view.len() - partitions.covered(),
    };

    log::debug!(
        "pipeline: traffic={} distance=[{}, {}] modes={} -> {} of {} records",
        criteria.traffic,
        criteria.distance.min,
        criteria.distance.max,
        criteria.modes.len(),
        dashboard.summary.count,
        store.len()
    );

    Ok(dashboard)
}
