use std::path::PathBuf;
use std::sync::Arc;

use rand::Rng;

use crate::color::ColorMap;
use crate::data::aggregate::NumericField;
use crate::data::error::InvalidFilterRange;
use crate::data::filter::{DistanceRange, FilterCriteria, TrafficSelector};
use crate::data::model::RecordStore;
use crate::data::pipeline::{run_pipeline, Dashboard};

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Fleet,
    Routes,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Overview, Tab::Fleet, Tab::Routes];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "📊 Overview",
            Tab::Fleet => "🚀 Fleet analysis",
            Tab::Routes => "📍 Routes and zones",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table, shared read-only with every pipeline run.
    pub store: Arc<RecordStore>,

    /// Where `store` was loaded from.
    pub source: PathBuf,

    /// Current filter selections.
    pub criteria: FilterCriteria,

    /// Field averaged by the fleet bar chart.
    pub compare_field: NumericField,

    pub tab: Tab,

    pub histogram_bins: usize,

    /// Result of the last pipeline run (recomputed on every change).
    pub dashboard: Result<Dashboard, InvalidFilterRange>,

    /// Stable pie colours for the store's weather labels.
    pub weather_colors: ColorMap,

    /// Last random-order draw, already formatted.
    pub random_order: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(store: Arc<RecordStore>, source: PathBuf, histogram_bins: usize) -> Self {
        let criteria = FilterCriteria::for_store(&store);
        let weather_colors = ColorMap::new(store.weather_conditions());
        let dashboard = run_pipeline(&store, &criteria, NumericField::default(), histogram_bins);
        Self {
            store,
            source,
            criteria,
            compare_field: NumericField::default(),
            tab: Tab::default(),
            histogram_bins,
            dashboard,
            weather_colors,
            random_order: None,
            status_message: None,
        }
    }

    /// Swap in a newly loaded table; filters reset to admit everything.
    pub fn set_store(&mut self, store: Arc<RecordStore>, source: PathBuf) {
        self.criteria = FilterCriteria::for_store(&store);
        self.weather_colors = ColorMap::new(store.weather_conditions());
        self.store = store;
        self.source = source;
        self.random_order = None;
        self.status_message = None;
        self.refresh();
    }

    /// Re-run the whole pipeline from the store.
    pub fn refresh(&mut self) {
        self.dashboard = run_pipeline(
            &self.store,
            &self.criteria,
            self.compare_field,
            self.histogram_bins,
        );
        if let Err(e) = &self.dashboard {
            log::warn!("{e}; charts suppressed until the range is corrected");
        }
    }

    pub fn set_traffic(&mut self, traffic: TrafficSelector) {
        self.criteria.traffic = traffic;
        self.refresh();
    }

    pub fn set_distance(&mut self, min: i64, max: i64) {
        self.criteria.distance = DistanceRange::new(min, max);
        self.refresh();
    }

    pub fn set_compare_field(&mut self, field: NumericField) {
        self.compare_field = field;
        self.refresh();
    }

    /// Toggle a single delivery mode in the selection.
    pub fn toggle_mode(&mut self, mode: &str) {
        if !self.criteria.modes.remove(mode) {
            self.criteria.modes.insert(mode.to_string());
        }
        self.refresh();
    }

    /// Select every observed mode.
    pub fn select_all_modes(&mut self) {
        self.criteria.modes = self.store.delivery_modes().iter().cloned().collect();
        self.refresh();
    }

    /// Clear the mode selection.
    pub fn select_no_modes(&mut self) {
        self.criteria.modes.clear();
        self.refresh();
    }

    /// Pick a random order from the unfiltered store.
    pub fn draw_random_order<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.random_order = self.store.sample(rng).map(|r| {
            log::info!("random order drawn: {}", r.order_id);
            r.route_summary()
        });
    }
}
