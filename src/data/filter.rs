use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::InvalidFilterRange;
use super::model::{Record, RecordStore, TrafficLevel};

// ---------------------------------------------------------------------------
// Filter criteria: traffic selector, distance interval, mode subset
// ---------------------------------------------------------------------------

/// Traffic radio selection.  `All` is the pass-through sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(into = "String")]
pub enum TrafficSelector {
    #[default]
    All,
    Level(TrafficLevel),
}

impl TrafficSelector {
    pub fn matches(&self, level: &TrafficLevel) -> bool {
        match self {
            TrafficSelector::All => true,
            TrafficSelector::Level(wanted) => wanted == level,
        }
    }
}

impl fmt::Display for TrafficSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrafficSelector::All => f.write_str("All"),
            TrafficSelector::Level(level) => write!(f, "{level}"),
        }
    }
}

impl From<TrafficSelector> for String {
    fn from(selector: TrafficSelector) -> Self {
        selector.to_string()
    }
}

impl FromStr for TrafficSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(TrafficSelector::All);
        }
        match TrafficLevel::parse(s) {
            TrafficLevel::Other(label) => Err(format!(
                "unknown traffic level '{label}' (expected All, Low, Medium or High)"
            )),
            level => Ok(TrafficSelector::Level(level)),
        }
    }
}

/// Closed integer interval over `distance_km`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DistanceRange {
    pub min: i64,
    pub max: i64,
}

impl DistanceRange {
    pub fn new(min: i64, max: i64) -> Self {
        DistanceRange { min, max }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, km: f64) -> bool {
        self.min as f64 <= km && km <= self.max as f64
    }

    /// A start equal to the end is never run through the pipeline.
    pub fn validate(&self) -> Result<(), InvalidFilterRange> {
        if self.min == self.max {
            return Err(InvalidFilterRange { bound: self.min });
        }
        Ok(())
    }
}

/// The conjunction of predicates chosen by the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCriteria {
    pub traffic: TrafficSelector,
    pub distance: DistanceRange,
    /// Selected delivery modes.  Empty means the mode predicate is inactive.
    pub modes: BTreeSet<String>,
}

impl FilterCriteria {
    /// Criteria that admit the whole store: every traffic level, the full
    /// truncated distance range, and every observed mode selected.
    pub fn for_store(store: &RecordStore) -> Self {
        let (min, max) = store.distance_bounds();
        FilterCriteria {
            traffic: TrafficSelector::All,
            distance: DistanceRange::new(min, max),
            modes: store.delivery_modes().iter().cloned().collect(),
        }
    }

    pub fn validate(&self) -> Result<(), InvalidFilterRange> {
        self.distance.validate()
    }

    /// Evaluate all three predicates (logical AND).
    pub fn matches(&self, record: &Record) -> bool {
        self.traffic.matches(&record.traffic_level)
            && self.distance.contains(record.distance_km)
            && (self.modes.is_empty() || self.modes.contains(&record.delivery_mode))
    }
}

// ---------------------------------------------------------------------------
// FilteredView – the subsequence of records passing the criteria
// ---------------------------------------------------------------------------

/// Indices into a [`RecordStore`], in store order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    store: &'a RecordStore,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every record of the store.
    #[cfg(test)]
    pub fn all(store: &'a RecordStore) -> Self {
        FilteredView {
            store,
            indices: (0..store.len()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[cfg(test)]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.store.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    /// Narrow this view to the records satisfying `keep`.
    pub fn retain(&self, mut keep: impl FnMut(&Record) -> bool) -> FilteredView<'a> {
        let records = self.store.records();
        FilteredView {
            store: self.store,
            indices: self
                .indices
                .iter()
                .copied()
                .filter(|&i| keep(&records[i]))
                .collect(),
        }
    }
}

/// Return indices of records that pass all predicates.
pub fn filtered_indices(store: &RecordStore, criteria: &FilterCriteria) -> Vec<usize> {
    store
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| criteria.matches(r))
        .map(|(i, _)| i)
        .collect()
}

/// Apply the criteria to the store.  A degenerate distance range is refused
/// before any record is looked at.
pub fn apply<'a>(
    store: &'a RecordStore,
    criteria: &FilterCriteria,
) -> Result<FilteredView<'a>, InvalidFilterRange> {
    criteria.validate()?;
    Ok(FilteredView {
        store,
        indices: filtered_indices(store, criteria),
    })
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::data::model::record;

    const LEVELS: [&str; 3] = ["Low", "Medium", "High"];
    const MODES: [&str; 3] = ["Bike", "Car", "Scooter"];

    /// 100 records with distances in [1, 20].  The last one sits exactly on
    /// 20 km so the truncated default range covers the whole store.
    fn hundred() -> RecordStore {
        let mut rng = StdRng::seed_from_u64(11);
        let records = (0..100)
            .map(|i| {
                record(
                    i,
                    if i == 99 { 20.0 } else { rng.gen_range(1.0..=19.0) },
                    rng.gen_range(10.0..90.0),
                    LEVELS[i as usize % 3],
                    MODES[(i as usize / 3) % 3],
                    "Sunny",
                )
            })
            .collect();
        RecordStore::from_records(records).unwrap()
    }

    #[test]
    fn default_criteria_admit_everything() {
        let store = hundred();
        let criteria = FilterCriteria::for_store(&store);
        assert_eq!(criteria.distance, DistanceRange::new(1, 20));
        let view = apply(&store, &criteria).unwrap();
        assert_eq!(view.len(), store.len());
    }

    #[test]
    fn high_traffic_within_five_to_ten() {
        let store = hundred();
        let criteria = FilterCriteria {
            traffic: TrafficSelector::Level(TrafficLevel::High),
            distance: DistanceRange::new(5, 10),
            ..FilterCriteria::for_store(&store)
        };
        let view = apply(&store, &criteria).unwrap();

        assert!(view.len() <= store.len());
        for r in view.iter() {
            assert!((5.0..=10.0).contains(&r.distance_km));
            assert_eq!(r.traffic_level, TrafficLevel::High);
        }
        let expected = store
            .records()
            .iter()
            .filter(|r| r.traffic_level == TrafficLevel::High && (5.0..=10.0).contains(&r.distance_km))
            .count();
        assert_eq!(view.len(), expected);
    }

    #[test]
    fn bike_only_excludes_other_modes() {
        let store = hundred();
        let criteria = FilterCriteria {
            modes: BTreeSet::from(["Bike".to_string()]),
            ..FilterCriteria::for_store(&store)
        };
        let view = apply(&store, &criteria).unwrap();

        assert!(!view.is_empty());
        assert!(view.iter().all(|r| r.delivery_mode == "Bike"));
        let bikes = store.records().iter().filter(|r| r.delivery_mode == "Bike").count();
        assert_eq!(view.len(), bikes);
    }

    #[test]
    fn empty_mode_selection_leaves_mode_unconstrained() {
        let store = hundred();
        let all_modes = FilterCriteria {
            traffic: TrafficSelector::Level(TrafficLevel::Medium),
            ..FilterCriteria::for_store(&store)
        };
        let no_modes = FilterCriteria {
            modes: BTreeSet::new(),
            ..all_modes.clone()
        };

        let with_all = apply(&store, &all_modes).unwrap();
        let with_none = apply(&store, &no_modes).unwrap();
        assert!(!with_none.is_empty());
        assert_eq!(with_none.indices(), with_all.indices());

        let unfiltered = FilterCriteria {
            modes: BTreeSet::new(),
            ..FilterCriteria::for_store(&store)
        };
        assert_eq!(apply(&store, &unfiltered).unwrap().len(), store.len());
    }

    #[test]
    fn filtering_is_idempotent() {
        let store = hundred();
        let criteria = FilterCriteria {
            traffic: TrafficSelector::Level(TrafficLevel::Low),
            distance: DistanceRange::new(3, 15),
            modes: BTreeSet::from(["Car".to_string(), "Scooter".to_string()]),
        };
        let first = apply(&store, &criteria).unwrap();
        let second = apply(&store, &criteria).unwrap();
        assert_eq!(first.indices(), second.indices());
    }

    #[test]
    fn truncated_bounds_admit_fractional_tail() {
        let store = RecordStore::from_records(vec![
            record(1, 3.0, 10.0, "Low", "Bike", "Sunny"),
            record(2, 3.999, 10.0, "Low", "Bike", "Sunny"),
            record(3, 4.0, 10.0, "Low", "Bike", "Sunny"),
            record(4, 4.5, 10.0, "Low", "Bike", "Sunny"),
        ])
        .unwrap();
        let criteria = FilterCriteria {
            distance: DistanceRange::new(3, 4),
            ..FilterCriteria::for_store(&store)
        };
        let ids: Vec<&str> = apply(&store, &criteria)
            .unwrap()
            .iter()
            .map(|r| r.order_id.as_str())
            .collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn degenerate_range_is_refused() {
        let store = hundred();
        let criteria = FilterCriteria {
            distance: DistanceRange::new(7, 7),
            ..FilterCriteria::for_store(&store)
        };
        assert_eq!(
            apply(&store, &criteria).unwrap_err(),
            InvalidFilterRange { bound: 7 }
        );
    }

    #[test]
    fn no_match_yields_empty_view() {
        let store = hundred();
        let criteria = FilterCriteria {
            distance: DistanceRange::new(50, 60),
            ..FilterCriteria::for_store(&store)
        };
        assert!(apply(&store, &criteria).unwrap().is_empty());
    }

    #[test]
    fn selector_parses_cli_values() {
        assert_eq!("all".parse::<TrafficSelector>(), Ok(TrafficSelector::All));
        assert_eq!(
            "Medium".parse::<TrafficSelector>(),
            Ok(TrafficSelector::Level(TrafficLevel::Medium))
        );
        assert!("Gridlock".parse::<TrafficSelector>().is_err());
    }
}
