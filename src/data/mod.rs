/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RecordStore (once per session)
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ RecordStore │  Vec<Record>, mode vocabulary, distance bounds
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  traffic ∧ distance ∧ mode → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  summary, per-mode means, weather counts, partitions
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ pipeline  │  one interaction → Dashboard
///   └──────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
