use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Error taxonomy for the data layer
// ---------------------------------------------------------------------------

/// Failure while loading the delivery table.  Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: {reason}")]
    Malformed { row: usize, reason: String },

    #[error("dataset contains no records")]
    Empty,

    #[error("every distance truncates to {bound} km; the distance filter needs a span of at least 1 km")]
    NarrowDistanceSpan { bound: i64 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DataLoadError {
    pub(crate) fn malformed(row: usize, reason: impl Into<String>) -> Self {
        DataLoadError::Malformed {
            row,
            reason: reason.into(),
        }
    }
}

/// The user picked a distance interval whose start equals its end.
///
/// Recoverable: only the current interaction's render is abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid distance range: start and end are both {bound} km")]
pub struct InvalidFilterRange {
    pub bound: i64,
}
