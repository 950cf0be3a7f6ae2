//! Dashboard settings (optional `dashboard.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::pipeline::DEFAULT_HISTOGRAM_BINS;

/// Default input table name.
pub const DEFAULT_DATA_PATH: &str = "Food_Delivery_Route_Efficiency_Dataset.csv";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DashboardConfig {
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
    #[serde(default = "default_window_width")]
    pub window_width: f32,
    #[serde(default = "default_window_height")]
    pub window_height: f32,
}

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

fn default_histogram_bins() -> usize {
    DEFAULT_HISTOGRAM_BINS
}

fn default_window_width() -> f32 {
    1200.0
}

fn default_window_height() -> f32 {
    800.0
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            histogram_bins: default_histogram_bins(),
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

/// Load settings from a TOML file.
pub fn load_config(path: &Path) -> Result<DashboardConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: DashboardConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    anyhow::ensure!(config.histogram_bins > 0, "histogram_bins must be at least 1");

    Ok(config)
}
