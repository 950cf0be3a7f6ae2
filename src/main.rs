mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use app::DashboardApp;
use clap::Parser;
use eframe::egui;

use config::DashboardConfig;
use data::aggregate::NumericField;
use data::filter::{DistanceRange, FilterCriteria, TrafficSelector};
use data::model::RecordStore;
use data::pipeline::run_pipeline;
use state::AppState;

/// Food-delivery route efficiency dashboard
#[derive(Parser, Debug)]
#[command(name = "delivery-dashboard")]
#[command(about = "Filter and chart food-delivery records", long_about = None)]
#[command(version)]
struct Args {
    /// Delivery table to load (.csv, .tsv, .parquet, .json)
    #[arg(short, long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// Path to a TOML settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the dashboard as JSON instead of opening a window
    #[arg(long)]
    report: bool,

    /// Traffic level for --report: All, Low, Medium or High
    #[arg(long, default_value = "All")]
    traffic: TrafficSelector,

    /// Lower distance bound for --report (default: dataset minimum)
    #[arg(long, value_name = "KM")]
    min_km: Option<i64>,

    /// Upper distance bound for --report (default: dataset maximum)
    #[arg(long, value_name = "KM")]
    max_km: Option<i64>,

    /// Delivery mode to keep for --report (can be repeated; default: all)
    #[arg(long = "mode", value_name = "MODE")]
    modes: Vec<String>,

    /// Field averaged per mode: delivery_time_min or distance_km
    #[arg(long, default_value = "delivery_time_min")]
    compare: NumericField,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(data) = &args.data {
        config.data_path = data.clone();
    }

    // Loaded once; every interaction reuses this handle.
    let store = match data::loader::load_file(&config.data_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::error!("Failed to load {:?}: {e}", config.data_path);
            return Err(e).with_context(|| format!("loading {:?}", config.data_path));
        }
    };
    log::info!(
        "Loaded {} orders from {:?} with modes {:?}",
        store.len(),
        config.data_path,
        store.delivery_modes()
    );

    if args.report {
        print_report(&store, &args, &config)
    } else {
        run_gui(store, config)
    }
}

/// Headless mode - run the pipeline once and print the result as JSON
fn print_report(store: &RecordStore, args: &Args, config: &DashboardConfig) -> Result<()> {
    let defaults = FilterCriteria::for_store(store);
    let criteria = FilterCriteria {
        traffic: args.traffic.clone(),
        distance: DistanceRange::new(
            args.min_km.unwrap_or(defaults.distance.min),
            args.max_km.unwrap_or(defaults.distance.max),
        ),
        modes: if args.modes.is_empty() {
            defaults.modes
        } else {
            args.modes.iter().cloned().collect()
        },
    };

    let dashboard = match run_pipeline(store, &criteria, args.compare, config.histogram_bins) {
        Ok(dashboard) => dashboard,
        Err(e) => {
            log::warn!("{e}");
            anyhow::bail!("Please select a valid distance range: {e}");
        }
    };

    println!("{}", serde_json::to_string_pretty(&dashboard)?);
    Ok(())
}

fn run_gui(store: Arc<RecordStore>, config: DashboardConfig) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let state = AppState::new(store, config.data_path, config.histogram_bins);

    eframe::run_native(
        "Delivery Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
