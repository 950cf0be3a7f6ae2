use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::TrafficSelector;
use crate::data::model::TrafficLevel;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🎛 Global filters");
    ui.separator();

    // The store handle is cloned so the state can be mutated while we
    // iterate its vocabularies.
    let store = Arc::clone(&state.store);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Traffic level ----
            ui.strong("Traffic level:");
            let mut traffic = state.criteria.traffic.clone();
            ui.radio_value(&mut traffic, TrafficSelector::All, "All");
            for level in TrafficLevel::KNOWN {
                let label = level.to_string();
                ui.radio_value(&mut traffic, TrafficSelector::Level(level), label);
            }
            if traffic != state.criteria.traffic {
                state.set_traffic(traffic);
            }
            ui.separator();

            // ---- Distance range ----
            ui.strong("Distance range (km):");
            let (lo, hi) = store.distance_bounds();
            let current = state.criteria.distance;
            let (mut min, mut max) = (current.min, current.max);
            let min_changed = ui
                .add(egui::Slider::new(&mut min, lo..=hi).text("from"))
                .changed();
            let max_changed = ui
                .add(egui::Slider::new(&mut max, lo..=hi).text("to"))
                .changed();
            // The two handles behave like one range slider: they never cross.
            if min_changed && min > max {
                max = min;
            }
            if max_changed && max < min {
                min = max;
            }
            if (min, max) != (current.min, current.max) {
                state.set_distance(min, max);
            }

            if let Err(e) = state.criteria.validate() {
                ui.label(
                    RichText::new(format!(
                        "⚠ Please select a valid distance range (start and end cannot be equal). {e}."
                    ))
                    .color(Color32::YELLOW),
                );
                return;
            }
            ui.separator();

            // ---- Delivery modes ----
            let n_selected = state.criteria.modes.len();
            let n_total = store.delivery_modes().len();
            ui.strong(format!("Vehicles  ({n_selected}/{n_total})"));
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_modes();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_modes();
                }
            });
            for mode in store.delivery_modes() {
                let mut checked = state.criteria.modes.contains(mode);
                if ui.checkbox(&mut checked, mode.as_str()).changed() {
                    state.toggle_mode(mode);
                }
            }
            if state.criteria.modes.is_empty() {
                ui.label(RichText::new("No vehicle selected: every vehicle is shown.").small());
            }

            ui.separator();
            ui.label(RichText::new("ℹ Adjust the filters to update the charts.").weak());
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let visible = state
            .dashboard
            .as_ref()
            .map(|d| d.summary.count.to_string())
            .unwrap_or_else(|_| "–".to_string());
        ui.label(format!(
            "{} orders loaded from {}, {} visible",
            state.store.len(),
            state.source.display(),
            visible
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open delivery data")
        .add_filter("Supported files", &["csv", "tsv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv", "tsv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(store) => {
                log::info!(
                    "Loaded {} orders from {:?} with modes {:?}",
                    store.len(),
                    path,
                    store.delivery_modes()
                );
                state.set_store(Arc::new(store), path);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
