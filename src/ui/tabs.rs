use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::NumericField;
use crate::data::pipeline::Dashboard;
use crate::state::AppState;
use crate::ui::plot;

fn format_mean(value: f64, unit: &str) -> String {
    if value.is_nan() {
        "no data".to_string()
    } else {
        format!("{value:.2} {unit}")
    }
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.label(RichText::new(label).small());
    ui.heading(value);
}

// ---------------------------------------------------------------------------
// Overview: headline metrics, weather pie, delivery-time histogram
// ---------------------------------------------------------------------------

pub fn overview_tab(ui: &mut Ui, state: &AppState, dash: &Dashboard) {
    ui.heading("Key metrics");
    if dash.is_empty() {
        ui.label(RichText::new("No orders match the current filters.").weak());
    }
    ui.columns(3, |cols| {
        metric(&mut cols[0], "Total orders", dash.summary.count.to_string());
        metric(
            &mut cols[1],
            "Average time",
            format_mean(dash.summary.mean_time, "min"),
        );
        metric(
            &mut cols[2],
            "Average distance",
            format_mean(dash.summary.mean_distance, "km"),
        );
    });
    ui.separator();

    ui.columns(2, |cols| {
        cols[0].strong("Distribution by weather");
        plot::weather_pie(&mut cols[0], &dash.weather, &state.weather_colors);

        cols[1].strong("Delivery time histogram");
        plot::time_histogram(&mut cols[1], &dash.histogram);
    });
}

// ---------------------------------------------------------------------------
// Fleet: compare field, per-mode bar chart, detail table
// ---------------------------------------------------------------------------

pub fn fleet_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Performance by vehicle type");

    let mut field = state.compare_field;
    egui::ComboBox::from_label("What do you want to compare?")
        .selected_text(field.label())
        .show_ui(ui, |ui: &mut Ui| {
            for option in NumericField::ALL {
                ui.selectable_value(&mut field, option, option.label());
            }
        });
    if field != state.compare_field {
        state.set_compare_field(field);
    }

    let Ok(dash) = &state.dashboard else {
        return;
    };

    plot::mode_bar_chart(ui, &dash.grouped, dash.compare_field);

    egui::CollapsingHeader::new("Fleet detail")
        .id_salt("fleet_detail")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .column(Column::auto().at_least(120.0))
                .column(Column::remainder())
                .header(20.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("delivery_mode");
                    });
                    header.col(|ui| {
                        ui.strong(dash.compare_field.column_name());
                    });
                })
                .body(|mut body| {
                    for g in &dash.grouped {
                        body.row(18.0, |mut row| {
                            row.col(|ui| {
                                ui.label(&g.mode);
                            });
                            row.col(|ui| {
                                ui.label(format!("{:.4}", g.mean));
                            });
                        });
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Routes: distance vs. time scatter, random order
// ---------------------------------------------------------------------------

pub fn routes_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Distance vs. delivery time");

    if let Ok(dash) = &state.dashboard {
        plot::traffic_scatter(ui, &dash.traffic);

        if dash.untracked_traffic > 0 {
            ui.label(
                RichText::new(format!(
                    "{} orders with an unrecognised traffic level are not plotted.",
                    dash.untracked_traffic
                ))
                .small(),
            );
        }
    }

    ui.separator();

    if ui.button("🎲 Show a random order").clicked() {
        state.draw_random_order(&mut rand::thread_rng());
    }
    if let Some(order) = &state.random_order {
        ui.label(RichText::new(order).color(Color32::from_rgb(46, 160, 67)));
    }
}
