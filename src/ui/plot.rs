use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Points};

use crate::color::{traffic_color, ColorMap, BAR_COLOR, HISTOGRAM_FILL};
use crate::data::aggregate::{HistogramBin, ModeMean, NumericField, WeatherCount};
use crate::data::pipeline::TrafficSeries;

const CHART_HEIGHT: f32 = 300.0;

/// Placeholder drawn instead of a chart when the view is empty.
pub fn no_data(ui: &mut Ui) {
    ui.label(RichText::new("No data to display.").color(Color32::YELLOW));
}

// ---------------------------------------------------------------------------
// Weather pie chart
// ---------------------------------------------------------------------------

fn polar(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    center + egui::vec2(angle.cos(), -angle.sin()) * radius
}

/// Pie of weather shares, starting at 12 o'clock and running
/// counter-clockwise, each slice labelled with its percentage.
pub fn weather_pie(ui: &mut Ui, weather: &[WeatherCount], colors: &ColorMap) {
    let total: usize = weather.iter().map(|w| w.count).sum();
    if total == 0 {
        no_data(ui);
        return;
    }

    let size = ui.available_width().min(CHART_HEIGHT);
    let (response, painter) = ui.allocate_painter(egui::vec2(size, size), Sense::hover());
    let center = response.rect.center();
    let radius = size * 0.38;
    let text_color = ui.visuals().text_color();

    let mut start = FRAC_PI_2;
    for w in weather {
        let sweep = w.count as f32 / total as f32 * TAU;
        let fill = colors.color_for(&w.weather);

        // Triangle fan keeps every piece convex, even for slices over 180°.
        let steps = ((sweep / TAU) * 96.0).ceil().max(1.0) as usize;
        for k in 0..steps {
            let a0 = start + sweep * k as f32 / steps as f32;
            let a1 = start + sweep * (k + 1) as f32 / steps as f32;
            painter.add(Shape::convex_polygon(
                vec![center, polar(center, radius, a0), polar(center, radius, a1)],
                fill,
                Stroke::NONE,
            ));
        }

        let mid = start + sweep / 2.0;
        let share = 100.0 * w.count as f32 / total as f32;
        painter.text(
            polar(center, radius * 0.62, mid),
            Align2::CENTER_CENTER,
            format!("{share:.1}%"),
            FontId::proportional(12.0),
            Color32::BLACK,
        );
        painter.text(
            polar(center, radius * 1.18, mid),
            Align2::CENTER_CENTER,
            &w.weather,
            FontId::proportional(12.0),
            text_color,
        );
        start += sweep;
    }
}

// ---------------------------------------------------------------------------
// Delivery-time histogram
// ---------------------------------------------------------------------------

pub fn time_histogram(ui: &mut Ui, bins: &[HistogramBin]) {
    if bins.is_empty() {
        no_data(ui);
        return;
    }

    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            Bar::new((b.start + b.end) / 2.0, b.count as f64)
                .width(b.end - b.start)
                .fill(HISTOGRAM_FILL)
                .stroke(Stroke::new(1.0, Color32::BLACK))
                .name(format!("{:.1}–{:.1} min", b.start, b.end))
        })
        .collect();

    Plot::new("time_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("Minutes")
        .y_axis_label("Frequency")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Delivery time"));
        });
}

// ---------------------------------------------------------------------------
// Per-mode bar chart
// ---------------------------------------------------------------------------

/// Bars in the order given (ascending mean), one per mode.
pub fn mode_bar_chart(ui: &mut Ui, grouped: &[ModeMean], field: NumericField) {
    if grouped.is_empty() {
        no_data(ui);
        return;
    }

    let labels: Vec<String> = grouped.iter().map(|g| g.mode.clone()).collect();
    let bars: Vec<Bar> = grouped
        .iter()
        .enumerate()
        .map(|(i, g)| Bar::new(i as f64, g.mean).width(0.6).name(&g.mode))
        .collect();

    Plot::new("mode_bar_chart")
        .height(CHART_HEIGHT)
        .y_axis_label("Mean")
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .color(BAR_COLOR)
                    .name(format!("Mean {} per vehicle", field.label())),
            );
        });
}

// ---------------------------------------------------------------------------
// Distance vs. time scatter
// ---------------------------------------------------------------------------

pub fn traffic_scatter(ui: &mut Ui, series: &[TrafficSeries]) {
    if series.iter().all(|s| s.points.is_empty()) {
        no_data(ui);
        return;
    }

    Plot::new("traffic_scatter")
        .legend(Legend::default())
        .height(CHART_HEIGHT * 1.3)
        .x_axis_label("Distance (km)")
        .y_axis_label("Delivery time (min)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for s in series {
                let points = Points::new(PlotPoints::from(s.points.clone()))
                    .name(s.level.as_str())
                    .color(traffic_color(&s.level))
                    .radius(3.0);
                plot_ui.points(points);
            }
        });
}
