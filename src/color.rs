use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::TrafficLevel;

/// Fill of the per-mode bar chart.
pub const BAR_COLOR: Color32 = Color32::from_rgb(255, 165, 0);

/// Fill of the delivery-time histogram.
pub const HISTOGRAM_FILL: Color32 = Color32::from_rgb(135, 206, 235);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Scatter colour per traffic level: green, yellow, red.
pub fn traffic_color(level: &TrafficLevel) -> Color32 {
    match level {
        TrafficLevel::Low => Color32::from_rgb(46, 160, 67),
        TrafficLevel::Medium => Color32::from_rgb(230, 200, 40),
        TrafficLevel::High => Color32::from_rgb(215, 48, 39),
        TrafficLevel::Other(_) => Color32::GRAY,
    }
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps the labels of a categorical column to distinct colours.
///
/// Built from the whole store's vocabulary so a category keeps its colour
/// while filters change.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new(labels: &[String]) -> Self {
        let palette = generate_palette(labels.len());
        let mapping: BTreeMap<String, Color32> = labels
            .iter()
            .cloned()
            .zip(palette)
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        let palette = generate_palette(4);
        assert_eq!(palette.len(), 4);
        for (i, a) in palette.iter().enumerate() {
            for b in &palette[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_label_falls_back_to_gray() {
        let map = ColorMap::new(&["Sunny".to_string(), "Rainy".to_string()]);
        assert_ne!(map.color_for("Sunny"), map.color_for("Rainy"));
        assert_eq!(map.color_for("Snow"), Color32::GRAY);
    }

    #[test]
    fn traffic_levels_have_fixed_colours() {
        assert_ne!(traffic_color(&TrafficLevel::Low), traffic_color(&TrafficLevel::High));
        assert_eq!(traffic_color(&TrafficLevel::Other("x".into())), Color32::GRAY);
    }
}
