use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

const ROWS: usize = 1000;
const DEFAULT_OUTPUT: &str = "Food_Delivery_Route_Efficiency_Dataset.csv";

const TRAFFIC: [(&str, f64); 3] = [("Low", 1.0), ("Medium", 1.25), ("High", 1.6)];
const MODES: [(&str, f64); 4] = [("Bike", 4.0), ("Scooter", 3.0), ("Car", 2.6), ("Walk", 9.0)];
const WEATHER: [(&str, f64); 4] = [("Sunny", 1.0), ("Cloudy", 1.05), ("Rainy", 1.3), ("Foggy", 1.2)];
const ZONES: [&str; 6] = ["Centro", "Norte", "Sur", "Este", "Oeste", "Puerto"];

#[derive(Serialize)]
struct Row {
    order_id: usize,
    distance_km: f64,
    delivery_time_min: f64,
    traffic_level: &'static str,
    delivery_mode: &'static str,
    weather: &'static str,
    restaurant_zone: &'static str,
    customer_zone: &'static str,
}

/// Box-Muller transform for normal noise
fn gauss(rng: &mut StdRng, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen_range(1e-15..1.0);
    let u2: f64 = rng.gen();
    std_dev * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn pick<T: Copy>(rng: &mut StdRng, items: &[T]) -> T {
    items[rng.gen_range(0..items.len())]
}

fn main() -> Result<()> {
    let output_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    let mut rng = StdRng::seed_from_u64(42);

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;

    for order_id in 1..=ROWS {
        let (traffic_level, traffic_factor) = pick(&mut rng, &TRAFFIC);
        let (weather, weather_factor) = pick(&mut rng, &WEATHER);
        let (delivery_mode, min_per_km) = pick(&mut rng, &MODES);
        // Walkers only take short trips.
        let max_km = if delivery_mode == "Walk" { 3.0 } else { 20.0 };
        let distance_km: f64 = rng.gen_range(0.5..max_km);

        let base = 8.0 + distance_km * min_per_km;
        let time = base * traffic_factor * weather_factor + gauss(&mut rng, 3.0);

        writer.serialize(Row {
            order_id,
            distance_km: (distance_km * 100.0).round() / 100.0,
            delivery_time_min: time.max(5.0).round(),
            traffic_level,
            delivery_mode,
            weather,
            restaurant_zone: pick(&mut rng, &ZONES),
            customer_zone: pick(&mut rng, &ZONES),
        })?;
    }
    writer.flush()?;

    println!("Wrote {ROWS} delivery records to {output_path}");
    Ok(())
}
