//! Writes `sample_data.csv`: a synthetic daily sales table with numeric,
//! categorical and date columns and a sprinkling of missing values.

use anyhow::Context;
use chrono::{Duration, NaiveDate};

/// Deterministic splitmix64 stream; enough for synthetic data.
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Normal draw via Box-Muller.
    fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        let radius = (-2.0 * (1.0 - self.unit()).ln()).sqrt();
        let angle = std::f64::consts::TAU * self.unit();
        mean + sd * radius * angle.cos()
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// `value`, or an empty cell for roughly `rate` of the calls.
    fn sometimes_missing(&mut self, rate: f64, value: String) -> String {
        if self.unit() < rate {
            String::new()
        } else {
            value
        }
    }
}

const ROWS: i64 = 365;

fn main() -> anyhow::Result<()> {
    let mut rng = SampleRng(42);

    let regions = ["north", "south", "east", "west"];
    let products = ["widget", "gadget", "gizmo"];
    // North sells a little more, so the group comparison has something to find.
    let region_lift = |region: &str| match region {
        "north" => 8.0,
        "south" => 0.0,
        "east" => 3.0,
        _ => -2.0,
    };

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).context("invalid start date")?;
    let output_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("failed to create {output_path}"))?;
    writer.write_record([
        "date", "region", "product", "units", "price", "discount", "revenue", "promo",
    ])?;

    // Rows are written out of date order; the time-series view sorts them.
    for i in 0..ROWS {
        let day = start + Duration::days((i * 7) % ROWS);
        let region = rng.pick(&regions);
        let product = rng.pick(&products);

        let season = (i as f64 / ROWS as f64 * std::f64::consts::TAU).sin() * 5.0;
        let units = (40.0 + region_lift(region) + season + rng.normal(0.0, 6.0))
            .round()
            .max(0.0);
        let price = (9.99 + rng.normal(0.0, 1.5)).max(1.0);
        let discount = (rng.unit() * 0.3 * 100.0).round() / 100.0;
        let revenue = units * price * (1.0 - discount);
        let promo = if rng.unit() < 0.2 { "True" } else { "False" };

        let record = [
            day.format("%Y-%m-%d").to_string(),
            region.to_string(),
            rng.sometimes_missing(0.03, product.to_string()),
            format!("{units:.0}"),
            rng.sometimes_missing(0.05, format!("{price:.2}")),
            rng.sometimes_missing(0.08, format!("{discount:.2}")),
            format!("{revenue:.2}"),
            promo.to_string(),
        ];
        writer.write_record(&record)?;
    }
    writer.flush()?;

    println!("Wrote {ROWS} rows to {output_path}");
    Ok(())
}
