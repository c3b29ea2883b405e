//! Write a synthetic sales export in the layout of the Amazon sale report.
//!
//! Usage: `generate_sample [OUTPUT]` where OUTPUT ends in `.csv` (default
//! `Amazon Sale Report.csv`) or `.parquet`.
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

const ORDERS: usize = 2_000;
const DAYS: i64 = 91;

/// City, state, latitude, longitude, relative order weight.
const CITIES: [(&str, &str, f64, f64, f64); 12] = [
    ("BENGALURU", "KARNATAKA", 12.97, 77.59, 9.0),
    ("HYDERABAD", "TELANGANA", 17.39, 78.49, 7.0),
    ("MUMBAI", "MAHARASHTRA", 19.08, 72.88, 7.0),
    ("NEW DELHI", "DELHI", 28.61, 77.21, 6.0),
    ("CHENNAI", "TAMIL NADU", 13.08, 80.27, 6.0),
    ("PUNE", "MAHARASHTRA", 18.52, 73.86, 5.0),
    ("KOLKATA", "WEST BENGAL", 22.57, 88.36, 4.0),
    ("GURUGRAM", "HARYANA", 28.46, 77.03, 3.0),
    ("THANE", "MAHARASHTRA", 19.22, 72.98, 2.0),
    ("LUCKNOW", "UTTAR PRADESH", 26.85, 80.95, 2.0),
    ("NOIDA", "UTTAR PRADESH", 28.54, 77.39, 2.0),
    ("AHMEDABAD", "GUJARAT", 23.02, 72.57, 2.0),
];

const STATUSES: [(&str, f64); 5] = [
    ("Shipped", 0.60),
    ("Shipped - Delivered to Buyer", 0.22),
    ("Cancelled", 0.12),
    ("Pending", 0.04),
    ("Shipped - Returned to Seller", 0.02),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Index drawn in proportion to `weights`.
    fn weighted(&mut self, weights: impl Iterator<Item = f64> + Clone) -> usize {
        let total: f64 = weights.clone().sum();
        let mut pick = self.next_f64() * total;
        let mut last = 0;
        for (i, w) in weights.enumerate() {
            if pick < w {
                return i;
            }
            pick -= w;
            last = i;
        }
        last
    }
}

/// One generated order, cells already rendered as the export writes them.
struct Order {
    order_id: String,
    date: String,
    status: &'static str,
    amount: Option<String>,
    city: &'static str,
    state: &'static str,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

fn generate(rng: &mut SimpleRng) -> Vec<Order> {
    let first_day = NaiveDate::from_ymd_opt(2022, 3, 31).unwrap_or_default();

    (0..ORDERS)
        .map(|i| {
            let day = first_day + Duration::days((rng.next_f64() * DAYS as f64) as i64);
            let (city, state, lat, lon, _) =
                CITIES[rng.weighted(CITIES.iter().map(|c| c.4))];
            let status = STATUSES[rng.weighted(STATUSES.iter().map(|s| s.1))].0;

            // Roughly 1% unreadable dates and 3% missing or junk amounts.
            let date = if rng.next_f64() < 0.01 {
                "unknown".to_string()
            } else {
                day.format("%m-%d-%y").to_string()
            };
            let roll = rng.next_f64();
            let amount = if roll < 0.02 {
                None
            } else if roll < 0.03 {
                Some("N/A".to_string())
            } else if status == "Cancelled" && roll < 0.5 {
                Some("0".to_string())
            } else {
                let value = rng.gauss(650.0, 280.0).max(199.0);
                Some(format!("{value:.2}"))
            };
            let located = rng.next_f64() > 0.02;

            Order {
                order_id: format!("171-{:07}-{:07}", i * 7919 % 9_999_999, i),
                date,
                status,
                amount,
                city,
                state,
                latitude: located.then(|| rng.gauss(lat, 0.05)),
                longitude: located.then(|| rng.gauss(lon, 0.05)),
            }
        })
        .collect()
}

fn write_csv(path: &Path, orders: &[Order]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record([
        "index", "Order ID", "Date", "Status", "Amount", "ship-city", "ship-state", "Latitude",
        "Longitude",
    ])?;
    for (i, o) in orders.iter().enumerate() {
        let coord = |v: Option<f64>| v.map(|v| format!("{v:.4}")).unwrap_or_default();
        writer.write_record([
            i.to_string(),
            o.order_id.clone(),
            o.date.clone(),
            o.status.to_string(),
            o.amount.clone().unwrap_or_default(),
            o.city.to_string(),
            o.state.to_string(),
            coord(o.latitude),
            coord(o.longitude),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, orders: &[Order]) -> Result<()> {
    let strings = |f: fn(&Order) -> Option<&str>| -> StringArray {
        orders.iter().map(f).collect()
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("Order ID", DataType::Utf8, false),
        Field::new("Date", DataType::Utf8, false),
        Field::new("Status", DataType::Utf8, false),
        Field::new("Amount", DataType::Utf8, true),
        Field::new("ship-city", DataType::Utf8, false),
        Field::new("ship-state", DataType::Utf8, false),
        Field::new("Latitude", DataType::Float64, true),
        Field::new("Longitude", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(strings(|o| Some(o.order_id.as_str()))),
            Arc::new(strings(|o| Some(o.date.as_str()))),
            Arc::new(strings(|o| Some(o.status))),
            Arc::new(strings(|o| o.amount.as_deref())),
            Arc::new(strings(|o| Some(o.city))),
            Arc::new(strings(|o| Some(o.state))),
            Arc::new(orders.iter().map(|o| o.latitude).collect::<Float64Array>()),
            Arc::new(orders.iter().map(|o| o.longitude).collect::<Float64Array>()),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Amazon Sale Report.csv".to_string());
    let path = Path::new(&output);

    let mut rng = SimpleRng::new(42);
    let orders = generate(&mut rng);

    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => write_csv(path, &orders)?,
        Some("parquet") => write_parquet(path, &orders)?,
        _ => bail!("output must end in .csv or .parquet: {output}"),
    }

    println!("Wrote {} orders to {output}", orders.len());
    Ok(())
}
