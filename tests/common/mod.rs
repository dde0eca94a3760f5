#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use stratdash::domain::asset::Asset;
use stratdash::domain::error::DashboardError;
use stratdash::domain::series::RawSeries;
pub use stratdash::domain::time_point::{Position, RawRecord};
use stratdash::ports::series_port::SeriesPort;

pub const CSV_HEADER: &str = "Datetime,Price,Position,Portfolio_Value,Daily_Return";

pub struct MockSeriesPort {
    pub data: HashMap<Asset, Vec<RawRecord>>,
    pub errors: HashMap<Asset, String>,
}

impl MockSeriesPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_records(mut self, asset: Asset, records: Vec<RawRecord>) -> Self {
        self.data.insert(asset, records);
        self
    }

    pub fn with_error(mut self, asset: Asset, reason: &str) -> Self {
        self.errors.insert(asset, reason.to_string());
        self
    }
}

impl SeriesPort for MockSeriesPort {
    fn load(&self, asset: Asset) -> Result<RawSeries, DashboardError> {
        if let Some(reason) = self.errors.get(&asset) {
            return Err(DashboardError::SourceUnavailable {
                asset,
                path: self.describe(asset),
                reason: reason.clone(),
            });
        }
        Ok(RawSeries::new(
            asset,
            self.data.get(&asset).cloned().unwrap_or_default(),
        ))
    }

    fn describe(&self, asset: Asset) -> String {
        format!("mock://{asset}")
    }
}

pub fn day(offset: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::days(offset)
}

pub fn make_record(offset: i64, price: f64, position: i8, value: f64) -> RawRecord {
    RawRecord {
        timestamp: day(offset),
        price: Some(price),
        position: Position::from_value(position as f64),
        portfolio_value: Some(value),
        daily_return: None,
    }
}

/// Build a complete daily series; returns are derived from consecutive values.
pub fn generate_records(prices: &[f64], positions: &[i8], values: &[f64]) -> Vec<RawRecord> {
    assert_eq!(prices.len(), positions.len());
    assert_eq!(prices.len(), values.len());
    (0..prices.len())
        .map(|i| {
            let mut r = make_record(i as i64, prices[i], positions[i], values[i]);
            r.daily_return = Some(if i == 0 {
                0.0
            } else {
                values[i] / values[i - 1] - 1.0
            });
            r
        })
        .collect()
}

/// A varied BTC/ETH pair that produces every transition kind.
pub fn sample_port() -> MockSeriesPort {
    let positions = [0, 0, 1, 1, 0, -1, 0, 1];
    let btc = generate_records(
        &[40_000.0, 41_000.0, 42_000.0, 39_000.0, 43_000.0, 44_000.0, 42_000.0, 45_000.0],
        &positions,
        &[100_000.0, 100_000.0, 100_000.0, 92_857.0, 102_381.0, 102_381.0, 107_035.0, 107_035.0],
    );
    let eth = generate_records(
        &[2_000.0, 2_100.0, 2_050.0, 2_200.0, 2_300.0, 2_250.0, 2_400.0, 2_350.0],
        &positions,
        &[100_000.0, 100_000.0, 100_000.0, 107_317.0, 112_195.0, 112_195.0, 104_878.0, 104_878.0],
    );
    MockSeriesPort::new()
        .with_records(Asset::Btc, btc)
        .with_records(Asset::Eth, eth)
}

pub fn write_csv(dir: &Path, file_name: &str, rows: &[&str]) {
    let mut file = std::fs::File::create(dir.join(file_name)).unwrap();
    writeln!(file, "{CSV_HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
}

pub const BTC_ROWS: [&str; 6] = [
    "2024-01-01 00:00:00,40000,0,100000,0.0",
    "2024-01-02 00:00:00,41000,1,100000,0.0",
    "2024-01-03 00:00:00,42000,1,102439,0.02439",
    "2024-01-04 00:00:00,40000,0,97561,-0.04762",
    "2024-01-05 00:00:00,39000,-1,97561,0.0",
    "2024-01-06 00:00:00,38000,0,100063,0.02564",
];

pub const ETH_ROWS: [&str; 6] = [
    "2024-01-01 00:00:00,2000,0,100000,0.0",
    "2024-01-02 00:00:00,2100,1,100000,0.0",
    "2024-01-03 00:00:00,2200,1,104762,0.04762",
    "2024-01-04 00:00:00,2150,0,102381,-0.02273",
    "2024-01-05 00:00:00,2100,0,102381,0.0",
    "2024-01-06 00:00:00,2300,0,102381,0.0",
];
