//! CSV strategy-output adapter.
//!
//! One file per asset, resolved as `<base_path>/<file_pattern>` with `{asset}`
//! replaced by the asset code. Columns are looked up by header name, so their
//! order does not matter and extra columns are ignored.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

use crate::domain::asset::Asset;
use crate::domain::config_validation::{Settings, DEFAULT_FILE_PATTERN};
use crate::domain::error::DashboardError;
use crate::domain::series::RawSeries;
use crate::domain::time_point::{Position, RawRecord};
use crate::ports::series_port::SeriesPort;

pub const REQUIRED_COLUMNS: [&str; 5] = [
    "Datetime",
    "Price",
    "Position",
    "Portfolio_Value",
    "Daily_Return",
];

/// Cell spellings treated as a missing value.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

pub struct CsvAdapter {
    base_path: PathBuf,
    file_pattern: String,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self::with_pattern(base_path, DEFAULT_FILE_PATTERN)
    }

    pub fn with_pattern(base_path: PathBuf, file_pattern: impl Into<String>) -> Self {
        Self {
            base_path,
            file_pattern: file_pattern.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_pattern(settings.data_dir.clone(), settings.file_pattern.clone())
    }

    pub fn csv_path(&self, asset: Asset) -> PathBuf {
        self.base_path
            .join(self.file_pattern.replace("{asset}", asset.code()))
    }
}

impl SeriesPort for CsvAdapter {
    fn load(&self, asset: Asset) -> Result<RawSeries, DashboardError> {
        let path = self.csv_path(asset);
        let file = fs::File::open(&path).map_err(|e| DashboardError::SourceUnavailable {
            asset,
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let series = parse_records(asset, file).map_err(|e| match e {
            DashboardError::SourceUnavailable { asset, reason, .. } => {
                DashboardError::SourceUnavailable {
                    asset,
                    path: path.display().to_string(),
                    reason,
                }
            }
            other => other,
        })?;
        tracing::debug!(
            asset = %asset,
            path = %path.display(),
            rows = series.records.len(),
            "loaded strategy output"
        );
        Ok(series)
    }

    fn describe(&self, asset: Asset) -> String {
        self.csv_path(asset).display().to_string()
    }
}

struct Columns {
    datetime: usize,
    price: usize,
    position: usize,
    portfolio_value: usize,
    daily_return: usize,
}

fn locate_columns(asset: Asset, headers: &StringRecord) -> Result<Columns, DashboardError> {
    let found: Vec<Option<usize>> = REQUIRED_COLUMNS
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == *name)
        })
        .collect();

    match found.as_slice() {
        [
            Some(datetime),
            Some(price),
            Some(position),
            Some(portfolio_value),
            Some(daily_return),
        ] => Ok(Columns {
            datetime: *datetime,
            price: *price,
            position: *position,
            portfolio_value: *portfolio_value,
            daily_return: *daily_return,
        }),
        _ => Err(DashboardError::SchemaMismatch {
            asset,
            missing: REQUIRED_COLUMNS
                .iter()
                .zip(&found)
                .filter(|(_, idx)| idx.is_none())
                .map(|(name, _)| name.to_string())
                .collect(),
        }),
    }
}

/// Parse a whole CSV document for `asset`. Rows keep their source order.
pub fn parse_records<R: Read>(asset: Asset, reader: R) -> Result<RawSeries, DashboardError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| DashboardError::SourceUnavailable {
            asset,
            path: "<header>".into(),
            reason: format!("CSV header error: {e}"),
        })?
        .clone();
    let columns = locate_columns(asset, &headers)?;

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| DashboardError::MalformedRecord {
            asset,
            line: e.position().map(|p| p.line()).unwrap_or(0),
            reason: format!("CSV parse error: {e}"),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        records.push(parse_row(asset, line, &record, &columns)?);
    }

    Ok(RawSeries::new(asset, records))
}

fn parse_row(
    asset: Asset,
    line: u64,
    record: &StringRecord,
    columns: &Columns,
) -> Result<RawRecord, DashboardError> {
    let malformed = |reason: String| DashboardError::MalformedRecord {
        asset,
        line,
        reason,
    };
    let cell = |idx: usize| record.get(idx).unwrap_or("");

    let datetime_str = cell(columns.datetime);
    let timestamp = parse_datetime(datetime_str)
        .ok_or_else(|| malformed(format!("invalid Datetime '{datetime_str}'")))?;

    let price = parse_number(cell(columns.price)).map_err(|v| malformed(format!("invalid Price '{v}'")))?;
    let portfolio_value = parse_number(cell(columns.portfolio_value))
        .map_err(|v| malformed(format!("invalid Portfolio_Value '{v}'")))?;
    let daily_return = parse_number(cell(columns.daily_return))
        .map_err(|v| malformed(format!("invalid Daily_Return '{v}'")))?;

    let position_str = cell(columns.position);
    let position = match parse_number(position_str) {
        Ok(None) => None,
        Ok(Some(v)) => Some(
            Position::from_value(v)
                .ok_or_else(|| malformed(format!("Position must be -1, 0 or 1, got '{position_str}'")))?,
        ),
        Err(v) => return Err(malformed(format!("invalid Position '{v}'"))),
    };

    Ok(RawRecord {
        timestamp,
        price,
        position,
        portfolio_value,
        daily_return,
    })
}

fn is_missing(cell: &str) -> bool {
    NA_VALUES.contains(&cell)
}

/// `Ok(None)` for a missing cell, `Err(cell)` when it is not a number.
fn parse_number(cell: &str) -> Result<Option<f64>, String> {
    if is_missing(cell) {
        return Ok(None);
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(cell.to_string()),
    }
}

pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if is_missing(s) {
        return None;
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.naive_utc());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
