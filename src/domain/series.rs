//! Raw and normalized per-asset series, and the normalizer between them.
//!
//! Normalization is a pure `RawSeries -> Series` transformation:
//! 1. stable sort by timestamp
//! 2. drop duplicate timestamps, keeping the first occurrence
//! 3. forward-fill then back-fill `price`
//! 4. forward-fill then back-fill `portfolio_value`
//! 5. default missing `position` to flat
//!
//! A column with no values at all cannot be filled and is reported as
//! [`DashboardError::InsufficientData`].
//!
//! [`portfolio_curve`] applies steps 1, 2 and 4 only, for charts that need
//! nothing but portfolio value.

use chrono::NaiveDateTime;

use super::asset::Asset;
use super::error::DashboardError;
use super::time_point::{RawRecord, TimePoint};

/// Records exactly as the loader produced them (file order, gaps allowed).
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub asset: Asset,
    pub records: Vec<RawRecord>,
}

impl RawSeries {
    pub fn new(asset: Asset, records: Vec<RawRecord>) -> Self {
        Self { asset, records }
    }
}

/// A cleaned series: strictly ascending timestamps, no gaps in price or
/// portfolio value. Only constructed by [`normalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    asset: Asset,
    points: Vec<TimePoint>,
}

impl Series {
    pub fn asset(&self) -> Asset {
        self.asset
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&TimePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TimePoint> {
        self.points.last()
    }

    /// First and last timestamp.
    pub fn range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.first()?.timestamp, self.last()?.timestamp))
    }

    pub fn portfolio_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.portfolio_value)
    }

    /// Non-missing daily returns in time order.
    pub fn daily_returns(&self) -> Vec<f64> {
        self.points.iter().filter_map(|p| p.daily_return).collect()
    }

    /// Back to raw form, so the normalizer can be applied again.
    pub fn to_raw(&self) -> RawSeries {
        RawSeries::new(self.asset, self.points.iter().map(RawRecord::from).collect())
    }
}

/// What the normalizer had to repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeStats {
    pub input_records: usize,
    pub duplicates_dropped: usize,
    pub prices_filled: usize,
    pub portfolio_values_filled: usize,
    pub positions_defaulted: usize,
}

pub fn normalize(raw: RawSeries) -> Result<Series, DashboardError> {
    normalize_with_stats(raw).map(|(series, _)| series)
}

pub fn normalize_with_stats(raw: RawSeries) -> Result<(Series, NormalizeStats), DashboardError> {
    let RawSeries { asset, mut records } = raw;
    let mut stats = NormalizeStats {
        input_records: records.len(),
        ..NormalizeStats::default()
    };

    sort_unique(asset, &mut records)?;
    stats.duplicates_dropped = stats.input_records - records.len();

    let mut prices: Vec<Option<f64>> = records.iter().map(|r| r.price).collect();
    stats.prices_filled = fill_forward(&mut prices) + fill_backward(&mut prices);
    let prices = complete_column(prices, asset, "Price")?;

    let mut values: Vec<Option<f64>> = records.iter().map(|r| r.portfolio_value).collect();
    stats.portfolio_values_filled = fill_forward(&mut values) + fill_backward(&mut values);
    let values = complete_column(values, asset, "Portfolio_Value")?;

    let points = records
        .iter()
        .zip(prices)
        .zip(values)
        .map(|((record, price), portfolio_value)| {
            if record.position.is_none() {
                stats.positions_defaulted += 1;
            }
            TimePoint {
                timestamp: record.timestamp,
                price,
                position: record.position.unwrap_or_default(),
                portfolio_value,
                daily_return: record.daily_return,
            }
        })
        .collect();

    tracing::debug!(
        asset = %asset,
        rows = stats.input_records,
        duplicates = stats.duplicates_dropped,
        prices_filled = stats.prices_filled,
        values_filled = stats.portfolio_values_filled,
        positions_defaulted = stats.positions_defaulted,
        "normalized series"
    );

    Ok((Series { asset, points }, stats))
}

/// Sorted, deduplicated, gap-filled portfolio values of `raw`. Price and
/// position are ignored, so a series with no usable price still has a curve.
pub fn portfolio_curve(raw: &RawSeries) -> Result<Vec<(NaiveDateTime, f64)>, DashboardError> {
    let mut records = raw.records.clone();
    sort_unique(raw.asset, &mut records)?;

    let mut values: Vec<Option<f64>> = records.iter().map(|r| r.portfolio_value).collect();
    fill_forward(&mut values);
    fill_backward(&mut values);
    let values = complete_column(values, raw.asset, "Portfolio_Value")?;

    Ok(records.iter().map(|r| r.timestamp).zip(values).collect())
}

fn sort_unique(asset: Asset, records: &mut Vec<RawRecord>) -> Result<(), DashboardError> {
    if records.is_empty() {
        return Err(DashboardError::InsufficientData {
            asset,
            reason: "no records".into(),
        });
    }

    // sort_by_key is stable, so dedup keeps the earliest row in file order
    records.sort_by_key(|r| r.timestamp);
    records.dedup_by_key(|r| r.timestamp);
    Ok(())
}

/// Propagate the last seen value into following gaps. Returns cells filled.
fn fill_forward(values: &mut [Option<f64>]) -> usize {
    let mut filled = 0;
    let mut last = None;
    for slot in values.iter_mut() {
        match slot {
            Some(v) => last = Some(*v),
            None => {
                if last.is_some() {
                    *slot = last;
                    filled += 1;
                }
            }
        }
    }
    filled
}

/// Propagate the next seen value into preceding gaps. Returns cells filled.
fn fill_backward(values: &mut [Option<f64>]) -> usize {
    let mut filled = 0;
    let mut next = None;
    for slot in values.iter_mut().rev() {
        match slot {
            Some(v) => next = Some(*v),
            None => {
                if next.is_some() {
                    *slot = next;
                    filled += 1;
                }
            }
        }
    }
    filled
}

fn complete_column(
    values: Vec<Option<f64>>,
    asset: Asset,
    column: &str,
) -> Result<Vec<f64>, DashboardError> {
    values
        .into_iter()
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| DashboardError::InsufficientData {
            asset,
            reason: format!("{column} column has no values"),
        })
}
