//! Performance metrics: buy-and-hold reference, drawdown, Sharpe.

use super::error::DashboardError;
use super::series::Series;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Notional capital used for the buy-and-hold reference when not configured.
pub const DEFAULT_CAPITAL: f64 = 100_000.0;

/// The four headline numbers of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceSummary {
    pub final_value: f64,
    /// `None` when the first price is not positive.
    pub buy_hold_value: Option<f64>,
    /// `None` when the return series is degenerate.
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: f64,
}

/// Curves and summary derived from one normalized series.
#[derive(Debug, Clone, PartialEq)]
pub struct Performance {
    pub buy_hold: Option<Vec<f64>>,
    pub drawdown: Vec<f64>,
    pub summary: PerformanceSummary,
}

impl Performance {
    pub fn compute(series: &Series, capital: f64) -> Result<Self, DashboardError> {
        let buy_hold = match buy_and_hold(series, capital) {
            Ok(curve) => Some(curve),
            Err(e) => {
                tracing::warn!(asset = %series.asset(), "buy-and-hold undefined: {e}");
                None
            }
        };
        let drawdown = drawdown_curve(series.portfolio_values());

        let final_value = series
            .last()
            .map(|p| p.portfolio_value)
            .ok_or_else(|| DashboardError::DegenerateSeries {
                reason: "series is empty".into(),
            })?;
        let buy_hold_value = buy_hold.as_ref().and_then(|curve| curve.last().copied());

        let sharpe_ratio = match sharpe_ratio(&series.daily_returns()) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(asset = %series.asset(), "sharpe ratio undefined: {e}");
                None
            }
        };

        let summary = PerformanceSummary {
            final_value,
            buy_hold_value,
            sharpe_ratio,
            max_drawdown: max_drawdown(&drawdown),
        };

        Ok(Performance {
            buy_hold,
            drawdown,
            summary,
        })
    }
}

/// `capital * price[i] / price[0]` for every point.
pub fn buy_and_hold(series: &Series, capital: f64) -> Result<Vec<f64>, DashboardError> {
    let base = match series.first() {
        Some(p) if p.price > 0.0 => p.price,
        Some(p) => {
            return Err(DashboardError::DegenerateSeries {
                reason: format!("initial price {} is not positive", p.price),
            });
        }
        None => {
            return Err(DashboardError::DegenerateSeries {
                reason: "series is empty".into(),
            });
        }
    };

    Ok(series
        .points()
        .iter()
        .map(|p| capital * p.price / base)
        .collect())
}

/// `value[i] / running_max(value[..=i]) - 1`; zero at every new high.
pub fn drawdown_curve<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut peak = f64::NEG_INFINITY;
    values
        .into_iter()
        .map(|v| {
            if v >= peak {
                peak = v;
                0.0
            } else if peak > 0.0 {
                v / peak - 1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Deepest point of a drawdown curve, 0 if it never dips.
pub fn max_drawdown(drawdown: &[f64]) -> f64 {
    drawdown.iter().copied().fold(0.0, f64::min)
}

/// Annualized `mean / sample_stddev * sqrt(252)`.
pub fn sharpe_ratio(returns: &[f64]) -> Result<f64, DashboardError> {
    if returns.len() < 2 {
        return Err(DashboardError::DegenerateSeries {
            reason: format!("need at least 2 daily returns, have {}", returns.len()),
        });
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    // Rounding in the mean leaves a residue of ~1e-17 for constant returns.
    let constant = returns.iter().all(|r| *r == returns[0]);
    if constant || !stddev.is_finite() || stddev <= f64::EPSILON * mean.abs().max(1.0) {
        return Err(DashboardError::DegenerateSeries {
            reason: "daily returns have zero variance".into(),
        });
    }

    Ok(mean / stddev * TRADING_DAYS_PER_YEAR.sqrt())
}

/// `$1,234.56`
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

/// Fraction as a percentage with two decimals: `-0.25` -> `-25.00%`.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Currency, or `n/a` when undefined.
pub fn format_optional_currency(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), format_currency)
}

/// Sharpe with two decimals, or `n/a` when undefined.
pub fn format_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::asset::Asset;
    use crate::domain::series::{normalize, RawSeries};
    use crate::domain::time_point::{Position, RawRecord};
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn make_series(prices: &[f64], values: &[f64], returns: &[f64]) -> Series {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let records = (0..prices.len())
            .map(|i| RawRecord {
                timestamp: start + Duration::days(i as i64),
                price: Some(prices[i]),
                position: Some(Position::Flat),
                portfolio_value: Some(values[i]),
                daily_return: returns.get(i).copied(),
            })
            .collect();
        normalize(RawSeries::new(Asset::Btc, records)).unwrap()
    }

    #[test]
    fn buy_and_hold_scales_capital_by_price() {
        let series = make_series(&[100.0, 110.0, 90.0], &[1.0, 1.0, 1.0], &[]);
        let bh = buy_and_hold(&series, 100_000.0).unwrap();
        assert_relative_eq!(bh[0], 100_000.0);
        assert_relative_eq!(bh[1], 110_000.0);
        assert_relative_eq!(bh[2], 90_000.0);
    }

    #[test]
    fn buy_and_hold_rejects_non_positive_base_price() {
        let series = make_series(&[0.0, 10.0], &[1.0, 1.0], &[]);
        let err = buy_and_hold(&series, 100_000.0).unwrap_err();
        assert!(matches!(err, DashboardError::DegenerateSeries { .. }));
    }

    #[test]
    fn drawdown_curve_against_running_peak() {
        let dd = drawdown_curve([100_000.0, 120_000.0, 90_000.0, 150_000.0]);
        assert_eq!(dd.len(), 4);
        assert_relative_eq!(dd[0], 0.0);
        assert_relative_eq!(dd[1], 0.0);
        assert_relative_eq!(dd[2], -0.25);
        assert_relative_eq!(dd[3], 0.0);
        assert_relative_eq!(max_drawdown(&dd), -0.25);
    }

    #[test]
    fn drawdown_zero_at_equal_high() {
        let dd = drawdown_curve([100.0, 80.0, 100.0]);
        assert_relative_eq!(dd[1], -0.2);
        assert_eq!(dd[2], 0.0);
    }

    #[test]
    fn max_drawdown_of_rising_curve_is_zero() {
        let dd = drawdown_curve([1.0, 2.0, 3.0]);
        assert_eq!(max_drawdown(&dd), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn sharpe_uses_sample_stddev() {
        // mean 0.02, sample stddev 0.01
        let sharpe = sharpe_ratio(&[0.01, 0.02, 0.03]).unwrap();
        assert_relative_eq!(sharpe, 2.0 * 252.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn sharpe_negative_for_losing_returns() {
        let sharpe = sharpe_ratio(&[-0.01, -0.03, 0.005]).unwrap();
        assert!(sharpe < 0.0);
    }

    #[test]
    fn sharpe_all_zero_returns_is_degenerate() {
        let err = sharpe_ratio(&[0.0, 0.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, DashboardError::DegenerateSeries { .. }));
    }

    #[test]
    fn sharpe_constant_nonzero_returns_is_degenerate() {
        for returns in [vec![0.1, 0.1, 0.1], vec![0.01; 7], vec![-0.003; 40]] {
            let err = sharpe_ratio(&returns).unwrap_err();
            assert!(matches!(err, DashboardError::DegenerateSeries { .. }));
        }
    }

    #[test]
    fn sharpe_tiny_but_real_variance_is_defined() {
        let sharpe = sharpe_ratio(&[0.1, 0.1, 0.1000001]).unwrap();
        assert!(sharpe.is_finite());
        assert!(sharpe > 0.0);
    }

    #[test]
    fn sharpe_too_short_is_degenerate() {
        assert!(sharpe_ratio(&[0.01]).is_err());
        assert!(sharpe_ratio(&[]).is_err());
    }

    #[test]
    fn performance_summary_headline_numbers() {
        let series = make_series(
            &[100.0, 110.0, 90.0, 120.0],
            &[100_000.0, 120_000.0, 90_000.0, 150_000.0],
            &[0.0, 0.2, -0.25, 0.6667],
        );
        let perf = Performance::compute(&series, 100_000.0).unwrap();

        assert_relative_eq!(perf.summary.final_value, 150_000.0);
        assert_relative_eq!(perf.summary.buy_hold_value.unwrap(), 120_000.0);
        assert_relative_eq!(perf.summary.max_drawdown, -0.25);
        assert!(perf.summary.sharpe_ratio.is_some());
        assert_eq!(perf.buy_hold.unwrap().len(), series.len());
        assert_eq!(perf.drawdown.len(), series.len());
    }

    #[test]
    fn performance_reports_undefined_sharpe() {
        let series = make_series(&[1.0, 1.0], &[1.0, 1.0], &[0.0, 0.0]);
        let perf = Performance::compute(&series, 100_000.0).unwrap();
        assert_eq!(perf.summary.sharpe_ratio, None);
    }

    #[test]
    fn performance_reports_undefined_buy_and_hold() {
        let series = make_series(
            &[0.0, 10.0, 11.0],
            &[100_000.0, 90_000.0, 95_000.0],
            &[0.0, -0.1, 0.0556],
        );
        let perf = Performance::compute(&series, 100_000.0).unwrap();
        assert_eq!(perf.buy_hold, None);
        assert_eq!(perf.summary.buy_hold_value, None);
        assert_relative_eq!(perf.summary.final_value, 95_000.0);
        assert_relative_eq!(perf.summary.max_drawdown, -0.1);
        assert!(perf.summary.sharpe_ratio.is_some());
    }

    #[test]
    fn currency_format_groups_thousands() {
        assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_currency(100_000.0), "$100,000.00");
        assert_eq!(format_currency(999.5), "$999.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(-1500.0), "-$1,500.00");
        assert_eq!(format_currency(f64::NAN), "n/a");
    }

    #[test]
    fn percent_and_ratio_formats() {
        assert_eq!(format_percent(-0.25), "-25.00%");
        assert_eq!(format_percent(0.0), "0.00%");
        assert_eq!(format_ratio(Some(1.23456)), "1.23");
        assert_eq!(format_ratio(None), "n/a");
        assert_eq!(format_optional_currency(Some(2_500.0)), "$2,500.00");
        assert_eq!(format_optional_currency(None), "n/a");
    }
}
