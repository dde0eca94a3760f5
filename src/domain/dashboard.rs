//! One dashboard render pass: load both assets, clean them, and derive the
//! selected asset's transitions and metrics plus the cross-asset comparison.
//!
//! Nothing is cached between passes; every call re-reads the sources.

use chrono::NaiveDateTime;

use super::asset::Asset;
use super::error::DashboardError;
use super::metrics::{Performance, PerformanceSummary};
use super::series::{normalize_with_stats, portfolio_curve, NormalizeStats, Series};
use super::transition::{detect_transitions, TransitionCounts, TransitionEvent};
use crate::ports::series_port::SeriesPort;

/// The control surface: which asset to show and whether to overlay drawdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardRequest {
    pub asset: Asset,
    pub show_drawdown: bool,
}

impl Default for DashboardRequest {
    fn default() -> Self {
        Self {
            asset: Asset::Btc,
            show_drawdown: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Everything the per-asset panels need.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetView {
    pub asset: Asset,
    pub series: Series,
    pub stats: NormalizeStats,
    pub transitions: Vec<TransitionEvent>,
    pub counts: TransitionCounts,
    /// `None` when buy-and-hold is undefined for this series.
    pub buy_hold: Option<Vec<f64>>,
    pub drawdown: Vec<f64>,
    pub summary: PerformanceSummary,
}

impl AssetView {
    pub fn build(
        series: Series,
        stats: NormalizeStats,
        capital: f64,
    ) -> Result<Self, DashboardError> {
        let transitions: Vec<TransitionEvent> = detect_transitions(&series).collect();
        let counts = TransitionCounts::tally(transitions.iter().copied());
        let Performance {
            buy_hold,
            drawdown,
            summary,
        } = Performance::compute(&series, capital)?;

        Ok(AssetView {
            asset: series.asset(),
            series,
            stats,
            transitions,
            counts,
            buy_hold,
            drawdown,
            summary,
        })
    }
}

/// One line of the comparison panel, or the reason it could not be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonLine {
    pub asset: Asset,
    pub outcome: Result<Vec<EquityPoint>, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub request: DashboardRequest,
    pub view: AssetView,
    pub comparison: Vec<ComparisonLine>,
}

pub fn load_normalized(
    port: &dyn SeriesPort,
    asset: Asset,
) -> Result<(Series, NormalizeStats), DashboardError> {
    let raw = port.load(asset)?;
    normalize_with_stats(raw)
}

/// Load both assets and build the selected asset's view plus the
/// comparison lines. Source errors from either asset halt the render; a
/// data error halts it only for the selected asset.
pub fn build_dashboard(
    port: &dyn SeriesPort,
    request: DashboardRequest,
    capital: f64,
) -> Result<Dashboard, DashboardError> {
    let mut view = None;
    let mut comparison = Vec::with_capacity(Asset::ALL.len());

    for asset in Asset::ALL {
        let raw = port.load(asset)?;

        let outcome = match portfolio_curve(&raw) {
            Ok(curve) => Ok(curve
                .into_iter()
                .map(|(timestamp, value)| EquityPoint { timestamp, value })
                .collect()),
            Err(e) if e.is_panel_local() && asset != request.asset => {
                tracing::warn!(asset = %asset, "comparison line unavailable: {e}");
                Err(e.to_string())
            }
            Err(e) => return Err(e),
        };
        comparison.push(ComparisonLine { asset, outcome });

        if asset == request.asset {
            let (series, stats) = normalize_with_stats(raw)?;
            view = Some(AssetView::build(series, stats, capital)?);
        }
    }

    let view = view.ok_or_else(|| DashboardError::InsufficientData {
        asset: request.asset,
        reason: "asset was not loaded".into(),
    })?;

    tracing::info!(
        asset = %request.asset,
        points = view.series.len(),
        transitions = view.counts.total(),
        "dashboard rendered"
    );

    Ok(Dashboard {
        request,
        view,
        comparison,
    })
}
