//! HTML dashboard adapter implementing ReportPort.
//!
//! Renders the dashboard with Askama templates and inline SVG charts. The
//! same page is served by the web adapter, where the control panel becomes a
//! live form instead of a static summary.

use std::fs;
use std::path::Path;

use askama::Template;

use crate::adapters::chart_svg;
use crate::domain::asset::Asset;
use crate::domain::dashboard::Dashboard;
use crate::domain::error::DashboardError;
use crate::domain::metrics::{
    format_currency, format_optional_currency, format_percent, format_ratio,
};
use crate::domain::transition::TransitionKind;
use crate::ports::report_port::ReportPort;

pub struct AssetOption {
    pub code: &'static str,
    pub selected: bool,
}

pub struct MetricCard {
    pub label: &'static str,
    pub value: String,
}

pub struct CountRow {
    pub label: &'static str,
    pub count: usize,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub title: String,
    pub asset: String,
    pub interactive: bool,
    pub assets: Vec<AssetOption>,
    pub show_drawdown: bool,
    pub points: usize,
    pub duplicates_dropped: usize,
    pub range: String,
    pub transition_counts: Vec<CountRow>,
    pub price_svg: String,
    pub strategy_svg: String,
    pub metrics: Vec<MetricCard>,
    pub comparison_svg: String,
    pub comparison_notes: Vec<String>,
}

impl DashboardTemplate {
    pub fn new(dashboard: &Dashboard, interactive: bool) -> Self {
        let view = &dashboard.view;
        let show_drawdown = dashboard.request.show_drawdown;

        let range = match view.series.range() {
            Some((start, end)) => format!(
                "{} to {}",
                start.format("%Y-%m-%d %H:%M"),
                end.format("%Y-%m-%d %H:%M")
            ),
            None => String::new(),
        };

        let metrics = vec![
            MetricCard {
                label: "Final Value",
                value: format_currency(view.summary.final_value),
            },
            MetricCard {
                label: "Buy & Hold",
                value: format_optional_currency(view.summary.buy_hold_value),
            },
            MetricCard {
                label: "Sharpe",
                value: format_ratio(view.summary.sharpe_ratio),
            },
            MetricCard {
                label: "Max Drawdown",
                value: format_percent(view.summary.max_drawdown),
            },
        ];

        let comparison_notes = dashboard
            .comparison
            .iter()
            .filter_map(|line| {
                line.outcome
                    .as_ref()
                    .err()
                    .map(|reason| format!("{} strategy unavailable: {}", line.asset, reason))
            })
            .collect();

        DashboardTemplate {
            title: format!("{} Strategy Dashboard", view.asset),
            asset: view.asset.to_string(),
            interactive,
            assets: Asset::ALL
                .iter()
                .map(|a| AssetOption {
                    code: a.code(),
                    selected: *a == view.asset,
                })
                .collect(),
            show_drawdown,
            points: view.series.len(),
            duplicates_dropped: view.stats.duplicates_dropped,
            range,
            transition_counts: TransitionKind::ALL
                .iter()
                .map(|k| CountRow {
                    label: k.label(),
                    count: view.counts.get(*k),
                })
                .collect(),
            price_svg: chart_svg::price_signal_svg(view, show_drawdown),
            strategy_svg: chart_svg::strategy_vs_buy_hold_svg(view),
            metrics,
            comparison_svg: chart_svg::comparison_svg(&dashboard.comparison),
            comparison_notes,
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub title: &'a str,
    pub message: &'a str,
    pub status: u16,
}

/// Render the full dashboard page.
pub fn render_dashboard(dashboard: &Dashboard, interactive: bool) -> Result<String, DashboardError> {
    DashboardTemplate::new(dashboard, interactive)
        .render()
        .map_err(|e| DashboardError::Io(std::io::Error::other(e.to_string())))
}

pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(&self, dashboard: &Dashboard, output_path: &str) -> Result<(), DashboardError> {
        let html = render_dashboard(dashboard, false)?;

        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(DashboardError::Io)?;
        }
        fs::write(path, html).map_err(DashboardError::Io)?;

        Ok(())
    }
}
