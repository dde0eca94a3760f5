//! HTTP request handlers for web adapter.

use axum::{
    extract::{Query, State},
    response::Html,
};
use std::sync::Arc;

use crate::adapters::html_report_adapter::render_dashboard;
use crate::domain::asset::Asset;
use crate::domain::dashboard::{build_dashboard, DashboardRequest};

use super::{AppState, WebError};

/// Control panel state as submitted by the dashboard form.
///
/// An unchecked checkbox is simply absent from the query, so the hidden
/// `controls` field tells "unchecked" apart from "no form submitted yet".
#[derive(Debug, Default, serde::Deserialize)]
pub struct DashboardQuery {
    pub asset: Option<String>,
    pub drawdown: Option<bool>,
    pub controls: Option<String>,
}

impl DashboardQuery {
    fn to_request(&self, default_asset: Asset, default_drawdown: bool) -> Result<DashboardRequest, WebError> {
        let asset = match self.asset.as_deref() {
            Some(code) => code.parse::<Asset>()?,
            None => default_asset,
        };
        let show_drawdown = match (self.drawdown, &self.controls) {
            (Some(flag), _) => flag,
            (None, Some(_)) => false,
            (None, None) => default_drawdown,
        };
        Ok(DashboardRequest {
            asset,
            show_drawdown,
        })
    }
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, WebError> {
    let request = query.to_request(state.settings.default_asset, state.settings.show_drawdown)?;
    let port = Arc::clone(&state.series_port);
    let capital = state.settings.initial_capital;

    let dashboard = build_dashboard(&*port, request, capital)?;
    let html = render_dashboard(&dashboard, true)?;
    Ok(Html(html))
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn not_found() -> WebError {
    WebError::not_found("Page not found")
}
