#![cfg(feature = "web")]
//! Web handler integration tests.
//!
//! Tests cover:
//! - Dashboard page renders all panels with the configured defaults
//! - Asset selector and drawdown toggle via query parameters
//! - Error pages and status codes for bad input and broken sources
//! - Undefined metrics shown as n/a instead of failing the page
//! - Health check and 404 fallback

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use stratdash::adapters::web::{build_router, AppState};
use stratdash::domain::asset::Asset;
use stratdash::domain::config_validation::Settings;
use tower::ServiceExt;

use common::*;

fn settings(default_asset: Asset, show_drawdown: bool) -> Settings {
    Settings {
        data_dir: PathBuf::from("unused"),
        file_pattern: "{asset}.csv".to_string(),
        initial_capital: 100_000.0,
        default_asset,
        show_drawdown,
        listen: SocketAddr::from(([127, 0, 0, 1], 0)),
    }
}

fn create_test_app_with(port: MockSeriesPort, settings: Settings) -> Router {
    build_router(AppState {
        series_port: Arc::new(port),
        settings,
    })
}

fn create_test_app() -> Router {
    create_test_app_with(sample_port(), settings(Asset::Btc, true))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn dashboard_renders_default_asset() {
    let (status, body) = get(create_test_app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("BTC Strategy Performance"));
    assert!(body.contains("BTC Price with Entry/Exit Signals"));
    assert!(body.contains("BTC vs ETH Strategy Comparison"));
    assert!(body.contains("<form"));
    assert!(body.contains(r#"class="drawdown""#));
}

#[tokio::test]
async fn configured_default_asset_is_used() {
    let app = create_test_app_with(sample_port(), settings(Asset::Eth, false));
    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ETH Strategy Performance"));
    assert!(!body.contains(r#"class="drawdown""#));
}

#[tokio::test]
async fn asset_query_selects_eth() {
    let (status, body) = get(create_test_app(), "/?asset=ETH&controls=1&drawdown=true").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ETH Strategy Performance"));
    assert!(body.contains(r#"<option value="ETH" selected>ETH</option>"#));
    assert!(body.contains(r#"class="drawdown""#));
}

#[tokio::test]
async fn unchecked_drawdown_hides_overlay() {
    let (status, body) = get(create_test_app(), "/?asset=BTC&controls=1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains(r#"class="drawdown""#));
}

#[tokio::test]
async fn unknown_asset_is_bad_request() {
    let (status, body) = get(create_test_app(), "/?asset=DOGE").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Error 400"));
    assert!(body.contains("DOGE"));
}

#[tokio::test]
async fn unavailable_source_is_server_error() {
    let port = sample_port().with_error(Asset::Eth, "disk on fire");
    let app = create_test_app_with(port, settings(Asset::Btc, true));
    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("disk on fire"));
}

#[tokio::test]
async fn empty_selected_series_is_unprocessable() {
    let port = sample_port().with_records(Asset::Btc, Vec::new());
    let app = create_test_app_with(port, settings(Asset::Btc, true));
    let (status, _) = get(app, "/").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn empty_comparison_series_still_renders() {
    let port = sample_port().with_records(Asset::Eth, Vec::new());
    let app = create_test_app_with(port, settings(Asset::Btc, true));
    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ETH strategy unavailable"));
}

#[tokio::test]
async fn undefined_metrics_render_as_not_available() {
    let mut btc = generate_records(&[0.0, 100.0, 110.0], &[0, 1, 0], &[100_000.0; 3]);
    btc[0].daily_return = None;
    for r in btc.iter_mut().skip(1) {
        r.daily_return = Some(0.02);
    }
    let port = sample_port().with_records(Asset::Btc, btc);
    let app = create_test_app_with(port, settings(Asset::Btc, true));

    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("BTC Strategy Performance"));
    assert_eq!(body.matches(r#"<div class="value">n/a</div>"#).count(), 2);
    assert!(body.contains("BTC vs ETH Strategy Comparison"));
}

#[tokio::test]
async fn comparison_asset_without_prices_renders() {
    let mut eth = generate_records(
        &[2_000.0, 2_100.0, 2_200.0],
        &[0, 1, 0],
        &[100_000.0, 101_000.0, 99_000.0],
    );
    for r in &mut eth {
        r.price = None;
    }
    let port = sample_port().with_records(Asset::Eth, eth);
    let app = create_test_app_with(port, settings(Asset::Btc, true));

    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("ETH strategy unavailable"));
}

#[tokio::test]
async fn health_check_responds_ok() {
    let (status, body) = get(create_test_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, body) = get(create_test_app(), "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Error 404"));
}
