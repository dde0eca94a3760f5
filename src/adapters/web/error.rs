//! HTTP error responses for web adapter.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::adapters::html_report_adapter::ErrorTemplate;
use crate::domain::error::DashboardError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

pub fn status_from_error(err: &DashboardError) -> StatusCode {
    match err {
        DashboardError::ConfigInvalid { .. }
        | DashboardError::ConfigParse { .. }
        | DashboardError::UnknownAsset(_) => StatusCode::BAD_REQUEST,
        DashboardError::InsufficientData { .. } | DashboardError::DegenerateSeries { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DashboardError::SourceUnavailable { .. }
        | DashboardError::SchemaMismatch { .. }
        | DashboardError::MalformedRecord { .. }
        | DashboardError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DashboardError> for WebError {
    fn from(err: DashboardError) -> Self {
        let status = status_from_error(&err);
        if status.is_server_error() {
            tracing::error!("{err}");
        } else {
            tracing::warn!("{err}");
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let template = ErrorTemplate {
            title: "Error",
            message: &self.message,
            status: self.status.as_u16(),
        };
        match template.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(_) => (self.status, self.message).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::asset::Asset;

    #[test]
    fn source_errors_are_server_errors() {
        let err = DashboardError::SourceUnavailable {
            asset: Asset::Btc,
            path: "x.csv".into(),
            reason: "missing".into(),
        };
        assert_eq!(status_from_error(&err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn data_errors_are_unprocessable() {
        let err = DashboardError::DegenerateSeries {
            reason: "std is zero".into(),
        };
        assert_eq!(status_from_error(&err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn unknown_asset_is_bad_request() {
        let web: WebError = DashboardError::UnknownAsset("DOGE".into()).into();
        assert_eq!(web.status, StatusCode::BAD_REQUEST);
        assert!(web.message.contains("DOGE"));
    }
}
