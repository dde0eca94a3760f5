//! Domain error types.

use super::asset::Asset;

/// Top-level error type for stratdash.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("source for {asset} unavailable at {path}: {reason}")]
    SourceUnavailable {
        asset: Asset,
        path: String,
        reason: String,
    },

    #[error("schema mismatch for {asset}: missing column(s) {}", missing.join(", "))]
    SchemaMismatch { asset: Asset, missing: Vec<String> },

    #[error("malformed record for {asset} at line {line}: {reason}")]
    MalformedRecord {
        asset: Asset,
        line: u64,
        reason: String,
    },

    #[error("insufficient data for {asset}: {reason}")]
    InsufficientData { asset: Asset, reason: String },

    #[error("degenerate series: {reason}")]
    DegenerateSeries { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown asset '{0}' (expected BTC or ETH)")]
    UnknownAsset(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// Errors that blank out a single asset's panel instead of the whole render.
    pub fn is_panel_local(&self) -> bool {
        matches!(
            self,
            DashboardError::InsufficientData { .. } | DashboardError::DegenerateSeries { .. }
        )
    }
}

impl From<&DashboardError> for std::process::ExitCode {
    fn from(err: &DashboardError) -> Self {
        let code: u8 = match err {
            DashboardError::Io(_) => 1,
            DashboardError::ConfigParse { .. }
            | DashboardError::ConfigInvalid { .. }
            | DashboardError::UnknownAsset(_) => 2,
            DashboardError::SourceUnavailable { .. }
            | DashboardError::SchemaMismatch { .. }
            | DashboardError::MalformedRecord { .. } => 3,
            DashboardError::InsufficientData { .. } | DashboardError::DegenerateSeries { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
