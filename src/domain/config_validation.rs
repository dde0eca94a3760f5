//! Configuration validation and the settings it produces.
//!
//! Expected INI layout:
//!
//! ```ini
//! [data]
//! dir = Model Output
//! file_pattern = {asset}_Strategy_Output.csv
//!
//! [dashboard]
//! initial_capital = 100000
//! default_asset = BTC
//! show_drawdown = true
//!
//! [web]
//! listen = 127.0.0.1:3000
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::domain::asset::Asset;
use crate::domain::error::DashboardError;
use crate::domain::metrics::DEFAULT_CAPITAL;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_DATA_DIR: &str = "Model Output";
pub const DEFAULT_FILE_PATTERN: &str = "{asset}_Strategy_Output.csv";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub file_pattern: String,
    pub initial_capital: f64,
    pub default_asset: Asset,
    pub show_drawdown: bool,
    pub listen: SocketAddr,
}

impl Settings {
    /// Validate `config` and read it into typed settings, defaults applied.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, DashboardError> {
        validate_config(config)?;

        let listen = parse_listen(config)?;
        let default_asset = config
            .get_string_or("dashboard", "default_asset", Asset::default().code())
            .parse()?;

        Ok(Settings {
            data_dir: PathBuf::from(config.get_string_or("data", "dir", DEFAULT_DATA_DIR)),
            file_pattern: config.get_string_or("data", "file_pattern", DEFAULT_FILE_PATTERN),
            initial_capital: config.get_double("dashboard", "initial_capital", DEFAULT_CAPITAL),
            default_asset,
            show_drawdown: config.get_bool("dashboard", "show_drawdown", true),
            listen,
        })
    }
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), DashboardError> {
    validate_file_pattern(config)?;
    validate_initial_capital(config)?;
    validate_default_asset(config)?;
    validate_show_drawdown(config)?;
    parse_listen(config)?;
    Ok(())
}

fn validate_file_pattern(config: &dyn ConfigPort) -> Result<(), DashboardError> {
    let pattern = config.get_string_or("data", "file_pattern", DEFAULT_FILE_PATTERN);
    if !pattern.contains("{asset}") {
        return Err(DashboardError::ConfigInvalid {
            section: "data".to_string(),
            key: "file_pattern".to_string(),
            reason: "file_pattern must contain the {asset} placeholder".to_string(),
        });
    }
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), DashboardError> {
    let Some(raw) = config.get_string("dashboard", "initial_capital") else {
        return Ok(());
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v > 0.0 && v.is_finite() => Ok(()),
        _ => Err(DashboardError::ConfigInvalid {
            section: "dashboard".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be a positive number".to_string(),
        }),
    }
}

fn validate_default_asset(config: &dyn ConfigPort) -> Result<(), DashboardError> {
    if let Some(raw) = config.get_string("dashboard", "default_asset") {
        raw.parse::<Asset>()
            .map_err(|_| DashboardError::ConfigInvalid {
                section: "dashboard".to_string(),
                key: "default_asset".to_string(),
                reason: format!("unknown asset '{}', expected BTC or ETH", raw.trim()),
            })?;
    }
    Ok(())
}

fn validate_show_drawdown(config: &dyn ConfigPort) -> Result<(), DashboardError> {
    if let Some(raw) = config.get_string("dashboard", "show_drawdown") {
        let ok = matches!(
            raw.trim().to_lowercase().as_str(),
            "true" | "yes" | "1" | "false" | "no" | "0"
        );
        if !ok {
            return Err(DashboardError::ConfigInvalid {
                section: "dashboard".to_string(),
                key: "show_drawdown".to_string(),
                reason: "show_drawdown must be true or false".to_string(),
            });
        }
    }
    Ok(())
}

fn parse_listen(config: &dyn ConfigPort) -> Result<SocketAddr, DashboardError> {
    let raw = config.get_string_or("web", "listen", DEFAULT_LISTEN);
    raw.parse().map_err(|_| DashboardError::ConfigInvalid {
        section: "web".to_string(),
        key: "listen".to_string(),
        reason: format!("'{raw}' is not a socket address"),
    })
}
