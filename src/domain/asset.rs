//! The two tradable assets the dashboard knows about.

use std::fmt;
use std::str::FromStr;

use super::error::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Asset {
    #[default]
    Btc,
    Eth,
}

impl Asset {
    /// Every supported asset, in comparison-panel order.
    pub const ALL: [Asset; 2] = [Asset::Btc, Asset::Eth];

    pub fn code(self) -> &'static str {
        match self {
            Asset::Btc => "BTC",
            Asset::Eth => "ETH",
        }
    }

    /// Stroke colour used for this asset's line in the comparison panel.
    pub fn color(self) -> &'static str {
        match self {
            Asset::Btc => "#f7931a",
            Asset::Eth => "#627eea",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Asset {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BTC" => Ok(Asset::Btc),
            "ETH" => Ok(Asset::Eth),
            _ => Err(DashboardError::UnknownAsset(s.trim().to_string())),
        }
    }
}
