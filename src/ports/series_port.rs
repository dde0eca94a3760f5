//! Series source port trait.

use crate::domain::asset::Asset;
use crate::domain::error::DashboardError;
use crate::domain::series::RawSeries;

pub trait SeriesPort {
    /// Read every record of `asset`'s strategy output, in source order.
    ///
    /// Fails with `SourceUnavailable` when the source cannot be read and
    /// `SchemaMismatch` when a required column is absent.
    fn load(&self, asset: Asset) -> Result<RawSeries, DashboardError>;

    /// Human-readable location of `asset`'s source, for diagnostics.
    fn describe(&self, asset: Asset) -> String;
}
