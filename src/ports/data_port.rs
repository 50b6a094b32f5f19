//! Series access port trait.

use crate::domain::error::VtradeError;
use crate::domain::ohlcv::Series;

pub trait SeriesPort {
    /// Load and validate the full series. Any malformed input is fatal.
    fn load_series(&self) -> Result<Series, VtradeError>;
}
