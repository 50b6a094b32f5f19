//! Bollinger Bands.
//!
//! Upper = SMA(n) + width × StdDev(n)
//! Lower = SMA(n) - width × StdDev(n)
//!
//! StdDev is the sample standard deviation over the same shrinking window,
//! so the bands collapse onto the first close at index 0.

use crate::domain::window::{rolling_mean, rolling_std};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_WIDTH: f64 = 2.0;

/// Returns `(upper, lower)`.
pub fn calculate_bollinger(close: &[f64], period: usize, width: f64) -> (Vec<f64>, Vec<f64>) {
    let ma = rolling_mean(close, period);
    let sd = rolling_std(close, period);
    ma.iter()
        .zip(&sd)
        .map(|(m, s)| (m + width * s, m - width * s))
        .unzip()
}
