//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = SMA(fast) - SMA(slow), or SMA(fast) / SMA(slow) - 1 when normalized
//! Signal Line = SMA(signal) of MACD Line
//! Oscillator = MACD Line - Signal Line
//!
//! Averages are simple moving averages with the shrinking warm-up window, so
//! every bar carries a value.

use crate::domain::window::rolling_mean;

pub const DEFAULT_FAST: usize = 10;
pub const DEFAULT_SLOW: usize = 20;
pub const DEFAULT_SIGNAL: usize = 10;

pub fn calculate_macd(close: &[f64], fast: usize, slow: usize, normalized: bool) -> Vec<f64> {
    let fast_ma = rolling_mean(close, fast);
    let slow_ma = rolling_mean(close, slow);
    fast_ma
        .iter()
        .zip(&slow_ma)
        .map(|(f, s)| if normalized { f / s - 1.0 } else { f - s })
        .collect()
}

pub fn calculate_signal(macd_line: &[f64], signal: usize) -> Vec<f64> {
    rolling_mean(macd_line, signal)
}

pub fn calculate_oscillator(macd_line: &[f64], signal_line: &[f64]) -> Vec<f64> {
    macd_line
        .iter()
        .zip(signal_line)
        .map(|(m, s)| m - s)
        .collect()
}
