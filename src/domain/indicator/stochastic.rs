//! Slow stochastic oscillator.
//!
//! Fast %K = 100 × (C - LL(n1)) / max(HH(n1) - LL(n1), floor)
//! Slow %K = SMA(n2) of Fast %K
//! Slow %D = SMA(n3) of Slow %K
//!
//! LL/HH are trailing lows/highs under the shrinking warm-up window.

use crate::domain::window::{rolling_max, rolling_mean, rolling_min};

pub const DEFAULT_K_PERIOD: usize = 15;
pub const DEFAULT_SMOOTHING: usize = 5;
pub const DEFAULT_D_PERIOD: usize = 3;

pub fn calculate_fast_k(
    close: &[f64],
    low: &[f64],
    high: &[f64],
    k_period: usize,
    floor: f64,
) -> Vec<f64> {
    let lowest = rolling_min(low, k_period);
    let highest = rolling_max(high, k_period);
    close
        .iter()
        .zip(lowest.iter().zip(&highest))
        .map(|(c, (lo, hi))| 100.0 * (c - lo) / (hi - lo).max(floor))
        .collect()
}

/// Returns `(slow_k, slow_d)`.
pub fn calculate_stochastic(
    close: &[f64],
    low: &[f64],
    high: &[f64],
    k_period: usize,
    smoothing: usize,
    d_period: usize,
    floor: f64,
) -> (Vec<f64>, Vec<f64>) {
    let fast_k = calculate_fast_k(close, low, high, k_period, floor);
    let slow_k = rolling_mean(&fast_k, smoothing);
    let slow_d = rolling_mean(&slow_k, d_period);
    (slow_k, slow_d)
}
