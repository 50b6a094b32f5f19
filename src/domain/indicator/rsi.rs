//! RSI (Relative Strength Index).
//!
//! U[i] = max(C[i] - C[i-1], 0), D[i] = max(C[i-1] - C[i], 0), U[0] = D[0] = 0
//! AU, AD = SMA(n) of U and D with the shrinking warm-up window
//! RSI[i] = 100 × AU / max(AU + AD, floor)
//!
//! `floor` is the price tick; it keeps flat stretches from dividing by zero
//! and damps the index when moves are smaller than one tick. RSI[0] is 50.

use crate::domain::window::rolling_mean;

pub const DEFAULT_PERIOD: usize = 15;

pub fn calculate_rsi(close: &[f64], period: usize, floor: f64) -> Vec<f64> {
    let mut gains = vec![0.0; close.len()];
    let mut losses = vec![0.0; close.len()];
    for i in 1..close.len() {
        let change = close[i] - close[i - 1];
        gains[i] = change.max(0.0);
        losses[i] = (-change).max(0.0);
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    let mut rsi: Vec<f64> = avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(au, ad)| 100.0 * au / (au + ad).max(floor))
        .collect();
    if let Some(first) = rsi.first_mut() {
        *first = 50.0;
    }
    rsi
}
