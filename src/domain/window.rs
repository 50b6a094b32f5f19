//! Rolling-window statistics over numeric sequences.
//!
//! Every function returns a sequence aligned 1:1 with its input. Windows
//! shrink at the start: for `i < n - 1` the window is `x[0..=i]`, afterwards
//! it is the trailing `n` values `x[i + 1 - n..=i]`. No position is ever
//! NaN because of a short window.

/// Trailing window ending at `i` under the shrink rule.
fn window(x: &[f64], i: usize, n: usize) -> &[f64] {
    let start = (i + 1).saturating_sub(n.max(1));
    &x[start..=i]
}

fn mean_of(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rolling arithmetic mean.
pub fn rolling_mean(x: &[f64], n: usize) -> Vec<f64> {
    (0..x.len()).map(|i| mean_of(window(x, i, n))).collect()
}

/// Rolling sample standard deviation (n - 1 denominator).
///
/// A window holding a single value has no spread and yields 0, which also
/// pins index 0 to 0.
pub fn rolling_std(x: &[f64], n: usize) -> Vec<f64> {
    (0..x.len())
        .map(|i| {
            let w = window(x, i, n);
            if w.len() < 2 {
                return 0.0;
            }
            let m = mean_of(w);
            let ss: f64 = w.iter().map(|v| (v - m) * (v - m)).sum();
            (ss / (w.len() - 1) as f64).sqrt()
        })
        .collect()
}

/// Rolling minimum.
pub fn rolling_min(x: &[f64], n: usize) -> Vec<f64> {
    (0..x.len())
        .map(|i| window(x, i, n).iter().copied().fold(f64::INFINITY, f64::min))
        .collect()
}

/// Rolling maximum.
pub fn rolling_max(x: &[f64], n: usize) -> Vec<f64> {
    (0..x.len())
        .map(|i| {
            window(x, i, n)
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .collect()
}

/// Rolling largest magnitude: `max(rolling_max, -rolling_min)`.
pub fn rolling_absmax(x: &[f64], n: usize) -> Vec<f64> {
    rolling_max(x, n)
        .into_iter()
        .zip(rolling_min(x, n))
        .map(|(hi, lo)| hi.max(-lo))
        .collect()
}

/// Scale the whole sequence into [0, 1]. A flat sequence maps to zeros.
pub fn minmax_normalize(x: &[f64]) -> Vec<f64> {
    let lo = x.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = hi - lo;
    if range <= 0.0 {
        return vec![0.0; x.len()];
    }
    x.iter().map(|v| (v - lo) / range).collect()
}

/// Divide by the largest absolute value. An all-zero sequence is returned as is.
pub fn maxabs_normalize(x: &[f64]) -> Vec<f64> {
    let peak = x.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if peak == 0.0 {
        return x.to_vec();
    }
    x.iter().map(|v| v / peak).collect()
}
