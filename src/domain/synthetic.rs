//! Synthetic price series derived from real ones.
//!
//! Used for counterfactual replays and data augmentation: a mirrored market
//! (`invert`), a geometric blend of two markets (`mixup`) and a shifted price
//! level (`add_random_offset`). Prices are re-quantized to the tick `depth`.

use rand::Rng;
use rand_distr::{Beta, Distribution};
use tracing::debug;

use super::error::VtradeError;
use super::ohlcv::Bar;

/// Round to the nearest multiple of `depth`, ties to even.
pub fn quantize(price: f64, depth: f64) -> f64 {
    depth * (price / depth).round_ties_even()
}

/// How the blend factor for [`mixup`] is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MixWeight {
    Fixed(f64),
    /// Beta(0.5, 0.5): favours weights near 0 or 1.
    Beta,
    Uniform,
}

impl MixWeight {
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, VtradeError> {
        match *self {
            MixWeight::Fixed(w) => Ok(w),
            MixWeight::Beta => {
                let beta = Beta::new(0.5, 0.5)
                    .map_err(|e| VtradeError::validation(format!("beta weight: {e}")))?;
                Ok(beta.sample(rng))
            }
            MixWeight::Uniform => Ok(rng.gen_range(0.0..1.0)),
        }
    }
}

fn check_prices(bars: &[Bar]) -> Result<(), VtradeError> {
    match bars
        .iter()
        .position(|b| b.open <= 0.0 || b.high <= 0.0 || b.low <= 0.0 || b.close <= 0.0)
    {
        Some(i) => Err(VtradeError::validation(format!(
            "non-positive price at row {i}"
        ))),
        None => Ok(()),
    }
}

/// Mirror the series around the geometric mean close of an anchor window.
///
/// Each price `p` becomes `gm² / p`; low and high swap so the mirrored bar
/// stays well-formed. Volume and timestamps are kept.
pub fn invert(
    bars: &[Bar],
    anchor_start: usize,
    anchor_length: usize,
    depth: f64,
) -> Result<Vec<Bar>, VtradeError> {
    if bars.is_empty() {
        return Err(VtradeError::EmptySeries);
    }
    check_prices(bars)?;

    let start = anchor_start.min(bars.len());
    let end = anchor_start.saturating_add(anchor_length).min(bars.len());
    let anchor = &bars[start..end];
    if anchor.is_empty() {
        return Err(VtradeError::EmptySeries);
    }

    let log_mean = anchor.iter().map(|b| b.close.ln()).sum::<f64>() / anchor.len() as f64;
    let gm = log_mean.exp();
    let gm2 = gm * gm;
    debug!(gm, anchor_start = start, anchor_len = anchor.len(), "inverting series");

    Ok(bars
        .iter()
        .map(|b| Bar {
            timestamp: b.timestamp,
            open: quantize(gm2 / b.open, depth),
            high: quantize(gm2 / b.low, depth),
            low: quantize(gm2 / b.high, depth),
            close: quantize(gm2 / b.close, depth),
            volume: b.volume,
        })
        .collect())
}

/// Geometric blend `a^w · b^(1-w)` of every numeric field.
///
/// Timestamps are taken from `a`. Prices are re-quantized, volume is not.
pub fn mixup<R: Rng + ?Sized>(
    a: &[Bar],
    b: &[Bar],
    weight: MixWeight,
    depth: f64,
    rng: &mut R,
) -> Result<Vec<Bar>, VtradeError> {
    if a.is_empty() || b.is_empty() {
        return Err(VtradeError::EmptySeries);
    }
    if a.len() != b.len() {
        return Err(VtradeError::ShapeMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    check_prices(a)?;
    check_prices(b)?;

    let w = weight.resolve(rng)?;
    if !(0.0..=1.0).contains(&w) {
        return Err(VtradeError::validation(format!(
            "mixup weight {w} outside [0, 1]"
        )));
    }
    debug!(weight = w, bars = a.len(), "blending series");

    let blend = |x: f64, y: f64| x.powf(w) * y.powf(1.0 - w);
    Ok(a
        .iter()
        .zip(b)
        .map(|(x, y)| Bar {
            timestamp: x.timestamp,
            open: quantize(blend(x.open, y.open), depth),
            high: quantize(blend(x.high, y.high), depth),
            low: quantize(blend(x.low, y.low), depth),
            close: quantize(blend(x.close, y.close), depth),
            volume: blend(x.volume, y.volume),
        })
        .collect())
}

/// Shift every price by one offset drawn from `U(-1, 1) · level · min(low)`.
pub fn add_random_offset<R: Rng + ?Sized>(
    bars: &[Bar],
    level: f64,
    depth: f64,
    rng: &mut R,
) -> Result<Vec<Bar>, VtradeError> {
    if bars.is_empty() {
        return Err(VtradeError::EmptySeries);
    }

    let min_low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let offset = quantize(level * min_low * rng.gen_range(-1.0..1.0), depth);
    debug!(offset, level, "shifting series");

    Ok(bars
        .iter()
        .map(|b| Bar {
            open: b.open + offset,
            high: b.high + offset,
            low: b.low + offset,
            close: b.close + offset,
            ..*b
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bar(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume: 5.0,
        }
    }

    fn sample() -> Vec<Bar> {
        vec![
            bar(0, 100.0, 110.0, 90.0, 105.0),
            bar(60, 105.0, 120.0, 100.0, 115.0),
            bar(120, 115.0, 118.0, 95.0, 98.0),
            bar(180, 98.0, 104.0, 92.0, 100.0),
        ]
    }

    #[test]
    fn quantize_rounds_to_tick() {
        assert_eq!(quantize(101.4, 1.0), 101.0);
        assert_eq!(quantize(101.6, 1.0), 102.0);
        assert_eq!(quantize(102.5, 1.0), 102.0);
        assert_abs_diff_eq!(quantize(1.237, 0.01), 1.24, epsilon = 1e-12);
        assert_eq!(quantize(104.0, 5.0), 105.0);
    }

    #[test]
    fn beta_weight_stays_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let w = MixWeight::Beta.resolve(&mut rng).unwrap();
            assert!((0.0..=1.0).contains(&w));
        }
    }

    #[test]
    fn beta_weight_favours_the_edges() {
        let mut rng = StdRng::seed_from_u64(11);
        let draws: Vec<f64> = (0..4000)
            .map(|_| MixWeight::Beta.resolve(&mut rng).unwrap())
            .collect();
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        let edges = draws.iter().filter(|w| **w < 0.1 || **w > 0.9).count();
        let middle = draws.iter().filter(|w| (0.4..0.6).contains(*w)).count();
        assert_abs_diff_eq!(mean, 0.5, epsilon = 0.05);
        assert!(edges > 2 * middle);
    }

    #[test]
    fn fixed_weight_passes_through() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(MixWeight::Fixed(0.25).resolve(&mut rng).unwrap(), 0.25);
    }

    #[test]
    fn invert_mirrors_around_geometric_mean() {
        let bars = vec![bar(0, 100.0, 100.0, 100.0, 100.0), bar(60, 50.0, 400.0, 25.0, 400.0)];
        // gm of closes 100 and 400 is 200, gm² = 40000
        let out = invert(&bars, 0, 2, 1.0).unwrap();
        assert_eq!(out[0].close, 400.0);
        assert_eq!(out[1].open, 800.0);
        assert_eq!(out[1].close, 100.0);
        assert_eq!(out[1].high, 1600.0);
        assert_eq!(out[1].low, 100.0);
        assert_eq!(out[1].volume, bars[1].volume);
        assert_eq!(out[1].timestamp, 60);
    }

    #[test]
    fn invert_keeps_low_below_high() {
        let out = invert(&sample(), 1, 2, 1.0).unwrap();
        for b in &out {
            assert!(b.low <= b.high);
            assert!(b.low <= b.close && b.close <= b.high);
        }
    }

    #[test]
    fn invert_anchor_clamped_to_series() {
        let bars = sample();
        assert!(invert(&bars, 2, 100, 1.0).is_ok());
        assert!(matches!(
            invert(&bars, 10, 5, 1.0),
            Err(VtradeError::EmptySeries)
        ));
    }

    #[test]
    fn invert_empty_fails() {
        assert!(matches!(invert(&[], 0, 5, 1.0), Err(VtradeError::EmptySeries)));
    }

    #[test]
    fn mixup_with_itself_is_identity() {
        let bars = sample();
        let mut rng = StdRng::seed_from_u64(11);
        for weight in [MixWeight::Fixed(0.3), MixWeight::Beta, MixWeight::Uniform] {
            let out = mixup(&bars, &bars, weight, 1.0, &mut rng).unwrap();
            for (o, b) in out.iter().zip(&bars) {
                assert_eq!(o.timestamp, b.timestamp);
                assert_eq!(o.open, b.open);
                assert_eq!(o.high, b.high);
                assert_eq!(o.low, b.low);
                assert_eq!(o.close, b.close);
                assert_abs_diff_eq!(o.volume, b.volume, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn mixup_extreme_weights_select_one_side() {
        let a = sample();
        let b = invert(&a, 0, 4, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let all_a = mixup(&a, &b, MixWeight::Fixed(1.0), 1.0, &mut rng).unwrap();
        let all_b = mixup(&a, &b, MixWeight::Fixed(0.0), 1.0, &mut rng).unwrap();
        for i in 0..a.len() {
            assert_eq!(all_a[i].close, a[i].close);
            assert_eq!(all_b[i].close, b[i].close);
        }
    }

    #[test]
    fn mixup_geometric_blend() {
        let a = vec![bar(0, 100.0, 100.0, 100.0, 100.0)];
        let b = vec![bar(0, 400.0, 400.0, 400.0, 400.0)];
        let mut rng = StdRng::seed_from_u64(0);
        let out = mixup(&a, &b, MixWeight::Fixed(0.5), 1.0, &mut rng).unwrap();
        assert_eq!(out[0].close, 200.0);
    }

    #[test]
    fn mixup_length_mismatch() {
        let a = sample();
        let mut rng = StdRng::seed_from_u64(0);
        let err = mixup(&a, &a[..2], MixWeight::Uniform, 1.0, &mut rng).unwrap_err();
        assert!(matches!(err, VtradeError::ShapeMismatch { left: 4, right: 2 }));
    }

    #[test]
    fn mixup_empty_fails() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = mixup(&[], &[], MixWeight::Beta, 1.0, &mut rng).unwrap_err();
        assert!(matches!(err, VtradeError::EmptySeries));
    }

    #[test]
    fn mixup_rejects_weight_out_of_range() {
        let a = sample();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(mixup(&a, &a, MixWeight::Fixed(1.5), 1.0, &mut rng).is_err());
    }

    #[test]
    fn offset_shifts_prices_uniformly() {
        let bars = sample();
        let mut rng = StdRng::seed_from_u64(99);
        let out = add_random_offset(&bars, 0.05, 1.0, &mut rng).unwrap();

        let offset = out[0].close - bars[0].close;
        // min low is 90, so |offset| <= 4.5 before rounding
        assert!(offset.abs() <= 5.0);
        assert_eq!(offset, offset.round());
        for (o, b) in out.iter().zip(&bars) {
            assert_eq!(o.open - b.open, offset);
            assert_eq!(o.high - b.high, offset);
            assert_eq!(o.low - b.low, offset);
            assert_eq!(o.close - b.close, offset);
            assert_eq!(o.volume, b.volume);
            assert_eq!(o.timestamp, b.timestamp);
        }
    }

    #[test]
    fn zero_level_leaves_series_untouched() {
        let bars = sample();
        let mut rng = StdRng::seed_from_u64(5);
        let out = add_random_offset(&bars, 0.0, 1.0, &mut rng).unwrap();
        assert_eq!(out, bars);
    }

    #[test]
    fn offset_empty_fails() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            add_random_offset(&[], 0.05, 1.0, &mut rng),
            Err(VtradeError::EmptySeries)
        ));
    }
}
