//! Aggregation of a base series into coarser bars.

use super::error::VtradeError;
use super::ohlcv::{Bar, Series};

/// Target and source bar intervals, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleSpec {
    target_minutes: u32,
    source_minutes: u32,
}

impl ResampleSpec {
    pub fn new(target_minutes: u32, source_minutes: u32) -> Result<Self, VtradeError> {
        if target_minutes == 0 || source_minutes == 0 || target_minutes % source_minutes != 0 {
            return Err(VtradeError::InvalidInterval {
                target_minutes,
                source_minutes,
            });
        }
        Ok(ResampleSpec {
            target_minutes,
            source_minutes,
        })
    }

    pub fn target_minutes(&self) -> u32 {
        self.target_minutes
    }

    pub fn source_minutes(&self) -> u32 {
        self.source_minutes
    }

    /// Number of source bars per target bar.
    pub fn factor(&self) -> usize {
        (self.target_minutes / self.source_minutes) as usize
    }
}

/// Group consecutive runs of `factor` bars into one.
///
/// open = first open, close = last close, high = max high, low = min low,
/// volume = summed volume, timestamp = last bar's timestamp. A trailing
/// partial group is dropped.
pub fn resample(base: &Series, spec: ResampleSpec) -> Result<Series, VtradeError> {
    let factor = spec.factor();
    if factor == 1 {
        return Ok(base.clone());
    }

    let bars: Vec<Bar> = base
        .bars()
        .chunks_exact(factor)
        .map(|group| {
            let first = &group[0];
            let last = &group[group.len() - 1];
            Bar {
                timestamp: last.timestamp,
                open: first.open,
                high: group.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max),
                low: group.iter().map(|b| b.low).fold(f64::INFINITY, f64::min),
                close: last.close,
                volume: group.iter().map(|b| b.volume).sum(),
            }
        })
        .collect();

    Series::new(bars)
}
