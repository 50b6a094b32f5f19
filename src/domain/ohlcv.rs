//! OHLCV bar and validated series representation.

use chrono::{DateTime, Utc};

use super::error::VtradeError;

/// Spacing assumed for a series that holds a single bar.
pub const DEFAULT_INTERVAL_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Ordered bars sharing one uniform interval.
///
/// Construction validates that the series is non-empty, timestamps are
/// strictly increasing with a constant spacing of whole minutes, and volume
/// is non-negative.
/// Once built a series is never mutated; derived series are new values.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    bars: Vec<Bar>,
    interval_secs: i64,
}

impl Series {
    pub fn new(bars: Vec<Bar>) -> Result<Self, VtradeError> {
        if bars.is_empty() {
            return Err(VtradeError::EmptySeries);
        }

        let interval_secs = if bars.len() >= 2 {
            bars[1].timestamp - bars[0].timestamp
        } else {
            DEFAULT_INTERVAL_SECS
        };

        for (i, pair) in bars.windows(2).enumerate() {
            let step = pair[1].timestamp - pair[0].timestamp;
            if step <= 0 {
                return Err(VtradeError::validation(format!(
                    "timestamps must be strictly increasing (row {}: {} after {})",
                    i + 1,
                    pair[1].timestamp,
                    pair[0].timestamp
                )));
            }
            if step != interval_secs {
                return Err(VtradeError::validation(format!(
                    "non-uniform interval at row {}: expected {}s, found {}s",
                    i + 1,
                    interval_secs,
                    step
                )));
            }
        }

        if interval_secs % 60 != 0 {
            return Err(VtradeError::validation(format!(
                "bar spacing of {interval_secs}s is not a whole number of minutes"
            )));
        }

        if let Some(i) = bars.iter().position(|b| b.volume < 0.0) {
            return Err(VtradeError::validation(format!(
                "negative volume at row {i}"
            )));
        }

        Ok(Series {
            bars,
            interval_secs,
        })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.bars.len() - 1
    }

    pub fn interval_secs(&self) -> i64 {
        self.interval_secs
    }

    pub fn interval_minutes(&self) -> u32 {
        (self.interval_secs / 60).max(1) as u32
    }

    pub fn bar(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn timestamp_at(&self, index: usize) -> Option<i64> {
        self.bars.get(index).map(|b| b.timestamp)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn min_low(&self) -> f64 {
        self.bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min)
    }

    /// Index of the first bar whose timestamp is at or after `ts`.
    pub fn find_first_at_or_after(&self, ts: i64) -> Option<usize> {
        let idx = self.bars.partition_point(|b| b.timestamp < ts);
        (idx < self.bars.len()).then_some(idx)
    }

    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}
