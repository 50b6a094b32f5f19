#![allow(dead_code)]

use vtrade::domain::config::{IndicatorConfig, SimulationConfig, VtradeConfig};
use vtrade::domain::error::VtradeError;
pub use vtrade::domain::ohlcv::{Bar, Series};
use vtrade::ports::data_port::SeriesPort;

pub const T0: i64 = 1_500_000_000;

pub struct MockSeriesPort {
    pub bars: Vec<Bar>,
    pub error: Option<String>,
}

impl MockSeriesPort {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars, error: None }
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl SeriesPort for MockSeriesPort {
    fn load_series(&self) -> Result<Series, VtradeError> {
        if let Some(reason) = &self.error {
            return Err(VtradeError::Validation {
                reason: reason.clone(),
            });
        }
        Series::new(self.bars.clone())
    }
}

pub fn make_bar(index: usize, close: f64) -> Bar {
    Bar {
        timestamp: T0 + index as i64 * 60,
        open: close - 1.0,
        high: close + 2.0,
        low: close - 2.0,
        close,
        volume: 10.0 + (index % 7) as f64,
    }
}

pub fn series_from_closes(closes: &[f64]) -> Series {
    Series::new(
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| make_bar(i, c))
            .collect(),
    )
    .unwrap()
}

/// Deterministic wavy one-minute series around 1000.
pub fn generate_series(count: usize) -> Series {
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            let x = i as f64;
            (1000.0 + 40.0 * (x / 37.0).sin() + 15.0 * (x / 5.0).cos()).round()
        })
        .collect();
    series_from_closes(&closes)
}

pub fn test_config(min_warmup: usize, display_length: usize) -> VtradeConfig {
    VtradeConfig {
        simulation: SimulationConfig {
            min_warmup,
            display_length,
            rng_seed: Some(42),
            ..SimulationConfig::default()
        },
        indicators: IndicatorConfig::default(),
    }
}
