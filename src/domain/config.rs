//! Session configuration passed explicitly into the simulator and indicators.

use super::indicator::{bollinger, macd, rsi, stochastic};

pub const DEFAULT_SEED_MONEY: f64 = 1000.0;
pub const DEFAULT_DISPLAY_LENGTH: usize = 100;
pub const DEFAULT_QUANTITY: f64 = 0.01;
/// Bars kept ahead of a random start so indicators are warmed up.
pub const DEFAULT_MIN_WARMUP: usize = 14_400;
pub const DEFAULT_MA_PERIODS: [usize; 4] = [5, 10, 30, 60];
pub const DEFAULT_DEPTH: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub ma_periods: Vec<usize>,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub macd_normalized: bool,
    pub bollinger_period: usize,
    pub bollinger_width: f64,
    pub rsi_period: usize,
    pub stochastic_k: usize,
    pub stochastic_smoothing: usize,
    pub stochastic_d: usize,
    /// Price tick; also the denominator floor for RSI and stochastic.
    pub depth: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            ma_periods: DEFAULT_MA_PERIODS.to_vec(),
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            macd_normalized: false,
            bollinger_period: bollinger::DEFAULT_PERIOD,
            bollinger_width: bollinger::DEFAULT_WIDTH,
            rsi_period: rsi::DEFAULT_PERIOD,
            stochastic_k: stochastic::DEFAULT_K_PERIOD,
            stochastic_smoothing: stochastic::DEFAULT_SMOOTHING,
            stochastic_d: stochastic::DEFAULT_D_PERIOD,
            depth: DEFAULT_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub seed_money: f64,
    pub display_length: usize,
    pub fee_pct: f64,
    pub quantity: f64,
    pub min_warmup: usize,
    /// Native bar interval in minutes; inferred from the data when unset.
    pub native_interval: Option<u32>,
    pub resample_interval: Option<u32>,
    /// Fixed RNG seed for reproducible random starts.
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            seed_money: DEFAULT_SEED_MONEY,
            display_length: DEFAULT_DISPLAY_LENGTH,
            fee_pct: 0.0,
            quantity: DEFAULT_QUANTITY,
            min_warmup: DEFAULT_MIN_WARMUP,
            native_interval: None,
            resample_interval: None,
            rng_seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VtradeConfig {
    pub simulation: SimulationConfig,
    pub indicators: IndicatorConfig,
}
