//! Technical indicator implementations.
//!
//! This module provides:
//! - `IndicatorType`: indicator identity + parameters (serves as map key)
//! - `IndicatorSet`: every configured indicator computed over one series
//!
//! All indicators are causal and aligned 1:1 with the source series.

pub mod bollinger;
pub mod macd;
pub mod rsi;
pub mod stochastic;

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::config::IndicatorConfig;
use crate::domain::ohlcv::Series;
use crate::domain::window::rolling_mean;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndicatorType {
    Sma(usize),
    Macd {
        fast: usize,
        slow: usize,
    },
    MacdSignal {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    MacdOscillator {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    BollingerUpper {
        period: usize,
        width_x100: u32,
    },
    BollingerLower {
        period: usize,
        width_x100: u32,
    },
    Rsi(usize),
    StochasticK {
        k_period: usize,
        smoothing: usize,
    },
    StochasticD {
        k_period: usize,
        smoothing: usize,
        d_period: usize,
    },
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "MA{}", period),
            IndicatorType::Macd { fast, slow } => write!(f, "MACD({},{})", fast, slow),
            IndicatorType::MacdSignal { fast, slow, signal } => {
                write!(f, "MACD_SIGNAL({},{},{})", fast, slow, signal)
            }
            IndicatorType::MacdOscillator { fast, slow, signal } => {
                write!(f, "MACD_OSC({},{},{})", fast, slow, signal)
            }
            IndicatorType::BollingerUpper { period, width_x100 } => {
                write!(f, "BOLL_HI({},{})", period, *width_x100 as f64 / 100.0)
            }
            IndicatorType::BollingerLower { period, width_x100 } => {
                write!(f, "BOLL_LO({},{})", period, *width_x100 as f64 / 100.0)
            }
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::StochasticK {
                k_period,
                smoothing,
            } => write!(f, "STO_K({},{})", k_period, smoothing),
            IndicatorType::StochasticD {
                k_period,
                smoothing,
                d_period,
            } => write!(f, "STO_D({},{},{})", k_period, smoothing, d_period),
        }
    }
}

/// Indicator values for one series, keyed by indicator.
///
/// Built in one pass by [`IndicatorSet::compute`]; a set is never patched in
/// place, so replacing it after a resample is a single assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    len: usize,
    values: BTreeMap<IndicatorType, Vec<f64>>,
}

impl IndicatorSet {
    pub fn compute(series: &Series, config: &IndicatorConfig) -> Self {
        let close = series.closes();
        let low = series.lows();
        let high = series.highs();
        let floor = config.depth;
        let mut values = BTreeMap::new();

        for &period in &config.ma_periods {
            values.insert(IndicatorType::Sma(period), rolling_mean(&close, period));
        }

        let (fast, slow, signal) = (config.macd_fast, config.macd_slow, config.macd_signal);
        let macd_line = macd::calculate_macd(&close, fast, slow, config.macd_normalized);
        let signal_line = macd::calculate_signal(&macd_line, signal);
        let oscillator = macd::calculate_oscillator(&macd_line, &signal_line);
        values.insert(IndicatorType::Macd { fast, slow }, macd_line);
        values.insert(IndicatorType::MacdSignal { fast, slow, signal }, signal_line);
        values.insert(IndicatorType::MacdOscillator { fast, slow, signal }, oscillator);

        let period = config.bollinger_period;
        let width_x100 = (config.bollinger_width * 100.0).round() as u32;
        let (upper, lower) = bollinger::calculate_bollinger(&close, period, config.bollinger_width);
        values.insert(IndicatorType::BollingerUpper { period, width_x100 }, upper);
        values.insert(IndicatorType::BollingerLower { period, width_x100 }, lower);

        values.insert(
            IndicatorType::Rsi(config.rsi_period),
            rsi::calculate_rsi(&close, config.rsi_period, floor),
        );

        let (k_period, smoothing, d_period) = (
            config.stochastic_k,
            config.stochastic_smoothing,
            config.stochastic_d,
        );
        let (slow_k, slow_d) = stochastic::calculate_stochastic(
            &close, &low, &high, k_period, smoothing, d_period, floor,
        );
        values.insert(
            IndicatorType::StochasticK {
                k_period,
                smoothing,
            },
            slow_k,
        );
        values.insert(
            IndicatorType::StochasticD {
                k_period,
                smoothing,
                d_period,
            },
            slow_d,
        );

        IndicatorSet {
            len: series.len(),
            values,
        }
    }

    /// Number of bars every indicator covers.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, indicator: &IndicatorType) -> Option<&[f64]> {
        self.values.get(indicator).map(Vec::as_slice)
    }

    /// Look up an indicator by its display name, e.g. `"RSI(15)"`.
    pub fn get_by_name(&self, name: &str) -> Option<&[f64]> {
        self.values
            .iter()
            .find(|(k, _)| k.to_string() == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn indicator_types(&self) -> impl Iterator<Item = &IndicatorType> {
        self.values.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IndicatorType, &[f64])> {
        self.values.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// All indicator values at one bar, in key order.
    pub fn row(&self, index: usize) -> Vec<(IndicatorType, f64)> {
        self.values
            .iter()
            .filter_map(|(k, v)| v.get(index).map(|x| (*k, *x)))
            .collect()
    }
}
