//! Replay simulator: paper trading over a historical series.
//!
//! The simulator owns the base series, the series currently replayed (the
//! base or a resampled copy), the indicators computed over it, and the
//! account state. All mutation goes through `initialize`, `step`, `buy`,
//! `sell`, `jump_to_timestamp` and `resample`.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::config::{IndicatorConfig, SimulationConfig, VtradeConfig};
use super::error::VtradeError;
use super::indicator::{IndicatorSet, IndicatorType};
use super::ohlcv::{Bar, Series};
use super::resample::{ResampleSpec, resample};

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub current_index: usize,
    pub start_index: usize,
    /// Signed quantity held: positive is long, negative is short.
    pub position: f64,
    pub equity: f64,
    /// Long quantity for display; zero while flat or short.
    pub bought: f64,
    /// Short quantity for display; zero while flat or long.
    pub sold: f64,
    /// Cumulative return in percent of seed money, one entry per step.
    pub profit_history: Vec<f64>,
}

impl SimulationState {
    fn fresh(start_index: usize, seed_money: f64) -> Self {
        SimulationState {
            current_index: start_index,
            start_index,
            position: 0.0,
            equity: seed_money,
            bought: 0.0,
            sold: 0.0,
            profit_history: vec![0.0],
        }
    }

    pub fn last_profit(&self) -> f64 {
        self.profit_history.last().copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced,
    /// The last bar had been reached; the session was re-initialized.
    Wrapped,
}

/// Where a timestamp-based move landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relocation {
    Located(usize),
    /// No bar matched; the session fell back to a default start.
    LookupFallback,
}

/// Point-in-time summary of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub datetime: Option<DateTime<Utc>>,
    pub price: f64,
    pub profit_pct: f64,
    pub equity: f64,
    pub position: f64,
}

#[derive(Debug)]
pub struct ReplaySimulator {
    config: SimulationConfig,
    indicator_config: IndicatorConfig,
    base: Series,
    series: Series,
    indicators: IndicatorSet,
    state: SimulationState,
    rng: StdRng,
}

impl ReplaySimulator {
    /// Build a simulator over `base` and pick a random start.
    ///
    /// When `resample_interval` is configured the session starts on the
    /// resampled series.
    pub fn new(base: Series, config: VtradeConfig) -> Result<Self, VtradeError> {
        let VtradeConfig {
            simulation,
            indicators: indicator_config,
        } = config;

        if let Some(native) = simulation.native_interval {
            if native != base.interval_minutes() {
                return Err(VtradeError::config_invalid(
                    "simulation",
                    "native_interval",
                    format!(
                        "configured {}m but data is spaced {}m",
                        native,
                        base.interval_minutes()
                    ),
                ));
            }
        }

        let rng = match simulation.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let series = match simulation.resample_interval {
            Some(target) if target != base.interval_minutes() => {
                resample(&base, ResampleSpec::new(target, base.interval_minutes())?)?
            }
            _ => base.clone(),
        };
        let indicators = IndicatorSet::compute(&series, &indicator_config);
        let state = SimulationState::fresh(0, simulation.seed_money);

        let mut sim = ReplaySimulator {
            config: simulation,
            indicator_config,
            base,
            series,
            indicators,
            state,
            rng,
        };
        sim.initialize()?;
        Ok(sim)
    }

    /// Reset the account and start at a random bar with full warm-up behind it.
    pub fn initialize(&mut self) -> Result<(), VtradeError> {
        let len = self.series.len();
        self.check_history(len, self.config.display_length)?;

        let start = self
            .rng
            .gen_range(self.config.min_warmup..len - self.config.display_length);
        self.state = SimulationState::fresh(start, self.config.seed_money);
        info!(start, bars = len, "session initialized");
        Ok(())
    }

    /// Reset the account and start at an explicit bar.
    pub fn start_at(&mut self, index: usize) -> Result<(), VtradeError> {
        if index >= self.series.len() {
            return Err(VtradeError::InsufficientHistory {
                bars: self.series.len(),
                minimum: index,
            });
        }
        self.state = SimulationState::fresh(index, self.config.seed_money);
        debug!(start = index, "session started at fixed index");
        Ok(())
    }

    /// Advance one bar, marking the position to market.
    pub fn step(&mut self) -> Result<StepOutcome, VtradeError> {
        if self.state.current_index >= self.series.last_index() {
            self.initialize()?;
            return Ok(StepOutcome::Wrapped);
        }

        let bars = self.series.bars();
        let i = self.state.current_index + 1;
        let seed = self.config.seed_money;

        self.state.current_index = i;
        self.state.equity += self.state.position * (bars[i].close - bars[i - 1].close);
        self.state
            .profit_history
            .push(100.0 * (self.state.equity - seed) / seed);
        Ok(StepOutcome::Advanced)
    }

    pub fn buy(&mut self, quantity: f64, fee_pct: f64) {
        self.order(quantity, fee_pct);
    }

    pub fn sell(&mut self, quantity: f64, fee_pct: f64) {
        self.order(-quantity, fee_pct);
    }

    fn order(&mut self, signed_quantity: f64, fee_pct: f64) {
        let price = self.current_bar().close;
        let fee = signed_quantity.abs() * price * fee_pct / 100.0;

        let state = &mut self.state;
        state.position += signed_quantity;
        (state.bought, state.sold) = if state.position > 0.0 {
            (state.position, 0.0)
        } else {
            (0.0, -state.position)
        };
        state.equity -= fee;
        debug!(
            quantity = signed_quantity,
            price,
            fee,
            position = state.position,
            "order filled"
        );
    }

    /// Restart the session at the first bar at or after `target_ts`.
    pub fn jump_to_timestamp(&mut self, target_ts: i64) -> Result<Relocation, VtradeError> {
        self.initialize()?;

        let (index, relocation) = match self.series.find_first_at_or_after(target_ts) {
            Some(i) => (i, Relocation::Located(i)),
            None => {
                let fallback = self.config.display_length.min(self.series.last_index());
                warn!(target_ts, fallback, "no bar at or after target, using fallback start");
                (fallback, Relocation::LookupFallback)
            }
        };

        self.state.current_index = index;
        self.state.start_index = index;
        debug!(target_ts, index, "jumped");
        Ok(relocation)
    }

    /// Switch the replay to `target_interval` minute bars built from the base series.
    ///
    /// The account carries over and the replay continues from the bar
    /// covering the current timestamp. If that bar cannot be found the
    /// session is re-initialized. The resampled series must still hold
    /// enough history for a later restart. On error nothing changes.
    pub fn resample(
        &mut self,
        target_interval: u32,
        display_length: usize,
    ) -> Result<Relocation, VtradeError> {
        if display_length == 0 {
            return Err(VtradeError::config_invalid(
                "simulation",
                "display_length",
                "display_length must be at least 1",
            ));
        }

        let spec = ResampleSpec::new(target_interval, self.base.interval_minutes())?;
        let series = resample(&self.base, spec)?;
        let indicators = IndicatorSet::compute(&series, &self.indicator_config);
        let current_ts = self.current_bar().timestamp;

        self.check_history(series.len(), display_length)?;
        let located = series.find_first_at_or_after(current_ts);

        info!(
            interval = target_interval,
            bars = series.len(),
            "series resampled"
        );
        self.series = series;
        self.indicators = indicators;
        self.config.display_length = display_length;

        match located {
            Some(i) => {
                self.state.current_index = i;
                self.state.start_index = i;
                Ok(Relocation::Located(i))
            }
            None => {
                warn!(current_ts, "timestamp not covered after resample, resetting");
                self.initialize()?;
                Ok(Relocation::LookupFallback)
            }
        }
    }

    pub fn set_display_length(&mut self, display_length: usize) -> Result<(), VtradeError> {
        if display_length == 0 {
            return Err(VtradeError::config_invalid(
                "simulation",
                "display_length",
                "display_length must be at least 1",
            ));
        }
        self.check_history(self.series.len(), display_length)?;
        self.config.display_length = display_length;
        Ok(())
    }

    /// A random restart needs more than `min_warmup + display_length` bars.
    fn check_history(&self, bars: usize, display_length: usize) -> Result<(), VtradeError> {
        let minimum = self.config.min_warmup + display_length;
        if bars <= minimum {
            return Err(VtradeError::InsufficientHistory { bars, minimum });
        }
        Ok(())
    }

    pub fn set_fee_pct(&mut self, fee_pct: f64) -> Result<(), VtradeError> {
        if !(0.0..=100.0).contains(&fee_pct) {
            return Err(VtradeError::config_invalid(
                "simulation",
                "fee_pct",
                "fee_pct must be between 0 and 100",
            ));
        }
        self.config.fee_pct = fee_pct;
        Ok(())
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn base_series(&self) -> &Series {
        &self.base
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn indicators(&self) -> &IndicatorSet {
        &self.indicators
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn current_bar(&self) -> &Bar {
        &self.series.bars()[self.state.current_index]
    }

    fn display_range(&self) -> std::ops::Range<usize> {
        let end = self.state.current_index + 1;
        end.saturating_sub(self.config.display_length)..end
    }

    /// Up to `display_length` bars ending at the current bar.
    pub fn window(&self) -> &[Bar] {
        &self.series.bars()[self.display_range()]
    }

    /// Indicator values aligned with [`ReplaySimulator::window`].
    pub fn indicator_window(&self, indicator: &IndicatorType) -> Option<&[f64]> {
        let range = self.display_range();
        self.indicators.get(indicator).map(|v| &v[range])
    }

    /// Buy-and-hold return in percent from the start bar to each bar up to now.
    pub fn buy_and_hold_pct(&self) -> Vec<f64> {
        let bars = self.series.bars();
        let start = self.state.start_index.min(self.state.current_index);
        let base = bars[start].close;
        bars[start..=self.state.current_index]
            .iter()
            .map(|b| 100.0 * (b.close / base - 1.0))
            .collect()
    }

    pub fn report(&self) -> Snapshot {
        let bar = self.current_bar();
        Snapshot {
            datetime: bar.datetime(),
            price: bar.close,
            profit_pct: self.state.last_profit(),
            equity: self.state.equity,
            position: self.state.position,
        }
    }
}
