//! Configuration loading and validation.
//!
//! Builds a [`VtradeConfig`] from a `ConfigPort`, applying defaults for
//! absent keys and rejecting values the simulator cannot run with.

use crate::domain::config::{IndicatorConfig, SimulationConfig, VtradeConfig};
use crate::domain::error::VtradeError;
use crate::ports::config_port::ConfigPort;

const SIMULATION: &str = "simulation";
const INDICATORS: &str = "indicators";

pub fn load_config(config: &dyn ConfigPort) -> Result<VtradeConfig, VtradeError> {
    Ok(VtradeConfig {
        simulation: load_simulation_config(config)?,
        indicators: load_indicator_config(config)?,
    })
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), VtradeError> {
    load_config(config).map(|_| ())
}

fn load_simulation_config(config: &dyn ConfigPort) -> Result<SimulationConfig, VtradeError> {
    let defaults = SimulationConfig::default();

    let seed_money = parse_or(config, SIMULATION, "seed_money", defaults.seed_money)?;
    if seed_money <= 0.0 {
        return Err(VtradeError::config_invalid(
            SIMULATION,
            "seed_money",
            "seed_money must be positive",
        ));
    }

    let fee_pct = parse_or(config, SIMULATION, "fee_pct", defaults.fee_pct)?;
    if !(0.0..=100.0).contains(&fee_pct) {
        return Err(VtradeError::config_invalid(
            SIMULATION,
            "fee_pct",
            "fee_pct must be between 0 and 100",
        ));
    }

    let quantity = parse_or(config, SIMULATION, "quantity", defaults.quantity)?;
    if quantity < 0.0 {
        return Err(VtradeError::config_invalid(
            SIMULATION,
            "quantity",
            "quantity must be non-negative",
        ));
    }

    let native_interval = parse_opt::<u32>(config, SIMULATION, "native_interval")?;
    let resample_interval = parse_opt::<u32>(config, SIMULATION, "resample_interval")?;
    for (key, value) in [
        ("native_interval", native_interval),
        ("resample_interval", resample_interval),
    ] {
        if value == Some(0) {
            return Err(VtradeError::config_invalid(
                SIMULATION,
                key,
                format!("{key} must be at least 1 minute"),
            ));
        }
    }

    Ok(SimulationConfig {
        seed_money,
        display_length: positive_or(config, SIMULATION, "display_length", defaults.display_length)?,
        fee_pct,
        quantity,
        min_warmup: parse_or(config, SIMULATION, "min_warmup", defaults.min_warmup)?,
        native_interval,
        resample_interval,
        rng_seed: parse_opt(config, SIMULATION, "rng_seed")?,
    })
}

fn load_indicator_config(config: &dyn ConfigPort) -> Result<IndicatorConfig, VtradeError> {
    let defaults = IndicatorConfig::default();

    let ma_periods = match config.get_string(INDICATORS, "ma_periods") {
        None => defaults.ma_periods.clone(),
        Some(raw) => parse_period_list(&raw)?,
    };

    let bollinger_width = parse_or(config, INDICATORS, "bollinger_width", defaults.bollinger_width)?;
    if bollinger_width < 0.0 {
        return Err(VtradeError::config_invalid(
            INDICATORS,
            "bollinger_width",
            "bollinger_width must be non-negative",
        ));
    }

    let depth = parse_or(config, INDICATORS, "depth", defaults.depth)?;
    if depth <= 0.0 {
        return Err(VtradeError::config_invalid(
            INDICATORS,
            "depth",
            "depth must be positive",
        ));
    }

    Ok(IndicatorConfig {
        ma_periods,
        macd_fast: positive_or(config, INDICATORS, "macd_fast", defaults.macd_fast)?,
        macd_slow: positive_or(config, INDICATORS, "macd_slow", defaults.macd_slow)?,
        macd_signal: positive_or(config, INDICATORS, "macd_signal", defaults.macd_signal)?,
        macd_normalized: config.get_bool(INDICATORS, "macd_normalized", defaults.macd_normalized),
        bollinger_period: positive_or(
            config,
            INDICATORS,
            "bollinger_period",
            defaults.bollinger_period,
        )?,
        bollinger_width,
        rsi_period: positive_or(config, INDICATORS, "rsi_period", defaults.rsi_period)?,
        stochastic_k: positive_or(config, INDICATORS, "stochastic_k", defaults.stochastic_k)?,
        stochastic_smoothing: positive_or(
            config,
            INDICATORS,
            "stochastic_smooth",
            defaults.stochastic_smoothing,
        )?,
        stochastic_d: positive_or(config, INDICATORS, "stochastic_d", defaults.stochastic_d)?,
        depth,
    })
}

fn parse_period_list(raw: &str) -> Result<Vec<usize>, VtradeError> {
    let mut periods = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token.parse::<usize>() {
            Ok(p) if p > 0 => {
                if !periods.contains(&p) {
                    periods.push(p);
                }
            }
            _ => {
                return Err(VtradeError::config_invalid(
                    INDICATORS,
                    "ma_periods",
                    format!("'{token}' is not a positive window length"),
                ));
            }
        }
    }
    Ok(periods)
}

fn parse_opt<T: std::str::FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, VtradeError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            VtradeError::config_invalid(section, key, format!("cannot parse '{}'", raw.trim()))
        }),
    }
}

fn parse_or<T: std::str::FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, VtradeError> {
    Ok(parse_opt(config, section, key)?.unwrap_or(default))
}

fn positive_or(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, VtradeError> {
    let value = parse_or(config, section, key, default)?;
    if value == 0 {
        return Err(VtradeError::config_invalid(
            section,
            key,
            format!("{key} must be at least 1"),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn empty_config_yields_defaults() {
        let config = make_config("");
        assert_eq!(load_config(&config).unwrap(), VtradeConfig::default());
    }

    #[test]
    fn full_config_is_parsed() {
        let config = make_config(
            r#"
[simulation]
seed_money = 5000
display_length = 50
fee_pct = 0.075
quantity = 0.5
min_warmup = 100
native_interval = 1
resample_interval = 60
rng_seed = 42

[indicators]
ma_periods = 5, 20
macd_fast = 12
macd_slow = 26
macd_signal = 9
macd_normalized = true
bollinger_period = 21
bollinger_width = 2.5
rsi_period = 14
stochastic_k = 14
stochastic_smooth = 3
stochastic_d = 3
depth = 0.01
"#,
        );
        let c = load_config(&config).unwrap();
        assert!((c.simulation.seed_money - 5000.0).abs() < f64::EPSILON);
        assert_eq!(c.simulation.display_length, 50);
        assert!((c.simulation.fee_pct - 0.075).abs() < f64::EPSILON);
        assert_eq!(c.simulation.min_warmup, 100);
        assert_eq!(c.simulation.native_interval, Some(1));
        assert_eq!(c.simulation.resample_interval, Some(60));
        assert_eq!(c.simulation.rng_seed, Some(42));
        assert_eq!(c.indicators.ma_periods, vec![5, 20]);
        assert_eq!(c.indicators.macd_fast, 12);
        assert!(c.indicators.macd_normalized);
        assert!((c.indicators.bollinger_width - 2.5).abs() < f64::EPSILON);
        assert_eq!(c.indicators.stochastic_smoothing, 3);
        assert!((c.indicators.depth - 0.01).abs() < f64::EPSILON);
    }

    #[test]
    fn seed_money_must_be_positive() {
        let config = make_config("[simulation]\nseed_money = 0\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, VtradeError::ConfigInvalid { key, .. } if key == "seed_money"));
    }

    #[test]
    fn negative_fee_fails() {
        let config = make_config("[simulation]\nfee_pct = -1\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, VtradeError::ConfigInvalid { key, .. } if key == "fee_pct"));
    }

    #[test]
    fn zero_display_length_fails() {
        let config = make_config("[simulation]\ndisplay_length = 0\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, VtradeError::ConfigInvalid { key, .. } if key == "display_length"));
    }

    #[test]
    fn non_numeric_window_fails() {
        let config = make_config("[indicators]\nrsi_period = abc\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, VtradeError::ConfigInvalid { key, .. } if key == "rsi_period"));
    }

    #[test]
    fn zero_window_fails() {
        let config = make_config("[indicators]\nmacd_slow = 0\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, VtradeError::ConfigInvalid { key, .. } if key == "macd_slow"));
    }

    #[test]
    fn bad_ma_period_list_fails() {
        let config = make_config("[indicators]\nma_periods = 5, x, 10\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, VtradeError::ConfigInvalid { key, .. } if key == "ma_periods"));
    }

    #[test]
    fn duplicate_ma_periods_collapse() {
        let config = make_config("[indicators]\nma_periods = 5,5,10\n");
        let c = load_config(&config).unwrap();
        assert_eq!(c.indicators.ma_periods, vec![5, 10]);
    }

    #[test]
    fn non_positive_depth_fails() {
        let config = make_config("[indicators]\ndepth = 0\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, VtradeError::ConfigInvalid { key, .. } if key == "depth"));
    }

    #[test]
    fn zero_resample_interval_fails() {
        let config = make_config("[simulation]\nresample_interval = 0\n");
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, VtradeError::ConfigInvalid { key, .. } if key == "resample_interval")
        );
    }
}
