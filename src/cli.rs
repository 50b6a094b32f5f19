//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::console::run_session;
use crate::adapters::csv_adapter::{CsvAdapter, write_series};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config::{IndicatorConfig, VtradeConfig};
use crate::domain::config_validation::load_config;
use crate::domain::error::VtradeError;
use crate::domain::indicator::IndicatorSet;
use crate::domain::ohlcv::Series;
use crate::domain::resample::{ResampleSpec, resample};
use crate::domain::simulator::ReplaySimulator;
use crate::domain::synthetic::{self, MixWeight};
use crate::ports::data_port::SeriesPort;

#[derive(Parser, Debug)]
#[command(name = "vtrade", about = "Visual replay backtester for manual trading")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a series interactively on stdin
    Replay {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show bar count, time range and interval of a series
    Info {
        #[arg(short, long)]
        data: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print indicator values as CSV
    Indicators {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Resample to this many minutes per bar first
        #[arg(short, long)]
        interval: Option<u32>,
        /// Number of trailing bars to print
        #[arg(short, long, default_value_t = 10)]
        last: usize,
    },
    /// Derive a synthetic series and print it as CSV
    Augment {
        #[arg(short, long)]
        data: PathBuf,
        /// Price tick for re-quantization
        #[arg(long, default_value_t = 1.0)]
        depth: f64,
        #[arg(long)]
        seed: Option<u64>,
        #[command(subcommand)]
        op: AugmentOp,
    },
}

#[derive(Subcommand, Debug)]
pub enum AugmentOp {
    /// Mirror prices around the geometric mean close of an anchor window
    Invert {
        #[arg(long, default_value_t = 0)]
        start: usize,
        #[arg(long)]
        length: usize,
    },
    /// Geometric blend with a second series of equal length
    Mixup {
        #[arg(long)]
        other: PathBuf,
        #[arg(long)]
        weight: Option<f64>,
        /// Sample the weight from Uniform(0, 1) instead of Beta(0.5, 0.5)
        #[arg(long)]
        uniform: bool,
    },
    /// Shift all prices by one random offset
    Offset {
        #[arg(long, default_value_t = 0.05)]
        level: f64,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Replay { data, config } => run_replay(&data, config.as_deref()),
        Command::Info { data } => run_info(&data),
        Command::Validate { config } => run_validate(&config),
        Command::Indicators {
            data,
            config,
            interval,
            last,
        } => run_indicators(&data, config.as_deref(), interval, last),
        Command::Augment {
            data,
            depth,
            seed,
            op,
        } => run_augment(&data, depth, seed, op),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_vtrade_config(path: Option<&Path>) -> Result<VtradeConfig, VtradeError> {
    match path {
        Some(p) => {
            info!(path = %p.display(), "loading config");
            load_config(&FileConfigAdapter::from_file(p)?)
        }
        None => Ok(VtradeConfig::default()),
    }
}

fn load_series(path: &Path) -> Result<Series, VtradeError> {
    CsvAdapter::new(path.to_path_buf()).load_series()
}

fn run_replay(data: &Path, config: Option<&Path>) -> Result<(), VtradeError> {
    let config = load_vtrade_config(config)?;
    let series = load_series(data)?;
    let mut sim = ReplaySimulator::new(series, config)?;

    let stdin = io::stdin();
    run_session(&mut sim, stdin.lock(), io::stdout().lock())
}

fn run_info(data: &Path) -> Result<(), VtradeError> {
    let series = load_series(data)?;
    let bars = series.bars();
    let fmt = |i: usize| {
        bars[i]
            .datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| bars[i].timestamp.to_string())
    };

    let mut out = io::stdout().lock();
    writeln!(out, "bars: {}", series.len())?;
    writeln!(out, "from: {}", fmt(0))?;
    writeln!(out, "to: {}", fmt(series.last_index()))?;
    writeln!(out, "interval: {}m", series.interval_minutes())?;
    Ok(())
}

fn run_validate(config: &Path) -> Result<(), VtradeError> {
    load_vtrade_config(Some(config))?;
    println!("{}: OK", config.display());
    Ok(())
}

/// Indicator table for the trailing `last` bars, one column per indicator.
pub fn write_indicator_table<W: Write>(
    writer: W,
    series: &Series,
    config: &IndicatorConfig,
    last: usize,
) -> Result<(), VtradeError> {
    let set = IndicatorSet::compute(series, config);
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["timestamp".to_string(), "close".to_string()];
    header.extend(set.indicator_types().map(ToString::to_string));
    wtr.write_record(&header)?;

    let start = series.len().saturating_sub(last);
    for (i, bar) in series.bars().iter().enumerate().skip(start) {
        let mut record = vec![bar.timestamp.to_string(), bar.close.to_string()];
        record.extend(set.row(i).into_iter().map(|(_, v)| format!("{v:.6}")));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn run_indicators(
    data: &Path,
    config: Option<&Path>,
    interval: Option<u32>,
    last: usize,
) -> Result<(), VtradeError> {
    let config = load_vtrade_config(config)?;
    let mut series = load_series(data)?;

    if let Some(target) = interval.or(config.simulation.resample_interval) {
        series = resample(&series, ResampleSpec::new(target, series.interval_minutes())?)?;
    }

    write_indicator_table(io::stdout().lock(), &series, &config.indicators, last)
}

fn run_augment(
    data: &Path,
    depth: f64,
    seed: Option<u64>,
    op: AugmentOp,
) -> Result<(), VtradeError> {
    if depth <= 0.0 {
        return Err(VtradeError::ConfigInvalid {
            section: "augment".to_string(),
            key: "depth".to_string(),
            reason: "depth must be positive".to_string(),
        });
    }

    let series = load_series(data)?;
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let bars = match op {
        AugmentOp::Invert { start, length } => {
            synthetic::invert(series.bars(), start, length, depth)?
        }
        AugmentOp::Mixup {
            other,
            weight,
            uniform,
        } => {
            let other = load_series(&other)?;
            let weight = match (weight, uniform) {
                (Some(w), _) => MixWeight::Fixed(w),
                (None, true) => MixWeight::Uniform,
                (None, false) => MixWeight::Beta,
            };
            synthetic::mixup(series.bars(), other.bars(), weight, depth, &mut rng)?
        }
        AugmentOp::Offset { level } => {
            synthetic::add_random_offset(series.bars(), level, depth, &mut rng)?
        }
    };

    write_series(io::stdout().lock(), &bars)
}
