//! CSV file series adapter.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::domain::error::VtradeError;
use crate::domain::ohlcv::{Bar, Series};
use crate::ports::data_port::SeriesPort;

pub const REQUIRED_COLUMNS: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<CsvRow> for Bar {
    fn from(row: CsvRow) -> Self {
        Bar {
            timestamp: row.timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse a headered OHLCV table. Extra columns are ignored.
pub fn read_series<R: Read>(reader: R) -> Result<Series, VtradeError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| VtradeError::validation(format!("unreadable header: {e}")))?
        .clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h == **col))
    {
        return Err(VtradeError::validation(format!(
            "missing column '{missing}'"
        )));
    }

    let mut bars = Vec::new();
    for (i, result) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = result.map_err(|e| VtradeError::validation(format!("row {i}: {e}")))?;
        bars.push(Bar::from(row));
    }
    if bars.is_empty() {
        return Err(VtradeError::validation("no rows"));
    }

    Series::new(bars)
}

impl SeriesPort for CsvAdapter {
    fn load_series(&self) -> Result<Series, VtradeError> {
        let file = File::open(&self.path)?;
        let series = read_series(file)?;
        info!(
            path = %self.path.display(),
            bars = series.len(),
            interval_minutes = series.interval_minutes(),
            "series loaded"
        );
        Ok(series)
    }
}

/// Write a series in the same layout [`read_series`] accepts.
pub fn write_series<W: std::io::Write>(writer: W, bars: &[Bar]) -> Result<(), VtradeError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(REQUIRED_COLUMNS)?;
    for b in bars {
        wtr.write_record(&[
            b.timestamp.to_string(),
            b.open.to_string(),
            b.high.to_string(),
            b.low.to_string(),
            b.close.to_string(),
            b.volume.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
