//! CSV file data adapter.
//!
//! One file per ticker, `<base>/<TICKER>.csv`, with the header
//! `date,open,high,low,close,volume` and `%Y-%m-%d` dates.

use crate::domain::error::StockboardError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const EXTENSION: &str = "csv";

/// One file row. Volume is signed here so a negative value surfaces as
/// `InvalidBar` at its zero-based data row.
#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
}

impl CsvRow {
    fn into_bar(self, index: usize) -> Result<PriceBar, StockboardError> {
        let volume = u64::try_from(self.volume).map_err(|_| StockboardError::InvalidBar {
            index,
            date: self.date,
            reason: format!("volume must be non-negative, got {}", self.volume),
        })?;
        Ok(PriceBar {
            date: self.date,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume,
        })
    }
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{ticker}.{EXTENSION}"))
    }

    /// Every bar in the ticker's file, sorted by date. `Ok(None)` when the
    /// file does not exist.
    fn read_all(&self, ticker: &str) -> Result<Option<Vec<PriceBar>>, StockboardError> {
        let path = self.csv_path(ticker);
        if !path.exists() {
            return Ok(None);
        }
        debug!(path = %path.display(), "reading price file");

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| {
                StockboardError::source_unavailable(format!(
                    "failed to read {}: {e}",
                    path.display()
                ))
            })?;

        let mut bars = Vec::new();
        for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = result.map_err(|e| {
                StockboardError::source_unavailable(format!(
                    "{} row {}: {e}",
                    path.display(),
                    line + 1
                ))
            })?;
            bars.push(row.into_bar(line)?);
        }
        bars.sort_by_key(|b| b.date);
        Ok(Some(bars))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_daily_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, StockboardError> {
        let Some(all) = self.read_all(ticker)? else {
            warn!(ticker, "no price file found");
            return Err(StockboardError::NoData {
                ticker: ticker.to_string(),
            });
        };

        let bars: Vec<PriceBar> = all
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect();
        if bars.is_empty() {
            return Err(StockboardError::NoData {
                ticker: ticker.to_string(),
            });
        }
        debug!(ticker, bars = bars.len(), "loaded bars from csv");
        PriceSeries::new(ticker, bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockboardError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            StockboardError::source_unavailable(format!(
                "failed to read directory {}: {e}",
                self.base_path.display()
            ))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                StockboardError::source_unavailable(format!("directory entry error: {e}"))
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                symbols.push(stem.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockboardError> {
        let bars = match self.read_all(ticker)? {
            Some(bars) => bars,
            None => return Ok(None),
        };
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, bars.len()))),
            _ => Ok(None),
        }
    }
}
