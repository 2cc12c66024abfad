//! Daily OHLCV bars and the validated series the engine consumes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::StockboardError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// Closed above its open.
    pub fn is_up(&self) -> bool {
        self.close > self.open
    }

    /// volume * close
    pub fn trade_value(&self) -> f64 {
        self.volume as f64 * self.close
    }

    fn check(&self) -> Result<(), String> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (name, value) in prices {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{name} must be a positive finite price, got {value}"));
            }
        }
        if self.low > self.high {
            return Err(format!("low {} above high {}", self.low, self.high));
        }
        if self.open.min(self.close) < self.low {
            return Err(format!(
                "open/close below low {} (open {}, close {})",
                self.low, self.open, self.close
            ));
        }
        if self.open.max(self.close) > self.high {
            return Err(format!(
                "open/close above high {} (open {}, close {})",
                self.high, self.open, self.close
            ));
        }
        Ok(())
    }
}

/// Ascending, duplicate-free sequence of daily bars for one ticker.
///
/// Only constructible through [`PriceSeries::new`], so every series the
/// engine sees has already passed bar and ordering validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, StockboardError> {
        for (index, bar) in bars.iter().enumerate() {
            bar.check().map_err(|reason| StockboardError::InvalidBar {
                index,
                date: bar.date,
                reason,
            })?;
            if index > 0 && bar.date <= bars[index - 1].date {
                return Err(StockboardError::UnorderedSeries {
                    index,
                    date: bar.date,
                });
            }
        }
        Ok(Self {
            ticker: ticker.into(),
            bars,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}
