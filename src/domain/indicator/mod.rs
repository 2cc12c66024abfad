//! Technical indicator implementations.
//!
//! Each submodule turns a close (or return) series into a per-bar series of
//! `Option` values; `None` marks bars without enough history. This module
//! holds the per-row view the engine assembles from those series:
//! - `IndicatorRow`: one bar plus every derived field
//! - `IndicatorKind`: indicator identity + parameters, used for labels

pub mod anomaly;
pub mod bollinger;
pub mod drawdown;
pub mod percentile;
pub mod returns;
pub mod rolling;
pub mod sma;
pub mod stddev;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::domain::ohlcv::PriceBar;
use anomaly::AnomalySignal;
use bollinger::BollingerBand;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    #[serde(flatten)]
    pub bar: PriceBar,
    /// Window size -> SMA of close. Windows without enough history are absent.
    pub moving_averages: BTreeMap<usize, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger: Option<BollingerBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_return_pct: Option<f64>,
    pub cumulative_return_pct: f64,
    pub running_max_close: f64,
    pub drawdown_pct: f64,
    pub trade_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rolling_volatility: Option<f64>,
    pub is_up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_spike: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<AnomalySignal>,
}

impl IndicatorRow {
    pub fn ma(&self, window: usize) -> Option<f64> {
        self.moving_averages.get(&window).copied()
    }

    pub fn signal_buy(&self) -> bool {
        self.signal.is_some_and(|s| s.buy)
    }

    pub fn signal_down(&self) -> bool {
        self.signal.is_some_and(|s| s.down)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sma(usize),
    Bollinger {
        period: usize,
        multiplier_x100: u32,
    },
    RollingVolatility(usize),
    Drawdown,
    CumulativeReturn,
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Sma(period) => write!(f, "MA{}", period),
            IndicatorKind::Bollinger {
                period,
                multiplier_x100,
            } => {
                let mult = *multiplier_x100 as f64 / 100.0;
                write!(f, "BB({},{})", period, mult)
            }
            IndicatorKind::RollingVolatility(period) => {
                write!(f, "Rolling volatility ({}d)", period)
            }
            IndicatorKind::Drawdown => write!(f, "Drawdown"),
            IndicatorKind::CumulativeReturn => write!(f, "Cumulative return"),
        }
    }
}
