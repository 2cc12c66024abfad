//! Indicator engine: price series in, indicator table and statistics out.
//!
//! `compute` is pure. It performs no I/O and keeps no state between calls, so
//! the same series and configuration always produce the same report.

use std::collections::BTreeMap;

use serde::Serialize;

use super::engine_config::EngineConfig;
use super::error::StockboardError;
use super::indicator::anomaly::AnomalyThresholds;
use super::indicator::bollinger::calculate_bollinger;
use super::indicator::drawdown::calculate_drawdown;
use super::indicator::returns::{calculate_cumulative_returns, calculate_daily_returns};
use super::indicator::sma::calculate_sma;
use super::indicator::stddev::{calculate_rolling_std, sample_std};
use super::indicator::IndicatorRow;
use super::ohlcv::PriceSeries;
use super::summary::{LatestQuote, SummaryStatistics};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorReport {
    pub ticker: String,
    pub config: EngineConfig,
    pub rows: Vec<IndicatorRow>,
    pub summary: SummaryStatistics,
    /// Percentile thresholds behind the anomaly signals. `None` when signals
    /// are disabled or no row had a defined return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<AnomalyThresholds>,
    /// mean + sigma * std of volume; `None` when the series is too short
    /// for a sample standard deviation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_spike_threshold: Option<f64>,
    pub latest: LatestQuote,
}

pub fn compute(series: &PriceSeries, config: &EngineConfig) -> Result<IndicatorReport, StockboardError> {
    if series.is_empty() {
        return Err(StockboardError::EmptySeries);
    }
    config.validate()?;

    let bars = series.bars();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<u64> = bars.iter().map(|b| b.volume).collect();

    let moving_averages: Vec<(usize, Vec<Option<f64>>)> = config
        .ma_windows
        .iter()
        .map(|&w| (w, calculate_sma(&closes, w)))
        .collect();
    let bands = config
        .bollinger
        .map(|cfg| calculate_bollinger(&closes, &cfg));
    let daily_returns = calculate_daily_returns(&closes);
    let cumulative = calculate_cumulative_returns(&closes);
    let volatility = calculate_rolling_std(&daily_returns, config.volatility_window);
    let drawdowns = calculate_drawdown(&closes);

    let volume_spike_threshold = volume_spike_threshold(&volumes, config.volume_spike_sigma);
    let thresholds = config
        .anomaly
        .and_then(|cfg| AnomalyThresholds::from_samples(&daily_returns, &volumes, &cfg));

    let rows: Vec<IndicatorRow> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let mas: BTreeMap<usize, f64> = moving_averages
                .iter()
                .filter_map(|(w, values)| values[i].map(|v| (*w, v)))
                .collect();
            let signal = match (&thresholds, daily_returns[i]) {
                (Some(t), Some(ret)) => Some(t.classify(ret, bar.volume)),
                _ => None,
            };
            IndicatorRow {
                bar: bar.clone(),
                moving_averages: mas,
                bollinger: bands.as_ref().and_then(|b| b[i]),
                daily_return_pct: daily_returns[i],
                cumulative_return_pct: cumulative[i],
                running_max_close: drawdowns[i].running_max,
                drawdown_pct: drawdowns[i].drawdown_pct,
                trade_value: bar.trade_value(),
                rolling_volatility: volatility[i],
                is_up: bar.is_up(),
                volume_spike: volume_spike_threshold.map(|t| bar.volume as f64 > t),
                signal,
            }
        })
        .collect();

    let summary = SummaryStatistics::compute(&rows, config);
    let latest = LatestQuote::from_rows(&rows).ok_or(StockboardError::EmptySeries)?;

    Ok(IndicatorReport {
        ticker: series.ticker().to_string(),
        config: config.clone(),
        rows,
        summary,
        thresholds,
        volume_spike_threshold,
        latest,
    })
}

fn volume_spike_threshold(volumes: &[u64], sigma: f64) -> Option<f64> {
    let values: Vec<f64> = volumes.iter().map(|&v| v as f64).collect();
    let std = sample_std(&values)?;
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some(mean + sigma * std)
}
