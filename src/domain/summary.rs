//! Whole-period statistics over a computed indicator table.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::engine_config::EngineConfig;
use super::indicator::stddev::sample_std;
use super::indicator::IndicatorRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub start_price: f64,
    pub end_price: f64,
    pub period_return_pct: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub max_drawdown_pct: f64,
    pub total_days: usize,
    pub up_days: usize,
    pub down_days: usize,
    pub win_rate_pct: f64,
    /// Mean of the positive daily returns; `None` without any up move.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_gain_pct: Option<f64>,
    /// Mean absolute value of the negative daily returns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_loss_pct: Option<f64>,
    pub profit_loss_ratio: f64,
    pub annualized_volatility_pct: f64,
    pub sharpe_ratio: f64,
    pub monthly: Vec<MonthlyBreakdown>,
}

/// One calendar month (1-12) pooled across every year in the series.
/// First and last close are taken in date order, so for a multi-year range
/// `first_close` comes from the earliest year and `last_close` from the latest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBreakdown {
    pub month: u32,
    pub first_close: f64,
    pub last_close: f64,
    pub return_pct: f64,
    pub avg_trade_value: f64,
    pub trading_days: usize,
}

#[derive(Default)]
struct MonthAccumulator {
    first_close: f64,
    last_close: f64,
    trade_value_sum: f64,
    days: usize,
}

impl SummaryStatistics {
    /// `rows` must be non-empty; the engine checks this before calling.
    pub fn compute(rows: &[IndicatorRow], config: &EngineConfig) -> Self {
        let start_price = rows.first().map(|r| r.bar.close).unwrap_or_default();
        let end_price = rows.last().map(|r| r.bar.close).unwrap_or_default();
        let period_return_pct = if start_price > 0.0 {
            (end_price - start_price) / start_price * 100.0
        } else {
            0.0
        };

        let mut high_price = f64::NEG_INFINITY;
        let mut low_price = f64::INFINITY;
        let mut max_drawdown_pct = f64::INFINITY;
        let mut up_days = 0usize;
        let mut returns: Vec<f64> = Vec::with_capacity(rows.len());
        let mut gain_sum = 0.0_f64;
        let mut gain_count = 0usize;
        let mut loss_sum = 0.0_f64;
        let mut loss_count = 0usize;
        let mut months: BTreeMap<u32, MonthAccumulator> = BTreeMap::new();

        for row in rows {
            high_price = high_price.max(row.bar.high);
            low_price = low_price.min(row.bar.low);
            max_drawdown_pct = max_drawdown_pct.min(row.drawdown_pct);
            if row.is_up {
                up_days += 1;
            }

            if let Some(r) = row.daily_return_pct {
                returns.push(r);
                if r > 0.0 {
                    gain_sum += r;
                    gain_count += 1;
                } else if r < 0.0 {
                    loss_sum += r.abs();
                    loss_count += 1;
                }
            }

            let month = months.entry(row.bar.date.month()).or_insert_with(|| MonthAccumulator {
                first_close: row.bar.close,
                ..MonthAccumulator::default()
            });
            month.last_close = row.bar.close;
            month.trade_value_sum += row.trade_value;
            month.days += 1;
        }

        let total_days = rows.len();
        let down_days = total_days - up_days;
        let win_rate_pct = if total_days > 0 {
            up_days as f64 / total_days as f64 * 100.0
        } else {
            0.0
        };

        let avg_gain_pct = (gain_count > 0).then(|| gain_sum / gain_count as f64);
        let avg_loss_pct = (loss_count > 0).then(|| loss_sum / loss_count as f64);
        let profit_loss_ratio = match avg_loss_pct {
            Some(loss) if loss > 0.0 => avg_gain_pct.unwrap_or(0.0) / loss,
            _ => 0.0,
        };

        let annualized_volatility_pct = sample_std(&returns)
            .map(|s| s * config.trading_days_per_year.sqrt())
            .unwrap_or(0.0);
        let sharpe_ratio = if annualized_volatility_pct > 0.0 {
            (period_return_pct - config.risk_free_pct) / annualized_volatility_pct
        } else {
            0.0
        };

        let monthly = months
            .into_iter()
            .map(|(month, acc)| MonthlyBreakdown {
                month,
                first_close: acc.first_close,
                last_close: acc.last_close,
                return_pct: (acc.last_close - acc.first_close) / acc.first_close * 100.0,
                avg_trade_value: acc.trade_value_sum / acc.days as f64,
                trading_days: acc.days,
            })
            .collect();

        SummaryStatistics {
            start_price,
            end_price,
            period_return_pct,
            high_price,
            low_price,
            max_drawdown_pct: if max_drawdown_pct.is_finite() { max_drawdown_pct } else { 0.0 },
            total_days,
            up_days,
            down_days,
            win_rate_pct,
            avg_gain_pct,
            avg_loss_pct,
            profit_loss_ratio,
            annualized_volatility_pct,
            sharpe_ratio,
            monthly,
        }
    }

    /// (month, first-to-last close return %) per calendar month present.
    pub fn monthly_returns(&self) -> Vec<(u32, f64)> {
        self.monthly.iter().map(|m| (m.month, m.return_pct)).collect()
    }

    /// (month, mean trade value) per calendar month present.
    pub fn monthly_avg_trade_value(&self) -> Vec<(u32, f64)> {
        self.monthly
            .iter()
            .map(|m| (m.month, m.avg_trade_value))
            .collect()
    }
}

/// Quote header for the most recent bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestQuote {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub change: f64,
    pub change_pct: f64,
}

impl LatestQuote {
    pub fn from_rows(rows: &[IndicatorRow]) -> Option<Self> {
        let last = &rows.last()?.bar;
        let prev_close = rows
            .len()
            .checked_sub(2)
            .map(|i| rows[i].bar.close)
            .unwrap_or(last.close);
        let change = last.close - prev_close;
        Some(Self {
            date: last.date,
            open: last.open,
            high: last.high,
            low: last.low,
            close: last.close,
            volume: last.volume,
            change,
            change_pct: change / prev_close * 100.0,
        })
    }
}

/// Equal-width histogram of the defined daily returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnHistogram {
    pub lower: f64,
    pub upper: f64,
    pub counts: Vec<usize>,
}

impl ReturnHistogram {
    pub const DEFAULT_BINS: usize = 40;

    pub fn from_rows(rows: &[IndicatorRow], bins: usize) -> Option<Self> {
        let returns: Vec<f64> = rows.iter().filter_map(|r| r.daily_return_pct).collect();
        if returns.is_empty() || bins == 0 {
            return None;
        }

        let mut lower = returns.iter().copied().fold(f64::INFINITY, f64::min);
        let mut upper = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if upper == lower {
            lower -= 0.5;
            upper += 0.5;
        }
        let width = (upper - lower) / bins as f64;

        let mut counts = vec![0usize; bins];
        for r in returns {
            let idx = (((r - lower) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Some(Self {
            lower,
            upper,
            counts,
        })
    }

    pub fn bin_width(&self) -> f64 {
        (self.upper - self.lower) / self.counts.len() as f64
    }
}
