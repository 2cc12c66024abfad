//! Indicator engine configuration and report-style presets.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::StockboardError;
use super::indicator::anomaly::AnomalyConfig;
use super::indicator::bollinger::BollingerConfig;
use super::indicator::IndicatorKind;

pub const DEFAULT_RISK_FREE_PCT: f64 = 3.0;
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineConfig {
    pub ma_windows: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger: Option<BollingerConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly: Option<AnomalyConfig>,
    pub volatility_window: usize,
    pub volume_spike_sigma: f64,
    pub risk_free_pct: f64,
    pub trading_days_per_year: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ma_windows: vec![5, 20, 60],
            bollinger: Some(BollingerConfig::default()),
            anomaly: None,
            volatility_window: 20,
            volume_spike_sigma: 2.0,
            risk_free_pct: DEFAULT_RISK_FREE_PCT,
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), StockboardError> {
        let invalid = |reason: String| Err(StockboardError::InvalidConfig { reason });

        if self.ma_windows.contains(&0) {
            return invalid("moving-average window must be at least 1".into());
        }
        if let Some(bb) = &self.bollinger {
            if bb.period < 2 {
                return invalid(format!("bollinger period must be at least 2, got {}", bb.period));
            }
            if !bb.multiplier.is_finite() || bb.multiplier < 0.0 {
                return invalid(format!(
                    "bollinger multiplier must be non-negative, got {}",
                    bb.multiplier
                ));
            }
        }
        if let Some(an) = &self.anomaly {
            for (name, p) in [
                ("volume_percentile", an.volume_percentile),
                ("upper_percentile", an.upper_percentile),
                ("lower_percentile", an.lower_percentile),
            ] {
                if !(0.0..=1.0).contains(&p) {
                    return invalid(format!("{name} must be within [0, 1], got {p}"));
                }
            }
            if an.lower_percentile > an.upper_percentile {
                return invalid("lower_percentile must not exceed upper_percentile".into());
            }
        }
        if self.volatility_window < 2 {
            return invalid(format!(
                "volatility window must be at least 2, got {}",
                self.volatility_window
            ));
        }
        if !self.volume_spike_sigma.is_finite() || self.volume_spike_sigma < 0.0 {
            return invalid("volume_spike_sigma must be non-negative".into());
        }
        if !self.risk_free_pct.is_finite() {
            return invalid("risk_free_pct must be finite".into());
        }
        if !self.trading_days_per_year.is_finite() || self.trading_days_per_year <= 0.0 {
            return invalid("trading_days_per_year must be positive".into());
        }
        Ok(())
    }

    /// Indicator overlays this configuration produces, in display order.
    pub fn overlays(&self) -> Vec<IndicatorKind> {
        let mut kinds: Vec<IndicatorKind> =
            self.ma_windows.iter().map(|&w| IndicatorKind::Sma(w)).collect();
        if let Some(bb) = &self.bollinger {
            kinds.push(IndicatorKind::Bollinger {
                period: bb.period,
                multiplier_x100: (bb.multiplier * 100.0).round() as u32,
            });
        }
        kinds
    }
}

/// The dashboard variants, each a preset of [`EngineConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStyle {
    /// Candles, MA 5/20/60 and volume.
    #[default]
    Standard,
    /// Bollinger channel, MA 20/60/120 and volume/return anomaly markers.
    Kakao,
    /// KPI tiles, Bollinger channel, monthly breakdowns and risk panels.
    Annual,
}

impl ReportStyle {
    pub fn engine_config(self) -> EngineConfig {
        match self {
            ReportStyle::Standard => EngineConfig {
                bollinger: None,
                ..EngineConfig::default()
            },
            ReportStyle::Kakao => EngineConfig {
                ma_windows: vec![20, 60, 120],
                anomaly: Some(AnomalyConfig::default()),
                ..EngineConfig::default()
            },
            ReportStyle::Annual => EngineConfig::default(),
        }
    }
}

impl fmt::Display for ReportStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportStyle::Standard => "standard",
            ReportStyle::Kakao => "kakao",
            ReportStyle::Annual => "annual",
        };
        f.write_str(name)
    }
}

impl FromStr for ReportStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(ReportStyle::Standard),
            "kakao" | "signals" => Ok(ReportStyle::Kakao),
            "annual" | "report" => Ok(ReportStyle::Annual),
            other => Err(format!(
                "unknown report style '{other}' (expected standard, kakao or annual)"
            )),
        }
    }
}
