//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is the sample standard deviation (divides by N-1), matching
//! the trailing-window convention used for every other rolling field.
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use serde::Serialize;

use super::rolling::RollingWindow;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerConfig {
    pub period: usize,
    pub multiplier: f64,
}

impl Default for BollingerConfig {
    fn default() -> Self {
        Self {
            period: 20,
            multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerBand {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
    pub std_dev: f64,
}

pub fn calculate_bollinger(closes: &[f64], config: &BollingerConfig) -> Vec<Option<BollingerBand>> {
    let mut window = RollingWindow::new(config.period);
    closes
        .iter()
        .map(|&close| {
            window.push(close);
            let middle = window.mean()?;
            let std_dev = window.sample_std()?;
            Some(BollingerBand {
                middle,
                upper: middle + config.multiplier * std_dev,
                lower: middle - config.multiplier * std_dev,
                std_dev,
            })
        })
        .collect()
}
