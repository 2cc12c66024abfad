//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i])
//! Warmup: first (n-1) bars are undefined.

use super::rolling::RollingWindow;

pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut window = RollingWindow::new(period);
    closes
        .iter()
        .map(|&close| {
            window.push(close);
            window.mean()
        })
        .collect()
}
