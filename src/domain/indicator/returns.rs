//! Close-to-close return series.

/// (C[i] - C[i-1]) / C[i-1] * 100, undefined for the first bar.
pub fn calculate_daily_returns(closes: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(
        closes
            .windows(2)
            .map(|w| Some((w[1] - w[0]) / w[0] * 100.0)),
    );
    out
}

/// (C[i] / C[0] - 1) * 100
pub fn calculate_cumulative_returns(closes: &[f64]) -> Vec<f64> {
    let Some(&base) = closes.first() else {
        return Vec::new();
    };
    closes.iter().map(|c| (c / base - 1.0) * 100.0).collect()
}
