//! Rolling sample standard deviation.
//!
//! STDDEV(n)[i] = sqrt(sum((X[i-j] - mean)^2 for j in 0..n) / (n - 1))
//!
//! Input values may be undefined (e.g. the first daily return). A window that
//! would contain an undefined value is itself undefined, so the window
//! restarts after every gap.

use super::rolling::RollingWindow;

pub fn calculate_rolling_std(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut window = RollingWindow::new(period);
    values
        .iter()
        .map(|value| match value {
            Some(v) => {
                window.push(*v);
                window.sample_std()
            }
            None => {
                window.clear();
                None
            }
        })
        .collect()
}

/// Sample standard deviation of a whole slice; `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some((ss / (n - 1.0)).sqrt())
}
