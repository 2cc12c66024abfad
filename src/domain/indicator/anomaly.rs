//! Volume/return anomaly markers.
//!
//! Thresholds are whole-series percentiles over the rows where both the daily
//! return and the volume are defined. A row is a buy signal when its volume
//! and its return both reach the upper percentiles, and a down signal when
//! its volume reaches the upper volume percentile while its return falls to
//! the lower return percentile.

use serde::Serialize;

use super::percentile::percentile_of_sorted;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalyConfig {
    pub volume_percentile: f64,
    pub upper_percentile: f64,
    pub lower_percentile: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            volume_percentile: 0.9,
            upper_percentile: 0.9,
            lower_percentile: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalyThresholds {
    pub volume_upper: f64,
    pub return_upper: f64,
    pub return_lower: f64,
    /// Number of rows that contributed to the percentiles.
    pub samples: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnomalySignal {
    pub buy: bool,
    pub down: bool,
}

impl AnomalyThresholds {
    /// `None` when no row has both inputs defined.
    pub fn from_samples(
        returns: &[Option<f64>],
        volumes: &[u64],
        config: &AnomalyConfig,
    ) -> Option<Self> {
        let (mut rets, mut vols): (Vec<f64>, Vec<f64>) = returns
            .iter()
            .zip(volumes)
            .filter_map(|(ret, &vol)| ret.map(|r| (r, vol as f64)))
            .unzip();
        if rets.is_empty() {
            return None;
        }
        rets.sort_by(f64::total_cmp);
        vols.sort_by(f64::total_cmp);

        Some(Self {
            volume_upper: percentile_of_sorted(&vols, config.volume_percentile),
            return_upper: percentile_of_sorted(&rets, config.upper_percentile),
            return_lower: percentile_of_sorted(&rets, config.lower_percentile),
            samples: rets.len(),
        })
    }

    pub fn classify(&self, daily_return: f64, volume: u64) -> AnomalySignal {
        let heavy = volume as f64 >= self.volume_upper;
        AnomalySignal {
            buy: heavy && daily_return >= self.return_upper,
            down: heavy && daily_return <= self.return_lower,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_skip_undefined_returns() {
        let returns = vec![None, Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)];
        let volumes = vec![1_000_000, 10, 20, 30, 40, 50];
        let t = AnomalyThresholds::from_samples(&returns, &volumes, &AnomalyConfig::default())
            .unwrap();

        assert_eq!(t.samples, 5);
        // the first row's volume must not leak into the volume percentile
        assert!((t.volume_upper - 46.0).abs() < 1e-9);
        assert!((t.return_upper - 4.6).abs() < 1e-9);
        assert!((t.return_lower - 1.4).abs() < 1e-9);
    }

    #[test]
    fn thresholds_none_without_samples() {
        let t = AnomalyThresholds::from_samples(&[None], &[100], &AnomalyConfig::default());
        assert!(t.is_none());
    }

    #[test]
    fn classify_requires_heavy_volume() {
        let t = AnomalyThresholds {
            volume_upper: 100.0,
            return_upper: 3.0,
            return_lower: -3.0,
            samples: 10,
        };
        assert_eq!(t.classify(5.0, 150), AnomalySignal { buy: true, down: false });
        assert_eq!(t.classify(-5.0, 100), AnomalySignal { buy: false, down: true });
        assert_eq!(t.classify(5.0, 99), AnomalySignal { buy: false, down: false });
        assert_eq!(t.classify(0.0, 500), AnomalySignal { buy: false, down: false });
    }

    #[test]
    fn classify_degenerate_thresholds_flag_both() {
        // p10 == p90 when every return is identical: a row at that exact
        // return satisfies both conditions.
        let t = AnomalyThresholds::from_samples(
            &[None, Some(1.0), Some(1.0), Some(1.0)],
            &[5, 5, 5, 5],
            &AnomalyConfig::default(),
        )
        .unwrap();
        assert_eq!(t.return_lower, t.return_upper);
        assert_eq!(t.classify(1.0, 5), AnomalySignal { buy: true, down: true });
    }
}
