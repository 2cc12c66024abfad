//! Fixed-size trailing window with O(1) mean and sample variance updates.
//!
//! Values enter at the back and leave at the front once `period` values are
//! held. The mean and the centered sum of squares (`m2`) are updated on every
//! push (Welford), and on eviction the outgoing value is replaced in a single
//! step, so a window of identical values keeps `m2 == 0.0` exactly.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RollingWindow {
    period: usize,
    values: VecDeque<f64>,
    mean: f64,
    m2: f64,
}

impl RollingWindow {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            values: VecDeque::with_capacity(period),
            mean: 0.0,
            m2: 0.0,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.period == 0 {
            return;
        }

        if self.period == 1 {
            self.values.clear();
            self.mean = value;
            self.m2 = 0.0;
        } else if self.values.len() < self.period {
            let count = (self.values.len() + 1) as f64;
            let delta = value - self.mean;
            self.mean += delta / count;
            self.m2 += delta * (value - self.mean);
        } else if let Some(evicted) = self.values.pop_front() {
            let n = self.period as f64;
            let prev_mean = self.mean;
            let shift = value - evicted;
            self.mean = prev_mean + shift / n;
            self.m2 += shift * (value - self.mean + evicted - prev_mean);
        }

        if self.m2 < 0.0 {
            self.m2 = 0.0;
        }
        self.values.push_back(value);
    }

    /// Drop all held values, e.g. when the input has a gap.
    pub fn clear(&mut self) {
        self.values.clear();
        self.mean = 0.0;
        self.m2 = 0.0;
    }

    pub fn is_full(&self) -> bool {
        self.period > 0 && self.values.len() == self.period
    }

    /// Mean of the window, only once it holds exactly `period` values.
    pub fn mean(&self) -> Option<f64> {
        self.is_full().then_some(self.mean)
    }

    /// Sample standard deviation (divides by `period - 1`).
    pub fn sample_std(&self) -> Option<f64> {
        if !self.is_full() || self.period < 2 {
            return None;
        }
        Some((self.m2 / (self.period - 1) as f64).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn undefined_until_full() {
        let mut w = RollingWindow::new(3);
        w.push(1.0);
        assert_eq!(w.mean(), None);
        w.push(2.0);
        assert_eq!(w.mean(), None);
        assert_eq!(w.sample_std(), None);
        w.push(3.0);
        assert_relative_eq!(w.mean().unwrap(), 2.0);
        assert_relative_eq!(w.sample_std().unwrap(), 1.0);
    }

    #[test]
    fn slides_over_values() {
        let mut w = RollingWindow::new(3);
        for v in [100.0, 102.0, 101.0, 105.0] {
            w.push(v);
        }
        // window is now [102, 101, 105]
        assert_relative_eq!(w.mean().unwrap(), 308.0 / 3.0, epsilon = 1e-12);
        let mean = 308.0 / 3.0;
        let var = ((102.0_f64 - mean).powi(2) + (101.0_f64 - mean).powi(2) + (105.0_f64 - mean).powi(2)) / 2.0;
        assert_relative_eq!(w.sample_std().unwrap(), var.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn sliding_matches_two_pass_on_long_input() {
        let values: Vec<f64> = (0..500)
            .map(|i| 1000.0 + ((i * 37) % 101) as f64 * 1.5 - (i % 7) as f64)
            .collect();
        let period = 20;
        let mut w = RollingWindow::new(period);
        for (i, &v) in values.iter().enumerate() {
            w.push(v);
            if i + 1 >= period {
                let window = &values[i + 1 - period..=i];
                let mean = window.iter().sum::<f64>() / period as f64;
                let var = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>()
                    / (period - 1) as f64;
                assert_relative_eq!(w.mean().unwrap(), mean, epsilon = 1e-9);
                assert_relative_eq!(w.sample_std().unwrap(), var.sqrt(), epsilon = 1e-7);
            }
        }
    }

    #[test]
    fn constant_values_have_exactly_zero_std() {
        let mut w = RollingWindow::new(20);
        for _ in 0..60 {
            w.push(48_350.7);
        }
        assert_eq!(w.sample_std(), Some(0.0));
        assert_eq!(w.mean(), Some(48_350.7));
    }

    #[test]
    fn period_one_has_mean_but_no_std() {
        let mut w = RollingWindow::new(1);
        w.push(7.0);
        w.push(9.0);
        assert_eq!(w.mean(), Some(9.0));
        assert_eq!(w.sample_std(), None);
    }

    #[test]
    fn clear_resets_window() {
        let mut w = RollingWindow::new(2);
        w.push(1.0);
        w.push(2.0);
        assert!(w.is_full());
        w.clear();
        assert!(!w.is_full());
        w.push(5.0);
        w.push(5.0);
        assert_eq!(w.mean(), Some(5.0));
        assert_eq!(w.sample_std(), Some(0.0));
    }
}
