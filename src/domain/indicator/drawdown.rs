//! Expanding maximum and percentage drawdown from it.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawdownPoint {
    pub running_max: f64,
    pub drawdown_pct: f64,
}

pub fn calculate_drawdown(closes: &[f64]) -> Vec<DrawdownPoint> {
    let mut peak = f64::NEG_INFINITY;
    closes
        .iter()
        .map(|&close| {
            if close > peak {
                peak = close;
            }
            DrawdownPoint {
                running_max: peak,
                drawdown_pct: (close - peak) / peak * 100.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drawdown_known_series() {
        let dd = calculate_drawdown(&[10.0, 12.0, 9.0, 15.0]);

        let peaks: Vec<f64> = dd.iter().map(|p| p.running_max).collect();
        assert_eq!(peaks, vec![10.0, 12.0, 12.0, 15.0]);

        let pct: Vec<f64> = dd.iter().map(|p| p.drawdown_pct).collect();
        assert_eq!(pct, vec![0.0, 0.0, -25.0, 0.0]);
    }

    #[test]
    fn drawdown_monotone_decline() {
        let dd = calculate_drawdown(&[100.0, 90.0, 80.0]);
        assert!(dd.iter().all(|p| p.running_max == 100.0));
        assert!((dd[2].drawdown_pct + 20.0).abs() < 1e-12);
    }

    #[test]
    fn drawdown_is_zero_at_new_highs() {
        let dd = calculate_drawdown(&[1.0, 2.0, 3.0]);
        assert!(dd.iter().all(|p| p.drawdown_pct == 0.0));
    }
}
