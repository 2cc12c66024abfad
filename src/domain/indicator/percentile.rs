//! Percentile by linear interpolation between order statistics.
//!
//! rank = p * (n - 1); the result interpolates between the values at
//! floor(rank) and ceil(rank) of the sorted sample.

/// `sorted` must be non-empty and ascending, and `p` within `[0, 1]`.
pub fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn percentile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(percentile_of_sorted(&v, 0.9), 4.6, epsilon = 1e-12);
        assert_relative_eq!(percentile_of_sorted(&v, 0.1), 1.4, epsilon = 1e-12);
        assert_eq!(percentile_of_sorted(&v, 0.5), 3.0);
    }

    #[test]
    fn percentile_bounds() {
        let v = [-1.0, 3.0, 8.0];
        assert_eq!(percentile_of_sorted(&v, 0.0), -1.0);
        assert_eq!(percentile_of_sorted(&v, 1.0), 8.0);
    }

    #[test]
    fn percentile_single_value() {
        assert_eq!(percentile_of_sorted(&[7.5], 0.1), 7.5);
        assert_eq!(percentile_of_sorted(&[7.5], 0.9), 7.5);
    }
}
