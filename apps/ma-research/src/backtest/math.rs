//! Statistical math utilities for the backtest engine.

use super::constants::STD_EPSILON;

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    Some(sum / values.len() as f64)
}

/// Calculate the sample standard deviation (n - 1 denominator).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let avg = mean(values)?;
    let variance_sum: f64 = values.iter().map(|v| (v - avg) * (v - avg)).sum();
    let variance = variance_sum / (values.len() - 1) as f64;

    let std = variance.sqrt();
    std.is_finite().then_some(std)
}

/// Whether a standard deviation is too small to divide by.
pub fn is_degenerate(std: f64) -> bool {
    !std.is_finite() || std <= STD_EPSILON
}

/// Trailing simple moving average.
///
/// Undefined for the first `window - 1` rows.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return None;
            }
            mean(&values[i + 1 - window..=i])
        })
        .collect()
}

/// Trailing sample standard deviation over optional values.
///
/// A row is defined only when all `window` trailing values are defined.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if window == 0 || i + 1 < window {
                return None;
            }
            let slice: Option<Vec<f64>> = values[i + 1 - window..=i].iter().copied().collect();
            slice.and_then(|s| std_dev(&s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[10.0, 20.0, 30.0, 40.0]), Some(25.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        let Some(std) = std_dev(&[10.0, 20.0, 30.0, 40.0]) else {
            panic!("std_dev should succeed for non-empty values");
        };
        // sqrt(500 / 3) ~ 12.91
        assert!((std - 12.909_944).abs() < 1e-5);
        assert_eq!(std_dev(&[1.0]), None);
    }

    #[test]
    fn test_rolling_mean() {
        let ma = rolling_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(ma, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_rolling_mean_window_longer_than_series() {
        let ma = rolling_mean(&[1.0, 2.0], 5);
        assert_eq!(ma, vec![None, None]);
    }

    #[test]
    fn test_rolling_std_needs_full_window() {
        let values = [None, Some(0.01), Some(0.03), Some(0.02)];
        let std = rolling_std(&values, 2);
        assert_eq!(std[0], None);
        assert_eq!(std[1], None);
        let Some(s) = std[2] else {
            panic!("third row has a full window");
        };
        assert!((s - 0.014_142_136).abs() < 1e-8);
        assert!(std[3].is_some());
    }

    #[test]
    fn test_degenerate_std() {
        assert!(is_degenerate(0.0));
        assert!(is_degenerate(f64::NAN));
        assert!(is_degenerate(1e-15));
        assert!(!is_degenerate(0.01));
    }
}
