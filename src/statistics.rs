//! Nine-statistic descriptive summaries.
//!
//! Quantiles use linear interpolation between closest ranks at position
//! `q * (n - 1)` of the sorted sample. The standard deviation is the sample
//! estimate (denominator `n - 1`). The geometric mean only considers the
//! strictly positive values; every other statistic uses the full sample.

use crate::models::StatSummary;

/// Summarize a multiset of values
///
/// Non-finite entries are dropped first. An empty sample leaves every field
/// undefined, as does a field whose arithmetic overflows.
pub fn summarize(values: &[f64]) -> StatSummary {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return StatSummary::undefined();
    }
    sorted.sort_by(f64::total_cmp);

    StatSummary {
        min: sorted.first().copied(),
        p25: finite(quantile_sorted(&sorted, 0.25)),
        mean: finite(mean(&sorted)),
        geomean: finite(geometric_mean(&sorted)),
        median: finite(quantile_sorted(&sorted, 0.5)),
        p75: finite(quantile_sorted(&sorted, 0.75)),
        p90: finite(quantile_sorted(&sorted, 0.90)),
        max: sorted.last().copied(),
        stdev: finite(sample_std_dev(&sorted)),
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Linear-interpolation quantile of an ascending sample
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// `exp(mean(ln x))` over the strictly positive values
pub fn geometric_mean(values: &[f64]) -> Option<f64> {
    let logs: Vec<f64> = values.iter().filter(|v| **v > 0.0).map(|v| v.ln()).collect();
    mean(&logs).map(f64::exp)
}

/// Sample standard deviation; needs at least two values
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Statistic;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value should be defined");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_empty_input_is_fully_undefined() {
        let summary = summarize(&[]);
        assert!(summary.is_undefined());
        for statistic in Statistic::ALL {
            assert_eq!(summary.get(statistic), None);
        }
    }

    #[test]
    fn test_single_value() {
        let summary = summarize(&[5.0]);

        for statistic in Statistic::ALL {
            if statistic == Statistic::StDev {
                assert_eq!(summary.get(statistic), None);
            } else {
                assert_close(summary.get(statistic), 5.0);
            }
        }
    }

    #[test]
    fn test_geomean_excludes_non_positive_values() {
        let summary = summarize(&[-1.0, 2.0, 8.0]);

        assert_close(summary.geomean, 4.0);
        assert_close(summary.mean, 3.0);
        assert_close(summary.min, -1.0);
    }

    #[test]
    fn test_geomean_undefined_without_positive_values() {
        let summary = summarize(&[0.0, -2.0]);
        assert_eq!(summary.geomean, None);
        assert_close(summary.mean, -1.0);
    }

    #[test]
    fn test_linear_interpolation_quantiles() {
        // Unsorted on purpose
        let summary = summarize(&[4.0, 1.0, 3.0, 2.0]);

        assert_close(summary.min, 1.0);
        assert_close(summary.p25, 1.75);
        assert_close(summary.median, 2.5);
        assert_close(summary.p75, 3.25);
        assert_close(summary.p90, 3.7);
        assert_close(summary.max, 4.0);
    }

    #[test]
    fn test_sample_standard_deviation() {
        let summary = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        // population sd is 2, sample sd is sqrt(32 / 7)
        assert_close(summary.stdev, (32.0f64 / 7.0).sqrt());
        assert_close(summary.mean, 5.0);
    }

    #[test]
    fn test_nan_values_are_dropped() {
        let summary = summarize(&[f64::NAN, 1.0, 3.0]);
        assert_close(summary.mean, 2.0);
        assert_close(summary.median, 2.0);
    }

    #[test]
    fn test_non_finite_values_are_dropped() {
        let summary = summarize(&[f64::INFINITY, 1.0, f64::NEG_INFINITY, 3.0]);
        assert_close(summary.min, 1.0);
        assert_close(summary.max, 3.0);
        assert_close(summary.median, 2.0);

        assert!(summarize(&[f64::INFINITY, f64::INFINITY]).is_undefined());
    }

    #[test]
    fn test_overflowing_fields_are_undefined() {
        let summary = summarize(&[1e308, 1e308, 1e308]);
        assert_close(summary.median, 1e308);
        assert_eq!(summary.max, Some(1e308));
        // The running sum overflows
        assert_eq!(summary.mean, None);
        assert_eq!(summary.stdev, None);
    }

    #[test]
    fn test_quantile_bounds() {
        assert_eq!(quantile_sorted(&[], 0.5), None);
        assert_eq!(quantile_sorted(&[1.0], 1.5), None);
        assert_close(quantile_sorted(&[1.0, 2.0], 1.0), 2.0);
        assert_close(quantile_sorted(&[1.0, 2.0], 0.0), 1.0);
    }
}
