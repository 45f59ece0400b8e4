use crate::errors::{AnalyticsError, AnalyticsResult};
use crate::models::prediction::{DataPoint, LinearRegression};

/// Minimum number of samples for a meaningful fit; the residual variance
/// divides by `n - 2`, so anything shorter is rejected outright.
pub const MIN_SAMPLES: usize = 3;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Fits an ordinary least-squares line over `(days since first sample,
/// quantity)` and derives fit-quality metrics.
pub fn fit_linear_regression(points: &[DataPoint]) -> AnalyticsResult<LinearRegression> {
    if points.len() < MIN_SAMPLES {
        return Err(AnalyticsError::InsufficientData(format!(
            "{} samples, need at least {}",
            points.len(),
            MIN_SAMPLES
        )));
    }

    let first = points[0].timestamp;
    let xs: Vec<f64> = points
        .iter()
        .map(|p| (p.timestamp - first).num_seconds() as f64 / SECONDS_PER_DAY)
        .collect();
    let ys: Vec<f64> = points.iter().map(|p| p.quantity).collect();

    let n = xs.len() as f64;
    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_xy: f64 = xs.iter().zip(&ys).map(|(x, y)| x * y).sum();
    let sum_x2: f64 = xs.iter().map(|x| x * x).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator.abs() < f64::EPSILON {
        return Err(AnalyticsError::DegenerateSeries(
            "all samples share the same timestamp".to_string(),
        ));
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;

    let mean_y = sum_y / n;
    let ss_res: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| {
            let predicted = slope * x + intercept;
            (y - predicted) * (y - predicted)
        })
        .sum();
    let ss_tot: f64 = ys.iter().map(|y| (y - mean_y) * (y - mean_y)).sum();

    // A constant series fits its own mean exactly; report a perfect fit
    // rather than dividing by a zero total sum of squares.
    let r_squared = if ss_tot.abs() < f64::EPSILON {
        if ss_res.abs() < 1e-9 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };

    let variance = ss_res / (n - 2.0);

    let mut confidence = r_squared * 100.0;
    if mean_y.abs() > f64::EPSILON {
        let coefficient_of_variation = variance.sqrt() / mean_y.abs();
        if coefficient_of_variation < 0.1 {
            confidence += 10.0;
        } else if coefficient_of_variation > 0.3 {
            confidence -= 20.0;
        }
    }
    let confidence = confidence.clamp(0.0, 100.0);

    Ok(LinearRegression {
        slope,
        intercept,
        r_squared,
        variance,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    fn daily_series(values: &[f64]) -> Vec<DataPoint> {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &quantity)| DataPoint {
                timestamp: start + Duration::days(i as i64),
                quantity,
            })
            .collect()
    }

    #[test]
    fn recovers_a_perfect_linear_series() {
        // y = -2x + 100, no noise
        let values: Vec<f64> = (0..10).map(|x| -2.0 * x as f64 + 100.0).collect();
        let fit = fit_linear_regression(&daily_series(&values)).unwrap();

        assert!((fit.slope + 2.0).abs() < 1e-9, "slope {}", fit.slope);
        assert!(
            (fit.intercept - 100.0).abs() < 1e-9,
            "intercept {}",
            fit.intercept
        );
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        assert!(fit.variance < 1e-9);
        assert_eq!(fit.confidence, 100.0);
    }

    #[test]
    fn two_samples_are_insufficient() {
        let points = daily_series(&[100.0, 98.0]);
        assert_matches!(
            fit_linear_regression(&points),
            Err(AnalyticsError::InsufficientData(_))
        );
    }

    #[test]
    fn empty_input_is_insufficient() {
        assert_matches!(
            fit_linear_regression(&[]),
            Err(AnalyticsError::InsufficientData(_))
        );
    }

    #[test]
    fn identical_timestamps_are_degenerate() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let points: Vec<DataPoint> = [100.0, 95.0, 90.0]
            .iter()
            .map(|&quantity| DataPoint {
                timestamp: ts,
                quantity,
            })
            .collect();
        assert_matches!(
            fit_linear_regression(&points),
            Err(AnalyticsError::DegenerateSeries(_))
        );
    }

    #[test]
    fn constant_series_reports_perfect_flat_fit() {
        let fit = fit_linear_regression(&daily_series(&[50.0, 50.0, 50.0, 50.0])).unwrap();
        assert!(fit.slope.abs() < 1e-9);
        assert_eq!(fit.r_squared, 1.0);
    }

    #[test]
    fn noisy_series_confidence_stays_in_bounds() {
        let values = [100.0, 97.0, 95.5, 92.0, 91.0, 87.5, 86.0, 83.0];
        let fit = fit_linear_regression(&daily_series(&values)).unwrap();
        assert!(fit.slope < 0.0);
        assert!((0.0..=100.0).contains(&fit.confidence));
        assert!(fit.variance >= 0.0);
        assert!(fit.r_squared <= 1.0);
    }

    #[test]
    fn tight_fit_earns_the_low_variation_bonus() {
        // residuals are tiny relative to the mean, so the confidence gets
        // the +10 adjustment and clamps at 100
        let values: Vec<f64> = (0..20).map(|x| -1.0 * x as f64 + 500.0).collect();
        let fit = fit_linear_regression(&daily_series(&values)).unwrap();
        assert_eq!(fit.confidence, 100.0);
    }
}
