//! Sample statistics over slices.
//!
//! All estimators use the sample (n − 1) denominator. Undefined results are
//! `NaN`, never zero.

/// Arithmetic mean (`NaN` for an empty slice)
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (`NaN` for fewer than two values)
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Sample covariance of two equally long series
///
/// Returns `NaN` if the lengths differ or there are fewer than two pairs.
pub fn sample_covariance(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let mx = mean(x);
    let my = mean(y);
    x.iter()
        .zip(y)
        .map(|(a, b)| (a - mx) * (b - my))
        .sum::<f64>()
        / (x.len() - 1) as f64
}

/// Pearson correlation coefficient
///
/// Returns `NaN` when either series has zero variance or the inputs are
/// unusable. The result is clamped into `[-1, 1]` to absorb rounding.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let sx = sample_variance(x).sqrt();
    let sy = sample_variance(y).sqrt();
    if !(sx > 0.0 && sy > 0.0) {
        return f64::NAN;
    }
    (sample_covariance(x, y) / (sx * sy)).clamp(-1.0, 1.0)
}
