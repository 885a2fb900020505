//! Statistical helpers for latency distributions

use crate::error::{AppError, Result};


/// Sort samples ascending, rejecting NaN
pub fn sorted_samples(samples: &[f64]) -> Result<Vec<f64>> {
    if samples.iter().any(|v| v.is_nan()) {
        return Err(AppError::statistics("Samples contain NaN"));
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(sorted)
}

/// Percentile of pre-sorted values with linear interpolation between ranks.
///
/// `percentile` is on the 0-100 scale. Empty input yields 0.0.
pub fn calculate_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let percentile = percentile.clamp(0.0, 100.0);
    let index = (percentile / 100.0) * (sorted_values.len() as f64 - 1.0);
    let lower_index = index.floor() as usize;
    let upper_index = index.ceil() as usize;

    if lower_index == upper_index {
        sorted_values[lower_index]
    } else {
        let lower_value = sorted_values[lower_index];
        let upper_value = sorted_values[upper_index];
        let weight = index - lower_index as f64;
        lower_value + weight * (upper_value - lower_value)
    }
}

/// Arithmetic mean, 0.0 for no samples
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
