//! Summary statistics over latency and uptime samples.

/// Nearest-rank percentile of `values` for `p` in `[0, 1]`.
///
/// Sorts a copy of the input ascending and returns the element at
/// `ceil(p * n) - 1`, clamped into `[0, n - 1]`. No interpolation: the result is
/// always one of the observed values. Returns `None` for an empty slice.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let last = sorted.len() as i64 - 1;
    let rank = ((p * sorted.len() as f64).ceil() as i64 - 1).clamp(0, last);
    Some(sorted[rank as usize])
}

/// Arithmetic mean, or `None` when there is nothing to average.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Round half away from zero to `decimals` places. Values too large to scale
/// without overflowing are returned unchanged.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}
