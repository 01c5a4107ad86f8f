use super::super::WindowStats;
use crate::config::BucketRounding;

pub fn window_stats(
    latencies: impl IntoIterator<Item = u64>,
    sentinel: Option<u64>,
) -> WindowStats {
    let mut count = 0usize;
    let mut sum = 0u128;
    let mut min = None;
    let mut max = None;
    let mut latest = None;

    for value in latencies.into_iter().filter(|v| Some(*v) != sentinel) {
        count += 1;
        sum += u128::from(value);
        min = Some(min.map_or(value, |m: u64| m.min(value)));
        max = Some(max.map_or(value, |m: u64| m.max(value)));
        latest = Some(value);
    }

    if count == 0 {
        return WindowStats::empty();
    }

    WindowStats {
        count,
        mean: sum as f64 / count as f64,
        min,
        max,
        latest,
    }
}

pub fn overlapping(left: u64, right: u64, tolerance_ms: u64) -> bool {
    left.abs_diff(right) < tolerance_ms
}

/// Rows a value occupies when `peak` fills all `height` rows.
pub fn bucket_height(value: u64, peak: u64, height: u16, rounding: BucketRounding) -> u16 {
    if peak == 0 || height == 0 {
        return 0;
    }
    let scaled = rounding.apply(value as f64 * f64::from(height) / peak as f64);
    (scaled.max(0.0) as u16).min(height)
}
