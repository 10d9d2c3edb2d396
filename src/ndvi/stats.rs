//! NaN-aware statistics over NDVI fields: telemetry mean, auto-calibration
//! percentiles, and histogram binning.

/// Arithmetic mean over the finite values of a sequence.
///
/// NaN and infinities are excluded; an input with no finite values yields
/// 0.0 (telemetry renders that as a flat reading rather than `NaN`).
pub fn mean_finite(values: impl Iterator<Item = f32>) -> f32 {
    let mut sum = 0.0f64;
    let mut count = 0u64;
    for v in values {
        if v.is_finite() {
            sum += v as f64;
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        (sum / count as f64) as f32
    }
}

/// The 2nd and 98th percentile of the finite values of a sequence.
///
/// NaN is dropped by the IEEE self-equality rule (`is_finite` implies
/// `v == v`); infinities are dropped with it. Values are sorted ascending
/// and the bounds are read at `i2 = floor(0.02 * n)` and
/// `i98 = min(n - 1, floor(0.98 * n))`. Returns `None` when no finite
/// values remain.
pub fn percentile_bounds(values: impl Iterator<Item = f32>) -> Option<(f32, f32)> {
    let mut finite: Vec<f32> = values.filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_unstable_by(f32::total_cmp);

    let n = finite.len();
    let i2 = ((0.02 * n as f32) as usize).min(n - 1);
    let i98 = ((0.98 * n as f32) as usize).min(n - 1);
    Some((finite[i2], finite[i98]))
}

/// Count finite values into `bins` equal-width buckets over [vmin, vmax].
///
/// Out-of-range values clamp into the first or last bucket. A degenerate
/// range (`vmax <= vmin`) puts every finite value in bucket 0.
pub fn histogram_bins(
    values: impl Iterator<Item = f32>,
    vmin: f32,
    vmax: f32,
    bins: usize,
) -> Vec<u32> {
    let mut counts = vec![0u32; bins];
    if bins == 0 {
        return counts;
    }
    let span = vmax - vmin;
    for v in values {
        if !v.is_finite() {
            continue;
        }
        let b = if span > 0.0 {
            let t = (v - vmin) / span * bins as f32;
            (t as isize).clamp(0, bins as isize - 1) as usize
        } else {
            0
        };
        counts[b] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_excludes_nan() {
        let vals = [1.0, f32::NAN, 3.0, f32::INFINITY];
        assert_eq!(mean_finite(vals.into_iter()), 2.0);
    }

    #[test]
    fn test_mean_all_nan_is_zero() {
        let vals = [f32::NAN, f32::NAN];
        assert_eq!(mean_finite(vals.into_iter()), 0.0);
    }

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean_finite(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_percentiles_of_ramp() {
        // 0.00, 0.01, .. 0.99: i2 = 2, i98 = 98
        let vals: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        let (p2, p98) = percentile_bounds(vals.into_iter()).unwrap();
        assert!((p2 - 0.02).abs() < 1e-6);
        assert!((p98 - 0.98).abs() < 1e-6);
    }

    #[test]
    fn test_percentiles_filter_nan() {
        let vals = [f32::NAN, 0.5, f32::NAN, 0.5];
        let (p2, p98) = percentile_bounds(vals.into_iter()).unwrap();
        assert_eq!(p2, 0.5);
        assert_eq!(p98, 0.5);
    }

    #[test]
    fn test_percentiles_empty_sample() {
        assert_eq!(percentile_bounds(std::iter::empty()), None);
        assert_eq!(percentile_bounds([f32::NAN].into_iter()), None);
    }

    #[test]
    fn test_percentiles_single_value() {
        let (p2, p98) = percentile_bounds([0.78].into_iter()).unwrap();
        assert_eq!(p2, 0.78);
        assert_eq!(p98, 0.78);
    }

    #[test]
    fn test_percentiles_unsorted_input() {
        let vals = [0.9, -0.9, 0.0, 0.5, -0.5];
        let (p2, p98) = percentile_bounds(vals.into_iter()).unwrap();
        assert_eq!(p2, -0.9);
        assert_eq!(p98, 0.9);
    }

    #[test]
    fn test_histogram_spread() {
        let vals = [-1.0, -0.99, 1.0, 0.99, 0.0];
        let counts = histogram_bins(vals.into_iter(), -1.0, 1.0, 50);
        assert_eq!(counts.len(), 50);
        assert_eq!(counts[0], 2);
        assert_eq!(counts[49], 2);
        assert_eq!(counts[25], 1);
        assert_eq!(counts.iter().sum::<u32>(), 5);
    }

    #[test]
    fn test_histogram_clamps_outliers() {
        let vals = [-5.0, 5.0];
        let counts = histogram_bins(vals.into_iter(), -1.0, 1.0, 10);
        assert_eq!(counts[0], 1);
        assert_eq!(counts[9], 1);
    }

    #[test]
    fn test_histogram_skips_nan() {
        let vals = [f32::NAN, 0.5];
        let counts = histogram_bins(vals.into_iter(), 0.0, 1.0, 4);
        assert_eq!(counts.iter().sum::<u32>(), 1);
    }

    #[test]
    fn test_histogram_degenerate_range() {
        let vals = [0.1, 0.2, 0.3];
        let counts = histogram_bins(vals.into_iter(), 0.5, 0.5, 8);
        assert_eq!(counts[0], 3);
        assert_eq!(counts.iter().sum::<u32>(), 3);
    }
}
