//! Descriptive statistics over an outcome sequence
//!
//! All functions take population definitions (divide by N). Percentiles use
//! linear interpolation between order statistics at rank `h = (N - 1) * p / 100`.

/// Arithmetic mean. `NaN` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around a precomputed mean
#[must_use]
pub fn population_std(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let variance = values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Sort a copy of `values` ascending. Outcomes are always finite.
#[must_use]
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    sorted
}

/// Linear-interpolation percentile of an ascending slice, `p` in `[0, 100]`.
///
/// `p` outside that range is clamped.
#[must_use]
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    match n {
        0 => f64::NAN,
        1 => sorted[0],
        _ => {
            let h = (n - 1) as f64 * p.clamp(0.0, 100.0) / 100.0;
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = h - lo as f64;
            sorted[lo] + frac * (sorted[hi] - sorted[lo])
        }
    }
}

/// Percent-rank of `target` in an ascending slice, with ties counted as half
#[must_use]
pub fn percent_rank_sorted(sorted: &[f64], target: f64) -> f64 {
    if sorted.is_empty() || target.is_nan() {
        return f64::NAN;
    }
    let below = sorted.partition_point(|v| *v < target);
    let at_or_below = sorted.partition_point(|v| *v <= target);
    let equal = at_or_below - below;
    100.0 * (below as f64 + 0.5 * equal as f64) / sorted.len() as f64
}
