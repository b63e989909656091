//! Small statistics helpers used for classifier calibration.

/// Mean of the element-wise squared difference of two equally long byte buffers.
///
/// Differences are taken in floating point, so there is no 8-bit wrap-around.
pub fn mean_squared_difference(a: &[u8], b: &[u8]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    if a.is_empty() {
        return 0.0;
    }
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum();
    sum / a.len() as f64
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// `q`-th percentile (`0..=100`) with linear interpolation between the two
/// closest ranks.
///
/// Returns `None` for an empty slice or a `q` outside `0..=100`.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=100.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Kullback-Leibler divergence `D(p || q)` in bits, restricted to bins where
/// both histograms are non-zero.
///
/// Skipping bins with a zero on either side avoids `log(0)`; the result is
/// therefore an approximation of the true divergence (it can even be negative).
pub fn kl_divergence(p: &[f64], q: &[f64]) -> f64 {
    debug_assert_eq!(p.len(), q.len());
    p.iter()
        .zip(q)
        .filter(|&(&pi, &qi)| pi != 0.0 && qi != 0.0)
        .map(|(&pi, &qi)| pi * (pi / qi).log2())
        .sum()
}
