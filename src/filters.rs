//! Scalar signal helpers shared by the area estimator and the transition
//! detector: local polynomial (Savitzky–Golay style) smoothing, discrete
//! gradients, percentiles and small statistics.

use nalgebra::{DMatrix, DVector};

/// Odd smoothing window derived from a data-density estimate, clamped to
/// `[lo, hi]`. Both bounds are expected to be odd.
pub fn odd_window(base: usize, lo: usize, hi: usize) -> usize {
    let mut w = base.clamp(lo, hi);
    if w % 2 == 0 {
        w += 1;
    }
    w.min(hi)
}

/// Least-squares polynomial coefficients `c0..c_deg` for `y ≈ Σ c_k x^k`.
///
/// The degree is reduced when the window carries too few points. Returns
/// `None` for empty input or a singular system.
pub fn polyfit(x: &[f64], y: &[f64], deg: usize) -> Option<Vec<f64>> {
    if x.is_empty() || x.len() != y.len() {
        return None;
    }
    let deg = deg.min(x.len() - 1);
    let cols = deg + 1;
    let mut a = DMatrix::<f64>::zeros(x.len(), cols);
    for (i, &xi) in x.iter().enumerate() {
        let mut pow = 1.0;
        for j in 0..cols {
            a[(i, j)] = pow;
            pow *= xi;
        }
    }
    let b = DVector::<f64>::from_column_slice(y);
    let svd = a.svd(true, true);
    let c = svd.solve(&b, 1e-12).ok()?;
    if c.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let mut coeffs: Vec<f64> = c.iter().copied().collect();
    coeffs.resize(cols, 0.0);
    Some(coeffs)
}

/// Savitzky–Golay style smoothing: fit a local polynomial of `deg` inside
/// an odd `window` around every point (shrinking at the borders) and take
/// the fitted value. `xs` supplies the abscissa; windows are centred on it
/// so irregular sampling is handled.
pub fn savgol_smooth(values: &[f64], xs: &[f64], window: usize, deg: usize) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let half = window / 2;
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let lo = i.saturating_sub(half);
        let hi = (i + half + 1).min(n);
        let xi = xs[i];
        let xw: Vec<f64> = xs[lo..hi].iter().map(|&x| x - xi).collect();
        let smoothed = polyfit(&xw, &values[lo..hi], deg)
            .map(|c| c[0])
            .unwrap_or(values[i]);
        out.push(smoothed);
    }
    out
}

/// Discrete gradient dy/dx with second-order central differences in the
/// interior and one-sided differences at the borders (numpy semantics for
/// possibly non-uniform `x`).
pub fn gradient(y: &[f64], x: &[f64]) -> Vec<f64> {
    let n = y.len();
    let mut g = vec![0.0; n];
    if n < 2 {
        return g;
    }
    g[0] = (y[1] - y[0]) / (x[1] - x[0]);
    g[n - 1] = (y[n - 1] - y[n - 2]) / (x[n - 1] - x[n - 2]);
    for i in 1..n - 1 {
        let hd = x[i] - x[i - 1];
        let hs = x[i + 1] - x[i];
        g[i] = (y[i + 1] * hd * hd - y[i - 1] * hs * hs + y[i] * (hs * hs - hd * hd))
            / (hs * hd * (hd + hs));
    }
    g
}

/// Linear-interpolation percentile, `p` in [0, 100].
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

/// Min–max normalization to [0, 1]; a near-constant signal maps to zeros.
pub fn minmax_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(max - min).is_finite() || max - min < 1e-10 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|&v| (v - min) / (max - min)).collect()
}

/// Size-3 median filter with reflected borders.
pub fn median_filter3(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n < 3 {
        return values.to_vec();
    }
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let a = values[if i == 0 { 0 } else { i - 1 }];
        let b = values[i];
        let c = values[if i + 1 == n { n - 1 } else { i + 1 }];
        out.push(median3(a, b, c));
    }
    out
}

fn median3(a: f64, b: f64, c: f64) -> f64 {
    a.max(b).min(a.min(b).max(c))
}

/// Median with the usual even-length midpoint average.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let m = sorted.len();
    if m % 2 == 1 {
        sorted[m / 2]
    } else {
        0.5 * (sorted[m / 2 - 1] + sorted[m / 2])
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64).sqrt()
}

/// Pearson correlation; 0 when either side has no variance.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let (ma, mb) = (mean(&a[..n]), mean(&b[..n]));
    let mut cov = 0.0;
    let mut va = 0.0;
    let mut vb = 0.0;
    for i in 0..n {
        let da = a[i] - ma;
        let db = b[i] - mb;
        cov += da * db;
        va += da * da;
        vb += db * db;
    }
    let denom = (va * vb).sqrt();
    if denom < 1e-12 {
        0.0
    } else {
        cov / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn odd_window_clamps_and_stays_odd() {
        assert_eq!(odd_window(3, 5, 15), 5);
        assert_eq!(odd_window(6, 5, 15), 7);
        assert_eq!(odd_window(40, 5, 15), 15);
        assert_eq!(odd_window(14, 5, 15), 15);
    }

    #[test]
    fn polyfit_recovers_quadratic() {
        let x: Vec<f64> = (0..7).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&v| 2.0 + 3.0 * v - 0.5 * v * v).collect();
        let c = polyfit(&x, &y, 2).unwrap();
        assert_relative_eq!(c[0], 2.0, epsilon = 1e-8);
        assert_relative_eq!(c[1], 3.0, epsilon = 1e-8);
        assert_relative_eq!(c[2], -0.5, epsilon = 1e-8);
    }

    #[test]
    fn savgol_preserves_quadratic_signal() {
        let x: Vec<f64> = (0..30).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|&v| 1.0 + v * v).collect();
        let s = savgol_smooth(&y, &x, 7, 2);
        for (a, b) in y.iter().zip(s.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-7);
        }
    }

    #[test]
    fn gradient_is_exact_for_linear_data() {
        let x: Vec<f64> = vec![0.0, 1.0, 2.5, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|&v| 3.0 * v - 1.0).collect();
        for g in gradient(&y, &x) {
            assert_relative_eq!(g, 3.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let v = vec![1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(percentile(&v, 0.0), 1.0);
        assert_relative_eq!(percentile(&v, 100.0), 4.0);
        assert_relative_eq!(percentile(&v, 50.0), 2.5);
    }

    #[test]
    fn normalize_flattens_constant_signal() {
        let v = vec![2.0; 6];
        assert!(minmax_normalize(&v).iter().all(|&x| x == 0.0));
        let n = minmax_normalize(&[0.0, 5.0, 10.0]);
        assert_relative_eq!(n[1], 0.5);
    }

    #[test]
    fn median_filter_removes_single_spike() {
        let v = vec![1.0, 1.0, 9.0, 1.0, 1.0];
        let f = median_filter3(&v);
        assert_eq!(f[2], 1.0);
    }

    #[test]
    fn pearson_guards_constant_series() {
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), 0.0);
        let a = vec![1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(pearson(&a, &a), 1.0, epsilon = 1e-12);
    }
}
