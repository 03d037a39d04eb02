//! Combined derivative score over the smoothed area sequence.

use crate::filters::{gradient, minmax_normalize};

/// Weight of the first-derivative change term. Favouring it over raw
/// curvature detects linear-to-linear transitions (frustum joints) that a
/// pure curvature score misses.
const W_SLOPE_CHANGE: f64 = 0.6;
/// Weight of the absolute-curvature term.
const W_CURVATURE: f64 = 0.4;

/// Score every interior position of the smoothed area sequence; the result
/// has one element fewer than the input. Element `i` describes the change
/// between positions `i` and `i+1`.
pub(super) fn combined_score(smooth: &[f64], heights: &[f64]) -> Vec<f64> {
    let m = smooth.len();
    if m < 3 {
        return vec![0.0; m.saturating_sub(1)];
    }

    let first_deriv = gradient(smooth, heights);
    let second_deriv = gradient(&first_deriv, heights);

    let slope_change: Vec<f64> = (0..m - 1)
        .map(|i| (first_deriv[i + 1] - first_deriv[i]).abs())
        .collect();
    let curvature: Vec<f64> = second_deriv[..m - 1].iter().map(|d| d.abs()).collect();

    let slope_norm = minmax_normalize(&slope_change);
    let curv_norm = minmax_normalize(&curvature);

    slope_norm
        .iter()
        .zip(curv_norm.iter())
        .map(|(&a, &b)| W_SLOPE_CHANGE * a + W_CURVATURE * b)
        .collect()
}
