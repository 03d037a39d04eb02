//! Statistical validation of candidate boundaries.
//!
//! A boundary survives only when the segment it closes looks like a real
//! geometric section rather than noise: at least two of three criteria
//! (variation, lag-1 structure, linear trend) must hold. The first and
//! last segments are exempt so clean short profiles keep their end
//! sections.

use crate::filters::{mean, pearson, polyfit, std_dev};

/// Minimum coefficient of variation for a segment to count as varying.
const CV_MIN: f64 = 0.05;
/// Minimum absolute lag-1 autocorrelation for a segment to count as
/// structured.
const AUTOCORR_MIN: f64 = 0.4;
/// Minimum R² of a linear area-vs-index fit.
const R_SQUARED_MIN: f64 = 0.65;

/// Filter a spaced transition list down to validated boundaries. The
/// result is sorted, de-duplicated and always ends at the last transition.
pub(super) fn validate_boundaries(
    area: &[f64],
    transitions: &[usize],
    min_points: usize,
) -> Vec<usize> {
    let mut validated = vec![transitions[0]];
    let n_segments = transitions.len() - 1;

    for i in 0..n_segments {
        let start = transitions[i];
        let end = transitions[i + 1];
        if end - start + 1 < min_points {
            // Too short to judge; folds into the neighbouring segment.
            continue;
        }

        let segment = &area[start..=end];
        let passed = [
            has_variation(segment),
            has_structure(segment),
            fits_linear_model(segment),
        ]
        .iter()
        .filter(|&&p| p)
        .count();

        let is_end_segment = i == 0 || i == n_segments - 1;
        if passed >= 2 || is_end_segment {
            validated.push(end);
        }
    }

    if *validated.last().unwrap() != *transitions.last().unwrap() {
        validated.push(*transitions.last().unwrap());
    }
    validated.sort_unstable();
    validated.dedup();
    validated
}

fn has_variation(segment: &[f64]) -> bool {
    let cv = std_dev(segment) / (mean(segment) + 1e-8);
    cv > CV_MIN
}

fn has_structure(segment: &[f64]) -> bool {
    if segment.len() <= 3 {
        return true;
    }
    let lagged = &segment[1..];
    let original = &segment[..segment.len() - 1];
    pearson(original, lagged).abs() > AUTOCORR_MIN
}

fn fits_linear_model(segment: &[f64]) -> bool {
    if segment.len() <= 2 {
        return true;
    }
    let z: Vec<f64> = (0..segment.len()).map(|i| i as f64).collect();
    let Some(coeffs) = polyfit(&z, segment, 1) else {
        return false;
    };
    let m = mean(segment);
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (i, &v) in segment.iter().enumerate() {
        let predicted = coeffs[0] + coeffs[1] * i as f64;
        ss_res += (v - predicted) * (v - predicted);
        ss_tot += (v - m) * (v - m);
    }
    let r_squared = 1.0 - ss_res / (ss_tot + 1e-8);
    r_squared > R_SQUARED_MIN
}
