//! Cross-sectional area estimation from the cumulative volume curve.
//!
//! Areas are the derivative dV/dh of the measured filling curve. The
//! default path fits a local quadratic around every sample cell and takes
//! its slope at the cell mid-height, which is considerably more robust to
//! measurement noise than raw differences; the legacy point-to-point path
//! is kept behind `use_local_regression = false`.

use log::debug;

use crate::analyzer::AnalyzerParams;
use crate::error::AnalysisError;
use crate::filters::{self, odd_window};
use crate::types::{AreaPoint, AreaProfile, Sample};

/// Minimum number of input samples the estimator accepts.
pub const MIN_SAMPLES: usize = 15;

/// Floor applied to every derived area (mm²); keeps the profile strictly
/// non-negative even on flat stretches of the volume curve.
pub const MIN_AREA_MM2: f64 = 0.01;

/// Derive the area profile (N−1 points) from N input samples.
///
/// Fails with [`AnalysisError::InsufficientData`] when fewer than
/// [`MIN_SAMPLES`] samples are supplied; callers may fall back to treating
/// the whole profile as a single segment.
pub fn estimate_area_profile(
    samples: &[Sample],
    params: &AnalyzerParams,
) -> Result<AreaProfile, AnalysisError> {
    let n = samples.len();
    if n < MIN_SAMPLES {
        return Err(AnalysisError::InsufficientData {
            found: n,
            minimum: MIN_SAMPLES,
        });
    }

    let heights: Vec<f64> = samples.iter().map(|s| s.height_mm).collect();
    let volumes: Vec<f64> = samples.iter().map(|s| s.volume_mm3).collect();

    let areas = if params.use_local_regression {
        local_regression_areas(&heights, &volumes)
    } else {
        point_difference_areas(&heights, &volumes)
    };

    let areas = filters::median_filter3(&areas);

    let points = (0..n - 1)
        .map(|i| AreaPoint {
            mid_height_mm: 0.5 * (heights[i] + heights[i + 1]),
            area_mm2: areas[i].max(MIN_AREA_MM2),
        })
        .collect();

    let profile = AreaProfile { points };
    debug!(
        "area profile: {} points, method={}",
        profile.len(),
        if params.use_local_regression {
            "local_regression"
        } else {
            "point_difference"
        }
    );
    Ok(profile)
}

/// Slope of a local quadratic fit of V(h), evaluated at each cell
/// mid-height. The window is odd, ≈N/10 clamped to [5, 15], and shrinks at
/// the profile ends.
fn local_regression_areas(heights: &[f64], volumes: &[f64]) -> Vec<f64> {
    let n = heights.len();
    let window = odd_window(n / 10, 5, 15);
    let half = window / 2;

    let mut areas = Vec::with_capacity(n - 1);
    for i in 0..n - 1 {
        let mid = 0.5 * (heights[i] + heights[i + 1]);
        let lo = i.saturating_sub(half);
        let hi = (i + 2 + half).min(n);
        let h_local: Vec<f64> = heights[lo..hi].iter().map(|&h| h - mid).collect();
        let slope = filters::polyfit(&h_local, &volumes[lo..hi], 2)
            .map(|c| c.get(1).copied().unwrap_or(0.0))
            .unwrap_or_else(|| cell_slope(heights, volumes, i));
        areas.push(slope.max(MIN_AREA_MM2));
    }
    areas
}

/// Legacy estimator: clamped per-cell differences dV/dh.
fn point_difference_areas(heights: &[f64], volumes: &[f64]) -> Vec<f64> {
    (0..heights.len() - 1)
        .map(|i| cell_slope(heights, volumes, i).max(MIN_AREA_MM2))
        .collect()
}

fn cell_slope(heights: &[f64], volumes: &[f64], i: usize) -> f64 {
    let dv = (volumes[i + 1] - volumes[i]).max(MIN_AREA_MM2);
    let dh = (heights[i + 1] - heights[i]).max(0.01);
    dv / dh
}
