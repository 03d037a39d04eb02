//! Per-segment shape fitting.
//!
//! Every segment is fitted against all four primitive families with
//! bounded nonlinear least squares on the cumulative volume curve,
//! measured from the segment's own height/volume origin. Fit failures are
//! per-shape and non-fatal; the selector works with whatever converged.

mod solver;

use nalgebra::DVector;

use crate::filters::median;
use crate::types::{Sample, ShapeKind, ShapeParams};

/// Radius bound factors relative to the initial guess.
const CYLINDER_BOUNDS: (f64, f64) = (0.5, 3.0);
const FRUSTUM_BOUNDS: (f64, f64) = (0.5, 3.0);
const CONE_BOUNDS: (f64, f64) = (0.1, 5.0);
const SPHERE_CAP_BOUNDS: (f64, f64) = (0.5, 10.0);
/// Sphere radius guess relative to the largest implied radius in the
/// segment: the sphere is assumed larger than the cap it produces.
const SPHERE_RADIUS_GUESS_FACTOR: f64 = 1.5;

/// One converged fit of a single shape family.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeFit {
    pub params: ShapeParams,
    /// Mean absolute volume error, percent of the segment-end volume.
    pub error_pct: f64,
}

/// A segment's samples and implied radii, rebased to the segment origin.
///
/// Profile indices `start..=end` map to samples `start..=end + 1`; adjacent
/// segments share their boundary sample.
#[derive(Clone, Debug)]
pub struct SegmentWindow {
    /// Heights above the segment base.
    xs: Vec<f64>,
    /// Volumes above the segment base volume.
    ys: Vec<f64>,
    /// Absolute volume at the segment end (error denominator).
    y_end: f64,
    /// Segment height span.
    span: f64,
    /// Area profile values covered by the segment.
    areas: Vec<f64>,
}

impl SegmentWindow {
    /// `start` and `end` are inclusive area-profile indices;
    /// `profile_areas` is the full area vector.
    pub fn new(samples: &[Sample], profile_areas: &[f64], start: usize, end: usize) -> Self {
        let h0 = samples[start].height_mm;
        let v0 = samples[start].volume_mm3;
        let window = &samples[start..=end + 1];
        let xs: Vec<f64> = window.iter().map(|s| s.height_mm - h0).collect();
        let ys: Vec<f64> = window.iter().map(|s| s.volume_mm3 - v0).collect();
        let span = *xs.last().unwrap();
        Self {
            xs,
            ys,
            y_end: samples[end + 1].volume_mm3,
            span,
            areas: profile_areas[start..=end].to_vec(),
        }
    }

    /// Radius implied by the median area of the segment.
    pub fn median_radius(&self) -> f64 {
        (median(&self.areas) / std::f64::consts::PI).sqrt()
    }

    fn implied_radius_at(&self, idx: usize) -> f64 {
        (self.areas[idx] / std::f64::consts::PI).sqrt()
    }

    fn max_implied_radius(&self) -> f64 {
        let max_area = self.areas.iter().copied().fold(f64::MIN, f64::max);
        (max_area / std::f64::consts::PI).sqrt()
    }

    /// Mean absolute volume error of `params` over this segment, as a
    /// percentage of the segment-end volume.
    pub fn error_pct(&self, params: &ShapeParams) -> f64 {
        let mae = self
            .xs
            .iter()
            .zip(self.ys.iter())
            .map(|(&x, &y)| (params.volume_at(x) - y).abs())
            .sum::<f64>()
            / self.xs.len() as f64;
        mae / (self.y_end + 1e-6) * 100.0
    }
}

/// Fit all four families; shapes that fail to converge are omitted.
/// Result order is cylinder, frustum, cone, sphere cap.
pub fn fit_all(window: &SegmentWindow, max_iters: usize) -> Vec<ShapeFit> {
    [
        ShapeKind::Cylinder,
        ShapeKind::Frustum,
        ShapeKind::Cone,
        ShapeKind::SphereCap,
    ]
    .iter()
    .filter_map(|&kind| fit_shape(kind, window, max_iters))
    .collect()
}

/// Fit a single shape family to the segment.
pub fn fit_shape(kind: ShapeKind, window: &SegmentWindow, max_iters: usize) -> Option<ShapeFit> {
    let (initial, lower, upper) = initial_guess(kind, window)?;
    let build = |p: &[f64]| build_params(kind, p, window.span);
    let residuals = |p: &[f64]| {
        let shape = build(p);
        let r = DVector::from_iterator(
            window.xs.len(),
            window
                .xs
                .iter()
                .zip(window.ys.iter())
                .map(|(&x, &y)| shape.volume_at(x) - y),
        );
        r.iter().all(|v| v.is_finite()).then_some(r)
    };
    let p = solver::solve_bounded(residuals, &initial, &lower, &upper, max_iters)?;
    let params = build(&p);
    let error_pct = window.error_pct(&params);
    error_pct.is_finite().then_some(ShapeFit { params, error_pct })
}

fn initial_guess(
    kind: ShapeKind,
    window: &SegmentWindow,
) -> Option<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    let guess = match kind {
        ShapeKind::Cylinder => {
            let r = window.median_radius();
            (vec![r], bound(r, CYLINDER_BOUNDS))
        }
        ShapeKind::Frustum => {
            let r1 = window.implied_radius_at(0);
            let r2 = window.implied_radius_at(window.areas.len() - 1);
            let (lo1, hi1) = bound_pair(r1, FRUSTUM_BOUNDS);
            let (lo2, hi2) = bound_pair(r2, FRUSTUM_BOUNDS);
            (vec![r1, r2], (vec![lo1, lo2], vec![hi1, hi2]))
        }
        ShapeKind::Cone => {
            let r = window.implied_radius_at(window.areas.len() - 1);
            (vec![r], bound(r, CONE_BOUNDS))
        }
        ShapeKind::SphereCap => {
            let r = SPHERE_RADIUS_GUESS_FACTOR * window.max_implied_radius();
            (vec![r], bound(r, SPHERE_CAP_BOUNDS))
        }
    };
    let (initial, (lower, upper)) = guess;
    initial.iter().all(|v| v.is_finite() && *v > 0.0).then_some((initial, lower, upper))
}

fn bound(guess: f64, factors: (f64, f64)) -> (Vec<f64>, Vec<f64>) {
    (vec![factors.0 * guess], vec![factors.1 * guess])
}

fn bound_pair(guess: f64, factors: (f64, f64)) -> (f64, f64) {
    (factors.0 * guess, factors.1 * guess)
}

fn build_params(kind: ShapeKind, p: &[f64], span: f64) -> ShapeParams {
    match kind {
        ShapeKind::Cylinder => ShapeParams::Cylinder { radius_mm: p[0] },
        ShapeKind::Frustum => ShapeParams::Frustum {
            r_bottom_mm: p[0],
            r_top_mm: p[1],
            height_mm: span,
        },
        ShapeKind::Cone => ShapeParams::Cone {
            r_base_mm: p[0],
            height_mm: span,
        },
        ShapeKind::SphereCap => ShapeParams::SphereCap {
            sphere_radius_mm: p[0],
        },
    }
}

/// Synthesize the all-fits-failed fallback: a cylinder at the segment's
/// median implied radius, with its real evaluated error.
pub fn fallback_cylinder(window: &SegmentWindow) -> ShapeFit {
    let params = ShapeParams::Cylinder {
        radius_mm: window.median_radius(),
    };
    let error_pct = window.error_pct(&params);
    ShapeFit { params, error_pct }
}
