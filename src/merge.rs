//! Continuity-aware merging of adjacent same-family segments.
//!
//! A single left-to-right pass absorbs the next segment into the current
//! one while the pair stays in the same family, remains adjacent and is
//! geometrically continuous at the shared boundary. Sphere caps never
//! merge: a curved cap is a distinct feature even next to another cap.
//! The pass does not backtrack, so it can keep a locally optimal merge
//! over a globally better one further right.

use log::debug;

use crate::analyzer::AnalyzerParams;
use crate::fit::{self, SegmentWindow};
use crate::select::adjusted_error;
use crate::types::{Sample, Segment, ShapeKind, ShapeParams};

/// Relative boundary-radius tolerance for cylinders; tighter than the
/// configurable frustum/cone tolerance since a cylinder pair must really
/// share one radius.
const CYLINDER_MERGE_TOL: f64 = 0.05;

/// Merge the segment list in place. Idempotent: applying it to an already
/// merged list changes nothing.
pub fn merge_segments(
    segments: &mut Vec<Segment>,
    samples: &[Sample],
    profile_areas: &[f64],
    params: &AnalyzerParams,
) {
    let mut i = 0;
    while i < segments.len() {
        while i + 1 < segments.len() {
            let current = segments[i];
            let next = segments[i + 1];
            if !can_merge(&current, &next, params) {
                break;
            }

            let start = current.start_index;
            let end = next.end_index;
            let (merged_params, error_pct) =
                merged_fit(&current, &next, samples, profile_areas, start, end, params);

            debug!(
                "merging {:?} segments at profile index {} (continuous boundary radius)",
                current.kind(),
                current.end_index
            );

            let seg = &mut segments[i];
            seg.end_index = end;
            seg.end_height_mm = samples[end + 1].height_mm;
            seg.params = merged_params;
            seg.fit_error_pct = error_pct;
            seg.adjusted_error_pct = adjusted_error(merged_params.kind(), error_pct);
            seg.low_confidence = current.low_confidence || next.low_confidence;
            segments.remove(i + 1);
        }
        i += 1;
    }
}

fn can_merge(current: &Segment, next: &Segment, params: &AnalyzerParams) -> bool {
    if next.kind() != current.kind() || next.start_index > current.end_index + 1 {
        return false;
    }
    match (current.params, next.params) {
        (ShapeParams::SphereCap { .. }, _) => false,
        (
            ShapeParams::Frustum {
                r_top_mm: r_top_current,
                ..
            },
            ShapeParams::Frustum {
                r_bottom_mm: r_bottom_next,
                ..
            },
        ) => relative_diff(r_top_current, r_bottom_next) < params.merge_threshold,
        (
            ShapeParams::Cylinder {
                radius_mm: r_current,
            },
            ShapeParams::Cylinder { radius_mm: r_next },
        ) => relative_diff(r_current, r_next) < CYLINDER_MERGE_TOL,
        (
            ShapeParams::Cone {
                r_base_mm: apex_current,
                ..
            },
            ShapeParams::Cone {
                r_base_mm: apex_next,
                ..
            },
        ) => relative_diff(apex_current, apex_next) < params.merge_threshold,
        _ => false,
    }
}

/// Parameters and error of the combined segment. Frustums splice their
/// boundary radii; cylinders and cones are refitted over the combined
/// range (keeping the current parameters when the refit fails).
fn merged_fit(
    current: &Segment,
    next: &Segment,
    samples: &[Sample],
    profile_areas: &[f64],
    start: usize,
    end: usize,
    params: &AnalyzerParams,
) -> (ShapeParams, f64) {
    let window = SegmentWindow::new(samples, profile_areas, start, end);
    let merged = match (current.params, next.params) {
        (
            ShapeParams::Frustum { r_bottom_mm, .. },
            ShapeParams::Frustum { r_top_mm, .. },
        ) => Some(ShapeParams::Frustum {
            r_bottom_mm,
            r_top_mm,
            height_mm: samples[end + 1].height_mm - samples[start].height_mm,
        }),
        _ => fit::fit_shape(current.kind(), &window, params.max_fit_iters).map(|f| f.params),
    };
    let merged = merged.unwrap_or(current.params);
    let error_pct = window.error_pct(&merged);
    (merged, error_pct)
}

fn relative_diff(a: f64, b: f64) -> f64 {
    (a - b).abs() / (a.max(b) + 1e-6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn cylinder_samples(r: f64, n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| {
                let h = i as f64;
                Sample::new(h, PI * r * r * h + 1e-9)
            })
            .collect()
    }

    fn cylinder_segment(r: f64, start: usize, end: usize, samples: &[Sample]) -> Segment {
        Segment {
            start_index: start,
            end_index: end,
            start_height_mm: samples[start].height_mm,
            end_height_mm: samples[end + 1].height_mm,
            params: ShapeParams::Cylinder { radius_mm: r },
            fit_error_pct: 0.0,
            adjusted_error_pct: 0.0,
            low_confidence: false,
        }
    }

    #[test]
    fn equal_radius_cylinders_merge_into_one() {
        let samples = cylinder_samples(5.0, 41);
        let areas = vec![PI * 25.0; 40];
        let params = AnalyzerParams::default();
        let mut segments = vec![
            cylinder_segment(5.0, 0, 19, &samples),
            cylinder_segment(5.0, 19, 39, &samples),
        ];
        merge_segments(&mut segments, &samples, &areas, &params);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_index, 0);
        assert_eq!(segments[0].end_index, 39);
        assert_eq!(segments[0].end_height_mm, 40.0);
    }

    #[test]
    fn distinct_radius_cylinders_stay_apart() {
        let samples = cylinder_samples(5.0, 41);
        let areas = vec![PI * 25.0; 40];
        let params = AnalyzerParams::default();
        let mut segments = vec![
            cylinder_segment(5.0, 0, 19, &samples),
            cylinder_segment(6.0, 19, 39, &samples),
        ];
        merge_segments(&mut segments, &samples, &areas, &params);
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn sphere_caps_never_merge() {
        let samples = cylinder_samples(5.0, 41);
        let areas = vec![PI * 25.0; 40];
        let params = AnalyzerParams::default();
        let cap = |start: usize, end: usize| Segment {
            params: ShapeParams::SphereCap {
                sphere_radius_mm: 8.0,
            },
            ..cylinder_segment(5.0, start, end, &samples)
        };
        let mut segments = vec![cap(0, 19), cap(19, 39)];
        merge_segments(&mut segments, &samples, &areas, &params);
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn continuous_frustums_splice_boundary_radii() {
        // One linear taper 8 -> 4 mm split in the middle; the merged
        // segment must keep the outer radii.
        let truth = |h: f64| {
            let p = ShapeParams::Frustum {
                r_bottom_mm: 8.0,
                r_top_mm: 4.0,
                height_mm: 40.0,
            };
            p.volume_at(h)
        };
        let samples: Vec<Sample> = (0..41).map(|i| Sample::new(i as f64, truth(i as f64) + 1e-9)).collect();
        let areas: Vec<f64> = (0..40)
            .map(|i| {
                let h = i as f64 + 0.5;
                let r = 8.0 - 4.0 * h / 40.0;
                PI * r * r
            })
            .collect();
        let params = AnalyzerParams::default();
        let frustum = |r1: f64, r2: f64, start: usize, end: usize| Segment {
            params: ShapeParams::Frustum {
                r_bottom_mm: r1,
                r_top_mm: r2,
                height_mm: samples[end + 1].height_mm - samples[start].height_mm,
            },
            ..cylinder_segment(0.0, start, end, &samples)
        };
        let mut segments = vec![frustum(8.0, 6.0, 0, 19), frustum(6.0, 4.0, 19, 39)];
        merge_segments(&mut segments, &samples, &areas, &params);
        assert_eq!(segments.len(), 1);
        let ShapeParams::Frustum {
            r_bottom_mm,
            r_top_mm,
            height_mm,
        } = segments[0].params
        else {
            panic!("expected frustum");
        };
        assert_eq!(r_bottom_mm, 8.0);
        assert_eq!(r_top_mm, 4.0);
        assert_eq!(height_mm, 40.0);
        assert!(segments[0].fit_error_pct < 0.1);
    }

    #[test]
    fn discontinuous_frustums_stay_apart() {
        // Boundary radii 5.0 vs 4.45: an 11% relative mismatch, just past
        // the 10% continuity tolerance.
        let samples = cylinder_samples(5.0, 41);
        let areas = vec![PI * 25.0; 40];
        let params = AnalyzerParams::default();
        let frustum = |r1: f64, r2: f64, start: usize, end: usize| Segment {
            params: ShapeParams::Frustum {
                r_bottom_mm: r1,
                r_top_mm: r2,
                height_mm: samples[end + 1].height_mm - samples[start].height_mm,
            },
            ..cylinder_segment(0.0, start, end, &samples)
        };
        let mut segments = vec![frustum(6.0, 5.0, 0, 19), frustum(4.45, 3.5, 19, 39)];
        merge_segments(&mut segments, &samples, &areas, &params);
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn merging_is_idempotent() {
        let samples = cylinder_samples(5.0, 41);
        let areas = vec![PI * 25.0; 40];
        let params = AnalyzerParams::default();
        let mut segments = vec![
            cylinder_segment(5.0, 0, 13, &samples),
            cylinder_segment(5.0, 13, 26, &samples),
            cylinder_segment(6.5, 26, 39, &samples),
        ];
        merge_segments(&mut segments, &samples, &areas, &params);
        let after_first = segments.clone();
        merge_segments(&mut segments, &samples, &areas, &params);
        assert_eq!(segments, after_first);
        assert_eq!(segments.len(), 2);
    }
}
