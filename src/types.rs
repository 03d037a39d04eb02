//! Core data model: input samples, the derived area profile and the typed
//! segment list produced by the pipeline.

use serde::{Deserialize, Serialize};

/// One measured point of the filling curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Fill height above the vessel bottom (millimetres).
    pub height_mm: f64,
    /// Cumulative volume up to `height_mm` (cubic millimetres).
    pub volume_mm3: f64,
}

impl Sample {
    pub fn new(height_mm: f64, volume_mm3: f64) -> Self {
        Self {
            height_mm,
            volume_mm3,
        }
    }
}

/// One point of the derived cross-sectional area profile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaPoint {
    /// Mid-height of the sample cell this area belongs to (millimetres).
    pub mid_height_mm: f64,
    /// Cross-sectional area dV/dh (square millimetres, never negative).
    pub area_mm2: f64,
}

/// Cross-sectional area over height, derived once from the input samples.
///
/// Holds N−1 points for N input samples; point `i` describes the cell
/// between samples `i` and `i+1`. Boundary and segment indices throughout
/// the pipeline refer to positions in this profile.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AreaProfile {
    pub points: Vec<AreaPoint>,
}

impl AreaProfile {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Area values as a contiguous vector (detector working copy).
    pub fn areas(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.area_mm2).collect()
    }

    /// Mid-heights as a contiguous vector.
    pub fn mid_heights(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.mid_height_mm).collect()
    }
}

/// Geometric family of a fitted segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Cylinder,
    Frustum,
    Cone,
    SphereCap,
}

/// Fitted parameters of one segment, tagged by geometric family.
///
/// Each variant carries its own parameter record and a closed-form
/// cumulative volume law evaluated from the segment's local height origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ShapeParams {
    Cylinder {
        radius_mm: f64,
    },
    /// Truncated cone; the radius varies linearly from `r_bottom_mm` at the
    /// segment base to `r_top_mm` at `height_mm`.
    Frustum {
        r_bottom_mm: f64,
        r_top_mm: f64,
        height_mm: f64,
    },
    /// Apex-anchored cone: radius zero at the segment base, `r_base_mm` at
    /// `height_mm`.
    Cone {
        r_base_mm: f64,
        height_mm: f64,
    },
    /// Spherical cap of sphere radius `sphere_radius_mm`, apex at the
    /// segment base.
    SphereCap {
        sphere_radius_mm: f64,
    },
}

impl ShapeParams {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeParams::Cylinder { .. } => ShapeKind::Cylinder,
            ShapeParams::Frustum { .. } => ShapeKind::Frustum,
            ShapeParams::Cone { .. } => ShapeKind::Cone,
            ShapeParams::SphereCap { .. } => ShapeKind::SphereCap,
        }
    }

    /// Cumulative volume at local height `h` above the segment base.
    pub fn volume_at(&self, h: f64) -> f64 {
        use std::f64::consts::PI;
        match *self {
            ShapeParams::Cylinder { radius_mm } => PI * radius_mm * radius_mm * h,
            ShapeParams::Frustum {
                r_bottom_mm,
                r_top_mm,
                height_mm,
            } => {
                if height_mm == 0.0 {
                    return 0.0;
                }
                let r_h = r_bottom_mm + (r_top_mm - r_bottom_mm) * (h / height_mm);
                (PI * h / 3.0) * (r_bottom_mm * r_bottom_mm + r_h * r_h + r_bottom_mm * r_h)
            }
            ShapeParams::Cone {
                r_base_mm,
                height_mm,
            } => {
                if height_mm == 0.0 {
                    return 0.0;
                }
                let r_h = r_base_mm * (h / height_mm);
                (PI / 3.0) * h * r_h * r_h
            }
            ShapeParams::SphereCap { sphere_radius_mm } => {
                // Volume law is valid up to the full sphere (h = 2R).
                let hc = h.min(2.0 * sphere_radius_mm);
                PI * hc * hc * (3.0 * sphere_radius_mm - hc) / 3.0
            }
        }
    }
}

/// One classified section of the vessel profile.
///
/// `start_index`/`end_index` are inclusive positions in the [`AreaProfile`];
/// adjacent segments share their boundary index. Heights are absolute
/// sample heights covering the segment's span.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start_index: usize,
    pub end_index: usize,
    pub start_height_mm: f64,
    pub end_height_mm: f64,
    pub params: ShapeParams,
    /// Mean absolute volume error, percent of the segment-end volume.
    pub fit_error_pct: f64,
    /// Error after the model-complexity penalty used for selection.
    pub adjusted_error_pct: f64,
    /// Set when every shape fit failed and the segment is a synthesized
    /// fallback cylinder.
    pub low_confidence: bool,
}

impl Segment {
    pub fn kind(&self) -> ShapeKind {
        self.params.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn cylinder_volume_is_linear_in_height() {
        let p = ShapeParams::Cylinder { radius_mm: 5.0 };
        assert_eq!(p.volume_at(0.0), 0.0);
        let v1 = p.volume_at(1.0);
        let v2 = p.volume_at(2.0);
        assert!((v1 - PI * 25.0).abs() < 1e-12);
        assert!((v2 - 2.0 * v1).abs() < 1e-9);
    }

    #[test]
    fn frustum_volume_matches_cone_difference() {
        // Frustum 6.5 -> 5.0 over 30 mm equals the difference of two cones
        // sharing the same apex.
        let p = ShapeParams::Frustum {
            r_bottom_mm: 6.5,
            r_top_mm: 5.0,
            height_mm: 30.0,
        };
        // Apex of the extended cone sits 130 mm above the frustum base
        // (radius shrinks 1.5 mm over 30 mm -> reaches zero after 130 mm).
        let apex = 6.5 * 30.0 / 1.5;
        let cone = |r: f64, h: f64| PI / 3.0 * r * r * h;
        let expected = cone(6.5, apex) - cone(5.0, apex - 30.0);
        assert!((p.volume_at(30.0) - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn sphere_cap_volume_clamps_at_full_sphere() {
        let p = ShapeParams::SphereCap {
            sphere_radius_mm: 4.0,
        };
        let full = 4.0 / 3.0 * PI * 64.0;
        assert!((p.volume_at(8.0) - full).abs() < 1e-9);
        assert!((p.volume_at(20.0) - full).abs() < 1e-9);
    }

    #[test]
    fn degenerate_heights_yield_zero_volume() {
        let f = ShapeParams::Frustum {
            r_bottom_mm: 3.0,
            r_top_mm: 2.0,
            height_mm: 0.0,
        };
        assert_eq!(f.volume_at(1.0), 0.0);
        let c = ShapeParams::Cone {
            r_base_mm: 3.0,
            height_mm: 0.0,
        };
        assert_eq!(c.volume_at(1.0), 0.0);
    }
}
