//! Model selection across the fitted shape families.
//!
//! Raw fit error alone lets the most flexible family win on noise, so a
//! small complexity penalty is added to frustum and cone fits that are
//! already good, and a near-cylindrical frustum is overridden by the
//! cylinder fit when that fit is close enough (Occam's razor).

use log::debug;

use crate::fit::ShapeFit;
use crate::types::{ShapeKind, ShapeParams};

/// Penalty (percentage points) added to a good frustum fit.
const FRUSTUM_PENALTY_PCT: f64 = 0.5;
/// Penalty (percentage points) added to a good cone fit.
const CONE_PENALTY_PCT: f64 = 0.2;
/// Penalties only apply below this raw error; a clearly better complex fit
/// keeps its advantage.
const PENALTY_ERROR_CEILING_PCT: f64 = 3.0;
/// Relative radius difference below which a frustum is essentially a
/// cylinder.
const NEAR_CYLINDER_REL_DIFF: f64 = 0.05;
/// A cylinder may be up to this factor worse (raw error) than a
/// near-cylindrical frustum and still be preferred.
const CYLINDER_PREFERENCE_FACTOR: f64 = 1.2;

/// The winning shape for one segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection {
    pub params: ShapeParams,
    pub fit_error_pct: f64,
    pub adjusted_error_pct: f64,
}

/// Complexity-penalized error used for ranking.
pub fn adjusted_error(kind: ShapeKind, error_pct: f64) -> f64 {
    match kind {
        ShapeKind::Frustum if error_pct < PENALTY_ERROR_CEILING_PCT => {
            error_pct + FRUSTUM_PENALTY_PCT
        }
        ShapeKind::Cone if error_pct < PENALTY_ERROR_CEILING_PCT => error_pct + CONE_PENALTY_PCT,
        _ => error_pct,
    }
}

/// Pick the best fit out of the converged candidates; `None` only when no
/// shape converged at all (the caller synthesizes a fallback cylinder).
pub fn select_best(fits: &[ShapeFit]) -> Option<Selection> {
    // Keep the first of equal minima so the cylinder-first candidate order
    // doubles as the tie-break.
    let mut best: Option<(&ShapeFit, f64)> = None;
    for f in fits {
        let adjusted = adjusted_error(f.params.kind(), f.error_pct);
        if best.map_or(true, |(_, b)| adjusted < b) {
            best = Some((f, adjusted));
        }
    }
    let (best_fit, best_adjusted) = best?;
    let mut selection = Selection {
        params: best_fit.params,
        fit_error_pct: best_fit.error_pct,
        adjusted_error_pct: best_adjusted,
    };

    if let ShapeParams::Frustum {
        r_bottom_mm,
        r_top_mm,
        ..
    } = best_fit.params
    {
        let r_max = r_bottom_mm.max(r_top_mm);
        if r_max > 0.0 && (r_top_mm - r_bottom_mm).abs() / r_max < NEAR_CYLINDER_REL_DIFF {
            if let Some(cyl) = fits
                .iter()
                .find(|f| f.params.kind() == ShapeKind::Cylinder)
            {
                if cyl.error_pct <= best_fit.error_pct * CYLINDER_PREFERENCE_FACTOR {
                    debug!(
                        "near-cylindrical frustum (r1={r_bottom_mm:.2}, r2={r_top_mm:.2}) \
                         overridden by cylinder"
                    );
                    selection = Selection {
                        params: cyl.params,
                        fit_error_pct: cyl.error_pct,
                        adjusted_error_pct: cyl.error_pct,
                    };
                }
            } else {
                // No cylinder fit converged; degrade the frustum in place.
                debug!("near-cylindrical frustum converted to cylinder (no cylinder fit)");
                selection.params = ShapeParams::Cylinder {
                    radius_mm: 0.5 * (r_bottom_mm + r_top_mm),
                };
            }
        }
    }

    Some(selection)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cylinder(r: f64, err: f64) -> ShapeFit {
        ShapeFit {
            params: ShapeParams::Cylinder { radius_mm: r },
            error_pct: err,
        }
    }

    fn frustum(r1: f64, r2: f64, err: f64) -> ShapeFit {
        ShapeFit {
            params: ShapeParams::Frustum {
                r_bottom_mm: r1,
                r_top_mm: r2,
                height_mm: 10.0,
            },
            error_pct: err,
        }
    }

    #[test]
    fn penalty_applies_only_below_ceiling() {
        assert_eq!(adjusted_error(ShapeKind::Frustum, 1.0), 1.5);
        assert_eq!(adjusted_error(ShapeKind::Cone, 1.0), 1.2);
        assert_eq!(adjusted_error(ShapeKind::Frustum, 4.0), 4.0);
        assert_eq!(adjusted_error(ShapeKind::Cylinder, 1.0), 1.0);
        assert_eq!(adjusted_error(ShapeKind::SphereCap, 1.0), 1.0);
    }

    #[test]
    fn penalty_lets_cylinder_beat_marginally_better_frustum() {
        let fits = vec![cylinder(5.0, 0.4), frustum(5.0, 4.7, 0.1)];
        let sel = select_best(&fits).unwrap();
        assert_eq!(sel.params.kind(), ShapeKind::Cylinder);
        assert_eq!(sel.fit_error_pct, 0.4);
    }

    #[test]
    fn near_cylindrical_frustum_is_overridden() {
        // Frustum wins on adjusted error (3.3 vs 3.35) but is nearly a
        // cylinder, and the cylinder's raw error stays within 1.2x of the
        // frustum's raw error (3.35 <= 3.36).
        let fits = vec![cylinder(5.0, 3.35), frustum(5.0, 5.1, 2.8)];
        let sel = select_best(&fits).unwrap();
        assert_eq!(sel.params.kind(), ShapeKind::Cylinder);
        assert_eq!(sel.fit_error_pct, 3.35);
        assert_eq!(sel.adjusted_error_pct, 3.35);
    }

    #[test]
    fn distinct_frustum_is_kept() {
        let fits = vec![cylinder(5.0, 8.0), frustum(6.5, 5.0, 0.2)];
        let sel = select_best(&fits).unwrap();
        assert_eq!(sel.params.kind(), ShapeKind::Frustum);
        assert_eq!(sel.adjusted_error_pct, 0.7);
    }

    #[test]
    fn lone_near_cylindrical_frustum_degrades_to_mean_radius_cylinder() {
        let fits = vec![frustum(5.0, 5.1, 0.5)];
        let sel = select_best(&fits).unwrap();
        let ShapeParams::Cylinder { radius_mm } = sel.params else {
            panic!("expected cylinder");
        };
        assert!((radius_mm - 5.05).abs() < 1e-12);
    }

    #[test]
    fn empty_candidate_set_yields_none() {
        assert!(select_best(&[]).is_none());
    }
}
