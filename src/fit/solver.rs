//! Bounded damped least squares (Levenberg–Marquardt with box-projected
//! steps and a numeric Jacobian).
//!
//! The fitted models have one to two parameters, so the normal equations
//! stay tiny; damping plus projection onto the parameter box is enough to
//! keep the iteration stable for every shape family.

use nalgebra::{DMatrix, DVector};

const INITIAL_LAMBDA: f64 = 1e-3;
const LAMBDA_UP: f64 = 10.0;
const LAMBDA_DOWN: f64 = 0.3;
const LAMBDA_MAX: f64 = 1e12;
const JACOBIAN_REL_STEP: f64 = 1e-6;
const STEP_TOL: f64 = 1e-10;
const GRADIENT_TOL: f64 = 1e-12;

/// Minimize the sum of squared residuals over a parameter box.
///
/// `residuals` returns `None` when the model cannot be evaluated; the
/// solver treats that as a rejected step. Returns `None` when the bounds
/// are infeasible, the residuals are not finite at the (clamped) starting
/// point, or the iteration budget runs out before a convergence test
/// passes — the caller records this as a per-shape convergence failure.
pub(crate) fn solve_bounded<F>(
    residuals: F,
    initial: &[f64],
    lower: &[f64],
    upper: &[f64],
    max_iters: usize,
) -> Option<Vec<f64>>
where
    F: Fn(&[f64]) -> Option<DVector<f64>>,
{
    let k = initial.len();
    if k == 0 || lower.len() != k || upper.len() != k {
        return None;
    }
    for j in 0..k {
        if !lower[j].is_finite() || !upper[j].is_finite() || lower[j] > upper[j] {
            return None;
        }
    }

    let clamp = |p: &mut [f64]| {
        for j in 0..k {
            p[j] = p[j].clamp(lower[j], upper[j]);
        }
    };

    let mut p: Vec<f64> = initial.to_vec();
    clamp(&mut p);

    let mut r = residuals(&p)?;
    let mut cost = r.norm_squared();
    if !cost.is_finite() {
        return None;
    }

    let mut lambda = INITIAL_LAMBDA;
    let mut iter = 0usize;

    while iter < max_iters {
        let jac = numeric_jacobian(&residuals, &p, &r)?;
        let jt = jac.transpose();
        let jtj = &jt * &jac;
        let grad = &jt * &r;
        if grad.amax() < GRADIENT_TOL {
            return Some(p);
        }

        let mut accepted = false;
        while iter < max_iters {
            iter += 1;
            let mut damped = jtj.clone();
            for d in 0..k {
                damped[(d, d)] += lambda * jtj[(d, d)].max(1e-12);
            }
            if let Some(delta) = damped.lu().solve(&(-&grad)) {
                let mut candidate: Vec<f64> =
                    p.iter().zip(delta.iter()).map(|(&pi, &di)| pi + di).collect();
                clamp(&mut candidate);
                if let Some(rc) = residuals(&candidate) {
                    let candidate_cost = rc.norm_squared();
                    if candidate_cost.is_finite() && candidate_cost < cost {
                        let step: f64 = p
                            .iter()
                            .zip(candidate.iter())
                            .map(|(&a, &b)| (a - b) * (a - b))
                            .sum::<f64>()
                            .sqrt();
                        let drop = cost - candidate_cost;
                        p = candidate;
                        r = rc;
                        cost = candidate_cost;
                        lambda = (lambda * LAMBDA_DOWN).max(1e-12);
                        accepted = true;
                        if step < STEP_TOL || drop <= 1e-14 * cost.max(1.0) {
                            return Some(p);
                        }
                        break;
                    }
                }
            }
            lambda *= LAMBDA_UP;
            if lambda > LAMBDA_MAX {
                // No damping admits an improving step: stationary point,
                // usually on the box boundary.
                return Some(p);
            }
        }
        if !accepted {
            break;
        }
    }

    // Iteration budget exhausted before any convergence test passed.
    None
}

fn numeric_jacobian<F>(residuals: &F, p: &[f64], r0: &DVector<f64>) -> Option<DMatrix<f64>>
where
    F: Fn(&[f64]) -> Option<DVector<f64>>,
{
    let m = r0.len();
    let k = p.len();
    let mut jac = DMatrix::<f64>::zeros(m, k);
    for j in 0..k {
        let step = JACOBIAN_REL_STEP * p[j].abs().max(1e-3);
        let mut pj = p.to_vec();
        pj[j] += step;
        let rj = residuals(&pj)?;
        for i in 0..m {
            let d = (rj[i] - r0[i]) / step;
            if !d.is_finite() {
                return None;
            }
            jac[(i, j)] = d;
        }
    }
    Some(jac)
}
