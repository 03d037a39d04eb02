//! Transition detection: locate the profile indices where the vessel's
//! cross-section changes geometric family.
//!
//! The default detector scores every position with a blend of
//! first-derivative change and curvature, thresholds the score at an
//! SNR-adaptive percentile, enforces a minimum boundary spacing, and then
//! validates every resulting segment statistically. A simpler legacy
//! detector (single first-difference threshold plus variance validation)
//! is kept for comparison runs.

mod adaptive;
mod legacy;
mod score;
mod validate;


use log::debug;

use crate::analyzer::{AnalyzerParams, DetectionMethod};
use crate::diagnostics::TransitionTrace;
use crate::filters::{self, odd_window};
use crate::types::AreaProfile;

pub use adaptive::{estimate_snr, percentile_for_snr};

/// Boundaries plus the diagnostics collected while finding them.
#[derive(Clone, Debug)]
pub struct DetectionOutcome {
    /// Sorted, de-duplicated profile indices; always includes the first
    /// and last profile index.
    pub boundaries: Vec<usize>,
    pub trace: TransitionTrace,
}

/// Detect segment boundaries in an area profile.
///
/// Returning only the two endpoints is a valid outcome (the whole profile
/// is a single segment), not an error.
pub fn detect_transitions(profile: &AreaProfile, params: &AnalyzerParams) -> DetectionOutcome {
    let m = profile.len();
    let area = profile.areas();
    let heights = profile.mid_heights();

    if m < 2 * params.min_points {
        debug!("profile too short for segmentation ({m} points), single segment");
        return DetectionOutcome {
            boundaries: vec![0, m.saturating_sub(1)],
            trace: TransitionTrace {
                boundaries: vec![0, m.saturating_sub(1)],
                ..Default::default()
            },
        };
    }

    match params.detection {
        DetectionMethod::Improved => detect_improved(&area, &heights, params),
        DetectionMethod::Legacy => legacy::detect_legacy(&area, &heights, params),
    }
}

fn detect_improved(area: &[f64], heights: &[f64], params: &AnalyzerParams) -> DetectionOutcome {
    let m = area.len();
    let window = odd_window(m / 10, 5, 15);
    let smooth = filters::savgol_smooth(area, heights, window, 2);

    let score = score::combined_score(&smooth, heights);

    let (snr, pct) = if params.use_adaptive_threshold {
        let snr = adaptive::estimate_snr(area, heights);
        let pct = adaptive::percentile_for_snr(snr);
        debug!("adaptive threshold: snr={snr:.2}, percentile={pct}");
        (Some(snr), pct)
    } else {
        (None, params.percentile)
    };

    let threshold = filters::percentile(&score, pct as f64);

    // Score index i describes the change between derivative samples i and
    // i+1, hence the +1 shift back into profile coordinates.
    let raw_candidates: Vec<usize> = score
        .iter()
        .enumerate()
        .filter(|(_, &s)| s > threshold)
        .map(|(i, _)| i + 1)
        .collect();

    let mut transitions = vec![0usize];
    for &cand in &raw_candidates {
        if cand >= transitions.last().unwrap() + params.min_points && cand < m - 1 {
            transitions.push(cand);
        }
    }
    if *transitions.last().unwrap() != m - 1 {
        transitions.push(m - 1);
    }

    let boundaries = validate::validate_boundaries(area, &transitions, params.min_points);

    if params.debug_transitions {
        let (score_min, score_max) = score
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
                (lo.min(s), hi.max(s))
            });
        debug!("transition score range: {score_min:.6} .. {score_max:.6}");
        debug!("threshold: {threshold:.6} (percentile {pct})");
        debug!("candidates: {raw_candidates:?}");
        debug!("boundaries: {boundaries:?}");
    }

    DetectionOutcome {
        trace: TransitionTrace {
            snr,
            percentile: pct,
            threshold,
            raw_candidates,
            spaced: transitions,
            boundaries: boundaries.clone(),
        },
        boundaries,
    }
}
