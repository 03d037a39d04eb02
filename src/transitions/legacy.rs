//! Legacy transition detection: single first-difference percentile
//! threshold with coefficient-of-variation validation.

use crate::analyzer::AnalyzerParams;
use crate::diagnostics::TransitionTrace;
use crate::filters::{self, odd_window};

use super::DetectionOutcome;

pub(super) fn detect_legacy(
    area: &[f64],
    heights: &[f64],
    params: &AnalyzerParams,
) -> DetectionOutcome {
    let m = area.len();
    let window = odd_window(m / 10, 5, 15);
    let smooth = filters::savgol_smooth(area, heights, window, 2);

    let diffs: Vec<f64> = (0..m - 1)
        .map(|i| (smooth[i + 1] - smooth[i]).abs())
        .collect();
    let threshold = filters::percentile(&diffs, params.percentile as f64);
    let raw_candidates: Vec<usize> = diffs
        .iter()
        .enumerate()
        .filter(|(_, &d)| d > threshold)
        .map(|(i, _)| i + 1)
        .collect();

    let mut transitions = vec![0usize];
    for &cand in &raw_candidates {
        if cand >= transitions.last().unwrap() + params.min_points {
            transitions.push(cand);
        }
    }
    if *transitions.last().unwrap() != m - 1 {
        transitions.push(m - 1);
    }

    let mut validated = vec![0usize];
    for i in 0..transitions.len() - 1 {
        let start = transitions[i];
        let end = transitions[i + 1];
        if end - start + 1 < params.min_points {
            continue;
        }
        let segment = &area[start..end.max(start + 1)];
        let cv = filters::std_dev(segment) / (filters::mean(segment) + 1e-8);
        if cv > params.variance_threshold {
            validated.push(end);
        }
    }

    if validated.len() == 1 {
        validated.push(m - 1);
    } else if *validated.last().unwrap() != m - 1 {
        *validated.last_mut().unwrap() = m - 1;
    }
    validated.sort_unstable();
    validated.dedup();

    DetectionOutcome {
        trace: TransitionTrace {
            snr: None,
            percentile: params.percentile,
            threshold,
            raw_candidates,
            spaced: transitions,
            boundaries: validated.clone(),
        },
        boundaries: validated,
    }
}
