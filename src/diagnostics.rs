//! Structured diagnostics returned alongside the final segment list:
//! per-stage timings and the transition detector's internals.

use serde::Serialize;

use crate::types::{AreaProfile, Segment};

/// Timing entry for a single pipeline stage.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

impl StageTiming {
    pub fn new(label: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            label: label.into(),
            elapsed_ms,
        }
    }
}

/// Aggregated timing trace for one pipeline invocation.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming::new(label, elapsed_ms));
    }
}

/// What the transition detector saw while choosing the boundaries.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionTrace {
    /// Estimated signal-to-noise ratio; `None` when adaptive thresholding
    /// was off or the profile was too short to segment.
    pub snr: Option<f64>,
    /// Score percentile the threshold was taken at.
    pub percentile: u32,
    /// Absolute score threshold.
    pub threshold: f64,
    /// Profile indices whose score exceeded the threshold.
    pub raw_candidates: Vec<usize>,
    /// Candidates after minimum-spacing enforcement (endpoints included).
    pub spaced: Vec<usize>,
    /// Final validated boundaries.
    pub boundaries: Vec<usize>,
}

/// Full result of one pipeline invocation: the finalized segment list plus
/// everything needed to audit how it was produced. Downstream consumers
/// (mesh export, reporting) treat this as read-only.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub segments: Vec<Segment>,
    pub profile: AreaProfile,
    pub transitions: TransitionTrace,
    pub timing: TimingBreakdown,
}
