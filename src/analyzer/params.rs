//! Parameter types configuring the analysis pipeline.
//!
//! One immutable [`AnalyzerParams`] value is passed into every pipeline
//! invocation; no process-wide defaults are mutated at runtime. Defaults
//! match the tuned values of the measurement rigs this pipeline was
//! developed against.

use serde::{Deserialize, Serialize};

/// Which transition detection algorithm to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Combined first/second-derivative scoring with statistical
    /// validation (default).
    #[default]
    Improved,
    /// First-difference percentile threshold with coefficient-of-variation
    /// validation.
    Legacy,
}

/// Pipeline-wide parameters, consumed read-only by every stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzerParams {
    /// Score percentile used when adaptive thresholding is off, and by the
    /// legacy detector.
    pub percentile: u32,
    /// Minimum coefficient of variation for the legacy detector to accept
    /// a segment boundary.
    pub variance_threshold: f64,
    /// Relative boundary-radius tolerance for merging adjacent frustum and
    /// cone segments. Cylinders use a fixed, tighter 5% tolerance.
    pub merge_threshold: f64,
    /// Map the detection percentile from the estimated signal-to-noise
    /// ratio instead of using `percentile` directly.
    pub use_adaptive_threshold: bool,
    /// Derive areas by local polynomial regression rather than raw
    /// per-cell differences.
    pub use_local_regression: bool,
    /// Emit the detector's score/threshold internals through `log::debug!`
    /// and retain them in the transition trace.
    pub debug_transitions: bool,
    /// Transition detection algorithm.
    pub detection: DetectionMethod,
    /// Minimum number of profile points between accepted boundaries.
    pub min_points: usize,
    /// Iteration cap for each bounded least-squares fit.
    pub max_fit_iters: usize,
}

impl Default for AnalyzerParams {
    fn default() -> Self {
        Self {
            percentile: 90,
            variance_threshold: 0.14,
            merge_threshold: 0.10,
            use_adaptive_threshold: true,
            use_local_regression: true,
            debug_transitions: false,
            detection: DetectionMethod::Improved,
            min_points: 12,
            max_fit_iters: 4000,
        }
    }
}
