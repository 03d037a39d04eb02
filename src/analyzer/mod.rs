//! Pipeline orchestration: samples in, finalized segment list out.
//!
//! Stages run strictly in order — area estimation, transition detection,
//! per-segment fitting and selection, continuity merging. Per-segment
//! fitting is dispatched across the rayon pool (the four shape fits of a
//! segment are independent of every other segment); the order-preserving
//! collect keeps the result deterministic.
//!
//! Typical usage:
//! ```no_run
//! use vessel_profiler::{AnalyzerParams, ProfileAnalyzer, Sample};
//!
//! # fn example(samples: Vec<Sample>) -> Result<(), vessel_profiler::AnalysisError> {
//! let analyzer = ProfileAnalyzer::new(AnalyzerParams::default());
//! let report = analyzer.analyze(&samples)?;
//! println!("{} segments", report.segments.len());
//! # Ok(())
//! # }
//! ```

mod params;

pub use params::{AnalyzerParams, DetectionMethod};

use std::time::Instant;

use log::warn;
use rayon::prelude::*;

use crate::area;
use crate::diagnostics::{AnalysisReport, TimingBreakdown};
use crate::error::AnalysisError;
use crate::fit::{self, SegmentWindow};
use crate::merge;
use crate::select::{self, adjusted_error};
use crate::transitions;
use crate::types::{Sample, Segment, ShapeKind};

/// Vessel profile analyzer; one immutable parameter set per instance.
pub struct ProfileAnalyzer {
    params: AnalyzerParams,
}

impl ProfileAnalyzer {
    pub fn new(params: AnalyzerParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AnalyzerParams {
        &self.params
    }

    /// Run the full pipeline over a measured filling curve.
    ///
    /// Only input-contract violations surface as errors; per-shape and
    /// per-segment fit failures are absorbed and annotated on the
    /// affected segment.
    pub fn analyze(&self, samples: &[Sample]) -> Result<AnalysisReport, AnalysisError> {
        let total_start = Instant::now();
        validate_samples(samples)?;

        let mut timing = TimingBreakdown::default();

        let stage = Instant::now();
        let profile = area::estimate_area_profile(samples, &self.params)?;
        timing.push("areaEstimation", elapsed_ms(stage));

        let stage = Instant::now();
        let detection = transitions::detect_transitions(&profile, &self.params);
        timing.push("transitionDetection", elapsed_ms(stage));

        let stage = Instant::now();
        let areas = profile.areas();
        let spans: Vec<(usize, usize)> = detection
            .boundaries
            .windows(2)
            .map(|w| (w[0], w[1]))
            .collect();
        let mut segments: Vec<Segment> = spans
            .par_iter()
            .map(|&(start, end)| self.fit_segment(samples, &areas, start, end))
            .collect();
        timing.push("shapeFitting", elapsed_ms(stage));

        let stage = Instant::now();
        merge::merge_segments(&mut segments, samples, &areas, &self.params);
        timing.push("segmentMerging", elapsed_ms(stage));

        timing.total_ms = elapsed_ms(total_start);
        Ok(AnalysisReport {
            segments,
            profile,
            transitions: detection.trace,
            timing,
        })
    }

    fn fit_segment(
        &self,
        samples: &[Sample],
        areas: &[f64],
        start: usize,
        end: usize,
    ) -> Segment {
        let window = SegmentWindow::new(samples, areas, start, end);
        let fits = fit::fit_all(&window, self.params.max_fit_iters);

        let (selection, low_confidence) = match select::select_best(&fits) {
            Some(selection) => (selection, false),
            None => {
                warn!(
                    "all shape fits failed for segment {start}..{end}, \
                     synthesizing fallback cylinder"
                );
                let fallback = fit::fallback_cylinder(&window);
                (
                    select::Selection {
                        params: fallback.params,
                        fit_error_pct: fallback.error_pct,
                        adjusted_error_pct: adjusted_error(
                            ShapeKind::Cylinder,
                            fallback.error_pct,
                        ),
                    },
                    true,
                )
            }
        };

        Segment {
            start_index: start,
            end_index: end,
            start_height_mm: samples[start].height_mm,
            end_height_mm: samples[end + 1].height_mm,
            params: selection.params,
            fit_error_pct: selection.fit_error_pct,
            adjusted_error_pct: selection.adjusted_error_pct,
            low_confidence,
        }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Check the input contract: finite non-negative values, strictly
/// increasing heights and volumes.
fn validate_samples(samples: &[Sample]) -> Result<(), AnalysisError> {
    for (i, s) in samples.iter().enumerate() {
        if !s.height_mm.is_finite()
            || !s.volume_mm3.is_finite()
            || s.height_mm < 0.0
            || s.volume_mm3 < 0.0
        {
            return Err(AnalysisError::InvalidSample { index: i });
        }
        if i > 0 {
            if s.height_mm <= samples[i - 1].height_mm {
                return Err(AnalysisError::NonMonotonicHeight { index: i });
            }
            if s.volume_mm3 <= samples[i - 1].volume_mm3 {
                return Err(AnalysisError::NonMonotonicVolume { index: i });
            }
        }
    }
    Ok(())
}
