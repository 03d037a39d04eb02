#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod analyzer;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod types;

// “Expert” modules – still public, but considered unstable internals.
pub mod area;
pub mod filters;
pub mod fit;
pub mod merge;
pub mod select;
pub mod transitions;

// --- High-level re-exports -------------------------------------------------

// Main entry points: analyzer + results.
pub use crate::analyzer::{AnalyzerParams, DetectionMethod, ProfileAnalyzer};
pub use crate::diagnostics::AnalysisReport;
pub use crate::error::AnalysisError;
pub use crate::types::{AreaProfile, Sample, Segment, ShapeKind, ShapeParams};

/// Small prelude for quick experiments.
pub mod prelude {
    pub use crate::{
        AnalysisError, AnalysisReport, AnalyzerParams, ProfileAnalyzer, Sample, Segment,
        ShapeKind, ShapeParams,
    };
}
