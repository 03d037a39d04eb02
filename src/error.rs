//! Input-contract failures surfaced to the caller.
//!
//! Per-shape and per-segment fitting failures are absorbed inside the
//! pipeline (see [`crate::fit`] and [`crate::select`]); only contract
//! violations of the input sample sequence propagate as errors.

/// Reasons why a pipeline invocation may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalysisError {
    /// Fewer samples than the minimum the estimator can work with.
    InsufficientData { found: usize, minimum: usize },
    /// Sample heights must be strictly increasing; `index` is the first
    /// offending position.
    NonMonotonicHeight { index: usize },
    /// Cumulative volumes must be strictly increasing; `index` is the first
    /// offending position.
    NonMonotonicVolume { index: usize },
    /// Heights or volumes must be non-negative and finite.
    InvalidSample { index: usize },
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::InsufficientData { found, minimum } => {
                write!(f, "insufficient samples ({found} < {minimum})")
            }
            AnalysisError::NonMonotonicHeight { index } => {
                write!(f, "height not strictly increasing at sample {index}")
            }
            AnalysisError::NonMonotonicVolume { index } => {
                write!(f, "volume not strictly increasing at sample {index}")
            }
            AnalysisError::InvalidSample { index } => {
                write!(f, "non-finite or negative value at sample {index}")
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let e = AnalysisError::InsufficientData {
            found: 9,
            minimum: 15,
        };
        assert_eq!(e.to_string(), "insufficient samples (9 < 15)");
        let e = AnalysisError::NonMonotonicVolume { index: 7 };
        assert!(e.to_string().contains("sample 7"));
    }
}
