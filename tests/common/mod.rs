//! Synthetic vessel generators shared by the integration tests.
//!
//! Filling curves are exact: every sample volume comes from the closed-form
//! section laws, so any fit error a test observes belongs to the pipeline,
//! not to the data.

use vessel_profiler::{Sample, ShapeParams};

/// A vessel built from stacked primitive sections.
pub struct SyntheticVessel {
    sections: Vec<(ShapeParams, f64)>,
}

impl SyntheticVessel {
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
        }
    }

    pub fn section(mut self, params: ShapeParams, height_mm: f64) -> Self {
        self.sections.push((params, height_mm));
        self
    }

    pub fn total_height(&self) -> f64 {
        self.sections.iter().map(|(_, h)| h).sum()
    }

    /// Exact cumulative volume at absolute height `h`.
    pub fn volume_at(&self, h: f64) -> f64 {
        let mut base_h = 0.0;
        let mut base_v = 0.0;
        for &(params, height) in &self.sections {
            if h <= base_h + height {
                return base_v + params.volume_at(h - base_h);
            }
            base_v += params.volume_at(height);
            base_h += height;
        }
        base_v
    }

    /// `n` uniformly spaced samples from the vessel bottom to its top.
    pub fn samples(&self, n: usize) -> Vec<Sample> {
        let total = self.total_height();
        (0..n)
            .map(|i| {
                let h = total * i as f64 / (n - 1) as f64;
                Sample::new(h, self.volume_at(h))
            })
            .collect()
    }
}
