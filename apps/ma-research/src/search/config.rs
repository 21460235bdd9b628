//! Configuration for the parameter search.

use serde::{Deserialize, Serialize};

use super::grid::RefineSpec;

/// Parameter search settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Neighborhood evaluated around the best coarse window.
    pub refine: RefineSpec,

    /// Evaluate the windows of a stage on the rayon pool.
    pub parallel: bool,

    /// Stages with fewer windows than this run sequentially.
    pub min_parallel_jobs: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            refine: RefineSpec::default(),
            parallel: true,
            min_parallel_jobs: 4,
        }
    }
}

impl SearchConfig {
    /// Whether a stage of `jobs` windows runs in parallel.
    #[must_use]
    pub const fn runs_parallel(&self, jobs: usize) -> bool {
        self.parallel && jobs >= self.min_parallel_jobs
    }
}
