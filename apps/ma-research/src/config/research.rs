//! Search and selection sections of a research config.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::search::{CoarseGrid, RefineSpec, SearchConfig};
use crate::selection::{DEFAULT_DRAWDOWN_FLOOR, SelectionPolicy};

/// `search:` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSection {
    /// Coarse windows, strictly ascending.
    #[serde(default = "default_coarse_grid", alias = "windows")]
    pub coarse_grid: Vec<usize>,
    /// Refinement neighborhood.
    #[serde(default)]
    pub refine: RefineSpec,
    /// Evaluate stage windows in parallel.
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Smallest stage that runs in parallel.
    #[serde(default = "default_min_parallel_jobs")]
    pub min_parallel_jobs: usize,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            coarse_grid: default_coarse_grid(),
            refine: RefineSpec::default(),
            parallel: true,
            min_parallel_jobs: default_min_parallel_jobs(),
        }
    }
}

impl SearchSection {
    /// Validated coarse grid.
    pub fn grid(&self) -> Result<CoarseGrid> {
        CoarseGrid::new(self.coarse_grid.clone())
    }

    /// Executor settings.
    #[must_use]
    pub const fn search_config(&self) -> SearchConfig {
        SearchConfig {
            refine: self.refine,
            parallel: self.parallel,
            min_parallel_jobs: self.min_parallel_jobs,
        }
    }
}

/// `selection:` section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionSection {
    /// Minimum acceptable max drawdown (non-positive).
    #[serde(default = "default_drawdown_floor")]
    pub drawdown_floor: f64,
    /// Behavior when nothing meets the floor.
    #[serde(default)]
    pub policy: SelectionPolicy,
}

impl Default for SelectionSection {
    fn default() -> Self {
        Self {
            drawdown_floor: DEFAULT_DRAWDOWN_FLOOR,
            policy: SelectionPolicy::default(),
        }
    }
}

fn default_coarse_grid() -> Vec<usize> {
    vec![10, 20, 50, 100, 200]
}

const fn default_true() -> bool {
    true
}

const fn default_min_parallel_jobs() -> usize {
    4
}

const fn default_drawdown_floor() -> f64 {
    DEFAULT_DRAWDOWN_FLOOR
}
