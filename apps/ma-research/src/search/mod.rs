//! Two-stage parameter search over moving-average windows.
//!
//! Stage 1 evaluates a caller-supplied coarse grid and picks the window with
//! the highest Sharpe ratio. Stage 2 evaluates a strided neighborhood around
//! that window, skipping grid points already evaluated. The result is the
//! union of both stages.
//!
//! Within a stage, windows may be evaluated on the rayon pool; results always
//! come back in window order and the first failure aborts the search. Each
//! stage logs its completed evaluations and throughput.

mod config;
mod executor;
mod grid;
mod result;

pub use config::SearchConfig;
pub use executor::{ParameterSearch, SearchBuilder};
pub use grid::{CoarseGrid, RefineSpec};
pub use result::{CoarseStage, SearchResult};

use crate::error::Result;
use crate::series::FeatureSeries;

/// Run a two-stage search with the reference refinement settings.
pub fn search(series: &FeatureSeries, coarse_grid: &[usize]) -> Result<SearchResult> {
    let grid = CoarseGrid::new(coarse_grid.to_vec())?;
    ParameterSearch::default().search(series, &grid)
}
