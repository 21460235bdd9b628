//! Two-stage window search executor.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{Level, debug, info, span, trace};

use super::config::SearchConfig;
use super::grid::{CoarseGrid, RefineSpec};
use super::result::{CoarseStage, SearchResult};
use crate::backtest::{Metrics, evaluate};
use crate::error::{ResearchError, Result};
use crate::observability::record_search_stage;
use crate::series::FeatureSeries;

/// Coarse-then-refine parameter search over moving-average windows.
///
/// The two stages are independent: [`Self::coarse_stage`] produces a
/// [`CoarseStage`], which [`Self::refine_stage`] consumes. No window is
/// evaluated twice.
#[derive(Debug, Clone, Default)]
pub struct ParameterSearch {
    config: SearchConfig,
}

impl ParameterSearch {
    /// Create a new search.
    #[must_use]
    pub const fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration.
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run both stages.
    pub fn search(&self, series: &FeatureSeries, grid: &CoarseGrid) -> Result<SearchResult> {
        let _span = span!(Level::INFO, "parameter_search", source = series.source()).entered();
        self.config.refine.validate()?;

        let coarse = self.coarse_stage(series, grid)?;
        let refined = self.refine_stage(series, &coarse)?;
        let result = SearchResult::new(coarse, refined);

        info!(
            evaluated = result.len(),
            best_coarse_window = result.best_coarse_window,
            "Parameter search complete"
        );

        Ok(result)
    }

    /// Stage 1: evaluate every grid window and pick the best by Sharpe.
    pub fn coarse_stage(&self, series: &FeatureSeries, grid: &CoarseGrid) -> Result<CoarseStage> {
        // Fail before doing any work when the grid outgrows the history.
        if let Some(&window) = grid.windows().iter().find(|&&w| w > series.max_window()) {
            return Err(ResearchError::InsufficientHistory {
                window,
                required: window + 2,
                available: series.len(),
            });
        }

        let metrics = self.evaluate_all(series, grid.windows(), "coarse")?;
        let stage = CoarseStage::from_metrics(metrics).ok_or_else(|| {
            ResearchError::InvalidSearchSpace("coarse grid is empty".to_string())
        })?;

        info!(
            windows = grid.len(),
            best_window = stage.best_window,
            "Coarse stage complete"
        );

        Ok(stage)
    }

    /// Stage 2: evaluate the neighborhood of the coarse winner.
    ///
    /// Windows already present in `coarse` are skipped. Results are in
    /// ascending window order.
    pub fn refine_stage(&self, series: &FeatureSeries, coarse: &CoarseStage) -> Result<Vec<Metrics>> {
        self.config.refine.validate()?;

        let windows: Vec<usize> = self
            .config
            .refine
            .neighborhood(coarse.best_window, series.max_window())
            .into_iter()
            .filter(|w| !coarse.evaluated(*w))
            .collect();

        let refined = self.evaluate_all(series, &windows, "refine")?;

        info!(
            center = coarse.best_window,
            windows = refined.len(),
            "Refine stage complete"
        );

        Ok(refined)
    }

    fn evaluate_all(
        &self,
        series: &FeatureSeries,
        windows: &[usize],
        stage: &'static str,
    ) -> Result<Vec<Metrics>> {
        let total = windows.len();
        let completed = AtomicUsize::new(0);
        let start = Instant::now();

        let evaluate_one = |window: usize| {
            let result = evaluate(series, window);
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            trace!(stage, window, done, total, ok = result.is_ok(), "Window evaluated");
            result
        };

        let metrics: Result<Vec<Metrics>> = if self.config.runs_parallel(windows.len()) {
            windows.par_iter().map(|&w| evaluate_one(w)).collect()
        } else {
            windows.iter().map(|&w| evaluate_one(w)).collect()
        };

        let elapsed = start.elapsed().as_secs_f64();
        let done = completed.load(Ordering::Relaxed);
        debug!(
            stage,
            completed = done,
            total,
            windows_per_sec = if elapsed > 0.0 { done as f64 / elapsed } else { 0.0 },
            "Stage evaluations finished"
        );
        record_search_stage(stage, total, elapsed);

        metrics
    }
}

/// Builder for [`ParameterSearch`].
#[derive(Debug, Default)]
pub struct SearchBuilder {
    config: SearchConfig,
}

impl SearchBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the refinement neighborhood.
    #[must_use]
    pub const fn refine(mut self, refine: RefineSpec) -> Self {
        self.config.refine = refine;
        self
    }

    /// Set the refinement radius.
    #[must_use]
    pub const fn radius(mut self, radius: usize) -> Self {
        self.config.refine.radius = radius;
        self
    }

    /// Set the refinement stride.
    #[must_use]
    pub const fn stride(mut self, stride: usize) -> Self {
        self.config.refine.stride = stride;
        self
    }

    /// Set the refinement window bounds.
    #[must_use]
    pub const fn bounds(mut self, lower: usize, upper: usize) -> Self {
        self.config.refine.lower_bound = lower;
        self.config.refine.upper_bound = upper;
        self
    }

    /// Enable or disable parallel evaluation.
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Set the smallest stage that runs in parallel.
    #[must_use]
    pub const fn min_parallel_jobs(mut self, jobs: usize) -> Self {
        self.config.min_parallel_jobs = jobs;
        self
    }

    /// Build the search.
    #[must_use]
    pub const fn build(self) -> ParameterSearch {
        ParameterSearch::new(self.config)
    }
}
