//! Result types for the two search stages.

use serde::{Deserialize, Serialize};

use crate::backtest::Metrics;

/// Output of the coarse stage, handed to the refine stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoarseStage {
    /// Metrics for every grid window, in grid order.
    pub metrics: Vec<Metrics>,
    /// Window with the highest Sharpe (first in grid order on ties).
    pub best_window: usize,
}

impl CoarseStage {
    /// Build the handoff from coarse metrics in grid order.
    ///
    /// Returns `None` when `metrics` is empty.
    #[must_use]
    pub fn from_metrics(metrics: Vec<Metrics>) -> Option<Self> {
        let best_window = metrics
            .iter()
            .fold(None::<&Metrics>, |best, m| match best {
                Some(b) if m.sharpe <= b.sharpe => Some(b),
                _ => Some(m),
            })?
            .window;
        Some(Self {
            metrics,
            best_window,
        })
    }

    /// Whether `window` was already evaluated.
    #[must_use]
    pub fn evaluated(&self, window: usize) -> bool {
        self.metrics.iter().any(|m| m.window == window)
    }

    /// Metrics of the best coarse window.
    #[must_use]
    pub fn best(&self) -> Option<&Metrics> {
        self.metrics.iter().find(|m| m.window == self.best_window)
    }
}

/// Combined result of a two-stage search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Coarse-stage metrics, in grid order.
    pub coarse: Vec<Metrics>,
    /// Refine-stage metrics for windows not on the grid, ascending.
    pub refined: Vec<Metrics>,
    /// Winner of the coarse stage.
    pub best_coarse_window: usize,
}

impl SearchResult {
    /// Join a coarse stage with its refinement.
    #[must_use]
    pub fn new(coarse: CoarseStage, refined: Vec<Metrics>) -> Self {
        Self {
            coarse: coarse.metrics,
            refined,
            best_coarse_window: coarse.best_window,
        }
    }

    /// All metrics: coarse first, then refined.
    pub fn metrics(&self) -> impl Iterator<Item = &Metrics> {
        self.coarse.iter().chain(&self.refined)
    }

    /// All metrics as an owned vector.
    #[must_use]
    pub fn into_metrics(self) -> Vec<Metrics> {
        let mut all = self.coarse;
        all.extend(self.refined);
        all
    }

    /// Every evaluated window, coarse first.
    #[must_use]
    pub fn windows(&self) -> Vec<usize> {
        self.metrics().map(|m| m.window).collect()
    }

    /// Total number of evaluations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coarse.len() + self.refined.len()
    }

    /// Whether nothing was evaluated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Metrics for `window`, if it was evaluated.
    #[must_use]
    pub fn get(&self, window: usize) -> Option<&Metrics> {
        self.metrics().find(|m| m.window == window)
    }
}
