//! Core types for backtest results and metrics.

use serde::{Deserialize, Serialize};

/// Performance metrics for one (series, window) evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Moving-average window.
    pub window: usize,
    /// Final equity minus one.
    pub total_return: f64,
    /// Worst peak-to-trough decline (non-positive, e.g. -0.22 = -22%).
    pub max_drawdown: f64,
    /// Annualized Sharpe ratio (0.0 when degenerate).
    pub sharpe: f64,
    /// Number of defined strategy-return observations.
    pub observations: usize,
    /// Provenance of the evaluated series.
    pub source: String,
}

impl Metrics {
    /// Whether the drawdown stays within `drawdown_floor`.
    #[must_use]
    pub fn within_drawdown(&self, drawdown_floor: f64) -> bool {
        self.max_drawdown >= drawdown_floor
    }
}

/// Full per-row output of a single backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Moving-average window.
    pub window: usize,
    /// Moving average per row, `None` during warm-up.
    pub moving_average: Vec<Option<f64>>,
    /// 1 when long, 0 when flat, `None` where the moving average is undefined.
    pub signal: Vec<Option<u8>>,
    /// Previous signal times current daily return, `None` where undefined.
    pub strategy_return: Vec<Option<f64>>,
    /// Compounded equity, starting at 1.0.
    pub equity: Vec<f64>,
    /// Derived metrics.
    pub metrics: Metrics,
}

impl BacktestResult {
    /// Number of rows the strategy was long.
    #[must_use]
    pub fn days_long(&self) -> usize {
        self.signal.iter().filter(|s| **s == Some(1)).count()
    }

    /// Final equity value.
    #[must_use]
    pub fn final_equity(&self) -> f64 {
        self.equity.last().copied().unwrap_or(1.0)
    }
}
