//! Moving-average crossover backtest.

use std::time::Instant;

use tracing::{Level, debug, span};

use super::calculator::{equity_curve, max_drawdown, sharpe_ratio, total_return};
use super::math::rolling_mean;
use super::types::{BacktestResult, Metrics};
use crate::error::{ResearchError, Result};
use crate::observability::record_evaluation;
use crate::series::FeatureSeries;

/// Rows needed beyond the window: one for the first lagged return and one
/// so at least two returns can exist.
const EXTRA_ROWS: usize = 2;

/// Evaluate one window and return its metrics.
pub fn evaluate(series: &FeatureSeries, window: usize) -> Result<Metrics> {
    run(series, window).map(|result| result.metrics)
}

/// Run the full backtest for one window.
///
/// Long (signal 1) while close is strictly above the trailing simple
/// moving average, flat otherwise. The position decided on day `t - 1`
/// earns the return of day `t`.
pub fn run(series: &FeatureSeries, window: usize) -> Result<BacktestResult> {
    let _span = span!(Level::DEBUG, "backtest", window, rows = series.len()).entered();
    let start = Instant::now();

    check_history(series, window)?;

    let moving_average = moving_average(series, window);
    let signal = signals(series, &moving_average);
    let strategy_return = strategy_returns(series, &signal);
    let equity = equity_curve(&strategy_return);

    let metrics = Metrics {
        window,
        total_return: total_return(&equity),
        max_drawdown: max_drawdown(&equity),
        sharpe: sharpe_ratio(&strategy_return),
        observations: strategy_return.iter().flatten().count(),
        source: series.source().to_string(),
    };

    debug!(
        window,
        total_return = metrics.total_return,
        max_drawdown = metrics.max_drawdown,
        sharpe = metrics.sharpe,
        "Evaluated window"
    );
    record_evaluation(start.elapsed().as_secs_f64());

    Ok(BacktestResult {
        window,
        moving_average,
        signal,
        strategy_return,
        equity,
        metrics,
    })
}

fn check_history(series: &FeatureSeries, window: usize) -> Result<()> {
    if window == 0 {
        return Err(ResearchError::InvalidWindow { window });
    }
    let required = window + EXTRA_ROWS;
    if series.len() < required {
        return Err(ResearchError::InsufficientHistory {
            window,
            required,
            available: series.len(),
        });
    }
    Ok(())
}

/// Precomputed column when attached, trailing mean of closes otherwise.
fn moving_average(series: &FeatureSeries, window: usize) -> Vec<Option<f64>> {
    series
        .precomputed_moving_average(window)
        .map_or_else(|| rolling_mean(&series.closes(), window), <[_]>::to_vec)
}

fn signals(series: &FeatureSeries, moving_average: &[Option<f64>]) -> Vec<Option<u8>> {
    series
        .points()
        .iter()
        .zip(moving_average)
        .map(|(point, ma)| ma.map(|ma| u8::from(point.close > ma)))
        .collect()
}

fn strategy_returns(series: &FeatureSeries, signal: &[Option<u8>]) -> Vec<Option<f64>> {
    series
        .points()
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let prev = i.checked_sub(1)?;
            // Undefined signals (warm-up) hold no position.
            let position = f64::from(signal[prev].unwrap_or(0));
            point.daily_return.map(|r| position * r)
        })
        .collect()
}
