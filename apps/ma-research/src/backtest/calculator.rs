//! Metric calculations over strategy returns and equity curves.

use super::constants::{INITIAL_EQUITY, TRADING_DAYS};
use super::math::{is_degenerate, mean, std_dev};

/// Compound strategy returns into an equity curve starting at 1.0.
///
/// Undefined returns contribute nothing.
pub fn equity_curve(strategy_returns: &[Option<f64>]) -> Vec<f64> {
    strategy_returns
        .iter()
        .scan(INITIAL_EQUITY, |equity, ret| {
            *equity *= 1.0 + ret.unwrap_or(0.0);
            Some(*equity)
        })
        .collect()
}

/// Final equity minus one.
pub fn total_return(equity: &[f64]) -> f64 {
    equity.last().map_or(0.0, |e| e - INITIAL_EQUITY)
}

/// Minimum of equity / running peak - 1 (always <= 0).
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for &value in equity {
        peak = peak.max(value);
        if peak > 0.0 {
            max_dd = max_dd.min(value / peak - 1.0);
        }
    }

    max_dd
}

/// Annualized Sharpe ratio over defined returns (risk-free rate ~0).
///
/// Exactly 0.0 when fewer than two defined returns exist or their
/// standard deviation is zero, near zero, or undefined.
pub fn sharpe_ratio(strategy_returns: &[Option<f64>]) -> f64 {
    let defined: Vec<f64> = strategy_returns.iter().flatten().copied().collect();
    if defined.len() < 2 {
        return 0.0;
    }

    let (Some(avg), Some(std)) = (mean(&defined), std_dev(&defined)) else {
        return 0.0;
    };
    if is_degenerate(std) {
        return 0.0;
    }

    let sharpe = avg / std * TRADING_DAYS.sqrt();
    if sharpe.is_finite() { sharpe } else { 0.0 }
}
