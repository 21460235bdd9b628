//! Constants for backtest metric calculations.

/// Annualization factor for daily returns.
pub const TRADING_DAYS: f64 = 252.0;

/// Starting equity of every curve.
pub const INITIAL_EQUITY: f64 = 1.0;

/// Standard deviations at or below this are treated as zero.
pub const STD_EPSILON: f64 = 1e-12;
