//! Backtest engine for the moving-average trend rule.
//!
//! Given a [`FeatureSeries`](crate::series::FeatureSeries) and a window
//! length the engine computes:
//!
//! - **Moving average**: the precomputed `ma_<window>` column when the series
//!   carries one, otherwise the trailing simple mean of closes
//! - **Signal**: long (1) when close is strictly above the average, flat (0)
//!   otherwise, undefined during warm-up
//! - **Strategy return**: yesterday's signal times today's return
//! - **Equity**: compounded strategy returns starting at 1.0
//! - **Metrics**: total return, max drawdown, annualized Sharpe
//!
//! # Example
//!
//! ```ignore
//! use ma_research::backtest::evaluate;
//! use ma_research::series::load_feature_csv;
//!
//! let series = load_feature_csv("data/features/AAPL_feat.csv")?;
//! let metrics = evaluate(&series, 20)?;
//! println!("sharpe {:.2}", metrics.sharpe);
//! ```

mod calculator;
mod constants;
mod engine;
pub(crate) mod math;
mod types;

pub use calculator::{equity_curve, max_drawdown, sharpe_ratio, total_return};
pub use constants::{INITIAL_EQUITY, STD_EPSILON, TRADING_DAYS};
pub use engine::{evaluate, run};
pub use types::{BacktestResult, Metrics};
