// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::items_after_statements
    )
)]

//! MA Research - Backtest and Parameter Search Core
//!
//! Backtests a single moving-average trend rule (long while close is above
//! MA(window), flat otherwise) over a sweep of window lengths, and picks a
//! window by Sharpe ratio under a drawdown constraint.
//!
//! # Layers (leaf first)
//!
//! - [`series`]: the input contract (`FeatureSeries`), CSV loader and
//!   feature builder
//! - [`backtest`]: moving average, signal, lagged returns, equity, metrics
//! - [`search`]: two-stage coarse-then-refine window search
//! - [`selection`]: drawdown-floor filter and Sharpe ranking
//! - [`research`]: runs search then selection, ranks runs against each other
//!
//! Ambient pieces: [`config`] (YAML with env interpolation), [`telemetry`]
//! (tracing subscriber, optional OTLP), [`observability`] (metrics facade)
//! and [`error`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod backtest;
pub mod config;
pub mod error;
pub mod observability;
pub mod research;
pub mod search;
pub mod selection;
pub mod series;
pub mod telemetry;

pub use backtest::{BacktestResult, Metrics, evaluate, run};
pub use error::{ErrorCode, ResearchError, Result};
pub use research::{ResearchReport, RunSummary, rank_runs, run_research};
pub use search::{CoarseGrid, ParameterSearch, RefineSpec, SearchConfig, SearchResult, search};
pub use selection::{Selection, SelectionPolicy, select, select_with_policy};
pub use series::{FeatureSeries, PricePoint};
