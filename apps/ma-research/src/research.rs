//! Research runner: search a series, select a window, and rank runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::backtest::Metrics;
use crate::config::ResearchConfig;
use crate::error::Result;
use crate::search::{ParameterSearch, SearchResult};
use crate::selection::{Selection, select_with_policy};
use crate::series::FeatureSeries;

/// Everything one research run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchReport {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// Run label from the config.
    pub run_name: String,
    /// Provenance of the researched series.
    pub source: String,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Search output (coarse and refined metrics).
    pub search: SearchResult,
    /// Selection outcome.
    pub selection: Selection,
}

impl ResearchReport {
    /// The selected configuration.
    #[must_use]
    pub const fn best(&self) -> &Metrics {
        &self.selection.best
    }
}

/// Run the search and selection described by `config` over `series`.
pub fn run_research(series: &FeatureSeries, config: &ResearchConfig) -> Result<ResearchReport> {
    let run_id = Uuid::new_v4();
    info!(
        %run_id,
        run_name = %config.run_name,
        source = series.source(),
        rows = series.len(),
        "Starting research run"
    );

    let grid = config.search.grid()?;
    let search = ParameterSearch::new(config.search.search_config()).search(series, &grid)?;

    let candidates: Vec<Metrics> = search.metrics().cloned().collect();
    let selection = select_with_policy(
        &candidates,
        config.selection.drawdown_floor,
        config.selection.policy,
    )?;

    info!(
        %run_id,
        window = selection.best.window,
        sharpe = selection.best.sharpe,
        max_drawdown = selection.best.max_drawdown,
        fallback_used = selection.fallback_used,
        "Research run complete"
    );

    Ok(ResearchReport {
        run_id,
        run_name: config.run_name.clone(),
        source: series.source().to_string(),
        generated_at: Utc::now(),
        search,
        selection,
    })
}

/// Best configuration of one run, for cross-run comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Run label.
    pub run_name: String,
    /// Run identifier.
    pub run_id: Uuid,
    /// Selected configuration.
    pub best: Metrics,
    /// Whether the selection had to fall back to the full set.
    pub fallback_used: bool,
}

/// Rank the best configurations of several runs by Sharpe, descending.
///
/// Stable: runs with equal Sharpe keep their input order.
#[must_use]
pub fn rank_runs(reports: &[ResearchReport]) -> Vec<RunSummary> {
    let mut summaries: Vec<RunSummary> = reports
        .iter()
        .map(|r| RunSummary {
            run_name: r.run_name.clone(),
            run_id: r.run_id,
            best: r.selection.best.clone(),
            fallback_used: r.selection.fallback_used,
        })
        .collect();
    summaries.sort_by(|a, b| b.best.sharpe.total_cmp(&a.best.sharpe));
    summaries
}
