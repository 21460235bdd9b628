//! Drawdown-constrained selection of the best window.
//!
//! Candidates whose max drawdown is at or above the floor survive and are
//! ranked by Sharpe ratio, descending. When nothing survives, the default
//! [`SelectionPolicy::FallbackToAll`] ranks the whole set instead and flags
//! the result; [`SelectionPolicy::Strict`] reports
//! [`ResearchError::NoSafeCandidate`].

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::backtest::Metrics;
use crate::error::{ResearchError, Result};
use crate::observability::record_selection;

/// Reference drawdown floor (-30%).
pub const DEFAULT_DRAWDOWN_FLOOR: f64 = -0.30;

/// What to do when every candidate breaches the drawdown floor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Rank the entire set and flag the fallback.
    #[default]
    FallbackToAll,
    /// Fail with `NoSafeCandidate`.
    Strict,
}

/// Outcome of a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Top-ranked record.
    pub best: Metrics,
    /// Survivors (or the whole set on fallback) by Sharpe, descending.
    pub ranked: Vec<Metrics>,
    /// True when no candidate met the floor and the whole set was ranked.
    pub fallback_used: bool,
    /// Floor that was applied.
    pub drawdown_floor: f64,
}

/// Select with the default fallback policy.
pub fn select(results: &[Metrics], drawdown_floor: f64) -> Result<Selection> {
    select_with_policy(results, drawdown_floor, SelectionPolicy::default())
}

/// Select the best record under `policy`.
///
/// Ranking is stable: equal Sharpe ratios keep their input order.
pub fn select_with_policy(
    results: &[Metrics],
    drawdown_floor: f64,
    policy: SelectionPolicy,
) -> Result<Selection> {
    if !drawdown_floor.is_finite() || drawdown_floor > 0.0 {
        return Err(ResearchError::InvalidDrawdownFloor(drawdown_floor));
    }
    if results.is_empty() {
        return Err(ResearchError::NoCandidates);
    }

    let survivors: Vec<Metrics> = results
        .iter()
        .filter(|m| m.within_drawdown(drawdown_floor))
        .cloned()
        .collect();

    let fallback_used = survivors.is_empty();
    let mut ranked = if fallback_used {
        match policy {
            SelectionPolicy::Strict => {
                return Err(ResearchError::NoSafeCandidate {
                    drawdown_floor,
                    evaluated: results.len(),
                });
            }
            SelectionPolicy::FallbackToAll => {
                warn!(
                    drawdown_floor,
                    candidates = results.len(),
                    "No candidate within drawdown floor, ranking all"
                );
                results.to_vec()
            }
        }
    } else {
        survivors
    };

    rank_by_sharpe(&mut ranked);
    let Some(best) = ranked.first().cloned() else {
        return Err(ResearchError::NoCandidates);
    };

    info!(
        window = best.window,
        sharpe = best.sharpe,
        max_drawdown = best.max_drawdown,
        survivors = if fallback_used { 0 } else { ranked.len() },
        fallback_used,
        "Selected window"
    );
    record_selection(fallback_used);

    Ok(Selection {
        best,
        ranked,
        fallback_used,
        drawdown_floor,
    })
}

/// Stable sort by Sharpe, descending.
pub fn rank_by_sharpe(metrics: &mut [Metrics]) {
    metrics.sort_by(|a, b| b.sharpe.total_cmp(&a.sharpe));
}
