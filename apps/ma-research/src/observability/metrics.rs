//! Metric names and recording helpers.
//!
//! # Example
//!
//! ```ignore
//! use ma_research::observability::record_search_stage;
//!
//! record_search_stage("coarse", 5, 0.012);
//! ```

use metrics::{counter, histogram};

// ============================================================================
// Backtest Engine Metrics
// ============================================================================

/// Record one backtest evaluation.
///
/// # Arguments
///
/// * `elapsed_seconds` - Wall time of the evaluation in seconds
pub fn record_evaluation(elapsed_seconds: f64) {
    counter!("ma_research_evaluations_total").increment(1);
    histogram!("ma_research_evaluation_seconds").record(elapsed_seconds);
}

// ============================================================================
// Parameter Search Metrics
// ============================================================================

/// Record a completed search stage.
///
/// # Arguments
///
/// * `stage` - Stage name ("coarse" or "refine")
/// * `windows` - Number of windows evaluated in the stage
/// * `elapsed_seconds` - Wall time of the stage in seconds
pub fn record_search_stage(stage: &'static str, windows: usize, elapsed_seconds: f64) {
    counter!("ma_research_search_windows_total", "stage" => stage).increment(windows as u64);
    histogram!("ma_research_search_stage_seconds", "stage" => stage).record(elapsed_seconds);
}

// ============================================================================
// Selection Metrics
// ============================================================================

/// Record a selection outcome.
pub fn record_selection(fallback_used: bool) {
    let outcome = if fallback_used { "fallback" } else { "filtered" };
    counter!("ma_research_selections_total", "outcome" => outcome).increment(1);
}
