//! Metrics instrumentation for the research core.
//!
//! Recording goes through the `metrics` facade. Without an installed
//! recorder every call is a no-op.

mod metrics;

pub use self::metrics::{record_evaluation, record_search_stage, record_selection};
