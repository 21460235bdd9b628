//! Error taxonomy for the backtest and parameter-search core.
//!
//! Every fatal condition propagates unchanged to the immediate caller. The
//! selection fallback (see [`crate::selection`]) is the only degradation path
//! and never surfaces as an error.
//!
//! | Code | Raised by | Scope |
//! |------|-----------|-------|
//! | `MISSING_DATA` | series schema check | whole evaluation |
//! | `INSUFFICIENT_HISTORY` | engine | one window (aborts a search) |
//! | `INVALID_SEARCH_SPACE` | search | before any evaluation |
//! | `NO_SAFE_CANDIDATE` | strict selection | selection only |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable error codes, suitable for logs and machine-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A required series field is absent.
    MissingData,
    /// Not enough rows for the requested window.
    InsufficientHistory,
    /// Empty or malformed search grid or refinement settings.
    InvalidSearchSpace,
    /// Window length of zero.
    InvalidWindow,
    /// Series rows are not unique by date.
    DuplicateDate,
    /// Precomputed moving-average column does not match the series length.
    MovingAverageLength,
    /// Volatility feature column does not match the series length.
    VolatilityLength,
    /// Non-positive or non-finite close price.
    InvalidPrice,
    /// Drawdown floor is positive or not finite.
    InvalidDrawdownFloor,
    /// Nothing to select from.
    NoCandidates,
    /// Strict selection found no candidate within the drawdown floor.
    NoSafeCandidate,
}

impl ErrorCode {
    /// Get the reason string for this code.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MissingData => "MISSING_DATA",
            Self::InsufficientHistory => "INSUFFICIENT_HISTORY",
            Self::InvalidSearchSpace => "INVALID_SEARCH_SPACE",
            Self::InvalidWindow => "INVALID_WINDOW",
            Self::DuplicateDate => "DUPLICATE_DATE",
            Self::MovingAverageLength => "MOVING_AVERAGE_LENGTH",
            Self::VolatilityLength => "VOLATILITY_LENGTH",
            Self::InvalidPrice => "INVALID_PRICE",
            Self::InvalidDrawdownFloor => "INVALID_DRAWDOWN_FLOOR",
            Self::NoCandidates => "NO_CANDIDATES",
            Self::NoSafeCandidate => "NO_SAFE_CANDIDATE",
        }
    }
}

/// Errors from evaluating, searching, and selecting window configurations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResearchError {
    /// Required input field(s) absent.
    #[error("Missing required field(s): {}", fields.join(", "))]
    MissingData {
        /// Names of every missing field.
        fields: Vec<String>,
    },

    /// Fewer rows than `window + 2`.
    #[error("Insufficient history for window {window}: need {required} rows, have {available}")]
    InsufficientHistory {
        /// Requested window.
        window: usize,
        /// Rows required.
        required: usize,
        /// Rows available.
        available: usize,
    },

    /// Empty or malformed search space.
    #[error("Invalid search space: {0}")]
    InvalidSearchSpace(String),

    /// Window must be positive.
    #[error("Invalid window {window}: must be a positive integer")]
    InvalidWindow {
        /// Offending window.
        window: usize,
    },

    /// Two rows share a date.
    #[error("Duplicate date in series: {date}")]
    DuplicateDate {
        /// Repeated date.
        date: NaiveDate,
    },

    /// Precomputed moving-average column has the wrong length.
    #[error("Moving average ma_{window} has {actual} values, series has {expected} rows")]
    MovingAverageLength {
        /// Window of the column.
        window: usize,
        /// Series length.
        expected: usize,
        /// Column length.
        actual: usize,
    },

    /// Volatility feature column has the wrong length.
    #[error("Volatility vol_{window} has {actual} values, series has {expected} rows")]
    VolatilityLength {
        /// Window of the column.
        window: usize,
        /// Series length.
        expected: usize,
        /// Column length.
        actual: usize,
    },

    /// Close prices must be positive and finite.
    #[error("Invalid close price {close} on {date}")]
    InvalidPrice {
        /// Row date.
        date: NaiveDate,
        /// Offending close.
        close: f64,
    },

    /// Drawdown floor must be finite and non-positive.
    #[error("Invalid drawdown floor {0}: must be a finite value <= 0")]
    InvalidDrawdownFloor(f64),

    /// Selection was handed an empty result set.
    #[error("No candidates to select from")]
    NoCandidates,

    /// Strict policy: every candidate breached the drawdown floor.
    #[error("No candidate within drawdown floor {drawdown_floor} ({evaluated} evaluated)")]
    NoSafeCandidate {
        /// Floor that was applied.
        drawdown_floor: f64,
        /// Number of candidates considered.
        evaluated: usize,
    },
}

impl ResearchError {
    /// Build a [`ResearchError::MissingData`] from field names.
    pub fn missing<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingData {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Get the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MissingData { .. } => ErrorCode::MissingData,
            Self::InsufficientHistory { .. } => ErrorCode::InsufficientHistory,
            Self::InvalidSearchSpace(_) => ErrorCode::InvalidSearchSpace,
            Self::InvalidWindow { .. } => ErrorCode::InvalidWindow,
            Self::DuplicateDate { .. } => ErrorCode::DuplicateDate,
            Self::MovingAverageLength { .. } => ErrorCode::MovingAverageLength,
            Self::VolatilityLength { .. } => ErrorCode::VolatilityLength,
            Self::InvalidPrice { .. } => ErrorCode::InvalidPrice,
            Self::InvalidDrawdownFloor(_) => ErrorCode::InvalidDrawdownFloor,
            Self::NoCandidates => ErrorCode::NoCandidates,
            Self::NoSafeCandidate { .. } => ErrorCode::NoSafeCandidate,
        }
    }
}

/// Result alias for the research core.
pub type Result<T> = std::result::Result<T, ResearchError>;
