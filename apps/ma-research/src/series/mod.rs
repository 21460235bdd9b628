//! Feature series: the input contract of the backtest core.
//!
//! A [`FeatureSeries`] is an immutable, date-sorted sequence of
//! [`PricePoint`] rows plus optional precomputed moving-average and
//! volatility columns keyed by window length. The schema is explicit: `date`,
//! `close` and `daily_return` are required, `ma_<window>` and `vol_<window>`
//! columns are optional.
//!
//! Series arrive from the CSV loader ([`load_feature_csv`],
//! [`load_price_csv`]) or are built in memory from raw bars with
//! [`build_features`].

mod features;
mod loader;
mod schema;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ResearchError, Result};

pub use features::{DEFAULT_FEATURE_WINDOW, PriceBar, build_features, rolling_volatility};
pub use loader::{LoadError, load_feature_csv, load_price_csv};
pub use schema::{ColumnMap, Field, REQUIRED_FIELDS, moving_average_column, volatility_column};

/// One row of a feature series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date.
    pub date: NaiveDate,
    /// Close price (positive).
    pub close: f64,
    /// Simple daily return, `None` where undefined (first row).
    pub daily_return: Option<f64>,
}

impl PricePoint {
    /// Create a new price point.
    #[must_use]
    pub const fn new(date: NaiveDate, close: f64, daily_return: Option<f64>) -> Self {
        Self {
            date,
            close,
            daily_return,
        }
    }
}

/// Immutable, date-sorted feature series.
///
/// Deserialization goes through the same checks as [`FeatureSeries::new`]
/// and the column setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFeatureSeries")]
pub struct FeatureSeries {
    source: String,
    points: Vec<PricePoint>,
    moving_averages: BTreeMap<usize, Vec<Option<f64>>>,
    volatilities: BTreeMap<usize, Vec<Option<f64>>>,
}

/// Unchecked wire form of [`FeatureSeries`].
#[derive(Deserialize)]
struct RawFeatureSeries {
    source: String,
    points: Vec<PricePoint>,
    #[serde(default)]
    moving_averages: BTreeMap<usize, Vec<Option<f64>>>,
    #[serde(default)]
    volatilities: BTreeMap<usize, Vec<Option<f64>>>,
}

impl TryFrom<RawFeatureSeries> for FeatureSeries {
    type Error = ResearchError;

    fn try_from(raw: RawFeatureSeries) -> Result<Self> {
        let rows = raw.points.len();
        for (&window, values) in &raw.moving_averages {
            if values.len() != rows {
                return Err(ResearchError::MovingAverageLength {
                    window,
                    expected: rows,
                    actual: values.len(),
                });
            }
        }
        for (&window, values) in &raw.volatilities {
            if values.len() != rows {
                return Err(ResearchError::VolatilityLength {
                    window,
                    expected: rows,
                    actual: values.len(),
                });
            }
        }

        // Columns are aligned with the rows as given; sort them together.
        let mut order: Vec<usize> = (0..rows).collect();
        order.sort_by_key(|&i| raw.points[i].date);
        let reorder = |values: &[Option<f64>]| -> Vec<Option<f64>> {
            order.iter().map(|&i| values[i]).collect()
        };

        let points = order.iter().map(|&i| raw.points[i]).collect();
        let mut series = Self::new(raw.source, points)?;
        for (window, values) in &raw.moving_averages {
            series = series.with_moving_average(*window, reorder(values.as_slice()))?;
        }
        for (window, values) in &raw.volatilities {
            series = series.with_volatility(*window, reorder(values.as_slice()))?;
        }
        Ok(series)
    }
}

impl FeatureSeries {
    /// Create a series from rows in any order.
    ///
    /// Rows are sorted ascending by date. Dates must be unique and closes
    /// positive and finite.
    pub fn new(source: impl Into<String>, mut points: Vec<PricePoint>) -> Result<Self> {
        points.sort_by_key(|p| p.date);
        for point in &mut points {
            point.daily_return = point.daily_return.filter(|r| r.is_finite());
        }

        for pair in points.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(ResearchError::DuplicateDate { date: pair[0].date });
            }
        }

        if let Some(bad) = points
            .iter()
            .find(|p| !p.close.is_finite() || p.close <= 0.0)
        {
            return Err(ResearchError::InvalidPrice {
                date: bad.date,
                close: bad.close,
            });
        }

        Ok(Self {
            source: source.into(),
            points,
            moving_averages: BTreeMap::new(),
            volatilities: BTreeMap::new(),
        })
    }

    /// Attach a precomputed moving-average column for `window`.
    ///
    /// Values must be aligned with the date-sorted rows. Non-finite values
    /// are stored as undefined.
    pub fn with_moving_average(mut self, window: usize, values: Vec<Option<f64>>) -> Result<Self> {
        if window == 0 {
            return Err(ResearchError::InvalidWindow { window });
        }
        if values.len() != self.points.len() {
            return Err(ResearchError::MovingAverageLength {
                window,
                expected: self.points.len(),
                actual: values.len(),
            });
        }

        let values = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        self.moving_averages.insert(window, values);
        Ok(self)
    }

    /// Attach a rolling volatility column (`vol_<window>`), aligned with the
    /// date-sorted rows.
    pub fn with_volatility(mut self, window: usize, values: Vec<Option<f64>>) -> Result<Self> {
        if window == 0 {
            return Err(ResearchError::InvalidWindow { window });
        }
        if values.len() != self.points.len() {
            return Err(ResearchError::VolatilityLength {
                window,
                expected: self.points.len(),
                actual: values.len(),
            });
        }

        let values = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        self.volatilities.insert(window, values);
        Ok(self)
    }

    /// Provenance label (usually the source file path).
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Rows in ascending date order.
    #[must_use]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Close prices in date order.
    #[must_use]
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Precomputed moving average for `window`, if one was attached.
    #[must_use]
    pub fn precomputed_moving_average(&self, window: usize) -> Option<&[Option<f64>]> {
        self.moving_averages.get(&window).map(Vec::as_slice)
    }

    /// Volatility column for `window`, if one was attached.
    #[must_use]
    pub fn volatility(&self, window: usize) -> Option<&[Option<f64>]> {
        self.volatilities.get(&window).map(Vec::as_slice)
    }

    /// Windows with a precomputed moving-average column.
    pub fn precomputed_windows(&self) -> impl Iterator<Item = usize> + '_ {
        self.moving_averages.keys().copied()
    }

    /// Longest window this series can be evaluated at (`len - 2`).
    #[must_use]
    pub fn max_window(&self) -> usize {
        self.points.len().saturating_sub(2)
    }

    /// First and last date, if any.
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.points.first()?.date, self.points.last()?.date))
    }
}
