//! Feature builder: derives the feature series from raw close prices.
//!
//! Produces `daily_return` (percent change of close, undefined on the first
//! row) and attaches the 20-day `ma_20` and `vol_20` columns. The common
//! `ma_20` configuration reuses the precomputed average.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FeatureSeries, PricePoint};
use crate::backtest::math::{rolling_mean, rolling_std};
use crate::error::Result;

/// Window of the moving average and volatility attached by [`build_features`].
pub const DEFAULT_FEATURE_WINDOW: usize = 20;

/// A raw daily bar: date and close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading date.
    pub date: NaiveDate,
    /// Close price.
    pub close: f64,
}

/// Build a feature series from raw bars in any order.
pub fn build_features(source: impl Into<String>, mut bars: Vec<PriceBar>) -> Result<FeatureSeries> {
    bars.sort_by_key(|b| b.date);

    let points: Vec<PricePoint> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let daily_return = i
                .checked_sub(1)
                .map(|prev| bar.close / bars[prev].close - 1.0)
                .filter(|r| r.is_finite());
            PricePoint::new(bar.date, bar.close, daily_return)
        })
        .collect();

    let closes: Vec<f64> = points.iter().map(|p| p.close).collect();
    let ma = rolling_mean(&closes, DEFAULT_FEATURE_WINDOW);

    let series = FeatureSeries::new(source, points)?.with_moving_average(DEFAULT_FEATURE_WINDOW, ma)?;
    let vol = rolling_volatility(&series, DEFAULT_FEATURE_WINDOW);
    let series = series.with_volatility(DEFAULT_FEATURE_WINDOW, vol)?;

    debug!(
        source = series.source(),
        rows = series.len(),
        "Built feature series"
    );

    Ok(series)
}

/// Rolling volatility (sample stdev) of daily returns.
///
/// Undefined until `window` returns are available.
#[must_use]
pub fn rolling_volatility(series: &FeatureSeries, window: usize) -> Vec<Option<f64>> {
    let returns: Vec<Option<f64>> = series.points().iter().map(|p| p.daily_return).collect();
    rolling_std(&returns, window)
}
