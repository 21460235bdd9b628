//! CSV loading for feature and raw price files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use super::features::{PriceBar, build_features};
use super::schema::{ColumnMap, Field, REQUIRED_FIELDS};
use super::{FeatureSeries, PricePoint};
use crate::error::ResearchError;

/// Accepted date layouts, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Errors from loading a series file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error opening the file.
    #[error("Failed to open '{path}': {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// CSV decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row could not be parsed.
    #[error("Malformed row {line}: {message}")]
    Malformed {
        /// 1-based line number (header is line 1).
        line: u64,
        /// What was wrong.
        message: String,
    },

    /// Schema or series invariant violated.
    #[error(transparent)]
    Research(#[from] ResearchError),
}

struct Row {
    point: PricePoint,
    moving_averages: Vec<Option<f64>>,
    volatilities: Vec<Option<f64>>,
}

/// Load a feature CSV (`date`, `close`, `daily_return`, optional `ma_<n>`
/// and `vol_<n>`).
pub fn load_feature_csv(path: impl AsRef<Path>) -> Result<FeatureSeries, LoadError> {
    let path = path.as_ref();
    let mut reader = open(path)?;
    let headers = reader.headers()?.clone();
    let columns = ColumnMap::resolve(headers.iter(), &REQUIRED_FIELDS)?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let line = idx as u64 + 2;

        let date = parse_date(field(&record, columns.date), line)?;
        let close = parse_number(field(&record, columns.close), line, Field::Close.name())?
            .ok_or_else(|| malformed(line, "close is empty"))?;
        let daily_return = match columns.daily_return {
            Some(i) => parse_number(field(&record, i), line, Field::DailyReturn.name())?,
            None => None,
        };
        let moving_averages = columns
            .moving_averages
            .iter()
            .map(|(window, i)| parse_number(field(&record, *i), line, &format!("ma_{window}")))
            .collect::<Result<Vec<_>, _>>()?;
        let volatilities = columns
            .volatilities
            .iter()
            .map(|(window, i)| parse_number(field(&record, *i), line, &format!("vol_{window}")))
            .collect::<Result<Vec<_>, _>>()?;

        rows.push(Row {
            point: PricePoint::new(date, close, daily_return),
            moving_averages,
            volatilities,
        });
    }

    rows.sort_by_key(|r| r.point.date);

    let mut series = FeatureSeries::new(
        path.display().to_string(),
        rows.iter().map(|r| r.point).collect(),
    )?;
    for (col, (window, _)) in columns.moving_averages.iter().enumerate() {
        let values = rows.iter().map(|r| r.moving_averages[col]).collect();
        series = series.with_moving_average(*window, values)?;
    }
    for (col, (window, _)) in columns.volatilities.iter().enumerate() {
        let values = rows.iter().map(|r| r.volatilities[col]).collect();
        series = series.with_volatility(*window, values)?;
    }

    info!(
        path = %path.display(),
        rows = series.len(),
        precomputed = columns.moving_averages.len(),
        volatility_columns = columns.volatilities.len(),
        "Loaded feature series"
    );

    Ok(series)
}

/// Load a raw price CSV (`date`, `close`) and derive features from it.
pub fn load_price_csv(path: impl AsRef<Path>) -> Result<FeatureSeries, LoadError> {
    let path = path.as_ref();
    let mut reader = open(path)?;
    let headers = reader.headers()?.clone();
    let columns = ColumnMap::resolve(headers.iter(), &[Field::Date, Field::Close])?;

    let mut bars = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let line = idx as u64 + 2;
        let date = parse_date(field(&record, columns.date), line)?;
        let close = parse_number(field(&record, columns.close), line, Field::Close.name())?
            .ok_or_else(|| malformed(line, "close is empty"))?;
        bars.push(PriceBar { date, close });
    }

    info!(path = %path.display(), rows = bars.len(), "Loaded raw prices");

    Ok(build_features(path.display().to_string(), bars)?)
}

fn open(path: &Path) -> Result<csv::Reader<BufReader<File>>, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file)))
}

fn field(record: &csv::StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

fn malformed(line: u64, message: impl Into<String>) -> LoadError {
    LoadError::Malformed {
        line,
        message: message.into(),
    }
}

fn parse_date(raw: &str, line: u64) -> Result<NaiveDate, LoadError> {
    // Timestamps such as "2024-01-02 00:00:00" keep only the date part.
    let raw = raw.split([' ', 'T']).next().unwrap_or(raw);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| malformed(line, format!("unparseable date '{raw}'")))
}

/// Empty and `NaN` cells are undefined.
fn parse_number(raw: &str, line: u64, column: &str) -> Result<Option<f64>, LoadError> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(|v| v.is_finite().then_some(v))
        .map_err(|_| malformed(line, format!("{column} is not a number: '{raw}'")))
}
