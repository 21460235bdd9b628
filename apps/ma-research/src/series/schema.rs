//! Column schema for tabular feature input.

use crate::error::{ResearchError, Result};

/// Required input fields, in canonical order.
pub const REQUIRED_FIELDS: [Field; 3] = [Field::Date, Field::Close, Field::DailyReturn];

/// A required series field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Trading date.
    Date,
    /// Close price.
    Close,
    /// Simple daily return.
    DailyReturn,
}

impl Field {
    /// Canonical column name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Close => "close",
            Self::DailyReturn => "daily_return",
        }
    }

    /// Accepted header spellings (compared case-insensitively).
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Date => &["date"],
            Self::Close => &["close", "adj_close"],
            Self::DailyReturn => &["daily_return", "ret_1d"],
        }
    }

    fn matches(self, header: &str) -> bool {
        let header = header.trim();
        self.aliases().iter().any(|a| a.eq_ignore_ascii_case(header))
    }
}

/// Parse a `ma_<window>` header into its window length.
#[must_use]
pub fn moving_average_column(header: &str) -> Option<usize> {
    windowed_column(header, "ma_")
}

/// Parse a `vol_<window>` header into its window length.
#[must_use]
pub fn volatility_column(header: &str) -> Option<usize> {
    windowed_column(header, "vol_")
}

fn windowed_column(header: &str, prefix: &str) -> Option<usize> {
    let header = header.trim();
    let head = header.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    header[prefix.len()..].parse().ok().filter(|w| *w > 0)
}

/// Header positions resolved against the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    /// Index of the date column.
    pub date: usize,
    /// Index of the close column.
    pub close: usize,
    /// Index of the daily-return column, if present.
    pub daily_return: Option<usize>,
    /// `(window, index)` of each `ma_<window>` column.
    pub moving_averages: Vec<(usize, usize)>,
    /// `(window, index)` of each `vol_<window>` column.
    pub volatilities: Vec<(usize, usize)>,
}

impl ColumnMap {
    /// Resolve headers, requiring every field in `required`.
    ///
    /// All missing fields are reported together.
    pub fn resolve<'a, I>(headers: I, required: &[Field]) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let headers: Vec<&str> = headers.into_iter().collect();
        let find = |field: Field| headers.iter().position(|h| field.matches(h));

        let missing: Vec<&str> = required
            .iter()
            .filter(|f| find(**f).is_none())
            .map(|f| f.name())
            .collect();
        if !missing.is_empty() {
            return Err(ResearchError::missing(missing));
        }

        let (Some(date), Some(close)) = (find(Field::Date), find(Field::Close)) else {
            return Err(ResearchError::missing(
                [Field::Date, Field::Close]
                    .into_iter()
                    .filter(|f| find(*f).is_none())
                    .map(Field::name),
            ));
        };

        let windowed = |parse: fn(&str) -> Option<usize>| -> Vec<(usize, usize)> {
            headers
                .iter()
                .enumerate()
                .filter_map(|(idx, h)| parse(h).map(|w| (w, idx)))
                .collect()
        };

        Ok(Self {
            date,
            close,
            daily_return: find(Field::DailyReturn),
            moving_averages: windowed(moving_average_column),
            volatilities: windowed(volatility_column),
        })
    }
}
