use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A calendar month, the unit every cache slot, request path and realtime
/// filter is keyed by.
///
/// Ordering is chronological. `Display` renders the canonical `"YYYY-MM"` form
/// used in backend keys, so nothing else in the crate formats month strings.
/// Every key is a month chrono can represent; deserialization goes through
/// [`MonthKey::new`] as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawMonthKey", into = "RawMonthKey")]
pub struct MonthKey {
    first: NaiveDate,
}

/// Wire shape of a month key: `{"year": 2025, "month": 11}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawMonthKey {
    year: i32,
    month: u32,
}

impl TryFrom<RawMonthKey> for MonthKey {
    type Error = CoreError;

    fn try_from(raw: RawMonthKey) -> Result<Self, Self::Error> {
        Self::new(raw.year, raw.month)
    }
}

impl From<MonthKey> for RawMonthKey {
    fn from(key: MonthKey) -> Self {
        Self {
            year: key.year(),
            month: key.month(),
        }
    }
}

impl MonthKey {
    /// Create a month key. `month` is 1-based (January = 1).
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::Validation(format!(
                "Invalid month {month}: must be between 1 and 12"
            )));
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            CoreError::Validation(format!("Invalid year {year}: outside the supported date range"))
        })?;
        Ok(Self { first })
    }

    /// The month a date belongs to.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    /// Parse the canonical `"YYYY-MM"` form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| CoreError::Validation(format!("Invalid month key '{s}': expected YYYY-MM")))?;
        let year: i32 = year
            .parse()
            .map_err(|_| CoreError::Validation(format!("Invalid year in month key '{s}'")))?;
        let month: u32 = month
            .parse()
            .map_err(|_| CoreError::Validation(format!("Invalid month in month key '{s}'")))?;
        Self::new(year, month)
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.first.year()
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// The following month, wrapping December into January of the next year.
    /// Saturates at the last month chrono can represent.
    #[must_use]
    pub fn next(&self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map_or(*self, |first| Self { first })
    }

    /// The preceding month, wrapping January into December of the previous
    /// year. Saturates at the first month chrono can represent.
    #[must_use]
    pub fn previous(&self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map_or(*self, |first| Self { first })
    }

    /// First calendar day of the month.
    #[must_use]
    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// Last calendar day of the month (handles leap years).
    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        self.first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Whether `date` falls inside this month.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl std::str::FromStr for MonthKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
