//! Period and category selection over a built view
//!
//! Pure and stateless; consumes a [`PersonalizationView`] after projection.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, Months, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::Transaction;
use crate::projection::PersonalizationView;

/// A calendar month, written `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct Period {
    start: NaiveDate,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|start| Self { start })
            .ok_or_else(|| Error::InvalidField {
                field: "period",
                value: format!("{year:04}-{month:02}"),
                reason: "not a calendar month".to_string(),
            })
    }

    /// The month a date falls in
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            start: date.with_day(1).unwrap_or(date),
        }
    }

    /// The current month in local time
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn month(&self) -> u32 {
        self.start.month()
    }

    /// First day of the month
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the month
    pub fn end(&self) -> NaiveDate {
        self.start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidField {
            field: "period",
            value: s.to_string(),
            reason: "expected YYYY-MM".to_string(),
        };

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

/// Builder for selecting transactions out of a view
#[derive(Debug, Default, Clone)]
pub struct ViewFilter<'query> {
    pub period: Option<Period>,
    pub category: Option<&'query str>,
    pub newest_first: bool,
    pub limit: Option<usize>,
}

impl<'query> ViewFilter<'query> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep transactions dated within this month
    pub fn period(mut self, period: Option<Period>) -> Self {
        self.period = period;
        self
    }

    /// Keep transactions carrying a category with this exact name
    pub fn category(mut self, category: Option<&'query str>) -> Self {
        self.category = category;
        self
    }

    /// Sort by date, newest first (stable for equal dates)
    pub fn newest_first(mut self, newest_first: bool) -> Self {
        self.newest_first = newest_first;
        self
    }

    /// Cap the number of results, applied after sorting
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(period) = &self.period {
            if !period.contains(tx.date) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if !tx.has_category(category) {
                return false;
            }
        }
        true
    }

    pub fn apply<'v>(&self, view: &'v PersonalizationView) -> Vec<&'v Transaction> {
        let mut selected: Vec<&Transaction> = view.iter().filter(|tx| self.matches(tx)).collect();
        if self.newest_first {
            selected.sort_by(|a, b| b.date.cmp(&a.date));
        }
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}
