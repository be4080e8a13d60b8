use std::fmt;

use chrono::NaiveDate;

use crate::error::{ReportError, Result};

/// Format of the date picker value.
const INPUT_FORMAT: &str = "%Y-%m-%d";
/// Format of the snapshot file names upstream.
const STAMP_FORMAT: &str = "%m-%d-%Y";

/// `MM-DD-YYYY`, as used in the snapshot file names.
pub fn snapshot_stamp(date: NaiveDate) -> String {
    date.format(STAMP_FORMAT).to_string()
}

/// A selectable report day, inside the published range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReportDate(NaiveDate);

impl ReportDate {
    /// First selectable day.
    pub const FIRST: (i32, u32, u32) = (2020, 2, 1);
    /// Last day the upstream repository published, and the default selection.
    pub const LAST: (i32, u32, u32) = (2023, 3, 9);

    pub fn first() -> Self {
        let (y, m, d) = Self::FIRST;
        ReportDate(NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN))
    }

    pub fn last() -> Self {
        let (y, m, d) = Self::LAST;
        ReportDate(NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MAX))
    }

    /// Parse an ISO `YYYY-MM-DD` selection and check it is inside the range.
    pub fn parse(value: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(value.trim(), INPUT_FORMAT)
            .map_err(|e| ReportError::InvalidDate(format!("'{value}': {e}")))?;
        Self::new(date)
    }

    pub fn new(date: NaiveDate) -> Result<Self> {
        let date = ReportDate(date);
        if date < Self::first() || date > Self::last() {
            return Err(ReportError::InvalidDate(format!(
                "{date} is outside {} ..= {}",
                Self::first(),
                Self::last()
            )));
        }
        Ok(date)
    }

    pub fn stamp(&self) -> String {
        snapshot_stamp(self.0)
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }
}

impl Default for ReportDate {
    fn default() -> Self {
        Self::last()
    }
}

impl fmt::Display for ReportDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(INPUT_FORMAT))
    }
}
