// Date range domain model for historical queries
use chrono::NaiveDate;
use thiserror::Error;

pub const START_OF_DAY_SUFFIX: &str = "-00-00-00";
pub const END_OF_DAY_SUFFIX: &str = "-23-59-59";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq)]
pub enum DateRangeError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Inclusive key bounds for a range scan over reading keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeKeys {
    pub start: String,
    pub end: String,
}

/// Widen a day pair to full-day key bounds.
pub fn build_range_keys(start_date: &str, end_date: &str) -> RangeKeys {
    RangeKeys {
        start: format!("{}{}", start_date, START_OF_DAY_SUFFIX),
        end: format!("{}{}", end_date, END_OF_DAY_SUFFIX),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn parse(start: &str, end: &str) -> Result<Self, DateRangeError> {
        Ok(Self {
            start: parse_day(start)?,
            end: parse_day(end)?,
        })
    }

    pub fn keys(&self) -> RangeKeys {
        build_range_keys(
            &self.start.format(DATE_FORMAT).to_string(),
            &self.end.format(DATE_FORMAT).to_string(),
        )
    }
}

fn parse_day(value: &str) -> Result<NaiveDate, DateRangeError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| DateRangeError::InvalidDate(trimmed.to_string()))
}
