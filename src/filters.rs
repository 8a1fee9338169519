//! Formatting functions exposed to the view layer
//!
//! Each filter is a pure function over domain values. The [`Filters`]
//! registry makes them available by name over JSON values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised when applying a filter by name
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Filter {filter} cannot format value: {value}")]
    InvalidInput { filter: &'static str, value: String },
}

/// Maps a problem state to its label class
pub fn problem_label(state: &str) -> &'static str {
    match state {
        "NEW" => "label-danger",
        "FIXED" => "label-success",
        "WONTFIX" => "label-default",
        "PROCESSED" => "label-info",
        _ => "label-warning",
    }
}

/// Describes how long ago `value` was, relative to `base`
pub fn fancydate(value: NaiveDate, base: NaiveDate) -> String {
    let days = (base - value).num_days();

    match days {
        d if d < 0 => "In the future".to_string(),
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d if d < 7 => format!("{} days ago", d),
        d if d < 14 => "Last week".to_string(),
        d if d < 30 => format!("{} weeks ago", d / 7),
        d if d < 60 => "Last month".to_string(),
        d if d < 365 => format!("{} months ago", d / 30),
        d if d < 730 => "Last year".to_string(),
        d => format!("{} years ago", d / 365),
    }
}

/// Seconds since the Unix epoch
pub fn timestamp(value: DateTime<Utc>) -> i64 {
    value.timestamp()
}

type FilterFn = fn(&Value) -> Result<Value, FilterError>;

/// Named filter table handed to the view layer
#[derive(Clone)]
pub struct Filters {
    table: HashMap<&'static str, FilterFn>,
}

impl Default for Filters {
    fn default() -> Self {
        let mut filters = Self {
            table: HashMap::new(),
        };
        filters.register("problem_label", problem_label_value);
        filters.register("fancydate", fancydate_value);
        filters.register("timestamp", timestamp_value);
        filters
    }
}

impl Filters {
    pub fn register(&mut self, name: &'static str, filter: FilterFn) {
        self.table.insert(name, filter);
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.table.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn apply(&self, name: &str, value: &Value) -> Result<Value, FilterError> {
        let filter = self
            .table
            .get(name)
            .ok_or_else(|| FilterError::UnknownFilter(name.to_string()))?;
        filter(value)
    }
}

fn invalid(filter: &'static str, value: &Value) -> FilterError {
    FilterError::InvalidInput {
        filter,
        value: value.to_string(),
    }
}

fn problem_label_value(value: &Value) -> Result<Value, FilterError> {
    let state = value.as_str().ok_or_else(|| invalid("problem_label", value))?;
    Ok(Value::from(problem_label(state)))
}

fn fancydate_value(value: &Value) -> Result<Value, FilterError> {
    let date = value
        .as_str()
        .and_then(parse_date)
        .ok_or_else(|| invalid("fancydate", value))?;
    Ok(Value::from(fancydate(date, Utc::now().date_naive())))
}

fn timestamp_value(value: &Value) -> Result<Value, FilterError> {
    let datetime = value
        .as_str()
        .and_then(parse_datetime)
        .ok_or_else(|| invalid("timestamp", value))?;
    Ok(Value::from(timestamp(datetime)))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(raw).map(|dt| dt.date_naive()))
}

// Naive values are taken as UTC
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
