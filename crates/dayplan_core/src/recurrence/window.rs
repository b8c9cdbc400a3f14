//! View window bounds for expansion.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::warn;

use crate::model::item::midnight_utc;

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Inclusive viewing range. `None` on a side means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ViewWindow {
    pub const UNBOUNDED: Self = Self {
        start: None,
        end: None,
    };

    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Builds a window from raw query parameters.
    ///
    /// Missing, blank or unparsable values leave that side unbounded.
    pub fn from_params(start: Option<&str>, end: Option<&str>) -> Self {
        Self {
            start: start.and_then(parse_window_bound),
            end: end.and_then(parse_window_bound),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// True when `instant` lies after the window end.
    pub fn is_past_end(&self, instant: DateTime<Utc>) -> bool {
        self.end.is_some_and(|end| instant > end)
    }

    /// True when `instant` lies before the window start.
    pub fn is_before_start(&self, instant: DateTime<Utc>) -> bool {
        self.start.is_some_and(|start| instant < start)
    }
}

/// Parses one ISO-8601 window bound.
///
/// Accepts RFC 3339 instants, naive `YYYY-MM-DDTHH:MM[:SS]` (read as UTC)
/// and plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_window_bound(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(midnight_utc(date));
    }

    warn!(
        "event=window_parse module=recurrence status=ignored reason=unparsable_bound len={}",
        trimmed.len()
    );
    None
}
