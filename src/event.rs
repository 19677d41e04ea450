// src/event.rs
//
// One awarded badge instance, plus the reason text the listing shows next to it.
// Identity is (category_id, subject_id, timestamp); reason is metadata only.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Award times as the listing prints them (`title` attribute of the award span).
pub const UTC_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%SZ";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Event {
    /// Badge id; constant within one ledger.
    pub category_id: u64,
    /// User the badge was awarded to.
    pub subject_id: u64,
    /// Seconds since the unix epoch, UTC.
    pub timestamp: i64,
}

impl Event {
    pub fn new(category_id: u64, subject_id: u64, timestamp: i64) -> Self {
        Self { category_id, subject_id, timestamp }
    }

    /// Key for chronological views: time first, subject breaks ties.
    #[inline]
    pub fn chrono_key(&self) -> (i64, u64) {
        (self.timestamp, self.subject_id)
    }

    pub fn utc_time(&self) -> String {
        format_utc_time(self.timestamp)
    }
}

/// An event as it came off a listing page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Award {
    pub event: Event,
    pub reason: Option<String>,
}

impl Award {
    pub fn new(event: Event, reason: Option<String>) -> Self {
        Self { event, reason }
    }
}

pub fn parse_utc_time(s: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(s.trim(), UTC_TIME_FORMAT)
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

pub fn format_utc_time(ts: i64) -> String {
    match DateTime::from_timestamp(ts, 0) {
        Some(dt) => dt.format(UTC_TIME_FORMAT).to_string(),
        None => ts.to_string(),
    }
}

/// Ledger `utc_time` cell: integer seconds, or the listing's text format.
/// Seconds outside the calendar range `chrono` can represent are rejected.
pub fn parse_time_cell(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    match cell.parse::<i64>() {
        Ok(ts) => DateTime::from_timestamp(ts, 0).map(|_| ts),
        Err(_) => parse_utc_time(cell),
    }
}
