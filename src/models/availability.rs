//! Engineer unavailability records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Week;

/// A date range during which an engineer cannot be scheduled.
///
/// Endpoints are inclusive dates, matching the availability CSV contract
/// (`engineer,start_date,end_date`). Week windows are half-open, so a
/// record whose last day is the day before a week starts does not touch
/// that week, while a record ending on the week's first day does.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Unavailability {
    /// Engineer name as it appears in the team list.
    pub engineer: String,
    /// First unavailable day (inclusive).
    #[serde(rename = "start_date")]
    pub start: NaiveDate,
    /// Last unavailable day (inclusive).
    #[serde(rename = "end_date")]
    pub end: NaiveDate,
}

impl Unavailability {
    /// Creates a record.
    pub fn new(engineer: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            engineer: engineer.into(),
            start,
            end,
        }
    }

    /// Whether the record overlaps a week's 7-day window.
    ///
    /// Any nonzero overlap, even a single day, counts.
    pub fn overlaps_week(&self, week: &Week) -> bool {
        self.start < week.end() && self.end >= week.start
    }
}
