//! On-call roles and their weekly shift patterns.
//!
//! A role is a staffed duty (primary, secondary, weekend duty, ...) with
//! one or more weekly repeating shift patterns. Pattern weekday names
//! always refer to the actual calendar weekday inside a week's 7-day
//! window, never to an offset from the window start.

use chrono::{Duration, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// A weekly repeating shift pattern within a role.
///
/// Each listed weekday spawns one shift per week. The shift starts at
/// `start` on that weekday and ends `span_days - 1` days later plus the
/// wrapped time-of-day distance from `start` to `end`. An `end` at or
/// before `start` therefore crosses midnight into the next day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShiftPattern {
    /// Weekdays on which this pattern produces a shift.
    pub days: Vec<Weekday>,
    /// Time of day the shift starts.
    pub start: NaiveTime,
    /// Time of day the shift ends (may be ≤ start for overnight shifts).
    pub end: NaiveTime,
    /// Number of calendar days the shift spans (≥ 1).
    pub span_days: u32,
}

impl ShiftPattern {
    /// Creates a single-day pattern.
    pub fn new(days: Vec<Weekday>, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            days,
            start,
            end,
            span_days: 1,
        }
    }

    /// Sets the number of days the shift spans.
    pub fn with_span_days(mut self, span_days: u32) -> Self {
        self.span_days = span_days;
        self
    }

    /// Duration of one shift produced by this pattern.
    ///
    /// Computed as `(span_days - 1)` whole days plus the time-of-day
    /// distance `(end - start) mod 24h`.
    pub fn duration(&self) -> Duration {
        let mut tail = self.end.signed_duration_since(self.start);
        if tail < Duration::zero() {
            tail = tail + Duration::hours(24);
        }
        Duration::days(i64::from(self.span_days) - 1) + tail
    }

    /// Whether the pattern produces zero-length shifts.
    ///
    /// Only possible when `end == start` and `span_days == 1`; rejected
    /// by validation.
    #[inline]
    pub fn is_zero_length(&self) -> bool {
        self.duration() == Duration::zero()
    }
}

/// An on-call role that must be staffed every week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Short unique identifier (e.g. `D`, `NP`, `NS`).
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    /// Weekly shift patterns (≥ 1 after validation).
    pub entries: Vec<ShiftPattern>,
}

impl Role {
    /// Creates a role without entries.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Adds a shift pattern.
    pub fn with_entry(mut self, entry: ShiftPattern) -> Self {
        self.entries.push(entry);
        self
    }

    /// Number of shifts this role produces per week.
    pub fn shifts_per_week(&self) -> usize {
        self.entries.iter().map(|e| e.days.len()).sum()
    }
}
