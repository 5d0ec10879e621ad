//! Blocks and weeks.
//!
//! A block is a contiguous group of weeks solved as a single constraint
//! instance. Each week is a half-open 7-day window `[start, start + 7)`
//! that contains every weekday exactly once, which makes weekday-name
//! resolution total and unambiguous regardless of which weekday the
//! block starts on.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A contiguous group of weeks solved as one constraint instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    /// 0-based block index.
    pub index: u32,
    /// First day of the block (inclusive).
    pub start: NaiveDate,
    /// Number of weeks in the block.
    pub weeks: u32,
}

impl Block {
    /// Creates a block.
    pub fn new(index: u32, start: NaiveDate, weeks: u32) -> Self {
        Self {
            index,
            start,
            weeks,
        }
    }

    /// The weeks of this block, in index order.
    pub fn week_windows(&self) -> Vec<Week> {
        (0..self.weeks)
            .map(|i| Week {
                block: self.index,
                index: i,
                start: self.start + Duration::days(i64::from(i) * 7),
            })
            .collect()
    }
}

/// A 7-day window `[start, start + 7)` within a block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Week {
    /// Block this week belongs to.
    pub block: u32,
    /// 0-based index within the block.
    pub index: u32,
    /// First day of the window (inclusive).
    pub start: NaiveDate,
}

impl Week {
    /// First day after the window (exclusive).
    #[inline]
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(7)
    }

    /// Whether a date falls inside the window.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end()
    }

    /// The unique date inside the window with the given weekday.
    pub fn date_of(&self, weekday: Weekday) -> NaiveDate {
        let offset = (weekday.num_days_from_monday() + 7
            - self.start.weekday().num_days_from_monday())
            % 7;
        self.start + Duration::days(i64::from(offset))
    }
}
