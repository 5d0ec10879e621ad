//! Availability resolution: unavailability records → forbidden pairs.
//!
//! Loads the availability CSV (`engineer,start_date,end_date`, ISO
//! dates, inclusive endpoints) and intersects each record with each
//! week's half-open 7-day window. Any nonzero overlap forbids the whole
//! week for that engineer. Records naming engineers outside the team
//! are skipped with a warning; they never fail a run.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::warn;

use crate::error::ScheduleError;
use crate::models::{Unavailability, Week};

/// An `(engineer-index, week-index)` pair excluded from assignment,
/// scoped to one block.
pub type ForbiddenPair = (usize, usize);

/// Loads unavailability records from a CSV file.
pub fn load_unavailability(path: &Path) -> Result<Vec<Unavailability>, ScheduleError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Forbidden pairs for one block's weeks.
///
/// Engineer indices refer to positions in `team`; week indices to
/// positions in `weeks`.
pub fn forbidden_pairs(
    records: &[Unavailability],
    team: &[String],
    weeks: &[Week],
) -> BTreeSet<ForbiddenPair> {
    let mut pairs = BTreeSet::new();
    for record in records {
        let Some(engineer) = team.iter().position(|name| *name == record.engineer) else {
            warn!(
                engineer = %record.engineer,
                "unavailability record names an unknown engineer; skipping"
            );
            continue;
        };
        for (week_index, week) in weeks.iter().enumerate() {
            if record.overlaps_week(week) {
                pairs.insert((engineer, week_index));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::Block;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn team() -> Vec<String> {
        ["alice", "bob", "carol"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_single_day_forbids_whole_week() {
        let weeks = Block::new(0, d(2025, 11, 3), 2).week_windows();
        let records = vec![Unavailability::new(
            "bob",
            d(2025, 11, 12),
            d(2025, 11, 12),
        )];

        let pairs = forbidden_pairs(&records, &team(), &weeks);
        assert_eq!(pairs, BTreeSet::from([(1, 1)]));
    }

    #[test]
    fn test_range_spanning_both_weeks() {
        let weeks = Block::new(0, d(2025, 11, 3), 2).week_windows();
        let records = vec![Unavailability::new(
            "alice",
            d(2025, 11, 8),
            d(2025, 11, 11),
        )];

        let pairs = forbidden_pairs(&records, &team(), &weeks);
        assert_eq!(pairs, BTreeSet::from([(0, 0), (0, 1)]));
    }

    #[test]
    fn test_unknown_engineer_is_skipped() {
        let weeks = Block::new(0, d(2025, 11, 3), 1).week_windows();
        let records = vec![Unavailability::new(
            "mallory",
            d(2025, 11, 3),
            d(2025, 11, 3),
        )];

        let pairs = forbidden_pairs(&records, &team(), &weeks);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_range_outside_block() {
        let weeks = Block::new(0, d(2025, 11, 3), 2).week_windows();
        let records = vec![Unavailability::new(
            "carol",
            d(2025, 12, 1),
            d(2025, 12, 5),
        )];

        let pairs = forbidden_pairs(&records, &team(), &weeks);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_load_unavailability_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(file, "engineer,start_date,end_date").unwrap();
        writeln!(file, "alice,2025-11-05,2025-11-07").unwrap();
        writeln!(file, "bob,2025-12-24,2026-01-02").unwrap();

        let records = load_unavailability(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].engineer, "alice");
        assert_eq!(records[0].start, d(2025, 11, 5));
        assert_eq!(records[1].end, d(2026, 1, 2));
    }
}
