//! Calendar mapping: week × role → concrete shift intervals.
//!
//! Resolves each pattern weekday to the unique date inside the week's
//! 7-day window carrying that weekday, then anchors start and end
//! timestamps in the configured zone. Overnight patterns (end at or
//! before start) wrap into the next day; `span_days` extends further.
//!
//! A local start or end that does not exist in the zone (spring-forward
//! gap) is a configuration-class error; an ambiguous local time
//! (fall-back hour) resolves to the earlier instant.

use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::error::ScheduleError;
use crate::models::{Role, Shift, Week};

/// Concrete shifts of one role in one week, in (entry, listed-weekday)
/// order, staffed by the given engineer.
pub fn shifts_for(
    week: &Week,
    role: &Role,
    engineer: &str,
    tz: Tz,
) -> Result<Vec<Shift>, ScheduleError> {
    let mut shifts = Vec::with_capacity(role.shifts_per_week());
    for (entry_index, entry) in role.entries.iter().enumerate() {
        for &weekday in &entry.days {
            let date = week.date_of(weekday);
            let start_naive = date.and_time(entry.start);
            let end_naive = start_naive + entry.duration();
            shifts.push(Shift {
                engineer: engineer.to_string(),
                role_id: role.id.clone(),
                role_name: role.name.clone(),
                start: localize(start_naive, tz)?,
                end: localize(end_naive, tz)?,
                block: week.block,
                week: week.index,
                entry: entry_index as u32,
                weekday,
            });
        }
    }
    Ok(shifts)
}

fn localize(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Tz>, ScheduleError> {
    tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
        ScheduleError::Config(format!("local time {naive} does not exist in zone {tz}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Weekday};

    use crate::models::ShiftPattern;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn week_starting(date: NaiveDate) -> Week {
        Week {
            block: 0,
            index: 0,
            start: date,
        }
    }

    fn local(tz: Tz, y: i32, mo: u32, day: u32, h: u32, mi: u32) -> DateTime<Tz> {
        tz.with_ymd_and_hms(y, mo, day, h, mi, 0).unwrap()
    }

    #[test]
    fn test_day_shift() {
        let tz = chrono_tz::Europe::Berlin;
        let role = Role::new("D", "Day duty").with_entry(ShiftPattern::new(
            vec![Weekday::Mon],
            t(9, 0),
            t(17, 0),
        ));
        let week = week_starting(d(2025, 11, 3));

        let shifts = shifts_for(&week, &role, "alice", tz).unwrap();
        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].start, local(tz, 2025, 11, 3, 9, 0));
        assert_eq!(shifts[0].end, local(tz, 2025, 11, 3, 17, 0));
        assert_eq!(shifts[0].engineer, "alice");
    }

    #[test]
    fn test_overnight_shift_crosses_midnight() {
        let tz = chrono_tz::Europe::Berlin;
        let role = Role::new("N", "Night duty").with_entry(ShiftPattern::new(
            vec![Weekday::Mon],
            t(17, 0),
            t(9, 0),
        ));
        let week = week_starting(d(2025, 11, 3));

        let shifts = shifts_for(&week, &role, "bob", tz).unwrap();
        assert_eq!(shifts[0].start, local(tz, 2025, 11, 3, 17, 0));
        assert_eq!(shifts[0].end, local(tz, 2025, 11, 4, 9, 0));
    }

    #[test]
    fn test_weekend_span() {
        let tz = chrono_tz::Europe::Berlin;
        let role = Role::new("NP", "Night primary").with_entry(
            ShiftPattern::new(vec![Weekday::Fri], t(17, 0), t(9, 0)).with_span_days(3),
        );
        let week = week_starting(d(2025, 11, 3));

        let shifts = shifts_for(&week, &role, "carol", tz).unwrap();
        assert_eq!(shifts[0].start, local(tz, 2025, 11, 7, 17, 0));
        assert_eq!(shifts[0].end, local(tz, 2025, 11, 10, 9, 0));
    }

    #[test]
    fn test_weekday_resolves_within_window_not_by_offset() {
        let tz = chrono_tz::UTC;
        let role = Role::new("D", "Day duty").with_entry(ShiftPattern::new(
            vec![Weekday::Mon],
            t(9, 0),
            t(17, 0),
        ));
        // Window starts Wednesday 2025-11-05; its Monday is 2025-11-10.
        let week = week_starting(d(2025, 11, 5));

        let shifts = shifts_for(&week, &role, "alice", tz).unwrap();
        assert_eq!(shifts[0].start, local(tz, 2025, 11, 10, 9, 0));
    }

    #[test]
    fn test_entry_and_weekday_emission_order() {
        let tz = chrono_tz::UTC;
        let role = Role::new("D", "Day duty")
            .with_entry(ShiftPattern::new(
                vec![Weekday::Wed, Weekday::Mon],
                t(9, 0),
                t(17, 0),
            ))
            .with_entry(ShiftPattern::new(vec![Weekday::Fri], t(9, 0), t(17, 0)));
        let week = week_starting(d(2025, 11, 3));

        let shifts = shifts_for(&week, &role, "alice", tz).unwrap();
        let order: Vec<(u32, Weekday)> = shifts.iter().map(|s| (s.entry, s.weekday)).collect();
        assert_eq!(
            order,
            vec![
                (0, Weekday::Wed),
                (0, Weekday::Mon),
                (1, Weekday::Fri),
            ]
        );
    }

    #[test]
    fn test_spring_forward_gap_is_rejected() {
        // Berlin skips 02:00–03:00 on 2025-03-30.
        let tz = chrono_tz::Europe::Berlin;
        let role = Role::new("X", "Gap duty").with_entry(ShiftPattern::new(
            vec![Weekday::Sun],
            t(2, 30),
            t(4, 0),
        ));
        let week = week_starting(d(2025, 3, 24));

        let err = shifts_for(&week, &role, "alice", tz).unwrap_err();
        assert!(matches!(err, ScheduleError::Config(_)));
    }
}
