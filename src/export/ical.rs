//! iCal (RFC 5545) emission.
//!
//! One VEVENT per shift. Timestamps use the TZID local-time form in the
//! configured zone. UIDs are derived from (block, week, role, entry,
//! weekday), so they are stable across runs on identical input.

use std::io::Write;

use chrono::Weekday;
use chrono_tz::Tz;

use crate::error::ScheduleError;
use crate::models::{Roster, Shift};

const LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Writes the roster's shifts as an iCal calendar.
pub fn write_ical<W: Write>(mut writer: W, roster: &Roster, tz: Tz) -> Result<(), ScheduleError> {
    let mut buffer = String::new();
    push_line(&mut buffer, "BEGIN:VCALENDAR");
    push_line(&mut buffer, "VERSION:2.0");
    push_line(&mut buffer, "PRODID:-//oncall-roster//schedule//EN");
    push_line(&mut buffer, "CALSCALE:GREGORIAN");
    for shift in &roster.shifts {
        push_event(&mut buffer, shift, tz);
    }
    push_line(&mut buffer, "END:VCALENDAR");
    writer.write_all(buffer.as_bytes())?;
    Ok(())
}

/// Stable event identifier for a shift.
pub fn event_uid(shift: &Shift) -> String {
    format!(
        "b{}-w{}-{}-e{}-{}@oncall-roster",
        shift.block,
        shift.week,
        shift.role_id,
        shift.entry,
        day_token(shift.weekday)
    )
}

fn push_event(buffer: &mut String, shift: &Shift, tz: Tz) {
    push_line(buffer, "BEGIN:VEVENT");
    push_line(buffer, &format!("UID:{}", event_uid(shift)));
    push_line(
        buffer,
        &format!(
            "DTSTAMP:{}Z",
            shift.start.with_timezone(&chrono_tz::UTC).format(LOCAL_FORMAT)
        ),
    );
    push_line(
        buffer,
        &format!("DTSTART;TZID={tz}:{}", shift.start.format(LOCAL_FORMAT)),
    );
    push_line(
        buffer,
        &format!("DTEND;TZID={tz}:{}", shift.end.format(LOCAL_FORMAT)),
    );
    push_line(
        buffer,
        &format!(
            "SUMMARY:{} — {}",
            escape_text(&shift.role_name),
            escape_text(&shift.engineer)
        ),
    );
    push_line(buffer, "END:VEVENT");
}

/// Appends a content line, folding at 75 octets per RFC 5545 §3.1.
///
/// Continuation lines start with a single space, which counts toward
/// their own 75-octet limit. Folds land on character boundaries, so
/// multi-byte text is never split mid-character.
fn push_line(buffer: &mut String, line: &str) {
    const FOLD_LIMIT: usize = 75;

    let mut remaining = FOLD_LIMIT;
    for c in line.chars() {
        let octets = c.len_utf8();
        if octets > remaining {
            buffer.push_str("\r\n ");
            remaining = FOLD_LIMIT - 1;
        }
        buffer.push(c);
        remaining -= octets;
    }
    buffer.push_str("\r\n");
}

fn day_token(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

/// Escapes TEXT property values per RFC 5545 §3.3.11.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_shift() -> Shift {
        let tz: Tz = chrono_tz::Europe::Berlin;
        Shift {
            engineer: "alice".into(),
            role_id: "NP".into(),
            role_name: "Night primary".into(),
            start: tz.with_ymd_and_hms(2025, 11, 7, 17, 0, 0).unwrap(),
            end: tz.with_ymd_and_hms(2025, 11, 10, 9, 0, 0).unwrap(),
            block: 0,
            week: 0,
            entry: 0,
            weekday: Weekday::Fri,
        }
    }

    fn render(roster: &Roster) -> String {
        let mut buffer = Vec::new();
        write_ical(&mut buffer, roster, chrono_tz::Europe::Berlin).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_event_fields() {
        let mut roster = Roster::new();
        roster.extend_shifts([sample_shift()]);

        let text = render(&roster);
        assert!(text.contains("BEGIN:VCALENDAR\r\n"));
        assert!(text.contains("UID:b0-w0-NP-e0-fri@oncall-roster\r\n"));
        assert!(text.contains("DTSTART;TZID=Europe/Berlin:20251107T170000\r\n"));
        assert!(text.contains("DTEND;TZID=Europe/Berlin:20251110T090000\r\n"));
        assert!(text.contains("SUMMARY:Night primary — alice\r\n"));
        assert!(text.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn test_uid_is_stable_across_runs() {
        let mut roster = Roster::new();
        roster.extend_shifts([sample_shift()]);

        assert_eq!(render(&roster), render(&roster));
        assert_eq!(event_uid(&sample_shift()), "b0-w0-NP-e0-fri@oncall-roster");
    }

    #[test]
    fn test_summary_escaping() {
        let mut shift = sample_shift();
        shift.role_name = "Night; primary, backup".into();
        let mut roster = Roster::new();
        roster.extend_shifts([shift]);

        let text = render(&roster);
        assert!(text.contains("SUMMARY:Night\\; primary\\, backup — alice\r\n"));
    }

    #[test]
    fn test_long_summary_is_folded_at_75_octets() {
        let mut shift = sample_shift();
        shift.engineer = "a".repeat(100);
        let mut roster = Roster::new();
        roster.extend_shifts([shift]);

        let text = render(&roster);
        for line in text.split("\r\n") {
            assert!(line.len() <= 75, "unfolded line: {line}");
        }
        // Unfolding (dropping CRLF + space) restores the full property
        let unfolded = text.replace("\r\n ", "");
        assert!(unfolded.contains(&format!("SUMMARY:Night primary — {}", "a".repeat(100))));
    }

    #[test]
    fn test_short_lines_are_not_folded() {
        let mut roster = Roster::new();
        roster.extend_shifts([sample_shift()]);

        assert!(!render(&roster).contains("\r\n "));
    }

    #[test]
    fn test_csv_and_ical_describe_the_same_shifts() {
        use std::collections::BTreeSet;

        let tz: Tz = chrono_tz::Europe::Berlin;
        let mut roster = Roster::new();
        roster.extend_shifts([
            sample_shift(),
            Shift {
                engineer: "bob".into(),
                role_id: "D".into(),
                role_name: "Day duty".into(),
                start: tz.with_ymd_and_hms(2025, 11, 10, 9, 0, 0).unwrap(),
                end: tz.with_ymd_and_hms(2025, 11, 10, 17, 0, 0).unwrap(),
                block: 0,
                week: 1,
                entry: 0,
                weekday: Weekday::Mon,
            },
        ]);

        // Shift set from the CSV rows
        let mut csv_buffer = Vec::new();
        super::super::write_csv(&mut csv_buffer, &roster, 2).unwrap();
        let csv_text = String::from_utf8(csv_buffer).unwrap();
        let from_csv: BTreeSet<(String, String, String, String)> = csv_text
            .lines()
            .skip(1)
            .map(|line| {
                let fields: Vec<&str> = line.split(',').collect();
                (
                    fields[1].to_string(),
                    fields[2].to_string(),
                    fields[3].replace([' ', '-', ':'], ""),
                    fields[4].replace([' ', '-', ':'], ""),
                )
            })
            .collect();

        // Shift set from the iCal events; SUMMARY is the last field of
        // each VEVENT, so it closes the tuple.
        fn minutes(value: &str) -> String {
            value[..value.len() - 2].replace('T', "")
        }
        let ical_text = render(&roster);
        let mut from_ical = BTreeSet::new();
        let mut start = String::new();
        let mut end = String::new();
        for line in ical_text.lines() {
            if let Some(value) = line.strip_prefix("DTSTART;TZID=Europe/Berlin:") {
                start = minutes(value);
            } else if let Some(value) = line.strip_prefix("DTEND;TZID=Europe/Berlin:") {
                end = minutes(value);
            } else if let Some(value) = line.strip_prefix("SUMMARY:") {
                let (role, engineer) = value.split_once(" — ").unwrap();
                from_ical.insert((
                    role.to_string(),
                    engineer.to_string(),
                    start.clone(),
                    end.clone(),
                ));
            }
        }

        assert_eq!(from_csv, from_ical);
    }
}
