//! Schedule CSV emission.
//!
//! One row per shift: `Week,Role,Engineer,Start DateTime,End DateTime`.
//! `Week` is the 1-based global week number across all blocks;
//! timestamps are `YYYY-MM-DD HH:MM` in the configured zone.

use std::io::Write;

use crate::error::ScheduleError;
use crate::models::Roster;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Writes the roster's shifts as CSV.
pub fn write_csv<W: Write>(
    writer: W,
    roster: &Roster,
    weeks_per_block: u32,
) -> Result<(), ScheduleError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["Week", "Role", "Engineer", "Start DateTime", "End DateTime"])?;
    for shift in &roster.shifts {
        let week = shift.block * weeks_per_block + shift.week + 1;
        out.write_record([
            week.to_string(),
            shift.role_name.clone(),
            shift.engineer.clone(),
            shift.start.format(TIMESTAMP_FORMAT).to_string(),
            shift.end.format(TIMESTAMP_FORMAT).to_string(),
        ])?;
    }
    out.flush()?;
    Ok(())
}
