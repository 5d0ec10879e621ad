//! Schedule exporters.
//!
//! Emits the solved roster as a flat CSV and as an RFC 5545 calendar.
//! Both walk the roster in its stored emission order, so output row and
//! event order is deterministic, and both describe the same shift set.

mod csv;
mod ical;

pub use self::csv::write_csv;
pub use self::ical::write_ical;

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::config::{ExportFormat, Plan};
use crate::error::ScheduleError;
use crate::models::Roster;

/// Writes all configured export formats into `dir`.
///
/// Returns the paths written, in export-configuration order.
pub fn write_outputs(
    roster: &Roster,
    plan: &Plan,
    dir: &Path,
) -> Result<Vec<PathBuf>, ScheduleError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for format in &plan.exports {
        let path = match format {
            ExportFormat::Csv => {
                let path = dir.join(&plan.schedule_csv);
                write_csv(File::create(&path)?, roster, plan.weeks_per_block)?;
                path
            }
            ExportFormat::Ical => {
                let path = dir.join(&plan.schedule_ical);
                write_ical(File::create(&path)?, roster, plan.timezone)?;
                path
            }
        };
        written.push(path);
    }
    Ok(written)
}
