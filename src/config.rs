//! YAML configuration and the compiled plan.
//!
//! Raw configuration mirrors the YAML contract and keeps weekday tokens,
//! times, and dates as strings so validation can report unknown tokens as
//! structured problems instead of serde noise. [`Config::compile`] turns a
//! raw configuration into the typed, immutable [`Plan`] the rest of the
//! system consumes.
//!
//! Role mapping order from the YAML is preserved: emission order of the
//! generated roster follows the order roles appear in the configuration.

use chrono::{NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ScheduleError;
use crate::models::{Block, Role, ShiftPattern};

/// Root of the YAML configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Engineer names; must be non-empty and unique.
    pub team: Vec<String>,
    /// Horizon and zone settings.
    pub schedule: ScheduleSection,
    /// Roles keyed by identifier, in YAML order.
    #[serde(deserialize_with = "ordered_role_map")]
    pub roles: Vec<(String, RoleSection)>,
    /// Numeric constraint parameters.
    pub constraints: ConstraintsSection,
    /// Rule toggles; missing section enables the defaults.
    #[serde(default)]
    pub rules: Rules,
    /// Solver settings.
    pub solver: SolverSection,
    /// Input/output paths and export formats.
    #[serde(default)]
    pub files: FilesSection,
}

/// `schedule:` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleSection {
    /// ISO-8601 date the first block starts on.
    pub start_date: String,
    /// Number of blocks to solve.
    pub num_blocks: u32,
    /// Weeks per block.
    pub weeks_per_block: u32,
    /// IANA zone name (e.g. `Europe/Berlin`).
    pub timezone: String,
}

/// One role under `roles:`.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleSection {
    /// Display name.
    pub name: String,
    /// Weekly shift patterns.
    pub schedule: Vec<EntrySection>,
}

/// One schedule entry of a role.
#[derive(Debug, Clone, Deserialize)]
pub struct EntrySection {
    /// Weekday tokens (`Mon` … `Sun`, full names accepted).
    pub days: Vec<String>,
    /// `HH:MM` start time of day.
    pub start_time: String,
    /// `HH:MM` end time of day; at or before `start_time` means overnight.
    pub end_time: String,
    /// Calendar days the shift spans.
    #[serde(default = "default_span_days")]
    pub span_days: u32,
}

fn default_span_days() -> u32 {
    1
}

/// `constraints:` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConstraintsSection {
    /// Per-engineer cap on assignments within one block.
    pub max_shifts_per_engineer: u32,
    /// Per-engineer cap on weekend-role assignments within one block.
    /// Required when the `weekend_limit` rule is enabled.
    pub max_weekends_per_engineer: Option<u32>,
    /// Role whose assignments count toward the weekend cap.
    /// Required when the `weekend_limit` rule is enabled.
    pub weekend_role: Option<String>,
}

/// `rules:` section — boolean constraint toggles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Rules {
    /// Every (week, role) slot is covered by exactly one engineer.
    pub roster_completeness: bool,
    /// An engineer works at most one role per week.
    pub role_separation: bool,
    /// Unavailability records exclude engineers from overlapping weeks.
    pub availability: bool,
    /// No engineer works two adjacent weeks, including across blocks.
    pub no_consecutive_weeks: bool,
    /// Per-engineer assignment cap per block.
    pub max_workload: bool,
    /// Per-engineer weekend-role cap per block.
    pub weekend_limit: bool,
    /// Minimax fairness objective instead of pure feasibility.
    pub balance_workload: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            roster_completeness: true,
            role_separation: true,
            availability: true,
            no_consecutive_weeks: true,
            max_workload: true,
            weekend_limit: true,
            balance_workload: false,
        }
    }
}

/// `solver:` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SolverSection {
    /// Wall-clock budget per block, in seconds.
    pub timeout_seconds: u64,
}

/// `files:` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilesSection {
    /// Availability CSV path, resolved relative to the configuration file.
    pub availability: Option<PathBuf>,
    /// Output CSV file name (default `schedule.csv`).
    pub schedule_csv: Option<String>,
    /// Output iCal file name (default `schedule.ics`).
    pub schedule_ical: Option<String>,
    /// Export formats to emit (default both).
    pub exports: Option<Vec<ExportFormat>>,
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// `Week,Role,Engineer,Start DateTime,End DateTime` rows.
    Csv,
    /// RFC 5545 VEVENT calendar.
    Ical,
}

fn ordered_role_map<'de, D>(deserializer: D) -> Result<Vec<(String, RoleSection)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedRoles;

    impl<'de> Visitor<'de> for OrderedRoles {
        type Value = Vec<(String, RoleSection)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a mapping of role id to role definition")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut roles = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                roles.push(entry);
            }
            Ok(roles)
        }
    }

    deserializer.deserialize_map(OrderedRoles)
}

impl Config {
    /// Loads a configuration file.
    pub fn load(path: &Path) -> Result<Self, ScheduleError> {
        let text = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&text)
            .map_err(|e| ScheduleError::Config(format!("{}: {e}", path.display())))
    }

    /// Resolves a `files:` path against the configuration file's directory.
    pub fn resolve_path(config_path: &Path, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            config_path
                .parent()
                .map(|dir| dir.join(file))
                .unwrap_or_else(|| file.to_path_buf())
        }
    }

    /// Compiles the raw configuration into a typed [`Plan`].
    ///
    /// Returns the first problem encountered; run
    /// [`crate::validation::validate`] beforehand for the full list.
    pub fn compile(&self) -> Result<Plan, ScheduleError> {
        let start_date = parse_date(&self.schedule.start_date).map_err(ScheduleError::Config)?;
        let timezone = parse_timezone(&self.schedule.timezone).map_err(ScheduleError::Config)?;

        let mut roles = Vec::with_capacity(self.roles.len());
        for (id, section) in &self.roles {
            let mut role = Role::new(id.clone(), section.name.clone());
            for entry in &section.schedule {
                let mut days = Vec::with_capacity(entry.days.len());
                for token in &entry.days {
                    days.push(parse_weekday(token).map_err(ScheduleError::Config)?);
                }
                let start = parse_time(&entry.start_time).map_err(ScheduleError::Config)?;
                let end = parse_time(&entry.end_time).map_err(ScheduleError::Config)?;
                role = role.with_entry(
                    ShiftPattern::new(days, start, end).with_span_days(entry.span_days),
                );
            }
            roles.push(role);
        }

        Ok(Plan {
            team: self.team.clone(),
            roles,
            start_date,
            num_blocks: self.schedule.num_blocks,
            weeks_per_block: self.schedule.weeks_per_block,
            timezone,
            max_shifts_per_engineer: self.constraints.max_shifts_per_engineer,
            max_weekends_per_engineer: self.constraints.max_weekends_per_engineer,
            weekend_role: self.constraints.weekend_role.clone(),
            rules: self.rules,
            timeout: Duration::from_secs(self.solver.timeout_seconds),
            availability: self.files.availability.clone(),
            schedule_csv: self
                .files
                .schedule_csv
                .clone()
                .unwrap_or_else(|| "schedule.csv".to_string()),
            schedule_ical: self
                .files
                .schedule_ical
                .clone()
                .unwrap_or_else(|| "schedule.ics".to_string()),
            exports: self
                .files
                .exports
                .clone()
                .unwrap_or_else(|| vec![ExportFormat::Csv, ExportFormat::Ical]),
        })
    }
}

/// The typed, immutable scheduling plan.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Engineer names in configuration order.
    pub team: Vec<String>,
    /// Roles in configuration order.
    pub roles: Vec<Role>,
    /// First day of block 0.
    pub start_date: NaiveDate,
    /// Number of blocks.
    pub num_blocks: u32,
    /// Weeks per block.
    pub weeks_per_block: u32,
    /// Configured zone for all shift timestamps.
    pub timezone: Tz,
    /// Per-engineer assignment cap per block.
    pub max_shifts_per_engineer: u32,
    /// Per-engineer weekend-role cap per block.
    pub max_weekends_per_engineer: Option<u32>,
    /// Role counted by the weekend cap.
    pub weekend_role: Option<String>,
    /// Enabled constraint families.
    pub rules: Rules,
    /// Wall-clock budget per block.
    pub timeout: Duration,
    /// Availability CSV path, if any.
    pub availability: Option<PathBuf>,
    /// Output CSV file name.
    pub schedule_csv: String,
    /// Output iCal file name.
    pub schedule_ical: String,
    /// Export formats to emit.
    pub exports: Vec<ExportFormat>,
}

impl Plan {
    /// The k-th block of the horizon.
    pub fn block(&self, index: u32) -> Block {
        let offset = i64::from(index) * i64::from(self.weeks_per_block) * 7;
        Block::new(
            index,
            self.start_date + chrono::Duration::days(offset),
            self.weeks_per_block,
        )
    }

    /// Index of the weekend role in `roles`, if nominated and present.
    pub fn weekend_role_index(&self) -> Option<usize> {
        let id = self.weekend_role.as_deref()?;
        self.roles.iter().position(|r| r.id == id)
    }
}

/// Parses an ISO-8601 date.
pub fn parse_date(text: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| format!("'{text}' is not an ISO-8601 date (expected YYYY-MM-DD)"))
}

/// Parses an `HH:MM` time of day.
pub fn parse_time(text: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(text, "%H:%M")
        .map_err(|_| format!("'{text}' is not a valid time of day (expected HH:MM)"))
}

/// Parses a weekday token (`Mon`, `monday`, ...).
pub fn parse_weekday(token: &str) -> Result<Weekday, String> {
    token
        .parse::<Weekday>()
        .map_err(|_| format!("unknown weekday token '{token}'"))
}

/// Parses an IANA zone name.
pub fn parse_timezone(name: &str) -> Result<Tz, String> {
    name.parse::<Tz>()
        .map_err(|_| format!("unknown IANA time zone '{name}'"))
}
