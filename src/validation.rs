//! Input validation for roster generation.
//!
//! Independently re-checks the raw configuration and availability
//! records before anything is solved. Detects:
//! - Empty or duplicated team entries
//! - Roles without schedule entries, unknown weekday tokens, bad times,
//!   zero-length or zero-span entries
//! - Unparseable dates, unknown time zones, degenerate horizons
//! - Weekend settings that are missing or name a nonexistent role
//! - Capacity shortfalls (both sides of the inequality reported)
//! - Rule combinations that admit trivially empty schedules
//! - Availability records with reversed ranges or unknown engineers
//!
//! Problems carry a severity: `generate` refuses to run when any error
//! is present; warnings accumulate and are only reported.

use std::collections::HashSet;

use crate::config::{parse_date, parse_time, parse_timezone, parse_weekday, Config};
use crate::models::Unavailability;

/// Problem severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Blocks generation.
    Error,
    /// Reported but non-fatal.
    Warning,
}

/// A validation problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    /// Severity of the problem.
    pub severity: Severity,
    /// Problem category.
    pub kind: ProblemKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemKind {
    /// The team list is empty.
    EmptyTeam,
    /// Two team entries share a name.
    DuplicateEngineer,
    /// No roles are defined.
    NoRoles,
    /// A role has no schedule entries.
    EmptyRoleSchedule,
    /// A weekday token is not recognized.
    UnknownWeekday,
    /// A time of day is not `HH:MM`.
    BadTime,
    /// An entry produces zero-length shifts.
    ZeroDurationEntry,
    /// `span_days` is below 1.
    BadSpan,
    /// A date is not ISO-8601.
    BadDate,
    /// The zone name is not a known IANA zone.
    UnknownTimezone,
    /// `num_blocks`, `weeks_per_block`, or the solver budget is zero.
    BadHorizon,
    /// `weekend_role` names a role that does not exist.
    UnknownWeekendRole,
    /// The weekend rule is enabled without its settings.
    MissingWeekendSettings,
    /// The enabled rules admit a trivially empty schedule.
    DegenerateRules,
    /// A capacity inequality fails.
    CapacityShortfall,
    /// An unavailability record ends before it starts.
    BadDateRange,
    /// An unavailability record names an engineer outside the team.
    UnknownEngineer,
}

impl Problem {
    fn error(kind: ProblemKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
        }
    }

    fn warning(kind: ProblemKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
        }
    }
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    /// All detected problems, in detection order.
    pub problems: Vec<Problem>,
}

impl ValidationOutcome {
    /// Problems that block generation.
    pub fn errors(&self) -> impl Iterator<Item = &Problem> {
        self.problems
            .iter()
            .filter(|p| p.severity == Severity::Error)
    }

    /// Non-fatal problems.
    pub fn warnings(&self) -> impl Iterator<Item = &Problem> {
        self.problems
            .iter()
            .filter(|p| p.severity == Severity::Warning)
    }

    /// Whether any error is present.
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// Validates a raw configuration and its availability records.
pub fn validate(config: &Config, records: &[Unavailability]) -> ValidationOutcome {
    let mut problems = Vec::new();

    check_team(config, &mut problems);
    check_roles(config, &mut problems);
    check_schedule(config, &mut problems);
    check_rules(config, &mut problems);
    check_capacity(config, &mut problems);
    check_records(config, records, &mut problems);

    ValidationOutcome { problems }
}

fn check_team(config: &Config, problems: &mut Vec<Problem>) {
    if config.team.is_empty() {
        problems.push(Problem::error(ProblemKind::EmptyTeam, "team list is empty"));
    }
    let mut seen = HashSet::new();
    for name in &config.team {
        if !seen.insert(name.as_str()) {
            problems.push(Problem::error(
                ProblemKind::DuplicateEngineer,
                format!("duplicate engineer name '{name}'"),
            ));
        }
    }
}

fn check_roles(config: &Config, problems: &mut Vec<Problem>) {
    if config.roles.is_empty() {
        problems.push(Problem::error(ProblemKind::NoRoles, "no roles defined"));
    }
    for (id, role) in &config.roles {
        if role.schedule.is_empty() {
            problems.push(Problem::error(
                ProblemKind::EmptyRoleSchedule,
                format!("role '{id}' has no schedule entries"),
            ));
        }
        for (index, entry) in role.schedule.iter().enumerate() {
            for token in &entry.days {
                if let Err(message) = parse_weekday(token) {
                    problems.push(Problem::error(
                        ProblemKind::UnknownWeekday,
                        format!("role '{id}' entry {index}: {message}"),
                    ));
                }
            }
            let start = parse_time(&entry.start_time);
            let end = parse_time(&entry.end_time);
            for parsed in [&start, &end] {
                if let Err(message) = parsed {
                    problems.push(Problem::error(
                        ProblemKind::BadTime,
                        format!("role '{id}' entry {index}: {message}"),
                    ));
                }
            }
            if entry.span_days < 1 {
                problems.push(Problem::error(
                    ProblemKind::BadSpan,
                    format!("role '{id}' entry {index}: span_days must be at least 1"),
                ));
            }
            if let (Ok(start), Ok(end)) = (start, end) {
                if start == end && entry.span_days == 1 {
                    problems.push(Problem::error(
                        ProblemKind::ZeroDurationEntry,
                        format!("role '{id}' entry {index}: shift has zero duration"),
                    ));
                }
            }
        }
    }
}

fn check_schedule(config: &Config, problems: &mut Vec<Problem>) {
    if let Err(message) = parse_date(&config.schedule.start_date) {
        problems.push(Problem::error(ProblemKind::BadDate, message));
    }
    if let Err(message) = parse_timezone(&config.schedule.timezone) {
        problems.push(Problem::error(ProblemKind::UnknownTimezone, message));
    }
    if config.schedule.weeks_per_block < 1 {
        problems.push(Problem::error(
            ProblemKind::BadHorizon,
            "weeks_per_block must be at least 1",
        ));
    }
    if config.schedule.num_blocks < 1 {
        problems.push(Problem::error(
            ProblemKind::BadHorizon,
            "num_blocks must be at least 1",
        ));
    }
    if config.solver.timeout_seconds < 1 {
        problems.push(Problem::error(
            ProblemKind::BadHorizon,
            "solver timeout_seconds must be at least 1",
        ));
    }
}

fn check_rules(config: &Config, problems: &mut Vec<Problem>) {
    if let Some(weekend_role) = &config.constraints.weekend_role {
        if !config.roles.iter().any(|(id, _)| id == weekend_role) {
            problems.push(Problem::error(
                ProblemKind::UnknownWeekendRole,
                format!("weekend_role '{weekend_role}' does not name a defined role"),
            ));
        }
    }
    if config.rules.weekend_limit {
        if config.constraints.weekend_role.is_none() {
            problems.push(Problem::error(
                ProblemKind::MissingWeekendSettings,
                "weekend_limit is enabled but constraints.weekend_role is not set",
            ));
        }
        if config.constraints.max_weekends_per_engineer.is_none() {
            problems.push(Problem::error(
                ProblemKind::MissingWeekendSettings,
                "weekend_limit is enabled but constraints.max_weekends_per_engineer is not set",
            ));
        }
    }
    if !config.rules.roster_completeness && !config.rules.max_workload {
        problems.push(Problem::error(
            ProblemKind::DegenerateRules,
            "disabling both roster_completeness and max_workload admits an empty schedule",
        ));
    }
}

fn check_capacity(config: &Config, problems: &mut Vec<Problem>) {
    let engineers = config.team.len() as u64;
    let weeks = u64::from(config.schedule.weeks_per_block);

    if config.rules.max_workload {
        let supply = engineers * u64::from(config.constraints.max_shifts_per_engineer);
        let demand = weeks * config.roles.len() as u64;
        if supply < demand {
            problems.push(Problem::error(
                ProblemKind::CapacityShortfall,
                format!(
                    "total shift capacity {supply} is below per-block demand {demand} \
                     ({engineers} engineers x {} max shifts < {weeks} weeks x {} roles)",
                    config.constraints.max_shifts_per_engineer,
                    config.roles.len()
                ),
            ));
        }
    }

    if config.rules.weekend_limit {
        let weekend = config
            .constraints
            .weekend_role
            .as_deref()
            .and_then(|id| config.roles.iter().find(|(role_id, _)| role_id == id));
        if let (Some((id, role)), Some(cap)) =
            (weekend, config.constraints.max_weekends_per_engineer)
        {
            let supply = engineers * u64::from(cap);
            let demand = if role.schedule.is_empty() { 0 } else { weeks };
            if supply < demand {
                problems.push(Problem::error(
                    ProblemKind::CapacityShortfall,
                    format!(
                        "weekend capacity {supply} is below per-block demand {demand} \
                         for role '{id}'"
                    ),
                ));
            }
        }
    }
}

fn check_records(config: &Config, records: &[Unavailability], problems: &mut Vec<Problem>) {
    let team: HashSet<&str> = config.team.iter().map(String::as_str).collect();
    for record in records {
        if record.start > record.end {
            problems.push(Problem::error(
                ProblemKind::BadDateRange,
                format!(
                    "unavailability for '{}' ends {} before it starts {}",
                    record.engineer, record.end, record.start
                ),
            ));
        }
        if !team.contains(record.engineer.as_str()) {
            problems.push(Problem::warning(
                ProblemKind::UnknownEngineer,
                format!(
                    "unavailability record names unknown engineer '{}'",
                    record.engineer
                ),
            ));
        }
    }
}
