//! Roster (solution) model.
//!
//! A roster is the complete output of a run: one assignment per
//! (block, week, role) slot plus the concrete shift calendar derived
//! from those assignments. Assignments and shifts are stored in
//! emission order — (block, week, role-config-order), shifts within a
//! week in (role, entry, listed-weekday) order — so exporters can walk
//! them directly.

use chrono::{DateTime, Weekday};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeSet;

/// One engineer covering one role for one week.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Assignment {
    /// 0-based block index.
    pub block: u32,
    /// 0-based week index within the block.
    pub week: u32,
    /// Role identifier.
    pub role_id: String,
    /// Assigned engineer.
    pub engineer: String,
}

/// A concrete shift with absolute zone-aware timestamps.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Shift {
    /// Assigned engineer.
    pub engineer: String,
    /// Role identifier.
    pub role_id: String,
    /// Role display name.
    pub role_name: String,
    /// Shift start in the configured zone.
    pub start: DateTime<Tz>,
    /// Shift end in the configured zone.
    pub end: DateTime<Tz>,
    /// 0-based block index.
    pub block: u32,
    /// 0-based week index within the block.
    pub week: u32,
    /// Index of the originating pattern within the role.
    pub entry: u32,
    /// Weekday the shift starts on.
    pub weekday: Weekday,
}

/// A complete multi-block roster.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Roster {
    /// Week-level assignments in emission order.
    pub assignments: Vec<Assignment>,
    /// Concrete shifts in emission order.
    pub shifts: Vec<Shift>,
}

impl Roster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an assignment.
    pub fn push_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Appends shifts.
    pub fn extend_shifts(&mut self, shifts: impl IntoIterator<Item = Shift>) {
        self.shifts.extend(shifts);
    }

    /// The engineer covering a (block, week, role) slot, if any.
    pub fn engineer_for(&self, block: u32, week: u32, role_id: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.block == block && a.week == week && a.role_id == role_id)
            .map(|a| a.engineer.as_str())
    }

    /// All assignments held by one engineer.
    pub fn assignments_for(&self, engineer: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.engineer == engineer)
            .collect()
    }

    /// Distinct engineers assigned in a given week of a block.
    pub fn engineers_in_week(&self, block: u32, week: u32) -> BTreeSet<&str> {
        self.assignments
            .iter()
            .filter(|a| a.block == block && a.week == week)
            .map(|a| a.engineer.as_str())
            .collect()
    }

    /// Number of concrete shifts.
    pub fn shift_count(&self) -> usize {
        self.shifts.len()
    }
}
