//! Block orchestration: sequential solving with boundary continuity.
//!
//! Blocks are solved strictly in increasing index order because each
//! block's forbidden pairs depend on the previous block's result: when
//! `no_consecutive_weeks` is enabled, every engineer assigned in the
//! last week of block k is forbidden in week 0 of block k+1. This is a
//! deliberate local approximation — it guarantees no back-to-back weeks
//! across the boundary but may be slightly more conservative than a
//! monolithic solve.
//!
//! Infeasibility or timeout in any block aborts the whole run with that
//! status; no partial roster is emitted.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::availability::forbidden_pairs;
use crate::calendar::shifts_for;
use crate::config::Plan;
use crate::error::ScheduleError;
use crate::models::{Assignment, Roster, Unavailability};
use crate::solver::{BlockModel, BlockOutcome};

/// Drives the per-block pipeline and accumulates the roster.
pub struct RosterGenerator<'a> {
    plan: &'a Plan,
    records: &'a [Unavailability],
}

impl<'a> RosterGenerator<'a> {
    /// Creates a generator over a compiled plan and availability records.
    pub fn new(plan: &'a Plan, records: &'a [Unavailability]) -> Self {
        Self { plan, records }
    }

    /// Solves every block and returns the complete roster.
    ///
    /// Assignments and shifts are appended in (block, week,
    /// role-config-order) order; shifts within a week follow
    /// (role, entry, listed-weekday) order.
    pub fn generate(&self) -> Result<Roster, ScheduleError> {
        let plan = self.plan;
        let mut roster = Roster::new();
        let mut boundary: Option<BTreeSet<usize>> = None;

        for k in 0..plan.num_blocks {
            let block = plan.block(k);
            let weeks = block.week_windows();

            let mut forbidden = if plan.rules.availability {
                forbidden_pairs(self.records, &plan.team, &weeks)
            } else {
                BTreeSet::new()
            };
            if plan.rules.no_consecutive_weeks {
                if let Some(previous) = &boundary {
                    for &engineer in previous {
                        forbidden.insert((engineer, 0));
                    }
                }
            }
            debug!(
                block = k,
                start = %block.start,
                forbidden = forbidden.len(),
                "prepared block"
            );

            let outcome = BlockModel::new(plan, &forbidden).solve(plan.timeout)?;
            let assignment = match outcome {
                BlockOutcome::Feasible(assignment) => assignment,
                BlockOutcome::Infeasible => return Err(ScheduleError::Infeasible { block: k }),
                BlockOutcome::Timeout => return Err(ScheduleError::Timeout { block: k }),
            };
            info!(block = k, "block solved");

            let mut last_week = BTreeSet::new();
            for (w, week) in weeks.iter().enumerate() {
                for (r, role) in plan.roles.iter().enumerate() {
                    let Some(engineer) = assignment.engineer(w, r) else {
                        continue;
                    };
                    let name = &plan.team[engineer];
                    roster.push_assignment(Assignment {
                        block: k,
                        week: w as u32,
                        role_id: role.id.clone(),
                        engineer: name.clone(),
                    });
                    roster.extend_shifts(shifts_for(week, role, name, plan.timezone)?);
                    if w + 1 == weeks.len() {
                        last_week.insert(engineer);
                    }
                }
            }
            boundary = Some(last_week);
        }

        Ok(roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Weekday};
    use std::time::Duration;

    use crate::config::Rules;
    use crate::models::{Role, ShiftPattern};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn day_role(id: &str) -> Role {
        Role::new(id, format!("{id} duty")).with_entry(ShiftPattern::new(
            vec![Weekday::Mon],
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        ))
    }

    fn plan(team: &[&str], blocks: u32, weeks: u32, max_shifts: u32) -> Plan {
        Plan {
            team: team.iter().map(|s| s.to_string()).collect(),
            roles: vec![day_role("D")],
            start_date: d(2025, 11, 3),
            num_blocks: blocks,
            weeks_per_block: weeks,
            timezone: chrono_tz::UTC,
            max_shifts_per_engineer: max_shifts,
            max_weekends_per_engineer: None,
            weekend_role: None,
            rules: Rules {
                weekend_limit: false,
                ..Rules::default()
            },
            timeout: Duration::from_secs(10),
            availability: None,
            schedule_csv: "schedule.csv".into(),
            schedule_ical: "schedule.ics".into(),
            exports: Vec::new(),
        }
    }

    #[test]
    fn test_minimal_roster() {
        let plan = plan(&["alice", "bob", "carol", "dave"], 1, 2, 1);
        let roster = RosterGenerator::new(&plan, &[]).generate().unwrap();

        assert_eq!(roster.assignments.len(), 2);
        assert_eq!(roster.shift_count(), 2);
        assert_ne!(
            roster.engineer_for(0, 0, "D"),
            roster.engineer_for(0, 1, "D")
        );
        assert_eq!(roster.shifts[0].start.date_naive(), d(2025, 11, 3));
        assert_eq!(roster.shifts[1].start.date_naive(), d(2025, 11, 10));
    }

    #[test]
    fn test_block_boundary_continuity() {
        let plan = plan(&["alice", "bob", "carol", "dave"], 2, 2, 1);
        let roster = RosterGenerator::new(&plan, &[]).generate().unwrap();

        // The engineer closing block 0 never opens block 1.
        let closing = roster.engineer_for(0, 1, "D").unwrap();
        let opening = roster.engineer_for(1, 0, "D").unwrap();
        assert_ne!(closing, opening);
        // Second block starts a fresh 7-day grid.
        assert_eq!(roster.shifts[2].start.date_naive(), d(2025, 11, 17));
    }

    #[test]
    fn test_availability_excludes_engineer() {
        let mut plan = plan(&["alice", "bob"], 1, 2, 1);
        plan.rules.no_consecutive_weeks = false;
        let records = vec![Unavailability::new("alice", d(2025, 11, 3), d(2025, 11, 9))];

        let roster = RosterGenerator::new(&plan, &records).generate().unwrap();
        assert_eq!(roster.engineer_for(0, 0, "D"), Some("bob"));
        assert_eq!(roster.engineer_for(0, 1, "D"), Some("alice"));
    }

    #[test]
    fn test_infeasible_block_aborts_run() {
        let mut plan = plan(&["alice"], 1, 2, 1);
        plan.rules.max_workload = false;

        let err = RosterGenerator::new(&plan, &[]).generate().unwrap_err();
        assert!(matches!(err, ScheduleError::Infeasible { block: 0 }));
    }

    #[test]
    fn test_capacity_error_before_solving() {
        let mut plan = plan(&["alice", "bob", "carol"], 1, 6, 3);
        plan.roles.push(day_role("N"));

        let err = RosterGenerator::new(&plan, &[]).generate().unwrap_err();
        assert!(matches!(err, ScheduleError::Capacity { .. }));
    }

    #[test]
    fn test_emission_order_is_block_week_role() {
        let mut plan = plan(&["alice", "bob", "carol", "dave"], 2, 2, 2);
        plan.roles.push(day_role("N"));

        let roster = RosterGenerator::new(&plan, &[]).generate().unwrap();
        let order: Vec<(u32, u32, &str)> = roster
            .assignments
            .iter()
            .map(|a| (a.block, a.week, a.role_id.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (0, 0, "D"),
                (0, 0, "N"),
                (0, 1, "D"),
                (0, 1, "N"),
                (1, 0, "D"),
                (1, 0, "N"),
                (1, 1, "D"),
                (1, 1, "N"),
            ]
        );
    }
}
