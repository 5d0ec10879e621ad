//! Constraint model construction and block solving.
//!
//! Translates one block of the roster problem into a CP instance over
//! boolean (0/1) decision variables `x[e][w][r]` — "engineer e covers
//! role r in week w" — posts the rule-gated constraint families, and
//! drives the Pumpkin solver under a wall-clock budget.
//!
//! The model is feasibility-only by default: the objective is the total
//! assignment count, a constant when roster completeness is enforced,
//! so the first solution found is already optimal. The
//! `balance_workload` rule replaces it with a minimax objective on
//! per-engineer load. The backend's default branching strategy is
//! deterministic, so identical inputs reproduce identical rosters.

use std::collections::BTreeSet;
use std::time::Duration;

use pumpkin_solver::constraints as cp;
use pumpkin_solver::optimisation::linear_sat_unsat::LinearSatUnsat;
use pumpkin_solver::optimisation::OptimisationDirection;
use pumpkin_solver::results::{OptimisationResult, ProblemSolution};
use pumpkin_solver::termination::TimeBudget;
use pumpkin_solver::variables::TransformableVariable;
use pumpkin_solver::Solver;
use tracing::debug;

use crate::availability::ForbiddenPair;
use crate::config::Plan;
use crate::error::ScheduleError;

/// Verdict of one block solve.
#[derive(Debug)]
pub enum BlockOutcome {
    /// A satisfying assignment was found.
    Feasible(BlockAssignment),
    /// The solver proved no satisfying assignment exists.
    Infeasible,
    /// The wall-clock budget ran out before a verdict.
    Timeout,
}

/// Assignment extracted from a feasible block: `slots[week][role]` is
/// the index of the covering engineer, if any.
#[derive(Debug, Clone)]
pub struct BlockAssignment {
    slots: Vec<Vec<Option<usize>>>,
}

impl BlockAssignment {
    /// Engineer index covering a (week, role) slot.
    #[inline]
    pub fn engineer(&self, week: usize, role: usize) -> Option<usize> {
        self.slots[week][role]
    }
}

/// Constraint model for one block.
///
/// Borrows the plan and the block's forbidden pairs; building and
/// solving happen in one call so all solver state is released when the
/// block is done.
pub struct BlockModel<'a> {
    plan: &'a Plan,
    forbidden: &'a BTreeSet<ForbiddenPair>,
}

impl<'a> BlockModel<'a> {
    /// Creates a model for one block.
    pub fn new(plan: &'a Plan, forbidden: &'a BTreeSet<ForbiddenPair>) -> Self {
        Self { plan, forbidden }
    }

    /// Asserts the capacity inequalities that must hold before solving.
    ///
    /// Each inequality is checked only when its rule is enabled: a cap
    /// that is not enforced cannot make the instance infeasible. Failure
    /// is a capacity error, distinct from solver infeasibility.
    pub fn check_capacity(&self) -> Result<(), ScheduleError> {
        let plan = self.plan;
        let engineers = plan.team.len() as u64;
        let weeks = u64::from(plan.weeks_per_block);

        if plan.rules.max_workload {
            let supply = engineers * u64::from(plan.max_shifts_per_engineer);
            let demand = weeks * plan.roles.len() as u64;
            if supply < demand {
                return Err(ScheduleError::Capacity {
                    detail: "total shift capacity per block".into(),
                    supply,
                    demand,
                });
            }
        }

        if plan.rules.weekend_limit {
            if let (Some(role), Some(cap)) =
                (plan.weekend_role_index(), plan.max_weekends_per_engineer)
            {
                let supply = engineers * u64::from(cap);
                let demand = if plan.roles[role].entries.is_empty() {
                    0
                } else {
                    weeks
                };
                if supply < demand {
                    return Err(ScheduleError::Capacity {
                        detail: "weekend-role capacity per block".into(),
                        supply,
                        demand,
                    });
                }
            }
        }

        Ok(())
    }

    /// Builds the CP instance, solves it, and extracts the assignment.
    pub fn solve(&self, timeout: Duration) -> Result<BlockOutcome, ScheduleError> {
        self.check_capacity()?;

        let plan = self.plan;
        let engineers = plan.team.len();
        let weeks = plan.weeks_per_block as usize;
        let roles = plan.roles.len();

        let mut solver = Solver::default();
        let tag = solver.new_constraint_tag();

        // x[e][w][r] = 1 iff engineer e covers role r in week w
        let x: Vec<Vec<Vec<_>>> = (0..engineers)
            .map(|_| {
                (0..weeks)
                    .map(|_| {
                        (0..roles)
                            .map(|_| solver.new_bounded_integer(0, 1))
                            .collect()
                    })
                    .collect()
            })
            .collect();

        if plan.rules.roster_completeness {
            for w in 0..weeks {
                for r in 0..roles {
                    let slot: Vec<_> = (0..engineers).map(|e| x[e][w][r]).collect();
                    if solver.add_constraint(cp::equals(slot, 1, tag)).post().is_err() {
                        return Ok(BlockOutcome::Infeasible);
                    }
                }
            }
        }

        if plan.rules.role_separation {
            for row in &x {
                for week_vars in row {
                    if solver
                        .add_constraint(cp::less_than_or_equals(week_vars.clone(), 1, tag))
                        .post()
                        .is_err()
                    {
                        return Ok(BlockOutcome::Infeasible);
                    }
                }
            }
        }

        // Forbidden pairs are inputs: the orchestrator decides which rules
        // contribute them (availability overlaps, boundary continuity).
        for &(e, w) in self.forbidden {
            for r in 0..roles {
                if solver
                    .add_constraint(cp::equals(vec![x[e][w][r]], 0, tag))
                    .post()
                    .is_err()
                {
                    return Ok(BlockOutcome::Infeasible);
                }
            }
        }

        if plan.rules.no_consecutive_weeks {
            for row in &x {
                for w in 0..weeks.saturating_sub(1) {
                    let mut pair = row[w].clone();
                    pair.extend_from_slice(&row[w + 1]);
                    if solver
                        .add_constraint(cp::less_than_or_equals(pair, 1, tag))
                        .post()
                        .is_err()
                    {
                        return Ok(BlockOutcome::Infeasible);
                    }
                }
            }
        }

        if plan.rules.max_workload {
            for row in &x {
                let load: Vec<_> = row.iter().flatten().copied().collect();
                if solver
                    .add_constraint(cp::less_than_or_equals(
                        load,
                        plan.max_shifts_per_engineer as i32,
                        tag,
                    ))
                    .post()
                    .is_err()
                {
                    return Ok(BlockOutcome::Infeasible);
                }
            }
        }

        if plan.rules.weekend_limit {
            if let (Some(role), Some(cap)) =
                (plan.weekend_role_index(), plan.max_weekends_per_engineer)
            {
                for row in &x {
                    let weekend_load: Vec<_> = row.iter().map(|week_vars| week_vars[role]).collect();
                    if solver
                        .add_constraint(cp::less_than_or_equals(weekend_load, cap as i32, tag))
                        .post()
                        .is_err()
                    {
                        return Ok(BlockOutcome::Infeasible);
                    }
                }
            }
        }

        // Objective variable. Minimax load when balancing; otherwise the
        // total assignment count, constant under roster completeness.
        let per_engineer = (weeks * roles) as i32;
        let objective = if plan.rules.balance_workload {
            let max_load = solver.new_bounded_integer(0, per_engineer);
            for row in &x {
                // max_load - Σ x[e] ≥ 0
                let mut terms = vec![max_load.scaled(1)];
                terms.extend(row.iter().flatten().map(|v| v.scaled(-1)));
                if solver
                    .add_constraint(cp::greater_than_or_equals(terms, 0, tag))
                    .post()
                    .is_err()
                {
                    return Ok(BlockOutcome::Infeasible);
                }
            }
            max_load
        } else {
            let total = solver.new_bounded_integer(0, engineers as i32 * per_engineer);
            // Σ x - total = 0
            let mut terms = vec![total.scaled(-1)];
            terms.extend(x.iter().flatten().flatten().map(|v| v.scaled(1)));
            if solver.add_constraint(cp::equals(terms, 0, tag)).post().is_err() {
                return Ok(BlockOutcome::Infeasible);
            }
            total
        };

        debug!(
            engineers,
            weeks,
            roles,
            forbidden = self.forbidden.len(),
            "solving block model"
        );

        let mut brancher = solver.default_brancher();
        let mut termination = TimeBudget::starting_now(timeout);

        fn noop_callback<B>(_: &Solver, _: pumpkin_solver::results::SolutionReference, _: &B) {}
        let result = solver.optimise(
            &mut brancher,
            &mut termination,
            LinearSatUnsat::new(OptimisationDirection::Minimise, objective, noop_callback),
        );

        let values: Vec<Vec<Vec<i32>>> = match result {
            OptimisationResult::Optimal(solution) => x
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|week_vars| {
                            week_vars
                                .iter()
                                .map(|&v| solution.get_integer_value(v))
                                .collect()
                        })
                        .collect()
                })
                .collect(),
            OptimisationResult::Satisfiable(solution) => x
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|week_vars| {
                            week_vars
                                .iter()
                                .map(|&v| solution.get_integer_value(v))
                                .collect()
                        })
                        .collect()
                })
                .collect(),
            OptimisationResult::Unsatisfiable => return Ok(BlockOutcome::Infeasible),
            OptimisationResult::Unknown => return Ok(BlockOutcome::Timeout),
        };

        Ok(BlockOutcome::Feasible(self.extract(&values)?))
    }

    /// Reads the assignment out of the decision-variable values.
    fn extract(&self, values: &[Vec<Vec<i32>>]) -> Result<BlockAssignment, ScheduleError> {
        let plan = self.plan;
        let weeks = plan.weeks_per_block as usize;
        let roles = plan.roles.len();

        let mut slots = vec![vec![None; roles]; weeks];
        for (w, slot_row) in slots.iter_mut().enumerate() {
            for (r, slot) in slot_row.iter_mut().enumerate() {
                let mut assigned = (0..plan.team.len()).filter(|&e| values[e][w][r] == 1);
                *slot = assigned.next();
                if plan.rules.roster_completeness {
                    let extra = assigned.next();
                    if slot.is_none() || extra.is_some() {
                        return Err(ScheduleError::Internal(format!(
                            "week {w} role {} is not covered by exactly one engineer",
                            plan.roles[r].id
                        )));
                    }
                }
            }
        }

        Ok(BlockAssignment { slots })
    }
}
