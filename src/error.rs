//! Error taxonomy for roster generation.
//!
//! Every failure mode a run can hit maps onto one variant, and every
//! variant maps onto a stable process exit code:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | configuration or validation error (including capacity) |
//! | 2 | solver proved the block infeasible |
//! | 3 | solver exhausted its wall-clock budget |
//! | 4 | I/O failure |
//!
//! The distinction between a proven-UNSAT block and an
//! unknown-at-timeout block is preserved all the way to the exit code.

use thiserror::Error;

/// Errors produced while loading, validating, solving, or exporting a roster.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// Malformed or semantically invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A capacity inequality failed before the solver was invoked.
    #[error("capacity error: {detail} (available {supply} < required {demand})")]
    Capacity {
        detail: String,
        supply: u64,
        demand: u64,
    },

    /// The solver proved a block has no satisfying assignment.
    #[error("no feasible roster exists for block {block}")]
    Infeasible { block: u32 },

    /// The solver ran out of wall-clock budget before reaching a verdict.
    #[error("solver timed out on block {block}")]
    Timeout { block: u32 },

    /// File read/write failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Availability CSV could not be read or parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A solved model violated its own structural guarantees.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ScheduleError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Capacity { .. } => 1,
            Self::Infeasible { .. } => 2,
            Self::Timeout { .. } => 3,
            Self::Io(_) | Self::Csv(_) | Self::Internal(_) => 4,
        }
    }
}
