//! Roster domain models.
//!
//! Provides the core data types for describing an on-call scheduling
//! problem and its solution: roles with weekly shift patterns, blocks of
//! weeks solved as one unit, unavailability records, and the concrete
//! shift calendar extracted from a solved assignment.
//!
//! Configuration is immutable after load; per-block artifacts are owned
//! by the generator and released between blocks; the final roster is
//! owned by the caller.

mod availability;
mod block;
mod role;
mod shift;

pub use availability::Unavailability;
pub use block::{Block, Week};
pub use role::{Role, ShiftPattern};
pub use shift::{Assignment, Roster, Shift};
