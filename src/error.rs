//! Simulator-facing error types.
//!
//! Following the four-way failure split in spec §7: bad input is rejected
//! up front as a [`ValidationError`] before simulation starts; everything
//! that can happen mid-battle (a mechanic declining, an invalid AI action,
//! hitting the round cap) is recorded as a [`crate::events::Diagnostic`]
//! event rather than aborting the run, since the battle must always
//! terminate with a result. Programmer errors (an out-of-range index, a
//! missing template the caller promised existed) are left as panics, same
//! as the teacher does for its own invariants.

use thiserror::Error;

use crate::types::{Team, UnitId};

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{team:?} roster cost {total} exceeds budget {budget}")]
    CostBudgetExceeded { team: Team, total: u32, budget: u32 },

    #[error("{team:?} roster has {entries} entries but {positions} positions")]
    RosterPositionMismatch { team: Team, entries: usize, positions: usize },

    #[error("{team:?} roster is empty")]
    EmptyRoster { team: Team },

    #[error("{team:?} deploy position {pos} is out of bounds")]
    PositionOutOfBounds { team: Team, pos: crate::types::Position },

    #[error("{team:?} deploy position {pos} is outside its deploy rows")]
    PositionOutsideDeployZone { team: Team, pos: crate::types::Position },

    #[error("deploy position {pos} is occupied by more than one unit")]
    PositionCollision { pos: crate::types::Position },

    #[error("roster entry references unknown template {template_id:?}")]
    UnknownTemplate { template_id: String },

    #[error("duplicate unit id {0:?} assigned during setup")]
    DuplicateUnitId(UnitId),
}
