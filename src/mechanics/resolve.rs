//! Resolve regeneration and the rout/crumble/rally state machine (4.3.7).

use crate::config::MechanicsConfig;
use crate::types::{MAX_RESOLVE, RALLY_THRESHOLD, ROUT_THRESHOLD};
use crate::unit::BattleUnit;

/// Resolve regenerated at `turn_start`, before any other modifier this
/// turn is applied.
pub fn regen_amount(in_phalanx: bool, cfg: &MechanicsConfig) -> i32 {
    let mut amount = cfg.resolve_regen_base;
    if in_phalanx {
        amount += cfg.resolve_regen_phalanx_bonus;
    }
    amount
}

/// Applies routing/rally transitions after a resolve change, returning
/// whether the unit's `is_routing` flag flipped and in which direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutTransition {
    None,
    StartedRouting,
    Rallied,
}

pub fn apply_transition(unit: &mut BattleUnit) -> RoutTransition {
    if !unit.is_routing && unit.resolve <= ROUT_THRESHOLD {
        unit.is_routing = true;
        RoutTransition::StartedRouting
    } else if unit.is_routing && unit.resolve >= RALLY_THRESHOLD {
        unit.is_routing = false;
        RoutTransition::Rallied
    } else {
        RoutTransition::None
    }
}

pub fn max_resolve() -> i32 {
    MAX_RESOLVE
}
