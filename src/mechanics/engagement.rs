//! Zone of control and movement intercepts (4.3.10).
//!
//! A unit exerts a zone of control over its orthogonal neighbors. Any
//! enemy that ends its movement adjacent to such a unit becomes engaged.
//! Cavalry moving *through* an enemy's threatened range are checked for
//! intercept: a hard intercept halts the charge immediately adjacent to
//! the intercepting unit and deals its attack damage; a soft intercept
//! (any other unit's zone) only applies once the mover finishes its move
//! inside it, via the normal engagement flag.

use crate::config::MechanicsConfig;
use crate::state::BattleState;
use crate::types::{Facing, Position, UnitId, UnitTags};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptKind {
    Hard,
    Soft,
}

pub fn is_engaged(state: &BattleState, unit_id: &UnitId) -> bool {
    let Some(unit) = state.unit(unit_id) else { return false };
    unit.position.orthogonal_neighbors().iter().any(|pos| {
        state.unit_at(*pos).map(|other| other.team != unit.team).unwrap_or(false)
    })
}

/// Checks whether `path` (a sequence of cells a cavalry unit crosses, in
/// order, excluding the start) triggers an intercept from an enemy unit.
/// Returns the first triggering cell, the interceptor, and the kind.
pub fn check_intercept(
    state: &BattleState,
    mover: &UnitId,
    path: &[Position],
    cfg: &MechanicsConfig,
) -> Option<(Position, UnitId, InterceptKind)> {
    let unit = state.unit(mover)?;
    let is_cavalry = unit.tags.contains(UnitTags::CAVALRY);
    for &cell in path {
        for enemy in state.enemies_of(mover).iter().filter_map(|id| state.unit(id)) {
            let range = enemy.position.chebyshev(cell);
            let facing_the_line = Facing::toward(enemy.position, cell) == enemy.facing;
            if is_cavalry && range <= cfg.cavalry_intercept_range && enemy.tags.contains(UnitTags::SPEARMAN) && facing_the_line {
                return Some((cell, enemy.id.clone(), InterceptKind::Hard));
            }
            if range <= 1 {
                return Some((cell, enemy.id.clone(), InterceptKind::Soft));
            }
        }
    }
    None
}
