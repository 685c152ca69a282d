//! The `ai_decision` phase seam.
//!
//! Target/movement/ability choice is policy, not mechanics, so it's pulled
//! out behind a trait exactly where the teacher's `selector.rs`
//! (`systems/ai_system/selector.rs`) picks a target inline — generalized
//! here so a caller can swap in a scripted, learned, or scenario-fixed
//! policy without touching the pipeline.

use crate::state::BattleState;
use crate::types::{AbilityId, Position, UnitId};

#[derive(Debug, Clone, PartialEq)]
pub enum BattleAction {
    Attack { target: UnitId },
    Move { to: Position },
    Ability { ability: AbilityId, target: Option<UnitId> },
    Skip,
}

/// Decides what the acting unit does this turn. Implementations must be
/// deterministic given the same `(state, unit, rng draws)` — the oracle is
/// handed `rng` precisely so any randomized policy still consumes draws
/// from the battle's single seeded stream.
pub trait AiOracle {
    fn decide(&self, state: &BattleState, unit: &UnitId, rng: &mut crate::rng::RngStream) -> BattleAction;
}

/// Reference oracle: attack the nearest living enemy if one is in range,
/// otherwise step toward it, otherwise skip. Used by the test scenarios
/// and as a sane default for embedders that don't need real AI.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestEnemyOracle;

impl AiOracle for NearestEnemyOracle {
    fn decide(&self, state: &BattleState, unit_id: &UnitId, _rng: &mut crate::rng::RngStream) -> BattleAction {
        let Some(unit) = state.unit(unit_id) else {
            return BattleAction::Skip;
        };
        let enemies = state.enemies_of(unit_id);
        let Some(nearest) = enemies
            .iter()
            .filter_map(|id| state.unit(id))
            .min_by_key(|e| unit.position.manhattan(e.position))
        else {
            return BattleAction::Skip;
        };

        let atk_range = if unit.is_ranged() { i32::MAX } else { 1 };
        if unit.position.manhattan(nearest.position) <= atk_range {
            return BattleAction::Attack { target: nearest.id.clone() };
        }

        let (dx, dy) = step_toward(unit.position, nearest.position);
        let to = Position::new(
            (unit.position.x as i32 + dx).clamp(0, crate::types::GRID_WIDTH as i32 - 1) as u8,
            (unit.position.y as i32 + dy).clamp(0, crate::types::GRID_HEIGHT as i32 - 1) as u8,
        );
        BattleAction::Move { to }
    }
}

fn step_toward(from: Position, to: Position) -> (i32, i32) {
    let dx = (to.x as i32 - from.x as i32).signum();
    let dy = (to.y as i32 - from.y as i32).signum();
    if dx != 0 && dy != 0 {
        // Orthogonal-only movement: prefer closing the larger axis first.
        if (to.x as i32 - from.x as i32).abs() >= (to.y as i32 - from.y as i32).abs() {
            (dx, 0)
        } else {
            (0, dy)
        }
    } else {
        (dx, dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::BattleState;
    use crate::types::{Facing, Faction, Team, UnitTags};
    use crate::unit::{BaseStats, BattleUnit};

    fn stats() -> BaseStats {
        BaseStats { hp_max: 20, atk: 5, atk_count: 1, armor: 0, speed: 3, initiative: 5, dodge: 0 }
    }

    #[test]
    fn attacks_adjacent_enemy_in_melee_range() {
        let units = vec![
            BattleUnit::new(
                UnitId("p_0".into()),
                crate::types::TemplateId("t".into()),
                "P".into(),
                Team::Player,
                Faction::Human,
                stats(),
                UnitTags::empty(),
                Position::new(0, 0),
                Facing::S,
                None,
            ),
            BattleUnit::new(
                UnitId("e_0".into()),
                crate::types::TemplateId("t".into()),
                "E".into(),
                Team::Enemy,
                Faction::Human,
                stats(),
                UnitTags::empty(),
                Position::new(0, 1),
                Facing::N,
                None,
            ),
        ];
        let state = BattleState::new("b".into(), 1, units);
        let mut rng = crate::rng::RngStream::new(1);
        let action = NearestEnemyOracle.decide(&state, &UnitId("p_0".into()), &mut rng);
        assert_eq!(action, BattleAction::Attack { target: UnitId("e_0".into()) });
    }

    #[test]
    fn moves_toward_distant_enemy() {
        let units = vec![
            BattleUnit::new(
                UnitId("p_0".into()),
                crate::types::TemplateId("t".into()),
                "P".into(),
                Team::Player,
                Faction::Human,
                stats(),
                UnitTags::empty(),
                Position::new(0, 0),
                Facing::S,
                None,
            ),
            BattleUnit::new(
                UnitId("e_0".into()),
                crate::types::TemplateId("t".into()),
                "E".into(),
                Team::Enemy,
                Faction::Human,
                stats(),
                UnitTags::empty(),
                Position::new(0, 5),
                Facing::N,
                None,
            ),
        ];
        let state = BattleState::new("b".into(), 1, units);
        let mut rng = crate::rng::RngStream::new(1);
        let action = NearestEnemyOracle.decide(&state, &UnitId("p_0".into()), &mut rng);
        assert_eq!(action, BattleAction::Move { to: Position::new(0, 1) });
    }
}
