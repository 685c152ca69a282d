//! Phalanx formation detection (4.3.9): a unit is in phalanx while at
//! least 2 living allies are orthogonally adjacent to it. Recomputed at
//! `turn_start` and whenever an adjacent unit dies or moves. Feeds the
//! resolve regen bonus and the contagion bonus.

use std::collections::HashMap;

use crate::state::BattleState;
use crate::types::{Team, UnitId};

pub fn is_in_phalanx(state: &BattleState, unit_id: &UnitId) -> bool {
    let Some(unit) = state.unit(unit_id) else { return false };
    let adjacent_allies = unit
        .position
        .orthogonal_neighbors()
        .iter()
        .filter(|pos| state.unit_at(**pos).map(|other| other.team == unit.team).unwrap_or(false))
        .count();
    adjacent_allies >= 2
}

/// Recomputes `in_phalanx` for every living unit, keyed by id, without
/// mutating `state` (callers apply the result in their own clone).
pub fn recompute_all(state: &BattleState) -> HashMap<UnitId, bool> {
    state
        .alive_units()
        .map(|u| (u.id.clone(), is_in_phalanx(state, &u.id)))
        .collect()
}

pub fn phalanx_team_count(state: &BattleState, team: Team) -> usize {
    state.alive_team(team).filter(|u| is_in_phalanx(state, &u.id)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Facing, Faction, Position, TemplateId, UnitTags};
    use crate::unit::{BaseStats, BattleUnit};

    fn unit(id: &str, team: Team, pos: Position) -> BattleUnit {
        BattleUnit::new(
            UnitId(id.into()),
            TemplateId("t".into()),
            id.into(),
            team,
            Faction::Human,
            BaseStats { hp_max: 10, atk: 1, atk_count: 1, armor: 0, speed: 1, initiative: 1, dodge: 0 },
            UnitTags::empty(),
            pos,
            Facing::S,
            None,
        )
    }

    #[test]
    fn needs_two_adjacent_allies() {
        let units = vec![
            unit("a", Team::Player, Position::new(1, 1)),
            unit("b", Team::Player, Position::new(0, 1)),
        ];
        let state = BattleState::new("b".into(), 1, units);
        assert!(!is_in_phalanx(&state, &UnitId("a".into())));

        let units = vec![
            unit("a", Team::Player, Position::new(1, 1)),
            unit("b", Team::Player, Position::new(0, 1)),
            unit("c", Team::Player, Position::new(1, 0)),
        ];
        let state = BattleState::new("b".into(), 1, units);
        assert!(is_in_phalanx(&state, &UnitId("a".into())));
    }

    #[test]
    fn enemies_do_not_count() {
        let units = vec![
            unit("a", Team::Player, Position::new(1, 1)),
            unit("b", Team::Enemy, Position::new(0, 1)),
            unit("c", Team::Enemy, Position::new(1, 0)),
        ];
        let state = BattleState::new("b".into(), 1, units);
        assert!(!is_in_phalanx(&state, &UnitId("a".into())));
    }
}
