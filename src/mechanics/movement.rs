//! Straight-line orthogonal pathing, truncated at a unit's speed, with
//! intercept checks along the way (4.3.3, 4.3.10, 4.4 movement phase).

use crate::config::MechanicsConfig;
use crate::state::BattleState;
use crate::types::Position;

use super::engagement::{check_intercept, InterceptKind};

/// One orthogonal step at a time from `from` toward `to`, greedily closing
/// the larger axis first (matches `AiOracle`'s tie-break), truncated to at
/// most `speed` cells and stopping short of any occupied cell.
pub fn plan_path(from: Position, to: Position, speed: u32, occupied: &std::collections::HashSet<Position>) -> Vec<Position> {
    let mut path = Vec::new();
    let mut cur = from;
    for _ in 0..speed {
        if cur == to {
            break;
        }
        let dx = (to.x as i32 - cur.x as i32).signum();
        let dy = (to.y as i32 - cur.y as i32).signum();
        let (step_dx, step_dy) = if dx != 0 && dy != 0 {
            if (to.x as i32 - cur.x as i32).abs() >= (to.y as i32 - cur.y as i32).abs() {
                (dx, 0)
            } else {
                (0, dy)
            }
        } else {
            (dx, dy)
        };
        if step_dx == 0 && step_dy == 0 {
            break;
        }
        let next = Position::new(
            (cur.x as i32 + step_dx).clamp(0, crate::types::GRID_WIDTH as i32 - 1) as u8,
            (cur.y as i32 + step_dy).clamp(0, crate::types::GRID_HEIGHT as i32 - 1) as u8,
        );
        if occupied.contains(&next) {
            break;
        }
        path.push(next);
        cur = next;
    }
    path
}

/// Result of executing a planned move: the final cell reached, the
/// distance actually traveled, and an intercept if one was triggered along
/// the way. Only a hard intercept changes `destination`/`distance`; a soft
/// intercept is reported but the move still runs to its planned end.
pub struct MoveOutcome {
    pub destination: Position,
    pub distance: i32,
    pub intercept: Option<(Position, crate::types::UnitId, InterceptKind)>,
}

pub fn execute_move(
    state: &BattleState,
    mover: &crate::types::UnitId,
    planned: &[Position],
    cfg: &MechanicsConfig,
) -> MoveOutcome {
    let origin = state.unit(mover).map(|u| u.position);
    let hit = check_intercept(state, mover, planned, cfg);
    if let Some((cell, ref interceptor, InterceptKind::Hard)) = hit {
        let idx = planned.iter().position(|p| *p == cell).unwrap_or(0);
        let destination = if idx == 0 { origin.unwrap_or(cell) } else { planned[idx - 1] };
        let distance = origin.map(|o| o.manhattan(destination)).unwrap_or(0);
        return MoveOutcome { destination, distance, intercept: Some((cell, interceptor.clone(), InterceptKind::Hard)) };
    }
    // A soft intercept only flags engagement; it never truncates the move.
    let destination = planned.last().copied().unwrap_or_else(|| origin.unwrap());
    let distance = origin.map(|o| o.manhattan(destination)).unwrap_or(0);
    MoveOutcome { destination, distance, intercept: hit }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_truncated_at_speed() {
        let occ = std::collections::HashSet::new();
        let path = plan_path(Position::new(0, 0), Position::new(0, 5), 3, &occ);
        assert_eq!(path, vec![Position::new(0, 1), Position::new(0, 2), Position::new(0, 3)]);
    }

    #[test]
    fn path_stops_before_occupied_cell() {
        let mut occ = std::collections::HashSet::new();
        occ.insert(Position::new(0, 2));
        let path = plan_path(Position::new(0, 0), Position::new(0, 5), 4, &occ);
        assert_eq!(path, vec![Position::new(0, 1)]);
    }
}
