//! Round loop and battle-end detection, composing the seven phases for
//! each unit's turn in fixed order (4.4).

use crate::ai::AiOracle;
use crate::config::MechanicsConfig;
use crate::events::{BattleOutcome, EventKind, EventPayload};
use crate::phases;
use crate::rng::RngStream;
use crate::state::BattleState;
use crate::templates::AbilityTable;
use crate::types::{Team, MAX_ROUNDS};

/// Runs whole rounds until one side has no survivors or the round cap is
/// hit, returning the final state.
pub fn run_battle(
    mut state: BattleState,
    ai: &dyn AiOracle,
    abilities: &dyn AbilityTable,
    cfg: &MechanicsConfig,
    rng: &mut RngStream,
) -> BattleState {
    state.emit(
        EventKind::BattleStart,
        None,
        None,
        EventPayload::BattleStart {
            player_unit_count: state.alive_team(Team::Player).count(),
            enemy_unit_count: state.alive_team(Team::Enemy).count(),
        },
    );

    loop {
        if battle_is_over(&state) {
            break;
        }
        if state.round > MAX_ROUNDS {
            state.emit(
                EventKind::Diagnostic,
                None,
                None,
                EventPayload::Diagnostic {
                    kind: crate::events::DiagnosticKind::MaxRoundsExceeded,
                    detail: format!("battle forced to a draw after {MAX_ROUNDS} rounds"),
                },
            );
            break;
        }

        state.rebuild_turn_queue();
        state.emit(EventKind::RoundStart, None, None, EventPayload::RoundStart);

        while state.current_turn_index < state.turn_queue.len() {
            if battle_is_over(&state) {
                break;
            }
            state = run_turn(&state, ai, abilities, cfg, rng);
        }

        state.emit(EventKind::RoundEnd, None, None, EventPayload::RoundEnd);
        state.round += 1;
    }

    let (outcome, winner) = final_outcome(&state);
    state.emit(EventKind::BattleEnd, None, None, EventPayload::BattleEnd { outcome, winner });
    state
}

fn run_turn(
    state: &BattleState,
    ai: &dyn AiOracle,
    abilities: &dyn AbilityTable,
    cfg: &MechanicsConfig,
    rng: &mut RngStream,
) -> BattleState {
    let Some(actor) = state.current_unit_id().cloned() else {
        let mut s = state.clone();
        s.current_turn_index += 1;
        return s;
    };
    if state.unit(&actor).map(|u| !u.is_alive()).unwrap_or(true) {
        let mut s = state.clone();
        s.current_turn_index += 1;
        return s;
    }

    let mut s = phases::turn_start(state, cfg);
    let action = phases::ai_decision(&s, ai, rng);
    s = phases::movement(&s, &action, cfg);
    s = phases::pre_attack(&s);
    s = phases::attack_phase(&s, &action, cfg, rng);
    s = phases::post_attack(&s, cfg);
    s = phases::turn_end(&s, cfg, abilities, rng);
    s
}

pub fn battle_is_over(state: &BattleState) -> bool {
    !state.team_has_survivors(Team::Player) || !state.team_has_survivors(Team::Enemy)
}

fn final_outcome(state: &BattleState) -> (BattleOutcome, Option<Team>) {
    let player_alive = state.team_has_survivors(Team::Player);
    let enemy_alive = state.team_has_survivors(Team::Enemy);
    match (player_alive, enemy_alive) {
        (true, false) => (BattleOutcome::Win, Some(Team::Player)),
        (false, true) => (BattleOutcome::Loss, Some(Team::Enemy)),
        _ => (BattleOutcome::Draw, None),
    }
}
