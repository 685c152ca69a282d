//! The crate's single entry point: validate two rosters, build the
//! initial battle state, and run it to completion.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::ai::AiOracle;
use crate::config::MechanicsConfig;
use crate::error::ValidationError;
use crate::events::{BattleEvent, BattleOutcome};
use crate::scheduler;
use crate::state::{BattleState, TeamSetup};
use crate::templates::{AbilityTable, UnitTemplateTable};
use crate::types::{Team, UnitId, ENEMY_DEPLOY_ROWS, PLAYER_DEPLOY_ROWS, TEAM_COST_BUDGET};
use crate::unit::BattleUnit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleResult {
    pub battle_id: String,
    pub outcome: BattleOutcome,
    pub winner: Option<Team>,
    pub rounds: u32,
    pub events: Vec<BattleEvent>,
    pub player_survivors: Vec<UnitId>,
    pub enemy_survivors: Vec<UnitId>,
}

/// Validates and runs a full battle between `player` and `enemy`,
/// deterministically seeded by `seed`.
#[instrument(skip(player, enemy, templates, abilities, ai), fields(seed))]
#[allow(clippy::too_many_arguments)]
pub fn simulate_battle(
    battle_id: impl Into<String>,
    player: TeamSetup,
    enemy: TeamSetup,
    seed: u32,
    templates: &dyn UnitTemplateTable,
    abilities: &dyn AbilityTable,
    ai: &dyn AiOracle,
    cfg: &MechanicsConfig,
) -> Result<BattleResult, ValidationError> {
    let battle_id = battle_id.into();
    validate_setup(Team::Player, &player, templates, &PLAYER_DEPLOY_ROWS)?;
    validate_setup(Team::Enemy, &enemy, templates, &ENEMY_DEPLOY_ROWS)?;

    let mut units = Vec::new();
    build_units(Team::Player, &player, templates, &mut units);
    build_units(Team::Enemy, &enemy, templates, &mut units);
    info!(player = units.iter().filter(|u| u.team == Team::Player).count(), enemy = units.iter().filter(|u| u.team == Team::Enemy).count(), "battle initialized");

    let mut rng = crate::rng::RngStream::new(seed);
    let state = BattleState::new(battle_id.clone(), seed, units);
    let final_state = scheduler::run_battle(state, ai, abilities, cfg, &mut rng);

    let player_survivors = final_state.alive_team(Team::Player).map(|u| u.id.clone()).collect();
    let enemy_survivors = final_state.alive_team(Team::Enemy).map(|u| u.id.clone()).collect();
    let (outcome, winner) = outcome_of(&final_state);
    debug!(rounds = final_state.round, ?outcome, "battle finished");

    Ok(BattleResult {
        battle_id,
        outcome,
        winner,
        rounds: final_state.round.saturating_sub(1).max(1),
        events: final_state.log.into_events(),
        player_survivors,
        enemy_survivors,
    })
}

fn outcome_of(state: &BattleState) -> (BattleOutcome, Option<Team>) {
    let player_alive = state.team_has_survivors(Team::Player);
    let enemy_alive = state.team_has_survivors(Team::Enemy);
    match (player_alive, enemy_alive) {
        (true, false) => (BattleOutcome::Win, Some(Team::Player)),
        (false, true) => (BattleOutcome::Loss, Some(Team::Enemy)),
        _ => (BattleOutcome::Draw, None),
    }
}

fn validate_setup(
    team: Team,
    setup: &TeamSetup,
    templates: &dyn UnitTemplateTable,
    deploy_rows: &[u8; 2],
) -> Result<(), ValidationError> {
    if setup.entries.is_empty() {
        return Err(ValidationError::EmptyRoster { team });
    }

    let mut total_cost = 0u32;
    let mut seen = HashSet::new();
    for entry in &setup.entries {
        let template = templates
            .get(&entry.template_id, entry.tier)
            .ok_or_else(|| ValidationError::UnknownTemplate { template_id: entry.template_id.0.clone() })?;
        total_cost += template.cost;

        if !entry.position.in_bounds() {
            return Err(ValidationError::PositionOutOfBounds { team, pos: entry.position });
        }
        if !deploy_rows.contains(&entry.position.y) {
            return Err(ValidationError::PositionOutsideDeployZone { team, pos: entry.position });
        }
        if !seen.insert(entry.position) {
            return Err(ValidationError::PositionCollision { pos: entry.position });
        }
    }

    if total_cost > TEAM_COST_BUDGET {
        return Err(ValidationError::CostBudgetExceeded { team, total: total_cost, budget: TEAM_COST_BUDGET });
    }

    Ok(())
}

fn build_units(team: Team, setup: &TeamSetup, templates: &dyn UnitTemplateTable, out: &mut Vec<BattleUnit>) {
    let default_facing = match team {
        Team::Player => crate::types::Facing::S,
        Team::Enemy => crate::types::Facing::N,
    };

    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for entry in &setup.entries {
        let template = templates.get(&entry.template_id, entry.tier).expect("validated above");
        let index = counts.entry(entry.template_id.0.clone()).or_insert(0);
        let team_tag = match team {
            Team::Player => "p",
            Team::Enemy => "e",
        };
        let id = UnitId(format!("{team_tag}_{}_{index}", entry.template_id.0));
        *index += 1;

        out.push(BattleUnit::new(
            id,
            entry.template_id.clone(),
            template.display_name.clone(),
            team,
            template.faction,
            template.base,
            template.tags,
            entry.position,
            default_facing,
            template.max_ammo,
        ));
    }
}
