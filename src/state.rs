//! [`BattleState`] — the full, immutably-updated battle snapshot, and
//! [`TeamSetup`] — the external roster input.
//!
//! Every mechanics processor and phase handler takes a `&BattleState` and
//! returns a freshly cloned, mutated `BattleState` (see DESIGN NOTES —
//! "Immutability policy"): the spec requires that a captured reference to
//! a pre-update state never observes a post-update mutation, which a clone
//! boundary gives for free without persistent data structures.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::events::{EventKind, EventLog, EventPayload};
use crate::types::{AbilityId, Phase, Position, TemplateId, UnitId};
use crate::unit::BattleUnit;

/// One roster entry: a template reference, tier, and deploy position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub template_id: TemplateId,
    pub tier: u8,
    pub position: Position,
}

/// External team-build input to [`crate::simulator::simulate_battle`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSetup {
    pub entries: Vec<RosterEntry>,
}

/// The full battle snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleState {
    pub battle_id: String,
    pub units: Vec<BattleUnit>,
    pub index_by_id: HashMap<UnitId, usize>,

    pub round: u32,
    pub turn: u32,
    pub phase: Phase,

    pub log: EventLog,
    pub occupancy: HashSet<Position>,

    pub seed: u32,

    /// Alive unit ids, ordered by (initiative desc, id asc). Rebuilt every
    /// round.
    pub turn_queue: Vec<UnitId>,
    pub current_turn_index: usize,

    /// Per-ability cooldowns, the extension map decided in DESIGN NOTES —
    /// "Open question — cooldown storage".
    pub cooldowns: HashMap<UnitId, HashMap<AbilityId, u8>>,
}

impl BattleState {
    pub fn new(battle_id: String, seed: u32, units: Vec<BattleUnit>) -> Self {
        let mut index_by_id = HashMap::with_capacity(units.len());
        let mut occupancy = HashSet::with_capacity(units.len());
        for (i, u) in units.iter().enumerate() {
            index_by_id.insert(u.id.clone(), i);
            if u.is_alive() {
                occupancy.insert(u.position);
            }
        }
        let mut state = Self {
            battle_id,
            units,
            index_by_id,
            round: 1,
            turn: 0,
            phase: Phase::TurnStart,
            log: EventLog::new(),
            occupancy,
            seed,
            turn_queue: Vec::new(),
            current_turn_index: 0,
            cooldowns: HashMap::new(),
        };
        state.rebuild_turn_queue();
        state
    }

    pub fn unit(&self, id: &UnitId) -> Option<&BattleUnit> {
        self.index_by_id.get(id).map(|&i| &self.units[i])
    }

    pub fn unit_mut(&mut self, id: &UnitId) -> Option<&mut BattleUnit> {
        if let Some(&i) = self.index_by_id.get(id) {
            Some(&mut self.units[i])
        } else {
            None
        }
    }

    pub fn unit_at(&self, pos: Position) -> Option<&BattleUnit> {
        self.units.iter().find(|u| u.is_alive() && u.position == pos)
    }

    pub fn alive_units(&self) -> impl Iterator<Item = &BattleUnit> {
        self.units.iter().filter(|u| u.is_alive())
    }

    pub fn alive_team(&self, team: crate::types::Team) -> impl Iterator<Item = &BattleUnit> {
        self.units.iter().filter(move |u| u.is_alive() && u.team == team)
    }

    pub fn team_has_survivors(&self, team: crate::types::Team) -> bool {
        self.alive_team(team).next().is_some()
    }

    /// Rebuild occupancy from the current unit positions (invariant 10).
    pub fn recompute_occupancy(&mut self) {
        self.occupancy = self.units.iter().filter(|u| u.is_alive()).map(|u| u.position).collect();
    }

    /// Rebuild the turn queue: alive units ordered by (initiative desc, id
    /// asc) (invariant 11).
    pub fn rebuild_turn_queue(&mut self) {
        let mut alive: Vec<&BattleUnit> = self.units.iter().filter(|u| u.is_alive()).collect();
        alive.sort_by(|a, b| {
            b.base
                .initiative
                .cmp(&a.base.initiative)
                .then_with(|| a.id.cmp(&b.id))
        });
        self.turn_queue = alive.into_iter().map(|u| u.id.clone()).collect();
        self.current_turn_index = 0;
    }

    pub fn current_unit_id(&self) -> Option<&UnitId> {
        self.turn_queue.get(self.current_turn_index)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn emit(
        &mut self,
        kind: EventKind,
        actor: Option<UnitId>,
        target: Option<UnitId>,
        payload: EventPayload,
    ) {
        let (round, turn, phase) = (self.round, self.turn, self.phase);
        self.log.emit(kind, round, turn, phase, actor, target, payload);
    }

    /// Ally ids (alive, excluding `id` itself) on the same team as `id`.
    pub fn allies_of(&self, id: &UnitId) -> Vec<UnitId> {
        let Some(u) = self.unit(id) else { return Vec::new() };
        let team = u.team;
        self.units
            .iter()
            .filter(|o| o.is_alive() && o.team == team && &o.id != id)
            .map(|o| o.id.clone())
            .collect()
    }

    /// Enemy ids (alive) relative to `id`'s team.
    pub fn enemies_of(&self, id: &UnitId) -> Vec<UnitId> {
        let Some(u) = self.unit(id) else { return Vec::new() };
        let enemy_team = u.team.opponent();
        self.alive_team(enemy_team).map(|o| o.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Facing, Faction, Team, UnitTags};
    use crate::unit::BaseStats;

    fn stats(initiative: i32) -> BaseStats {
        BaseStats {
            hp_max: 50,
            atk: 10,
            atk_count: 1,
            armor: 5,
            speed: 4,
            initiative,
            dodge: 0,
        }
    }

    fn unit(id: &str, initiative: i32, pos: Position) -> BattleUnit {
        BattleUnit::new(
            UnitId(id.into()),
            TemplateId("x".into()),
            id.into(),
            Team::Player,
            Faction::Human,
            stats(initiative),
            UnitTags::empty(),
            pos,
            Facing::S,
            None,
        )
    }

    #[test]
    fn turn_queue_orders_by_initiative_then_id() {
        let units = vec![
            unit("b", 5, Position::new(0, 0)),
            unit("a", 5, Position::new(1, 0)),
            unit("c", 9, Position::new(2, 0)),
        ];
        let state = BattleState::new("battle".into(), 1, units);
        assert_eq!(
            state.turn_queue,
            vec![UnitId("c".into()), UnitId("a".into()), UnitId("b".into())]
        );
    }

    #[test]
    fn occupancy_matches_alive_positions() {
        let mut units = vec![unit("a", 5, Position::new(0, 0)), unit("b", 5, Position::new(1, 0))];
        units[1].apply_damage(1000);
        let mut state = BattleState::new("battle".into(), 1, units);
        state.recompute_occupancy();
        assert!(state.occupancy.contains(&Position::new(0, 0)));
        assert!(!state.occupancy.contains(&Position::new(1, 0)));
    }
}
