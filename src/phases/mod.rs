//! The seven fixed turn phases, composed in pipeline order by
//! [`crate::scheduler::run_battle`]. Each phase function takes a
//! `&BattleState` and a `&mut RngStream` and returns a freshly cloned,
//! mutated state — mirroring the teacher's `execute_turn` pipeline
//! (`core/src/battle/pipeline.rs`) but replacing its in-place `&mut
//! BattleContext` threading with the clone-then-mutate discipline this
//! crate uses everywhere (DESIGN NOTES — "Immutability policy").

use crate::ai::{AiOracle, BattleAction};
use crate::config::MechanicsConfig;
use crate::events::{
    DamageSource, DeathCause, DiagnosticKind, EventKind, EventPayload, InterceptKind as EvInterceptKind, ResolveSource,
};
use crate::mechanics::{attack, contagion, engagement, los, movement, phalanx, resolve, riposte};
use crate::rng::RngStream;
use crate::state::BattleState;
use crate::templates::AbilityTable;
use crate::types::{Arc, Facing, Phase, Position, Team, UnitId, UnitTags};

/// `turn_start`: phalanx membership refresh, then (per unit) the
/// rout/crumble state machine check, then resolve regeneration.
pub fn turn_start(state: &BattleState, cfg: &MechanicsConfig) -> BattleState {
    let mut next = state.clone();
    next.phase = Phase::TurnStart;

    refresh_phalanx(&mut next);

    let Some(actor) = next.current_unit_id().cloned() else { return next };
    if next.unit(&actor).map(|u| !u.is_alive()).unwrap_or(true) {
        return next;
    }

    // Crumble/rout/rally is checked against resolve carried over from the
    // previous turn, before this turn's regeneration.
    if check_rout_transition(&mut next, &actor, cfg) {
        // The unit crumbled this turn_start; nothing further to do for it.
        next.emit(EventKind::TurnStart, Some(actor), None, EventPayload::TurnStart);
        return next;
    }

    if let Some(unit) = next.unit_mut(&actor) {
        unit.riposte_charges = riposte::reset_charges();
        unit.charge_countered = false;
        if !unit.is_routing {
            let in_phalanx = unit.in_phalanx;
            let delta = resolve::regen_amount(in_phalanx, cfg);
            unit.add_resolve(delta);
            let new_value = unit.resolve;
            next.emit(
                EventKind::ResolveChanged,
                Some(actor.clone()),
                None,
                EventPayload::ResolveChanged { delta, new_value, source: ResolveSource::Regeneration },
            );
        }
    }
    next.emit(EventKind::TurnStart, Some(actor), None, EventPayload::TurnStart);
    next
}

fn refresh_phalanx(state: &mut BattleState) {
    let membership = phalanx::recompute_all(state);
    for (id, in_phalanx) in membership {
        if let Some(u) = state.unit_mut(&id) {
            u.in_phalanx = in_phalanx;
        }
    }
}

/// Applies the rout/crumble/rally state machine to `actor`. Returns `true`
/// if the unit crumbled (died) this call.
fn check_rout_transition(state: &mut BattleState, actor: &UnitId, cfg: &MechanicsConfig) -> bool {
    let Some(unit) = state.unit(actor) else { return false };
    if unit.resolve <= crate::types::ROUT_THRESHOLD && unit.faction == crate::types::Faction::Undead {
        if let Some(u) = state.unit_mut(actor) {
            u.current_hp = 0;
        }
        kill_and_propagate(state, actor, DeathCause::Crumble, cfg);
        return true;
    }

    let transition = state.unit_mut(actor).map(resolve::apply_transition).unwrap_or(resolve::RoutTransition::None);
    match transition {
        resolve::RoutTransition::StartedRouting => {
            state.emit(EventKind::RoutingStarted, Some(actor.clone()), None, EventPayload::RoutingStarted);
        }
        resolve::RoutTransition::Rallied => {
            state.emit(EventKind::UnitRallied, Some(actor.clone()), None, EventPayload::UnitRallied);
        }
        resolve::RoutTransition::None => {}
    }
    false
}

/// Emits `unit_died` for `dead_id` and applies ally-death resolve fallout
/// to nearby living allies (4.3.7). Shared by combat deaths
/// (`post_attack`) and crumble (`turn_start`).
fn kill_and_propagate(state: &mut BattleState, dead_id: &UnitId, cause: DeathCause, cfg: &MechanicsConfig) {
    let Some(dead_pos) = state.unit(dead_id).map(|u| u.position) else { return };
    let allies = state.allies_of(dead_id);
    for ally_id in allies {
        let Some(ally) = state.unit(&ally_id) else { continue };
        let dist = ally.position.manhattan(dead_pos);
        let (delta, source) = if dist == 1 {
            (cfg.resolve_ally_death_adjacent, ResolveSource::AllyDeathAdjacent)
        } else if dist <= cfg.resolve_ally_death_nearby_range {
            (cfg.resolve_ally_death_nearby, ResolveSource::AllyDeathNearby)
        } else {
            continue;
        };
        if let Some(u) = state.unit_mut(&ally_id) {
            u.add_resolve(delta);
        }
        let new_value = state.unit(&ally_id).map(|u| u.resolve).unwrap_or(0);
        state.emit(
            EventKind::ResolveChanged,
            Some(ally_id),
            None,
            EventPayload::ResolveChanged { delta, new_value, source },
        );
    }
    state.emit(EventKind::UnitDied, Some(dead_id.clone()), None, EventPayload::UnitDied { cause });
    state.recompute_occupancy();
}

/// `ai_decision`: asks the oracle what the acting unit does this turn.
/// Routing units never act — they flee toward their own deploy zone
/// instead.
pub fn ai_decision(state: &BattleState, ai: &dyn AiOracle, rng: &mut RngStream) -> BattleAction {
    let mut s = state.clone();
    s.phase = Phase::AiDecision;
    let Some(actor) = s.current_unit_id().cloned() else { return BattleAction::Skip };
    let Some(unit) = s.unit(&actor) else { return BattleAction::Skip };
    if !unit.is_alive() {
        return BattleAction::Skip;
    }
    if unit.is_routing {
        return flee_action(&s, &actor);
    }
    ai.decide(&s, &actor, rng)
}

fn flee_action(state: &BattleState, actor: &UnitId) -> BattleAction {
    let Some(unit) = state.unit(actor) else { return BattleAction::Skip };
    let home_row = match unit.team {
        Team::Player => crate::types::PLAYER_DEPLOY_ROWS[0],
        Team::Enemy => crate::types::ENEMY_DEPLOY_ROWS[0],
    };
    let to = Position::new(unit.position.x, home_row);
    BattleAction::Move { to }
}

/// `movement`: executes a planned move (or flee path), applying intercept
/// checks (4.3.10, 4.3.11).
pub fn movement(state: &BattleState, action: &BattleAction, cfg: &MechanicsConfig) -> BattleState {
    let mut next = state.clone();
    next.phase = Phase::Movement;
    let Some(actor) = next.current_unit_id().cloned() else { return next };
    let BattleAction::Move { to } = action else { return next };
    if next.unit(&actor).map(|u| !u.is_alive()).unwrap_or(true) {
        return next;
    }

    let (from, speed, is_cavalry) = match next.unit(&actor) {
        Some(u) => (u.position, u.base.speed, u.tags.contains(UnitTags::CAVALRY)),
        None => return next,
    };
    let planned = movement::plan_path(from, *to, speed, &next.occupancy);
    if planned.is_empty() {
        return next;
    }
    let outcome = movement::execute_move(&next, &actor, &planned, cfg);

    if let Some(unit) = next.unit_mut(&actor) {
        unit.position = outcome.destination;
        unit.momentum = if is_cavalry { movement_cavalry_momentum(outcome.distance, cfg) } else { 0.0 };
    }
    next.recompute_occupancy();
    next.emit(
        EventKind::Move,
        Some(actor.clone()),
        None,
        EventPayload::Move { from, to: outcome.destination },
    );

    if let Some((_, interceptor, kind)) = outcome.intercept {
        match kind {
            engagement::InterceptKind::Hard => {
                // Hard intercept resolves exactly like the spear-wall
                // counter: the intercepting spearman strikes first.
                let spearman_atk = next.unit(&interceptor).map(|u| u.base.atk).unwrap_or(0);
                let damage = crate::mechanics::charge::spear_wall_counter_damage(spearman_atk, cfg);
                if let Some(mover) = next.unit_mut(&actor) {
                    mover.apply_damage(damage);
                    mover.momentum = 0.0;
                    mover.charge_countered = true;
                }
                next.emit(
                    EventKind::InterceptTriggered,
                    Some(interceptor),
                    Some(actor.clone()),
                    EventPayload::InterceptTriggered { kind: EvInterceptKind::Hard, damage },
                );
                let died = next.unit(&actor).map(|u| !u.is_alive()).unwrap_or(false);
                if died {
                    kill_and_propagate(&mut next, &actor, DeathCause::ChargeCounter, cfg);
                }
            }
            engagement::InterceptKind::Soft => {
                // Soft intercept: engagement only, no damage; the move
                // already ran to its planned destination unchanged.
                if let Some(mover) = next.unit_mut(&actor) {
                    mover.engaged = true;
                }
                next.emit(
                    EventKind::EngagementChanged,
                    Some(actor.clone()),
                    None,
                    EventPayload::EngagementChanged { engaged: true },
                );
            }
        }
    }
    next
}

fn movement_cavalry_momentum(distance: i32, cfg: &MechanicsConfig) -> f64 {
    crate::mechanics::charge::momentum_gain(distance, cfg)
}

/// `pre_attack`: updates engagement flags for everyone now that movement
/// has settled. Ability targeting/cover resolution is out of scope here;
/// the core only needs the hook point.
pub fn pre_attack(state: &BattleState) -> BattleState {
    let mut next = state.clone();
    next.phase = Phase::PreAttack;
    let ids: Vec<UnitId> = next.alive_units().map(|u| u.id.clone()).collect();
    for id in ids {
        let engaged = engagement::is_engaged(&next, &id);
        if let Some(u) = next.unit_mut(&id) {
            if u.engaged != engaged {
                u.engaged = engaged;
                next.emit(EventKind::EngagementChanged, Some(id.clone()), None, EventPayload::EngagementChanged { engaged });
            }
        }
    }
    next
}

/// `attack`: rotate facing, compute arc, apply flank/rear modifiers,
/// resolve the spear-wall counter, check ammo/range/LoS, roll dodge,
/// apply damage, resolve riposte, consume ammo — in that fixed order
/// (4.3, 4.4).
pub fn attack_phase(state: &BattleState, action: &BattleAction, cfg: &MechanicsConfig, rng: &mut RngStream) -> BattleState {
    let mut next = state.clone();
    next.phase = Phase::Attack;
    let Some(actor) = next.current_unit_id().cloned() else { return next };
    let BattleAction::Attack { target } = action else { return next };
    if next.unit(&actor).map(|u| !u.is_alive()).unwrap_or(true) || next.unit(target).map(|u| !u.is_alive()).unwrap_or(true) {
        return next;
    }

    // 1. rotate facing
    let (attacker_pos, defender_pos, old_facing) = {
        let a = next.unit(&actor).unwrap();
        let d = next.unit(target).unwrap();
        (a.position, d.position, a.facing)
    };
    let new_facing = Facing::toward(attacker_pos, defender_pos);
    if new_facing != old_facing {
        if let Some(a) = next.unit_mut(&actor) {
            a.facing = new_facing;
        }
        next.emit(
            EventKind::FacingRotated,
            Some(actor.clone()),
            None,
            EventPayload::FacingRotated { from: old_facing, to: new_facing },
        );
    }

    // 2. compute arc, 3. flank/rear modifiers
    let defender_facing = next.unit(target).unwrap().facing;
    let arc = crate::mechanics::facing::attack_arc(defender_facing, defender_pos, attacker_pos);
    next.emit(
        EventKind::FlankingApplied,
        Some(actor.clone()),
        Some(target.clone()),
        EventPayload::FlankingApplied { arc, damage_mult: crate::mechanics::facing::damage_multiplier(arc, cfg) },
    );
    let resolve_delta = crate::mechanics::facing::resolve_delta(arc, cfg);
    if resolve_delta != 0 {
        if let Some(d) = next.unit_mut(target) {
            d.add_resolve(resolve_delta);
        }
        let new_value = next.unit(target).unwrap().resolve;
        let source = if arc == Arc::Rear { ResolveSource::RearHit } else { ResolveSource::FlankHit };
        next.emit(
            EventKind::ResolveChanged,
            Some(target.clone()),
            None,
            EventPayload::ResolveChanged { delta: resolve_delta, new_value, source },
        );
    }

    // 4. spear-wall counter
    let momentum = next.unit(&actor).unwrap().momentum;
    if momentum > 0.0 {
        let defender = next.unit(target).unwrap();
        let facing_incoming = defender.facing == Facing::toward(defender_pos, attacker_pos);
        if defender.tags.contains(UnitTags::SPEARMAN) && facing_incoming {
            let counter_damage = crate::mechanics::charge::spear_wall_counter_damage(defender.base.atk, cfg);
            if let Some(a) = next.unit_mut(&actor) {
                a.apply_damage(counter_damage);
                a.momentum = 0.0;
                a.charge_countered = true;
            }
            let remaining_hp = next.unit(&actor).unwrap().current_hp;
            next.emit(
                EventKind::InterceptTriggered,
                Some(target.clone()),
                Some(actor.clone()),
                EventPayload::InterceptTriggered { kind: EvInterceptKind::Hard, damage: counter_damage },
            );
            next.emit(
                EventKind::Damage,
                Some(target.clone()),
                Some(actor.clone()),
                EventPayload::Damage { amount: counter_damage, source: DamageSource::ChargeCounter, remaining_hp },
            );
            if remaining_hp <= 0 {
                kill_and_propagate(&mut next, &actor, DeathCause::ChargeCounter, cfg);
                return next;
            }
        } else {
            let bonus = crate::mechanics::charge::bonus_damage(next.unit(&actor).unwrap().base.atk, momentum);
            next.emit(
                EventKind::ChargeImpact,
                Some(actor.clone()),
                Some(target.clone()),
                EventPayload::ChargeImpact { bonus_damage: bonus },
            );
        }
    }
    let momentum = next.unit(&actor).map(|u| u.momentum).unwrap_or(0.0);

    // 5. ammo / range / LoS check
    let attacker = next.unit(&actor).unwrap();
    let is_ranged = attacker.is_ranged();
    let is_out_of_ammo = crate::mechanics::ammo::is_out_of_ammo(attacker.ammo);
    let in_melee_range = attacker.position.is_orthogonally_adjacent(defender_pos);

    if is_ranged && is_out_of_ammo && !in_melee_range {
        next.emit(
            EventKind::Diagnostic,
            Some(actor),
            Some(target.clone()),
            EventPayload::Diagnostic { kind: DiagnosticKind::MechanicDeclined, detail: "out of ammo and out of melee range".into() },
        );
        return next;
    }

    let melee_fallback = is_ranged && is_out_of_ammo;
    let (range, fire_mode) = if is_ranged && !melee_fallback {
        let fm = los::fire_mode(
            attacker_pos,
            defender_pos,
            attacker.tags.contains(UnitTags::IGNORE_LOS),
            attacker.tags.contains(UnitTags::ARC_FIRE),
            attacker.tags.contains(UnitTags::SIEGE),
            &next.occupancy,
            cfg,
        );
        (attacker_pos.chebyshev(defender_pos), fm)
    } else {
        (attacker_pos.chebyshev(defender_pos), los::FireMode::Direct)
    };

    if fire_mode == los::FireMode::NoShot {
        let detail = if attacker.tags.contains(UnitTags::SIEGE) || attacker.tags.contains(UnitTags::ARC_FIRE) {
            "arc_fire_too_close"
        } else {
            "blocked"
        };
        next.emit(
            EventKind::Diagnostic,
            Some(actor.clone()),
            Some(target.clone()),
            EventPayload::Diagnostic { kind: DiagnosticKind::MechanicDeclined, detail: detail.into() },
        );
        return next;
    }

    // 6. damage calc, 7. dodge roll
    let accuracy_penalty = if fire_mode == los::FireMode::Arc { crate::mechanics::los::arc_fire_penalty(cfg) } else { 0.0 };
    let defender_dodge = next.unit(target).unwrap().base.dodge;
    let mut d_chance = attack::dodge_chance(defender_dodge, attacker_pos, defender_pos, &next.occupancy, is_ranged, cfg);
    d_chance = (d_chance + accuracy_penalty).min(cfg.dodge_cap / 100.0);
    let dodge_roll = rng.next_f64();
    let dodged = dodge_roll < d_chance;

    next.emit(
        EventKind::Attack,
        Some(actor.clone()),
        Some(target.clone()),
        EventPayload::Attack { move_range: range },
    );

    if dodged {
        next.emit(
            EventKind::Dodge,
            Some(target.clone()),
            Some(actor.clone()),
            EventPayload::Dodge { chance: d_chance },
        );
        finish_ammo(&mut next, &actor, is_ranged, melee_fallback);
        return next;
    }

    // 8. apply damage
    let atk = next.unit(&actor).unwrap().base.atk;
    let effective_armor = next.unit(target).unwrap().effective_armor();
    let mut damage = attack::compute_damage(atk, momentum, arc, effective_armor, cfg);
    if melee_fallback {
        damage = ((damage as f64) * cfg.melee_fallback_damage_fraction).floor() as u32;
    }
    if let Some(d) = next.unit_mut(target) {
        d.apply_damage(damage);
        attack::apply_shred_on_hit(d, cfg);
    }
    let remaining_hp = next.unit(target).unwrap().current_hp;
    next.emit(
        EventKind::Damage,
        Some(actor.clone()),
        Some(target.clone()),
        EventPayload::Damage { amount: damage, source: DamageSource::Attack, remaining_hp },
    );
    if remaining_hp <= 0 {
        kill_and_propagate(&mut next, target, DeathCause::Combat, cfg);
        finish_ammo(&mut next, &actor, is_ranged, melee_fallback);
        return next;
    }

    // 9. riposte (front arc only, melee only)
    if arc == Arc::Front && in_melee_range && !is_ranged {
        let defender = next.unit(target).unwrap();
        let (triggered, roll, chance) =
            riposte::roll(defender.riposte_charges, defender.base.initiative, next.unit(&actor).unwrap().base.initiative, rng);
        if triggered {
            if let Some(d) = next.unit_mut(target) {
                d.riposte_charges = d.riposte_charges.saturating_sub(1);
            }
            let charges_remaining = next.unit(target).unwrap().riposte_charges;
            next.emit(
                EventKind::RiposteTriggered,
                Some(target.clone()),
                Some(actor.clone()),
                EventPayload::RiposteTriggered {
                    roll: crate::events::RollOutcome { chance, roll, success: true },
                    charges_remaining,
                },
            );
            let attacker_effective_armor = next.unit(&actor).unwrap().effective_armor();
            let riposte_damage = riposte::damage(next.unit(target).unwrap().base.atk, attacker_effective_armor);
            if let Some(a) = next.unit_mut(&actor) {
                a.apply_damage(riposte_damage);
            }
            let remaining_hp = next.unit(&actor).unwrap().current_hp;
            next.emit(
                EventKind::Damage,
                Some(target.clone()),
                Some(actor.clone()),
                EventPayload::Damage { amount: riposte_damage, source: DamageSource::Riposte, remaining_hp },
            );
            if remaining_hp <= 0 {
                kill_and_propagate(&mut next, &actor, DeathCause::Riposte, cfg);
            }
        }
    }

    finish_ammo(&mut next, &actor, is_ranged, melee_fallback);
    next
}

fn finish_ammo(state: &mut BattleState, actor: &UnitId, is_ranged: bool, melee_fallback: bool) {
    if !is_ranged || melee_fallback {
        return;
    }
    if state.unit(actor).map(|u| !u.is_alive()).unwrap_or(true) {
        return;
    }
    let ammo = state.unit(actor).and_then(|u| u.ammo);
    let remaining = crate::mechanics::ammo::consume(ammo);
    if let Some(u) = state.unit_mut(actor) {
        u.ammo = remaining;
    }
    state.emit(EventKind::AmmoConsumed, Some(actor.clone()), None, EventPayload::AmmoConsumed { remaining });
}

/// `post_attack`: reserved for status tick-down hooks; also where a
/// `riposte_reset` marker would land if charges changed outside a unit's
/// own turn. Rout/rally transitions for units other than the acting one
/// (e.g. from ally deaths this turn) are swept here.
pub fn post_attack(state: &BattleState, cfg: &MechanicsConfig) -> BattleState {
    let mut next = state.clone();
    next.phase = Phase::PostAttack;

    let ids: Vec<UnitId> = next.alive_units().map(|u| u.id.clone()).collect();
    for id in ids {
        check_rout_transition(&mut next, &id, cfg);
    }
    next.recompute_occupancy();
    next
}

/// `turn_end`: contagion spread, armor-shred decay, ability-cooldown
/// tick, then advance the turn index.
pub fn turn_end(state: &BattleState, cfg: &MechanicsConfig, abilities: &dyn AbilityTable, rng: &mut RngStream) -> BattleState {
    let mut next = state.clone();
    next.phase = Phase::TurnEnd;
    let Some(actor) = next.current_unit_id().cloned() else { return next };

    if next.unit(&actor).map(|u| u.is_alive()).unwrap_or(false) {
        spread_contagion(&mut next, &actor, cfg, rng);
        if let Some(unit) = next.unit_mut(&actor) {
            contagion::tick_durations(&mut unit.statuses);
        }

        let shred_result = {
            let unit = next.unit_mut(&actor).unwrap();
            if unit.faction != crate::types::Faction::Undead {
                let removed = crate::mechanics::shred::decay(unit, cfg);
                (removed, unit.armor_shred)
            } else {
                (0, unit.armor_shred)
            }
        };
        if shred_result.0 > 0 {
            next.emit(
                EventKind::ShredDecayed,
                Some(actor.clone()),
                None,
                EventPayload::ShredDecayed { amount: shred_result.0, new_value: shred_result.1 },
            );
        }

        if let Some(cooldowns) = next.cooldowns.get(&actor).cloned() {
            let mut updated = std::collections::HashMap::new();
            for (ability_id, remaining) in cooldowns {
                let next_remaining = remaining.saturating_sub(1);
                if next_remaining > 0 {
                    updated.insert(ability_id.clone(), next_remaining);
                    next.emit(
                        EventKind::CooldownTicked,
                        Some(actor.clone()),
                        None,
                        EventPayload::CooldownTicked { ability: ability_id, remaining: next_remaining },
                    );
                }
            }
            next.cooldowns.insert(actor.clone(), updated);
        }
    }
    let _ = abilities;

    next.emit(EventKind::TurnEnd, Some(actor), None, EventPayload::TurnEnd);
    next.turn += 1;
    next.current_turn_index += 1;
    next
}

fn spread_contagion(state: &mut BattleState, actor: &UnitId, cfg: &MechanicsConfig, rng: &mut RngStream) {
    let Some(unit) = state.unit(actor) else { return };
    let statuses = unit.statuses.clone();
    let team = unit.team;
    let neighbors = unit.position.orthogonal_neighbors();
    for status in statuses {
        for pos in &neighbors {
            let Some(target_id) = state.unit_at(*pos).map(|u| u.id.clone()) else { continue };
            let Some(target) = state.unit(&target_id) else { continue };
            if target.team != team || target.statuses.iter().any(|s| s.kind == status.kind) {
                continue;
            }
            let target_in_phalanx = target.in_phalanx;
            let (spread, roll) = contagion::roll_spread(status.kind, target_in_phalanx, cfg, rng);
            if spread {
                let duration = status.duration.saturating_sub(1).max(1);
                if let Some(t) = state.unit_mut(&target_id) {
                    contagion::apply_or_refresh(&mut t.statuses, crate::types::StatusEffect { kind: status.kind, duration });
                }
                state.emit(
                    EventKind::ContagionSpread,
                    Some(actor.clone()),
                    Some(target_id),
                    EventPayload::ContagionSpread {
                        status: status.kind,
                        duration,
                        roll: crate::events::RollOutcome {
                            chance: contagion::spread_chance(status.kind, target_in_phalanx, cfg),
                            roll,
                            success: true,
                        },
                    },
                );
            }
        }
    }
}
