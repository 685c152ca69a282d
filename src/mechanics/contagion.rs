//! Status contagion: per-status spread rolls between adjacent units, with
//! a phalanx bonus, and duration refresh on re-application (4.3.8).

use crate::config::MechanicsConfig;
use crate::rng::RngStream;
use crate::types::{StatusEffect, StatusKind};

/// Chance a `kind` status spreads from a carrier to an adjacent,
/// uninfected unit this turn.
pub fn spread_chance(kind: StatusKind, carrier_in_phalanx: bool, cfg: &MechanicsConfig) -> f64 {
    let base = kind.base_spread_chance();
    if carrier_in_phalanx {
        (base + cfg.contagion_phalanx_bonus).min(1.0)
    } else {
        base
    }
}

/// Rolls whether `kind` spreads this turn, returning `(spread, roll)`.
pub fn roll_spread(kind: StatusKind, carrier_in_phalanx: bool, cfg: &MechanicsConfig, rng: &mut RngStream) -> (bool, f64) {
    let chance = spread_chance(kind, carrier_in_phalanx, cfg);
    let roll = rng.next_f64();
    (roll < chance, roll)
}

/// Applies a status to `target`'s status list, refreshing duration to the
/// max of the existing and incoming values if already present.
pub fn apply_or_refresh(statuses: &mut Vec<StatusEffect>, incoming: StatusEffect) {
    if let Some(existing) = statuses.iter_mut().find(|s| s.kind == incoming.kind) {
        existing.duration = existing.duration.max(incoming.duration);
    } else {
        statuses.push(incoming);
    }
}

/// Ticks down every status by one turn, dropping any that expire.
pub fn tick_durations(statuses: &mut Vec<StatusEffect>) {
    for s in statuses.iter_mut() {
        s.duration = s.duration.saturating_sub(1);
    }
    statuses.retain(|s| s.duration > 0);
}
