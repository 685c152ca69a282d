//! Armor shred accumulation, per-unit cap, and end-of-turn decay (4.3.6).

use crate::config::MechanicsConfig;
use crate::unit::BattleUnit;

/// Adds `cfg.shred_per_hit` shred to the unit, capped at its class max.
pub fn apply_hit(unit: &mut BattleUnit, cfg: &MechanicsConfig) {
    let cap = unit.max_shred(cfg);
    unit.armor_shred = (unit.armor_shred + cfg.shred_per_hit).min(cap);
}

/// Decays shred by `cfg.shred_decay_per_turn`, never below zero. Returns
/// the amount actually removed, for event reporting.
pub fn decay(unit: &mut BattleUnit, cfg: &MechanicsConfig) -> u32 {
    if !cfg.shred_decay_enabled || unit.armor_shred == 0 {
        return 0;
    }
    let removed = unit.armor_shred.min(cfg.shred_decay_per_turn);
    unit.armor_shred -= removed;
    removed
}
