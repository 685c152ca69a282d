//! Small stateless helpers the `attack` phase composes (4.3, 4.4). The
//! phase handler owns sequencing and event emission since the spec pins
//! an exact sub-event order within one strike; this module only does the
//! arithmetic.

use crate::config::MechanicsConfig;

use super::{facing, los};

/// Damage before dodge: `atk * (1 + momentum) * arc_mult - effective_armor`,
/// floored at 0 and truncated to an integer.
pub fn compute_damage(atk: u32, momentum: f64, arc: crate::types::Arc, effective_armor: u32, cfg: &MechanicsConfig) -> u32 {
    let scaled = super::charge::scaled_atk(atk, momentum);
    let mult = facing::damage_multiplier(arc, cfg);
    (scaled * mult - effective_armor as f64).max(0.0).floor() as u32
}

/// Dodge chance including the partial-cover bonus for ranged attacks whose
/// line grazes an empty cell's edge, capped at the global dodge cap.
pub fn dodge_chance(
    defender_dodge: u8,
    attacker_pos: crate::types::Position,
    defender_pos: crate::types::Position,
    occupied: &std::collections::HashSet<crate::types::Position>,
    is_ranged_attack: bool,
    cfg: &MechanicsConfig,
) -> f64 {
    let mut chance = defender_dodge as f64 / 100.0;
    if is_ranged_attack {
        chance += los::partial_cover_bonus(attacker_pos, defender_pos, occupied, cfg);
    }
    chance.min(cfg.dodge_cap / 100.0)
}

/// Applies the armor-shred side effect of a landed hit.
pub fn apply_shred_on_hit(defender: &mut crate::unit::BattleUnit, cfg: &MechanicsConfig) {
    super::shred::apply_hit(defender, cfg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Arc;

    #[test]
    fn damage_applies_momentum_and_arc_before_armor() {
        let cfg = MechanicsConfig::default();
        // atk=10, momentum=0.5 -> scaled 15, front mult 1.0, armor 5 -> 10
        assert_eq!(compute_damage(10, 0.5, Arc::Front, 5, &cfg), 10);
    }

    #[test]
    fn damage_floors_at_zero() {
        let cfg = MechanicsConfig::default();
        assert_eq!(compute_damage(5, 0.0, Arc::Front, 100, &cfg), 0);
    }
}
