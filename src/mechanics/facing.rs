//! Facing, arc computation, and the flank/rear damage and resolve
//! modifiers (4.3.1).

use crate::config::MechanicsConfig;
use crate::types::{Arc, Facing, Position};

/// The arc an attack coming from `attacker_pos` lands in, relative to the
/// defender's `facing`.
pub fn attack_arc(defender_facing: Facing, defender_pos: Position, attacker_pos: Position) -> Arc {
    let incoming_from = Facing::toward(defender_pos, attacker_pos);
    if incoming_from == defender_facing {
        // Attacker is on the side the defender is looking toward: attack
        // comes from the front.
        Arc::Front
    } else if incoming_from == defender_facing.opposite() {
        Arc::Rear
    } else {
        Arc::Flank
    }
}

pub fn damage_multiplier(arc: Arc, cfg: &MechanicsConfig) -> f64 {
    match arc {
        Arc::Front => 1.0,
        Arc::Flank => cfg.flank_damage_mult,
        Arc::Rear => cfg.rear_damage_mult,
    }
}

/// Resolve delta applied to the defender for being hit in this arc. Front
/// hits carry no resolve penalty.
pub fn resolve_delta(arc: Arc, cfg: &MechanicsConfig) -> i32 {
    match arc {
        Arc::Front => 0,
        Arc::Flank => cfg.flank_resolve_delta,
        Arc::Rear => cfg.rear_resolve_delta,
    }
}
