//! Mechanics thresholds.
//!
//! Every tunable constant named in spec §4.3 lives here as a plain,
//! serde-derived value record with a `Default`, following the teacher's
//! `GameConfig` (`core/src/game.rs`) pattern of pulling magic numbers out of
//! the mechanics code and into one inspectable struct.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanicsConfig {
    // --- Facing / flanking (4.3.1) ---
    pub flank_damage_mult: f64,
    pub rear_damage_mult: f64,
    pub flank_resolve_delta: i32,
    pub rear_resolve_delta: i32,

    // --- Riposte (4.3.2) ---
    /// Data-model ceiling on `riposte_charges` (turn_start always resets
    /// to 1; abilities that grant extra charges, out of scope here, would
    /// clamp against this).
    pub riposte_max_charges: u8,

    // --- Charge / spear-wall (4.3.3) ---
    pub momentum_per_distance: f64,
    pub momentum_cap: f64,
    pub counter_damage_fraction: f64,

    // --- Ammunition (4.3.4) ---
    pub melee_fallback_damage_fraction: f64,

    // --- Line of sight (4.3.5) ---
    pub arc_fire_accuracy_penalty: f64,
    pub arc_fire_min_range: i32,
    pub partial_cover_dodge_bonus: f64,
    pub partial_cover_edge_lo: f64,
    pub partial_cover_edge_hi: f64,

    // --- Armor shred (4.3.6) ---
    pub shred_per_hit: u32,
    pub shred_cap_fraction_normal: f64,
    pub shred_cap_fraction_armored: f64,
    pub shred_decay_per_turn: u32,
    pub shred_decay_enabled: bool,

    // --- Resolve / routing / rally (4.3.7) ---
    pub resolve_regen_base: i32,
    pub resolve_regen_phalanx_bonus: i32,
    pub resolve_ally_death_adjacent: i32,
    pub resolve_ally_death_nearby: i32,
    pub resolve_ally_death_nearby_range: i32,

    // --- Contagion (4.3.8) ---
    pub contagion_phalanx_bonus: f64,

    // --- Engagement / intercept (4.3.10) ---
    pub cavalry_intercept_range: i32,

    // --- Dodge cap (3) ---
    pub dodge_cap: f64,
}

impl Default for MechanicsConfig {
    fn default() -> Self {
        Self {
            flank_damage_mult: 1.15,
            rear_damage_mult: 1.30,
            flank_resolve_delta: -5,
            rear_resolve_delta: -10,

            riposte_max_charges: 3,

            momentum_per_distance: 0.2,
            momentum_cap: 1.0,
            counter_damage_fraction: 0.5,

            melee_fallback_damage_fraction: 0.5,

            arc_fire_accuracy_penalty: 0.20,
            arc_fire_min_range: 2,
            partial_cover_dodge_bonus: 0.2,
            partial_cover_edge_lo: 0.3,
            partial_cover_edge_hi: 0.7,

            shred_per_hit: 1,
            shred_cap_fraction_normal: 0.40,
            shred_cap_fraction_armored: 0.50,
            shred_decay_per_turn: 2,
            shred_decay_enabled: true,

            resolve_regen_base: 5,
            resolve_regen_phalanx_bonus: 3,
            resolve_ally_death_adjacent: -15,
            resolve_ally_death_nearby: -8,
            resolve_ally_death_nearby_range: 3,

            contagion_phalanx_bonus: 0.15,

            cavalry_intercept_range: 2,

            dodge_cap: 50.0,
        }
    }
}
