//! [`BattleUnit`] — one combatant, and the immutable per-template
//! [`BaseStats`] it's built from.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::MechanicsConfig;
use crate::types::{Facing, Faction, Position, StatusEffect, Team, TemplateId, UnitId, UnitTags};

/// Stats fixed for the duration of a battle (template + tier scaling is
/// an external concern — see [`crate::templates::UnitTemplateTable`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp_max: u32,
    pub atk: u32,
    /// Number of strikes per attack action, in `[1, 3]`.
    pub atk_count: u8,
    pub armor: u32,
    pub speed: u32,
    pub initiative: i32,
    /// Dodge chance in percentage points, capped at 50.
    pub dodge: u8,
}

impl BaseStats {
    pub fn clamped(mut self) -> Self {
        self.atk_count = self.atk_count.clamp(1, 3);
        self.dodge = self.dodge.min(50);
        self
    }
}

/// One combatant on the battlefield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleUnit {
    pub template_id: TemplateId,
    pub id: UnitId,
    pub display_name: String,
    pub team: Team,
    pub faction: Faction,
    pub base: BaseStats,
    pub tags: UnitTags,

    pub position: Position,
    pub facing: Facing,

    pub current_hp: i32,

    pub resolve: i32,
    pub max_resolve: i32,
    pub is_routing: bool,

    pub engaged: bool,
    pub engaged_by: BTreeSet<UnitId>,

    /// `None` means melee/unlimited ammo.
    pub ammo: Option<u32>,
    pub max_ammo: Option<u32>,
    pub riposte_charges: u8,
    pub momentum: f64,

    pub armor_shred: u32,
    pub in_phalanx: bool,
    pub charge_countered: bool,

    pub statuses: Vec<StatusEffect>,
}

impl BattleUnit {
    pub fn new(
        id: UnitId,
        template_id: TemplateId,
        display_name: String,
        team: Team,
        faction: Faction,
        base: BaseStats,
        tags: UnitTags,
        position: Position,
        facing: Facing,
        max_ammo: Option<u32>,
    ) -> Self {
        let base = base.clamped();
        Self {
            template_id,
            id,
            display_name,
            team,
            faction,
            base,
            tags,
            position,
            facing,
            current_hp: base.hp_max as i32,
            resolve: crate::types::MAX_RESOLVE,
            max_resolve: crate::types::MAX_RESOLVE,
            is_routing: false,
            engaged: false,
            engaged_by: BTreeSet::new(),
            ammo: max_ammo,
            max_ammo,
            riposte_charges: 1,
            momentum: 0.0,
            armor_shred: 0,
            in_phalanx: false,
            charge_countered: false,
            statuses: Vec::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    pub fn is_ranged(&self) -> bool {
        self.ammo.is_some() || self.max_ammo.is_some()
    }

    /// Cap on `armor_shred`, per unit class (4.3.6).
    pub fn max_shred(&self, cfg: &MechanicsConfig) -> u32 {
        if self.tags.contains(UnitTags::SHRED_IMMUNE) {
            return 0;
        }
        let fraction = if self.tags.contains(UnitTags::ARMORED) {
            cfg.shred_cap_fraction_armored
        } else {
            cfg.shred_cap_fraction_normal
        };
        ((self.base.armor as f64) * fraction).floor() as u32
    }

    /// Effective armor after shred, used wherever armor appears in damage
    /// math.
    pub fn effective_armor(&self) -> u32 {
        self.base.armor.saturating_sub(self.armor_shred)
    }

    pub fn apply_damage(&mut self, amount: u32) {
        self.current_hp = (self.current_hp - amount as i32).max(0);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current_hp = (self.current_hp + amount as i32).min(self.base.hp_max as i32);
    }

    pub fn add_resolve(&mut self, delta: i32) {
        self.resolve = (self.resolve + delta).clamp(0, self.max_resolve);
    }
}
