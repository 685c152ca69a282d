//! External data seams: unit templates and ability definitions.
//!
//! The core never embeds game content. Callers hand in a table
//! implementation the same way the teacher's `execute_turn` takes an
//! `Option<&HashMap<String, UnitTemplate>>` (`core/src/battle/pipeline.rs`)
//! — here promoted to a trait so a caller can back it with a database, a
//! static asset bundle, or (as in the test table below) a plain `HashMap`.

use std::collections::HashMap;

use crate::types::{AbilityId, Faction, TemplateId, UnitTags};
use crate::unit::BaseStats;

/// A template entry: tier-scaled base stats plus the capability tags the
/// template grants.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitTemplate {
    pub display_name: String,
    pub cost: u32,
    pub base: BaseStats,
    pub tags: UnitTags,
    pub faction: Faction,
    pub max_ammo: Option<u32>,
}

/// Read-only access to unit templates, keyed by id and tier.
pub trait UnitTemplateTable {
    /// Looks up a template, with `tier` already applied to its stats/cost.
    fn get(&self, id: &TemplateId, tier: u8) -> Option<UnitTemplate>;
}

/// An ability's cooldown length and the status effect (if any) it applies
/// on use. Resolution of *what an ability does* belongs to
/// [`AbilityResolver`]; this table only carries the data needed for
/// cooldown bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityDef {
    pub cooldown: u8,
}

pub trait AbilityTable {
    fn get(&self, id: &AbilityId) -> Option<AbilityDef>;
}

/// In-memory `HashMap`-backed table, for tests and small embedders.
#[derive(Debug, Clone, Default)]
pub struct StaticTemplateTable {
    pub templates: HashMap<TemplateId, UnitTemplate>,
}

impl UnitTemplateTable for StaticTemplateTable {
    fn get(&self, id: &TemplateId, _tier: u8) -> Option<UnitTemplate> {
        self.templates.get(id).cloned()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticAbilityTable {
    pub abilities: HashMap<AbilityId, AbilityDef>,
}

impl AbilityTable for StaticAbilityTable {
    fn get(&self, id: &AbilityId) -> Option<AbilityDef> {
        self.abilities.get(id).copied()
    }
}
