//! Grid, identity, and capability primitives shared across the crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid width (x in `[0, GRID_WIDTH)`).
pub const GRID_WIDTH: u8 = 8;
/// Grid height (y in `[0, GRID_HEIGHT)`), giving 10 rows as spec'd.
pub const GRID_HEIGHT: u8 = 10;
/// Player deploy rows.
pub const PLAYER_DEPLOY_ROWS: [u8; 2] = [0, 1];
/// Enemy deploy rows.
pub const ENEMY_DEPLOY_ROWS: [u8; 2] = [8, 9];
/// Cost budget per team roster.
pub const TEAM_COST_BUDGET: u32 = 30;
/// Battle is forced to a draw past this many rounds.
pub const MAX_ROUNDS: u32 = 100;
/// Resolve ceiling for every unit.
pub const MAX_RESOLVE: i32 = 100;
/// Resolve threshold at or below which a unit routs/crumbles.
pub const ROUT_THRESHOLD: i32 = 0;
/// Resolve threshold at or above which a routing unit rallies.
pub const RALLY_THRESHOLD: i32 = 25;

/// Which side of the field a unit fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Player,
    Enemy,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Player => Team::Enemy,
            Team::Enemy => Team::Player,
        }
    }
}

/// Which reaction a unit has to resolve collapse: routing (human) or
/// crumbling (undead).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Human,
    Undead,
}

/// One of the four cardinal facings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    N,
    E,
    S,
    W,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::N, Facing::E, Facing::S, Facing::W];

    /// Unit step vector for this facing, in grid coordinates (y grows
    /// downward: N decreases y, S increases y).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Facing::N => (0, -1),
            Facing::S => (0, 1),
            Facing::E => (1, 0),
            Facing::W => (-1, 0),
        }
    }

    pub fn opposite(self) -> Facing {
        match self {
            Facing::N => Facing::S,
            Facing::S => Facing::N,
            Facing::E => Facing::W,
            Facing::W => Facing::E,
        }
    }

    /// The cardinal facing that points from `from` toward `to`. Ties (equal
    /// |dx| and |dy|, i.e. an exact diagonal) favor the vertical axis, a
    /// fixed and documented tie-break so rotation is deterministic.
    pub fn toward(from: Position, to: Position) -> Facing {
        let dx = to.x as i32 - from.x as i32;
        let dy = to.y as i32 - from.y as i32;
        if dx == 0 && dy == 0 {
            return Facing::N;
        }
        if dy.abs() >= dx.abs() {
            if dy < 0 {
                Facing::N
            } else {
                Facing::S
            }
        } else if dx < 0 {
            Facing::W
        } else {
            Facing::E
        }
    }
}

/// The arc an attack lands in, relative to the defender's facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arc {
    Front,
    Flank,
    Rear,
}

/// A grid cell. `x` in `[0, GRID_WIDTH)`, `y` in `[0, GRID_HEIGHT)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

impl Position {
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    pub fn in_bounds(self) -> bool {
        self.x < GRID_WIDTH && self.y < GRID_HEIGHT
    }

    pub fn manhattan(self, other: Position) -> i32 {
        (self.x as i32 - other.x as i32).abs() + (self.y as i32 - other.y as i32).abs()
    }

    pub fn is_orthogonally_adjacent(self, other: Position) -> bool {
        self.manhattan(other) == 1
    }

    pub fn chebyshev(self, other: Position) -> i32 {
        (self.x as i32 - other.x as i32)
            .abs()
            .max((self.y as i32 - other.y as i32).abs())
    }

    pub fn orthogonal_neighbors(self) -> Vec<Position> {
        let mut out = Vec::with_capacity(4);
        for facing in Facing::ALL {
            let (dx, dy) = facing.delta();
            let nx = self.x as i32 + dx;
            let ny = self.y as i32 + dy;
            if nx >= 0 && ny >= 0 {
                let p = Position::new(nx as u8, ny as u8);
                if p.in_bounds() {
                    out.push(p);
                }
            }
        }
        out
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// A unique battle-scoped unit identifier, assigned deterministically as
/// `{team}_{template}_{index}` during initialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub String);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// References an entry in the external unit-template table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub String);

/// References an entry in the external ability table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbilityId(pub String);

bitflags::bitflags! {
    /// Capability tags a unit carries. Processors branch on tag membership,
    /// never on a subclass hierarchy (see DESIGN NOTES — "Polymorphism over
    /// the capability set").
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct UnitTags: u32 {
        /// Accrues momentum from movement; triggers hard intercept checks.
        const CAVALRY       = 1 << 0;
        /// Carries the spear-wall counter-charge capability.
        const SPEARMAN      = 1 << 1;
        /// Gains the phalanx resolve/contagion bonus when grouped (the
        /// phalanx *state* itself is computed at runtime regardless of this
        /// tag — see `BattleUnit::in_phalanx`).
        const PHALANX_UNIT  = 1 << 2;
        const ARC_FIRE      = 1 << 3;
        const SIEGE         = 1 << 4;
        const IGNORE_LOS    = 1 << 5;
        const SHRED_IMMUNE  = 1 << 6;
        const ARMORED       = 1 << 7;
        const MAGE          = 1 << 8;
    }
}

impl Default for UnitTags {
    fn default() -> Self {
        UnitTags::empty()
    }
}

/// A spreadable status effect, as tracked for contagion purposes. The
/// ability subsystem that grants these is out of scope; the core only
/// needs kind + remaining duration to spread and refresh them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Fire,
    Poison,
    Fear,
    Curse,
    Frost,
    Plague,
}

impl StatusKind {
    pub const ALL: [StatusKind; 6] = [
        StatusKind::Fire,
        StatusKind::Poison,
        StatusKind::Fear,
        StatusKind::Curse,
        StatusKind::Frost,
        StatusKind::Plague,
    ];

    /// Base contagion transfer chance before the phalanx bonus.
    pub fn base_spread_chance(self) -> f64 {
        match self {
            StatusKind::Fire => 0.50,
            StatusKind::Poison => 0.30,
            StatusKind::Fear => 0.40,
            StatusKind::Curse => 0.25,
            StatusKind::Frost => 0.20,
            StatusKind::Plague => 0.60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub duration: u32,
}

/// The seven fixed phases of a single unit's turn, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    TurnStart,
    AiDecision,
    Movement,
    PreAttack,
    Attack,
    PostAttack,
    TurnEnd,
}

impl Phase {
    pub const ORDER: [Phase; 7] = [
        Phase::TurnStart,
        Phase::AiDecision,
        Phase::Movement,
        Phase::PreAttack,
        Phase::Attack,
        Phase::PostAttack,
        Phase::TurnEnd,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_toward_cardinal_cases() {
        let origin = Position::new(3, 3);
        assert_eq!(Facing::toward(origin, Position::new(3, 0)), Facing::N);
        assert_eq!(Facing::toward(origin, Position::new(3, 9)), Facing::S);
        assert_eq!(Facing::toward(origin, Position::new(7, 3)), Facing::E);
        assert_eq!(Facing::toward(origin, Position::new(0, 3)), Facing::W);
    }

    #[test]
    fn position_adjacency() {
        let a = Position::new(3, 3);
        assert!(a.is_orthogonally_adjacent(Position::new(3, 4)));
        assert!(!a.is_orthogonally_adjacent(Position::new(4, 4)));
        assert!(!a.is_orthogonally_adjacent(Position::new(3, 3)));
    }

    #[test]
    fn tags_are_a_bitset() {
        let t = UnitTags::CAVALRY | UnitTags::ARMORED;
        assert!(t.contains(UnitTags::CAVALRY));
        assert!(!t.contains(UnitTags::SIEGE));
    }
}
