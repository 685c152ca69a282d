//! The append-only, typed event log.
//!
//! Events are value objects; [`EventLog`] is the emitter, stamping the
//! current `(round, turn, phase)` and a monotone per-battle timestamp
//! counter (wall-clock is forbidden — it breaks determinism). This
//! generalizes the teacher's `TurnResult.logs: Vec<String>` narrative log
//! (`core/src/battle/mod.rs`) into a structured, machine-readable trace
//! while keeping the same "accumulate as you go" shape.

use serde::{Deserialize, Serialize};

use crate::types::{AbilityId, Arc, Facing, Phase, Position, StatusKind, Team, UnitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    BattleStart,
    RoundStart,
    TurnStart,
    FacingRotated,
    FlankingApplied,
    ChargeStarted,
    ChargeImpact,
    InterceptTriggered,
    Attack,
    Dodge,
    Damage,
    RiposteTriggered,
    RiposteReset,
    AmmoConsumed,
    ResolveChanged,
    RoutingStarted,
    UnitRallied,
    EngagementChanged,
    Move,
    ShredDecayed,
    ContagionSpread,
    AuraPulse,
    CooldownTicked,
    UnitDied,
    TurnEnd,
    RoundEnd,
    BattleEnd,
    /// A mechanic declined, an action was skipped, or a non-fatal
    /// simulator condition (e.g. max-rounds) was recorded. See spec §7.
    Diagnostic,
}

/// Outcome of a riposte or dodge-adjacent roll, echoed in events for
/// reproducibility audits without re-deriving the draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollOutcome {
    pub chance: f64,
    pub roll: f64,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageSource {
    Attack,
    Riposte,
    ChargeCounter,
    Residual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveSource {
    FlankHit,
    RearHit,
    AllyDeathAdjacent,
    AllyDeathNearby,
    Regeneration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MechanicDeclined,
    InvalidAction,
    MaxRoundsExceeded,
    InvariantViolation,
}

/// Kind-specific event data. Every variant name matches its [`EventKind`];
/// [`BattleEvent::new`] keeps the two in lockstep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    BattleStart {
        player_unit_count: usize,
        enemy_unit_count: usize,
    },
    RoundStart,
    TurnStart,
    FacingRotated {
        from: Facing,
        to: Facing,
    },
    FlankingApplied {
        arc: Arc,
        damage_mult: f64,
    },
    ChargeStarted {
        momentum: f64,
    },
    ChargeImpact {
        bonus_damage: u32,
    },
    InterceptTriggered {
        kind: InterceptKind,
        damage: u32,
    },
    Attack {
        move_range: i32,
    },
    Dodge {
        chance: f64,
    },
    Damage {
        amount: u32,
        source: DamageSource,
        remaining_hp: i32,
    },
    RiposteTriggered {
        roll: RollOutcome,
        charges_remaining: u8,
    },
    RiposteReset {
        charges: u8,
    },
    AmmoConsumed {
        remaining: Option<u32>,
    },
    ResolveChanged {
        delta: i32,
        new_value: i32,
        source: ResolveSource,
    },
    RoutingStarted,
    UnitRallied,
    EngagementChanged {
        engaged: bool,
    },
    Move {
        from: Position,
        to: Position,
    },
    ShredDecayed {
        amount: u32,
        new_value: u32,
    },
    ContagionSpread {
        status: StatusKind,
        duration: u32,
        roll: RollOutcome,
    },
    AuraPulse {
        healing: i32,
    },
    CooldownTicked {
        ability: AbilityId,
        remaining: u8,
    },
    UnitDied {
        cause: DeathCause,
    },
    TurnEnd,
    RoundEnd,
    BattleEnd {
        outcome: BattleOutcome,
        winner: Option<Team>,
    },
    Diagnostic {
        kind: DiagnosticKind,
        detail: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterceptKind {
    Hard,
    Soft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Combat,
    Riposte,
    ChargeCounter,
    Crumble,
    Residual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    Win,
    Loss,
    Draw,
}

/// One recorded, timestamped fact about the battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleEvent {
    pub kind: EventKind,
    pub round: u32,
    pub turn: u32,
    pub phase: Phase,
    pub timestamp: u64,
    pub actor: Option<UnitId>,
    pub target: Option<UnitId>,
    pub payload: EventPayload,
}

/// Append-only emitter. Owns the monotone timestamp counter; every
/// `BattleState` carries one and it is never reset mid-battle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<BattleEvent>,
    next_timestamp: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<BattleEvent> {
        self.events
    }

    #[allow(clippy::too_many_arguments)]
    pub fn emit(
        &mut self,
        kind: EventKind,
        round: u32,
        turn: u32,
        phase: Phase,
        actor: Option<UnitId>,
        target: Option<UnitId>,
        payload: EventPayload,
    ) {
        let timestamp = self.next_timestamp;
        self.next_timestamp += 1;
        self.events.push(BattleEvent {
            kind,
            round,
            turn,
            phase,
            timestamp,
            actor,
            target,
            payload,
        });
    }

    /// True iff every event's timestamp is non-decreasing (P8).
    pub fn is_timestamp_monotone(&self) -> bool {
        self.events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
    }
}
