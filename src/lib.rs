//! Deterministic, turn-based tactical combat simulator for an 8x10 grid
//! battlefield. [`simulator::simulate_battle`] is the single entry point:
//! it validates two rosters, builds the initial [`state::BattleState`],
//! and runs it to completion through the seven-phase turn pipeline in
//! [`phases`], driven by [`scheduler::run_battle`].
//!
//! Every mechanic lives in [`mechanics`] as a small, independently tested
//! pure function; `phases` composes them in the fixed order the combat
//! rules require. Randomness flows from a single seeded [`rng::RngStream`]
//! threaded through the whole run, so two calls with the same rosters and
//! seed produce bit-identical event logs.

pub mod ai;
pub mod config;
pub mod error;
pub mod events;
pub mod mechanics;
pub mod phases;
pub mod rng;
pub mod scheduler;
pub mod simulator;
pub mod state;
pub mod templates;
pub mod types;
pub mod unit;

pub use ai::{AiOracle, BattleAction, NearestEnemyOracle};
pub use config::MechanicsConfig;
pub use error::ValidationError;
pub use events::{BattleEvent, BattleOutcome, EventKind, EventLog, EventPayload};
pub use rng::RngStream;
pub use simulator::{simulate_battle, BattleResult};
pub use state::{BattleState, RosterEntry, TeamSetup};
pub use templates::{AbilityDef, AbilityTable, StaticAbilityTable, StaticTemplateTable, UnitTemplate, UnitTemplateTable};
pub use types::{Arc, Facing, Faction, Phase, Position, Team, UnitId, UnitTags};
pub use unit::{BaseStats, BattleUnit};
