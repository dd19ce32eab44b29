//! Battle Arena
//!
//! Autonomous, continuously looping battles between two AI-controlled teams, one
//! per room, with snapshots streamed to observers and pari-mutuel settlement of the
//! wagers placed on each battle.

// --- MODULE DECLARATIONS ---
pub mod arena;
pub mod battle;
pub mod broadcast;
pub mod config;
pub mod errors;
pub mod move_data;
pub mod payments;
pub mod player;
pub mod pokemon;
pub mod registry;
pub mod settlement;
pub mod species;
pub mod teams;
pub mod wagers;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    AbilityData, AbilityEffect, BaseStats, MoveCategory, MoveData, PokemonType, SpeciesData,
};

// --- From this crate's modules (`src/`) ---

// Battle engine and per-room state machine.
pub use battle::ai::{MoveOracle, OfflineOracle, ScoringOracle};
pub use battle::runner::{BattleRunner, BattleServices, TurnOutcome};
pub use battle::scheduler::SchedulePolicy;
pub use battle::selector::MoveSelector;
pub use battle::state::{BattleEvent, BattleState, GamePhase};

// Core runtime types for a battle.
pub use player::{BattlePlayer, Side};
pub use pokemon::BattlePokemon;

// Rooms, wagers and settlement.
pub use arena::{Arena, WagerDecision};
pub use broadcast::{BroadcastSink, ChannelSink};
pub use config::ArenaConfig;
pub use payments::{LedgerRail, PaymentRail};
pub use registry::RoomRegistry;
pub use settlement::{SettlementEngine, SettlementReport};
pub use wagers::{WagerService, WagerStore};

// Primary data access functions.
pub use move_data::get_move_data;
pub use species::get_species_data;

// Crate-specific error and result types.
pub use errors::{
    ArenaError, ArenaResult, CatalogError, CatalogResult, OracleError, PaymentError, StoreError,
    WagerError, WagerResult,
};
