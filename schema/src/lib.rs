// Battle Arena Schema - Shared type definitions
// This crate contains the core enums and immutable catalog records that are
// shared between the arena engine and anything that needs to describe a move,
// ability or species without pulling in the runtime.

// Re-export the main types
pub use battle_data::*;
pub use pokemon_types::*;

pub mod battle_data;
pub mod pokemon_types;
