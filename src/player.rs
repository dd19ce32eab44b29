use crate::pokemon::BattlePokemon;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two competing teams in a room.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    #[serde(rename = "sideA", alias = "playerA")]
    A,
    #[serde(rename = "sideB", alias = "playerB")]
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Side::A => "Agent Red",
            Side::B => "Agent Blue",
        }
    }

    /// Parse a wire identifier, accepting the legacy player spellings.
    pub fn parse(value: &str) -> Option<Side> {
        match value {
            "sideA" | "playerA" => Some(Side::A),
            "sideB" | "playerB" => Some(Side::B),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "sideA"),
            Side::B => write!(f, "sideB"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BattlePlayer {
    pub side: Side,
    pub name: String,

    // Ordered team; substitution always picks the first living member.
    pub team: Vec<BattlePokemon>,

    // Index into `team` of the combatant currently in play.
    pub active_index: usize,

    pub fainted_count: u32,
}

impl BattlePlayer {
    pub fn new(side: Side, team: Vec<BattlePokemon>) -> Self {
        Self {
            side,
            name: side.display_name().to_string(),
            team,
            active_index: 0,
            fainted_count: 0,
        }
    }

    pub fn active_pokemon(&self) -> Option<&BattlePokemon> {
        self.team.get(self.active_index)
    }

    pub fn active_pokemon_mut(&mut self) -> Option<&mut BattlePokemon> {
        self.team.get_mut(self.active_index)
    }

    /// True when the active slot is empty or fainted.
    pub fn needs_replacement(&self) -> bool {
        self.active_pokemon().map_or(true, |p| p.is_fainted())
    }

    /// Index of the first teammate, in team order, that can still fight.
    pub fn next_living_index(&self) -> Option<usize> {
        self.team.iter().position(|p| !p.is_fainted())
    }

    pub fn has_living_members(&self) -> bool {
        self.next_living_index().is_some()
    }

    /// Send in the first living teammate. Returns its index, or None if the side is eliminated.
    pub fn substitute(&mut self) -> Option<usize> {
        let next = self.next_living_index()?;
        self.active_index = next;
        Some(next)
    }
}
