use crate::PokemonType;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MoveCategory {
    Physical,
    Special,
}

/// Effect tag carried by an ability. The numeric value lives on `AbilityData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AbilityEffect {
    PowerBoostLowHp,
    SpeedFlat,
    HpFlat,
    DamageReduction,
    CritBoost,
    EnemyAttackDown,
    AttackOnKo,
    SpeedPerTurn,
    SurviveOneHit,
    AllPowerBoost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseStats {
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub sp_attack: u8,
    pub sp_defense: u8,
    pub speed: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveData {
    pub name: String,
    pub power: u32,
    /// Hit probability in `0.0..=1.0`.
    pub accuracy: f64,
    #[serde(rename = "type")]
    pub move_type: PokemonType,
    pub category: MoveCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i8>,
    /// Turns the move stays unavailable after a hit.
    pub cooldown: u8,
}

impl MoveData {
    pub fn new(
        name: &str,
        power: u32,
        accuracy: f64,
        move_type: PokemonType,
        category: MoveCategory,
        cooldown: u8,
    ) -> Self {
        Self {
            name: name.to_string(),
            power,
            accuracy,
            move_type,
            category,
            priority: None,
            cooldown,
        }
    }

    pub fn with_priority(mut self, priority: i8) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Priority tier used for turn ordering. Moves without one sit at tier 0.
    pub fn priority_tier(&self) -> i8 {
        self.priority.unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityData {
    pub name: String,
    pub effect: AbilityEffect,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesData {
    pub name: String,
    pub types: Vec<PokemonType>,
    pub ability: String,
    pub moves: Vec<String>,
    pub base_stats: BaseStats,
}
