use crate::errors::CatalogResult;
use crate::move_data::{get_ability_data, get_move_data};
use crate::species::get_species_data;
use schema::{AbilityData, AbilityEffect, MoveData, PokemonType, SpeciesData};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatStats {
    pub hp: u32,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub sp_attack: u32,
    pub sp_defense: u32,
    pub speed: u32,
}

/// Multipliers applied on top of the live stat block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    pub attack: f64,
    pub defense: f64,
    pub speed: f64,
    pub accuracy: f64,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            attack: 1.0,
            defense: 1.0,
            speed: 1.0,
            accuracy: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattlePokemon {
    pub id: Uuid,
    pub species_name: String,
    pub types: Vec<PokemonType>,
    pub stats: CombatStats,
    pub moves: Vec<MoveData>,
    pub ability: AbilityData,
    pub modifiers: Modifiers,
    pub cooldowns: BTreeMap<String, u8>, // move name -> turns remaining
}

impl BattlePokemon {
    /// Build a fresh combatant from a catalog species name.
    pub fn from_species(name: &str) -> CatalogResult<Self> {
        let species_data = get_species_data(name)?;
        Self::from_species_data(&species_data)
    }

    /// Build a fresh combatant from species data, resolving its ability and moves.
    /// Fails if the species references anything missing from the catalogs.
    pub fn from_species_data(species: &SpeciesData) -> CatalogResult<Self> {
        let ability = get_ability_data(&species.ability)?;
        let moves = species
            .moves
            .iter()
            .map(|name| get_move_data(name))
            .collect::<CatalogResult<Vec<_>>>()?;

        let base = &species.base_stats;
        let hp = base.hp as u32 * 2 + 110;
        let mut stats = CombatStats {
            hp,
            max_hp: hp,
            attack: base.attack as u32 + 50,
            defense: base.defense as u32 + 50,
            sp_attack: base.sp_attack as u32 + 50,
            sp_defense: base.sp_defense as u32 + 50,
            speed: base.speed as u32 + 50,
        };

        // Flat stat abilities are baked in at creation time
        match ability.effect {
            AbilityEffect::HpFlat => {
                stats.hp += ability.value as u32;
                stats.max_hp += ability.value as u32;
            }
            AbilityEffect::SpeedFlat => stats.speed += ability.value as u32,
            _ => {}
        }

        Ok(Self {
            id: Uuid::new_v4(),
            species_name: species.name.clone(),
            types: species.types.clone(),
            stats,
            moves,
            ability,
            modifiers: Modifiers::default(),
            cooldowns: BTreeMap::new(),
        })
    }

    pub fn current_hp(&self) -> u32 {
        self.stats.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.stats.max_hp
    }

    pub fn is_fainted(&self) -> bool {
        self.stats.hp == 0
    }

    pub fn has_type(&self, pokemon_type: PokemonType) -> bool {
        self.types.contains(&pokemon_type)
    }

    /// Apply damage, clamping HP at 0. Returns true if this damage caused fainting.
    pub fn take_damage(&mut self, damage: u32) -> bool {
        let was_fainted = self.is_fainted();
        self.stats.hp = self.stats.hp.saturating_sub(damage);
        !was_fainted && self.is_fainted()
    }

    /// Set HP directly, capped at max HP. Test builders rely on this.
    pub fn set_hp(&mut self, hp: u32) {
        self.stats.hp = hp.min(self.stats.max_hp);
    }

    pub fn cooldown(&self, move_name: &str) -> u8 {
        self.cooldowns.get(move_name).copied().unwrap_or(0)
    }

    pub fn is_move_available(&self, move_name: &str) -> bool {
        self.cooldown(move_name) == 0
    }

    /// Moves with zero remaining cooldown, in moveset order.
    pub fn available_moves(&self) -> Vec<&MoveData> {
        self.moves
            .iter()
            .filter(|m| self.is_move_available(&m.name))
            .collect()
    }

    /// Case-insensitive lookup of an available move by name.
    pub fn find_available_move(&self, move_name: &str) -> Option<&MoveData> {
        let wanted = move_name.trim();
        self.available_moves()
            .into_iter()
            .find(|m| m.name.eq_ignore_ascii_case(wanted))
    }

    /// Start a move's cooldown after a hit. The extra turn is consumed by the
    /// end-of-turn decrement of the same turn.
    pub fn start_cooldown(&mut self, move_data: &MoveData) {
        if move_data.cooldown > 0 {
            self.cooldowns
                .insert(move_data.name.clone(), move_data.cooldown + 1);
        }
    }

    /// Decrement every nonzero cooldown by one.
    pub fn tick_cooldowns(&mut self) {
        for remaining in self.cooldowns.values_mut() {
            *remaining = remaining.saturating_sub(1);
        }
    }

    /// Current speed used for turn ordering.
    pub fn effective_speed(&self) -> f64 {
        self.stats.speed as f64 * self.modifiers.speed
    }
}
