use crate::battle::ai::MoveOracle;
use crate::battle::runner::BattleServices;
use crate::battle::selector::{MoveSelector, DEFAULT_ORACLE_TIMEOUT};
use crate::battle::state::{BattleState, GamePhase, TurnRng};
use crate::broadcast::ChannelSink;
use crate::payments::LedgerRail;
use crate::settlement::SettlementEngine;
use crate::wagers::InMemoryWagerStore;
use crate::move_data::{get_ability_data, get_move_data};
use crate::player::{BattlePlayer, Side};
use crate::pokemon::BattlePokemon;
use schema::PokemonType;
use std::sync::Arc;

/// A builder for creating test combatants with catalog defaults.
///
/// # Example
/// ```ignore
/// let pokemon = TestPokemonBuilder::new("Pikachu")
///     .with_moves(vec!["Tackle"])
///     .with_hp(20)
///     .build();
/// ```
pub struct TestPokemonBuilder {
    species: &'static str,
    moves: Option<Vec<&'static str>>,
    ability: Option<&'static str>,
    types: Option<Vec<PokemonType>>,
    current_hp: Option<u32>,
    attack: Option<u32>,
    defense: Option<u32>,
    speed: Option<u32>,
    cooldowns: Vec<(&'static str, u8)>,
}

impl TestPokemonBuilder {
    /// Creates a new builder for a given catalog species.
    pub fn new(species: &'static str) -> Self {
        Self {
            species,
            moves: None,
            ability: None,
            types: None,
            current_hp: None,
            attack: None,
            defense: None,
            speed: None,
            cooldowns: Vec::new(),
        }
    }

    /// Replaces the moveset with catalog moves.
    pub fn with_moves(mut self, moves: Vec<&'static str>) -> Self {
        self.moves = Some(moves);
        self
    }

    pub fn with_ability(mut self, ability: &'static str) -> Self {
        self.ability = Some(ability);
        self
    }

    pub fn with_types(mut self, types: Vec<PokemonType>) -> Self {
        self.types = Some(types);
        self
    }

    /// Sets the current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.current_hp = Some(hp);
        self
    }

    /// Sets both attack and special attack.
    pub fn with_attack(mut self, attack: u32) -> Self {
        self.attack = Some(attack);
        self
    }

    /// Sets both defense and special defense.
    pub fn with_defense(mut self, defense: u32) -> Self {
        self.defense = Some(defense);
        self
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_cooldown(mut self, move_name: &'static str, turns: u8) -> Self {
        self.cooldowns.push((move_name, turns));
        self
    }

    /// Builds the `BattlePokemon`.
    pub fn build(self) -> BattlePokemon {
        let mut pokemon = match BattlePokemon::from_species(self.species) {
            Ok(pokemon) => pokemon,
            Err(err) => panic!("Failed to build {}: {}", self.species, err),
        };

        if let Some(moves) = self.moves {
            pokemon.moves = moves
                .into_iter()
                .map(|name| get_move_data(name).unwrap())
                .collect();
        }
        if let Some(ability) = self.ability {
            pokemon.ability = get_ability_data(ability).unwrap();
        }
        if let Some(types) = self.types {
            pokemon.types = types;
        }
        if let Some(attack) = self.attack {
            pokemon.stats.attack = attack;
            pokemon.stats.sp_attack = attack;
        }
        if let Some(defense) = self.defense {
            pokemon.stats.defense = defense;
            pokemon.stats.sp_defense = defense;
        }
        if let Some(speed) = self.speed {
            pokemon.stats.speed = speed;
        }
        for (move_name, turns) in self.cooldowns {
            pokemon.cooldowns.insert(move_name.to_string(), turns);
        }
        if let Some(hp) = self.current_hp {
            pokemon.set_hp(hp);
        }

        pokemon
    }
}

/// Creates a side with the given team.
pub fn create_test_player(side: Side, team: Vec<BattlePokemon>) -> BattlePlayer {
    BattlePlayer::new(side, team)
}

/// Creates a 1v1 battle state in its action phase.
pub fn create_test_battle(side_a: BattlePokemon, side_b: BattlePokemon) -> BattleState {
    create_team_battle(vec![side_a], vec![side_b])
}

/// Creates a team battle state in its action phase.
pub fn create_team_battle(team_a: Vec<BattlePokemon>, team_b: Vec<BattlePokemon>) -> BattleState {
    let mut state = BattleState::new(
        "test_room".to_string(),
        1,
        create_test_player(Side::A, team_a),
        create_test_player(Side::B, team_b),
    );
    state.phase = GamePhase::Action;
    state
}

/// Draws that make every attack hit, never crit, and roll maximum variance.
pub fn predictable_rng() -> TurnRng {
    TurnRng::new_for_test([0.0, 0.99, 0.99].repeat(40))
}

/// Room collaborators backed by in-memory implementations, with handles kept for assertions.
pub struct TestServices {
    pub services: BattleServices,
    pub sink: Arc<ChannelSink>,
    pub store: Arc<InMemoryWagerStore>,
    pub rail: Arc<LedgerRail>,
}

pub fn create_test_services(oracle: Arc<dyn MoveOracle>) -> TestServices {
    let sink = Arc::new(ChannelSink::new(64));
    let store = Arc::new(InMemoryWagerStore::new());
    let rail = Arc::new(LedgerRail::new());
    let services = BattleServices {
        selector: Arc::new(MoveSelector::new(oracle, DEFAULT_ORACLE_TIMEOUT)),
        settlement: Arc::new(SettlementEngine::new(store.clone(), rail.clone())),
        sink: sink.clone(),
        team_size: 3,
    };
    TestServices {
        services,
        sink,
        store,
        rail,
    }
}
