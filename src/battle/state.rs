use crate::player::{BattlePlayer, Side};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of narration lines kept on a battle.
pub const LOG_CAPACITY: usize = 50;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Waiting,
    Action,
    Finished,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Lifecycle
    BattleStarted,
    NewBattleStarting,
    BattleEnded {
        winner: Side,
    },

    // Turn Management
    TurnStarted {
        turn: u32,
    },

    // Substitution
    PokemonSentOut {
        side: Side,
        species: String,
    },

    // Attacks
    MoveUsed {
        attacker: String,
        move_name: String,
        critical: bool,
        effectiveness: f64,
        damage: u32,
    },
    MoveMissed {
        attacker: String,
        move_name: String,
    },
    PokemonFainted {
        side: Side,
        species: String,
    },
}

impl BattleEvent {
    /// Formats the event into a narration line using battle context.
    /// Returns None for silent events.
    pub fn format(&self, battle_state: &BattleState) -> Option<String> {
        match self {
            BattleEvent::BattleStarted => Some("Battle Started!".to_string()),
            BattleEvent::NewBattleStarting => Some("New Battle Starting!".to_string()),
            BattleEvent::BattleEnded { winner } => Some(format!(
                "Battle Finished! {} wins!",
                battle_state.player(*winner).name
            )),
            BattleEvent::TurnStarted { turn } => Some(format!("Turn {}:", turn)),
            BattleEvent::PokemonSentOut { side, species } => Some(format!(
                "{} sends out {}!",
                battle_state.player(*side).name,
                species
            )),
            BattleEvent::MoveUsed {
                attacker,
                move_name,
                critical,
                effectiveness,
                damage,
            } => {
                let mut line = format!("{} used {}!", attacker, move_name);
                if *critical {
                    line.push_str(" Critical Hit!");
                }
                line.push_str(Self::effectiveness_text(*effectiveness));
                line.push_str(&format!(" (Dealt {} dmg)", damage));
                Some(line)
            }
            BattleEvent::MoveMissed {
                attacker,
                move_name,
            } => Some(format!("{} used {} but missed!", attacker, move_name)),
            BattleEvent::PokemonFainted { species, .. } => Some(format!("{} fainted!", species)),
        }
    }

    fn effectiveness_text(multiplier: f64) -> &'static str {
        if multiplier > 1.0 {
            " It's super effective!"
        } else if multiplier == 0.0 {
            " It had no effect."
        } else if multiplier < 1.0 {
            " It's not very effective..."
        } else {
            ""
        }
    }
}

/// Ordered collection of the events produced while resolving one step of a battle.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Narration lines for every non-silent event, in order.
    pub fn format_all(&self, battle_state: &BattleState) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| event.format(battle_state))
            .collect()
    }
}

impl fmt::Display for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, event) in self.events.iter().enumerate() {
            writeln!(f, "  {}: {:?}", i + 1, event)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum RngSource {
    Scripted { outcomes: Vec<f64>, index: usize },
    Live(StdRng),
}

/// Source of every random draw made while resolving a battle.
///
/// Draws are uniform in `[0, 1)`. Tests script the exact sequence; live rooms
/// use an entropy-seeded `StdRng`.
#[derive(Debug, Clone)]
pub struct TurnRng {
    source: RngSource,
}

impl TurnRng {
    pub fn new_for_test(outcomes: Vec<f64>) -> Self {
        Self {
            source: RngSource::Scripted { outcomes, index: 0 },
        }
    }

    pub fn new_random() -> Self {
        Self {
            source: RngSource::Live(StdRng::from_rng(&mut rand::rng())),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            source: RngSource::Live(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn next_outcome(&mut self, reason: &str) -> f64 {
        match &mut self.source {
            RngSource::Live(rng) => rng.random::<f64>(),
            RngSource::Scripted { outcomes, index } => {
                if *index >= outcomes.len() {
                    panic!(
                        "TurnRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                        reason
                    );
                }
                let outcome = outcomes[*index];

                #[cfg(test)]
                println!("[RNG] Consumed {} for: {}", outcome, reason);

                *index += 1;
                outcome
            }
        }
    }

    /// Uniform index into a collection of `len` items. `len` must be nonzero.
    pub fn pick_index(&mut self, len: usize, reason: &str) -> usize {
        let draw = self.next_outcome(reason);
        ((draw * len as f64) as usize).min(len.saturating_sub(1))
    }

    pub fn coin_flip(&mut self, reason: &str) -> bool {
        self.next_outcome(reason) < 0.5
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BattleState {
    pub id: String,
    pub battle_number: u32,
    pub turn: u32,
    pub phase: GamePhase,
    pub sides: [BattlePlayer; 2],
    pub log: Vec<String>,
    pub winner: Option<Side>,
}

impl BattleState {
    pub fn new(id: String, battle_number: u32, side_a: BattlePlayer, side_b: BattlePlayer) -> Self {
        Self {
            id,
            battle_number,
            turn: 0,
            phase: GamePhase::Waiting,
            sides: [side_a, side_b],
            log: Vec::new(),
            winner: None,
        }
    }

    pub fn player(&self, side: Side) -> &BattlePlayer {
        &self.sides[side.index()]
    }

    pub fn player_mut(&mut self, side: Side) -> &mut BattlePlayer {
        &mut self.sides[side.index()]
    }

    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::Finished
    }

    /// Append one narration line, dropping the oldest lines beyond the cap.
    pub fn push_log(&mut self, line: String) {
        self.log.push(line);
        if self.log.len() > LOG_CAPACITY {
            let excess = self.log.len() - LOG_CAPACITY;
            self.log.drain(..excess);
        }
    }

    /// Narrate every event of the bus into the log.
    pub fn record(&mut self, bus: &EventBus) {
        for line in bus.format_all(self) {
            self.push_log(line);
        }
    }
}
