use crate::battle::ai::MoveOracle;
use crate::battle::state::{BattleState, TurnRng};
use crate::errors::OracleError;
use crate::move_data::{struggle, STRUGGLE};
use crate::pokemon::BattlePokemon;
use schema::MoveData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceSource {
    Oracle,
    Fallback,
}

/// A concrete move resolved for one side, and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveChoice {
    pub move_data: MoveData,
    pub source: ChoiceSource,
}

/// Wraps a move oracle with a timeout and a guaranteed fallback.
pub struct MoveSelector {
    oracle: Arc<dyn MoveOracle>,
    timeout: Duration,
}

impl MoveSelector {
    pub fn new(oracle: Arc<dyn MoveOracle>, timeout: Duration) -> Self {
        Self { oracle, timeout }
    }

    /// Ask the oracle, turning an elapsed timeout into an error.
    async fn ask_oracle(
        &self,
        attacker: &BattlePokemon,
        defender: &BattlePokemon,
        state: &BattleState,
    ) -> Result<String, OracleError> {
        match tokio::time::timeout(self.timeout, self.oracle.suggest_move(attacker, defender, state))
            .await
        {
            Ok(answer) => answer,
            Err(_) => Err(OracleError::Timeout(self.timeout.as_millis() as u64)),
        }
    }

    /// Ask the oracle for both active combatants concurrently and resolve each answer.
    /// Never fails: every oracle failure falls back independently per side.
    pub async fn select_pair(
        &self,
        side_a: &BattlePokemon,
        side_b: &BattlePokemon,
        state: &BattleState,
        rng: &mut TurnRng,
    ) -> [MoveChoice; 2] {
        let (answer_a, answer_b) = tokio::join!(
            self.ask_oracle(side_a, side_b, state),
            self.ask_oracle(side_b, side_a, state),
        );

        [
            resolve_choice(side_a, answer_a, rng),
            resolve_choice(side_b, answer_b, rng),
        ]
    }
}

/// Validate an oracle answer against the attacker's available moves.
pub fn resolve_choice(
    attacker: &BattlePokemon,
    answer: Result<String, OracleError>,
    rng: &mut TurnRng,
) -> MoveChoice {
    let name = match answer {
        Ok(name) => name,
        Err(err) => {
            warn!(species = %attacker.species_name, error = %err, "Oracle failed, falling back to random move");
            return fallback_choice(attacker, rng);
        }
    };

    let name = name.trim();
    if name.is_empty() {
        warn!(species = %attacker.species_name, "Oracle returned an empty answer, falling back to random move");
        return fallback_choice(attacker, rng);
    }

    if let Some(move_data) = attacker.find_available_move(name) {
        debug!(species = %attacker.species_name, chosen = %move_data.name, "Oracle choice accepted");
        return MoveChoice {
            move_data: move_data.clone(),
            source: ChoiceSource::Oracle,
        };
    }

    if name.eq_ignore_ascii_case(STRUGGLE) && attacker.available_moves().is_empty() {
        return MoveChoice {
            move_data: struggle(),
            source: ChoiceSource::Oracle,
        };
    }

    warn!(
        species = %attacker.species_name,
        chosen = name,
        "Oracle chose an invalid or unavailable move, falling back to random move"
    );
    fallback_choice(attacker, rng)
}

fn fallback_choice(attacker: &BattlePokemon, rng: &mut TurnRng) -> MoveChoice {
    MoveChoice {
        move_data: fallback_move(attacker, rng),
        source: ChoiceSource::Fallback,
    }
}

/// Uniformly random move with zero remaining cooldown, or Struggle if there is none.
pub fn fallback_move(attacker: &BattlePokemon, rng: &mut TurnRng) -> MoveData {
    let available = attacker.available_moves();
    if available.is_empty() {
        return struggle();
    }
    let index = rng.pick_index(available.len(), "Fallback Move");
    available[index].clone()
}
