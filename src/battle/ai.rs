//! Move oracles: the collaborators that suggest which move a combatant should use.

use crate::battle::state::{BattleState, TurnRng};
use crate::battle::stats::{get_type_effectiveness, stab_multiplier};
use crate::errors::OracleError;
use crate::move_data::STRUGGLE;
use crate::pokemon::BattlePokemon;
use async_trait::async_trait;
use ordered_float::OrderedFloat;
use schema::MoveData;
use tokio::sync::Mutex;

/// A trait for any system that can suggest a move by name.
/// The answer is advisory: the selector validates it against the attacker's moveset.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MoveOracle: Send + Sync {
    async fn suggest_move(
        &self,
        attacker: &BattlePokemon,
        defender: &BattlePokemon,
        state: &BattleState,
    ) -> Result<String, OracleError>;
}

/// Local heuristic oracle. Picks the available move with the best expected damage score.
#[derive(Debug)]
pub struct ScoringOracle {
    jitter: Mutex<TurnRng>,
}

impl Default for ScoringOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringOracle {
    pub fn new() -> Self {
        Self::with_rng(TurnRng::new_random())
    }

    /// Use `rng` for the tie-breaking jitter. Each scored move consumes one draw.
    pub fn with_rng(rng: TurnRng) -> Self {
        Self {
            jitter: Mutex::new(rng),
        }
    }

    /// The core scoring logic. Assigns a floating-point value to a move against a defender.
    fn score_move(
        attacker: &BattlePokemon,
        defender: &BattlePokemon,
        move_data: &MoveData,
        rng: &mut TurnRng,
    ) -> f64 {
        let effectiveness = get_type_effectiveness(move_data.move_type, &defender.types);

        // If the opponent is immune, this is a terrible move.
        if effectiveness < 0.1 {
            return -1.0;
        }

        let mut score = move_data.power as f64
            * effectiveness
            * stab_multiplier(attacker, move_data)
            * move_data.accuracy;

        // Finishing blows favour priority moves
        if defender.current_hp() * 4 < defender.max_hp() && move_data.priority_tier() > 0 {
            score *= 1.5;
        }

        // Add a small random factor to break ties and prevent repetitive loops.
        let random_factor = 1.0 + (rng.next_outcome("oracle jitter") * 0.1 - 0.05); // +/- 5%
        score * random_factor
    }
}

#[async_trait]
impl MoveOracle for ScoringOracle {
    async fn suggest_move(
        &self,
        attacker: &BattlePokemon,
        defender: &BattlePokemon,
        _state: &BattleState,
    ) -> Result<String, OracleError> {
        let available = attacker.available_moves();
        if available.is_empty() {
            return Ok(STRUGGLE.to_string());
        }

        let mut rng = self.jitter.lock().await;
        available
            .into_iter()
            .max_by_key(|m| OrderedFloat(Self::score_move(attacker, defender, m, &mut rng)))
            .map(|m| m.name.clone())
            .ok_or_else(|| OracleError::InvalidResponse("no move scored".to_string()))
    }
}

/// Oracle used when suggestions are disabled. Every call reports unavailability,
/// so the selector always takes its random fallback.
#[derive(Debug, Default)]
pub struct OfflineOracle;

#[async_trait]
impl MoveOracle for OfflineOracle {
    async fn suggest_move(
        &self,
        _attacker: &BattlePokemon,
        _defender: &BattlePokemon,
        _state: &BattleState,
    ) -> Result<String, OracleError> {
        Err(OracleError::Unavailable("oracle disabled".to_string()))
    }
}
