use crate::battle::state::TurnRng;
use crate::pokemon::BattlePokemon;
use schema::{AbilityEffect, MoveCategory, MoveData, PokemonType};

/// Base chance of a critical hit.
pub const CRITICAL_HIT_RATE: f64 = 1.0 / 16.0;
pub const CRITICAL_HIT_MULTIPLIER: f64 = 1.5;
pub const STAB_MULTIPLIER: f64 = 1.5;

/// Calculate the offensive stat for a move, including the attack modifier and ability boosts
pub fn effective_attack(attacker: &BattlePokemon, move_data: &MoveData) -> f64 {
    let base_attack = match move_data.category {
        MoveCategory::Physical => attacker.stats.attack,
        MoveCategory::Special => attacker.stats.sp_attack,
    };

    let mut attack = base_attack as f64 * attacker.modifiers.attack;

    match attacker.ability.effect {
        AbilityEffect::AllPowerBoost => attack *= attacker.ability.value,
        // Only kicks in below a third of max HP, and only for moves of the user's own type
        AbilityEffect::PowerBoostLowHp
            if (attacker.stats.hp as f64) < attacker.stats.max_hp as f64 / 3.0
                && attacker.has_type(move_data.move_type) =>
        {
            attack *= attacker.ability.value
        }
        _ => {}
    }

    attack
}

/// Calculate the defensive stat for a move. Defender modifiers are not applied.
pub fn effective_defense(defender: &BattlePokemon, move_data: &MoveData) -> f64 {
    let base_defense = match move_data.category {
        MoveCategory::Physical => defender.stats.defense,
        MoveCategory::Special => defender.stats.sp_defense,
    };
    base_defense as f64
}

/// Product of the type chart over every defending type. Missing pairs count as 1.
pub fn get_type_effectiveness(attack_type: PokemonType, defender_types: &[PokemonType]) -> f64 {
    PokemonType::multiplier_against(attack_type, defender_types) as f64
}

pub fn stab_multiplier(attacker: &BattlePokemon, move_data: &MoveData) -> f64 {
    if attacker.has_type(move_data.move_type) {
        STAB_MULTIPLIER
    } else {
        1.0
    }
}

/// Hit check. The move connects unless the draw exceeds accuracy × accuracy modifier.
pub fn move_hits(attacker: &BattlePokemon, move_data: &MoveData, rng: &mut TurnRng) -> bool {
    let threshold = move_data.accuracy * attacker.modifiers.accuracy;
    rng.next_outcome("Hit Check") <= threshold
}

/// Critical check. A crit_boost ability replaces the base rate with its own value.
pub fn move_is_critical(attacker: &BattlePokemon, rng: &mut TurnRng) -> bool {
    let rate = match attacker.ability.effect {
        AbilityEffect::CritBoost => attacker.ability.value,
        _ => CRITICAL_HIT_RATE,
    };
    rng.next_outcome("Critical Hit Check") < rate
}

/// Damage roll in 16 discrete steps: 0.85, 0.86 ... 1.00.
pub fn damage_variance(rng: &mut TurnRng) -> f64 {
    let step = (rng.next_outcome("Damage Variance") * 16.0).floor().min(15.0);
    (step + 85.0) / 100.0
}

/// Multiplier from the defender's damage_reduction ability, if any.
pub fn damage_reduction(defender: &BattlePokemon) -> f64 {
    match defender.ability.effect {
        AbilityEffect::DamageReduction => defender.ability.value,
        _ => 1.0,
    }
}
