use crate::battle::state::TurnRng;
use crate::battle::stats::{
    damage_reduction, damage_variance, effective_attack, effective_defense,
    get_type_effectiveness, move_hits, move_is_critical, stab_multiplier,
    CRITICAL_HIT_MULTIPLIER,
};
use crate::pokemon::BattlePokemon;
use schema::MoveData;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageOutcome {
    pub damage: u32,
    pub critical: bool,
    pub effectiveness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackOutcome {
    Missed,
    Hit(DamageOutcome),
}

/// Calculate the damage of a move that already passed its hit check.
///
/// Consumes two draws from `rng`: critical check, then damage variance.
pub fn calculate_damage(
    attacker: &BattlePokemon,
    defender: &BattlePokemon,
    move_data: &MoveData,
    rng: &mut TurnRng,
) -> DamageOutcome {
    let offense = effective_attack(attacker, move_data);
    let defense = effective_defense(defender, move_data).max(1.0);

    // Level 50 damage formula
    let mut damage = ((22.0 * offense * move_data.power as f64 / defense) / 50.0) + 2.0;

    let critical = move_is_critical(attacker, rng);
    if critical {
        damage *= CRITICAL_HIT_MULTIPLIER;
    }

    damage *= stab_multiplier(attacker, move_data);

    let effectiveness = get_type_effectiveness(move_data.move_type, &defender.types);
    damage *= effectiveness;

    damage *= damage_variance(rng);
    damage *= damage_reduction(defender);

    DamageOutcome {
        damage: damage.max(0.0).floor() as u32,
        critical,
        effectiveness,
    }
}

/// Run the hit check and, on a hit, the damage calculation.
///
/// Draw order per attack is hit, critical, variance. A miss consumes only the hit draw.
pub fn calculate_attack_outcome(
    attacker: &BattlePokemon,
    defender: &BattlePokemon,
    move_data: &MoveData,
    rng: &mut TurnRng,
) -> AttackOutcome {
    if !move_hits(attacker, move_data, rng) {
        return AttackOutcome::Missed;
    }
    AttackOutcome::Hit(calculate_damage(attacker, defender, move_data, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::TestPokemonBuilder;
    use crate::move_data::get_move_data;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_miss_consumes_only_hit_draw() {
        let attacker = TestPokemonBuilder::new("Charizard").build();
        let defender = TestPokemonBuilder::new("Snorlax").build();
        let fire_blast = get_move_data("Fire Blast").unwrap();

        // Exactly one draw available: a second draw would panic
        let mut rng = TurnRng::new_for_test(vec![0.95]);
        assert_eq!(
            calculate_attack_outcome(&attacker, &defender, &fire_blast, &mut rng),
            AttackOutcome::Missed
        );
    }

    #[test]
    fn test_immune_defender_takes_zero() {
        let attacker = TestPokemonBuilder::new("Snorlax").build();
        let defender = TestPokemonBuilder::new("Gengar").build();
        let body_slam = get_move_data("Body Slam").unwrap();

        let mut rng = TurnRng::new_for_test(vec![0.0, 0.99, 0.99]);
        let outcome = calculate_attack_outcome(&attacker, &defender, &body_slam, &mut rng);
        assert_eq!(
            outcome,
            AttackOutcome::Hit(DamageOutcome {
                damage: 0,
                critical: false,
                effectiveness: 0.0,
            })
        );
    }

    #[test]
    fn test_critical_multiplies_damage() {
        let attacker = TestPokemonBuilder::new("Pikachu")
            .with_attack(100)
            .with_types(vec![schema::PokemonType::Electric])
            .build();
        let defender = TestPokemonBuilder::new("Pikachu").with_defense(100).build();
        let tackle = get_move_data("Tackle").unwrap();

        let mut normal_rng = TurnRng::new_for_test(vec![0.99, 0.99]);
        let normal = calculate_damage(&attacker, &defender, &tackle, &mut normal_rng);

        let mut crit_rng = TurnRng::new_for_test(vec![0.0, 0.99]);
        let crit = calculate_damage(&attacker, &defender, &tackle, &mut crit_rng);

        // (22 * 100 * 50 / 100) / 50 + 2 = 24
        assert_eq!(normal.damage, 24);
        assert!(crit.critical);
        assert_eq!(crit.damage, 36);
    }
}
