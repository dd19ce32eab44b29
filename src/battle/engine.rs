use crate::battle::calculators::{calculate_attack_outcome, AttackOutcome};
use crate::battle::state::{BattleEvent, BattleState, EventBus, GamePhase, TurnRng};
use crate::player::Side;
use schema::MoveData;
use std::cmp::Ordering;

/// Result of the substitution step that opens every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStart {
    /// Both actives can fight; attacks happen this tick.
    Ready,
    /// At least one side sent in a replacement. No attacks this tick.
    Substituted,
    /// A side had nobody left to send in.
    Eliminated { winner: Side },
    /// The battle is not in its action phase.
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnResolution {
    Continued,
    Ended { winner: Side },
}

/// Advance the turn counter and replace fainted actives.
///
/// Every side that needs a replacement gets one in the same tick. A side with no
/// living member left loses immediately.
pub fn prepare_turn(battle_state: &mut BattleState, bus: &mut EventBus) -> TurnStart {
    if battle_state.phase != GamePhase::Action {
        return TurnStart::Inactive;
    }

    battle_state.turn += 1;

    let mut substituted = false;
    for side in Side::BOTH {
        let player = battle_state.player_mut(side);
        if !player.needs_replacement() {
            continue;
        }

        match player.substitute() {
            Some(index) => {
                bus.push(BattleEvent::PokemonSentOut {
                    side,
                    species: player.team[index].species_name.clone(),
                });
                substituted = true;
            }
            None => {
                return TurnStart::Eliminated {
                    winner: side.opponent(),
                }
            }
        }
    }

    if substituted {
        TurnStart::Substituted
    } else {
        TurnStart::Ready
    }
}

/// Order the two sides for this turn: higher priority tier first, then higher current
/// speed, then a coin flip. The flip only consumes a draw on an exact tie.
pub fn determine_action_order(
    battle_state: &BattleState,
    moves: &[MoveData; 2],
    rng: &mut TurnRng,
) -> [Side; 2] {
    let priority_cmp = moves[0].priority_tier().cmp(&moves[1].priority_tier());

    let ordering = if priority_cmp != Ordering::Equal {
        priority_cmp
    } else {
        let speed_of = |side: Side| {
            battle_state
                .player(side)
                .active_pokemon()
                .map_or(0.0, |p| p.effective_speed())
        };
        speed_of(Side::A)
            .partial_cmp(&speed_of(Side::B))
            .unwrap_or(Ordering::Equal)
    };

    match ordering {
        Ordering::Greater => [Side::A, Side::B],
        Ordering::Less => [Side::B, Side::A],
        Ordering::Equal => {
            if rng.coin_flip("Speed Tie") {
                [Side::A, Side::B]
            } else {
                [Side::B, Side::A]
            }
        }
    }
}

/// Resolve the attacking part of a turn. `moves` is indexed by side (A, B).
///
/// The second attack is skipped if the first one knocks its target out. Cooldowns
/// of both actives tick down afterwards, including on an early exit.
pub fn resolve_turn(
    battle_state: &mut BattleState,
    moves: [MoveData; 2],
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> TurnResolution {
    bus.push(BattleEvent::TurnStarted {
        turn: battle_state.turn,
    });

    let order = determine_action_order(battle_state, &moves, rng);
    let mut resolution = TurnResolution::Continued;

    for attacker_side in order {
        let move_data = &moves[attacker_side.index()];
        let defender_side = attacker_side.opponent();

        let knocked_out = execute_attack(battle_state, attacker_side, move_data, rng, bus);
        if knocked_out {
            let defender = battle_state.player_mut(defender_side);
            defender.fainted_count += 1;
            if let Some(fainted) = defender.active_pokemon() {
                bus.push(BattleEvent::PokemonFainted {
                    side: defender_side,
                    species: fainted.species_name.clone(),
                });
            }

            if !battle_state.player(defender_side).has_living_members() {
                resolution = TurnResolution::Ended {
                    winner: attacker_side,
                };
            }
            break;
        }
    }

    tick_cooldowns(battle_state);
    resolution
}

/// Execute one attack from the active of `attacker_side` on the opposing active.
/// Returns true if the defender fainted from it.
fn execute_attack(
    battle_state: &mut BattleState,
    attacker_side: Side,
    move_data: &MoveData,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> bool {
    let defender_side = attacker_side.opponent();

    let (attacker_name, outcome) = {
        let (Some(attacker), Some(defender)) = (
            battle_state.player(attacker_side).active_pokemon(),
            battle_state.player(defender_side).active_pokemon(),
        ) else {
            return false;
        };
        (
            attacker.species_name.clone(),
            calculate_attack_outcome(attacker, defender, move_data, rng),
        )
    };

    match outcome {
        AttackOutcome::Missed => {
            bus.push(BattleEvent::MoveMissed {
                attacker: attacker_name,
                move_name: move_data.name.clone(),
            });
            false
        }
        AttackOutcome::Hit(damage) => {
            if let Some(attacker) = battle_state.player_mut(attacker_side).active_pokemon_mut() {
                attacker.start_cooldown(move_data);
            }

            bus.push(BattleEvent::MoveUsed {
                attacker: attacker_name,
                move_name: move_data.name.clone(),
                critical: damage.critical,
                effectiveness: damage.effectiveness,
                damage: damage.damage,
            });

            battle_state
                .player_mut(defender_side)
                .active_pokemon_mut()
                .map_or(false, |defender| defender.take_damage(damage.damage))
        }
    }
}

fn tick_cooldowns(battle_state: &mut BattleState) {
    for side in Side::BOTH {
        if let Some(active) = battle_state.player_mut(side).active_pokemon_mut() {
            active.tick_cooldowns();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{create_test_battle, TestPokemonBuilder};
    use crate::move_data::get_move_data;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prepare_turn_is_inactive_outside_action_phase() {
        let mut state = create_test_battle(
            TestPokemonBuilder::new("Pikachu").build(),
            TestPokemonBuilder::new("Gengar").build(),
        );
        state.phase = GamePhase::Waiting;
        let mut bus = EventBus::new();

        assert_eq!(prepare_turn(&mut state, &mut bus), TurnStart::Inactive);
        assert_eq!(state.turn, 0);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_single_tick_narration() {
        let mut state = create_test_battle(
            TestPokemonBuilder::new("Pikachu").build(),
            TestPokemonBuilder::new("Snorlax").build(),
        );
        let mut bus = EventBus::new();
        assert_eq!(prepare_turn(&mut state, &mut bus), TurnStart::Ready);

        let moves = [
            get_move_data("Tackle").unwrap(),
            get_move_data("Hyper Beam").unwrap(),
        ];
        // Pikachu is faster. Pikachu hits, Snorlax misses.
        let mut rng = TurnRng::new_for_test(vec![0.0, 0.99, 0.99, 0.9]);
        let resolution = resolve_turn(&mut state, moves, &mut rng, &mut bus);
        assert_eq!(resolution, TurnResolution::Continued);

        let lines = bus.format_all(&state);
        assert_eq!(lines[0], "Turn 1:");
        assert!(lines[1].starts_with("Pikachu used Tackle! (Dealt "));
        assert_eq!(lines[2], "Snorlax used Hyper Beam but missed!");

        // A miss sets no cooldown
        let snorlax = state.player(Side::B).active_pokemon().unwrap();
        assert_eq!(snorlax.cooldown("Hyper Beam"), 0);
    }
}
