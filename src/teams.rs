use crate::battle::state::{BattleState, TurnRng};
use crate::errors::{CatalogError, CatalogResult};
use crate::player::{BattlePlayer, Side};
use crate::pokemon::BattlePokemon;
use crate::species::all_species;

pub const DEFAULT_TEAM_SIZE: usize = 3;

/// Draw `size` species uniformly at random (with repeats) and build fresh combatants.
pub fn generate_random_team(size: usize, rng: &mut TurnRng) -> CatalogResult<Vec<BattlePokemon>> {
    if size == 0 {
        return Err(CatalogError::EmptyTeam);
    }

    let species = all_species();
    (0..size)
        .map(|_| {
            let index = rng.pick_index(species.len(), "Team Species");
            BattlePokemon::from_species_data(&species[index])
        })
        .collect()
}

/// Convert a random team into a BattlePlayer for the given side
pub fn create_battle_player(side: Side, size: usize, rng: &mut TurnRng) -> CatalogResult<BattlePlayer> {
    let team = generate_random_team(size, rng)?;
    Ok(BattlePlayer::new(side, team))
}

/// A fresh battle with two random teams, in its waiting phase.
pub fn create_random_battle(
    room_id: &str,
    battle_number: u32,
    team_size: usize,
    rng: &mut TurnRng,
) -> CatalogResult<BattleState> {
    let side_a = create_battle_player(Side::A, team_size, rng)?;
    let side_b = create_battle_player(Side::B, team_size, rng)?;
    Ok(BattleState::new(room_id.to_string(), battle_number, side_a, side_b))
}
