use crate::errors::{CatalogError, CatalogResult};
use schema::{BaseStats, PokemonType, SpeciesData};
use std::fmt;
use std::sync::LazyLock;

// Ordered so random draws index into a stable list.
static SPECIES_DATA: LazyLock<Vec<SpeciesData>> = LazyLock::new(build_species_library);

fn species(
    name: &str,
    types: &[PokemonType],
    ability: &str,
    moves: [&str; 4],
    base_stats: [u8; 6],
) -> SpeciesData {
    let [hp, attack, defense, sp_attack, sp_defense, speed] = base_stats;
    SpeciesData {
        name: name.to_string(),
        types: types.to_vec(),
        ability: ability.to_string(),
        moves: moves.iter().map(|m| m.to_string()).collect(),
        base_stats: BaseStats {
            hp,
            attack,
            defense,
            sp_attack,
            sp_defense,
            speed,
        },
    }
}

fn build_species_library() -> Vec<SpeciesData> {
    use PokemonType::*;

    vec![
        species(
            "Charizard",
            &[Fire, Flying],
            "Blaze",
            ["Flamethrower", "Air Slash", "Slash", "Fire Blast"],
            [78, 84, 78, 109, 85, 100],
        ),
        species(
            "Blastoise",
            &[Water],
            "Tanky",
            ["Surf", "Ice Beam", "Crunch", "Hydro Pump"],
            [79, 83, 100, 85, 105, 78],
        ),
        species(
            "Venusaur",
            &[Grass, Poison],
            "Overgrow",
            ["Razor Leaf", "Energy Ball", "Tackle", "Solar Beam"],
            [80, 82, 83, 100, 100, 80],
        ),
        species(
            "Pikachu",
            &[Electric],
            "Swift",
            ["Thunderbolt", "Quick Attack", "Tackle", "Thunder"],
            [35, 55, 40, 50, 50, 90],
        ),
        species(
            "Gengar",
            &[Ghost, Poison],
            "Sniper",
            ["Shadow Ball", "Psychic", "Quick Attack", "Slash"],
            [60, 65, 60, 130, 75, 110],
        ),
        species(
            "Dragonite",
            &[Dragon, Flying],
            "Thick Skin",
            ["Dragon Claw", "Air Slash", "Thunderbolt", "Hyper Beam"],
            [91, 134, 95, 100, 100, 80],
        ),
        species(
            "Snorlax",
            &[Normal],
            "Tanky",
            ["Body Slam", "Crunch", "Tackle", "Hyper Beam"],
            [160, 110, 65, 65, 110, 30],
        ),
        species(
            "Lucario",
            &[Fighting, Steel],
            "Adaptability",
            ["Close Combat", "Bullet Punch", "Crunch", "Quick Attack"],
            [70, 110, 70, 115, 70, 90],
        ),
        species(
            "Tyranitar",
            &[Rock, Dark],
            "Thick Skin",
            ["Rock Slide", "Crunch", "Earthquake", "Hyper Beam"],
            [100, 134, 110, 95, 100, 61],
        ),
        species(
            "Gardevoir",
            &[Psychic, Fairy],
            "Sniper",
            ["Psychic", "Moonblast", "Shadow Ball", "Energy Ball"],
            [68, 65, 65, 125, 115, 80],
        ),
    ]
}

/// Get species data from the global catalog
pub fn get_species_data(name: &str) -> CatalogResult<SpeciesData> {
    SPECIES_DATA
        .iter()
        .find(|data| data.name == name)
        .cloned()
        .ok_or_else(|| CatalogError::SpeciesNotFound(name.to_string()))
}

/// Every species, in catalog order.
pub fn all_species() -> &'static [SpeciesData] {
    &SPECIES_DATA
}

/// Display detailed information about a species including stats
pub struct SpeciesSummary<'a>(pub &'a SpeciesData);

impl fmt::Display for SpeciesSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0;
        writeln!(f, "{}", data.name)?;
        writeln!(f, "--------------------")?;

        let type_names: Vec<String> = data.types.iter().map(|t| t.to_string()).collect();
        writeln!(f, "Type(s): {}", type_names.join(" / "))?;
        writeln!(f, "Ability: {}", data.ability)?;
        writeln!(f, "Moves: {}", data.moves.join(", "))?;
        writeln!(f, "--------------------")?;

        const LABEL_WIDTH: usize = 12;
        let base_stats = &data.base_stats;
        writeln!(f, "{:<LABEL_WIDTH$} : {}", "HP", base_stats.hp)?;
        writeln!(f, "{:<LABEL_WIDTH$} : {}", "Attack", base_stats.attack)?;
        writeln!(f, "{:<LABEL_WIDTH$} : {}", "Defense", base_stats.defense)?;
        writeln!(f, "{:<LABEL_WIDTH$} : {}", "Sp. Atk", base_stats.sp_attack)?;
        writeln!(f, "{:<LABEL_WIDTH$} : {}", "Sp. Def", base_stats.sp_defense)?;
        write!(f, "{:<LABEL_WIDTH$} : {}", "Speed", base_stats.speed)
    }
}
