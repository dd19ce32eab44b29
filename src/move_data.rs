use crate::errors::{CatalogError, CatalogResult};
use schema::{AbilityData, AbilityEffect, MoveCategory, MoveData, PokemonType};
use std::collections::HashMap;
use std::sync::LazyLock;

pub const STRUGGLE: &str = "Struggle";

// Global move catalog, keyed by move name.
static MOVE_DATA: LazyLock<HashMap<String, MoveData>> = LazyLock::new(|| {
    build_move_library()
        .into_iter()
        .map(|data| (data.name.clone(), data))
        .collect()
});

// Global ability catalog, keyed by ability name.
static ABILITY_DATA: LazyLock<HashMap<String, AbilityData>> = LazyLock::new(|| {
    build_ability_library()
        .into_iter()
        .map(|data| (data.name.clone(), data))
        .collect()
});

fn build_move_library() -> Vec<MoveData> {
    use MoveCategory::{Physical, Special};
    use PokemonType::*;

    vec![
        MoveData::new("Flamethrower", 90, 0.95, Fire, Special, 1),
        MoveData::new("Fire Blast", 110, 0.8, Fire, Special, 3),
        MoveData::new("Flame Wheel", 70, 1.0, Fire, Physical, 0),
        MoveData::new("Surf", 90, 0.95, Water, Special, 1),
        MoveData::new("Hydro Pump", 110, 0.8, Water, Special, 3),
        MoveData::new("Aqua Tail", 85, 0.9, Water, Physical, 1),
        MoveData::new("Razor Leaf", 75, 0.95, Grass, Physical, 0),
        MoveData::new("Solar Beam", 110, 0.85, Grass, Special, 3),
        MoveData::new("Energy Ball", 90, 0.95, Grass, Special, 1),
        MoveData::new("Thunderbolt", 90, 0.95, Electric, Special, 1),
        MoveData::new("Thunder", 110, 0.8, Electric, Special, 3),
        MoveData::new("Spark", 70, 1.0, Electric, Physical, 0),
        MoveData::new("Psychic", 90, 0.95, Psychic, Special, 1),
        MoveData::new("Shadow Ball", 85, 0.95, Ghost, Special, 1),
        MoveData::new("Earthquake", 100, 0.9, Ground, Physical, 2),
        MoveData::new("Rock Slide", 85, 0.9, Rock, Physical, 1),
        MoveData::new("Close Combat", 100, 0.9, Fighting, Physical, 2),
        MoveData::new("Ice Beam", 90, 0.95, Ice, Special, 1),
        MoveData::new("Dragon Claw", 85, 0.95, Dragon, Physical, 1),
        MoveData::new("Crunch", 80, 0.95, Dark, Physical, 0),
        MoveData::new("Slash", 70, 1.0, Normal, Physical, 0),
        MoveData::new("Quick Attack", 40, 1.0, Normal, Physical, 0).with_priority(1),
        MoveData::new("Tackle", 50, 1.0, Normal, Physical, 0),
        MoveData::new("Hyper Beam", 120, 0.75, Normal, Special, 4),
        MoveData::new("Air Slash", 75, 0.95, Flying, Special, 1),
        MoveData::new("Bullet Punch", 40, 1.0, Steel, Physical, 0).with_priority(1),
        MoveData::new("Moonblast", 90, 0.95, Fairy, Special, 1),
        MoveData::new("X-Scissor", 80, 0.95, Bug, Physical, 1),
        MoveData::new("Body Slam", 85, 1.0, Normal, Physical, 1),
    ]
}

fn build_ability_library() -> Vec<AbilityData> {
    use AbilityEffect::*;

    let ability = |name: &str, effect: AbilityEffect, value: f64| AbilityData {
        name: name.to_string(),
        effect,
        value,
    };

    vec![
        ability("Blaze", PowerBoostLowHp, 1.15),
        ability("Torrent", PowerBoostLowHp, 1.15),
        ability("Overgrow", PowerBoostLowHp, 1.15),
        ability("Swift", SpeedFlat, 15.0),
        ability("Tanky", HpFlat, 20.0),
        ability("Thick Skin", DamageReduction, 0.9),
        ability("Sniper", CritBoost, 0.15),
        ability("Intimidate", EnemyAttackDown, 0.9),
        ability("Moxie", AttackOnKo, 1.1),
        ability("Speed Boost", SpeedPerTurn, 10.0),
        ability("Sturdy", SurviveOneHit, 1.0),
        ability("Adaptability", AllPowerBoost, 1.1),
    ]
}

/// Get move data for a specific move from the global catalog
pub fn get_move_data(name: &str) -> CatalogResult<MoveData> {
    MOVE_DATA
        .get(name)
        .cloned()
        .ok_or_else(|| CatalogError::MoveNotFound(name.to_string()))
}

/// Get ability data for a specific ability from the global catalog
pub fn get_ability_data(name: &str) -> CatalogResult<AbilityData> {
    ABILITY_DATA
        .get(name)
        .cloned()
        .ok_or_else(|| CatalogError::AbilityNotFound(name.to_string()))
}

/// The guaranteed fallback move. It is never part of a moveset.
pub fn struggle() -> MoveData {
    MoveData::new(STRUGGLE, 50, 1.0, PokemonType::Normal, MoveCategory::Physical, 0)
}

pub fn move_names() -> impl Iterator<Item = &'static str> {
    MOVE_DATA.keys().map(String::as_str)
}

pub fn ability_names() -> impl Iterator<Item = &'static str> {
    ABILITY_DATA.keys().map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(move_names().count(), 29);
        assert_eq!(ability_names().count(), 12);
    }

    #[rstest]
    #[case("Quick Attack", 1)]
    #[case("Bullet Punch", 1)]
    #[case("Tackle", 0)]
    #[case("Hyper Beam", 0)]
    fn test_priority_tiers(#[case] name: &str, #[case] expected: i8) {
        let data = get_move_data(name).unwrap();
        assert_eq!(data.priority_tier(), expected);
    }

    #[test]
    fn test_move_lookup() {
        let flamethrower = get_move_data("Flamethrower").unwrap();
        assert_eq!(flamethrower.power, 90);
        assert_eq!(flamethrower.accuracy, 0.95);
        assert_eq!(flamethrower.move_type, PokemonType::Fire);
        assert_eq!(flamethrower.category, MoveCategory::Special);
        assert_eq!(flamethrower.cooldown, 1);
    }

    #[test]
    fn test_unknown_entries_are_errors() {
        assert_eq!(
            get_move_data("Splash"),
            Err(CatalogError::MoveNotFound("Splash".to_string()))
        );
        assert_eq!(
            get_ability_data("Levitate"),
            Err(CatalogError::AbilityNotFound("Levitate".to_string()))
        );
    }

    #[test]
    fn test_struggle_is_not_in_catalog() {
        let struggle = struggle();
        assert_eq!(struggle.power, 50);
        assert_eq!(struggle.cooldown, 0);
        assert!(get_move_data(STRUGGLE).is_err());
    }

    #[test]
    fn test_ability_lookup() {
        let tanky = get_ability_data("Tanky").unwrap();
        assert_eq!(tanky.effect, AbilityEffect::HpFlat);
        assert_eq!(tanky.value, 20.0);
    }
}
