use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

/// Chart row for an attacking type: (defending type, multiplier).
/// Pairs that are not listed are neutral.
fn chart_row(attacking: PokemonType) -> &'static [(PokemonType, f32)] {
    use PokemonType::*;

    match attacking {
        Normal => &[(Rock, 0.5), (Ghost, 0.0), (Steel, 0.5)],
        Fire => &[
            (Fire, 0.5),
            (Water, 0.5),
            (Grass, 2.0),
            (Ice, 2.0),
            (Bug, 2.0),
            (Rock, 0.5),
            (Dragon, 0.5),
            (Steel, 2.0),
        ],
        Water => &[
            (Fire, 2.0),
            (Water, 0.5),
            (Grass, 0.5),
            (Ground, 2.0),
            (Rock, 2.0),
            (Dragon, 0.5),
        ],
        Electric => &[
            (Water, 2.0),
            (Electric, 0.5),
            (Grass, 0.5),
            (Ground, 0.0),
            (Flying, 2.0),
            (Dragon, 0.5),
        ],
        Grass => &[
            (Fire, 0.5),
            (Water, 2.0),
            (Grass, 0.5),
            (Poison, 0.5),
            (Ground, 2.0),
            (Flying, 0.5),
            (Bug, 0.5),
            (Rock, 2.0),
            (Dragon, 0.5),
            (Steel, 0.5),
        ],
        Ice => &[
            (Fire, 0.5),
            (Water, 0.5),
            (Grass, 2.0),
            (Ice, 0.5),
            (Ground, 2.0),
            (Flying, 2.0),
            (Dragon, 2.0),
            (Steel, 0.5),
        ],
        Fighting => &[
            (Normal, 2.0),
            (Ice, 2.0),
            (Poison, 0.5),
            (Flying, 0.5),
            (Psychic, 0.5),
            (Bug, 0.5),
            (Rock, 2.0),
            (Ghost, 0.0),
            (Dark, 2.0),
            (Steel, 2.0),
            (Fairy, 0.5),
        ],
        Poison => &[
            (Grass, 2.0),
            (Poison, 0.5),
            (Ground, 0.5),
            (Rock, 0.5),
            (Ghost, 0.5),
            (Steel, 0.0),
            (Fairy, 2.0),
        ],
        Ground => &[
            (Fire, 2.0),
            (Electric, 2.0),
            (Grass, 0.5),
            (Poison, 2.0),
            (Flying, 0.0),
            (Bug, 0.5),
            (Rock, 2.0),
            (Steel, 2.0),
        ],
        Flying => &[
            (Electric, 0.5),
            (Grass, 2.0),
            (Fighting, 2.0),
            (Bug, 2.0),
            (Rock, 0.5),
            (Steel, 0.5),
        ],
        Psychic => &[(Fighting, 2.0), (Poison, 2.0), (Psychic, 0.5), (Dark, 0.0), (Steel, 0.5)],
        Bug => &[
            (Fire, 0.5),
            (Grass, 2.0),
            (Fighting, 0.5),
            (Poison, 0.5),
            (Flying, 0.5),
            (Psychic, 2.0),
            (Ghost, 0.5),
            (Dark, 2.0),
            (Steel, 0.5),
            (Fairy, 0.5),
        ],
        Rock => &[
            (Fire, 2.0),
            (Ice, 2.0),
            (Fighting, 0.5),
            (Ground, 0.5),
            (Flying, 2.0),
            (Bug, 2.0),
            (Steel, 0.5),
        ],
        Ghost => &[(Normal, 0.0), (Psychic, 2.0), (Ghost, 2.0), (Dark, 0.5)],
        Dragon => &[(Dragon, 2.0), (Steel, 0.5), (Fairy, 0.0)],
        Dark => &[(Fighting, 0.5), (Psychic, 2.0), (Ghost, 2.0), (Dark, 0.5), (Fairy, 0.5)],
        Steel => &[
            (Fire, 0.5),
            (Water, 0.5),
            (Electric, 0.5),
            (Ice, 2.0),
            (Rock, 2.0),
            (Steel, 0.5),
            (Fairy, 2.0),
        ],
        Fairy => &[
            (Fire, 0.5),
            (Fighting, 2.0),
            (Poison, 0.5),
            (Dragon, 2.0),
            (Dark, 2.0),
            (Steel, 0.5),
        ],
    }
}

impl PokemonType {
    /// Calculate type effectiveness multiplier for attacking type vs defending type
    /// Returns: 2.0 = Super Effective, 1.0 = Normal, 0.5 = Not Very Effective, 0.0 = No Effect
    pub fn type_effectiveness(attacking: PokemonType, defending: PokemonType) -> f32 {
        chart_row(attacking)
            .iter()
            .find(|(defender, _)| *defender == defending)
            .map(|(_, multiplier)| *multiplier)
            .unwrap_or(1.0)
    }

    /// Product of the chart value against every defending type.
    pub fn multiplier_against(attacking: PokemonType, defending: &[PokemonType]) -> f32 {
        defending
            .iter()
            .map(|defender| Self::type_effectiveness(attacking, *defender))
            .product()
    }

    pub fn is_immune(attacking: PokemonType, defending: PokemonType) -> bool {
        Self::type_effectiveness(attacking, defending) == 0.0
    }

    /// Every explicit (attacking, defending, multiplier) entry of the chart.
    pub fn chart_entries() -> impl Iterator<Item = (PokemonType, PokemonType, f32)> {
        PokemonType::iter().flat_map(|attacker| {
            chart_row(attacker)
                .iter()
                .map(move |(defender, multiplier)| (attacker, *defender, *multiplier))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_chart_entries_resolve_to_table_values() {
        for (attacking, defending, expected) in PokemonType::chart_entries() {
            assert_eq!(
                PokemonType::type_effectiveness(attacking, defending),
                expected,
                "{} vs {}",
                attacking,
                defending
            );
        }
    }

    #[test]
    fn test_unlisted_pairs_are_neutral() {
        for attacking in PokemonType::iter() {
            for defending in PokemonType::iter() {
                let listed = PokemonType::chart_entries()
                    .any(|(a, d, _)| a == attacking && d == defending);
                if !listed {
                    assert_eq!(PokemonType::type_effectiveness(attacking, defending), 1.0);
                }
            }
        }
    }

    #[test]
    fn test_dual_type_multiplier_is_product() {
        // Electric vs Water/Flying: 2 * 2
        assert_eq!(
            PokemonType::multiplier_against(
                PokemonType::Electric,
                &[PokemonType::Water, PokemonType::Flying]
            ),
            4.0
        );
        // Ground vs Fire/Flying: 2 * 0
        assert_eq!(
            PokemonType::multiplier_against(
                PokemonType::Ground,
                &[PokemonType::Fire, PokemonType::Flying]
            ),
            0.0
        );
        assert!(PokemonType::is_immune(PokemonType::Normal, PokemonType::Ghost));
    }

    #[test]
    fn test_type_names_parse_case_insensitively() {
        assert_eq!(PokemonType::from_str("fire"), Ok(PokemonType::Fire));
        assert_eq!(PokemonType::from_str("Steel"), Ok(PokemonType::Steel));
        assert_eq!(PokemonType::Fairy.to_string(), "fairy");
    }
}
