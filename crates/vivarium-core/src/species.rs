//! Species catalog: the closed set of plants and insects and their static traits.

use crate::{GrowthLight, Kind, ReproductionMode, Sex};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Species {
    PetitHerbe,
    GrandHerbe,
    Champignon,
    Escargot,
    Grillons,
    Lombric,
    PetitSerpent,
    AraigneeSauteuse,
}

/// Static parameters shared by every plant of a species
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantTraits {
    pub max_parts: u32,
    pub initial_parts: u32,
    /// Parts gained per tick of suitable light
    pub growth_rate: u32,
    pub growth_light: GrowthLight,
    /// Age (ticks) at which the plant withers
    pub lifespan: u32,
    pub reproduction: ReproductionMode,
    /// Per-tick probability that a mature plant seeds a neighbouring cell
    pub spread_chance: f32,
}

/// Whether a species is hermaphrodite or split into males and females
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sexes {
    Hermaphrodite,
    Dioecious,
}

/// Static parameters shared by every insect of a species
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsectTraits {
    pub max_energy: u32,
    pub initial_energy: u32,
    /// Below this energy the insect looks for food
    pub feeding_threshold: u32,
    pub energy_per_bite: u32,
    /// Range for eating, pairing
    pub sensing_radius: i32,
    /// Range for steering toward food or partners
    pub extended_sensing_radius: i32,
    pub maturity_age: u32,
    /// Ticks between two reproductions
    pub reproduction_cooldown: u32,
    pub min_reproduce_energy: u32,
    pub lifespan: u32,
    pub sexes: Sexes,
}

impl InsectTraits {
    /// Sexes an individual of this species may be born with
    pub fn birth_sexes(&self) -> &'static [Sex] {
        match self.sexes {
            Sexes::Hermaphrodite => &[Sex::Hermaphrodite],
            Sexes::Dioecious => &[Sex::Male, Sex::Female],
        }
    }
}

impl Species {
    pub const ALL: [Species; 8] = [
        Species::PetitHerbe,
        Species::GrandHerbe,
        Species::Champignon,
        Species::Escargot,
        Species::Grillons,
        Species::Lombric,
        Species::PetitSerpent,
        Species::AraigneeSauteuse,
    ];

    pub fn kind(&self) -> Kind {
        match self {
            Species::PetitHerbe | Species::GrandHerbe | Species::Champignon => Kind::Plant,
            Species::Escargot
            | Species::Grillons
            | Species::Lombric
            | Species::PetitSerpent
            | Species::AraigneeSauteuse => Kind::Insect,
        }
    }

    pub fn is_plant(&self) -> bool {
        self.kind() == Kind::Plant
    }

    pub fn is_insect(&self) -> bool {
        self.kind() == Kind::Insect
    }

    pub fn plant_traits(&self) -> Option<PlantTraits> {
        let traits = match self {
            Species::PetitHerbe => PlantTraits {
                max_parts: 5,
                initial_parts: 3,
                growth_rate: 1,
                growth_light: GrowthLight::Day,
                lifespan: 400,
                reproduction: ReproductionMode::Seeds,
                spread_chance: 0.05,
            },
            Species::GrandHerbe => PlantTraits {
                max_parts: 10,
                initial_parts: 6,
                growth_rate: 1,
                growth_light: GrowthLight::Day,
                lifespan: 800,
                reproduction: ReproductionMode::Runners,
                spread_chance: 0.03,
            },
            Species::Champignon => PlantTraits {
                max_parts: 3,
                initial_parts: 2,
                growth_rate: 1,
                growth_light: GrowthLight::Night,
                lifespan: 150,
                reproduction: ReproductionMode::Spores,
                spread_chance: 0.08,
            },
            _ => return None,
        };
        Some(traits)
    }

    pub fn insect_traits(&self) -> Option<InsectTraits> {
        let traits = match self {
            Species::Escargot => InsectTraits {
                max_energy: 20,
                initial_energy: 10,
                feeding_threshold: 6,
                energy_per_bite: 4,
                sensing_radius: 2,
                extended_sensing_radius: 4,
                maturity_age: 5,
                reproduction_cooldown: 12,
                min_reproduce_energy: 5,
                lifespan: 300,
                sexes: Sexes::Hermaphrodite,
            },
            Species::Grillons => InsectTraits {
                max_energy: 18,
                initial_energy: 10,
                feeding_threshold: 7,
                energy_per_bite: 3,
                sensing_radius: 3,
                extended_sensing_radius: 6,
                maturity_age: 4,
                reproduction_cooldown: 10,
                min_reproduce_energy: 6,
                lifespan: 200,
                sexes: Sexes::Dioecious,
            },
            Species::Lombric => InsectTraits {
                max_energy: 16,
                initial_energy: 10,
                feeding_threshold: 6,
                energy_per_bite: 3,
                sensing_radius: 1,
                extended_sensing_radius: 3,
                maturity_age: 6,
                reproduction_cooldown: 15,
                min_reproduce_energy: 5,
                lifespan: 400,
                sexes: Sexes::Hermaphrodite,
            },
            Species::PetitSerpent => InsectTraits {
                max_energy: 30,
                initial_energy: 10,
                feeding_threshold: 9,
                energy_per_bite: 5,
                sensing_radius: 3,
                extended_sensing_radius: 7,
                maturity_age: 10,
                reproduction_cooldown: 25,
                min_reproduce_energy: 8,
                lifespan: 500,
                sexes: Sexes::Dioecious,
            },
            Species::AraigneeSauteuse => InsectTraits {
                max_energy: 22,
                initial_energy: 10,
                feeding_threshold: 8,
                energy_per_bite: 4,
                sensing_radius: 4,
                extended_sensing_radius: 8,
                maturity_age: 6,
                reproduction_cooldown: 18,
                min_reproduce_energy: 7,
                lifespan: 250,
                sexes: Sexes::Dioecious,
            },
            _ => return None,
        };
        Some(traits)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Species::PetitHerbe => "PetitHerbe",
            Species::GrandHerbe => "GrandHerbe",
            Species::Champignon => "Champignon",
            Species::Escargot => "Escargot",
            Species::Grillons => "Grillons",
            Species::Lombric => "Lombric",
            Species::PetitSerpent => "PetitSerpent",
            Species::AraigneeSauteuse => "AraigneeSauteuse",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_species_has_exactly_one_trait_set() {
        for species in Species::ALL {
            match species.kind() {
                Kind::Plant => {
                    assert!(species.plant_traits().is_some(), "{species}");
                    assert!(species.insect_traits().is_none(), "{species}");
                }
                Kind::Insect => {
                    assert!(species.insect_traits().is_some(), "{species}");
                    assert!(species.plant_traits().is_none(), "{species}");
                }
            }
        }
    }

    #[test]
    fn test_plant_traits_are_consistent() {
        for species in Species::ALL.iter().filter(|s| s.is_plant()) {
            let traits = species.plant_traits().unwrap();
            assert!(traits.initial_parts > 0);
            assert!(traits.initial_parts <= traits.max_parts);
            assert!((0.0..=1.0).contains(&traits.spread_chance));
        }
    }

    #[test]
    fn test_insect_traits_are_consistent() {
        for species in Species::ALL.iter().filter(|s| s.is_insect()) {
            let traits = species.insect_traits().unwrap();
            assert!(traits.initial_energy > 0);
            assert!(traits.initial_energy <= traits.max_energy);
            assert!(traits.feeding_threshold < traits.max_energy);
            assert!(traits.sensing_radius <= traits.extended_sensing_radius);
        }
    }

    #[test]
    fn test_birth_sexes() {
        let snail = Species::Escargot.insect_traits().unwrap();
        assert_eq!(snail.birth_sexes(), &[Sex::Hermaphrodite]);

        let cricket = Species::Grillons.insect_traits().unwrap();
        assert_eq!(cricket.birth_sexes(), &[Sex::Male, Sex::Female]);
    }

    #[test]
    fn test_species_json_round_trip_as_map_key() {
        let mut counts = std::collections::BTreeMap::new();
        counts.insert(Species::PetitHerbe, 3u32);
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"PetitHerbe":3}"#);
    }
}
