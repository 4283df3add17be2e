//! Configuration types for the simulation.

use crate::{Error, Result, Species};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Largest grid accepted, in cells
pub const MAX_GRID_CELLS: usize = 1 << 24;

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the world grid
    pub width: i32,
    /// Height of the world grid
    pub height: i32,
    /// Hour of day (0..24) the simulation starts at
    pub start_hour: u32,
    /// Ticks per simulated hour
    pub ticks_per_hour: u32,
    /// Soil quality (0 to 100)
    pub soil_quality: u32,
    /// Soil quality at or above which plants grow one extra part
    pub fertile_soil_threshold: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            start_hour: 8,
            ticks_per_hour: 1,
            soil_quality: 50,
            fertile_soil_threshold: 70,
        }
    }
}

impl WorldConfig {
    /// Number of cells in the grid, `None` if it cannot be represented
    pub fn cell_count(&self) -> Option<usize> {
        let width = usize::try_from(self.width).ok()?;
        let height = usize::try_from(self.height).ok()?;
        width.checked_mul(height)
    }
}

/// Energy and damage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Energy every insect loses per tick
    pub decay_per_tick: u32,
    /// Energy awarded to the winner of a fight
    pub combat_bonus: u32,
    /// Energy taken from the loser of a fight
    pub combat_penalty: u32,
    /// Energy each parent pays for one offspring
    pub reproduce_cost: u32,
    /// Health a plant loses per bite
    pub bite_damage: u32,
    /// Health a plant regains per growth step
    pub regrowth_health: u32,
    /// Ticks an insect spends dying before it is removed
    pub dying_ticks: u32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            decay_per_tick: 1,
            combat_bonus: 2,
            combat_penalty: 3,
            reproduce_cost: 2,
            bite_damage: 10,
            regrowth_health: 5,
            dying_ticks: 3,
        }
    }
}

/// Rules that can be toggled per run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicRules {
    /// Allow insects to fight over contested claims
    pub allow_combat: bool,
    /// Allow insects to reproduce
    pub allow_reproduction: bool,
    /// Allow mature plants to seed neighbouring cells
    pub allow_spread: bool,
    /// Maximum number of organisms in the simulation
    pub max_population: usize,
    /// Evaluate organisms on the rayon pool
    pub parallel_evaluation: bool,
    /// Cross-check collection, terrain and registry after every commit
    pub verify_each_tick: bool,
    /// Ticks between population metric events (0 disables them)
    pub metrics_interval: u64,
}

impl Default for DynamicRules {
    fn default() -> Self {
        Self {
            allow_combat: true,
            allow_reproduction: true,
            allow_spread: true,
            max_population: 400,
            parallel_evaluation: true,
            verify_each_tick: true,
            metrics_interval: 100,
        }
    }
}

/// Initial population per species
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub initial: BTreeMap<Species, u32>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        let initial = [
            (Species::PetitHerbe, 35),
            (Species::GrandHerbe, 20),
            (Species::Champignon, 8),
            (Species::Escargot, 20),
            (Species::Grillons, 8),
            (Species::Lombric, 5),
            (Species::PetitSerpent, 4),
            (Species::AraigneeSauteuse, 8),
        ]
        .into_iter()
        .collect();
        Self { initial }
    }
}

impl PopulationConfig {
    pub fn total(&self) -> usize {
        self.initial.values().map(|&n| n as usize).sum()
    }
}

/// Simulation run configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of ticks to run the simulation
    pub num_ticks: u64,
    /// Random seed for reproducibility
    pub seed: u64,
    pub world: WorldConfig,
    pub energy: EnergyConfig,
    pub rules: DynamicRules,
    pub population: PopulationConfig,
}

impl SimulationConfig {
    pub fn new(num_ticks: u64, seed: u64) -> Self {
        Self {
            num_ticks,
            seed,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Full check, including that the initial population fits the grid
    pub fn validate(&self) -> Result<()> {
        self.validate_rules()?;
        let cells = self.world.cell_count().unwrap_or(usize::MAX);
        let wanted = self.population.total();
        if wanted > cells {
            return Err(Error::Config(format!(
                "{wanted} initial organisms do not fit on {cells} cells"
            )));
        }
        if wanted > self.rules.max_population {
            return Err(Error::Config(format!(
                "{wanted} initial organisms exceed max_population {}",
                self.rules.max_population
            )));
        }
        Ok(())
    }

    /// Check everything an empty environment depends on
    pub fn validate_rules(&self) -> Result<()> {
        let world = &self.world;
        if world.width <= 0 || world.height <= 0 {
            return Err(Error::Config(format!(
                "grid dimensions must be positive, got {}x{}",
                world.width, world.height
            )));
        }
        match world.cell_count() {
            Some(cells) if cells <= MAX_GRID_CELLS => {}
            _ => {
                return Err(Error::Config(format!(
                    "a {}x{} grid exceeds the {MAX_GRID_CELLS} cell limit",
                    world.width, world.height
                )))
            }
        }
        if world.start_hour >= 24 {
            return Err(Error::Config(format!(
                "start_hour must be below 24, got {}",
                world.start_hour
            )));
        }
        if world.ticks_per_hour == 0 {
            return Err(Error::Config("ticks_per_hour must be at least 1".into()));
        }
        if world.soil_quality > 100 {
            return Err(Error::Config(format!(
                "soil_quality must be within 0..=100, got {}",
                world.soil_quality
            )));
        }
        if self.energy.dying_ticks == 0 {
            return Err(Error::Config("dying_ticks must be at least 1".into()));
        }
        // Parents must survive paying for an offspring.
        for species in Species::ALL {
            if let Some(traits) = species.insect_traits() {
                if traits.min_reproduce_energy <= self.energy.reproduce_cost {
                    return Err(Error::Config(format!(
                        "reproduce_cost {} leaves {} parents without energy",
                        self.energy.reproduce_cost, species
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let world = WorldConfig::default();
        assert_eq!(world.width, 20);
        assert_eq!(world.height, 20);

        let energy = EnergyConfig::default();
        assert_eq!(energy.decay_per_tick, 1);
        assert_eq!(energy.dying_ticks, 3);

        let population = PopulationConfig::default();
        assert_eq!(population.total(), 108);

        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_grid() {
        let mut config = SimulationConfig::default();
        config.world.width = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validation_rejects_huge_grid() {
        let mut config = SimulationConfig::default();
        config.world.width = 70_000;
        config.world.height = 70_000;
        assert!(matches!(config.validate_rules(), Err(Error::Config(_))));
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.world.width = 4096;
        config.world.height = 4096;
        assert_eq!(config.world.cell_count(), Some(MAX_GRID_CELLS));
        assert!(config.validate_rules().is_ok());
        config.world.height = 4097;
        assert!(config.validate_rules().is_err());
    }

    #[test]
    fn test_validation_rejects_overcrowding() {
        let mut config = SimulationConfig::default();
        config.world.width = 10;
        config.world.height = 10;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_small_grid_is_fine_without_population() {
        let mut config = SimulationConfig::default();
        config.world.width = 10;
        config.world.height = 10;
        assert!(config.validate_rules().is_ok());
        config.population.initial.clear();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_ruinous_reproduction() {
        let mut config = SimulationConfig::default();
        config.energy.reproduce_cost = 5;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimulationConfig::from_json(
            r#"{"num_ticks": 50, "world": {"width": 12, "height": 12},
                "population": {"initial": {"Escargot": 4, "PetitHerbe": 6}}}"#,
        )
        .unwrap();
        assert_eq!(config.num_ticks, 50);
        assert_eq!(config.world.width, 12);
        assert_eq!(config.world.start_hour, 8);
        assert_eq!(config.population.total(), 10);
        assert!(config.rules.allow_combat);
    }

    #[test]
    fn test_rules_serialization() {
        let rules = DynamicRules::default();
        let json = serde_json::to_string(&rules).unwrap();
        let deserialized: DynamicRules = serde_json::from_str(&json).unwrap();
        assert_eq!(rules.allow_combat, deserialized.allow_combat);
        assert_eq!(rules.max_population, deserialized.max_population);
    }
}
