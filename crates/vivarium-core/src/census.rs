//! Population statistics gathered from the live organism collection.

use crate::{Kind, Species};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Head count of a population at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationCensus {
    pub plants: usize,
    pub insects: usize,
    /// Organisms currently counting down to death
    pub dying: usize,
    pub by_species: BTreeMap<Species, usize>,
    /// Sum of insect energy
    pub insect_energy: u64,
    /// Sum of plant parts
    pub plant_parts: u64,
}

impl PopulationCensus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_plant(&mut self, species: Species, parts: u32) {
        self.plants += 1;
        self.plant_parts += parts as u64;
        *self.by_species.entry(species).or_insert(0) += 1;
    }

    pub fn record_insect(&mut self, species: Species, energy: u32, dying: bool) {
        self.insects += 1;
        self.insect_energy += energy as u64;
        if dying {
            self.dying += 1;
        }
        *self.by_species.entry(species).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.plants + self.insects
    }

    pub fn count(&self, species: Species) -> usize {
        self.by_species.get(&species).copied().unwrap_or(0)
    }

    pub fn count_kind(&self, kind: Kind) -> usize {
        match kind {
            Kind::Plant => self.plants,
            Kind::Insect => self.insects,
        }
    }

    pub fn average_insect_energy(&self) -> f64 {
        if self.insects == 0 {
            0.0
        } else {
            self.insect_energy as f64 / self.insects as f64
        }
    }

    /// Species with no living member
    pub fn extinct(&self) -> Vec<Species> {
        Species::ALL
            .into_iter()
            .filter(|species| self.count(*species) == 0)
            .collect()
    }
}
