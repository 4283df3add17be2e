//! Immutable per-tick views of the population for renderers and other readers.

use crate::organism::{BehaviorState, Organism, OrganismKind, PlantStage};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vivarium_core::{Climate, CombatOutcome, HungerLevel, Kind, LifeStatus, OrganismId, Position, Result, Species};

/// Copy of one organism's externally visible state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganismView {
    pub id: OrganismId,
    pub position: Position,
    pub species: Species,
    pub kind: Kind,
    pub status: LifeStatus,
    pub age: u32,
    /// Insects only
    pub behavior: Option<BehaviorState>,
    pub energy: Option<u32>,
    pub hunger: Option<HungerLevel>,
    pub combat: Option<CombatOutcome>,
    /// Plants only
    pub stage: Option<PlantStage>,
    pub parts: Option<u32>,
    pub health: Option<u32>,
}

impl From<&Organism> for OrganismView {
    fn from(org: &Organism) -> Self {
        let mut view = Self {
            id: org.id,
            position: org.position,
            species: org.species,
            kind: org.kind_tag(),
            status: org.status(),
            age: org.age,
            behavior: None,
            energy: None,
            hunger: None,
            combat: None,
            stage: None,
            parts: None,
            health: None,
        };
        match &org.kind {
            OrganismKind::Insect(insect) => {
                view.behavior = Some(insect.behavior);
                view.energy = Some(insect.energy);
                view.hunger = org
                    .species
                    .insect_traits()
                    .map(|traits| insect.hunger_level(&traits));
                view.combat = insect.combat_outcome();
            }
            OrganismKind::Plant(plant) => {
                view.stage = Some(plant.stage);
                view.parts = Some(plant.parts);
                view.health = Some(plant.health);
            }
        }
        view
    }
}

/// Point-in-time state of the whole environment, ordered by organism id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub hour: u32,
    pub day: u64,
    pub climate: Climate,
    pub organisms: Vec<OrganismView>,
}

impl Snapshot {
    pub fn get(&self, id: OrganismId) -> Option<&OrganismView> {
        self.organisms
            .binary_search_by_key(&id, |view| view.id)
            .ok()
            .map(|index| &self.organisms[index])
    }

    pub fn of_kind(&self, kind: Kind) -> impl Iterator<Item = &OrganismView> + '_ {
        self.organisms.iter().filter(move |view| view.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.organisms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.organisms.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Read-only handle on the most recently published snapshot.
///
/// Cloning the feed is cheap; every clone observes the same publications.
#[derive(Debug, Clone)]
pub struct SnapshotFeed {
    latest: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotFeed {
    pub(crate) fn new(initial: Snapshot) -> Self {
        Self {
            latest: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    pub(crate) fn publish(&self, snapshot: Snapshot) {
        *self.latest.write() = Arc::new(snapshot);
    }

    pub fn latest(&self) -> Arc<Snapshot> {
        self.latest.read().clone()
    }

    pub fn tick(&self) -> u64 {
        self.latest.read().tick
    }
}
