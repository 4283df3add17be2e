//! Organism state and management.

use serde::{Deserialize, Serialize};
use vivarium_core::{
    CombatOutcome, Error, HungerLevel, InsectTraits, Kind, LifeStatus, OrganismId, PlantTraits,
    Position, ReproductionMode, Result, Sex, Species,
};

pub const MAX_PLANT_HEALTH: u32 = 100;

/// An organism in the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    pub id: OrganismId,
    pub position: Position,
    pub species: Species,
    pub age: u32,
    pub kind: OrganismKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrganismKind {
    Plant(PlantState),
    Insect(InsectState),
}

/// Growth stage of a plant, driven by its parts count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlantStage {
    Growing,
    Mature,
    Consumed,
    Dead,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantState {
    /// 0 to 100
    pub health: u32,
    pub parts: u32,
    pub reproduction: ReproductionMode,
    pub stage: PlantStage,
}

/// What an insect did during the last committed tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorState {
    Idle,
    Eating { food: OrganismId },
    Reproducing { partner: OrganismId },
    Moving { from: Position, to: Position },
    Fighting { opponent: OrganismId, outcome: CombatOutcome },
    Dying { remaining: u32 },
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReproductionDesire {
    pub wants: bool,
    /// Ticks until the insect may reproduce again
    pub cooldown: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsectState {
    pub energy: u32,
    pub sex: Sex,
    pub desire: ReproductionDesire,
    pub behavior: BehaviorState,
}

impl Organism {
    /// Build a plant with its species' baseline parts and full health
    pub fn new_plant(id: OrganismId, species: Species, position: Position) -> Result<Self> {
        let traits = plant_traits(species)?;
        Ok(Self {
            id,
            position,
            species,
            age: 0,
            kind: OrganismKind::Plant(PlantState {
                health: MAX_PLANT_HEALTH,
                parts: traits.initial_parts,
                reproduction: traits.reproduction,
                stage: stage_for(traits.initial_parts, &traits),
            }),
        })
    }

    /// Build an idle insect with its species' baseline energy
    pub fn new_insect(id: OrganismId, species: Species, position: Position, sex: Sex) -> Result<Self> {
        let traits = insect_traits(species)?;
        Ok(Self {
            id,
            position,
            species,
            age: 0,
            kind: OrganismKind::Insect(InsectState {
                energy: traits.initial_energy,
                sex,
                desire: ReproductionDesire::default(),
                behavior: BehaviorState::Idle,
            }),
        })
    }

    /// Override an insect's energy (capped at the species maximum)
    pub fn with_energy(mut self, energy: u32) -> Self {
        if let (Some(traits), OrganismKind::Insect(insect)) =
            (self.species.insect_traits(), &mut self.kind)
        {
            insect.energy = energy.min(traits.max_energy);
        }
        self
    }

    /// Override a plant's parts (capped at the species maximum)
    pub fn with_parts(mut self, parts: u32) -> Self {
        if let (Some(traits), OrganismKind::Plant(plant)) =
            (self.species.plant_traits(), &mut self.kind)
        {
            plant.parts = parts.min(traits.max_parts);
            plant.stage = stage_for(plant.parts, &traits);
        }
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = age;
        self
    }

    pub fn with_desire(mut self, wants: bool, cooldown: u32) -> Self {
        if let OrganismKind::Insect(insect) = &mut self.kind {
            insect.desire = ReproductionDesire { wants, cooldown };
        }
        self
    }

    pub fn kind_tag(&self) -> Kind {
        match self.kind {
            OrganismKind::Plant(_) => Kind::Plant,
            OrganismKind::Insect(_) => Kind::Insect,
        }
    }

    pub fn status(&self) -> LifeStatus {
        match &self.kind {
            OrganismKind::Plant(plant) if plant.stage == PlantStage::Dead => LifeStatus::Dead,
            OrganismKind::Plant(_) => LifeStatus::Alive,
            OrganismKind::Insect(insect) => match insect.behavior {
                BehaviorState::Dying { .. } => LifeStatus::Dying,
                BehaviorState::Dead => LifeStatus::Dead,
                _ => LifeStatus::Alive,
            },
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status() == LifeStatus::Alive
    }

    pub fn as_plant(&self) -> Option<&PlantState> {
        match &self.kind {
            OrganismKind::Plant(plant) => Some(plant),
            OrganismKind::Insect(_) => None,
        }
    }

    pub fn as_insect(&self) -> Option<&InsectState> {
        match &self.kind {
            OrganismKind::Insect(insect) => Some(insect),
            OrganismKind::Plant(_) => None,
        }
    }

    pub(crate) fn as_plant_mut(&mut self) -> Option<&mut PlantState> {
        match &mut self.kind {
            OrganismKind::Plant(plant) => Some(plant),
            OrganismKind::Insect(_) => None,
        }
    }

    pub(crate) fn as_insect_mut(&mut self) -> Option<&mut InsectState> {
        match &mut self.kind {
            OrganismKind::Insect(insect) => Some(insect),
            OrganismKind::Plant(_) => None,
        }
    }

    /// Whether this organism is a living plant an insect could eat
    pub fn is_edible(&self) -> bool {
        matches!(&self.kind, OrganismKind::Plant(plant) if plant.parts > 0 && plant.stage != PlantStage::Dead)
    }

    pub fn tick(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    /// Check the state a living member of the environment must be in
    pub fn check_state(&self) -> Result<()> {
        let id = self.id;
        let violation = |message: String| Err(Error::InvariantViolation(message));
        if self.kind_tag() != self.species.kind() {
            return violation(format!(
                "organism {id} carries {:?} state but {} is a {:?} species",
                self.kind_tag(),
                self.species,
                self.species.kind()
            ));
        }
        if self.status() == LifeStatus::Dead {
            return violation(format!("organism {id} is dead"));
        }
        match &self.kind {
            OrganismKind::Insect(insect) if insect.energy == 0 && !insect.is_dying() => {
                violation(format!("insect {id} has no energy but is not dying"))
            }
            OrganismKind::Plant(plant) if plant.parts == 0 => {
                violation(format!("plant {id} has no parts left"))
            }
            _ => Ok(()),
        }
    }
}

impl PlantState {
    /// Remove one part and some health; returns whether the plant died of it
    pub(crate) fn bite(&mut self, damage: u32) -> bool {
        self.parts = self.parts.saturating_sub(1);
        self.health = self.health.saturating_sub(damage);
        self.stage = if self.parts == 0 || self.health == 0 {
            PlantStage::Dead
        } else {
            PlantStage::Consumed
        };
        self.stage == PlantStage::Dead
    }

    pub(crate) fn grow(&mut self, parts: u32, health: u32, traits: &PlantTraits) {
        self.parts = self.parts.saturating_add(parts).min(traits.max_parts);
        self.health = self.health.saturating_add(health).min(MAX_PLANT_HEALTH);
        self.stage = stage_for(self.parts, traits);
    }

    /// Settle the stage for a tick without growth or bites
    pub(crate) fn rest(&mut self, traits: &PlantTraits) {
        if self.stage != PlantStage::Dead {
            self.stage = stage_for(self.parts, traits);
        }
    }

    pub(crate) fn wither(&mut self) {
        self.stage = PlantStage::Dead;
    }
}

impl InsectState {
    pub fn hunger_level(&self, traits: &InsectTraits) -> HungerLevel {
        if self.energy >= traits.feeding_threshold {
            HungerLevel::Sated
        } else if self.energy.saturating_mul(2) >= traits.feeding_threshold {
            HungerLevel::Hungry
        } else {
            HungerLevel::Starving
        }
    }

    /// Only meaningful while fighting
    pub fn combat_outcome(&self) -> Option<CombatOutcome> {
        match self.behavior {
            BehaviorState::Fighting { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.behavior, BehaviorState::Dying { .. } | BehaviorState::Dead)
    }

    /// Add energy up to the species cap
    pub(crate) fn feed(&mut self, amount: u32, traits: &InsectTraits) {
        self.energy = self.energy.saturating_add(amount).min(traits.max_energy);
    }

    /// Remove energy; an insect drained to zero starts dying immediately.
    pub(crate) fn drain(&mut self, amount: u32, dying_ticks: u32) {
        self.energy = self.energy.saturating_sub(amount);
        if self.energy == 0 && !self.is_dying() {
            self.behavior = BehaviorState::Dying {
                remaining: dying_ticks,
            };
        }
    }

    pub(crate) fn start_dying(&mut self, dying_ticks: u32) {
        if !self.is_dying() {
            self.behavior = BehaviorState::Dying {
                remaining: dying_ticks,
            };
        }
    }

    pub(crate) fn finish_reproduction(&mut self, traits: &InsectTraits) {
        self.desire = ReproductionDesire {
            wants: false,
            cooldown: traits.reproduction_cooldown,
        };
    }

    /// Cool down and, once adult and rested, want to reproduce again
    pub(crate) fn refresh_desire(&mut self, age: u32, traits: &InsectTraits) {
        self.desire.cooldown = self.desire.cooldown.saturating_sub(1);
        if self.desire.cooldown == 0 && age >= traits.maturity_age {
            self.desire.wants = true;
        }
    }
}

pub(crate) fn plant_traits(species: Species) -> Result<PlantTraits> {
    species.plant_traits().ok_or(Error::WrongKind {
        species,
        expected: Kind::Plant,
    })
}

pub(crate) fn insect_traits(species: Species) -> Result<InsectTraits> {
    species.insect_traits().ok_or(Error::WrongKind {
        species,
        expected: Kind::Insect,
    })
}

fn stage_for(parts: u32, traits: &PlantTraits) -> PlantStage {
    if parts == 0 {
        PlantStage::Dead
    } else if parts >= traits.max_parts {
        PlantStage::Mature
    } else {
        PlantStage::Growing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snail() -> Organism {
        Organism::new_insect(OrganismId(1), Species::Escargot, Position::new(0, 0), Sex::Hermaphrodite)
            .unwrap()
    }

    #[test]
    fn test_insect_creation() {
        let organism = snail();
        assert_eq!(organism.kind_tag(), Kind::Insect);
        assert_eq!(organism.status(), LifeStatus::Alive);
        let insect = organism.as_insect().unwrap();
        assert_eq!(insect.energy, 10);
        assert_eq!(insect.behavior, BehaviorState::Idle);
        assert!(!insect.desire.wants);
    }

    #[test]
    fn test_plant_creation() {
        let organism =
            Organism::new_plant(OrganismId(2), Species::GrandHerbe, Position::new(3, 3)).unwrap();
        let plant = organism.as_plant().unwrap();
        assert_eq!(plant.parts, 6);
        assert_eq!(plant.health, MAX_PLANT_HEALTH);
        assert_eq!(plant.stage, PlantStage::Growing);
        assert!(organism.is_edible());
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let err = Organism::new_plant(OrganismId(3), Species::Lombric, Position::new(0, 0));
        assert!(matches!(err, Err(Error::WrongKind { expected: Kind::Plant, .. })));

        let err = Organism::new_insect(OrganismId(3), Species::Champignon, Position::new(0, 0), Sex::Male);
        assert!(matches!(err, Err(Error::WrongKind { expected: Kind::Insect, .. })));
    }

    #[test]
    fn test_energy_capped_at_species_max() {
        let organism = snail().with_energy(500);
        assert_eq!(organism.as_insect().unwrap().energy, 20);
    }

    #[test]
    fn test_drain_to_zero_starts_dying() {
        let mut organism = snail().with_energy(2);
        let insect = organism.as_insect_mut().unwrap();
        insect.drain(5, 3);
        assert_eq!(insect.energy, 0);
        assert_eq!(insect.behavior, BehaviorState::Dying { remaining: 3 });
        assert_eq!(organism.status(), LifeStatus::Dying);
    }

    #[test]
    fn test_combat_outcome_only_while_fighting() {
        let mut organism = snail();
        let insect = organism.as_insect_mut().unwrap();
        assert_eq!(insect.combat_outcome(), None);
        insect.behavior = BehaviorState::Fighting {
            opponent: OrganismId(9),
            outcome: CombatOutcome::Winner,
        };
        assert_eq!(insect.combat_outcome(), Some(CombatOutcome::Winner));
        insect.behavior = BehaviorState::Idle;
        assert_eq!(insect.combat_outcome(), None);
    }

    #[test]
    fn test_hunger_levels() {
        let traits = Species::Escargot.insect_traits().unwrap();
        let mut insect = snail().as_insect().unwrap().clone();
        assert_eq!(insect.hunger_level(&traits), HungerLevel::Sated);
        insect.energy = 4;
        assert_eq!(insect.hunger_level(&traits), HungerLevel::Hungry);
        insect.energy = 1;
        assert_eq!(insect.hunger_level(&traits), HungerLevel::Starving);
    }

    #[test]
    fn test_check_state() {
        snail().check_state().unwrap();
        assert!(matches!(
            snail().with_energy(0).check_state(),
            Err(Error::InvariantViolation(_))
        ));

        let mut dying = snail().with_energy(0);
        dying.as_insect_mut().unwrap().start_dying(3);
        dying.check_state().unwrap();

        let grass = Organism::new_plant(OrganismId(2), Species::PetitHerbe, Position::new(0, 0)).unwrap();
        grass.check_state().unwrap();
        assert!(grass.clone().with_parts(0).check_state().is_err());

        let mut mislabelled = grass;
        mislabelled.species = Species::Lombric;
        assert!(matches!(mislabelled.check_state(), Err(Error::InvariantViolation(_))));
    }

    #[test]
    fn test_bite_until_dead() {
        let mut organism =
            Organism::new_plant(OrganismId(4), Species::Champignon, Position::new(1, 1)).unwrap();
        let plant = organism.as_plant_mut().unwrap();
        assert!(!plant.bite(10));
        assert_eq!(plant.stage, PlantStage::Consumed);
        assert!(plant.bite(10));
        assert_eq!(plant.parts, 0);
        assert_eq!(organism.status(), LifeStatus::Dead);
        assert!(!organism.is_edible());
    }

    #[test]
    fn test_growth_caps_at_max_parts() {
        let traits = Species::PetitHerbe.plant_traits().unwrap();
        let mut organism =
            Organism::new_plant(OrganismId(5), Species::PetitHerbe, Position::new(1, 1)).unwrap();
        let plant = organism.as_plant_mut().unwrap();
        plant.grow(1, 5, &traits);
        assert_eq!(plant.stage, PlantStage::Growing);
        plant.grow(10, 5, &traits);
        assert_eq!(plant.parts, traits.max_parts);
        assert_eq!(plant.stage, PlantStage::Mature);
        assert_eq!(plant.health, MAX_PLANT_HEALTH);

        plant.grow(u32::MAX, u32::MAX, &traits);
        assert_eq!(plant.parts, traits.max_parts);
        assert_eq!(plant.health, MAX_PLANT_HEALTH);
    }

    #[test]
    fn test_feed_saturates_at_cap() {
        let traits = Species::Escargot.insect_traits().unwrap();
        let mut insect = snail().as_insect().unwrap().clone();
        insect.feed(u32::MAX, &traits);
        assert_eq!(insect.energy, traits.max_energy);
        insect.energy = u32::MAX;
        assert_eq!(insect.hunger_level(&traits), HungerLevel::Sated);
    }

    #[test]
    fn test_desire_refresh() {
        let traits = Species::Escargot.insect_traits().unwrap();
        let mut insect = snail().with_desire(false, 2).as_insect().unwrap().clone();
        insect.refresh_desire(10, &traits);
        assert!(!insect.desire.wants);
        insect.refresh_desire(10, &traits);
        assert!(insect.desire.wants);

        insect.finish_reproduction(&traits);
        assert!(!insect.desire.wants);
        assert_eq!(insect.desire.cooldown, traits.reproduction_cooldown);
    }

    #[test]
    fn test_juveniles_do_not_want_to_reproduce() {
        let traits = Species::Escargot.insect_traits().unwrap();
        let mut insect = snail().as_insect().unwrap().clone();
        insect.refresh_desire(1, &traits);
        assert!(!insect.desire.wants);
    }
}
