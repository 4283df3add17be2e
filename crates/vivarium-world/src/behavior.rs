//! Behavior engine: decides what every organism does in a tick.
//!
//! Evaluation only reads the pre-tick state, so it can fan out across rayon's
//! pool. Resolution then runs single-threaded over the collected decisions to
//! settle contested cells and food, and to pair up mates. Nothing here mutates
//! the environment; applying decisions is the commit phase's job.

use crate::organism::{BehaviorState, InsectState, Organism, OrganismKind, PlantStage, PlantState};
use crate::terrain::Terrain;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::trace;
use vivarium_core::{
    Climate, CombatOutcome, Error, InsectTraits, OrganismId, PlantTraits, Position, Result, Sex,
    SimulationConfig,
};

/// What one organism will do when the tick is committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Insect(InsectDecision),
    Plant(PlantDecision),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsectDecision {
    /// Keep dying; `remaining` ticks left after this one
    CountDown { remaining: u32 },
    /// Dying countdown is over
    Expire,
    /// Out of energy or too old
    StartDying,
    Idle,
    Eat { food: OrganismId },
    /// Initiate a pairing; after resolution `partner` always has the higher id
    Reproduce { partner: OrganismId },
    /// Paired with `initiator`, who spawns the offspring
    Paired { initiator: OrganismId },
    Move { to: Position },
    Fight { opponent: OrganismId, outcome: CombatOutcome },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlantDecision {
    /// Too old to live on
    Wither,
    /// Eaten this tick, so no growth
    Consumed,
    Grow { parts: u32 },
    Spread { to: Position },
    Rest,
}

/// Read-only view of the pre-tick state
pub(crate) struct WorldView<'a> {
    pub organisms: &'a BTreeMap<OrganismId, Organism>,
    pub terrain: &'a Terrain,
    pub config: &'a SimulationConfig,
    pub climate: Climate,
    /// Number of the tick being planned
    pub tick: u64,
}

/// Check that two organisms could produce offspring together
pub fn reproduction_pair(first: &Organism, second: &Organism) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidReproductionPair {
        first: first.id,
        second: second.id,
        reason: reason.to_string(),
    };
    if first.id == second.id {
        return Err(invalid("an organism cannot pair with itself"));
    }
    let (Some(a), Some(b)) = (first.as_insect(), second.as_insect()) else {
        return Err(invalid("only insects reproduce sexually"));
    };
    if first.species != second.species {
        return Err(invalid("different species"));
    }
    if !a.sex.is_compatible_with(b.sex) {
        return Err(invalid("incompatible sexes"));
    }
    Ok(())
}

impl<'a> WorldView<'a> {
    /// Evaluate every organism and resolve conflicts between their decisions
    pub fn plan(&self) -> BTreeMap<OrganismId, Decision> {
        let mut decisions: BTreeMap<OrganismId, Decision> = if self.config.rules.parallel_evaluation {
            self.organisms
                .par_iter()
                .map(|(id, organism)| (*id, self.evaluate(organism)))
                .collect()
        } else {
            self.organisms
                .iter()
                .map(|(id, organism)| (*id, self.evaluate(organism)))
                .collect()
        };
        self.resolve(&mut decisions);
        decisions
    }

    pub fn evaluate(&self, organism: &Organism) -> Decision {
        let mut rng = self.rng_for(organism.id);
        match &organism.kind {
            OrganismKind::Insect(insect) => {
                Decision::Insect(self.evaluate_insect(organism, insect, &mut rng))
            }
            OrganismKind::Plant(plant) => {
                Decision::Plant(self.evaluate_plant(organism, plant, &mut rng))
            }
        }
    }

    /// Deterministic per-organism stream, independent of evaluation order
    fn rng_for(&self, id: OrganismId) -> ChaCha8Rng {
        let seed = self.config.seed
            ^ self.tick.wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ id.0.wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
        ChaCha8Rng::seed_from_u64(seed)
    }

    fn evaluate_insect(
        &self,
        organism: &Organism,
        insect: &InsectState,
        rng: &mut ChaCha8Rng,
    ) -> InsectDecision {
        match insect.behavior {
            BehaviorState::Dying { remaining } if remaining > 1 => {
                return InsectDecision::CountDown {
                    remaining: remaining - 1,
                }
            }
            BehaviorState::Dying { .. } | BehaviorState::Dead => return InsectDecision::Expire,
            _ => {}
        }
        let Some(traits) = organism.species.insect_traits() else {
            return InsectDecision::Idle;
        };

        let energy = insect.energy.saturating_sub(self.config.energy.decay_per_tick);
        if energy == 0 || organism.age.saturating_add(1) >= traits.lifespan {
            return InsectDecision::StartDying;
        }

        let hungry = energy < traits.feeding_threshold;
        if hungry {
            if let Some(food) = self.nearest_food(organism.position, traits.sensing_radius) {
                return InsectDecision::Eat { food: food.id };
            }
        }

        let ready = self.ready_to_mate(organism);
        if ready {
            if let Some(partner) = self.nearest_partner(organism, traits.sensing_radius) {
                return InsectDecision::Reproduce { partner: partner.id };
            }
        }

        let radius = traits.extended_sensing_radius;
        let target = hungry
            .then(|| self.nearest_food(organism.position, radius))
            .flatten()
            .or_else(|| ready.then(|| self.nearest_partner(organism, radius)).flatten())
            .map(|target| target.position);

        match target {
            Some(target) => {
                let step = organism.position.step_toward(&target);
                if self.terrain.is_free(step) {
                    InsectDecision::Move { to: step }
                } else {
                    InsectDecision::Idle
                }
            }
            None => {
                let free = self
                    .terrain
                    .free_adjacent(organism.position.x, organism.position.y);
                match free.choose(rng) {
                    Some(to) => InsectDecision::Move { to: *to },
                    None => InsectDecision::Idle,
                }
            }
        }
    }

    fn evaluate_plant(
        &self,
        organism: &Organism,
        plant: &PlantState,
        rng: &mut ChaCha8Rng,
    ) -> PlantDecision {
        let Some(traits) = organism.species.plant_traits() else {
            return PlantDecision::Rest;
        };
        if plant.stage == PlantStage::Dead || organism.age.saturating_add(1) >= traits.lifespan {
            return PlantDecision::Wither;
        }
        if plant.parts < traits.max_parts {
            return if traits.growth_light.allows(self.climate.daylight) {
                PlantDecision::Grow {
                    parts: self.growth_for(&traits),
                }
            } else {
                PlantDecision::Rest
            };
        }
        if self.config.rules.allow_spread && rng.gen::<f32>() < traits.spread_chance {
            let radius = plant.reproduction.spread_radius();
            let free = self
                .terrain
                .free_within(organism.position.x, organism.position.y, radius);
            if let Some(to) = free.choose(rng) {
                return PlantDecision::Spread { to: *to };
            }
        }
        PlantDecision::Rest
    }

    fn growth_for(&self, traits: &PlantTraits) -> u32 {
        let world = &self.config.world;
        if world.soil_quality >= world.fertile_soil_threshold {
            traits.growth_rate + 1
        } else {
            traits.growth_rate
        }
    }

    /// Energy an insect will have once this tick's decay is paid
    pub fn projected_energy(&self, id: OrganismId) -> u32 {
        self.organisms
            .get(&id)
            .and_then(Organism::as_insect)
            .map(|insect| insect.energy.saturating_sub(self.config.energy.decay_per_tick))
            .unwrap_or(0)
    }

    /// Whether an insect will be willing and able to reproduce this tick
    pub fn ready_to_mate(&self, organism: &Organism) -> bool {
        if !self.config.rules.allow_reproduction {
            return false;
        }
        let (Some(insect), Some(traits)) = (organism.as_insect(), organism.species.insect_traits())
        else {
            return false;
        };
        if insect.is_dying() {
            return false;
        }
        let age = organism.age.saturating_add(1);
        let cooldown = insect.desire.cooldown.saturating_sub(1);
        let wants = insect.desire.wants || (cooldown == 0 && age >= traits.maturity_age);
        let energy = self.projected_energy(organism.id);
        wants
            && cooldown == 0
            && age >= traits.maturity_age
            && age < traits.lifespan
            && energy >= traits.min_reproduce_energy
    }

    fn nearest_food(&self, from: Position, radius: i32) -> Option<&'a Organism> {
        self.nearest(from, radius, |candidate| candidate.is_edible())
    }

    fn nearest_partner(&self, organism: &Organism, radius: i32) -> Option<&'a Organism> {
        self.nearest(organism.position, radius, |candidate| {
            reproduction_pair(organism, candidate).is_ok() && self.ready_to_mate(candidate)
        })
    }

    /// Closest matching organism, ties broken by lower id
    fn nearest(
        &self,
        from: Position,
        radius: i32,
        matches: impl Fn(&Organism) -> bool,
    ) -> Option<&'a Organism> {
        self.terrain
            .neighbors(from.x, from.y, radius)
            .into_iter()
            .filter_map(|id| self.organisms.get(&id))
            .filter(|candidate| candidate.position != from && matches(*candidate))
            .min_by_key(|candidate| (candidate.position.chebyshev_distance(&from), candidate.id))
    }

    /// Settle contested claims and pair mates
    pub fn resolve(&self, decisions: &mut BTreeMap<OrganismId, Decision>) {
        self.resolve_contests(decisions);
        self.resolve_pairings(decisions);
        mark_consumed(decisions);
    }

    fn resolve_contests(&self, decisions: &mut BTreeMap<OrganismId, Decision>) {
        let mut cell_claims: HashMap<Position, Vec<OrganismId>> = HashMap::new();
        let mut food_claims: HashMap<OrganismId, Vec<OrganismId>> = HashMap::new();
        for (id, decision) in decisions.iter() {
            match decision {
                Decision::Insect(InsectDecision::Move { to }) => {
                    cell_claims.entry(*to).or_default().push(*id)
                }
                Decision::Insect(InsectDecision::Eat { food }) => {
                    food_claims.entry(*food).or_default().push(*id)
                }
                _ => {}
            }
        }

        // Claimant lists are ascending because decisions iterate in id order.
        let mut contests: Vec<(Vec<OrganismId>, usize)> = cell_claims
            .into_values()
            .filter(|claimants| claimants.len() > 1)
            .map(|claimants| (claimants, 1))
            .collect();
        for (food, claimants) in food_claims {
            let parts = self
                .organisms
                .get(&food)
                .and_then(Organism::as_plant)
                .map(|plant| plant.parts as usize)
                .unwrap_or(0);
            if claimants.len() > parts {
                contests.push((claimants, parts));
            }
        }
        contests.sort();

        for (claimants, capacity) in contests {
            self.settle_contest(&claimants, capacity, decisions);
        }
    }

    /// `capacity` is how many claimants the contested target can satisfy
    fn settle_contest(
        &self,
        claimants: &[OrganismId],
        capacity: usize,
        decisions: &mut BTreeMap<OrganismId, Decision>,
    ) {
        let rest = match claimants {
            [first, second, others @ ..] if self.config.rules.allow_combat => {
                self.fight(*first, *second, decisions);
                others
            }
            _ => claimants,
        };

        // Fighters give up the target; whoever is left may still use it.
        for id in rest.iter().skip(capacity) {
            trace!(tick = self.tick, organism_id = %id, "Claim lost, staying idle");
            decisions.insert(*id, Decision::Insect(InsectDecision::Idle));
        }
    }

    fn fight(&self, first: OrganismId, second: OrganismId, decisions: &mut BTreeMap<OrganismId, Decision>) {
        let (winner, loser) = self.duel(first, second);
        trace!(tick = self.tick, winner = %winner, loser = %loser, "Contested claim settled by a fight");
        decisions.insert(
            winner,
            Decision::Insect(InsectDecision::Fight {
                opponent: loser,
                outcome: CombatOutcome::Winner,
            }),
        );
        decisions.insert(
            loser,
            Decision::Insect(InsectDecision::Fight {
                opponent: winner,
                outcome: CombatOutcome::Loser,
            }),
        );
    }

    /// Higher energy wins, ties go to the lower id
    fn duel(&self, first: OrganismId, second: OrganismId) -> (OrganismId, OrganismId) {
        let first_energy = self.projected_energy(first);
        let second_energy = self.projected_energy(second);
        if second_energy > first_energy || (second_energy == first_energy && second < first) {
            (second, first)
        } else {
            (first, second)
        }
    }

    fn resolve_pairings(&self, decisions: &mut BTreeMap<OrganismId, Decision>) {
        let requests: Vec<(OrganismId, OrganismId)> = decisions
            .iter()
            .filter_map(|(id, decision)| match decision {
                Decision::Insect(InsectDecision::Reproduce { partner }) => Some((*id, *partner)),
                _ => None,
            })
            .collect();
        let willing: HashSet<OrganismId> = requests.iter().map(|(id, _)| *id).collect();

        let mut paired: HashSet<OrganismId> = HashSet::new();
        for (id, partner) in &requests {
            if paired.contains(id) || paired.contains(partner) || !willing.contains(partner) {
                continue;
            }
            let (initiator, other) = if id < partner { (*id, *partner) } else { (*partner, *id) };
            decisions.insert(
                initiator,
                Decision::Insect(InsectDecision::Reproduce { partner: other }),
            );
            decisions.insert(other, Decision::Insect(InsectDecision::Paired { initiator }));
            paired.insert(initiator);
            paired.insert(other);
        }

        for (id, _) in requests {
            if !paired.contains(&id) {
                trace!(tick = self.tick, organism_id = %id, "No partner available, staying idle");
                decisions.insert(id, Decision::Insect(InsectDecision::Idle));
            }
        }
    }
}

/// Plants with a surviving eater skip growth this tick
fn mark_consumed(decisions: &mut BTreeMap<OrganismId, Decision>) {
    let eaten: Vec<OrganismId> = decisions
        .values()
        .filter_map(|decision| match decision {
            Decision::Insect(InsectDecision::Eat { food }) => Some(*food),
            _ => None,
        })
        .collect();
    for food in eaten {
        if let Some(Decision::Plant(plan)) = decisions.get_mut(&food) {
            if *plan != PlantDecision::Wither {
                *plan = PlantDecision::Consumed;
            }
        }
    }
}

/// Sex of a newborn, drawn from what its species can be born as
pub(crate) fn newborn_sex(traits: &InsectTraits, rng: &mut ChaCha8Rng) -> Sex {
    traits
        .birth_sexes()
        .choose(rng)
        .copied()
        .unwrap_or(Sex::Hermaphrodite)
}
