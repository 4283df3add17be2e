//! The environment: owns every organism and advances the world tick by tick.
//!
//! A tick runs in two phases. [`Environment::plan_tick`] evaluates the whole
//! population against a frozen view and returns a [`TickPlan`]; nothing is
//! mutated, so dropping the plan cancels the tick. [`Environment::commit`]
//! then applies the plan in ascending id order, retires the dead and publishes
//! a fresh [`Snapshot`].

use crate::behavior::{newborn_sex, reproduction_pair, Decision, InsectDecision, PlantDecision, WorldView};
use crate::ids::IdAllocator;
use crate::organism::{self, BehaviorState, Organism, OrganismKind};
use crate::registry::PopulationRegistry;
use crate::snapshot::{OrganismView, Snapshot, SnapshotFeed};
use crate::terrain::Terrain;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, event, info, instrument, trace, Level};
use vivarium_core::{
    Climate, CombatOutcome, Error, LifeStatus, OrganismId, PopulationCensus, Position, Result, Sex,
    SimulationConfig, Species,
};

/// Decisions for one tick, bound to the environment state they were made from
#[derive(Debug, Clone)]
pub struct TickPlan {
    generation: u64,
    tick: u64,
    decisions: BTreeMap<OrganismId, Decision>,
}

impl TickPlan {
    /// Number of the tick this plan would commit
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn decision(&self, id: OrganismId) -> Option<Decision> {
        self.decisions.get(&id).copied()
    }

    pub fn decisions(&self) -> impl Iterator<Item = (OrganismId, Decision)> + '_ {
        self.decisions.iter().map(|(id, decision)| (*id, *decision))
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}

/// What happened during one committed tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub hour: u32,
    /// Insects born
    pub births: u32,
    /// Plants sprouted by spreading
    pub sprouts: u32,
    pub deaths: u32,
    pub fights: u32,
    pub meals: u32,
    pub moves: u32,
    /// Actions dropped because the world changed under them during commit
    pub blocked: u32,
    pub population: usize,
}

/// Totals over a run of ticks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks_run: u64,
    pub final_tick: u64,
    pub births: u64,
    pub sprouts: u64,
    pub deaths: u64,
    pub fights: u64,
    pub meals: u64,
    /// Stopped early on request
    pub cancelled: bool,
    pub census: PopulationCensus,
}

impl RunSummary {
    fn absorb(&mut self, report: &TickReport) {
        self.ticks_run += 1;
        self.final_tick = report.tick;
        self.births += report.births as u64;
        self.sprouts += report.sprouts as u64;
        self.deaths += report.deaths as u64;
        self.fights += report.fights as u64;
        self.meals += report.meals as u64;
    }
}

pub struct Environment {
    config: SimulationConfig,
    organisms: BTreeMap<OrganismId, Organism>,
    terrain: Terrain,
    registry: PopulationRegistry,
    ids: Arc<IdAllocator>,
    climate: Climate,
    hour: u32,
    day: u64,
    tick: u64,
    /// Bumped on every mutation; a plan only commits against its own generation
    generation: u64,
    feed: SnapshotFeed,
}

impl Environment {
    /// Create an empty environment with its own id allocator
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Self::with_allocator(config, Arc::new(IdAllocator::new()))
    }

    /// Create an empty environment drawing ids from a shared allocator
    pub fn with_allocator(config: SimulationConfig, ids: Arc<IdAllocator>) -> Result<Self> {
        config.validate_rules()?;
        let hour = config.world.start_hour;
        let climate = Climate::at_hour(hour);
        let terrain = Terrain::new(config.world.width, config.world.height)?;
        let feed = SnapshotFeed::new(Snapshot {
            tick: 0,
            hour,
            day: 0,
            climate,
            organisms: Vec::new(),
        });
        debug!(
            width = config.world.width,
            height = config.world.height,
            start_hour = hour,
            "Environment created"
        );
        Ok(Self {
            config,
            organisms: BTreeMap::new(),
            terrain,
            registry: PopulationRegistry::new(),
            ids,
            climate,
            hour,
            day: 0,
            tick: 0,
            generation: 0,
            feed,
        })
    }

    /// Build a plant with a fresh id; it is not placed until `add_organism`
    pub fn create_plant(&self, species: Species, position: Position) -> Result<Organism> {
        organism::plant_traits(species)?;
        Organism::new_plant(self.ids.next_id(), species, position)
    }

    /// Build an insect with a fresh id; it is not placed until `add_organism`
    pub fn create_insect(&self, species: Species, position: Position, sex: Sex) -> Result<Organism> {
        organism::insect_traits(species)?;
        Organism::new_insect(self.ids.next_id(), species, position, sex)
    }

    pub fn spawn_plant(&mut self, species: Species, x: i32, y: i32) -> Result<OrganismId> {
        let plant = self.create_plant(species, Position::new(x, y))?;
        self.add_organism(plant)
    }

    pub fn spawn_insect(&mut self, species: Species, x: i32, y: i32, sex: Sex) -> Result<OrganismId> {
        let insect = self.create_insect(species, Position::new(x, y), sex)?;
        self.add_organism(insect)
    }

    /// Place an organism in the collection, on the terrain and in the registry.
    ///
    /// Either all three learn about it or none does.
    pub fn add_organism(&mut self, organism: Organism) -> Result<OrganismId> {
        let id = organism.id;
        let Position { x, y } = organism.position;
        organism.check_state()?;
        self.terrain.check_bounds(organism.position)?;
        if self.organisms.contains_key(&id) {
            return Err(Error::InvariantViolation(format!(
                "organism {id} is already in the environment"
            )));
        }
        if !self.ids.has_issued(id) {
            return Err(Error::InvariantViolation(format!(
                "organism {id} was not issued by this environment's allocator"
            )));
        }
        if let Some(occupant) = self.terrain.occupant(x, y) {
            return Err(Error::CellOccupied { x, y, occupant });
        }
        if self.is_full() {
            return Err(Error::CapacityExceeded {
                capacity: self.config.rules.max_population,
            });
        }

        self.terrain.add_organism(id, organism.species, x, y)?;
        self.registry.insert(id, organism.kind_tag());
        trace!(organism_id = %id, species = %organism.species, x, y, "Organism added");
        self.organisms.insert(id, organism);
        self.generation += 1;
        Ok(id)
    }

    /// Remove an organism from every structure; absent ids are a no-op
    pub fn remove_organism(&mut self, id: OrganismId) -> Result<Option<Organism>> {
        let Some(organism) = self.organisms.remove(&id) else {
            return Ok(None);
        };
        self.generation += 1;
        let on_terrain = self.terrain.remove_organism(id).is_some();
        let registered = self.registry.remove(id);
        if !on_terrain || !registered {
            return Err(Error::InvariantViolation(format!(
                "organism {id} was tracked inconsistently (terrain: {on_terrain}, registry: {registered})"
            )));
        }
        trace!(organism_id = %id, "Organism removed");
        Ok(Some(organism))
    }

    /// Evaluate the next tick without touching any state
    pub fn plan_tick(&self) -> TickPlan {
        let view = WorldView {
            organisms: &self.organisms,
            terrain: &self.terrain,
            config: &self.config,
            climate: self.climate,
            tick: self.tick + 1,
        };
        TickPlan {
            generation: self.generation,
            tick: self.tick + 1,
            decisions: view.plan(),
        }
    }

    /// Apply a plan made from the current state
    pub fn commit(&mut self, plan: TickPlan) -> Result<TickReport> {
        if plan.generation != self.generation {
            return Err(Error::StaleTick {
                planned: plan.tick,
                current: self.tick,
            });
        }

        self.advance_clock();
        let mut report = TickReport {
            tick: self.tick,
            hour: self.hour,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(
            self.config.seed ^ self.tick.wrapping_mul(0xD6E8_FEB8_6659_FD93) ^ 0x5EED,
        );

        for (id, decision) in &plan.decisions {
            self.metabolize(*id, decision)?;
        }
        for (id, decision) in &plan.decisions {
            match decision {
                Decision::Insect(decision) => self.apply_insect(*id, *decision, &mut rng, &mut report)?,
                Decision::Plant(decision) => self.apply_plant(*id, *decision, &mut report)?,
            }
        }
        self.retire_dead(&mut report)?;

        self.generation += 1;
        report.population = self.organisms.len();
        if self.config.rules.verify_each_tick {
            self.verify_integrity()?;
        }
        let interval = self.config.rules.metrics_interval;
        if interval > 0 && self.tick % interval == 0 {
            self.emit_population_metrics();
        }
        self.feed.publish(self.snapshot());
        Ok(report)
    }

    /// Plan and immediately commit one tick
    pub fn tick(&mut self) -> Result<TickReport> {
        let plan = self.plan_tick();
        self.commit(plan)
    }

    /// Run the configured number of ticks
    pub fn run(&mut self) -> Result<RunSummary> {
        let num_ticks = self.config.num_ticks;
        self.run_until(num_ticks, || false)
    }

    /// Run up to `num_ticks` ticks, checking `should_stop` before each commit.
    ///
    /// A stop request discards the planned tick, leaving the last committed
    /// state untouched.
    #[instrument(skip(self, should_stop))]
    pub fn run_until(
        &mut self,
        num_ticks: u64,
        mut should_stop: impl FnMut() -> bool,
    ) -> Result<RunSummary> {
        info!("Starting simulation for {} ticks", num_ticks);
        let mut summary = RunSummary {
            final_tick: self.tick,
            ..Default::default()
        };

        for _ in 0..num_ticks {
            let plan = self.plan_tick();
            if should_stop() {
                info!(tick = plan.tick(), "Stop requested, discarding planned tick");
                summary.cancelled = true;
                break;
            }
            let report = self.commit(plan)?;
            summary.absorb(&report);

            if report.tick % 1000 == 0 {
                info!(
                    "Tick {}: {} organisms alive",
                    report.tick, report.population
                );
            }
        }

        summary.census = self.census();
        self.emit_run_summary(&summary);
        Ok(summary)
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            hour: self.hour,
            day: self.day,
            climate: self.climate,
            organisms: self.organisms.values().map(OrganismView::from).collect(),
        }
    }

    /// Handle to the snapshot published after every commit
    pub fn snapshots(&self) -> SnapshotFeed {
        self.feed.clone()
    }

    /// Cross-check the organism collection, terrain and registry
    pub fn verify_integrity(&self) -> Result<()> {
        let violation = |message: String| Err(Error::InvariantViolation(message));
        if self.terrain.len() != self.organisms.len() {
            return violation(format!(
                "terrain holds {} organisms, collection holds {}",
                self.terrain.len(),
                self.organisms.len()
            ));
        }
        if self.registry.len() != self.organisms.len() {
            return violation(format!(
                "registry holds {} organisms, collection holds {}",
                self.registry.len(),
                self.organisms.len()
            ));
        }
        for (id, organism) in &self.organisms {
            if organism.id != *id {
                return violation(format!("organism {} is filed under {id}", organism.id));
            }
            if self.terrain.position_of(*id) != Some(organism.position) {
                return violation(format!(
                    "organism {id} is at {} but the terrain disagrees",
                    organism.position
                ));
            }
            if self.registry.kind_of(*id) != Some(organism.kind_tag()) {
                return violation(format!("organism {id} is missing from its registry view"));
            }
            if !self.ids.has_issued(*id) {
                return violation(format!("organism {id} was never issued"));
            }
            if organism.status() == LifeStatus::Dead {
                return violation(format!("dead organism {id} was not retired"));
            }
            organism.check_state()?;
        }
        self.terrain.check_consistency()
    }

    pub fn census(&self) -> PopulationCensus {
        let mut census = PopulationCensus::new();
        for organism in self.organisms.values() {
            match &organism.kind {
                OrganismKind::Plant(plant) => census.record_plant(organism.species, plant.parts),
                OrganismKind::Insect(insect) => {
                    census.record_insect(organism.species, insect.energy, insect.is_dying())
                }
            }
        }
        census
    }

    pub fn get(&self, id: OrganismId) -> Option<&Organism> {
        self.organisms.get(&id)
    }

    pub fn organisms(&self) -> impl Iterator<Item = &Organism> + '_ {
        self.organisms.values()
    }

    pub fn len(&self) -> usize {
        self.organisms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.organisms.is_empty()
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn registry(&self) -> &PopulationRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn allocator(&self) -> Arc<IdAllocator> {
        Arc::clone(&self.ids)
    }

    /// The id the next created organism will receive
    pub fn next_id(&self) -> OrganismId {
        self.ids.peek()
    }

    pub fn climate(&self) -> Climate {
        self.climate
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn day(&self) -> u64 {
        self.day
    }

    /// Number of committed ticks
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn soil_quality(&self) -> u32 {
        self.config.world.soil_quality
    }

    fn is_full(&self) -> bool {
        self.organisms.len() >= self.config.rules.max_population
    }

    fn advance_clock(&mut self) {
        self.tick += 1;
        if self.tick % self.config.world.ticks_per_hour as u64 == 0 {
            self.hour = (self.hour + 1) % 24;
            if self.hour == 0 {
                self.day += 1;
            }
        }
        self.climate = Climate::at_hour(self.hour);
    }

    /// First pass: aging, energy decay and the dying countdown
    fn metabolize(&mut self, id: OrganismId, decision: &Decision) -> Result<()> {
        let decay = self.config.energy.decay_per_tick;
        let dying_ticks = self.config.energy.dying_ticks;
        let Some(organism) = self.organisms.get_mut(&id) else {
            return Err(Error::InvariantViolation(format!(
                "planned organism {id} disappeared before commit"
            )));
        };
        organism.tick();
        let age = organism.age;
        let traits = organism.species.insect_traits();

        match (&mut organism.kind, decision) {
            (OrganismKind::Insect(insect), Decision::Insect(decision)) => match decision {
                InsectDecision::CountDown { remaining } => {
                    insect.behavior = BehaviorState::Dying {
                        remaining: *remaining,
                    };
                }
                InsectDecision::Expire => insect.behavior = BehaviorState::Dead,
                InsectDecision::StartDying => {
                    insect.energy = insect.energy.saturating_sub(decay);
                    insect.start_dying(dying_ticks);
                }
                _ => {
                    insect.behavior = BehaviorState::Idle;
                    insect.drain(decay, dying_ticks);
                    if let Some(traits) = traits {
                        insect.refresh_desire(age, &traits);
                    }
                }
            },
            (OrganismKind::Plant(plant), Decision::Plant(PlantDecision::Wither)) => plant.wither(),
            (OrganismKind::Plant(_), Decision::Plant(_)) => {}
            _ => {
                return Err(Error::InvariantViolation(format!(
                    "organism {id} received a decision for the other kind"
                )))
            }
        }
        Ok(())
    }

    fn apply_insect(
        &mut self,
        id: OrganismId,
        decision: InsectDecision,
        rng: &mut ChaCha8Rng,
        report: &mut TickReport,
    ) -> Result<()> {
        match decision {
            InsectDecision::Eat { food } => self.apply_eat(id, food, report),
            InsectDecision::Reproduce { partner } => self.apply_reproduce(id, partner, rng, report)?,
            InsectDecision::Move { to } => self.apply_move(id, to, report)?,
            InsectDecision::Fight { opponent, outcome } => {
                self.apply_fight(id, opponent, outcome, report)
            }
            // The initiator handles both sides of a pairing.
            InsectDecision::Paired { .. }
            | InsectDecision::Idle
            | InsectDecision::CountDown { .. }
            | InsectDecision::Expire
            | InsectDecision::StartDying => {}
        }
        Ok(())
    }

    fn apply_plant(&mut self, id: OrganismId, decision: PlantDecision, report: &mut TickReport) -> Result<()> {
        let regrowth = self.config.energy.regrowth_health;
        let Some(target) = self.organisms.get_mut(&id) else {
            return Ok(());
        };
        let traits = organism::plant_traits(target.species)?;
        let Some(plant) = target.as_plant_mut() else {
            return Ok(());
        };
        match decision {
            PlantDecision::Grow { parts } => plant.grow(parts, regrowth, &traits),
            // Eaters set the stage when they bite.
            PlantDecision::Consumed => {}
            PlantDecision::Wither | PlantDecision::Rest => plant.rest(&traits),
            PlantDecision::Spread { to } => {
                plant.rest(&traits);
                self.apply_spread(id, to, report)?;
            }
        }
        Ok(())
    }

    fn apply_eat(&mut self, id: OrganismId, food: OrganismId, report: &mut TickReport) {
        let bite_damage = self.config.energy.bite_damage;
        let edible = self.organisms.get(&food).is_some_and(Organism::is_edible);
        let eater_alive = self.organisms.get(&id).is_some_and(Organism::is_alive);
        if !edible || !eater_alive {
            trace!(tick = self.tick, organism_id = %id, food = %food, "Meal gone, staying idle");
            report.blocked += 1;
            return;
        }

        if let Some(plant) = self.organisms.get_mut(&food).and_then(Organism::as_plant_mut) {
            if plant.bite(bite_damage) {
                trace!(tick = self.tick, plant_id = %food, "Plant eaten down to nothing");
            }
        }
        if let Some(organism) = self.organisms.get_mut(&id) {
            let traits = organism.species.insect_traits();
            if let (Some(traits), Some(insect)) = (traits, organism.as_insect_mut()) {
                insect.feed(traits.energy_per_bite, &traits);
                insect.behavior = BehaviorState::Eating { food };
            }
        }
        report.meals += 1;
    }

    fn apply_move(&mut self, id: OrganismId, to: Position, report: &mut TickReport) -> Result<()> {
        let Some(from) = self.organisms.get(&id).map(|organism| organism.position) else {
            return Ok(());
        };
        match self.terrain.move_organism(id, to.x, to.y) {
            Ok(()) => {}
            Err(Error::CellOccupied { .. } | Error::OutOfBounds { .. }) => {
                trace!(tick = self.tick, organism_id = %id, to = %to, "Move blocked, staying idle");
                report.blocked += 1;
                return Ok(());
            }
            Err(err) => {
                return Err(Error::InvariantViolation(format!(
                    "terrain lost track of {id}: {err}"
                )))
            }
        }
        if let Some(organism) = self.organisms.get_mut(&id) {
            organism.position = to;
            if let Some(insect) = organism.as_insect_mut() {
                insect.behavior = BehaviorState::Moving { from, to };
            }
        }
        report.moves += 1;
        Ok(())
    }

    fn apply_fight(
        &mut self,
        id: OrganismId,
        opponent: OrganismId,
        outcome: CombatOutcome,
        report: &mut TickReport,
    ) {
        let energy = &self.config.energy;
        let (bonus, penalty, dying_ticks) = (energy.combat_bonus, energy.combat_penalty, energy.dying_ticks);
        let Some(organism) = self.organisms.get_mut(&id) else {
            return;
        };
        let traits = organism.species.insect_traits();
        let (Some(traits), Some(insect)) = (traits, organism.as_insect_mut()) else {
            return;
        };
        insect.behavior = BehaviorState::Fighting { opponent, outcome };
        match outcome {
            CombatOutcome::Winner => {
                insect.feed(bonus, &traits);
                report.fights += 1;
            }
            CombatOutcome::Loser => {
                insect.drain(penalty, dying_ticks);
                if insect.is_dying() {
                    debug!(tick = self.tick, organism_id = %id, winner = %opponent, "Fight lost, insect is dying");
                }
            }
        }
    }

    fn apply_reproduce(
        &mut self,
        initiator: OrganismId,
        partner: OrganismId,
        rng: &mut ChaCha8Rng,
        report: &mut TickReport,
    ) -> Result<()> {
        let (Some(first), Some(second)) = (self.organisms.get(&initiator), self.organisms.get(&partner))
        else {
            return Ok(());
        };
        if !first.is_alive() || !second.is_alive() {
            trace!(tick = self.tick, organism_id = %initiator, partner = %partner, "Partner no longer able to mate");
            report.blocked += 1;
            return Ok(());
        }
        if let Err(err) = reproduction_pair(first, second) {
            trace!(tick = self.tick, error = %err, "Pairing rejected at commit");
            report.blocked += 1;
            return Ok(());
        }
        let species = first.species;
        let traits = organism::insect_traits(species)?;
        if self.is_full() {
            event!(
                Level::DEBUG,
                counter_name = "reproduction_failures",
                counter_value = 1,
                failure_reason = "max_population_reached",
                organism_id = %initiator,
                tick = self.tick,
                "Reproduction attempt failed"
            );
            report.blocked += 1;
            return Ok(());
        }

        let mut spots = self.terrain.free_adjacent(first.position.x, first.position.y);
        if spots.is_empty() {
            spots = self.terrain.free_adjacent(second.position.x, second.position.y);
        }
        let Some(spot) = spots.choose(rng).copied() else {
            event!(
                Level::DEBUG,
                counter_name = "reproduction_failures",
                counter_value = 1,
                failure_reason = "no_free_cell",
                organism_id = %initiator,
                tick = self.tick,
                "Reproduction attempt failed"
            );
            report.blocked += 1;
            return Ok(());
        };

        let sex = newborn_sex(&traits, rng);
        let offspring = self.create_insect(species, spot, sex)?;
        let offspring_id = self.add_organism(offspring)?;

        let cost = self.config.energy.reproduce_cost;
        let dying_ticks = self.config.energy.dying_ticks;
        for (parent, other) in [(initiator, partner), (partner, initiator)] {
            if let Some(insect) = self.organisms.get_mut(&parent).and_then(Organism::as_insect_mut) {
                insect.drain(cost, dying_ticks);
                insect.finish_reproduction(&traits);
                if !insect.is_dying() {
                    insect.behavior = BehaviorState::Reproducing { partner: other };
                }
            }
        }
        report.births += 1;
        debug!(
            event = "organism_born",
            tick = self.tick,
            organism_id = %offspring_id,
            species = %species,
            sex = ?sex,
            parent_a = %initiator,
            parent_b = %partner,
            x = spot.x,
            y = spot.y,
            "Offspring born"
        );
        Ok(())
    }

    fn apply_spread(&mut self, parent: OrganismId, to: Position, report: &mut TickReport) -> Result<()> {
        if !self.terrain.is_free(to) || self.is_full() {
            trace!(tick = self.tick, plant_id = %parent, to = %to, "Spread blocked");
            report.blocked += 1;
            return Ok(());
        }
        let Some(species) = self.organisms.get(&parent).map(|organism| organism.species) else {
            return Ok(());
        };
        let sprout = self.create_plant(species, to)?.with_parts(1);
        let sprout_id = self.add_organism(sprout)?;
        report.sprouts += 1;
        trace!(tick = self.tick, plant_id = %sprout_id, parent = %parent, to = %to, "Plant spread");
        Ok(())
    }

    /// Remove every organism whose lifecycle reached Dead this tick
    fn retire_dead(&mut self, report: &mut TickReport) -> Result<()> {
        let dead: Vec<OrganismId> = self
            .organisms
            .values()
            .filter(|organism| organism.status() == LifeStatus::Dead)
            .map(|organism| organism.id)
            .collect();
        for id in dead {
            if let Some(organism) = self.remove_organism(id)? {
                debug!(
                    event = "organism_died",
                    tick = self.tick,
                    organism_id = %id,
                    species = %organism.species,
                    age = organism.age,
                    "Organism removed"
                );
                report.deaths += 1;
            }
        }
        Ok(())
    }

    fn emit_population_metrics(&self) {
        let census = self.census();
        info!(
            event = "population_metrics",
            tick = self.tick,
            hour = self.hour,
            day = self.day,
            total_population = census.total(),
            plants = census.plants,
            insects = census.insects,
            dying = census.dying,
            avg_insect_energy = format!("{:.2}", census.average_insect_energy()),
            plant_parts = census.plant_parts,
            extinct_species = census.extinct().len(),
            "Population metrics snapshot"
        );

        event!(
            Level::INFO,
            gauge_name = "population_total",
            gauge_value = census.total(),
            tick = self.tick,
            "Population gauge"
        );

        for (species, count) in &census.by_species {
            event!(
                Level::DEBUG,
                gauge_name = "species_population",
                gauge_value = *count,
                species = %species,
                tick = self.tick,
                "Species population"
            );
        }
    }

    fn emit_run_summary(&self, summary: &RunSummary) {
        info!(
            event = "run_summary",
            ticks_run = summary.ticks_run,
            final_tick = summary.final_tick,
            cancelled = summary.cancelled,
            births = summary.births,
            sprouts = summary.sprouts,
            deaths = summary.deaths,
            fights = summary.fights,
            meals = summary.meals,
            survivors = summary.census.total(),
            "Simulation finished"
        );

        let extinct = summary.census.extinct();
        if !extinct.is_empty() {
            info!(
                event = "extinctions",
                species = ?extinct,
                "Some species died out"
            );
        }

        event!(
            Level::INFO,
            gauge_name = "final_population",
            gauge_value = summary.census.total(),
            "Final population gauge"
        );
    }
}
