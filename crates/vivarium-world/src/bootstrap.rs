//! Initial population setup.

use crate::environment::Environment;
use crate::ids::IdAllocator;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tracing::info;
use vivarium_core::{Error, OrganismId, Position, Result, Sex, Sexes, SimulationConfig};

/// A freshly populated environment
pub struct Ecosystem {
    pub environment: Environment,
    /// First id not yet handed out
    pub next_id: OrganismId,
}

/// Build an environment and scatter the configured population on random free cells
pub fn bootstrap(config: &SimulationConfig) -> Result<Ecosystem> {
    bootstrap_with_allocator(config, Arc::new(IdAllocator::new()))
}

/// Like [`bootstrap`], drawing ids from a shared allocator
pub fn bootstrap_with_allocator(config: &SimulationConfig, ids: Arc<IdAllocator>) -> Result<Ecosystem> {
    let mut environment = Environment::with_allocator(config.clone(), ids)?;

    let wanted = config.population.total();
    let cells = environment.terrain().capacity();
    if wanted > cells {
        return Err(Error::CapacityExceeded { capacity: cells });
    }
    if wanted > config.rules.max_population {
        return Err(Error::CapacityExceeded {
            capacity: config.rules.max_population,
        });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut free: Vec<Position> = (0..cells)
        .map(|index| environment.terrain().index_to_pos(index))
        .collect();
    free.shuffle(&mut rng);
    let mut spots = free.into_iter();

    for (species, count) in &config.population.initial {
        for n in 0..*count {
            let Some(pos) = spots.next() else {
                return Err(Error::CapacityExceeded { capacity: cells });
            };
            match species.insect_traits() {
                Some(traits) => {
                    let sex = match traits.sexes {
                        Sexes::Hermaphrodite => Sex::Hermaphrodite,
                        Sexes::Dioecious if n % 2 == 0 => Sex::Male,
                        Sexes::Dioecious => Sex::Female,
                    };
                    environment.spawn_insect(*species, pos.x, pos.y, sex)?;
                }
                None => {
                    environment.spawn_plant(*species, pos.x, pos.y)?;
                }
            }
        }
    }

    let census = environment.census();
    info!(
        event = "ecosystem_bootstrapped",
        width = config.world.width,
        height = config.world.height,
        seed = config.seed,
        plants = census.plants,
        insects = census.insects,
        "Initial population placed"
    );

    let next_id = environment.next_id();
    Ok(Ecosystem {
        environment,
        next_id,
    })
}
