//! Error types for the simulation.

use crate::{Kind, OrganismId, Species};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Position ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    #[error("Cell ({x}, {y}) is already occupied by organism {occupant}")]
    CellOccupied { x: i32, y: i32, occupant: OrganismId },

    #[error("Organism not found: {0}")]
    OrganismNotFound(OrganismId),

    #[error("Organisms {first} and {second} cannot reproduce together: {reason}")]
    InvalidReproductionPair {
        first: OrganismId,
        second: OrganismId,
        reason: String,
    },

    #[error("Population capacity of {capacity} organisms exceeded")]
    CapacityExceeded { capacity: usize },

    #[error("{species} is not a {expected:?} species")]
    WrongKind { species: Species, expected: Kind },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Plan for tick {planned} is stale; the environment changed after it was made (now at tick {current})")]
    StaleTick { planned: u64, current: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Errors that mean the environment's coupled structures can no longer be
    /// trusted. These always abort the tick loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::InvariantViolation(_) | Error::StaleTick { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
