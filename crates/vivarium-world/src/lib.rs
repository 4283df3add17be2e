//! World simulation engine.
//!
//! This crate implements the grid environment where plants grow and insects
//! feed, fight, breed and die, advanced one two-phase tick at a time.

pub mod behavior;
pub mod bootstrap;
pub mod environment;
pub mod ids;
pub mod organism;
pub mod registry;
pub mod snapshot;
pub mod terrain;

pub use behavior::{reproduction_pair, Decision, InsectDecision, PlantDecision};
pub use bootstrap::{bootstrap, bootstrap_with_allocator, Ecosystem};
pub use environment::{Environment, RunSummary, TickPlan, TickReport};
pub use ids::IdAllocator;
pub use organism::{BehaviorState, InsectState, Organism, OrganismKind, PlantStage, PlantState};
pub use registry::PopulationRegistry;
pub use snapshot::{OrganismView, Snapshot, SnapshotFeed};
pub use terrain::Terrain;
