//! Core types and utilities for the vivarium ecosystem simulation.

pub mod types;
pub mod species;
pub mod config;
pub mod error;
pub mod census;

pub use error::{Error, Result};
pub use types::*;
pub use species::*;
pub use config::*;
pub use census::*;
