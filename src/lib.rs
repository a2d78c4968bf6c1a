//! Deterministic, turn-based Pac-Man arena simulation.
//!
//! The core is a pure state-transition function: build a [`Simulation`]
//! from a text map, feed it player directions with [`Simulation::apply`],
//! and test for the goal (every ghost dead) with [`Simulation::is_goal`].
//! Search consumers branch with `clone()` and enumerate successors with
//! [`Simulation::legal_moves`]. Nothing here logs, prints or chooses moves.

pub mod config;
pub mod domain;
pub mod error;
pub mod sim;

pub use config::{GameConfig, SimConfig};
pub use domain::entity::{Cell, Direction, GhostKind};
pub use error::{CoveredTerrainError, IllegalMove, IllegalReason, MalformedMapError};
pub use sim::event::{TurnEvent, TurnOutcome};
pub use sim::world::{Phase, Simulation, StateKey};

/// Build a simulation from map text with the default rule set.
pub fn new_simulation(map: &str) -> Result<Simulation, MalformedMapError> {
    Simulation::new(map)
}
