//! Error types. Construction-time map problems are fatal; illegal moves are
//! per-turn and leave the simulation untouched.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::entity::{Cell, Direction};
use crate::domain::tile::Tile;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedMapError {
    #[error("map contains no rows")]
    Empty,
    #[error("map has no Pac-Man start tile 'P'")]
    MissingPlayer,
    #[error("map has more than one Pac-Man start tile: {first} and {second}")]
    MultiplePlayers { first: Cell, second: Cell },
    #[error("unrecognized map character {ch:?} at ({x}, {y})")]
    UnknownTile { ch: char, x: usize, y: usize },
    #[error("map must contain exactly two portal tiles, found {found}")]
    PortalCount { found: usize },
}

/// The map legend has no glyph for an entity standing on a portal or ice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot write map text: entity at {cell} covers a {tile:?} tile")]
pub struct CoveredTerrainError {
    pub cell: Cell,
    pub tile: Tile,
}

/// Why a player move failed the legality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalReason {
    /// The simulation already reached its goal.
    GameOver,
    /// Wall or grid edge.
    Blocked,
    /// A live, non-vulnerable ghost sits on a cell crossed during the move.
    GhostInPath { cell: Cell },
    /// A live, non-vulnerable ghost occupies the destination.
    Occupied { cell: Cell },
    /// A live, non-vulnerable ghost would step onto the destination this turn.
    GhostReaction { ghost: usize, cell: Cell },
    /// The destination holds another fruit while the active one still has
    /// live targets (only with `protect_active_fruit`).
    FruitWouldBeWasted { cell: Cell },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal move {direction}: {}", describe(.reason))]
pub struct IllegalMove {
    pub direction: Direction,
    pub reason: IllegalReason,
}

fn describe(reason: &IllegalReason) -> String {
    match reason {
        IllegalReason::GameOver => "all ghosts are already dead".to_string(),
        IllegalReason::Blocked => "blocked by a wall".to_string(),
        IllegalReason::GhostInPath { cell } => format!("ghost in the way at {cell}"),
        IllegalReason::Occupied { cell } => format!("ghost occupies {cell}"),
        IllegalReason::GhostReaction { ghost, cell } => {
            format!("ghost {ghost} would move onto {cell}")
        }
        IllegalReason::FruitWouldBeWasted { cell } => {
            format!("fruit at {cell} would replace the active one")
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} parse error: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
