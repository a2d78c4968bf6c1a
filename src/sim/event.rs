/// Events emitted while a turn resolves, in order.
/// The presentation layer consumes these for its status line; search
/// consumers usually only look at the `TurnOutcome` summary fields.

use crate::domain::entity::{Cell, Direction, GhostKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnEvent {
    PlayerMoved { from: Cell, to: Cell, direction: Direction },
    Slid { over: Vec<Cell> },
    Bounced { at: Cell },
    Teleported { from: Cell, to: Cell },
    FruitEaten { id: usize, kind: GhostKind, at: Cell },
    GhostMoved { id: usize, from: Cell, to: Cell },
    GhostHeld { id: usize, at: Cell },
    GhostKilled { id: usize, kind: GhostKind, at: Cell },
    Won,
}

/// Result of one accepted player move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Pac-Man's cell after the turn.
    pub pacman: Cell,
    /// Ids of ghosts killed this turn, in kill order.
    pub killed: Vec<usize>,
    pub goal: bool,
    /// Action cost of this turn.
    pub cost: u32,
    pub events: Vec<TurnEvent>,
}
