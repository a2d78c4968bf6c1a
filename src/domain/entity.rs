/// Entities: Pac-Man, Ghost, Fruit, plus the grid primitives they share
/// (Cell, Direction).
/// Ghost behavior is a closed set, so `GhostKind` is matched exhaustively
/// wherever behavior differs.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use super::trajectory::{Trajectory, TrajectoryStep};

/// A walkable grid position. Column `x`, row `y`, origin top-left.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Cell { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::North, Direction::South, Direction::East, Direction::West];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// One quarter turn clockwise: East → South → West → North → East.
    pub fn clockwise(self) -> Direction {
        match self {
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
            Direction::North => Direction::East,
        }
    }

    /// Rotation order anchored at `self`, e.g. East → [E, S, W, N].
    pub fn clockwise_from(self) -> [Direction; 4] {
        let second = self.clockwise();
        let third = second.clockwise();
        [self, second, third, third.clockwise()]
    }

    /// Grid offset (dx, dy); north is up (negative y).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

/// Ghost behavior, fixed per ghost. Also the fruit type that neutralizes it:
/// a fruit of kind `Mirror` makes mirror ghosts vulnerable.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum GhostKind {
    WallFollower, // red
    Mirror,       // blue
    Mimic,        // green
}

impl GhostKind {
    pub fn from_ghost_glyph(ch: char) -> Option<GhostKind> {
        match ch {
            'R' => Some(GhostKind::WallFollower),
            'B' => Some(GhostKind::Mirror),
            'G' => Some(GhostKind::Mimic),
            _ => None,
        }
    }

    pub fn from_fruit_glyph(ch: char) -> Option<GhostKind> {
        match ch {
            '!' => Some(GhostKind::WallFollower),
            '$' => Some(GhostKind::Mirror),
            '@' => Some(GhostKind::Mimic),
            _ => None,
        }
    }

    pub fn ghost_glyph(self) -> char {
        match self {
            GhostKind::WallFollower => 'R',
            GhostKind::Mirror => 'B',
            GhostKind::Mimic => 'G',
        }
    }

    pub fn fruit_glyph(self) -> char {
        match self {
            GhostKind::WallFollower => '!',
            GhostKind::Mirror => '$',
            GhostKind::Mimic => '@',
        }
    }

    pub fn color_name(self) -> &'static str {
        match self {
            GhostKind::WallFollower => "red",
            GhostKind::Mirror => "blue",
            GhostKind::Mimic => "green",
        }
    }

    /// Does this ghost react to the player's move direction?
    /// Wall-followers walk their own route instead.
    pub fn reacts_to_player(self) -> bool {
        !matches!(self, GhostKind::WallFollower)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacmanState {
    pub cell: Cell,
    /// `None` before the first accepted move.
    pub last_move: Option<Direction>,
}

impl PacmanState {
    pub fn new(cell: Cell) -> Self {
        PacmanState { cell, last_move: None }
    }
}

/// Position of a wall-follower on its precomputed route.
/// The table is immutable and shared between clones of a simulation.
#[derive(Clone, Debug)]
pub struct WallFollowerRoute {
    pub table: Arc<Trajectory>,
    pub cursor: usize,
    pub facing: Direction,
}

impl WallFollowerRoute {
    pub fn new(table: Arc<Trajectory>) -> Self {
        let facing = table.initial_facing();
        WallFollowerRoute { table, cursor: 0, facing }
    }

    /// The step this ghost takes on its next reaction.
    pub fn peek(&self) -> TrajectoryStep {
        self.table.step(self.cursor)
    }

    /// Consume the current step, returning it.
    pub fn advance(&mut self) -> TrajectoryStep {
        let step = self.table.step(self.cursor);
        self.cursor = self.table.next_index(self.cursor);
        self.facing = step.facing;
        step
    }
}

#[derive(Clone, Debug)]
pub struct Ghost {
    pub id: usize,
    pub kind: GhostKind,
    pub alive: bool,
    pub cell: Cell,
    pub spawn: Cell,
    /// Present for wall-followers only.
    pub route: Option<WallFollowerRoute>,
}

impl Ghost {
    pub fn new(id: usize, kind: GhostKind, cell: Cell) -> Self {
        Ghost { id, kind, alive: true, cell, spawn: cell, route: None }
    }

    pub fn with_route(mut self, route: WallFollowerRoute) -> Self {
        self.route = Some(route);
        self
    }

    /// Facing of a wall-follower; `None` for player-reactive ghosts.
    pub fn facing(&self) -> Option<Direction> {
        self.route.as_ref().map(|r| r.facing)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fruit {
    pub id: usize,
    pub kind: GhostKind,
    /// `None` once eaten.
    pub cell: Option<Cell>,
}

impl Fruit {
    pub fn new(id: usize, kind: GhostKind, cell: Cell) -> Self {
        Fruit { id, kind, cell: Some(cell) }
    }

    pub fn is_consumed(&self) -> bool {
        self.cell.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for d in Direction::ALL {
            assert_ne!(d.opposite(), d);
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn clockwise_order_anchored_at_east() {
        assert_eq!(
            Direction::East.clockwise_from(),
            [Direction::East, Direction::South, Direction::West, Direction::North],
        );
        assert_eq!(
            Direction::North.clockwise_from(),
            [Direction::North, Direction::East, Direction::South, Direction::West],
        );
    }

    #[test]
    fn glyphs_round_trip_through_kind() {
        for kind in [GhostKind::WallFollower, GhostKind::Mirror, GhostKind::Mimic] {
            assert_eq!(GhostKind::from_ghost_glyph(kind.ghost_glyph()), Some(kind));
            assert_eq!(GhostKind::from_fruit_glyph(kind.fruit_glyph()), Some(kind));
        }
        assert_eq!(GhostKind::from_ghost_glyph('P'), None);
        assert_eq!(GhostKind::from_fruit_glyph('#'), None);
    }

    #[test]
    fn only_wall_follower_ignores_the_player() {
        assert!(!GhostKind::WallFollower.reacts_to_player());
        assert!(GhostKind::Mirror.reacts_to_player());
        assert!(GhostKind::Mimic.reacts_to_player());
    }
}
