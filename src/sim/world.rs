/// Simulation: the complete snapshot of a running arena.
///
/// ## Ownership
///
///   - `board`: static topology, shared behind an `Arc`. **Never mutated**.
///   - wall-follower route tables: likewise shared and immutable.
///   - everything else (Pac-Man, ghosts, fruits, phase, counters) is owned
///     by the instance, so `clone()` yields a fully independent branch.
///
/// ## Phases
///
///   AwaitingPlayerMove ──apply──▶ ResolvingPlayerMove
///          ▲                             │
///          │                             ▼
///          └──── both flags clear ── AwaitingGhostReaction
///                                    { ghosts_pending, red_pending }
///   any phase ── all ghosts dead ──▶ Won (terminal)
///
/// Between calls the phase is always `AwaitingPlayerMove` or `Won`; the
/// intermediate phases only exist inside `apply`.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::SimConfig;
use crate::domain::ai;
use crate::domain::board::Board;
use crate::domain::entity::{Cell, Direction, Fruit, Ghost, GhostKind, PacmanState, WallFollowerRoute};
use crate::domain::trajectory::Trajectory;
use crate::error::{CoveredTerrainError, MalformedMapError};
use crate::sim::level::{self, MapLayout};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    AwaitingPlayerMove,
    ResolvingPlayerMove { direction: Direction },
    /// The two reaction groups never interact, so each has its own flag.
    AwaitingGhostReaction { ghosts_pending: bool, red_pending: bool },
    Won,
}

/// Hashable digest of everything that influences future turns.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct StateKey {
    pub pacman: Cell,
    /// (alive, cell, route cursor) per ghost, in id order.
    pub ghosts: Vec<(bool, Cell, usize)>,
    /// Eaten flag per fruit, in id order.
    pub fruits_eaten: Vec<bool>,
    pub active_fruit: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct Simulation {
    pub(crate) board: Arc<Board>,
    pub(crate) config: SimConfig,

    // ── Entities ──
    pub(crate) pacman: PacmanState,
    pub(crate) ghosts: Vec<Ghost>,
    pub(crate) fruits: Vec<Fruit>,
    /// Index of the single active fruit, if any.
    pub(crate) active_fruit: Option<usize>,

    // ── Meta ──
    pub(crate) phase: Phase,
    pub(crate) turn: u64,
    pub(crate) total_cost: u64,
}

// ── Construction ──

impl Simulation {
    /// Build from map text with the default rule set.
    pub fn new(map: &str) -> Result<Self, MalformedMapError> {
        Self::with_config(map, SimConfig::default())
    }

    pub fn with_config(map: &str, config: SimConfig) -> Result<Self, MalformedMapError> {
        Ok(Self::from_layout(level::parse_map(map)?, config))
    }

    /// Seed entities from a parsed layout and precompute one route table
    /// per wall-follower.
    pub fn from_layout(layout: MapLayout, config: SimConfig) -> Self {
        let MapLayout { board, pacman, ghosts, fruits } = layout;
        let bound = config
            .trajectory_step_bound
            .unwrap_or_else(|| Trajectory::exhaustive_bound(&board));

        let ghosts: Vec<Ghost> = ghosts
            .into_iter()
            .enumerate()
            .map(|(id, (kind, cell))| {
                let ghost = Ghost::new(id, kind, cell);
                match kind {
                    GhostKind::WallFollower => {
                        let table = Trajectory::compute(&board, cell, config.wall_follower_facing, bound);
                        ghost.with_route(WallFollowerRoute::new(Arc::new(table)))
                    }
                    GhostKind::Mirror | GhostKind::Mimic => ghost,
                }
            })
            .collect();

        let fruits = fruits
            .into_iter()
            .enumerate()
            .map(|(id, (kind, cell))| Fruit::new(id, kind, cell))
            .collect();

        let phase = if ghosts.is_empty() { Phase::Won } else { Phase::AwaitingPlayerMove };

        Simulation {
            board: Arc::new(board),
            config,
            pacman: PacmanState::new(pacman),
            ghosts,
            fruits,
            active_fruit: None,
            phase,
            turn: 0,
            total_cost: 0,
        }
    }
}

// ── Queries ──

impl Simulation {
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn pacman(&self) -> &PacmanState {
        &self.pacman
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn fruits(&self) -> &[Fruit] {
        &self.fruits
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Accepted moves so far.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn total_cost(&self) -> u64 {
        self.total_cost
    }

    /// All ghosts dead.
    pub fn is_goal(&self) -> bool {
        self.phase == Phase::Won
    }

    pub fn active_fruit(&self) -> Option<&Fruit> {
        self.active_fruit.and_then(|i| self.fruits.get(i))
    }

    /// Kind of ghost the active fruit makes vulnerable.
    pub fn active_kind(&self) -> Option<GhostKind> {
        self.active_fruit().map(|f| f.kind)
    }

    pub fn is_fruit_active(&self, id: usize) -> bool {
        self.active_fruit == Some(id)
    }

    pub fn is_vulnerable(&self, ghost: &Ghost) -> bool {
        self.active_kind() == Some(ghost.kind)
    }

    pub fn live_ghosts(&self) -> impl Iterator<Item = &Ghost> + '_ {
        self.ghosts.iter().filter(|g| g.alive)
    }

    /// Index of the uneaten fruit on `cell`.
    pub fn fruit_at(&self, cell: Cell) -> Option<usize> {
        self.fruits.iter().position(|f| f.cell == Some(cell))
    }

    pub fn state_key(&self) -> StateKey {
        StateKey {
            pacman: self.pacman.cell,
            ghosts: self
                .ghosts
                .iter()
                .map(|g| (g.alive, g.cell, g.route.as_ref().map_or(0, |r| r.cursor)))
                .collect(),
            fruits_eaten: self.fruits.iter().map(Fruit::is_consumed).collect(),
            active_fruit: self.active_fruit,
        }
    }

    /// Cells a live, non-vulnerable ghost occupies now or would step into
    /// after any player move.
    pub fn threatened_cells(&self) -> BTreeSet<Cell> {
        let mut cells = BTreeSet::new();
        for ghost in self.live_ghosts().filter(|g| !self.is_vulnerable(g)) {
            cells.insert(ghost.cell);
            for dir in Direction::ALL {
                if let Some(target) = ai::reaction_target(ghost, dir, &self.board) {
                    cells.insert(target);
                }
            }
        }
        cells
    }

    /// The current position written back in map-file notation. Dead ghosts
    /// and eaten fruit are omitted; Pac-Man wins a shared cell, then ghosts.
    /// Fails when an entity stands on a portal or ice tile, since the legend
    /// can only place entities on floor.
    pub fn to_map_text(&self) -> Result<String, CoveredTerrainError> {
        let mut out = String::with_capacity((self.board.width() + 1) * self.board.height());
        for y in 0..self.board.height() {
            if y > 0 {
                out.push('\n');
            }
            for x in 0..self.board.width() {
                let cell = Cell::new(x, y);
                let tile = self.board.tile(cell);
                let entity = if self.pacman.cell == cell {
                    Some('P')
                } else if let Some(ghost) = self.live_ghosts().find(|g| g.cell == cell) {
                    Some(ghost.kind.ghost_glyph())
                } else {
                    self.fruit_at(cell).map(|id| self.fruits[id].kind.fruit_glyph())
                };
                match entity {
                    Some(_) if tile.is_portal() || tile.is_ice() => {
                        return Err(CoveredTerrainError { cell, tile });
                    }
                    Some(ch) => out.push(ch),
                    None => out.push(tile.glyph()),
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::Tile;

    #[test]
    fn seeds_entities_in_map_order() {
        let sim = Simulation::new(
            "#######\n\
             #P.B.$#\n\
             #R...G#\n\
             #######",
        )
        .unwrap();
        assert_eq!(sim.pacman().cell, Cell::new(1, 1));
        assert_eq!(sim.pacman().last_move, None);
        let kinds: Vec<GhostKind> = sim.ghosts().iter().map(|g| g.kind).collect();
        assert_eq!(kinds, vec![GhostKind::Mirror, GhostKind::WallFollower, GhostKind::Mimic]);
        assert!(sim.ghosts().iter().all(|g| g.alive));
        assert_eq!(sim.fruits().len(), 1);
        assert_eq!(sim.phase(), Phase::AwaitingPlayerMove);
        assert!(!sim.is_goal());
        assert_eq!(sim.active_fruit(), None);
    }

    #[test]
    fn only_wall_followers_get_routes() {
        let sim = Simulation::new("P.R\n.B.").unwrap();
        for ghost in sim.ghosts() {
            assert_eq!(ghost.route.is_some(), ghost.kind == GhostKind::WallFollower);
        }
        let red = &sim.ghosts()[0];
        assert_eq!(red.facing(), Some(Direction::East));
        assert_eq!(red.route.as_ref().map(|r| r.table.start()), Some(red.cell));
    }

    #[test]
    fn configured_facing_and_bound_reach_the_route() {
        let config = SimConfig {
            wall_follower_facing: Direction::West,
            trajectory_step_bound: Some(2),
            ..SimConfig::default()
        };
        let sim = Simulation::with_config("P...R", config).unwrap();
        let route = sim.ghosts()[0].route.as_ref().unwrap();
        assert_eq!(route.facing, Direction::West);
        assert!(route.table.is_truncated());
        assert_eq!(route.table.len(), 3);
    }

    #[test]
    fn map_without_ghosts_starts_won() {
        let sim = Simulation::new("P.$").unwrap();
        assert!(sim.is_goal());
        assert_eq!(sim.phase(), Phase::Won);
    }

    #[test]
    fn threatened_cells_cover_reactions() {
        let sim = Simulation::new(
            "P....\n\
             .....\n\
             ..B..",
        )
        .unwrap();
        let threats = sim.threatened_cells();
        let expected: BTreeSet<Cell> =
            [Cell::new(2, 2), Cell::new(2, 1), Cell::new(1, 2), Cell::new(3, 2)].into_iter().collect();
        assert_eq!(threats, expected);
    }

    #[test]
    fn state_key_tracks_entities() {
        let sim = Simulation::new("P.B.$").unwrap();
        let key = sim.state_key();
        assert_eq!(key.pacman, Cell::new(0, 0));
        assert_eq!(key.ghosts, vec![(true, Cell::new(2, 0), 0)]);
        assert_eq!(key.fruits_eaten, vec![false]);
        assert_eq!(key.active_fruit, None);
        assert_eq!(sim.clone().state_key(), key);
    }

    #[test]
    fn map_text_reflects_the_position() {
        let map = "#####\n#P.B#\n#O$O#\n#####";
        let mut sim = Simulation::new(map).unwrap();
        assert_eq!(sim.to_map_text().unwrap(), map);
        let reparsed = Simulation::new(&sim.to_map_text().unwrap()).unwrap();
        assert_eq!(reparsed.state_key(), sim.state_key());

        sim.ghosts[0].alive = false;
        sim.fruits[0].cell = None;
        assert_eq!(sim.to_map_text().unwrap(), "#####\n#P..#\n#O.O#\n#####");
    }

    fn assert_reparses(sim: &Simulation) {
        let text = sim.to_map_text().unwrap();
        let reparsed = Simulation::new(&text).unwrap();
        assert_eq!(reparsed.pacman().cell, sim.pacman().cell);
        let ghosts: Vec<_> = sim.live_ghosts().map(|g| (g.kind, g.cell)).collect();
        let again: Vec<_> = reparsed.ghosts().iter().map(|g| (g.kind, g.cell)).collect();
        assert_eq!(again, ghosts);
    }

    #[test]
    fn map_text_refuses_pacman_on_the_exit_portal() {
        let mut sim = Simulation::new("OP..O\n....B").unwrap();
        sim.apply(Direction::West).unwrap();
        assert_eq!(sim.pacman().cell, Cell::new(4, 0));
        assert_eq!(
            sim.to_map_text(),
            Err(CoveredTerrainError { cell: Cell::new(4, 0), tile: Tile::Portal })
        );

        sim.apply(Direction::West).unwrap();
        assert_eq!(sim.to_map_text().unwrap(), "O..PO\n....B");
        assert_reparses(&sim);
    }

    #[test]
    fn map_text_refuses_pacman_on_the_last_ice_cell() {
        let mut sim = Simulation::new("PII#B").unwrap();
        sim.apply(Direction::East).unwrap();
        assert_eq!(sim.pacman().cell, Cell::new(2, 0));
        assert_eq!(
            sim.to_map_text(),
            Err(CoveredTerrainError { cell: Cell::new(2, 0), tile: Tile::Ice })
        );

        sim.apply(Direction::West).unwrap();
        assert_eq!(sim.to_map_text().unwrap(), "PII#B");
        assert_reparses(&sim);
    }
}
