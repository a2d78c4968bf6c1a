/// Player movement rules: terrain only.
///
/// Pure functions over the board. They work out where a move ends up without
/// looking at ghosts or fruit; occupancy checks belong to the turn engine.
///
/// ## Resolution table
///
/// ┌───────────────────────────────┬──────────────────────────────┐
/// │ Situation                      │ Result                       │
/// ├───────────────────────────────┼──────────────────────────────┤
/// │ Target wall / off grid         │ no path (move blocked)       │
/// │ Target floor                   │ land on target               │
/// │ Target ice, next blocked       │ bounce: land on origin       │
/// │ Target ice, run of ice → floor │ slide, land on first non-ice │
/// │ Ice run ends at a wall         │ land on last ice cell        │
/// │ Landing cell is a portal       │ exit at the paired portal    │
/// │ Bounce onto a portal origin    │ no teleport                  │
/// └───────────────────────────────┴──────────────────────────────┘
///
/// Teleports never chain: the exit portal is the destination.

use super::board::Board;
use super::entity::{Cell, Direction};

/// Where a player move goes, before any ghost is considered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerPath {
    pub direction: Direction,
    pub origin: Cell,
    /// Cells entered on the way that are not the destination, in order.
    pub transit: Vec<Cell>,
    /// Where movement stopped, before any teleport.
    pub landing: Cell,
    /// Final cell for this turn.
    pub destination: Cell,
    /// Ice cells crossed (includes the bounce cell).
    pub ice: Vec<Cell>,
    pub bounced: bool,
    /// (entry portal, exit portal)
    pub teleport: Option<(Cell, Cell)>,
}

impl PlayerPath {
    /// Every cell Pac-Man stands on during the move, destination last.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.transit.iter().copied().chain(std::iter::once(self.destination))
    }
}

/// Resolve stepping from `origin` toward `dir`. `None` when the first step
/// is blocked.
pub fn resolve_path(board: &Board, origin: Cell, dir: Direction) -> Option<PlayerPath> {
    let first = board.neighbor(origin, dir)?;
    let mut entered = vec![first];
    let mut ice = vec![];
    let mut landing = first;
    let mut bounced = false;

    if board.is_ice(first) {
        let mut current = first;
        ice.push(first);
        loop {
            match board.neighbor(current, dir) {
                None => {
                    if current == first {
                        bounced = true;
                        landing = origin;
                    } else {
                        landing = current;
                    }
                    break;
                }
                Some(next) => {
                    entered.push(next);
                    if !board.is_ice(next) {
                        landing = next;
                        break;
                    }
                    ice.push(next);
                    current = next;
                }
            }
        }
    }

    let teleport = if bounced {
        None
    } else {
        board.portal_partner(landing).map(|exit| (landing, exit))
    };
    let destination = teleport.map_or(landing, |(_, exit)| exit);

    // The landing cell is transit only when we leave it again (teleport);
    // on a bounce every entered cell is transit.
    if !bounced && teleport.is_none() {
        entered.pop();
    }

    Some(PlayerPath {
        direction: dir,
        origin,
        transit: entered,
        landing,
        destination,
        ice,
        bounced,
        teleport,
    })
}

/// Action-cost metric for cost-aware search. Never used to pick moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionCosts {
    pub player_move: u32,
    pub red_move: u32,
    pub eat_fruit: u32,
    pub kill: u32,
}

impl Default for ActionCosts {
    fn default() -> Self {
        ActionCosts { player_move: 1, red_move: 1, eat_fruit: 2, kill: 1 }
    }
}
