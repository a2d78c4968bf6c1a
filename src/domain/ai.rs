/// Ghost AI: one pure policy per ghost kind.
///
/// Three behaviors:
///   1. **Mirror** (blue): steps opposite to Pac-Man's last move.
///   2. **Mimic** (green): steps the same way as Pac-Man's last move.
///   3. **WallFollower** (red): ignores Pac-Man and replays its
///      precomputed route (see `trajectory`).
///
/// Policies only propose a target cell. Collision checks against Pac-Man
/// and committing the move belong to the turn engine.

use super::board::Board;
use super::entity::{Cell, Direction, Ghost, GhostKind};

/// Where `ghost` would move in reaction to `last_move`.
/// `None` means the ghost stays where it is this reaction.
pub fn reaction_target(ghost: &Ghost, last_move: Direction, board: &Board) -> Option<Cell> {
    match ghost.kind {
        GhostKind::Mirror => board.neighbor(ghost.cell, last_move.opposite()),
        GhostKind::Mimic => board.neighbor(ghost.cell, last_move),
        GhostKind::WallFollower => {
            let step = ghost.route.as_ref()?.peek();
            (step.to != ghost.cell).then_some(step.to)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::board::test_board;
    use crate::domain::entity::WallFollowerRoute;
    use crate::domain::trajectory::Trajectory;

    fn open_3x3() -> Board {
        test_board(&[
            "...",
            "...",
            "...",
        ])
    }

    #[test]
    fn mirror_moves_opposite() {
        let board = open_3x3();
        let ghost = Ghost::new(0, GhostKind::Mirror, Cell::new(1, 1));
        assert_eq!(reaction_target(&ghost, Direction::North, &board), Some(Cell::new(1, 2)));
        assert_eq!(reaction_target(&ghost, Direction::East, &board), Some(Cell::new(0, 1)));
    }

    #[test]
    fn mimic_moves_same_way() {
        let board = open_3x3();
        let ghost = Ghost::new(0, GhostKind::Mimic, Cell::new(1, 1));
        assert_eq!(reaction_target(&ghost, Direction::North, &board), Some(Cell::new(1, 0)));
        assert_eq!(reaction_target(&ghost, Direction::West, &board), Some(Cell::new(0, 1)));
    }

    #[test]
    fn blocked_reaction_stays_put() {
        let board = open_3x3();
        let mirror = Ghost::new(0, GhostKind::Mirror, Cell::new(1, 0));
        // Player went south → mirror tries north off the board.
        assert_eq!(reaction_target(&mirror, Direction::South, &board), None);
        let mimic = Ghost::new(1, GhostKind::Mimic, Cell::new(2, 2));
        assert_eq!(reaction_target(&mimic, Direction::East, &board), None);
    }

    #[test]
    fn wall_follower_ignores_player_direction() {
        let board = open_3x3();
        let start = Cell::new(0, 0);
        let table = Trajectory::compute(&board, start, Direction::East, 64);
        let ghost = Ghost::new(0, GhostKind::WallFollower, start)
            .with_route(WallFollowerRoute::new(Arc::new(table)));
        for d in Direction::ALL {
            assert_eq!(reaction_target(&ghost, d, &board), Some(Cell::new(1, 0)));
        }
    }

    #[test]
    fn parked_wall_follower_has_no_target() {
        let board = test_board(&["#.#"]);
        let start = Cell::new(1, 0);
        let table = Trajectory::compute(&board, start, Direction::East, 64);
        let ghost = Ghost::new(0, GhostKind::WallFollower, start)
            .with_route(WallFollowerRoute::new(Arc::new(table)));
        assert_eq!(reaction_target(&ghost, Direction::North, &board), None);
    }
}
