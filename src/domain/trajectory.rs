/// Wall-follower route precomputation.
///
/// The red ghost moves deterministically and never looks at the player:
/// keep going in the current facing, and when blocked try the remaining
/// directions clockwise from it. Over a finite board the (cell, facing)
/// state must eventually repeat, so the infinite walk folds into a finite
/// table:
///
/// ```text
///   steps:  [ p0 p1 .. pk-1 | c0 c1 .. cm-1 ]
///             prefix          cycle
///   index i >= len  →  cycle_start + (i - cycle_start) % cycle_len
/// ```
///
/// Built once at load time; lookups never re-simulate.

use std::collections::HashMap;

use super::board::Board;
use super::entity::{Cell, Direction};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TrajectoryStep {
    pub from: Cell,
    pub to: Cell,
    /// Facing after taking this step.
    pub facing: Direction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trajectory {
    steps: Vec<TrajectoryStep>,
    cycle_start: usize,
    initial_facing: Direction,
    truncated: bool,
}

/// One wall-follower move from `(cell, facing)`: the first open neighbor in
/// clockwise order anchored at `facing`. A fully enclosed cell stays put.
pub fn wall_follower_move(board: &Board, cell: Cell, facing: Direction) -> (Cell, Direction) {
    for dir in facing.clockwise_from() {
        if let Some(next) = board.neighbor(cell, dir) {
            return (next, dir);
        }
    }
    (cell, facing)
}

impl Trajectory {
    /// A step bound that always reaches a repeated state: there are only
    /// `4 × cells` distinct (cell, facing) pairs.
    pub fn exhaustive_bound(board: &Board) -> usize {
        board.cell_count() * 4 + 1
    }

    /// Simulate from `(start, facing)` until the first repeated state, or
    /// until `max_steps` steps were recorded. A run that hits the bound ends
    /// in a terminal step that loops on itself (the ghost stops).
    pub fn compute(board: &Board, start: Cell, facing: Direction, max_steps: usize) -> Self {
        let mut seen: HashMap<(Cell, Direction), usize> = HashMap::new();
        let mut steps: Vec<TrajectoryStep> = Vec::new();
        let mut cell = start;
        let mut dir = facing;

        loop {
            if let Some(&first) = seen.get(&(cell, dir)) {
                // Repeat: the last step already lands on the cycle's first cell.
                debug_assert_eq!(steps.last().map(|s| s.to), Some(steps[first].from));
                return Trajectory { steps, cycle_start: first, initial_facing: facing, truncated: false };
            }
            if steps.len() >= max_steps {
                steps.push(TrajectoryStep { from: cell, to: cell, facing: dir });
                let cycle_start = steps.len() - 1;
                return Trajectory { steps, cycle_start, initial_facing: facing, truncated: true };
            }

            seen.insert((cell, dir), steps.len());
            let (next, next_dir) = wall_follower_move(board, cell, dir);
            steps.push(TrajectoryStep { from: cell, to: next, facing: next_dir });
            cell = next;
            dir = next_dir;
        }
    }

    /// Step taken at turn `index` (0-based); indices past the table wrap
    /// through the cycle.
    pub fn step(&self, index: usize) -> TrajectoryStep {
        self.steps[self.wrap(index)]
    }

    /// Cursor that follows `index`. The last step points back at the first
    /// cycle step.
    pub fn next_index(&self, index: usize) -> usize {
        let next = self.wrap(index) + 1;
        if next >= self.steps.len() { self.cycle_start } else { next }
    }

    fn wrap(&self, index: usize) -> usize {
        if index < self.steps.len() {
            index
        } else {
            self.cycle_start + (index - self.cycle_start) % self.cycle_len()
        }
    }

    pub fn steps(&self) -> &[TrajectoryStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn prefix_len(&self) -> usize {
        self.cycle_start
    }

    pub fn cycle_len(&self) -> usize {
        self.steps.len() - self.cycle_start
    }

    pub fn cycle_start(&self) -> usize {
        self.cycle_start
    }

    pub fn start(&self) -> Cell {
        self.steps[0].from
    }

    pub fn initial_facing(&self) -> Direction {
        self.initial_facing
    }

    /// Did the run stop at the step bound instead of finding a repeat?
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::domain::board::test_board;

    fn exhaustive(board: &Board, start: Cell) -> Trajectory {
        Trajectory::compute(board, start, Direction::East, Trajectory::exhaustive_bound(board))
    }

    fn assert_continuous(t: &Trajectory, turns: usize) {
        let mut cursor = 0;
        for _ in 0..turns {
            let here = t.step(cursor);
            cursor = t.next_index(cursor);
            assert_eq!(here.to, t.step(cursor).from, "route breaks after {here:?}");
        }
    }

    #[test]
    fn dead_end_facing_wall_turns_back() {
        let board = test_board(&["..."]);
        let t = exhaustive(&board, Cell::new(2, 0));

        assert!(!t.is_truncated());
        assert_eq!(t.prefix_len(), 0);
        assert_eq!(t.cycle_len(), 4);
        let path: Vec<(usize, Direction)> = t.steps().iter().map(|s| (s.to.x, s.facing)).collect();
        assert_eq!(path, vec![
            (1, Direction::West),
            (0, Direction::West),
            (1, Direction::East),
            (2, Direction::East),
        ]);
    }

    #[test]
    fn enclosed_cell_self_loops() {
        let board = test_board(&[
            "###",
            "#.#",
            "###",
        ]);
        let start = Cell::new(1, 1);
        let t = exhaustive(&board, start);
        assert_eq!(t.cycle_len(), 1);
        assert_eq!(t.step(0).from, start);
        assert_eq!(t.step(57).to, start);
    }

    #[test]
    fn ring_with_entry_has_prefix() {
        let board = test_board(&[
            ".....",
            ".###.",
            ".....",
        ]);
        let t = exhaustive(&board, Cell::new(0, 0));
        // First step leaves (0,0) facing east; the loop re-enters it facing
        // north, so the repeated state is (1,0) east.
        assert_eq!(t.prefix_len(), 1);
        assert_eq!(t.cycle_len(), 12);
        assert_eq!(t.step(t.cycle_start()).from, Cell::new(1, 0));
        assert_continuous(&t, 100);
    }

    #[test]
    fn cursor_wraps_to_cycle_start() {
        let board = test_board(&[
            ".....",
            ".###.",
            ".....",
        ]);
        let t = exhaustive(&board, Cell::new(0, 0));
        let last = t.len() - 1;
        assert_eq!(t.next_index(last), t.cycle_start());
        assert_eq!(t.step(t.len()), t.step(t.cycle_start()));
        assert_eq!(t.step(t.len() + t.cycle_len()), t.step(t.cycle_start()));
    }

    #[test]
    fn bound_truncates_into_terminal_self_loop() {
        let board = test_board(&[
            ".....",
            ".###.",
            ".....",
        ]);
        let t = Trajectory::compute(&board, Cell::new(0, 0), Direction::East, 3);
        assert!(t.is_truncated());
        assert_eq!(t.len(), 4);
        assert_eq!(t.cycle_len(), 1);
        let terminal = t.step(3);
        assert_eq!(terminal.from, Cell::new(3, 0));
        assert_eq!(terminal.to, Cell::new(3, 0));
        assert_eq!(t.step(1000), terminal);
        assert_continuous(&t, 20);
    }

    #[test]
    fn zero_bound_parks_at_start() {
        let board = test_board(&["..."]);
        let t = Trajectory::compute(&board, Cell::new(1, 0), Direction::East, 0);
        assert_eq!(t.len(), 1);
        assert_eq!(t.step(0).from, Cell::new(1, 0));
        assert_eq!(t.step(0).to, Cell::new(1, 0));
    }

    #[test]
    fn open_fifty_by_fifty_board_finds_its_cycle() {
        let row = ".".repeat(50);
        let rows: Vec<&str> = (0..50).map(|_| row.as_str()).collect();
        let board = test_board(&rows);
        let t = exhaustive(&board, Cell::new(25, 25));
        assert!(!t.is_truncated());
        assert!(t.len() <= Trajectory::exhaustive_bound(&board));
        assert_continuous(&t, t.len() * 2);
    }

    #[test]
    fn wall_follower_prefers_facing_then_clockwise() {
        let board = test_board(&[
            ".#.",
            "...",
            ".#.",
        ]);
        let center = Cell::new(1, 1);
        assert_eq!(
            wall_follower_move(&board, center, Direction::East),
            (Cell::new(2, 1), Direction::East),
        );
        // North blocked → east next.
        assert_eq!(
            wall_follower_move(&board, center, Direction::North),
            (Cell::new(2, 1), Direction::East),
        );
        // South blocked → west next.
        assert_eq!(
            wall_follower_move(&board, center, Direction::South),
            (Cell::new(0, 1), Direction::West),
        );
    }

    fn arb_rows() -> impl Strategy<Value = Vec<String>> {
        (2usize..9, 2usize..9).prop_flat_map(|(w, h)| {
            prop::collection::vec(
                prop::collection::vec(prop::bool::weighted(0.7), w)
                    .prop_map(|row| row.into_iter().map(|open| if open { '.' } else { '#' }).collect::<String>()),
                h,
            )
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]
        #[test]
        fn every_route_closes_into_a_cycle(rows in arb_rows(), pick in any::<prop::sample::Index>()) {
            let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
            let board = test_board(&refs);
            let cells: Vec<Cell> = board.cells().collect();
            prop_assume!(!cells.is_empty());
            let start = cells[pick.index(cells.len())];

            let t = exhaustive(&board, start);
            prop_assert!(!t.is_truncated());
            prop_assert!(t.cycle_len() >= 1);
            let mut cursor = 0;
            for _ in 0..(t.len() * 3) {
                let here = t.step(cursor);
                cursor = t.next_index(cursor);
                prop_assert!(cursor < t.len());
                prop_assert_eq!(here.to, t.step(cursor).from);
            }
        }
    }
}
