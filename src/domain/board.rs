/// Board: the static topology of a loaded map.
///
/// Built once from a tile grid and never mutated. Rows may differ in length;
/// anything past the end of a row (or outside the grid) counts as wall.
/// Portal pairing is resolved at construction, so every query is O(1).

use crate::error::MalformedMapError;

use super::entity::{Cell, Direction};
use super::tile::Tile;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    rows: Vec<Vec<Tile>>,
    width: usize,
    portals: Option<(Cell, Cell)>,
    walkable: usize,
}

impl Board {
    /// Validate the grid and resolve portal pairing.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self, MalformedMapError> {
        if rows.is_empty() {
            return Err(MalformedMapError::Empty);
        }
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);

        let mut portal_cells = vec![];
        let mut walkable = 0;
        for (y, row) in rows.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if tile.is_walkable() { walkable += 1; }
                if tile.is_portal() { portal_cells.push(Cell::new(x, y)); }
            }
        }

        let portals = match portal_cells.as_slice() {
            [] => None,
            [a, b] => Some((*a, *b)),
            other => return Err(MalformedMapError::PortalCount { found: other.len() }),
        };

        Ok(Board { rows, width, portals, walkable })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of walkable cells.
    pub fn cell_count(&self) -> usize {
        self.walkable
    }

    /// Tile at (x, y); out of bounds = wall.
    #[inline]
    pub fn tile_at(&self, x: usize, y: usize) -> Tile {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(Tile::Wall)
    }

    #[inline]
    pub fn tile(&self, cell: Cell) -> Tile {
        self.tile_at(cell.x, cell.y)
    }

    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.tile(cell).is_walkable()
    }

    pub fn is_portal(&self, cell: Cell) -> bool {
        self.tile(cell).is_portal()
    }

    pub fn is_ice(&self, cell: Cell) -> bool {
        self.tile(cell).is_ice()
    }

    /// The other end of the portal at `cell`, if `cell` is a portal.
    pub fn portal_partner(&self, cell: Cell) -> Option<Cell> {
        let (a, b) = self.portals?;
        if cell == a {
            Some(b)
        } else if cell == b {
            Some(a)
        } else {
            None
        }
    }

    /// Adjacent walkable cell in `dir`, or `None` when a wall or the grid
    /// edge is in the way.
    pub fn neighbor(&self, cell: Cell, dir: Direction) -> Option<Cell> {
        let (dx, dy) = dir.delta();
        let nx = cell.x as i64 + dx as i64;
        let ny = cell.y as i64 + dy as i64;
        if nx < 0 || ny < 0 { return None; }
        let next = Cell::new(nx as usize, ny as usize);
        self.is_walkable(next).then_some(next)
    }

    /// All walkable cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, t)| t.is_walkable())
                .map(move |(x, _)| Cell::new(x, y))
        })
    }
}

/// Build a board from ASCII rows: `#` wall, `O` portal, `I` ice, anything
/// else floor.
#[cfg(test)]
pub(crate) fn test_board(rows: &[&str]) -> Board {
    let tiles = rows
        .iter()
        .map(|r| {
            r.chars()
                .map(|c| match c {
                    '#' => Tile::Wall,
                    'O' => Tile::Portal,
                    'I' => Tile::Ice,
                    _ => Tile::Floor,
                })
                .collect()
        })
        .collect();
    Board::from_rows(tiles).expect("test board must be well formed")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> Vec<Vec<Tile>> {
        rows.iter()
            .map(|r| r.chars().map(|c| if c == 'O' { Tile::Portal } else { Tile::Floor }).collect())
            .collect()
    }

    #[test]
    fn neighbor_respects_walls_and_edges() {
        let board = test_board(&[
            "..#",
            "...",
        ]);
        let origin = Cell::new(0, 0);
        assert_eq!(board.neighbor(origin, Direction::North), None);
        assert_eq!(board.neighbor(origin, Direction::West), None);
        assert_eq!(board.neighbor(origin, Direction::East), Some(Cell::new(1, 0)));
        assert_eq!(board.neighbor(origin, Direction::South), Some(Cell::new(0, 1)));
        assert_eq!(board.neighbor(Cell::new(1, 0), Direction::East), None);
        assert_eq!(board.neighbor(Cell::new(2, 1), Direction::East), None);
    }

    #[test]
    fn ragged_rows_pad_with_wall() {
        let board = test_board(&[
            "....",
            "..",
        ]);
        assert_eq!(board.width(), 4);
        assert_eq!(board.tile_at(3, 1), Tile::Wall);
        assert_eq!(board.neighbor(Cell::new(3, 0), Direction::South), None);
        assert_eq!(board.cell_count(), 6);
        assert_eq!(board.cells().count(), 6);
    }

    #[test]
    fn portals_pair_both_ways() {
        let board = test_board(&["O...O"]);
        let a = Cell::new(0, 0);
        let b = Cell::new(4, 0);
        assert!(board.is_portal(a));
        assert_eq!(board.portal_partner(a), Some(b));
        assert_eq!(board.portal_partner(b), Some(a));
        assert_eq!(board.portal_partner(Cell::new(2, 0)), None);
    }

    #[test]
    fn lone_portal_is_malformed() {
        let err = Board::from_rows(grid(&["O..."])).unwrap_err();
        assert_eq!(err, MalformedMapError::PortalCount { found: 1 });
    }

    #[test]
    fn three_portals_are_malformed() {
        let err = Board::from_rows(grid(&["O.O.O"])).unwrap_err();
        assert_eq!(err, MalformedMapError::PortalCount { found: 3 });
    }

    #[test]
    fn empty_grid_is_malformed() {
        assert_eq!(Board::from_rows(vec![]).unwrap_err(), MalformedMapError::Empty);
    }

    #[test]
    fn ice_is_queryable() {
        let board = test_board(&[".I."]);
        assert!(board.is_ice(Cell::new(1, 0)));
        assert!(!board.is_ice(Cell::new(0, 0)));
        assert!(!board.is_ice(Cell::new(9, 9)));
    }
}
