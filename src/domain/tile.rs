/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so terrain semantics are centralized here.
///
/// Entities (Pac-Man, ghosts, fruits) are not tiles: a map glyph like `R`
/// or `$` places an entity on a `Floor` tile.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Tile {
    Wall,
    #[default]
    Floor,
    Portal, // Paired with exactly one other portal
    Ice,    // Forces continued movement
}

impl Tile {
    /// Can an entity occupy this cell?
    pub fn is_walkable(self) -> bool {
        !matches!(self, Tile::Wall)
    }

    pub fn is_portal(self) -> bool {
        matches!(self, Tile::Portal)
    }

    pub fn is_ice(self) -> bool {
        matches!(self, Tile::Ice)
    }

    /// Map-file glyph for this tile (used when writing an empty cell).
    pub fn glyph(self) -> char {
        match self {
            Tile::Wall => '#',
            Tile::Floor => '.',
            Tile::Portal => 'O',
            Tile::Ice => 'I',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_walls_block() {
        assert!(!Tile::Wall.is_walkable());
        assert!(Tile::Floor.is_walkable());
        assert!(Tile::Portal.is_walkable());
        assert!(Tile::Ice.is_walkable());
    }

    #[test]
    fn special_terrain_is_exclusive() {
        assert!(Tile::Portal.is_portal() && !Tile::Portal.is_ice());
        assert!(Tile::Ice.is_ice() && !Tile::Ice.is_portal());
        assert!(!Tile::Floor.is_portal() && !Tile::Floor.is_ice());
    }
}
