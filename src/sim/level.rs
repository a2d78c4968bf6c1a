/// Map loader.
///
/// ## Sources:
///   1. A map file named on the command line
///   2. `maps/` directory (individual `.txt` files)
///   3. Built-in embedded maps
///
/// ## Map format (`.txt`):
///   Optional first line: `# Map Name` (a `#` line with a non-legend character)
///   Lines: map rows. Rows may differ in length; missing cells are wall.
///   Empty or whitespace-only lines are skipped.
///
/// ## Tile legend:
///   '#' = Wall                   ' ' / '.' = Floor
///   'P' = Pac-Man start          'O' = Portal (exactly 0 or 2)
///   'I' = Ice                    'R' = Red ghost (wall-follower)
///   'B' = Blue ghost (mirror)    'G' = Green ghost (mimic)
///   '!' = Red fruit              '$' = Blue fruit
///   '@' = Green fruit
///
/// Ghost and fruit ids are assigned in row-major order.

use std::path::Path;

use crate::domain::board::Board;
use crate::domain::entity::{Cell, GhostKind};
use crate::domain::tile::Tile;
use crate::error::MalformedMapError;

/// A parsed map: static board plus where everything starts.
#[derive(Clone, Debug)]
pub struct MapLayout {
    pub board: Board,
    pub pacman: Cell,
    pub ghosts: Vec<(GhostKind, Cell)>,
    pub fruits: Vec<(GhostKind, Cell)>,
}

/// Named map source (owned strings, loaded from file or embedded).
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub text: String,
}

// ══════════════════════════════════════════════════════════════
// Parsing
// ══════════════════════════════════════════════════════════════

/// Parse map text into a layout. Fails on unknown glyphs, a missing or
/// duplicated Pac-Man, an empty map or a portal count other than 0 or 2.
pub fn parse_map(text: &str) -> Result<MapLayout, MalformedMapError> {
    let mut rows: Vec<Vec<Tile>> = vec![];
    let mut pacman: Option<Cell> = None;
    let mut ghosts = vec![];
    let mut fruits = vec![];

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let y = rows.len();
        let mut row = Vec::with_capacity(line.len());
        for (x, ch) in line.chars().enumerate() {
            let cell = Cell::new(x, y);
            let tile = match ch {
                '#' => Tile::Wall,
                'O' => Tile::Portal,
                'I' => Tile::Ice,
                ' ' | '.' => Tile::Floor,
                'P' => {
                    if let Some(first) = pacman {
                        return Err(MalformedMapError::MultiplePlayers { first, second: cell });
                    }
                    pacman = Some(cell);
                    Tile::Floor
                }
                _ => {
                    if let Some(kind) = GhostKind::from_ghost_glyph(ch) {
                        ghosts.push((kind, cell));
                    } else if let Some(kind) = GhostKind::from_fruit_glyph(ch) {
                        fruits.push((kind, cell));
                    } else {
                        return Err(MalformedMapError::UnknownTile { ch, x, y });
                    }
                    Tile::Floor
                }
            };
            row.push(tile);
        }
        rows.push(row);
    }

    let board = Board::from_rows(rows)?;
    let pacman = pacman.ok_or(MalformedMapError::MissingPlayer)?;
    Ok(MapLayout { board, pacman, ghosts, fruits })
}

/// Split an optional `# Name` header off a map file.
pub fn parse_level_file(content: &str, fallback_name: &str) -> LevelDef {
    let mut lines = content.lines();
    match lines.next() {
        Some(first) if is_name_line(first) => LevelDef {
            name: first[1..].trim().to_string(),
            text: lines.collect::<Vec<_>>().join("\n"),
        },
        _ => LevelDef { name: fallback_name.to_string(), text: content.to_string() },
    }
}

/// Distinguish `# Map Name` from a map row that starts with a wall, such as
/// `#######` or `#P.B#`: a header holds a character the legend does not.
fn is_name_line(line: &str) -> bool {
    line.starts_with('#') && !line.chars().all(is_map_glyph)
}

fn is_map_glyph(ch: char) -> bool {
    matches!(ch, '#' | ' ' | '.' | 'P' | 'O' | 'I')
        || GhostKind::from_ghost_glyph(ch).is_some()
        || GhostKind::from_fruit_glyph(ch).is_some()
}

// ══════════════════════════════════════════════════════════════
// Directory loading (individual .txt files)
// ══════════════════════════════════════════════════════════════

/// All `.txt` maps in `dir`, sorted by file name. Unreadable entries are
/// skipped; a missing directory yields nothing.
pub fn load_from_directory(dir: &Path) -> Vec<LevelDef> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return vec![],
    };

    let mut found: Vec<(String, LevelDef)> = vec![];
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(false, |e| e == "txt") {
            if let Ok(content) = std::fs::read_to_string(&path) {
                let stem = path.file_stem().unwrap_or_default().to_string_lossy().to_string();
                let filename = path.file_name().unwrap_or_default().to_string_lossy().to_string();
                found.push((filename, parse_level_file(&content, &stem)));
            }
        }
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));
    found.into_iter().map(|(_, def)| def).collect()
}

// ══════════════════════════════════════════════════════════════
// Embedded maps
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("Mirror Court", &[
            "#######",
            "#.....#",
            "#..B..#",
            "#..P..#",
            "#..$..#",
            "#######",
        ]),
        make_embedded("Copycat", &[
            "#########",
            "#...#...#",
            "#.G...@.#",
            "#...P...#",
            "#.#...#.#",
            "#########",
        ]),
        make_embedded("Patrol", &[
            "#########",
            "#R......#",
            "#.##.##.#",
            "#.#...#.#",
            "#...P.!.#",
            "#########",
        ]),
        make_embedded("Ice and Portals", &[
            "###########",
            "#O..!...R.#",
            "#.###I###.#",
            "#..G..P.@.#",
            "#.#.III.#.#",
            "#...$..B.O#",
            "###########",
        ]),
    ]
}

fn make_embedded(name: &str, map: &[&str]) -> LevelDef {
    LevelDef { name: name.to_string(), text: map.join("\n") }
}
