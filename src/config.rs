/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Missing file or missing keys fall back to defaults; a file that exists
/// but cannot be read or parsed is reported as `ConfigError` so the caller
/// can decide whether to continue with defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::entity::Direction;
use crate::domain::rules::ActionCosts;
use crate::error::ConfigError;

// ── Public Config Structs ──

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub sim: SimConfig,
    pub display: DisplayConfig,
    pub maps_dir: PathBuf,
}

/// Everything the simulation core reads. `Default` is the plain rule set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    /// Facing every wall-follower starts with.
    pub wall_follower_facing: Direction,
    /// Cap on precomputed route steps; `None` = exhaustive (always cycles).
    pub trajectory_step_bound: Option<usize>,
    /// Refuse moves that would eat a fruit while the active one still has
    /// live targets.
    pub protect_active_fruit: bool,
    pub costs: ActionCosts,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayConfig {
    pub show_threats: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            wall_follower_facing: default_facing(),
            trajectory_step_bound: None,
            protect_active_fruit: false,
            costs: ActionCosts::default(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    simulation: TomlSimulation,
    #[serde(default)]
    costs: TomlCosts,
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSimulation {
    #[serde(default = "default_facing")]
    wall_follower_facing: Direction,
    #[serde(default)]
    trajectory_step_bound: Option<usize>,
    #[serde(default)]
    protect_active_fruit: bool,
}

#[derive(Deserialize, Debug)]
struct TomlCosts {
    #[serde(default = "default_player_move")]
    player_move: u32,
    #[serde(default = "default_red_move")]
    red_move: u32,
    #[serde(default = "default_eat_fruit")]
    eat_fruit: u32,
    #[serde(default = "default_kill")]
    kill: u32,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_show_threats")]
    show_threats: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_maps_dir")]
    maps_dir: String,
}

// ── Defaults ──

fn default_facing() -> Direction { Direction::East }
fn default_player_move() -> u32 { 1 }
fn default_red_move() -> u32 { 1 }
fn default_eat_fruit() -> u32 { 2 }
fn default_kill() -> u32 { 1 }
fn default_show_threats() -> bool { true }
fn default_maps_dir() -> String { "maps".into() }

impl Default for TomlSimulation {
    fn default() -> Self {
        TomlSimulation {
            wall_follower_facing: default_facing(),
            trajectory_step_bound: None,
            protect_active_fruit: false,
        }
    }
}

impl Default for TomlCosts {
    fn default() -> Self {
        TomlCosts {
            player_move: default_player_move(),
            red_move: default_red_move(),
            eat_fruit: default_eat_fruit(),
            kill: default_kill(),
        }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay { show_threats: default_show_threats() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { maps_dir: default_maps_dir() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// No file anywhere means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let search_dirs = candidate_dirs();
        match search_dirs.iter().map(|d| d.join("config.toml")).find(|p| p.exists()) {
            Some(path) => Self::load_from(&path),
            None => Ok(GameConfig::from_toml(TomlConfig::default(), &search_dirs)),
        }
    }

    /// Load an explicit config file. Relative `maps_dir` resolves against
    /// the file's directory first.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let toml_cfg = toml::from_str::<TomlConfig>(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        let mut search_dirs: Vec<PathBuf> = path.parent().map(Path::to_path_buf).into_iter().collect();
        for dir in candidate_dirs() {
            if !search_dirs.contains(&dir) {
                search_dirs.push(dir);
            }
        }
        Ok(GameConfig::from_toml(toml_cfg, &search_dirs))
    }

    /// Parse config text directly; `maps_dir` is kept as written.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_toml(toml_cfg, &[]))
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve maps directory
        let maps_dir_str = &toml_cfg.general.maps_dir;
        let maps_dir = if PathBuf::from(maps_dir_str).is_absolute() {
            PathBuf::from(maps_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(maps_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(maps_dir_str))
        };

        GameConfig {
            sim: SimConfig {
                wall_follower_facing: toml_cfg.simulation.wall_follower_facing,
                trajectory_step_bound: toml_cfg.simulation.trajectory_step_bound,
                protect_active_fruit: toml_cfg.simulation.protect_active_fruit,
                costs: ActionCosts {
                    player_move: toml_cfg.costs.player_move,
                    red_move: toml_cfg.costs.red_move,
                    eat_fruit: toml_cfg.costs.eat_fruit,
                    kill: toml_cfg.costs.kill,
                },
            },
            display: DisplayConfig {
                show_threats: toml_cfg.display.show_threats,
            },
            maps_dir,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds its config.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.sim, SimConfig::default());
        assert!(cfg.display.show_threats);
        assert_eq!(cfg.maps_dir, PathBuf::from("maps"));
        assert_eq!(cfg.sim.costs, ActionCosts { player_move: 1, red_move: 1, eat_fruit: 2, kill: 1 });
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            r#"
            [simulation]
            wall_follower_facing = "north"
            trajectory_step_bound = 1000

            [costs]
            eat_fruit = 5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.sim.wall_follower_facing, Direction::North);
        assert_eq!(cfg.sim.trajectory_step_bound, Some(1000));
        assert!(!cfg.sim.protect_active_fruit);
        assert_eq!(cfg.sim.costs.eat_fruit, 5);
        assert_eq!(cfg.sim.costs.player_move, 1);
    }

    #[test]
    fn bad_facing_is_a_parse_error() {
        assert!(GameConfig::from_toml_str("[simulation]\nwall_follower_facing = \"up\"").is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = GameConfig::load_from(Path::new("/nonexistent/pacsim/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn absolute_maps_dir_is_kept() {
        let cfg = GameConfig::from_toml_str("[general]\nmaps_dir = \"/srv/pacsim/maps\"").unwrap();
        assert_eq!(cfg.maps_dir, PathBuf::from("/srv/pacsim/maps"));
    }
}
