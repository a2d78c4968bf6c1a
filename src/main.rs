/// Entry point: command line, config, and the interactive loop.

mod ui;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use pacsim::config::GameConfig;
use pacsim::sim::level::{self, LevelDef};
use pacsim::{Direction, GhostKind, Simulation, TurnEvent, TurnOutcome};
use ui::input::{Command, InputState};
use ui::renderer::{Renderer, View};

const INPUT_WAIT: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "pacsim")]
#[command(about = "Turn-based Pac-Man arena simulator", version)]
struct Cli {
    /// Map file, or the name of a map in the maps directory
    map: Option<PathBuf>,

    /// Config file (default: config.toml next to the binary, then CWD)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Parse the map, print a summary and exit
    #[arg(long)]
    check: bool,
}

/// A playable map: its name and pristine starting state.
struct Level {
    name: String,
    initial: Simulation,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pacsim=info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;
    let levels = load_levels(cli.map.as_deref(), &config)?;

    if cli.check {
        print_summary(&levels[0]);
        return Ok(());
    }

    let mut renderer = Renderer::new();
    renderer.init().context("terminal init failed")?;

    let result = game_loop(&mut renderer, &levels, &config);

    if let Err(e) = renderer.cleanup() {
        warn!("terminal cleanup failed: {e}");
    }

    let last = result?;
    info!(
        map = %last.name,
        turns = last.sim.turn(),
        cost = last.sim.total_cost(),
        won = last.sim.is_goal(),
        "session ended"
    );
    Ok(())
}

// ── Config and maps ──

/// An explicit `--config` must load; the searched default falls back to
/// built-in settings with a warning.
fn load_config(explicit: Option<&Path>) -> Result<GameConfig> {
    if let Some(path) = explicit {
        return GameConfig::load_from(path).with_context(|| format!("loading {}", path.display()));
    }
    Ok(GameConfig::load().unwrap_or_else(|e| {
        warn!("{e}; using default settings");
        GameConfig::default()
    }))
}

fn load_levels(map: Option<&Path>, config: &GameConfig) -> Result<Vec<Level>> {
    if let Some(arg) = map {
        let path = resolve_map_path(arg, &config.maps_dir)
            .with_context(|| format!("map {} not found", arg.display()))?;
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let stem = path.file_stem().unwrap_or_default().to_string_lossy().to_string();
        let def = level::parse_level_file(&content, &stem);
        let initial = Simulation::with_config(&def.text, config.sim.clone())
            .with_context(|| format!("malformed map {}", path.display()))?;
        info!(map = %def.name, path = %path.display(), "loaded map");
        return Ok(vec![Level { name: def.name, initial }]);
    }

    let mut defs: Vec<LevelDef> = level::embedded_levels();
    let from_dir = level::load_from_directory(&config.maps_dir);
    if !from_dir.is_empty() {
        info!(count = from_dir.len(), dir = %config.maps_dir.display(), "found maps");
    }
    defs.extend(from_dir);

    let mut levels = vec![];
    for def in defs {
        match Simulation::with_config(&def.text, config.sim.clone()) {
            Ok(initial) => levels.push(Level { name: def.name, initial }),
            Err(e) => warn!(map = %def.name, "skipping malformed map: {e}"),
        }
    }
    if levels.is_empty() {
        bail!("no playable maps");
    }
    Ok(levels)
}

/// Try the argument as given, then inside `maps_dir` (with and without `.txt`).
fn resolve_map_path(arg: &Path, maps_dir: &Path) -> Option<PathBuf> {
    let candidates = [
        arg.to_path_buf(),
        maps_dir.join(arg),
        maps_dir.join(arg).with_extension("txt"),
    ];
    candidates.into_iter().find(|p| p.is_file())
}

// ── --check ──

fn print_summary(level: &Level) {
    let sim = &level.initial;
    let board = sim.board();
    println!("{}", level.name);
    println!("  board: {}x{}, {} walkable cells", board.width(), board.height(), board.cell_count());
    println!("  pac-man: {}", sim.pacman().cell);
    for ghost in sim.ghosts() {
        match &ghost.route {
            Some(route) => println!(
                "  ghost {} {} at {}: route prefix {} + cycle {}{}",
                ghost.id,
                ghost.kind.color_name(),
                ghost.cell,
                route.table.prefix_len(),
                route.table.cycle_len(),
                if route.table.is_truncated() { " (truncated)" } else { "" },
            ),
            None => println!("  ghost {} {} at {}", ghost.id, ghost.kind.color_name(), ghost.cell),
        }
    }
    for fruit in sim.fruits() {
        if let Some(cell) = fruit.cell {
            println!("  fruit {} {} at {}", fruit.id, fruit.kind.color_name(), cell);
        }
    }
    let moves: Vec<String> = sim.legal_moves().iter().map(Direction::to_string).collect();
    println!("  legal opening moves: {}", if moves.is_empty() { "none".to_string() } else { moves.join(", ") });
    match sim.to_map_text() {
        Ok(text) => println!("\n{text}"),
        Err(e) => warn!("{e}"),
    }
}

// ── Interactive loop ──

/// State of the map being played.
struct Session {
    index: usize,
    name: String,
    sim: Simulation,
    history: Vec<Simulation>,
    message: String,
}

impl Session {
    fn start(levels: &[Level], index: usize) -> Self {
        let level = &levels[index];
        Session {
            index,
            name: level.name.clone(),
            sim: level.initial.clone(),
            history: vec![],
            message: String::new(),
        }
    }
}

fn game_loop(renderer: &mut Renderer, levels: &[Level], config: &GameConfig) -> Result<Session> {
    let mut input = InputState::new();
    let mut session = Session::start(levels, 0);

    loop {
        renderer.render(&View {
            sim: &session.sim,
            map_name: &session.name,
            map_index: session.index,
            map_count: levels.len(),
            message: &session.message,
            show_threats: config.display.show_threats,
        })?;

        input.drain_events(INPUT_WAIT)?;

        for &cmd in input.commands() {
            match cmd {
                Command::Quit => return Ok(session),
                Command::Move(dir) => {
                    let before = session.sim.clone();
                    match session.sim.apply(dir) {
                        Ok(outcome) => {
                            session.history.push(before);
                            session.message = describe(&outcome);
                        }
                        Err(e) => session.message = e.to_string(),
                    }
                }
                Command::Undo => match session.history.pop() {
                    Some(prev) => {
                        session.sim = prev;
                        session.message = "Undone".to_string();
                    }
                    None => session.message = "Nothing to undo".to_string(),
                },
                Command::Restart => {
                    session = Session::start(levels, session.index);
                    session.message = "Restarted".to_string();
                }
                Command::NextMap | Command::PrevMap => {
                    let n = levels.len();
                    let next = if cmd == Command::NextMap {
                        (session.index + 1) % n
                    } else {
                        (session.index + n - 1) % n
                    };
                    session = Session::start(levels, next);
                    renderer.invalidate();
                }
            }
        }
    }
}

/// One-line summary of an accepted turn for the message bar.
fn describe(outcome: &TurnOutcome) -> String {
    if outcome.goal {
        return "All ghosts eaten!".to_string();
    }
    if !outcome.killed.is_empty() {
        return format!("Ate {} ghost(s)", outcome.killed.len());
    }
    for event in &outcome.events {
        match event {
            TurnEvent::FruitEaten { kind, .. } => return fruit_message(*kind),
            TurnEvent::Teleported { .. } => return "Whoosh! Through the portal".to_string(),
            TurnEvent::Bounced { .. } => return "Bounced off the ice".to_string(),
            TurnEvent::Slid { over } => return format!("Slid across {} ice", over.len()),
            _ => {}
        }
    }
    String::new()
}

fn fruit_message(kind: GhostKind) -> String {
    let color = kind.color_name();
    format!("Ate the {color} fruit: {color} ghosts are vulnerable")
}
