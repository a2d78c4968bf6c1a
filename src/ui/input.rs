/// Input state tracker.
///
/// The game is turn-based, so only fresh key presses matter: each press is
/// translated into at most one `Command`. Repeat events (key held down) are
/// treated as further presses so holding an arrow keeps walking; Release
/// events are ignored.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use pacsim::Direction;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move(Direction),
    Undo,
    Restart,
    NextMap,
    PrevMap,
    Quit,
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('h')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('l')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('k')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('j')];
const KEYS_UNDO: &[KeyCode] = &[KeyCode::Char('u'), KeyCode::Backspace];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r')];
const KEYS_NEXT: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::PageDown];
const KEYS_PREV: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::PageUp];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Esc];

/// Map one key press to a command. Letters are case-insensitive.
pub fn command_for(key: &KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Command::Quit),
            _ => None,
        };
    }

    let code = match key.code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    };
    let is = |keys: &[KeyCode]| keys.contains(&code);

    if is(KEYS_UP) {
        Some(Command::Move(Direction::North))
    } else if is(KEYS_DOWN) {
        Some(Command::Move(Direction::South))
    } else if is(KEYS_LEFT) {
        Some(Command::Move(Direction::West))
    } else if is(KEYS_RIGHT) {
        Some(Command::Move(Direction::East))
    } else if is(KEYS_UNDO) {
        Some(Command::Undo)
    } else if is(KEYS_RESTART) {
        Some(Command::Restart)
    } else if is(KEYS_NEXT) {
        Some(Command::NextMap)
    } else if is(KEYS_PREV) {
        Some(Command::PrevMap)
    } else if is(KEYS_QUIT) {
        Some(Command::Quit)
    } else {
        None
    }
}

pub struct InputState {
    /// Commands decoded during the most recent drain.
    commands: Vec<Command>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { commands: Vec::with_capacity(8) }
    }

    /// Wait up to `timeout` for input, then drain everything pending.
    pub fn drain_events(&mut self, timeout: Duration) -> std::io::Result<()> {
        self.commands.clear();

        let mut wait = timeout;
        while poll(wait)? {
            wait = Duration::ZERO;
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                if let Some(cmd) = command_for(&key) {
                    self.commands.push(cmd);
                }
            }
        }
        Ok(())
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_wasd_and_hjkl_all_move() {
        for (keys, dir) in [
            (KEYS_UP, Direction::North),
            (KEYS_DOWN, Direction::South),
            (KEYS_LEFT, Direction::West),
            (KEYS_RIGHT, Direction::East),
        ] {
            for &code in keys {
                assert_eq!(command_for(&press(code)), Some(Command::Move(dir)), "{code:?}");
            }
        }
    }

    #[test]
    fn letters_ignore_case() {
        assert_eq!(command_for(&press(KeyCode::Char('W'))), Some(Command::Move(Direction::North)));
        assert_eq!(command_for(&press(KeyCode::Char('U'))), Some(Command::Undo));
    }

    #[test]
    fn ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for(&key), Some(Command::Quit));
        let other = KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL);
        assert_eq!(command_for(&other), None);
    }

    #[test]
    fn unbound_keys_do_nothing() {
        assert_eq!(command_for(&press(KeyCode::Char('z'))), None);
        assert_eq!(command_for(&press(KeyCode::F(1))), None);
    }
}
