/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Glyph)
///   2. Compare each glyph with `back` buffer (previous frame)
///   3. Only emit terminal commands for glyphs that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Every board cell is two terminal columns wide.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use pacsim::domain::tile::Tile;
use pacsim::{Cell, GhostKind, Simulation};

// ── Glyph: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Glyph {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Glyph {
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Glyph = Glyph { ch: ' ', fg: Color::White, bg: Glyph::BASE_BG };

    /// Never equal to a real glyph; forces a repaint of every position.
    const INVALID: Glyph = Glyph { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Glyph { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Glyphs ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Glyph>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Glyph::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Glyph::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Glyph::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, glyph: Glyph) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = glyph;
        }
    }

    fn get(&self, x: usize, y: usize) -> Glyph {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Glyph::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Glyph::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Glyph::new(' ', Color::White, bg));
        }
    }
}

// ── Renderer ──

const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const THREAT_BG: Color = Color::Rgb { r: 70, g: 20, b: 25 };

/// What one frame shows besides the simulation itself.
pub struct View<'a> {
    pub sim: &'a Simulation,
    pub map_name: &'a str,
    pub map_index: usize,
    pub map_count: usize,
    pub message: &'a str,
    pub show_threats: bool,
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Glyph::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Glyph::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Force a full repaint on the next frame (e.g. after switching maps).
    pub fn invalidate(&mut self) {
        self.back.cells.fill(Glyph::INVALID);
    }

    pub fn render(&mut self, view: &View) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Glyph::INVALID);
            queue!(self.writer, SetBackgroundColor(Glyph::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        self.compose(view);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed glyphs ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Glyph::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Glyph::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let glyph = self.front.get(x, y);
                if glyph == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if glyph.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(glyph.fg))?;
                    last_fg = glyph.fg;
                }
                if glyph.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(glyph.bg))?;
                    last_bg = glyph.bg;
                }
                queue!(self.writer, Print(glyph.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, view: &View) {
        let sim = view.sim;
        let board = sim.board();

        // ── HUD row ──
        let active = match sim.active_kind() {
            Some(kind) => format!("{} fruit active", kind.color_name()),
            None => "no fruit".to_string(),
        };
        let alive = sim.live_ghosts().count();
        let hud = format!(
            " {} [{}/{}]  Turn:{:<4} Cost:{:<5} Ghosts:{}/{}  {} ",
            view.map_name, view.map_index + 1, view.map_count,
            sim.turn(), sim.total_cost(), alive, sim.ghosts().len(), active,
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Map ──
        let threats = if view.show_threats { sim.threatened_cells() } else { Default::default() };
        for y in 0..board.height() {
            let row = MAP_ROW + y;
            if row >= self.front.height { break; }
            for x in 0..board.width() {
                let col = x * CELL_W;
                if col + 1 >= self.front.width { break; }
                let cell = Cell::new(x, y);
                let (c0, c1, fg, mut bg) = self.cell_look(sim, cell);
                if threats.contains(&cell) && board.is_walkable(cell) {
                    bg = THREAT_BG;
                }
                self.front.set(col, row, Glyph::new(c0, fg, bg));
                self.front.set(col + 1, row, Glyph::new(c1, fg, bg));
            }
        }

        // ── Message bar ──
        let msg_row = MAP_ROW + board.height() + 1;
        let message = if sim.is_goal() { "All ghosts eaten!  [n] next map  [r] restart" } else { view.message };
        if !message.is_empty() && msg_row < self.front.height {
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &format!(" {message} "), Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help_row = msg_row + 2;
        if help_row < self.front.height {
            let help = " Arrows/WASD/HJKL:Move  U:Undo  R:Restart  N/P:Map  Q:Quit";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    /// Two characters plus colors for one board cell. Entities win over
    /// terrain: Pac-Man, then ghosts, then fruit.
    fn cell_look(&self, sim: &Simulation, cell: Cell) -> (char, char, Color, Color) {
        if sim.pacman().cell == cell {
            return ('ᗧ', ' ', Color::Yellow, Color::Reset);
        }

        if let Some(ghost) = sim.live_ghosts().find(|g| g.cell == cell) {
            let fg = if sim.is_vulnerable(ghost) { Color::Rgb { r: 90, g: 90, b: 255 } } else { kind_color(ghost.kind) };
            let tag = if sim.is_vulnerable(ghost) { '~' } else { ' ' };
            return ('ᗣ', tag, fg, Color::Reset);
        }

        if let Some(id) = sim.fruit_at(cell) {
            let kind = sim.fruits()[id].kind;
            return ('●', ' ', kind_color(kind), Color::Reset);
        }

        match sim.board().tile(cell) {
            Tile::Wall => ('█', '█', Color::Rgb { r: 60, g: 60, b: 160 }, Color::Rgb { r: 30, g: 30, b: 90 }),
            Tile::Floor => ('·', ' ', Color::DarkGrey, Color::Reset),
            Tile::Portal => ('◎', ' ', Color::Magenta, Color::Reset),
            Tile::Ice => ('░', '░', Color::Rgb { r: 150, g: 220, b: 255 }, Color::Rgb { r: 30, g: 60, b: 80 }),
        }
    }
}

fn kind_color(kind: GhostKind) -> Color {
    match kind {
        GhostKind::WallFollower => Color::Red,
        GhostKind::Mirror => Color::Blue,
        GhostKind::Mimic => Color::Green,
    }
}
