/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The map is drawn one terminal cell per tile through a `Camera` that
/// follows the player, so maps taller or wider than the terminal scroll.
/// Actors are drawn at the tile containing their center.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::Actor;
use crate::domain::tile::Tile;
use crate::sim::world::{AppState, GameSession, Phase};
use super::camera::Camera;
use super::menu::{Menu, ITEMS, TITLE_H};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every "empty" cell, also used for Clear, so
    /// inter-row gaps match the cell color.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer; differs from any real cell.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let x = self.width.saturating_sub(s.chars().count()) / 2;
        self.put_str(x, y, s, fg, bg);
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set(xx, yy, Cell::new(' ', Color::White, bg));
            }
        }
    }
}

// ── Palette ──

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
/// HUD, gap, and help line.
const RESERVED_ROWS: usize = MAP_ROW + 2;

const WALL_FG: Color = Color::Rgb { r: 120, g: 110, b: 150 };
const WALL_BG: Color = Color::Rgb { r: 50, g: 45, b: 70 };
const FLOOR_FG: Color = Color::Rgb { r: 50, g: 50, b: 68 };
const PLAYER_FG: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const PATROL_FG: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const CHASE_FG: Color = Color::Rgb { r: 255, g: 60, b: 60 };
const ACCENT: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const BUTTON_BG: Color = Color::Rgb { r: 50, g: 50, b: 70 };
const BUTTON_HI_BG: Color = Color::Rgb { r: 80, g: 200, b: 120 };

/// Idle glyph first; moving actors alternate between the two.
const PLAYER_GLYPHS: [char; 2] = ['@', '&'];
const ENEMY_GLYPHS: [char; 2] = ['M', 'W'];
/// Frames per walk-cycle glyph.
const ANIM_PERIOD: u64 = 8;

fn actor_glyph(glyphs: [char; 2], is_moving: bool, anim: u64) -> char {
    if is_moving {
        glyphs[((anim / ANIM_PERIOD) % 2) as usize]
    } else {
        glyphs[0]
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    enhanced_keys: bool,
    camera: Camera,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            enhanced_keys: false,
            camera: Camera::new(),
        }
    }

    /// Enter raw mode and the alternate screen. Returns whether the terminal
    /// reports key releases.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        self.enhanced_keys = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.enhanced_keys {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(self.enhanced_keys)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Current terminal size in cells, as of the last frame.
    pub fn size(&self) -> (u16, u16) {
        (self.term_w as u16, self.term_h as u16)
    }

    pub fn render(&mut self, app: &AppState, menu: &Menu, anim: u64) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let resized = tw as usize != self.term_w || th as usize != self.term_h;
        if resized {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
        }

        // Full repaint on resize or phase change
        let repaint = resized || self.last_phase != Some(app.phase);
        if repaint {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(app.phase);
        }

        self.front.clear();
        match (app.phase, app.session.as_ref()) {
            (Phase::Menu, _) => self.compose_menu(app, menu),
            (Phase::Playing, Some(session)) => {
                self.update_camera(session, repaint);
                self.compose_game(app, session, anim);
            }
            (Phase::Playing, None) => {}
            (Phase::GameOver, _) => self.compose_game_over(app, anim),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Camera ──

    /// Size the viewport to the terminal, capped to the map, then track the
    /// player. `snap` recenters instead of scrolling (new run, resize).
    fn update_camera(&mut self, s: &GameSession, snap: bool) {
        let (cols, rows) = (s.map.cols(), s.map.rows());
        self.camera.view_w = self.term_w.min(cols);
        self.camera.view_h = self.term_h.saturating_sub(RESERVED_ROWS).max(1).min(rows);

        let Some((row, col)) = s.map.cell_at(s.player.x, s.player.y) else { return };
        if snap {
            self.camera.center_on(col, row, cols, rows);
        } else {
            self.camera.follow(col, row, cols, rows);
        }
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, app: &AppState, s: &GameSession, anim: u64) {
        let hud = format!(
            " KODLIKE   Time {:>6.1}s   Chasing {}/{}   Best {:.1}s",
            s.elapsed,
            s.chasing_count(),
            s.enemies.len(),
            app.best_survival,
        );
        self.front.put_str(0, HUD_ROW, &hud, ACCENT, Color::Reset);

        for vy in 0..self.camera.view_h {
            for vx in 0..self.camera.view_w {
                let (c, r) = self.camera.view_to_world(vx, vy);
                let tile = usize::try_from(r).ok()
                    .zip(usize::try_from(c).ok())
                    .and_then(|(r, c)| s.map.tile_at(r, c));
                let cell = match tile {
                    Some(Tile::Wall) => Cell::new('#', WALL_FG, WALL_BG),
                    Some(Tile::Floor) => Cell::new('.', FLOOR_FG, Color::Reset),
                    None => Cell::BLANK,
                };
                self.front.set(vx, MAP_ROW + vy, cell);
            }
        }

        for e in &s.enemies {
            let fg = if e.ai.is_chasing() { CHASE_FG } else { PATROL_FG };
            self.draw_actor(s, &e.actor, actor_glyph(ENEMY_GLYPHS, e.actor.is_moving, anim), fg);
        }
        let glyph = actor_glyph(PLAYER_GLYPHS, s.player.is_moving, anim);
        self.draw_actor(s, &s.player, glyph, PLAYER_FG);

        let help_row = MAP_ROW + self.camera.view_h + 1;
        self.front.put_str(1, help_row, "Arrows/WASD move   ESC menu", Color::DarkGrey, Color::Reset);
    }

    fn draw_actor(&mut self, s: &GameSession, actor: &Actor, glyph: char, fg: Color) {
        let view = s.map.cell_at(actor.x, actor.y)
            .and_then(|(r, c)| self.camera.world_to_view(c, r));
        if let Some((vx, vy)) = view {
            self.front.set(vx, MAP_ROW + vy, Cell::new(glyph, fg, Color::Reset));
        }
    }

    fn compose_menu(&mut self, app: &AppState, menu: &Menu) {
        let (tw, th) = self.size();
        let rects = Menu::layout(tw, th);

        let title_row = (rects[0].top() as usize).saturating_sub(TITLE_H as usize) + 1;
        self.front.put_centered(title_row, "K O D L I K E", ACCENT, Color::Reset);
        self.front.put_centered(title_row + 1, "don't get caught", Color::DarkGrey, Color::Reset);

        for (i, (item, rect)) in ITEMS.iter().zip(rects.iter()).enumerate() {
            let selected = i == menu.cursor;
            let (fg, bg) = if selected { (Color::Black, BUTTON_HI_BG) } else { (Color::White, BUTTON_BG) };
            let (x, y) = (rect.left() as usize, rect.top() as usize);
            let (w, h) = (rect.w as usize, rect.h as usize);
            self.front.fill_rect(x, y, w, h, bg);

            let label = item.label(app.music_on);
            let lx = x + w.saturating_sub(label.len()) / 2;
            self.front.put_str(lx, y + h / 2, label, fg, bg);
        }

        let hint_row = rects[2].bottom() as usize + 1;
        self.front.put_centered(
            hint_row,
            "Up/Down select   ENTER confirm   or click a button",
            Color::DarkGrey,
            Color::Reset,
        );
    }

    fn compose_game_over(&mut self, app: &AppState, anim: u64) {
        let mid = self.front.height / 2;
        let top = mid.saturating_sub(3);
        self.front.put_centered(top, "C A U G H T", CHASE_FG, Color::Reset);

        let survived = format!("Survived {:.1}s", app.last_survival);
        let best = format!("Best {:.1}s", app.best_survival);
        self.front.put_centered(top + 2, &survived, Color::White, Color::Reset);
        self.front.put_centered(top + 3, &best, ACCENT, Color::Reset);

        if (anim / 30) % 2 == 0 {
            self.front.put_centered(
                top + 5,
                "Click or press ENTER to return to the menu",
                PLAYER_FG,
                Color::Reset,
            );
        }
    }
}
