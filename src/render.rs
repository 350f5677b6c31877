use std::io::{self, Stdout, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use maze_race::game::{Game, Winner};
use maze_race::grid::{Pos, Tile};
use maze_race::session::Session;

const CELL_W: usize = 2;
// HUD above the grid, status and key help below it.
const HUD_ROWS: u16 = 1;
const FOOTER_ROWS: u16 = 2;

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Cpu,
    Unknown,
    Exit,
    Axe,
    Wall,
    Path,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

pub struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    last_status: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(size: usize) -> Self {
        Self {
            last: vec![
                Cell {
                    glyph: Glyph::Unknown,
                    color: Color::Reset,
                };
                size * size
            ],
            last_hud: String::new(),
            last_status: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: HUD_ROWS,
        }
    }

    /// Redraw everything on the next frame, e.g. after a restart.
    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    /// Grid cell under a terminal column and row, if any.
    pub fn cell_at(&self, size: usize, column: u16, row: u16) -> Option<Pos> {
        if column < self.origin_x || row < self.origin_y {
            return None;
        }
        let x = (column - self.origin_x) as usize / CELL_W;
        let y = (row - self.origin_y) as usize;
        (x < size && y < size).then_some(Pos::new(x, y))
    }

    pub fn render(&mut self, stdout: &mut Stdout, session: &Session) -> io::Result<()> {
        let game = session.game();
        let size = game.grid().size();
        let needed_h = size as u16 + HUD_ROWS + FOOTER_ROWS;
        let needed_w = (size * CELL_W) as u16;

        stdout.queue(MoveTo(0, 0))?;

        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            stdout.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            );
            stdout.queue(Print(msg))?;
            stdout.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + HUD_ROWS;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.needs_full {
            stdout.queue(Clear(ClearType::All))?;
        }

        let score = session.scoreboard();
        let hud = format!(
            "Steps: {}  Axe: {}  You {} - {} CPU",
            game.steps(),
            if game.has_tool() { "ready" } else { "none" },
            score.player_wins,
            score.cpu_wins
        );
        if self.needs_full || hud != self.last_hud {
            self.draw_line(stdout, self.origin_y - HUD_ROWS, Color::White, &hud)?;
            self.last_hud = hud;
        }

        for y in 0..size {
            for x in 0..size {
                let cell = cell_for(game, Pos::new(x, y));
                let idx = y * size + x;
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(stdout, x, y, cell)?;
                }
            }
        }

        let (status, color) = status_line(game);
        if self.needs_full || status != self.last_status {
            let row = self.origin_y + size as u16;
            self.draw_line(stdout, row, color, &status)?;
            self.draw_line(
                stdout,
                row + 1,
                Color::DarkGrey,
                "arrows/hjkl move  HJKL or click: axe  r restart  q quit",
            )?;
            self.last_status = status;
        }
        self.needs_full = false;

        stdout.flush()?;
        Ok(())
    }

    fn draw_line(&self, stdout: &mut Stdout, row: u16, color: Color, text: &str) -> io::Result<()> {
        stdout.queue(MoveTo(self.origin_x, row))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(SetForegroundColor(color))?;
        stdout.queue(Print(text))?;
        stdout.queue(ResetColor)?;
        Ok(())
    }

    fn draw_cell(&self, stdout: &mut Stdout, x: usize, y: usize, cell: Cell) -> io::Result<()> {
        let text = match cell.glyph {
            Glyph::Player => "🧑",
            Glyph::Cpu => "🤖",
            Glyph::Unknown => "？",
            Glyph::Exit => "📖",
            Glyph::Axe => "🪓",
            Glyph::Wall => "🌳",
            Glyph::Path => "  ",
        };
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        stdout.queue(MoveTo(x_pos, y_pos))?;
        stdout.queue(SetForegroundColor(cell.color))?;
        stdout.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        if w < CELL_W {
            for _ in 0..(CELL_W - w) {
                stdout.queue(Print(' '))?;
            }
        }
        stdout.queue(ResetColor)?;
        Ok(())
    }
}

// The CPU is always drawn, even in the fog.
fn cell_for(game: &Game, pos: Pos) -> Cell {
    if pos == game.player().pos {
        return Cell {
            glyph: Glyph::Player,
            color: Color::Yellow,
        };
    }
    if game.cpu() == Some(pos) {
        return Cell {
            glyph: Glyph::Cpu,
            color: Color::Red,
        };
    }
    if !game.fog().is_discovered(pos) {
        return Cell {
            glyph: Glyph::Unknown,
            color: Color::DarkGrey,
        };
    }
    if pos == game.exit() {
        return Cell {
            glyph: Glyph::Exit,
            color: Color::Magenta,
        };
    }
    if game.tool().is_some_and(|t| !t.collected && t.pos == pos) {
        return Cell {
            glyph: Glyph::Axe,
            color: Color::Cyan,
        };
    }
    match game.grid().get(pos) {
        Tile::Wall => Cell {
            glyph: Glyph::Wall,
            color: Color::Green,
        },
        Tile::Path => Cell {
            glyph: Glyph::Path,
            color: Color::Reset,
        },
    }
}

fn status_line(game: &Game) -> (String, Color) {
    match game.winner() {
        None => ("Exploring...".to_string(), Color::Green),
        Some(Winner::Player) => (
            format!(
                "You found the book in {} steps! Press r to play again.",
                game.steps()
            ),
            Color::Magenta,
        ),
        Some(Winner::Cpu) => (
            "The CPU got there first. Press r to play again.".to_string(),
            Color::Red,
        ),
    }
}
