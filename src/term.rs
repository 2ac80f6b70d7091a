use crate::{TermInt, Coords};
use crate::engine::{Ending, RunState, Snapshot};
use crate::game::Renderer;
use crate::snake::{Cell, Direction};

use std::io::{self, Stdout, Write, stdout};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, KeyEventKind, read, poll};
use log::debug;

/// Every grid cell is drawn two columns wide so the board looks square.
const CELL_COLUMNS: TermInt = 2;

const EMPTY_GLYPH: [char; 2] = [' ', ' '];
const SNAKE_BODY_GLYPH: [char; 2] = ['█', '█'];
const FOOD_GLYPH: [char; 2] = ['(', ')'];
const DEAD_SNAKE_GLYPH: [char; 2] = ['X', 'X'];

const PAUSE_HINT: &str = "Pause: P/Esc";

pub struct TermManager<W = Stdout> {
    width: TermInt,
    height: TermInt,
    out: W,
    screen: Vec<char>,
    current_msg: Option<Message>,
    board: Option<Board>,
    overlay: Option<RunState>,
}

struct Message {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

/// Where the grid sits on screen. `top_left` is the corner of the border box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Board {
    top_left: Coords,
    cols: i32,
    rows: i32,
}

impl TermManager<Stdout> {
    pub fn new() -> Result<Self> {
        let size = terminal::size().context("Error reading terminal size")?;
        Ok(TermManager::with_writer(stdout(), size))
    }
}

impl<W: Write> TermManager<W> {
    /// Draws into `out` as if it were a terminal of the given size.
    pub fn with_writer(out: W, (width, height): Coords) -> Self {
        let screen = vec![' '; width as usize * height as usize];
        TermManager { width, height, out, screen, current_msg: None, board: None, overlay: None }
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.out, EnterAlternateScreen).context("Error entering alt screen")?;
        terminal::enable_raw_mode().context("Error enabling raw mode")?;
        execute!(self.out, cursor::Hide, cursor::DisableBlinking).context("Error hiding cursor")?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().context("Error disabling raw mode")?;
        execute!(self.out, cursor::Show, cursor::EnableBlinking).context("Error showing cursor")?;
        execute!(self.out, LeaveAlternateScreen).context("Error leaving alt screen")?;
        Ok(())
    }

    pub fn read_key_blocking(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                if ev.kind != KeyEventKind::Release {
                    return Ok(ev);
                }
            }
        }
    }

    /// Waits up to `timeout` for the first key, then drains whatever else is queued.
    pub fn wait_for_keys(&self, timeout: Duration) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];

        if !poll(timeout)? {
            return Ok(events);
        }

        while poll(Duration::ZERO)? {
            if let Event::Key(ev) = read()? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    /// Lays out a `cols` x `rows` grid centered on screen, with a HUD row above it.
    pub fn set_board(&mut self, cols: i32, rows: i32) -> Result<()> {
        let (need_w, need_h) = board_footprint(cols, rows);
        if need_w > self.width as i32 || need_h > self.height as i32 {
            bail!(
                "terminal is {}x{} but a {}x{} grid needs {}x{}",
                self.width, self.height, cols, rows, need_w, need_h
            );
        }

        let left = (self.width as i32 - need_w) / 2;
        let top = (self.height as i32 - need_h) / 2 + 1;
        self.board = Some(Board { top_left: (left as TermInt, top as TermInt), cols, rows });
        Ok(())
    }

    /// Wipes the screen and draws the empty board with its HUD.
    pub fn draw_board(&mut self) -> Result<()> {
        let board = match self.board {
            Some(b) => b,
            None => bail!("board layout has not been set"),
        };

        self.clear()?;
        self.overlay = None;

        let box_w = board.cols as TermInt * CELL_COLUMNS + 2;
        let box_h = board.rows as TermInt + 2;
        self.draw_borders(board.top_left, (box_w, box_h))?;

        let hud_y = board.top_left.1 - 1;
        let hint_x = board.top_left.0 + box_w.saturating_sub(PAUSE_HINT.len() as TermInt);
        self.print_str_at((hint_x, hud_y), PAUSE_HINT)?;
        self.draw_score(0)?;

        self.flush()
    }

    pub fn draw_borders(&mut self, top_left: Coords, size: Coords) -> Result<()> {
        let (width, height) = size;
        let (x0, y0) = top_left;
        let end_x = x0 + width - 1;
        let end_y = y0 + height - 1;

        for x in x0..=end_x {
            let ch = if x == x0 || x == end_x {'+'} else {'-'};
            self.print_at((x, y0), ch)?;
            self.print_at((x, end_y), ch)?;
        }

        for y in y0 + 1..end_y {
            self.print_at((x0, y), '|')?;
            self.print_at((end_x, y), '|')?;
        }

        Ok(())
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        // Blank padding rows
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        self.current_msg = Some(Message::new(msg_width, msg_height, top_left));
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };
        let top_left = msg.top_left();

        for y_diff in 0..msg.height() {
            for x_diff in 0..msg.width() {
                let (x, y) = (top_left.0 + x_diff, top_left.1 + y_diff);
                if let Some(ch) = self.saved_char((x, y)) {
                    self.print_at_no_save((x, y), ch)?;
                }
            }
        }

        self.flush()
    }

    /// Records `ch` in the screen buffer and draws it unless a message covers that spot.
    pub fn print_at(&mut self, pos: Coords, ch: char) -> io::Result<()> {
        let idx = match self.index(pos) {
            Some(idx) => idx,
            None => return Ok(()),
        };
        self.screen[idx] = ch;

        if self.current_msg.as_ref().map_or(false, |msg| msg.covers(pos)) {
            return Ok(());
        }

        queue!(self.out, cursor::MoveTo(pos.0, pos.1), style::Print(ch))
    }

    pub fn print_str_at(&mut self, pos: Coords, text: &str) -> io::Result<()> {
        for (i, ch) in text.chars().enumerate() {
            self.print_at((pos.0 + i as TermInt, pos.1), ch)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.out, terminal::Clear(ClearType::All)).context("Error clearing")?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        self.current_msg = None;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().context("Error flushing")
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn draw_score(&mut self, score: u32) -> io::Result<()> {
        if let Some(board) = self.board {
            let label = format!("Score: {:<8}", score);
            self.print_str_at((board.top_left.0, board.top_left.1 - 1), &label)?;
        }
        Ok(())
    }

    /// Redraws only the grid cells whose glyph changed since the last frame.
    fn draw_cells(&mut self, board: Board, snapshot: &Snapshot) -> io::Result<()> {
        let glyphs = frame_glyphs(board, snapshot);

        for y in 0..board.rows {
            for x in 0..board.cols {
                let glyph = glyphs[(y * board.cols + x) as usize];
                let left = board.cell_origin(Cell::new(x, y));

                for (offset, ch) in glyph.iter().enumerate() {
                    let pos = (left.0 + offset as TermInt, left.1);
                    if self.saved_char(pos) != Some(*ch) {
                        self.print_at(pos, *ch)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn update_overlay(&mut self, snapshot: &Snapshot) -> Result<()> {
        let wanted = match snapshot.state {
            RunState::Running => None,
            state => Some(state),
        };

        if wanted == self.overlay {
            return Ok(());
        }

        self.hide_message()?;
        self.overlay = wanted;

        match wanted {
            Some(RunState::Paused) => self.show_message(&["Paused", "Press P or Esc to resume", "or Q to quit"]),
            Some(RunState::Over) => {
                let title = if snapshot.ending == Some(Ending::BoardFull) {"You won!"} else {"Game over!"};
                self.show_message(&[
                    title,
                    &*format!("Score: {}", snapshot.score),
                    "",
                    "Do you want to restart the game?",
                    "(y/n)"
                ])
            }
            _ => Ok(()),
        }
    }

    fn saved_char(&self, pos: Coords) -> Option<char> {
        self.index(pos).map(|idx| self.screen[idx])
    }

    fn index(&self, pos: Coords) -> Option<usize> {
        if pos.0 >= self.width || pos.1 >= self.height {
            return None;
        }
        Some(self.width as usize * pos.1 as usize + pos.0 as usize)
    }

    fn print_at_no_save(&mut self, pos: Coords, ch: char) -> io::Result<()> {
        // Message text only: the buffer keeps what lies underneath
        queue!(self.out, cursor::MoveTo(pos.0, pos.1), style::Print(ch))
    }
}

impl<W: Write> Renderer for TermManager<W> {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()> {
        let board = match self.board {
            Some(b) => b,
            None => bail!("board layout has not been set"),
        };

        self.draw_cells(board, snapshot)?;
        self.draw_score(snapshot.score)?;
        self.update_overlay(snapshot)?;

        if snapshot.just_ate {
            debug!("rendered meal, length now {}", snapshot.snake.len());
        }

        self.flush()
    }
}

impl Board {
    fn cell_origin(&self, cell: Cell) -> Coords {
        let x = self.top_left.0 + 1 + cell.x as TermInt * CELL_COLUMNS;
        let y = self.top_left.1 + 1 + cell.y as TermInt;
        (x, y)
    }
}

impl Message {
    pub fn new(width: TermInt, height: TermInt, top_left: Coords) -> Self {
        Message { width, height, top_left }
    }

    pub fn width(&self) -> TermInt {
        self.width
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    pub fn top_left(&self) -> Coords {
        self.top_left
    }

    pub fn covers(&self, pos: Coords) -> bool {
        let (x0, y0) = self.top_left;
        pos.0 >= x0 && pos.0 < x0 + self.width && pos.1 >= y0 && pos.1 < y0 + self.height
    }
}

/// Columns and rows a grid needs on screen: border box plus the HUD row.
pub fn board_footprint(cols: i32, rows: i32) -> (i32, i32) {
    (cols * CELL_COLUMNS as i32 + 2, rows + 3)
}

/// Largest grid that fits a terminal of the given size.
pub fn grid_fitting(term_size: Coords) -> (i32, i32) {
    let cols = (term_size.0 as i32 - 2) / CELL_COLUMNS as i32;
    let rows = term_size.1 as i32 - 3;
    (cols.max(0), rows.max(0))
}

/// Glyph for every grid cell, row by row.
fn frame_glyphs(board: Board, snapshot: &Snapshot) -> Vec<[char; 2]> {
    let mut glyphs = vec![EMPTY_GLYPH; board.cols as usize * board.rows as usize];
    let slot = |cell: &Cell| (cell.y * board.cols + cell.x) as usize;
    let dead = snapshot.state == RunState::Over && snapshot.ending != Some(Ending::BoardFull);

    if let Some(food) = snapshot.food {
        glyphs[slot(&food)] = FOOD_GLYPH;
    }

    for (i, cell) in snapshot.snake.iter().enumerate() {
        glyphs[slot(cell)] = if dead {
            DEAD_SNAKE_GLYPH
        } else if i == 0 {
            head_glyph(snapshot.direction)
        } else {
            SNAKE_BODY_GLYPH
        };
    }

    glyphs
}

fn head_glyph(direction: Direction) -> [char; 2] {
    match direction {
        Direction::Up => ['^', '^'],
        Direction::Down => ['v', 'v'],
        Direction::Left => ['<', '<'],
        Direction::Right => ['>', '>'],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footprint_and_fit_agree() {
        assert_eq!(board_footprint(50, 50), (102, 53));
        assert_eq!(grid_fitting((102, 53)), (50, 50));
        assert_eq!(grid_fitting((80, 24)), (39, 21));
        assert_eq!(grid_fitting((1, 1)), (0, 0));
    }

    #[test]
    fn cells_map_inside_the_border() {
        let board = Board { top_left: (4, 2), cols: 10, rows: 10 };
        assert_eq!(board.cell_origin(Cell::new(0, 0)), (5, 3));
        assert_eq!(board.cell_origin(Cell::new(3, 1)), (11, 4));
    }

    #[test]
    fn message_covers_its_rectangle() {
        let msg = Message::new(4, 3, (10, 5));
        assert!(msg.covers((10, 5)));
        assert!(msg.covers((13, 7)));
        assert!(!msg.covers((14, 7)));
        assert!(!msg.covers((10, 8)));
    }

    fn snapshot(state: RunState, ending: Option<Ending>) -> Snapshot {
        Snapshot {
            snake: vec![Cell::new(1, 1), Cell::new(1, 2)],
            food: Some(Cell::new(3, 3)),
            score: 20,
            state,
            just_ate: false,
            direction: Direction::Up,
            ending,
        }
    }

    /// 5x5 board on a 40x20 screen: border at (14, 7), cell (0, 0) at (15, 8).
    fn screen() -> TermManager<Vec<u8>> {
        let mut term = TermManager::with_writer(Vec::new(), (40, 20));
        term.set_board(5, 5).unwrap();
        term.draw_board().unwrap();
        term
    }

    /// What a terminal would show from `out`, with escape sequences dropped.
    fn printed(out: &[u8]) -> String {
        let text = String::from_utf8_lossy(out);
        let mut chars = text.chars();
        let mut shown = String::new();

        while let Some(ch) = chars.next() {
            if ch != '\x1b' {
                shown.push(ch);
                continue;
            }
            if chars.next() == Some('[') {
                for c in chars.by_ref() {
                    if ('@'..='~').contains(&c) {
                        break;
                    }
                }
            }
        }

        shown
    }

    #[test]
    fn glyphs_follow_the_run_state() {
        let board = Board { top_left: (0, 0), cols: 5, rows: 5 };
        let at = |glyphs: &Vec<[char; 2]>, x: i32, y: i32| glyphs[(y * 5 + x) as usize];

        let running = frame_glyphs(board, &snapshot(RunState::Running, None));
        assert_eq!(at(&running, 1, 1), ['^', '^']);
        assert_eq!(at(&running, 1, 2), SNAKE_BODY_GLYPH);
        assert_eq!(at(&running, 3, 3), FOOD_GLYPH);
        assert_eq!(at(&running, 0, 0), EMPTY_GLYPH);

        let dead = frame_glyphs(board, &snapshot(RunState::Over, Some(Ending::HitWall)));
        assert_eq!(at(&dead, 1, 1), DEAD_SNAKE_GLYPH);
        assert_eq!(at(&dead, 1, 2), DEAD_SNAKE_GLYPH);
        assert_eq!(at(&dead, 3, 3), FOOD_GLYPH);

        let mut full = snapshot(RunState::Over, Some(Ending::BoardFull));
        full.food = None;
        let won = frame_glyphs(board, &full);
        assert_eq!(at(&won, 1, 1), ['^', '^']);
        assert_eq!(at(&won, 1, 2), SNAKE_BODY_GLYPH);
        assert_eq!(at(&won, 3, 3), EMPTY_GLYPH);
    }

    #[test]
    fn overlay_tracks_state_changes() {
        let mut term = screen();

        term.render(&snapshot(RunState::Running, None)).unwrap();
        assert!(!term.has_message());
        assert_eq!(term.saved_char((17, 9)), Some('^'));

        term.out.clear();
        term.render(&snapshot(RunState::Paused, None)).unwrap();
        assert_eq!(term.overlay, Some(RunState::Paused));
        assert!(printed(&term.out).contains("Paused"));

        // Same state again draws nothing new.
        term.out.clear();
        term.render(&snapshot(RunState::Paused, None)).unwrap();
        assert!(!printed(&term.out).contains("Paused"));

        term.render(&snapshot(RunState::Running, None)).unwrap();
        assert!(!term.has_message());
        assert_eq!(term.overlay, None);

        term.out.clear();
        term.render(&snapshot(RunState::Over, Some(Ending::HitSelf))).unwrap();
        let shown = printed(&term.out);
        assert!(shown.contains("Game over!"));
        assert!(shown.contains("Score: 20"));
        assert_eq!(term.saved_char((17, 9)), Some('X'));

        term.out.clear();
        term.render(&snapshot(RunState::Over, Some(Ending::BoardFull))).unwrap();
        assert!(term.has_message());
        assert_eq!(term.overlay, Some(RunState::Over));
        // Over to Over keeps the first message.
        assert!(!printed(&term.out).contains("You won!"));

        let mut term = screen();
        term.out.clear();
        term.render(&snapshot(RunState::Over, Some(Ending::BoardFull))).unwrap();
        assert!(printed(&term.out).contains("You won!"));
    }

    #[test]
    fn writes_under_a_message_are_kept_for_later() {
        let mut term = screen();
        term.render(&snapshot(RunState::Over, Some(Ending::HitWall))).unwrap();

        term.out.clear();
        term.print_at((17, 9), 'Z').unwrap();
        assert!(term.out.is_empty());
        assert_eq!(term.saved_char((17, 9)), Some('Z'));

        term.hide_message().unwrap();
        let shown = printed(&term.out);
        assert!(shown.contains("+----------+"));
        assert!(shown.contains("ZX"));
        assert!(!term.has_message());
    }
}
