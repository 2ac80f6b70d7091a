//! The game state machine: snake, food, score and run state, advanced one
//! cell per tick. No I/O happens here; the driver feeds inputs in and reads
//! snapshots out.

use std::{collections::HashSet, error::Error, fmt};

use log::{debug, info, warn};
use rand::{seq::IteratorRandom, Rng};

use crate::config::{CollisionRule, ConfigError, GameConfig};
use crate::snake::{Cell, Direction, Snake};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    Over,
}

/// Why a run reached [`RunState::Over`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    HitWall,
    HitSelf,
    /// The snake covers every cell, so there is nowhere left for food. Counts as a win.
    BoardFull,
}

/// What a single call to [`Engine::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Not running, nothing changed.
    Idle,
    Moved,
    Ate,
    Ended(Ending),
}

/// Food placement found no free cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardFull;

impl fmt::Display for BoardFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no free cell left to place food")
    }
}

impl Error for BoardFull {}

/// Read-only copy of the engine state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Head first.
    pub snake: Vec<Cell>,
    /// `None` only once the board is full.
    pub food: Option<Cell>,
    pub score: u32,
    pub state: RunState,
    pub just_ate: bool,
    pub direction: Direction,
    pub ending: Option<Ending>,
}

pub struct Engine<R> {
    config: GameConfig,
    rng: R,
    snake: Snake,
    direction: Direction,
    pending: Option<Direction>,
    food: Option<Cell>,
    score: u32,
    state: RunState,
    ending: Option<Ending>,
    just_ate: bool,
}

impl<R: Rng> Engine<R> {
    pub fn with_rng(config: GameConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut engine = Engine {
            snake: Snake::new(config.initial_snake.iter().copied()),
            direction: config.initial_direction,
            pending: None,
            food: None,
            score: 0,
            state: RunState::Running,
            ending: None,
            just_ate: false,
            config,
            rng,
        };
        engine.reset();

        Ok(engine)
    }

    /// Starts a fresh run from the configured snake. Always succeeds; a board
    /// the initial snake already fills ends the run immediately.
    pub fn reset(&mut self) {
        self.snake = Snake::new(self.config.initial_snake.iter().copied());
        self.direction = self.config.initial_direction;
        self.pending = None;
        self.score = 0;
        self.state = RunState::Running;
        self.ending = None;
        self.just_ate = false;

        info!("new game on a {}x{} grid", self.config.width, self.config.height);

        if self.place_food().is_err() {
            self.finish(Ending::BoardFull);
        }
    }

    /// Moves the food to a uniformly chosen cell the snake does not occupy.
    pub fn place_food(&mut self) -> Result<Cell, BoardFull> {
        let occupied: HashSet<Cell> = self.snake.iter().copied().collect();
        let (width, height) = (self.config.width, self.config.height);

        let free = (0..height)
            .flat_map(|y| (0..width).map(move |x| Cell::new(x, y)))
            .filter(|cell| !occupied.contains(cell));

        match free.choose(&mut self.rng) {
            Some(cell) => {
                debug!("food placed at ({}, {})", cell.x, cell.y);
                self.food = Some(cell);
                Ok(cell)
            }
            None => {
                warn!("board is full at length {}", self.snake.len());
                self.food = None;
                Err(BoardFull)
            }
        }
    }

    /// Latches `direction` for the next tick. Reversals and calls outside a running game are ignored.
    pub fn set_direction(&mut self, direction: Direction) {
        if self.state != RunState::Running || direction.is_opposite(self.direction) {
            return;
        }

        self.pending = Some(direction);
    }

    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
            RunState::Over => return,
        };

        debug!("toggled pause, now {:?}", self.state);
    }

    pub fn tick(&mut self) -> Step {
        self.just_ate = false;

        if self.state != RunState::Running {
            return Step::Idle;
        }

        if let Some(direction) = self.pending.take() {
            self.direction = direction;
        }

        let new_head = self.snake.head().step(self.direction);

        // Wall before body before food: leaving the board is a loss even if food waits there.
        if !self.config.in_bounds(new_head) {
            return self.finish(Ending::HitWall);
        }

        if self.blocks(new_head) {
            return self.finish(Ending::HitSelf);
        }

        let eats = self.food == Some(new_head);
        self.snake.advance(new_head, eats);

        if !eats {
            return Step::Moved;
        }

        self.score = self.score.saturating_add(self.config.score_increment);
        self.just_ate = true;

        match self.place_food() {
            Ok(_) => Step::Ate,
            Err(BoardFull) => self.finish(Ending::BoardFull),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            snake: self.snake.iter().copied().collect(),
            food: self.food,
            score: self.score,
            state: self.state,
            just_ate: self.just_ate,
            direction: self.direction,
            ending: self.ending,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    ///////////////////////////////////////////////////////////////////////////

    fn blocks(&self, cell: Cell) -> bool {
        match self.config.collision_rule {
            CollisionRule::IncludeVacatingTail => self.snake.contains(cell),
            CollisionRule::ExcludeVacatingTail => cell != self.snake.tail() && self.snake.contains(cell),
        }
    }

    fn finish(&mut self, ending: Ending) -> Step {
        self.state = RunState::Over;
        self.ending = Some(ending);
        info!("game over ({:?}) with score {} and length {}", ending, self.score, self.snake.len());
        Step::Ended(ending)
    }
}
