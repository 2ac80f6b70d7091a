use std::{error::Error, fmt, time::Duration};

use crate::snake::{Cell, Direction, Snake};

/// 500x500 window at 10 pixels per cell.
pub const DEFAULT_GRID_SIZE: i32 = 50;
pub const DEFAULT_TICK_MS: u64 = 75;
pub const DEFAULT_EAT_PAUSE_MS: u64 = 100;
pub const SCORE_PER_FOOD: u32 = 10;

/// Whether the cell the tail is about to vacate blocks the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionRule {
    /// The whole pre-move body is an obstacle, tail included.
    IncludeVacatingTail,
    /// The head may step onto the tail cell that leaves on the same tick.
    ExcludeVacatingTail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    pub tick_period: Duration,
    pub score_increment: u32,
    /// Extra wait the driver inserts after the snake eats.
    pub eat_pause: Duration,
    /// Head first.
    pub initial_snake: Vec<Cell>,
    pub initial_direction: Direction,
    pub collision_rule: CollisionRule,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: DEFAULT_GRID_SIZE,
            height: DEFAULT_GRID_SIZE,
            tick_period: Duration::from_millis(DEFAULT_TICK_MS),
            score_increment: SCORE_PER_FOOD,
            eat_pause: Duration::from_millis(DEFAULT_EAT_PAUSE_MS),
            initial_snake: vec![Cell::new(10, 10), Cell::new(10, 11), Cell::new(10, 12)],
            initial_direction: Direction::Right,
            collision_rule: CollisionRule::IncludeVacatingTail,
        }
    }
}

impl GameConfig {
    pub fn new(width: i32, height: i32) -> Self {
        GameConfig { width, height, ..Default::default() }
    }

    pub fn with_snake<I: IntoIterator<Item = Cell>>(mut self, cells: I, direction: Direction) -> Self {
        self.initial_snake = cells.into_iter().collect();
        self.initial_direction = direction;
        self
    }

    /// Keeps the classic start if it fits, otherwise moves the same
    /// three-cell vertical segment to the middle of the grid.
    pub fn fit_initial_snake(&mut self) {
        if self.initial_snake.iter().all(|c| self.in_bounds(*c)) {
            return;
        }

        let (x, y) = (self.width / 2, (self.height - 3).max(0) / 2);
        self.initial_snake = (0..3).map(|i| Cell::new(x, y + i)).collect();
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::EmptyGrid { width: self.width, height: self.height });
        }

        if self.initial_snake.is_empty() {
            return Err(ConfigError::EmptySnake);
        }

        if let Some(cell) = self.initial_snake.iter().find(|c| !self.in_bounds(**c)) {
            return Err(ConfigError::SnakeOutOfBounds(*cell));
        }

        let snake = Snake::new(self.initial_snake.iter().copied());
        if snake.has_overlap() {
            return Err(ConfigError::SnakeOverlaps);
        }
        if !snake.is_contiguous() {
            return Err(ConfigError::SnakeNotContiguous);
        }

        // A two-cell snake whose neck is also its tail would swap ends on the
        // first tick when the tail may be followed. Longer snakes facing their
        // neck simply collide.
        if self.collision_rule == CollisionRule::ExcludeVacatingTail && snake.len() == 2
            && snake.head().step(self.initial_direction) == snake.tail()
        {
            return Err(ConfigError::ReversesIntoTail(self.initial_direction));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyGrid { width: i32, height: i32 },
    EmptySnake,
    SnakeOutOfBounds(Cell),
    SnakeOverlaps,
    SnakeNotContiguous,
    ReversesIntoTail(Direction),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyGrid { width, height } => write!(f, "grid of {}x{} cells has no room to play", width, height),
            ConfigError::EmptySnake => write!(f, "initial snake has no cells"),
            ConfigError::SnakeOutOfBounds(c) => write!(f, "initial snake cell ({}, {}) lies outside the grid", c.x, c.y),
            ConfigError::SnakeOverlaps => write!(f, "initial snake occupies a cell twice"),
            ConfigError::SnakeNotContiguous => write!(f, "initial snake cells are not adjacent"),
            ConfigError::ReversesIntoTail(d) => write!(f, "initial direction {:?} would swap the snake's head and tail", d),
        }
    }
}

impl Error for ConfigError {}
