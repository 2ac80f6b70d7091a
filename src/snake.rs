use std::collections::{vec_deque, VecDeque};

use Direction::*;

/// One discrete grid position. Signed so a head that left the board can
/// still be represented before it is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Cell { x: self.x + dx, y: self.y + dy }
    }

    pub fn is_adjacent(self, other: Cell) -> bool {
        (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Cell { x, y }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// Screen coordinates: y grows downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }
}

/// Snake body, head at the front of the deque. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<Cell>,
}

#[allow(clippy::len_without_is_empty)]
impl Snake {
    /// Builds a snake from its cells, head first. Callers guarantee at least one cell.
    pub fn new<I: IntoIterator<Item = Cell>>(cells: I) -> Self {
        let body: VecDeque<Cell> = cells.into_iter().collect();
        debug_assert!(!body.is_empty(), "a snake needs at least one cell");
        Snake { body }
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn tail(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Cell> {
        self.body.iter()
    }

    /// Moves the head to `new_head`. Unless growing, the tail is dropped and returned.
    pub fn advance(&mut self, new_head: Cell, grow: bool) -> Option<Cell> {
        self.body.push_front(new_head);

        if grow {
            None
        } else {
            self.body.pop_back()
        }
    }

    pub fn is_contiguous(&self) -> bool {
        self.body.iter().zip(self.body.iter().skip(1)).all(|(a, b)| a.is_adjacent(*b))
    }

    pub fn has_overlap(&self) -> bool {
        self.body.iter().enumerate().any(|(i, cell)| self.body.iter().skip(i + 1).any(|other| other == cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical() -> Snake {
        Snake::new(vec![Cell::new(10, 10), Cell::new(10, 11), Cell::new(10, 12)])
    }

    #[test]
    fn opposite_directions() {
        assert!(Up.is_opposite(Down));
        assert!(Left.is_opposite(Right));
        assert!(!Up.is_opposite(Left));
        assert!(!Right.is_opposite(Right));
    }

    #[test]
    fn cell_steps() {
        let c = Cell::new(3, 3);
        assert_eq!(c.step(Up), Cell::new(3, 2));
        assert_eq!(c.step(Down), Cell::new(3, 4));
        assert_eq!(c.step(Left), Cell::new(2, 3));
        assert_eq!(c.step(Right), Cell::new(4, 3));
        assert_eq!(Cell::new(0, 0).step(Left), Cell::new(-1, 0));
    }

    #[test]
    fn advance_translates_without_growth() {
        let mut snake = vertical();
        let vacated = snake.advance(Cell::new(11, 10), false);

        assert_eq!(vacated, Some(Cell::new(10, 12)));
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Cell::new(11, 10));
        assert_eq!(snake.tail(), Cell::new(10, 11));
    }

    #[test]
    fn advance_keeps_tail_when_growing() {
        let mut snake = vertical();
        assert_eq!(snake.advance(Cell::new(11, 10), true), None);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.tail(), Cell::new(10, 12));
    }

    #[test]
    fn contiguity_and_overlap() {
        assert!(vertical().is_contiguous());
        assert!(!vertical().has_overlap());

        let gap = Snake::new(vec![Cell::new(0, 0), Cell::new(2, 0)]);
        assert!(!gap.is_contiguous());

        let folded = Snake::new(vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(0, 0)]);
        assert!(folded.has_overlap());
    }
}
