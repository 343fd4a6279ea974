use std::collections::VecDeque;

use crate::error::ConfigError;
use crate::grid::{CellContent, Grid, Position};
use crate::heading::Heading;

/// Result of one movement step.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MoveOutcome {
    /// Moved into an empty cell; length unchanged.
    Advanced,
    /// Ate food; length grew by one.
    Grew,
    /// Ran into its own body; nothing was mutated.
    Collided,
}

/// Ordered snake body, head first. Segment roles are mirrored into the grid.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Snake {
    body: VecDeque<Position>,
}

impl Snake {
    /// Lays a snake down on `grid` with its head at `center`.
    ///
    /// The head and `initial_length - 1` body segments follow the `left`
    /// chain, then one more `left` step places the [`CellContent::SnakeEnd`]
    /// marker, for `initial_length + 1` segments in total.
    pub fn spawn(
        grid: &mut Grid,
        center: Position,
        initial_length: usize,
    ) -> Result<Self, ConfigError> {
        if initial_length == 0 {
            return Err(ConfigError::EmptySnake);
        }
        let size = grid.size();
        if initial_length + 1 >= size {
            return Err(ConfigError::SnakeTooLong {
                length: initial_length,
                size,
            });
        }
        if !grid.contains(center) {
            return Err(ConfigError::SpawnOffBoard {
                x: center.x,
                y: center.y,
                size,
            });
        }

        let mut body = VecDeque::with_capacity(initial_length + 1);
        let mut cursor = center;
        for index in 0..initial_length {
            let role = if index == 0 {
                CellContent::SnakeHead
            } else {
                CellContent::SnakeBody
            };
            grid.set_content(cursor, role);
            body.push_back(cursor);
            cursor = grid.neighbor(cursor, Heading::Left);
        }
        grid.set_content(cursor, CellContent::SnakeEnd);
        body.push_back(cursor);

        Ok(Self { body })
    }

    /// Moves the head one cell in `heading`, updating `grid` in place.
    pub fn advance(&mut self, grid: &mut Grid, heading: Heading) -> MoveOutcome {
        let head = self.head();
        let next = grid.neighbor(head, heading);

        let outcome = match grid.content(next) {
            CellContent::Empty => MoveOutcome::Advanced,
            CellContent::Food => MoveOutcome::Grew,
            CellContent::SnakeHead | CellContent::SnakeBody | CellContent::SnakeEnd => {
                return MoveOutcome::Collided;
            }
        };

        self.body.push_front(next);
        grid.set_content(next, CellContent::SnakeHead);
        grid.set_content(head, CellContent::SnakeBody);

        if outcome == MoveOutcome::Advanced {
            if let Some(old_end) = self.body.pop_back() {
                grid.set_content(old_end, CellContent::Empty);
            }
            if let Some(new_end) = self.body.back() {
                grid.set_content(*new_end, CellContent::SnakeEnd);
            }
        }

        outcome
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Position {
        *self
            .body
            .front()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns the end (last) segment.
    #[must_use]
    pub fn end(&self) -> Position {
        *self
            .body
            .back()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns true if any segment occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: Position) -> bool {
        self.body.contains(&position)
    }

    /// Returns current segment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true when there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Iterates over body segments from head to end.
    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }
}
