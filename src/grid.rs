use serde::Serialize;

use crate::error::ConfigError;
use crate::heading::Heading;

/// Cell coordinate on the board, `0 <= x, y < size`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    #[must_use]
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// What currently occupies a cell.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize)]
pub enum CellContent {
    #[default]
    Empty,
    Food,
    SnakeHead,
    SnakeBody,
    SnakeEnd,
}

impl CellContent {
    /// Returns true for any of the snake segment roles.
    #[must_use]
    pub fn is_snake(self) -> bool {
        matches!(self, Self::SnakeHead | Self::SnakeBody | Self::SnakeEnd)
    }
}

/// One board cell with its precomputed wrap-around neighbors.
///
/// Neighbors are coordinates into the owning [`Grid`], never references.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Cell {
    pub position: Position,
    pub content: CellContent,
    pub left: Position,
    pub right: Position,
    pub top: Position,
    pub bottom: Position,
}

impl Cell {
    /// Returns the neighbor coordinate in `heading`.
    #[must_use]
    pub fn neighbor(&self, heading: Heading) -> Position {
        match heading {
            Heading::Left => self.left,
            Heading::Right => self.right,
            Heading::Top => self.top,
            Heading::Bottom => self.bottom,
        }
    }
}

/// Square toroidal board stored row-major as `y * size + x`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds an empty `size` x `size` board with every neighbor link resolved.
    pub fn build(size: usize) -> Result<Self, ConfigError> {
        if size < 1 {
            return Err(ConfigError::InvalidBoardSize(size));
        }

        let mut cells = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                cells.push(Cell {
                    position: Position::new(x, y),
                    content: CellContent::Empty,
                    left: Position::new((x + size - 1) % size, y),
                    right: Position::new((x + 1) % size, y),
                    top: Position::new(x, (y + size - 1) % size),
                    bottom: Position::new(x, (y + 1) % size),
                });
            }
        }

        Ok(Self { size, cells })
    }

    /// Returns the side length.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the total number of cells.
    #[must_use]
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    /// Returns the board center used as the spawn point.
    #[must_use]
    pub fn center(&self) -> Position {
        Position::new(self.size / 2, self.size / 2)
    }

    /// Returns true when `position` addresses a cell of this board.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        position.x < self.size && position.y < self.size
    }

    /// Returns the cell at `position`, if it lies on the board.
    #[must_use]
    pub fn cell(&self, position: Position) -> Option<&Cell> {
        if !self.contains(position) {
            return None;
        }
        self.cells.get(self.index(position))
    }

    /// Returns the content at `position`; off-board positions read as empty.
    #[must_use]
    pub fn content(&self, position: Position) -> CellContent {
        self.cell(position)
            .map_or(CellContent::Empty, |cell| cell.content)
    }

    /// Overwrites the content at `position`. Off-board positions are ignored.
    pub fn set_content(&mut self, position: Position, content: CellContent) {
        if !self.contains(position) {
            return;
        }
        let index = self.index(position);
        self.cells[index].content = content;
    }

    /// Returns the wrap-around neighbor of `position` in `heading`.
    #[must_use]
    pub fn neighbor(&self, position: Position, heading: Heading) -> Position {
        match self.cell(position) {
            Some(cell) => cell.neighbor(heading),
            None => position,
        }
    }

    /// Resets every cell to [`CellContent::Empty`].
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.content = CellContent::Empty;
        }
    }

    /// Iterates over cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Counts cells holding `content`.
    #[must_use]
    pub fn count(&self, content: CellContent) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.content == content)
            .count()
    }

    fn index(&self, position: Position) -> usize {
        position.y * self.size + position.x
    }
}
