use log::debug;
use rand::Rng;

use crate::grid::{CellContent, Grid, Position};
use crate::snake::Snake;

/// Tracks the single food item that may be outstanding on the board.
///
/// The outstanding flag is authoritative; the grid is never scanned to find
/// out whether food exists.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct Food {
    outstanding: bool,
    position: Option<Position>,
}

impl Food {
    /// Tries to place food on one uniformly drawn cell.
    ///
    /// Does nothing while food is outstanding. When the drawn cell is taken
    /// the attempt is skipped and `None` is returned; the caller retries on a
    /// later tick.
    pub fn place<R: Rng + ?Sized>(
        &mut self,
        grid: &mut Grid,
        snake: &Snake,
        rng: &mut R,
    ) -> Option<Position> {
        if self.outstanding {
            return None;
        }

        let size = grid.size();
        let candidate = Position::new(rng.gen_range(0..size), rng.gen_range(0..size));
        if grid.content(candidate) != CellContent::Empty || snake.occupies(candidate) {
            debug!("food draw at {candidate:?} hit an occupied cell, retrying next tick");
            return None;
        }

        grid.set_content(candidate, CellContent::Food);
        self.outstanding = true;
        self.position = Some(candidate);
        debug!("food placed at {candidate:?}");
        Some(candidate)
    }

    /// Marks the outstanding food as eaten.
    pub fn consume(&mut self) {
        self.outstanding = false;
        self.position = None;
    }

    /// Forgets any outstanding food; the grid is expected to be cleared separately.
    pub fn clear(&mut self) {
        self.consume();
    }

    #[must_use]
    pub fn is_outstanding(&self) -> bool {
        self.outstanding
    }

    /// Returns where the outstanding food sits, if any.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    #[cfg(test)]
    pub(crate) fn place_at(&mut self, grid: &mut Grid, position: Position) {
        grid.set_content(position, CellContent::Food);
        self.outstanding = true;
        self.position = Some(position);
    }
}
