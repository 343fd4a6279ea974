use log::{debug, error, info, trace, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::{ConfigError, TransitionError};
use crate::food::Food;
use crate::grid::{CellContent, Grid, Position};
use crate::heading::{Heading, sanitize};
use crate::snake::{MoveOutcome, Snake};

/// Heading the snake faces on every entry into Init.
pub const INITIAL_HEADING: Heading = Heading::Right;

/// High-level phase of the state machine.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum GamePhase {
    Init,
    Playing,
    GameOver,
}

/// Content tag of one cell as seen by the presentation layer.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct CellSnapshot {
    pub position: Position,
    pub content: CellContent,
}

/// Immutable copy of the board handed to board-changed observers.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct BoardSnapshot {
    pub size: usize,
    pub phase: GamePhase,
    /// GameOver blink state; always true outside GameOver.
    pub visible: bool,
    /// Row-major, `y * size + x`.
    pub cells: Vec<CellSnapshot>,
}

impl BoardSnapshot {
    /// Returns the content at `position`, if it lies on the board.
    #[must_use]
    pub fn content(&self, position: Position) -> Option<CellContent> {
        if position.x >= self.size || position.y >= self.size {
            return None;
        }
        self.cells
            .get(position.y * self.size + position.x)
            .map(|cell| cell.content)
    }
}

/// Complete simulation state: board, snake, food and the phase machine.
///
/// Every method runs synchronously and deterministically for a given seed.
/// The async [`crate::engine::Engine`] drives one of these on a timer.
#[derive(Debug, Clone)]
pub struct Game {
    grid: Grid,
    snake: Snake,
    food: Food,
    heading: Heading,
    requested: Heading,
    phase: GamePhase,
    visible: bool,
    initial_length: usize,
    tick_count: u64,
    epoch: u64,
    rng: StdRng,
}

impl Game {
    /// Creates a game in Init from a validated config.
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config.board_size, config.initial_length, rng)
    }

    /// Creates a deterministic game for tests and reproducible simulations.
    pub fn new_with_seed(
        board_size: usize,
        initial_length: usize,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::with_rng(board_size, initial_length, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        board_size: usize,
        initial_length: usize,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        let mut grid = Grid::build(board_size)?;
        let center = grid.center();
        let snake = Snake::spawn(&mut grid, center, initial_length)?;
        info!("board built: {board_size}x{board_size}, initial length {initial_length}");

        Ok(Self {
            grid,
            snake,
            food: Food::default(),
            heading: INITIAL_HEADING,
            requested: INITIAL_HEADING,
            phase: GamePhase::Init,
            visible: true,
            initial_length,
            tick_count: 0,
            epoch: 0,
            rng,
        })
    }

    /// Rebuilds the board at a new side length and re-enters Init.
    ///
    /// On error nothing changes, including the phase.
    pub fn build(&mut self, board_size: usize) -> Result<(), ConfigError> {
        let mut grid = Grid::build(board_size)?;
        let center = grid.center();
        let snake = Snake::spawn(&mut grid, center, self.initial_length)?;

        self.grid = grid;
        self.snake = snake;
        info!("board rebuilt: {board_size}x{board_size}");
        self.reset_to_init();
        Ok(())
    }

    /// Moves Init to Playing.
    pub fn start(&mut self) -> Result<(), TransitionError> {
        if self.phase != GamePhase::Init {
            warn!("ignoring start() in phase {:?}", self.phase);
            return Err(TransitionError::NotInInit(self.phase));
        }

        self.enter(GamePhase::Playing);
        Ok(())
    }

    /// Returns to Init from any phase with a freshly spawned snake.
    ///
    /// The new board is committed only once the respawn succeeds.
    pub fn restart(&mut self) {
        let mut grid = self.grid.clone();
        grid.clear();
        let center = grid.center();
        let snake = match Snake::spawn(&mut grid, center, self.initial_length) {
            Ok(snake) => snake,
            // Board size and length were validated together when the board was built.
            Err(e) => {
                error!("respawn failed on a validated board, keeping the old board: {e}");
                return;
            }
        };

        self.grid = grid;
        self.snake = snake;
        self.reset_to_init();
    }

    /// Stores `requested` as the heading for the next tick unless it reverses
    /// the heading applied on the last tick. Last write wins.
    pub fn change_direction(&mut self, requested: Heading) {
        self.requested = sanitize(self.heading, requested);
    }

    /// Advances the simulation one step. Returns `None` outside Playing.
    pub fn tick(&mut self) -> Option<MoveOutcome> {
        if self.phase != GamePhase::Playing {
            return None;
        }

        self.tick_count += 1;
        self.heading = self.requested;
        let outcome = self.snake.advance(&mut self.grid, self.heading);
        trace!(
            "tick {}: {:?} -> {:?}",
            self.tick_count,
            self.heading,
            outcome
        );

        match outcome {
            MoveOutcome::Collided => {
                info!(
                    "collision at tick {}, snake length {}",
                    self.tick_count,
                    self.snake.len()
                );
                self.enter(GamePhase::GameOver);
            }
            MoveOutcome::Grew => {
                self.food.consume();
                self.place_food();
            }
            MoveOutcome::Advanced => self.place_food(),
        }

        Some(outcome)
    }

    /// Toggles the GameOver visibility flag. Returns `None` outside GameOver.
    pub fn blink(&mut self) -> Option<bool> {
        if self.phase != GamePhase::GameOver {
            return None;
        }

        self.visible = !self.visible;
        Some(self.visible)
    }

    /// Copies the board for observers.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            size: self.grid.size(),
            phase: self.phase,
            visible: self.visible,
            cells: self
                .grid
                .cells()
                .map(|cell| CellSnapshot {
                    position: cell.position,
                    content: cell.content,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Heading applied on the most recent tick.
    #[must_use]
    pub fn heading(&self) -> Heading {
        self.heading
    }

    /// Heading that the next tick will apply.
    #[must_use]
    pub fn requested_heading(&self) -> Heading {
        self.requested
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    #[must_use]
    pub fn food(&self) -> &Food {
        &self.food
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Counter bumped on every phase entry; timers compare it to detect staleness.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn place_food(&mut self) {
        self.food.place(&mut self.grid, &self.snake, &mut self.rng);
    }

    fn reset_to_init(&mut self) {
        self.food.clear();
        self.heading = INITIAL_HEADING;
        self.requested = INITIAL_HEADING;
        self.tick_count = 0;
        self.enter(GamePhase::Init);
    }

    fn enter(&mut self, phase: GamePhase) {
        debug!("phase {:?} -> {phase:?}", self.phase);
        self.phase = phase;
        self.visible = true;
        self.epoch += 1;
    }
}
