use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::game::GamePhase;

/// Invalid board or engine parameters, reported synchronously to the caller.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("board size must be at least 1, got {0}")]
    InvalidBoardSize(usize),

    #[error("initial snake length must be at least 1")]
    EmptySnake,

    #[error("a snake of initial length {length} does not fit on a board of side {size}")]
    SnakeTooLong { length: usize, size: usize },

    #[error("spawn point ({x}, {y}) lies outside a board of side {size}")]
    SpawnOffBoard { x: usize, y: usize, size: usize },

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A phase transition that is not valid from the current phase.
///
/// Returned instead of mutating anything; the engine stays where it was.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum TransitionError {
    #[error("start() is only valid from Init, engine is in {0:?}")]
    NotInInit(GamePhase),
}
