use thiserror::Error;

use crate::{CellCount, Coord2};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Coordinates {0:?} are outside the board")]
    InvalidCoords(Coord2),
    #[error("Cell at {0:?} is already revealed and cannot be flagged")]
    RevealedCell(Coord2),
    #[error("Board needs at least one column and one row")]
    EmptyBoard,
    #[error("Too many mines to keep the first cell and its neighbors clear")]
    TooManyMines,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Mine layout has {actual} mines but the board expects {expected}")]
    LayoutMismatch {
        expected: CellCount,
        actual: CellCount,
    },
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failure to load a [`SessionConfig`](crate::SessionConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not parse session config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Session config describes an unplayable board: {0}")]
    Invalid(#[from] GameError),
}
