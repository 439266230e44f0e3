use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// The first revealed cell and its neighbors, which never hold a mine.
const START_AREA: CellCount = 9;

/// Board dimensions and mine count for one game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(size, mines);
        config.validate()?;
        Ok(config)
    }

    /// A board needs at least one cell, and room to keep a full 3x3 start area clear of mines
    /// wherever the first click lands.
    pub fn validate(&self) -> Result<()> {
        if self.size.0 == 0 || self.size.1 == 0 {
            return Err(GameError::EmptyBoard);
        }
        if self.mines > self.max_mines() {
            return Err(GameError::TooManyMines);
        }
        Ok(())
    }

    /// Most mines that still leave the start area free.
    pub const fn max_mines(&self) -> CellCount {
        let total = self.total_cells();
        total - if total < START_AREA { total } else { START_AREA }
    }

    pub const fn width(&self) -> Coord {
        self.size.0
    }

    pub const fn height(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        area(self.size)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }
}

/// Named board profiles, picked before a session starts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    /// Small fixed board used by tests.
    Test,
    Easy,
    Medium,
    Hard,
    Custom(GameConfig),
}

impl Difficulty {
    pub const PRESETS: [Difficulty; 4] = [Self::Test, Self::Easy, Self::Medium, Self::Hard];

    pub const fn config(self) -> GameConfig {
        match self {
            Self::Test => GameConfig::new_unchecked((5, 5), 5),
            Self::Easy => GameConfig::new_unchecked((7, 7), 10),
            Self::Medium => GameConfig::new_unchecked((12, 10), 20),
            Self::Hard => GameConfig::new_unchecked((14, 12), 40),
            Self::Custom(config) => config,
        }
    }

    /// Label attached to score records.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Test => "TEST",
            Self::Easy => "EASY",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
            Self::Custom(_) => "CUSTOM",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Easy
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything needed to build a [`GameSession`].
///
/// Without a seed every new board draws a fresh one, so consecutive games differ. A fixed
/// seed makes mine placement reproducible, including after [`GameSession::reset`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    pub seed: Option<u64>,
}

impl SessionConfig {
    pub const fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            seed: None,
        }
    }

    pub const fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    pub fn from_json(json: &str) -> core::result::Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.difficulty.config().validate()?;
        log::debug!("Loaded session config: {:?}", config);
        Ok(config)
    }

    pub fn game_config(&self) -> GameConfig {
        self.difficulty.config()
    }
}
