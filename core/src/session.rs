use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use time::{Date, OffsetDateTime};
use web_time::Instant;

use crate::*;

/// Valid transitions:
/// - NotStarted -> InProgress
/// - NotStarted -> Won, when the first reveal clears the board
/// - NotStarted -> Lost, only possible on a board built from a fixed layout
/// - InProgress -> Won
/// - InProgress -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Won,
    Lost,
}

impl SessionState {
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// No more moves are accepted.
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// What a player action did, for the presentation layer to redraw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Cells to redraw; empty when the action was ignored.
    pub changed: Vec<Cell>,
    pub flags_left: CellCount,
    pub state: SessionState,
}

impl ActionOutcome {
    pub fn has_update(&self) -> bool {
        !self.changed.is_empty()
    }

    pub fn is_ended(&self) -> bool {
        self.state.is_final()
    }

    pub fn is_won(&self) -> bool {
        matches!(self.state, SessionState::Won)
    }

    pub fn is_lost(&self) -> bool {
        matches!(self.state, SessionState::Lost)
    }
}

/// One game from first click to win or loss, plus the timer that scores it.
#[derive(Clone, Debug)]
pub struct GameSession {
    config: SessionConfig,
    layout: Option<MineLayout>,
    board: Board,
    stopwatch: Stopwatch,
    date: Date,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Result<Self> {
        let board = Board::new(config.game_config(), next_seed(&config))?;
        log::debug!(
            "New {} session, seed {}",
            config.difficulty,
            board.seed()
        );
        Ok(Self {
            config,
            layout: None,
            board,
            stopwatch: Stopwatch::new(),
            date: today(),
        })
    }

    pub fn with_difficulty(difficulty: Difficulty) -> Result<Self> {
        Self::new(SessionConfig::new(difficulty))
    }

    /// Session on a fixed mine layout, which has to match the difficulty's size and mine count.
    /// Resetting brings the same layout back.
    pub fn with_layout(difficulty: Difficulty, layout: MineLayout) -> Result<Self> {
        let config = SessionConfig::new(difficulty);
        let board = Board::with_layout(config.game_config(), &layout)?;
        Ok(Self {
            config,
            layout: Some(layout),
            board,
            stopwatch: Stopwatch::new(),
            date: today(),
        })
    }

    /// Throws the current game away and starts a fresh one with the same configuration.
    pub fn reset(&mut self) -> Result<()> {
        self.board = match &self.layout {
            Some(layout) => Board::with_layout(self.config.game_config(), layout)?,
            None => Board::new(self.config.game_config(), next_seed(&self.config))?,
        };
        self.stopwatch.reset();
        self.date = today();
        log::debug!("Session reset, seed {}", self.board.seed());
        Ok(())
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Day the session was created or last reset.
    pub fn date(&self) -> Date {
        self.date
    }

    pub fn state(&self) -> SessionState {
        if self.board.is_lost() {
            SessionState::Lost
        } else if self.board.is_won() {
            SessionState::Won
        } else if self.board.has_started() {
            SessionState::InProgress
        } else {
            SessionState::NotStarted
        }
    }

    pub fn is_ended(&self) -> bool {
        self.board.is_ended()
    }

    pub fn is_won(&self) -> bool {
        self.board.is_won()
    }

    pub fn is_lost(&self) -> bool {
        self.board.is_lost()
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<Cell> {
        self.board.cell_at(coords)
    }

    pub fn neighbors_of(&self, coords: Coord2) -> Result<SmallVec<[Cell; 8]>> {
        self.board.neighbors_of(coords)
    }

    pub fn flags_left(&self) -> CellCount {
        self.board.flags_left()
    }

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    pub fn elapsed_seconds(&mut self) -> u32 {
        self.stopwatch.elapsed()
    }

    pub fn elapsed_seconds_at(&mut self, now: Instant) -> u32 {
        self.stopwatch.elapsed_at(now)
    }

    /// Reveals a cell.
    ///
    /// Hitting a mine reveals every mine, and those are the changed cells. Otherwise the
    /// changed cells are everything revealed so far.
    pub fn primary_action(&mut self, coords: Coord2) -> Result<ActionOutcome> {
        let cell = self.board.cell_at(coords)?;
        if self.board.is_ended() || cell.is_flagged() {
            return Ok(self.outcome(Vec::new()));
        }

        if self.board.reveal(coords)?.is_empty() {
            return Ok(self.outcome(Vec::new()));
        }

        if self.board.is_lost() {
            self.stopwatch.stop();
            let mines = self.board.expose_mines();
            log::debug!("Lost at {:?}, {} mines exposed", coords, mines.len());
            return Ok(self.outcome(mines));
        }

        if self.stopwatch.is_idle() {
            self.stopwatch.start();
        }
        if self.board.is_won() {
            self.stopwatch.stop();
            log::debug!("Won, {}s", self.stopwatch.elapsed());
        }

        Ok(self.outcome(self.board.revealed_cells()))
    }

    /// Toggles a flag, within the flag budget. Removing a flag is always allowed.
    pub fn secondary_action(&mut self, coords: Coord2) -> Result<ActionOutcome> {
        let cell = self.board.cell_at(coords)?;
        if !self.board.has_started() || self.board.is_ended() || cell.is_revealed() {
            return Ok(self.outcome(Vec::new()));
        }
        if !cell.is_flagged() && !self.board.has_flags_left() {
            return Ok(self.outcome(Vec::new()));
        }

        let cell = self.board.toggle_flag(coords)?;
        if cell.is_flagged() {
            self.board.take_flag();
        } else {
            self.board.return_flag();
        }

        Ok(self.outcome(vec![cell]))
    }

    /// Reveals every unflagged neighbor of a revealed cell whose mines are all flagged.
    ///
    /// Safe neighbors are opened before mines, so when a flag was wrong the safe cells stay
    /// revealed next to the exposed mines.
    pub fn chord_action(&mut self, coords: Coord2) -> Result<ActionOutcome> {
        let cell = self.board.cell_at(coords)?;
        if self.board.is_ended() || !cell.is_revealed() {
            return Ok(self.outcome(Vec::new()));
        }

        let around = self.board.neighbors_of(coords)?;
        let flagged = around.iter().filter(|n| n.is_flagged()).count();
        if flagged != usize::from(cell.adjacent_mines()) {
            log::trace!(
                "Chord at {:?} ignored, {} flags for {} mines",
                coords,
                flagged,
                cell.adjacent_mines()
            );
            return Ok(self.outcome(Vec::new()));
        }

        let (mines, safe): (SmallVec<[Cell; 8]>, SmallVec<[Cell; 8]>) = around
            .into_iter()
            .filter(Cell::is_hidden)
            .partition(Cell::is_mine);

        let mut updated = false;
        for target in safe.iter().chain(mines.iter()) {
            updated |= self.primary_action(target.coords())?.has_update();
        }

        Ok(self.outcome(if updated {
            self.board.revealed_cells()
        } else {
            Vec::new()
        }))
    }

    /// Score for a won game, timed by the session stopwatch.
    pub fn score_record(&mut self, name: impl Into<String>) -> Option<ScoreRecord> {
        if !self.is_won() {
            return None;
        }
        Some(ScoreRecord::new(
            name,
            self.elapsed_seconds(),
            self.date,
            self.config.difficulty.label(),
        ))
    }

    fn outcome(&self, changed: Vec<Cell>) -> ActionOutcome {
        ActionOutcome {
            changed,
            flags_left: self.board.flags_left(),
            state: self.state(),
        }
    }
}

fn next_seed(config: &SessionConfig) -> u64 {
    config.seed.unwrap_or_else(rand::random)
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}
