use serde::{Deserialize, Serialize};

use crate::*;

/// What the player can currently see of a cell.
///
/// Flagged and revealed are separate variants so a cell can never be both.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Hidden,
    Flagged,
    Revealed,
}

impl Default for Visibility {
    fn default() -> Self {
        Self::Hidden
    }
}

/// One grid position. Handed out by value, so callers only ever hold snapshots.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    coords: Coord2,
    visibility: Visibility,
    mine: bool,
    adjacent_mines: u8,
}

impl Cell {
    pub const fn new(coords: Coord2) -> Self {
        Self {
            coords,
            visibility: Visibility::Hidden,
            mine: false,
            adjacent_mines: 0,
        }
    }

    pub const fn coords(&self) -> Coord2 {
        self.coords
    }

    pub const fn col(&self) -> Coord {
        self.coords.0
    }

    pub const fn row(&self) -> Coord {
        self.coords.1
    }

    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub const fn is_mine(&self) -> bool {
        self.mine
    }

    pub const fn is_hidden(&self) -> bool {
        matches!(self.visibility, Visibility::Hidden)
    }

    pub const fn is_flagged(&self) -> bool {
        matches!(self.visibility, Visibility::Flagged)
    }

    pub const fn is_revealed(&self) -> bool {
        matches!(self.visibility, Visibility::Revealed)
    }

    /// Mines among the surrounding cells, 0 to 8.
    pub const fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }

    pub const fn has_adjacent_mine(&self) -> bool {
        self.adjacent_mines > 0
    }

    pub(crate) fn make_mine(&mut self) {
        self.mine = true;
    }

    pub(crate) fn add_adjacent_mine(&mut self) {
        self.adjacent_mines += 1;
    }

    pub(crate) fn toggle_flag(&mut self) -> Result<()> {
        self.visibility = match self.visibility {
            Visibility::Hidden => Visibility::Flagged,
            Visibility::Flagged => Visibility::Hidden,
            Visibility::Revealed => return Err(GameError::RevealedCell(self.coords)),
        };
        Ok(())
    }

    /// Only hidden cells can be revealed; returns whether anything changed.
    pub(crate) fn reveal(&mut self) -> bool {
        if self.is_hidden() {
            self.visibility = Visibility::Revealed;
            true
        } else {
            false
        }
    }

    /// Drops a flag if there is one; returns whether it did.
    pub(crate) fn clear_flag(&mut self) -> bool {
        if self.is_flagged() {
            self.visibility = Visibility::Hidden;
            true
        } else {
            false
        }
    }
}
