use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// A fixed set of mine positions, used instead of random placement to bootstrap a known board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Result<Self> {
        let (width, height) = mine_mask.dim();
        if width == 0 || height == 0 {
            return Err(GameError::EmptyBoard);
        }
        if Coord::try_from(width).is_err() || Coord::try_from(height).is_err() {
            return Err(GameError::InvalidBoardShape);
        }

        let mine_count = mine_mask
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .map_err(|_| GameError::TooManyMines)?;
        Ok(Self {
            mine_mask,
            mine_count,
        })
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if !in_bounds(coords, size) {
                return Err(GameError::InvalidCoords(coords));
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Self::from_mine_mask(mine_mask)
    }

    /// Builds a layout from text rows, top row first: `B` marks a mine, `E` or `.` an empty cell.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().chars().count());
        let mut mine_mask: Array2<bool> = Array2::default([width, height]);

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(GameError::InvalidBoardShape);
            }
            for (x, symbol) in row.chars().enumerate() {
                mine_mask[[x, y]] = match symbol {
                    'B' => true,
                    'E' | '.' => false,
                    _ => return Err(GameError::InvalidBoardShape),
                };
            }
        }

        Self::from_mine_mask(mine_mask)
    }

    pub fn size(&self) -> Coord2 {
        let (width, height) = self.mine_mask.dim();
        // checked on construction
        (width as Coord, height as Coord)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn mine_coords(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.mine_mask
            .indexed_iter()
            .filter(|&(_, &is_mine)| is_mine)
            .map(|((x, y), _)| (x as Coord, y as Coord))
    }
}
