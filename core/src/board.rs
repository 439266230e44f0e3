use alloc::vec;
use alloc::vec::Vec;
use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Grid of cells plus the counters of a single game.
///
/// Mines are placed lazily on the first reveal so that the first revealed cell and everything
/// around it is always safe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    config: GameConfig,
    seed: u64,
    cells: Array2<Cell>,
    mines: Vec<Coord2>,
    safe_left: CellCount,
    flags_left: CellCount,
    placed: bool,
    lost: bool,
}

impl Board {
    /// Empty board; mines are drawn from `seed` once the first cell is revealed.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let cells = Array2::from_shape_fn(config.size.to_nd_index(), |(x, y)| {
            Cell::new((x as Coord, y as Coord))
        });
        Ok(Self {
            config,
            seed,
            cells,
            mines: Vec::with_capacity(config.mines.into()),
            safe_left: config.safe_cells(),
            flags_left: config.mines,
            placed: false,
            lost: false,
        })
    }

    /// Board with mines at fixed positions instead of random ones.
    pub fn with_layout(config: GameConfig, layout: &MineLayout) -> Result<Self> {
        let mut board = Self::new(config, 0)?;
        if layout.size() != config.size {
            return Err(GameError::InvalidBoardShape);
        }
        if layout.mine_count() != config.mines {
            return Err(GameError::LayoutMismatch {
                expected: config.mines,
                actual: layout.mine_count(),
            });
        }

        for coords in layout.mine_coords() {
            board.plant_mine(coords);
        }
        board.placed = true;
        Ok(board)
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if in_bounds(coords, self.size()) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords(coords))
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(self.cells[coords.to_nd_index()])
    }

    /// Positions around `coords` that are on the board.
    pub fn neighbor_coords(&self, coords: Coord2) -> Result<Neighbors> {
        let coords = self.validate_coords(coords)?;
        Ok(neighbors(coords, self.size()).collect())
    }

    /// The in-bounds cells around `coords`, in no particular order.
    pub fn neighbors_of(&self, coords: Coord2) -> Result<SmallVec<[Cell; 8]>> {
        Ok(self
            .neighbor_coords(coords)?
            .into_iter()
            .map(|pos| self.cells[pos.to_nd_index()])
            .collect())
    }

    pub fn iter_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    pub fn revealed_cells(&self) -> Vec<Cell> {
        self.iter_cells().filter(Cell::is_revealed).collect()
    }

    /// Positions of every mine, empty until mines are placed.
    pub fn mine_cells(&self) -> &[Coord2] {
        &self.mines
    }

    pub fn safe_cells_left(&self) -> CellCount {
        self.safe_left
    }

    pub fn flags_left(&self) -> CellCount {
        self.flags_left
    }

    pub fn has_flags_left(&self) -> bool {
        self.flags_left > 0
    }

    /// Spends one flag from the budget.
    pub fn take_flag(&mut self) {
        self.flags_left = self.flags_left.saturating_sub(1);
    }

    /// Gives one flag back to the budget.
    pub fn return_flag(&mut self) {
        self.flags_left = (self.flags_left + 1).min(self.config.mines);
    }

    /// Mines have not been placed yet.
    pub fn is_first_move(&self) -> bool {
        !self.placed
    }

    /// At least one safe cell has been revealed.
    pub fn has_started(&self) -> bool {
        self.safe_left < self.config.safe_cells()
    }

    pub fn is_won(&self) -> bool {
        self.safe_left == 0 && !self.lost
    }

    pub fn is_lost(&self) -> bool {
        self.lost
    }

    pub fn is_ended(&self) -> bool {
        self.is_won() || self.is_lost()
    }

    /// Reveals a cell and returns every cell that became visible.
    ///
    /// Flagged and already revealed cells are left alone. Revealing a zero cell floods
    /// through its connected zero region and stops at the numbered cells around it.
    pub fn reveal(&mut self, coords: Coord2) -> Result<Vec<Cell>> {
        let coords = self.validate_coords(coords)?;
        self.ensure_placed(coords);

        let cell = &mut self.cells[coords.to_nd_index()];
        if !cell.is_hidden() {
            return Ok(Vec::new());
        }

        if cell.is_mine() {
            cell.reveal();
            let cell = *cell;
            self.lost = true;
            log::debug!("Mine revealed at {:?}", coords);
            return Ok(vec![cell]);
        }

        Ok(self.flood_reveal(coords))
    }

    /// Flips the flag on a hidden cell. The flag budget is left to the caller.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<Cell> {
        let coords = self.validate_coords(coords)?;
        let cell = &mut self.cells[coords.to_nd_index()];
        cell.toggle_flag()?;
        Ok(*cell)
    }

    /// Reveals every mine, removing flags from them first, and returns them.
    pub fn expose_mines(&mut self) -> Vec<Cell> {
        let mut exposed = Vec::with_capacity(self.mines.len());
        for &coords in &self.mines {
            let cell = &mut self.cells[coords.to_nd_index()];
            if cell.clear_flag() {
                self.flags_left = (self.flags_left + 1).min(self.config.mines);
            }
            cell.reveal();
            exposed.push(*cell);
        }
        exposed
    }

    fn ensure_placed(&mut self, origin: Coord2) {
        if self.placed {
            return;
        }

        let size = self.size();
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut placed = 0;
        while placed < self.config.mines {
            let coords = (rng.random_range(0..size.0), rng.random_range(0..size.1));
            if within_one_step(coords, origin) || self.cells[coords.to_nd_index()].is_mine() {
                continue;
            }
            self.plant_mine(coords);
            placed += 1;
        }

        self.placed = true;
        log::debug!(
            "Placed {} mines around start {:?} with seed {}",
            placed,
            origin,
            self.seed
        );
    }

    fn plant_mine(&mut self, coords: Coord2) {
        self.cells[coords.to_nd_index()].make_mine();
        self.mines.push(coords);
        for pos in neighbors(coords, self.size()) {
            self.cells[pos.to_nd_index()].add_adjacent_mine();
        }
    }

    fn flood_reveal(&mut self, origin: Coord2) -> Vec<Cell> {
        let size = self.size();
        let mut changed = Vec::new();
        let mut to_visit = vec![origin];

        while let Some(coords) = to_visit.pop() {
            let cell = &mut self.cells[coords.to_nd_index()];
            if cell.is_mine() || !cell.reveal() {
                continue;
            }
            let cell = *cell;
            self.safe_left = self.safe_left.saturating_sub(1);
            changed.push(cell);
            log::trace!(
                "Revealed {:?}, adjacent mines: {}",
                coords,
                cell.adjacent_mines()
            );

            if !cell.has_adjacent_mine() {
                to_visit.extend(
                    neighbors(coords, size)
                        .filter(|&pos| self.cells[pos.to_nd_index()].is_hidden()),
                );
            }
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 0 0 0 1 *
    // 0 0 1 3 3
    // 0 0 1 * *
    // 1 1 1 3 3
    // * 1 0 1 *
    const OPEN_CORNER: [&str; 5] = ["EEEEB", "EEEEE", "EEEBB", "EEEEE", "BEEEB"];

    // 1 2 2 2 *
    // 1 * * 3 1
    // 1 4 * 3 0
    // 0 2 * 2 0
    // 0 1 1 1 0
    const CROWDED_CENTER: [&str; 5] = ["EEEEB", "EBBEE", "EEBEE", "EEBEE", "EEEEE"];

    fn board_from(rows: &[&str]) -> Board {
        let layout = MineLayout::from_rows(rows).unwrap();
        let config = GameConfig::new(layout.size(), layout.mine_count()).unwrap();
        Board::with_layout(config, &layout).unwrap()
    }

    fn reveal_all_safe(board: &mut Board) {
        let (width, height) = board.size();
        for x in 0..width {
            for y in 0..height {
                if !board.cell_at((x, y)).unwrap().is_mine() {
                    board.reveal((x, y)).unwrap();
                }
            }
        }
    }

    fn assert_counters_consistent(board: &Board) {
        let revealed_safe = board
            .iter_cells()
            .filter(|cell| cell.is_revealed() && !cell.is_mine())
            .count();
        assert_eq!(
            usize::from(board.safe_cells_left()) + revealed_safe,
            usize::from(board.config().safe_cells())
        );
    }

    #[test]
    fn new_board_starts_hidden_with_full_budgets() {
        let board = Board::new(Difficulty::Medium.config(), 7).unwrap();

        assert_eq!(board.size(), (12, 10));
        assert_eq!(board.safe_cells_left(), 100);
        assert_eq!(board.flags_left(), 20);
        assert!(board.is_first_move());
        assert!(!board.has_started());
        assert!(!board.is_won());
        assert!(!board.is_lost());
        assert!(board.mine_cells().is_empty());
        assert!(board.iter_cells().all(|cell| cell.is_hidden() && !cell.is_mine()));
    }

    #[test]
    fn new_board_rejects_invalid_config() {
        let config = GameConfig::new_unchecked((2, 2), 4);
        assert_eq!(Board::new(config, 0), Err(GameError::TooManyMines));
    }

    #[test]
    fn first_reveal_is_never_near_a_mine() {
        for difficulty in Difficulty::PRESETS {
            let config = difficulty.config();
            let (width, height) = config.size;
            let starts = [
                (0, 0),
                (width - 1, 0),
                (0, height - 1),
                (width - 1, height - 1),
                (width / 2, 0),
                (width / 2, height / 2),
            ];

            for seed in 0..16 {
                for &start in &starts {
                    let mut board = Board::new(config, seed).unwrap();
                    board.reveal(start).unwrap();

                    assert!(!board.is_lost());
                    assert!(!board.is_first_move());
                    assert_eq!(board.mine_cells().len(), usize::from(config.mines));
                    assert!(
                        board
                            .mine_cells()
                            .iter()
                            .all(|&mine| !within_one_step(mine, start)),
                        "{difficulty} seed {seed} start {start:?}"
                    );
                    assert_counters_consistent(&board);
                }
            }
        }
    }

    #[test]
    fn placement_counts_adjacent_mines() {
        let mut board = Board::new(Difficulty::Hard.config(), 99).unwrap();
        board.reveal((6, 6)).unwrap();

        let size = board.size();
        for cell in board.iter_cells() {
            let expected = neighbors(cell.coords(), size)
                .filter(|&pos| board.cell_at(pos).unwrap().is_mine())
                .count();
            assert_eq!(usize::from(cell.adjacent_mines()), expected);
        }
        let mine_total = board.iter_cells().filter(Cell::is_mine).count();
        assert_eq!(mine_total, 40);
    }

    #[test]
    fn same_seed_places_same_mines() {
        let config = Difficulty::Easy.config();
        let mut first = Board::new(config, 1234).unwrap();
        let mut second = Board::new(config, 1234).unwrap();

        first.reveal((3, 3)).unwrap();
        second.reveal((3, 3)).unwrap();

        assert_eq!(first.mine_cells(), second.mine_cells());
    }

    #[test]
    fn dense_board_is_rejected_up_front() {
        let dense = GameConfig::new_unchecked((4, 4), 10);
        assert_eq!(Board::new(dense, 3), Err(GameError::TooManyMines));
    }

    #[test]
    fn densest_allowed_board_keeps_start_area_clear() {
        let config = GameConfig::new((4, 4), 7).unwrap();
        for seed in 0..32 {
            for start in [(0, 0), (1, 1), (3, 2)] {
                let mut board = Board::new(config, seed).unwrap();
                board.reveal(start).unwrap();

                assert!(!board.is_lost());
                assert_eq!(board.mine_cells().len(), 7);
                assert!(
                    board
                        .mine_cells()
                        .iter()
                        .all(|&mine| !within_one_step(mine, start)),
                    "seed {seed} start {start:?}"
                );
            }
        }
    }

    #[test]
    fn layout_must_match_configured_mines() {
        let layout = MineLayout::from_rows(&CROWDED_CENTER).unwrap();

        let config = GameConfig::new((5, 5), 4).unwrap();
        assert_eq!(
            Board::with_layout(config, &layout),
            Err(GameError::LayoutMismatch {
                expected: 4,
                actual: 5
            })
        );

        let config = GameConfig::new((5, 4), 5).unwrap();
        assert_eq!(
            Board::with_layout(config, &layout),
            Err(GameError::InvalidBoardShape)
        );
    }

    #[test]
    fn reveal_corner_floods_zero_region() {
        let mut board = board_from(&OPEN_CORNER);

        let changed = board.reveal((0, 0)).unwrap();

        assert_eq!(changed.len(), 14);
        assert_eq!(board.safe_cells_left(), 6);
        assert!(!board.is_won());
        assert!(!board.is_lost());
        for coords in [(3, 0), (2, 1), (3, 1), (2, 2), (0, 3), (1, 3), (2, 3)] {
            let cell = board.cell_at(coords).unwrap();
            assert!(cell.is_revealed(), "{coords:?}");
            assert!(cell.has_adjacent_mine(), "{coords:?}");
        }
        for coords in [(4, 1), (3, 3), (4, 3), (1, 4), (2, 4), (3, 4)] {
            assert!(board.cell_at(coords).unwrap().is_hidden(), "{coords:?}");
        }
        assert_counters_consistent(&board);
    }

    #[test]
    fn flood_fill_does_not_open_flags() {
        let mut board = board_from(&OPEN_CORNER);
        board.toggle_flag((0, 2)).unwrap();

        let changed = board.reveal((0, 0)).unwrap();

        assert_eq!(changed.len(), 13);
        assert!(board.cell_at((0, 2)).unwrap().is_flagged());
        assert!(board.cell_at((0, 3)).unwrap().is_revealed());
        assert_counters_consistent(&board);
    }

    #[test]
    fn numbered_cell_reveals_alone() {
        let mut board = board_from(&CROWDED_CENTER);

        let changed = board.reveal((0, 0)).unwrap();

        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].coords(), (0, 0));
        assert_eq!(changed[0].adjacent_mines(), 1);
        assert!(board.has_started());
    }

    #[test]
    fn flagged_cell_is_protected_from_reveal() {
        let mut board = board_from(&OPEN_CORNER);
        board.toggle_flag((4, 4)).unwrap();

        assert!(board.reveal((4, 4)).unwrap().is_empty());
        let cell = board.cell_at((4, 4)).unwrap();
        assert!(cell.is_flagged());
        assert!(!cell.is_revealed());
        assert!(!board.is_lost());
    }

    #[test]
    fn revealing_twice_changes_nothing() {
        let mut board = board_from(&OPEN_CORNER);
        board.reveal((0, 0)).unwrap();

        assert!(board.reveal((0, 0)).unwrap().is_empty());
        assert!(board.reveal((3, 1)).unwrap().is_empty());
        assert_eq!(board.safe_cells_left(), 6);
    }

    #[test]
    fn revealing_mine_loses() {
        let mut board = board_from(&CROWDED_CENTER);
        board.reveal((0, 0)).unwrap();

        let changed = board.reveal((4, 0)).unwrap();

        assert_eq!(changed.len(), 1);
        assert!(changed[0].is_mine() && changed[0].is_revealed());
        assert!(board.is_lost());
        assert!(board.is_ended());
        assert!(!board.is_won());

        reveal_all_safe(&mut board);
        assert_eq!(board.safe_cells_left(), 0);
        assert!(!board.is_won());
        assert_counters_consistent(&board);
    }

    #[test]
    fn revealing_every_safe_cell_wins() {
        let mut board = board_from(&CROWDED_CENTER);

        reveal_all_safe(&mut board);

        assert_eq!(board.safe_cells_left(), 0);
        assert!(board.is_won());
        assert!(!board.is_lost());
        assert!(board.is_ended());
    }

    #[test]
    fn cannot_flag_revealed_cell() {
        let mut board = board_from(&OPEN_CORNER);
        board.reveal((0, 0)).unwrap();

        assert_eq!(
            board.toggle_flag((1, 1)),
            Err(GameError::RevealedCell((1, 1)))
        );
        assert!(board.cell_at((1, 1)).unwrap().is_revealed());
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let mut board = board_from(&OPEN_CORNER);

        assert_eq!(board.reveal((5, 0)), Err(GameError::InvalidCoords((5, 0))));
        assert_eq!(board.toggle_flag((0, 9)), Err(GameError::InvalidCoords((0, 9))));
        assert_eq!(board.cell_at((7, 7)), Err(GameError::InvalidCoords((7, 7))));
        assert!(board.neighbors_of((5, 5)).is_err());
    }

    #[test]
    fn neighbors_of_clips_to_board() {
        let board = board_from(&OPEN_CORNER);

        assert_eq!(board.neighbors_of((0, 0)).unwrap().len(), 3);
        assert_eq!(board.neighbors_of((2, 4)).unwrap().len(), 5);
        let around_center = board.neighbors_of((2, 2)).unwrap();
        assert_eq!(around_center.len(), 8);
        assert_eq!(around_center.iter().filter(|cell| cell.is_mine()).count(), 1);

        let corner = board.neighbor_coords((4, 0)).unwrap();
        assert_eq!(corner.as_slice(), [(3, 0), (3, 1), (4, 1)]);
        assert!(board.neighbor_coords((0, 5)).is_err());
    }

    #[test]
    fn flag_budget_hooks_stay_in_range() {
        let mut board = board_from(&OPEN_CORNER);

        board.return_flag();
        assert_eq!(board.flags_left(), 5);
        for _ in 0..7 {
            board.take_flag();
        }
        assert_eq!(board.flags_left(), 0);
        assert!(!board.has_flags_left());
    }

    #[test]
    fn expose_mines_clears_flags_and_reveals() {
        let mut board = board_from(&OPEN_CORNER);
        board.toggle_flag((4, 0)).unwrap();
        board.take_flag();

        let exposed = board.expose_mines();

        assert_eq!(exposed.len(), 5);
        assert!(exposed.iter().all(|cell| cell.is_mine() && cell.is_revealed()));
        assert!(board.iter_cells().all(|cell| !(cell.is_flagged() && cell.is_revealed())));
        assert_eq!(board.flags_left(), 5);
    }
}
