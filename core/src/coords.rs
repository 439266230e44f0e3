use smallvec::SmallVec;

/// Single axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for mines, flags, and cell totals.
pub type CellCount = u16;

/// Board position `(column, row)`, with the origin in the top-left corner.
pub type Coord2 = (Coord, Coord);

/// The at most eight positions around a cell, stored inline.
pub type Neighbors = SmallVec<[Coord2; 8]>;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

/// Number of cells on a `size` board.
pub const fn area(size: Coord2) -> CellCount {
    (size.0 as CellCount).saturating_mul(size.1 as CellCount)
}

pub const fn in_bounds(coords: Coord2, size: Coord2) -> bool {
    coords.0 < size.0 && coords.1 < size.1
}

/// Whether `a` and `b` are the same cell or touch, diagonals included.
pub const fn within_one_step(a: Coord2, b: Coord2) -> bool {
    a.0.abs_diff(b.0) <= 1 && a.1.abs_diff(b.1) <= 1
}

/// Iterates the in-bounds cells around `center`: 3 in a corner, 5 on an edge, 8 elsewhere.
pub fn neighbors(center: Coord2, bounds: Coord2) -> NeighborIter {
    NeighborIter {
        center,
        bounds,
        step: 0,
    }
}

/// Walks the 3x3 block around a center cell row by row, skipping the center and anything
/// that falls off the board.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    step: u8,
}

/// Moves `value` by `delta - 1`, where `delta` is 0, 1 or 2.
fn shift(value: Coord, delta: u8) -> Option<Coord> {
    match delta {
        0 => value.checked_sub(1),
        1 => Some(value),
        _ => value.checked_add(1),
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        while self.step < 9 {
            let step = self.step;
            self.step += 1;

            // center of the block
            if step == 4 {
                continue;
            }

            let (Some(x), Some(y)) = (
                shift(self.center.0, step % 3),
                shift(self.center.1, step / 3),
            ) else {
                continue;
            };
            if in_bounds((x, y), self.bounds) {
                return Some((x, y));
            }
        }
        None
    }
}
