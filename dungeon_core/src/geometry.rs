//! Pure helpers over grid bounds. Inputs are assumed in-bounds.

use crate::{Coordinate, Direction};

/// The in-bounds cardinal neighbours of `c`, in north, south, east, west order.
pub fn neighbors(c: Coordinate, width: usize, height: usize) -> Vec<Coordinate> {
    Direction::ALL
        .iter()
        .filter_map(|&d| c.step(d, width, height))
        .collect()
}

/// The direction leading from `from` to `to`, or `None` when the two cells
/// are not adjacent. `None` only means "no edge".
pub fn direction(from: Coordinate, to: Coordinate) -> Option<Direction> {
    let dx = to.x as isize - from.x as isize;
    let dy = to.y as isize - from.y as isize;
    match (dx, dy) {
        (0, -1) => Some(Direction::North),
        (0, 1) => Some(Direction::South),
        (1, 0) => Some(Direction::East),
        (-1, 0) => Some(Direction::West),
        _ => None,
    }
}

/// Returns manhattan distance between two coordinates.
pub fn manhattan(a: Coordinate, b: Coordinate) -> usize {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

/// Every cell of the grid, column by column (x outer, y inner).
pub fn cells(width: usize, height: usize) -> impl Iterator<Item = Coordinate> {
    (0..width).flat_map(move |x| (0..height).map(move |y| Coordinate::new(x, y)))
}
