use rand::Rng;
use rand_distr::{Beta, Distribution};

use crate::{Coordinate, geometry::manhattan};

/// Rooms on the shortest possible route between `start` and `exit`,
/// counting the start room itself.
pub fn minimum_length(start: Coordinate, exit: Coordinate) -> usize {
    manhattan(start, exit) + 1
}

/// Draws a main-path length between the shortest route and the cell count.
///
/// The draw follows Beta(2, 2) mapped linearly onto `[min, width * height]`,
/// which favours mid-range lengths over both the trivial shortest path and a
/// path snaking through every cell.
pub fn target_length<R: Rng + ?Sized>(
    rng: &mut R,
    start: Coordinate,
    exit: Coordinate,
    width: usize,
    height: usize,
) -> usize {
    let min = minimum_length(start, exit);
    let max = width.saturating_mul(height);
    if min >= max {
        return min;
    }

    // Beta(2, 2) has valid shape parameters, so this never falls back.
    let sample = Beta::new(2.0, 2.0).map_or(0.5, |beta| beta.sample(rng));
    let target = (min as f64 + sample * (max - min) as f64) as usize;
    let target = target.clamp(min, max);
    log::debug!("target path length {target} in [{min}, {max}]");
    target
}
