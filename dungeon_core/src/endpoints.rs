use rand::Rng;

use crate::{Coordinate, generator::GenerationError};

/// Picks distinct start and exit cells, each uniformly over the grid.
///
/// The exit is redrawn until it differs from the start. Grids with fewer than
/// two cells have no valid pair and are rejected up front rather than looping.
pub fn select<R: Rng + ?Sized>(
    rng: &mut R,
    width: usize,
    height: usize,
) -> Result<(Coordinate, Coordinate), GenerationError> {
    match width.checked_mul(height) {
        None => return Err(GenerationError::GridTooLarge { width, height }),
        Some(cells) if cells < 2 => return Err(GenerationError::GridTooSmall { width, height }),
        Some(_) => {}
    }

    let draw = |rng: &mut R| {
        Coordinate::new(rng.random_range(0..width), rng.random_range(0..height))
    };

    let start = draw(rng);
    let mut exit = draw(rng);
    while exit == start {
        exit = draw(rng);
    }
    log::debug!("endpoints: start {start}, exit {exit}");
    Ok((start, exit))
}
