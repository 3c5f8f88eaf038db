use std::ops::{Index, IndexMut};

use crate::Coordinate;

/// Represents errors that can occur within the grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Coordinates ({x}, {y}) are out of bounds for grid size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    #[error("Grid size ({width}, {height}) cannot be allocated")]
    TooLarge { width: usize, height: usize },
}

/// A dense per-cell store over a `width` x `height` grid.
///
/// Stores elements of type `T` in a flat vector using row-major order. The
/// generator uses it for visited and connected marks, where a lookup is a
/// single index computation instead of a hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a new grid with the specified dimensions, filled with default values.
    ///
    /// Returns `Err(GridError::TooLarge)` if `width * height` overflows `usize`
    /// or the cells cannot be reserved.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError>
    where
        T: Default + Clone,
    {
        let too_large = GridError::TooLarge { width, height };
        let size = width.checked_mul(height).ok_or(too_large.clone())?;
        let mut cells = Vec::new();
        cells.try_reserve_exact(size).map_err(|_| too_large)?;
        cells.resize(size, T::default());
        Ok(Grid {
            width,
            height,
            cells,
        })
    }

    /// Converts a coordinate to a flat vector index.
    ///
    /// Returns `None` if the coordinate is out of bounds.
    #[inline]
    pub fn coords_to_index(&self, c: Coordinate) -> Option<usize> {
        self.contains(c).then(|| c.y * self.width + c.x)
    }

    /// Checks if the given coordinate is within the grid boundaries.
    #[inline]
    pub fn contains(&self, c: Coordinate) -> bool {
        c.x < self.width && c.y < self.height
    }

    /// Gets an immutable reference to the cell at the given coordinate.
    pub fn get(&self, c: Coordinate) -> Option<&T> {
        self.cells.get(self.coords_to_index(c)?)
    }

    /// Gets a mutable reference to the cell at the given coordinate.
    pub fn get_mut(&mut self, c: Coordinate) -> Option<&mut T> {
        let index = self.coords_to_index(c)?;
        self.cells.get_mut(index)
    }

    /// Sets the value of the cell at the given coordinate.
    ///
    /// Returns `Err(GridError::OutOfBounds)` if the coordinate is invalid.
    pub fn set(&mut self, c: Coordinate, value: T) -> Result<(), GridError> {
        let index = self.coords_to_index(c).ok_or(GridError::OutOfBounds {
            x: c.x,
            y: c.y,
            width: self.width,
            height: self.height,
        })?;
        self.cells[index] = value;
        Ok(())
    }

    /// Returns an iterator that yields `(Coordinate, &T)` for each cell in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Coordinate, &T)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (Coordinate::new(index % width, index / width), cell))
    }
}

impl Grid<bool> {
    /// Number of cells currently marked.
    pub fn count_marked(&self) -> usize {
        self.cells.iter().filter(|&&marked| marked).count()
    }
}

impl<T> Index<Coordinate> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, c: Coordinate) -> &Self::Output {
        match self.coords_to_index(c) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                c.x, c.y, self.width, self.height
            ),
        }
    }
}

impl<T> IndexMut<Coordinate> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, c: Coordinate) -> &mut Self::Output {
        let (width, height) = (self.width, self.height);
        match self.coords_to_index(c) {
            Some(idx) => &mut self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                c.x, c.y, width, height
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_layout() {
        let grid: Grid<bool> = Grid::new(3, 2).unwrap();
        assert_eq!(grid.coords_to_index(Coordinate::new(2, 1)), Some(5));
        assert_eq!(grid.coords_to_index(Coordinate::new(3, 0)), None);
        let order: Vec<Coordinate> = grid.enumerate().map(|(c, _)| c).collect();
        assert_eq!(order[1], Coordinate::new(1, 0));
        assert_eq!(order[3], Coordinate::new(0, 1));
    }

    #[test]
    fn set_out_of_bounds() {
        let mut grid: Grid<bool> = Grid::new(2, 2).unwrap();
        assert_eq!(
            grid.set(Coordinate::new(2, 0), true),
            Err(GridError::OutOfBounds {
                x: 2,
                y: 0,
                width: 2,
                height: 2
            })
        );
        grid.set(Coordinate::new(1, 1), true).unwrap();
        assert!(grid[Coordinate::new(1, 1)]);
        assert_eq!(grid.count_marked(), 1);
        *grid.get_mut(Coordinate::new(0, 0)).unwrap() = true;
        assert_eq!(grid.get(Coordinate::new(0, 0)), Some(&true));
        assert_eq!(grid.count_marked(), 2);
    }

    #[test]
    fn oversized_grid_is_an_error() {
        assert_eq!(
            Grid::<bool>::new(usize::MAX, 2),
            Err(GridError::TooLarge {
                width: usize::MAX,
                height: 2
            })
        );
        // Fits in `usize` but not in an allocation.
        assert!(Grid::<bool>::new(isize::MAX as usize + 1, 1).is_err());
    }
}
