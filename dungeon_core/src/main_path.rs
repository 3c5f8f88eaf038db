use rand::{
    Rng,
    seq::{IndexedRandom, SliceRandom},
};

use crate::{Coordinate, geometry::neighbors, map::Grid};

/// Bounds on the randomized main-path search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Stop once this many candidate paths have been discovered.
    pub path_cap: usize,
    /// Partial paths longer than `target + length_slack` are abandoned.
    pub length_slack: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            path_cap: 50,
            length_slack: 5,
        }
    }
}

/// How closely the chosen main path honours the requested length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathQuality {
    /// Exactly `target` rooms long.
    Exact,
    /// No candidate matched; the longest candidate was used.
    Closest,
    /// The search found nothing and the direct path was used.
    Direct,
}

/// A simple start-to-exit path chosen as the dungeon's main route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainPath {
    pub rooms: Vec<Coordinate>,
    pub quality: PathQuality,
}

/// Finds a simple path from `start` to `exit` whose room count is `target`,
/// or the best approximation the bounded search discovers.
///
/// Never fails: when the search yields no candidate at all, or the grid is
/// too large to track, the direct x-then-y path is returned instead.
pub fn find_path<R: Rng + ?Sized>(
    rng: &mut R,
    start: Coordinate,
    exit: Coordinate,
    width: usize,
    height: usize,
    target: usize,
    limits: SearchLimits,
) -> MainPath {
    let visited = match Grid::new(width, height) {
        Ok(visited) => visited,
        Err(e) => {
            log::warn!("{e}, falling back to direct path");
            return MainPath {
                rooms: direct_path(start, exit),
                quality: PathQuality::Direct,
            };
        }
    };
    let mut search = Search {
        exit,
        width,
        height,
        max_len: target.saturating_add(limits.length_slack),
        cap: limits.path_cap,
        visited,
        found: Vec::new(),
    };
    let mut path = vec![start];
    if let Some(cell) = search.visited.get_mut(start) {
        *cell = true;
    }
    search.collect(rng, &mut path);
    let candidates = search.found;
    log::debug!(
        "main path search from {start} to {exit}: {} candidates for target {target}",
        candidates.len()
    );

    let exact: Vec<&Vec<Coordinate>> = candidates.iter().filter(|p| p.len() == target).collect();
    if let Some(&chosen) = exact.choose(rng) {
        return MainPath {
            rooms: chosen.clone(),
            quality: PathQuality::Exact,
        };
    }

    // First discovered wins among equally long candidates.
    let longest = candidates
        .into_iter()
        .reduce(|best, p| if p.len() > best.len() { p } else { best });
    match longest {
        Some(rooms) => {
            log::warn!(
                "no main path of length {target} found, using closest of length {}",
                rooms.len()
            );
            MainPath {
                rooms,
                quality: PathQuality::Closest,
            }
        }
        None => {
            log::warn!("main path search found nothing, falling back to direct path");
            MainPath {
                rooms: direct_path(start, exit),
                quality: PathQuality::Direct,
            }
        }
    }
}

/// Walks along x towards `exit`, then along y.
pub fn direct_path(start: Coordinate, exit: Coordinate) -> Vec<Coordinate> {
    let mut path = vec![start];
    let mut current = start;
    while current.x != exit.x {
        current.x = if current.x < exit.x {
            current.x + 1
        } else {
            current.x - 1
        };
        path.push(current);
    }
    while current.y != exit.y {
        current.y = if current.y < exit.y {
            current.y + 1
        } else {
            current.y - 1
        };
        path.push(current);
    }
    path
}

/// State of one depth-first enumeration of simple paths.
struct Search {
    exit: Coordinate,
    width: usize,
    height: usize,
    max_len: usize,
    cap: usize,
    visited: Grid<bool>,
    found: Vec<Vec<Coordinate>>,
}

impl Search {
    /// Extends `path` (whose last cell is the current position) in every
    /// unvisited direction, in shuffled order, backtracking afterwards.
    fn collect<R: Rng + ?Sized>(&mut self, rng: &mut R, path: &mut Vec<Coordinate>) {
        if self.found.len() >= self.cap {
            return;
        }
        let Some(&current) = path.last() else {
            return;
        };
        if current == self.exit {
            self.found.push(path.clone());
            return;
        }
        if path.len() > self.max_len {
            return;
        }

        let mut next = neighbors(current, self.width, self.height);
        next.shuffle(rng);
        for n in next {
            if self.visited[n] {
                continue;
            }
            self.visited[n] = true;
            path.push(n);
            self.collect(rng, path);
            path.pop();
            self.visited[n] = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::geometry::manhattan;

    fn assert_simple_path(path: &[Coordinate], start: Coordinate, exit: Coordinate) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&exit));
        for pair in path.windows(2) {
            assert_eq!(manhattan(pair[0], pair[1]), 1, "non-cardinal step {pair:?}");
        }
        let mut sorted = path.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), path.len(), "path revisits a cell");
    }

    #[test]
    fn single_row_has_one_path() {
        let mut rng = StdRng::seed_from_u64(3);
        let start = Coordinate::new(0, 0);
        let exit = Coordinate::new(2, 0);
        let path = find_path(&mut rng, start, exit, 3, 1, 3, SearchLimits::default());
        assert_eq!(
            path.rooms,
            vec![start, Coordinate::new(1, 0), Coordinate::new(2, 0)]
        );
        assert_eq!(path.quality, PathQuality::Exact);
    }

    #[test]
    fn exact_target_is_preferred() {
        let mut rng = StdRng::seed_from_u64(11);
        let start = Coordinate::new(0, 0);
        let exit = Coordinate::new(2, 2);
        for target in [5, 7, 9] {
            let path = find_path(&mut rng, start, exit, 3, 3, target, SearchLimits::default());
            assert_simple_path(&path.rooms, start, exit);
            assert_eq!(path.rooms.len(), target);
            assert_eq!(path.quality, PathQuality::Exact);
        }
    }

    #[test]
    fn unreachable_target_takes_longest_candidate() {
        let mut rng = StdRng::seed_from_u64(5);
        let start = Coordinate::new(0, 0);
        let exit = Coordinate::new(1, 0);
        // Two adjacent cells on a 2x2 grid: only lengths 2 and 4 exist.
        let path = find_path(&mut rng, start, exit, 2, 2, 3, SearchLimits::default());
        assert_simple_path(&path.rooms, start, exit);
        assert_eq!(path.rooms.len(), 4);
        assert_eq!(path.quality, PathQuality::Closest);
    }

    #[test]
    fn zero_cap_falls_back_to_direct_path() {
        let mut rng = StdRng::seed_from_u64(0);
        let start = Coordinate::new(3, 0);
        let exit = Coordinate::new(0, 2);
        let limits = SearchLimits {
            path_cap: 0,
            length_slack: 5,
        };
        let path = find_path(&mut rng, start, exit, 4, 3, 8, limits);
        assert_eq!(path.quality, PathQuality::Direct);
        assert_eq!(path.rooms, direct_path(start, exit));
        assert_eq!(path.rooms.len(), 6);
    }

    #[test]
    fn unbounded_slack_does_not_overflow() {
        let mut rng = StdRng::seed_from_u64(2);
        let start = Coordinate::new(0, 0);
        let exit = Coordinate::new(1, 1);
        let limits = SearchLimits {
            path_cap: 50,
            length_slack: usize::MAX,
        };
        let path = find_path(&mut rng, start, exit, 2, 2, 3, limits);
        assert_simple_path(&path.rooms, start, exit);
        assert_eq!(path.quality, PathQuality::Exact);
    }

    #[test]
    fn direct_path_goes_x_then_y() {
        let path = direct_path(Coordinate::new(0, 2), Coordinate::new(2, 0));
        assert_eq!(
            path,
            vec![
                Coordinate::new(0, 2),
                Coordinate::new(1, 2),
                Coordinate::new(2, 2),
                Coordinate::new(2, 1),
                Coordinate::new(2, 0),
            ]
        );
    }

    #[test]
    fn paths_are_simple_across_seeds() {
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let start = Coordinate::new(0, (seed % 4) as usize);
            let exit = Coordinate::new(4, 3 - (seed % 4) as usize);
            let path = find_path(&mut rng, start, exit, 5, 4, 12, SearchLimits::default());
            assert_simple_path(&path.rooms, start, exit);
        }
    }
}
