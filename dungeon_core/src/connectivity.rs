use std::collections::BTreeMap;

use crate::{
    Coordinate,
    dungeon::Room,
    geometry::{self, direction, neighbors},
    map::{Grid, GridError},
};

/// Upper bound on the edges a filler room opens towards already-connected
/// rooms. Keeps the graph sparse; some adjacent pairs are left unlinked.
pub const MAX_FILL_LINKS: usize = 2;

/// Builds the full room map: the main path as a chain of rooms, then every
/// remaining cell attached to the growing connected component.
///
/// Every edge is written in both directions. `path` must be a simple path of
/// cardinal steps inside the `width` x `height` grid.
pub fn fill(
    path: &[Coordinate],
    width: usize,
    height: usize,
) -> Result<BTreeMap<Coordinate, Room>, GridError> {
    let mut rooms = BTreeMap::new();
    let mut connected: Grid<bool> = Grid::new(width, height)?;

    for (i, &coords) in path.iter().enumerate() {
        let mut room = Room::new(format!("main_path_{}", i + 1), coords);
        let prev = i.checked_sub(1).and_then(|p| path.get(p));
        for &other in prev.into_iter().chain(path.get(i + 1)) {
            if let Some(d) = direction(coords, other) {
                room.connections.insert(d, other);
            }
        }
        if let Some(cell) = connected.get_mut(coords) {
            *cell = true;
        }
        rooms.insert(coords, room);
    }

    let mut pending: Vec<Coordinate> = geometry::cells(width, height)
        .filter(|&c| !connected[c])
        .collect();
    let mut added = 0;

    // Each productive pass connects at least one cell.
    let max_passes = pending.len();
    for _ in 0..max_passes {
        let mut progressed = false;
        for &coords in &pending {
            let links: Vec<Coordinate> = neighbors(coords, width, height)
                .into_iter()
                .filter(|&n| connected[n])
                .take(MAX_FILL_LINKS)
                .collect();
            if links.is_empty() {
                continue;
            }

            added += 1;
            let mut room = Room::new(format!("additional_{added}"), coords);
            for neighbor in links {
                let Some(d) = direction(coords, neighbor) else {
                    continue;
                };
                room.connections.insert(d, neighbor);
                if let Some(existing) = rooms.get_mut(&neighbor) {
                    existing.connections.insert(d.opposite(), coords);
                }
            }
            rooms.insert(coords, room);
            connected[coords] = true;
            progressed = true;
        }
        pending.retain(|&c| !connected[c]);
        if !progressed || pending.is_empty() {
            break;
        }
    }

    if !pending.is_empty() {
        log::warn!("{} cells left unconnected: {pending:?}", pending.len());
    }
    log::debug!(
        "{} of {} cells connected ({} on main path, {added} attached)",
        connected.count_marked(),
        width * height,
        path.len()
    );
    Ok(rooms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, dungeon::Level, main_path::direct_path};

    fn level_from(path: &[Coordinate], width: usize, height: usize) -> Level {
        Level {
            id: 1,
            width,
            height,
            start_coords: path[0],
            exit_coords: path[path.len() - 1],
            rooms: fill(path, width, height).unwrap(),
        }
    }

    #[test]
    fn corridor_needs_no_filling() {
        let path = [
            Coordinate::new(0, 0),
            Coordinate::new(1, 0),
            Coordinate::new(2, 0),
        ];
        let rooms = fill(&path, 3, 1).unwrap();
        assert_eq!(rooms.len(), 3);
        assert_eq!(rooms[&path[0]].id, "main_path_1");
        assert_eq!(
            rooms[&path[1]].connections,
            BTreeMap::from([(Direction::West, path[0]), (Direction::East, path[2])])
        );
        assert_eq!(rooms[&path[2]].connections.len(), 1);
    }

    #[test]
    fn every_cell_joins_one_component() {
        for (width, height) in [(3, 3), (5, 4), (1, 6), (6, 2)] {
            let path = direct_path(
                Coordinate::new(0, 0),
                Coordinate::new(width - 1, height - 1),
            );
            let level = level_from(&path, width, height);
            assert_eq!(level.rooms.len(), width * height);
            assert_eq!(level.validate(), Ok(()), "{width}x{height}");
        }
    }

    #[test]
    fn filler_rooms_open_at_most_two_links() {
        // A ring around a 3x3 grid; the centre sees all four ring cells.
        let ring = [(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (1, 2), (0, 2), (0, 1)]
            .map(|(x, y)| Coordinate::new(x, y));
        let rooms = fill(&ring, 3, 3).unwrap();
        assert_eq!(rooms.len(), 9);

        let centre = &rooms[&Coordinate::new(1, 1)];
        assert_eq!(centre.id, "additional_1");
        assert_eq!(
            centre.connections,
            BTreeMap::from([
                (Direction::North, Coordinate::new(1, 0)),
                (Direction::South, Coordinate::new(1, 2)),
            ])
        );
        assert_eq!(
            rooms[&Coordinate::new(1, 0)].neighbor(Direction::South),
            Some(centre.coordinates)
        );
        assert_eq!(rooms[&Coordinate::new(0, 1)].neighbor(Direction::East), None);
        assert_eq!(rooms[&Coordinate::new(2, 1)].neighbor(Direction::West), None);
    }

    #[test]
    fn oversized_grid_is_an_error() {
        let path = [Coordinate::new(0, 0), Coordinate::new(1, 0)];
        assert!(fill(&path, usize::MAX, 2).is_err());
    }

    #[test]
    fn reverse_edges_are_retrofitted() {
        let path = [Coordinate::new(0, 0), Coordinate::new(1, 0)];
        let rooms = fill(&path, 2, 2).unwrap();
        // (0, 1) attaches north to (0, 0); (1, 1) then sees (1, 0) and (0, 1).
        assert_eq!(
            rooms[&Coordinate::new(0, 0)].neighbor(Direction::South),
            Some(Coordinate::new(0, 1))
        );
        let last = &rooms[&Coordinate::new(1, 1)];
        assert_eq!(last.connections.len(), 2);
        assert_eq!(
            rooms[&Coordinate::new(0, 1)].neighbor(Direction::East),
            Some(Coordinate::new(1, 1))
        );
    }
}
