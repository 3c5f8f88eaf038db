use std::collections::{BTreeMap, HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::{
    Coordinate, Direction, geometry,
    map::{Grid, GridError},
};

/// Identifier of a level within a [`Dungeon`].
pub type LevelId = u32;

/// A generated room occupying one cell, with its cardinal connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Diagnostic label such as `main_path_3`; carries no meaning.
    pub id: String,
    pub coordinates: Coordinate,
    pub connections: BTreeMap<Direction, Coordinate>,
}

impl Room {
    pub fn new(id: impl Into<String>, coordinates: Coordinate) -> Self {
        Room {
            id: id.into(),
            coordinates,
            connections: BTreeMap::new(),
        }
    }

    /// The coordinate reached by leaving through `direction`, if connected.
    pub fn neighbor(&self, direction: Direction) -> Option<Coordinate> {
        self.connections.get(&direction).copied()
    }
}

/// A single rectangular level: every cell holds exactly one room and the
/// rooms form one connected component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub width: usize,
    pub height: usize,
    pub start_coords: Coordinate,
    pub exit_coords: Coordinate,
    /// Keyed by coordinate; written out keyed by the `"x,y"` string form.
    #[serde(with = "room_keys")]
    pub rooms: BTreeMap<Coordinate, Room>,
}

/// A container of levels plus the level currently in play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dungeon {
    pub total_levels: usize,
    pub current_level: LevelId,
    pub levels: BTreeMap<LevelId, Level>,
}

/// A broken structural invariant in a [`Level`] or [`Dungeon`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("room stored under {key} reports coordinates {room}")]
    KeyMismatch { key: Coordinate, room: Coordinate },
    #[error("room {0} lies outside the level")]
    OutOfBounds(Coordinate),
    #[error("no room at endpoint {0}")]
    MissingEndpoint(Coordinate),
    #[error("start and exit are both {0}")]
    StartIsExit(Coordinate),
    #[error("{from} connects {direction} to {to}, which has no room")]
    DanglingEdge {
        from: Coordinate,
        direction: Direction,
        to: Coordinate,
    },
    #[error("{from} connects {direction} to non-adjacent {to}")]
    NotAdjacent {
        from: Coordinate,
        direction: Direction,
        to: Coordinate,
    },
    #[error("{from} connects {direction} to {to}, but not back")]
    MissingReverse {
        from: Coordinate,
        direction: Direction,
        to: Coordinate,
    },
    #[error("cell {0} has no room")]
    MissingCell(Coordinate),
    #[error("room {0} is unreachable from the start")]
    Unreachable(Coordinate),
    #[error("a {width}x{height} level cannot hold its {rooms} rooms one per cell")]
    BadDimensions {
        width: usize,
        height: usize,
        rooms: usize,
    },
    #[error("active level {0} does not exist")]
    MissingActiveLevel(LevelId),
}

/// Packages a generated room map as the single, active level of a new dungeon.
pub fn assemble(
    width: usize,
    height: usize,
    start: Coordinate,
    exit: Coordinate,
    rooms: BTreeMap<Coordinate, Room>,
) -> Dungeon {
    let level = Level {
        id: 1,
        width,
        height,
        start_coords: start,
        exit_coords: exit,
        rooms,
    };
    Dungeon {
        total_levels: 1,
        current_level: level.id,
        levels: BTreeMap::from([(level.id, level)]),
    }
}

impl Level {
    pub fn room(&self, c: Coordinate) -> Option<&Room> {
        self.rooms.get(&c)
    }

    /// Marks every cell reachable from `from` by following connections.
    pub fn reachable_from(&self, from: Coordinate) -> Result<Grid<bool>, GridError> {
        let mut visited = Grid::new(self.width, self.height)?;
        let mut queue = VecDeque::new();
        if visited.set(from, true).is_ok() {
            queue.push_back(from);
        }
        while let Some(current) = queue.pop_front() {
            let Some(room) = self.rooms.get(&current) else {
                continue;
            };
            for &next in room.connections.values() {
                if let Some(seen) = visited.get_mut(next) {
                    if !*seen {
                        *seen = true;
                        queue.push_back(next);
                    }
                }
            }
        }
        Ok(visited)
    }

    /// Breadth-first route from `from` to `to` along connections, both ends included.
    pub fn shortest_route(&self, from: Coordinate, to: Coordinate) -> Option<Vec<Coordinate>> {
        let mut came_from: HashMap<Coordinate, Coordinate> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        let mut reached = from == to;
        while let Some(current) = queue.pop_front() {
            if current == to {
                reached = true;
                break;
            }
            let Some(room) = self.rooms.get(&current) else {
                continue;
            };
            for &next in room.connections.values() {
                if next != from && !came_from.contains_key(&next) {
                    came_from.insert(next, current);
                    queue.push_back(next);
                }
            }
        }
        if !reached {
            return None;
        }

        // Reconstruct path
        let mut route = vec![to];
        let mut current = to;
        while current != from {
            current = *came_from.get(&current)?;
            route.push(current);
        }
        route.reverse();
        Some(route)
    }

    /// Checks every structural invariant, reporting all violations found.
    ///
    /// Dimensions are checked against the room count first; a level with more
    /// cells than rooms is rejected before any per-cell work.
    pub fn validate(&self) -> Result<(), Vec<Violation>> {
        let bad_dimensions = Violation::BadDimensions {
            width: self.width,
            height: self.height,
            rooms: self.rooms.len(),
        };
        match self.width.checked_mul(self.height) {
            Some(cells) if cells > 0 && cells <= self.rooms.len() => {}
            _ => return Err(vec![bad_dimensions]),
        }

        let mut violations = Vec::new();
        let in_bounds = |c: Coordinate| c.x < self.width && c.y < self.height;

        if self.start_coords == self.exit_coords {
            violations.push(Violation::StartIsExit(self.start_coords));
        }
        for endpoint in [self.start_coords, self.exit_coords] {
            if !self.rooms.contains_key(&endpoint) {
                violations.push(Violation::MissingEndpoint(endpoint));
            }
        }

        for (&key, room) in &self.rooms {
            if key != room.coordinates {
                violations.push(Violation::KeyMismatch {
                    key,
                    room: room.coordinates,
                });
            }
            if !in_bounds(key) {
                violations.push(Violation::OutOfBounds(key));
            }
            for (&direction, &to) in &room.connections {
                if geometry::direction(key, to) != Some(direction) {
                    violations.push(Violation::NotAdjacent {
                        from: key,
                        direction,
                        to,
                    });
                }
                match self.rooms.get(&to) {
                    None => violations.push(Violation::DanglingEdge {
                        from: key,
                        direction,
                        to,
                    }),
                    Some(target) if target.neighbor(direction.opposite()) != Some(key) => {
                        violations.push(Violation::MissingReverse {
                            from: key,
                            direction,
                            to,
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        match self.reachable_from(self.start_coords) {
            Ok(reached) => {
                for (cell, &seen) in reached.enumerate() {
                    if !self.rooms.contains_key(&cell) {
                        violations.push(Violation::MissingCell(cell));
                    } else if !seen {
                        violations.push(Violation::Unreachable(cell));
                    }
                }
            }
            Err(_) => violations.push(bad_dimensions),
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

impl Dungeon {
    pub fn level(&self, id: LevelId) -> Option<&Level> {
        self.levels.get(&id)
    }

    /// The level currently in play.
    pub fn active_level(&self) -> Option<&Level> {
        self.levels.get(&self.current_level)
    }

    /// Validates every level and that the active level exists.
    pub fn validate(&self) -> Result<(), Vec<Violation>> {
        let mut violations = Vec::new();
        if !self.levels.contains_key(&self.current_level) {
            violations.push(Violation::MissingActiveLevel(self.current_level));
        }
        for level in self.levels.values() {
            if let Err(found) = level.validate() {
                violations.extend(found);
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Room maps keyed by coordinate, written as objects keyed by `"x,y"`.
mod room_keys {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    use super::Room;
    use crate::Coordinate;

    pub fn serialize<S: Serializer>(
        rooms: &BTreeMap<Coordinate, Room>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(rooms.iter().map(|(c, room)| (c.to_string(), room)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Coordinate, Room>, D::Error> {
        BTreeMap::<String, Room>::deserialize(deserializer)?
            .into_iter()
            .map(|(key, room)| Ok((key.parse().map_err(D::Error::custom)?, room)))
            .collect()
    }
}
