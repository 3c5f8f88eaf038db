use serde::{Deserialize, Serialize};

use crate::{
    Coordinate, Direction,
    dungeon::{Dungeon, Level, LevelId},
};

/// Where the player currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLocation {
    pub level: LevelId,
    pub x: usize,
    pub y: usize,
}

impl PlayerLocation {
    /// The start room of the dungeon's active level.
    pub fn at_start(dungeon: &Dungeon) -> Option<Self> {
        let level = dungeon.active_level()?;
        Some(PlayerLocation {
            level: level.id,
            x: level.start_coords.x,
            y: level.start_coords.y,
        })
    }

    pub fn coords(&self) -> Coordinate {
        Coordinate::new(self.x, self.y)
    }
}

/// A choice offered to the player in the current room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOption {
    Move {
        direction: Direction,
        target: Coordinate,
    },
    Exit,
}

impl GameOption {
    pub fn label(&self) -> String {
        match self {
            GameOption::Move { direction, target } => {
                format!("Go {direction} to ({}, {})", target.x, target.y)
            }
            GameOption::Exit => "Leave the dungeon".to_string(),
        }
    }
}

/// Represents the outcome of processing a player's choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Moved {
        direction: Direction,
        to: Coordinate,
        reached_exit: bool,
    },
    Escaped,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("level {0} does not exist")]
    UnknownLevel(LevelId),
    #[error("there is no room at {0}")]
    NoRoom(Coordinate),
    #[error("{0:?} is not one of the available options")]
    UnknownOption(String),
    #[error("target {0} is outside the level")]
    OutOfBounds(Coordinate),
}

fn current_level<'a>(
    dungeon: &'a Dungeon,
    location: &PlayerLocation,
) -> Result<&'a Level, ActionError> {
    dungeon
        .level(location.level)
        .ok_or(ActionError::UnknownLevel(location.level))
}

/// Options for the player's current room: one move per connection in
/// north, south, east, west order, then `Exit` when standing on the exit.
pub fn available_options(
    dungeon: &Dungeon,
    location: &PlayerLocation,
) -> Result<Vec<GameOption>, ActionError> {
    let level = current_level(dungeon, location)?;
    let here = location.coords();
    let room = level.room(here).ok_or(ActionError::NoRoom(here))?;

    let mut options: Vec<GameOption> = room
        .connections
        .iter()
        .map(|(&direction, &target)| GameOption::Move { direction, target })
        .collect();
    if here == level.exit_coords {
        options.push(GameOption::Exit);
    }
    Ok(options)
}

/// Applies the 1-based numeric `choice` against the current options.
///
/// On error the location is left untouched.
pub fn process_action(
    dungeon: &Dungeon,
    location: &mut PlayerLocation,
    choice: &str,
) -> Result<ActionOutcome, ActionError> {
    let options = available_options(dungeon, location)?;
    let option = choice
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i))
        .ok_or_else(|| ActionError::UnknownOption(choice.to_string()))?;

    match *option {
        GameOption::Exit => {
            log::info!("player escaped from level {}", location.level);
            Ok(ActionOutcome::Escaped)
        }
        GameOption::Move { direction, target } => {
            let level = current_level(dungeon, location)?;
            if target.x >= level.width || target.y >= level.height {
                return Err(ActionError::OutOfBounds(target));
            }
            location.x = target.x;
            location.y = target.y;
            let reached_exit = target == level.exit_coords;
            log::debug!("player moved {direction} to {target}");
            Ok(ActionOutcome::Moved {
                direction,
                to: target,
                reached_exit,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{connectivity::fill, dungeon::assemble};

    fn corridor() -> Dungeon {
        let path = [
            Coordinate::new(0, 0),
            Coordinate::new(1, 0),
            Coordinate::new(2, 0),
        ];
        assemble(3, 1, path[0], path[2], fill(&path, 3, 1).unwrap())
    }

    #[test]
    fn walk_to_the_exit_and_leave() {
        let dungeon = corridor();
        let mut location = PlayerLocation::at_start(&dungeon).unwrap();
        assert_eq!(location.coords(), Coordinate::new(0, 0));

        let options = available_options(&dungeon, &location).unwrap();
        assert_eq!(
            options,
            vec![GameOption::Move {
                direction: Direction::East,
                target: Coordinate::new(1, 0)
            }]
        );
        assert_eq!(options[0].label(), "Go east to (1, 0)");

        let outcome = process_action(&dungeon, &mut location, "1").unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::Moved {
                direction: Direction::East,
                to: Coordinate::new(1, 0),
                reached_exit: false
            }
        );

        // In the middle room east is listed before west.
        let outcome = process_action(&dungeon, &mut location, " 1 ").unwrap();
        assert!(matches!(
            outcome,
            ActionOutcome::Moved {
                reached_exit: true,
                ..
            }
        ));

        let options = available_options(&dungeon, &location).unwrap();
        assert_eq!(options.last(), Some(&GameOption::Exit));
        assert_eq!(
            process_action(&dungeon, &mut location, "2"),
            Ok(ActionOutcome::Escaped)
        );
    }

    #[test]
    fn invalid_choices_leave_location_unchanged() {
        let dungeon = corridor();
        let mut location = PlayerLocation::at_start(&dungeon).unwrap();
        for bad in ["0", "2", "east", ""] {
            assert_eq!(
                process_action(&dungeon, &mut location, bad),
                Err(ActionError::UnknownOption(bad.to_string()))
            );
        }
        assert_eq!(location.coords(), Coordinate::new(0, 0));
    }

    #[test]
    fn unknown_level_is_an_error() {
        let dungeon = Dungeon {
            total_levels: 0,
            current_level: 1,
            levels: BTreeMap::new(),
        };
        assert_eq!(PlayerLocation::at_start(&dungeon), None);
        let location = PlayerLocation { level: 3, x: 0, y: 0 };
        assert_eq!(
            available_options(&dungeon, &location),
            Err(ActionError::UnknownLevel(3))
        );
    }
}
