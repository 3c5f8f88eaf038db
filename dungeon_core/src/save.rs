//! JSON save files holding a dungeon, the player and their position in it.

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    dungeon::{Dungeon, Violation},
    navigation::PlayerLocation,
    player::Player,
};

/// Default save file name used by the game.
pub const DEFAULT_SAVE_FILE: &str = "savegame.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveGame {
    pub dungeon: Dungeon,
    pub player_location: PlayerLocation,
    /// Saves written before the player was stored load with a fresh player.
    #[serde(default)]
    pub player: Player,
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("save file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("save file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("saved dungeon is structurally invalid ({} problems)", .0.len())]
    Invalid(Vec<Violation>),
    #[error("saved player location {0:?} is not on a room")]
    InvalidLocation(PlayerLocation),
}

/// Writes `game` to `path` as pretty-printed JSON, replacing any existing file.
pub fn save_dungeon(path: impl AsRef<Path>, game: &SaveGame) -> Result<(), SaveError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(game)?;
    fs::write(path, json)?;
    log::info!("game saved to {}", path.display());
    Ok(())
}

/// Reads a save file and checks the dungeon before handing it back.
pub fn load_dungeon(path: impl AsRef<Path>) -> Result<SaveGame, SaveError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    let game: SaveGame = serde_json::from_str(&json)?;
    game.dungeon.validate().map_err(SaveError::Invalid)?;

    let location = game.player_location;
    let on_room = game
        .dungeon
        .level(location.level)
        .is_some_and(|level| level.room(location.coords()).is_some());
    if !on_room {
        return Err(SaveError::InvalidLocation(location));
    }
    log::info!("game loaded from {}", path.display());
    Ok(game)
}

pub fn save_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

/// Deletes the save file. Returns `false` if there was nothing to delete.
pub fn delete_save(path: impl AsRef<Path>) -> Result<bool, SaveError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path)?;
    log::info!("save file {} deleted", path.display());
    Ok(true)
}
