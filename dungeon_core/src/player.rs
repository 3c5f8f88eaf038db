use serde::{Deserialize, Serialize};

/// The player's attributes and resources, carried alongside the dungeon in a save.
///
/// Missing fields in a saved player take their default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    pub strength: u32,
    pub dexterity: u32,
    pub intelligence: u32,
    pub perception: u32,
    pub health: u32,
    pub max_health: u32,
    pub experience: u32,
    pub inventory: Vec<String>,
}

impl Default for Player {
    fn default() -> Self {
        Player {
            strength: 10,
            dexterity: 10,
            intelligence: 10,
            perception: 10,
            health: 100,
            max_health: 100,
            experience: 0,
            inventory: Vec::new(),
        }
    }
}

impl Player {
    pub fn gain_xp(&mut self, amount: u32) {
        self.experience = self.experience.saturating_add(amount);
        log::debug!("player gained {amount} xp, now {}", self.experience);
    }

    /// Reduces health, never below zero.
    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
        log::debug!("player took {amount} damage, health {}", self.health);
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// The game ends once health is exhausted.
    pub fn is_game_over(&self) -> bool {
        !self.is_alive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_starting_stats() {
        let player = Player::default();
        assert_eq!(player.strength, 10);
        assert_eq!(player.perception, 10);
        assert_eq!((player.health, player.max_health), (100, 100));
        assert_eq!(player.experience, 0);
        assert!(player.inventory.is_empty());
        assert!(player.is_alive());
    }

    #[test]
    fn damage_floors_at_zero() {
        let mut player = Player::default();
        player.take_damage(30);
        assert_eq!(player.health, 70);
        assert!(!player.is_game_over());

        player.take_damage(500);
        assert_eq!(player.health, 0);
        assert!(player.is_game_over());
    }

    #[test]
    fn experience_accumulates() {
        let mut player = Player::default();
        player.gain_xp(15);
        player.gain_xp(5);
        assert_eq!(player.experience, 20);
        player.gain_xp(u32::MAX);
        assert_eq!(player.experience, u32::MAX);
    }

    #[test]
    fn partial_player_fills_defaults() {
        let player: Player =
            serde_json::from_str(r#"{"health": 40, "inventory": ["torch"]}"#).unwrap();
        assert_eq!(player.health, 40);
        assert_eq!(player.max_health, 100);
        assert_eq!(player.inventory, vec!["torch".to_string()]);
    }
}
