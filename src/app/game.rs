//! Demo game state backing the menus, loaded from JSON.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::menu::{Actor, GameData, Item, MenuCommandFlags, Skill};

const DEMO_GAME: &str = include_str!("../../data/demo_game.json");

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemoGame {
    pub party: Vec<Actor>,
    #[serde(default)]
    pub menu_actor: usize,
    #[serde(default)]
    pub inventory: Vec<Item>,
    /// Skills keyed by actor id.
    #[serde(default)]
    pub skills: HashMap<String, Vec<Skill>>,
    #[serde(default)]
    pub formation_enabled: bool,
    #[serde(default)]
    pub save_enabled: bool,
    #[serde(default)]
    pub event_test: bool,
    #[serde(default)]
    pub in_airship: bool,
    #[serde(default)]
    pub menu_commands: Option<MenuCommandFlags>,
    #[serde(default)]
    pub last_menu_command: Option<String>,
}

impl DemoGame {
    pub fn bundled() -> Result<Self> {
        serde_json::from_str(DEMO_GAME).context("Failed to parse bundled demo game")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read game data: {:?}", path.as_ref()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse game data: {:?}", path.as_ref()))
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::load(path.as_ref()) {
            Ok(game) => Ok(game),
            Err(e) => {
                log::info!("Using bundled demo game: {}", e);
                Self::bundled()
            }
        }
    }

    pub fn actor(&self, index: usize) -> Option<&Actor> {
        self.party.get(index)
    }

    pub fn current_actor(&self) -> Option<&Actor> {
        self.actor(self.menu_actor)
    }

    pub fn set_menu_actor(&mut self, index: usize) {
        if index < self.party.len() {
            self.menu_actor = index;
        }
    }

    pub fn set_last_menu_command(&mut self, symbol: &str) {
        self.last_menu_command = Some(symbol.to_string());
    }

    pub fn item(&self, id: u32) -> Option<&Item> {
        self.inventory.iter().find(|item| item.id == id)
    }

    /// Spends one of item `id`. Returns `false` when nothing could be used.
    pub fn use_item(&mut self, id: u32) -> bool {
        match self
            .inventory
            .iter_mut()
            .find(|item| item.id == id && item.usable && item.count > 0)
        {
            Some(item) => {
                item.count -= 1;
                true
            }
            None => false,
        }
    }

    /// Pays the MP cost of `skill_id` for the party member at `index`.
    pub fn use_skill(&mut self, index: usize, skill_id: u32) -> bool {
        let Some(actor) = self.party.get(index) else {
            return false;
        };
        let cost = self
            .skills
            .get(&actor.id.to_string())
            .and_then(|skills| skills.iter().find(|skill| skill.id == skill_id))
            .map(|skill| skill.mp_cost);
        match (cost, self.party.get_mut(index)) {
            (Some(cost), Some(actor)) if actor.mp >= cost => {
                actor.mp -= cost;
                true
            }
            _ => false,
        }
    }

    pub fn swap_members(&mut self, a: usize, b: usize) {
        if a < self.party.len() && b < self.party.len() {
            self.party.swap(a, b);
        }
    }
}

impl GameData for DemoGame {
    fn party_members(&self) -> Vec<Actor> {
        self.party.clone()
    }

    fn menu_actor(&self) -> Option<usize> {
        (self.menu_actor < self.party.len()).then_some(self.menu_actor)
    }

    fn inventory(&self) -> Vec<Item> {
        self.inventory.clone()
    }

    fn skills(&self, actor_id: u32) -> Vec<Skill> {
        self.skills
            .get(&actor_id.to_string())
            .cloned()
            .unwrap_or_default()
    }

    fn menu_command_flags(&self) -> Option<MenuCommandFlags> {
        self.menu_commands
    }

    fn is_formation_enabled(&self) -> bool {
        self.formation_enabled
    }

    fn is_save_enabled(&self) -> bool {
        self.save_enabled
    }

    fn is_event_test(&self) -> bool {
        self.event_test
    }

    fn is_in_airship(&self) -> bool {
        self.in_airship
    }

    fn last_menu_command(&self) -> Option<String> {
        self.last_menu_command.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> DemoGame {
        DemoGame::bundled().expect("bundled game")
    }

    #[test]
    fn bundled_game_parses() {
        let game = game();
        assert_eq!(game.party.len(), 4);
        assert_eq!(game.current_actor().map(|a| a.name.as_str()), Some("Harold"));
        assert_eq!(game.skills(3).len(), 3);
        assert!(game.skills(4).is_empty());
        assert!(game.last_menu_command().is_none());
    }

    #[test]
    fn items_run_out() {
        let mut game = game();
        assert!(game.use_item(3));
        assert!(!game.use_item(3));
        assert_eq!(game.item(3).map(|item| item.count), Some(0));
        // The key cannot be used at all.
        assert!(!game.use_item(4));
    }

    #[test]
    fn skills_cost_mp() {
        let mut game = game();
        // Therese has 4 MP: Cure costs 3, Heal costs 5.
        assert!(!game.use_skill(1, 20));
        assert!(game.use_skill(1, 21));
        assert_eq!(game.party[1].mp, 1);
        assert!(!game.use_skill(1, 21));
        assert!(!game.use_skill(9, 20));
    }

    #[test]
    fn formation_and_menu_actor() {
        let mut game = game();
        game.swap_members(0, 2);
        assert_eq!(game.party[0].name, "Marsha");
        game.swap_members(0, 9);
        assert_eq!(game.party[0].name, "Marsha");

        game.set_menu_actor(3);
        assert_eq!(game.menu_actor(), Some(3));
        game.set_menu_actor(7);
        assert_eq!(game.menu_actor(), Some(3));
    }
}
