//! Strategies that fill a ring menu from game data.
//!
//! A [`RingMenu`](super::RingMenu) owns one boxed [`CommandSource`]. The source
//! lists the commands, decides whether each one can be committed, resolves its
//! icon and picks the button style. Geometry, animation and input stay in the
//! menu itself.

use super::button::ButtonStyle;
use super::command::{Command, Icon, Payload};
use super::services::GameData;

pub trait CommandSource {
    /// Lists the commands for the current game state, in ring order.
    fn populate(&self, game: &dyn GameData) -> Vec<Command>;

    fn is_enabled(&self, command: &Command, _game: &dyn GameData) -> bool {
        command.enabled
    }

    fn resolve_icon(&self, command: &Command, _game: &dyn GameData) -> Option<Icon> {
        command.icon.clone()
    }

    fn button_style(&self, command: &Command) -> ButtonStyle {
        ButtonStyle::label(&command.text)
    }

    /// Whether a trailing cancel command is appended after `populate`.
    fn includes_cancel(&self) -> bool {
        true
    }

    /// Identifier selected right after a refresh.
    fn initial_symbol(&self, _game: &dyn GameData) -> Option<String> {
        None
    }
}

/// Commands added by hand through `add_command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticCommands;

impl CommandSource for StaticCommands {
    fn populate(&self, _game: &dyn GameData) -> Vec<Command> {
        Vec::new()
    }

    fn includes_cancel(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct MainMenuTexts {
    pub item: String,
    pub skill: String,
    pub equip: String,
    pub status: String,
    pub formation: String,
    pub options: String,
    pub save: String,
    pub game_end: String,
}

impl Default for MainMenuTexts {
    fn default() -> Self {
        Self {
            item: "Item".into(),
            skill: "Skill".into(),
            equip: "Equip".into(),
            status: "Status".into(),
            formation: "Formation".into(),
            options: "Options".into(),
            save: "Save".into(),
            game_end: "Game End".into(),
        }
    }
}

/// The field menu: item, skill, equip, status, formation, options, save,
/// game end and cancel.
#[derive(Debug, Clone, Default)]
pub struct MainMenuCommands {
    pub texts: MainMenuTexts,
}

impl MainMenuCommands {
    pub fn new(texts: MainMenuTexts) -> Self {
        Self { texts }
    }
}

impl CommandSource for MainMenuCommands {
    fn populate(&self, game: &dyn GameData) -> Vec<Command> {
        let flags = game.menu_command_flags().unwrap_or_default();
        let t = &self.texts;
        let mut commands = Vec::new();
        let mut push = |needed: bool, id: &str, text: &str| {
            if needed {
                commands.push(Command::new(id, text));
            }
        };
        push(flags.item, "item", &t.item);
        push(flags.skill, "skill", &t.skill);
        push(flags.equip, "equip", &t.equip);
        push(flags.status, "status", &t.status);
        push(flags.formation, "formation", &t.formation);
        push(true, "options", &t.options);
        push(flags.save, "save", &t.save);
        push(true, "gameEnd", &t.game_end);
        commands
    }

    fn is_enabled(&self, command: &Command, game: &dyn GameData) -> bool {
        match command.id.as_str() {
            "item" | "skill" | "equip" | "status" => !game.party_members().is_empty(),
            "formation" => game.party_members().len() >= 2 && game.is_formation_enabled(),
            "save" => !game.is_event_test() && game.is_save_enabled(),
            _ => true,
        }
    }

    fn initial_symbol(&self, game: &dyn GameData) -> Option<String> {
        game.last_menu_command()
    }
}

/// One command per party member, drawn as a character sprite.
#[derive(Debug, Default, Clone, Copy)]
pub struct PartyCommands;

impl PartyCommands {
    pub fn symbol(actor_id: u32) -> String {
        format!("actor:{}", actor_id)
    }
}

impl CommandSource for PartyCommands {
    fn populate(&self, game: &dyn GameData) -> Vec<Command> {
        game.party_members()
            .into_iter()
            .enumerate()
            .map(|(index, actor)| {
                Command::new(Self::symbol(actor.id), actor.name).payload(Payload::Actor(index))
            })
            .collect()
    }

    fn button_style(&self, command: &Command) -> ButtonStyle {
        ButtonStyle::sprite(&command.text)
    }

    fn initial_symbol(&self, game: &dyn GameData) -> Option<String> {
        let members = game.party_members();
        let actor = members.get(game.menu_actor().unwrap_or(0))?;
        Some(Self::symbol(actor.id))
    }
}

/// Inventory entries with a positive count.
#[derive(Debug, Default, Clone, Copy)]
pub struct ItemCommands;

impl ItemCommands {
    pub fn symbol(item_id: u32) -> String {
        format!("item:{}", item_id)
    }
}

impl CommandSource for ItemCommands {
    fn populate(&self, game: &dyn GameData) -> Vec<Command> {
        game.inventory()
            .into_iter()
            .filter(|item| item.count > 0)
            .map(|item| {
                Command::new(
                    Self::symbol(item.id),
                    format!("{} x{}", item.name, item.count),
                )
                .help(item.description)
                .payload(Payload::Item(item.id))
            })
            .collect()
    }

    fn is_enabled(&self, command: &Command, game: &dyn GameData) -> bool {
        let Some(Payload::Item(id)) = command.payload else {
            return command.enabled;
        };
        game.inventory()
            .iter()
            .any(|item| item.id == id && item.usable && item.count > 0)
    }

    fn resolve_icon(&self, command: &Command, game: &dyn GameData) -> Option<Icon> {
        let Some(Payload::Item(id)) = command.payload else {
            return command.icon.clone();
        };
        game.inventory()
            .into_iter()
            .find(|item| item.id == id)
            .map(|item| Icon::Index(item.icon_index))
    }
}

/// Skills of one party member. Enabled when the actor can pay the MP cost.
#[derive(Debug, Clone, Copy)]
pub struct SkillCommands {
    pub actor_index: usize,
}

impl SkillCommands {
    pub fn new(actor_index: usize) -> Self {
        Self { actor_index }
    }

    pub fn symbol(skill_id: u32) -> String {
        format!("skill:{}", skill_id)
    }

    fn actor_mp_and_id(&self, game: &dyn GameData) -> Option<(u32, u32)> {
        game.party_members()
            .get(self.actor_index)
            .map(|actor| (actor.mp, actor.id))
    }
}

impl CommandSource for SkillCommands {
    fn populate(&self, game: &dyn GameData) -> Vec<Command> {
        let Some((_, actor_id)) = self.actor_mp_and_id(game) else {
            return Vec::new();
        };
        game.skills(actor_id)
            .into_iter()
            .map(|skill| {
                Command::new(
                    Self::symbol(skill.id),
                    format!("{} ({} MP)", skill.name, skill.mp_cost),
                )
                .icon(Icon::Index(skill.icon_index))
                .help(skill.description)
                .payload(Payload::Skill(skill.id))
            })
            .collect()
    }

    fn is_enabled(&self, command: &Command, game: &dyn GameData) -> bool {
        let (Some(Payload::Skill(id)), Some((mp, actor_id))) =
            (command.payload, self.actor_mp_and_id(game))
        else {
            return command.enabled;
        };
        game.skills(actor_id)
            .iter()
            .any(|skill| skill.id == id && skill.mp_cost <= mp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::services::{Actor, Item, MenuCommandFlags, MockGameData, Skill};

    fn actor(id: u32, name: &str, mp: u32) -> Actor {
        Actor {
            id,
            name: name.into(),
            character_name: "Actor1".into(),
            character_index: id,
            mp,
        }
    }

    fn game_with_party(members: Vec<Actor>) -> MockGameData {
        let mut game = MockGameData::new();
        game.expect_party_members().returning(move || members.clone());
        game
    }

    #[test]
    fn main_menu_respects_flags_and_enablement() {
        let mut game = game_with_party(vec![actor(1, "Harold", 0)]);
        game.expect_menu_command_flags().returning(|| {
            Some(MenuCommandFlags {
                equip: false,
                ..MenuCommandFlags::default()
            })
        });
        game.expect_is_formation_enabled().return_const(true);
        game.expect_is_event_test().return_const(false);
        game.expect_is_save_enabled().return_const(false);

        let source = MainMenuCommands::default();
        let commands = source.populate(&game);
        let ids: Vec<_> = commands.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            ["item", "skill", "status", "formation", "options", "save", "gameEnd"]
        );

        let enabled: Vec<_> = commands
            .iter()
            .map(|c| source.is_enabled(c, &game))
            .collect();
        // One member: no formation. Saving is disabled by the game.
        assert_eq!(enabled, [true, true, true, false, true, false, true]);
    }

    #[test]
    fn party_commands_carry_actor_index() {
        let mut game = game_with_party(vec![actor(7, "Therese", 3), actor(9, "Marsha", 5)]);
        game.expect_menu_actor().return_const(Some(1usize));

        let source = PartyCommands;
        let commands = source.populate(&game);
        assert_eq!(commands[1].id, "actor:9");
        assert_eq!(commands[1].payload, Some(Payload::Actor(1)));
        assert_eq!(source.initial_symbol(&game).as_deref(), Some("actor:9"));
        assert_eq!(source.button_style(&commands[0]).anchor.y, 1.0);
    }

    #[test]
    fn items_enabled_only_when_usable() {
        let mut game = MockGameData::new();
        game.expect_inventory().returning(|| {
            vec![
                Item {
                    id: 1,
                    name: "Potion".into(),
                    icon_index: 176,
                    description: "Heals".into(),
                    count: 3,
                    usable: true,
                },
                Item {
                    id: 2,
                    name: "Key".into(),
                    icon_index: 195,
                    description: String::new(),
                    count: 1,
                    usable: false,
                },
                Item {
                    id: 3,
                    name: "Ether".into(),
                    icon_index: 176,
                    description: String::new(),
                    count: 0,
                    usable: true,
                },
            ]
        });

        let source = ItemCommands;
        let commands = source.populate(&game);
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].text, "Potion x3");
        assert_eq!(commands[0].help.as_deref(), Some("Heals"));
        assert!(source.is_enabled(&commands[0], &game));
        assert!(!source.is_enabled(&commands[1], &game));
        assert_eq!(
            source.resolve_icon(&commands[1], &game),
            Some(Icon::Index(195))
        );
    }

    #[test]
    fn skills_enabled_by_mp_cost() {
        let mut game = game_with_party(vec![actor(1, "Harold", 10)]);
        game.expect_skills().returning(|_| {
            vec![
                Skill {
                    id: 10,
                    name: "Dual Attack".into(),
                    icon_index: 76,
                    description: String::new(),
                    mp_cost: 5,
                },
                Skill {
                    id: 11,
                    name: "Triple Attack".into(),
                    icon_index: 76,
                    description: String::new(),
                    mp_cost: 40,
                },
            ]
        });

        let source = SkillCommands::new(0);
        let commands = source.populate(&game);
        assert_eq!(commands[0].text, "Dual Attack (5 MP)");
        assert!(source.is_enabled(&commands[0], &game));
        assert!(!source.is_enabled(&commands[1], &game));

        assert!(SkillCommands::new(4).populate(&game).is_empty());
    }
}
