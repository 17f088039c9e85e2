use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reserved identifier of the cancel command and handler.
pub const CANCEL: &str = "cancel";
/// Reserved identifier of the generic confirm handler.
pub const OK: &str = "ok";

/// Icon reference of a command.
///
/// Numeric icons index a 16-column icon atlas. A `{ cold, hot }` pair uses a
/// different atlas cell while the command is the current selection. Named
/// icons refer to a standalone image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Icon {
    Index(u32),
    Pair { cold: u32, hot: u32 },
    Named(String),
}

pub const ICON_COLUMNS: u32 = 16;

impl Icon {
    /// Atlas cell `(column, row)` for the given highlight state, or `None`
    /// for named images.
    pub fn atlas_cell(&self, hot: bool) -> Option<(u32, u32)> {
        let index = match self {
            Icon::Index(index) => *index,
            Icon::Pair { cold, hot: hot_index } => {
                if hot {
                    *hot_index
                } else {
                    *cold
                }
            }
            Icon::Named(_) => return None,
        };
        Some((index % ICON_COLUMNS, index / ICON_COLUMNS))
    }
}

/// Data attached to a command by the menu that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Index into the party roster.
    Actor(usize),
    Item(u32),
    Skill(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub id: String,
    pub text: String,
    pub enabled: bool,
    pub icon: Option<Icon>,
    pub help: Option<String>,
    pub payload: Option<Payload>,
}

impl Command {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            enabled: true,
            icon: None,
            help: None,
            payload: None,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Commands in insertion order with lookup by identifier.
#[derive(Debug, Clone, Default)]
pub struct CommandList {
    entries: Vec<Command>,
    positions: HashMap<String, usize>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends `command`, or replaces the command with the same identifier in
    /// place. Returns `true` when an existing entry was replaced.
    pub fn insert(&mut self, command: Command) -> bool {
        if let Some(&position) = self.positions.get(&command.id) {
            self.entries[position] = command;
            return true;
        }
        self.positions.insert(command.id.clone(), self.entries.len());
        self.entries.push(command);
        false
    }

    pub fn remove(&mut self, id: &str) -> Option<Command> {
        let position = self.positions.remove(id)?;
        let removed = self.entries.remove(position);
        for (index, entry) in self.entries.iter().enumerate().skip(position) {
            self.positions.insert(entry.id.clone(), index);
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
    }

    pub fn get(&self, id: &str) -> Option<&Command> {
        self.positions.get(id).map(|&position| &self.entries[position])
    }

    pub fn get_index(&self, index: usize) -> Option<&Command> {
        self.entries.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a CommandList {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &CommandList) -> Vec<&str> {
        list.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn keeps_insertion_order_and_lookup() {
        let mut list = CommandList::new();
        for id in ["item", "skill", "equip", "status"] {
            assert!(!list.insert(Command::new(id, id.to_uppercase())));
        }
        assert_eq!(ids(&list), ["item", "skill", "equip", "status"]);
        assert_eq!(list.index_of("equip"), Some(2));
        assert_eq!(list.index_of("missing"), None);
        assert_eq!(list.get("skill").map(|c| c.text.as_str()), Some("SKILL"));
    }

    #[test]
    fn reinserting_replaces_in_place() {
        let mut list = CommandList::new();
        list.insert(Command::new("a", "A"));
        list.insert(Command::new("b", "B"));
        assert!(list.insert(Command::new("a", "Again").enabled(false)));
        assert_eq!(ids(&list), ["a", "b"]);
        let a = list.get("a").expect("a exists");
        assert_eq!(a.text, "Again");
        assert!(!a.enabled);
    }

    #[test]
    fn removal_reindexes_following_entries() {
        let mut list = CommandList::new();
        for id in ["a", "b", "c", "d"] {
            list.insert(Command::new(id, id));
        }
        assert!(list.remove("b").is_some());
        assert!(list.remove("b").is_none());
        assert_eq!(ids(&list), ["a", "c", "d"]);
        assert_eq!(list.index_of("c"), Some(1));
        assert_eq!(list.index_of("d"), Some(2));
        assert_eq!(list.get_index(2).map(|c| c.id.as_str()), Some("d"));
    }

    #[test]
    fn icon_atlas_cells() {
        assert_eq!(Icon::Index(176).atlas_cell(false), Some((0, 11)));
        assert_eq!(Icon::Index(79).atlas_cell(true), Some((15, 4)));
        let pair = Icon::Pair { cold: 74, hot: 75 };
        assert_eq!(pair.atlas_cell(false), Some((10, 4)));
        assert_eq!(pair.atlas_cell(true), Some((11, 4)));
        assert_eq!(Icon::Named("Crest".into()).atlas_cell(false), None);
    }

    #[test]
    fn icons_deserialize_untagged() {
        #[derive(Deserialize)]
        struct Icons {
            a: Icon,
            b: Icon,
            c: Icon,
        }
        let icons: Icons =
            toml::from_str("a = 176\nb = { cold = 1, hot = 2 }\nc = \"Crest\"").expect("parse");
        assert_eq!(icons.a, Icon::Index(176));
        assert_eq!(icons.b, Icon::Pair { cold: 1, hot: 2 });
        assert_eq!(icons.c, Icon::Named("Crest".into()));
    }
}
