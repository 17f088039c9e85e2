//! Outward services the ring menus call into: input polling, cue playback
//! and read-only game-state queries.

use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

/// A point in host screen units. Used for centres, radii and pointer positions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// Logical actions a ring menu reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    Ok,
    Cancel,
    Left,
    Right,
}

/// Fire-and-forget sound cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Cursor,
    Ok,
    Cancel,
    Buzzer,
}

impl Cue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::Cursor => "cursor",
            Cue::Ok => "confirm",
            Cue::Cancel => "cancel",
            Cue::Buzzer => "buzzer",
        }
    }
}

#[cfg_attr(test, automock)]
pub trait InputService {
    /// Edge or held state of an action during the current frame.
    fn is_pressed(&self, action: InputAction) -> bool;
    /// Press edge, or a key-repeat tick while held.
    fn is_repeated(&self, action: InputAction) -> bool;
    /// Last known pointer position in screen units.
    fn pointer(&self) -> Point;
    fn is_pointer_triggered(&self) -> bool;
    /// Secondary pointer button, treated as cancel.
    fn is_touch_cancelled(&self) -> bool;
    /// Forget everything seen this frame so a commit cannot leak into the
    /// next menu updated in the same frame.
    fn consume(&mut self);
}

#[cfg_attr(test, automock)]
pub trait AudioService {
    fn play(&self, cue: Cue);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: u32,
    pub name: String,
    pub character_name: String,
    pub character_index: u32,
    pub mp: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub name: String,
    pub icon_index: u32,
    #[serde(default)]
    pub description: String,
    pub count: u32,
    pub usable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: u32,
    pub name: String,
    pub icon_index: u32,
    #[serde(default)]
    pub description: String,
    pub mp_cost: u32,
}

/// Which main-menu commands the game database asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuCommandFlags {
    pub item: bool,
    pub skill: bool,
    pub equip: bool,
    pub status: bool,
    pub formation: bool,
    pub save: bool,
}

impl Default for MenuCommandFlags {
    fn default() -> Self {
        Self {
            item: true,
            skill: true,
            equip: true,
            status: true,
            formation: true,
            save: true,
        }
    }
}

/// Read-only view of the game state used to populate specialised menus.
#[cfg_attr(test, automock)]
pub trait GameData {
    fn party_members(&self) -> Vec<Actor>;
    /// Index into `party_members` of the actor the menu acts on.
    fn menu_actor(&self) -> Option<usize>;
    fn inventory(&self) -> Vec<Item>;
    fn skills(&self, actor_id: u32) -> Vec<Skill>;
    fn menu_command_flags(&self) -> Option<MenuCommandFlags>;
    fn is_formation_enabled(&self) -> bool;
    fn is_save_enabled(&self) -> bool;
    fn is_event_test(&self) -> bool;
    fn is_in_airship(&self) -> bool;
    /// Symbol committed the last time the main menu was used.
    fn last_menu_command(&self) -> Option<String>;
}
