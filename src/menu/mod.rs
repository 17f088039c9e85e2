pub mod button;
pub mod command;
pub mod formula;
pub mod ring;
pub mod services;
pub mod source;

pub use button::{ButtonStyle, RingButton, RingGeometry};
pub use command::{Command, CommandList, Icon, Payload, CANCEL, ICON_COLUMNS, OK};
pub use formula::{Formula, FormulaContext, FormulaError};
pub use ring::{wrap_index, RingMenu, RingMenuOptions, DEFAULT_ANIMATION_FRAMES};
pub use services::{
    Actor, AudioService, Cue, GameData, InputAction, InputService, Item, MenuCommandFlags, Point,
    Skill,
};
pub use source::{
    CommandSource, ItemCommands, MainMenuCommands, MainMenuTexts, PartyCommands, SkillCommands,
    StaticCommands,
};
