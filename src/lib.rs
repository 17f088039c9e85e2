//! Animated ring-shaped selection menus and a terminal host for them.

pub mod app;
pub mod events;
pub mod menu;
pub mod ui;
