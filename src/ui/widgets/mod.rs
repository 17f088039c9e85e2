pub mod ring_menu;

pub use ring_menu::{icon_glyph, RingMenuWidget};
