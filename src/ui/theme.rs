use crate::app::Config;
use ratatui::style::Color;

pub fn parse_color(hex: &str) -> Color {
    if hex.starts_with('#') && hex.len() == 7 {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&hex[1..3], 16),
            u8::from_str_radix(&hex[3..5], 16),
            u8::from_str_radix(&hex[5..7], 16),
        ) {
            return Color::Rgb(r, g, b);
        }
    }
    Color::White
}

/// Theme helper that provides colors from the config
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub foreground: Color,
    pub selected: Color,
    pub disabled: Color,
    pub accent: Color,
    pub help: Color,
}

impl Theme {
    pub fn from_config(config: &Config) -> Self {
        let theme = &config.theme;

        Self {
            background: parse_color(&theme.background),
            foreground: parse_color(&theme.foreground),
            selected: parse_color(&theme.selected),
            disabled: parse_color(&theme.disabled),
            accent: parse_color(&theme.accent),
            help: parse_color(&theme.help),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Reset,
            foreground: Color::White,
            selected: Color::Yellow,
            disabled: Color::DarkGray,
            accent: Color::Cyan,
            help: Color::Green,
        }
    }
}
