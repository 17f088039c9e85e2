//! Draws a ring menu into a ratatui buffer, back buttons first.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use unicode_width::UnicodeWidthChar;

use crate::menu::{Actor, Icon, RingButton, RingMenu, ICON_COLUMNS};
use crate::ui::theme::Theme;

/// Glyphs standing in for icon atlas cells.
const GLYPHS: [char; ICON_COLUMNS as usize] = [
    '●', '○', '◆', '◇', '■', '□', '▲', '△', '▼', '▽', '★', '☆', '♥', '♦', '♣', '♠',
];

/// Below this opacity a button is not drawn at all.
const MIN_VISIBLE_OPACITY: f64 = 16.0;

pub fn icon_glyph(icon: &Icon, hot: bool) -> char {
    match (icon.atlas_cell(hot), icon) {
        (Some((column, row)), _) => GLYPHS[((column + row) % ICON_COLUMNS) as usize],
        (None, Icon::Named(name)) => name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?'),
        (None, _) => '?',
    }
}

/// Cells a button occupies, in ring coordinates: every cell whose centre lies
/// inside the button's hit box. Clicks land on cell centres, so drawing and
/// hit testing agree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSpan {
    pub column: f64,
    pub row: f64,
    pub columns: usize,
    pub rows: usize,
}

impl CellSpan {
    pub fn of(button: &RingButton) -> Self {
        let (width, height) = button.scaled_size();
        let left = button.x - button.style.anchor.x * width;
        let top = button.y - button.style.anchor.y * height;
        let (column, columns) = centres_within(left, width);
        let (row, rows) = centres_within(top, height);
        Self {
            column,
            row,
            columns,
            rows,
        }
    }

    pub fn contains(&self, column: f64, row: f64) -> bool {
        column >= self.column
            && row >= self.row
            && column < self.column + self.columns as f64
            && row < self.row + self.rows as f64
    }
}

/// First cell with its centre in `[start, start + len)` and how many follow.
fn centres_within(start: f64, len: f64) -> (f64, usize) {
    let first = (start - 0.5).ceil();
    let end = (start + len - 0.5).ceil();
    (first, (end - first).max(0.0) as usize)
}

/// Truncates or centres `text` to exactly `cells` columns.
fn fit(text: &str, cells: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let width = c.width().unwrap_or(0);
        if used + width > cells {
            break;
        }
        out.push(c);
        used += width;
    }
    let pad = cells - used;
    format!("{}{}{}", " ".repeat(pad / 2), out, " ".repeat(pad - pad / 2))
}

pub struct RingMenuWidget<'a> {
    ring: &'a RingMenu,
    theme: &'a Theme,
    avatar: Option<&'a Actor>,
}

impl<'a> RingMenuWidget<'a> {
    pub fn new(ring: &'a RingMenu, theme: &'a Theme) -> Self {
        Self {
            ring,
            theme,
            avatar: None,
        }
    }

    /// Party member drawn at the centre of the ring.
    pub fn avatar(mut self, actor: Option<&'a Actor>) -> Self {
        self.avatar = actor;
        self
    }

    fn style_for(&self, button: &RingButton, selected: bool) -> Style {
        let mut style = if !self.ring.is_item_enabled(button.id()) {
            Style::default().fg(self.theme.disabled)
        } else if selected {
            Style::default()
                .fg(self.theme.selected)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.foreground)
        };
        if button.opacity < 128.0 || button.scale < 0.95 {
            style = style.add_modifier(Modifier::DIM);
        }
        style
    }
}

/// Writes `text` at ring coordinates `(x, y)`, clipped to `area`.
fn put(buf: &mut Buffer, area: Rect, x: f64, y: f64, text: &str, style: Style) {
    let (x, y) = (x.round(), y.round());
    if x < 0.0 || y < 0.0 || x >= area.width as f64 || y >= area.height as f64 {
        return;
    }
    let column = area.x + x as u16;
    let row = area.y + y as u16;
    let width = (area.right() - column) as usize;
    buf.set_stringn(column, row, text, width, style);
}

impl Widget for RingMenuWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if let Some(actor) = self.avatar {
            let centre = self.ring.centre();
            let style = Style::default().fg(self.theme.accent);
            put(buf, area, centre.x, centre.y - 1.0, "☺", style);
            let offset = actor.name.chars().count() as f64 / 2.0;
            put(buf, area, centre.x - offset, centre.y, &actor.name, style);
        }

        let current = self.ring.current_symbol();
        for button in self.ring.buttons() {
            if button.opacity < MIN_VISIBLE_OPACITY {
                continue;
            }
            let Some(command) = self.ring.commands().get(button.id()) else {
                continue;
            };
            let span = CellSpan::of(button);
            if span.columns == 0 || span.rows == 0 {
                continue;
            }
            let selected = current == Some(button.id());
            let style = self.style_for(button, selected);

            if span.rows >= 2 {
                // Sprite: figure on top, name underneath.
                put(buf, area, span.column, span.row, &fit("☺", span.columns), style);
                let name = fit(&command.text, span.columns);
                put(buf, area, span.column, span.row + 1.0, &name, style);
            } else {
                let label = match button.icon() {
                    Some(icon) => format!("{} {}", icon_glyph(icon, selected), command.text),
                    None => command.text.clone(),
                };
                put(buf, area, span.column, span.row, &fit(&label, span.columns), style);
            }
        }
    }
}
