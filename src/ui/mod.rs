pub mod theme;
pub mod widgets;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{config::HelpConfig, App, MenuKind};
use theme::Theme;
use widgets::RingMenuWidget;

/// Screen regions: optional help window on top, rings in the middle, footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub help: Option<Rect>,
    pub rings: Rect,
    pub footer: Rect,
}

pub fn layout(size: Rect, help: &HelpConfig) -> ScreenLayout {
    let top = if help.visible {
        help.y.saturating_add(help.height)
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(top),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(size);

    let help_rect = help.visible.then(|| {
        let band = chunks[0];
        let x = band.x.saturating_add(help.x).min(band.right());
        let width = if help.width == 0 {
            band.right() - x
        } else {
            help.width.min(band.right() - x)
        };
        Rect {
            x,
            y: band.y.saturating_add(help.y).min(band.bottom()),
            width,
            height: help.height.min(band.height),
        }
    });

    ScreenLayout {
        help: help_rect,
        rings: chunks[1],
        footer: chunks[2],
    }
}

pub fn render(f: &mut Frame, app: &App) {
    let size = f.size();
    let state = &app.state;
    let theme = Theme::from_config(&state.config);

    // Fill the frame so every cell is redrawn.
    let background = Block::default().style(Style::default().bg(theme.background));
    f.render_widget(background, size);

    let screen = layout(size, &state.config.help);

    let focused = state.scene.focused_kind();
    let avatar = state
        .scene
        .avatar(&state.game)
        .and_then(|index| state.game.actor(index));
    for (kind, ring) in state.scene.visible_rings() {
        let widget = RingMenuWidget::new(ring, &theme)
            .avatar(if kind == focused { avatar } else { None });
        f.render_widget(widget, screen.rings);
    }

    if let Some(area) = screen.help {
        render_help(f, area, app, &theme);
    }
    render_footer(f, screen.footer, app, &theme);
}

fn menu_title(kind: MenuKind) -> &'static str {
    match kind {
        MenuKind::Main => "Menu",
        MenuKind::Party => "Party",
        MenuKind::Item => "Items",
        MenuKind::Skill { .. } => "Skills",
    }
}

fn render_help(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let scene = &app.state.scene;
    let text = scene
        .help_text()
        .or_else(|| scene.focused().current_command().map(|c| c.text.as_str()))
        .unwrap_or("");

    let block = Block::default()
        .title(format!(" {} ", menu_title(scene.focused_kind())))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent));

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(theme.help));

    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let state = &app.state;
    let cues = state
        .recent_cues
        .iter()
        .map(|cue| cue.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let mut spans = vec![Span::raw(
        "[←/→] Turn │ [Enter] OK │ [Esc] Cancel │ [Click] Pick │ [Ctrl+C] Exit",
    )];
    if !state.scene.status().is_empty() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            state.scene.status().to_string(),
            Style::default()
                .fg(theme.selected)
                .add_modifier(Modifier::BOLD),
        ));
    }
    if !cues.is_empty() {
        spans.push(Span::raw(" │ ♪ "));
        spans.push(Span::styled(cues, Style::default().fg(theme.accent)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", state.config.general.app_name));
    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.foreground));

    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_reserves_help_and_footer() {
        let help = HelpConfig::default();
        let screen = layout(Rect::new(0, 0, 100, 30), &help);
        assert_eq!(screen.help, Some(Rect::new(0, 0, 100, 3)));
        assert_eq!(screen.rings, Rect::new(0, 3, 100, 24));
        assert_eq!(screen.footer, Rect::new(0, 27, 100, 3));
    }

    #[test]
    fn hidden_help_gives_rings_the_top() {
        let help = HelpConfig {
            visible: false,
            ..HelpConfig::default()
        };
        let screen = layout(Rect::new(0, 0, 80, 24), &help);
        assert_eq!(screen.help, None);
        assert_eq!(screen.rings, Rect::new(0, 0, 80, 21));
    }

    #[test]
    fn help_window_honours_offset_and_width() {
        let help = HelpConfig {
            x: 10,
            y: 1,
            width: 30,
            height: 4,
            visible: true,
        };
        let screen = layout(Rect::new(0, 0, 80, 24), &help);
        assert_eq!(screen.help, Some(Rect::new(10, 1, 30, 4)));
        assert_eq!(screen.rings.y, 5);
    }
}
