use anyhow::{Context, Result};
use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use std::collections::{HashSet, VecDeque};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{Config, DemoGame, MenuScene};
use crate::menu::{AudioService, Cue, InputAction, InputService, Point};
use crate::ui;

/// Cues kept for the footer.
const RECENT_CUES: usize = 6;

/// Audio sink that forwards cues to the app instead of playing them.
#[derive(Debug, Clone)]
pub struct CueChannel {
    sender: UnboundedSender<Cue>,
}

impl CueChannel {
    pub fn new() -> (Self, UnboundedReceiver<Cue>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl AudioService for CueChannel {
    fn play(&self, cue: Cue) {
        log::debug!("cue: {}", cue.as_str());
        // Fire and forget: nobody listening is fine.
        let _ = self.sender.send(cue);
    }
}

/// Keyboard and mouse state collected between two frames.
///
/// Terminals report held keys as repeated press events, so a press seen
/// during the frame counts both as pressed and as repeated.
#[derive(Debug, Default)]
pub struct TerminalInput {
    triggered: HashSet<InputAction>,
    pointer: Point,
    pointer_triggered: bool,
    touch_cancelled: bool,
}

impl TerminalInput {
    pub fn action_for(key: &KeyEvent) -> Option<InputAction> {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('z') => Some(InputAction::Ok),
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('x') => Some(InputAction::Cancel),
            KeyCode::Left | KeyCode::Char('h') => Some(InputAction::Left),
            KeyCode::Right | KeyCode::Char('l') => Some(InputAction::Right),
            _ => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if let Some(action) = Self::action_for(&key) {
            self.triggered.insert(action);
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        // Aim at the middle of the cell.
        self.pointer = Point::new(mouse.column as f64 + 0.5, mouse.row as f64 + 0.5);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.pointer_triggered = true,
            MouseEventKind::Down(MouseButton::Right) => self.touch_cancelled = true,
            _ => {}
        }
    }

    pub fn end_frame(&mut self) {
        self.consume();
    }
}

impl InputService for TerminalInput {
    fn is_pressed(&self, action: InputAction) -> bool {
        self.triggered.contains(&action)
    }

    fn is_repeated(&self, action: InputAction) -> bool {
        self.triggered.contains(&action)
    }

    fn pointer(&self) -> Point {
        self.pointer
    }

    fn is_pointer_triggered(&self) -> bool {
        self.pointer_triggered
    }

    fn is_touch_cancelled(&self) -> bool {
        self.touch_cancelled
    }

    fn consume(&mut self) {
        self.triggered.clear();
        self.pointer_triggered = false;
        self.touch_cancelled = false;
    }
}

pub struct AppState {
    pub config: Config,
    pub game: DemoGame,
    pub scene: MenuScene,
    pub input: TerminalInput,
    pub recent_cues: VecDeque<Cue>,
    cues: UnboundedReceiver<Cue>,
}

impl AppState {
    pub fn new(config: Config, game: DemoGame, size: Rect) -> Result<Self> {
        let (audio, cues) = CueChannel::new();
        let rings = ui::layout(size, &config.help).rings;
        let scene = MenuScene::new(
            &config,
            &game,
            audio,
            Point::new(rings.x as f64, rings.y as f64),
            rings.width as f64,
            rings.height as f64,
        )
        .context("Failed to build menu scene")?;

        Ok(Self {
            config,
            game,
            scene,
            input: TerminalInput::default(),
            recent_cues: VecDeque::with_capacity(RECENT_CUES),
            cues,
        })
    }

    /// Returns `false` when the app should quit.
    pub fn handle_event(&mut self, event: CrosstermEvent) -> Result<bool> {
        match event {
            CrosstermEvent::Key(key_event) => Ok(self.handle_key_event(key_event)),
            CrosstermEvent::Mouse(mouse_event) => {
                self.input.handle_mouse(mouse_event);
                Ok(true)
            }
            CrosstermEvent::Resize(width, height) => {
                self.resize(Rect::new(0, 0, width, height));
                Ok(true)
            }
            _ => Ok(true),
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        // Handle Ctrl+C to quit
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return false;
        }
        self.input.handle_key(key);
        true
    }

    pub fn resize(&mut self, size: Rect) {
        let rings = ui::layout(size, &self.config.help).rings;
        log::debug!("ring area resized to {}x{}", rings.width, rings.height);
        self.scene.resize(
            Point::new(rings.x as f64, rings.y as f64),
            rings.width as f64,
            rings.height as f64,
            &self.game,
        );
    }

    /// Runs one menu frame. Returns `false` once the menu has been closed.
    pub fn on_frame(&mut self) -> bool {
        self.scene.update(&mut self.input, &mut self.game);
        self.input.end_frame();
        while let Ok(cue) = self.cues.try_recv() {
            if self.recent_cues.len() == RECENT_CUES {
                self.recent_cues.pop_front();
            }
            self.recent_cues.push_back(cue);
        }
        !self.scene.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state() -> AppState {
        let config = Config::bundled().expect("bundled config");
        let game = DemoGame::bundled().expect("bundled game");
        AppState::new(config, game, Rect::new(0, 0, 100, 30)).expect("state")
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(TerminalInput::action_for(&key(KeyCode::Enter)), Some(InputAction::Ok));
        assert_eq!(TerminalInput::action_for(&key(KeyCode::Char('x'))), Some(InputAction::Cancel));
        assert_eq!(TerminalInput::action_for(&key(KeyCode::Char('h'))), Some(InputAction::Left));
        assert_eq!(TerminalInput::action_for(&key(KeyCode::Right)), Some(InputAction::Right));
        assert_eq!(TerminalInput::action_for(&key(KeyCode::Tab)), None);
    }

    #[test]
    fn releases_are_ignored_and_frames_clear() {
        let mut input = TerminalInput::default();
        input.handle_key(KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert!(!input.is_repeated(InputAction::Ok));

        input.handle_key(key(KeyCode::Enter));
        assert!(input.is_repeated(InputAction::Ok));
        assert!(input.is_pressed(InputAction::Ok));
        input.end_frame();
        assert!(!input.is_repeated(InputAction::Ok));
    }

    #[test]
    fn mouse_buttons_trigger_pointer_and_cancel() {
        let mut input = TerminalInput::default();
        input.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 10,
            row: 4,
            modifiers: KeyModifiers::NONE,
        });
        assert!(input.is_pointer_triggered());
        assert_eq!(input.pointer(), Point::new(10.5, 4.5));

        input.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Right),
            column: 1,
            row: 1,
            modifiers: KeyModifiers::NONE,
        });
        assert!(input.is_touch_cancelled());
        input.consume();
        assert!(!input.is_pointer_triggered());
        assert!(!input.is_touch_cancelled());
        assert_eq!(input.pointer(), Point::new(1.5, 1.5));
    }

    #[test]
    fn ctrl_c_quits() {
        let mut state = state();
        let quit = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(!state.handle_event(CrosstermEvent::Key(quit)).expect("event"));
    }

    #[test]
    fn escape_closes_the_menu_and_logs_the_cue() {
        let mut state = state();
        for _ in 0..40 {
            state.on_frame();
        }
        assert!(state
            .handle_event(CrosstermEvent::Key(key(KeyCode::Esc)))
            .expect("event"));

        let mut running = true;
        for _ in 0..200 {
            running = state.on_frame();
            if !running {
                break;
            }
        }
        assert!(!running);
        assert_eq!(state.recent_cues.back(), Some(&Cue::Cancel));
    }
}
