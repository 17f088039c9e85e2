pub mod config;
pub mod game;
pub mod scene;
pub mod state;

pub use config::{Config, ConfigError, RingConfig};
pub use game::DemoGame;
pub use scene::{MenuKind, MenuScene, SceneAction};
pub use state::{AppState, CueChannel, TerminalInput};

use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use ratatui::layout::Rect;

use std::env;

pub struct App {
    pub state: AppState,
}

impl App {
    /// Loads `config.toml` and `demo_game.json` from next to the executable,
    /// falling back to the bundled copies.
    pub fn new(size: Rect) -> Result<Self> {
        let mut config_path = env::current_exe()?;
        config_path.set_file_name("config.toml");
        let config = Config::load_or_default(&config_path)?;

        let mut game_path = config_path.clone();
        game_path.set_file_name("demo_game.json");
        let game = DemoGame::load_or_default(&game_path)?;

        let state = AppState::new(config, game, size)?;
        Ok(Self { state })
    }

    pub fn frame_duration_ms(&self) -> u64 {
        self.state.config.frame_duration_ms()
    }

    pub fn handle_event(&mut self, event: CrosstermEvent) -> Result<bool> {
        self.state.handle_event(event)
    }

    pub fn on_frame(&mut self) -> bool {
        self.state.on_frame()
    }
}
