use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::menu::{Formula, FormulaContext, FormulaError, Icon, MainMenuTexts, Point, RingMenuOptions};

// Embedded default configuration, written next to the executable when an
// external config file is missing.
const DEFAULT_CONFIG: &str = include_str!("../../config.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot evaluate `{field}`: {source}")]
    Formula {
        field: &'static str,
        source: FormulaError,
    },
    #[error("frame_rate must be between 1 and 240, got {0}")]
    FrameRate(u32),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub general: GeneralConfig,
    #[serde(default)]
    pub text: TextConfig,
    #[serde(default)]
    pub help: HelpConfig,
    pub ring: RingsConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub app_name: String,
    /// Frames per second. Every frame runs one menu update.
    pub frame_rate: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TextConfig {
    pub cancel: String,
    pub item: String,
    pub skill: String,
    pub equip: String,
    pub status: String,
    pub formation: String,
    pub options: String,
    pub save: String,
    pub game_end: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        let texts = MainMenuTexts::default();
        Self {
            cancel: "Cancel".into(),
            item: texts.item,
            skill: texts.skill,
            equip: texts.equip,
            status: texts.status,
            formation: texts.formation,
            options: texts.options,
            save: texts.save,
            game_end: texts.game_end,
        }
    }
}

impl TextConfig {
    pub fn menu_texts(&self) -> MainMenuTexts {
        MainMenuTexts {
            item: self.item.clone(),
            skill: self.skill.clone(),
            equip: self.equip.clone(),
            status: self.status.clone(),
            formation: self.formation.clone(),
            options: self.options.clone(),
            save: self.save.clone(),
            game_end: self.game_end.clone(),
        }
    }
}

/// Help window placement, in cells. A zero width spans the whole screen.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HelpConfig {
    pub visible: bool,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            visible: true,
            x: 0,
            y: 0,
            width: 0,
            height: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RingsConfig {
    pub main: RingConfig,
    pub party: RingConfig,
    pub item: RingConfig,
    pub skill: RingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RingConfig {
    pub centre_x: Formula,
    pub centre_y: Formula,
    pub radius_x: Formula,
    pub radius_y: Formula,
    /// Degrees.
    #[serde(default = "default_starting_angle")]
    pub starting_angle: f64,
    #[serde(default = "default_rotation")]
    pub rotation: f64,
    #[serde(default)]
    pub scale: f64,
    #[serde(default)]
    pub show_actor_sprite: bool,
    #[serde(default = "default_time")]
    pub default_time: u32,
    #[serde(default)]
    pub icons: BTreeMap<String, Icon>,
}

fn default_starting_angle() -> f64 {
    -90.0
}

fn default_rotation() -> f64 {
    -1.0
}

fn default_time() -> u32 {
    crate::menu::DEFAULT_ANIMATION_FRAMES
}

impl RingConfig {
    /// Evaluates the centre and full-size radius for the current screen.
    pub fn placement(&self, context: &FormulaContext) -> Result<(Point, Point), ConfigError> {
        let eval = |field: &'static str, formula: &Formula| {
            formula
                .eval(context)
                .map_err(|source| ConfigError::Formula { field, source })
        };
        let centre = Point::new(
            eval("centre_x", &self.centre_x)?,
            eval("centre_y", &self.centre_y)?,
        );
        let radius = Point::new(
            eval("radius_x", &self.radius_x)?,
            eval("radius_y", &self.radius_y)?,
        );
        Ok((centre, radius))
    }

    pub fn options(
        &self,
        context: &FormulaContext,
        cancel_text: &str,
    ) -> Result<RingMenuOptions, ConfigError> {
        let (centre, radius) = self.placement(context)?;
        Ok(RingMenuOptions {
            centre,
            radius,
            starting_angle: self.starting_angle.to_radians(),
            rotation: self.rotation,
            scale: self.scale,
            default_time: self.default_time,
            show_actor_sprite: self.show_actor_sprite,
            cancel_text: cancel_text.to_string(),
            icons: self
                .icons
                .iter()
                .map(|(id, icon)| (id.clone(), icon.clone()))
                .collect(),
            ..RingMenuOptions::default()
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThemeConfig {
    pub background: String,
    pub foreground: String,
    pub selected: String,
    pub disabled: String,
    pub accent: String,
    pub help: String,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;
        config.validate()?;

        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;

        Ok(())
    }

    pub fn bundled() -> Result<Self> {
        let config: Config =
            toml::from_str(DEFAULT_CONFIG).context("Failed to parse bundled default config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::load(path.as_ref()) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path.as_ref());
                Ok(config)
            }
            Err(load_err) => {
                log::warn!(
                    "Falling back to bundled default config: {}. A new config will be written to {:?} if possible.",
                    load_err,
                    path.as_ref()
                );

                let default_config = Self::bundled()?;

                if let Err(save_err) = default_config.save(path.as_ref()) {
                    log::warn!("Failed to write default config: {}", save_err);
                }

                Ok(default_config)
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=240).contains(&self.general.frame_rate) {
            return Err(ConfigError::FrameRate(self.general.frame_rate));
        }
        Ok(())
    }

    pub fn frame_duration_ms(&self) -> u64 {
        1000 / u64::from(self.general.frame_rate.max(1))
    }
}
