//! Session configuration, loaded from TOML at startup.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::error::EngineError;
use crate::game::bomb::DEFAULT_BOMB_MOVES;
use crate::game::types::Color;

/// More colors than a single cell can ever have excluded.
pub const MIN_PALETTE_SIZE: usize = 7;
/// Largest accepted width or height.
pub const MAX_GRID_SIDE: u32 = 1024;

/// Animation durations handed to the renderer, in seconds. Logic never
/// waits on them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationTimings {
    #[serde(default = "default_rotate_secs")]
    pub rotate_secs: f32,
    #[serde(default = "default_fall_secs")]
    pub fall_secs: f32,
    #[serde(default = "default_spawn_secs")]
    pub spawn_secs: f32,
}

fn default_rotate_secs() -> f32 {
    0.25
}
fn default_fall_secs() -> f32 {
    0.25
}
fn default_spawn_secs() -> f32 {
    1.0
}

impl Default for AnimationTimings {
    fn default() -> Self {
        Self {
            rotate_secs: default_rotate_secs(),
            fall_secs: default_fall_secs(),
            spawn_secs: default_spawn_secs(),
        }
    }
}

impl AnimationTimings {
    /// All durations collapsed to zero, for headless play.
    pub fn instant() -> Self {
        Self {
            rotate_secs: 0.0,
            fall_secs: 0.0,
            spawn_secs: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_palette")]
    pub palette: Vec<Color>,
    #[serde(default = "default_score_multiplier")]
    pub score_multiplier: u64,
    #[serde(default = "default_bomb_moves")]
    pub bomb_initial_moves: u32,
    #[serde(default = "default_bomb_threshold")]
    pub bomb_spawn_threshold: u64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub timings: AnimationTimings,
}

fn default_width() -> u32 {
    8
}
fn default_height() -> u32 {
    9
}
fn default_score_multiplier() -> u64 {
    5
}
fn default_bomb_moves() -> u32 {
    DEFAULT_BOMB_MOVES
}
fn default_bomb_threshold() -> u64 {
    50
}

pub fn default_palette() -> Vec<Color> {
    vec![
        Color::rgb(0.91, 0.30, 0.24), // red
        Color::rgb(0.18, 0.80, 0.44), // green
        Color::rgb(0.20, 0.60, 0.86), // blue
        Color::rgb(0.95, 0.77, 0.06), // yellow
        Color::rgb(0.61, 0.35, 0.71), // purple
        Color::rgb(0.10, 0.74, 0.61), // teal
        Color::rgb(0.90, 0.49, 0.13), // orange
    ]
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            palette: default_palette(),
            score_multiplier: default_score_multiplier(),
            bomb_initial_moves: default_bomb_moves(),
            bomb_spawn_threshold: default_bomb_threshold(),
            seed: None,
            timings: AnimationTimings::default(),
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width < 2 || self.height < 2 {
            return Err(EngineError::Configuration(format!(
                "grid must be at least 2x2, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > MAX_GRID_SIDE || self.height > MAX_GRID_SIDE {
            return Err(EngineError::Configuration(format!(
                "grid sides are capped at {MAX_GRID_SIDE}, got {}x{}",
                self.width, self.height
            )));
        }
        if self.palette.len() < MIN_PALETTE_SIZE {
            return Err(EngineError::Configuration(format!(
                "palette needs at least {MIN_PALETTE_SIZE} colors, got {}",
                self.palette.len()
            )));
        }
        for (i, a) in self.palette.iter().enumerate() {
            if self.palette[i + 1..].iter().any(|b| a.matches(b)) {
                return Err(EngineError::Configuration(format!(
                    "palette color {i} is indistinguishable from a later entry"
                )));
            }
        }
        if self.score_multiplier == 0 {
            return Err(EngineError::Configuration("score_multiplier must be positive".into()));
        }
        if self.bomb_spawn_threshold == 0 {
            return Err(EngineError::Configuration("bomb_spawn_threshold must be positive".into()));
        }
        if self.bomb_initial_moves == 0 {
            return Err(EngineError::Configuration("bomb_initial_moves must be positive".into()));
        }
        Ok(())
    }
}

/// Load and validate a config from a TOML file.
pub fn load_config(path: &Path) -> Result<GameConfig, EngineError> {
    let content = std::fs::read_to_string(path).map_err(|e| EngineError::ConfigIo {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let config: GameConfig = toml::from_str(&content).map_err(|e| EngineError::ConfigIo {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    config.validate()?;
    Ok(config)
}

/// Try well-known paths, falling back to built-in defaults.
pub fn load_default_config() -> GameConfig {
    let candidates = ["hexfall.toml", "../hexfall.toml", "/etc/hexfall/hexfall.toml"];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_config(p) {
                Ok(config) => {
                    tracing::info!(
                        path = %p.display(),
                        width = config.width,
                        height = config.height,
                        "loaded config"
                    );
                    return config;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load config");
                }
            }
        }
    }
    tracing::info!("no hexfall.toml found, using built-in defaults");
    GameConfig::default()
}
