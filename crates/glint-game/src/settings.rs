//! Startup configuration, read once from a TOML file.
//!
//! Every section has defaults, so a missing or partial file is fine. Unknown
//! keys are rejected to catch typos.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use glint_engine::coords::{Rect, Vec2, Viewport};
use glint_engine::submit::{BusyPolicy, SubmissionMode};
use glint_engine::window::WindowConfig;

use crate::controls::Bindings;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory texture paths are resolved against.
    pub assets_dir: PathBuf,
    pub window: WindowConfig,
    pub target: TargetSettings,
    pub render: RenderSettings,
    pub camera: CameraSettings,
    pub controls: Bindings,
    pub level: LevelSettings,
    pub debug: DebugSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            window: WindowConfig::default(),
            target: TargetSettings::default(),
            render: RenderSettings::default(),
            camera: CameraSettings::default(),
            controls: Bindings::default(),
            level: LevelSettings::default(),
            debug: DebugSettings::default(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path`, or returns the defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            let settings = Self::load(path)?;
            log::info!("loaded settings from {}", path.display());
            Ok(settings)
        } else {
            log::info!("{} not found; using default settings", path.display());
            Ok(Self::default())
        }
    }
}

/// Fixed logical resolution the game is laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetSettings {
    pub enabled: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 1280,
            height: 720,
        }
    }
}

impl TargetSettings {
    pub fn viewport(&self) -> Option<Viewport> {
        (self.enabled && self.width > 0 && self.height > 0)
            .then(|| Viewport::from_pixels(self.width, self.height))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    pub submission: SubmissionMode,
    pub busy_policy: BusyPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraSettings {
    /// World units per second at scale 1.
    pub pan_speed: f32,
    /// Scale units per second while a zoom key is held.
    pub zoom_speed: f32,
    /// Scale change per wheel line.
    pub wheel_zoom_step: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub initial_scale: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            pan_speed: 1000.0,
            zoom_speed: 1.0,
            wheel_zoom_step: 0.1,
            min_scale: 0.25,
            max_scale: 4.0,
            initial_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelSettings {
    pub columns: u32,
    pub rows: u32,
    pub tile_size: f32,
    /// Font used by the level, relative to `assets_dir`.
    pub font: String,
    /// Horizontal strip of `tile_frames` equally sized frames.
    pub tile_texture: String,
    pub tile_frames: u32,
    pub frame_seconds: f32,
    pub tilters: Vec<TilterSettings>,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            columns: 40,
            rows: 30,
            tile_size: 64.0,
            font: "fonts/DejaVuSans.ttf".to_string(),
            tile_texture: "textures/tiles.png".to_string(),
            tile_frames: 2,
            frame_seconds: 0.5,
            tilters: vec![TilterSettings::default()],
        }
    }
}

impl LevelSettings {
    pub fn map_rect(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.columns as f32 * self.tile_size,
            self.rows as f32 * self.tile_size,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TilterSettings {
    pub base_texture: String,
    pub mirror_texture: String,
    /// x, y, width, height in world units.
    pub base_rect: [f32; 4],
    /// Normalized sub-rect of the base texture.
    pub base_uv: [f32; 4],
    pub pivot: [f32; 2],
    /// Degrees.
    pub angle: f32,
}

impl Default for TilterSettings {
    fn default() -> Self {
        Self {
            base_texture: "textures/tilter.png".to_string(),
            mirror_texture: "textures/mirror.png".to_string(),
            base_rect: [608.0, 420.0, 64.0, 64.0],
            base_uv: [0.0, 0.0, 1.0, 1.0],
            pivot: [640.0, 300.0],
            angle: 45.0,
        }
    }
}

impl TilterSettings {
    pub fn base_rect(&self) -> Rect {
        Rect::from(self.base_rect)
    }

    pub fn base_uv(&self) -> Rect {
        Rect::from(self.base_uv)
    }

    pub fn pivot(&self) -> Vec2 {
        Vec2::from(self.pivot)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebugSettings {
    /// Draw markers at each tilter's mirror end points.
    pub show_mirror_points: bool,
    /// Log update/draw durations every frame at trace level.
    pub log_frame_timing: bool,
}
