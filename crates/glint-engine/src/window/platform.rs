use anyhow::Result;
use serde::Deserialize;

use crate::input::InputState;

/// Window creation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    /// Initial inner size in logical pixels.
    pub width: u32,
    pub height: u32,
    /// Keep the initial aspect ratio when the user resizes the window.
    pub fixed_aspect: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "glint".to_string(),
            width: 1280,
            height: 720,
            fixed_aspect: false,
        }
    }
}

impl WindowConfig {
    pub fn aspect(&self) -> Option<f32> {
        (self.width > 0 && self.height > 0).then(|| self.width as f32 / self.height as f32)
    }
}

/// What a poll observed besides input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Polled {
    /// Latest framebuffer size in physical pixels, if it changed.
    pub resized: Option<(u32, u32)>,
}

/// Window system as seen by the game loop.
pub trait Platform {
    /// Processes pending events without blocking.
    ///
    /// This is the only place input state is written by the window system.
    fn poll_events(&mut self, input: &mut InputState) -> Result<Polled>;

    /// Framebuffer size in physical pixels.
    fn window_size(&self) -> (u32, u32);

    fn toggle_fullscreen(&mut self);

    fn is_fullscreen(&self) -> bool;

    fn request_close(&mut self);

    fn should_close(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_from_initial_size() {
        let config = WindowConfig::default();
        assert_eq!(config.aspect(), Some(1280.0 / 720.0));
        let degenerate = WindowConfig {
            height: 0,
            ..WindowConfig::default()
        };
        assert_eq!(degenerate.aspect(), None);
    }
}
