//! Glint game crate.
//!
//! Holds the application loop and everything it drives: settings, control
//! bindings, asset loading, the level scene and the tilter widget. Platform
//! and GPU access go through the `glint-engine` traits, so the whole loop can
//! run against test doubles.

pub mod app;
pub mod assets;
pub mod controls;
pub mod scene;
pub mod settings;
pub mod widgets;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{App, DrawOutcome, FrameStats, SkipReason};
pub use settings::Settings;
