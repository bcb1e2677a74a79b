//! Window platform.
//!
//! The game loop pulls events instead of being called back: each
//! `Platform::poll_events` drains whatever the window system has queued,
//! applies input to the caller's `InputState` and reports resizes.

mod platform;
mod winit;

pub use platform::{Platform, Polled, WindowConfig};
pub use self::winit::WinitPlatform;
pub use ::winit::window::Window;
