//! Glint engine crate.
//!
//! Owns the platform, timing, input and GPU pieces the game loop drives. The
//! loop itself lives in `glint-game`; everything here is reusable plumbing.

pub mod camera;
pub mod coords;
pub mod device;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod submit;
pub mod time;
pub mod window;
