//! Paint model shared between the scene and the renderer.

pub mod color;

pub use color::Color;
