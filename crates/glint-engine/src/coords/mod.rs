//! Coordinate and geometry types shared by the engine and the game.
//!
//! Canonical CPU space:
//! - logical pixels of the target resolution
//! - origin top-left
//! - +X right, +Y down
//!
//! Rotations are expressed in degrees, clockwise on screen (because +Y points down).

mod corrector;
mod rect;
mod vec2;
mod viewport;

pub use corrector::CoordinateCorrector;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
