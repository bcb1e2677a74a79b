//! Scene elements driven by the loop.

mod element;
mod level;
mod sprite;

pub use element::Element;
pub use level::Level;
pub use sprite::Sprite;
