//! Interactive scene widgets.

pub mod tilter;

pub use tilter::{Tilter, TilterState};
