//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Platform code translates window-system events into `InputEvent`s and applies
//! them to an `InputState` while the event queue is being pumped; the game loop
//! reads the state only after the pump returns.

pub mod platform;
mod snapshot;
mod state;
mod types;

pub use snapshot::InputSnapshot;
pub use state::InputState;
pub use types::{InputEvent, Key, KeyState, MouseButton, MouseButtonState};
