use std::collections::HashSet;

use crate::coords::Vec2;

use super::types::{Key, MouseButton};

/// One frame's worth of input state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    /// Keys currently held.
    pub keys: HashSet<Key>,

    /// Mouse buttons currently held.
    pub buttons: HashSet<MouseButton>,

    /// Last reported cursor position in window pixels.
    pub cursor: Vec2,

    /// Wheel movement accumulated since the last `InputState::end_frame`.
    pub scroll: f32,
}

impl InputSnapshot {
    #[inline]
    pub fn key_down(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    #[inline]
    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }
}
