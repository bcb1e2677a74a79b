use crate::coords::Vec2;

use super::snapshot::InputSnapshot;
use super::types::{InputEvent, Key, KeyState, MouseButton, MouseButtonState};

/// Double-buffered input: the snapshot being filled this frame plus a copy of
/// the previous frame's, for press/release edge detection.
///
/// Writers are the platform's event callbacks during a poll; the game loop is
/// the only reader and calls [`end_frame`](InputState::end_frame) once per frame.
#[derive(Debug, Default)]
pub struct InputState {
    current: InputSnapshot,
    previous: InputSnapshot,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one platform event to the current snapshot.
    pub fn apply_event(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    self.current.keys.insert(key);
                }
                KeyState::Released => {
                    self.current.keys.remove(&key);
                }
            },

            InputEvent::CursorMoved { x, y } => {
                self.current.cursor = Vec2::new(x, y);
            }

            InputEvent::Scroll { delta } => {
                self.current.scroll += delta;
            }

            InputEvent::MouseButton { button, state } => match state {
                MouseButtonState::Pressed => {
                    self.current.buttons.insert(button);
                }
                MouseButtonState::Released => {
                    self.current.buttons.remove(&button);
                }
            },
        }
    }

    /// Commits the current snapshot as "previous" and clears per-frame fields.
    pub fn end_frame(&mut self) {
        self.previous.clone_from(&self.current);
        self.current.scroll = 0.0;
    }

    pub fn current(&self) -> &InputSnapshot {
        &self.current
    }

    pub fn previous(&self) -> &InputSnapshot {
        &self.previous
    }

    #[inline]
    pub fn key_down(&self, key: Key) -> bool {
        self.current.key_down(key)
    }

    /// True only on the frame the key went from released to pressed.
    #[inline]
    pub fn key_pressed(&self, key: Key) -> bool {
        self.current.key_down(key) && !self.previous.key_down(key)
    }

    #[inline]
    pub fn key_released(&self, key: Key) -> bool {
        !self.current.key_down(key) && self.previous.key_down(key)
    }

    #[inline]
    pub fn button_down(&self, button: MouseButton) -> bool {
        self.current.button_down(button)
    }

    #[inline]
    pub fn button_pressed(&self, button: MouseButton) -> bool {
        self.current.button_down(button) && !self.previous.button_down(button)
    }

    #[inline]
    pub fn cursor(&self) -> Vec2 {
        self.current.cursor
    }

    #[inline]
    pub fn scroll(&self) -> f32 {
        self.current.scroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key { key, state, repeat: false }
    }

    #[test]
    fn press_edge_fires_once_while_held() {
        let mut input = InputState::new();
        input.apply_event(key(Key::F, KeyState::Pressed));
        assert!(input.key_pressed(Key::F));
        input.end_frame();

        // Still held, no new events: no edge.
        assert!(input.key_down(Key::F));
        assert!(!input.key_pressed(Key::F));
        input.end_frame();
        assert!(!input.key_pressed(Key::F));
    }

    #[test]
    fn repeat_events_do_not_create_new_edges() {
        let mut input = InputState::new();
        input.apply_event(key(Key::F, KeyState::Pressed));
        input.end_frame();
        input.apply_event(InputEvent::Key { key: Key::F, state: KeyState::Pressed, repeat: true });
        assert!(!input.key_pressed(Key::F));
    }

    #[test]
    fn release_edge_is_reported() {
        let mut input = InputState::new();
        input.apply_event(key(Key::A, KeyState::Pressed));
        input.end_frame();
        input.apply_event(key(Key::A, KeyState::Released));
        assert!(input.key_released(Key::A));
        assert!(!input.key_down(Key::A));
    }

    #[test]
    fn press_and_release_within_one_poll_is_invisible() {
        let mut input = InputState::new();
        input.apply_event(key(Key::Escape, KeyState::Pressed));
        input.apply_event(key(Key::Escape, KeyState::Released));
        assert!(!input.key_pressed(Key::Escape));
    }

    #[test]
    fn scroll_accumulates_and_resets_each_frame() {
        let mut input = InputState::new();
        input.apply_event(InputEvent::Scroll { delta: 1.0 });
        input.apply_event(InputEvent::Scroll { delta: 0.5 });
        assert_eq!(input.scroll(), 1.5);
        input.end_frame();
        assert_eq!(input.scroll(), 0.0);
        assert_eq!(input.previous().scroll, 1.5);
    }

    #[test]
    fn cursor_event_only_touches_cursor() {
        let mut input = InputState::new();
        input.apply_event(key(Key::W, KeyState::Pressed));
        input.apply_event(InputEvent::MouseButton {
            button: MouseButton::Left,
            state: MouseButtonState::Pressed,
        });
        let before = input.current().clone();

        input.apply_event(InputEvent::CursorMoved { x: 3.0, y: 4.0 });

        assert_eq!(input.current().keys, before.keys);
        assert_eq!(input.current().buttons, before.buttons);
        assert_eq!(input.current().scroll, before.scroll);
        assert_eq!(input.cursor(), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn button_press_edge() {
        let mut input = InputState::new();
        input.apply_event(InputEvent::MouseButton {
            button: MouseButton::Left,
            state: MouseButtonState::Pressed,
        });
        assert!(input.button_pressed(MouseButton::Left));
        input.end_frame();
        assert!(input.button_down(MouseButton::Left));
        assert!(!input.button_pressed(MouseButton::Left));
    }
}
