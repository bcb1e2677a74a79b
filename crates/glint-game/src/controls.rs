//! Logical actions and their key bindings.
//!
//! Game code asks about actions ("pan left held?"), never about keys; the
//! bindings table is the only place that knows which keys mean what.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use glint_engine::coords::Vec2;
use glint_engine::input::{InputSnapshot, InputState, Key, MouseButton};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
    ZoomIn,
    ZoomOut,
    ToggleFullscreen,
    Quit,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::PanUp,
        Action::PanDown,
        Action::PanLeft,
        Action::PanRight,
        Action::ZoomIn,
        Action::ZoomOut,
        Action::ToggleFullscreen,
        Action::Quit,
    ];

    fn default_keys(self) -> &'static [Key] {
        match self {
            Action::PanUp => &[Key::W, Key::ArrowUp],
            Action::PanDown => &[Key::S, Key::ArrowDown],
            Action::PanLeft => &[Key::A, Key::ArrowLeft],
            Action::PanRight => &[Key::D, Key::ArrowRight],
            Action::ZoomIn => &[Key::E, Key::Equal],
            Action::ZoomOut => &[Key::Q, Key::Minus],
            Action::ToggleFullscreen => &[Key::F, Key::F11],
            Action::Quit => &[Key::Escape],
        }
    }
}

/// Action → keys table.
///
/// Deserialises from a partial map; actions it does not mention keep their
/// default keys. An empty list unbinds an action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "HashMap<Action, Vec<Key>>")]
pub struct Bindings {
    keys: HashMap<Action, Vec<Key>>,
}

impl Default for Bindings {
    fn default() -> Self {
        Self {
            keys: Action::ALL
                .iter()
                .map(|&a| (a, a.default_keys().to_vec()))
                .collect(),
        }
    }
}

impl From<HashMap<Action, Vec<Key>>> for Bindings {
    fn from(overrides: HashMap<Action, Vec<Key>>) -> Self {
        let mut bindings = Bindings::default();
        bindings.keys.extend(overrides);
        bindings
    }
}

impl Bindings {
    pub fn keys(&self, action: Action) -> &[Key] {
        self.keys.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bind(&mut self, action: Action, keys: Vec<Key>) {
        self.keys.insert(action, keys);
    }

    fn any_down(&self, action: Action, snapshot: &InputSnapshot) -> bool {
        self.keys(action).iter().any(|&k| snapshot.key_down(k))
    }
}

/// Per-frame view of the input in terms of actions and a world-space pointer.
#[derive(Debug, Clone, Default)]
pub struct Controls {
    bindings: Bindings,
    held: HashSet<Action>,
    pressed: HashSet<Action>,
    pointer: Vec2,
    pointer_down: bool,
    pointer_pressed: bool,
    scroll: f32,
}

impl Controls {
    pub fn new(bindings: Bindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Refreshes from `input`.
    ///
    /// `pointer` is the cursor already mapped into view space; `camera_offset`
    /// moves it into world space.
    pub fn update(&mut self, input: &InputState, pointer: Vec2, camera_offset: Vec2) {
        self.held.clear();
        self.pressed.clear();

        for action in Action::ALL {
            let now = self.bindings.any_down(action, input.current());
            if now {
                self.held.insert(action);
                // Edge on the action, so switching between two bound keys is not a press.
                if !self.bindings.any_down(action, input.previous()) {
                    self.pressed.insert(action);
                }
            }
        }

        self.pointer = pointer + camera_offset;
        self.pointer_down = input.button_down(MouseButton::Left);
        self.pointer_pressed = input.button_pressed(MouseButton::Left);
        self.scroll = input.scroll();
    }

    pub fn held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// True only on the frame the action went from released to held.
    pub fn pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    /// Pointer in world coordinates.
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn pointer_down(&self) -> bool {
        self.pointer_down
    }

    pub fn pointer_pressed(&self) -> bool {
        self.pointer_pressed
    }

    /// Wheel lines this frame; positive is away from the user.
    pub fn scroll(&self) -> f32 {
        self.scroll
    }
}
