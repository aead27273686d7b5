use glam::Vec2;
use std::collections::HashSet;

/// Keys the game reacts to. Platform key codes are mapped onto these by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    E,
    O,
    Comma,
    Up,
    Down,
    Left,
    Right,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Poll-based keyboard query.
pub trait KeyboardState {
    fn is_key_down(&self, key: Key) -> bool;

    fn any_down(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.is_key_down(*k))
    }
}

/// Poll-based mouse query.
pub trait MouseState {
    /// Relative motion accumulated since the last capture.
    fn relative_motion(&self) -> Vec2;
    fn button_down(&self, button: MouseButton) -> bool;
}

/// Keyboard and mouse state captured for one rendered frame.
///
/// The shell feeds device events in as they arrive; `capture` freezes them
/// into the snapshot game logic polls, and resets relative motion.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    keys: HashSet<Key>,
    buttons: HashSet<MouseButton>,
    motion: Vec2,
    pending_motion: Vec2,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.keys.insert(key);
        } else {
            self.keys.remove(&key);
        }
    }

    pub fn set_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons.insert(button);
        } else {
            self.buttons.remove(&button);
        }
    }

    /// Accumulate raw mouse motion until the next capture.
    pub fn add_motion(&mut self, dx: f32, dy: f32) {
        self.pending_motion += Vec2::new(dx, dy);
    }

    /// Freeze motion received since the previous capture.
    pub fn capture(&mut self) {
        self.motion = std::mem::take(&mut self.pending_motion);
    }

    /// Forget everything, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl KeyboardState for InputSnapshot {
    fn is_key_down(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }
}

impl MouseState for InputSnapshot {
    fn relative_motion(&self) -> Vec2 {
        self.motion
    }

    fn button_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }
}
