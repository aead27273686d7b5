use crate::device::{Key, KeyboardState};

const FORWARD_KEYS: &[Key] = &[Key::W, Key::Comma, Key::Up];
const BACK_KEYS: &[Key] = &[Key::S, Key::O, Key::Down];
const LEFT_KEYS: &[Key] = &[Key::A, Key::Left];
const RIGHT_KEYS: &[Key] = &[Key::D, Key::E, Key::Right];

/// The single directional state a player is in for one tick.
///
/// Directions are not combinable. They are checked in the order forward,
/// back, left, right and the first one held wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveIntent {
    Forward,
    Back,
    TurnLeft,
    TurnRight,
    #[default]
    Idle,
}

impl MoveIntent {
    pub fn from_keyboard(keyboard: &impl KeyboardState) -> Self {
        if keyboard.any_down(FORWARD_KEYS) {
            Self::Forward
        } else if keyboard.any_down(BACK_KEYS) {
            Self::Back
        } else if keyboard.any_down(LEFT_KEYS) {
            Self::TurnLeft
        } else if keyboard.any_down(RIGHT_KEYS) {
            Self::TurnRight
        } else {
            Self::Idle
        }
    }

    /// Signed walk factor along the local forward axis.
    pub fn walk_factor(self) -> f32 {
        match self {
            Self::Forward => 1.0,
            Self::Back => -1.0,
            _ => 0.0,
        }
    }

    /// Signed turn factor around the vertical axis (positive turns left).
    pub fn turn_factor(self) -> f32 {
        match self {
            Self::TurnLeft => 1.0,
            Self::TurnRight => -1.0,
            _ => 0.0,
        }
    }
}
