use glam::{Quat, Vec3};
use tankyard_common::GameConfig;
use tankyard_input::{KeyboardState, MouseButton, MouseState, MoveIntent};

use crate::data::PlayerData;

/// Maps the local keyboard and mouse to a movement intent on `PlayerData`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputComponent {
    pub walk_speed: f32,
    /// Radians per second.
    pub rotation_speed: f32,
    /// Degrees per mouse count.
    pub pitch_speed: f32,
    pub pitch_min: f32,
    pub pitch_max: f32,
}

impl InputComponent {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            walk_speed: config.walk_speed,
            rotation_speed: config.rotation_speed,
            pitch_speed: config.pitch_speed,
            pitch_min: config.pitch_min,
            pitch_max: config.pitch_max,
        }
    }

    /// Apply this tick's input. Walking and turning are exclusive: walking
    /// sets the velocity along the local forward axis, turning leaves the
    /// player standing and rotates it around +Y.
    pub fn update(
        &self,
        data: &mut PlayerData,
        keyboard: &impl KeyboardState,
        mouse: &impl MouseState,
        dt: f32,
    ) -> MoveIntent {
        let intent = MoveIntent::from_keyboard(keyboard);
        data.velocity = Vec3::ZERO;
        match intent {
            MoveIntent::Forward | MoveIntent::Back => {
                data.velocity =
                    data.orientation * Vec3::new(0.0, 0.0, -self.walk_speed * intent.walk_factor());
            }
            MoveIntent::TurnLeft | MoveIntent::TurnRight => {
                let turn = Quat::from_rotation_y(intent.turn_factor() * self.rotation_speed * dt);
                data.orientation = (turn * data.orientation).normalize();
            }
            MoveIntent::Idle => {}
        }

        if mouse.button_down(MouseButton::Right) {
            let dy = mouse.relative_motion().y;
            data.pitch = (data.pitch - dy * self.pitch_speed).clamp(self.pitch_min, self.pitch_max);
        }
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tankyard_input::{InputSnapshot, Key};

    const DT: f32 = 1.0 / 60.0;

    fn component() -> InputComponent {
        InputComponent::from_config(&GameConfig::default())
    }

    fn keys(held: &[Key]) -> InputSnapshot {
        let mut input = InputSnapshot::new();
        for key in held {
            input.set_key(*key, true);
        }
        input
    }

    #[test]
    fn forward_walks_along_local_negative_z() {
        let mut data = PlayerData::default();
        let input = keys(&[Key::W]);
        component().update(&mut data, &input, &input, DT);
        assert_eq!(data.velocity, Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn back_walks_along_local_positive_z_in_facing_frame() {
        let mut data = PlayerData {
            orientation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            ..PlayerData::default()
        };
        let input = keys(&[Key::S]);
        component().update(&mut data, &input, &input, DT);
        // facing -X after a quarter turn left, so backing up heads toward +X
        assert!((data.velocity - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn forward_and_left_only_walks() {
        let mut data = PlayerData::default();
        let input = keys(&[Key::W, Key::A]);
        let intent = component().update(&mut data, &input, &input, DT);
        assert_eq!(intent, MoveIntent::Forward);
        assert_eq!(data.orientation, Quat::IDENTITY);
        assert_eq!(data.velocity, Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn turning_stops_walking() {
        let mut data = PlayerData {
            velocity: Vec3::new(0.0, 0.0, -5.0),
            ..PlayerData::default()
        };
        let input = keys(&[Key::D]);
        component().update(&mut data, &input, &input, DT);
        assert_eq!(data.velocity, Vec3::ZERO);
        assert!(data.orientation.to_axis_angle().1 > 0.0);
    }

    #[test]
    fn left_turns_counter_clockwise() {
        let mut data = PlayerData::default();
        let input = keys(&[Key::A]);
        component().update(&mut data, &input, &input, 0.5);
        let expected = Quat::from_rotation_y(1.0);
        assert!(data.orientation.dot(expected).abs() > 0.99999);
    }

    #[test]
    fn orientation_stays_unit_after_many_turns() {
        let mut data = PlayerData::default();
        let left = keys(&[Key::Left]);
        let right = keys(&[Key::Right]);
        let c = component();
        for i in 0..20_000 {
            let input = if i % 7 < 4 { &left } else { &right };
            c.update(&mut data, input, input, DT);
        }
        assert!((data.orientation.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn right_drag_tilts_cannon_within_limits() {
        let mut data = PlayerData::default();
        let mut input = InputSnapshot::new();
        input.set_button(MouseButton::Right, true);
        input.add_motion(0.0, -50.0);
        input.capture();
        let c = component();
        c.update(&mut data, &input, &input, DT);
        assert!((data.pitch - 10.0).abs() < 1e-5);

        input.add_motion(0.0, -10_000.0);
        input.capture();
        c.update(&mut data, &input, &input, DT);
        assert_eq!(data.pitch, c.pitch_max);

        input.add_motion(0.0, 10_000.0);
        input.capture();
        c.update(&mut data, &input, &input, DT);
        assert_eq!(data.pitch, c.pitch_min);
    }

    #[test]
    fn mouse_motion_without_button_leaves_pitch() {
        let mut data = PlayerData::default();
        let mut input = InputSnapshot::new();
        input.add_motion(0.0, -50.0);
        input.capture();
        component().update(&mut data, &input, &input, DT);
        assert_eq!(data.pitch, 0.0);
    }
}
