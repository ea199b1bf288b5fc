//! Horizontal move requests.
//!
//! Turns a [`MovementIntent`] into the raw displacement for one tick. The
//! displacement is then resolved by [`crate::detection::resolve_move`] and
//! applied by the integration system.

use bevy::prelude::*;

use crate::config::{CharacterFacing, ControllerConfig};
use crate::intent::MovementIntent;

/// Raw horizontal displacement requested for a tick of length `dt`.
///
/// Forward and strafe input move at `move_speed`; the backward component is
/// slowed by `backward_factor`. Diagonal input is not faster than straight
/// input.
pub fn requested_displacement(
    intent: &MovementIntent,
    facing: &CharacterFacing,
    config: &ControllerConfig,
    dt: f32,
) -> Vec3 {
    if !intent.is_moving() {
        return Vec3::ZERO;
    }

    let mut local = intent.planar;
    let length = local.length();
    if length > 1.0 {
        local /= length;
    }
    if intent.is_backward() {
        local.y *= config.backward_factor;
    }

    facing.to_world(local) * (config.move_speed * intent.speed * dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(planar: Vec2) -> MovementIntent {
        let mut intent = MovementIntent::new();
        intent.set_planar(planar);
        intent
    }

    #[test]
    fn no_input_no_request() {
        let request = requested_displacement(
            &MovementIntent::new(),
            &CharacterFacing::default(),
            &ControllerConfig::default(),
            1.0 / 60.0,
        );
        assert_eq!(request, Vec3::ZERO);
    }

    #[test]
    fn forward_uses_eye_direction_and_speed() {
        let config = ControllerConfig::default().with_move_speed(6.0);
        let facing = CharacterFacing::from_forward(Vec3::X).unwrap();

        let request = requested_displacement(&intent(Vec2::Y), &facing, &config, 0.5);
        assert!(request.abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn backward_is_slowed() {
        let config = ControllerConfig::default()
            .with_move_speed(4.0)
            .with_backward_factor(0.5);
        let facing = CharacterFacing::default();

        let request = requested_displacement(&intent(Vec2::NEG_Y), &facing, &config, 1.0);
        assert!(request.abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-6));
    }

    #[test]
    fn strafe_is_full_speed() {
        let config = ControllerConfig::default().with_move_speed(4.0);
        let facing = CharacterFacing::default();

        let request = requested_displacement(&intent(Vec2::NEG_X), &facing, &config, 1.0);
        assert!(request.abs_diff_eq(Vec3::new(-4.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn diagonal_is_not_faster() {
        let config = ControllerConfig::default().with_move_speed(1.0);
        let facing = CharacterFacing::default();

        let request = requested_displacement(&intent(Vec2::ONE), &facing, &config, 1.0);
        assert!((request.length() - 1.0).abs() < 1e-6);
        assert_eq!(request.y, 0.0);
    }

    #[test]
    fn speed_multiplier_scales_request() {
        let config = ControllerConfig::default().with_move_speed(2.0);
        let mut walk = intent(Vec2::Y);
        walk.set_speed(0.5);

        let request = requested_displacement(&walk, &CharacterFacing::default(), &config, 1.0);
        assert!(request.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6));
    }
}
