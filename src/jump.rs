//! Jump impulse computation.

use bevy::prelude::*;

use crate::config::{CharacterFacing, ControllerConfig};

/// Direction of a jump before scaling.
///
/// A moving character jumps forward along its eye direction, raised by the
/// configured jump angle. A stationary one jumps straight up.
pub fn jump_direction(moving: bool, facing: &CharacterFacing, config: &ControllerConfig) -> Vec3 {
    if !moving {
        return Vec3::Y;
    }
    let eye = facing.eye();
    Vec3::new(eye.x, config.jump_angle.tan(), eye.z).normalize_or(Vec3::Y)
}

/// Impulse to apply for a jump request, or `None` when airborne.
pub fn jump_impulse(
    on_ground: bool,
    moving: bool,
    facing: &CharacterFacing,
    config: &ControllerConfig,
) -> Option<Vec3> {
    on_ground.then(|| jump_direction(moving, facing, config) * config.jump_impulse())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn airborne_cannot_jump() {
        let config = ControllerConfig::default();
        let facing = CharacterFacing::default();
        assert!(jump_impulse(false, false, &facing, &config).is_none());
        assert!(jump_impulse(false, true, &facing, &config).is_none());
    }

    #[test]
    fn stationary_jump_is_straight_up() {
        let config = ControllerConfig::default().with_move_speed(4.0).with_jump(FRAC_PI_4, 2.5);
        let facing = CharacterFacing::from_forward(Vec3::X).unwrap();

        let impulse = jump_impulse(true, false, &facing, &config).unwrap();
        assert_eq!(impulse, Vec3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn moving_jump_follows_eye_direction() {
        let config = ControllerConfig::default().with_jump(FRAC_PI_4, 1.0);
        let facing = CharacterFacing::from_forward(Vec3::new(3.0, 0.0, 4.0)).unwrap();

        let direction = jump_direction(true, &facing, &config);
        let unnormalized = Vec3::new(0.6, FRAC_PI_4.tan(), 0.8);
        assert!(direction.abs_diff_eq(unnormalized.normalize(), 1e-6));

        // XZ still points along the eye direction.
        let xz = Vec2::new(direction.x, direction.z).normalize();
        assert!(xz.abs_diff_eq(Vec2::new(0.6, 0.8), 1e-6));
    }

    #[test]
    fn moving_jump_has_configured_magnitude() {
        let config = ControllerConfig::default().with_move_speed(5.0).with_jump(1.0, 2.0);
        let facing = CharacterFacing::default();

        let impulse = jump_impulse(true, true, &facing, &config).unwrap();
        assert!((impulse.length() - 10.0).abs() < 1e-4);
        assert!(impulse.y > 0.0);
        assert!(impulse.z < 0.0);
    }
}
