//! Controller configuration and state components.
//!
//! This module defines the tunables for a character controller, the per-tick
//! controller state, and the character's facing basis.

use std::f32::consts::FRAC_PI_4;

use bevy::prelude::*;

use crate::collision::ContactPoint;
use crate::detection::MoveRejection;
use crate::math::{flatten_xz, side_of, Side};
use crate::state::ControllerState;

/// Initial capacity of the per-controller contact scratch buffer.
pub const CONTACT_CAPACITY: usize = 16;

/// Facing basis of a character in the horizontal plane.
///
/// All four vectors are unit length with `y == 0`. The eye direction is the
/// way the character looks and walks when moving forward.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct CharacterFacing {
    eye: Vec3,
    back: Vec3,
    right: Vec3,
    left: Vec3,
}

impl Default for CharacterFacing {
    fn default() -> Self {
        Self::from_unit_forward(Vec3::NEG_Z)
    }
}

impl CharacterFacing {
    /// Build a facing basis from any forward vector.
    ///
    /// The vector is flattened onto the XZ plane. Returns `None` if nothing
    /// is left after flattening (looking straight up or down).
    pub fn from_forward(forward: Vec3) -> Option<Self> {
        let flat = flatten_xz(forward).normalize_or_zero();
        if flat == Vec3::ZERO {
            None
        } else {
            Some(Self::from_unit_forward(flat))
        }
    }

    fn from_unit_forward(eye: Vec3) -> Self {
        let right = eye.cross(Vec3::Y).normalize();
        Self {
            eye,
            back: -eye,
            right,
            left: -right,
        }
    }

    /// Turn to face `forward`. Degenerate (vertical) vectors are ignored.
    ///
    /// Returns `true` if the facing changed.
    pub fn look_toward(&mut self, forward: Vec3) -> bool {
        match Self::from_forward(forward) {
            Some(facing) if !facing.eye.abs_diff_eq(self.eye, 1e-5) => {
                *self = facing;
                true
            }
            _ => false,
        }
    }

    /// Direction the character looks and walks forward.
    #[inline]
    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    #[inline]
    pub fn back(&self) -> Vec3 {
        self.back
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.right
    }

    #[inline]
    pub fn left(&self) -> Vec3 {
        self.left
    }

    /// Rotation about world up that turns Bevy's forward (`-Z`) into the eye
    /// direction.
    pub fn yaw(&self) -> f32 {
        (-self.eye.x).atan2(-self.eye.z)
    }

    /// Convert a local planar vector (`x` = right, `y` = forward) to a world
    /// XZ vector.
    pub fn to_world(&self, local: Vec2) -> Vec3 {
        self.right * local.x + self.eye * local.y
    }

    /// Which side of a character standing at `origin` the `point` is on.
    pub fn side_of(&self, origin: Vec3, point: Vec3) -> Side {
        side_of(origin, self.eye, point)
    }
}

/// Core character controller component.
///
/// Holds the RESULT of the per-tick ground classification and move
/// resolution, plus the scratch buffers the backend fills each tick.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct CharacterController {
    /// Whether a walkable contact against the static environment was found
    /// this tick.
    pub on_ground: bool,
    /// Whether a move was applied this tick.
    pub is_moving: bool,
    /// Lowest contact against the static environment this tick.
    /// [`ContactPoint::NONE`] when there is no contact.
    pub bottom_contact: ContactPoint,
    /// Raw horizontal displacement requested this tick (speed × dt applied).
    pub requested_move: Vec3,
    /// Origin reported by the backend when the request was built. Probe rays
    /// are cast from here.
    pub move_origin: Vec3,
    /// Result of the stair/wall detector for this tick.
    #[reflect(ignore)]
    pub move_outcome: Option<Result<Vec3, MoveRejection>>,
    /// Most recent reason a move was dropped.
    pub last_rejection: Option<MoveRejection>,

    /// Contacts against the static environment, refilled by the backend each
    /// tick without reallocating.
    #[reflect(ignore)]
    pub(crate) contacts: Vec<ContactPoint>,
    /// A jump impulse was applied last tick. The contacts seen on the next
    /// tick predate the impulse, so they must not ground the character.
    pub(crate) lifting_off: bool,
}

impl Default for CharacterController {
    fn default() -> Self {
        Self {
            on_ground: false,
            is_moving: false,
            bottom_contact: ContactPoint::NONE,
            requested_move: Vec3::ZERO,
            move_origin: Vec3::ZERO,
            move_outcome: None,
            last_rejection: None,
            contacts: Vec::with_capacity(CONTACT_CAPACITY),
            lifting_off: false,
        }
    }
}

impl CharacterController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the character is airborne.
    #[inline]
    pub fn is_airborne(&self) -> bool {
        !self.on_ground
    }

    #[inline]
    pub fn state(&self) -> ControllerState {
        ControllerState::from_on_ground(self.on_ground)
    }

    /// Contacts gathered for this tick.
    pub fn contacts(&self) -> &[ContactPoint] {
        &self.contacts
    }

    /// Clear the contact buffer and hand it out for refilling.
    ///
    /// Backends call this once per tick before pushing the current contacts.
    pub fn refill_contacts(&mut self) -> &mut Vec<ContactPoint> {
        self.contacts.clear();
        &mut self.contacts
    }

    /// Whether the lowest contact is known.
    pub fn has_bottom_contact(&self) -> bool {
        self.bottom_contact.is_found()
    }

    /// Reset the per-tick movement state.
    pub(crate) fn reset_move_state(&mut self) {
        self.requested_move = Vec3::ZERO;
        self.move_outcome = None;
    }
}

/// Tunable parameters of a character controller.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct ControllerConfig {
    // === Movement Settings ===
    /// Forward walking speed (units/second).
    pub move_speed: f32,

    /// Multiplier applied to `move_speed` when walking backwards.
    pub backward_factor: f32,

    /// Fraction of the requested displacement applied while airborne.
    pub air_control: f32,

    // === Ground Settings ===
    /// Steepest surface the character can stand on (radians from world up).
    pub walkable_floor_angle: f32,

    /// Tallest stair step climbed automatically.
    pub max_step_height: f32,

    // === Jump Settings ===
    /// Elevation of a moving jump above the horizontal (radians).
    pub jump_angle: f32,

    /// Jump impulse multiplier (impulse = move_speed × jump_power).
    pub jump_power: f32,

    // === Facing ===
    /// Turn toward the camera facing whenever a move is requested.
    pub face_camera: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            move_speed: 4.0,
            backward_factor: 0.5,
            air_control: 0.3,
            walkable_floor_angle: FRAC_PI_4,
            max_step_height: 0.35,
            jump_angle: 60f32.to_radians(),
            jump_power: 1.5,
            face_camera: false,
        }
    }
}

impl ControllerConfig {
    /// Config for a camera-driven player character.
    pub fn player() -> Self {
        Self {
            move_speed: 5.0,
            face_camera: true,
            ..default()
        }
    }

    /// Config for an AI-driven character.
    pub fn npc() -> Self {
        Self {
            move_speed: 3.0,
            air_control: 0.1,
            jump_power: 1.2,
            ..default()
        }
    }

    /// Builder: set move speed.
    pub fn with_move_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }

    /// Builder: set backward speed factor.
    pub fn with_backward_factor(mut self, factor: f32) -> Self {
        self.backward_factor = factor;
        self
    }

    /// Builder: set air control factor.
    pub fn with_air_control(mut self, factor: f32) -> Self {
        self.air_control = factor;
        self
    }

    /// Builder: set walkable floor angle (radians).
    pub fn with_walkable_floor_angle(mut self, angle: f32) -> Self {
        self.walkable_floor_angle = angle;
        self
    }

    /// Builder: set max step height.
    pub fn with_max_step_height(mut self, height: f32) -> Self {
        self.max_step_height = height;
        self
    }

    /// Builder: set jump angle (radians) and power.
    pub fn with_jump(mut self, angle: f32, power: f32) -> Self {
        self.jump_angle = angle;
        self.jump_power = power;
        self
    }

    /// Builder: enable or disable camera-driven facing.
    pub fn with_face_camera(mut self, enabled: bool) -> Self {
        self.face_camera = enabled;
        self
    }

    /// Magnitude of a jump impulse.
    #[inline]
    pub fn jump_impulse(&self) -> f32 {
        self.move_speed * self.jump_power
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn default_facing_is_bevy_forward() {
        let facing = CharacterFacing::default();
        assert_eq!(facing.eye(), Vec3::NEG_Z);
        assert_eq!(facing.back(), Vec3::Z);
        assert!(facing.right().abs_diff_eq(Vec3::X, 1e-6));
        assert!(facing.left().abs_diff_eq(Vec3::NEG_X, 1e-6));
        assert!(facing.yaw().abs() < 1e-6);
    }

    #[test]
    fn facing_is_flattened_and_normalized() {
        let facing = CharacterFacing::from_forward(Vec3::new(3.0, 5.0, 0.0)).unwrap();
        assert_eq!(facing.eye(), Vec3::X);
        assert_eq!(facing.eye().y, 0.0);
        assert!(facing.right().abs_diff_eq(Vec3::Z, 1e-6));
        // Facing +X is a quarter turn clockwise seen from above.
        assert!((facing.yaw() + FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn vertical_forward_is_ignored() {
        assert!(CharacterFacing::from_forward(Vec3::Y).is_none());

        let mut facing = CharacterFacing::default();
        assert!(!facing.look_toward(Vec3::NEG_Y));
        assert_eq!(facing, CharacterFacing::default());
    }

    #[test]
    fn look_toward_reports_changes() {
        let mut facing = CharacterFacing::default();
        assert!(!facing.look_toward(Vec3::NEG_Z * 2.0));
        assert!(facing.look_toward(Vec3::X));
        assert_eq!(facing.eye(), Vec3::X);
    }

    #[test]
    fn local_to_world() {
        let facing = CharacterFacing::default();
        let world = facing.to_world(Vec2::new(1.0, 1.0));
        assert!(world.abs_diff_eq(Vec3::new(1.0, 0.0, -1.0), 1e-6));
    }

    #[test]
    fn side_of_point_follows_facing() {
        let facing = CharacterFacing::default();
        let origin = Vec3::new(1.0, 0.0, 1.0);
        assert_eq!(facing.side_of(origin, origin + facing.right()), Side::Right);
        assert_eq!(facing.side_of(origin, origin + facing.left() + Vec3::Y), Side::Left);
        assert_eq!(facing.side_of(origin, origin + facing.eye() * 3.0), Side::On);
    }

    #[test]
    fn controller_new_has_no_ground() {
        let controller = CharacterController::new();
        assert!(!controller.on_ground);
        assert!(controller.is_airborne());
        assert!(!controller.has_bottom_contact());
        assert!(controller.contacts.capacity() >= CONTACT_CAPACITY);
    }

    #[test]
    fn refill_contacts_keeps_capacity() {
        let mut controller = CharacterController::new();
        for _ in 0..4 {
            controller
                .refill_contacts()
                .push(ContactPoint::new(Vec3::ZERO, Vec3::Y));
        }
        let capacity = controller.contacts.capacity();
        let buffer = controller.refill_contacts();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), capacity);
    }

    #[test]
    fn presets_differ_from_default() {
        let player = ControllerConfig::player();
        let npc = ControllerConfig::npc();
        assert!(player.face_camera);
        assert!(!npc.face_camera);
        assert!(npc.air_control < ControllerConfig::default().air_control);
    }

    #[test]
    fn builders_and_jump_impulse() {
        let config = ControllerConfig::default()
            .with_move_speed(2.0)
            .with_jump(0.5, 3.0)
            .with_max_step_height(0.2);
        assert_eq!(config.max_step_height, 0.2);
        assert_eq!(config.jump_impulse(), 6.0);
    }
}
