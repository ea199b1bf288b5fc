//! Movement intent component.
//!
//! Intents represent the desired movement from player input or AI. The
//! controller systems read them each fixed tick and turn them into
//! displacement requests and jump impulses.

use bevy::prelude::*;

/// Movement intent for a character.
///
/// Planar input is expressed in the character's local frame: `x` is right
/// (negative = left), `y` is forward (negative = backward).
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use stepwalk_controller::prelude::*;
///
/// let mut intent = MovementIntent::new();
/// intent.set_planar(Vec2::new(0.0, 1.0));
/// assert!(intent.is_moving());
///
/// intent.set_jump_pressed(true);
/// assert!(intent.has_jump_request());
///
/// intent.clear();
/// assert!(!intent.is_moving());
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct MovementIntent {
    /// Local planar movement, each axis in `[-1, 1]`.
    pub planar: Vec2,
    /// Speed multiplier (0.0 to 1.0).
    pub speed: f32,
    /// A jump was requested and not yet consumed.
    pub(crate) jump_requested: bool,
    /// Current held state of the jump input.
    pub(crate) jump_pressed: bool,
}

impl Default for MovementIntent {
    fn default() -> Self {
        Self {
            planar: Vec2::ZERO,
            speed: 1.0,
            jump_requested: false,
            jump_pressed: false,
        }
    }
}

impl MovementIntent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the planar movement direction. Each axis is clamped to `[-1, 1]`.
    pub fn set_planar(&mut self, planar: Vec2) {
        self.planar = planar.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Set the speed multiplier (0.0 to 1.0).
    pub fn set_speed(&mut self, multiplier: f32) {
        self.speed = multiplier.clamp(0.0, 1.0);
    }

    /// Clear the planar movement.
    pub fn clear(&mut self) {
        self.planar = Vec2::ZERO;
    }

    /// Check if there is active planar input.
    pub fn is_moving(&self) -> bool {
        self.planar.length_squared() > 1e-6
    }

    /// Check if the input points backwards.
    pub fn is_backward(&self) -> bool {
        self.planar.y < -0.001
    }

    /// Request a single jump.
    ///
    /// The request is consumed on the next fixed tick; it has no effect if
    /// the character is airborne at that point.
    pub fn request_jump(&mut self) {
        self.jump_requested = true;
    }

    /// Set the held state of the jump input.
    ///
    /// Call this every frame with the current button state. A jump is
    /// requested on the transition from released to pressed.
    ///
    /// # Example
    /// ```rust,ignore
    /// intent.set_jump_pressed(keyboard.pressed(KeyCode::Space));
    /// ```
    pub fn set_jump_pressed(&mut self, pressed: bool) {
        if pressed && !self.jump_pressed {
            self.jump_requested = true;
        }
        self.jump_pressed = pressed;
    }

    /// Check if there's a pending jump request.
    pub fn has_jump_request(&self) -> bool {
        self.jump_requested
    }

    /// Take and consume the pending jump request.
    pub fn take_jump_request(&mut self) -> bool {
        std::mem::take(&mut self.jump_requested)
    }
}
