//! Keyboard input and camera facing.
//!
//! The camera is an external collaborator: the controller only needs its
//! facing direction in the horizontal plane, published as the
//! [`CameraFacing`] resource. [`PlayerInputPlugin`] keeps that resource in
//! sync with a marked camera and maps the keyboard onto
//! [`MovementIntent`] for player characters.
//!
//! ## Controls
//! - **W/S** or **Up/Down**: Move forward/backward
//! - **A/D** or **Left/Right**: Strafe
//! - **Space**: Jump

use bevy::prelude::*;

use crate::config::CharacterFacing;
use crate::intent::MovementIntent;

/// Current camera facing, decomposed into horizontal unit vectors.
#[derive(Resource, Reflect, Debug, Clone, Copy, PartialEq, Default)]
#[reflect(Resource)]
pub struct CameraFacing(pub CharacterFacing);

impl CameraFacing {
    /// Build from any camera forward vector. Vertical vectors are ignored.
    pub fn from_forward(forward: Vec3) -> Option<Self> {
        CharacterFacing::from_forward(forward).map(Self)
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.0.eye()
    }

    #[inline]
    pub fn back(&self) -> Vec3 {
        self.0.back()
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.0.right()
    }

    #[inline]
    pub fn left(&self) -> Vec3 {
        self.0.left()
    }
}

/// Marker for the camera whose facing drives player characters.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct ControllerCamera;

/// Marker for characters driven by the keyboard.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct PlayerControlled;

/// Plugin that maps keyboard input onto player characters and tracks the
/// controller camera.
///
/// # Usage
///
/// ```rust,ignore
/// App::new()
///     .add_plugins(CharacterControllerPlugin::<Rapier3dBackend>::default())
///     .add_plugins(PlayerInputPlugin)
///     .run();
/// ```
pub struct PlayerInputPlugin;

impl Plugin for PlayerInputPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<CameraFacing>();
        app.register_type::<ControllerCamera>();
        app.register_type::<PlayerControlled>();
        app.init_resource::<CameraFacing>();
        app.add_systems(Update, (sync_camera_facing, handle_keyboard_input));
    }
}

/// Copy the facing of the [`ControllerCamera`] into [`CameraFacing`].
pub fn sync_camera_facing(
    cameras: Query<&GlobalTransform, With<ControllerCamera>>,
    mut facing: ResMut<CameraFacing>,
) {
    let Ok(transform) = cameras.single() else {
        return;
    };
    if let Some(new_facing) = CameraFacing::from_forward(transform.forward().into()) {
        if *facing != new_facing {
            *facing = new_facing;
        }
    }
}

/// Planar input from the keyboard (`x` = right, `y` = forward).
pub fn keyboard_planar(keyboard: &ButtonInput<KeyCode>) -> Vec2 {
    let axis = |negative: [KeyCode; 2], positive: [KeyCode; 2]| {
        let mut value = 0.0;
        if keyboard.any_pressed(negative) {
            value -= 1.0;
        }
        if keyboard.any_pressed(positive) {
            value += 1.0;
        }
        value
    };
    Vec2::new(
        axis(
            [KeyCode::KeyA, KeyCode::ArrowLeft],
            [KeyCode::KeyD, KeyCode::ArrowRight],
        ),
        axis(
            [KeyCode::KeyS, KeyCode::ArrowDown],
            [KeyCode::KeyW, KeyCode::ArrowUp],
        ),
    )
}

/// Handles keyboard input for movement and jumping.
///
/// Jump input forwards the button state; the intent turns the rising edge
/// into a single jump request.
pub fn handle_keyboard_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<&mut MovementIntent, With<PlayerControlled>>,
) {
    let planar = keyboard_planar(&keyboard);
    let jump = keyboard.pressed(KeyCode::Space);
    for mut intent in &mut query {
        intent.set_planar(planar);
        intent.set_jump_pressed(jump);
    }
}
