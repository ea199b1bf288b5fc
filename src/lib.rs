//! # `stepwalk_controller`
//!
//! A 3D character controller for walking over stairs, slopes and walls, with
//! a physics backend abstraction.
//!
//! This crate provides a kinematic-style ground movement layer on top of a
//! dynamic rigidbody:
//! - Classifies the character as grounded or airborne from its contacts
//! - Casts probe rays at head and leg height to tell walls from stairs
//! - Climbs stair steps and follows slopes by correcting the origin height
//! - Applies forward or vertical jump impulses
//! - Abstracts the physics backend for easy swapping (Rapier3D included)
//!
//! ## Architecture
//!
//! Each fixed tick runs the phases of [`CharacterControllerSet`] in order:
//! 1. The backend collects contacts against the static environment
//! 2. The contacts are classified and gravity is toggled
//! 3. Intent is turned into a raw horizontal move request
//! 4. The backend resolves the request with probe rays
//! 5. The resolved displacement is applied to the origin
//! 6. Pending jumps are applied
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use stepwalk_controller::prelude::*;
//!
//! // Create controller components for a player character
//! let body = CharacterBody::new(0.4, 0.9, 0.9, 80.0).unwrap();
//! let controller = CharacterController::new();
//! let config = ControllerConfig::player();
//! let intent = MovementIntent::default();
//!
//! // These can be spawned with physics components
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod body;
pub mod collision;
pub mod config;
pub mod detection;
pub mod ground;
pub mod input;
pub mod intent;
pub mod jump;
pub mod math;
pub mod movement;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::{CharacterPhysicsBackend, PhysicsGroups};
    pub use crate::body::{CharacterBody, CharacterError};
    pub use crate::collision::{CollisionData, ContactPoint};
    pub use crate::config::{CharacterController, CharacterFacing, ControllerConfig};
    pub use crate::detection::{MoveRejection, RayProbe};
    pub use crate::input::{CameraFacing, ControllerCamera, PlayerControlled, PlayerInputPlugin};
    pub use crate::intent::MovementIntent;
    pub use crate::math::Side;
    pub use crate::state::{Airborne, ControllerState, Grounded};
    pub use crate::{CharacterControllerPlugin, CharacterControllerSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, RapierCharacterBundle};
}

/// Ordered phases of the per-tick controller pipeline.
///
/// All sets run chained in `FixedUpdate`. `Sensors` and `Probing` are filled
/// by the backend plugin.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterControllerSet {
    /// Contact collection.
    Sensors,
    /// Ground classification.
    Ground,
    /// Facing and move requests.
    Intent,
    /// Move resolution with probe rays.
    Probing,
    /// Applying resolved moves.
    Integration,
    /// Jump impulses and state markers.
    Jump,
}

/// Main plugin for the character controller system.
///
/// This plugin is generic over a physics backend `B` which provides the actual
/// physics operations (contacts, ray casts, impulses, etc.).
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier3dBackend`)
///
/// # Examples
///
/// With Rapier3D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use stepwalk_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
///     .add_plugins(CharacterControllerPlugin::<Rapier3dBackend>::default())
///     .run();
/// ```
pub struct CharacterControllerPlugin<B: backend::CharacterPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::CharacterPhysicsBackend> Default for CharacterControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::CharacterPhysicsBackend> Plugin for CharacterControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<body::CharacterBody>();
        app.register_type::<config::CharacterController>();
        app.register_type::<config::CharacterFacing>();
        app.register_type::<config::ControllerConfig>();
        app.register_type::<intent::MovementIntent>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<backend::PhysicsGroups>();

        app.init_resource::<backend::PhysicsGroups>();

        app.configure_sets(
            FixedUpdate,
            (
                CharacterControllerSet::Sensors,
                CharacterControllerSet::Ground,
                CharacterControllerSet::Intent,
                CharacterControllerSet::Probing,
                CharacterControllerSet::Integration,
                CharacterControllerSet::Jump,
            )
                .chain(),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.add_systems(
            FixedUpdate,
            (
                systems::update_ground_state::<B>.in_set(CharacterControllerSet::Ground),
                (systems::update_facing::<B>, systems::build_move_requests::<B>)
                    .chain()
                    .in_set(CharacterControllerSet::Intent),
                systems::apply_movement::<B>.in_set(CharacterControllerSet::Integration),
                (systems::apply_jump::<B>, systems::sync_state_markers)
                    .chain()
                    .in_set(CharacterControllerSet::Jump),
            ),
        );

        // Drop unconsumed jump requests at end of fixed update
        app.add_systems(FixedPostUpdate, systems::clear_jump_requests);
    }
}
