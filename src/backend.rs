//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement
//! to work with the character controller. This allows swapping the physics
//! engine (Rapier3D, a scripted test double, etc.) without touching the
//! movement logic.

use bevy::prelude::*;

/// Trait for physics backend implementations.
///
/// Implement this trait to integrate a physics engine with the character
/// controller. The backend handles actuation (velocity, impulse, gravity and
/// origin changes) through these functions, and contributes its own sensor
/// systems through [`CharacterPhysicsBackend::plugin`]:
///
/// - in [`CharacterControllerSet::Sensors`], refill each controller's contact
///   buffer (see [`CharacterController::refill_contacts`]) with the contacts
///   against the static environment;
/// - in [`CharacterControllerSet::Probing`], resolve each controller's move
///   request with a [`RayProbe`] (see [`resolve_pending_move`]).
///
/// For an example implementation, see the `rapier` module's
/// `Rapier3dBackend`.
///
/// [`CharacterControllerSet::Sensors`]: crate::CharacterControllerSet::Sensors
/// [`CharacterControllerSet::Probing`]: crate::CharacterControllerSet::Probing
/// [`CharacterController::refill_contacts`]: crate::config::CharacterController::refill_contacts
/// [`RayProbe`]: crate::detection::RayProbe
/// [`resolve_pending_move`]: crate::systems::resolve_pending_move
pub trait CharacterPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Get the current origin of an entity.
    fn position(world: &World, entity: Entity) -> Vec3;

    /// Get the fixed timestep delta time.
    fn fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }

    /// Whether the body is awake in the simulation.
    fn is_active(_world: &World, _entity: Entity) -> bool {
        true
    }

    /// Zero the linear and angular velocity of an entity.
    fn reset_velocities(world: &mut World, entity: Entity);

    /// Apply an impulse through the body's center of mass.
    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec3);

    /// Enable or disable gravity for an entity.
    fn set_gravity_enabled(world: &mut World, entity: Entity, enabled: bool);

    /// Move the origin of an entity by `delta`, keeping the physics body in
    /// sync. Optionally zeroes its velocities.
    fn add_to_origin(world: &mut World, entity: Entity, delta: Vec3, reset_velocities: bool);

    /// Rotate the body about world up to the given yaw (radians, `0` facing
    /// `-Z`).
    fn set_yaw(_world: &mut World, _entity: Entity, _yaw: f32) {}
}

/// Collision group bits used by the controller queries.
///
/// Probe rays are cast as members of `character` and only hit colliders in
/// `static_environment`. Only contacts with `static_environment` colliders
/// are used for ground classification.
#[derive(Resource, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Resource)]
pub struct PhysicsGroups {
    pub character: u32,
    pub static_environment: u32,
}

impl Default for PhysicsGroups {
    fn default() -> Self {
        Self {
            static_environment: 1 << 0,
            character: 1 << 1,
        }
    }
}

impl PhysicsGroups {
    /// Whether a collider with the given membership bits belongs to the static
    /// environment.
    #[inline]
    pub fn is_static_environment(&self, memberships: u32) -> bool {
        memberships & self.static_environment != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_groups_are_distinct() {
        let groups = PhysicsGroups::default();
        assert_eq!(groups.character & groups.static_environment, 0);
    }

    #[test]
    fn static_membership_check() {
        let groups = PhysicsGroups::default();
        assert!(groups.is_static_environment(groups.static_environment));
        assert!(groups.is_static_environment(u32::MAX));
        assert!(!groups.is_static_environment(groups.character));
    }
}
