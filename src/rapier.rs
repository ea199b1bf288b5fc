//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D.
//! Enable with the `rapier3d` feature.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::backend::{CharacterPhysicsBackend, PhysicsGroups};
use crate::body::{CharacterBody, CharacterError};
use crate::collision::{CollisionData, ContactPoint};
use crate::config::{CharacterController, CharacterFacing, ControllerConfig};
use crate::intent::MovementIntent;
use crate::systems::resolve_pending_move;

/// Rapier3D physics backend for the character controller.
///
/// This backend uses `bevy_rapier3d` for velocity, impulse and gravity
/// control. Contact collection and probe rays are handled by dedicated
/// Rapier systems that receive `RapierContext` as a system parameter.
///
/// Run Rapier in the fixed schedule
/// (`RapierPhysicsPlugin::default().in_fixed_schedule()`) so that every
/// controller tick sees the contacts of exactly one physics step.
pub struct Rapier3dBackend;

impl CharacterPhysicsBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn position(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Transform>(entity)
            .map(|t| t.translation)
            .or_else(|| {
                world
                    .get::<GlobalTransform>(entity)
                    .map(|t| t.translation())
            })
            .unwrap_or(Vec3::ZERO)
    }

    fn is_active(world: &World, entity: Entity) -> bool {
        world
            .get::<Sleeping>(entity)
            .is_none_or(|sleeping| !sleeping.sleeping)
    }

    fn reset_velocities(world: &mut World, entity: Entity) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            if *vel != Velocity::zero() {
                *vel = Velocity::zero();
            }
        }
    }

    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec3) {
        if let Some(mut ext_impulse) = world.get_mut::<ExternalImpulse>(entity) {
            ext_impulse.impulse += impulse;
            return;
        }

        // Fallback: apply as velocity change if no ExternalImpulse component
        let mass = world
            .get::<CharacterBody>(entity)
            .map(|body| body.mass())
            .unwrap_or(1.0);
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel += impulse / mass;
        }
    }

    fn set_gravity_enabled(world: &mut World, entity: Entity, enabled: bool) {
        let scale = if enabled { 1.0 } else { 0.0 };
        if let Some(mut gravity) = world.get_mut::<GravityScale>(entity) {
            if gravity.0 != scale {
                gravity.0 = scale;
            }
        } else if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
            entity_mut.insert(GravityScale(scale));
        }
    }

    fn add_to_origin(world: &mut World, entity: Entity, delta: Vec3, reset_velocities: bool) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation += delta;
        }
        if reset_velocities {
            Self::reset_velocities(world, entity);
        }
    }

    fn set_yaw(world: &mut World, entity: Entity, yaw: f32) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.rotation = Quat::from_rotation_y(yaw);
        }
    }
}

/// Plugin that sets up Rapier3D-specific systems for the character controller.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        use crate::CharacterControllerSet;

        app.add_systems(
            FixedUpdate,
            rapier_collect_contacts.in_set(CharacterControllerSet::Sensors),
        );
        app.add_systems(
            FixedUpdate,
            rapier_probe_moves.in_set(CharacterControllerSet::Probing),
        );
    }
}

/// Collision groups for characters: member of the character group, colliding
/// with everything.
pub fn character_collision_groups(groups: &PhysicsGroups) -> CollisionGroups {
    CollisionGroups::new(Group::from_bits_truncate(groups.character), Group::ALL)
}

/// Collision groups for static level geometry.
pub fn static_collision_groups(groups: &PhysicsGroups) -> CollisionGroups {
    CollisionGroups::new(
        Group::from_bits_truncate(groups.static_environment),
        Group::ALL,
    )
}

/// Query filter for probe rays cast on behalf of `entity`.
///
/// Rays are cast as members of the character group and only hit the static
/// environment, never the character's own body or sensors.
fn probe_filter(entity: Entity, groups: &PhysicsGroups) -> QueryFilter<'static> {
    QueryFilter::default()
        .exclude_rigid_body(entity)
        .exclude_sensors()
        .groups(CollisionGroups::new(
            Group::from_bits_truncate(groups.character),
            Group::from_bits_truncate(groups.static_environment),
        ))
}

/// Perform a raycast from `from` to `to` using RapierContext.
fn rapier_raycast(
    context: &RapierContext,
    from: Vec3,
    to: Vec3,
    filter: QueryFilter,
) -> Option<CollisionData> {
    let offset = to - from;
    let max_distance = offset.length();
    if max_distance <= f32::EPSILON {
        return None;
    }
    let direction = offset / max_distance;

    context
        .cast_ray_and_get_normal(from, direction, max_distance, true, filter)
        .map(|(hit_entity, hit)| {
            CollisionData::new(hit.time_of_impact, hit.normal, hit.point, Some(hit_entity))
        })
}

/// Copy the active contacts between each character and the static
/// environment into the controller's contact buffer.
///
/// Contact normals are oriented to point from the environment toward the
/// character.
fn rapier_collect_contacts(
    rapier_context: ReadRapierContext,
    groups: Res<PhysicsGroups>,
    q_groups: Query<&CollisionGroups>,
    mut q_controllers: Query<(Entity, &mut CharacterController)>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, mut controller) in &mut q_controllers {
        let contacts = controller.refill_contacts();

        for pair in context.contact_pairs_with(entity) {
            if !pair.has_any_active_contact() {
                continue;
            }

            let (other, flip) = if pair.collider1() == Some(entity) {
                (pair.collider2(), true)
            } else {
                (pair.collider1(), false)
            };

            // Colliders without explicit groups belong to every group.
            let memberships = other
                .and_then(|other| q_groups.get(other).ok())
                .map(|cg| cg.memberships.bits())
                .unwrap_or(u32::MAX);
            if !groups.is_static_environment(memberships) {
                continue;
            }

            for manifold in pair.manifolds() {
                let normal = if flip {
                    -manifold.normal()
                } else {
                    manifold.normal()
                };
                for contact in manifold.solver_contacts() {
                    contacts.push(ContactPoint::new(contact.point(), normal));
                }
            }
        }
    }
}

/// Resolve each controller's move request with probe rays.
fn rapier_probe_moves(
    rapier_context: ReadRapierContext,
    groups: Res<PhysicsGroups>,
    mut q_controllers: Query<(
        Entity,
        &CharacterBody,
        &ControllerConfig,
        &mut CharacterController,
    )>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, body, config, mut controller) in &mut q_controllers {
        let filter = probe_filter(entity, &groups);
        let probe = |from: Vec3, to: Vec3| rapier_raycast(&context, from, to, filter);
        resolve_pending_move(&probe, body, config, &mut controller);
    }
}

/// Bundle for creating a character with Rapier3D physics.
///
/// This bundle provides the controller components together with the Rapier3D
/// components the backend drives: a dynamic rotation-locked rigid body,
/// velocity, impulses for jumping, gravity scale, mass and collision groups.
/// The [`CharacterBody`] dimensions are derived from the collider's bounds.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use stepwalk_controller::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 2.0, 0.0),
///         RapierCharacterBundle::capsule(0.5, 0.3, 80.0)
///             .with_config(ControllerConfig::player()),
///         PlayerControlled,
///     ));
/// }
/// ```
#[derive(Bundle)]
pub struct RapierCharacterBundle {
    pub controller: CharacterController,
    pub config: ControllerConfig,
    pub facing: CharacterFacing,
    pub intent: MovementIntent,
    pub body: CharacterBody,
    pub collider: Collider,
    /// Should be [`RigidBody::Dynamic`] so jumps and gravity act on it.
    pub rigid_body: RigidBody,
    pub velocity: Velocity,
    /// Used for jump impulses.
    pub external_impulse: ExternalImpulse,
    /// Toggled between 0 and 1 by the controller.
    pub gravity_scale: GravityScale,
    /// Rotation is locked; facing is applied by setting the yaw directly.
    pub locked_axes: LockedAxes,
    pub mass_properties: ColliderMassProperties,
    pub collision_groups: CollisionGroups,
    /// Lets the backend see when Rapier puts the body to sleep.
    pub sleeping: Sleeping,
}

impl RapierCharacterBundle {
    /// Create a character bundle from any collider.
    ///
    /// Fails if the collider's bounds do not enclose its local origin or the
    /// mass is not positive.
    pub fn try_new(collider: Collider, mass: f32) -> Result<Self, CharacterError> {
        let aabb = collider.raw.compute_local_aabb();
        let min = Vec3::new(aabb.mins.x, aabb.mins.y, aabb.mins.z);
        let max = Vec3::new(aabb.maxs.x, aabb.maxs.y, aabb.maxs.z);
        let body = CharacterBody::from_local_bounds(min, max, mass)?;

        Ok(Self {
            controller: CharacterController::new(),
            config: ControllerConfig::default(),
            facing: CharacterFacing::default(),
            intent: MovementIntent::default(),
            body,
            collider,
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::zero(),
            external_impulse: ExternalImpulse::default(),
            gravity_scale: GravityScale(1.0),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            mass_properties: ColliderMassProperties::Mass(mass),
            collision_groups: character_collision_groups(&PhysicsGroups::default()),
            sleeping: Sleeping::default(),
        })
    }

    /// Create a character bundle from any collider.
    ///
    /// # Panics
    ///
    /// Panics if the collider cannot be used as a character volume, see
    /// [`RapierCharacterBundle::try_new`].
    pub fn new(collider: Collider, mass: f32) -> Self {
        Self::try_new(collider, mass).unwrap_or_else(|err| panic!("invalid character: {err}"))
    }

    /// Create a character bundle with an upright capsule collider.
    ///
    /// `half_height` is the half length of the capsule's segment.
    pub fn capsule(half_height: f32, radius: f32, mass: f32) -> Self {
        Self::new(Collider::capsule_y(half_height, radius), mass)
    }

    /// Set the controller tunables.
    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the initial facing.
    pub fn with_facing(mut self, facing: CharacterFacing) -> Self {
        self.facing = facing;
        self
    }

    /// Use non-default collision group bits.
    pub fn with_groups(mut self, groups: &PhysicsGroups) -> Self {
        self.collision_groups = character_collision_groups(groups);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(TransformPlugin);
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
        app.insert_resource(Time::<Fixed>::from_hz(60.0));
        app
    }

    #[test]
    fn rapier_backend_position() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((Transform::from_xyz(1.0, 2.0, 3.0), RigidBody::Fixed))
            .id();

        app.update();

        let pos = Rapier3dBackend::position(app.world(), entity);
        assert!(pos.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 0.01));
    }

    #[test]
    fn rapier_backend_reset_velocities() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                RigidBody::Dynamic,
                Velocity {
                    linvel: Vec3::new(1.0, 2.0, 3.0),
                    angvel: Vec3::Y,
                },
            ))
            .id();

        Rapier3dBackend::reset_velocities(app.world_mut(), entity);

        let vel = app.world().get::<Velocity>(entity).unwrap();
        assert_eq!(*vel, Velocity::zero());
    }

    #[test]
    fn rapier_backend_gravity_toggle() {
        let mut app = create_test_app();
        let entity = app.world_mut().spawn(Transform::default()).id();

        // Inserted on first use
        Rapier3dBackend::set_gravity_enabled(app.world_mut(), entity, false);
        assert_eq!(app.world().get::<GravityScale>(entity).unwrap().0, 0.0);

        Rapier3dBackend::set_gravity_enabled(app.world_mut(), entity, true);
        assert_eq!(app.world().get::<GravityScale>(entity).unwrap().0, 1.0);
    }

    #[test]
    fn rapier_backend_impulse_accumulates() {
        let mut app = create_test_app();
        let entity = app
            .world_mut()
            .spawn((Transform::default(), ExternalImpulse::default()))
            .id();

        Rapier3dBackend::apply_impulse(app.world_mut(), entity, Vec3::Y);
        Rapier3dBackend::apply_impulse(app.world_mut(), entity, Vec3::X);

        let impulse = app.world().get::<ExternalImpulse>(entity).unwrap();
        assert_eq!(impulse.impulse, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn rapier_backend_origin_and_yaw() {
        let mut app = create_test_app();
        let entity = app
            .world_mut()
            .spawn((Transform::from_xyz(0.0, 1.0, 0.0), Velocity::linear(Vec3::X)))
            .id();

        Rapier3dBackend::add_to_origin(app.world_mut(), entity, Vec3::new(0.5, 0.2, 0.0), true);
        Rapier3dBackend::set_yaw(app.world_mut(), entity, std::f32::consts::FRAC_PI_2);

        let transform = app.world().get::<Transform>(entity).unwrap();
        assert!(transform.translation.abs_diff_eq(Vec3::new(0.5, 1.2, 0.0), 1e-6));
        assert!(transform.forward().abs_diff_eq(Vec3::NEG_X, 1e-5));
        assert_eq!(app.world().get::<Velocity>(entity).unwrap().linvel, Vec3::ZERO);
    }

    #[test]
    fn sleeping_character_is_inactive() {
        let mut app = create_test_app();
        let entity = app
            .world_mut()
            .spawn((
                Transform::from_xyz(0.0, 5.0, 0.0),
                RapierCharacterBundle::capsule(0.5, 0.3, 1.0),
            ))
            .id();

        assert!(Rapier3dBackend::is_active(app.world(), entity));

        app.world_mut().get_mut::<Sleeping>(entity).unwrap().sleeping = true;
        assert!(!Rapier3dBackend::is_active(app.world(), entity));
    }

    #[test]
    fn capsule_bundle_derives_body() {
        let bundle = RapierCharacterBundle::capsule(0.5, 0.3, 70.0);
        let body = bundle.body;
        assert!((body.radius_xz() - 0.3).abs() < 1e-5);
        assert!((body.height_above_origin() - 0.8).abs() < 1e-5);
        assert!((body.height_below_origin() - 0.8).abs() < 1e-5);
        assert_eq!(body.mass(), 70.0);
        assert_eq!(bundle.locked_axes, LockedAxes::ROTATION_LOCKED);
    }

    #[test]
    fn offset_collider_is_rejected() {
        let collider = Collider::compound(vec![(
            Vec3::new(0.0, 2.0, 0.0),
            Quat::IDENTITY,
            Collider::ball(0.5),
        )]);
        assert_eq!(
            RapierCharacterBundle::try_new(collider, 1.0).err(),
            Some(CharacterError::OriginOutsideShape)
        );
    }

    #[test]
    #[should_panic(expected = "invalid character")]
    fn invalid_mass_panics() {
        let _ = RapierCharacterBundle::capsule(0.5, 0.3, 0.0);
    }

    #[test]
    fn character_bundle_creates_valid_entity() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((
                Transform::from_xyz(0.0, 5.0, 0.0),
                RapierCharacterBundle::capsule(0.5, 0.3, 70.0),
            ))
            .id();

        app.update();

        assert!(app.world().get::<RigidBody>(entity).is_some());
        assert!(app.world().get::<Velocity>(entity).is_some());
        assert!(app.world().get::<CharacterBody>(entity).is_some());
        assert!(app.world().get::<CharacterController>(entity).is_some());
    }
}
