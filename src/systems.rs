//! Core controller systems.
//!
//! These systems run the per-tick pipeline: ground classification, move
//! request building, move integration and jumping. They are generic over the
//! physics backend so different physics engines can be used. Sensing (contact
//! collection and probe rays) is contributed by the backend plugin.

use bevy::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::body::CharacterBody;
use crate::config::{CharacterController, CharacterFacing, ControllerConfig};
use crate::detection::{resolve_move, MoveQuery, MoveRejection, RayProbe};
use crate::ground::classify_ground;
use crate::input::CameraFacing;
use crate::intent::MovementIntent;
use crate::jump::jump_impulse;
use crate::movement::requested_displacement;
use crate::state::{Airborne, Grounded};

/// Classify each character as grounded or airborne from its contacts.
///
/// Grounded characters have their velocities zeroed and gravity disabled so
/// they do not slide down slopes. Sleeping bodies keep their previous
/// classification.
pub fn update_ground_state<B: CharacterPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, f32)> = world
        .query::<(Entity, &ControllerConfig, &CharacterController)>()
        .iter(world)
        .map(|(e, config, _)| (e, config.walkable_floor_angle))
        .collect();

    for (entity, walkable_floor_angle) in entities {
        if !B::is_active(world, entity) {
            continue;
        }

        let Some(mut controller) = world.get_mut::<CharacterController>(entity) else {
            continue;
        };
        let ground = classify_ground(controller.contacts(), walkable_floor_angle);
        let was_grounded = controller.on_ground;

        // Contacts seen right after a jump predate the impulse.
        let lifting_off = std::mem::take(&mut controller.lifting_off);
        controller.bottom_contact = ground.bottom;
        controller.on_ground = ground.on_ground && !lifting_off;
        let on_ground = controller.on_ground;
        let state = controller.state();

        if on_ground != was_grounded {
            if on_ground {
                debug!("{entity} landed at {}", ground.bottom.position);
            } else {
                debug!("{entity} is airborne");
            }
        }

        if on_ground {
            B::reset_velocities(world, entity);
        }
        B::set_gravity_enabled(world, entity, state.gravity_enabled());
    }
}

/// Turn camera-driven characters toward the camera while they move.
pub fn update_facing<B: CharacterPhysicsBackend>(world: &mut World) {
    let Some(camera) = world.get_resource::<CameraFacing>().copied() else {
        return;
    };

    let mut turned: Vec<(Entity, f32)> = Vec::new();
    for (entity, config, intent, mut facing) in world
        .query::<(Entity, &ControllerConfig, &MovementIntent, &mut CharacterFacing)>()
        .iter_mut(world)
    {
        if !config.face_camera || !intent.is_moving() {
            continue;
        }
        if facing.look_toward(camera.forward()) {
            turned.push((entity, facing.yaw()));
        }
    }

    for (entity, yaw) in turned {
        B::set_yaw(world, entity, yaw);
    }
}

/// Build this tick's raw horizontal move request from each intent.
///
/// The origin the request starts from is read through the backend.
pub fn build_move_requests<B: CharacterPhysicsBackend>(world: &mut World) {
    let dt = B::fixed_timestep(world);

    let origins: Vec<(Entity, Vec3)> = world
        .query_filtered::<Entity, (With<CharacterController>, With<MovementIntent>)>()
        .iter(world)
        .map(|e| (e, B::position(world, e)))
        .collect();

    for (intent, facing, config, mut controller) in world
        .query::<(
            &MovementIntent,
            Option<&CharacterFacing>,
            &ControllerConfig,
            &mut CharacterController,
        )>()
        .iter_mut(world)
    {
        controller.reset_move_state();
        let facing = facing.copied().unwrap_or_default();
        controller.requested_move = requested_displacement(intent, &facing, config, dt);
    }

    for (entity, origin) in origins {
        if let Some(mut controller) = world.get_mut::<CharacterController>(entity) {
            controller.move_origin = origin;
        }
    }
}

/// Resolve a controller's pending move request with the given probe.
///
/// Backends call this from their probing system with a [`RayProbe`] bound to
/// the character. Rays start from the controller's `move_origin`. The outcome
/// is stored on the controller for [`apply_movement`].
pub fn resolve_pending_move(
    probe: &impl RayProbe,
    body: &CharacterBody,
    config: &ControllerConfig,
    controller: &mut CharacterController,
) {
    let query = MoveQuery {
        origin: controller.move_origin,
        body,
        config,
        on_ground: controller.on_ground,
        bottom_contact: controller.bottom_contact,
    };
    controller.move_outcome = Some(resolve_move(probe, &query, controller.requested_move));
}

/// Apply resolved moves to the character origins.
pub fn apply_movement<B: CharacterPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, Option<Result<Vec3, MoveRejection>>)> = world
        .query::<(Entity, &mut CharacterController)>()
        .iter_mut(world)
        .map(|(e, mut controller)| {
            controller.is_moving = false;
            (e, controller.move_outcome)
        })
        .collect();

    for (entity, outcome) in entities {
        match outcome {
            Some(Ok(delta)) => {
                B::add_to_origin(world, entity, delta, false);
                if let Some(mut controller) = world.get_mut::<CharacterController>(entity) {
                    controller.is_moving = true;
                }
            }
            Some(Err(MoveRejection::NoMovement)) | None => {}
            Some(Err(rejection)) => {
                trace!("{entity} move dropped: {rejection:?}");
                if let Some(mut controller) = world.get_mut::<CharacterController>(entity) {
                    controller.last_rejection = Some(rejection);
                }
            }
        }
    }
}

/// Apply jump impulses for pending jump requests.
///
/// Requests made while airborne are discarded.
pub fn apply_jump<B: CharacterPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, Option<Vec3>)> = world
        .query::<(
            Entity,
            &mut MovementIntent,
            &ControllerConfig,
            Option<&CharacterFacing>,
            &CharacterController,
        )>()
        .iter_mut(world)
        .filter_map(|(e, mut intent, config, facing, controller)| {
            if !intent.has_jump_request() {
                return None;
            }
            intent.take_jump_request();
            let facing = facing.copied().unwrap_or_default();
            Some((
                e,
                jump_impulse(controller.on_ground, controller.is_moving, &facing, config),
            ))
        })
        .collect();

    for (entity, impulse) in entities {
        let Some(impulse) = impulse else {
            trace!("{entity} jump request discarded while airborne");
            continue;
        };

        debug!("{entity} jumped with impulse {impulse}");
        B::apply_impulse(world, entity, impulse);
        B::set_gravity_enabled(world, entity, true);
        if let Some(mut controller) = world.get_mut::<CharacterController>(entity) {
            controller.on_ground = false;
            controller.lifting_off = true;
        }
    }
}

/// Mirror the controller state onto the [`Grounded`] / [`Airborne`] markers.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<(Entity, &CharacterController, Has<Grounded>, Has<Airborne>)>,
) {
    for (entity, controller, has_grounded, has_airborne) in &q_controllers {
        if controller.on_ground && !has_grounded {
            commands.entity(entity).insert(Grounded).remove::<Airborne>();
        } else if !controller.on_ground && !has_airborne {
            commands.entity(entity).insert(Airborne).remove::<Grounded>();
        }
    }
}

/// Drop jump requests nothing consumed this tick.
pub fn clear_jump_requests(mut q: Query<&mut MovementIntent>) {
    for mut intent in &mut q {
        if intent.has_jump_request() {
            intent.take_jump_request();
        }
    }
}
