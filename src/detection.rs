//! Stair-step and wall detection.
//!
//! Given a horizontal displacement request, probe rays are cast from head and
//! leg height in the direction of movement to tell walls from climbable stair
//! steps from slopes. The result is either the final displacement (with the
//! vertical correction needed to climb a step or follow terrain) or the
//! reason the move was dropped.
//!
//! The probes only ever see the static environment: the [`RayProbe`]
//! implementation is responsible for excluding the character's own body and
//! filtering by collision group.

use bevy::prelude::*;

use crate::body::CharacterBody;
use crate::collision::{CollisionData, ContactPoint};
use crate::config::ControllerConfig;
use crate::math::{flatten_xz, length_xz, slope_angle, unsigned_angle};

/// Probes reach this far past the body radius in the move direction.
pub const PROBE_RADIUS_FACTOR: f32 = 1.3;

/// A probe hit whose normal is within this angle of the reversed probe
/// direction is a head-on obstacle (40°).
pub const HEAD_ON_ANGLE: f32 = 0.698;

/// Step tops steeper than this are not stairs (3°).
pub const STEP_FLAT_ANGLE: f32 = 0.0524;

/// Margin on the expected slope rise when deciding if a hit is a step.
pub const STEP_SLOPE_MARGIN: f32 = 1.02;

/// Minimum rise above the bottom contact for a hit to count as a step.
pub const STEP_MIN_RISE: f32 = 0.02;

/// Margin on the slope-following probe height.
pub const SLOPE_PROBE_MARGIN: f32 = 1.05;

/// Closest-hit ray queries against the static environment.
///
/// Implemented by physics backends; tests substitute scripted probes. Any
/// `Fn(Vec3, Vec3) -> Option<CollisionData>` closure is a probe.
pub trait RayProbe {
    /// Cast a ray from `from` to `to` and return the closest hit, if any.
    fn cast_ray(&self, from: Vec3, to: Vec3) -> Option<CollisionData>;
}

impl<F> RayProbe for F
where
    F: Fn(Vec3, Vec3) -> Option<CollisionData>,
{
    fn cast_ray(&self, from: Vec3, to: Vec3) -> Option<CollisionData> {
        self(from, to)
    }
}

/// Why a move request was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum MoveRejection {
    /// The request had no horizontal component.
    NoMovement,
    /// A wall faces the character at head height.
    HeadBlocked,
    /// A wall at leg height with nothing to stand on in front of it.
    WallBlocked,
    /// An obstacle at leg height whose top is too steep to be a stair.
    SteepObstacle,
    /// A stair step taller than `max_step_height`.
    StepTooHigh,
}

/// Inputs of a single move resolution.
#[derive(Debug, Clone, Copy)]
pub struct MoveQuery<'a> {
    pub origin: Vec3,
    pub body: &'a CharacterBody,
    pub config: &'a ControllerConfig,
    pub on_ground: bool,
    pub bottom_contact: ContactPoint,
}

/// Whether a probe hit faces the probe head-on.
fn is_head_on(from: Vec3, to: Vec3, hit: &CollisionData) -> bool {
    unsigned_angle(from - to, hit.normal) < HEAD_ON_ANGLE
}

/// Resolve a horizontal move request into the final displacement.
///
/// `request` is the raw displacement for this tick; only its X and Z are
/// used. On success the returned vector carries the same X and Z (scaled by
/// air control while airborne) and the vertical correction.
pub fn resolve_move(
    probe: &impl RayProbe,
    query: &MoveQuery<'_>,
    request: Vec3,
) -> Result<Vec3, MoveRejection> {
    let horizontal = flatten_xz(request);
    let length = length_xz(horizontal);
    if length <= f32::EPSILON {
        return Err(MoveRejection::NoMovement);
    }

    let body = query.body;
    let origin = query.origin;
    let reach = horizontal * (body.radius_xz() * PROBE_RADIUS_FACTOR / length);

    // Head height
    let head_from = origin + Vec3::Y * body.height_above_origin();
    let head_to = head_from + reach;
    if let Some(hit) = probe.cast_ray(head_from, head_to) {
        if is_head_on(head_from, head_to, &hit) {
            return Err(MoveRejection::HeadBlocked);
        }
    }

    if !query.on_ground {
        return Ok(horizontal * query.config.air_control);
    }

    let bottom = query.bottom_contact.position;
    let mut vertical = 0.0;

    match find_stair_step(probe, query, reach)? {
        Some(step_height) => vertical = step_height,
        None => {
            if let Some(offset) = follow_slope(probe, query.config, bottom, horizontal) {
                vertical = offset;
            }
        }
    }

    Ok(Vec3::new(horizontal.x, vertical, horizontal.z))
}

/// Leg-height probe and the vertical probe in front of it.
///
/// `Ok(Some(h))` is an accepted step of height `h`, `Ok(None)` means no
/// stair was found and the caller should follow the slope.
fn find_stair_step(
    probe: &impl RayProbe,
    query: &MoveQuery<'_>,
    reach: Vec3,
) -> Result<Option<f32>, MoveRejection> {
    let body = query.body;
    let origin = query.origin;

    let leg_from = origin - Vec3::Y * (body.height_below_origin() - body.radius_xz());
    let leg_to = leg_from + reach;
    let Some(leg_hit) = probe.cast_ray(leg_from, leg_to) else {
        return Ok(None);
    };
    if !is_head_on(leg_from, leg_to, &leg_hit) {
        return Ok(None);
    }

    let top = Vec3::new(leg_to.x, origin.y + body.height_above_origin(), leg_to.z);
    let floor = Vec3::new(leg_to.x, origin.y - body.height_below_origin(), leg_to.z);
    let Some(step_hit) = probe.cast_ray(top, floor) else {
        return Err(MoveRejection::WallBlocked);
    };

    let step_slope = slope_angle(step_hit.normal);
    if step_slope > STEP_FLAT_ANGLE {
        return Err(MoveRejection::SteepObstacle);
    }

    let bottom_y = query.bottom_contact.position.y;
    let mut rise = step_slope.tan() * reach.length() * STEP_SLOPE_MARGIN;
    if rise <= 0.0 {
        rise = STEP_MIN_RISE;
    }
    if step_hit.point.y <= bottom_y + rise {
        return Ok(None);
    }

    let step_height = step_hit.point.y - bottom_y;
    if step_height <= query.config.max_step_height {
        Ok(Some(step_height))
    } else {
        Err(MoveRejection::StepTooHigh)
    }
}

/// Vertical offset that keeps the bottom contact on the terrain after moving.
fn follow_slope(
    probe: &impl RayProbe,
    config: &ControllerConfig,
    bottom: Vec3,
    horizontal: Vec3,
) -> Option<f32> {
    let span = config.walkable_floor_angle.tan() * length_xz(horizontal) * SLOPE_PROBE_MARGIN;
    let target = bottom + horizontal;
    probe
        .cast_ray(target + Vec3::Y * span, target - Vec3::Y * span)
        .map(|hit| hit.point.y - bottom.y)
}
