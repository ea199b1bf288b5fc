//! Geometry helpers shared by the detection and jump logic.
//!
//! All functions are pure and operate on world-space vectors. The XZ plane is
//! the horizontal plane; `+Y` is world up.

use bevy::prelude::*;

/// Unsigned angle between two vectors in radians, in `[0, π]`.
///
/// Inputs are normalized first; a zero-length input yields `0.0`.
#[inline]
pub fn unsigned_angle(a: Vec3, b: Vec3) -> f32 {
    let a = a.normalize_or_zero();
    let b = b.normalize_or_zero();
    if a == Vec3::ZERO || b == Vec3::ZERO {
        return 0.0;
    }
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// Angle between a surface normal and world up.
///
/// `0` for flat ground, `π/2` for a vertical wall.
#[inline]
pub fn slope_angle(normal: Vec3) -> f32 {
    unsigned_angle(Vec3::Y, normal)
}

/// Project `v` onto `onto`. Returns zero if `onto` has no length.
#[inline]
pub fn project_onto(v: Vec3, onto: Vec3) -> Vec3 {
    let len_sq = onto.length_squared();
    if len_sq <= f32::EPSILON {
        return Vec3::ZERO;
    }
    onto * (v.dot(onto) / len_sq)
}

/// Remove the component of `v` along `normal`.
#[inline]
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - project_onto(v, normal)
}

/// Flatten a vector onto the XZ plane.
#[inline]
pub fn flatten_xz(v: Vec3) -> Vec3 {
    project_on_plane(v, Vec3::Y)
}

/// Length of the XZ component of a vector.
#[inline]
pub fn length_xz(v: Vec3) -> f32 {
    v.x.hypot(v.z)
}

/// Which side of a direction a point lies on, seen from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum Side {
    Left,
    Right,
    On,
}

/// Classify `point` relative to the line through `origin` along `direction`,
/// looking down from `+Y`.
///
/// Only X and Z are considered.
pub fn side_of(origin: Vec3, direction: Vec3, point: Vec3) -> Side {
    let d = flatten_xz(direction);
    let p = flatten_xz(point - origin);
    // Y of d × p. Positive means p is counter-clockwise from d seen from +Y,
    // which is the left-hand side for a character facing d.
    let cross_y = d.z * p.x - d.x * p.z;
    if cross_y > f32::EPSILON {
        Side::Left
    } else if cross_y < -f32::EPSILON {
        Side::Right
    } else {
        Side::On
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    #[test]
    fn angle_of_parallel_and_opposite_vectors() {
        assert!(unsigned_angle(Vec3::Y, Vec3::Y).abs() < 1e-6);
        assert!((unsigned_angle(Vec3::Y, Vec3::NEG_Y) - PI).abs() < 1e-6);
        assert!((unsigned_angle(Vec3::X, Vec3::Z) - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn angle_ignores_magnitude() {
        let angle = unsigned_angle(Vec3::new(0.0, 10.0, 0.0), Vec3::new(3.0, 3.0, 0.0));
        assert!((angle - FRAC_PI_4).abs() < 1e-5);
    }

    #[test]
    fn angle_with_zero_vector_is_zero() {
        assert_eq!(unsigned_angle(Vec3::ZERO, Vec3::X), 0.0);
    }

    #[test]
    fn slope_of_wall_and_floor() {
        assert!(slope_angle(Vec3::Y).abs() < 1e-6);
        assert!((slope_angle(Vec3::NEG_X) - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn projection_helpers() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(project_onto(v, Vec3::Y * 5.0), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(project_on_plane(v, Vec3::Y), Vec3::new(1.0, 0.0, 3.0));
        assert_eq!(project_onto(v, Vec3::ZERO), Vec3::ZERO);
        assert_eq!(flatten_xz(v), Vec3::new(1.0, 0.0, 3.0));
        assert!((length_xz(Vec3::new(3.0, 9.0, 4.0)) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn side_of_forward_direction() {
        // Facing -Z (Bevy forward): -X is left, +X is right.
        let forward = Vec3::NEG_Z;
        assert_eq!(side_of(Vec3::ZERO, forward, Vec3::new(-1.0, 0.0, -1.0)), Side::Left);
        assert_eq!(side_of(Vec3::ZERO, forward, Vec3::new(1.0, 0.0, -1.0)), Side::Right);
        assert_eq!(side_of(Vec3::ZERO, forward, Vec3::new(0.0, 4.0, -3.0)), Side::On);
    }
}
