//! Collision result structures.
//!
//! These structures hold the results of physics queries (ray casts and
//! contact enumeration) consumed by ground classification and stair detection.

use bevy::prelude::*;

/// Information about a ray cast hit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionData {
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// Normal of the surface at the hit point.
    pub normal: Vec3,
    /// World position of the hit point.
    pub point: Vec3,
    /// Entity that was hit (if known).
    pub entity: Option<Entity>,
}

impl CollisionData {
    /// Create a collision result.
    pub fn new(distance: f32, normal: Vec3, point: Vec3, entity: Option<Entity>) -> Self {
        Self {
            distance,
            normal,
            point,
            entity,
        }
    }
}

/// A contact between the character and another body for this physics step.
///
/// The normal points away from the other body, toward the character.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ContactPoint {
    /// World position of the contact.
    pub position: Vec3,
    /// Surface normal at the contact.
    pub normal: Vec3,
}

impl ContactPoint {
    /// Sentinel meaning "no contact found": `(0, +inf, 0)` with an up normal.
    pub const NONE: Self = Self {
        position: Vec3::new(0.0, f32::INFINITY, 0.0),
        normal: Vec3::Y,
    };

    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }

    /// Whether this is a real contact rather than [`ContactPoint::NONE`].
    #[inline]
    pub fn is_found(&self) -> bool {
        self.position.y.is_finite()
    }
}

impl Default for ContactPoint {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_data_new() {
        let hit = CollisionData::new(5.0, Vec3::Y, Vec3::new(10.0, 0.0, 2.0), None);

        assert_eq!(hit.distance, 5.0);
        assert_eq!(hit.normal, Vec3::Y);
        assert_eq!(hit.point, Vec3::new(10.0, 0.0, 2.0));
        assert!(hit.entity.is_none());
    }

    #[test]
    fn default_contact_is_sentinel() {
        let contact = ContactPoint::default();
        assert_eq!(contact.position.x, 0.0);
        assert_eq!(contact.position.y, f32::INFINITY);
        assert!(!contact.is_found());
    }

    #[test]
    fn real_contact_is_found() {
        let contact = ContactPoint::new(Vec3::new(1.0, -0.5, 3.0), Vec3::Y);
        assert!(contact.is_found());
    }
}
