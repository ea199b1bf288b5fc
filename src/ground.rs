//! Ground classification from contact points.

use crate::collision::ContactPoint;
use crate::math::slope_angle;

/// Result of classifying one tick's contacts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundContact {
    /// Whether any contact is walkable.
    pub on_ground: bool,
    /// Lowest contact, walkable or not. [`ContactPoint::NONE`] if there are
    /// no contacts.
    pub bottom: ContactPoint,
}

impl GroundContact {
    pub const NONE: Self = Self {
        on_ground: false,
        bottom: ContactPoint::NONE,
    };
}

/// Classify the contacts between a character and the static environment.
///
/// The character is on ground if any contact normal is strictly within
/// `walkable_floor_angle` of world up. The lowest contact is kept as the
/// reference for stepping and slope following even when it is not itself
/// walkable; with equal heights the first one wins.
pub fn classify_ground(contacts: &[ContactPoint], walkable_floor_angle: f32) -> GroundContact {
    let mut result = GroundContact::NONE;
    for contact in contacts {
        if contact.position.y < result.bottom.position.y {
            result.bottom = *contact;
        }
        if slope_angle(contact.normal) < walkable_floor_angle {
            result.on_ground = true;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::prelude::*;
    use std::f32::consts::FRAC_PI_4;

    fn contact(y: f32, normal: Vec3) -> ContactPoint {
        ContactPoint::new(Vec3::new(0.3, y, -0.2), normal.normalize())
    }

    #[test]
    fn no_contacts_is_airborne() {
        let result = classify_ground(&[], FRAC_PI_4);
        assert!(!result.on_ground);
        assert_eq!(result.bottom.position.y, f32::INFINITY);
        assert_eq!(result, GroundContact::NONE);
    }

    #[test]
    fn flat_contact_is_ground() {
        let result = classify_ground(&[contact(0.0, Vec3::Y)], FRAC_PI_4);
        assert!(result.on_ground);
        assert_eq!(result.bottom.position.y, 0.0);
    }

    #[test]
    fn wall_contact_is_not_ground_but_is_bottom() {
        let result = classify_ground(&[contact(0.5, Vec3::X)], FRAC_PI_4);
        assert!(!result.on_ground);
        assert_eq!(result.bottom.position.y, 0.5);
    }

    #[test]
    fn threshold_is_strict() {
        // Exactly at the walkable angle: not walkable.
        let at_limit = contact(0.0, Vec3::new(1.0, 1.0, 0.0));
        let angle = slope_angle(at_limit.normal);
        let result = classify_ground(&[at_limit], angle);
        assert!(!result.on_ground);

        let result = classify_ground(&[at_limit], angle + 1e-4);
        assert!(result.on_ground);
    }

    #[test]
    fn any_walkable_contact_grounds_and_lowest_is_kept() {
        let steep_low = contact(-0.2, Vec3::new(1.0, 0.2, 0.0));
        let flat_high = contact(0.1, Vec3::Y);
        let result = classify_ground(&[flat_high, steep_low], FRAC_PI_4);

        assert!(result.on_ground);
        // The lowest point is retained even though it is too steep.
        assert_eq!(result.bottom, steep_low);
    }

    #[test]
    fn classification_is_order_independent() {
        let contacts = [
            contact(0.4, Vec3::X),
            contact(-0.1, Vec3::new(0.0, 1.0, 0.1)),
            contact(0.2, Vec3::NEG_Z),
            contact(0.0, Vec3::Y),
        ];
        let forward = classify_ground(&contacts, FRAC_PI_4);

        let mut reversed = contacts;
        reversed.reverse();
        let backward = classify_ground(&reversed, FRAC_PI_4);

        assert_eq!(forward, backward);
        assert_eq!(forward.bottom.position.y, -0.1);
    }

    #[test]
    fn ceiling_contact_is_not_ground() {
        let result = classify_ground(&[contact(2.0, Vec3::NEG_Y)], FRAC_PI_4);
        assert!(!result.on_ground);
    }
}
