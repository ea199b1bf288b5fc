//! Character collision volume dimensions.

use bevy::prelude::*;
use thiserror::Error;

/// Errors raised while building a character.
///
/// These are construction-time failures: a character with a degenerate
/// collision volume cannot be simulated, so spawn helpers treat them as fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CharacterError {
    #[error(
        "character dimensions must be positive and finite \
         (radius_xz = {radius_xz}, height_above_origin = {height_above}, \
         height_below_origin = {height_below})"
    )]
    InvalidDimensions {
        radius_xz: f32,
        height_above: f32,
        height_below: f32,
    },
    #[error("character mass must be positive and finite, got {0}")]
    InvalidMass(f32),
    #[error("collision shape does not enclose the character origin")]
    OriginOutsideShape,
}

/// Immutable extents of a character's collision volume, measured from its
/// origin.
///
/// Derived once when the character is built and never changed afterwards.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct CharacterBody {
    radius_xz: f32,
    height_above_origin: f32,
    height_below_origin: f32,
    mass: f32,
}

impl CharacterBody {
    /// Build a body from explicit extents.
    pub fn new(
        radius_xz: f32,
        height_above_origin: f32,
        height_below_origin: f32,
        mass: f32,
    ) -> Result<Self, CharacterError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !(valid(radius_xz) && valid(height_above_origin) && valid(height_below_origin)) {
            return Err(CharacterError::InvalidDimensions {
                radius_xz,
                height_above: height_above_origin,
                height_below: height_below_origin,
            });
        }
        if !valid(mass) {
            return Err(CharacterError::InvalidMass(mass));
        }
        Ok(Self {
            radius_xz,
            height_above_origin,
            height_below_origin,
            mass,
        })
    }

    /// Build a body from the local-space bounds of the collision shape.
    ///
    /// The horizontal radius is the larger of the X and Z half extents. The
    /// origin is the local-space origin of the shape.
    pub fn from_local_bounds(min: Vec3, max: Vec3, mass: f32) -> Result<Self, CharacterError> {
        if min.y >= 0.0 || max.y <= 0.0 {
            return Err(CharacterError::OriginOutsideShape);
        }
        let half = (max - min) * 0.5;
        Self::new(half.x.max(half.z), max.y, -min.y, mass)
    }

    /// Horizontal extent of the collision volume.
    #[inline]
    pub fn radius_xz(&self) -> f32 {
        self.radius_xz
    }

    /// Distance from the origin to the top of the collision volume.
    #[inline]
    pub fn height_above_origin(&self) -> f32 {
        self.height_above_origin
    }

    /// Distance from the origin to the bottom of the collision volume.
    #[inline]
    pub fn height_below_origin(&self) -> f32 {
        self.height_below_origin
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }
}
