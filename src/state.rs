//! State marker components.
//!
//! These components mirror the GROUNDED / AIRBORNE state of a character
//! controller. They are added and removed by the controller systems based on
//! the ground classification, so gameplay code can filter queries on them.

use bevy::prelude::*;

/// Marker component indicating the character is grounded.
///
/// Added when the ground classifier finds a walkable contact against the
/// static environment. Removed when the character becomes airborne.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use stepwalk_controller::prelude::*;
///
/// // Grounded is a marker component - just use it in queries
/// fn check_grounded(grounded: Option<&Grounded>) -> bool {
///     grounded.is_some()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is airborne.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// The two controller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum ControllerState {
    Grounded,
    Airborne,
}

impl ControllerState {
    pub fn from_on_ground(on_ground: bool) -> Self {
        if on_ground {
            Self::Grounded
        } else {
            Self::Airborne
        }
    }

    /// Gravity is disabled while grounded so the character does not slide
    /// down slopes.
    pub fn gravity_enabled(self) -> bool {
        self == Self::Airborne
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_from_ground_flag() {
        assert_eq!(ControllerState::from_on_ground(true), ControllerState::Grounded);
        assert_eq!(ControllerState::from_on_ground(false), ControllerState::Airborne);
    }

    #[test]
    fn gravity_only_while_airborne() {
        assert!(!ControllerState::Grounded.gravity_enabled());
        assert!(ControllerState::Airborne.gravity_enabled());
    }
}
