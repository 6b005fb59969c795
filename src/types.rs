//! Common types and enums for trajectory prediction.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Physics model for trajectory integration.
///
/// Defines the integration method used when stepping a predicted projectile.
/// Different variants offer trade-offs between accuracy and performance.
///
/// # Variants
/// * `Euler` - Simple Euler integration (faster but less accurate)
/// * `RK4` - Runge-Kutta 4th order integration (more accurate, slightly slower)
///
/// # Example
/// ```
/// use bevy_bow_trajectory::types::PhysicsModel;
///
/// let model = PhysicsModel::RK4; // For high accuracy
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Reflect)]
pub enum PhysicsModel {
    /// Simple Euler integration (fast, less accurate)
    Euler,
    /// Runge-Kutta 4th order (accurate, slightly slower)
    #[default]
    RK4,
}

/// The three ranged weapons that can show a trajectory line.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Reflect)]
pub enum WeaponKind {
    /// Primitive bow crafted from sticks and rope
    CraftedBow,
    /// Compound bow found in the world
    TacticalBow,
    /// Bolt-firing crossbow
    Crossbow,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 3] = [
        WeaponKind::CraftedBow,
        WeaponKind::TacticalBow,
        WeaponKind::Crossbow,
    ];
}

/// Host-assigned item identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Reflect, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// Attack state reported by a bow controller.
///
/// Only `MidAttack` (the string is drawn and held) produces a trajectory line.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Reflect)]
pub enum AttackState {
    /// Weapon held, not drawn
    #[default]
    Idle,
    /// String drawn, projectile not yet released
    MidAttack,
    /// Projectile released, weapon recovering
    Recovering,
}

/// Aerodynamic drag applied while sampling a trajectory.
///
/// # Variants
/// * `None` - No drag, pure parabolic flight
/// * `Linear` - Drag acceleration proportional to velocity (`-k * v`)
/// * `Quadratic` - Drag acceleration proportional to squared speed (`-k * |v| * v`)
///
/// # Example
/// ```
/// use bevy_bow_trajectory::types::DragModel;
///
/// let arrow_drag = DragModel::Quadratic { coefficient: 0.002 };
/// ```
#[derive(Clone, Copy, PartialEq, Debug, Default, Reflect)]
pub enum DragModel {
    #[default]
    None,
    Linear { coefficient: f32 },
    Quadratic { coefficient: f32 },
}

impl DragModel {
    /// Drag acceleration for a velocity measured relative to the air.
    pub fn acceleration(&self, relative_velocity: Vec3) -> Vec3 {
        match *self {
            DragModel::None => Vec3::ZERO,
            DragModel::Linear { coefficient } => -relative_velocity * coefficient,
            DragModel::Quadratic { coefficient } => {
                -relative_velocity * relative_velocity.length() * coefficient
            }
        }
    }
}

/// Ballistic properties of a loaded ammunition type.
///
/// # Fields
/// * `speed` - Launch speed in meters per second
/// * `gravity_scale` - Multiplier applied to environment gravity
/// * `drag` - Drag model for the projectile
///
/// # Example
/// ```
/// use bevy_bow_trajectory::types::{BallisticProperties, DragModel};
///
/// let bolt = BallisticProperties {
///     speed: 70.0,
///     gravity_scale: 0.8,
///     drag: DragModel::Linear { coefficient: 0.05 },
/// };
/// ```
#[derive(Clone, Copy, PartialEq, Debug, Reflect)]
pub struct BallisticProperties {
    /// Launch speed (m/s)
    pub speed: f32,
    /// Gravity multiplier
    pub gravity_scale: f32,
    /// Drag model
    pub drag: DragModel,
}

impl Default for BallisticProperties {
    /// Defaults to a plain wooden arrow: 40 m/s, full gravity, light quadratic drag.
    fn default() -> Self {
        Self {
            speed: 40.0,
            gravity_scale: 1.0,
            drag: DragModel::Quadratic { coefficient: 0.001 },
        }
    }
}

/// Launch state of a projectile about to be released.
///
/// Built fresh every frame from the weapon's spawn point and its ammunition.
/// The constructor normalizes `direction` and clamps `speed` to be non-negative.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_bow_trajectory::types::{BallisticProperties, LaunchParameters};
///
/// let launch = LaunchParameters::new(
///     Vec3::new(0.0, 1.6, 0.0),
///     Vec3::new(0.0, 0.0, -2.0),
///     &BallisticProperties::default(),
/// );
/// assert_eq!(launch.direction, Vec3::NEG_Z);
/// ```
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LaunchParameters {
    /// World-space launch position
    pub origin: Vec3,
    /// Unit launch direction (zero if the input direction was degenerate)
    pub direction: Vec3,
    /// Launch speed (m/s)
    pub speed: f32,
    /// Gravity multiplier
    pub gravity_scale: f32,
    /// Drag model
    pub drag: DragModel,
}

impl LaunchParameters {
    pub fn new(origin: Vec3, direction: Vec3, ballistics: &BallisticProperties) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            speed: ballistics.speed.max(0.0),
            gravity_scale: ballistics.gravity_scale,
            drag: ballistics.drag,
        }
    }

    /// Initial velocity vector.
    pub fn velocity(&self) -> Vec3 {
        self.direction * self.speed
    }
}

/// Ordered points along a predicted flight path.
///
/// The first point is always the launch origin, so a sample is never empty.
/// The buffer can be reset and refilled across frames without reallocating.
#[derive(Clone, PartialEq, Debug)]
pub struct TrajectorySample {
    points: Vec<Vec3>,
}

impl Default for TrajectorySample {
    fn default() -> Self {
        Self::starting_at(Vec3::ZERO)
    }
}

impl TrajectorySample {
    /// Creates a sample containing only `origin`.
    pub fn starting_at(origin: Vec3) -> Self {
        Self {
            points: vec![origin],
        }
    }

    /// Creates a sample with room for `capacity` points.
    pub fn with_capacity(origin: Vec3, capacity: usize) -> Self {
        let mut points = Vec::with_capacity(capacity.max(1));
        points.push(origin);
        Self { points }
    }

    /// Clears the sample back to a single `origin` point, keeping capacity.
    pub fn reset(&mut self, origin: Vec3) {
        self.points.clear();
        self.points.push(origin);
    }

    pub(crate) fn push(&mut self, point: Vec3) {
        self.points.push(point);
    }

    /// Raw buffer access for host simulators. Callers must restore the
    /// origin-first invariant before handing the sample on.
    pub(crate) fn buffer_mut(&mut self) -> &mut Vec<Vec3> {
        &mut self.points
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn origin(&self) -> Vec3 {
        self.points[0]
    }

    pub fn last(&self) -> Vec3 {
        self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_normalizes_direction() {
        let launch = LaunchParameters::new(
            Vec3::ZERO,
            Vec3::new(3.0, 0.0, 4.0),
            &BallisticProperties::default(),
        );
        assert!((launch.direction.length() - 1.0).abs() < 1e-6);
        assert!((launch.velocity().length() - 40.0).abs() < 1e-4);
    }

    #[test]
    fn test_launch_clamps_negative_speed() {
        let ammo = BallisticProperties {
            speed: -5.0,
            ..Default::default()
        };
        let launch = LaunchParameters::new(Vec3::ZERO, Vec3::X, &ammo);
        assert_eq!(launch.speed, 0.0);
        assert_eq!(launch.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_zero_direction_falls_back_to_zero_velocity() {
        let launch = LaunchParameters::new(Vec3::ONE, Vec3::ZERO, &BallisticProperties::default());
        assert_eq!(launch.direction, Vec3::ZERO);
    }

    #[test]
    fn test_drag_opposes_motion() {
        let v = Vec3::new(10.0, 0.0, 0.0);
        let linear = DragModel::Linear { coefficient: 0.1 }.acceleration(v);
        let quadratic = DragModel::Quadratic { coefficient: 0.1 }.acceleration(v);
        assert!(linear.x < 0.0);
        assert!(quadratic.x < linear.x);
        assert_eq!(DragModel::None.acceleration(v), Vec3::ZERO);
    }

    #[test]
    fn test_sample_reset_keeps_origin_first() {
        let mut sample = TrajectorySample::with_capacity(Vec3::X, 16);
        sample.push(Vec3::Y);
        sample.push(Vec3::Z);
        assert_eq!(sample.len(), 3);

        sample.reset(Vec3::NEG_X);
        assert_eq!(sample.len(), 1);
        assert_eq!(sample.origin(), Vec3::NEG_X);
        assert_eq!(sample.last(), Vec3::NEG_X);
        assert!(!sample.is_empty());
    }
}
