//! Global resources for trajectory prediction.

use bevy::prelude::*;

use crate::types::{ItemId, LaunchParameters, PhysicsModel, WeaponKind};

/// Global environment settings affecting predicted flight.
///
/// # Fields
/// * `gravity` - Gravity vector in meters per second squared
/// * `wind` - Wind velocity vector in meters per second
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_bow_trajectory::resources::TrajectoryEnvironment;
///
/// let env = TrajectoryEnvironment {
///     gravity: Vec3::new(0.0, -9.81, 0.0),
///     wind: Vec3::new(2.0, 0.0, 0.0),
/// };
/// ```
#[derive(Resource, Reflect, Clone)]
#[reflect(Resource)]
pub struct TrajectoryEnvironment {
    /// Gravity vector (m/s²)
    pub gravity: Vec3,
    /// Wind velocity vector (m/s)
    pub wind: Vec3,
}

impl Default for TrajectoryEnvironment {
    /// Earth gravity, no wind.
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            wind: Vec3::ZERO,
        }
    }
}

/// Sampling budget and integration settings.
///
/// `max_points` bounds the per-frame work of the sampler, so prediction always
/// finishes within the frame.
///
/// # Fields
/// * `max_points` - Maximum points per sample, origin included
/// * `step_time` - Integration step in seconds
/// * `max_travel_time` - Flight time after which sampling stops
/// * `physics_model` - RK4 or Euler integration
/// * `ground_height` - Optional flat ground plane that ends the flight
/// * `debug_draw` - Draw sample points with gizmos
#[derive(Resource, Reflect, Clone)]
#[reflect(Resource)]
pub struct SamplerSettings {
    pub max_points: usize,
    pub step_time: f32,
    pub max_travel_time: f32,
    pub physics_model: PhysicsModel,
    pub ground_height: Option<f32>,
    pub debug_draw: bool,
}

impl Default for SamplerSettings {
    /// 120 points at 50 ms steps covers six seconds of arrow flight.
    fn default() -> Self {
        Self {
            max_points: 120,
            step_time: 0.05,
            max_travel_time: 6.0,
            physics_model: PhysicsModel::RK4,
            ground_height: None,
            debug_draw: false,
        }
    }
}

/// Maps host item ids to the weapon kinds that support a trajectory line.
///
/// The ids are distinct, so an item resolves to at most one kind.
#[derive(Resource, Reflect, Clone)]
#[reflect(Resource)]
pub struct ItemCatalog {
    pub crafted_bow: ItemId,
    pub tactical_bow: ItemId,
    pub crossbow: ItemId,
}

impl Default for ItemCatalog {
    fn default() -> Self {
        Self {
            crafted_bow: ItemId(443),
            tactical_bow: ItemId(360),
            crossbow: ItemId(365),
        }
    }
}

impl ItemCatalog {
    /// Weapon kind for an item id, if it is one of the supported weapons.
    pub fn kind_of(&self, item_id: ItemId) -> Option<WeaponKind> {
        if item_id == self.crafted_bow {
            Some(WeaponKind::CraftedBow)
        } else if item_id == self.tactical_bow {
            Some(WeaponKind::TacticalBow)
        } else if item_id == self.crossbow {
            Some(WeaponKind::Crossbow)
        } else {
            None
        }
    }

    pub fn id_of(&self, kind: WeaponKind) -> ItemId {
        match kind {
            WeaponKind::CraftedBow => self.crafted_bow,
            WeaponKind::TacticalBow => self.tactical_bow,
            WeaponKind::Crossbow => self.crossbow,
        }
    }
}

/// A host-provided projectile simulation routine.
///
/// When installed, the host decides where the flight ends (collision, range).
/// Implementations append the predicted points to `out`, which arrives empty.
pub trait TrajectorySimulator: Send + Sync + 'static {
    fn simulate(&self, launch: &LaunchParameters, out: &mut Vec<Vec3>);
}

impl<F> TrajectorySimulator for F
where
    F: Fn(&LaunchParameters, &mut Vec<Vec3>) + Send + Sync + 'static,
{
    fn simulate(&self, launch: &LaunchParameters, out: &mut Vec<Vec3>) {
        self(launch, out)
    }
}

/// Resource holding the host's simulation routine, if the host has one.
#[derive(Resource)]
pub struct HostTrajectorySimulator(pub Box<dyn TrajectorySimulator>);

impl HostTrajectorySimulator {
    pub fn new(simulator: impl TrajectorySimulator) -> Self {
        Self(Box::new(simulator))
    }
}
