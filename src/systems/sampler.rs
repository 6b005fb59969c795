//! Trajectory sampler - RK4 and Euler integration of a predicted flight path.

use bevy::prelude::*;

#[cfg(feature = "dim3")]
use avian3d::prelude::{SpatialQueryFilter, SpatialQueryPipeline};

use crate::resources::{SamplerSettings, TrajectoryEnvironment, TrajectorySimulator};
use crate::types::{LaunchParameters, PhysicsModel, TrajectorySample};

/// Decides whether a flight segment ends the trajectory.
///
/// Implementations return the point where the segment `from -> to` stops
/// (for example a surface hit), or `None` if the flight continues.
pub trait TerminalCondition {
    fn check(&self, from: Vec3, to: Vec3) -> Option<Vec3>;
}

/// Never terminates; only the point budget and travel time end the flight.
pub struct Unbounded;

impl TerminalCondition for Unbounded {
    fn check(&self, _from: Vec3, _to: Vec3) -> Option<Vec3> {
        None
    }
}

/// Flat horizontal ground at `height`.
pub struct GroundPlane {
    pub height: f32,
}

impl TerminalCondition for GroundPlane {
    fn check(&self, from: Vec3, to: Vec3) -> Option<Vec3> {
        if from.y >= self.height && to.y < self.height {
            let t = (from.y - self.height) / (from.y - to.y);
            let mut hit = from.lerp(to, t);
            hit.y = self.height;
            Some(hit)
        } else {
            None
        }
    }
}

impl<T: TerminalCondition> TerminalCondition for Option<T> {
    fn check(&self, from: Vec3, to: Vec3) -> Option<Vec3> {
        self.as_ref().and_then(|inner| inner.check(from, to))
    }
}

/// Combined conditions; the hit nearest to `from` wins.
impl<A: TerminalCondition, B: TerminalCondition> TerminalCondition for (A, B) {
    fn check(&self, from: Vec3, to: Vec3) -> Option<Vec3> {
        match (self.0.check(from, to), self.1.check(from, to)) {
            (Some(a), Some(b)) => {
                if from.distance_squared(a) <= from.distance_squared(b) {
                    Some(a)
                } else {
                    Some(b)
                }
            }
            (a, b) => a.or(b),
        }
    }
}

/// Raycasts each segment against world colliders.
///
/// Uses the avian3d query pipeline directly so the overlay keeps working
/// (without geometry hits) when the host has no physics.
#[cfg(feature = "dim3")]
pub struct GeometryTerminator<'a> {
    pub pipeline: &'a SpatialQueryPipeline,
    pub filter: SpatialQueryFilter,
}

#[cfg(feature = "dim3")]
impl TerminalCondition for GeometryTerminator<'_> {
    fn check(&self, from: Vec3, to: Vec3) -> Option<Vec3> {
        let segment = to - from;
        let length = segment.length();
        if length < 0.0001 {
            return None;
        }
        let direction = Dir3::new(segment).ok()?;

        self.pipeline
            .cast_ray(from, direction, length, true, &self.filter)
            .map(|hit| from + *direction * hit.distance)
    }
}

/// Samples a trajectory with default environment and no terminal condition.
///
/// # Arguments
/// * `launch` - Launch state of the projectile
/// * `max_points` - Maximum number of points, origin included (at least 1)
/// * `step_time` - Integration step in seconds
///
/// # Returns
/// A non-empty sample whose first point is `launch.origin`
pub fn sample(launch: &LaunchParameters, max_points: usize, step_time: f32) -> TrajectorySample {
    let settings = SamplerSettings {
        max_points,
        step_time,
        max_travel_time: f32::INFINITY,
        ..Default::default()
    };
    let mut out = TrajectorySample::with_capacity(launch.origin, max_points);
    sample_into(
        launch,
        &settings,
        &TrajectoryEnvironment::default(),
        &Unbounded,
        &mut out,
    );
    out
}

/// Samples a trajectory into a reusable buffer.
///
/// Steps the projectile from `launch.origin` with `settings.step_time`
/// increments and appends the position after each step. Stops when
/// `settings.max_points` is reached, when flight time reaches
/// `settings.max_travel_time`, or when `terminal` reports a hit; the hit point
/// is then the last sample.
///
/// # Arguments
/// * `launch` - Launch state of the projectile
/// * `settings` - Point budget, step size and integration method
/// * `env` - Gravity and wind
/// * `terminal` - Terminal condition checked on every segment
/// * `out` - Buffer to fill; previous contents are discarded
pub fn sample_into(
    launch: &LaunchParameters,
    settings: &SamplerSettings,
    env: &TrajectoryEnvironment,
    terminal: &impl TerminalCondition,
    out: &mut TrajectorySample,
) {
    out.reset(launch.origin);

    let max_points = settings.max_points.max(1);
    let dt = settings.step_time;
    if !(dt > 0.0) || !dt.is_finite() {
        return;
    }

    let mut position = launch.origin;
    let mut velocity = launch.velocity();
    let mut elapsed = 0.0;

    while out.len() < max_points && elapsed < settings.max_travel_time {
        let (next_position, next_velocity) = match settings.physics_model {
            PhysicsModel::RK4 => integrate_rk4(position, velocity, dt, launch, env),
            PhysicsModel::Euler => integrate_euler(position, velocity, dt, launch, env),
        };
        elapsed += dt;

        if !next_position.is_finite() {
            break;
        }

        if let Some(hit) = terminal.check(position, next_position) {
            out.push(hit);
            break;
        }

        out.push(next_position);
        position = next_position;
        velocity = next_velocity;
    }
}

/// Host points closer than this (squared, m²) to the origin count as the origin.
const ORIGIN_TOLERANCE_SQ: f32 = 1e-6;

/// Collects a trajectory from the host's own simulation routine.
///
/// The host decides where the flight ends. The result is cut at the first
/// non-finite point, gets the origin prepended if the host left it out (a
/// first point within a millimetre of the origin is snapped onto it instead),
/// and is truncated to `max_points`.
pub fn sample_with_host(
    host: &dyn TrajectorySimulator,
    launch: &LaunchParameters,
    max_points: usize,
    out: &mut TrajectorySample,
) {
    let buffer = out.buffer_mut();
    buffer.clear();
    host.simulate(launch, buffer);

    if let Some(bad) = buffer.iter().position(|p| !p.is_finite()) {
        buffer.truncate(bad);
    }
    match buffer.first_mut() {
        Some(first) if first.distance_squared(launch.origin) < ORIGIN_TOLERANCE_SQ => {
            *first = launch.origin;
        }
        _ => buffer.insert(0, launch.origin),
    }
    buffer.truncate(max_points.max(1));
}

/// RK4 (Runge-Kutta 4th order) integration step.
///
/// # Returns
/// The next `(position, velocity)`
fn integrate_rk4(
    position: Vec3,
    velocity: Vec3,
    dt: f32,
    launch: &LaunchParameters,
    env: &TrajectoryEnvironment,
) -> (Vec3, Vec3) {
    let k1 = calculate_acceleration(launch, velocity, env);
    let k2 = calculate_acceleration(launch, velocity + k1 * (dt / 2.0), env);
    let k3 = calculate_acceleration(launch, velocity + k2 * (dt / 2.0), env);
    let k4 = calculate_acceleration(launch, velocity + k3 * dt, env);

    // Weighted average of acceleration
    let final_accel = (k1 + k2 * 2.0 + k3 * 2.0 + k4) / 6.0;

    let next_velocity = velocity + final_accel * dt;
    (position + next_velocity * dt, next_velocity)
}

/// Simple Euler integration step.
fn integrate_euler(
    position: Vec3,
    velocity: Vec3,
    dt: f32,
    launch: &LaunchParameters,
    env: &TrajectoryEnvironment,
) -> (Vec3, Vec3) {
    let accel = calculate_acceleration(launch, velocity, env);
    let next_velocity = velocity + accel * dt;
    (position + next_velocity * dt, next_velocity)
}

/// Scaled gravity plus drag on the velocity relative to the air.
fn calculate_acceleration(
    launch: &LaunchParameters,
    velocity: Vec3,
    env: &TrajectoryEnvironment,
) -> Vec3 {
    env.gravity * launch.gravity_scale + launch.drag.acceleration(velocity - env.wind)
}
