//! Jump velocity search and trajectory validation.
//!
//! A jump is a ballistic arc from one node to another. Many arcs connect the same two points;
//! [`best_jump`] sweeps the [time scale](NavMeshConfig::time_scales) of the flight and keeps the
//! slowest launch that rises above both endpoints. [`trajectory_is_clear`] then checks the chosen
//! arc against the grid.

use glam::Vec2;

use crate::{
    NavMeshConfig, TileGrid,
    math::{Arc, sign},
};

/// Finds the launch velocity with the smallest magnitude that carries an agent from `from` to `to`.
///
/// A candidate is only accepted if
/// - it starts by moving upward,
/// - its apex lies strictly between the two endpoints horizontally, and
/// - its apex is at least [`NavMeshConfig::jump_clearance`] above the higher endpoint.
///
/// Returns `None` if no tried time scale satisfies these constraints, which callers treat as an
/// infeasible jump. Collisions with the grid are not considered here, see [`trajectory_is_clear`].
pub fn best_jump(from: Vec2, to: Vec2, config: &NavMeshConfig) -> Option<Vec2> {
    let mut best: Option<Vec2> = None;
    for time_scale in config.time_scales() {
        let Some(velocity) = jump_candidate(from, to, time_scale, config) else {
            continue;
        };
        match best {
            Some(current) if current.length_squared() <= velocity.length_squared() => {}
            _ => best = Some(velocity),
        }
    }
    best
}

/// Solves the launch velocity for a single time scale, or `None` if the resulting arc is rejected.
fn jump_candidate(from: Vec2, to: Vec2, time_scale: f32, config: &NavMeshConfig) -> Option<Vec2> {
    let dx = to.x - from.x;
    let gravity = config.gravity;

    let vx = sign(dx) / time_scale;
    let duration = time_scale * dx.abs();
    if !duration.is_finite() || duration <= 0.0 {
        return None;
    }
    // to.y = from.y + vy * t + g * t² / 2
    let vy = (to.y - from.y - 0.5 * gravity * duration * duration) / duration;
    let velocity = Vec2::new(vx, vy);
    if !velocity.is_finite() || vy >= 0.0 {
        return None;
    }

    let apex = Arc::new(from, velocity, gravity).apex();
    let (left, right) = (from.x.min(to.x), from.x.max(to.x));
    if !(apex.x > left && apex.x < right) {
        return None;
    }
    if apex.y > from.y.min(to.y) - config.jump_clearance {
        return None;
    }
    Some(velocity)
}

/// Whether the arc launched from `from` with `velocity` reaches `to` without passing through a wall.
///
/// The arc is sampled every [`NavMeshConfig::trajectory_step`] tiles horizontally, always including
/// both endpoints. Samples outside of the grid count as collisions. Long arcs take at most
/// [`NavMeshConfig::MAX_TRAJECTORY_SAMPLES`] samples, spread evenly. A step that is not positive
/// never yields a clear trajectory.
pub fn trajectory_is_clear(
    grid: &(impl TileGrid + ?Sized),
    from: Vec2,
    to: Vec2,
    velocity: Vec2,
    config: &NavMeshConfig,
) -> bool {
    if velocity.x == 0.0 || !velocity.is_finite() {
        return false;
    }
    if config.trajectory_step.is_nan() || config.trajectory_step <= 0.0 {
        return false;
    }
    let arc = Arc::new(from, velocity, config.gravity);
    let span = to.x - from.x;
    let samples = (span.abs() / config.trajectory_step).ceil();
    if !samples.is_finite() {
        return false;
    }
    let samples = (samples as u32).min(NavMeshConfig::MAX_TRAJECTORY_SAMPLES);
    let step = config
        .trajectory_step
        .max(span.abs() / NavMeshConfig::MAX_TRAJECTORY_SAMPLES as f32);
    (0..=samples).all(|i| {
        let x = if i == samples {
            to.x
        } else {
            from.x + sign(span) * i as f32 * step
        };
        !grid.is_wall_at(Vec2::new(x, arc.y_at(x)))
    })
}
