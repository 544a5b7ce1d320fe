//! Integration system - delegates each projectile's step to its backend,
//! applies the fallback policy, and sanitizes every reading before it
//! reaches the entity's observable state.

use crate::backend::{BackendRouter, FallbackSeed, MAX_PROJECTILES};
use crate::components::*;
use bevy_ecs::prelude::*;

/// Resource containing the delta time for the current sub-step.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct DeltaTime(pub f64);

/// Caller-supplied environment parameters for the current update.
#[derive(Resource, Debug, Clone, Copy)]
pub struct Environment {
    /// Gravitational acceleration in m/s^2.
    pub gravity: f64,
    /// Whether quadratic air drag is applied.
    pub air_resistance: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            air_resistance: false,
        }
    }
}

/// Configuration for the simulation loop.
#[derive(Resource, Debug, Clone)]
pub struct SimConfig {
    /// Number of equal sub-steps an outer update is subdivided into.
    pub substeps: u32,
    /// Upper clamp on an outer frame's dt, in seconds.
    pub max_frame_dt: f64,
    /// Substitute duration for non-finite or unreasonable dt values.
    pub nominal_frame_dt: f64,
    /// dt values above this are treated as malformed, not merely large.
    pub max_reasonable_dt: f64,
    /// Bound on concurrently live projectile identities.
    pub max_projectiles: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            substeps: 5,
            max_frame_dt: 0.05,          // one 20 Hz frame at most
            nominal_frame_dt: 1.0 / 60.0,
            max_reasonable_dt: 1.0,
            max_projectiles: MAX_PROJECTILES,
        }
    }
}

/// Global sub-step counter.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Overwrite a mirrored field only with a finite fresh reading; a
/// non-finite reading leaves the previous value in place.
#[inline]
fn accept(field: &mut f64, fresh: f64) {
    if fresh.is_finite() {
        *field = fresh;
    }
}

/// System that advances every active projectile by one sub-step.
///
/// Delegates to the entity's selected backend, falls back to the reference
/// backend on a divergent (non-finite) position, and applies the per-field
/// sanitization contract: no non-finite value ever overwrites observable
/// state.
pub fn integration_system(
    dt: Res<DeltaTime>,
    env: Res<Environment>,
    mut router: ResMut<BackendRouter>,
    mut query: Query<(
        &ProjectileId,
        &mut BackendChoice,
        &mut Position,
        &mut Velocity,
        &mut Acceleration,
        &mut FlightClock,
        &mut ThrustControl,
        &mut FlightStatus,
    )>,
) {
    let dt = dt.0;
    for (id, mut choice, mut pos, mut vel, mut accel, mut clock, mut control, mut status) in
        query.iter_mut()
    {
        if !status.active {
            continue;
        }

        // Last known-good state, captured before the step in case the
        // backend diverges and the reference backend must be reseeded.
        let seed = FallbackSeed {
            x: pos.x,
            y: pos.y,
            vx: vel.vx,
            vy: vel.vy,
            elapsed: clock.elapsed,
            thrust: control.thrust,
            fuel: control.fuel,
            heading: control.heading,
        };

        let mut reading = router.step(id.0, *choice, dt, env.gravity, env.air_resistance);

        if !reading.position_is_finite() && *choice == BackendChoice::Accelerated {
            log::warn!(
                "accelerated backend diverged for slot {} (x={}, y={}); falling back to reference",
                id.0,
                reading.x,
                reading.y
            );
            reading = router.fall_back(id.0, &seed, dt, env.gravity, env.air_resistance);
            *choice = BackendChoice::Reference;
        }

        accept(&mut pos.x, reading.x);
        accept(&mut pos.y, reading.y);
        accept(&mut vel.vx, reading.vx);
        accept(&mut vel.vy, reading.vy);

        // Optional readings surface as 0 when the backend lacks the
        // accessor (the acceleration is recomputed every step anyway).
        accept(&mut accel.ax, reading.ax.unwrap_or(0.0));
        accept(&mut accel.ay, reading.ay.unwrap_or(0.0));

        // The clock never moves backwards; if the backend cannot report it,
        // advance locally by the sub-step.
        match reading.elapsed {
            Some(t) if t.is_finite() && t >= clock.elapsed => clock.elapsed = t,
            _ => clock.elapsed += dt,
        }

        // Fuel and heading mirrors keep the caller's intent when the
        // backend does not track them.
        if let Some(fuel) = reading.fuel {
            accept(&mut control.fuel, fuel);
        }
        if let Some(heading) = reading.heading {
            accept(&mut control.heading, heading);
        }

        // Deactivation (out-of-bounds floor) is terminal.
        if reading.active == Some(false) {
            status.active = false;
        }
    }
}
