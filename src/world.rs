//! Snapshot types for presentation layers.
//!
//! The `Snapshot` struct provides a serializable view of the simulation
//! state that a renderer, plotter, or HUD can consume without touching the
//! ECS world.

use crate::components::*;
use crate::challenge::ChallengeEngine;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a single projectile's state for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub ax: f64,
    pub ay: f64,
    /// Elapsed flight time in seconds.
    pub time: f64,
    pub fuel: f64,
    pub thrust: f64,
    /// Heading in degrees, the unit presentation layers display.
    pub heading_deg: f64,
    pub active: bool,
    /// Which backend currently drives the projectile.
    pub backend: String,
    /// Highest altitude reached so far.
    pub peak_height: f64,
}

impl ProjectileSnapshot {
    /// Kinetic energy per unit mass (J/kg).
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * (self.vx * self.vx + self.vy * self.vy)
    }

    /// Potential energy per unit mass above ground level (J/kg).
    pub fn potential_energy(&self, gravity: f64) -> f64 {
        gravity * self.y.max(0.0)
    }
}

/// Snapshot of the challenge session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChallengeSnapshot {
    pub active: bool,
    pub challenge_type: String,
    pub target_distance: f64,
    pub target_altitude: f64,
    pub target_width: f64,
    pub score: u32,
}

impl ChallengeSnapshot {
    pub fn from_engine(engine: &ChallengeEngine) -> Self {
        let target = engine.target();
        Self {
            active: engine.is_active(),
            challenge_type: engine.challenge_type().label().to_string(),
            target_distance: target.distance,
            target_altitude: target.altitude,
            target_width: target.width,
            score: engine.score(),
        }
    }
}

/// Complete simulation state snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current sub-step tick.
    pub tick: u64,
    /// Elapsed wall-simulation time in seconds.
    pub time: f64,
    /// All projectile states.
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Challenge session state.
    pub challenge: ChallengeSnapshot,
}

impl Snapshot {
    /// Create a snapshot of every projectile in the ECS world. The
    /// challenge section is filled in by the caller that owns the engine.
    pub fn from_world(world: &mut World, tick: u64, time: f64) -> Self {
        let mut projectiles = Vec::new();

        let mut query = world.query::<(
            &ProjectileId,
            &BackendChoice,
            &Position,
            &Velocity,
            &Acceleration,
            &FlightClock,
            &ThrustControl,
            &FlightStatus,
            &FlightStats,
        )>();

        for (id, choice, pos, vel, accel, clock, control, status, stats) in query.iter(world) {
            let backend = match choice {
                BackendChoice::Reference => "reference",
                BackendChoice::Accelerated => "accelerated",
            };

            projectiles.push(ProjectileSnapshot {
                id: id.0,
                x: pos.x,
                y: pos.y,
                vx: vel.vx,
                vy: vel.vy,
                ax: accel.ax,
                ay: accel.ay,
                time: clock.elapsed,
                fuel: control.fuel,
                thrust: control.thrust,
                heading_deg: control.heading_degrees(),
                active: status.active,
                backend: backend.to_string(),
                peak_height: stats.peak_height,
            });
        }

        projectiles.sort_by_key(|p| p.id);

        Self {
            tick,
            time,
            projectiles,
            challenge: ChallengeSnapshot::default(),
        }
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
