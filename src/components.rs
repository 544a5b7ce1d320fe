//! ECS Components for the ballistics simulation.
//!
//! Components are pure data containers attached to projectile entities.
//! They mirror the state owned by the active integration backend; the
//! systems in [`crate::systems`] are the only writers during a step.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Identity slot of a projectile in the bounded backend arena.
///
/// Unique among currently live projectiles; a slot is recycled by the
/// router only after the owning entity is discarded.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectileId(pub usize);

/// Which integration backend currently drives this projectile.
///
/// `Accelerated` is chosen at launch only when the accelerated module is
/// ready. Flips to `Reference` permanently if a step diverges; the swap is
/// entity-local and never reverts.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendChoice {
    Reference,
    Accelerated,
}

// ============================================================================
// KINEMATIC COMPONENTS
// ============================================================================

/// 2D position in meters (x = downrange, y = altitude).
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// 2D velocity vector in meters per second.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f64,
    pub vy: f64,
}

impl Velocity {
    pub fn new(vx: f64, vy: f64) -> Self {
        Self { vx, vy }
    }
}

/// 2D acceleration vector in meters per second squared.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Acceleration {
    pub ax: f64,
    pub ay: f64,
}

/// Elapsed flight time in seconds.
///
/// Monotonically non-decreasing while the projectile is active; frozen once
/// the flight ends.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FlightClock {
    pub elapsed: f64,
}

// ============================================================================
// THRUST / STEERING COMPONENTS
// ============================================================================

/// Steering and propulsion state: thrust magnitude, remaining fuel, and the
/// heading (radians from the positive x-axis) thrust is applied along.
///
/// This mirror always reflects the caller's latest intent, even when the
/// active backend cannot act on a steering command.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ThrustControl {
    /// Thrust direction in radians.
    pub heading: f64,
    /// Thrust acceleration magnitude (m/s^2). Zero for ballistic flight.
    pub thrust: f64,
    /// Remaining burn time in seconds. Thrust cuts out at zero.
    pub fuel: f64,
}

impl ThrustControl {
    pub fn new(heading: f64, thrust: f64, fuel: f64) -> Self {
        Self { heading, thrust, fuel }
    }

    pub fn heading_degrees(&self) -> f64 {
        self.heading.to_degrees()
    }
}

/// Whether the projectile is still in flight.
///
/// `active == false` is terminal: the integration systems skip the entity
/// and its clock, path, and bounds no longer change.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlightStatus {
    pub active: bool,
}

impl Default for FlightStatus {
    fn default() -> Self {
        Self { active: true }
    }
}

/// Per-flight summary statistics for analysis displays.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FlightStats {
    /// Highest altitude reached so far.
    pub peak_height: f64,
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning a complete projectile entity.
#[derive(Bundle, Default)]
pub struct ProjectileBundle {
    pub id: ProjectileId,
    pub choice: BackendChoice,
    pub position: Position,
    pub velocity: Velocity,
    pub acceleration: Acceleration,
    pub clock: FlightClock,
    pub control: ThrustControl,
    pub status: FlightStatus,
    pub stats: FlightStats,
    pub trace: crate::path::PathTrace,
    pub bounds: crate::path::BoundsBox,
}

impl Default for ProjectileId {
    fn default() -> Self {
        Self(0)
    }
}

impl Default for BackendChoice {
    fn default() -> Self {
        Self::Reference
    }
}
