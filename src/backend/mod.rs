//! Integration backends: the physics-computation providers.
//!
//! A backend owns the authoritative per-slot body state and advances it one
//! fixed time slice at a time. Two providers exist:
//!
//! - [`ReferenceBackend`] - complete, self-contained, always available.
//! - [`AcceleratedModule`] - an externally supplied computation module that
//!   may be absent, partially implemented, or occasionally numerically
//!   unstable.
//!
//! [`BackendRouter`] picks a provider per projectile at launch and handles
//! the fallback from accelerated to reference when a step diverges.

pub mod accelerated;
pub mod reference;
pub mod router;

pub use accelerated::{
    AcceleratedModule, FlagFn, InitFn, ModuleState, RawEntryPoints, ReadFn, StepFn, WriteFn,
};
pub use reference::{ReferenceBackend, DRAG_COEFF, MIN_DRAG_SPEED, OUT_OF_BOUNDS_FLOOR};
pub use router::{BackendRouter, FallbackSeed, LaunchError};

/// Default bound on concurrently live projectile identities.
pub const MAX_PROJECTILES: usize = 10;

/// Initial conditions for one projectile.
#[derive(Debug, Clone, Copy)]
pub struct LaunchParams {
    pub x: f64,
    pub y: f64,
    /// Launch speed in m/s, decomposed along `angle_deg`.
    pub speed: f64,
    /// Launch angle in degrees from the positive x-axis.
    pub angle_deg: f64,
    /// Thrust acceleration magnitude (m/s^2); zero for ballistic flight.
    pub thrust: f64,
    /// Burn time in seconds.
    pub fuel: f64,
}

impl LaunchParams {
    pub fn heading(&self) -> f64 {
        self.angle_deg.to_radians()
    }

    /// Initial velocity components from the trigonometric decomposition of
    /// speed and launch angle.
    pub fn velocity(&self) -> (f64, f64) {
        let rad = self.heading();
        (self.speed * rad.cos(), self.speed * rad.sin())
    }
}

/// One step's worth of readings from a backend.
///
/// Position and velocity are required of every backend. The remaining
/// fields come from optional accessors: `None` means the backend does not
/// expose that reading, which callers surface as 0 where a number is
/// needed and as "unchanged" for the active flag.
#[derive(Debug, Clone, Copy)]
pub struct StepReading {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub ax: Option<f64>,
    pub ay: Option<f64>,
    pub elapsed: Option<f64>,
    pub fuel: Option<f64>,
    /// Heading in radians.
    pub heading: Option<f64>,
    pub active: Option<bool>,
}

impl StepReading {
    /// Whether the step produced a usable position. A non-finite position is
    /// the divergence signal that triggers backend fallback.
    pub fn position_is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Contract every physics-computation provider satisfies.
///
/// All operations are addressed by identity slot. Slots outside the
/// provider's capacity are ignored on write and read as inert zeros, so a
/// stale identity can never corrupt another body's state.
pub trait IntegrationBackend {
    /// Establish initial state for a slot.
    fn init(&mut self, slot: usize, params: &LaunchParams);

    /// Advance one fixed time slice for a slot.
    fn step(&mut self, slot: usize, dt: f64, gravity: f64, air_resistance: bool);

    fn position(&self, slot: usize) -> (f64, f64);

    fn velocity(&self, slot: usize) -> (f64, f64);

    /// Optional accessor; `None` when the provider does not expose it.
    fn acceleration(&self, slot: usize) -> Option<(f64, f64)> {
        let _ = slot;
        None
    }

    fn elapsed(&self, slot: usize) -> Option<f64> {
        let _ = slot;
        None
    }

    fn fuel(&self, slot: usize) -> Option<f64> {
        let _ = slot;
        None
    }

    /// Heading in radians.
    fn heading(&self, slot: usize) -> Option<f64> {
        let _ = slot;
        None
    }

    fn is_active(&self, slot: usize) -> Option<bool> {
        let _ = slot;
        None
    }

    /// Steer the slot. Returns whether the provider supports steering.
    fn set_heading(&mut self, slot: usize, heading: f64) -> bool {
        let _ = (slot, heading);
        false
    }

    /// Change thrust magnitude. Returns whether the provider supports it.
    fn set_thrust(&mut self, slot: usize, thrust: f64) -> bool {
        let _ = (slot, thrust);
        false
    }

    /// Collect all readings for a slot after a step.
    fn read(&self, slot: usize) -> StepReading {
        let (x, y) = self.position(slot);
        let (vx, vy) = self.velocity(slot);
        let (ax, ay) = match self.acceleration(slot) {
            Some((ax, ay)) => (Some(ax), Some(ay)),
            None => (None, None),
        };
        StepReading {
            x,
            y,
            vx,
            vy,
            ax,
            ay,
            elapsed: self.elapsed(slot),
            fuel: self.fuel(slot),
            heading: self.heading(slot),
            active: self.is_active(slot),
        }
    }
}
