//! Reference integration backend.
//!
//! A complete, self-contained implementation of the backend contract over a
//! fixed-size body arena. Needs no external resources and implements every
//! optional accessor, so it is always a valid fallback target.

use super::{IntegrationBackend, LaunchParams};

/// Quadratic drag coefficient `k` in `a_drag = -k * |v| * v`.
pub const DRAG_COEFF: f64 = 0.05;

/// Below this speed drag is skipped to avoid numerical jitter at rest.
pub const MIN_DRAG_SPEED: f64 = 0.1;

/// Hard floor far below ground level. Falling past it deactivates the body
/// as out of bounds; ground-level termination is the challenge engine's
/// concern, not the integrator's.
pub const OUT_OF_BOUNDS_FLOOR: f64 = -100.0;

/// Full kinematic state of one body slot.
#[derive(Debug, Clone, Copy, Default)]
struct BodyState {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    ax: f64,
    ay: f64,
    time: f64,
    thrust: f64,
    fuel: f64,
    /// Thrust direction in radians.
    heading: f64,
    active: bool,
}

/// The always-available pure-Rust integrator.
#[derive(Debug)]
pub struct ReferenceBackend {
    bodies: Vec<BodyState>,
}

impl ReferenceBackend {
    pub fn new(capacity: usize) -> Self {
        Self {
            bodies: vec![BodyState::default(); capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.bodies.len()
    }

    /// Seed a slot from externally observed state instead of launch
    /// parameters. Used when a projectile falls back from the accelerated
    /// backend mid-flight: position, velocity, and the clock carry over as
    /// an initial condition.
    pub fn reseed(
        &mut self,
        slot: usize,
        x: f64,
        y: f64,
        vx: f64,
        vy: f64,
        elapsed: f64,
        thrust: f64,
        fuel: f64,
        heading: f64,
    ) {
        let Some(body) = self.bodies.get_mut(slot) else {
            return;
        };
        *body = BodyState {
            x,
            y,
            vx,
            vy,
            ax: 0.0,
            ay: 0.0,
            time: elapsed,
            thrust,
            fuel,
            heading,
            active: true,
        };
    }

    fn body(&self, slot: usize) -> Option<&BodyState> {
        self.bodies.get(slot)
    }
}

impl IntegrationBackend for ReferenceBackend {
    fn init(&mut self, slot: usize, params: &LaunchParams) {
        let Some(body) = self.bodies.get_mut(slot) else {
            return;
        };
        let (vx, vy) = params.velocity();
        *body = BodyState {
            x: params.x,
            y: params.y,
            vx,
            vy,
            ax: 0.0,
            ay: 0.0,
            time: 0.0,
            thrust: params.thrust,
            fuel: params.fuel,
            heading: params.heading(),
            active: true,
        };
    }

    fn step(&mut self, slot: usize, dt: f64, gravity: f64, air_resistance: bool) {
        let Some(body) = self.bodies.get_mut(slot) else {
            return;
        };
        if !body.active {
            return;
        }

        // Gravity resets the frame's acceleration.
        body.ax = 0.0;
        body.ay = -gravity;

        // Thrust along the current heading while fuel lasts.
        if body.fuel > 0.0 && body.thrust > 0.0 {
            body.ax += body.thrust * body.heading.cos();
            body.ay += body.thrust * body.heading.sin();
            body.fuel = (body.fuel - dt).max(0.0);
        }

        // Quadratic drag, skipped near rest.
        if air_resistance {
            let speed = (body.vx * body.vx + body.vy * body.vy).sqrt();
            if speed > MIN_DRAG_SPEED {
                body.ax -= DRAG_COEFF * body.vx * speed;
                body.ay -= DRAG_COEFF * body.vy * speed;
            }
        }

        // Semi-implicit Euler: velocity first, then position from the new
        // velocity.
        body.vx += body.ax * dt;
        body.vy += body.ay * dt;
        body.x += body.vx * dt;
        body.y += body.vy * dt;
        body.time += dt;

        if body.y < OUT_OF_BOUNDS_FLOOR {
            body.active = false;
        }
    }

    fn position(&self, slot: usize) -> (f64, f64) {
        self.body(slot).map_or((0.0, 0.0), |b| (b.x, b.y))
    }

    fn velocity(&self, slot: usize) -> (f64, f64) {
        self.body(slot).map_or((0.0, 0.0), |b| (b.vx, b.vy))
    }

    fn acceleration(&self, slot: usize) -> Option<(f64, f64)> {
        self.body(slot).map(|b| (b.ax, b.ay))
    }

    fn elapsed(&self, slot: usize) -> Option<f64> {
        self.body(slot).map(|b| b.time)
    }

    fn fuel(&self, slot: usize) -> Option<f64> {
        self.body(slot).map(|b| b.fuel)
    }

    fn heading(&self, slot: usize) -> Option<f64> {
        self.body(slot).map(|b| b.heading)
    }

    fn is_active(&self, slot: usize) -> Option<bool> {
        self.body(slot).map(|b| b.active)
    }

    fn set_heading(&mut self, slot: usize, heading: f64) -> bool {
        if let Some(body) = self.bodies.get_mut(slot) {
            body.heading = heading;
            true
        } else {
            false
        }
    }

    fn set_thrust(&mut self, slot: usize, thrust: f64) -> bool {
        if let Some(body) = self.bodies.get_mut(slot) {
            body.thrust = thrust;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: f64 = 9.81;

    fn launch(speed: f64, angle_deg: f64) -> LaunchParams {
        LaunchParams {
            x: 0.0,
            y: 0.0,
            speed,
            angle_deg,
            thrust: 0.0,
            fuel: 0.0,
        }
    }

    /// Step until the body comes back down through y = 0 and return the x
    /// where it crossed.
    fn fly_to_ground(backend: &mut ReferenceBackend, slot: usize, dt: f64) -> f64 {
        let mut rising = true;
        for _ in 0..1_000_000 {
            backend.step(slot, dt, G, false);
            let (x, y) = backend.position(slot);
            let (_, vy) = backend.velocity(slot);
            if vy < 0.0 {
                rising = false;
            }
            if !rising && y <= 0.0 {
                return x;
            }
        }
        panic!("projectile never landed");
    }

    #[test]
    fn test_init_decomposes_speed_and_angle() {
        let mut backend = ReferenceBackend::new(4);
        backend.init(0, &launch(10.0, 60.0));

        let (vx, vy) = backend.velocity(0);
        assert!((vx - 10.0 * 60f64.to_radians().cos()).abs() < 1e-12);
        assert!((vy - 10.0 * 60f64.to_radians().sin()).abs() < 1e-12);
        assert_eq!(backend.is_active(0), Some(true));
        assert_eq!(backend.elapsed(0), Some(0.0));
    }

    #[test]
    fn test_closed_form_range_without_drag() {
        // R = v0^2 sin(2 theta) / g; 40.77 m for v0=20, theta=45 deg.
        let mut backend = ReferenceBackend::new(4);
        backend.init(0, &launch(20.0, 45.0));

        let range = fly_to_ground(&mut backend, 0, 0.0005);
        let expected = 20.0_f64.powi(2) * (2.0 * 45f64.to_radians()).sin() / G;
        assert!(
            (range - expected).abs() < 0.5,
            "range {range} differs from closed form {expected}"
        );
    }

    #[test]
    fn test_drag_shortens_range() {
        let mut backend = ReferenceBackend::new(4);
        backend.init(0, &launch(20.0, 45.0));
        backend.init(1, &launch(20.0, 45.0));

        let dt = 0.001;
        let free = fly_to_ground(&mut backend, 0, dt);

        let mut rising = true;
        let dragged = loop {
            backend.step(1, dt, G, true);
            let (x, y) = backend.position(1);
            let (_, vy) = backend.velocity(1);
            if vy < 0.0 {
                rising = false;
            }
            if !rising && y <= 0.0 {
                break x;
            }
        };

        assert!(dragged < free * 0.8, "drag barely shortened range: {dragged} vs {free}");
    }

    #[test]
    fn test_drag_skipped_near_rest() {
        let mut backend = ReferenceBackend::new(4);
        backend.init(
            0,
            &LaunchParams {
                x: 0.0,
                y: 0.0,
                speed: 0.05,
                angle_deg: 0.0,
                thrust: 0.0,
                fuel: 0.0,
            },
        );

        backend.step(0, 0.01, 0.0, true);
        let (ax, _) = backend.acceleration(0).unwrap();
        assert_eq!(ax, 0.0, "drag applied below the minimum speed threshold");
    }

    #[test]
    fn test_thrust_consumes_fuel_and_cuts_out() {
        let mut backend = ReferenceBackend::new(4);
        backend.init(
            0,
            &LaunchParams {
                x: 0.0,
                y: 0.0,
                speed: 0.0,
                angle_deg: 0.0,
                thrust: 30.0,
                fuel: 0.05,
            },
        );

        // Burn phase: thrust along heading (0 deg) overcomes nothing
        // horizontally, fuel drains by dt.
        backend.step(0, 0.02, 0.0, false);
        assert!((backend.fuel(0).unwrap() - 0.03).abs() < 1e-12);
        let (ax, _) = backend.acceleration(0).unwrap();
        assert!((ax - 30.0).abs() < 1e-12);

        // Fuel clamps at zero, never negative.
        backend.step(0, 0.02, 0.0, false);
        backend.step(0, 0.02, 0.0, false);
        assert_eq!(backend.fuel(0), Some(0.0));

        // With the tank dry the thrust term disappears.
        backend.step(0, 0.02, 0.0, false);
        let (ax, _) = backend.acceleration(0).unwrap();
        assert_eq!(ax, 0.0);
    }

    #[test]
    fn test_steering_redirects_thrust() {
        let mut backend = ReferenceBackend::new(4);
        backend.init(
            0,
            &LaunchParams {
                x: 0.0,
                y: 0.0,
                speed: 0.0,
                angle_deg: 0.0,
                thrust: 10.0,
                fuel: 10.0,
            },
        );

        assert!(backend.set_heading(0, 90f64.to_radians()));
        backend.step(0, 0.01, 0.0, false);
        let (ax, ay) = backend.acceleration(0).unwrap();
        assert!(ax.abs() < 1e-9);
        assert!((ay - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_bounds_floor_deactivates() {
        let mut backend = ReferenceBackend::new(4);
        backend.init(0, &launch(0.0, 0.0));

        // Free fall until past the floor.
        for _ in 0..10_000 {
            backend.step(0, 0.01, G, false);
            if backend.is_active(0) == Some(false) {
                break;
            }
        }
        assert_eq!(backend.is_active(0), Some(false));
        let (_, y) = backend.position(0);
        assert!(y < OUT_OF_BOUNDS_FLOOR);

        // Terminal: further steps change nothing.
        let frozen = backend.position(0);
        backend.step(0, 0.01, G, false);
        assert_eq!(backend.position(0), frozen);
    }

    #[test]
    fn test_crossing_ground_does_not_deactivate() {
        // Ground-level termination belongs to the challenge engine; the
        // integrator only stops at the out-of-bounds floor.
        let mut backend = ReferenceBackend::new(4);
        backend.init(0, &launch(20.0, 45.0));

        for _ in 0..5_000 {
            backend.step(0, 0.001, G, false);
            let (_, y) = backend.position(0);
            if y < -1.0 {
                break;
            }
        }
        assert_eq!(backend.is_active(0), Some(true));
    }

    #[test]
    fn test_out_of_range_slot_is_inert() {
        let mut backend = ReferenceBackend::new(2);
        backend.init(7, &launch(20.0, 45.0));
        backend.step(7, 0.01, G, false);
        assert_eq!(backend.position(7), (0.0, 0.0));
        assert_eq!(backend.is_active(7), None);
        assert!(!backend.set_heading(7, 1.0));
    }

    #[test]
    fn test_reseed_carries_clock() {
        let mut backend = ReferenceBackend::new(2);
        backend.reseed(0, 5.0, 3.0, 1.0, 2.0, 1.25, 0.0, 0.0, 0.0);
        assert_eq!(backend.elapsed(0), Some(1.25));
        assert_eq!(backend.position(0), (5.0, 3.0));

        backend.step(0, 0.01, G, false);
        assert!((backend.elapsed(0).unwrap() - 1.26).abs() < 1e-12);
    }
}
