//! Backend selection, identity arena, and the fallback policy.
//!
//! The router owns both backends and the bounded identity arena. It decides
//! at launch which backend a projectile uses and, when a step diverges,
//! reseeds the reference backend from the last known-good state and re-steps
//! in the same invocation so the caller never observes a dropped frame.

use bevy_ecs::prelude::*;
use thiserror::Error;

use super::accelerated::{AcceleratedModule, ModuleState, RawEntryPoints};
use super::reference::ReferenceBackend;
use super::{IntegrationBackend, LaunchParams, StepReading};
use crate::components::BackendChoice;

/// Launch failures. The step path itself can never fail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LaunchError {
    #[error("all {capacity} projectile identity slots are live; discard one before launching")]
    ArenaFull { capacity: usize },
}

/// Fixed-size identity arena with explicit liveness tracking.
///
/// Slots are handed out ring-fashion from a cursor so identities rotate
/// through the space, but a slot is never reissued while its owner is live.
#[derive(Debug)]
struct SlotArena {
    alive: Vec<bool>,
    cursor: usize,
}

impl SlotArena {
    fn new(capacity: usize) -> Self {
        Self {
            alive: vec![false; capacity],
            cursor: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.alive.len()
    }

    fn live_count(&self) -> usize {
        self.alive.iter().filter(|&&a| a).count()
    }

    fn allocate(&mut self) -> Option<usize> {
        let capacity = self.alive.len();
        for offset in 0..capacity {
            let slot = (self.cursor + offset) % capacity;
            if !self.alive[slot] {
                self.alive[slot] = true;
                self.cursor = (slot + 1) % capacity;
                return Some(slot);
            }
        }
        None
    }

    fn release(&mut self, slot: usize) {
        if let Some(flag) = self.alive.get_mut(slot) {
            *flag = false;
        }
    }
}

/// Last known-good state used to seed the reference backend on fallback.
///
/// Internal backend state (acceleration history, exact fuel burn) may not
/// carry over exactly; the seed is an initial condition, not a perfect
/// continuation.
#[derive(Debug, Clone, Copy)]
pub struct FallbackSeed {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub elapsed: f64,
    pub thrust: f64,
    pub fuel: f64,
    pub heading: f64,
}

/// Owns the backends and decides which one each projectile uses.
#[derive(Resource, Debug)]
pub struct BackendRouter {
    reference: ReferenceBackend,
    accelerated: AcceleratedModule,
    slots: SlotArena,
}

impl BackendRouter {
    pub fn new(capacity: usize) -> Self {
        Self {
            reference: ReferenceBackend::new(capacity),
            accelerated: AcceleratedModule::not_loaded(),
            slots: SlotArena::new(capacity),
        }
    }

    /// Resolve and adopt an accelerated module offered by the host.
    ///
    /// Only affects launches made after the call; projectiles already in
    /// flight keep their backend.
    pub fn install_accelerated(&mut self, raw: RawEntryPoints) {
        self.accelerated = AcceleratedModule::install(raw);
    }

    pub fn module_state(&self) -> ModuleState {
        self.accelerated.state()
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn live_count(&self) -> usize {
        self.slots.live_count()
    }

    /// Allocate an identity and initialize it on the selected backend.
    ///
    /// The accelerated backend is selected iff its module is ready;
    /// anything else falls to the reference backend with a logged,
    /// non-fatal degradation notice.
    pub fn launch(&mut self, params: &LaunchParams) -> Result<(usize, BackendChoice), LaunchError> {
        let slot = self.slots.allocate().ok_or(LaunchError::ArenaFull {
            capacity: self.slots.capacity(),
        })?;

        let choice = if self.accelerated.is_ready() {
            self.accelerated.init(slot, params);
            BackendChoice::Accelerated
        } else {
            if self.accelerated.state() != ModuleState::NotLoaded {
                log::warn!(
                    "accelerated backend unavailable ({:?}); slot {} uses the reference backend",
                    self.accelerated.state(),
                    slot
                );
            }
            self.reference.init(slot, params);
            BackendChoice::Reference
        };

        Ok((slot, choice))
    }

    /// Advance one slot one time slice on its current backend and read the
    /// result.
    pub fn step(
        &mut self,
        slot: usize,
        choice: BackendChoice,
        dt: f64,
        gravity: f64,
        air_resistance: bool,
    ) -> StepReading {
        match choice {
            BackendChoice::Reference => {
                self.reference.step(slot, dt, gravity, air_resistance);
                self.reference.read(slot)
            }
            BackendChoice::Accelerated => {
                self.accelerated.step(slot, dt, gravity, air_resistance);
                self.accelerated.read(slot)
            }
        }
    }

    /// Switch a slot to the reference backend after a divergent step.
    ///
    /// Seeds the reference body from the last known-good state, then
    /// immediately performs one reference step for the same `dt` so the
    /// caller still observes a valid result this invocation.
    pub fn fall_back(
        &mut self,
        slot: usize,
        seed: &FallbackSeed,
        dt: f64,
        gravity: f64,
        air_resistance: bool,
    ) -> StepReading {
        self.reference.reseed(
            slot,
            seed.x,
            seed.y,
            seed.vx,
            seed.vy,
            seed.elapsed,
            seed.thrust,
            seed.fuel,
            seed.heading,
        );
        self.reference.step(slot, dt, gravity, air_resistance);
        self.reference.read(slot)
    }

    /// Forward a steering command to the slot's backend. Returns whether
    /// the backend acted on it.
    pub fn set_heading(&mut self, slot: usize, choice: BackendChoice, heading: f64) -> bool {
        match choice {
            BackendChoice::Reference => self.reference.set_heading(slot, heading),
            BackendChoice::Accelerated => self.accelerated.set_heading(slot, heading),
        }
    }

    /// Forward a thrust change to the slot's backend. Returns whether the
    /// backend acted on it.
    pub fn set_thrust(&mut self, slot: usize, choice: BackendChoice, thrust: f64) -> bool {
        match choice {
            BackendChoice::Reference => self.reference.set_thrust(slot, thrust),
            BackendChoice::Accelerated => self.accelerated.set_thrust(slot, thrust),
        }
    }

    /// Release an identity so it may be reused by a future launch.
    pub fn release(&mut self, slot: usize) {
        self.slots.release(slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launch_params() -> LaunchParams {
        LaunchParams {
            x: 0.0,
            y: 0.0,
            speed: 20.0,
            angle_deg: 45.0,
            thrust: 0.0,
            fuel: 0.0,
        }
    }

    #[test]
    fn test_reference_selected_without_module() {
        let mut router = BackendRouter::new(4);
        let (slot, choice) = router.launch(&launch_params()).unwrap();
        assert_eq!(slot, 0);
        assert_eq!(choice, BackendChoice::Reference);
        assert_eq!(router.module_state(), ModuleState::NotLoaded);
    }

    #[test]
    fn test_arena_exhaustion_is_typed_error() {
        let mut router = BackendRouter::new(2);
        router.launch(&launch_params()).unwrap();
        router.launch(&launch_params()).unwrap();

        let err = router.launch(&launch_params()).unwrap_err();
        assert_eq!(err, LaunchError::ArenaFull { capacity: 2 });
    }

    #[test]
    fn test_slot_reuse_after_release() {
        let mut router = BackendRouter::new(2);
        let (a, _) = router.launch(&launch_params()).unwrap();
        let (b, _) = router.launch(&launch_params()).unwrap();
        assert_ne!(a, b);

        router.release(a);
        let (c, _) = router.launch(&launch_params()).unwrap();
        assert_eq!(c, a);
        assert_eq!(router.live_count(), 2);
    }

    #[test]
    fn test_ring_cursor_rotates_identities() {
        let mut router = BackendRouter::new(3);
        let (a, _) = router.launch(&launch_params()).unwrap();
        router.release(a);

        // With slot 0 free again, the cursor still prefers the next unused
        // slot before wrapping back around.
        let (b, _) = router.launch(&launch_params()).unwrap();
        assert_eq!(b, 1);
        let (c, _) = router.launch(&launch_params()).unwrap();
        assert_eq!(c, 2);
        let (d, _) = router.launch(&launch_params()).unwrap();
        assert_eq!(d, a);
    }

    #[test]
    fn test_step_advances_reference_slot() {
        let mut router = BackendRouter::new(2);
        let (slot, choice) = router.launch(&launch_params()).unwrap();

        let reading = router.step(slot, choice, 0.01, 9.81, false);
        assert!(reading.position_is_finite());
        assert!(reading.x > 0.0);
        assert_eq!(reading.elapsed, Some(0.01));
    }

    #[test]
    fn test_fallback_reseeds_and_steps_same_frame() {
        let mut router = BackendRouter::new(2);
        let seed = FallbackSeed {
            x: 10.0,
            y: 5.0,
            vx: 3.0,
            vy: 1.0,
            elapsed: 2.0,
            thrust: 0.0,
            fuel: 0.0,
            heading: 0.0,
        };

        let reading = router.fall_back(0, &seed, 0.01, 9.81, false);
        assert!(reading.position_is_finite());
        // One step past the seed: clock carried over plus dt.
        assert!((reading.elapsed.unwrap() - 2.01).abs() < 1e-12);
        assert!(reading.x > 10.0);
    }
}
