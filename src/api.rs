//! Public API for the simulation.
//!
//! This module provides the main interface for a renderer, plotter, or any
//! other presentation layer to drive the simulation.
//!
//! ## Step-driven loop
//!
//! The caller owns the clock. Each call to `update(dt, gravity,
//! air_resistance)` validates and clamps `dt`, subdivides it into a fixed
//! number of equal sub-steps, and advances every active projectile
//! sequentially. Malformed `dt` values are replaced with a nominal frame
//! duration, never propagated.
//!
//! ## Degradation, never failure
//!
//! The only fallible operation is `launch` (bounded identity arena). A
//! missing or broken accelerated module, a divergent step, or a malformed
//! input all degrade gracefully and log; the session continues
//! uninterrupted.

use crate::backend::{BackendRouter, LaunchError, LaunchParams, ModuleState, RawEntryPoints};
use crate::challenge::{ChallengeBrief, ChallengeEngine, CollisionOutcome};
use crate::components::*;
use crate::path::{BoundsBox, PathSample, PathTrace};
use crate::systems::*;
use crate::world::{ChallengeSnapshot, Snapshot};
use bevy_ecs::prelude::*;

/// The main simulation world container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Launching and discarding projectiles
/// - Stepping the simulation forward
/// - Steering thrust-capable projectiles mid-flight
/// - Running scored challenges against simulation output
/// - Extracting state snapshots
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    time: f64,
    /// Target and scoring state machine, fed by projectile readings.
    challenge: ChallengeEngine,
}

impl SimWorld {
    /// Create a new empty simulation world.
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Create a new simulation world with custom configuration.
    pub fn with_config(config: SimConfig) -> Self {
        let mut world = World::new();

        world.insert_resource(DeltaTime(config.nominal_frame_dt));
        world.insert_resource(Environment::default());
        world.insert_resource(SimTick(0));
        world.insert_resource(BackendRouter::new(config.max_projectiles));
        world.insert_resource(config);

        let mut schedule = Schedule::default();
        schedule.add_systems((integration_system, trace_system).chain());

        Self {
            world,
            schedule,
            time: 0.0,
            challenge: ChallengeEngine::new(),
        }
    }

    /// Offer the accelerated module's entry points to the router.
    ///
    /// Resolution happens immediately; only launches made after this call
    /// can select the accelerated backend.
    pub fn install_accelerated(&mut self, raw: RawEntryPoints) {
        self.world
            .resource_mut::<BackendRouter>()
            .install_accelerated(raw);
    }

    /// Lifecycle state of the accelerated module.
    pub fn accelerated_state(&self) -> ModuleState {
        self.world.resource::<BackendRouter>().module_state()
    }

    /// Launch a projectile.
    ///
    /// Speed is decomposed along `angle_deg` (degrees from the positive
    /// x-axis). `thrust` and `fuel` are zero for plain ballistic flight.
    /// Fails only when every identity slot is live.
    pub fn launch(
        &mut self,
        x: f64,
        y: f64,
        speed: f64,
        angle_deg: f64,
        thrust: f64,
        fuel: f64,
    ) -> Result<ProjectileId, LaunchError> {
        let params = LaunchParams {
            x,
            y,
            speed,
            angle_deg,
            thrust,
            fuel,
        };
        let (slot, choice) = self.world.resource_mut::<BackendRouter>().launch(&params)?;
        let (vx, vy) = params.velocity();

        self.world.spawn(ProjectileBundle {
            id: ProjectileId(slot),
            choice,
            position: Position::new(x, y),
            velocity: Velocity::new(vx, vy),
            acceleration: Acceleration::default(),
            clock: FlightClock::default(),
            control: ThrustControl::new(params.heading(), thrust, fuel),
            status: FlightStatus::default(),
            stats: FlightStats { peak_height: y },
            trace: PathTrace::seed(PathSample {
                x,
                y,
                vx,
                vy,
                ax: 0.0,
                ay: 0.0,
                time: 0.0,
            }),
            bounds: BoundsBox::from_point(x, y),
        });

        Ok(ProjectileId(slot))
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// `dt` is validated (non-finite, non-positive, or absurd values are
    /// replaced with the nominal frame duration), clamped, and subdivided
    /// into equal sub-steps so each slice stays numerically stable no
    /// matter how irregular the caller's outer loop is.
    pub fn update(&mut self, dt: f64, gravity: f64, air_resistance: bool) {
        let (substeps, max_frame_dt, nominal, max_reasonable) = {
            let config = self.world.resource::<SimConfig>();
            (
                config.substeps.max(1),
                config.max_frame_dt,
                config.nominal_frame_dt,
                config.max_reasonable_dt,
            )
        };

        let mut clean = dt;
        if !clean.is_finite() || clean <= 0.0 || clean > max_reasonable {
            log::warn!("malformed dt {dt}; substituting nominal frame duration {nominal}");
            clean = nominal;
        }
        let clean = clean.min(max_frame_dt);
        let sub_dt = clean / substeps as f64;

        {
            let mut env = self.world.resource_mut::<Environment>();
            if gravity.is_finite() {
                env.gravity = gravity;
            }
            env.air_resistance = air_resistance;
        }

        for _ in 0..substeps {
            self.world.resource_mut::<DeltaTime>().0 = sub_dt;
            self.world.resource_mut::<SimTick>().increment();
            self.schedule.run(&mut self.world);
            self.time += sub_dt;
        }
    }

    /// Steer a projectile's thrust direction mid-flight.
    ///
    /// Forwarded to the backend (a no-op if it does not support steering);
    /// the entity's mirrored heading is updated unconditionally so
    /// presentation layers always see the caller's intent.
    pub fn set_heading(&mut self, id: ProjectileId, angle_deg: f64) {
        let heading = angle_deg.to_radians();
        if let Some(choice) = self.backend_choice(id) {
            self.world
                .resource_mut::<BackendRouter>()
                .set_heading(id.0, choice, heading);
        }
        let mut query = self.world.query::<(&ProjectileId, &mut ThrustControl)>();
        for (pid, mut control) in query.iter_mut(&mut self.world) {
            if *pid == id {
                control.heading = heading;
                break;
            }
        }
    }

    /// Change a projectile's thrust magnitude mid-flight. Same mirroring
    /// contract as [`SimWorld::set_heading`].
    pub fn set_thrust(&mut self, id: ProjectileId, thrust: f64) {
        if let Some(choice) = self.backend_choice(id) {
            self.world
                .resource_mut::<BackendRouter>()
                .set_thrust(id.0, choice, thrust);
        }
        let mut query = self.world.query::<(&ProjectileId, &mut ThrustControl)>();
        for (pid, mut control) in query.iter_mut(&mut self.world) {
            if *pid == id {
                control.thrust = thrust;
                break;
            }
        }
    }

    /// End a flight. Terminal: the projectile receives no further physics
    /// updates; its path, clock, and bounds freeze.
    pub fn retire(&mut self, id: ProjectileId) {
        let mut query = self.world.query::<(&ProjectileId, &mut FlightStatus)>();
        for (pid, mut status) in query.iter_mut(&mut self.world) {
            if *pid == id {
                status.active = false;
                break;
            }
        }
    }

    /// Remove a projectile entirely and release its identity slot for
    /// reuse by a future launch.
    pub fn discard(&mut self, id: ProjectileId) {
        if let Some(entity) = self.find_entity(id) {
            self.world.despawn(entity);
            self.world.resource_mut::<BackendRouter>().release(id.0);
        }
    }

    /// Snapshot a single projectile, if it exists.
    pub fn projectile(&mut self, id: ProjectileId) -> Option<crate::world::ProjectileSnapshot> {
        let tick = self.current_tick();
        Snapshot::from_world(&mut self.world, tick, self.time)
            .projectiles
            .into_iter()
            .find(|p| p.id == id.0)
    }

    /// The ordered, throttled sample history of a projectile's flight.
    pub fn path(&mut self, id: ProjectileId) -> Option<Vec<PathSample>> {
        let entity = self.find_entity(id)?;
        self.world
            .get::<PathTrace>(entity)
            .map(|trace| trace.samples().to_vec())
    }

    /// The bounding box covering a projectile's recorded trajectory.
    pub fn bounds(&mut self, id: ProjectileId) -> Option<BoundsBox> {
        let entity = self.find_entity(id)?;
        self.world.get::<BoundsBox>(entity).copied()
    }

    /// Number of currently live projectile identities.
    pub fn live_count(&self) -> usize {
        self.world.resource::<BackendRouter>().live_count()
    }

    /// Start (or restart) a scored challenge.
    pub fn start_challenge(&mut self) -> ChallengeBrief {
        self.challenge.start()
    }

    /// End the scored session. Score handling on the next start follows
    /// the configured policy.
    pub fn stop_challenge(&mut self) {
        self.challenge.stop();
    }

    /// Evaluate the live target against a projectile's current state.
    pub fn check_collision(&mut self, id: ProjectileId) -> Option<CollisionOutcome> {
        let entity = self.find_entity(id)?;
        let pos = *self.world.get::<Position>(entity)?;
        let clock = *self.world.get::<FlightClock>(entity)?;
        Some(self.challenge.check_collision(pos.x, pos.y, clock.elapsed))
    }

    /// Award (or decline) points for a flight's outcome.
    pub fn update_score(&mut self, hit: bool) -> u32 {
        self.challenge.update_score(hit)
    }

    pub fn challenge(&self) -> &ChallengeEngine {
        &self.challenge
    }

    pub fn challenge_mut(&mut self) -> &mut ChallengeEngine {
        &mut self.challenge
    }

    /// Get the current sub-step tick number.
    pub fn current_tick(&self) -> u64 {
        self.world.resource::<SimTick>().0
    }

    /// Get the elapsed simulation time.
    pub fn current_time(&self) -> f64 {
        self.time
    }

    /// Get a snapshot of the current simulation state.
    pub fn snapshot(&mut self) -> Snapshot {
        let tick = self.current_tick();
        let mut snapshot = Snapshot::from_world(&mut self.world, tick, self.time);
        snapshot.challenge = ChallengeSnapshot::from_engine(&self.challenge);
        snapshot
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn find_entity(&mut self, id: ProjectileId) -> Option<Entity> {
        let mut query = self.world.query::<(Entity, &ProjectileId)>();
        query
            .iter(&self.world)
            .find(|(_, pid)| **pid == id)
            .map(|(entity, _)| entity)
    }

    fn backend_choice(&mut self, id: ProjectileId) -> Option<BackendChoice> {
        let entity = self.find_entity(id)?;
        self.world.get::<BackendChoice>(entity).copied()
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}
