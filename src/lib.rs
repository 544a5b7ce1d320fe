//! Ballistics Sim - Simulation Core
//!
//! A step-driven ECS simulation of 2D projectile flight with gravity,
//! quadratic drag, and steerable thrust. Uses `bevy_ecs` for the
//! entity-component-system architecture.
//!
//! Physics runs on an abstract integration backend: a pure-Rust reference
//! integrator is always available, and a host-provided accelerated module
//! can be installed at runtime. Any numerical divergence in the accelerated
//! path falls back to the reference integrator mid-flight without losing
//! the projectile.

pub mod api;
pub mod backend;
pub mod challenge;
pub mod components;
pub mod path;
pub mod systems;
pub mod world;

pub use api::SimWorld;
pub use backend::{
    AcceleratedModule, BackendRouter, IntegrationBackend, LaunchError, LaunchParams, ModuleState,
    RawEntryPoints, ReferenceBackend, StepReading, MAX_PROJECTILES,
};
pub use challenge::{
    ChallengeBrief, ChallengeConfig, ChallengeEngine, ChallengeType, CollisionOutcome, ModePolicy,
    ScorePolicy, Target,
};
pub use components::*;
pub use path::{BoundsBox, PathSample, PathTrace, SAMPLE_INTERVAL};
pub use systems::*;
pub use world::{ChallengeSnapshot, ProjectileSnapshot, Snapshot};
