//! ECS Systems for the ballistics simulation.
//!
//! Two chained systems run per sub-step:
//!
//! - `integration_system` - delegates each projectile's physics step to its
//!   selected backend, handles accelerated-to-reference fallback, and
//!   sanitizes readings into the entity's mirror components.
//! - `trace_system` - appends throttled path samples, widens bounding
//!   boxes, and updates flight statistics from the sanitized state.
//!
//! The schedule is strictly sequential: no projectile's update overlaps
//! another, and the backend router is never invoked concurrently for the
//! same identity.

pub mod integration;
pub mod trace;

pub use integration::{integration_system, DeltaTime, Environment, SimConfig, SimTick};
pub use trace::trace_system;
