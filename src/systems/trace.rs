//! Trace system - records throttled path samples, widens the bounding box,
//! and tracks per-flight summary statistics.

use crate::components::*;
use crate::path::{BoundsBox, PathSample, PathTrace};
use bevy_ecs::prelude::*;

/// System that appends a path sample when the flight clock crosses a
/// sample-interval boundary.
///
/// Runs after the integration system. Samples are recorded only while the
/// projectile is active and its position is finite; the bounding box is
/// widened only on append.
pub fn trace_system(
    mut query: Query<(
        &Position,
        &Velocity,
        &Acceleration,
        &FlightClock,
        &FlightStatus,
        &mut FlightStats,
        &mut PathTrace,
        &mut BoundsBox,
    )>,
) {
    for (pos, vel, accel, clock, status, mut stats, mut trace, mut bounds) in query.iter_mut() {
        if !status.active || !pos.is_finite() {
            continue;
        }

        if pos.y > stats.peak_height {
            stats.peak_height = pos.y;
        }

        if trace.should_record(clock.elapsed) {
            trace.record(PathSample {
                x: pos.x,
                y: pos.y,
                vx: vel.vx,
                vy: vel.vy,
                ax: accel.ax,
                ay: accel.ay,
                time: clock.elapsed,
            });
            bounds.include(pos.x, pos.y);
        }
    }
}
