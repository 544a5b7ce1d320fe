//! Trajectory history and bounds bookkeeping.
//!
//! `PathTrace` keeps a throttled, append-only record of a projectile's
//! flight for plotting; `BoundsBox` incrementally widens to cover every
//! recorded point so a camera can frame the whole trajectory.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Simulated-time spacing between recorded path samples, in seconds.
///
/// Sampling is throttled to one sample per interval boundary crossing,
/// never more than once per step, to bound memory while keeping enough
/// resolution for plotting.
pub const SAMPLE_INTERVAL: f64 = 0.05;

/// One recorded point of a trajectory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PathSample {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub ax: f64,
    pub ay: f64,
    /// Elapsed flight time when the sample was taken.
    pub time: f64,
}

/// Append-only, time-ordered history of a projectile's recorded samples.
///
/// Samples are appended only immediately after a successful, sane step and
/// are never edited retroactively. Sample times are monotonically
/// non-decreasing.
#[derive(Component, Debug, Clone, Default)]
pub struct PathTrace {
    samples: Vec<PathSample>,
    /// Index of the last sample interval boundary that was recorded.
    last_bucket: u64,
}

impl PathTrace {
    /// Start a trace with the launch point as its first sample.
    pub fn seed(sample: PathSample) -> Self {
        Self {
            samples: vec![sample],
            last_bucket: 0,
        }
    }

    /// Whether the elapsed time has crossed into a new sample interval.
    pub fn should_record(&self, elapsed: f64) -> bool {
        bucket_of(elapsed) > self.last_bucket
    }

    /// Append a sample. Callers are expected to gate on
    /// [`PathTrace::should_record`] and on the sample being finite.
    pub fn record(&mut self, sample: PathSample) {
        debug_assert!(
            self.samples.last().map_or(true, |s| sample.time >= s.time),
            "path sample time went backwards"
        );
        self.last_bucket = bucket_of(sample.time);
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[PathSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[inline]
fn bucket_of(elapsed: f64) -> u64 {
    (elapsed / SAMPLE_INTERVAL).floor() as u64
}

/// Incrementally widened min/max of every recorded (x, y).
///
/// Updated only when a path sample is appended; never shrinks within an
/// entity's lifetime.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundsBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for BoundsBox {
    fn default() -> Self {
        Self::from_point(0.0, 0.0)
    }
}

impl BoundsBox {
    /// A degenerate box covering a single point.
    pub fn from_point(x: f64, y: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    /// Widen the box to cover (x, y).
    pub fn include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_at(time: f64, x: f64, y: f64) -> PathSample {
        PathSample {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            ax: 0.0,
            ay: 0.0,
            time,
        }
    }

    #[test]
    fn test_throttle_one_sample_per_interval() {
        let mut trace = PathTrace::seed(sample_at(0.0, 0.0, 0.0));

        // Sub-interval times do not trigger recording.
        assert!(!trace.should_record(0.01));
        assert!(!trace.should_record(0.049));

        // Crossing the first boundary does, exactly once.
        assert!(trace.should_record(0.051));
        trace.record(sample_at(0.051, 1.0, 1.0));
        assert!(!trace.should_record(0.052));
        assert!(!trace.should_record(0.09));

        // Next boundary.
        assert!(trace.should_record(0.101));
        trace.record(sample_at(0.101, 2.0, 2.0));

        assert_eq!(trace.len(), 3);
    }

    #[test]
    fn test_samples_are_time_ordered() {
        let mut trace = PathTrace::seed(sample_at(0.0, 0.0, 0.0));
        for i in 1..20 {
            let t = i as f64 * 0.06;
            if trace.should_record(t) {
                trace.record(sample_at(t, t, t));
            }
        }
        let times: Vec<f64> = trace.samples().iter().map(|s| s.time).collect();
        for pair in times.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn test_bounds_only_widen() {
        let mut bounds = BoundsBox::from_point(0.0, 0.0);
        bounds.include(10.0, 5.0);
        assert_eq!(bounds.max_x, 10.0);
        assert_eq!(bounds.max_y, 5.0);

        // A point inside the box changes nothing.
        bounds.include(3.0, 2.0);
        assert_eq!(bounds.min_x, 0.0);
        assert_eq!(bounds.max_x, 10.0);

        // Negative excursions widen the minimum side only.
        bounds.include(-4.0, -1.0);
        assert_eq!(bounds.min_x, -4.0);
        assert_eq!(bounds.min_y, -1.0);
        assert_eq!(bounds.max_x, 10.0);
        assert_eq!(bounds.max_y, 5.0);
    }
}
