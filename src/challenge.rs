//! Challenge engine - target placement, scoring, and collision evaluation.
//!
//! A small state machine that consumes simulation output: `Inactive` until
//! a challenge starts, then `Active` with exactly one live target that is
//! respawned on every hit until the caller stops the session. No operation
//! here can fail; all inputs are pre-validated numeric state.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Flights shorter than this cannot count as grounded, so a launch that
/// starts at or below ground level is not terminated on its first tick.
pub const GROUND_DEBOUNCE: f64 = 0.1;

/// How far below a raised target's altitude a projectile may drop before
/// the flight counts as over.
pub const GROUND_DROP_MARGIN: f64 = 5.0;

/// Kind of challenge currently running. Affects spawn ranges and scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeType {
    /// Ground-level target, 3 m wide.
    Normal,
    /// Raised target, 4 m wide.
    HighAltitude,
    /// Ground-level target, 1.5 m wide, double points.
    Precision,
}

impl ChallengeType {
    pub fn label(&self) -> &'static str {
        match self {
            ChallengeType::Normal => "normal",
            ChallengeType::HighAltitude => "high_altitude",
            ChallengeType::Precision => "precision",
        }
    }

    /// Points awarded for hitting this kind of target.
    pub fn points(&self) -> u32 {
        match self {
            ChallengeType::Precision => 20,
            _ => 10,
        }
    }
}

/// Whether the score survives from one challenge to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorePolicy {
    /// The running score accumulates across challenges.
    CarryOver,
    /// Each `start` wipes the score back to zero.
    ResetEachChallenge,
}

/// Which challenge types `start` may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModePolicy {
    /// Always the normal ground-level target.
    NormalOnly,
    /// Uniformly random among all challenge types.
    RandomAll,
}

/// Tunable challenge policies. Both observed presentation variants are
/// expressible: the classic configuration carries score over and draws from
/// all three types over 30-120 m; a simpler one resets score, stays normal,
/// and uses a narrower band.
#[derive(Debug, Clone)]
pub struct ChallengeConfig {
    pub score_policy: ScorePolicy,
    pub mode_policy: ModePolicy,
    /// Target distance band in meters, half-open.
    pub distance_min: u32,
    pub distance_max: u32,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            score_policy: ScorePolicy::CarryOver,
            mode_policy: ModePolicy::RandomAll,
            distance_min: 30,
            distance_max: 120,
        }
    }
}

/// The live target: a point at (distance, altitude) with a tolerance band.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Target {
    /// Meters along the ground axis.
    pub distance: f64,
    /// Zero for ground-level targets.
    pub altitude: f64,
    /// Collision tolerance band; a hit is within `width / 2` of the center.
    pub width: f64,
}

/// What a caller gets back when a challenge starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeBrief {
    pub target_distance: f64,
    pub target_altitude: f64,
    pub score: u32,
    pub description: String,
}

/// Independent hit and flight-end verdicts for one projectile reading.
///
/// A hit does not imply the flight is over and vice versa; callers decide
/// how to combine them (typically scoring a hit once the flight ends).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionOutcome {
    pub hit: bool,
    pub ground: bool,
}

/// Owns target and score state for one scored session.
#[derive(Debug)]
pub struct ChallengeEngine {
    config: ChallengeConfig,
    rng: StdRng,
    challenge_type: ChallengeType,
    target: Target,
    score: u32,
    active: bool,
}

impl Default for ChallengeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeEngine {
    pub fn new() -> Self {
        Self::with_config(ChallengeConfig::default())
    }

    pub fn with_config(config: ChallengeConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
            challenge_type: ChallengeType::Normal,
            target: Target::default(),
            score: 0,
            active: false,
        }
    }

    /// Deterministic target sequence for tests and replays.
    pub fn with_seed(config: ChallengeConfig, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::with_config(config)
        }
    }

    /// Transition to `Active`: pick a challenge type per policy, spawn a
    /// target, and report the setup. The score reset policy applies only
    /// here, never on the hit-respawn path.
    pub fn start(&mut self) -> ChallengeBrief {
        self.active = true;
        if self.config.score_policy == ScorePolicy::ResetEachChallenge {
            self.score = 0;
        }

        self.pick_type();
        self.spawn_target();

        ChallengeBrief {
            target_distance: self.target.distance,
            target_altitude: self.target.altitude,
            score: self.score,
            description: self.description(),
        }
    }

    /// Select the next challenge type per the configured mode policy.
    fn pick_type(&mut self) {
        self.challenge_type = match self.config.mode_policy {
            ModePolicy::NormalOnly => ChallengeType::Normal,
            ModePolicy::RandomAll => {
                const TYPES: [ChallengeType; 3] = [
                    ChallengeType::Normal,
                    ChallengeType::HighAltitude,
                    ChallengeType::Precision,
                ];
                TYPES[self.rng.gen_range(0..TYPES.len())]
            }
        };
    }

    /// Place a fresh target for the current challenge type.
    pub fn spawn_target(&mut self) {
        let distance = self
            .rng
            .gen_range(self.config.distance_min..self.config.distance_max);
        self.target.distance = distance as f64;

        match self.challenge_type {
            ChallengeType::HighAltitude => {
                self.target.altitude = self.rng.gen_range(10..25) as f64;
                self.target.width = 4.0;
            }
            ChallengeType::Precision => {
                self.target.altitude = 0.0;
                self.target.width = 1.5;
            }
            ChallengeType::Normal => {
                self.target.altitude = 0.0;
                self.target.width = 3.0;
            }
        }
    }

    /// Pin the target to exact coordinates, keeping the current type.
    /// Deterministic placement for tests and scripted presentations.
    pub fn place_target(&mut self, distance: f64, altitude: f64, width: f64) {
        self.target = Target {
            distance,
            altitude,
            width,
        };
    }

    /// Human-readable description of the current challenge.
    pub fn description(&self) -> String {
        match self.challenge_type {
            ChallengeType::HighAltitude => format!(
                "Intercept the target at {}m altitude!",
                self.target.altitude
            ),
            ChallengeType::Precision => format!(
                "Precision Strike! Hit the tiny {}m target at {}m.",
                self.target.width, self.target.distance
            ),
            ChallengeType::Normal => format!("Hit the target at {}m.", self.target.distance),
        }
    }

    /// Evaluate a projectile reading against the live target.
    ///
    /// `hit` is a plain Euclidean check against the target's tolerance
    /// band. `ground` is evaluated independently: at/below ground level
    /// after the debounce window, or dropped more than the margin below a
    /// raised target's altitude.
    pub fn check_collision(&self, x: f64, y: f64, elapsed: f64) -> CollisionOutcome {
        let dx = x - self.target.distance;
        let dy = y - self.target.altitude;
        let dist_to_target = (dx * dx + dy * dy).sqrt();

        let hit = dist_to_target <= self.target.width / 2.0;
        let ground =
            (y <= 0.0 && elapsed > GROUND_DEBOUNCE) || y < self.target.altitude - GROUND_DROP_MARGIN;

        CollisionOutcome { hit, ground }
    }

    /// Award points for a hit and, while the session is active, respawn a
    /// fresh target immediately so play continues. A miss changes nothing.
    ///
    /// The respawn re-picks a type and target directly; the score reset
    /// policy belongs to caller-initiated starts and the points just earned
    /// always survive.
    pub fn update_score(&mut self, hit: bool) -> u32 {
        if hit {
            self.score += self.challenge_type.points();
            if self.active {
                self.pick_type();
                self.spawn_target();
            }
        }
        self.score
    }

    /// Tear down the session. Target values simply stop mattering; they are
    /// respawned by the next `start`.
    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn challenge_type(&self) -> ChallengeType {
        self.challenge_type
    }
}
