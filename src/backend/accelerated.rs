//! Accelerated integration backend.
//!
//! Wraps an externally supplied computation module (a SIMD kernel, a GPU
//! plugin, anything the host links in) behind an explicit capability
//! object. The module is addressed by identity slot and exposes its
//! functionality as named entry points; required entry points must all
//! resolve or the module is marked failed and the router sticks to the
//! reference backend.

use super::{IntegrationBackend, LaunchParams};

/// `init(slot, x, y, speed, angle_deg, thrust, fuel)`
pub type InitFn = fn(usize, f64, f64, f64, f64, f64, f64);
/// `step(slot, dt, gravity, air_resistance)`
pub type StepFn = fn(usize, f64, f64, bool);
/// Scalar getter addressed by slot.
pub type ReadFn = fn(usize) -> f64;
/// Boolean getter addressed by slot.
pub type FlagFn = fn(usize) -> bool;
/// Scalar setter addressed by slot.
pub type WriteFn = fn(usize, f64);

/// Lifecycle of the accelerated module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// No module was ever offered.
    NotLoaded,
    /// The host announced a module but its entry points are not resolved yet.
    Loading,
    /// All required entry points resolved; usable for new launches.
    Ready,
    /// Resolution failed (missing required entry points). Permanent.
    Failed,
}

/// Entry points as offered by the host, before resolution.
///
/// Everything is optional here; [`AcceleratedModule::install`] decides
/// whether the required subset is present.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawEntryPoints {
    pub init: Option<InitFn>,
    pub step: Option<StepFn>,
    pub position_x: Option<ReadFn>,
    pub position_y: Option<ReadFn>,
    pub velocity_x: Option<ReadFn>,
    pub velocity_y: Option<ReadFn>,
    pub acceleration_x: Option<ReadFn>,
    pub acceleration_y: Option<ReadFn>,
    pub elapsed: Option<ReadFn>,
    pub fuel: Option<ReadFn>,
    /// Heading getter, radians.
    pub heading: Option<ReadFn>,
    pub active: Option<FlagFn>,
    /// Heading setter, radians.
    pub set_heading: Option<WriteFn>,
    pub set_thrust: Option<WriteFn>,
}

/// Resolved entry-point table. Required entries are plain function
/// pointers; optional capabilities stay optional.
#[derive(Debug, Clone, Copy)]
struct EntryPointTable {
    init: InitFn,
    step: StepFn,
    position_x: ReadFn,
    position_y: ReadFn,
    velocity_x: ReadFn,
    velocity_y: ReadFn,
    acceleration_x: Option<ReadFn>,
    acceleration_y: Option<ReadFn>,
    elapsed: Option<ReadFn>,
    fuel: Option<ReadFn>,
    heading: Option<ReadFn>,
    active: Option<FlagFn>,
    set_heading: Option<WriteFn>,
    set_thrust: Option<WriteFn>,
}

/// The external accelerated computation module as a capability object.
///
/// Never ambient: the router owns one instance and consults its state at
/// every launch. A module that is absent or failed simply routes every
/// launch to the reference backend.
#[derive(Debug)]
pub struct AcceleratedModule {
    state: ModuleState,
    table: Option<EntryPointTable>,
}

impl Default for AcceleratedModule {
    fn default() -> Self {
        Self::not_loaded()
    }
}

impl AcceleratedModule {
    /// No module present.
    pub fn not_loaded() -> Self {
        Self {
            state: ModuleState::NotLoaded,
            table: None,
        }
    }

    /// A module was announced but not yet resolved.
    pub fn loading() -> Self {
        Self {
            state: ModuleState::Loading,
            table: None,
        }
    }

    /// Resolve the host-offered entry points.
    ///
    /// The module becomes `Ready` only if every required entry point (init,
    /// step, and the position/velocity getters) resolved; otherwise it is
    /// marked `Failed` and the event is logged. Optional getters and
    /// setters may be absent without penalty.
    pub fn install(raw: RawEntryPoints) -> Self {
        let mut missing: Vec<&str> = Vec::new();
        if raw.init.is_none() {
            missing.push("init");
        }
        if raw.step.is_none() {
            missing.push("step");
        }
        if raw.position_x.is_none() {
            missing.push("position_x");
        }
        if raw.position_y.is_none() {
            missing.push("position_y");
        }
        if raw.velocity_x.is_none() {
            missing.push("velocity_x");
        }
        if raw.velocity_y.is_none() {
            missing.push("velocity_y");
        }

        if !missing.is_empty() {
            log::warn!(
                "accelerated module rejected: missing required entry points {:?}",
                missing
            );
            return Self {
                state: ModuleState::Failed,
                table: None,
            };
        }

        log::info!("accelerated module installed and ready");
        Self {
            state: ModuleState::Ready,
            table: Some(EntryPointTable {
                init: raw.init.unwrap(),
                step: raw.step.unwrap(),
                position_x: raw.position_x.unwrap(),
                position_y: raw.position_y.unwrap(),
                velocity_x: raw.velocity_x.unwrap(),
                velocity_y: raw.velocity_y.unwrap(),
                acceleration_x: raw.acceleration_x,
                acceleration_y: raw.acceleration_y,
                elapsed: raw.elapsed,
                fuel: raw.fuel,
                heading: raw.heading,
                active: raw.active,
                set_heading: raw.set_heading,
                set_thrust: raw.set_thrust,
            }),
        }
    }

    pub fn state(&self) -> ModuleState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ModuleState::Ready
    }
}

impl IntegrationBackend for AcceleratedModule {
    fn init(&mut self, slot: usize, params: &LaunchParams) {
        if let Some(table) = &self.table {
            (table.init)(
                slot,
                params.x,
                params.y,
                params.speed,
                params.angle_deg,
                params.thrust,
                params.fuel,
            );
        }
    }

    fn step(&mut self, slot: usize, dt: f64, gravity: f64, air_resistance: bool) {
        if let Some(table) = &self.table {
            (table.step)(slot, dt, gravity, air_resistance);
        }
    }

    fn position(&self, slot: usize) -> (f64, f64) {
        match &self.table {
            Some(table) => ((table.position_x)(slot), (table.position_y)(slot)),
            None => (0.0, 0.0),
        }
    }

    fn velocity(&self, slot: usize) -> (f64, f64) {
        match &self.table {
            Some(table) => ((table.velocity_x)(slot), (table.velocity_y)(slot)),
            None => (0.0, 0.0),
        }
    }

    fn acceleration(&self, slot: usize) -> Option<(f64, f64)> {
        let table = self.table.as_ref()?;
        Some(((table.acceleration_x?)(slot), (table.acceleration_y?)(slot)))
    }

    fn elapsed(&self, slot: usize) -> Option<f64> {
        self.table.as_ref()?.elapsed.map(|f| f(slot))
    }

    fn fuel(&self, slot: usize) -> Option<f64> {
        self.table.as_ref()?.fuel.map(|f| f(slot))
    }

    fn heading(&self, slot: usize) -> Option<f64> {
        self.table.as_ref()?.heading.map(|f| f(slot))
    }

    fn is_active(&self, slot: usize) -> Option<bool> {
        self.table.as_ref()?.active.map(|f| f(slot))
    }

    fn set_heading(&mut self, slot: usize, heading: f64) -> bool {
        match self.table.as_ref().and_then(|t| t.set_heading) {
            Some(f) => {
                f(slot, heading);
                true
            }
            None => false,
        }
    }

    fn set_thrust(&mut self, slot: usize, thrust: f64) -> bool {
        match self.table.as_ref().and_then(|t| t.set_thrust) {
            Some(f) => {
                f(slot, thrust);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_init(_: usize, _: f64, _: f64, _: f64, _: f64, _: f64, _: f64) {}
    fn noop_step(_: usize, _: f64, _: f64, _: bool) {}
    fn zero_read(_: usize) -> f64 {
        0.0
    }

    fn minimal_raw() -> RawEntryPoints {
        RawEntryPoints {
            init: Some(noop_init),
            step: Some(noop_step),
            position_x: Some(zero_read),
            position_y: Some(zero_read),
            velocity_x: Some(zero_read),
            velocity_y: Some(zero_read),
            ..Default::default()
        }
    }

    #[test]
    fn test_not_loaded_is_inert() {
        let module = AcceleratedModule::not_loaded();
        assert_eq!(module.state(), ModuleState::NotLoaded);
        assert!(!module.is_ready());
        assert_eq!(module.position(0), (0.0, 0.0));
        assert_eq!(module.elapsed(0), None);
    }

    #[test]
    fn test_install_with_all_required_is_ready() {
        let module = AcceleratedModule::install(minimal_raw());
        assert_eq!(module.state(), ModuleState::Ready);
        assert!(module.is_ready());
    }

    #[test]
    fn test_install_missing_required_fails() {
        let mut raw = minimal_raw();
        raw.step = None;
        let module = AcceleratedModule::install(raw);
        assert_eq!(module.state(), ModuleState::Failed);
        assert!(!module.is_ready());
    }

    #[test]
    fn test_optional_accessors_absent() {
        // A minimal module: required getters only. Optional readings come
        // back as None, steering reports unsupported.
        let mut module = AcceleratedModule::install(minimal_raw());
        assert_eq!(module.fuel(0), None);
        assert_eq!(module.heading(0), None);
        assert_eq!(module.is_active(0), None);
        assert_eq!(module.acceleration(0), None);
        assert!(!module.set_heading(0, 1.0));
        assert!(!module.set_thrust(0, 5.0));
    }

    #[test]
    fn test_reading_maps_missing_getters_to_none() {
        let module = AcceleratedModule::install(minimal_raw());
        let reading = module.read(0);
        assert_eq!(reading.ax, None);
        assert_eq!(reading.elapsed, None);
        assert_eq!(reading.fuel, None);
        assert!(reading.position_is_finite());
    }
}
