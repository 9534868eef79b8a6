//! Simulation driver
//!
//! Owns the body set and one trail per body. Each `step` runs
//! force -> integrate -> monitor -> reset-if-needed -> trail update to
//! completion. The integrator works on a copy of the state; the live state
//! is only replaced once the step is known to be good, or swapped wholesale
//! for a freshly generated scenario when it is not.
//!
//! The renderer never sees live state, only the owned `Snapshot` returned
//! by [`Simulation::snapshot`].

use tracing::{debug, info, warn};

use crate::error::{ConfigError, SimError, SimResult};
use crate::simulation::boundary::{BoundaryMonitor, BoundaryState, Domain};
use crate::simulation::forces::{AccelSet, LinearDrag, NewtonianGravity};
use crate::simulation::params::Parameters;
use crate::simulation::scenario::{Scenario, ScenarioGenerator};
use crate::simulation::states::System;
use crate::simulation::trail::{TrailBuffer, TrailPoint, TrailSettings};
use crate::simulation::vector::NVec2;

/// Everything a `Simulation` is built from; immutable afterwards
#[derive(Debug, Clone)]
pub struct SimSettings {
    pub parameters: Parameters,
    pub domain: Domain,
    pub trail: TrailSettings,
    pub generator: ScenarioGenerator,
    pub reseed_on_reset: bool,
}

impl SimSettings {
    /// Shared gate for the YAML path and direct construction
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parameters.validate()?;
        self.domain.validate()?;
        self.trail.validate()?;
        self.generator.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    Running,
    Resetting, // only observed inside a step
}

/// Outcome of one `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    pub state: BoundaryState,
    pub did_reset: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    pub ticks: u64,
    pub resets: u64, // all resets, automatic and requested
    pub collisions: u64,
    pub escapes: u64,
    pub requested: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyView {
    pub position: NVec2,
    pub radius: f64,
    pub color: [f32; 4],
}

/// Read-only per-frame copy of bodies and trails
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub t: f64,
    pub bodies: Vec<BodyView>,
    pub trails: Vec<Vec<TrailPoint>>,
}

pub struct Simulation {
    parameters: Parameters,
    forces: AccelSet,
    monitor: BoundaryMonitor,
    generator: ScenarioGenerator,
    trail_settings: TrailSettings,
    reseed_on_reset: bool,

    // scenario produced from the base seed, fallback for failed re-seeds
    base_scenario: Scenario,

    system: System,
    trails: Vec<TrailBuffer>,
    state: SimState,
    stats: SimStats,
}

impl Simulation {
    /// Build a simulation and initialise it from the generator's base seed
    pub fn new(settings: SimSettings) -> SimResult<Self> {
        settings.validate()?;
        let SimSettings { parameters, domain, trail, generator, reseed_on_reset } = settings;

        let base_scenario = generator.generate()?;

        let mut forces = AccelSet::new().with(NewtonianGravity {
            g: parameters.g,
            softening: parameters.softening,
        });
        if parameters.drag > 0.0 {
            forces = forces.with(LinearDrag { k: parameters.drag });
        }

        let mut sim = Self {
            parameters,
            forces,
            monitor: BoundaryMonitor::new(domain),
            generator,
            trail_settings: trail,
            reseed_on_reset,
            system: System::new(Vec::new()),
            trails: Vec::new(),
            state: SimState::Running,
            stats: SimStats::default(),
            base_scenario: base_scenario.clone(),
        };
        sim.initialize(base_scenario)?;

        info!(
            bodies = sim.system.len(),
            integrator = sim.parameters.integrator.name(),
            dt = sim.parameters.dt,
            "simulation initialised"
        );

        Ok(sim)
    }

    /// Replace the whole state with `scenario`
    ///
    /// On error nothing is changed.
    pub fn initialize(&mut self, scenario: Scenario) -> SimResult<()> {
        scenario.validate(self.parameters.min_separation)?;
        self.install(&scenario);
        Ok(())
    }

    /// Advance exactly one tick of `dt`
    pub fn step(&mut self, dt: f64) -> SimResult<StepResult> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(SimError::InvalidTimestep(dt));
        }

        let mut next = self.system.clone();
        self.parameters.integrator.step(&mut next, &self.forces, dt);
        self.stats.ticks += 1;

        // NaN positions fail the domain test and land here as escapes
        let state = self.monitor.classify(&next);
        match state {
            BoundaryState::Stable => {}
            BoundaryState::Collided(i, j) => {
                self.stats.collisions += 1;
                debug!(i, j, t = next.t, "collision, resetting");
                self.reset_from_generator();
                return Ok(StepResult { state, did_reset: true });
            }
            BoundaryState::Escaped(i) => {
                self.stats.escapes += 1;
                debug!(i, t = next.t, "escape, resetting");
                self.reset_from_generator();
                return Ok(StepResult { state, did_reset: true });
            }
        }

        self.system = next;

        let now = self.system.t;
        for (trail, body) in self.trails.iter_mut().zip(self.system.bodies.iter()) {
            trail.record(body.x, now);
            trail.prune(now);
        }

        Ok(StepResult { state, did_reset: false })
    }

    /// Host-requested reset; same path as a collision or escape
    pub fn reset(&mut self) {
        self.stats.requested += 1;
        debug!("reset requested");
        self.reset_from_generator();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            t: self.system.t,
            bodies: self
                .system
                .bodies
                .iter()
                .map(|b| BodyView {
                    position: b.x,
                    radius: b.radius,
                    color: b.color,
                })
                .collect(),
            trails: self.trails.iter().map(TrailBuffer::snapshot).collect(),
        }
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn trails(&self) -> &[TrailBuffer] {
        &self.trails
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn domain(&self) -> &Domain {
        &self.monitor.domain
    }

    pub fn generator(&self) -> &ScenarioGenerator {
        &self.generator
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    fn reset_from_generator(&mut self) {
        self.state = SimState::Resetting;
        self.stats.resets += 1;

        // k-th reset of any kind draws seed + k
        let scenario = if self.reseed_on_reset && self.generator.is_random() {
            let seed = self.generator.seed.wrapping_add(self.stats.resets);
            match self.generator.generate_with_seed(seed) {
                Ok(scenario) => scenario,
                Err(err) => {
                    warn!(seed, %err, "re-seeded scenario rejected, using base scenario");
                    self.base_scenario.clone()
                }
            }
        } else {
            self.base_scenario.clone()
        };

        self.install(&scenario);
    }

    // new system and trails are built first, then swapped in together
    fn install(&mut self, scenario: &Scenario) {
        let system = scenario.to_system();
        let trails = vec![TrailBuffer::new(self.trail_settings); system.len()];

        self.system = system;
        self.trails = trails;
        self.state = SimState::Running;
    }
}
