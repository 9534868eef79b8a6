//! Configuration types for loading simulations from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation. A configuration consists of:
//!
//! - [`EngineConfig`]     – integration scheme and fixed step size
//! - [`ParametersConfig`] – physical constants and scenario constraints
//! - [`DomainConfig`]     – simulation rectangle, leaving it resets the run
//! - [`TrailConfig`]      – trail caps and fade shaping
//! - [`GeneratorConfig`]  – fixed vs. seeded random scenarios
//! - [`BodyConfig`]       – initial state for each body (fixed mode)
//! - [`SimulationConfig`] – top-level wrapper loaded from YAML
//!
//! Every section falls back to the built-in three-body setup, so a file only
//! needs to name what it changes.
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   integrator: "rk4"       # "euler" (default), "verlet" or "rk4"
//!   dt: 0.008333            # fixed step, seconds
//!
//! parameters:
//!   G: 1000.0               # gravitational constant
//!   softening: 1.0          # floor on squared separation
//!   drag: 0.0               # linear drag, 0 = off
//!   min_separation: 50.0    # minimum initial centre distance
//!   min_radius: 5.0         # minimum generated radius
//!
//! domain:
//!   min: [ -400.0, -300.0 ]
//!   max: [  400.0,  300.0 ]
//!
//! trail:
//!   max_age: 30.0           # seconds, omit or null for no age cap
//!   max_count: 200          # entries, omit or null for no count cap
//!   fade_exponent: 0.5
//!
//! generator:
//!   mode: "random"          # "fixed" uses `bodies` below
//!   seed: 42
//!   count: 3
//!   reseed_on_reset: false
//!   mass: [ 50.0, 150.0 ]
//!   radius: [ 8.0, 12.0 ]
//!   max_speed: 20.0
//!
//! bodies:
//!   - x: [ -150.0, 0.0 ]
//!     v: [ 0.0, 15.0 ]
//!     m: 100.0
//!     radius: 10.0
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, SimResult};
use crate::simulation::boundary::Domain;
use crate::simulation::engine::{SimSettings, Simulation};
use crate::simulation::integrator::IntegratorKind;
use crate::simulation::params::Parameters;
use crate::simulation::scenario::{RandomRanges, Scenario, ScenarioGenerator};
use crate::simulation::states::{palette_color, Body};
use crate::simulation::trail::TrailSettings;
use crate::simulation::vector::vec2;

/// Integration settings
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub integrator: IntegratorKind, // Time integrator used for advancing the system state
    pub dt: f64, // Fixed tick length in seconds
}

impl Default for EngineConfig {
    fn default() -> Self {
        let p = Parameters::default();
        Self {
            integrator: p.integrator,
            dt: p.dt,
        }
    }
}

/// Physical constants and scenario constraints
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParametersConfig {
    #[serde(rename = "G")]
    pub g: f64, // gravitational constant
    pub softening: f64, // floor on r^2 in the force law
    pub drag: f64, // linear drag coefficient
    pub min_separation: f64, // minimum initial distance between body centres
    pub min_radius: f64, // smallest radius the generator may produce
}

impl Default for ParametersConfig {
    fn default() -> Self {
        let p = Parameters::default();
        Self {
            g: p.g,
            softening: p.softening,
            drag: p.drag,
            min_separation: p.min_separation,
            min_radius: 5.0,
        }
    }
}

/// Simulation rectangle
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DomainConfig {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Default for DomainConfig {
    fn default() -> Self {
        let d = Domain::default();
        Self {
            min: [d.min.x, d.min.y],
            max: [d.max.x, d.max.y],
        }
    }
}

/// Trail caps and fade shaping
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TrailConfig {
    pub max_age: Option<f64>, // seconds of simulation time
    pub max_count: Option<usize>, // entries per body
    pub fade_exponent: f64, // < 1 gives a softer falloff
}

impl Default for TrailConfig {
    fn default() -> Self {
        let t = TrailSettings::default();
        Self {
            max_age: t.max_age,
            max_count: t.max_count,
            fade_exponent: t.fade_exponent,
        }
    }
}

/// Which kind of scenario the generator produces
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeneratorModeConfig {
    #[default]
    #[serde(rename = "fixed")] // hand-authored `bodies`
    Fixed,

    #[serde(rename = "random")] // seeded rejection sampling inside the domain
    Random,
}

/// Scenario generator settings
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GeneratorConfig {
    pub mode: GeneratorModeConfig,
    pub seed: u64, // deterministic seed to make runs reproducible
    pub count: usize, // bodies per random scenario
    pub reseed_on_reset: bool, // k-th reset uses seed + k
    pub mass: [f64; 2], // random mass range
    pub radius: [f64; 2], // random radius range
    pub max_speed: f64, // per-axis velocity bound
    pub zero_momentum: bool, // remove centre-of-mass drift
    pub max_attempts: usize, // placement attempts per body
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let r = RandomRanges::default();
        Self {
            mode: GeneratorModeConfig::Fixed,
            seed: 42,
            count: r.count,
            reseed_on_reset: false,
            mass: [r.mass.0, r.mass.1],
            radius: [r.radius.0, r.radius.1],
            max_speed: r.max_speed,
            zero_momentum: r.zero_momentum,
            max_attempts: 1000,
        }
    }
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: [f64; 2], // Initial position
    pub v: [f64; 2], // Initial velocity
    pub m: f64, // Mass of the body
    pub radius: f64, // Radius, used for collision detection and drawing
    #[serde(default)]
    pub color: Option<[f32; 4]>, // rgba, palette colour when omitted
}

/// Top-level configuration loaded from YAML
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub domain: DomainConfig,
    pub trail: TrailConfig,
    pub generator: GeneratorConfig,
    pub bodies: Vec<BodyConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let bodies = Scenario::three_body()
            .bodies
            .iter()
            .map(|b| BodyConfig {
                x: [b.x.x, b.x.y],
                v: [b.v.x, b.v.y],
                m: b.m,
                radius: b.radius,
                color: Some(b.color),
            })
            .collect();

        Self {
            engine: EngineConfig::default(),
            parameters: ParametersConfig::default(),
            domain: DomainConfig::default(),
            trail: TrailConfig::default(),
            generator: GeneratorConfig::default(),
            bodies,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue { field, reason: reason.into() }
}

impl SimulationConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Check ranges that serde cannot express
    ///
    /// Runtime pieces are checked by their own `validate`, the same gate
    /// `Simulation::new` applies.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.runtime_parameters().validate()?;
        self.runtime_domain().validate()?;
        self.runtime_trail().validate()?;

        let min_radius = self.parameters.min_radius;
        if !(min_radius >= 0.0) || !min_radius.is_finite() {
            return Err(invalid("parameters.min_radius", format!("must be finite and >= 0, got {min_radius}")));
        }

        let g = &self.generator;
        match g.mode {
            GeneratorModeConfig::Fixed => {
                if self.bodies.len() < 2 {
                    return Err(invalid("bodies", "fixed mode needs at least 2 bodies"));
                }
            }
            GeneratorModeConfig::Random => {
                if g.max_attempts == 0 {
                    return Err(invalid("generator.max_attempts", "must be at least 1"));
                }
                self.random_ranges().validate(min_radius)?;
            }
        }

        Ok(())
    }

    /// Fixed-mode scenario from `bodies`
    pub fn scenario(&self) -> SimResult<Scenario> {
        let bodies = self
            .bodies
            .iter()
            .enumerate()
            .map(|(i, bc)| {
                Body::new(bc.m, vec2(bc.x), vec2(bc.v), bc.radius)
                    .map(|b| b.with_color(bc.color.unwrap_or_else(|| palette_color(i))))
            })
            .collect::<SimResult<Vec<Body>>>()?;
        Ok(Scenario::new(bodies))
    }

    fn runtime_parameters(&self) -> Parameters {
        Parameters {
            g: self.parameters.g,
            softening: self.parameters.softening,
            drag: self.parameters.drag,
            dt: self.engine.dt,
            integrator: self.engine.integrator,
            min_separation: self.parameters.min_separation,
        }
    }

    fn runtime_domain(&self) -> Domain {
        Domain::new(vec2(self.domain.min), vec2(self.domain.max))
    }

    fn runtime_trail(&self) -> TrailSettings {
        TrailSettings {
            max_age: self.trail.max_age,
            max_count: self.trail.max_count,
            fade_exponent: self.trail.fade_exponent,
        }
    }

    fn random_ranges(&self) -> RandomRanges {
        let g = &self.generator;
        RandomRanges {
            count: g.count,
            mass: (g.mass[0], g.mass[1]),
            radius: (g.radius[0], g.radius[1]),
            max_speed: g.max_speed,
            zero_momentum: g.zero_momentum,
        }
    }

    /// Map into runtime settings
    pub fn settings(&self) -> SimResult<SimSettings> {
        self.validate()?;

        let parameters = self.runtime_parameters();
        let domain = self.runtime_domain();

        let g = &self.generator;
        let mut generator = match g.mode {
            GeneratorModeConfig::Fixed => {
                ScenarioGenerator::fixed(self.scenario()?, domain, parameters.min_separation)
            }
            GeneratorModeConfig::Random => {
                ScenarioGenerator::random(self.random_ranges(), g.seed, domain, parameters.min_separation)
            }
        };
        generator.seed = g.seed;
        generator.min_radius = self.parameters.min_radius;
        generator.max_attempts = g.max_attempts;

        Ok(SimSettings {
            parameters,
            domain,
            trail: self.runtime_trail(),
            generator,
            reseed_on_reset: g.reseed_on_reset,
        })
    }

    /// Validate, map and initialise a `Simulation`
    pub fn build(&self) -> SimResult<Simulation> {
        Simulation::new(self.settings()?)
    }
}
