//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - gravitational constant and softening floor (`g`, `softening`),
//! - optional linear drag,
//! - fixed step size and integration scheme,
//! - minimum initial separation accepted by `initialize`

use crate::error::ConfigError;
use crate::simulation::integrator::IntegratorKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub g: f64, // gravitational constant
    pub softening: f64, // floor on squared separation
    pub drag: f64, // linear drag coefficient, 0 = off
    pub dt: f64, // fixed tick length the host should step with
    pub integrator: IntegratorKind, // euler, verlet or rk4
    pub min_separation: f64, // minimum centre distance in a scenario
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            g: 1000.0,
            softening: 1.0,
            drag: 0.0,
            dt: 1.0 / 120.0,
            integrator: IntegratorKind::SemiImplicitEuler,
            min_separation: 50.0,
        }
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value >= 0.0) || !value.is_finite() {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be finite and >= 0, got {value}"),
        });
    }
    Ok(())
}

impl Parameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.g > 0.0) || !self.g.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "parameters.G",
                reason: format!("must be positive, got {}", self.g),
            });
        }
        if !(self.dt > 0.0) || !self.dt.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "engine.dt",
                reason: format!("must be positive, got {}", self.dt),
            });
        }
        non_negative("parameters.softening", self.softening)?;
        non_negative("parameters.drag", self.drag)?;
        non_negative("parameters.min_separation", self.min_separation)
    }
}
