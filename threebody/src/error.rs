//! Error types for the simulation core
//!
//! Only configuration-class problems are errors. Collisions and escapes are
//! ordinary step outcomes and are reported through `StepResult` instead.

use thiserror::Error;

/// Errors raised while building or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A numeric field is out of its allowed range
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    /// Domain rectangle is empty or inverted
    #[error("domain min {min:?} must be strictly below max {max:?} on both axes")]
    InvalidDomain { min: [f64; 2], max: [f64; 2] },

    /// Neither a max age nor a max count was configured for trails
    #[error("trail needs at least one of `max_age` or `max_count`")]
    UnboundedTrail,

    /// Random generator could not place bodies under the separation constraint
    #[error("could not place {count} bodies with min separation {min_separation} after {attempts} attempts")]
    Unsatisfiable { count: usize, min_separation: f64, attempts: usize },

    /// Scenario file could not be read
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),

    /// Scenario file is not valid YAML for the expected shape
    #[error("failed to parse scenario file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors returned by the simulation boundary operations
#[derive(Error, Debug)]
pub enum SimError {
    /// Scenario rejected by `initialize` (mass, radius or separation)
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    /// `step` called with a non-positive or non-finite dt
    #[error("invalid timestep {0}: dt must be positive and finite")]
    InvalidTimestep(f64),

    /// A body could not be constructed
    #[error("invalid body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type SimResult<T> = Result<T, SimError>;
