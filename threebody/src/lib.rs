pub mod error;
pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;

pub use error::{ConfigError, SimError, SimResult};

pub use simulation::vector::{vec2, NVec2, VectorExt};
pub use simulation::states::{Body, System};
pub use simulation::trail::{TrailBuffer, TrailPoint, TrailSettings};
pub use simulation::forces::{AccelSet, Acceleration, LinearDrag, NewtonianGravity};
pub use simulation::integrator::{euler_integrator, rk4_integrator, verlet_integrator, IntegratorKind};
pub use simulation::boundary::{BoundaryMonitor, BoundaryState, Domain};
pub use simulation::scenario::{GeneratorMode, RandomRanges, Scenario, ScenarioGenerator};
pub use simulation::params::Parameters;
pub use simulation::engine::{BodyView, SimSettings, SimState, SimStats, Simulation, Snapshot, StepResult};

pub use configuration::config::{
    BodyConfig, DomainConfig, EngineConfig, GeneratorConfig, GeneratorModeConfig, ParametersConfig,
    SimulationConfig, TrailConfig,
};

#[cfg(feature = "viewer")]
pub use visualization::vis2d::run_2d;

pub use benchmark::benchmark::{bench_gravity, bench_integrators};
