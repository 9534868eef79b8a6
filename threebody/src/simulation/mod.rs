pub mod vector;
pub mod states;
pub mod params;
pub mod trail;
pub mod forces;
pub mod integrator;
pub mod boundary;
pub mod scenario;
pub mod diagnostics;
pub mod engine;
