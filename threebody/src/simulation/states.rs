//! Core state types for the simulation
//!
//! - `Body`   a point mass with position, velocity, display radius and colour
//! - `System` the live body set plus the simulation clock `t`
//!
//! The clock is the sum of all step sizes since the last (re)initialisation
//! and is what trail ages are measured against.

use crate::error::{SimError, SimResult};
use crate::simulation::vector::NVec2;

/// Default colours cycled through by index (red, green, blue, then extras)
pub const PALETTE: [[f32; 4]; 6] = [
    [1.0, 0.2, 0.2, 1.0],
    [0.0, 1.0, 0.2, 1.0],
    [0.2, 0.2, 1.0, 1.0],
    [1.0, 1.0, 0.3, 1.0],
    [0.2, 1.0, 1.0, 1.0],
    [1.0, 0.5, 0.2, 1.0],
];

pub fn palette_color(i: usize) -> [f32; 4] {
    PALETTE[i % PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub m: f64, // mass, strictly positive
    pub radius: f64, // display / collision radius
    pub color: [f32; 4], // rgba, only read by the renderer
}

impl Body {
    /// Construct a body, rejecting non-positive mass, negative radius and
    /// non-finite kinematics
    pub fn new(m: f64, x: NVec2, v: NVec2, radius: f64) -> SimResult<Self> {
        if !(m > 0.0) || !m.is_finite() {
            return Err(SimError::InvalidBody(format!("mass must be positive, got {m}")));
        }
        if !(radius >= 0.0) || !radius.is_finite() {
            return Err(SimError::InvalidBody(format!("radius must be >= 0, got {radius}")));
        }
        if !(x.iter().all(|c| c.is_finite()) && v.iter().all(|c| c.is_finite())) {
            return Err(SimError::InvalidBody("position and velocity must be finite".into()));
        }

        Ok(Self {
            x,
            v,
            m,
            radius,
            color: [1.0, 1.0, 1.0, 1.0],
        })
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn momentum(&self) -> NVec2 {
        self.m * self.v
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct System {
    pub bodies: Vec<Body>, // live body set
    pub t: f64, // simulation clock
}

impl System {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies, t: 0.0 }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Copy of the positions, in body order
    pub fn positions(&self) -> Vec<NVec2> {
        self.bodies.iter().map(|b| b.x).collect()
    }
}
