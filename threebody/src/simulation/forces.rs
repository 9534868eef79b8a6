//! Force / acceleration contributors
//!
//! Every term reads a frozen `&System` and writes into a separate output
//! buffer, so no body is ever updated while another is still being read.

use crate::simulation::states::System;
use crate::simulation::vector::{NVec2, VectorExt};

/// Collection of acceleration terms (gravity, drag, etc.)
/// Each term implements [`Acceleration`] and their contributions are summed
/// into a single acceleration vector per body
pub struct AccelSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl Default for AccelSet {
    fn default() -> Self {
        Self::new()
    }
}

impl AccelSet {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self {
            terms: Vec::new()
        }
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Compute total accelerations for all bodies in `sys`
    /// - `out[i]` will be set to the sum of contributions from all terms
    pub fn accumulate_accels(&self, sys: &System, out: &mut [NVec2]) {
        // Zero buffer
        for a in out.iter_mut() {
            *a = NVec2::zeros();
        }
        for term in &self.terms {
            term.acceleration(sys, out);
        }
    }

    /// Allocating convenience wrapper around [`AccelSet::accumulate_accels`]
    pub fn accels(&self, sys: &System) -> Vec<NVec2> {
        let mut out = vec![NVec2::zeros(); sys.len()];
        self.accumulate_accels(sys, &mut out);
        out
    }
}

/// Acceleration source operating on a [`System`]
/// Implementations add their contribution into `out[i]` for each body
pub trait Acceleration {
    fn acceleration(&self, sys: &System, out: &mut [NVec2]);
}

/// Pairwise inverse-square gravity with a softening floor
///
/// The squared separation used in the force law is never smaller than
/// `max(softening, (r_i + r_j)^2)`, so a pair at or inside contact distance
/// feels at most the contact-distance force. Coincident bodies exert no pull
/// on each other.
pub struct NewtonianGravity {
    pub g: f64, // gravitational constant
    pub softening: f64, // floor on r^2
}

impl NewtonianGravity {
    /// Effective squared distance for a pair after the softening floor
    pub fn softened_r2(&self, r2: f64, radius_i: f64, radius_j: f64) -> f64 {
        let contact = radius_i + radius_j;
        r2.max(self.softening).max(contact * contact)
    }
}

impl Acceleration for NewtonianGravity {
    fn acceleration(&self, sys: &System, out: &mut [NVec2]) {
        let n = sys.bodies.len();

        // Each unordered pair once; i and j get equal and opposite pulls
        for i in 0..n {
            let bi = &sys.bodies[i];

            for j in (i + 1)..n {
                let bj = &sys.bodies[j];

                // displacement from i to j
                let d = bj.x - bi.x;

                // coincident bodies have no direction to pull along
                let dir = d.normalize_or_zero();
                if dir == NVec2::zeros() {
                    continue;
                }

                let r2 = self.softened_r2(d.norm_squared(), bi.radius, bj.radius);

                // F = G m_i m_j / r^2, a_i = F / m_i, a_j = F / m_j
                let coef = self.g / r2;
                out[i] += coef * bj.m * dir;
                out[j] -= coef * bi.m * dir;
            }
        }
    }
}

/// Velocity-proportional drag, `a = -k v`
///
/// Not part of the default force set; some scenarios use it to damp runaway
/// bodies.
pub struct LinearDrag {
    pub k: f64,
}

impl Acceleration for LinearDrag {
    fn acceleration(&self, sys: &System, out: &mut [NVec2]) {
        for (a, b) in out.iter_mut().zip(sys.bodies.iter()) {
            *a -= self.k * b.v;
        }
    }
}
