//! Collision and domain-escape detection
//!
//! Runs after every integration step. A collision or an escape both lead to
//! the same response (full reset); the variants only differ for logging.

use crate::error::ConfigError;
use crate::simulation::states::System;
use crate::simulation::vector::NVec2;

/// Axis-aligned simulation domain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub min: NVec2,
    pub max: NVec2,
}

impl Default for Domain {
    fn default() -> Self {
        Self {
            min: NVec2::new(-400.0, -300.0),
            max: NVec2::new(400.0, 300.0),
        }
    }
}

impl Domain {
    pub fn new(min: NVec2, max: NVec2) -> Self {
        Self { min, max }
    }

    /// Finite corners, strictly ordered on both axes
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = self.min.iter().chain(self.max.iter()).all(|c| c.is_finite());
        if !finite || !(self.min.x < self.max.x && self.min.y < self.max.y) {
            return Err(ConfigError::InvalidDomain {
                min: [self.min.x, self.min.y],
                max: [self.max.x, self.max.y],
            });
        }
        Ok(())
    }

    /// Inclusive on the edges
    pub fn contains(&self, p: &NVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn size(&self) -> NVec2 {
        self.max - self.min
    }

    pub fn center(&self) -> NVec2 {
        0.5 * (self.min + self.max)
    }
}

/// Classification of a body set after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryState {
    Stable,
    Collided(usize, usize),
    Escaped(usize),
}

impl BoundaryState {
    pub fn is_violation(&self) -> bool {
        !matches!(self, BoundaryState::Stable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryMonitor {
    pub domain: Domain,
}

impl BoundaryMonitor {
    pub fn new(domain: Domain) -> Self {
        Self { domain }
    }

    /// Collisions are checked before escapes; the lowest index pair / body
    /// wins when several violations happen in the same step
    pub fn classify(&self, sys: &System) -> BoundaryState {
        if let Some((i, j)) = first_collision(sys) {
            return BoundaryState::Collided(i, j);
        }

        sys.bodies
            .iter()
            .position(|b| !self.domain.contains(&b.x))
            .map_or(BoundaryState::Stable, BoundaryState::Escaped)
    }
}

/// First pair (i < j) whose distance is at most the sum of their radii
pub fn first_collision(sys: &System) -> Option<(usize, usize)> {
    let n = sys.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (bi, bj) = (&sys.bodies[i], &sys.bodies[j]);
            let reach = bi.radius + bj.radius;
            if (bj.x - bi.x).norm_squared() <= reach * reach {
                return Some((i, j));
            }
        }
    }
    None
}
