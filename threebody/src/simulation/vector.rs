//! 2D vector arithmetic
//!
//! Positions, velocities and accelerations are nalgebra `Vector2<f64>`.
//! Add, subtract and scale come from nalgebra; `VectorExt` adds the
//! zero-safe normalisation the force model relies on.

use nalgebra::Vector2;

pub type NVec2 = Vector2<f64>;

/// Build a vector from a `[x, y]` pair (the YAML-facing shape)
pub fn vec2(xy: [f64; 2]) -> NVec2 {
    NVec2::new(xy[0], xy[1])
}

pub trait VectorExt {
    /// Euclidean length
    fn length(&self) -> f64;

    /// Unit vector in the same direction, or the zero vector when the
    /// magnitude is exactly zero. Callers that need a direction must check.
    fn normalize_or_zero(&self) -> Self;
}

impl VectorExt for NVec2 {
    fn length(&self) -> f64 {
        self.norm()
    }

    fn normalize_or_zero(&self) -> Self {
        let len = self.norm();
        if len == 0.0 {
            NVec2::zeros()
        } else {
            self / len
        }
    }
}
