//! Conserved-quantity diagnostics for a `System`
//!
//! Potential energy uses the same softened distance as `NewtonianGravity`,
//! so the total is consistent with the forces actually applied.

use crate::simulation::forces::NewtonianGravity;
use crate::simulation::states::System;
use crate::simulation::vector::NVec2;

pub fn total_mass(sys: &System) -> f64 {
    sys.bodies.iter().map(|b| b.m).sum()
}

pub fn total_momentum(sys: &System) -> NVec2 {
    sys.bodies.iter().map(|b| b.momentum()).sum()
}

pub fn center_of_mass(sys: &System) -> NVec2 {
    let m = total_mass(sys);
    if m == 0.0 {
        return NVec2::zeros();
    }
    sys.bodies.iter().map(|b| b.m * b.x).sum::<NVec2>() / m
}

pub fn center_of_mass_velocity(sys: &System) -> NVec2 {
    let m = total_mass(sys);
    if m == 0.0 {
        return NVec2::zeros();
    }
    total_momentum(sys) / m
}

pub fn kinetic_energy(sys: &System) -> f64 {
    sys.bodies.iter().map(|b| 0.5 * b.m * b.v.norm_squared()).sum()
}

pub fn potential_energy(sys: &System, gravity: &NewtonianGravity) -> f64 {
    let mut u = 0.0;
    for i in 0..sys.len() {
        for j in (i + 1)..sys.len() {
            let (bi, bj) = (&sys.bodies[i], &sys.bodies[j]);
            let r2 = gravity.softened_r2((bj.x - bi.x).norm_squared(), bi.radius, bj.radius);
            if r2 == 0.0 {
                continue;
            }
            u -= gravity.g * bi.m * bj.m / r2.sqrt();
        }
    }
    u
}

pub fn total_energy(sys: &System, gravity: &NewtonianGravity) -> f64 {
    kinetic_energy(sys) + potential_energy(sys, gravity)
}
