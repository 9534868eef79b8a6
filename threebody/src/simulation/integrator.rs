//! Fixed-step time integrators
//!
//! All schemes follow the same read-then-write pattern: accelerations for
//! every body are computed from one frozen `System`, and only then are
//! positions and velocities written. `dt` is fixed for the life of a
//! simulation; there is no step-size control.

use serde::Deserialize;

use crate::simulation::forces::AccelSet;
use crate::simulation::states::System;
use crate::simulation::vector::NVec2;

/// Integration scheme, chosen once at configuration time
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorKind {
    /// v' = v + a dt, x' = x + v' dt
    #[default]
    #[serde(rename = "euler")]
    SemiImplicitEuler,

    /// Kick-drift-kick velocity Verlet, two force evaluations per step
    #[serde(rename = "verlet")]
    Verlet,

    /// Classical 4th-order Runge-Kutta, four force evaluations per step
    #[serde(rename = "rk4")]
    Rk4,
}

impl IntegratorKind {
    /// Advance `sys` by one step of `dt`, including the clock
    pub fn step(self, sys: &mut System, forces: &AccelSet, dt: f64) {
        match self {
            IntegratorKind::SemiImplicitEuler => euler_integrator(sys, forces, dt),
            IntegratorKind::Verlet => verlet_integrator(sys, forces, dt),
            IntegratorKind::Rk4 => rk4_integrator(sys, forces, dt),
        }
    }

    /// Force evaluations per step
    pub fn stages(self) -> usize {
        match self {
            IntegratorKind::SemiImplicitEuler => 1,
            IntegratorKind::Verlet => 2,
            IntegratorKind::Rk4 => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            IntegratorKind::SemiImplicitEuler => "euler",
            IntegratorKind::Verlet => "verlet",
            IntegratorKind::Rk4 => "rk4",
        }
    }
}

/// Semi-implicit (symplectic) Euler
pub fn euler_integrator(sys: &mut System, forces: &AccelSet, dt: f64) {
    if sys.is_empty() {
        return;
    }

    let a = forces.accels(sys);

    for (b, a) in sys.bodies.iter_mut().zip(a.iter()) {
        b.v += dt * *a;
        b.x += dt * b.v;
    }

    sys.t += dt;
}

/// Velocity Verlet
pub fn verlet_integrator(sys: &mut System, forces: &AccelSet, dt: f64) {
    if sys.is_empty() {
        return;
    }
    let half_dt = 0.5 * dt;

    // a_n from x_n
    let a_old = forces.accels(sys);

    // Kick: v_n+1/2 = v_n + (dt/2) a_n
    for (b, a) in sys.bodies.iter_mut().zip(a_old.iter()) {
        b.v += half_dt * *a;
    }

    // Drift: x_n+1 = x_n + dt v_n+1/2
    for b in sys.bodies.iter_mut() {
        b.x += dt * b.v;
    }

    sys.t += dt;

    // a_n+1 from x_n+1
    let a_new = forces.accels(sys);

    // Second kick: v_n+1 = v_n+1/2 + (dt/2) a_n+1
    for (b, a) in sys.bodies.iter_mut().zip(a_new.iter()) {
        b.v += half_dt * *a;
    }
}

/// Classical RK4 on the (x, v) state of the whole system
///
/// Each stage builds its own copy of the system at the intermediate state,
/// so every force evaluation sees a consistent snapshot.
pub fn rk4_integrator(sys: &mut System, forces: &AccelSet, dt: f64) {
    let n = sys.len();
    if n == 0 {
        return;
    }
    let half_dt = 0.5 * dt;

    let x0 = sys.positions();
    let v0: Vec<NVec2> = sys.bodies.iter().map(|b| b.v).collect();

    // k1
    let k1x = v0.clone();
    let k1v = forces.accels(sys);

    // k2 at t + dt/2 using k1
    let stage = stage_system(sys, &x0, &v0, &k1x, &k1v, half_dt);
    let k2x: Vec<NVec2> = stage.bodies.iter().map(|b| b.v).collect();
    let k2v = forces.accels(&stage);

    // k3 at t + dt/2 using k2
    let stage = stage_system(sys, &x0, &v0, &k2x, &k2v, half_dt);
    let k3x: Vec<NVec2> = stage.bodies.iter().map(|b| b.v).collect();
    let k3v = forces.accels(&stage);

    // k4 at t + dt using k3
    let stage = stage_system(sys, &x0, &v0, &k3x, &k3v, dt);
    let k4x: Vec<NVec2> = stage.bodies.iter().map(|b| b.v).collect();
    let k4v = forces.accels(&stage);

    let sixth = dt / 6.0;
    for i in 0..n {
        let b = &mut sys.bodies[i];
        b.x = x0[i] + sixth * (k1x[i] + 2.0 * k2x[i] + 2.0 * k3x[i] + k4x[i]);
        b.v = v0[i] + sixth * (k1v[i] + 2.0 * k2v[i] + 2.0 * k3v[i] + k4v[i]);
    }

    sys.t += dt;
}

// x0 + h * kx, v0 + h * kv for every body, at clock t + h
fn stage_system(
    sys: &System,
    x0: &[NVec2],
    v0: &[NVec2],
    kx: &[NVec2],
    kv: &[NVec2],
    h: f64,
) -> System {
    let mut stage = sys.clone();
    for (i, b) in stage.bodies.iter_mut().enumerate() {
        b.x = x0[i] + h * kx[i];
        b.v = v0[i] + h * kv[i];
    }
    stage.t = sys.t + h;
    stage
}
