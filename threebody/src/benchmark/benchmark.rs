//! Timing and accuracy reports for the force model and integrators
//!
//! Works on bare `System`s (no boundary monitor) so a run is never cut short
//! by a reset. Output is CSV-ish text on stdout.

use std::time::Instant;

use crate::simulation::diagnostics::total_energy;
use crate::simulation::forces::{AccelSet, Acceleration, NewtonianGravity};
use crate::simulation::integrator::IntegratorKind;
use crate::simulation::states::{Body, System};
use crate::simulation::vector::NVec2;

/// One integrator measurement
#[derive(Debug, Clone, Copy)]
pub struct IntegratorBench {
    pub integrator: IntegratorKind,
    pub steps: usize,
    pub us_per_step: f64,
    pub energy_drift: f64, // |E_end - E_0| / |E_0|
}

/// Helper to build a deterministic system of size `n` on a ring
fn make_system(n: usize) -> System {
    let mut bodies = Vec::with_capacity(n);

    for i in 0..n {
        let i_f = i as f64;
        let angle = std::f64::consts::TAU * i_f / n as f64;
        let r = 100.0 + 20.0 * (i_f * 0.37).sin();

        bodies.push(Body {
            x: NVec2::new(r * angle.cos(), r * angle.sin()),
            // tangential, slower than circular so the ring contracts
            v: NVec2::new(-angle.sin(), angle.cos()) * 5.0,
            m: 100.0,
            radius: 1.0,
            color: [1.0, 1.0, 1.0, 1.0],
        });
    }

    System::new(bodies)
}

fn make_gravity() -> NewtonianGravity {
    NewtonianGravity {
        g: 1000.0,
        softening: 1.0,
    }
}

/// Time a single force evaluation for a range of n
pub fn bench_gravity() {
    println!("N,direct_us");

    for n in [3, 10, 30, 100, 300] {
        let sys = make_system(n);
        let gravity = make_gravity();
        let mut out = vec![NVec2::zeros(); n];

        // Warm up
        gravity.acceleration(&sys, &mut out);

        let reps = 100;
        let t0 = Instant::now();
        for _ in 0..reps {
            gravity.acceleration(&sys, &mut out);
        }
        let us = t0.elapsed().as_secs_f64() * 1e6 / reps as f64;

        println!("{},{:.3}", n, us);
    }
}

/// Step cost and relative energy drift per integrator over `steps` steps
pub fn bench_integrators(n: usize, steps: usize, dt: f64) -> Vec<IntegratorBench> {
    let template = make_system(n);
    let forces = AccelSet::new().with(make_gravity());
    let gravity = make_gravity();
    let e0 = total_energy(&template, &gravity);

    println!("integrator,N,steps,us_per_step,energy_drift");

    let mut rows = Vec::new();
    for integrator in [IntegratorKind::SemiImplicitEuler, IntegratorKind::Verlet, IntegratorKind::Rk4] {
        let mut sys = template.clone();

        let t0 = Instant::now();
        for _ in 0..steps {
            integrator.step(&mut sys, &forces, dt);
        }
        let us_per_step = t0.elapsed().as_secs_f64() * 1e6 / steps.max(1) as f64;

        let e1 = total_energy(&sys, &gravity);
        let energy_drift = if e0 != 0.0 { ((e1 - e0) / e0).abs() } else { (e1 - e0).abs() };

        println!(
            "{},{},{},{:.3},{:.3e}",
            integrator.name(),
            n,
            steps,
            us_per_step,
            energy_drift
        );

        rows.push(IntegratorBench {
            integrator,
            steps,
            us_per_step,
            energy_drift,
        });
    }

    rows
}
