use threebody::simulation::diagnostics::{center_of_mass_velocity, total_mass};
use threebody::{
    AccelSet, Body, BoundaryState, ConfigError, LinearDrag, Domain, IntegratorKind, NVec2, NewtonianGravity, Parameters,
    RandomRanges, Scenario, ScenarioGenerator, SimError, SimSettings, Simulation, SimulationConfig,
    System, TrailSettings,
};

/// Build a simple 2-body System separated along x-axis
pub fn two_body_system(dist: f64, m1: f64, m2: f64) -> System {
    let b1 = Body::new(m1, NVec2::new(-dist / 2.0, 0.0), NVec2::zeros(), 0.0).unwrap();
    let b2 = Body::new(m2, NVec2::new(dist / 2.0, 0.0), NVec2::zeros(), 0.0).unwrap();
    System::new(vec![b1, b2])
}

/// Default physics parameters for tests
pub fn test_params() -> Parameters {
    Parameters {
        g: 0.1,
        softening: 0.0,
        drag: 0.0,
        dt: 0.001,
        integrator: IntegratorKind::SemiImplicitEuler,
        min_separation: 0.0,
    }
}

/// Build a gravity term + AccelSet
pub fn gravity_set(p: &Parameters) -> AccelSet {
    AccelSet::new().with(NewtonianGravity {
        g: p.g,
        softening: p.softening,
    })
}

fn body(m: f64, x: [f64; 2], v: [f64; 2], radius: f64) -> Body {
    Body::new(m, NVec2::new(x[0], x[1]), NVec2::new(v[0], v[1]), radius).unwrap()
}

fn random_generator(seed: u64) -> ScenarioGenerator {
    ScenarioGenerator::random(RandomRanges::default(), seed, Domain::default(), 50.0)
}

/// Settings with a seeded random generator and no minimum separation on
/// `initialize`, so tests can install deliberately bad states
fn settings(integrator: IntegratorKind, trail: TrailSettings) -> SimSettings {
    SimSettings {
        parameters: Parameters {
            integrator,
            min_separation: 0.0,
            ..Parameters::default()
        },
        domain: Domain::default(),
        trail,
        generator: random_generator(42),
        reseed_on_reset: false,
    }
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn gravity_newton_third_law() {
    let sys = two_body_system(1.0, 2.0, 3.0);
    let p = test_params();
    let forces = gravity_set(&p);

    let acc = forces.accels(&sys);
    let net = acc[0] * sys.bodies[0].m + acc[1] * sys.bodies[1].m;

    assert!(net.norm() < 1e-12, "Net momentum not zero: {:?}", net);
}

#[test]
fn gravity_points_toward_other_body() {
    let sys = two_body_system(2.0, 1.0, 1.0);
    let p = test_params();
    let forces = gravity_set(&p);

    let acc = forces.accels(&sys);
    let dx = sys.bodies[1].x - sys.bodies[0].x;

    assert!(acc[0].dot(&dx) > 0.0, "Acceleration is not toward second body");
    assert!(acc[1].dot(&dx) < 0.0, "Acceleration is not toward first body");
}

#[test]
fn gravity_inverse_square_law() {
    let sys_r = two_body_system(1.0, 1.0, 1.0);
    let sys_2r = two_body_system(2.0, 1.0, 1.0);
    let p = test_params();
    let forces = gravity_set(&p);

    let ratio = forces.accels(&sys_r)[0].norm() / forces.accels(&sys_2r)[0].norm();

    assert!((ratio - 4.0).abs() < 1e-9, "Expected 4x, got {}", ratio);
}

#[test]
fn gravity_magnitude_matches_newton() {
    // a_1 = G m_2 / r^2
    let sys = two_body_system(2.0, 1.0, 3.0);
    let p = test_params();
    let acc = gravity_set(&p).accels(&sys);

    assert!((acc[0].x - 0.1 * 3.0 / 4.0).abs() < 1e-12);
    assert!((acc[1].x + 0.1 * 1.0 / 4.0).abs() < 1e-12);
}

#[test]
fn gravity_softening_prevents_blowup() {
    let mut p = test_params();
    p.softening = 0.1;

    let sys = two_body_system(1e-9, 1.0, 1.0);
    let acc = gravity_set(&p).accels(&sys);

    // floor caps |a| at G m / softening
    assert!(acc[0].norm() <= 0.1 / 0.1 + 1e-12, "Softening failed; acceleration too large");
}

#[test]
fn gravity_zero_separation_is_finite() {
    let p = test_params();
    let sys = two_body_system(0.0, 1.0, 1.0);
    let acc = gravity_set(&p).accels(&sys);

    assert!(acc.iter().all(|a| a.x.is_finite() && a.y.is_finite()));
}

#[test]
fn gravity_contact_distance_floor() {
    // inside contact distance the force is held at its contact value
    let p = test_params();
    let forces = gravity_set(&p);

    let mut near = two_body_system(2.0, 1.0, 1.0);
    let mut touching = two_body_system(10.0, 1.0, 1.0);
    for b in near.bodies.iter_mut().chain(touching.bodies.iter_mut()) {
        b.radius = 5.0;
    }

    let a_near = forces.accels(&near)[0].norm();
    let a_touch = forces.accels(&touching)[0].norm();
    assert!((a_near - a_touch).abs() < 1e-12);
}

// ==================================================================================
// Integrator tests
// ==================================================================================

#[test]
fn euler_is_semi_implicit() {
    let mut sys = two_body_system(2.0, 1.0, 1.0);
    sys.bodies[0].v = NVec2::new(0.0, 0.5);
    let p = test_params();
    let forces = gravity_set(&p);
    let dt = 0.1;

    let a = forces.accels(&sys);
    let before = sys.clone();

    IntegratorKind::SemiImplicitEuler.step(&mut sys, &forces, dt);

    let v_expected = before.bodies[0].v + dt * a[0];
    let x_expected = before.bodies[0].x + dt * v_expected;
    assert!((sys.bodies[0].v - v_expected).norm() < 1e-15);
    assert!((sys.bodies[0].x - x_expected).norm() < 1e-15);
    assert!((sys.t - dt).abs() < 1e-15);
}

/// Max |separation - 2| over one period of a circular equal-mass binary
fn circular_orbit_error(integrator: IntegratorKind, dt: f64) -> f64 {
    // G = 1, m = 1, d = 2: a = 1/4, v = sqrt(a r) = 0.5, T = 4 pi
    let mut sys = System::new(vec![
        body(1.0, [-1.0, 0.0], [0.0, -0.5], 0.0),
        body(1.0, [1.0, 0.0], [0.0, 0.5], 0.0),
    ]);
    let forces = AccelSet::new().with(NewtonianGravity { g: 1.0, softening: 1e-6 });

    let steps = (4.0 * std::f64::consts::PI / dt).round() as usize;
    let mut max_err: f64 = 0.0;
    for _ in 0..steps {
        integrator.step(&mut sys, &forces, dt);
        let d = (sys.bodies[1].x - sys.bodies[0].x).norm();
        max_err = max_err.max((d - 2.0).abs());
    }
    max_err
}

#[test]
fn rk4_beats_euler_on_circular_orbit() {
    let euler = circular_orbit_error(IntegratorKind::SemiImplicitEuler, 0.01);
    let rk4 = circular_orbit_error(IntegratorKind::Rk4, 0.01);

    assert!(rk4 < 1e-6, "rk4 drift {}", rk4);
    assert!(rk4 < euler, "rk4 {} not better than euler {}", rk4, euler);
}

#[test]
fn verlet_keeps_circular_orbit() {
    let err = circular_orbit_error(IntegratorKind::Verlet, 0.01);
    assert!(err < 1e-3, "verlet drift {}", err);
}

#[test]
fn drag_slows_a_lone_pair() {
    let mut sys = two_body_system(1000.0, 1.0, 1.0);
    sys.bodies[0].v = NVec2::new(0.0, 10.0);
    let forces = AccelSet::new().with(LinearDrag { k: 0.5 });

    for _ in 0..100 {
        IntegratorKind::SemiImplicitEuler.step(&mut sys, &forces, 0.01);
    }

    // (1 - k dt)^100 = 0.995^100
    let expected = 10.0 * 0.995f64.powi(100);
    assert!((sys.bodies[0].v.y - expected).abs() < 1e-9);
}

#[test]
fn integrators_never_touch_mass() {
    for integrator in [IntegratorKind::SemiImplicitEuler, IntegratorKind::Verlet, IntegratorKind::Rk4] {
        let mut sys = two_body_system(3.0, 2.0, 5.0);
        let forces = gravity_set(&test_params());
        for _ in 0..100 {
            integrator.step(&mut sys, &forces, 0.01);
        }
        assert_eq!(sys.bodies[0].m, 2.0);
        assert_eq!(sys.bodies[1].m, 5.0);
        assert!((sys.t - 1.0).abs() < 1e-9);
    }
}

// ==================================================================================
// Simulation tests
// ==================================================================================

#[test]
fn invalid_timestep_leaves_state_untouched() {
    let mut sim = SimulationConfig::default().build().unwrap();
    for _ in 0..10 {
        sim.step(1.0 / 120.0).unwrap();
    }

    let system_before = sim.system().clone();
    let snapshot_before = sim.snapshot();
    let stats_before = sim.stats();

    for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = sim.step(dt).unwrap_err();
        assert!(matches!(err, SimError::InvalidTimestep(_)));
    }

    assert_eq!(sim.system(), &system_before);
    assert_eq!(sim.snapshot(), snapshot_before);
    assert_eq!(sim.stats(), stats_before);
}

#[test]
fn step_conserves_mass() {
    let mut sim = SimulationConfig::default().build().unwrap();
    let masses: Vec<f64> = sim.system().bodies.iter().map(|b| b.m).collect();

    for _ in 0..1000 {
        sim.step(1.0 / 120.0).unwrap();
        let now: Vec<f64> = sim.system().bodies.iter().map(|b| b.m).collect();
        assert_eq!(now, masses);
    }
}

#[test]
fn two_body_center_of_mass_velocity_is_constant() {
    let mut sim = Simulation::new(settings(IntegratorKind::SemiImplicitEuler, TrailSettings::default())).unwrap();
    sim.initialize(Scenario::new(vec![
        body(100.0, [-100.0, 0.0], [0.0, 10.0], 5.0),
        body(100.0, [100.0, 0.0], [0.0, -10.0], 5.0),
    ]))
    .unwrap();

    let v0 = center_of_mass_velocity(sim.system());
    for _ in 0..2000 {
        let result = sim.step(1.0 / 120.0).unwrap();
        assert!(!result.did_reset);
    }
    let v1 = center_of_mass_velocity(sim.system());

    assert!((v1 - v0).norm() < 1e-9, "v_cm drifted from {:?} to {:?}", v0, v1);
    assert_eq!(total_mass(sim.system()), 200.0);
}

#[test]
fn overlapping_bodies_collide_and_reset_to_generated_scenario() {
    let mut sim = Simulation::new(settings(IntegratorKind::SemiImplicitEuler, TrailSettings::default())).unwrap();
    sim.initialize(Scenario::new(vec![
        body(10.0, [0.0, 0.0], [0.0, 0.0], 5.0),
        body(10.0, [9.0, 0.0], [0.0, 0.0], 5.0),
    ]))
    .unwrap();

    let result = sim.step(1.0 / 120.0).unwrap();
    assert_eq!(result.state, BoundaryState::Collided(0, 1));
    assert!(result.did_reset);

    let fresh = random_generator(42).generate().unwrap();
    let snapshot = sim.snapshot();
    assert_eq!(snapshot.bodies.len(), fresh.len());
    for (view, b) in snapshot.bodies.iter().zip(fresh.bodies.iter()) {
        assert_eq!(view.position, b.x);
        assert_eq!(view.radius, b.radius);
    }
    assert!(snapshot.trails.iter().all(|t| t.is_empty()));
    assert_eq!(snapshot.t, 0.0);
    assert_eq!(sim.stats().collisions, 1);
}

#[test]
fn outward_body_at_boundary_escapes() {
    let mut sim = Simulation::new(settings(IntegratorKind::SemiImplicitEuler, TrailSettings::default())).unwrap();
    let domain = *sim.domain();
    sim.initialize(Scenario::new(vec![
        body(1.0, [domain.max.x, 0.0], [50.0, 0.0], 5.0),
        body(1.0, [0.0, 0.0], [0.0, 0.0], 5.0),
    ]))
    .unwrap();

    let result = sim.step(1.0 / 120.0).unwrap();
    assert_eq!(result.state, BoundaryState::Escaped(0));
    assert!(result.did_reset);
    assert_eq!(sim.stats().escapes, 1);
}

#[test]
fn trail_count_cap_holds() {
    let trail = TrailSettings {
        max_age: None,
        max_count: Some(5),
        fade_exponent: 0.5,
    };
    let mut sim = Simulation::new(settings(IntegratorKind::Rk4, trail)).unwrap();

    for _ in 0..100 {
        sim.step(1.0 / 120.0).unwrap();
        assert!(sim.snapshot().trails.iter().all(|t| t.len() <= 5));
    }
}

#[test]
fn trail_age_cap_holds() {
    let max_age = 0.1;
    let trail = TrailSettings {
        max_age: Some(max_age),
        max_count: None,
        fade_exponent: 1.0,
    };
    let mut sim = Simulation::new(settings(IntegratorKind::SemiImplicitEuler, trail)).unwrap();

    for _ in 0..100 {
        sim.step(1.0 / 120.0).unwrap();
        for buffer in sim.trails() {
            assert!(buffer.oldest_age().unwrap_or(0.0) <= max_age);
        }
        for points in sim.snapshot().trails {
            assert!(points.len() <= 13);
            assert!(points.iter().all(|p| (0.0..=1.0).contains(&p.fade)));
        }
    }
}

#[test]
fn generator_is_deterministic() {
    let a = random_generator(42).generate().unwrap();
    let b = random_generator(42).generate().unwrap();
    let c = random_generator(43).generate().unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn random_scenarios_respect_constraints() {
    let domain = Domain::default();
    for seed in 0..20 {
        let scenario = random_generator(seed).generate().unwrap();
        assert_eq!(scenario.len(), 3);

        for (i, b) in scenario.bodies.iter().enumerate() {
            assert!(b.m > 0.0);
            assert!(b.radius >= 8.0);
            assert!(domain.contains(&b.x));
            for other in &scenario.bodies[i + 1..] {
                assert!((other.x - b.x).norm() >= 50.0);
            }
        }

        assert!(center_of_mass_velocity(&scenario.to_system()).norm() < 1e-9);
    }
}

#[test]
fn impossible_separation_is_reported() {
    let mut generator = random_generator(1);
    generator.min_separation = 10_000.0;
    generator.max_attempts = 50;

    let err = generator.generate().unwrap_err();
    assert!(matches!(err, SimError::Config(_)));
}

#[test]
fn repeated_runs_are_identical() {
    let run = || {
        let mut cfg = SimulationConfig::default();
        cfg.engine.integrator = IntegratorKind::Rk4;
        let mut sim = cfg.build().unwrap();
        for i in 0..500 {
            let dt = if i % 2 == 0 { 1.0 / 120.0 } else { 1.0 / 60.0 };
            sim.step(dt).unwrap();
        }
        sim.snapshot()
    };

    assert_eq!(run(), run());
}

#[test]
fn initialize_rejects_bad_scenarios() {
    let mut sim = SimulationConfig::default().build().unwrap();
    let before = sim.snapshot();

    let mut zero_mass = Scenario::three_body();
    zero_mass.bodies[1].m = 0.0;
    let mut negative_radius = Scenario::three_body();
    negative_radius.bodies[2].radius = -1.0;
    let mut too_close = Scenario::three_body();
    too_close.bodies[1].x = too_close.bodies[0].x + NVec2::new(10.0, 0.0);
    let single = Scenario::new(vec![Scenario::three_body().bodies[0].clone()]);

    for bad in [zero_mass, negative_radius, too_close, single] {
        let err = sim.initialize(bad).unwrap_err();
        assert!(matches!(err, SimError::InvalidScenario(_)));
        assert_eq!(sim.snapshot(), before);
    }
}

#[test]
fn body_rejects_non_positive_mass() {
    assert!(matches!(
        Body::new(0.0, NVec2::zeros(), NVec2::zeros(), 1.0),
        Err(SimError::InvalidBody(_))
    ));
    assert!(Body::new(-1.0, NVec2::zeros(), NVec2::zeros(), 1.0).is_err());
    assert!(Body::new(1.0, NVec2::zeros(), NVec2::zeros(), -0.5).is_err());
}

#[test]
fn requested_reset_restores_base_scenario() {
    let mut sim = SimulationConfig::default().build().unwrap();
    let base = sim.snapshot();
    for _ in 0..50 {
        sim.step(1.0 / 120.0).unwrap();
    }
    assert_ne!(sim.snapshot(), base);

    sim.reset();
    assert_eq!(sim.snapshot(), base);
    assert_eq!(sim.stats().requested, 1);
    assert_eq!(sim.stats().resets, 1);
}

#[test]
fn reseed_on_reset_uses_next_seed() {
    let mut s = settings(IntegratorKind::SemiImplicitEuler, TrailSettings::default());
    s.reseed_on_reset = true;
    let mut sim = Simulation::new(s).unwrap();

    sim.reset();
    let expected = sim.generator().generate_with_seed(43).unwrap();
    assert_eq!(expected, random_generator(43).generate().unwrap());
    let positions: Vec<NVec2> = sim.snapshot().bodies.iter().map(|b| b.position).collect();
    assert_eq!(positions, expected.to_system().positions());
}

#[test]
fn reseed_counts_requested_and_automatic_resets() {
    let mut s = settings(IntegratorKind::SemiImplicitEuler, TrailSettings::default());
    s.reseed_on_reset = true;
    let mut sim = Simulation::new(s).unwrap();

    // first reset requested (seed 43), second from a collision (seed 44)
    sim.reset();
    sim.initialize(Scenario::new(vec![
        body(10.0, [0.0, 0.0], [0.0, 0.0], 5.0),
        body(10.0, [9.0, 0.0], [0.0, 0.0], 5.0),
    ]))
    .unwrap();
    let result = sim.step(1.0 / 120.0).unwrap();
    assert!(result.did_reset);

    let expected = random_generator(44).generate().unwrap();
    let positions: Vec<NVec2> = sim.snapshot().bodies.iter().map(|b| b.position).collect();
    assert_eq!(positions, expected.to_system().positions());
    assert_eq!(sim.stats().resets, 2);
}

#[test]
fn new_rejects_unbounded_trail() {
    let trail = TrailSettings {
        max_age: None,
        max_count: None,
        fade_exponent: 1.0,
    };
    let err = Simulation::new(settings(IntegratorKind::SemiImplicitEuler, trail)).err().unwrap();
    assert!(matches!(err, SimError::Config(ConfigError::UnboundedTrail)));
}

#[test]
fn new_rejects_bad_parameters() {
    let mut s = settings(IntegratorKind::SemiImplicitEuler, TrailSettings::default());
    s.parameters.g = 0.0;
    assert!(matches!(Simulation::new(s), Err(SimError::Config(_))));

    let mut s = settings(IntegratorKind::SemiImplicitEuler, TrailSettings::default());
    s.trail.max_age = Some(-1.0);
    assert!(matches!(Simulation::new(s), Err(SimError::Config(_))));
}

#[test]
fn generator_rejects_infinite_ranges() {
    let mut generator = random_generator(7);
    if let threebody::GeneratorMode::Random(ranges) = &mut generator.mode {
        ranges.max_speed = f64::INFINITY;
    }
    assert!(matches!(generator.generate(), Err(SimError::Config(_))));

    let mut generator = random_generator(7);
    generator.domain.max.x = f64::INFINITY;
    assert!(matches!(generator.generate(), Err(SimError::Config(ConfigError::InvalidDomain { .. }))));
}

#[test]
fn fixed_generator_rejects_unplayable_start() {
    let domain = Domain::default();

    let outside = Scenario::new(vec![
        body(1.0, [1000.0, 0.0], [0.0, 0.0], 5.0),
        body(1.0, [0.0, 0.0], [0.0, 0.0], 5.0),
    ]);
    let err = ScenarioGenerator::fixed(outside, domain, 50.0).generate().unwrap_err();
    assert!(matches!(err, SimError::InvalidScenario(_)));

    let overlapping = Scenario::new(vec![
        body(1.0, [0.0, 0.0], [0.0, 0.0], 40.0),
        body(1.0, [60.0, 0.0], [0.0, 0.0], 40.0),
    ]);
    let err = ScenarioGenerator::fixed(overlapping, domain, 50.0).generate().unwrap_err();
    assert!(matches!(err, SimError::InvalidScenario(_)));

    assert!(ScenarioGenerator::fixed(Scenario::three_body(), domain, 50.0).generate().is_ok());
}

#[test]
fn bundled_scenarios_build() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
    for name in ["default.yaml", "random.yaml", "binary.yaml"] {
        let cfg = SimulationConfig::from_path(dir.join(name)).unwrap();
        let mut sim = cfg.build().unwrap();
        sim.step(cfg.engine.dt).unwrap();
    }
}

#[test]
fn integrator_bench_reports_every_scheme() {
    let rows = threebody::bench_integrators(3, 50, 1.0 / 120.0);
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.energy_drift.is_finite()));
}
