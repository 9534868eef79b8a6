use threebody::{bench_gravity, bench_integrators, IntegratorKind, SimulationConfig, Simulation};
use threebody::simulation::diagnostics::{center_of_mass_velocity, total_energy};
use threebody::NewtonianGravity;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Gravitational three-body simulation with fading trails")]
struct Args {
    /// Scenario file, looked up under `scenarios/` when not found as given
    #[arg(short, long, default_value = "default.yaml")]
    file: String,

    /// Run this many ticks without a window and print a summary
    #[arg(long)]
    headless: Option<u64>,

    /// Print force and integrator benchmarks and exit
    #[arg(long)]
    bench: bool,

    /// Override the generator seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the integrator: euler, verlet or rk4
    #[arg(long, value_parser = parse_integrator)]
    integrator: Option<IntegratorKind>,
}

fn parse_integrator(s: &str) -> Result<IntegratorKind, String> {
    match s {
        "euler" => Ok(IntegratorKind::SemiImplicitEuler),
        "verlet" => Ok(IntegratorKind::Verlet),
        "rk4" => Ok(IntegratorKind::Rk4),
        other => Err(format!("unknown integrator `{other}`")),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

// load here to keep main clean
fn load_config(args: &Args) -> Result<SimulationConfig> {
    let given = PathBuf::from(&args.file);
    let config_path = if given.exists() {
        given
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(&args.file)
    };

    let mut cfg = SimulationConfig::from_path(&config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))?;

    if let Some(seed) = args.seed {
        cfg.generator.seed = seed;
    }
    if let Some(integrator) = args.integrator {
        cfg.engine.integrator = integrator;
    }

    tracing::info!(path = %config_path.display(), "loaded scenario");
    Ok(cfg)
}

fn run_headless(mut sim: Simulation, ticks: u64) -> Result<()> {
    let gravity = NewtonianGravity {
        g: sim.parameters().g,
        softening: sim.parameters().softening,
    };
    let dt = sim.parameters().dt;
    let e0 = total_energy(sim.system(), &gravity);

    for _ in 0..ticks {
        let result = sim.step(dt)?;
        if result.did_reset {
            tracing::info!(state = ?result.state, t = sim.system().t, "scenario reset");
        }
    }

    let stats = sim.stats();
    let snapshot = sim.snapshot();
    println!("ticks:      {}", stats.ticks);
    println!("resets:     {} (collisions {}, escapes {})", stats.resets, stats.collisions, stats.escapes);
    println!("clock:      {:.3}", snapshot.t);
    println!("energy:     {:.6} -> {:.6}", e0, total_energy(sim.system(), &gravity));
    let v_cm = center_of_mass_velocity(sim.system());
    println!("v_cm:       ({:.6}, {:.6})", v_cm.x, v_cm.y);
    for (i, (body, trail)) in snapshot.bodies.iter().zip(snapshot.trails.iter()).enumerate() {
        println!(
            "body {}:     pos ({:.2}, {:.2}), trail {} points",
            i,
            body.position.x,
            body.position.y,
            trail.len()
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    if args.bench {
        bench_gravity();
        bench_integrators(3, 10_000, 1.0 / 120.0);
        return Ok(());
    }

    let cfg = load_config(&args)?;
    let sim = cfg.build().context("invalid simulation configuration")?;

    if let Some(ticks) = args.headless {
        return run_headless(sim, ticks);
    }

    #[cfg(feature = "viewer")]
    threebody::run_2d(sim);

    #[cfg(not(feature = "viewer"))]
    {
        tracing::warn!("built without the `viewer` feature, running 1200 headless ticks");
        run_headless(sim, 1200)?;
    }

    Ok(())
}
