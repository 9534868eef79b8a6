//! Bevy 2D host for the simulation
//!
//! Steps the simulation on bevy's fixed clock and draws each frame from an
//! owned `Snapshot`, never from live state. `R` requests a reset.

use bevy::log::LogPlugin;
use bevy::prelude::*;

use crate::simulation::engine::{Simulation, Snapshot};
use crate::simulation::vector::NVec2;

#[derive(Resource)]
struct SimResource(Simulation);

/// Latest snapshot, refreshed after every physics tick
#[derive(Resource)]
struct FrameSnapshot(Snapshot);

/// World-to-screen mapping
#[derive(Resource, Clone, Copy)]
struct View {
    center: NVec2,
    scale: f32,
}

impl View {
    fn to_screen(&self, p: &NVec2) -> Vec2 {
        let d = p - self.center;
        Vec2::new(d.x as f32, d.y as f32) * self.scale
    }
}

const WINDOW_W: f32 = 800.0;
const WINDOW_H: f32 = 600.0;

pub fn run_2d(sim: Simulation) {
    tracing::info!("run_2d: starting Bevy 2D viewer with {} bodies", sim.system().len());

    let domain = *sim.domain();
    let size = domain.size();
    let view = View {
        center: domain.center(),
        scale: (WINDOW_W / size.x as f32).min(WINDOW_H / size.y as f32),
    };
    let dt = sim.parameters().dt;
    let snapshot = sim.snapshot();

    App::new()
        .insert_resource(SimResource(sim))
        .insert_resource(FrameSnapshot(snapshot))
        .insert_resource(view)
        .insert_resource(Time::<Fixed>::from_seconds(dt))
        .insert_resource(ClearColor(Color::srgb(0.1, 0.1, 0.1)))
        // main() owns the global tracing subscriber
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Three Body Simulation".into(),
                        resolution: (WINDOW_W, WINDOW_H).into(),
                        ..default()
                    }),
                    ..default()
                })
                .disable::<LogPlugin>(),
        )
        .add_systems(Startup, setup_camera_system)
        .add_systems(FixedUpdate, physics_step_system)
        .add_systems(Update, (reset_input_system, draw_system).chain())
        .run();
}

fn setup_camera_system(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}

fn physics_step_system(mut sim: ResMut<SimResource>, mut frame: ResMut<FrameSnapshot>) {
    let dt = sim.0.parameters().dt;
    match sim.0.step(dt) {
        Ok(result) if result.did_reset => {
            tracing::info!(state = ?result.state, resets = sim.0.stats().resets, "scenario reset");
        }
        Ok(_) => {}
        Err(err) => tracing::warn!(%err, "step rejected"),
    }
    frame.0 = sim.0.snapshot();
}

fn reset_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut sim: ResMut<SimResource>,
    mut frame: ResMut<FrameSnapshot>,
) {
    if keys.just_pressed(KeyCode::KeyR) {
        sim.0.reset();
        frame.0 = sim.0.snapshot();
    }
}

fn draw_system(mut gizmos: Gizmos, frame: Res<FrameSnapshot>, view: Res<View>) {
    let snapshot = &frame.0;

    for (body, trail) in snapshot.bodies.iter().zip(snapshot.trails.iter()) {
        let [r, g, b, a] = body.color;

        // segment alpha follows the newer end
        for pair in trail.windows(2) {
            let alpha = a * pair[1].fade as f32;
            if alpha <= 0.0 {
                continue;
            }
            gizmos.line_2d(
                view.to_screen(&pair[0].position),
                view.to_screen(&pair[1].position),
                Color::srgba(r, g, b, alpha),
            );
        }

        let radius = (body.radius as f32 * view.scale).max(1.0);
        gizmos.circle_2d(view.to_screen(&body.position), radius, Color::srgba(r, g, b, a));
    }
}
