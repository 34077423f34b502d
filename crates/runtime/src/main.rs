#![deny(clippy::all, clippy::pedantic)]

mod watcher;

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use voxel_collide::integrator::{kinetic_energy, momentum};
use voxel_collide::{
    AaBox, CellMaterial, Cylinder, EntityId, IVec3, PhysParams, PhysicsSim, RigidBody, Sphere,
    Vec3,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless voxel collision demo")]
struct Args {
    /// JSON file with simulation parameters; missing fields keep defaults
    #[arg(long)]
    params: Option<PathBuf>,
    /// Reload the parameters file whenever it changes, pacing frames in real time
    #[arg(long, requires = "params")]
    watch: bool,
    /// Number of frames to simulate
    #[arg(long, default_value_t = 240)]
    frames: u32,
    /// Frame duration in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
}

/// A 6x6 floor with a two-cell pillar, a fixed crate and a few bodies
/// dropped onto them.
fn build_scene(params: PhysParams) -> (PhysicsSim, Vec<(&'static str, EntityId)>) {
    let mut sim = PhysicsSim::new();
    sim.set_params(params);
    let terrain = sim.terrain_mut();
    terrain.fill(IVec3::new(0, 0, 0), IVec3::new(5, 5, 0), CellMaterial::default());
    terrain.fill(IVec3::new(2, 2, 1), IVec3::new(2, 2, 2), CellMaterial::new(0.1, 0.8));

    let bodies = vec![
        (
            "ball",
            RigidBody::new(Sphere::new(0.4), 1.0).at(Vec3::new(1.5, 1.5, 4.0)),
        ),
        (
            "rolling ball",
            RigidBody::new(Sphere::new(0.3), 0.5)
                .at(Vec3::new(4.5, 1.5, 2.0))
                .moving(Vec3::new(-1.5, 0.5, 0.0)),
        ),
        (
            "pillar ball",
            RigidBody::new(Sphere::new(0.35), 1.0).at(Vec3::new(2.5, 2.5, 5.0)),
        ),
        (
            "barrel",
            RigidBody::new(Cylinder::new(0.4, 1.0), 2.0).at(Vec3::new(1.5, 4.5, 3.0)),
        ),
        (
            "crate",
            RigidBody::fixed(AaBox::cube(1.0)).at(Vec3::new(4.5, 4.5, 1.5)),
        ),
        (
            "crate ball",
            RigidBody::new(Sphere::new(0.4), 1.0).at(Vec3::new(4.4, 4.5, 4.0)),
        ),
    ];
    let ids = bodies
        .into_iter()
        .map(|(name, body)| (name, sim.add_body(body)))
        .collect();
    (sim, ids)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();
    let args = Args::parse();

    let params = match &args.params {
        Some(path) => watcher::load_params(path)?,
        None => PhysParams::default(),
    };
    let (tx, rx) = mpsc::channel();
    let _params_watcher = match (&args.params, args.watch) {
        (Some(path), true) => match watcher::start(path, tx) {
            Ok(watcher_instance) => Some(watcher_instance),
            Err(e) => {
                tracing::error!("Failed to start parameters watcher: {e:#}");
                None
            }
        },
        _ => None,
    };

    tracing::info!("Initializing physics simulation...");
    let (mut sim, names) = build_scene(params);
    tracing::info!(
        frames = args.frames,
        dt = args.dt,
        bodies = sim.len(),
        "Starting simulation loop"
    );

    for frame in 1..=args.frames {
        if let Some(params) = rx.try_iter().last() {
            tracing::info!(gravity = %params.gravity, "applying reloaded parameters");
            sim.set_params(params);
        }

        let report = sim.step(args.dt);
        if !report.excised.is_empty() {
            tracing::warn!(frame, excised = ?report.excised, "entities excised");
        }
        if frame % 60 == 0 {
            let bodies: Vec<_> = sim.ids().filter_map(|id| sim.body(id)).collect();
            tracing::info!(
                frame,
                contacts = sim.contacts().len(),
                rounds = sim.last_report().rounds,
                momentum = %momentum(bodies.iter().copied()),
                energy = kinetic_energy(bodies.iter().copied()),
                "Simulation frame complete"
            );
        }
        if args.watch {
            std::thread::sleep(Duration::from_secs_f32(args.dt));
        }
    }

    for (id, _) in sim.take_removed() {
        tracing::warn!(entity = %id, "entity was removed during the run");
    }
    for (name, id) in names {
        if let Some(body) = sim.body(id) {
            tracing::info!(entity = %id, name, pos = %body.pos, speed = %body.speed, "final state");
        }
    }
    tracing::info!("Simulation finished after {} frames.", args.frames);
    Ok(())
}
