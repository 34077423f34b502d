#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Voxel Collide
//!
//! Rigid-body collision detection and resolution for axis-fixed bodies on
//! voxel terrain.
//!
//! Bodies never rotate. Their shapes are spheres, upright cylinders and
//! axis-aligned boxes, and the world's static geometry is a grid of unit
//! terrain cells. Z is the vertical axis; gravity points along −Z.
//!
//! ## Key Components
//!
//! -   **Bodies:** [`RigidBody`] holds the committed and the staged
//!     kinematic state of one body; its shape is one of the [`shapes`].
//! -   **Collision:** the [`collision`] module holds one strategy per shape
//!     pair, the box-face resolution shared by the `*-vs-box` strategies, the
//!     separation and bounce numerics, and the per-frame
//!     [`CollisionOrchestrator`].
//! -   **Terrain:** the [`Terrain`] trait is the collision pass's view of the
//!     voxel world; [`VoxelTerrain`] is an in-memory implementation.
//! -   **Simulation:** [`PhysicsSim`] owns entities and terrain and steps
//!     the whole frame: integrate, collide, commit.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use voxel_collide::{CellMaterial, IVec3, PhysicsSim, RigidBody, Sphere, Vec3};
//!
//! let mut sim = PhysicsSim::new();
//! sim.terrain_mut()
//!     .fill(IVec3::new(-4, -4, 0), IVec3::new(4, 4, 0), CellMaterial::default());
//! let ball = sim.add_body(RigidBody::new(Sphere::new(0.4), 1.0).at(Vec3::new(0.5, 0.5, 4.0)));
//!
//! sim.run(1.0 / 60.0, 120);
//! println!("ball rests at {}", sim.body(ball).unwrap().pos);
//! ```

pub mod body;
pub mod collision;
pub mod error;
pub mod integrator;
pub mod shapes;
pub mod simulation;
pub mod terrain;
pub mod types;

pub use body::RigidBody;
pub use collision::{
    BoxFace, Collider, CollisionConfig, CollisionOrchestrator, CollisionSet, ContactEvent,
    CylinderArea, Entity, FrameReport, HitArea, HitResult,
};
pub use error::PhysicsError;
pub use shapes::{AaBox, Cylinder, Shape, ShapeKind, Sphere};
pub use simulation::PhysicsSim;
pub use terrain::{BrickShape, CellMaterial, FaceCovering, Terrain, VoxelTerrain};
pub use types::{EntityId, IVec3, PhysParams, Vec2, Vec3, DEFAULT_GRAVITY, LARGE_MASS, MIN_MASS};
