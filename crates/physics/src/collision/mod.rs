//! # Collision Detection and Response
//!
//! This module detects overlaps between bodies at their staged positions,
//! separates them, and recomputes their staged velocities.
//!
//! Each supported shape pair has a strategy implementing
//! [`CollisionStrategy`]; the [`dispatcher`] routes two bodies to the right
//! one, and the [`orchestrator`] drives the per-frame broad phase, narrow
//! phase and cascade rounds.

mod ambiguity;
mod box_face;
mod broad_phase;
mod collision_set;
mod cylinder_box;
mod cylinder_cylinder;
pub mod dispatcher;
mod hit;
pub mod numerics;
pub mod orchestrator;
mod sphere_box;
mod sphere_cylinder;
mod sphere_sphere;

pub use box_face::{resolve_box_face, BoxQuery, FaceResolution, HitQuality, Probe};
pub use broad_phase::{in_vicinity, Vicinity};
pub use collision_set::{CollisionSet, ContactKey};
pub use cylinder_box::CylinderBox;
pub use cylinder_cylinder::CylinderCylinder;
pub use hit::{BoxFace, CylinderArea, HitArea, HitResult};
pub use orchestrator::{
    Collider, CollisionOrchestrator, ContactEvent, Entity, EntitySlot, FrameReport,
};
pub use sphere_box::SphereBox;
pub use sphere_cylinder::SphereCylinder;
pub use sphere_sphere::SphereSphere;

use serde::{Deserialize, Serialize};

use crate::body::RigidBody;
use crate::error::PhysicsError;
use crate::terrain::{FaceCovering, Terrain};
use crate::types::{IVec3, Vec3};

/// Tunables of the collision pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Binary-search separation stops once the bracket is narrower than this.
    pub separation_tolerance: f32,
    /// Extra clearance added to closed-form separations.
    pub separation_epsilon: f32,
    /// No body may be pushed farther than this by a single separation.
    pub max_push_distance: f32,
    /// Attempts at finding a clear "back" position before giving up.
    pub search_retries: u32,
    /// Narrow-phase re-runs after the first pass of a frame.
    pub cascade_rounds: u32,
    /// Relative speeds below this count as zero in the top/side heuristic.
    pub negligible_speed: f32,
    /// A contact is only classified as a side hit when the horizontal
    /// relative speed exceeds the vertical one by this factor.
    pub top_bias: f32,
    /// Distances below this are treated as coincident centres.
    pub degenerate_distance: f32,
    /// Slack added to the bounding-radius sum of the broad phase.
    pub vicinity_margin: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            separation_tolerance: 0.0005,
            separation_epsilon: 0.0001,
            max_push_distance: 4.0,
            search_retries: 4,
            cascade_rounds: 2,
            negligible_speed: 0.001,
            top_bias: 1.5,
            degenerate_distance: 1.0e-6,
            vicinity_margin: 0.25,
        }
    }
}

/// Face-covering information available for the box side of a check.
#[derive(Copy, Clone, Default)]
pub enum FaceCoverage<'a> {
    /// A free-standing box: every face is exposed.
    #[default]
    Open,
    /// A terrain cell: faces may be merged with neighbouring cells.
    Terrain {
        terrain: &'a dyn Terrain,
        cell: IVec3,
    },
}

impl FaceCoverage<'_> {
    #[must_use]
    pub fn of(&self, face: BoxFace) -> FaceCovering {
        match self {
            Self::Open => FaceCovering::NotCovered,
            Self::Terrain { terrain, cell } => terrain.face_covering(*cell, face),
        }
    }
}

impl std::fmt::Debug for FaceCoverage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => f.write_str("Open"),
            Self::Terrain { cell, .. } => write!(f, "Terrain({cell})"),
        }
    }
}

/// Explicit context handed to strategies for one narrow-phase call.
#[derive(Copy, Clone, Debug)]
pub struct ContactEnv<'a> {
    pub config: &'a CollisionConfig,
    pub coverage: FaceCoverage<'a>,
}

impl<'a> ContactEnv<'a> {
    #[must_use]
    pub const fn new(config: &'a CollisionConfig) -> Self {
        Self {
            config,
            coverage: FaceCoverage::Open,
        }
    }

    #[must_use]
    pub const fn with_coverage(mut self, coverage: FaceCoverage<'a>) -> Self {
        self.coverage = coverage;
        self
    }
}

/// Collision handling for one ordered pair of shapes.
pub trait CollisionStrategy: Sync {
    /// Tests the bodies as if they were anchored at `p1` and `p2`.
    ///
    /// Must not mutate anything; it is called both with the staged positions
    /// and with hypothetical ones during separation searches.
    fn check(
        &self,
        b1: &RigidBody,
        p1: Vec3,
        b2: &RigidBody,
        p2: Vec3,
        env: &ContactEnv<'_>,
    ) -> Option<HitResult>;

    /// Moves `next_pos` of one or both bodies until they no longer overlap.
    fn separate(
        &self,
        b1: &mut RigidBody,
        b2: &mut RigidBody,
        hit: &HitResult,
        env: &ContactEnv<'_>,
    ) -> Result<(), PhysicsError>;

    /// Updates `next_speed` of both bodies for a resolved contact.
    fn bounce(&self, b1: &mut RigidBody, b2: &mut RigidBody, hit: &HitResult) {
        numerics::bounce(b1, b2, hit.hit_normal12);
    }
}
