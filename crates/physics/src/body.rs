//! # Rigid Bodies
//!
//! A [`RigidBody`] carries two copies of its kinematic state: the committed
//! `pos`/`speed` of the last frame and the staged `next_pos`/`next_speed` for
//! the frame being simulated. Force integration writes the staged copy once
//! per frame, collision resolution is the only thing allowed to adjust it
//! afterwards, and [`RigidBody::commit_move`] publishes it at the end of the
//! frame.

use crate::shapes::{AaBox, Shape};
use crate::terrain::CellMaterial;
use crate::types::{IVec3, Vec3, LARGE_MASS, MIN_MASS};

#[derive(Clone, Debug, PartialEq)]
pub struct RigidBody {
    pub pos: Vec3,
    pub next_pos: Vec3,
    pub speed: Vec3,
    pub next_speed: Vec3,
    /// Force accumulated since the last [`RigidBody::prepare_next`].
    pub force: Vec3,
    pub mass: f32,
    pub elasticity: f32,
    pub friction: f32,
    pub gravity: bool,
    pub shape: Shape,
}

impl RigidBody {
    /// A movable body with default materials. Masses below [`MIN_MASS`],
    /// including zero, negative and NaN, are raised to it.
    #[must_use]
    pub fn new(shape: impl Into<Shape>, mass: f32) -> Self {
        Self {
            pos: Vec3::ZERO,
            next_pos: Vec3::ZERO,
            speed: Vec3::ZERO,
            next_speed: Vec3::ZERO,
            force: Vec3::ZERO,
            mass: mass.max(MIN_MASS),
            elasticity: 0.5,
            friction: 0.5,
            gravity: true,
            shape: shape.into(),
        }
    }

    /// An immovable body that ignores gravity.
    #[must_use]
    pub fn fixed(shape: impl Into<Shape>) -> Self {
        Self::new(shape, LARGE_MASS).with_gravity(false)
    }

    /// Transient body standing in for an occupied terrain cell.
    #[must_use]
    pub fn terrain_cell(cell: IVec3, material: CellMaterial) -> Self {
        Self::fixed(AaBox::cube(1.0))
            .at(cell.as_vec3() + Vec3::splat(0.5))
            .with_elasticity(material.elasticity)
            .with_friction(material.friction)
    }

    /// Places the body at `pos`, both committed and staged.
    #[must_use]
    pub fn at(mut self, pos: Vec3) -> Self {
        self.pos = pos;
        self.next_pos = pos;
        self
    }

    /// Gives the body an initial speed, both committed and staged.
    #[must_use]
    pub fn moving(mut self, speed: Vec3) -> Self {
        self.speed = speed;
        self.next_speed = speed;
        self
    }

    #[must_use]
    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = elasticity.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_gravity(mut self, gravity: bool) -> Self {
        self.gravity = gravity;
        self
    }

    #[must_use]
    pub fn is_immovable(&self) -> bool {
        self.mass >= LARGE_MASS
    }

    pub fn apply_force(&mut self, force: Vec3) {
        self.force += force;
    }

    /// Derives the staged state from the committed state and the forces
    /// accumulated this frame, then resets the accumulator.
    pub fn prepare_next(&mut self, dt: f32, gravity: Vec3) {
        if self.is_immovable() {
            self.next_speed = self.speed;
        } else {
            let mut acceleration = self.force / self.mass;
            if self.gravity {
                acceleration += gravity;
            }
            self.next_speed = self.speed + acceleration * dt;
        }
        self.next_pos = self.pos + self.next_speed * dt;
        self.force = Vec3::ZERO;
    }

    /// Publishes the staged state as the committed state.
    pub fn commit_move(&mut self) {
        self.pos = self.next_pos;
        self.speed = self.next_speed;
    }

    /// Geometric centre at the committed position.
    #[must_use]
    pub fn centre(&self) -> Vec3 {
        self.shape.centre(self.pos)
    }

    /// Geometric centre at the staged position.
    #[must_use]
    pub fn next_centre(&self) -> Vec3 {
        self.shape.centre(self.next_pos)
    }

    #[must_use]
    pub fn bounding_radius(&self) -> f32 {
        self.shape.bounding_radius()
    }
}
