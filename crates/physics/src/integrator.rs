//! # Physics Integration
//!
//! Force integration before the collision pass, the commit after it, and a
//! few whole-population measures used to sanity-check a frame.

use crate::body::RigidBody;
use crate::types::Vec3;

/// Stages `next_pos`/`next_speed` of every body from its accumulated force.
pub fn prepare_bodies<'a>(bodies: impl IntoIterator<Item = &'a mut RigidBody>, dt: f32, gravity: Vec3) {
    for body in bodies {
        body.prepare_next(dt, gravity);
    }
}

/// Publishes the staged state of every body.
pub fn commit_bodies<'a>(bodies: impl IntoIterator<Item = &'a mut RigidBody>) {
    for body in bodies {
        body.commit_move();
    }
}

/// Total staged momentum of the movable bodies.
pub fn momentum<'a>(bodies: impl IntoIterator<Item = &'a RigidBody>) -> Vec3 {
    bodies
        .into_iter()
        .filter(|body| !body.is_immovable())
        .map(|body| body.next_speed * body.mass)
        .sum()
}

/// Total staged kinetic energy of the movable bodies.
pub fn kinetic_energy<'a>(bodies: impl IntoIterator<Item = &'a RigidBody>) -> f32 {
    bodies
        .into_iter()
        .filter(|body| !body.is_immovable())
        .map(|body| 0.5 * body.mass * body.next_speed.length_squared())
        .sum()
}
