//! Sphere-sphere collision detection and separation

use crate::body::RigidBody;
use crate::collision::{numerics, CollisionStrategy, ContactEnv, HitArea, HitResult};
use crate::error::PhysicsError;
use crate::shapes::{Shape, Sphere};
use crate::types::Vec3;

#[derive(Copy, Clone, Debug, Default)]
pub struct SphereSphere;

fn spheres(b1: &RigidBody, b2: &RigidBody) -> Result<(Sphere, Sphere), PhysicsError> {
    match (b1.shape, b2.shape) {
        (Shape::Sphere(s1), Shape::Sphere(s2)) => Ok((s1, s2)),
        (a, b) => Err(PhysicsError::Unimplemented(a.kind(), b.kind())),
    }
}

impl CollisionStrategy for SphereSphere {
    fn check(
        &self,
        b1: &RigidBody,
        p1: Vec3,
        b2: &RigidBody,
        p2: Vec3,
        env: &ContactEnv<'_>,
    ) -> Option<HitResult> {
        let (s1, s2) = spheres(b1, b2).ok()?;
        let c1 = b1.shape.centre(p1);
        let c2 = b2.shape.centre(p2);
        let offset = c2 - c1;
        let distance = offset.length();
        let reach = s1.radius + s2.radius;
        if distance >= reach {
            return None;
        }

        let normal = if distance < env.config.degenerate_distance {
            tracing::warn!(centre = %c1, "coincident sphere centres, picking a random normal");
            numerics::random_unit_vector()
        } else {
            offset / distance
        };
        // Weighted by radius: equal spheres touch halfway between centres.
        let hit_pt = c1 + offset * (s1.radius / reach);
        Some(HitResult::new(
            hit_pt,
            normal,
            HitArea::Unspecified,
            HitArea::Unspecified,
        ))
    }

    fn separate(
        &self,
        b1: &mut RigidBody,
        b2: &mut RigidBody,
        hit: &HitResult,
        env: &ContactEnv<'_>,
    ) -> Result<(), PhysicsError> {
        let (s1, s2) = spheres(b1, b2)?;
        let distance = b1.next_centre().distance(b2.next_centre());
        let overlap = s1.radius + s2.radius - distance;
        if overlap <= 0.0 {
            tracing::warn!(distance, "spheres already apart before separation");
            return Ok(());
        }
        numerics::push_apart(
            b1,
            b2,
            hit.hit_normal12,
            overlap + env.config.separation_epsilon,
            env.config,
        )
    }
}
