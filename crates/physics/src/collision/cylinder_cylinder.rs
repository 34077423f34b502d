//! Cylinder-cylinder collision detection and separation

use crate::body::RigidBody;
use crate::collision::ambiguity::{self, ContactSide, PriorOverlap};
use crate::collision::{
    numerics, CollisionStrategy, ContactEnv, CylinderArea, HitArea, HitResult,
};
use crate::error::PhysicsError;
use crate::shapes::{Cylinder, Shape};
use crate::types::Vec3;

#[derive(Copy, Clone, Debug, Default)]
pub struct CylinderCylinder;

fn cylinders(b1: &RigidBody, b2: &RigidBody) -> Result<(Cylinder, Cylinder), PhysicsError> {
    match (b1.shape, b2.shape) {
        (Shape::Cylinder(c1), Shape::Cylinder(c2)) => Ok((c1, c2)),
        (a, b) => Err(PhysicsError::Unimplemented(a.kind(), b.kind())),
    }
}

/// Vertical and horizontal overlap depths; both positive when the
/// cylinders intersect.
fn overlaps(c1: Cylinder, centre1: Vec3, c2: Cylinder, centre2: Vec3) -> (f32, f32) {
    let vertical = c1.half_height() + c2.half_height() - (centre1.z - centre2.z).abs();
    let horizontal = c1.radius + c2.radius - centre1.truncate().distance(centre2.truncate());
    (vertical, horizontal)
}

impl CollisionStrategy for CylinderCylinder {
    fn check(
        &self,
        b1: &RigidBody,
        p1: Vec3,
        b2: &RigidBody,
        p2: Vec3,
        env: &ContactEnv<'_>,
    ) -> Option<HitResult> {
        let (c1, c2) = cylinders(b1, b2).ok()?;
        let centre1 = b1.shape.centre(p1);
        let centre2 = b2.shape.centre(p2);
        let (vertical, horizontal) = overlaps(c1, centre1, c2, centre2);
        if vertical <= 0.0 || horizontal <= 0.0 {
            return None;
        }

        let dz = centre1.z - centre2.z;
        let offset = (centre2 - centre1).truncate();
        let d = offset.length();
        let coaxial = d < env.config.degenerate_distance;

        let side = if coaxial && dz == 0.0 {
            tracing::warn!(centre = %centre1, "coincident cylinder centres, picking a random normal");
            ContactSide::Side
        } else if coaxial {
            ContactSide::Cap
        } else if dz == 0.0 {
            ContactSide::Side
        } else {
            let (prior_vertical, prior_horizontal) =
                overlaps(c1, b1.shape.centre(b1.pos), c2, b2.shape.centre(b2.pos));
            ambiguity::classify(
                PriorOverlap {
                    vertical: prior_vertical > 0.0,
                    horizontal: prior_horizontal > 0.0,
                },
                b1.next_speed - b2.next_speed,
                dz > 0.0,
                env.config,
            )
        };

        let hit = match side {
            ContactSide::Cap => {
                let (normal, z, area1, area2) = if dz > 0.0 {
                    (
                        Vec3::NEG_Z,
                        centre1.z - c1.half_height(),
                        CylinderArea::Bottom,
                        CylinderArea::Top,
                    )
                } else {
                    (
                        Vec3::Z,
                        centre1.z + c1.half_height(),
                        CylinderArea::Top,
                        CylinderArea::Bottom,
                    )
                };
                let mid = 0.5 * (centre1.truncate() + centre2.truncate());
                HitResult::new(
                    mid.extend(z),
                    normal,
                    HitArea::Cylinder(area1),
                    HitArea::Cylinder(area2),
                )
            }
            ContactSide::Side => {
                let direction = if coaxial {
                    numerics::random_horizontal_unit()
                } else {
                    (offset / d).extend(0.0)
                };
                let z_lo = (centre1.z - c1.half_height()).max(centre2.z - c2.half_height());
                let z_hi = (centre1.z + c1.half_height()).min(centre2.z + c2.half_height());
                let on_mantle = centre1 + direction * (c1.radius - 0.5 * horizontal);
                HitResult::new(
                    Vec3::new(on_mantle.x, on_mantle.y, 0.5 * (z_lo + z_hi)),
                    direction,
                    HitArea::Cylinder(CylinderArea::Side),
                    HitArea::Cylinder(CylinderArea::Side),
                )
            }
        };
        Some(hit)
    }

    fn separate(
        &self,
        b1: &mut RigidBody,
        b2: &mut RigidBody,
        hit: &HitResult,
        env: &ContactEnv<'_>,
    ) -> Result<(), PhysicsError> {
        let (c1, c2) = cylinders(b1, b2)?;
        let (vertical, horizontal) = overlaps(c1, b1.next_centre(), c2, b2.next_centre());
        if vertical <= 0.0 || horizontal <= 0.0 {
            tracing::warn!(
                pos1 = %b1.next_pos,
                pos2 = %b2.next_pos,
                "cylinders already apart before separation"
            );
            return Ok(());
        }
        let push = if hit.hit_normal12.z == 0.0 {
            horizontal
        } else {
            vertical
        };
        numerics::push_apart(
            b1,
            b2,
            hit.hit_normal12,
            push + env.config.separation_epsilon,
            env.config,
        )
    }
}
