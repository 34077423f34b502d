//! Sphere-cylinder collision detection and separation
//!
//! The sphere centre falls in one of three regions around the upright
//! cylinder: beside the mantle (`|dz| <= H`), above or below a cap
//! (`d <= R`), or diagonally off the rim. Only the rim region is ambiguous.

use crate::body::RigidBody;
use crate::collision::ambiguity::{self, ContactSide, PriorOverlap};
use crate::collision::{
    numerics, CollisionStrategy, ContactEnv, CylinderArea, HitArea, HitResult,
};
use crate::error::PhysicsError;
use crate::shapes::{Cylinder, Shape, Sphere};
use crate::types::{Vec2, Vec3};

#[derive(Copy, Clone, Debug, Default)]
pub struct SphereCylinder;

fn shapes(b1: &RigidBody, b2: &RigidBody) -> Result<(Sphere, Cylinder), PhysicsError> {
    match (b1.shape, b2.shape) {
        (Shape::Sphere(s), Shape::Cylinder(c)) => Ok((s, c)),
        (a, b) => Err(PhysicsError::Unimplemented(a.kind(), b.kind())),
    }
}

enum Region {
    Mantle,
    Cap,
    Rim,
}

/// Sphere and cylinder centres with the quantities every region test needs.
struct Layout {
    sphere_centre: Vec3,
    axis_centre: Vec3,
    r: f32,
    radius: f32,
    half_height: f32,
    dz: f32,
    horizontal: Vec2,
    d: f32,
}

impl Layout {
    fn new(sphere: Sphere, cylinder: Cylinder, cs: Vec3, cc: Vec3) -> Self {
        let horizontal = (cs - cc).truncate();
        Self {
            sphere_centre: cs,
            axis_centre: cc,
            r: sphere.radius,
            radius: cylinder.radius,
            half_height: cylinder.half_height(),
            dz: cs.z - cc.z,
            horizontal,
            d: horizontal.length(),
        }
    }

    fn region(&self) -> Region {
        if self.dz.abs() <= self.half_height {
            Region::Mantle
        } else if self.d <= self.radius {
            Region::Cap
        } else {
            Region::Rim
        }
    }

    fn above(&self) -> bool {
        self.dz > 0.0
    }

    fn cap_area(&self) -> CylinderArea {
        if self.above() {
            CylinderArea::Top
        } else {
            CylinderArea::Bottom
        }
    }

    fn cap_z(&self) -> f32 {
        self.axis_centre.z + self.half_height.copysign(self.dz)
    }

    /// Horizontal unit vector from the cylinder axis toward the sphere.
    fn outward(&self) -> Vec3 {
        (self.horizontal / self.d).extend(0.0)
    }

    fn rim_point(&self) -> Vec3 {
        let on_rim = self.axis_centre + self.outward() * self.radius;
        Vec3::new(on_rim.x, on_rim.y, self.cap_z())
    }

    fn overlaps(&self) -> bool {
        if self.dz.abs() >= self.half_height + self.r || self.d >= self.radius + self.r {
            return false;
        }
        match self.region() {
            Region::Mantle | Region::Cap => true,
            Region::Rim => self.sphere_centre.distance(self.rim_point()) < self.r,
        }
    }
}

impl SphereCylinder {
    fn layout(b1: &RigidBody, p1: Vec3, b2: &RigidBody, p2: Vec3) -> Option<Layout> {
        let (sphere, cylinder) = shapes(b1, b2).ok()?;
        Some(Layout::new(
            sphere,
            cylinder,
            b1.shape.centre(p1),
            b2.shape.centre(p2),
        ))
    }
}

impl CollisionStrategy for SphereCylinder {
    fn check(
        &self,
        b1: &RigidBody,
        p1: Vec3,
        b2: &RigidBody,
        p2: Vec3,
        env: &ContactEnv<'_>,
    ) -> Option<HitResult> {
        let layout = Self::layout(b1, p1, b2, p2)?;
        if !layout.overlaps() {
            return None;
        }
        let cs = layout.sphere_centre;

        let side = match layout.region() {
            Region::Mantle => ContactSide::Side,
            Region::Cap => ContactSide::Cap,
            Region::Rim => {
                let prior = Self::layout(b1, b1.pos, b2, b2.pos)?;
                ambiguity::classify(
                    PriorOverlap {
                        vertical: prior.dz.abs() < prior.half_height + prior.r,
                        horizontal: prior.d < prior.radius + prior.r,
                    },
                    b1.next_speed - b2.next_speed,
                    layout.above(),
                    env.config,
                )
            }
        };

        let hit = match side {
            ContactSide::Cap => {
                let hit_pt = match layout.region() {
                    Region::Rim => layout.rim_point(),
                    _ => Vec3::new(cs.x, cs.y, layout.cap_z()),
                };
                HitResult::new(
                    hit_pt,
                    Vec3::new(0.0, 0.0, -1.0_f32.copysign(layout.dz)),
                    HitArea::Unspecified,
                    HitArea::Cylinder(layout.cap_area()),
                )
            }
            ContactSide::Side => {
                let (outward, hit_pt) = if layout.d < env.config.degenerate_distance {
                    tracing::warn!(centre = %cs, "sphere centre on the cylinder axis, picking a random normal");
                    let outward = numerics::random_horizontal_unit();
                    (outward, layout.axis_centre + outward * layout.radius)
                } else if matches!(layout.region(), Region::Rim) {
                    (layout.outward(), layout.rim_point())
                } else {
                    let on_mantle = layout.axis_centre + layout.outward() * layout.radius;
                    (layout.outward(), Vec3::new(on_mantle.x, on_mantle.y, cs.z))
                };
                HitResult::new(
                    hit_pt,
                    -outward,
                    HitArea::Unspecified,
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
        let (sphere, cylinder) = shapes(b1, b2)?;
        let layout = Layout::new(sphere, cylinder, b1.next_centre(), b2.next_centre());
        if !layout.overlaps() {
            tracing::warn!(
                sphere = %layout.sphere_centre,
                cylinder = %layout.axis_centre,
                "sphere and cylinder already apart before separation"
            );
            return Ok(());
        }
        let config = env.config;
        let normal = hit.hit_normal12;

        let push = match layout.region() {
            Region::Mantle => layout.radius + layout.r - layout.d,
            Region::Cap => layout.half_height + layout.r - layout.dz.abs(),
            Region::Rim => {
                let w = layout.sphere_centre - hit.hit_pt;
                if let Some(t) = numerics::escape_distance(w, -normal, layout.r) {
                    t
                } else {
                    tracing::warn!(
                        offset = %w,
                        "degenerate rim separation, falling back to search"
                    );
                    let hint = layout.r + w.length() + config.separation_epsilon;
                    return numerics::separate_by_search(b1, b2, normal, hint, config, |a, pa, b, pb| {
                        self.check(a, pa, b, pb, env).is_some()
                    });
                }
            }
        };
        numerics::push_apart(b1, b2, normal, push + config.separation_epsilon, config)
    }
}
