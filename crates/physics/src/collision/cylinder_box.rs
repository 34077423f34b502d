//! Cylinder-box collision detection and separation

use crate::body::RigidBody;
use crate::collision::box_face::{check_against_box, staged_resolution, HitQuality};
use crate::collision::{numerics, CollisionStrategy, ContactEnv, HitResult};
use crate::error::PhysicsError;
use crate::types::Vec3;

#[derive(Copy, Clone, Debug, Default)]
pub struct CylinderBox;

impl CollisionStrategy for CylinderBox {
    fn check(
        &self,
        b1: &RigidBody,
        p1: Vec3,
        b2: &RigidBody,
        p2: Vec3,
        env: &ContactEnv<'_>,
    ) -> Option<HitResult> {
        check_against_box(b1, p1, b2, p2, env)
    }

    fn separate(
        &self,
        b1: &mut RigidBody,
        b2: &mut RigidBody,
        _hit: &HitResult,
        env: &ContactEnv<'_>,
    ) -> Result<(), PhysicsError> {
        let Some((_, res)) = staged_resolution(b1, b2, env)? else {
            return Ok(());
        };
        let config = env.config;
        let normal12 = -res.face.normal();
        let clear = res.clearance + config.separation_epsilon;

        if res.quality == HitQuality::Edge {
            // Pushing by the clearance always works; search for less.
            return numerics::separate_by_search(b1, b2, normal12, clear, config, |a, pa, b, pb| {
                self.check(a, pa, b, pb, env).is_some()
            });
        }
        numerics::push_apart(b1, b2, normal12, clear, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{BoxFace, CollisionConfig, CylinderArea, HitArea};
    use crate::shapes::{AaBox, Cylinder};

    fn barrel(pos: Vec3, speed: Vec3) -> RigidBody {
        RigidBody::new(Cylinder::new(0.4, 1.0), 1.0)
            .at(pos)
            .moving(speed)
    }

    #[test]
    fn standing_on_a_box_is_a_bottom_contact() {
        let config = CollisionConfig::default();
        let env = ContactEnv::new(&config);
        let can = barrel(Vec3::new(0.1, -0.2, 0.98), Vec3::new(0.0, 0.0, -1.0));
        let target = RigidBody::fixed(AaBox::cube(1.0));
        let hit = CylinderBox
            .check(&can, can.pos, &target, target.pos, &env)
            .unwrap();
        assert_eq!(hit.area1, HitArea::Cylinder(CylinderArea::Bottom));
        assert_eq!(hit.area2, HitArea::Box(BoxFace::Top));
    }

    #[test]
    fn landing_over_an_edge_is_a_bottom_contact() {
        let config = CollisionConfig::default();
        let env = ContactEnv::new(&config);
        // Centre past the +X edge, dropping straight down onto the top.
        let mut can = barrel(Vec3::new(0.7, 0.0, 1.05), Vec3::new(0.0, 0.0, -3.0));
        can.next_pos = Vec3::new(0.7, 0.0, 0.95);
        let mut target = RigidBody::fixed(AaBox::cube(1.0));

        let hit = CylinderBox
            .check(&can, can.next_pos, &target, target.next_pos, &env)
            .unwrap();
        assert_eq!(hit.area1, HitArea::Cylinder(CylinderArea::Bottom));
        assert_eq!(hit.area2, HitArea::Box(BoxFace::Top));
        assert_eq!(hit.hit_normal12, Vec3::NEG_Z);

        CylinderBox.separate(&mut can, &mut target, &hit, &env).unwrap();
        assert_eq!(can.next_pos.x, 0.7);
        assert_eq!(can.next_pos.y, 0.0);
        assert!(can.next_pos.z >= 1.0);
    }

    #[test]
    fn grazing_a_corner_is_a_side_contact() {
        let config = CollisionConfig::default();
        let env = ContactEnv::new(&config);
        let mut can = barrel(Vec3::new(0.75, 0.75, 0.9), Vec3::new(-3.0, 0.0, -0.0001));
        let mut target = RigidBody::fixed(AaBox::cube(1.0));

        let hit = CylinderBox
            .check(&can, can.next_pos, &target, target.next_pos, &env)
            .unwrap();
        assert_eq!(hit.area1, HitArea::Cylinder(CylinderArea::Side));
        assert_eq!(hit.hit_normal12.z, 0.0);

        CylinderBox.separate(&mut can, &mut target, &hit, &env).unwrap();
        assert!(CylinderBox
            .check(&can, can.next_pos, &target, target.next_pos, &env)
            .is_none());
        // Bisection keeps the push close to the minimal one.
        let minimal = 0.5 + (0.4_f32 * 0.4 - 0.25 * 0.25).sqrt();
        assert!(can.next_pos.x >= minimal - 1e-4);
        assert!(can.next_pos.x <= minimal + config.separation_tolerance + 1e-4);
    }
}
