//! Sphere-box collision detection and separation

use crate::body::RigidBody;
use crate::collision::box_face::{check_against_box, staged_resolution, HitQuality};
use crate::collision::{numerics, CollisionStrategy, ContactEnv, HitResult};
use crate::error::PhysicsError;
use crate::types::Vec3;

#[derive(Copy, Clone, Debug, Default)]
pub struct SphereBox;

impl CollisionStrategy for SphereBox {
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

    /// Face hits are cleared in closed form. Edge and corner hits move the
    /// centre along the face normal until it is one radius from the clamped
    /// point, which stays the closest box point along that path.
    fn separate(
        &self,
        b1: &mut RigidBody,
        b2: &mut RigidBody,
        _hit: &HitResult,
        env: &ContactEnv<'_>,
    ) -> Result<(), PhysicsError> {
        let Some((query, res)) = staged_resolution(b1, b2, env)? else {
            return Ok(());
        };
        let config = env.config;
        let outward = res.face.normal();
        let normal12 = -outward;

        let push = if res.quality == HitQuality::Edge && res.clamped {
            let w = query.probe.centre() - res.point;
            if let Some(t) = numerics::escape_distance(w, outward, query.probe.radius()) {
                t
            } else {
                tracing::warn!(
                    offset = %w,
                    face = ?res.face,
                    "degenerate edge separation, falling back to search"
                );
                return numerics::separate_by_search(
                    b1,
                    b2,
                    normal12,
                    res.clearance + config.separation_epsilon,
                    config,
                    |a, pa, b, pb| self.check(a, pa, b, pb, env).is_some(),
                );
            }
        } else {
            res.clearance
        };
        numerics::push_apart(b1, b2, normal12, push + config.separation_epsilon, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{BoxFace, CollisionConfig, HitArea};
    use crate::shapes::{AaBox, Sphere};

    fn crate_box() -> RigidBody {
        RigidBody::fixed(AaBox::cube(1.0))
    }

    #[test]
    fn falling_sphere_lands_on_top() {
        let config = CollisionConfig::default();
        let env = ContactEnv::new(&config);
        let mut ball = RigidBody::new(Sphere::new(0.5), 1.0)
            .at(Vec3::new(0.0, 0.0, 1.0))
            .moving(Vec3::new(0.0, 0.0, -3.0));
        ball.next_pos = Vec3::new(0.0, 0.0, 0.95);
        let mut target = crate_box();

        let hit = SphereBox
            .check(&ball, ball.next_pos, &target, target.next_pos, &env)
            .unwrap();
        assert_eq!(hit.area2, HitArea::Box(BoxFace::Top));
        assert_eq!(hit.area1, HitArea::Unspecified);
        assert!((hit.hit_normal12 - Vec3::NEG_Z).length() < 1e-6);

        SphereBox.separate(&mut ball, &mut target, &hit, &env).unwrap();
        assert!((ball.next_pos.z - 1.0 - config.separation_epsilon).abs() < 1e-5);
        assert!(SphereBox
            .check(&ball, ball.next_pos, &target, target.next_pos, &env)
            .is_none());
    }

    #[test]
    fn corner_hit_separates_to_the_radius() {
        let config = CollisionConfig::default();
        let env = ContactEnv::new(&config);
        let mut ball = RigidBody::new(Sphere::new(0.5), 1.0)
            .at(Vec3::new(0.7, 0.7, 0.7))
            .moving(Vec3::new(-1.0, -1.0, -1.0));
        let mut target = crate_box();
        let hit = SphereBox
            .check(&ball, ball.next_pos, &target, target.next_pos, &env)
            .unwrap();
        SphereBox.separate(&mut ball, &mut target, &hit, &env).unwrap();

        let corner = Vec3::splat(0.5);
        let gap = ball.next_pos.distance(corner) - 0.5;
        assert!(gap >= 0.0 && gap < 1e-3);
        assert_eq!(target.next_pos, Vec3::ZERO);
    }
}
