//! # Collision Numerics
//!
//! Shape-agnostic math shared by the strategies: distributing a separation
//! push between two bodies, searching for a minimal separation along a known
//! normal, and the friction and restitution impulses of a bounce.
//!
//! All functions take the contact normal `normal12`, pointing from body 1
//! toward body 2. Body 1 is pushed along `-normal12`, body 2 along
//! `normal12`.

use std::f32::consts::TAU;

use crate::body::RigidBody;
use crate::collision::CollisionConfig;
use crate::error::PhysicsError;
use crate::types::{Vec2, Vec3};

/// Fractions of a push (or of a velocity exchange) taken by each body.
///
/// Each body takes a share proportional to the *other* body's mass; an
/// immovable body takes nothing. `None` when both bodies are immovable.
#[must_use]
pub fn mass_shares(b1: &RigidBody, b2: &RigidBody) -> Option<(f32, f32)> {
    match (b1.is_immovable(), b2.is_immovable()) {
        (true, true) => None,
        (true, false) => Some((0.0, 1.0)),
        (false, true) => Some((1.0, 0.0)),
        (false, false) => {
            let total = b1.mass + b2.mass;
            Some((b2.mass / total, b1.mass / total))
        }
    }
}

/// Pushes the staged positions apart by a total of `distance` along
/// `normal12`.
///
/// Fails without touching either body if the push breaks the absolute bound
/// or the bodies' combined bounding reach.
pub fn push_apart(
    b1: &mut RigidBody,
    b2: &mut RigidBody,
    normal12: Vec3,
    distance: f32,
    config: &CollisionConfig,
) -> Result<(), PhysicsError> {
    let Some((s1, s2)) = mass_shares(b1, b2) else {
        tracing::warn!(
            pos1 = %b1.next_pos,
            pos2 = %b2.next_pos,
            "cannot separate two immovable bodies"
        );
        return Ok(());
    };

    let reach = b1.bounding_radius() + b2.bounding_radius() + config.separation_tolerance;
    if distance > reach {
        return Err(PhysicsError::ExcessiveRelativeDisplacement {
            shape1: b1.shape.kind(),
            shape2: b2.shape.kind(),
            distance,
            limit: reach,
        });
    }
    for (body, share) in [(&*b1, s1), (&*b2, s2)] {
        let moved = distance * share;
        if moved > config.max_push_distance {
            return Err(PhysicsError::ExcessivePush {
                shape: body.shape.kind(),
                pos: body.next_pos,
                distance: moved,
                limit: config.max_push_distance,
            });
        }
    }

    b1.next_pos -= normal12 * (distance * s1);
    b2.next_pos += normal12 * (distance * s2);
    Ok(())
}

/// Finds a near-minimal push along `normal12` that makes `collides` report
/// false, then applies it.
///
/// `hint` is a first guess for a clear push distance; it is doubled a bounded
/// number of times if it still collides. The bracket between the colliding
/// and the clear push is then bisected down to the configured tolerance and
/// the clear end is applied.
pub fn separate_by_search<F>(
    b1: &mut RigidBody,
    b2: &mut RigidBody,
    normal12: Vec3,
    hint: f32,
    config: &CollisionConfig,
    collides: F,
) -> Result<(), PhysicsError>
where
    F: Fn(&RigidBody, Vec3, &RigidBody, Vec3) -> bool,
{
    let Some((s1, s2)) = mass_shares(b1, b2) else {
        tracing::warn!(
            pos1 = %b1.next_pos,
            pos2 = %b2.next_pos,
            "cannot separate two immovable bodies"
        );
        return Ok(());
    };

    let start1 = b1.next_pos;
    let start2 = b2.next_pos;
    let hits_at = |t: f32| {
        collides(
            &*b1,
            start1 - normal12 * (t * s1),
            &*b2,
            start2 + normal12 * (t * s2),
        )
    };

    if !hits_at(0.0) {
        tracing::warn!(
            pos1 = %start1,
            pos2 = %start2,
            "separation requested for bodies that do not overlap"
        );
        return Ok(());
    }

    let mut back = hint.max(config.separation_tolerance);
    let mut attempts = 0;
    while hits_at(back) {
        attempts += 1;
        if attempts > config.search_retries {
            return Err(PhysicsError::SeparationFailed {
                shape1: b1.shape.kind(),
                shape2: b2.shape.kind(),
                normal: normal12,
                pushed: back,
            });
        }
        back *= 2.0;
    }

    let mut forward = 0.0;
    while back - forward > config.separation_tolerance {
        let mid = 0.5 * (forward + back);
        if hits_at(mid) {
            forward = mid;
        } else {
            back = mid;
        }
    }

    push_apart(b1, b2, normal12, back, config)
}

/// Smallest `t >= 0` such that `|w + t·m| = r` for a unit direction `m`.
///
/// Used to move a sphere centre, offset `w` from a fixed edge or rim point,
/// out to exactly its radius. `None` on a degenerate quadratic.
#[must_use]
pub fn escape_distance(w: Vec3, m: Vec3, r: f32) -> Option<f32> {
    let b = w.dot(m);
    let c = w.length_squared() - r * r;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = -b + discriminant.sqrt();
    (t.is_finite() && t >= 0.0).then_some(t)
}

/// Combined friction coefficient of two surfaces.
#[must_use]
pub fn combined_friction(f1: f32, f2: f32) -> f32 {
    (1.0 - (1.0 - f1) * (1.0 - f2)).clamp(0.0, 1.0)
}

/// Damps the relative tangential velocity of the two bodies.
///
/// The removed relative velocity is split by mass so that momentum is kept;
/// since the combined coefficient never exceeds one, friction can stop the
/// relative sliding but never reverse it.
pub fn apply_friction(b1: &mut RigidBody, b2: &mut RigidBody, normal12: Vec3) {
    let Some((s1, s2)) = mass_shares(b1, b2) else {
        return;
    };
    let f = combined_friction(b1.friction, b2.friction);
    if f <= 0.0 {
        return;
    }

    let t1 = b1.next_speed - normal12 * b1.next_speed.dot(normal12);
    let t2 = b2.next_speed - normal12 * b2.next_speed.dot(normal12);
    let removed = (t1 - t2) * f;

    b1.next_speed -= removed * s1;
    b2.next_speed += removed * s2;
}

/// Exchanges momentum along `normal12` for approaching bodies, with
/// restitution `elasticity1 * elasticity2`.
pub fn bounce_elastic(b1: &mut RigidBody, b2: &mut RigidBody, normal12: Vec3) {
    let Some((s1, s2)) = mass_shares(b1, b2) else {
        return;
    };
    let approach = b1.next_speed.dot(normal12) - b2.next_speed.dot(normal12);
    if approach <= 0.0 {
        return;
    }
    let impulse = (1.0 + b1.elasticity * b2.elasticity) * approach;

    b1.next_speed -= normal12 * (impulse * s1);
    b2.next_speed += normal12 * (impulse * s2);
}

/// [`bounce_elastic`] for a contact normal with no vertical component; the
/// vertical speeds are left untouched.
pub fn bounce_elastic_horizontal(b1: &mut RigidBody, b2: &mut RigidBody, normal12: Vec2) {
    let Some((s1, s2)) = mass_shares(b1, b2) else {
        return;
    };
    let approach = b1.next_speed.truncate().dot(normal12) - b2.next_speed.truncate().dot(normal12);
    if approach <= 0.0 {
        return;
    }
    let impulse = normal12 * ((1.0 + b1.elasticity * b2.elasticity) * approach);

    b1.next_speed -= (impulse * s1).extend(0.0);
    b2.next_speed += (impulse * s2).extend(0.0);
}

/// Friction on the tangential component, then restitution on the normal one.
pub fn bounce(b1: &mut RigidBody, b2: &mut RigidBody, normal12: Vec3) {
    apply_friction(b1, b2, normal12);
    if normal12.z == 0.0 {
        bounce_elastic_horizontal(b1, b2, normal12.truncate());
    } else {
        bounce_elastic(b1, b2, normal12);
    }
}

/// Pseudo-random unit vector, for contacts whose normal is undefined.
#[must_use]
pub fn random_unit_vector() -> Vec3 {
    let z = 2.0 * fastrand::f32() - 1.0;
    let (sin, cos) = (TAU * fastrand::f32()).sin_cos();
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * cos, r * sin, z)
}

/// Pseudo-random horizontal unit vector.
#[must_use]
pub fn random_horizontal_unit() -> Vec3 {
    let (sin, cos) = (TAU * fastrand::f32()).sin_cos();
    Vec3::new(cos, sin, 0.0)
}
