//! Collision dispatcher that routes a pair of bodies to its strategy
//!
//! Strategies are written for one ordered shape pair (sphere before
//! cylinder before box). The dispatch table maps every `(kind1, kind2)`
//! combination to a strategy and a flag telling whether the bodies have to
//! be swapped before calling it; results of swapped calls are swapped back,
//! so callers always see body 1's point of view.

use crate::body::RigidBody;
use crate::collision::{
    CollisionConfig, CollisionStrategy, ContactEnv, CylinderBox, CylinderCylinder, FaceCoverage,
    HitResult, SphereBox, SphereCylinder, SphereSphere,
};
use crate::error::PhysicsError;
use crate::shapes::ShapeKind;
use crate::terrain::Terrain;
use crate::types::{IVec3, Vec3};

/// A dispatch table entry.
#[derive(Copy, Clone)]
pub struct Route {
    strategy: &'static dyn CollisionStrategy,
    swapped: bool,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("swapped", &self.swapped)
            .finish_non_exhaustive()
    }
}

const N: usize = ShapeKind::COUNT;

static TABLE: [[Option<Route>; N]; N] = [
    // Sphere vs sphere, cylinder, box
    [
        Some(Route {
            strategy: &SphereSphere,
            swapped: false,
        }),
        Some(Route {
            strategy: &SphereCylinder,
            swapped: false,
        }),
        Some(Route {
            strategy: &SphereBox,
            swapped: false,
        }),
    ],
    // Cylinder vs sphere, cylinder, box
    [
        Some(Route {
            strategy: &SphereCylinder,
            swapped: true,
        }),
        Some(Route {
            strategy: &CylinderCylinder,
            swapped: false,
        }),
        Some(Route {
            strategy: &CylinderBox,
            swapped: false,
        }),
    ],
    // Box vs sphere, cylinder, box
    [
        Some(Route {
            strategy: &SphereBox,
            swapped: true,
        }),
        Some(Route {
            strategy: &CylinderBox,
            swapped: true,
        }),
        None,
    ],
];

/// Looks up the strategy for two shape kinds.
///
/// # Errors
///
/// [`PhysicsError::Unimplemented`] for pairs without a strategy (box-box).
pub fn route(kind1: ShapeKind, kind2: ShapeKind) -> Result<Route, PhysicsError> {
    TABLE[kind1.index()][kind2.index()].ok_or(PhysicsError::Unimplemented(kind1, kind2))
}

impl Route {
    #[must_use]
    pub const fn is_swapped(&self) -> bool {
        self.swapped
    }

    #[must_use]
    pub fn check(
        &self,
        b1: &RigidBody,
        p1: Vec3,
        b2: &RigidBody,
        p2: Vec3,
        env: &ContactEnv<'_>,
    ) -> Option<HitResult> {
        if self.swapped {
            self.strategy
                .check(b2, p2, b1, p1, env)
                .map(HitResult::swapped)
        } else {
            self.strategy.check(b1, p1, b2, p2, env)
        }
    }

    /// # Errors
    ///
    /// Whatever the strategy's separation reports.
    pub fn separate(
        &self,
        b1: &mut RigidBody,
        b2: &mut RigidBody,
        hit: &HitResult,
        env: &ContactEnv<'_>,
    ) -> Result<(), PhysicsError> {
        if self.swapped {
            self.strategy.separate(b2, b1, &hit.swapped(), env)
        } else {
            self.strategy.separate(b1, b2, hit, env)
        }
    }

    pub fn bounce(&self, b1: &mut RigidBody, b2: &mut RigidBody, hit: &HitResult) {
        if self.swapped {
            self.strategy.bounce(b2, b1, &hit.swapped());
        } else {
            self.strategy.bounce(b1, b2, hit);
        }
    }
}

/// Checks two bodies at arbitrary positions.
///
/// # Errors
///
/// [`PhysicsError::Unimplemented`] for pairs without a strategy.
pub fn check(
    b1: &RigidBody,
    p1: Vec3,
    b2: &RigidBody,
    p2: Vec3,
    env: &ContactEnv<'_>,
) -> Result<Option<HitResult>, PhysicsError> {
    Ok(route(b1.shape.kind(), b2.shape.kind())?.check(b1, p1, b2, p2, env))
}

/// Full narrow phase for two bodies at their staged positions: check,
/// separate, verify the separation and bounce.
///
/// Returns the contact from body 1's point of view, or `None` when the
/// bodies do not touch.
///
/// # Errors
///
/// Unimplemented pairs, failed separations, and a separation that leaves
/// the bodies overlapping.
pub fn resolve(
    b1: &mut RigidBody,
    b2: &mut RigidBody,
    env: &ContactEnv<'_>,
) -> Result<Option<HitResult>, PhysicsError> {
    let route = route(b1.shape.kind(), b2.shape.kind())?;
    let Some(hit) = route.check(b1, b1.next_pos, b2, b2.next_pos, env) else {
        return Ok(None);
    };
    route.separate(b1, b2, &hit, env)?;
    if route.check(b1, b1.next_pos, b2, b2.next_pos, env).is_some() {
        return Err(PhysicsError::StillOverlapping {
            shape1: b1.shape.kind(),
            pos1: b1.next_pos,
            shape2: b2.shape.kind(),
            pos2: b2.next_pos,
        });
    }
    route.bounce(b1, b2, &hit);
    Ok(Some(hit))
}

/// [`resolve`] against a solid terrain cell, synthesized as an immovable
/// unit box that lives for this call only. `None` when the cell is empty or
/// not touched.
///
/// # Errors
///
/// As [`resolve`].
pub fn resolve_terrain(
    body: &mut RigidBody,
    terrain: &dyn Terrain,
    cell: IVec3,
    config: &CollisionConfig,
) -> Result<Option<HitResult>, PhysicsError> {
    let Some(material) = terrain.cell(cell) else {
        return Ok(None);
    };
    let mut cell_body = RigidBody::terrain_cell(cell, material);
    let env = ContactEnv::new(config).with_coverage(FaceCoverage::Terrain { terrain, cell });
    resolve(body, &mut cell_body, &env)
}
