use thiserror::Error;

use crate::shapes::ShapeKind;
use crate::types::Vec3;

/// Invariant violations raised while resolving a single contact.
///
/// These never abort a frame: the orchestrator catches them per pair and
/// excises the entities involved.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("{shape:?} body at {pos} was pushed {distance:.4}, more than the absolute bound {limit:.4}")]
    ExcessivePush {
        shape: ShapeKind,
        pos: Vec3,
        distance: f32,
        limit: f32,
    },
    #[error("{shape1:?} and {shape2:?} were displaced {distance:.4} relative to each other, more than their bounding reach {limit:.4}")]
    ExcessiveRelativeDisplacement {
        shape1: ShapeKind,
        shape2: ShapeKind,
        distance: f32,
        limit: f32,
    },
    #[error("{shape1:?} at {pos1} and {shape2:?} at {pos2} still overlap after separation")]
    StillOverlapping {
        shape1: ShapeKind,
        pos1: Vec3,
        shape2: ShapeKind,
        pos2: Vec3,
    },
    #[error("no clear position found for {shape1:?} and {shape2:?} after pushing {pushed:.4} along {normal}")]
    SeparationFailed {
        shape1: ShapeKind,
        shape2: ShapeKind,
        normal: Vec3,
        pushed: f32,
    },
    #[error("collision between {0:?} and {1:?} is not implemented")]
    Unimplemented(ShapeKind, ShapeKind),
}

impl PhysicsError {
    /// True for errors that describe a missing capability rather than bad
    /// runtime data.
    #[must_use]
    pub const fn is_unimplemented(&self) -> bool {
        matches!(self, Self::Unimplemented(..))
    }
}
