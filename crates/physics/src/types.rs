pub use glam::{IVec3, Vec2, Vec3};

use serde::{Deserialize, Serialize};

use crate::collision::CollisionConfig;

/// Mass at or above which a body is treated as immovable.
pub const LARGE_MASS: f32 = 1.0e9;

/// Smallest mass a body can be given; keeps force integration and mass
/// shares finite.
pub const MIN_MASS: f32 = 1.0e-6;

/// Standard gravitational acceleration, pointing down the Z axis.
pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, 0.0, -9.81);

/// Stable identifier of an entity inside a [`crate::PhysicsSim`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Global simulation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysParams {
    pub gravity: Vec3,
    pub collision: CollisionConfig,
}

impl Default for PhysParams {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            collision: CollisionConfig::default(),
        }
    }
}
