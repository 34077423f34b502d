//! Immutable geometric parameters of a body.
//!
//! Shapes never rotate: cylinders stand upright along Z and boxes keep their
//! faces aligned with the world axes.

use serde::{Deserialize, Serialize};

use crate::types::Vec3;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub radius: f32,
    /// Offset from the body's anchor position to the sphere centre along Z.
    pub vertical_offset: f32,
}

impl Sphere {
    #[must_use]
    pub const fn new(radius: f32) -> Self {
        Self {
            radius,
            vertical_offset: 0.0,
        }
    }

    #[must_use]
    pub const fn with_offset(radius: f32, vertical_offset: f32) -> Self {
        Self {
            radius,
            vertical_offset,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    pub radius: f32,
    pub height: f32,
    pub vertical_offset: f32,
}

impl Cylinder {
    #[must_use]
    pub const fn new(radius: f32, height: f32) -> Self {
        Self {
            radius,
            height,
            vertical_offset: 0.0,
        }
    }

    #[must_use]
    pub const fn with_offset(radius: f32, height: f32, vertical_offset: f32) -> Self {
        Self {
            radius,
            height,
            vertical_offset,
        }
    }

    #[must_use]
    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }
}

/// Axis-aligned box. The body position is the box centre.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AaBox {
    pub size: Vec3,
}

impl AaBox {
    #[must_use]
    pub const fn new(size_x: f32, size_y: f32, size_z: f32) -> Self {
        Self {
            size: Vec3::new(size_x, size_y, size_z),
        }
    }

    #[must_use]
    pub const fn cube(side: f32) -> Self {
        Self::new(side, side, side)
    }

    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        self.size * 0.5
    }
}

/// Discriminant used to index the collision dispatch table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Sphere,
    Cylinder,
    AaBox,
}

impl ShapeKind {
    pub(crate) const COUNT: usize = 3;

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Sphere => 0,
            Self::Cylinder => 1,
            Self::AaBox => 2,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Sphere(Sphere),
    Cylinder(Cylinder),
    AaBox(AaBox),
}

impl Shape {
    #[must_use]
    pub const fn kind(&self) -> ShapeKind {
        match self {
            Self::Sphere(_) => ShapeKind::Sphere,
            Self::Cylinder(_) => ShapeKind::Cylinder,
            Self::AaBox(_) => ShapeKind::AaBox,
        }
    }

    #[must_use]
    pub const fn vertical_offset(&self) -> f32 {
        match self {
            Self::Sphere(s) => s.vertical_offset,
            Self::Cylinder(c) => c.vertical_offset,
            Self::AaBox(_) => 0.0,
        }
    }

    /// Geometric centre for a body anchored at `pos`.
    #[must_use]
    pub fn centre(&self, pos: Vec3) -> Vec3 {
        pos + Vec3::Z * self.vertical_offset()
    }

    /// Radius of the smallest sphere around the geometric centre that
    /// contains the shape.
    #[must_use]
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Self::Sphere(s) => s.radius,
            Self::Cylinder(c) => c.radius.hypot(c.half_height()),
            Self::AaBox(b) => b.half_extents().length(),
        }
    }

    /// Half extents of the axis-aligned bounding box around the centre.
    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        match self {
            Self::Sphere(s) => Vec3::splat(s.radius),
            Self::Cylinder(c) => Vec3::new(c.radius, c.radius, c.half_height()),
            Self::AaBox(b) => b.half_extents(),
        }
    }
}

impl From<Sphere> for Shape {
    fn from(s: Sphere) -> Self {
        Self::Sphere(s)
    }
}

impl From<Cylinder> for Shape {
    fn from(c: Cylinder) -> Self {
        Self::Cylinder(c)
    }
}

impl From<AaBox> for Shape {
    fn from(b: AaBox) -> Self {
        Self::AaBox(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_half_extents_follow_its_size() {
        let shape = Shape::from(AaBox::new(2.0, 1.0, 0.5));
        assert_eq!(shape.half_extents(), Vec3::new(1.0, 0.5, 0.25));
        assert!((shape.bounding_radius() - 1.3125_f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn centre_applies_vertical_offset() {
        let shape = Shape::from(Sphere::with_offset(0.3, 1.2));
        let c = shape.centre(Vec3::new(1.0, 2.0, 3.0));
        assert!((c - Vec3::new(1.0, 2.0, 4.2)).length() < 1e-6);
    }

    #[test]
    fn cylinder_bounding_radius_covers_rim() {
        let shape = Shape::from(Cylinder::new(0.3, 0.8));
        assert!((shape.bounding_radius() - 0.5).abs() < 1e-6);
    }
}
