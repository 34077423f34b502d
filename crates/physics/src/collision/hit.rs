//! Contact description shared by every collision strategy.

use serde::{Deserialize, Serialize};

use crate::types::{IVec3, Vec3};

/// One of the six faces of an axis-aligned box.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoxFace {
    PosX,
    NegX,
    PosY,
    NegY,
    Top,
    Bottom,
}

impl BoxFace {
    pub const ALL: [Self; 6] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::Top,
        Self::Bottom,
    ];

    /// Outward unit normal.
    #[must_use]
    pub fn normal(self) -> Vec3 {
        self.offset().as_vec3()
    }

    /// Offset to the neighbouring cell across this face.
    #[must_use]
    pub const fn offset(self) -> IVec3 {
        match self {
            Self::PosX => IVec3::X,
            Self::NegX => IVec3::NEG_X,
            Self::PosY => IVec3::Y,
            Self::NegY => IVec3::NEG_Y,
            Self::Top => IVec3::Z,
            Self::Bottom => IVec3::NEG_Z,
        }
    }

    /// Index of the axis this face is perpendicular to.
    #[must_use]
    pub const fn axis(self) -> usize {
        match self {
            Self::PosX | Self::NegX => 0,
            Self::PosY | Self::NegY => 1,
            Self::Top | Self::Bottom => 2,
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::NegX => Self::PosX,
            Self::PosY => Self::NegY,
            Self::NegY => Self::PosY,
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }

    /// True for the four vertical faces.
    #[must_use]
    pub const fn is_side(self) -> bool {
        !matches!(self, Self::Top | Self::Bottom)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CylinderArea {
    Top,
    Bottom,
    Side,
}

/// Where on a shape a contact landed. Which variants are meaningful depends
/// on the shape: spheres are always `Unspecified`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitArea {
    #[default]
    Unspecified,
    Cylinder(CylinderArea),
    Box(BoxFace),
}

impl HitArea {
    /// Cylinder area touching a box face: a box top meets a cylinder bottom.
    pub(crate) const fn cylinder_against(face: BoxFace) -> Self {
        match face {
            BoxFace::Top => Self::Cylinder(CylinderArea::Bottom),
            BoxFace::Bottom => Self::Cylinder(CylinderArea::Top),
            _ => Self::Cylinder(CylinderArea::Side),
        }
    }
}

/// Result of a positive narrow-phase check.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitResult {
    pub hit_pt: Vec3,
    /// Unit contact normal pointing from body 1 toward body 2.
    pub hit_normal12: Vec3,
    pub area1: HitArea,
    pub area2: HitArea,
}

impl HitResult {
    #[must_use]
    pub const fn new(hit_pt: Vec3, hit_normal12: Vec3, area1: HitArea, area2: HitArea) -> Self {
        Self {
            hit_pt,
            hit_normal12,
            area1,
            area2,
        }
    }

    /// The same contact seen from body 2.
    #[must_use]
    pub fn swapped(self) -> Self {
        Self {
            hit_pt: self.hit_pt,
            hit_normal12: -self.hit_normal12,
            area1: self.area2,
            area2: self.area1,
        }
    }

    pub fn swap_point_of_view(&mut self) {
        *self = self.swapped();
    }
}
