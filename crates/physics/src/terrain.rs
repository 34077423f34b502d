//! # Voxel Terrain Service
//!
//! The collision core only needs two read-only questions answered about the
//! terrain: which cells are solid (and what they are made of), and whether a
//! given face of a solid cell is covered by its neighbour. [`Terrain`] is that
//! boundary; [`VoxelTerrain`] is a small in-memory implementation of it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::collision::BoxFace;
use crate::types::{IVec3, Vec3};

/// How much of a cell face is hidden by the neighbouring cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceCovering {
    NotCovered,
    PartiallyCovered,
    FullyCovered,
}

/// Opaque brick geometry as far as the collision core is concerned: only
/// whether it fills the whole cell matters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrickShape {
    #[default]
    Full,
    Partial,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellMaterial {
    pub elasticity: f32,
    pub friction: f32,
    pub shape: BrickShape,
}

impl Default for CellMaterial {
    fn default() -> Self {
        Self {
            elasticity: 0.3,
            friction: 0.6,
            shape: BrickShape::Full,
        }
    }
}

impl CellMaterial {
    #[must_use]
    pub const fn new(elasticity: f32, friction: f32) -> Self {
        Self {
            elasticity,
            friction,
            shape: BrickShape::Full,
        }
    }

    #[must_use]
    pub const fn partial(mut self) -> Self {
        self.shape = BrickShape::Partial;
        self
    }
}

pub trait Terrain {
    /// Material of the solid cell at `coords`, or `None` for empty space.
    fn cell(&self, coords: IVec3) -> Option<CellMaterial>;

    /// Covering of `face` of the cell at `coords`. Must be cheap: it is asked
    /// once per candidate face per narrow-phase check.
    fn face_covering(&self, coords: IVec3, face: BoxFace) -> FaceCovering;
}

/// Hash-map backed voxel terrain.
#[derive(Clone, Debug, Default)]
pub struct VoxelTerrain {
    cells: HashMap<IVec3, CellMaterial>,
}

impl VoxelTerrain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, coords: IVec3, material: CellMaterial) {
        self.cells.insert(coords, material);
    }

    pub fn clear_cell(&mut self, coords: IVec3) -> Option<CellMaterial> {
        self.cells.remove(&coords)
    }

    /// Fills every cell of the inclusive range `min..=max`.
    pub fn fill(&mut self, min: IVec3, max: IVec3, material: CellMaterial) {
        for z in min.z..=max.z {
            for y in min.y..=max.y {
                for x in min.x..=max.x {
                    self.set(IVec3::new(x, y, z), material);
                }
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Terrain for VoxelTerrain {
    fn cell(&self, coords: IVec3) -> Option<CellMaterial> {
        self.cells.get(&coords).copied()
    }

    fn face_covering(&self, coords: IVec3, face: BoxFace) -> FaceCovering {
        match self.cells.get(&(coords + face.offset())) {
            Some(neighbour) if neighbour.shape == BrickShape::Full => FaceCovering::FullyCovered,
            Some(_) => FaceCovering::PartiallyCovered,
            None => FaceCovering::NotCovered,
        }
    }
}

/// Coordinates of every cell touched by the axis-aligned box `min..max`.
pub fn cells_overlapping(min: Vec3, max: Vec3) -> impl Iterator<Item = IVec3> {
    let lo = min.floor().as_ivec3();
    let hi = max.floor().as_ivec3();
    (lo.z..=hi.z).flat_map(move |z| {
        (lo.y..=hi.y).flat_map(move |y| (lo.x..=hi.x).map(move |x| IVec3::new(x, y, z)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covering_follows_neighbour_shape() {
        let mut terrain = VoxelTerrain::new();
        terrain.set(IVec3::ZERO, CellMaterial::default());
        terrain.set(IVec3::X, CellMaterial::default());
        terrain.set(IVec3::Z, CellMaterial::default().partial());

        assert_eq!(
            terrain.face_covering(IVec3::ZERO, BoxFace::PosX),
            FaceCovering::FullyCovered
        );
        assert_eq!(
            terrain.face_covering(IVec3::ZERO, BoxFace::Top),
            FaceCovering::PartiallyCovered
        );
        assert_eq!(
            terrain.face_covering(IVec3::ZERO, BoxFace::NegY),
            FaceCovering::NotCovered
        );
    }

    #[test]
    fn cells_overlapping_spans_negative_coordinates() {
        let cells: Vec<_> =
            cells_overlapping(Vec3::new(-0.5, 0.2, 0.1), Vec3::new(0.5, 0.8, 0.9)).collect();
        assert_eq!(cells, vec![IVec3::new(-1, 0, 0), IVec3::new(0, 0, 0)]);
    }

    #[test]
    fn fill_is_inclusive() {
        let mut terrain = VoxelTerrain::new();
        terrain.fill(IVec3::ZERO, IVec3::new(1, 1, 0), CellMaterial::default());
        assert_eq!(terrain.len(), 4);
        assert!(terrain.cell(IVec3::new(1, 1, 0)).is_some());
        assert!(terrain.cell(IVec3::new(1, 1, 1)).is_none());
    }
}
