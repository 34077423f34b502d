//! Terrain face covering: contacts through faces merged with a neighbour
//! must not push bodies sideways off a flat floor.

mod common;

use std::collections::HashMap;

use common::{ball, init_tracing};
use voxel_collide::collision::{
    dispatcher, resolve_box_face, BoxQuery, ContactEnv, FaceCoverage, FaceResolution, HitQuality,
};
use voxel_collide::{
    BoxFace, CellMaterial, CollisionConfig, Cylinder, CylinderArea, FaceCovering, HitArea, IVec3,
    PhysParams, PhysicsSim, RigidBody, Sphere, Terrain, Vec3, VoxelTerrain,
};

/// One solid cell at the origin with hand-picked face coverings.
#[derive(Default)]
struct Patchwork {
    coverings: HashMap<BoxFace, FaceCovering>,
}

impl Patchwork {
    fn covering(mut self, face: BoxFace, covering: FaceCovering) -> Self {
        self.coverings.insert(face, covering);
        self
    }
}

impl Terrain for Patchwork {
    fn cell(&self, coords: IVec3) -> Option<CellMaterial> {
        (coords == IVec3::ZERO).then(CellMaterial::default)
    }

    fn face_covering(&self, _coords: IVec3, face: BoxFace) -> FaceCovering {
        self.coverings
            .get(&face)
            .copied()
            .unwrap_or(FaceCovering::NotCovered)
    }
}

fn resolve_against_cell(
    terrain: &dyn Terrain,
    cell: IVec3,
    body: &RigidBody,
) -> Option<FaceResolution> {
    let config = CollisionConfig::default();
    let env = ContactEnv::new(&config).with_coverage(FaceCoverage::Terrain { terrain, cell });
    let cell_body = RigidBody::terrain_cell(cell, CellMaterial::default());
    let query = BoxQuery::new(body, body.next_pos, &cell_body, cell_body.next_pos)?;
    resolve_box_face(&query, &env)
}

#[test]
fn fully_covered_clean_face_is_reported_as_covered() {
    init_tracing();
    let terrain = Patchwork::default().covering(BoxFace::Top, FaceCovering::FullyCovered);
    let body = ball(0.5, Vec3::new(0.5, 0.5, 1.4));

    let res = resolve_against_cell(&terrain, IVec3::ZERO, &body).unwrap();
    assert_eq!(res.face, BoxFace::Top);
    assert_eq!(res.quality, HitQuality::Covered);
}

#[test]
fn partially_covered_face_beats_a_fully_covered_one() {
    init_tracing();
    let terrain = Patchwork::default()
        .covering(BoxFace::PosX, FaceCovering::PartiallyCovered)
        .covering(BoxFace::Top, FaceCovering::FullyCovered);
    // Over the +X/top edge of the cell, both faces hit off-centre.
    let body = ball(0.5, Vec3::new(1.3, 0.5, 1.3));

    let res = resolve_against_cell(&terrain, IVec3::ZERO, &body).unwrap();
    assert_eq!(res.face, BoxFace::PosX);
    assert_eq!(res.quality, HitQuality::Covered);
    assert!(res.clamped);
}

#[test]
fn seam_between_floor_cells_is_a_top_contact() {
    init_tracing();
    let mut terrain = VoxelTerrain::new();
    terrain.fill(IVec3::ZERO, IVec3::new(1, 0, 0), CellMaterial::default());
    // Just left of the seam, sunk slightly into the floor.
    let body = ball(0.5, Vec3::new(0.98, 0.5, 1.45));

    let res = resolve_against_cell(&terrain, IVec3::new(1, 0, 0), &body).unwrap();
    assert_eq!(res.face, BoxFace::Top);
    assert_eq!(res.quality, HitQuality::Edge);

    let mut body = body;
    let hit = dispatcher::resolve_terrain(
        &mut body,
        &terrain,
        IVec3::new(1, 0, 0),
        &CollisionConfig::default(),
    )
    .unwrap()
    .unwrap();
    assert_eq!(hit.area2, HitArea::Box(BoxFace::Top));
    assert!((hit.hit_normal12 - Vec3::NEG_Z).length() < 1e-6);
    assert!((body.next_pos.x - 0.98).abs() < 1e-6);
    assert!(body.next_pos.z > 1.45);
}

#[test]
fn cylinder_overhanging_a_ledge_lands_on_top() {
    init_tracing();
    let mut terrain = VoxelTerrain::new();
    terrain.set(IVec3::ZERO, CellMaterial::default());
    // Centre 0.2 past the +X edge of the cell, falling onto its top.
    let mut body = RigidBody::new(Cylinder::new(0.4, 1.0), 1.0)
        .at(Vec3::new(1.2, 0.5, 1.55))
        .moving(Vec3::new(0.0, 0.0, -3.0));
    body.next_pos = Vec3::new(1.2, 0.5, 1.45);

    let res = resolve_against_cell(&terrain, IVec3::ZERO, &body).unwrap();
    assert_eq!(res.face, BoxFace::Top);
    assert_eq!(res.quality, HitQuality::Edge);

    let hit = dispatcher::resolve_terrain(&mut body, &terrain, IVec3::ZERO, &CollisionConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(hit.area1, HitArea::Cylinder(CylinderArea::Bottom));
    assert_eq!(hit.area2, HitArea::Box(BoxFace::Top));
    assert!((hit.hit_normal12 - Vec3::NEG_Z).length() < 1e-6);
    assert!((body.next_pos.x - 1.2).abs() < 1e-6);
    assert!((body.next_pos.y - 0.5).abs() < 1e-6);
    assert!(body.next_pos.z >= 1.5);
}

#[test]
fn voxel_terrain_reports_coverings_by_neighbour_brick() {
    let mut terrain = VoxelTerrain::new();
    terrain.set(IVec3::ZERO, CellMaterial::default());
    terrain.set(IVec3::new(1, 0, 0), CellMaterial::default());
    terrain.set(IVec3::new(0, 0, 1), CellMaterial::default().partial());

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
    assert_eq!(
        terrain.face_covering(IVec3::new(1, 0, 0), BoxFace::NegX),
        FaceCovering::FullyCovered
    );
}

#[test]
fn frictionless_ball_slides_across_floor_seams() {
    init_tracing();
    let mut terrain = VoxelTerrain::new();
    terrain.fill(IVec3::new(-1, -1, 0), IVec3::new(6, 1, 0), CellMaterial::new(0.0, 0.0));
    let mut sim = PhysicsSim::with_terrain(terrain, PhysParams::default());
    let id = sim.add_body(
        RigidBody::new(Sphere::new(0.5), 1.0)
            .at(Vec3::new(0.5, 0.5, 1.5))
            .moving(Vec3::new(2.0, 0.0, 0.0))
            .with_elasticity(0.0)
            .with_friction(0.0),
    );

    sim.run(1.0 / 60.0, 90);

    let body = sim.body(id).unwrap();
    assert!(body.pos.x > 3.0, "ball stalled at {}", body.pos);
    assert!(body.speed.x > 1.9, "ball slowed to {}", body.speed);
    assert!(body.speed.y.abs() < 1e-4);
    assert!((body.pos.z - 1.5).abs() < 0.01, "ball left the floor: {}", body.pos);
    assert!(sim.take_removed().is_empty());
}
