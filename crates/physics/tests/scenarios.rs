//! Reference contacts every change to the narrow phase must keep.

mod common;

use common::{ball, barrel, init_tracing, unit_crate};
use voxel_collide::collision::{dispatcher, ContactEnv};
use voxel_collide::{BoxFace, CollisionConfig, CylinderArea, HitArea, Vec3, DEFAULT_GRAVITY};

#[test]
fn approaching_spheres_touch_halfway() {
    init_tracing();
    let config = CollisionConfig::default();
    let env = ContactEnv::new(&config);
    let mut left = ball(1.0, Vec3::ZERO).moving(Vec3::X);
    let mut right = ball(1.0, Vec3::new(1.5, 0.0, 0.0)).moving(Vec3::NEG_X);

    let hit = dispatcher::check(&left, left.next_pos, &right, right.next_pos, &env)
        .unwrap()
        .expect("overlapping spheres must hit");
    assert!((hit.hit_pt - Vec3::new(0.75, 0.0, 0.0)).length() < 1e-6);
    assert!((hit.hit_normal12 - Vec3::X).length() < 1e-6);

    dispatcher::resolve(&mut left, &mut right, &env).unwrap().unwrap();
    assert!(dispatcher::check(&left, left.next_pos, &right, right.next_pos, &env)
        .unwrap()
        .is_none());
    // Equal masses with the default elasticities: the approach reverses.
    assert!(left.next_speed.x < 0.0);
    assert!(right.next_speed.x > 0.0);
}

#[test]
fn falling_sphere_hits_the_top_face() {
    init_tracing();
    let config = CollisionConfig::default();
    let env = ContactEnv::new(&config);
    let mut sphere = ball(0.5, Vec3::new(0.0, 0.0, 1.0)).moving(Vec3::new(0.0, 0.0, -3.0));
    sphere.prepare_next(1.0 / 60.0, DEFAULT_GRAVITY);
    let mut block = unit_crate(Vec3::ZERO);

    let hit = dispatcher::check(&sphere, sphere.next_pos, &block, block.next_pos, &env)
        .unwrap()
        .expect("sphere sinking into the top face must hit");
    assert_eq!(hit.area2, HitArea::Box(BoxFace::Top));
    assert_eq!(hit.area1, HitArea::Unspecified);
    assert!((hit.hit_normal12 - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);

    dispatcher::resolve(&mut sphere, &mut block, &env).unwrap().unwrap();
    assert!(sphere.next_pos.z >= 1.0);
    assert_eq!(block.next_pos, Vec3::ZERO);
    assert!(dispatcher::check(&sphere, sphere.next_pos, &block, block.next_pos, &env)
        .unwrap()
        .is_none());
}

#[test]
fn cylinder_grazing_a_box_corner_is_a_side_contact() {
    init_tracing();
    let config = CollisionConfig::default();
    let env = ContactEnv::new(&config);
    let mut can = barrel(0.4, 1.0, Vec3::new(1.0, 0.75, 0.9)).moving(Vec3::new(-15.0, 0.0, 0.0001));
    can.next_pos = Vec3::new(0.75, 0.75, 0.9);
    let mut block = unit_crate(Vec3::ZERO);

    let hit = dispatcher::check(&can, can.next_pos, &block, block.next_pos, &env)
        .unwrap()
        .expect("cylinder overlapping the corner must hit");
    assert_eq!(hit.area1, HitArea::Cylinder(CylinderArea::Side));
    assert!(matches!(
        hit.area2,
        HitArea::Box(BoxFace::PosX | BoxFace::PosY)
    ));
    assert_eq!(hit.hit_normal12.z, 0.0);

    dispatcher::resolve(&mut can, &mut block, &env).unwrap().unwrap();
    assert!(dispatcher::check(&can, can.next_pos, &block, block.next_pos, &env)
        .unwrap()
        .is_none());
    assert!((can.next_pos.z - 0.9).abs() < 1e-6);
}

#[test]
fn cylinder_grazing_with_the_box_reversed_agrees() {
    init_tracing();
    let config = CollisionConfig::default();
    let env = ContactEnv::new(&config);
    let mut can = barrel(0.4, 1.0, Vec3::new(0.75, 0.75, 0.9)).moving(Vec3::new(-3.0, 0.0, 0.0));
    let mut block = unit_crate(Vec3::ZERO);

    let forward = dispatcher::check(&can, can.next_pos, &block, block.next_pos, &env)
        .unwrap()
        .unwrap();
    let reverse = dispatcher::check(&block, block.next_pos, &can, can.next_pos, &env)
        .unwrap()
        .unwrap();
    assert_eq!(reverse, forward.swapped());

    dispatcher::resolve(&mut block, &mut can, &env).unwrap().unwrap();
    assert_eq!(block.next_pos, Vec3::ZERO);
    assert!(dispatcher::check(&can, can.next_pos, &block, block.next_pos, &env)
        .unwrap()
        .is_none());
}

#[test]
fn cylinder_overhanging_an_edge_lands_on_the_top_face() {
    init_tracing();
    let config = CollisionConfig::default();
    let env = ContactEnv::new(&config);
    let mut can = barrel(0.4, 1.0, Vec3::new(0.7, 0.0, 1.05)).moving(Vec3::new(0.0, 0.0, -3.0));
    can.next_pos = Vec3::new(0.7, 0.0, 0.95);
    let mut block = unit_crate(Vec3::ZERO);

    let hit = dispatcher::check(&can, can.next_pos, &block, block.next_pos, &env)
        .unwrap()
        .expect("cylinder sinking past the edge must hit");
    assert_eq!(hit.area1, HitArea::Cylinder(CylinderArea::Bottom));
    assert_eq!(hit.area2, HitArea::Box(BoxFace::Top));
    assert!((hit.hit_normal12 - Vec3::NEG_Z).length() < 1e-6);

    dispatcher::resolve(&mut can, &mut block, &env).unwrap().unwrap();
    assert!((can.next_pos.x - 0.7).abs() < 1e-6);
    assert!(can.next_pos.y.abs() < 1e-6);
    assert!(can.next_pos.z >= 1.0);
    // Landing stops the fall instead of pushing the body off the side.
    assert!(can.next_speed.z > -3.0);
    assert!(can.next_speed.x.abs() < 1e-6);
}
