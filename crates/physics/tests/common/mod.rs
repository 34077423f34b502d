#![allow(dead_code)]

use voxel_collide::{AaBox, Cylinder, RigidBody, Sphere, Vec3};

/// Routes `tracing` output through the test harness so it shows up only for
/// failing tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn ball(radius: f32, pos: Vec3) -> RigidBody {
    RigidBody::new(Sphere::new(radius), 1.0).at(pos)
}

pub fn barrel(radius: f32, height: f32, pos: Vec3) -> RigidBody {
    RigidBody::new(Cylinder::new(radius, height), 1.0).at(pos)
}

pub fn unit_crate(pos: Vec3) -> RigidBody {
    RigidBody::fixed(AaBox::cube(1.0)).at(pos)
}
