//! Broad-phase filtering by bounding radius

use crate::body::RigidBody;

/// True when the bounding spheres around the staged centres, grown by
/// `margin`, touch.
#[must_use]
pub fn in_vicinity(b1: &RigidBody, b2: &RigidBody, margin: f32) -> bool {
    let reach = b1.bounding_radius() + b2.bounding_radius() + margin;
    b1.next_centre().distance_squared(b2.next_centre()) <= reach * reach
}

/// Per-entity list of nearby entities, valid for one frame ticket.
///
/// The list is consulted by every cascade round of a frame and rebuilt only
/// once the ticket moves on.
#[derive(Clone, Debug, Default)]
pub struct Vicinity {
    ticket: Option<u64>,
    neighbours: Vec<usize>,
}

impl Vicinity {
    #[must_use]
    pub fn is_current(&self, ticket: u64) -> bool {
        self.ticket == Some(ticket)
    }

    /// Starts a new list for `ticket`, dropping the previous frame's.
    pub fn reset(&mut self, ticket: u64) {
        self.ticket = Some(ticket);
        self.neighbours.clear();
    }

    pub fn push(&mut self, index: usize) {
        self.neighbours.push(index);
    }

    #[must_use]
    pub fn neighbours(&self) -> &[usize] {
        &self.neighbours
    }
}

/// Rebuilds every stale vicinity list from the bodies' staged positions.
///
/// `bodies` yields `None` for entities that take no part in collisions.
pub(crate) fn refresh(
    vicinities: &mut [&mut Vicinity],
    bodies: &[Option<&RigidBody>],
    ticket: u64,
    margin: f32,
) -> usize {
    let mut pairs = 0;
    if vicinities.iter().all(|v| v.is_current(ticket)) {
        return pairs;
    }
    for v in vicinities.iter_mut() {
        v.reset(ticket);
    }
    for (i, b1) in bodies.iter().enumerate() {
        let Some(b1) = b1 else { continue };
        for (j, b2) in bodies.iter().enumerate().skip(i + 1) {
            let Some(b2) = b2 else { continue };
            if in_vicinity(b1, b2, margin) {
                vicinities[i].push(j);
                vicinities[j].push(i);
                pairs += 1;
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Cylinder, Sphere};
    use crate::types::Vec3;

    #[test]
    fn vicinity_uses_offset_centres() {
        let a = RigidBody::new(Sphere::new(0.5), 1.0);
        let b = RigidBody::new(Sphere::with_offset(0.5, 3.0), 1.0).at(Vec3::new(0.0, 0.0, -2.0));
        assert!(in_vicinity(&a, &b, 0.0));
        let far = RigidBody::new(Cylinder::new(0.5, 1.0), 1.0).at(Vec3::new(2.0, 0.0, 0.0));
        assert!(!in_vicinity(&a, &far, 0.25));
        assert!(in_vicinity(&a, &far, 0.8));
    }

    #[test]
    fn lists_are_rebuilt_only_for_a_new_ticket() {
        let a = RigidBody::new(Sphere::new(0.5), 1.0);
        let b = RigidBody::new(Sphere::new(0.5), 1.0).at(Vec3::new(0.8, 0.0, 0.0));
        let c = RigidBody::new(Sphere::new(0.5), 1.0).at(Vec3::new(5.0, 0.0, 0.0));
        let mut cache = vec![Vicinity::default(); 3];

        let bodies = [Some(&a), Some(&b), Some(&c)];
        let mut refs: Vec<&mut Vicinity> = cache.iter_mut().collect();
        assert_eq!(refresh(&mut refs, &bodies, 1, 0.0), 1);
        assert_eq!(refresh(&mut refs, &bodies, 1, 0.0), 0);
        assert_eq!(refs[0].neighbours(), &[1]);
        assert!(refs[2].neighbours().is_empty());

        let hidden = [Some(&a), None, Some(&c)];
        refresh(&mut refs, &hidden, 2, 0.0);
        assert!(refs[0].neighbours().is_empty());
        assert!(refs[1].is_current(2));
    }
}
