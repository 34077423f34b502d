//! # Collision Orchestrator
//!
//! Drives one frame's collision pass over all entities:
//!
//! 1. **Broad phase**: every entity's vicinity list is rebuilt from a
//!    bounding-radius test, once per frame ticket.
//! 2. **Narrow phase**: every pair of nearby entities, and every entity
//!    against the terrain cells under its bounding box, is checked,
//!    separated, verified and bounced. New contacts go into the
//!    [`CollisionSet`] and fire both entities' callbacks.
//! 3. **Cascade**: separating one pair can push a body into a third one, so
//!    the narrow phase is re-run for the entities that were moved, against
//!    their vicinity lists, for a bounded number of extra rounds.
//!
//! Failures are contained per entity. A strategy error excises both
//! entities of the pair; a callback error excises the entity whose callback
//! failed. Excised entities stop taking part immediately and are dropped by
//! the simulation at the start of the next frame.

use crate::body::RigidBody;
use crate::collision::broad_phase::{self, Vicinity};
use crate::collision::{dispatcher, CollisionConfig, CollisionSet, ContactEnv, ContactKey, HitArea};
use crate::error::PhysicsError;
use crate::terrain::{cells_overlapping, Terrain};
use crate::types::{EntityId, IVec3, Vec3};

/// The other party of a contact.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Collider {
    Entity(EntityId),
    Terrain(IVec3),
}

/// What an entity is told about one of its contacts.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactEvent {
    pub other: Collider,
    pub my_area: HitArea,
    pub other_area: HitArea,
    pub hit_point: Vec3,
    /// Unit contact normal pointing from the other party toward this entity.
    pub normal_toward_me: Vec3,
}

/// Something in the world that owns a rigid body.
pub trait Entity {
    fn body(&self) -> &RigidBody;

    fn body_mut(&mut self) -> &mut RigidBody;

    fn collidable(&self) -> bool {
        true
    }

    /// Called once per contact and frame, after velocities were updated.
    ///
    /// # Errors
    ///
    /// Any error excises this entity from the simulation.
    fn on_collide(&mut self, event: &ContactEvent) -> anyhow::Result<()> {
        let _ = event;
        Ok(())
    }
}

/// A bare body is an entity that ignores its contacts.
impl Entity for RigidBody {
    fn body(&self) -> &RigidBody {
        self
    }

    fn body_mut(&mut self) -> &mut RigidBody {
        self
    }
}

/// An entity together with the per-frame state the orchestrator keeps for
/// it.
pub struct EntitySlot {
    id: EntityId,
    entity: Box<dyn Entity>,
    excised: bool,
    vicinity: Vicinity,
}

impl EntitySlot {
    #[must_use]
    pub fn new(id: EntityId, entity: Box<dyn Entity>) -> Self {
        Self {
            id,
            entity,
            excised: false,
            vicinity: Vicinity::default(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    #[must_use]
    pub fn entity(&self) -> &dyn Entity {
        self.entity.as_ref()
    }

    pub fn entity_mut(&mut self) -> &mut dyn Entity {
        self.entity.as_mut()
    }

    #[must_use]
    pub fn into_entity(self) -> Box<dyn Entity> {
        self.entity
    }

    #[must_use]
    pub const fn is_excised(&self) -> bool {
        self.excised
    }

    #[must_use]
    pub fn vicinity(&self) -> &Vicinity {
        &self.vicinity
    }

    /// Marks the entity for removal; false if it already was.
    pub fn excise(&mut self) -> bool {
        !std::mem::replace(&mut self.excised, true)
    }

    fn takes_part(&self) -> bool {
        !self.excised && self.entity.collidable()
    }

    fn notify(&mut self, event: &ContactEvent, report: &mut FrameReport) {
        if let Err(err) = self.entity.on_collide(event) {
            let error = format!("{err:#}");
            tracing::error!(entity = %self.id, %error, "collision callback failed, excising entity");
            if self.excise() {
                report.excised.push(self.id);
            }
        }
    }
}

impl std::fmt::Debug for EntitySlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitySlot")
            .field("id", &self.id)
            .field("body", self.entity.body())
            .field("excised", &self.excised)
            .finish_non_exhaustive()
    }
}

/// Statistics of one collision pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Narrow-phase rounds run, the first pass included.
    pub rounds: u32,
    /// Entity pairs found by the broad phase.
    pub nearby_pairs: usize,
    /// Narrow-phase checks run, terrain cells included.
    pub checks: usize,
    /// Contacts resolved, counted once per round they were found in.
    pub contacts: usize,
    /// False when the last cascade round still found contacts.
    pub converged: bool,
    /// Entities excised during this pass.
    pub excised: Vec<EntityId>,
}

pub struct CollisionOrchestrator<'a> {
    config: &'a CollisionConfig,
    terrain: &'a dyn Terrain,
}

impl<'a> CollisionOrchestrator<'a> {
    #[must_use]
    pub fn new(config: &'a CollisionConfig, terrain: &'a dyn Terrain) -> Self {
        Self { config, terrain }
    }

    /// Runs the collision pass for frame `ticket` over the staged positions
    /// and velocities of all entities.
    pub fn run(&self, slots: &mut [EntitySlot], set: &mut CollisionSet, ticket: u64) -> FrameReport {
        let mut report = FrameReport {
            converged: true,
            ..FrameReport::default()
        };
        report.nearby_pairs = Self::broad_phase(slots, ticket, self.config.vicinity_margin);

        let mut active: Vec<bool> = slots.iter().map(EntitySlot::takes_part).collect();
        for round in 0..=self.config.cascade_rounds {
            let mut moved = vec![false; slots.len()];
            let mut contacts = 0;

            for i in 0..slots.len() {
                if !active[i] || !slots[i].takes_part() {
                    continue;
                }
                let neighbours = slots[i].vicinity.neighbours().to_vec();
                for j in neighbours {
                    // Pairs of two active entities are handled from the lower index.
                    if (active[j] && j < i) || !slots[j].takes_part() {
                        continue;
                    }
                    if self.resolve_pair(slots, i, j, set, &mut report) {
                        moved[i] = true;
                        moved[j] = true;
                        contacts += 1;
                    }
                }
                let terrain_contacts = self.resolve_terrain(&mut slots[i], set, &mut report);
                if terrain_contacts > 0 {
                    moved[i] = true;
                    contacts += terrain_contacts;
                }
            }

            report.rounds = round + 1;
            report.contacts += contacts;
            if contacts == 0 {
                break;
            }
            if round == self.config.cascade_rounds {
                report.converged = false;
                tracing::warn!(
                    rounds = report.rounds,
                    contacts,
                    "contacts remain after the last cascade round, bodies may be stuck"
                );
            }
            active = moved;
        }

        tracing::debug!(
            ticket,
            rounds = report.rounds,
            nearby_pairs = report.nearby_pairs,
            checks = report.checks,
            contacts = report.contacts,
            "collision pass finished"
        );
        report
    }

    fn broad_phase(slots: &mut [EntitySlot], ticket: u64, margin: f32) -> usize {
        let (mut vicinities, bodies): (Vec<&mut Vicinity>, Vec<Option<&RigidBody>>) = slots
            .iter_mut()
            .map(|slot| {
                let body = (!slot.excised && slot.entity.collidable()).then(|| slot.entity.body());
                (&mut slot.vicinity, body)
            })
            .unzip();
        broad_phase::refresh(&mut vicinities, &bodies, ticket, margin)
    }

    /// Narrow phase for entities `i` and `j`; true on a resolved contact.
    fn resolve_pair(
        &self,
        slots: &mut [EntitySlot],
        i: usize,
        j: usize,
        set: &mut CollisionSet,
        report: &mut FrameReport,
    ) -> bool {
        let (lo, hi) = (i.min(j), i.max(j));
        let (head, tail) = slots.split_at_mut(hi);
        let (a, b) = (&mut head[lo], &mut tail[0]);
        if !a.takes_part() || !b.takes_part() {
            return false;
        }
        if a.entity.body().is_immovable() && b.entity.body().is_immovable() {
            return false;
        }

        report.checks += 1;
        let env = ContactEnv::new(self.config);
        match dispatcher::resolve(a.entity.body_mut(), b.entity.body_mut(), &env) {
            Ok(None) => false,
            Ok(Some(hit)) => {
                if set.insert(ContactKey::entities(a.id, b.id)) {
                    a.notify(
                        &ContactEvent {
                            other: Collider::Entity(b.id),
                            my_area: hit.area1,
                            other_area: hit.area2,
                            hit_point: hit.hit_pt,
                            normal_toward_me: -hit.hit_normal12,
                        },
                        report,
                    );
                    b.notify(
                        &ContactEvent {
                            other: Collider::Entity(a.id),
                            my_area: hit.area2,
                            other_area: hit.area1,
                            hit_point: hit.hit_pt,
                            normal_toward_me: hit.hit_normal12,
                        },
                        report,
                    );
                }
                true
            }
            Err(err) => {
                Self::fail(&err, &mut [a, b], report);
                false
            }
        }
    }

    /// Narrow phase of one entity against the terrain cells under its
    /// bounding box; returns the number of resolved contacts.
    fn resolve_terrain(
        &self,
        slot: &mut EntitySlot,
        set: &mut CollisionSet,
        report: &mut FrameReport,
    ) -> usize {
        let body = slot.entity.body();
        if body.is_immovable() {
            return 0;
        }
        let centre = body.next_centre();
        let half = body.shape.half_extents();
        let cells: Vec<IVec3> = cells_overlapping(centre - half, centre + half)
            .filter(|&cell| self.terrain.cell(cell).is_some())
            .collect();

        let mut contacts = 0;
        for cell in cells {
            if !slot.takes_part() {
                break;
            }
            report.checks += 1;
            match dispatcher::resolve_terrain(slot.entity.body_mut(), self.terrain, cell, self.config) {
                Ok(None) => {}
                Ok(Some(hit)) => {
                    contacts += 1;
                    if set.insert(ContactKey::terrain(slot.id, cell)) {
                        slot.notify(
                            &ContactEvent {
                                other: Collider::Terrain(cell),
                                my_area: hit.area1,
                                other_area: hit.area2,
                                hit_point: hit.hit_pt,
                                normal_toward_me: -hit.hit_normal12,
                            },
                            report,
                        );
                    }
                }
                Err(err) => Self::fail(&err, &mut [&mut *slot], report),
            }
        }
        contacts
    }

    fn fail(err: &PhysicsError, slots: &mut [&mut EntitySlot], report: &mut FrameReport) {
        if err.is_unimplemented() {
            tracing::error!(error = %err, "no collision strategy, contact ignored");
            return;
        }
        let ids: Vec<EntityId> = slots.iter().map(|slot| slot.id).collect();
        tracing::error!(entities = ?ids, error = %err, "collision invariant violated, excising");
        for slot in slots.iter_mut() {
            if slot.excise() {
                report.excised.push(slot.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{AaBox, Sphere};
    use crate::terrain::{CellMaterial, VoxelTerrain};

    fn slots(bodies: Vec<RigidBody>) -> Vec<EntitySlot> {
        bodies
            .into_iter()
            .enumerate()
            .map(|(i, body)| EntitySlot::new(EntityId(u32::try_from(i).unwrap()), Box::new(body)))
            .collect()
    }

    #[test]
    fn quiet_frame_runs_a_single_round() {
        let config = CollisionConfig::default();
        let terrain = VoxelTerrain::new();
        let mut world = slots(vec![
            RigidBody::new(Sphere::new(0.5), 1.0),
            RigidBody::new(Sphere::new(0.5), 1.0).at(Vec3::new(5.0, 0.0, 0.0)),
        ]);
        let mut set = CollisionSet::new();
        let report = CollisionOrchestrator::new(&config, &terrain).run(&mut world, &mut set, 1);
        assert_eq!(report.rounds, 1);
        assert_eq!(report.contacts, 0);
        assert!(report.converged);
        assert!(set.is_empty());
    }

    #[test]
    fn box_box_pairs_are_ignored_not_excised() {
        let config = CollisionConfig::default();
        let terrain = VoxelTerrain::new();
        let mut world = slots(vec![
            RigidBody::new(AaBox::cube(1.0), 1.0),
            RigidBody::new(AaBox::cube(1.0), 1.0).at(Vec3::new(0.5, 0.0, 0.0)),
        ]);
        let mut set = CollisionSet::new();
        let report = CollisionOrchestrator::new(&config, &terrain).run(&mut world, &mut set, 1);
        assert!(report.excised.is_empty());
        assert!(world.iter().all(|slot| !slot.is_excised()));
    }

    #[test]
    fn resting_contact_with_terrain_is_recorded_once() {
        let config = CollisionConfig::default();
        let mut terrain = VoxelTerrain::new();
        terrain.fill(IVec3::new(-1, -1, 0), IVec3::new(1, 1, 0), CellMaterial::default());
        let mut world = slots(vec![RigidBody::new(Sphere::new(0.5), 1.0)
            .at(Vec3::new(0.5, 0.5, 1.45))
            .moving(Vec3::new(0.0, 0.0, -1.0))]);
        let mut set = CollisionSet::new();
        let report = CollisionOrchestrator::new(&config, &terrain).run(&mut world, &mut set, 1);
        assert!(report.converged);
        assert!(set.contains(&ContactKey::terrain(EntityId(0), IVec3::ZERO)));
        assert!(world[0].entity().body().next_pos.z >= 1.5);
    }
}
