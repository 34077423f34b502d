//! # Physics Simulation Core
//!
//! [`PhysicsSim`] owns the entities, the terrain and the per-frame state of
//! the collision pass, and steps them frame by frame:
//!
//! 1. entities excised during the previous frame are dropped;
//! 2. the frame ticket advances and the collision set is cleared;
//! 3. every body stages its next position from its accumulated forces;
//! 4. the collision orchestrator resolves contacts on the staged state;
//! 5. every body commits its staged state.

use crate::body::RigidBody;
use crate::collision::{CollisionOrchestrator, CollisionSet, Entity, EntitySlot, FrameReport};
use crate::integrator::{commit_bodies, prepare_bodies};
use crate::terrain::{Terrain, VoxelTerrain};
use crate::types::{EntityId, PhysParams};

/// Main physics simulation container
pub struct PhysicsSim<T: Terrain = VoxelTerrain> {
    params: PhysParams,
    terrain: T,
    slots: Vec<EntitySlot>,
    next_id: u32,
    ticket: u64,
    contacts: CollisionSet,
    removed: Vec<(EntityId, Box<dyn Entity>)>,
    last_report: FrameReport,
}

impl PhysicsSim<VoxelTerrain> {
    /// Create a new empty simulation over empty terrain
    #[must_use]
    pub fn new() -> Self {
        Self::with_terrain(VoxelTerrain::new(), PhysParams::default())
    }
}

impl Default for PhysicsSim<VoxelTerrain> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Terrain> PhysicsSim<T> {
    #[must_use]
    pub fn with_terrain(terrain: T, params: PhysParams) -> Self {
        Self {
            params,
            terrain,
            slots: Vec::new(),
            next_id: 0,
            ticket: 0,
            contacts: CollisionSet::new(),
            removed: Vec::new(),
            last_report: FrameReport::default(),
        }
    }

    #[must_use]
    pub fn params(&self) -> &PhysParams {
        &self.params
    }

    /// Replaces the parameters; takes effect from the next step.
    pub fn set_params(&mut self, params: PhysParams) {
        self.params = params;
    }

    #[must_use]
    pub fn terrain(&self) -> &T {
        &self.terrain
    }

    pub fn terrain_mut(&mut self) -> &mut T {
        &mut self.terrain
    }

    pub fn add_entity(&mut self, entity: Box<dyn Entity>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.slots.push(EntitySlot::new(id, entity));
        id
    }

    /// Adds a bare body that ignores its contacts.
    pub fn add_body(&mut self, body: RigidBody) -> EntityId {
        self.add_entity(Box::new(body))
    }

    fn slot_index(&self, id: EntityId) -> Option<usize> {
        // Slots stay sorted by id: ids only grow and removal keeps the order.
        self.slots.binary_search_by_key(&id, EntitySlot::id).ok()
    }

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&dyn Entity> {
        self.slot_index(id).map(|i| self.slots[i].entity())
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut dyn Entity> {
        let i = self.slot_index(id)?;
        Some(self.slots[i].entity_mut())
    }

    #[must_use]
    pub fn body(&self, id: EntityId) -> Option<&RigidBody> {
        self.entity(id).map(|entity| entity.body())
    }

    /// True if the entity was excised this frame and will be dropped on the
    /// next step.
    #[must_use]
    pub fn is_excised(&self, id: EntityId) -> bool {
        self.slot_index(id).is_some_and(|i| self.slots[i].is_excised())
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots.iter().map(EntitySlot::id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Frame ticket of the last step; zero before the first one.
    #[must_use]
    pub const fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Contacts resolved during the last step.
    #[must_use]
    pub fn contacts(&self) -> &CollisionSet {
        &self.contacts
    }

    #[must_use]
    pub fn last_report(&self) -> &FrameReport {
        &self.last_report
    }

    /// Entities dropped since the last call, with the id they had.
    pub fn take_removed(&mut self) -> Vec<(EntityId, Box<dyn Entity>)> {
        std::mem::take(&mut self.removed)
    }

    /// Advances the simulation by one frame of `dt` seconds.
    pub fn step(&mut self, dt: f32) -> &FrameReport {
        let (gone, kept): (Vec<EntitySlot>, Vec<EntitySlot>) =
            std::mem::take(&mut self.slots).into_iter().partition(EntitySlot::is_excised);
        self.slots = kept;
        for slot in gone {
            tracing::info!(entity = %slot.id(), "removing excised entity");
            self.removed.push((slot.id(), slot.into_entity()));
        }

        self.ticket += 1;
        self.contacts.clear();

        prepare_bodies(
            self.slots.iter_mut().map(|slot| slot.entity_mut().body_mut()),
            dt,
            self.params.gravity,
        );
        let orchestrator = CollisionOrchestrator::new(&self.params.collision, &self.terrain);
        self.last_report = orchestrator.run(&mut self.slots, &mut self.contacts, self.ticket);
        commit_bodies(self.slots.iter_mut().map(|slot| slot.entity_mut().body_mut()));

        &self.last_report
    }

    /// Runs `steps` frames of `dt` seconds.
    pub fn run(&mut self, dt: f32, steps: usize) {
        for _ in 0..steps {
            self.step(dt);
        }
    }
}
