//! Per-frame record of resolved contacts.

use std::collections::HashSet;

use crate::types::{EntityId, IVec3};

/// Identity of a contact within one frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContactKey {
    /// Two entities, stored in ascending id order.
    Entities(EntityId, EntityId),
    Terrain(EntityId, IVec3),
}

impl ContactKey {
    /// Unordered pair key: `entities(a, b) == entities(b, a)`.
    #[must_use]
    pub fn entities(a: EntityId, b: EntityId) -> Self {
        if a <= b {
            Self::Entities(a, b)
        } else {
            Self::Entities(b, a)
        }
    }

    #[must_use]
    pub const fn terrain(entity: EntityId, cell: IVec3) -> Self {
        Self::Terrain(entity, cell)
    }

    /// True if `entity` takes part in this contact.
    #[must_use]
    pub fn involves(&self, entity: EntityId) -> bool {
        match *self {
            Self::Entities(a, b) => a == entity || b == entity,
            Self::Terrain(e, _) => e == entity,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CollisionSet {
    contacts: HashSet<ContactKey>,
}

impl CollisionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a contact; false if it was already recorded this frame.
    pub fn insert(&mut self, key: ContactKey) -> bool {
        self.contacts.insert(key)
    }

    #[must_use]
    pub fn contains(&self, key: &ContactKey) -> bool {
        self.contacts.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactKey> {
        self.contacts.iter()
    }
}
