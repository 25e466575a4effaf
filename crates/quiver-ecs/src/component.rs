//! Typed component storage and tag sets.
//!
//! Each component type lives in its own [`ComponentMap`], keyed by
//! [`EntityId`]. Both containers are ordered by id, so iterating a map visits
//! entities in allocation order on every machine and every run.

use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};

use crate::entity::EntityId;

// ---------------------------------------------------------------------------
// ComponentMap
// ---------------------------------------------------------------------------

/// Id-ordered storage for one component type.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentMap<T> {
    entries: BTreeMap<EntityId, T>,
}

impl<T> ComponentMap<T> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert or overwrite the component for `id`, returning the old value.
    pub fn insert(&mut self, id: EntityId, value: T) -> Option<T> {
        self.entries.insert(id, value)
    }

    /// Remove the component for `id`.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        self.entries.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(id, &component)` pairs in id order.
    pub fn iter(&self) -> btree_map::Iter<'_, EntityId, T> {
        self.entries.iter()
    }

    /// Iterate `(id, &mut component)` pairs in id order.
    pub fn iter_mut(&mut self) -> btree_map::IterMut<'_, EntityId, T> {
        self.entries.iter_mut()
    }

    /// Snapshot of the ids currently holding this component, in id order.
    ///
    /// Systems that spawn or destroy while walking a population iterate this
    /// copy instead of the live map.
    pub fn ids(&self) -> Vec<EntityId> {
        self.entries.keys().copied().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Copy> ComponentMap<T> {
    /// Copy the component out, if present.
    #[inline]
    pub fn copied(&self, id: EntityId) -> Option<T> {
        self.entries.get(&id).copied()
    }
}

impl<T> Default for ComponentMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// TagSet
// ---------------------------------------------------------------------------

/// Id-ordered set marking membership in a population class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    members: BTreeSet<EntityId>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id`; returns `false` if it was already tagged.
    pub fn insert(&mut self, id: EntityId) -> bool {
        self.members.insert(id)
    }

    /// Remove `id`; returns `false` if it was not tagged.
    pub fn remove(&mut self, id: EntityId) -> bool {
        self.members.remove(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.members.iter().copied()
    }

    /// Copy of the members in id order.
    pub fn to_vec(&self) -> Vec<EntityId> {
        self.members.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
