//! The [`World`] owns the entity allocator, one [`ComponentMap`] per
//! component type and the population tag sets.
//!
//! Component maps are public fields so a system can borrow several of them
//! at once. Systems that create or destroy entities while walking a
//! population iterate a copied id list (see [`ComponentMap::ids`]).

use crate::component::{ComponentMap, TagSet};
use crate::components::{
    Ai, Dash, Facing, Gold, Health, Hitbox, Movement, Player, Position, Projectile,
    TrapezoidHitbox, Velocity,
};
use crate::entity::{EntityAllocator, EntityId};

/// Entity storage for one simulation.
#[derive(Debug, Clone, Default)]
pub struct World {
    allocator: EntityAllocator,
    alive: TagSet,

    pub positions: ComponentMap<Position>,
    pub velocities: ComponentMap<Velocity>,
    pub movements: ComponentMap<Movement>,
    pub healths: ComponentMap<Health>,
    pub hitboxes: ComponentMap<Hitbox>,
    pub trapezoids: ComponentMap<TrapezoidHitbox>,
    pub facings: ComponentMap<Facing>,
    pub dashes: ComponentMap<Dash>,
    pub ais: ComponentMap<Ai>,
    pub projectiles: ComponentMap<Projectile>,
    pub golds: ComponentMap<Gold>,
    pub players: ComponentMap<Player>,

    pub is_player: TagSet,
    pub is_enemy: TagSet,
    pub is_projectile: TagSet,
    pub is_gold: TagSet,

    /// The player entity, or [`EntityId::NONE`] when none has spawned.
    pub player_id: EntityId,
}

impl World {
    /// Create an empty world whose first entity will be id 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id. The entity starts with no components.
    pub fn new_entity(&mut self) -> EntityId {
        let id = self.allocator.allocate();
        self.alive.insert(id);
        id
    }

    /// Remove `id` from every map and tag set.
    ///
    /// Returns `false` if the entity was not alive. Destroying the player
    /// resets [`player_id`](Self::player_id).
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if !self.alive.remove(id) {
            return false;
        }
        self.positions.remove(id);
        self.velocities.remove(id);
        self.movements.remove(id);
        self.healths.remove(id);
        self.hitboxes.remove(id);
        self.trapezoids.remove(id);
        self.facings.remove(id);
        self.dashes.remove(id);
        self.ais.remove(id);
        self.projectiles.remove(id);
        self.golds.remove(id);
        self.players.remove(id);
        self.is_player.remove(id);
        self.is_enemy.remove(id);
        self.is_projectile.remove(id);
        self.is_gold.remove(id);
        if self.player_id == id {
            self.player_id = EntityId::NONE;
        }
        tracing::trace!(entity = %id, "destroyed entity");
        true
    }

    pub fn exists(&self, id: EntityId) -> bool {
        self.alive.contains(id)
    }

    pub fn entity_count(&self) -> usize {
        self.alive.len()
    }

    pub fn count_enemies(&self) -> usize {
        self.is_enemy.len()
    }

    /// Alive entity ids in allocation order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.alive.to_vec()
    }

    /// The player id if the player is alive.
    pub fn player(&self) -> Option<EntityId> {
        if self.player_id.is_none() || !self.exists(self.player_id) {
            None
        } else {
            Some(self.player_id)
        }
    }

    /// Drop every entity. The id counter is kept, so ids handed out after a
    /// clear never repeat ids handed out before it.
    pub fn clear(&mut self) {
        let next = self.allocator.peek_next();
        *self = Self {
            allocator: EntityAllocator::resume_at(next),
            ..Self::default()
        };
    }

    /// The raw value the next [`new_entity`](Self::new_entity) will return.
    pub fn next_id(&self) -> u64 {
        self.allocator.peek_next()
    }

    pub(crate) fn allocator(&self) -> &EntityAllocator {
        &self.allocator
    }

    /// Rebuild an empty world around a restored counter. Used by snapshot
    /// restore before re-inserting entities.
    pub(crate) fn with_counter(next: u64) -> Self {
        Self {
            allocator: EntityAllocator::resume_at(next),
            ..Self::default()
        }
    }

    /// Mark `id` alive without allocating. Snapshot restore only.
    pub(crate) fn revive(&mut self, id: EntityId) -> bool {
        self.alive.insert(id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
