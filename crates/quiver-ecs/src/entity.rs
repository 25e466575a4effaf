//! Entity identifiers and allocation.
//!
//! An [`EntityId`] is a plain 64-bit counter value. Ids are handed out in
//! strictly increasing order starting at 1 and are never recycled, so a stale
//! id can never alias a newer entity. The value 0 is reserved for
//! [`EntityId::NONE`].

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// A monotonically allocated entity identifier.
///
/// Ordering follows allocation order, which is what every system iterates
/// by. Deterministic replay depends on that ordering being stable.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// The "no entity" id.
    pub const NONE: EntityId = EntityId(0);

    /// Reconstruct from a raw `u64`.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw `u64` representation.
    #[inline]
    pub const fn to_raw(self) -> u64 {
        self.0
    }

    /// Whether this is [`EntityId::NONE`].
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EntityAllocator
// ---------------------------------------------------------------------------

/// Hands out [`EntityId`]s from a counter that only moves forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityAllocator {
    /// The id the next call to [`allocate`](Self::allocate) returns.
    next: u64,
}

impl EntityAllocator {
    /// Create an allocator whose first id is 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate a fresh id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// The raw value the next allocation will return.
    pub fn peek_next(&self) -> u64 {
        self.next
    }

    /// Whether `id` has ever been handed out by this allocator.
    pub fn was_allocated(&self, id: EntityId) -> bool {
        id.0 != 0 && id.0 < self.next
    }

    /// Restore an allocator at a previously observed counter.
    ///
    /// Values below 1 are clamped to 1 so that [`EntityId::NONE`] is never
    /// produced.
    pub fn resume_at(next: u64) -> Self {
        Self { next: next.max(1) }
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
