//! Quiver ECS -- id-ordered entity storage for a deterministic platformer.
//!
//! Entities are `u64` ids from a counter that never goes backwards. Every
//! component type lives in its own map keyed by id, and every map iterates
//! in id order. Two worlds built by the same sequence of calls therefore
//! iterate identically, which is what frame-exact replay relies on.
//!
//! # Quick Start
//!
//! ```
//! use quiver_ecs::prelude::*;
//!
//! let mut world = World::new();
//! let e = world.new_entity();
//! world.positions.insert(e, Position::from_pixels(16, 32));
//! world.velocities.insert(e, Velocity::new(4, 0));
//!
//! assert_eq!(world.positions.get(e).map(|p| p.pixel_x()), Some(16));
//! world.destroy(e);
//! assert!(!world.exists(e));
//! ```

#![deny(unsafe_code)]

pub mod component;
pub mod components;
pub mod entity;
pub mod snapshot;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by ECS operations.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// The entity does not exist (destroyed or never allocated).
    #[error("entity {entity:?} does not exist (destroyed or never allocated)")]
    StaleEntity { entity: entity::EntityId },

    /// A snapshot listed the same entity twice.
    #[error("entity {entity:?} appears more than once in snapshot")]
    DuplicateEntity { entity: entity::EntityId },

    /// A snapshot entity id was zero or not below the recorded counter.
    #[error("entity {entity:?} is outside the allocated range (next id {next_id})")]
    IdOutOfRange {
        entity: entity::EntityId,
        next_id: u64,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::component::{ComponentMap, TagSet};
    pub use crate::components::{
        Ai, AiType, ArrowType, Dash, Facing, Gold, Health, Hitbox, Movement, Player, Position,
        Projectile, Rect, TrapezoidHitbox, Velocity, PIXEL_SHIFT, POSITION_SCALE,
    };
    pub use crate::entity::{EntityAllocator, EntityId};
    pub use crate::snapshot::{EntitySnapshot, Tags, WorldSnapshot};
    pub use crate::world::World;
    pub use crate::EcsError;
}
