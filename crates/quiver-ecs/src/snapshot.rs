//! World snapshot and restore support.
//!
//! A [`WorldSnapshot`] records the id counter and every alive entity with
//! whichever components it carries. It serializes to JSON, and restoring it
//! yields a world that steps identically to the one it was captured from,
//! including the ids it will allocate next.

use serde::{Deserialize, Serialize};

use crate::components::{
    Ai, Dash, Facing, Gold, Health, Hitbox, Movement, Player, Position, Projectile,
    TrapezoidHitbox, Velocity,
};
use crate::entity::EntityId;
use crate::world::World;
use crate::EcsError;

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// One entity's components. Absent components serialize as nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<Velocity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement: Option<Movement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hitbox: Option<Hitbox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trapezoid: Option<TrapezoidHitbox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facing: Option<Facing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<Dash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai: Option<Ai>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projectile: Option<Projectile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gold: Option<Gold>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<Player>,
    #[serde(default)]
    pub tags: Tags,
}

/// Population membership flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tags {
    #[serde(default)]
    pub player: bool,
    #[serde(default)]
    pub enemy: bool,
    #[serde(default)]
    pub projectile: bool,
    #[serde(default)]
    pub gold: bool,
}

/// A complete, serializable copy of a [`World`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Raw id the next allocation returns.
    pub next_id: u64,
    pub player_id: EntityId,
    /// Alive entities in id order.
    pub entities: Vec<EntitySnapshot>,
}

// ---------------------------------------------------------------------------
// Capture / restore
// ---------------------------------------------------------------------------

impl World {
    /// Capture every alive entity in id order.
    pub fn capture_snapshot(&self) -> WorldSnapshot {
        let entities = self
            .ids()
            .into_iter()
            .map(|id| EntitySnapshot {
                id,
                position: self.positions.copied(id),
                velocity: self.velocities.copied(id),
                movement: self.movements.copied(id),
                health: self.healths.copied(id),
                hitbox: self.hitboxes.copied(id),
                trapezoid: self.trapezoids.copied(id),
                facing: self.facings.copied(id),
                dash: self.dashes.copied(id),
                ai: self.ais.copied(id),
                projectile: self.projectiles.copied(id),
                gold: self.golds.copied(id),
                player: self.players.copied(id),
                tags: Tags {
                    player: self.is_player.contains(id),
                    enemy: self.is_enemy.contains(id),
                    projectile: self.is_projectile.contains(id),
                    gold: self.is_gold.contains(id),
                },
            })
            .collect();

        WorldSnapshot {
            next_id: self.allocator().peek_next(),
            player_id: self.player_id,
            entities,
        }
    }

    /// Build a world from a snapshot.
    ///
    /// Fails if an entity id is [`EntityId::NONE`], is not below `next_id`,
    /// or appears twice, or if `player_id` names an entity that is absent.
    pub fn restore_snapshot(snapshot: &WorldSnapshot) -> Result<World, EcsError> {
        let mut world = World::with_counter(snapshot.next_id);

        for entity in &snapshot.entities {
            let id = entity.id;
            if id.is_none() || id.to_raw() >= snapshot.next_id {
                return Err(EcsError::IdOutOfRange {
                    entity: id,
                    next_id: snapshot.next_id,
                });
            }
            if !world.revive(id) {
                return Err(EcsError::DuplicateEntity { entity: id });
            }

            macro_rules! put {
                ($field:ident, $map:ident) => {
                    if let Some(value) = entity.$field {
                        world.$map.insert(id, value);
                    }
                };
            }
            put!(position, positions);
            put!(velocity, velocities);
            put!(movement, movements);
            put!(health, healths);
            put!(hitbox, hitboxes);
            put!(trapezoid, trapezoids);
            put!(facing, facings);
            put!(dash, dashes);
            put!(ai, ais);
            put!(projectile, projectiles);
            put!(gold, golds);
            put!(player, players);

            if entity.tags.player {
                world.is_player.insert(id);
            }
            if entity.tags.enemy {
                world.is_enemy.insert(id);
            }
            if entity.tags.projectile {
                world.is_projectile.insert(id);
            }
            if entity.tags.gold {
                world.is_gold.insert(id);
            }
        }

        if !snapshot.player_id.is_none() && !world.exists(snapshot.player_id) {
            return Err(EcsError::StaleEntity {
                entity: snapshot.player_id,
            });
        }
        world.player_id = snapshot.player_id;

        tracing::debug!(
            entities = world.entity_count(),
            next_id = snapshot.next_id,
            "restored world snapshot"
        );
        Ok(world)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_world() -> World {
        let mut world = World::new();
        let p = world.new_entity();
        world.positions.insert(p, Position::from_pixels(80, 46));
        world.velocities.insert(p, Velocity::new(12, -3));
        world.healths.insert(p, Health::new(100));
        world.is_player.insert(p);
        world.player_id = p;

        let g = world.new_entity();
        world.positions.insert(g, Position::from_pixels(10, 10));
        world.is_gold.insert(g);

        let gone = world.new_entity();
        world.destroy(gone);
        world
    }

    #[test]
    fn capture_restore_preserves_components_and_counter() {
        let world = sample_world();
        let snap = world.capture_snapshot();
        assert_eq!(snap.next_id, 4);
        assert_eq!(snap.entities.len(), 2);

        let mut restored = World::restore_snapshot(&snap).unwrap();
        assert_eq!(restored.capture_snapshot(), snap);
        assert_eq!(restored.new_entity(), EntityId::from_raw(4));
    }

    #[test]
    fn snapshot_survives_json() {
        let snap = sample_world().capture_snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back: WorldSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn restore_rejects_duplicates() {
        let mut snap = sample_world().capture_snapshot();
        let dup = snap.entities[0].clone();
        snap.entities.push(dup);
        assert!(matches!(
            World::restore_snapshot(&snap),
            Err(EcsError::DuplicateEntity { .. })
        ));
    }

    #[test]
    fn restore_rejects_ids_past_the_counter() {
        let mut snap = sample_world().capture_snapshot();
        snap.next_id = 2;
        assert!(matches!(
            World::restore_snapshot(&snap),
            Err(EcsError::IdOutOfRange { .. })
        ));
    }

    #[test]
    fn restore_rejects_missing_player() {
        let mut snap = sample_world().capture_snapshot();
        snap.entities.remove(0);
        assert!(matches!(
            World::restore_snapshot(&snap),
            Err(EcsError::StaleEntity { .. })
        ));
    }
}
