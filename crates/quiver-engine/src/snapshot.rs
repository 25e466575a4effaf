//! Scene snapshot and restore with BLAKE3 hashing.
//!
//! A [`SceneSnapshot`] is everything that evolves while a scene runs: the
//! world, the frame counters and the RNG. Stage, stage definition and config
//! are fixed for the life of a scene and are not captured.
//!
//! The hash covers the same state and is what replay checkpoints record.
//! Stuck-arrow rotation is a rendering hint and is left out of the hash.
//!
//! ```
//! use quiver_engine::prelude::*;
//!
//! let def = StageDef {
//!     name: "box".to_owned(),
//!     tile_size: 16,
//!     spike_damage: 10,
//!     rows: ["#........#", "#....P...#", "##########"].map(str::to_owned).to_vec(),
//!     enemies: Vec::new(),
//!     respawn_delay_frames: 0,
//! };
//! let mut scene = Scene::new(def, PhysicsConfig::default(), 7).unwrap();
//! scene.tick(&InputState::IDLE);
//!
//! let fork = scene.capture_snapshot();
//! for _ in 0..20 {
//!     scene.tick(&InputState::IDLE);
//! }
//! let hash_a = scene.state_hash();
//!
//! scene.restore_snapshot(&fork).unwrap();
//! assert_eq!(scene.frame(), 1);
//! for _ in 0..20 {
//!     scene.tick(&InputState::IDLE);
//! }
//! assert_eq!(hash_a, scene.state_hash());
//! ```

use quiver_ecs::snapshot::WorldSnapshot;
use quiver_ecs::world::World;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::scene::{Scene, SceneCounters};

// ---------------------------------------------------------------------------
// SceneSnapshot
// ---------------------------------------------------------------------------

/// A serializable snapshot of a running scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub world: WorldSnapshot,
    pub counters: SceneCounters,
    pub rng: Pcg32,
    /// BLAKE3 hex digest (64 lowercase hex chars) of the state above.
    pub hash: String,
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

fn compute_hash(world: &WorldSnapshot, counters: &SceneCounters, rng: &Pcg32) -> String {
    #[derive(Serialize)]
    struct HashableState<'a> {
        world: &'a WorldSnapshot,
        counters: &'a SceneCounters,
        rng: &'a Pcg32,
    }

    let mut world = world.clone();
    for entity in &mut world.entities {
        if let Some(proj) = entity.projectile.as_mut() {
            proj.stuck_rotation = 0.0;
        }
    }
    let hashable = HashableState {
        world: &world,
        counters,
        rng,
    };

    let mut hasher = blake3::Hasher::new();
    if let Err(err) = serde_json::to_writer(&mut hasher, &hashable) {
        tracing::warn!(%err, "scene state could not be serialized for hashing");
    }
    hasher.finalize().to_hex().to_string()
}

// ---------------------------------------------------------------------------
// Scene snapshot/restore methods
// ---------------------------------------------------------------------------

impl Scene {
    pub fn capture_snapshot(&self) -> SceneSnapshot {
        let world = self.world().capture_snapshot();
        let counters = self.counters();
        let rng = self.rng().clone();
        let hash = compute_hash(&world, &counters, &rng);
        SceneSnapshot {
            world,
            counters,
            rng,
            hash,
        }
    }

    /// Restore a snapshot taken from a scene on the same stage and config.
    ///
    /// The hash is recomputed first; on mismatch or a malformed world the
    /// scene is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash does not match or the world snapshot is
    /// inconsistent.
    pub fn restore_snapshot(&mut self, snapshot: &SceneSnapshot) -> Result<(), anyhow::Error> {
        let expected = compute_hash(&snapshot.world, &snapshot.counters, &snapshot.rng);
        if expected != snapshot.hash {
            return Err(anyhow::anyhow!(
                "snapshot hash mismatch: recorded {} but recomputed {}",
                snapshot.hash,
                expected
            ));
        }
        let world = World::restore_snapshot(&snapshot.world)
            .map_err(|e| anyhow::anyhow!("failed to restore world from snapshot: {e}"))?;
        self.set_state(world, snapshot.counters, snapshot.rng.clone());
        Ok(())
    }

    /// BLAKE3 hex digest of the current state.
    pub fn state_hash(&self) -> String {
        compute_hash(
            &self.world().capture_snapshot(),
            &self.counters(),
            self.rng(),
        )
    }
}
