//! Quiver Engine -- deterministic fixed-point platformer simulation.
//!
//! This crate builds on [`quiver_ecs`] to run the game: integer physics on a
//! tile grid, player control feel, enemy AI, arrows, gold pickups and the
//! damage pipeline, driven one frame at a time by a [`Scene`](scene::Scene).
//! Positions are in internal units (256 per pixel) and every frame runs ten
//! substeps, so the same inputs always produce the same state.
//!
//! # Quick Start
//!
//! ```
//! use quiver_engine::prelude::*;
//!
//! let rows = ["##########", "#........#", "#...P....#", "##########"];
//! let def = StageDef {
//!     name: "room".to_owned(),
//!     tile_size: 16,
//!     spike_damage: 10,
//!     rows: rows.map(str::to_owned).to_vec(),
//!     enemies: Vec::new(),
//!     respawn_delay_frames: 0,
//! };
//! let mut scene = Scene::new(def, PhysicsConfig::default(), 12345).unwrap();
//!
//! let right = InputState { right: true, ..InputState::IDLE };
//! for _ in 0..30 {
//!     scene.tick(&right);
//! }
//! let player = scene.player().unwrap();
//! assert!(scene.world().positions.get(player).unwrap().pixel_x() > 64);
//! ```

#![deny(unsafe_code)]

pub mod camera;
pub mod collision;
pub mod config;
pub mod control;
pub mod damage;
pub mod enemy;
pub mod feedback;
pub mod gravity;
pub mod input;
pub mod physics;
pub mod replay;
pub mod scene;
pub mod separation;
pub mod snapshot;
pub mod spawn;
pub mod stage;
pub mod timers;
pub mod units;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the ECS crate for convenience.
pub use quiver_ecs;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    // Re-export everything from the ECS prelude.
    pub use quiver_ecs::prelude::*;

    pub use crate::camera::Camera;
    pub use crate::config::{ConfigError, EntombedPolicy, PhysicsConfig, RawConfig};
    pub use crate::damage::DamageResult;
    pub use crate::feedback::{Feedback, GameState};
    pub use crate::input::{FrameInput, InputState};
    pub use crate::replay::{
        replay, verify_determinism, Checkpoint, DeterminismReport, ReplayDivergence,
        ReplayError, ReplayFile, ReplayRecorder, ReplayResult,
    };
    pub use crate::scene::{EntityState, FrameReport, Scene, SceneCounters};
    pub use crate::snapshot::SceneSnapshot;
    pub use crate::stage::{EnemySpawn, Stage, StageDef, StageError, TileStage, TileType};
    pub use crate::units::{FRAMES_PER_SECOND, SUB_STEPS};
}
