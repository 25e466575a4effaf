//! The frame loop.
//!
//! A [`Scene`] owns everything one play session needs: the world, the stage,
//! the converted config, the seeded RNG and the frame-level counters. Each
//! call to [`Scene::tick`] advances exactly one frame:
//!
//! 1. Hitstop swallows the frame if any is pending.
//! 2. In game over, only a jump press (restart) is processed.
//! 3. Timers tick, input is mapped, gravity is applied once.
//! 4. `SubSteps` substeps run (one while the arrow wheel is open), each
//!    advancing the player, enemies, projectiles and gold in that order.
//! 5. Gold collection, damage, enemy separation and the spike check run.
//! 6. Shake decays, the roster respawn countdown advances, and the game-over
//!    transition is checked.
//!
//! The ordering is fixed; two scenes fed the same seed, stage and inputs stay
//! identical frame for frame.
//!
//! # Example
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
//! let mut scene = Scene::new(def, PhysicsConfig::default(), 12345).unwrap();
//! for _ in 0..10 {
//!     scene.tick(&InputState::IDLE);
//! }
//! assert_eq!(scene.frame(), 10);
//! assert_eq!(scene.state_hash().len(), 64);
//! ```

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use quiver_ecs::prelude::*;

use crate::camera::Camera;
use crate::config::PhysicsConfig;
use crate::control::{apply_input, ControlEvents};
use crate::damage::{resolve_damage, spike_check, DamageResult};
use crate::enemy::enemy_substep;
use crate::feedback::{Feedback, GameState};
use crate::gravity::apply_gravity;
use crate::input::InputState;
use crate::physics::{collect_gold, gold_substep, player_substep, projectile_substep};
use crate::separation::separate_enemies;
use crate::spawn::{create_enemy, create_player, PLAYER_SPRITE_HEIGHT, PLAYER_SPRITE_WIDTH};
use crate::stage::{Stage, StageDef, StageError, TileStage};
use crate::timers::tick_timers;

// ---------------------------------------------------------------------------
// Per-frame outputs
// ---------------------------------------------------------------------------

/// The observable per-entity tuple compared by determinism checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityState {
    pub id: EntityId,
    pub position: Position,
    pub velocity: Velocity,
    /// Current health, `None` for entities without health.
    pub health: Option<i32>,
    pub on_ground: bool,
    pub on_ceiling: bool,
}

/// What one call to [`Scene::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// The frame was swallowed by hitstop or game over.
    pub paused: bool,
    pub damage: DamageResult,
    pub control: ControlEvents,
    pub gold_collected: i32,
    pub restarted: bool,
}

/// Frame-level counters that live outside the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SceneCounters {
    pub frame: u64,
    pub game_state: GameState,
    pub feedback: Feedback,
    /// Frames left before the roster respawns, when counting down.
    pub respawn_timer: Option<i32>,
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Scene {
    world: World,
    stage: TileStage,
    def: StageDef,
    config: PhysicsConfig,
    seed: i64,
    rng: Pcg32,
    counters: SceneCounters,
}

impl Scene {
    /// Build the stage, spawn the player and the enemy roster.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] if the stage definition is malformed.
    pub fn new(def: StageDef, config: PhysicsConfig, seed: i64) -> Result<Self, StageError> {
        let stage = TileStage::from_def(&def)?;
        let mut scene = Self {
            world: World::new(),
            stage,
            def,
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed as u64),
            counters: SceneCounters::default(),
        };
        scene.populate();
        Ok(scene)
    }

    fn populate(&mut self) {
        let (sx, sy) = self.stage.spawn();
        create_player(&mut self.world, &self.config, sx, sy);
        self.spawn_roster();
    }

    fn spawn_roster(&mut self) {
        for spawn in &self.def.enemies {
            let x = self.rng.gen_range(spawn.x_min..=spawn.x_max);
            create_enemy(
                &mut self.world,
                &self.config,
                spawn.ai,
                x,
                spawn.y,
                spawn.facing_right,
            );
        }
    }

    /// Clear the world (ids keep counting) and respawn everything.
    pub fn restart(&mut self) {
        self.world.clear();
        self.counters.game_state = GameState::Playing;
        self.counters.feedback = Feedback::default();
        self.counters.respawn_timer = None;
        self.populate();
        tracing::debug!(frame = self.counters.frame, "scene restarted");
    }

    /// Advance one frame.
    pub fn tick(&mut self, input: &InputState) -> FrameReport {
        let report = self.step(input);
        self.counters.frame += 1;
        report
    }

    fn step(&mut self, input: &InputState) -> FrameReport {
        let mut report = FrameReport::default();

        if self.counters.feedback.consume_hitstop() {
            report.paused = true;
            return report;
        }
        if self.counters.game_state == GameState::GameOver {
            report.paused = true;
            if input.jump_pressed {
                self.restart();
                report.restarted = true;
            }
            return report;
        }

        let world = &mut self.world;
        let config = &self.config;
        let stage = &self.stage;

        tick_timers(world);
        let camera = camera_for(world, config, stage);
        report.control = apply_input(world, config, input, camera);
        apply_gravity(world, config, stage);

        let selecting = world
            .player()
            .and_then(|id| world.players.get(id))
            .is_some_and(|p| p.selecting_arrow);
        let substeps = if selecting {
            config.slow_motion_sub_steps
        } else {
            config.sub_steps
        };
        for _ in 0..substeps {
            player_substep(world, config, stage);
            enemy_substep(world, config, stage);
            projectile_substep(world, stage);
            gold_substep(world, stage);
        }

        report.gold_collected = collect_gold(world);
        let mut damage = resolve_damage(world, config);
        separate_enemies(world, stage);
        damage.merge(spike_check(world, config, stage));
        report.damage = damage;

        self.counters.feedback.decay_shake(config.shake_decay_pct);
        self.counters.feedback.absorb(&damage);

        self.respawn_bookkeeping();
        self.check_game_over();
        report
    }

    fn respawn_bookkeeping(&mut self) {
        let delay = self.def.respawn_delay_frames;
        if delay <= 0 || self.def.enemies.is_empty() {
            return;
        }
        if self.counters.respawn_timer.is_none() && self.world.count_enemies() == 0 {
            self.counters.respawn_timer = Some(delay);
        }
        if let Some(left) = self.counters.respawn_timer {
            let left = left - 1;
            if left > 0 {
                self.counters.respawn_timer = Some(left);
            } else {
                self.counters.respawn_timer = None;
                self.spawn_roster();
                tracing::debug!(frame = self.counters.frame, "enemy roster respawned");
            }
        }
    }

    fn check_game_over(&mut self) {
        let dead = self
            .world
            .player()
            .and_then(|id| self.world.healths.get(id))
            .map_or(true, Health::is_dead);
        if dead {
            self.counters.game_state = GameState::GameOver;
            tracing::debug!(frame = self.counters.frame, "game over");
        }
    }

    // -- accessors ----------------------------------------------------------

    /// Number of frames ticked so far, paused frames included.
    pub fn frame(&self) -> u64 {
        self.counters.frame
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn game_state(&self) -> GameState {
        self.counters.game_state
    }

    pub fn feedback(&self) -> Feedback {
        self.counters.feedback
    }

    pub fn counters(&self) -> SceneCounters {
        self.counters
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct world access for tests and tooling.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn stage(&self) -> &TileStage {
        &self.stage
    }

    pub fn stage_def(&self) -> &StageDef {
        &self.def
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub(crate) fn rng(&self) -> &Pcg32 {
        &self.rng
    }

    pub(crate) fn set_state(&mut self, world: World, counters: SceneCounters, rng: Pcg32) {
        self.world = world;
        self.counters = counters;
        self.rng = rng;
    }

    /// Camera for the current player position.
    pub fn camera(&self) -> Camera {
        camera_for(&self.world, &self.config, &self.stage)
    }

    /// The player entity, if alive.
    pub fn player(&self) -> Option<EntityId> {
        self.world.player()
    }

    /// Every entity's observable tuple, in id order.
    pub fn frame_states(&self) -> Vec<EntityState> {
        let w = &self.world;
        w.ids()
            .into_iter()
            .filter_map(|id| {
                let position = w.positions.copied(id)?;
                let mv = w.movements.copied(id).unwrap_or_default();
                Some(EntityState {
                    id,
                    position,
                    velocity: w.velocities.copied(id).unwrap_or_default(),
                    health: w.healths.get(id).map(|h| h.current),
                    on_ground: mv.on_ground,
                    on_ceiling: mv.on_ceiling,
                })
            })
            .collect()
    }
}

fn camera_for(world: &World, config: &PhysicsConfig, stage: &TileStage) -> Camera {
    let focus = world
        .player()
        .and_then(|id| world.positions.copied(id))
        .map_or((0, 0), |pos| {
            (
                pos.pixel_x() + PLAYER_SPRITE_WIDTH / 2,
                pos.pixel_y() + PLAYER_SPRITE_HEIGHT / 2,
            )
        });
    Camera::centered_on(
        focus,
        (config.screen_width, config.screen_height),
        stage.pixel_size(),
    )
}
