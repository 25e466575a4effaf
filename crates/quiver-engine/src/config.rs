//! Tuning configuration.
//!
//! [`RawConfig`] is the JSON document designers edit: speeds in pixels per
//! second, accelerations in pixels per second squared, durations in frames or
//! seconds, and percentages as integers. [`PhysicsConfig`] is the integer form
//! the simulation reads, built once by [`PhysicsConfig::from_raw`]. Nothing in
//! the frame loop touches a float.

use std::path::Path;

use serde::{Deserialize, Serialize};

use quiver_ecs::components::{AiType, ArrowType};

use crate::units::{acceleration_to_iu, seconds_to_frames, velocity_to_iu};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced while ingesting a config document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be between 0 and {max} percent, got {value}")]
    PercentOutOfRange {
        field: &'static str,
        value: i32,
        max: i32,
    },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("dash iframes ({iframes}) must cover the dash duration ({frames})")]
    DashIframesTooShort { iframes: i32, frames: i32 },

    #[error("arrow {0:?} is equipped more than once")]
    DuplicateArrow(ArrowType),

    #[error("arrow {0:?} cannot be equipped by the player")]
    NotPlayerArrow(ArrowType),

    #[error("gold drop range {min}..={max} for {ai:?} is empty")]
    EmptyGoldRange { ai: AiType, min: i32, max: i32 },
}

// ---------------------------------------------------------------------------
// Raw document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPhysics {
    /// px/s^2
    pub gravity: f64,
    /// px/s
    pub max_fall_speed: f64,
    pub sub_steps: u32,
    pub slow_motion_sub_steps: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMovement {
    pub max_speed: f64,
    pub acceleration: f64,
    pub deceleration: f64,
    pub air_control_pct: i32,
    pub turnaround_pct: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawJump {
    pub jump_force: f64,
    pub var_jump_pct: i32,
    pub coyote_frames: i32,
    pub jump_buffer_frames: i32,
    pub apex_mod_enabled: bool,
    /// px/s
    pub apex_threshold: f64,
    pub apex_gravity_pct: i32,
    pub fall_multiplier_pct: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDash {
    pub speed: f64,
    pub frames: i32,
    pub cooldown_frames: i32,
    pub iframes: i32,
}

/// What the overlap resolver does when no nudge frees the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntombedPolicy {
    /// Leave the player where it is; later frames may free it.
    #[default]
    Stay,
    /// Teleport the player to the stage spawn with zero velocity.
    RespawnAtSpawn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCollision {
    pub corner_correction_enabled: bool,
    pub corner_correction_margin: i32,
    pub entombed_policy: EntombedPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCombat {
    pub iframe_frames: i32,
    /// px/s
    pub knockback_force: f64,
    /// px/s
    pub knockback_up: f64,
    /// px/s^2, linear friction applied while stunned
    pub knockback_decay: f64,
    pub stun_frames: i32,
    /// Stun applied to an enemy hit by a player arrow.
    pub enemy_hit_frames: i32,
    /// px/s, upward speed after touching spikes
    pub spike_bounce: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFeedback {
    pub hitstop_frames: i32,
    pub shake_intensity: i32,
    pub player_hit_shake: i32,
    pub spike_shake: i32,
    pub shake_decay_pct: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPlayer {
    pub max_health: i32,
    pub fire_cooldown_frames: i32,
    pub equipped_arrows: [ArrowType; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawArrow {
    /// px/s
    pub speed: f64,
    /// px/s^2
    pub gravity: f64,
    /// px/s
    pub max_fall_speed: f64,
    /// px
    pub max_range: i32,
    pub damage: i32,
    /// seconds
    pub stuck_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawArrows {
    pub standard: RawArrow,
    pub heavy: RawArrow,
    pub long: RawArrow,
    pub rapid: RawArrow,
    pub enemy: RawArrow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawEnemyTemplate {
    pub health: i32,
    /// px/s
    pub move_speed: f64,
    /// px/s
    pub jump_force: f64,
    pub detect_range: i32,
    pub attack_range: i32,
    pub patrol_distance: i32,
    pub contact_damage: i32,
    pub flying: bool,
    pub gold_drop_min: i32,
    pub gold_drop_max: i32,
    pub attack_cooldown_frames: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawEnemies {
    pub patrol: RawEnemyTemplate,
    pub aggressive: RawEnemyTemplate,
    pub ranged: RawEnemyTemplate,
    pub chase: RawEnemyTemplate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawGold {
    /// px/s^2
    pub gravity: f64,
    pub bounce_pct: i32,
    pub collect_radius: i32,
    pub hitbox_width: i32,
    pub hitbox_height: i32,
    pub collect_delay_frames: i32,
    /// px/s, upward launch speed on drop
    pub pop_velocity: f64,
    /// px/s per unit of `amount % 10 - 5`
    pub spread_velocity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawScreen {
    pub width: i32,
    pub height: i32,
}

/// The designer-facing config document. Every section and key is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub physics: RawPhysics,
    pub movement: RawMovement,
    pub jump: RawJump,
    pub dash: RawDash,
    pub collision: RawCollision,
    pub combat: RawCombat,
    pub feedback: RawFeedback,
    pub player: RawPlayer,
    pub arrows: RawArrows,
    pub enemies: RawEnemies,
    pub gold: RawGold,
    pub screen: RawScreen,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            physics: RawPhysics {
                gravity: 800.0,
                max_fall_speed: 600.0,
                sub_steps: 10,
                slow_motion_sub_steps: 1,
            },
            movement: RawMovement {
                max_speed: 120.0,
                acceleration: 1200.0,
                deceleration: 1500.0,
                air_control_pct: 80,
                turnaround_pct: 200,
            },
            jump: RawJump {
                jump_force: 300.0,
                var_jump_pct: 50,
                coyote_frames: 6,
                jump_buffer_frames: 6,
                apex_mod_enabled: true,
                apex_threshold: 40.0,
                apex_gravity_pct: 50,
                fall_multiplier_pct: 150,
            },
            dash: RawDash {
                speed: 360.0,
                frames: 10,
                cooldown_frames: 30,
                iframes: 12,
            },
            collision: RawCollision {
                corner_correction_enabled: true,
                corner_correction_margin: 4,
                entombed_policy: EntombedPolicy::Stay,
            },
            combat: RawCombat {
                iframe_frames: 60,
                knockback_force: 150.0,
                knockback_up: 120.0,
                knockback_decay: 600.0,
                stun_frames: 12,
                enemy_hit_frames: 12,
                spike_bounce: 150.0,
            },
            feedback: RawFeedback {
                hitstop_frames: 3,
                shake_intensity: 4,
                player_hit_shake: 6,
                spike_shake: 5,
                shake_decay_pct: 85,
            },
            player: RawPlayer {
                max_health: 100,
                fire_cooldown_frames: 15,
                equipped_arrows: ArrowType::PLAYER_LOADOUT,
            },
            arrows: RawArrows {
                standard: RawArrow {
                    speed: 300.0,
                    gravity: 400.0,
                    max_fall_speed: 60.0,
                    max_range: 400,
                    damage: 10,
                    stuck_duration: 2.0,
                },
                heavy: RawArrow {
                    speed: 240.0,
                    gravity: 800.0,
                    max_fall_speed: 300.0,
                    max_range: 240,
                    damage: 20,
                    stuck_duration: 3.0,
                },
                long: RawArrow {
                    speed: 420.0,
                    gravity: 200.0,
                    max_fall_speed: 120.0,
                    max_range: 640,
                    damage: 8,
                    stuck_duration: 2.0,
                },
                rapid: RawArrow {
                    speed: 360.0,
                    gravity: 400.0,
                    max_fall_speed: 200.0,
                    max_range: 320,
                    damage: 6,
                    stuck_duration: 1.5,
                },
                enemy: RawArrow {
                    speed: 220.5,
                    gravity: 300.0,
                    max_fall_speed: 200.0,
                    max_range: 320,
                    damage: 10,
                    stuck_duration: 1.5,
                },
            },
            enemies: RawEnemies {
                patrol: RawEnemyTemplate {
                    health: 30,
                    move_speed: 40.0,
                    jump_force: 0.0,
                    detect_range: 0,
                    attack_range: 0,
                    patrol_distance: 32,
                    contact_damage: 10,
                    flying: false,
                    gold_drop_min: 3,
                    gold_drop_max: 7,
                    attack_cooldown_frames: 90,
                },
                aggressive: RawEnemyTemplate {
                    health: 40,
                    move_speed: 60.0,
                    jump_force: 260.0,
                    detect_range: 160,
                    attack_range: 120,
                    patrol_distance: 0,
                    contact_damage: 15,
                    flying: false,
                    gold_drop_min: 5,
                    gold_drop_max: 11,
                    attack_cooldown_frames: 90,
                },
                ranged: RawEnemyTemplate {
                    health: 25,
                    move_speed: 0.0,
                    jump_force: 0.0,
                    detect_range: 200,
                    attack_range: 180,
                    patrol_distance: 0,
                    contact_damage: 5,
                    flying: false,
                    gold_drop_min: 4,
                    gold_drop_max: 8,
                    attack_cooldown_frames: 90,
                },
                chase: RawEnemyTemplate {
                    health: 20,
                    move_speed: 50.0,
                    jump_force: 0.0,
                    detect_range: 140,
                    attack_range: 0,
                    patrol_distance: 0,
                    contact_damage: 10,
                    flying: true,
                    gold_drop_min: 2,
                    gold_drop_max: 4,
                    attack_cooldown_frames: 90,
                },
            },
            gold: RawGold {
                gravity: 600.0,
                bounce_pct: 50,
                collect_radius: 12,
                hitbox_width: 6,
                hitbox_height: 6,
                collect_delay_frames: 20,
                pop_velocity: 180.0,
                spread_velocity: 10.0,
            },
            screen: RawScreen {
                width: 320,
                height: 180,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Converted config
// ---------------------------------------------------------------------------

/// Per-arrow flight data in simulation units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrowStats {
    /// IU per substep.
    pub speed: i32,
    /// IU per frame.
    pub gravity_accel: i32,
    /// IU per substep.
    pub max_fall_speed: i32,
    /// Pixels.
    pub max_range: i32,
    pub damage: i32,
    /// Frames.
    pub stuck_duration: i32,
}

impl ArrowStats {
    fn from_raw(raw: &RawArrow) -> Self {
        Self {
            speed: velocity_to_iu(raw.speed),
            gravity_accel: acceleration_to_iu(raw.gravity),
            max_fall_speed: velocity_to_iu(raw.max_fall_speed),
            max_range: raw.max_range,
            damage: raw.damage,
            stuck_duration: seconds_to_frames(raw.stuck_duration),
        }
    }
}

/// Stats for every [`ArrowType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrowTable {
    pub standard: ArrowStats,
    pub heavy: ArrowStats,
    pub long: ArrowStats,
    pub rapid: ArrowStats,
    pub enemy: ArrowStats,
}

impl ArrowTable {
    pub fn get(&self, kind: ArrowType) -> &ArrowStats {
        match kind {
            ArrowType::Standard => &self.standard,
            ArrowType::Heavy => &self.heavy,
            ArrowType::Long => &self.long,
            ArrowType::Rapid => &self.rapid,
            ArrowType::Enemy => &self.enemy,
        }
    }
}

/// Enemy archetype in simulation units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub health: i32,
    /// IU per substep.
    pub move_speed: i32,
    /// IU per substep.
    pub jump_force: i32,
    pub detect_range: i32,
    pub attack_range: i32,
    pub patrol_distance: i32,
    pub contact_damage: i32,
    pub flying: bool,
    pub gold_drop_min: i32,
    pub gold_drop_max: i32,
    pub attack_cooldown_frames: i32,
}

impl EnemyTemplate {
    fn from_raw(raw: &RawEnemyTemplate) -> Self {
        Self {
            health: raw.health,
            move_speed: velocity_to_iu(raw.move_speed),
            jump_force: velocity_to_iu(raw.jump_force),
            detect_range: raw.detect_range,
            attack_range: raw.attack_range,
            patrol_distance: raw.patrol_distance,
            contact_damage: raw.contact_damage,
            flying: raw.flying,
            gold_drop_min: raw.gold_drop_min,
            gold_drop_max: raw.gold_drop_max,
            attack_cooldown_frames: raw.attack_cooldown_frames,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyTemplates {
    pub patrol: EnemyTemplate,
    pub aggressive: EnemyTemplate,
    pub ranged: EnemyTemplate,
    pub chase: EnemyTemplate,
}

impl EnemyTemplates {
    pub fn get(&self, ai: AiType) -> &EnemyTemplate {
        match ai {
            AiType::Patrol => &self.patrol,
            AiType::Aggressive => &self.aggressive,
            AiType::Ranged => &self.ranged,
            AiType::Chase => &self.chase,
        }
    }
}

/// Gold pickup tuning in simulation units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldConfig {
    /// IU per frame.
    pub gravity: i32,
    pub bounce_pct: i32,
    pub collect_radius: i32,
    pub hitbox_width: i32,
    pub hitbox_height: i32,
    pub collect_delay_frames: i32,
    /// IU per substep.
    pub pop_velocity: i32,
    /// IU per substep.
    pub spread_velocity: i32,
}

/// Pre-converted integer tuning read by every system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    // Physics
    pub gravity: i32,
    pub max_fall_speed: i32,
    pub sub_steps: u32,
    pub slow_motion_sub_steps: u32,

    // Movement
    pub max_speed: i32,
    pub acceleration: i32,
    pub deceleration: i32,
    pub air_control_pct: i32,
    pub turnaround_pct: i32,

    // Jump
    pub jump_force: i32,
    pub var_jump_pct: i32,
    pub coyote_frames: i32,
    pub jump_buffer_frames: i32,
    pub apex_mod_enabled: bool,
    pub apex_threshold: i32,
    pub apex_gravity_pct: i32,
    pub fall_multiplier_pct: i32,

    // Dash
    pub dash_speed: i32,
    pub dash_frames: i32,
    pub dash_cooldown_frames: i32,
    pub dash_iframes: i32,

    // Collision
    pub corner_correction_enabled: bool,
    pub corner_correction_margin: i32,
    pub entombed_policy: EntombedPolicy,

    // Combat
    pub iframe_frames: i32,
    pub knockback_force: i32,
    pub knockback_up: i32,
    pub knockback_decay: i32,
    pub stun_frames: i32,
    pub enemy_hit_frames: i32,
    pub spike_bounce: i32,

    // Feedback
    pub hitstop_frames: i32,
    pub shake_intensity: i32,
    pub player_hit_shake: i32,
    pub spike_shake: i32,
    pub shake_decay_pct: i32,

    // Player
    pub player_max_health: i32,
    pub fire_cooldown_frames: i32,
    pub equipped_arrows: [ArrowType; 4],

    pub arrows: ArrowTable,
    pub enemies: EnemyTemplates,
    pub gold: GoldConfig,

    pub screen_width: i32,
    pub screen_height: i32,
}

impl PhysicsConfig {
    /// Validate and convert a raw document.
    pub fn from_raw(raw: &RawConfig) -> Result<Self, ConfigError> {
        validate(raw)?;
        Ok(Self::convert(raw))
    }

    /// Parse, validate and convert a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json)?;
        Self::from_raw(&raw)
    }

    /// Read, parse, validate and convert a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    fn convert(raw: &RawConfig) -> Self {
        Self {
            gravity: acceleration_to_iu(raw.physics.gravity),
            max_fall_speed: velocity_to_iu(raw.physics.max_fall_speed),
            sub_steps: raw.physics.sub_steps,
            slow_motion_sub_steps: raw.physics.slow_motion_sub_steps,

            max_speed: velocity_to_iu(raw.movement.max_speed),
            acceleration: acceleration_to_iu(raw.movement.acceleration),
            deceleration: acceleration_to_iu(raw.movement.deceleration),
            air_control_pct: raw.movement.air_control_pct,
            turnaround_pct: raw.movement.turnaround_pct,

            jump_force: velocity_to_iu(raw.jump.jump_force),
            var_jump_pct: raw.jump.var_jump_pct,
            coyote_frames: raw.jump.coyote_frames,
            jump_buffer_frames: raw.jump.jump_buffer_frames,
            apex_mod_enabled: raw.jump.apex_mod_enabled,
            apex_threshold: velocity_to_iu(raw.jump.apex_threshold),
            apex_gravity_pct: raw.jump.apex_gravity_pct,
            fall_multiplier_pct: raw.jump.fall_multiplier_pct,

            dash_speed: velocity_to_iu(raw.dash.speed),
            dash_frames: raw.dash.frames,
            dash_cooldown_frames: raw.dash.cooldown_frames,
            dash_iframes: raw.dash.iframes,

            corner_correction_enabled: raw.collision.corner_correction_enabled,
            corner_correction_margin: raw.collision.corner_correction_margin,
            entombed_policy: raw.collision.entombed_policy,

            iframe_frames: raw.combat.iframe_frames,
            knockback_force: velocity_to_iu(raw.combat.knockback_force),
            knockback_up: velocity_to_iu(raw.combat.knockback_up),
            knockback_decay: acceleration_to_iu(raw.combat.knockback_decay),
            stun_frames: raw.combat.stun_frames,
            enemy_hit_frames: raw.combat.enemy_hit_frames,
            spike_bounce: velocity_to_iu(raw.combat.spike_bounce),

            hitstop_frames: raw.feedback.hitstop_frames,
            shake_intensity: raw.feedback.shake_intensity,
            player_hit_shake: raw.feedback.player_hit_shake,
            spike_shake: raw.feedback.spike_shake,
            shake_decay_pct: raw.feedback.shake_decay_pct,

            player_max_health: raw.player.max_health,
            fire_cooldown_frames: raw.player.fire_cooldown_frames,
            equipped_arrows: raw.player.equipped_arrows,

            arrows: ArrowTable {
                standard: ArrowStats::from_raw(&raw.arrows.standard),
                heavy: ArrowStats::from_raw(&raw.arrows.heavy),
                long: ArrowStats::from_raw(&raw.arrows.long),
                rapid: ArrowStats::from_raw(&raw.arrows.rapid),
                enemy: ArrowStats::from_raw(&raw.arrows.enemy),
            },
            enemies: EnemyTemplates {
                patrol: EnemyTemplate::from_raw(&raw.enemies.patrol),
                aggressive: EnemyTemplate::from_raw(&raw.enemies.aggressive),
                ranged: EnemyTemplate::from_raw(&raw.enemies.ranged),
                chase: EnemyTemplate::from_raw(&raw.enemies.chase),
            },
            gold: GoldConfig {
                gravity: acceleration_to_iu(raw.gold.gravity),
                bounce_pct: raw.gold.bounce_pct,
                collect_radius: raw.gold.collect_radius,
                hitbox_width: raw.gold.hitbox_width,
                hitbox_height: raw.gold.hitbox_height,
                collect_delay_frames: raw.gold.collect_delay_frames,
                pop_velocity: velocity_to_iu(raw.gold.pop_velocity),
                spread_velocity: velocity_to_iu(raw.gold.spread_velocity),
            },

            screen_width: raw.screen.width,
            screen_height: raw.screen.height,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self::convert(&RawConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn pct(field: &'static str, value: i32, max: i32) -> Result<(), ConfigError> {
    if (0..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::PercentOutOfRange { field, value, max })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn validate_arrow(name: &'static str, arrow: &RawArrow) -> Result<(), ConfigError> {
    positive(name, arrow.speed)?;
    non_negative(name, arrow.gravity)?;
    non_negative(name, arrow.max_fall_speed)?;
    positive(name, arrow.max_range as f64)?;
    non_negative(name, arrow.damage as f64)?;
    positive(name, arrow.stuck_duration)
}

fn validate_enemy(ai: AiType, name: &'static str, t: &RawEnemyTemplate) -> Result<(), ConfigError> {
    positive(name, t.health as f64)?;
    non_negative(name, t.move_speed)?;
    non_negative(name, t.jump_force)?;
    non_negative(name, t.contact_damage as f64)?;
    if t.gold_drop_min > t.gold_drop_max || t.gold_drop_min < 0 {
        return Err(ConfigError::EmptyGoldRange {
            ai,
            min: t.gold_drop_min,
            max: t.gold_drop_max,
        });
    }
    Ok(())
}

fn validate(raw: &RawConfig) -> Result<(), ConfigError> {
    positive("physics.gravity", raw.physics.gravity)?;
    positive("physics.max_fall_speed", raw.physics.max_fall_speed)?;
    positive("physics.sub_steps", raw.physics.sub_steps as f64)?;
    positive(
        "physics.slow_motion_sub_steps",
        raw.physics.slow_motion_sub_steps as f64,
    )?;

    positive("movement.max_speed", raw.movement.max_speed)?;
    positive("movement.acceleration", raw.movement.acceleration)?;
    positive("movement.deceleration", raw.movement.deceleration)?;
    pct("movement.air_control_pct", raw.movement.air_control_pct, 200)?;
    pct("movement.turnaround_pct", raw.movement.turnaround_pct, 200)?;

    positive("jump.jump_force", raw.jump.jump_force)?;
    pct("jump.var_jump_pct", raw.jump.var_jump_pct, 200)?;
    non_negative("jump.coyote_frames", raw.jump.coyote_frames as f64)?;
    non_negative("jump.jump_buffer_frames", raw.jump.jump_buffer_frames as f64)?;
    non_negative("jump.apex_threshold", raw.jump.apex_threshold)?;
    pct("jump.apex_gravity_pct", raw.jump.apex_gravity_pct, 200)?;
    pct("jump.fall_multiplier_pct", raw.jump.fall_multiplier_pct, 200)?;

    positive("dash.speed", raw.dash.speed)?;
    positive("dash.frames", raw.dash.frames as f64)?;
    non_negative("dash.cooldown_frames", raw.dash.cooldown_frames as f64)?;
    if raw.dash.iframes < raw.dash.frames {
        return Err(ConfigError::DashIframesTooShort {
            iframes: raw.dash.iframes,
            frames: raw.dash.frames,
        });
    }

    non_negative(
        "collision.corner_correction_margin",
        raw.collision.corner_correction_margin as f64,
    )?;

    positive("combat.iframe_frames", raw.combat.iframe_frames as f64)?;
    non_negative("combat.knockback_force", raw.combat.knockback_force)?;
    non_negative("combat.knockback_up", raw.combat.knockback_up)?;
    non_negative("combat.knockback_decay", raw.combat.knockback_decay)?;
    non_negative("combat.stun_frames", raw.combat.stun_frames as f64)?;
    positive("combat.enemy_hit_frames", raw.combat.enemy_hit_frames as f64)?;
    non_negative("combat.spike_bounce", raw.combat.spike_bounce)?;

    non_negative("feedback.hitstop_frames", raw.feedback.hitstop_frames as f64)?;
    non_negative("feedback.shake_intensity", raw.feedback.shake_intensity as f64)?;
    non_negative("feedback.player_hit_shake", raw.feedback.player_hit_shake as f64)?;
    non_negative("feedback.spike_shake", raw.feedback.spike_shake as f64)?;
    pct("feedback.shake_decay_pct", raw.feedback.shake_decay_pct, 100)?;

    positive("player.max_health", raw.player.max_health as f64)?;
    non_negative(
        "player.fire_cooldown_frames",
        raw.player.fire_cooldown_frames as f64,
    )?;
    let equipped = raw.player.equipped_arrows;
    for (i, kind) in equipped.iter().enumerate() {
        if *kind == ArrowType::Enemy {
            return Err(ConfigError::NotPlayerArrow(*kind));
        }
        if equipped[..i].contains(kind) {
            return Err(ConfigError::DuplicateArrow(*kind));
        }
    }

    validate_arrow("arrows.standard", &raw.arrows.standard)?;
    validate_arrow("arrows.heavy", &raw.arrows.heavy)?;
    validate_arrow("arrows.long", &raw.arrows.long)?;
    validate_arrow("arrows.rapid", &raw.arrows.rapid)?;
    validate_arrow("arrows.enemy", &raw.arrows.enemy)?;

    validate_enemy(AiType::Patrol, "enemies.patrol", &raw.enemies.patrol)?;
    validate_enemy(AiType::Aggressive, "enemies.aggressive", &raw.enemies.aggressive)?;
    validate_enemy(AiType::Ranged, "enemies.ranged", &raw.enemies.ranged)?;
    validate_enemy(AiType::Chase, "enemies.chase", &raw.enemies.chase)?;

    non_negative("gold.gravity", raw.gold.gravity)?;
    pct("gold.bounce_pct", raw.gold.bounce_pct, 100)?;
    positive("gold.collect_radius", raw.gold.collect_radius as f64)?;
    positive("gold.hitbox_width", raw.gold.hitbox_width as f64)?;
    positive("gold.hitbox_height", raw.gold.hitbox_height as f64)?;
    non_negative(
        "gold.collect_delay_frames",
        raw.gold.collect_delay_frames as f64,
    )?;

    positive("screen.width", raw.screen.width as f64)?;
    positive("screen.height", raw.screen.height as f64)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tuning_converts_to_reference_integers() {
        let cfg = PhysicsConfig::from_raw(&RawConfig::default()).unwrap();
        assert_eq!(cfg, PhysicsConfig::default());
        assert_eq!(cfg.gravity, 5);
        assert_eq!(cfg.max_fall_speed, 256);
        assert_eq!(cfg.max_speed, 51);
        assert_eq!(cfg.jump_force, 128);
        assert_eq!(cfg.apex_threshold, 17);
        assert_eq!(cfg.dash_speed, 153);
        assert_eq!(cfg.knockback_force, 64);
        assert_eq!(cfg.knockback_decay, 4);
        assert_eq!(cfg.sub_steps, 10);
        assert_eq!(cfg.arrows.standard.speed, 128);
        assert_eq!(cfg.arrows.standard.gravity_accel, 2);
        assert_eq!(cfg.arrows.standard.stuck_duration, 120);
        assert_eq!(cfg.arrows.enemy.speed, 94);
        assert_eq!(cfg.gold.gravity, 4);
    }

    #[test]
    fn json_round_trip_of_raw_document() {
        let json = serde_json::to_string(&RawConfig::default()).unwrap();
        let cfg = PhysicsConfig::from_json_str(&json).unwrap();
        assert_eq!(cfg, PhysicsConfig::default());
    }

    #[test]
    fn missing_key_is_rejected() {
        let mut value = serde_json::to_value(RawConfig::default()).unwrap();
        value["jump"]
            .as_object_mut()
            .unwrap()
            .remove("coyote_frames");
        let err = PhysicsConfig::from_json_str(&value.to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            PhysicsConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn percent_out_of_range_is_rejected() {
        let mut raw = RawConfig::default();
        raw.movement.turnaround_pct = 250;
        assert!(matches!(
            PhysicsConfig::from_raw(&raw),
            Err(ConfigError::PercentOutOfRange {
                field: "movement.turnaround_pct",
                ..
            })
        ));
    }

    #[test]
    fn dash_iframes_must_cover_dash() {
        let mut raw = RawConfig::default();
        raw.dash.iframes = raw.dash.frames - 1;
        assert!(matches!(
            PhysicsConfig::from_raw(&raw),
            Err(ConfigError::DashIframesTooShort { .. })
        ));
    }

    #[test]
    fn loadout_must_be_distinct_player_arrows() {
        let mut raw = RawConfig::default();
        raw.player.equipped_arrows[1] = ArrowType::Standard;
        assert!(matches!(
            PhysicsConfig::from_raw(&raw),
            Err(ConfigError::DuplicateArrow(ArrowType::Standard))
        ));

        let mut raw = RawConfig::default();
        raw.player.equipped_arrows[3] = ArrowType::Enemy;
        assert!(matches!(
            PhysicsConfig::from_raw(&raw),
            Err(ConfigError::NotPlayerArrow(ArrowType::Enemy))
        ));
    }

    #[test]
    fn zero_substeps_is_rejected() {
        let mut raw = RawConfig::default();
        raw.physics.sub_steps = 0;
        assert!(matches!(
            PhysicsConfig::from_raw(&raw),
            Err(ConfigError::NonPositive { .. })
        ));
    }
}
